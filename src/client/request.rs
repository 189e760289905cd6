use crate::client::Error;
use crate::config::ClientConfig;
use crate::k8s_types::K8sType;
use crate::resource::ObjectIdRef;

use http::{header, Method, Request};
use hyper::Body;
use url::Url;

const IMPERSONATE_USER: &str = "Impersonate-User";
const IMPERSONATE_GROUP: &str = "Impersonate-Group";
const APPLICATION_JSON: &str = "application/json";

pub fn get_request(
    client_config: &ClientConfig,
    k8s_type: &K8sType,
    id: &ObjectIdRef<'_>,
) -> Result<Request<Body>, Error> {
    let url = make_url(client_config, k8s_type, Some(id.namespace), Some(id.name))?;
    let req = make_req(url, Method::GET, client_config).body(Body::empty())?;
    Ok(req)
}

fn make_req(url: Url, method: Method, client_config: &ClientConfig) -> http::request::Builder {
    let mut builder = Request::builder()
        .method(method)
        .uri(url.as_str())
        .header(header::ACCEPT, APPLICATION_JSON)
        .header(header::USER_AGENT, client_config.user_agent.as_str());

    if let Some(auth) = client_config.credentials.header_value() {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    if let Some(user) = client_config.impersonate.as_ref() {
        builder = builder.header(IMPERSONATE_USER, user.as_str());
    }
    for group in client_config.impersonate_groups.iter() {
        builder = builder.header(IMPERSONATE_GROUP, group.as_str());
    }
    builder
}

pub(crate) fn make_url(
    client_config: &ClientConfig,
    k8s_type: &K8sType,
    namespace: Option<&str>,
    name: Option<&str>,
) -> Result<Url, Error> {
    let mut url = Url::parse(client_config.api_server_endpoint.as_str())?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| Error::InvalidEndpoint(client_config.api_server_endpoint.clone()))?;
        // an endpoint with a trailing slash would otherwise produce an empty segment
        segments.pop_if_empty();

        if k8s_type.is_core() {
            segments.push("api");
        } else {
            segments.push("apis");
            segments.push(k8s_type.group);
        }
        segments.push(k8s_type.version);
        if let Some(ns) = namespace {
            segments.push("namespaces");
            segments.push(ns);
        }
        segments.push(k8s_type.plural_kind);

        if let Some(n) = name {
            segments.push(n);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Credentials;
    use crate::k8s_types::monitoring_coreos_com::v1::Prometheus;

    static CONFIG_MAP: &K8sType = &K8sType {
        group: "",
        version: "v1",
        kind: "ConfigMap",
        plural_kind: "configmaps",
    };

    fn config(endpoint: &str) -> ClientConfig {
        ClientConfig::new(endpoint, "the-token")
    }

    #[test]
    fn get_request_targets_the_namespaced_custom_resource() {
        let conf = config("https://k8s.example.com:6443");
        let req = get_request(&conf, Prometheus, &ObjectIdRef::new("monitoring", "k8s"))
            .expect("failed to build request");

        assert_eq!(&Method::GET, req.method());
        assert_eq!(
            "https://k8s.example.com:6443/apis/monitoring.coreos.com/v1/namespaces/monitoring/prometheuses/k8s",
            req.uri().to_string()
        );
        assert_eq!("Bearer the-token", req.headers()[header::AUTHORIZATION]);
        assert_eq!(APPLICATION_JSON, req.headers()[header::ACCEPT]);
    }

    #[test]
    fn core_resources_use_the_api_prefix() {
        let conf = config("https://k8s.example.com/");
        let url = make_url(&conf, CONFIG_MAP, Some("default"), Some("settings"))
            .expect("failed to build url");
        assert_eq!(
            "https://k8s.example.com/api/v1/namespaces/default/configmaps/settings",
            url.as_str()
        );
    }

    #[test]
    fn endpoint_path_prefix_is_preserved() {
        let conf = config("https://rancher.example.com/k8s/clusters/c-1");
        let url = make_url(&conf, Prometheus, Some("ns"), Some("p")).expect("failed to build url");
        assert_eq!(
            "https://rancher.example.com/k8s/clusters/c-1/apis/monitoring.coreos.com/v1/namespaces/ns/prometheuses/p",
            url.as_str()
        );
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let conf = config("https://k8s.example.com");
        let url = make_url(&conf, Prometheus, Some("ns"), Some("a/b")).expect("failed to build url");
        assert!(url.as_str().ends_with("/prometheuses/a%2Fb"), "url was: {}", url);
    }

    #[test]
    fn impersonation_headers_are_added() {
        let mut conf = config("https://k8s.example.com");
        conf.impersonate = Some("jane".to_owned());
        conf.impersonate_groups = vec!["admins".to_owned(), "ops".to_owned()];
        let req = get_request(&conf, Prometheus, &ObjectIdRef::new("ns", "p"))
            .expect("failed to build request");

        assert_eq!("jane", req.headers()[IMPERSONATE_USER]);
        let groups = req
            .headers()
            .get_all(IMPERSONATE_GROUP)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(vec!["admins", "ops"], groups);
    }

    #[test]
    fn no_authorization_header_when_using_client_certificates() {
        let mut conf = config("https://k8s.example.com");
        conf.credentials = Credentials::PemPath {
            certificate_path: "client.crt".to_owned(),
            private_key_path: "client.key".to_owned(),
        };
        let req = get_request(&conf, Prometheus, &ObjectIdRef::new("ns", "p"))
            .expect("failed to build request");
        assert!(req.headers().get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn invalid_endpoint_is_an_error() {
        let conf = config("not a url");
        assert!(make_url(&conf, Prometheus, None, None).is_err());
    }
}
