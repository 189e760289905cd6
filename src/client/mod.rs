pub(crate) mod request;

use crate::config::{CAData, ClientConfig, Credentials};
use crate::k8s_types::K8sType;
use crate::metrics::{ClientMetrics, NO_RESPONSE_STATUS};
use crate::resource::ObjectIdRef;

use bytes::Bytes;
use http::{Request, Response, StatusCode};
use hyper::client::Client as HyperClient;
use hyper::client::HttpConnector;
use hyper::Body;
use hyper_openssl::HttpsConnector;
use openssl::pkey::PKey;
use openssl::ssl::{SslConnector, SslMethod};
use openssl::x509::X509;

use std::fs::File;
use std::io;
use std::io::Read;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug)]
pub enum Error {
    Io(hyper::Error),
    Serde(serde_json::Error),
    Http(StatusCode),
    Api(StatusCode, ApiError),
    Url(url::ParseError),
    InvalidEndpoint(String),
    Request(http::Error),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e as &(dyn std::error::Error + 'static)),
            Error::Serde(e) => Some(e as &(dyn std::error::Error + 'static)),
            Error::Api(_, e) => Some(e as &(dyn std::error::Error + 'static)),
            Error::Url(e) => Some(e as &(dyn std::error::Error + 'static)),
            Error::Request(e) => Some(e as &(dyn std::error::Error + 'static)),
            Error::Http(_) | Error::InvalidEndpoint(_) => None,
        }
    }
}

impl Error {
    pub fn http(status: StatusCode) -> Error {
        Error::Http(status)
    }

    pub fn is_not_found(&self) -> bool {
        self.is_http_status(404)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http(status) | Error::Api(status, _) => Some(*status),
            _ => None,
        }
    }

    pub fn is_http_status(&self, code: u16) -> bool {
        self.status().map(|s| s.as_u16() == code).unwrap_or(false)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::Io(ref e) => write!(f, "Io Error: {}", e),
            Error::Serde(ref e) => write!(f, "(De)Serialization error: {}", e),
            Error::Http(ref e) => write!(f, "Http Error: {}", e),
            Error::Api(ref status, ref e) => write!(f, "Http Error: {}, {}", status, e),
            Error::Url(ref e) => write!(f, "Invalid url: {}", e),
            Error::InvalidEndpoint(ref endpoint) => {
                write!(f, "Invalid api server endpoint: '{}'", endpoint)
            }
            Error::Request(ref e) => write!(f, "Invalid request: {}", e),
        }
    }
}

impl From<hyper::Error> for Error {
    fn from(e: hyper::Error) -> Error {
        Error::Io(e)
    }
}
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}
impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Error {
        Error::Url(e)
    }
}
impl From<http::Error> for Error {
    fn from(e: http::Error) -> Error {
        Error::Request(e)
    }
}

#[derive(Debug)]
struct ClientInner {
    http_client: HyperClient<HttpsConnector<HttpConnector>>,
    config: ClientConfig,
    metrics: ClientMetrics,
}

/// A cheaply cloneable handle to an api server connection pool. All clones share the same
/// connections, so a single client can serve any number of concurrent reads.
#[derive(Debug, Clone)]
pub struct Client(Arc<ClientInner>);

impl Client {
    pub fn new(mut config: ClientConfig, metrics: ClientMetrics) -> Result<Client, io::Error> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);

        let mut ssl = SslConnector::builder(SslMethod::tls())?;
        // enable http2 using alpn
        ssl.set_alpn_protos(b"\x02h2\x08http/1.1")?;
        match config.ca_data.take() {
            Some(CAData::Contents(certs)) => {
                // if the CA cert contents are provided inline, as they are from a kubeconfig file, then we need to manually
                // parse them and add them to the openssl cert store
                let decoded = decode_base64(&certs, "certificate-authority-data")?;
                let certs = X509::stack_from_pem(decoded.as_slice())?;
                let cert_store = ssl.cert_store_mut();
                for cert in certs {
                    cert_store.add_cert(cert)?;
                }
            }
            Some(CAData::File(path)) => {
                ssl.set_ca_file(path.as_str())?;
            }
            None => {}
        }

        let client_identity = match config.credentials {
            Credentials::PemPath {
                ref certificate_path,
                ref private_key_path,
            } => Some((read_file(certificate_path)?, read_file(private_key_path)?)),
            Credentials::Pem {
                ref certificate_base64,
                ref private_key_base64,
            } => Some((
                decode_base64(certificate_base64, "client-certificate-data")?,
                decode_base64(private_key_base64, "client-key-data")?,
            )),
            Credentials::Header(_) => None,
        };
        if let Some((cert_pem, key_pem)) = client_identity {
            let cert = X509::from_pem(cert_pem.as_slice())?;
            let pkey = PKey::private_key_from_pem(key_pem.as_slice())?;
            ssl.set_certificate(&*cert)?; // &* is to convert from X509 to &X509Ref where X509 impls Deref to X509Ref
            ssl.set_private_key(&*pkey)?; // same as above
            ssl.check_private_key()?; // ensures that the provided private key and certificate actually go together
        }

        if config.verify_ssl_certs {
            ssl.set_verify(openssl::ssl::SslVerifyMode::PEER);
        } else {
            log::warn!("TLS Certificate verifification has been disabled! All connections to the Kubernetes api server will be insecure!");
            ssl.set_verify(openssl::ssl::SslVerifyMode::NONE);
        }

        let https = HttpsConnector::with_connector(http, ssl)?;

        let client = HyperClient::builder().build(https);

        let inner = ClientInner {
            http_client: client,
            config,
            metrics,
        };
        Ok(Client(Arc::new(inner)))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.0.config
    }

    /// Gets the raw body of the resource with the given type and id. Any non-2xx response is
    /// returned as an error, including 404.
    pub async fn get_resource_bytes(
        &self,
        k8s_type: &K8sType,
        id: &ObjectIdRef<'_>,
    ) -> Result<Bytes, Error> {
        let req = request::get_request(&self.0.config, k8s_type, id)?;
        self.get_response_bytes(req).await
    }

    async fn get_response_bytes(&self, req: Request<Body>) -> Result<Bytes, Error> {
        let method = req.method().to_string();
        let uri = req.uri().to_string();
        let start_time = Instant::now();

        let response = self
            .private_execute_request(start_time, method.as_str(), uri.as_str(), req)
            .await?;

        let status_code = response.status().as_u16();
        let result = Client::read_body(response).await;
        let success = result.is_ok();
        let duration = start_time.elapsed().as_millis();
        log::debug!(
            "Finished {} request to: {}, status: {}, total_duration: {}ms, success: {}",
            method,
            uri,
            status_code,
            duration,
            success
        );
        result
    }

    async fn private_execute_request(
        &self,
        start_time: Instant,
        method: &str,
        uri: &str,
        req: Request<Body>,
    ) -> Result<Response<Body>, Error> {
        log::debug!("Starting {} request to: {}", method, uri);
        let timer = self.0.metrics.request_started();
        let result = self.0.http_client.request(req).await;
        let duration = start_time.elapsed().as_millis();
        timer.observe_duration();
        match result {
            Ok(resp) => {
                let status_code = resp.status().as_u16();
                self.0
                    .metrics
                    .request_finished(method, resp.status().as_str());
                log::debug!(
                    "Response status received for {} to: {}, status: {}, duration: {}ms",
                    method,
                    uri,
                    status_code,
                    duration
                );
                Ok(resp)
            }
            Err(err) => {
                self.0.metrics.request_finished(method, NO_RESPONSE_STATUS);
                log::error!(
                    "Failed to execute {} request to: {}, err: {}",
                    method,
                    uri,
                    err
                );
                Err(err.into())
            }
        }
    }

    async fn read_body(response: Response<Body>) -> Result<Bytes, Error> {
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;
        if log::log_enabled!(log::Level::Trace) {
            let as_str = String::from_utf8_lossy(body.as_ref());
            log::trace!("Got response body: {}", as_str);
        }

        if status.is_success() {
            Ok(body)
        } else {
            Err(error_from_response(status, body.as_ref()))
        }
    }
}

/// Builds the error for a non-2xx response. The api server returns a `Status` object for most
/// failures, which carries a much more useful message than the status code alone.
fn error_from_response(status: StatusCode, body: &[u8]) -> Error {
    match serde_json::from_slice::<ApiError>(body) {
        Ok(api_error) => {
            log::error!("Response status: {}, {}", status, api_error);
            Error::Api(status, api_error)
        }
        Err(_) => {
            if let Ok(as_str) = std::str::from_utf8(body) {
                log::error!("Response status: {}, body: {}", status, as_str);
            } else {
                log::error!(
                    "Response status: {}, binary body with {} bytes",
                    status,
                    body.len()
                );
            }
            Error::http(status)
        }
    }
}

fn read_file(path: &str) -> Result<Vec<u8>, io::Error> {
    let mut file = File::open(path)?;
    let mut content = vec![];
    file.read_to_end(&mut content)?;
    Ok(content)
}

fn decode_base64(value: &str, field_name: &str) -> Result<Vec<u8>, io::Error> {
    base64::decode(value.trim()).map_err(|err| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Invalid base64 content of {}: {}", field_name, err),
        )
    })
}

/// The `Status` object that the api server returns along with error responses
#[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
pub struct ApiError {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reason: String,
    pub code: u16,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Api Error: status: '{}', code: {}, reason: '{}', message: '{}'",
            self.status, self.code, self.reason, self.message
        )
    }
}
impl std::error::Error for ApiError {}
