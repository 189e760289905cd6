//! Data sources read a single Kubernetes custom resource and expose it as state.
//!
//! Every CRD is read the same way, so there is a single implementation, `CrdDataSource`, that
//! is generic over a `CustomResource` declaration. A declaration supplies the `K8sType` used to
//! build request urls, a description, and the `Spec` model, whose `ToAttribute` impl drives the
//! schema and the projection of the response onto state.
use crate::client::{Client, Error as ClientError};
use crate::diagnostics::Diagnostics;
use crate::k8s_types::K8sType;
use crate::metrics::{DataSourceMetrics, Metrics};
use crate::resource::ObjectIdRef;
use crate::schema::{Attribute, AttributeType, Schema, ToAttribute};

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use std::fmt::{self, Debug};
use std::marker::PhantomData;

const UNCONFIGURED_CLIENT: &str = "Unconfigured client";
const MISSING_ATTRIBUTE: &str = "Missing required attribute";
const GET_FAILED: &str = "Unable to GET resource";
const UNMARSHAL_FAILED: &str = "Unable to unmarshal resource";
const SET_STATE_FAILED: &str = "Unable to set state";
const UNEXPECTED_KIND: &str = "Unexpected resource kind";

/// Everything a data source needs once the provider has been configured
#[derive(Debug, Clone)]
pub struct ProviderData {
    pub client: Client,
    pub metrics: Metrics,
}

/// The configuration of a data source, shaped like its state. Only `metadata.name` and
/// `metadata.namespace` are read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRequest {
    pub config: Value,
}

impl ReadRequest {
    pub fn new(config: Value) -> ReadRequest {
        ReadRequest { config }
    }

    /// Convenience for building the configuration from a namespace and name
    pub fn for_resource(namespace: &str, name: &str) -> ReadRequest {
        ReadRequest::new(serde_json::json!({
            "metadata": {
                "namespace": namespace,
                "name": name,
            }
        }))
    }
}

/// The result of a read. `state` is only set when there are no error diagnostics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadResponse {
    pub state: Option<Value>,
    pub diagnostics: Diagnostics,
}

impl ReadResponse {
    fn failed(diagnostics: Diagnostics) -> ReadResponse {
        ReadResponse {
            state: None,
            diagnostics,
        }
    }
}

pub trait DataSource: Send + Sync {
    /// The full type name of this data source, given the type name of the provider
    fn type_name(&self, provider_type_name: &str) -> String;

    fn schema(&self) -> Schema;

    /// Stores the provider data. Called with `None` before the provider itself is configured.
    fn configure(&mut self, provider_data: Option<&ProviderData>);

    fn read<'a>(&'a self, request: ReadRequest) -> BoxFuture<'a, ReadResponse>;
}

/// Declares a custom resource type that can be read by a `CrdDataSource`
pub trait CustomResource: 'static {
    type Spec: ToAttribute + Serialize + DeserializeOwned + Send;

    fn k8s_type() -> &'static K8sType;

    fn description() -> &'static str;
}

/// The parts of a resource's metadata that are kept in state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A custom resource as returned by the api server. Anything other than these fields, for
/// example `status`, is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDocument<S> {
    #[serde(rename = "apiVersion", default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: ResourceMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<S>,
}

pub struct CrdDataSource<C: CustomResource> {
    provider_data: Option<ProviderData>,
    metrics: Option<DataSourceMetrics>,
    _phantom: PhantomData<fn() -> C>,
}

impl<C: CustomResource> Debug for CrdDataSource<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CrdDataSource")
            .field("k8s_type", C::k8s_type())
            .field("configured", &self.provider_data.is_some())
            .finish()
    }
}

impl<C: CustomResource> Default for CrdDataSource<C> {
    fn default() -> Self {
        CrdDataSource::new()
    }
}

impl<C: CustomResource> CrdDataSource<C> {
    pub fn new() -> Self {
        CrdDataSource {
            provider_data: None,
            metrics: None,
            _phantom: PhantomData,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider_data.is_some()
    }

    /// Performs the read. This is the same as `DataSource::read`, but without boxing the future.
    pub async fn read_resource(&self, request: ReadRequest) -> ReadResponse {
        let response = self.do_read(request).await;
        if response.diagnostics.has_error() {
            if let Some(metrics) = self.metrics.as_ref() {
                metrics.read_failed();
            }
        }
        response
    }

    async fn do_read(&self, request: ReadRequest) -> ReadResponse {
        let k8s_type = C::k8s_type();
        let mut diagnostics = Diagnostics::new();

        let client = match self.provider_data.as_ref() {
            Some(data) => data.client.clone(),
            None => {
                diagnostics.add_error(
                    UNCONFIGURED_CLIENT,
                    format!(
                        "The provider has not been configured, so there is no client to read {} with. Configure the provider before reading data sources.",
                        k8s_type
                    ),
                );
                return ReadResponse::failed(diagnostics);
            }
        };
        if let Some(metrics) = self.metrics.as_ref() {
            metrics.read_started();
        }

        let name = required_string(&request.config, "name", &mut diagnostics);
        let namespace = required_string(&request.config, "namespace", &mut diagnostics);
        let id = match (namespace, name) {
            (Some(namespace), Some(name)) => ObjectIdRef::new(namespace, name),
            _ => return ReadResponse::failed(diagnostics),
        };

        log::debug!("Reading {} with id: {}", k8s_type, id);
        let body = match client.get_resource_bytes(k8s_type, &id).await {
            Ok(body) => body,
            Err(err) => {
                log::debug!("GET for {} {} failed: {}", k8s_type, id, err);
                diagnostics.add_error(GET_FAILED, get_error_detail(&id, &err));
                return ReadResponse::failed(diagnostics);
            }
        };

        let document: ResourceDocument<C::Spec> = match serde_json::from_slice(body.as_ref()) {
            Ok(doc) => doc,
            Err(err) => {
                diagnostics.add_error(
                    UNMARSHAL_FAILED,
                    format!(
                        "An unexpected error occurred while parsing the resource read response. Please report this issue to the provider developers.\n\nJSON Error: {}",
                        err
                    ),
                );
                return ReadResponse::failed(diagnostics);
            }
        };

        if let Some(kind) = document.kind.as_deref() {
            if kind != k8s_type.kind {
                diagnostics.add_warning(
                    UNEXPECTED_KIND,
                    format!(
                        "Expected a resource of kind '{}', but the api server returned kind '{}'.",
                        k8s_type.kind, kind
                    ),
                );
            }
        }

        match self.to_state(id.state_id(), &document) {
            Ok(state) => {
                log::trace!("Read {} {} into state: {}", k8s_type, id, state);
                ReadResponse {
                    state: Some(state),
                    diagnostics,
                }
            }
            Err(err) => {
                diagnostics.add_error(
                    SET_STATE_FAILED,
                    format!(
                        "An unexpected error occurred while writing the resource to state. Please report this issue to the provider developers.\n\nState Error: {}",
                        err
                    ),
                );
                ReadResponse::failed(diagnostics)
            }
        }
    }

    fn to_state(
        &self,
        id: String,
        document: &ResourceDocument<C::Spec>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let mut value = serde_json::to_value(document)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("id".to_owned(), Value::String(id));
        }
        let state = resource_schema::<C>().project(&value)?;
        Ok(state)
    }
}

fn get_error_detail(id: &ObjectIdRef<'_>, err: &ClientError) -> String {
    if err.is_not_found() {
        format!("Unable to read resource {}: it does not exist.\n\nGET Error: {}", id, err)
    } else {
        format!(
            "An unexpected error occurred while reading the resource. Please report this issue to the provider developers.\n\nGET Error: {}",
            err
        )
    }
}

/// Reads `metadata.<field>` from the configuration, adding a diagnostic if it is not a string
fn required_string<'a>(config: &'a Value, field: &str, diagnostics: &mut Diagnostics) -> Option<&'a str> {
    let value = config
        .get("metadata")
        .and_then(|metadata| metadata.get(field))
        .and_then(Value::as_str);
    if value.is_none() {
        let path = format!("metadata.{}", field);
        diagnostics.add_attribute_error(
            path.as_str(),
            MISSING_ATTRIBUTE,
            format!(
                "The argument \"{}\" is required, but no definition was found.",
                path
            ),
        );
    }
    value
}

fn resource_schema<C: CustomResource>() -> Schema {
    let metadata = AttributeType::Object(vec![
        Attribute::required("name", AttributeType::String)
            .with_description("Unique name of the resource within its namespace."),
        Attribute::required("namespace", AttributeType::String)
            .with_description("Namespace that the resource lives in."),
    ]);

    Schema::new(C::description())
        .with_attribute(
            Attribute::computed("id", AttributeType::String)
                .with_description("Identifier of the resource in the form 'name/namespace'."),
        )
        .with_attribute(
            Attribute::computed("api_version", AttributeType::String)
                .with_json_name("apiVersion")
                .with_description("The API group and version of the resource."),
        )
        .with_attribute(
            Attribute::computed("kind", AttributeType::String)
                .with_description("The kind of the resource."),
        )
        .with_attribute(
            Attribute::required("metadata", metadata)
                .with_description("Data that helps uniquely identify the resource."),
        )
        .with_attribute(
            Attribute::computed("spec", <C::Spec as ToAttribute>::attribute_type())
                .with_description("The desired state of the resource as stored in the cluster."),
        )
}

impl<C: CustomResource> DataSource for CrdDataSource<C> {
    fn type_name(&self, provider_type_name: &str) -> String {
        format!("{}{}", provider_type_name, C::k8s_type().type_name_suffix())
    }

    fn schema(&self) -> Schema {
        resource_schema::<C>()
    }

    fn configure(&mut self, provider_data: Option<&ProviderData>) {
        if let Some(data) = provider_data {
            self.metrics = Some(data.metrics.data_source_metrics(C::k8s_type()));
            self.provider_data = Some(data.clone());
        }
    }

    fn read<'a>(&'a self, request: ReadRequest) -> BoxFuture<'a, ReadResponse> {
        Box::pin(self.read_resource(request))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    static WIDGET: &K8sType = &K8sType {
        group: "example.com",
        version: "v1alpha1",
        kind: "Widget",
        plural_kind: "widgets",
    };

    schema_object! {
        pub struct WidgetSpec {
            /// How many widgets to run.
            replicas: i64 => "replicas",
            labels: std::collections::BTreeMap<String, String> => "podLabels",
        }
    }

    struct Widget;

    impl CustomResource for Widget {
        type Spec = WidgetSpec;

        fn k8s_type() -> &'static K8sType {
            WIDGET
        }

        fn description() -> &'static str {
            "Widgets for testing"
        }
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("failed to create runtime")
            .block_on(future)
    }

    #[test]
    fn type_name_is_derived_from_the_k8s_type() {
        let ds = CrdDataSource::<Widget>::new();
        assert_eq!("k8s_example_com_widget_v1alpha1", ds.type_name("k8s"));
    }

    #[test]
    fn schema_marks_metadata_inputs_as_required() {
        let schema = CrdDataSource::<Widget>::new().schema();
        assert_eq!("Widgets for testing", schema.description);
        for path in [["metadata", "name"], ["metadata", "namespace"]].iter() {
            let attr = schema.attribute_at(path).expect("attribute missing");
            assert!(attr.is_required(), "{:?} should be required", path);
        }
        let replicas = schema
            .attribute_at(&["spec", "replicas"])
            .expect("replicas missing");
        assert!(!replicas.is_required());
        assert_eq!("How many widgets to run.", replicas.description);
    }

    #[test]
    fn read_without_configuration_reports_unconfigured_client() {
        let ds = CrdDataSource::<Widget>::new();
        let response = block_on(ds.read(ReadRequest::for_resource("ns", "w")));
        assert!(response.state.is_none());
        let errors = response.diagnostics.errors().collect::<Vec<_>>();
        assert_eq!(1, errors.len());
        assert_eq!(UNCONFIGURED_CLIENT, errors[0].summary);
    }

    #[test]
    fn required_string_reports_each_missing_field() {
        let mut diagnostics = Diagnostics::new();
        let config = json!({"metadata": {"name": "w", "namespace": null}});
        assert_eq!(Some("w"), required_string(&config, "name", &mut diagnostics));
        assert_eq!(None, required_string(&config, "namespace", &mut diagnostics));
        let errors = diagnostics.errors().collect::<Vec<_>>();
        assert_eq!(1, errors.len());
        assert_eq!(Some("metadata.namespace"), errors[0].attribute.as_deref());
        assert_eq!(MISSING_ATTRIBUTE, errors[0].summary);
    }

    #[test]
    fn not_found_detail_names_the_resource() {
        let id = ObjectIdRef::new("ns", "w");
        let detail = get_error_detail(&id, &ClientError::http(http::StatusCode::NOT_FOUND));
        assert!(detail.starts_with("Unable to read resource ns/w"), "detail was: {}", detail);
        assert!(!detail.contains("report this issue"));

        let detail = get_error_detail(&id, &ClientError::http(http::StatusCode::BAD_GATEWAY));
        assert!(detail.contains("report this issue"), "detail was: {}", detail);
    }

    #[test]
    fn document_without_spec_deserializes_for_any_spec_type() {
        let document: ResourceDocument<WidgetSpec> = serde_json::from_value(json!({
            "apiVersion": "example.com/v1alpha1",
            "kind": "Widget",
            "metadata": {"name": "w", "namespace": "ns"}
        }))
        .expect("failed to deserialize document");
        assert_eq!(None, document.spec);
    }

    #[test]
    fn state_includes_id_and_projected_spec() {
        let ds = CrdDataSource::<Widget>::new();
        let document: ResourceDocument<WidgetSpec> = serde_json::from_value(json!({
            "apiVersion": "example.com/v1alpha1",
            "kind": "Widget",
            "metadata": {"name": "w", "namespace": "ns", "uid": "1234"},
            "spec": {"replicas": 3},
            "status": {"ready": true}
        }))
        .expect("failed to deserialize document");

        let state = ds
            .to_state("w/ns".to_owned(), &document)
            .expect("failed to build state");
        let expected = json!({
            "id": "w/ns",
            "api_version": "example.com/v1alpha1",
            "kind": "Widget",
            "metadata": {"name": "w", "namespace": "ns"},
            "spec": {"replicas": 3, "labels": null}
        });
        assert_eq!(expected, state);
    }
}
