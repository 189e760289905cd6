//! The provider owns the api server client, and hands out data sources that share it.
use crate::client::Client;
use crate::config::{ClientConfig, ProviderConfig};
use crate::crds::monitoring_coreos_com::prometheus_v1;
use crate::datasource::{DataSource, ProviderData};
use crate::error::Error;
use crate::metrics::Metrics;

use serde_json::{json, Map, Value};

use std::fmt::{self, Debug};

pub const PROVIDER_TYPE_NAME: &str = "k8s";

/// Every data source this provider knows about, unconfigured
fn all_data_sources() -> Vec<Box<dyn DataSource>> {
    vec![Box::new(prometheus_v1::data_source())]
}

pub struct Provider {
    version: String,
    metrics: Metrics,
    provider_data: Option<ProviderData>,
}

impl Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Provider")
            .field("version", &self.version)
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl Provider {
    pub fn new(version: impl Into<String>) -> Provider {
        Provider {
            version: version.into(),
            metrics: Metrics::new(),
            provider_data: None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        PROVIDER_TYPE_NAME
    }

    pub fn version(&self) -> &str {
        self.version.as_str()
    }

    pub fn is_configured(&self) -> bool {
        self.provider_data.is_some()
    }

    /// Resolves the client configuration from the given provider configuration and creates the
    /// client. Data sources that are handed out after this returns `Ok` will be configured.
    pub fn configure(&mut self, config: &ProviderConfig) -> Result<(), Error> {
        let client_config = config.resolve_client_config()?;
        self.configure_with_client_config(client_config)
    }

    pub fn configure_with_client_config(&mut self, client_config: ClientConfig) -> Result<(), Error> {
        log::debug!(
            "Configuring provider version: {} for api server: {}",
            self.version,
            client_config.api_server_endpoint
        );
        let client = Client::new(client_config, self.metrics.client_metrics())?;
        self.provider_data = Some(ProviderData {
            client,
            metrics: self.metrics.clone(),
        });
        Ok(())
    }

    pub fn data_source_names(&self) -> Vec<String> {
        all_data_sources()
            .iter()
            .map(|ds| ds.type_name(PROVIDER_TYPE_NAME))
            .collect()
    }

    /// Returns the data source with the given full type name, or `None` if there isn't one.
    /// The data source is configured if the provider is.
    pub fn data_source(&self, type_name: &str) -> Option<Box<dyn DataSource>> {
        let mut data_source = all_data_sources()
            .into_iter()
            .find(|ds| ds.type_name(PROVIDER_TYPE_NAME) == type_name)?;
        data_source.configure(self.provider_data.as_ref());
        Some(data_source)
    }

    /// The schemas of all data sources, keyed by type name
    pub fn schema_json(&self) -> Value {
        let schemas = all_data_sources()
            .iter()
            .map(|ds| (ds.type_name(PROVIDER_TYPE_NAME), ds.schema().to_json()))
            .collect::<Map<String, Value>>();
        json!({
            "provider": {
                "type_name": PROVIDER_TYPE_NAME,
                "version": self.version,
            },
            "data_source_schemas": schemas,
        })
    }

    /// Text exposition of the client and data source metrics
    pub fn metrics(&self) -> Result<String, Error> {
        let bytes = self.metrics.encode_as_text()?;
        let text = String::from_utf8(bytes)?;
        Ok(text)
    }
}
