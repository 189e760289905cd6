//! Typed, read-only data sources for Kubernetes Custom Resources.
//!
//! A data source fetches a single custom resource by namespace and name, and exposes it as state:
//! a json object with snake_case attribute names, described by a `Schema`. Each supported CRD
//! version is declared once with the `schema_object!` macro, which generates both the serde model
//! and the schema, and is read through the generic `CrdDataSource`.
//!
//! Reading a `Prometheus`:
//! ```no_run
//! use k8s_crd_datasource::prelude::*;
//!
//! # async fn read() -> Result<(), Error> {
//! let mut provider = Provider::new("0.1.0");
//! provider.configure(&ProviderConfig::default())?;
//!
//! let data_source = provider
//!     .data_source("k8s_monitoring_coreos_com_prometheus_v1")
//!     .expect("prometheus data source is always registered");
//! let response = data_source
//!     .read(ReadRequest::for_resource("monitoring", "k8s"))
//!     .await;
//! for diagnostic in response.diagnostics.iter() {
//!     eprintln!("{}", diagnostic);
//! }
//! if let Some(state) = response.state {
//!     println!("replicas: {}", state["spec"]["replicas"]);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Configuration is resolved from an explicit kubeconfig file, the in-cluster service account, or
//! the default kubeconfig, in that order. See `ProviderConfig`.

#[macro_use]
extern crate serde_derive;

pub mod client;
pub mod config;
pub mod error;
pub mod k8s_types;
pub mod metrics;
pub mod resource;
#[macro_use]
pub mod schema;
pub mod crds;
pub mod datasource;
pub mod diagnostics;
pub mod provider;

#[cfg(feature = "testkit")]
pub mod testkit;

pub use serde;
pub use serde_json;

pub mod prelude {
    pub use crate::config::{ClientConfig, ProviderConfig};
    pub use crate::datasource::{DataSource, ReadRequest, ReadResponse};
    pub use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
    pub use crate::error::Error;
    pub use crate::k8s_types::{self, K8sType};
    pub use crate::provider::Provider;
    pub use crate::schema::Schema;
}
