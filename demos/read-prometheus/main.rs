//! Reads a single `Prometheus` resource and prints its state as json.
//!
//! Without `--kubeconfig`, the in-cluster service account is tried first, then the default
//! kubeconfig file.
use clap::Parser;
use k8s_crd_datasource::prelude::*;

use std::path::PathBuf;
use std::process::exit;

const DATA_SOURCE: &str = "k8s_monitoring_coreos_com_prometheus_v1";

#[derive(Parser)]
#[command(name = "read-prometheus", about = "Reads a Prometheus resource and prints its state")]
struct Cli {
    /// Namespace of the Prometheus resource
    namespace: String,

    /// Name of the Prometheus resource
    name: String,

    /// Path to a kubeconfig file
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use instead of the current context
    #[arg(long)]
    context: Option<String>,
}

impl Cli {
    fn provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::default();
        if let Some(path) = self.kubeconfig.as_ref() {
            config = config.with_kubeconfig(path.clone());
        }
        if let Some(context) = self.context.as_ref() {
            config = config.with_context(context.as_str());
        }
        config
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut provider = Provider::new(env!("CARGO_PKG_VERSION"));
    if let Err(err) = provider.configure(&cli.provider_config()) {
        eprintln!("Failed to configure provider: {}", err);
        exit(1);
    }
    let data_source = match provider.data_source(DATA_SOURCE) {
        Some(ds) => ds,
        None => {
            eprintln!("No data source named: {}", DATA_SOURCE);
            exit(1);
        }
    };

    let response = data_source
        .read(ReadRequest::for_resource(cli.namespace.as_str(), cli.name.as_str()))
        .await;
    for diagnostic in response.diagnostics.iter() {
        eprintln!("{}", diagnostic);
    }
    match response.state {
        Some(state) => match k8s_crd_datasource::serde_json::to_string_pretty(&state) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("Failed to format state: {}", err);
                exit(1);
            }
        },
        None => exit(1),
    }
}
