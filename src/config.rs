pub mod kubeconfig;

use self::kubeconfig::{KubeConfig, KubeConfigError};

use std::fmt::{self, Debug};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

pub const DEFAULT_USER_AGENT: &str = concat!("k8s-crd-datasource/", env!("CARGO_PKG_VERSION"));

const SERVICE_ACCOUNT_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
const SERVICE_ACCOUNT_CA_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";
const API_SERVER_HOSTNAME: &str = "kubernetes.default.svc";
const SERVICE_HOST_ENV: &str = "KUBERNETES_SERVICE_HOST";
const SERVICE_PORT_ENV: &str = "KUBERNETES_SERVICE_PORT";

/// Certificate authority data used to verify the api server's certificate
#[derive(Debug, Clone, PartialEq)]
pub enum CAData {
    /// path to a PEM encoded file
    File(String),
    /// base64 encoded PEM contents, as they appear in a kubeconfig file
    Contents(String),
}

/// The credentials used to authenticate with the api server.
#[derive(Clone, PartialEq)]
pub enum Credentials {
    /// The complete value of the `Authorization` header
    Header(String),
    /// Paths to a PEM encoded client certificate and private key
    PemPath {
        certificate_path: String,
        private_key_path: String,
    },
    /// Base64 encoded PEM client certificate and private key
    Pem {
        certificate_base64: String,
        private_key_base64: String,
    },
}

impl Credentials {
    pub fn bearer_token(token: &str) -> Credentials {
        Credentials::Header(format!("Bearer {}", token.trim()))
    }

    pub fn basic(username: &str, password: &str) -> Credentials {
        let encoded = base64::encode(format!("{}:{}", username, password));
        Credentials::Header(format!("Basic {}", encoded))
    }

    pub(crate) fn header_value(&self) -> Option<&str> {
        match self {
            Credentials::Header(ref value) => Some(value.as_str()),
            _ => None,
        }
    }
}

// credentials are kept out of the logs
impl Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Credentials::Header(_) => f.write_str("Header(<redacted>)"),
            Credentials::PemPath {
                certificate_path,
                private_key_path,
            } => f
                .debug_struct("PemPath")
                .field("certificate_path", certificate_path)
                .field("private_key_path", private_key_path)
                .finish(),
            Credentials::Pem { .. } => f.write_str("Pem(<redacted>)"),
        }
    }
}

/// Everything the client needs in order to talk to the api server.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_server_endpoint: String,
    pub credentials: Credentials,
    pub ca_data: Option<CAData>,
    pub verify_ssl_certs: bool,
    pub impersonate: Option<String>,
    pub impersonate_groups: Vec<String>,
    pub user_agent: String,
}

impl ClientConfig {
    /// Creates a config for the given endpoint that authenticates using a bearer token
    pub fn new(api_server_endpoint: impl Into<String>, token: &str) -> ClientConfig {
        ClientConfig {
            api_server_endpoint: api_server_endpoint.into(),
            credentials: Credentials::bearer_token(token),
            ca_data: None,
            verify_ssl_certs: true,
            impersonate: None,
            impersonate_groups: Vec::new(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Creates a config using the service account that's mounted into every pod. This is what you'll
    /// want when running inside a Kubernetes cluster.
    pub fn from_service_account(user_agent: impl Into<String>) -> Result<ClientConfig, io::Error> {
        let mut token_file = File::open(SERVICE_ACCOUNT_TOKEN_PATH)?;
        let mut service_account_token = String::new();
        token_file.read_to_string(&mut service_account_token)?;

        let ca_data = if Path::new(SERVICE_ACCOUNT_CA_PATH).exists() {
            Some(CAData::File(SERVICE_ACCOUNT_CA_PATH.to_owned()))
        } else {
            None
        };

        let api_server_endpoint = service_endpoint(
            std::env::var(SERVICE_HOST_ENV).ok(),
            std::env::var(SERVICE_PORT_ENV).ok(),
        );
        log::debug!(
            "Using service account credentials with api server: {}",
            api_server_endpoint
        );
        Ok(ClientConfig {
            api_server_endpoint,
            credentials: Credentials::bearer_token(&service_account_token),
            ca_data,
            verify_ssl_certs: true,
            impersonate: None,
            impersonate_groups: Vec::new(),
            user_agent: user_agent.into(),
        })
    }
}

fn service_endpoint(host: Option<String>, port: Option<String>) -> String {
    match (host, port) {
        (Some(host), Some(port)) if host.contains(':') => format!("https://[{}]:{}", host, port),
        (Some(host), Some(port)) => format!("https://{}:{}", host, port),
        _ => format!("https://{}", API_SERVER_HOSTNAME),
    }
}

/// Configuration of the provider itself. Every field is optional, and the defaults will work
/// both inside a cluster and on a workstation with a kubeconfig file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Explicit path to a kubeconfig file. When set, the service account is never consulted.
    pub kubeconfig: Option<PathBuf>,
    /// Name of the kubeconfig context to use instead of `current-context`
    pub context: Option<String>,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> ProviderConfig {
        ProviderConfig {
            kubeconfig: None,
            context: None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ProviderConfig {
    pub fn with_kubeconfig(mut self, path: impl Into<PathBuf>) -> Self {
        self.kubeconfig = Some(path.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Resolves the `ClientConfig`. An explicit kubeconfig wins, then the in-cluster service
    /// account, then the default kubeconfig location.
    pub fn resolve_client_config(&self) -> Result<ClientConfig, KubeConfigError> {
        if let Some(path) = self.kubeconfig.as_ref() {
            log::debug!("Loading kubeconfig from explicit path: {}", path.display());
            return load_with_context(self.user_agent.clone(), path, self.context.as_deref());
        }

        if self.context.is_none() {
            match ClientConfig::from_service_account(self.user_agent.clone()) {
                Ok(conf) => return Ok(conf),
                Err(err) => {
                    log::debug!(
                        "Failed to load ClientConfig from service account, so trying to load from kubeconfig: {}",
                        err
                    );
                }
            }
        }
        let path = kubeconfig::get_kubeconfig_path()?;
        load_with_context(self.user_agent.clone(), &path, self.context.as_deref())
    }
}

fn load_with_context(
    user_agent: String,
    path: &Path,
    context: Option<&str>,
) -> Result<ClientConfig, KubeConfigError> {
    let kubeconfig = KubeConfig::load_file(path)?;
    let dir = kubeconfig::parent_dir(path)?;
    match context {
        Some(ctx) => kubeconfig.create_client_config_for_context(user_agent, dir, ctx),
        None => kubeconfig.create_client_config(user_agent, dir),
    }
}
