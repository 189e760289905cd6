//! An in-process stand in for the Kubernetes api server. It serves canned responses over plain
//! http on a random local port, and records every request it receives, so that data sources can
//! be tested end to end without a cluster.
use crate::client::request::make_url;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::k8s_types::K8sType;

use hyper::header::{self, HeaderName};
use hyper::server::Server;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde_json::Value;
use tokio::sync::oneshot;

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex, MutexGuard};

/// The bearer token that clients created from `FakeApiServer::client_config` will send
pub const TEST_TOKEN: &str = "testkit-token";

/// A request as seen by the fake api server
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: StatusCode,
    body: Vec<u8>,
}

#[derive(Debug, Default)]
struct ServerState {
    responses: HashMap<String, CannedResponse>,
    requests: Vec<RecordedRequest>,
}

pub struct FakeApiServer {
    address: SocketAddr,
    state: Arc<Mutex<ServerState>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Debug for FakeApiServer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FakeApiServer")
            .field("address", &self.address)
            .finish()
    }
}

impl Drop for FakeApiServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            log::debug!("Shutting down fake api server on: {}", self.address);
            let _ = shutdown.send(());
        }
    }
}

impl FakeApiServer {
    /// Starts the server on its own thread, so it can be used from both sync and async tests.
    /// The server shuts down when this is dropped.
    pub fn start() -> Result<FakeApiServer, Error> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let address = listener.local_addr()?;

        let state = Arc::new(Mutex::new(ServerState::default()));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let server_state = state.clone();
        std::thread::Builder::new()
            .name("fake-api-server".to_owned())
            .spawn(move || {
                runtime.block_on(serve(listener, server_state, shutdown_rx));
            })?;

        log::info!("Started fake api server on: {}", address);
        Ok(FakeApiServer {
            address,
            state,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// A config for connecting to this server with a bearer token
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(format!("http://{}", self.address), TEST_TOKEN)
    }

    /// The request path that a GET for the given resource will use
    pub fn resource_path(&self, k8s_type: &K8sType, namespace: &str, name: &str) -> Result<String, Error> {
        let url = make_url(&self.client_config(), k8s_type, Some(namespace), Some(name))?;
        Ok(url.path().to_owned())
    }

    /// Serves the given resource with a 200 status, replacing any previous response for it
    pub fn add_resource(
        &self,
        k8s_type: &K8sType,
        namespace: &str,
        name: &str,
        resource: &Value,
    ) -> Result<(), Error> {
        let path = self.resource_path(k8s_type, namespace, name)?;
        let body = serde_json::to_vec(resource)?;
        self.add_response(path, StatusCode::OK, body);
        Ok(())
    }

    /// Serves the body verbatim, whether or not it's valid json
    pub fn add_raw_response(&self, path: &str, status: u16, body: impl Into<Vec<u8>>) -> Result<(), Error> {
        let status = StatusCode::from_u16(status)?;
        self.add_response(path.to_owned(), status, body.into());
        Ok(())
    }

    fn add_response(&self, path: String, status: StatusCode, body: Vec<u8>) {
        log::debug!("Fake api server will respond to: {} with status: {}", path, status);
        lock(&self.state)
            .responses
            .insert(path, CannedResponse { status, body });
    }

    /// All requests that have been received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }
}

fn lock(state: &Mutex<ServerState>) -> MutexGuard<ServerState> {
    // a panicking test may poison the lock, but the state itself is still usable
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn serve(listener: TcpListener, state: Arc<Mutex<ServerState>>, shutdown: oneshot::Receiver<()>) {
    let service = make_service_fn(move |_| {
        let state = state.clone();
        async move {
            Ok::<_, hyper::Error>(service_fn(move |request| {
                futures_util::future::ready(handle_request(&state, request))
            }))
        }
    });

    let builder = match Server::from_tcp(listener) {
        Ok(builder) => builder,
        Err(err) => {
            log::error!("Fake api server failed to listen: {:?}", err);
            return;
        }
    };
    let server = builder.serve(service).with_graceful_shutdown(async {
        let _ = shutdown.await;
    });
    if let Err(err) = server.await {
        log::error!("Fake api server failed with error: {:?}", err);
    }
}

fn handle_request(state: &Mutex<ServerState>, request: Request<Body>) -> Result<Response<Body>, http::Error> {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_owned(),
        authorization: header_value(&request, header::AUTHORIZATION),
        user_agent: header_value(&request, header::USER_AGENT),
    };
    log::debug!("Fake api server got request: {} {}", recorded.method, recorded.path);

    let mut state = lock(state);
    let response = match (request.method(), state.responses.get(&recorded.path)) {
        (&Method::GET, Some(canned)) => canned.clone(),
        _ => not_found(),
    };
    state.requests.push(recorded);

    Response::builder()
        .status(response.status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(response.body))
}

fn header_value(request: &Request<Body>, name: HeaderName) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn not_found() -> CannedResponse {
    let status = serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": "the server could not find the requested resource",
        "reason": "NotFound",
        "details": {},
        "code": 404,
    });
    CannedResponse {
        status: StatusCode::NOT_FOUND,
        body: status.to_string().into_bytes(),
    }
}
