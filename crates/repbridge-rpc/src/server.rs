// crates/repbridge-rpc/src/server.rs
//
// RPC server setup: RepBridgeRpcServer and RpcConfig.
//
// A single tonic service accepts JSON-encoded requests with a method field,
// dispatches to the matching handler, and returns a JSON-encoded envelope.
// Failures carry the protocol error code and kind alongside the message.

use std::sync::Arc;
use std::time::Instant;

use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tonic::transport::Server;
use tonic::Status;

use repbridge_core::error::RepBridgeError;
use repbridge_receiver::MessageReceiver;

use crate::handlers;
use crate::middleware;

/// Fully-qualified service name.
pub const SERVICE_NAME: &str = "repbridge.rpc.BridgeService";

/// HTTP path clients POST JSON-RPC envelopes to.
pub fn call_path() -> String {
    format!("/{}/Call", SERVICE_NAME)
}

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// How long a signed admin request stays valid, in seconds.
    pub admin_signature_ttl_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
            admin_signature_ttl_secs: 300,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC Envelope
// ---------------------------------------------------------------------------

/// A JSON-RPC-style request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// The RPC method to invoke (e.g., "bridge/handle_message", "query/state").
    pub method: String,
    /// JSON-encoded parameters for the method. Absent means `{}`.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// A JSON-RPC-style response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The result data (if success).
    pub result: Option<serde_json::Value>,
    /// Error message (if not success).
    pub error: Option<String>,
    /// Protocol error code, when the failure is a `RepBridgeError`.
    #[serde(default)]
    pub error_code: Option<u32>,
    /// Protocol error kind, e.g. "ReplayedMessage".
    #[serde(default)]
    pub error_kind: Option<String>,
}

impl JsonRpcResponse {
    pub fn ok(value: serde_json::Value) -> Self {
        Self {
            success: true,
            result: Some(value),
            error: None,
            error_code: None,
            error_kind: None,
        }
    }

    pub fn failure(err: DispatchError) -> Self {
        let (code, kind) = match &err {
            DispatchError::Protocol(e) => (Some(e.code()), Some(e.kind().to_string())),
            DispatchError::InvalidRequest(_) => (None, Some("InvalidRequest".to_string())),
        };
        Self {
            success: false,
            result: None,
            error: Some(err.to_string()),
            error_code: code,
            error_kind: kind,
        }
    }
}

/// Why a call produced no result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Unknown method or params that do not fit the method.
    InvalidRequest(String),
    /// The handler rejected the call.
    Protocol(RepBridgeError),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::InvalidRequest(msg) => write!(f, "{}", msg),
            DispatchError::Protocol(e) => write!(f, "{}", e),
        }
    }
}

impl From<RepBridgeError> for DispatchError {
    fn from(e: RepBridgeError) -> Self {
        DispatchError::Protocol(e)
    }
}

// ---------------------------------------------------------------------------
// RepBridgeRpcServer
// ---------------------------------------------------------------------------

/// The RPC server for a RepBridge receiver.
#[derive(Clone)]
pub struct RepBridgeRpcServer {
    config: RpcConfig,
    receiver: Arc<MessageReceiver>,
    /// Daemon start time for uptime calculation.
    start_time: Option<Instant>,
}

impl std::fmt::Debug for RepBridgeRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepBridgeRpcServer")
            .field("config", &self.config)
            .finish()
    }
}

impl RepBridgeRpcServer {
    pub fn new(config: RpcConfig, receiver: Arc<MessageReceiver>) -> Self {
        Self {
            config,
            receiver,
            start_time: None,
        }
    }

    /// Set the daemon start time for uptime calculation.
    pub fn with_start_time(mut self, st: Instant) -> Self {
        self.start_time = Some(st);
        self
    }

    /// The dispatcher this server serves, for in-process callers.
    pub fn service(&self) -> RpcService {
        RpcService {
            receiver: self.receiver.clone(),
            admin_signature_ttl_secs: self.config.admin_signature_ttl_secs,
            start_time: self.start_time,
        }
    }

    /// Bind to the configured address and serve until the process exits.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!("RepBridge RPC server starting on {} ({})", addr, call_path());

        Server::builder()
            .accept_http1(true)
            .add_service(tonic::service::interceptor::InterceptedService::new(
                BridgeJsonRpcServer::new(self.service()),
                middleware::logging_interceptor,
            ))
            .serve(addr)
            .await?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Holds shared state and dispatches JSON-RPC calls to handlers.
#[derive(Clone)]
pub struct RpcService {
    receiver: Arc<MessageReceiver>,
    admin_signature_ttl_secs: u64,
    start_time: Option<Instant>,
}

impl RpcService {
    /// Dispatch a JSON-RPC request to the handler named by its method.
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Dispatching RPC method {}", request.method);
        let receiver = self.receiver.as_ref();
        let ttl = self.admin_signature_ttl_secs;

        let result = match request.method.as_str() {
            // Inbound boundary
            "bridge/handle_message" => {
                dispatch_handler(request.params, |r| {
                    handlers::bridge::handle_message(receiver, r)
                })
                .await
            }

            // Admin
            "admin/initialize" => {
                let now = chrono::Utc::now().timestamp();
                dispatch_handler(request.params, |r| {
                    handlers::admin::handle_initialize(receiver, r, now, ttl)
                })
                .await
            }
            "admin/set_paused" => {
                let now = chrono::Utc::now().timestamp();
                dispatch_handler(request.params, |r| {
                    handlers::admin::handle_set_paused(receiver, r, now, ttl)
                })
                .await
            }

            // Query
            "query/state" => {
                dispatch_handler(request.params, |r| {
                    handlers::query::handle_get_state(receiver, r)
                })
                .await
            }
            "query/reputation" => {
                dispatch_handler(request.params, |r| {
                    handlers::query::handle_get_reputation(receiver, r)
                })
                .await
            }

            // Node
            "node/health" => {
                let start_time = self.start_time;
                dispatch_handler(request.params, |r| {
                    handlers::node::handle_get_health(receiver, r, start_time)
                })
                .await
            }

            _ => Err(DispatchError::InvalidRequest(format!(
                "Unknown method: {}",
                request.method
            ))),
        };

        match result {
            Ok(value) => JsonRpcResponse::ok(value),
            Err(err) => JsonRpcResponse::failure(err),
        }
    }
}

/// Deserialize params into a request type, call the handler, and serialize
/// the result to JSON.
async fn dispatch_handler<Req, Resp, F, Fut>(
    params: serde_json::Value,
    handler: F,
) -> Result<serde_json::Value, DispatchError>
where
    Req: serde::de::DeserializeOwned,
    Resp: serde::Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: std::future::Future<Output = Result<Resp, RepBridgeError>>,
{
    let params = if params.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        params
    };
    let request: Req = serde_json::from_value(params)
        .map_err(|e| DispatchError::InvalidRequest(format!("Failed to deserialize request: {}", e)))?;
    let response = handler(request).await?;
    Ok(serde_json::to_value(response).map_err(RepBridgeError::from)?)
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------
// One service, one method. Request and response bodies are raw JSON
// envelopes; there is no proto codegen.

/// The tonic service wrapper: reads the body, parses the envelope, and
/// dispatches.
#[derive(Clone)]
pub struct BridgeJsonRpcServer {
    inner: RpcService,
}

impl std::fmt::Debug for BridgeJsonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeJsonRpcServer").finish()
    }
}

impl BridgeJsonRpcServer {
    fn new(inner: RpcService) -> Self {
        Self { inner }
    }
}

impl tonic::server::NamedService for BridgeJsonRpcServer {
    const NAME: &'static str = SERVICE_NAME;
}

impl<B> tower_service::Service<http::Request<B>> for BridgeJsonRpcServer
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    B::Data: Send,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let body_bytes = match collect_body(req.into_body()).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Failed to read request body: {}", e);
                    let resp = JsonRpcResponse::failure(DispatchError::InvalidRequest(format!(
                        "Failed to read request body: {}",
                        e
                    )));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => {
                    let resp = JsonRpcResponse::failure(DispatchError::InvalidRequest(format!(
                        "Invalid JSON-RPC request: {}",
                        e
                    )));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_response = inner.dispatch(rpc_request).await;
            Ok(build_response(&rpc_response))
        })
    }
}

/// Collect the body of an HTTP request into bytes.
async fn collect_body<B>(body: B) -> Result<Vec<u8>, String>
where
    B: HttpBody + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    B::Data: Send,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    loop {
        match std::future::poll_fn(|cx| HttpBody::poll_frame(body.as_mut(), cx)).await {
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    use bytes::Buf;
                    collected.extend_from_slice(data.chunk());
                }
            }
            Some(Err(e)) => return Err(e.into().to_string()),
            None => break,
        }
    }

    Ok(collected)
}

/// Build a 200 response carrying the JSON envelope.
fn build_response(envelope: &JsonRpcResponse) -> http::Response<tonic::body::BoxBody> {
    let json = serde_json::to_vec(envelope).unwrap_or_default();
    let body = tonic::body::BoxBody::new(
        http_body_util::Full::new(bytes::Bytes::from(json))
            .map_err(|e| Status::internal(format!("body error: {}", e))),
    );

    let mut response = http::Response::new(body);
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}
