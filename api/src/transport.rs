//! HTTP transports
//!
//! [`ReqwestTransport`] talks to the real API; [`MockTransport`] replays
//! scripted responses so the pipeline can be exercised without a server.

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::outcome::ApiResponse;
use crate::request::Method;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Boxed future returned by transports
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ApiResponse, ApiError>> + Send + 'a>>;

/// A request with its URL resolved, ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: Method,
    /// Path (or URL) as the caller gave it
    pub path: String,
    /// Absolute URL
    pub url: String,
    /// JSON body
    pub body: Option<Value>,
    /// Extra headers
    pub headers: BTreeMap<String, String>,
}

impl PreparedRequest {
    /// `"METHOD path"`
    #[must_use]
    pub fn route(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Sends prepared requests
pub trait HttpTransport: Send + Sync {
    /// Send one request
    ///
    /// Non-success statuses resolve to [`ApiError::Status`].
    fn execute(&self, request: PreparedRequest) -> TransportFuture<'_>;
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Client with the configured timeout and JSON default headers
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the TLS backend fails to initialize.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    async fn send(&self, request: PreparedRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e, self.timeout))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(&e, self.timeout))?;

        if status.is_success() {
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))?
            };
            Ok(ApiResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            // Error pages are not always JSON; keep the text so it still reaches consumers.
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                    Value::String(String::from_utf8_lossy(&bytes).into_owned())
                })
            };
            Err(ApiError::status(status.as_u16(), body))
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: PreparedRequest) -> TransportFuture<'_> {
        Box::pin(self.send(request))
    }
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<String, VecDeque<Result<ApiResponse, ApiError>>>,
    requests: Vec<PreparedRequest>,
}

/// Scripted transport for tests
///
/// Responses are queued per route (`"GET /users"`) and consumed in order;
/// the last one queued for a route keeps answering. Routes with nothing
/// queued fail with [`ApiError::Transport`].
///
/// # Example
///
/// ```
/// use servir_api::{ApiResponse, MockTransport};
/// use serde_json::json;
///
/// let transport = MockTransport::new()
///     .with_response("GET /users", Ok(ApiResponse::ok(json!([{ "id": 1 }]))));
///
/// assert!(transport.requests().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Transport with nothing scripted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for `route`
    pub fn add_response(&self, route: impl Into<String>, result: Result<ApiResponse, ApiError>) {
        self.lock()
            .responses
            .entry(route.into())
            .or_default()
            .push_back(result);
    }

    /// Builder form of [`add_response`](Self::add_response)
    #[must_use]
    pub fn with_response(
        self,
        route: impl Into<String>,
        result: Result<ApiResponse, ApiError>,
    ) -> Self {
        self.add_response(route, result);
        self
    }

    /// Requests received so far, in order
    #[must_use]
    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn respond(&self, request: PreparedRequest) -> Result<ApiResponse, ApiError> {
        let route = request.route();
        let mut state = self.lock();
        state.requests.push(request);

        let queue = state.responses.get_mut(&route);
        match queue {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Transport(format!("no response for {route}")))),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ApiError::Transport(format!("no response for {route}")))),
            None => Err(ApiError::Transport(format!("no response for {route}"))),
        }
    }
}

impl HttpTransport for MockTransport {
    fn execute(&self, request: PreparedRequest) -> TransportFuture<'_> {
        let result = self.respond(request);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prepared(method: Method, path: &str) -> PreparedRequest {
        PreparedRequest {
            method,
            path: path.to_string(),
            url: format!("http://localhost:3000{path}"),
            body: None,
            headers: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_mock_replays_in_order_then_repeats_last() {
        let transport = MockTransport::new()
            .with_response("GET /n", Ok(ApiResponse::ok(json!(1))))
            .with_response("GET /n", Ok(ApiResponse::ok(json!(2))));

        let bodies: Vec<Value> = vec![
            transport.execute(prepared(Method::Get, "/n")).await,
            transport.execute(prepared(Method::Get, "/n")).await,
            transport.execute(prepared(Method::Get, "/n")).await,
        ]
        .into_iter()
        .filter_map(Result::ok)
        .map(|response| response.body)
        .collect();

        assert_eq!(bodies, vec![json!(1), json!(2), json!(2)]);
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_unscripted_route_fails() {
        let transport = MockTransport::new();
        let result = transport.execute(prepared(Method::Delete, "/users/1")).await;

        assert_eq!(
            result,
            Err(ApiError::Transport("no response for DELETE /users/1".to_string()))
        );
    }
}
