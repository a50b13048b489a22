//! The request pipeline entry point

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::hooks::Pipeline;
use crate::options::{Dispatcher, RequestOptions};
use crate::outcome::{ApiResponse, Outcome};
use crate::request::{Method, RequestDescriptor, ACCEPT_LANGUAGE};
use crate::signal::ApiSignal;
use crate::transport::{HttpTransport, PreparedRequest, ReqwestTransport};
use serde::Serialize;
use std::sync::Arc;

/// HTTP client that reports each call's lifecycle through a dispatcher
///
/// Calls never fail: they resolve to an [`Outcome`], and failures are
/// reported through the dispatcher as a module status, an optional error
/// event and a notification.
///
/// # Example
///
/// ```no_run
/// use servir_api::{ApiClient, ApiConfig, RequestOptions};
///
/// # async fn example() -> Result<(), servir_api::ApiError> {
/// let client = ApiClient::new(ApiConfig::from_env().unwrap_or_default())?;
/// let outcome = client
///     .get("/users", RequestOptions::new().with_module("users"))
///     .await;
///
/// if let Some(response) = outcome.response() {
///     println!("{}", response.body);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    /// Client sending real HTTP requests
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Client over an arbitrary transport
    #[must_use]
    pub fn with_transport<T>(config: ApiConfig, transport: T) -> Self
    where
        T: HttpTransport + 'static,
    {
        Self {
            config,
            transport: Arc::new(transport),
        }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `GET url`
    pub async fn get(&self, url: &str, options: RequestOptions) -> Outcome {
        self.request(RequestDescriptor::get(url), options).await
    }

    /// `POST url` with `body` serialized as JSON
    pub async fn post<B>(&self, url: &str, body: &B, options: RequestOptions) -> Outcome
    where
        B: Serialize + ?Sized,
    {
        self.send_json(RequestDescriptor::new(Method::Post, url), body, options)
            .await
    }

    /// `PUT url` with `body` serialized as JSON
    pub async fn put<B>(&self, url: &str, body: &B, options: RequestOptions) -> Outcome
    where
        B: Serialize + ?Sized,
    {
        self.send_json(RequestDescriptor::new(Method::Put, url), body, options)
            .await
    }

    /// `DELETE url`
    pub async fn delete(&self, url: &str, options: RequestOptions) -> Outcome {
        self.request(RequestDescriptor::delete(url), options).await
    }

    /// Run an arbitrary request through the pipeline
    pub async fn request(&self, request: RequestDescriptor, options: RequestOptions) -> Outcome {
        self.dispatch(request, options, None).await
    }

    async fn send_json<B>(
        &self,
        request: RequestDescriptor,
        body: &B,
        options: RequestOptions,
    ) -> Outcome
    where
        B: Serialize + ?Sized,
    {
        // A body that cannot be serialized fails like any other call.
        match serde_json::to_value(body) {
            Ok(body) => self.dispatch(request.with_body(body), options, None).await,
            Err(e) => {
                self.dispatch(request, options, Some(ApiError::Serialization(e.to_string())))
                    .await
            },
        }
    }

    #[tracing::instrument(
        skip(self, request, options, rejected),
        name = "api_request",
        fields(method = %request.method(), url = %request.url())
    )]
    async fn dispatch(
        &self,
        mut request: RequestDescriptor,
        options: RequestOptions,
        rejected: Option<ApiError>,
    ) -> Outcome {
        let dispatcher = options.dispatcher().cloned();

        if let Some(reader) = dispatcher.as_ref().and_then(Dispatcher::language_reader) {
            if let Some(language) = reader.read_language().await {
                request = request.with_header(ACCEPT_LANGUAGE, language);
            }
        }

        let pipeline = Pipeline::from_options(&options);
        emit_all(dispatcher.as_ref(), pipeline.start_signals()).await;

        metrics::counter!("api.requests.total", "method" => request.method().as_str())
            .increment(1);

        let outcome: Outcome = match rejected {
            Some(error) => Outcome::Failure(error),
            None => self.call(&request).await.into(),
        };

        match &outcome {
            Outcome::Success(response) => {
                tracing::debug!(status = response.status, "Request succeeded");
            },
            Outcome::Failure(error) => {
                metrics::counter!("api.requests.failed", "method" => request.method().as_str())
                    .increment(1);
                tracing::warn!(%error, "Request failed");
            },
        }

        emit_all(dispatcher.as_ref(), pipeline.completion_signals(&outcome)).await;
        outcome
    }

    async fn call(&self, request: &RequestDescriptor) -> Result<ApiResponse, ApiError> {
        let url = self
            .config
            .url_for(request.url())
            .map_err(ApiError::InvalidUrl)?;

        let prepared = PreparedRequest {
            method: request.method(),
            path: request.url().to_string(),
            url,
            body: request.body().cloned(),
            headers: request.headers().clone(),
        };

        tracing::trace!(route = %prepared.route(), "Sending request");
        self.transport.execute(prepared).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

async fn emit_all(dispatcher: Option<&Dispatcher>, signals: Vec<ApiSignal>) {
    let Some(dispatcher) = dispatcher else {
        return;
    };
    for signal in signals {
        tracing::trace!(kind = signal.kind(), "Emitting signal");
        dispatcher.emitter().emit(signal).await;
    }
}
