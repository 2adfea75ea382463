//! The courier client.
//!
//! [`ApiClient`] combines a transport with a base endpoint, a default option
//! set and a [`HandlerRegistry`]. Clones share all four, so a handler
//! registered through one clone applies to every clone, and never to an
//! independently built client.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use courier_core::pipeline::Task;
use serde_json::Value;
use tower::util::BoxCloneService;
use tower_service::Service;

use crate::client::SyncService;
use crate::{
    Error, HandlerRegistry, Http, HttpClient, Method, Request, RequestOptions, Response,
    ResponseContext, Result,
};

/// Options accepted by [`ApiClient::init`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Base endpoint prepended to every non-direct URL.
    pub endpoint: String,
}

impl InitOptions {
    /// Options setting the endpoint.
    #[must_use]
    pub fn endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

struct ClientInner {
    transport: SyncService,
    endpoint: RwLock<String>,
    defaults: RequestOptions,
    handlers: HandlerRegistry,
}

/// HTTP client with a response-handler pipeline.
///
/// # Example
///
/// ```ignore
/// use courier::{ApiClient, HyperClient, InitOptions, RequestOptions};
/// use serde_json::json;
///
/// let client = ApiClient::new(HyperClient::builder().with_logging().build());
/// client.init(InitOptions::endpoint("https://api.example.com"));
///
/// let users = client
///     .get("/users", RequestOptions::new().params(json!({"page": 2})))
///     .await?;
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoint", &self.endpoint())
            .field("defaults", &self.inner.defaults)
            .field("handlers", &self.inner.handlers)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client over `transport`, with no endpoint, the default options and
    /// the built-in retry handler.
    #[must_use]
    pub fn new<C>(transport: C) -> Self
    where
        C: HttpClient + Clone + 'static,
    {
        Self::builder().build(transport)
    }

    /// Client over a tower service, see [`ApiClient::new`].
    #[must_use]
    pub fn from_service<S>(service: S) -> Self
    where
        S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        S::Future: Send + 'static,
    {
        Self::builder().build_service(service)
    }

    /// Create a client builder.
    #[must_use]
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Replace the base endpoint.
    ///
    /// Requests built afterwards use the new endpoint; requests already
    /// built keep their URL.
    pub fn init(&self, options: InitOptions) {
        *self
            .inner
            .endpoint
            .write()
            .unwrap_or_else(PoisonError::into_inner) = options.endpoint;
    }

    /// Current base endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.inner
            .endpoint
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Default options every request is merged over.
    #[must_use]
    pub fn defaults(&self) -> &RequestOptions {
        &self.inner.defaults
    }

    /// Response handlers of this client.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.inner.handlers
    }

    pub(crate) fn transport(&self) -> &SyncService {
        &self.inner.transport
    }

    /// Append a response handler, run after the ones already registered.
    pub fn register_response_handler(&self, handler: impl Task<ResponseContext, Error> + 'static) {
        self.inner.handlers.register(handler);
    }

    /// Build a request without sending it.
    ///
    /// # Errors
    ///
    /// See [`Http::new`].
    pub fn request(&self, method: Method, url: &str, options: RequestOptions) -> Result<Http> {
        Http::new(self.clone(), method, url, options)
    }

    /// Send a GET request.
    ///
    /// # Errors
    ///
    /// Construction errors, transport errors, handler errors, or
    /// [`Error::Status`] for a non-2xx final status.
    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<Value> {
        self.request(Method::Get, url, options)?.run().await
    }

    /// Send a POST request with the JSON `data` of `options`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn post(&self, url: &str, options: RequestOptions) -> Result<Value> {
        self.request(Method::Post, url, options)?.run().await
    }

    /// Send a PUT request with the JSON `data` of `options`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn put(&self, url: &str, options: RequestOptions) -> Result<Value> {
        self.request(Method::Put, url, options)?.run().await
    }

    /// Send a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn delete(&self, url: &str, options: RequestOptions) -> Result<Value> {
        self.request(Method::Delete, url, options)?.run().await
    }
}

/// Builder for [`ApiClient`].
#[derive(Debug)]
pub struct ApiClientBuilder {
    endpoint: String,
    defaults: RequestOptions,
    registry: Option<HandlerRegistry>,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            defaults: RequestOptions::defaults(),
            registry: None,
        }
    }
}

impl ApiClientBuilder {
    /// Set the base endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Replace the default options.
    #[must_use]
    pub fn defaults(mut self, defaults: RequestOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Use `registry` instead of a fresh [`HandlerRegistry::new`].
    #[must_use]
    pub fn registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build the client over an [`HttpClient`].
    #[must_use]
    pub fn build<C>(self, transport: C) -> ApiClient
    where
        C: HttpClient + Clone + 'static,
    {
        self.build_service(tower::service_fn(move |request: Request<Bytes>| {
            let transport = transport.clone();
            async move { transport.execute(request).await }
        }))
    }

    /// Build the client over a tower service.
    #[must_use]
    pub fn build_service<S>(self, service: S) -> ApiClient
    where
        S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        S::Future: Send + 'static,
    {
        ApiClient {
            inner: Arc::new(ClientInner {
                transport: SyncService::new(BoxCloneService::new(service)),
                endpoint: RwLock::new(self.endpoint),
                defaults: self.defaults,
                handlers: self.registry.unwrap_or_default(),
            }),
        }
    }
}
