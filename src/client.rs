//! GraphQL client facade
//!
//! Owns the configuration and interceptor provider, builds requests with the
//! configured defaults, and runs one [`RequestChain`] per request. Chains do
//! not share mutable state, so requests run fully in parallel.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use http::HeaderMap;
use log::{debug, error};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    chain::{DefaultInterceptorProvider, InterceptorProvider, RequestChain},
    config::ChainConfig,
    error::ChainResult,
    request::{GraphQLRequest, Operation},
    response::GraphQLResult,
    transport::{ReqwestTransport, Transport},
};

pub struct GraphQLClient {
    config: ChainConfig,
    headers: HeaderMap,
    provider: Arc<dyn InterceptorProvider>,
    next_id: AtomicU64,
}

impl GraphQLClient {
    /// Client with the default interceptors over a `reqwest` transport
    pub fn new(config: ChainConfig) -> ChainResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Client with the default interceptors over a custom transport
    pub fn with_transport(config: ChainConfig, transport: Arc<dyn Transport>) -> ChainResult<Self> {
        Self::with_provider(config, Arc::new(DefaultInterceptorProvider::new(transport)))
    }

    pub fn with_provider(
        config: ChainConfig,
        provider: Arc<dyn InterceptorProvider>,
    ) -> ChainResult<Self> {
        config.validate()?;
        let headers = config.header_map()?;
        Ok(Self {
            config,
            headers,
            provider,
            next_id: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Build a request for `operation` using the configured endpoint, headers and APQ settings
    pub fn request(&self, operation: Operation) -> GraphQLRequest {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        GraphQLRequest::new(
            operation,
            self.config.endpoint.clone(),
            self.config.auto_persist_queries,
        )
        .with_id(id)
        .with_headers(self.headers.clone())
        .with_get_for_persisted_queries(self.config.use_get_for_persisted_queries)
    }

    pub async fn fetch(&self, operation: Operation) -> ChainResult<GraphQLResult> {
        self.execute(self.request(operation)).await
    }

    pub async fn execute(&self, request: GraphQLRequest) -> ChainResult<GraphQLResult> {
        self.chain_for(&request, CancellationToken::new())
            .kickoff(request)
            .await
    }

    /// Run `request` on a background task and deliver the outcome to `completion`
    /// exactly once. Must be called within a tokio runtime.
    pub fn send<F>(&self, request: GraphQLRequest, completion: F) -> RequestHandle
    where
        F: FnOnce(ChainResult<GraphQLResult>) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let chain = self.chain_for(&request, cancel.clone());
        debug!("Request {} dispatched to background task", request.id());
        let task = tokio::spawn(chain.kickoff_with_completion(request, completion));
        RequestHandle { cancel, task }
    }

    fn chain_for(&self, request: &GraphQLRequest, cancel: CancellationToken) -> RequestChain {
        RequestChain::new(self.provider.interceptors(request), self.config.max_retries)
            .with_cancellation(cancel)
    }
}

/// Handle to a request started with [`GraphQLClient::send`]
pub struct RequestHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RequestHandle {
    /// Stop the chain. Work already in flight is discarded and the completion
    /// receives `ChainError::Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the completion has run
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!("Request task did not complete: {}", e);
        }
    }
}
