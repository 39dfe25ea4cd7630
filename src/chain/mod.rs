//! Interceptor chain for GraphQL requests
//!
//! A [`RequestChain`] drives one request through an ordered list of
//! interceptors:
//! - Network fetch
//! - Status code check
//! - JSON response parsing
//! - Automatic persisted queries

use async_trait::async_trait;

use crate::{request::GraphQLRequest, response::HttpResponse};

/// A unit of chain logic
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Run this interceptor for the current pass
    ///
    /// Must return the result of exactly one of:
    /// - `chain.proceed(request, response)` - hand off to the next interceptor
    /// - `chain.retry(request)` - restart from the first interceptor
    /// - `chain.fail(error)` - end the chain with an error
    async fn intercept(
        &self,
        chain: &RequestChain,
        request: GraphQLRequest,
        response: Option<HttpResponse>,
    ) -> Next;

    /// Interceptor name for logging
    fn name(&self) -> &'static str;
}

mod interceptors;
mod provider;
mod request_chain;

pub use interceptors::{
    JsonResponseParsingInterceptor, NetworkFetchInterceptor, PersistedQueryInterceptor,
    StatusCodeInterceptor, PERSISTED_QUERY_NOT_FOUND,
};
pub use provider::{DefaultInterceptorProvider, InterceptorProvider};
pub use request_chain::{Next, RequestChain};
