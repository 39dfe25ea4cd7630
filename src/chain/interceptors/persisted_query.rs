//! Automatic persisted query stage
//!
//! Runs after response parsing. When the server reports that it does not know
//! the query hash, the request is switched to full-document mode and the chain
//! is restarted once.

use async_trait::async_trait;
use log::{debug, error, warn};

use crate::{
    chain::{Interceptor, Next, RequestChain},
    error::ChainError,
    request::GraphQLRequest,
    response::HttpResponse,
};

/// Error message a server returns for an unknown query hash
pub const PERSISTED_QUERY_NOT_FOUND: &str = "PersistedQueryNotFound";

pub struct PersistedQueryInterceptor;

#[async_trait]
impl Interceptor for PersistedQueryInterceptor {
    async fn intercept(
        &self,
        chain: &RequestChain,
        mut request: GraphQLRequest,
        response: Option<HttpResponse>,
    ) -> Next {
        if !request.auto_persist_queries() {
            return chain.proceed(request, response);
        }

        let Some(result) = response.as_ref().and_then(HttpResponse::graphql_result) else {
            error!(
                "Request {}: persisted query stage received no parsed response",
                request.id()
            );
            return chain.fail(ChainError::NoParsedResponse);
        };

        if !result.has_error_message(PERSISTED_QUERY_NOT_FOUND) {
            return chain.proceed(request, response);
        }

        // The full document was already sent once; hand the errors to the caller.
        if !request.mark_persisted_query_retry() {
            warn!(
                "Request {}: server still reports {} after sending the full document",
                request.id(),
                PERSISTED_QUERY_NOT_FOUND
            );
            return chain.proceed(request, response);
        }

        debug!(
            "Request {}: hash {} not registered, retrying with full document",
            request.id(),
            request.operation().document_hash()
        );
        chain.retry(request)
    }

    fn name(&self) -> &'static str {
        "PersistedQueryInterceptor"
    }
}
