//! Status code stage: fail the chain on non-2xx responses
//!
//! A non-2xx response whose body is a GraphQL error list is handed on, so
//! later stages can classify the errors. Some servers report an unknown
//! persisted query with a 4xx status.

use async_trait::async_trait;
use log::debug;

use crate::{
    chain::{Interceptor, Next, RequestChain},
    error::ChainError,
    request::GraphQLRequest,
    response::HttpResponse,
};

const MAX_ERROR_BODY_LEN: usize = 512;

pub struct StatusCodeInterceptor;

#[async_trait]
impl Interceptor for StatusCodeInterceptor {
    async fn intercept(
        &self,
        chain: &RequestChain,
        request: GraphQLRequest,
        response: Option<HttpResponse>,
    ) -> Next {
        let Some(response) = response else {
            return chain.fail(ChainError::NoHttpResponse {
                interceptor: self.name(),
            });
        };

        if !response.status.is_success() {
            if carries_graphql_errors(&response.body) {
                debug!(
                    "Request {}: status {} with GraphQL errors, passing on for classification",
                    request.id(),
                    response.status
                );
                return chain.proceed(request, Some(response));
            }
            let body = String::from_utf8_lossy(&response.body);
            let cut = body.char_indices().nth(MAX_ERROR_BODY_LEN).map(|(idx, _)| idx);
            let body = match cut {
                Some(idx) => format!("{}...", &body[..idx]),
                None => body.into_owned(),
            };
            return chain.fail(ChainError::InvalidStatus {
                status: response.status.as_u16(),
                body,
            });
        }

        chain.proceed(request, Some(response))
    }

    fn name(&self) -> &'static str {
        "StatusCodeInterceptor"
    }
}

fn carries_graphql_errors(body: &[u8]) -> bool {
    serde_json::from_slice::<serde_json::Value>(body)
        .map(|value| value.get("errors").is_some_and(serde_json::Value::is_array))
        .unwrap_or(false)
}
