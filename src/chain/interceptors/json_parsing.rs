//! JSON parsing stage: turn the raw payload into a [`ParsedResponse`]

use async_trait::async_trait;
use log::debug;

use crate::{
    chain::{Interceptor, Next, RequestChain},
    error::ChainError,
    request::GraphQLRequest,
    response::{HttpResponse, ParsedResponse},
};

pub struct JsonResponseParsingInterceptor;

#[async_trait]
impl Interceptor for JsonResponseParsingInterceptor {
    async fn intercept(
        &self,
        chain: &RequestChain,
        request: GraphQLRequest,
        response: Option<HttpResponse>,
    ) -> Next {
        let Some(mut response) = response else {
            return chain.fail(ChainError::NoHttpResponse {
                interceptor: self.name(),
            });
        };

        let value = match serde_json::from_slice::<serde_json::Value>(&response.body) {
            Ok(value) => value,
            Err(e) => return chain.fail(ChainError::Parse(e)),
        };

        let parsed = ParsedResponse::from_value(value);
        if let ParsedResponse::Malformed { reason } = &parsed {
            debug!("Request {}: malformed GraphQL response: {}", request.id(), reason);
        }
        response.parsed = Some(parsed);
        chain.proceed(request, Some(response))
    }

    fn name(&self) -> &'static str {
        "JsonResponseParsingInterceptor"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::request::Operation;

    fn chain() -> RequestChain {
        RequestChain::new(
            vec![Arc::new(JsonResponseParsingInterceptor) as Arc<dyn Interceptor>],
            0,
        )
    }

    fn request() -> GraphQLRequest {
        GraphQLRequest::new(Operation::new("{ a }"), "http://localhost/graphql", true)
    }

    async fn parse(body: &'static str) -> Next {
        JsonResponseParsingInterceptor
            .intercept(&chain(), request(), Some(HttpResponse::new(StatusCode::OK, body)))
            .await
    }

    #[tokio::test]
    async fn test_parses_data_and_errors() {
        let next = parse(r#"{"data":{"a":1},"errors":[{"message":"partial"}]}"#).await;
        assert!(next.is_proceed());
        let result = next
            .response()
            .and_then(HttpResponse::graphql_result)
            .unwrap();
        assert_eq!(result.data, Some(json!({"a": 1})));
        assert!(result.has_error_message("partial"));
    }

    #[tokio::test]
    async fn test_structural_failure_is_recorded_not_failed() {
        let next = parse(r#"{"unexpected":true}"#).await;
        assert!(next.is_proceed());
        assert!(matches!(
            next.response().unwrap().parsed,
            Some(ParsedResponse::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_json_fails() {
        let next = parse("<html>gateway timeout</html>").await;
        assert!(matches!(next.error(), Some(ChainError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_response_fails() {
        let next = JsonResponseParsingInterceptor
            .intercept(&chain(), request(), None)
            .await;
        assert!(matches!(next.error(), Some(ChainError::NoHttpResponse { .. })));
    }
}
