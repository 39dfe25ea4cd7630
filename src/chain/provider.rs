//! Interceptor providers assemble the interceptor list for each request

use std::sync::Arc;

use super::{
    Interceptor, JsonResponseParsingInterceptor, NetworkFetchInterceptor,
    PersistedQueryInterceptor, StatusCodeInterceptor,
};
use crate::{request::GraphQLRequest, transport::Transport};

pub trait InterceptorProvider: Send + Sync {
    /// Interceptors for `request`, in execution order
    fn interceptors(&self, request: &GraphQLRequest) -> Arc<[Arc<dyn Interceptor>]>;
}

/// Network fetch, status check, JSON parsing, then persisted queries
#[derive(Clone)]
pub struct DefaultInterceptorProvider {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
}

impl DefaultInterceptorProvider {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let interceptors: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(NetworkFetchInterceptor::new(transport)),
            Arc::new(StatusCodeInterceptor),
            Arc::new(JsonResponseParsingInterceptor),
            Arc::new(PersistedQueryInterceptor),
        ];

        Self {
            interceptors: interceptors.into(),
        }
    }
}

impl InterceptorProvider for DefaultInterceptorProvider {
    fn interceptors(&self, _request: &GraphQLRequest) -> Arc<[Arc<dyn Interceptor>]> {
        self.interceptors.clone()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{error::ChainResult, request::Operation, response::HttpResponse};

    struct NoopTransport;

    #[async_trait]
    impl Transport for NoopTransport {
        async fn send(&self, _request: &GraphQLRequest) -> ChainResult<HttpResponse> {
            unreachable!("transport is not exercised here")
        }
    }

    #[test]
    fn test_default_order() {
        let provider = DefaultInterceptorProvider::new(Arc::new(NoopTransport));
        let request = GraphQLRequest::new(Operation::new("{ a }"), "http://x/graphql", true);
        let names: Vec<&str> = provider
            .interceptors(&request)
            .iter()
            .map(|i| i.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "NetworkFetchInterceptor",
                "StatusCodeInterceptor",
                "JsonResponseParsingInterceptor",
                "PersistedQueryInterceptor",
            ]
        );
    }
}
