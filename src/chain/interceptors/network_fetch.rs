//! Network fetch stage: send the current attempt through the transport

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    chain::{Interceptor, Next, RequestChain},
    request::GraphQLRequest,
    response::HttpResponse,
    transport::Transport,
};

pub struct NetworkFetchInterceptor {
    transport: Arc<dyn Transport>,
}

impl NetworkFetchInterceptor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Interceptor for NetworkFetchInterceptor {
    async fn intercept(
        &self,
        chain: &RequestChain,
        request: GraphQLRequest,
        _response: Option<HttpResponse>,
    ) -> Next {
        match self.transport.send(&request).await {
            Ok(response) => chain.proceed(request, Some(response)),
            Err(e) => chain.fail(e),
        }
    }

    fn name(&self) -> &'static str {
        "NetworkFetchInterceptor"
    }
}
