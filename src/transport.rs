//! Transport seam between the chain and the network
//!
//! The network fetch interceptor talks to a [`Transport`]; the default
//! implementation is backed by a shared `reqwest::Client`.

use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use log::debug;

use crate::{
    error::ChainResult,
    request::GraphQLRequest,
    response::HttpResponse,
};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one attempt of `request` and return the raw response
    async fn send(&self, request: &GraphQLRequest) -> ChainResult<HttpResponse>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> ChainResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &GraphQLRequest) -> ChainResult<HttpResponse> {
        let method = request.http_method();
        debug!(
            "Request {}: {} {} (document attached: {})",
            request.id(),
            method,
            request.endpoint(),
            request.send_query_document()
        );

        let builder = if method == Method::GET {
            self.client
                .get(request.endpoint())
                .query(&request.query_params())
        } else {
            self.client.post(request.endpoint()).json(&request.body())
        };

        let resp = builder.headers(request.headers().clone()).send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
            parsed: None,
        })
    }
}
