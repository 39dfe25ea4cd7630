//! Chain orchestrator
//!
//! Drives one request through the interceptors in order. Interceptors never
//! call each other; they return a [`Next`] and the orchestrator acts on it,
//! which keeps hand-off strictly sequential and yields exactly one terminal
//! outcome per request.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use log::{debug, error, warn};
use tokio_util::sync::CancellationToken;

use super::Interceptor;
use crate::{
    error::{ChainError, ChainResult},
    request::GraphQLRequest,
    response::{GraphQLResult, HttpResponse, ParsedResponse},
};

/// Decision returned by an interceptor. Only [`RequestChain`] can create one.
#[derive(Debug)]
pub struct Next(Step);

#[derive(Debug)]
enum Step {
    Proceed {
        request: GraphQLRequest,
        response: Option<HttpResponse>,
    },
    Retry {
        request: GraphQLRequest,
    },
    Fail(ChainError),
}

impl Next {
    pub fn is_proceed(&self) -> bool {
        matches!(self.0, Step::Proceed { .. })
    }

    pub fn is_retry(&self) -> bool {
        matches!(self.0, Step::Retry { .. })
    }

    pub fn is_fail(&self) -> bool {
        matches!(self.0, Step::Fail(_))
    }

    /// The request handed on by a proceed or retry
    pub fn request(&self) -> Option<&GraphQLRequest> {
        match &self.0 {
            Step::Proceed { request, .. } | Step::Retry { request } => Some(request),
            Step::Fail(_) => None,
        }
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        match &self.0 {
            Step::Proceed { response, .. } => response.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ChainError> {
        match &self.0 {
            Step::Fail(error) => Some(error),
            _ => None,
        }
    }
}

/// One chain instance per logical request
pub struct RequestChain {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
    cursor: usize,
    retries: u32,
    max_retries: u32,
    cancel: CancellationToken,
}

impl RequestChain {
    pub fn new(interceptors: impl Into<Arc<[Arc<dyn Interceptor>]>>, max_retries: u32) -> Self {
        Self {
            interceptors: interceptors.into(),
            cursor: 0,
            retries: 0,
            max_retries,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Index of the interceptor currently running
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of passes restarted so far
    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Hand the request and response to the next interceptor. Past the last
    /// interceptor the response becomes the final result.
    pub fn proceed(&self, request: GraphQLRequest, response: Option<HttpResponse>) -> Next {
        Next(Step::Proceed { request, response })
    }

    /// Restart from the first interceptor with this request and an empty response.
    pub fn retry(&self, request: GraphQLRequest) -> Next {
        Next(Step::Retry { request })
    }

    /// End the chain with `error`. No further interceptors run.
    pub fn fail(&self, error: ChainError) -> Next {
        Next(Step::Fail(error))
    }

    /// Run the request through the chain and return its single outcome.
    pub async fn kickoff(mut self, request: GraphQLRequest) -> ChainResult<GraphQLResult> {
        if self.interceptors.is_empty() {
            return Err(ChainError::NoInterceptors);
        }

        let id = request.id();
        let mut request = request;
        let mut response: Option<HttpResponse> = None;

        loop {
            if self.cancel.is_cancelled() {
                debug!("Request {} cancelled before interceptor {}", id, self.cursor);
                return Err(ChainError::Cancelled);
            }

            let Some(interceptor) = self.interceptors.get(self.cursor).cloned() else {
                debug!(
                    "Request {} completed after {} retries",
                    id, self.retries
                );
                return Self::finish(response);
            };

            debug!(
                "Request {} pass {} running interceptor {} ({})",
                id,
                self.retries + 1,
                self.cursor + 1,
                interceptor.name()
            );

            let next = self.run_interceptor(&interceptor, request, response).await?;
            match next.0 {
                Step::Proceed {
                    request: proceeded,
                    response: current,
                } => {
                    request = proceeded;
                    response = current;
                    self.cursor += 1;
                }
                Step::Retry { request: retried } => {
                    if self.retries >= self.max_retries {
                        warn!(
                            "Request {}: {} asked for a retry but the limit of {} was reached",
                            id,
                            interceptor.name(),
                            self.max_retries
                        );
                        return Err(ChainError::RetryLimitExceeded {
                            retries: self.retries,
                        });
                    }
                    self.retries += 1;
                    self.cursor = 0;
                    debug!(
                        "Request {}: {} restarted the chain (retry {}/{})",
                        id,
                        interceptor.name(),
                        self.retries,
                        self.max_retries
                    );
                    request = retried;
                    response = None;
                }
                Step::Fail(err) => {
                    error!(
                        "Request {}: interceptor {} ({}) failed: {}",
                        id,
                        self.cursor + 1,
                        interceptor.name(),
                        err
                    );
                    return Err(err);
                }
            }
        }
    }

    /// Run the chain and deliver the outcome to `completion` exactly once.
    pub async fn kickoff_with_completion<F>(self, request: GraphQLRequest, completion: F)
    where
        F: FnOnce(ChainResult<GraphQLResult>) + Send,
    {
        let result = self.kickoff(request).await;
        completion(result);
    }

    async fn run_interceptor(
        &self,
        interceptor: &Arc<dyn Interceptor>,
        request: GraphQLRequest,
        response: Option<HttpResponse>,
    ) -> ChainResult<Next> {
        let name = interceptor.name();
        let attempt =
            AssertUnwindSafe(async move { interceptor.intercept(self, request, response).await })
                .catch_unwind();

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!("Discarding in-flight work of {} after cancellation", name);
                Err(ChainError::Cancelled)
            }
            outcome = attempt => outcome.map_err(|payload| {
                let message = panic_message(payload.as_ref());
                error!("Interceptor {} panicked: {}", name, message);
                ChainError::InterceptorPanicked {
                    interceptor: name,
                    message,
                }
            }),
        }
    }

    fn finish(response: Option<HttpResponse>) -> ChainResult<GraphQLResult> {
        match response.and_then(|r| r.parsed) {
            Some(ParsedResponse::Result(result)) => Ok(result),
            Some(ParsedResponse::Malformed { reason }) => {
                Err(ChainError::MalformedResponse { reason })
            }
            None => Err(ChainError::NoParsedResponse),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
