//! Request chain for GraphQL clients speaking the automatic persisted query
//! protocol.
//!
//! A request is driven through an ordered list of [`Interceptor`]s by a
//! [`RequestChain`]. Each interceptor proceeds, fails, or restarts the pass.
//! [`PersistedQueryInterceptor`] uses the restart to resend a query with its
//! full document when the server does not know the query hash.

pub mod chain;
pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;

pub use chain::{
    DefaultInterceptorProvider, Interceptor, InterceptorProvider, JsonResponseParsingInterceptor,
    NetworkFetchInterceptor, Next, PersistedQueryInterceptor, RequestChain,
    StatusCodeInterceptor, PERSISTED_QUERY_NOT_FOUND,
};
pub use client::{GraphQLClient, RequestHandle};
pub use config::{ChainConfig, ConfigError, ConfigResult};
pub use error::{ChainError, ChainResult};
pub use request::{GraphQLRequest, Operation};
pub use response::{GraphQLError, GraphQLResult, HttpResponse, ParsedResponse};
pub use transport::{ReqwestTransport, Transport};
