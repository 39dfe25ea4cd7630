mod json_parsing;
mod network_fetch;
mod persisted_query;
mod status_code;

pub use json_parsing::JsonResponseParsingInterceptor;
pub use network_fetch::NetworkFetchInterceptor;
pub use persisted_query::{PersistedQueryInterceptor, PERSISTED_QUERY_NOT_FOUND};
pub use status_code::StatusCodeInterceptor;
