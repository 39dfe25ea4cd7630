use std::{collections::HashMap, path::Path, time::Duration};

use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult};

/// Client-wide settings applied to every request chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChainConfig {
    /// GraphQL endpoint requests are sent to
    pub endpoint: String,
    /// Send a query hash first and the full document only when the server asks for it
    pub auto_persist_queries: bool,
    /// Send hash-only attempts as GET so they can be cached by CDNs
    pub use_get_for_persisted_queries: bool,
    /// Upper bound on passes restarted by a retry, across all interceptors
    pub max_retries: u32,
    pub request_timeout_secs: u64,
    /// Extra headers attached to every request
    pub headers: HashMap<String, String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4000/graphql".to_string(),
            auto_persist_queries: true,
            use_get_for_persisted_queries: false,
            max_retries: 3,
            request_timeout_secs: 30,
            headers: HashMap::new(),
        }
    }
}

impl ChainConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Load a JSON config file. Missing fields take their default values.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn with_auto_persist_queries(mut self, enabled: bool) -> Self {
        self.auto_persist_queries = enabled;
        self
    }

    pub fn with_get_for_persisted_queries(mut self, enabled: bool) -> Self {
        self.use_get_for_persisted_queries = enabled;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "endpoint".to_string(),
            });
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "endpoint".to_string(),
                value: self.endpoint.clone(),
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        // A persisted query miss costs one chain retry
        if self.auto_persist_queries && self.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_retries".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1 when persisted queries are enabled".to_string(),
            });
        }
        self.header_map().map(|_| ())
    }

    /// Convert the configured headers into a typed map, rejecting invalid names or values
    pub fn header_map(&self) -> ConfigResult<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidValue {
                    field: "headers".to_string(),
                    value: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidValue {
                    field: "headers".to_string(),
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}
