//! GraphQL request carried through the chain
//!
//! A [`GraphQLRequest`] is owned by exactly one chain pass at a time. A retry
//! hands the same value, with its persisted query flags updated, to the next
//! pass, so the retry marker survives the restart.

use http::{HeaderMap, Method};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

/// Version of the persisted query extension sent to the server
pub const PERSISTED_QUERY_VERSION: u32 = 1;

/// The logical operation: document, optional name and variables
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    name: Option<String>,
    document: String,
    variables: Option<Value>,
    document_hash: String,
}

impl Operation {
    pub fn new(document: impl Into<String>) -> Self {
        let document = document.into();
        let document_hash = hex::encode(Sha256::digest(document.as_bytes()));
        Self {
            name: None,
            document,
            variables: None,
            document_hash,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn variables(&self) -> Option<&Value> {
        self.variables.as_ref()
    }

    /// Lower-case hex SHA-256 of the document
    pub fn document_hash(&self) -> &str {
        &self.document_hash
    }
}

#[derive(Debug, Clone)]
pub struct GraphQLRequest {
    id: u64,
    endpoint: String,
    operation: Operation,
    headers: HeaderMap,
    auto_persist_queries: bool,
    use_get_for_persisted_queries: bool,
    send_query_document: bool,
    is_persisted_query_retry: bool,
}

impl GraphQLRequest {
    /// With persisted queries enabled the first attempt carries only the hash;
    /// otherwise the document is always sent.
    pub fn new(
        operation: Operation,
        endpoint: impl Into<String>,
        auto_persist_queries: bool,
    ) -> Self {
        Self {
            id: 0,
            endpoint: endpoint.into(),
            operation,
            headers: HeaderMap::new(),
            auto_persist_queries,
            use_get_for_persisted_queries: false,
            send_query_document: !auto_persist_queries,
            is_persisted_query_retry: false,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_get_for_persisted_queries(mut self, enabled: bool) -> Self {
        self.use_get_for_persisted_queries = enabled;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn auto_persist_queries(&self) -> bool {
        self.auto_persist_queries
    }

    pub fn send_query_document(&self) -> bool {
        self.send_query_document
    }

    pub fn is_persisted_query_retry(&self) -> bool {
        self.is_persisted_query_retry
    }

    /// Switch to full-document mode and mark the request as a persisted query retry.
    ///
    /// Returns `true` only on the first call; the marker never transitions back.
    pub fn mark_persisted_query_retry(&mut self) -> bool {
        if self.is_persisted_query_retry {
            return false;
        }
        self.send_query_document = true;
        self.is_persisted_query_retry = true;
        true
    }

    /// GET is used only for hash-only attempts, never when the document is attached.
    pub fn http_method(&self) -> Method {
        if self.auto_persist_queries
            && self.use_get_for_persisted_queries
            && !self.send_query_document
        {
            Method::GET
        } else {
            Method::POST
        }
    }

    /// JSON body for POST requests
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        if let Some(name) = self.operation.name() {
            body.insert("operationName".to_string(), Value::from(name));
        }
        if let Some(variables) = self.operation.variables() {
            body.insert("variables".to_string(), variables.clone());
        }
        if self.send_query_document {
            body.insert(
                "query".to_string(),
                Value::from(self.operation.document()),
            );
        }
        if self.auto_persist_queries {
            body.insert("extensions".to_string(), self.extensions());
        }
        Value::Object(body)
    }

    /// URL parameters for GET requests; nested values are JSON-encoded strings
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        self.body()
            .as_object()
            .map(|body| {
                ["operationName", "variables", "query", "extensions"]
                    .into_iter()
                    .filter_map(|key| {
                        body.get(key).map(|value| match value {
                            Value::String(s) => (key, s.clone()),
                            other => (key, other.to_string()),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn extensions(&self) -> Value {
        json!({
            "persistedQuery": {
                "version": PERSISTED_QUERY_VERSION,
                "sha256Hash": self.operation.document_hash(),
            }
        })
    }
}
