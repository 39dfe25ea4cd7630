//! Response types produced by the transport and parsing stages

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single server-reported GraphQL error
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphQLError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Data with optional errors; partial errors may accompany data
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphQLResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQLError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQLResult {
    pub fn error_messages(&self) -> impl Iterator<Item = &str> {
        self.errors
            .iter()
            .flatten()
            .filter_map(|error| error.message.as_deref())
    }

    pub fn has_error_message(&self, message: &str) -> bool {
        self.error_messages().any(|m| m == message)
    }
}

/// Outcome of parsing a raw payload
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Result(GraphQLResult),
    /// Valid JSON that is not a GraphQL response
    Malformed { reason: String },
}

impl ParsedResponse {
    pub fn from_value(value: Value) -> Self {
        let Some(object) = value.as_object() else {
            return ParsedResponse::Malformed {
                reason: "response body is not a JSON object".to_string(),
            };
        };
        if !object.contains_key("data") && !object.contains_key("errors") {
            return ParsedResponse::Malformed {
                reason: "response has neither data nor errors".to_string(),
            };
        }
        match serde_json::from_value(value) {
            Ok(result) => ParsedResponse::Result(result),
            Err(e) => ParsedResponse::Malformed {
                reason: e.to_string(),
            },
        }
    }

    pub fn as_result(&self) -> Option<&GraphQLResult> {
        match self {
            ParsedResponse::Result(result) => Some(result),
            ParsedResponse::Malformed { .. } => None,
        }
    }
}

/// Raw transport response plus the parsed value once a parsing stage has run
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub parsed: Option<ParsedResponse>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            parsed: None,
        }
    }

    /// The parsed GraphQL result, if parsing ran and produced one
    pub fn graphql_result(&self) -> Option<&GraphQLResult> {
        self.parsed.as_ref().and_then(ParsedResponse::as_result)
    }
}
