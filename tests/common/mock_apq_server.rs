// Mock GraphQL server implementing the persisted query protocol
#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    thread,
};

use actix_web::{
    dev::ServerHandle,
    http::{Method, StatusCode},
    web, App, HttpRequest, HttpResponse, HttpServer,
};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

/// How the mock server answers
#[derive(Clone, Debug)]
pub enum MockMode {
    /// Remember hashes sent with their document, answer known hashes
    Registering,
    /// Answer every hash-carrying request with PersistedQueryNotFound
    AlwaysNotFound,
    /// Reply with this status code and a plain-text body
    Status(u16),
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub payload: Value,
}

impl RecordedRequest {
    pub fn has_query(&self) -> bool {
        self.payload.get("query").is_some()
    }

    pub fn hash(&self) -> Option<&str> {
        self.payload
            .pointer("/extensions/persistedQuery/sha256Hash")
            .and_then(Value::as_str)
    }
}

struct ServerState {
    mode: MockMode,
    registered: Mutex<HashSet<String>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockApqServer {
    pub endpoint: String,
    state: web::Data<ServerState>,
    handle: ServerHandle,
}

pub fn sha256_hex(document: &str) -> String {
    hex::encode(Sha256::digest(document.as_bytes()))
}

impl MockApqServer {
    pub async fn start(mode: MockMode) -> Result<Self, Box<dyn std::error::Error>> {
        let state = web::Data::new(ServerState {
            mode,
            registered: Mutex::new(HashSet::new()),
            requests: Mutex::new(Vec::new()),
        });
        let app_state = state.clone();
        let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();

        // The server runs on its own actix system so tests can use any tokio flavor.
        thread::spawn(move || {
            actix_web::rt::System::new().block_on(async move {
                let server = HttpServer::new(move || {
                    App::new()
                        .app_data(app_state.clone())
                        .route("/graphql", web::route().to(graphql_handler))
                })
                .workers(1)
                .bind(("127.0.0.1", 0));

                let server = match server {
                    Ok(server) => server,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let port = server.addrs()[0].port();
                let server = server.run();
                let _ = ready_tx.send(Ok((port, server.handle())));

                if let Err(e) = server.await {
                    eprintln!("Mock server error: {}", e);
                }
            });
        });

        let (port, handle) = ready_rx.await??;
        Ok(Self {
            endpoint: format!("http://127.0.0.1:{}/graphql", port),
            state,
            handle,
        })
    }

    /// Mark a document as already persisted on the server
    pub fn register(&self, document: &str) {
        self.state
            .registered
            .lock()
            .unwrap()
            .insert(sha256_hex(document));
    }

    pub fn is_registered(&self, document: &str) -> bool {
        self.state
            .registered
            .lock()
            .unwrap()
            .contains(&sha256_hex(document))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

async fn graphql_handler(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<ServerState>,
) -> HttpResponse {
    let payload = if req.method() == Method::GET {
        match web::Query::<HashMap<String, String>>::from_query(req.query_string()) {
            Ok(params) => payload_from_params(params.into_inner()),
            Err(_) => return HttpResponse::BadRequest().body("invalid query string"),
        }
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(payload) => payload,
            Err(_) => return HttpResponse::BadRequest().body("invalid JSON body"),
        }
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        method: req.method().to_string(),
        payload: payload.clone(),
    });

    let hash = payload
        .pointer("/extensions/persistedQuery/sha256Hash")
        .and_then(Value::as_str)
        .map(str::to_string);
    let query = payload.get("query").and_then(Value::as_str);

    match &state.mode {
        MockMode::Status(code) => {
            let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            HttpResponse::build(status).body("mock failure")
        }
        MockMode::AlwaysNotFound if hash.is_some() => not_found(),
        MockMode::AlwaysNotFound => data(&payload),
        MockMode::Registering => match (hash, query) {
            (Some(hash), Some(query)) => {
                if sha256_hex(query) != hash {
                    return HttpResponse::Ok().json(json!({
                        "errors": [{"message": "provided sha does not match query"}]
                    }));
                }
                state.registered.lock().unwrap().insert(hash);
                data(&payload)
            }
            (Some(hash), None) => {
                if state.registered.lock().unwrap().contains(&hash) {
                    data(&payload)
                } else {
                    not_found()
                }
            }
            (None, Some(_)) => data(&payload),
            (None, None) => HttpResponse::BadRequest().body("missing query"),
        },
    }
}

fn payload_from_params(params: HashMap<String, String>) -> Value {
    let mut payload = serde_json::Map::new();
    for (key, value) in params {
        let value = match key.as_str() {
            "variables" | "extensions" => serde_json::from_str(&value).unwrap_or(Value::Null),
            _ => Value::String(value),
        };
        payload.insert(key, value);
    }
    Value::Object(payload)
}

fn not_found() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "errors": [{
            "message": "PersistedQueryNotFound",
            "extensions": {"code": "PERSISTED_QUERY_NOT_FOUND"}
        }]
    }))
}

fn data(payload: &Value) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "data": {
            "operationName": payload.get("operationName").cloned().unwrap_or(Value::Null),
            "variables": payload.get("variables").cloned().unwrap_or(Value::Null),
        }
    }))
}
