//! In-process JSON-RPC node for exercising the HTTP provider end to end.

use axum::{Json, Router, extract::State, routing::post};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use super::mocks::RecordedRequest;

type Answer = dyn Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + Sync;

struct StubState {
    answer: Box<Answer>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// A JSON-RPC 2.0 server bound to an ephemeral localhost port.
///
/// The server is aborted when the stub is dropped.
pub struct JsonRpcStub {
    url: String,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl JsonRpcStub {
    /// Starts a stub that answers every request with `answer(method, params)`.
    ///
    /// `Err((code, message))` is sent back as a JSON-RPC error object.
    pub async fn spawn<F>(answer: F) -> std::io::Result<Self>
    where
        F: Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + Sync + 'static,
    {
        let state = Arc::new(StubState {
            answer: Box::new(answer),
            requests: Mutex::new(Vec::new()),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = Router::new()
            .route("/", post(handle_rpc))
            .with_state(Arc::clone(&state));

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            url: format!("http://{addr}/"),
            state,
            handle,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.method).collect()
    }
}

impl Drop for JsonRpcStub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_rpc(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Json<Value> {
    let method = body["method"].as_str().unwrap_or_default().to_string();
    let params = body.get("params").cloned().unwrap_or(Value::Null);
    let id = body.get("id").cloned().unwrap_or(Value::Null);

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        params: params.clone(),
    });

    let reply = match (state.answer)(&method, &params) {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        }),
    };
    Json(reply)
}
