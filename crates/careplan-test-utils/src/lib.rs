//! Shared test utilities for careplan tests.
//!
//! - [`ScriptedAgent`]: an in-process [`AgentInvoker`] with a canned reply,
//!   an invocation counter, and the prompts it received.
//! - [`spawn_fake_provider`]: a local HTTP server that speaks just enough of
//!   the chat-completions API to exercise the real HTTP agent.
//! - [`serve_router`]: run any axum router on an ephemeral port.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use axum::Router;
use tokio::task::JoinHandle;

use careplan_core::agent::{AgentInvoker, ProviderError};
use careplan_core::prompt::PromptSpec;

// ---------------------------------------------------------------------------
// Scripted agent
// ---------------------------------------------------------------------------

/// An agent that returns the same reply to every prompt.
pub struct ScriptedAgent {
    reply: Result<String, ProviderError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<PromptSpec>>,
}

impl ScriptedAgent {
    /// Agent that answers every prompt with `text`.
    pub fn replying(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(Ok(text.into()), None))
    }

    /// Agent that fails every call with `error`.
    pub fn failing(error: ProviderError) -> Arc<Self> {
        Arc::new(Self::new(Err(error), None))
    }

    /// Agent that sleeps for `delay` before answering with `text`.
    pub fn slow(text: impl Into<String>, delay: Duration) -> Arc<Self> {
        Arc::new(Self::new(Ok(text.into()), Some(delay)))
    }

    fn new(reply: Result<String, ProviderError>, delay: Option<Duration>) -> Self {
        Self {
            reply,
            delay,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of times `invoke` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent prompt received, if any.
    pub fn last_prompt(&self) -> Option<PromptSpec> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .last()
            .cloned()
    }
}

#[async_trait]
impl AgentInvoker for ScriptedAgent {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, prompt: &PromptSpec) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

// ---------------------------------------------------------------------------
// Servers
// ---------------------------------------------------------------------------

/// Serve `router` on `127.0.0.1` with an OS-assigned port.
///
/// The server runs until the returned handle is aborted or the test's
/// runtime shuts down.
pub async fn serve_router(router: Router) -> (SocketAddr, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().expect("listener has no local addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("test server failed");
    });
    (addr, handle)
}

/// A request captured by the fake provider.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

struct ProviderState {
    status: StatusCode,
    body: String,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Handle to a running fake chat-completions provider.
pub struct FakeProvider {
    /// Base URL to put in `AgentConfig::base_url` (ends in `/v1`).
    pub base_url: String,
    state: Arc<ProviderState>,
    handle: JoinHandle<()>,
}

impl FakeProvider {
    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .expect("request log poisoned")
            .clone()
    }
}

impl Drop for FakeProvider {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn chat_completions(
    State(state): State<Arc<ProviderState>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body_json = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
    state
        .requests
        .lock()
        .expect("request log poisoned")
        .push(RecordedRequest {
            authorization,
            body: body_json,
        });

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

/// Start a provider that answers `POST /v1/chat/completions` with the
/// given status and raw body.
pub async fn spawn_fake_provider(status: u16, body: impl Into<String>) -> FakeProvider {
    let state = Arc::new(ProviderState {
        status: StatusCode::from_u16(status).expect("invalid status code"),
        body: body.into(),
        requests: Mutex::new(Vec::new()),
    });
    let router = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(Arc::clone(&state));
    let (addr, handle) = serve_router(router).await;

    FakeProvider {
        base_url: format!("http://{addr}/v1"),
        state,
        handle,
    }
}

/// A successful chat-completions response body whose answer is `content`.
pub fn chat_completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 100, "completion_tokens": 50, "total_tokens": 150}
    })
    .to_string()
}
