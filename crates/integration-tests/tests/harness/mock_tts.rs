//! Mock speech backend
//!
//! Implements `OpenAI` `/audio/speech`; the returned "audio" is the request
//! text, so segment files can be traced back to their lines

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

pub struct MockTts {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockTtsState>,
}

struct MockTtsState {
    request_count: AtomicU32,
    /// Requests to fail with 503 before succeeding; `u32::MAX` fails forever
    fail_count: AtomicU32,
    voices: Mutex<Vec<String>>,
}

impl MockTts {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_failing(0).await
    }

    /// Fail the first `n` requests with 503
    pub async fn start_failing(n: u32) -> anyhow::Result<Self> {
        let state = Arc::new(MockTtsState {
            request_count: AtomicU32::new(0),
            fail_count: AtomicU32::new(n),
            voices: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/audio/speech", routing::post(handle_speech))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// Voices requested so far, in arrival order
    pub fn voices(&self) -> Vec<String> {
        self.state.voices.lock().unwrap().clone()
    }
}

impl Drop for MockTts {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_speech(State(state): State<Arc<MockTtsState>>, Json(req): Json<serde_json::Value>) -> impl IntoResponse {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let remaining = state.fail_count.load(Ordering::Relaxed);
    if remaining > 0 {
        if remaining != u32::MAX {
            state.fail_count.fetch_sub(1, Ordering::Relaxed);
        }
        return (StatusCode::SERVICE_UNAVAILABLE, "speech backend overloaded").into_response();
    }

    let voice = req["voice"].as_str().unwrap_or_default().to_owned();
    let input = req["input"].as_str().unwrap_or_default().to_owned();
    state.voices.lock().unwrap().push(voice.clone());

    ([(header::CONTENT_TYPE, "audio/mpeg")], format!("[{voice}] {input}").into_bytes()).into_response()
}
