//! Mock `MediaWiki` query API
//!
//! Serves `formatversion=2` query responses for a fixed set of articles;
//! any other title is reported missing

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::extract::{Query, State};
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

pub struct MockWiki {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockWikiState>,
}

struct MockWikiState {
    request_count: AtomicU32,
    articles: HashMap<String, String>,
}

impl MockWiki {
    /// Start serving `articles` as `(title, extract)` pairs
    pub async fn start(articles: &[(&str, &str)]) -> anyhow::Result<Self> {
        let state = Arc::new(MockWikiState {
            request_count: AtomicU32::new(0),
            articles: articles
                .iter()
                .map(|(title, extract)| ((*title).to_owned(), (*extract).to_owned()))
                .collect(),
        });

        let app = Router::new()
            .route("/w/api.php", routing::get(handle_query))
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

    /// Full API endpoint, as configured in `source.base_url`
    pub fn api_url(&self) -> String {
        format!("http://{}/w/api.php", self.addr)
    }

    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }
}

impl Drop for MockWiki {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_query(
    State(state): State<Arc<MockWikiState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let title = params.get("titles").cloned().unwrap_or_default();

    let page = match state.articles.get(&title) {
        Some(extract) => serde_json::json!({
            "pageid": 1,
            "ns": 0,
            "title": title,
            "extract": extract,
            "fullurl": format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
        }),
        None => serde_json::json!({
            "ns": 0,
            "title": title,
            "missing": true,
        }),
    };

    Json(serde_json::json!({
        "batchcomplete": true,
        "query": { "pages": [page] }
    }))
}
