use crate::config::ServerConfig;
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use taixiu_core::config::WatchConfig;
use taixiu_core::model::SnapshotStatus;
use taixiu_core::providers::http::HttpFeed;
use taixiu_core::sync::{scheduler, SyncOrchestrator, SyncPhase};
use tokio::net::TcpListener;

/// Shared across handlers. Each feed owns an independent orchestrator.
pub struct AppState {
    feeds: BTreeMap<String, Arc<SyncOrchestrator>>,
    capacity: usize,
    started: Instant,
}

impl AppState {
    pub fn new(feeds: Vec<Arc<SyncOrchestrator>>, capacity: usize) -> Self {
        Self {
            feeds: feeds
                .into_iter()
                .map(|o| (o.name().to_string(), o))
                .collect(),
            capacity,
            started: Instant::now(),
        }
    }

    /// One `HttpFeed`-backed orchestrator per configured feed.
    pub fn from_config(cfg: &WatchConfig) -> Self {
        let feeds = cfg
            .feeds
            .iter()
            .map(|f| {
                let feed = HttpFeed::from_config(f, cfg.poll.timeout_ms);
                Arc::new(SyncOrchestrator::new(Arc::new(feed), cfg))
            })
            .collect();
        Self::new(feeds, cfg.history.capacity)
    }

    pub fn orchestrators(&self) -> impl Iterator<Item = &Arc<SyncOrchestrator>> {
        self.feeds.values()
    }
}

#[derive(Debug, Serialize)]
struct FeedSummary {
    name: String,
    status: SnapshotStatus,
    phase: SyncPhase,
    cycles_completed: u64,
    consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_success_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_error: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    feeds: Vec<FeedSummary>,
}

#[derive(Debug, Deserialize)]
struct SnapshotQuery {
    history: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

async fn summarize(state: &AppState) -> Vec<FeedSummary> {
    let mut out = Vec::with_capacity(state.feeds.len());
    for (name, orch) in &state.feeds {
        let snap = orch.peek(Some(0)).await;
        out.push(FeedSummary {
            name: name.clone(),
            status: snap.status,
            phase: orch.phase(),
            cycles_completed: snap.sync.cycles_completed,
            consecutive_failures: snap.sync.consecutive_failures,
            last_success_at: snap.sync.last_success_at,
            last_error: snap.sync.last_error,
        });
    }
    out
}

/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started.elapsed().as_secs(),
        feeds: summarize(&state).await,
    })
}

/// GET /api/feeds
async fn feeds_handler(State(state): State<Arc<AppState>>) -> Json<Vec<FeedSummary>> {
    Json(summarize(&state).await)
}

/// GET /api/feeds/:name
async fn snapshot_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(q): Query<SnapshotQuery>,
) -> Response {
    let Some(orch) = state.feeds.get(&name) else {
        let body = ErrorBody {
            error: format!("unknown feed '{}'", name),
        };
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    };
    let len = q.history.map(|n| n.min(state.capacity));
    Json(orch.snapshot(len).await).into_response()
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/feeds", get(feeds_handler))
        .route("/api/feeds/:name", get(snapshot_handler))
        .with_state(state)
}

pub struct Server;

impl Server {
    /// Spawns one scheduler per feed and serves until ctrl-c.
    pub async fn run(watch: WatchConfig, cfg: ServerConfig) -> Result<()> {
        let period = cfg.poll_period(&watch)?;
        let state = Arc::new(AppState::from_config(&watch));

        let tasks: Vec<_> = state
            .orchestrators()
            .map(|o| scheduler::spawn(o.clone(), period))
            .collect();

        let listener = TcpListener::bind(&cfg.bind)
            .await
            .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", cfg.bind, e))?;
        tracing::info!(
            event = "server.listening",
            addr = %listener.local_addr()?,
            feeds = state.feeds.len()
        );

        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        for t in tasks {
            t.abort();
        }
        tracing::info!(event = "server.stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(event = "server.signal_error", error = %e);
        std::future::pending::<()>().await;
    }
    tracing::info!(event = "server.shutdown");
}
