use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use commlog_store::{BlobStore, LogAppender};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::upload::{self, UploadCounter};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    appender: LogAppender,
    base_filename: String,
    uploads: UploadCounter,
}

impl AppState {
    pub fn new(appender: LogAppender, base_filename: String) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                appender,
                base_filename,
                uploads: UploadCounter::new(),
            }),
        }
    }

    pub fn appender(&self) -> &LogAppender {
        &self.inner.appender
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        self.inner.appender.store()
    }

    pub fn base_filename(&self) -> &str {
        &self.inner.base_filename
    }

    pub fn uploads(&self) -> &UploadCounter {
        &self.inner.uploads
    }
}

#[derive(Debug)]
pub enum ApiError {
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn internal<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Internal(err) => {
                tracing::error!("request failed: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/record", post(record))
        .route("/api/upload", post(upload::upload))
        .route("/health", get(health))
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(state: AppState, host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {host}:{port}"))?;

    tracing::info!("commlogd HTTP server listening on {addr}");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {addr}"))?;

    axum::serve(listener, router(state).into_make_service())
        .await
        .context("HTTP server encountered an unrecoverable error")?;

    Ok(())
}

/// Append one record to today's log document.
///
/// The payload is opaque; whatever JSON the client sends is stored as-is.
async fn record(
    Extension(state): Extension<AppState>,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    state
        .appender()
        .append(state.base_filename(), payload)
        .await
        .map_err(ApiError::internal)?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Record stored." })),
    )
        .into_response())
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
