//! Communication log daemon.
//!
//! Exposes a small HTTP API over a key-addressed blob store: `POST
//! /api/record` appends a JSON record to a per-day log document, `POST
//! /api/upload` proxies multipart file uploads into the store.

mod config;
mod http;
mod upload;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use commlog_store::{BlobStore, FsStore, LogAppender, MemoryStore};

use crate::config::{resolve_config, CliOptions, EnvOptions};
use crate::http::AppState;

const DAEMON_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "commlogd", version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Daily communication log daemon over object storage")]
struct Args {
    /// Host binding for the HTTP server
    #[arg(long = "host", value_name = "HOST")]
    host: Option<String>,

    /// Port binding for the HTTP server
    #[arg(long = "port", value_name = "PORT")]
    port: Option<u16>,

    /// Bucket namespace for stored objects (env: S3_BUCKET)
    #[arg(long = "bucket", value_name = "NAME")]
    bucket: Option<String>,

    /// Base filename of the daily log document (env: FILENAME)
    #[arg(long = "base-filename", value_name = "FILE")]
    base_filename: Option<String>,

    /// Persist objects under this directory instead of keeping them in memory
    #[arg(long = "data-dir", value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Optional log filter (e.g. info, debug)
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    let cli = CliOptions {
        host: args.host.clone(),
        port: args.port,
        bucket: args.bucket.clone(),
        base_filename: args.base_filename.clone(),
        data_dir: args.data_dir.clone(),
    };
    let config = resolve_config(&cli, &EnvOptions::from_env());

    tracing::info!(
        bucket = %config.bucket,
        base_filename = %config.base_filename,
        "commlogd {DAEMON_VERSION} starting"
    );

    let store: Arc<dyn BlobStore> = match &config.data_dir {
        Some(dir) => Arc::new(FsStore::new(dir.join(&config.bucket))),
        None => {
            tracing::warn!("no --data-dir given, objects are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(LogAppender::new(store), config.base_filename.clone());
    http::run_server(state, &config.host, config.port).await
}

fn init_tracing(args: &Args) {
    let filter = args
        .log_level
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
