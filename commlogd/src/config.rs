use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BUCKET: &str = "test-bucket";
pub const DEFAULT_BASE_FILENAME: &str = "test-json-data.json";

/// Options supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct CliOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub bucket: Option<String>,
    pub base_filename: Option<String>,
    pub data_dir: Option<PathBuf>,
}

/// Options read from the process environment, once at startup.
#[derive(Debug, Default, Clone)]
pub struct EnvOptions {
    pub bucket: Option<String>,
    pub base_filename: Option<String>,
}

impl EnvOptions {
    pub fn from_env() -> Self {
        Self {
            bucket: std::env::var("S3_BUCKET").ok().filter(|v| !v.is_empty()),
            base_filename: std::env::var("FILENAME").ok().filter(|v| !v.is_empty()),
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub bucket: String,
    pub base_filename: String,
    pub data_dir: Option<PathBuf>,
}

/// CLI flags override environment variables, which override defaults.
pub fn resolve_config(cli: &CliOptions, env: &EnvOptions) -> Config {
    Config {
        host: cli.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: cli.port.unwrap_or(DEFAULT_PORT),
        bucket: cli
            .bucket
            .clone()
            .or_else(|| env.bucket.clone())
            .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
        base_filename: cli
            .base_filename
            .clone()
            .or_else(|| env.base_filename.clone())
            .unwrap_or_else(|| DEFAULT_BASE_FILENAME.to_string()),
        data_dir: cli.data_dir.clone(),
    }
}
