use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::resolver::{KpsewhichResolver, Resolver};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub resolver: ResolverConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub access_log_format: String,
    pub access_log_file: Option<String>,
    pub error_log_file: Option<String>,
    pub show_headers: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Answer missing resources with 301 instead of 404, matching the
    /// original service's status code for clients that depend on it
    pub legacy_not_found: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResolverConfig {
    /// kpsewhich binary to invoke
    pub kpsewhich_path: String,
    /// Precompiled format dump served from the working directory,
    /// bypassing the resolver entirely
    pub format_dump: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from the given file path (without extension),
    /// falling back to built-in defaults for every key.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("KPSERVE"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "kpserve/0.1")?
            .set_default("http.legacy_not_found", false)?
            .set_default("resolver.kpsewhich_path", "kpsewhich")?
            .set_default("resolver.format_dump", "swiftlatexpdftex.fmt")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Shared application state, built once at startup and passed to every
/// handler by `Arc`. Read-only after construction: requests never mutate it.
pub struct AppState {
    pub config: Config,
    pub resolver: Arc<dyn Resolver>,
}

impl AppState {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let resolver = KpsewhichResolver::new(config.resolver.kpsewhich_path.clone());
        Self {
            config: config.clone(),
            resolver: Arc::new(resolver),
        }
    }

}
