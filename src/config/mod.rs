// Configuration module entry point
// Loads the immutable startup configuration and the per-process state built from it

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, SiteConfig, UpstreamConfig};

/// Default inference endpoint when none is configured
pub const DEFAULT_UPSTREAM_URL: &str = "https://router.huggingface.co/models/google/gemma-2-9b-it";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SITEGATE").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("site.public_dir", "public")?
            .set_default("site.index_file", "index.html")?
            .set_default("upstream.url", DEFAULT_UPSTREAM_URL)?
            .set_default("upstream.timeout_secs", 60)?
            .set_default("http.server_name", "sitegate")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_override_option("server.port", port_from_env())?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings that would make every request fail
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.upstream.url.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "upstream.url must not be empty".to_string(),
            ));
        }
        if self.http.max_body_size == 0 {
            return Err(config::ConfigError::Message(
                "http.max_body_size must be greater than zero".to_string(),
            ));
        }
        if self.site.index_file.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "site.index_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Plain `PORT` wins over file and prefixed variables, as hosting platforms expect
fn port_from_env() -> Option<i64> {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.trim().parse::<u16>().ok())
        .map(i64::from)
}
