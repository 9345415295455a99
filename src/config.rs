// Application configuration

use crate::Error;
use serde::Deserialize;
use std::env;

/// Runtime configuration, loadable from JSON and overridable from
/// `OSSATURE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the server binds to
    pub host: String,
    /// Port the server listens on
    pub port: u16,
    /// Host used for absolute URL generation, e.g. `example.com`
    pub base_url: Option<String>,
    /// Fail requests on unbindable action parameters instead of passing
    /// them through unbound
    pub strict_injection: bool,
    /// Default log level when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_url: None,
            strict_injection: false,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `OSSATURE_HOST`, `OSSATURE_PORT`,
    /// `OSSATURE_BASE_URL`, `OSSATURE_STRICT_INJECTION`, and
    /// `OSSATURE_LOG_LEVEL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("OSSATURE_HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("OSSATURE_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        if let Ok(base_url) = env::var("OSSATURE_BASE_URL") {
            config.base_url = Some(base_url);
        }
        if let Ok(strict) = env::var("OSSATURE_STRICT_INJECTION") {
            config.strict_injection = strict == "1" || strict.eq_ignore_ascii_case("true");
        }
        if let Ok(level) = env::var("OSSATURE_LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))
    }
}
