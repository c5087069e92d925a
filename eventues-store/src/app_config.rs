use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Root of the REST backend, e.g. `http://127.0.0.1:8000`
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter() }
    }
}

fn default_timeout_seconds() -> u64 { 10 }

fn default_log_filter() -> String {
    "eventues=info,eventues_store=info,eventues_editor=info".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Layered load from `dir`: `default`, then `{RUN_MODE}` and `local`
    /// (both optional), then `EVENTUES__SECTION__KEY` environment variables.
    pub fn load_from(dir: &str) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name(&format!("{}/default", dir)))
            .add_source(config::File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // not checked in
            .add_source(config::File::with_name(&format!("{}/local", dir)).required(false))
            .add_source(config::Environment::with_prefix("EVENTUES").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
