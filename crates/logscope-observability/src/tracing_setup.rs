//! Tracing / logging initialisation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Log level, per-component overrides and output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// component (crate) name → level
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    /// JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: BTreeMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// `EnvFilter` directive string, e.g. `info,logscope_evm=debug`.
    pub fn directives(&self) -> String {
        let mut directives = self.level.clone();
        for (component, level) in &self.components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }
}

/// Install the global subscriber. Call once at startup.
///
/// `RUST_LOG`, when set, takes precedence over the configured directives.
/// An unparsable directive string falls back to `info`.
pub fn init_tracing(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.directives()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_include_components() {
        let mut config = LogConfig {
            level: "warn".into(),
            ..LogConfig::default()
        };
        config.components.insert("logscope-evm".into(), "debug".into());
        config.components.insert("logscope-registry".into(), "trace".into());
        assert_eq!(
            config.directives(),
            "warn,logscope_evm=debug,logscope_registry=trace"
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: LogConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LogConfig::default());

        let config: LogConfig = serde_json::from_str(r#"{"level":"debug","json":true}"#).unwrap();
        assert_eq!(config.level, "debug");
        assert!(config.json);
    }

    #[test]
    fn second_init_is_an_error_not_a_panic() {
        let config = LogConfig::default();
        let first = init_tracing(&config);
        let second = init_tracing(&config);
        // Another test may have installed a subscriber first.
        assert!(first.is_err() || second.is_err());
    }
}
