//! Decoder configuration.

use serde::{Deserialize, Serialize};

/// How strictly word-level values are validated.
///
/// `Relaxed` matches what most deployed decoders accept: it masks or
/// sign-extends integers to their declared width, treats any nonzero bool
/// word as `true`, ignores dirty padding, and replaces invalid UTF-8.
/// `Strict` rejects all of these with a `DecodeError`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    #[default]
    Relaxed,
    Strict,
}

impl DecodeMode {
    pub fn is_strict(self) -> bool {
        self == DecodeMode::Strict
    }
}

impl std::fmt::Display for DecodeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeMode::Relaxed => write!(f, "relaxed"),
            DecodeMode::Strict => write!(f, "strict"),
        }
    }
}

/// Configuration for a log decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    #[serde(default)]
    pub mode: DecodeMode,
}

impl DecoderConfig {
    pub fn strict() -> Self {
        Self {
            mode: DecodeMode::Strict,
        }
    }

    pub fn relaxed() -> Self {
        Self {
            mode: DecodeMode::Relaxed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_relaxed() {
        assert_eq!(DecoderConfig::default().mode, DecodeMode::Relaxed);
        assert!(DecoderConfig::strict().mode.is_strict());
    }

    #[test]
    fn mode_serde() {
        let cfg: DecoderConfig = serde_json::from_str(r#"{"mode":"strict"}"#).unwrap();
        assert_eq!(cfg, DecoderConfig::strict());
        let cfg: DecoderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.mode, DecodeMode::Relaxed);
    }
}
