//! Configuration for the guide system.
//!
//! Loads settings from guide.toml or uses defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{GuideError, Result};

/// Default config file path
pub const CONFIG_PATH: &str = "/etc/guide/config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideConfig {
    /// Path to the knowledge document
    #[serde(default = "default_knowledge_path")]
    pub knowledge_path: String,

    /// Score below which a clarifying question is attached
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Daemon bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_knowledge_path() -> String {
    "knowledge.md".to_string()
}

fn default_confidence_threshold() -> f64 {
    0.6
}

fn default_bind_addr() -> String {
    // Localhost only
    "127.0.0.1:7870".to_string()
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            knowledge_path: default_knowledge_path(),
            confidence_threshold: default_confidence_threshold(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl GuideConfig {
    /// Load config from the given path, falling back to defaults if absent.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!("No config at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: GuideConfig = toml::from_str(&content)
            .map_err(|e| GuideError::Config(format!("{}: {}", path, e)))?;

        if !(0.0..=1.0).contains(&config.confidence_threshold) {
            warn!(
                "confidence_threshold {} out of range, using default",
                config.confidence_threshold
            );
            return Ok(Self {
                confidence_threshold: default_confidence_threshold(),
                ..config
            });
        }

        Ok(config)
    }
}
