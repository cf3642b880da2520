//! Configuration system.
//!
//! Loads simulation configuration from JSON strings/files.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Root configuration of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Fixed simulation tick rate.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    /// Height of the flat ground plane.
    #[serde(default)]
    pub ground_y: f64,
    /// Stop after this many ticks; run forever when absent.
    #[serde(default)]
    pub run_ticks: Option<u64>,
}

fn default_tick_hz() -> u32 {
    20
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            ground_y: 0.0,
            run_ticks: None,
        }
    }
}

impl SimConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Reads and parses a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg = Self::from_json_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        anyhow::ensure!(cfg.tick_hz > 0, "tick_hz must be positive");
        Ok(cfg)
    }
}
