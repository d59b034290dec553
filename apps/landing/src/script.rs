//! Scripted visitor sessions: one JSON object per line, each an event and the delay
//! before it is fired.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use shared::protocol::PageEvent;

pub const DEMO_SCRIPT: &str = include_str!("../scripts/demo.jsonl");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptStep {
    /// Delay after the previous step.
    #[serde(default)]
    pub after_ms: u64,
    pub event: PageEvent,
}

impl ScriptStep {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.after_ms)
    }
}

/// Blank lines and lines starting with `//` are skipped.
pub fn parse_script(raw: &str) -> Result<Vec<ScriptStep>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with("//")
        })
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("invalid script step on line {}", idx + 1))
        })
        .collect()
}

pub fn load_script(path: Option<&Path>) -> Result<Vec<ScriptStep>> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read script {}", path.display()))?;
            parse_script(&raw)
        }
        None => parse_script(DEMO_SCRIPT),
    }
}
