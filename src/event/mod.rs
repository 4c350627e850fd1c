use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

pub const EVENT_PATH_ENV: &str = "GITHUB_EVENT_PATH";

/// Where the raw report text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A webhook-style event document with an `issue.body` string.
    Event(PathBuf),
    /// A file holding the issue text itself.
    Body(PathBuf),
}

impl InputSource {
    /// `--body` wins over `--event`, which wins over `GITHUB_EVENT_PATH`.
    pub fn resolve(body: Option<PathBuf>, event: Option<PathBuf>) -> Option<Self> {
        if let Some(path) = body {
            return Some(InputSource::Body(path));
        }
        if let Some(path) = event {
            return Some(InputSource::Event(path));
        }
        std::env::var_os(EVENT_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(|v| InputSource::Event(PathBuf::from(v)))
    }

    pub fn read_body(&self) -> Result<String> {
        match self {
            InputSource::Body(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read issue body: {}", path.display())),
            InputSource::Event(path) => read_event_body(path),
        }
    }
}

pub fn read_event_body(path: &Path) -> Result<String> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event document: {}", path.display()))?;
    let event: Value = serde_json::from_str(&s)
        .with_context(|| format!("event document is not valid JSON: {}", path.display()))?;
    Ok(issue_body(&event))
}

/// `issue.body`, with a missing or null body read as empty text.
pub fn issue_body(event: &Value) -> String {
    event
        .get("issue")
        .and_then(|issue| issue.get("body"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
