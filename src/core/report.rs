use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::HardwareReport;

/// Eight lowercase hex characters, e.g. `1234abcd`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if is_report_id(s) {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_report_id(s: &str) -> bool {
    s.len() == 8
        && s
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// A submission that passed validation. The document is kept verbatim so the
/// store can persist exactly what was submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedReport {
    pub id: ReportId,
    pub document: Map<String, Value>,
}

impl ValidatedReport {
    pub fn view(&self) -> HardwareReport {
        HardwareReport::from_document(&self.document)
    }

    /// Sorted keys, two-space indent, trailing newline.
    ///
    /// `serde_json::Map` is BTree-backed, so keys come out sorted at every
    /// nesting level.
    pub fn to_canonical_json(&self) -> Result<String> {
        let mut s = serde_json::to_string_pretty(&self.document)
            .with_context(|| format!("failed to serialize report {}", self.id))?;
        s.push('\n');
        Ok(s)
    }
}
