use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::store::SkippedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCommand {
    Ingest,
    Rebuild,
}

impl RunCommand {
    pub const fn as_str(self) -> &'static str {
        match self {
            RunCommand::Ingest => "ingest",
            RunCommand::Rebuild => "rebuild",
        }
    }
}

/// What one `ingest` or `rebuild` run did, as recorded in its run log.
#[derive(Debug, Clone, Default)]
pub struct RunRecord {
    pub report_id: Option<String>,
    pub written: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct RunLog<'a> {
    schema_version: &'static str,
    tool_version: String,
    command: &'static str,
    started_at: String,
    finished_at: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    report_id: Option<&'a str>,
    written: &'a [String],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<&'a SkippedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Writes `<dir>/<command>-<pid>-<nanos>.json` and returns its path.
pub fn write_run_log(
    dir: &Path,
    command: RunCommand,
    started_at: OffsetDateTime,
    finished_at: OffsetDateTime,
    record: &RunRecord,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let pid = std::process::id();
    let ts = finished_at.unix_timestamp_nanos();
    let path = dir.join(format!("{}-{pid}-{ts}.json", command.as_str()));

    let log = RunLog {
        schema_version: "1.0",
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        command: command.as_str(),
        started_at: format_rfc3339(started_at),
        finished_at: format_rfc3339(finished_at),
        status: if record.error.is_some() { "error" } else { "ok" },
        report_id: record.report_id.as_deref(),
        written: &record.written,
        skipped: record.skipped.iter().collect(),
        error: record.error.as_deref(),
    };

    let buf = serde_json::to_vec_pretty(&log).context("failed to serialize run log")?;
    std::fs::write(&path, buf)
        .with_context(|| format!("failed to write run log: {}", path.display()))?;
    Ok(path)
}

fn format_rfc3339(t: OffsetDateTime) -> String {
    t.format(&Rfc3339).unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn make_temp_dir() -> PathBuf {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "hwreport-log-test-{}-{seq}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn run_log_records_outcome() {
        let dir = make_temp_dir();
        let started_at = OffsetDateTime::now_utc();
        let record = RunRecord {
            report_id: Some("1234abcd".to_string()),
            written: vec!["data/reports/1234abcd.json".to_string()],
            skipped: vec![SkippedFile {
                file_name: "bad.json".to_string(),
                reason: "malformed JSON".to_string(),
            }],
            error: None,
        };

        let path = write_run_log(&dir, RunCommand::Ingest, started_at, started_at, &record)
            .expect("write log");
        assert!(
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("ingest-"))
        );

        let v: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).expect("read")).expect("parse");
        assert_eq!(v["command"], "ingest");
        assert_eq!(v["status"], "ok");
        assert_eq!(v["report_id"], "1234abcd");
        assert_eq!(v["skipped"][0]["file_name"], "bad.json");
        assert!(v.get("error").is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_run_has_error_status() {
        let dir = make_temp_dir();
        let now = OffsetDateTime::now_utc();
        let record = RunRecord {
            error: Some("Missing required field: system".to_string()),
            ..RunRecord::default()
        };
        let path = write_run_log(&dir, RunCommand::Rebuild, now, now, &record).expect("write");
        let v: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).expect("read")).expect("parse");
        assert_eq!(v["status"], "error");
        assert_eq!(v["error"], "Missing required field: system");
        assert!(v.get("skipped").is_none());
        assert!(v.get("report_id").is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
