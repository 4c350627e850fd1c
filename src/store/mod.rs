use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use walkdir::WalkDir;

use crate::core::{ReportId, ValidatedReport};

/// One canonical JSON file per report id, in a single flat directory.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredReport {
    pub file_name: String,
    pub document: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedReports {
    pub reports: Vec<StoredReport>,
    pub skipped: Vec<SkippedFile>,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, id: &ReportId) -> PathBuf {
        self.dir.join(id.file_name())
    }

    /// Writes the report, replacing any earlier file for the same id.
    pub fn save(&self, report: &ValidatedReport) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create report store: {}", self.dir.display())
        })?;
        let path = self.path_for(&report.id);
        let s = report.to_canonical_json()?;
        std::fs::write(&path, s)
            .with_context(|| format!("failed to write report: {}", path.display()))?;
        Ok(path)
    }

    /// Every `*.json` file that parses as a JSON object, ordered by file name.
    /// Anything else is recorded in `skipped` and otherwise ignored.
    pub fn load_all(&self) -> LoadedReports {
        let mut out = LoadedReports::default();
        if !self.dir.is_dir() {
            return out;
        }

        let walker = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let file_name = err
                        .path()
                        .and_then(Path::file_name)
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    out.skipped.push(SkippedFile {
                        file_name,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !entry.file_type().is_file() || !file_name.ends_with(".json") {
                continue;
            }

            match read_document(entry.path()) {
                Ok(document) => out.reports.push(StoredReport {
                    file_name,
                    document,
                }),
                Err(reason) => out.skipped.push(SkippedFile { file_name, reason }),
            }
        }

        out
    }
}

fn read_document(path: &Path) -> std::result::Result<Map<String, Value>, String> {
    let s = std::fs::read_to_string(path).map_err(|e| format!("unreadable: {e}"))?;
    match serde_json::from_str::<Value>(&s) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("not a JSON object".to_string()),
        Err(e) => Err(format!("malformed JSON: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn make_temp_dir() -> PathBuf {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "hwreport-store-test-{}-{seq}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create dir");
        dir
    }

    fn report(id: &str, notes: &str) -> ValidatedReport {
        let document = serde_json::json!({
            "report_id": id,
            "timestamp": "2025-01-01T00:00:00Z",
            "user_notes": notes,
        });
        ValidatedReport {
            id: ReportId::parse(id).expect("id"),
            document: document.as_object().cloned().expect("object"),
        }
    }

    #[test]
    fn save_creates_directory_and_overwrites() {
        let root = make_temp_dir();
        let store = ReportStore::new(root.join("data/reports"));

        let path = store.save(&report("0000aaaa", "first")).expect("save");
        assert_eq!(path, root.join("data/reports/0000aaaa.json"));
        store.save(&report("0000bbbb", "other")).expect("save");
        store.save(&report("0000aaaa", "second")).expect("save");

        let s = std::fs::read_to_string(&path).expect("read");
        assert!(s.contains("\"user_notes\": \"second\""), "s={s}");
        assert!(s.ends_with("}\n"));

        let other = std::fs::read_to_string(root.join("data/reports/0000bbbb.json"))
            .expect("read other");
        assert!(other.contains("\"user_notes\": \"other\""));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn load_all_skips_malformed_and_foreign_files() {
        let root = make_temp_dir();
        let store = ReportStore::new(&root);
        store.save(&report("0000aaaa", "ok")).expect("save");
        std::fs::write(root.join("broken.json"), b"{ not json").expect("write");
        std::fs::write(root.join("list.json"), b"[1, 2]").expect("write");
        std::fs::write(root.join("README.md"), b"# notes").expect("write");
        std::fs::create_dir_all(root.join("nested.json")).expect("mkdir");

        let loaded = store.load_all();
        assert_eq!(loaded.reports.len(), 1);
        assert_eq!(loaded.reports[0].file_name, "0000aaaa.json");
        let skipped: Vec<&str> = loaded.skipped.iter().map(|s| s.file_name.as_str()).collect();
        assert_eq!(skipped, vec!["broken.json", "list.json"]);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn load_all_of_missing_directory_is_empty() {
        let root = make_temp_dir();
        let loaded = ReportStore::new(root.join("absent")).load_all();
        assert!(loaded.reports.is_empty());
        assert!(loaded.skipped.is_empty());
        let _ = std::fs::remove_dir_all(&root);
    }
}
