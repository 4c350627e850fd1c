use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::index::IndexRow;

/// Machine-readable listing of every report, labels untruncated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub generated_at_utc: String,
    pub count: usize,
    pub reports: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub timestamp: String,
    pub date: String,
    pub report_id: String,
    pub os_release: String,
    pub kernel: String,
    pub platform: String,
    pub cpu: String,
    pub cores: Value,
    pub memory_total_gb: Value,
    pub gpu: String,
    pub notes: String,
    pub raw_file: String,
}

pub fn build_catalog(rows: &[IndexRow], now: OffsetDateTime) -> Catalog {
    let reports: Vec<CatalogEntry> = rows.iter().map(catalog_entry).collect();
    Catalog {
        generated_at_utc: format_generated_at(now),
        count: reports.len(),
        reports,
    }
}

/// `YYYY-MM-DDTHH:MM:SSZ` in UTC.
pub fn format_generated_at(now: OffsetDateTime) -> String {
    now.to_offset(time::UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
        ))
        .unwrap_or_else(|_| "unknown".to_string())
}

fn catalog_entry(row: &IndexRow) -> CatalogEntry {
    let r = &row.report;
    CatalogEntry {
        timestamp: row.timestamp.clone(),
        date: row.date(),
        report_id: row.report_id.clone(),
        os_release: text(&r.system.os_release),
        kernel: text(&r.system.kernel),
        platform: text(&r.system.platform),
        cpu: text(&r.processor.model),
        cores: r.processor.cores.clone().unwrap_or_else(empty),
        memory_total_gb: r.memory.total_gb.clone().unwrap_or_else(empty),
        gpu: row.gpu_label(),
        notes: r.user_notes.as_deref().unwrap_or("").trim().to_string(),
        raw_file: row.file_name.clone(),
    }
}

fn text(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

fn empty() -> Value {
    Value::String(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_rows;
    use crate::store::{LoadedReports, StoredReport};
    use time::macros::datetime;

    #[test]
    fn catalog_entry_keeps_json_types_and_full_fields() {
        let loaded = LoadedReports {
            reports: vec![StoredReport {
                file_name: "1234abcd.json".to_string(),
                document: serde_json::json!({
                    "report_id": "1234abcd",
                    "timestamp": "2025-01-02T03:04:05Z",
                    "system": {"os_release": "Fedora 41", "kernel": "6.11"},
                    "processor": {"model": "i7", "cores": 12},
                    "memory": {"total_gb": 31.2},
                    "graphics": [{"device": "A"}, {"device": "B"}, {"device": "C"}],
                    "user_notes": "  fine  "
                })
                .as_object()
                .cloned()
                .expect("object"),
            }],
            skipped: vec![],
        };
        let catalog = build_catalog(&build_rows(&loaded), datetime!(2026-03-04 05:06:07.891 UTC));
        let v = serde_json::to_value(&catalog).expect("serialize");

        assert_eq!(
            v,
            serde_json::json!({
                "generated_at_utc": "2026-03-04T05:06:07Z",
                "count": 1,
                "reports": [{
                    "timestamp": "2025-01-02T03:04:05Z",
                    "date": "2025-01-02",
                    "report_id": "1234abcd",
                    "os_release": "Fedora 41",
                    "kernel": "6.11",
                    "platform": "",
                    "cpu": "i7",
                    "cores": 12,
                    "memory_total_gb": 31.2,
                    "gpu": "A, B, C",
                    "notes": "fine",
                    "raw_file": "1234abcd.json"
                }]
            })
        );
    }

    #[test]
    fn generated_at_is_utc_second_precision() {
        let now = datetime!(2026-03-04 07:06:07.5 +02:00);
        assert_eq!(format_generated_at(now), "2026-03-04T05:06:07Z");
    }
}
