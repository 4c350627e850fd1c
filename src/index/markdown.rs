use std::path::Path;

use anyhow::{Context, Result};

use crate::index::IndexRow;

pub const REPORTS_TABLE_START: &str = "<!-- REPORTS_TABLE_START -->";
pub const REPORTS_TABLE_END: &str = "<!-- REPORTS_TABLE_END -->";
pub const NO_REPORTS_PLACEHOLDER: &str =
    "_No reports yet. Submitted reports will appear here after approval._";

/// Table of reports linking to `<link_prefix><id>/`, optionally capped at
/// `limit` rows.
pub fn render_reports_table(rows: &[IndexRow], link_prefix: &str, limit: Option<usize>) -> String {
    if rows.is_empty() {
        return NO_REPORTS_PLACEHOLDER.to_string();
    }
    let shown = limit.unwrap_or(rows.len()).min(rows.len());

    let mut lines = Vec::with_capacity(shown + 2);
    lines.push("| Report ID | Timestamp (UTC) | System | Processor | Memory (GB) | GPU |".to_string());
    lines.push("| --- | --- | --- | --- | --- | --- |".to_string());
    for row in &rows[..shown] {
        let id = &row.report_id;
        lines.push(format!(
            "| [{id}]({link_prefix}{id}/) | {} | {} | {} | {} | {} |",
            row.timestamp,
            row.system_label(),
            row.processor_label(),
            row.memory_label(),
            row.gpu_label()
        ));
    }
    lines.join("\n")
}

/// Replaces the text between the report-table markers, keeping everything
/// before the start marker and after the end marker. Without a marker pair
/// (start followed by end) a new delimited section is appended.
pub fn splice_marked_section(content: &str, section: &str) -> String {
    let markers = content.split_once(REPORTS_TABLE_START).and_then(|(before, rest)| {
        rest.split_once(REPORTS_TABLE_END)
            .map(|(_, after)| (before, after))
    });

    match markers {
        Some((before, after)) => format!(
            "{before}{REPORTS_TABLE_START}\n{section}\n{REPORTS_TABLE_END}{after}"
        ),
        None => {
            let mut out = content.to_string();
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&format!(
                "{REPORTS_TABLE_START}\n{section}\n{REPORTS_TABLE_END}\n"
            ));
            out
        }
    }
}

/// Splices `section` into the document at `path`. A missing document is
/// treated as empty; any other read failure leaves the file untouched.
pub fn update_marked_section(path: &Path, section: &str) -> Result<()> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read marked document: {}", path.display()));
        }
    };
    crate::index::write_file(path, &splice_marked_section(&content, section))
}

/// The root database page: one row per report, GPU and notes shortened.
pub fn render_database(rows: &[IndexRow], title: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {title}\n\n"));
    out.push_str(
        "> This database is generated automatically from approved reports (PR merged).\n\n",
    );

    if rows.is_empty() {
        out.push_str(NO_REPORTS_PLACEHOLDER);
        out.push('\n');
        return out;
    }

    out.push_str("| Date | ID | OS | CPU | GPU | Notes |\n");
    out.push_str("| :--- | :--- | :--- | :--- | :--- | :--- |\n");
    for row in rows {
        let date = if row.timestamp.is_empty() {
            "N/A".to_string()
        } else {
            row.date()
        };
        let os = or_unknown(row.report.system.os_release.as_deref());
        let cpu = or_unknown(row.report.processor.model.as_deref());
        let id = if row.report_id.is_empty() {
            "N/A"
        } else {
            row.report_id.as_str()
        };
        out.push_str(&format!(
            "| {date} | `{id}` | {os} | {cpu} | {} | {} |\n",
            row.gpu_summary(),
            row.notes_summary()
        ));
    }
    out
}

fn or_unknown(v: Option<&str>) -> &str {
    v.unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{all_rows, build_rows};
    use crate::store::{LoadedReports, StoredReport};
    use serde_json::Value;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn make_temp_dir() -> PathBuf {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "hwreport-markdown-test-{}-{seq}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create dir");
        dir
    }

    fn loaded(reports: Vec<Value>) -> LoadedReports {
        LoadedReports {
            reports: reports
                .into_iter()
                .map(|v| StoredReport {
                    file_name: "x.json".to_string(),
                    document: v.as_object().cloned().expect("object"),
                })
                .collect(),
            skipped: vec![],
        }
    }

    fn rows(reports: Vec<Value>) -> Vec<IndexRow> {
        build_rows(&loaded(reports))
    }

    fn numbered(n: usize) -> Vec<IndexRow> {
        rows((0..n)
            .map(|i| {
                serde_json::json!({
                    "report_id": format!("0000000{i}"),
                    "timestamp": format!("2024-01-0{}T00:00:00Z", i + 1),
                })
            })
            .collect())
    }

    #[test]
    fn table_rows_link_to_report_pages() {
        let rows = rows(vec![serde_json::json!({
            "report_id": "1234abcd",
            "timestamp": "2025-01-02T03:04:05Z",
            "system": {"vendor": "Framework", "model": "Laptop 13"},
            "processor": {"model": "i7-1260P"},
            "memory": {"total_gb": 32},
            "graphics": [{"device": "Iris Xe"}, {"device": "RTX 3050"}],
        })]);
        let table = render_reports_table(&rows, "./results/", None);
        assert_eq!(
            table,
            "| Report ID | Timestamp (UTC) | System | Processor | Memory (GB) | GPU |\n\
             | --- | --- | --- | --- | --- | --- |\n\
             | [1234abcd](./results/1234abcd/) | 2025-01-02T03:04:05Z | Framework Laptop 13 | i7-1260P | 32 | Iris Xe, RTX 3050 |"
        );
    }

    #[test]
    fn table_limit_caps_rows() {
        let rows = numbered(7);
        let capped = render_reports_table(&rows, "./", Some(5));
        assert_eq!(capped.lines().count(), 2 + 5);
        assert!(capped.contains("[00000006]"), "newest kept: {capped}");
        assert!(!capped.contains("[00000000]"), "oldest dropped: {capped}");
        assert_eq!(render_reports_table(&rows, "./", None).lines().count(), 2 + 7);
    }

    #[test]
    fn empty_table_is_placeholder() {
        assert_eq!(render_reports_table(&[], "./", Some(5)), NO_REPORTS_PLACEHOLDER);
    }

    #[test]
    fn splice_replaces_only_marker_interior() {
        let doc = format!(
            "# Title\n\nIntro text.\n{REPORTS_TABLE_START}\nold table\nold row\n{REPORTS_TABLE_END}\n\n## Footer\nbye\n"
        );
        let out = splice_marked_section(&doc, "NEW");
        assert_eq!(
            out,
            format!(
                "# Title\n\nIntro text.\n{REPORTS_TABLE_START}\nNEW\n{REPORTS_TABLE_END}\n\n## Footer\nbye\n"
            )
        );
        assert_eq!(splice_marked_section(&out, "NEW"), out);
    }

    #[test]
    fn splice_appends_when_markers_missing() {
        assert_eq!(
            splice_marked_section("# Title", "T"),
            format!("# Title\n{REPORTS_TABLE_START}\nT\n{REPORTS_TABLE_END}\n")
        );
        assert_eq!(
            splice_marked_section("", "T"),
            format!("{REPORTS_TABLE_START}\nT\n{REPORTS_TABLE_END}\n")
        );
        let only_start = format!("x\n{REPORTS_TABLE_START}\n");
        assert!(
            splice_marked_section(&only_start, "T")
                .starts_with(&format!("x\n{REPORTS_TABLE_START}\n{REPORTS_TABLE_START}\nT\n"))
        );
    }

    #[test]
    fn update_creates_missing_document() {
        let dir = make_temp_dir();
        let path = dir.join("docs/index.md");
        update_marked_section(&path, "T").expect("update");
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            format!("{REPORTS_TABLE_START}\nT\n{REPORTS_TABLE_END}\n")
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn update_leaves_undecodable_document_untouched() {
        let dir = make_temp_dir();
        let path = dir.join("index.md");
        let mut bytes = b"# Title caf\xe9\nIntro\n".to_vec();
        bytes.extend_from_slice(
            format!("{REPORTS_TABLE_START}\nold\n{REPORTS_TABLE_END}\nFooter\n").as_bytes(),
        );
        std::fs::write(&path, &bytes).expect("write");

        let err = update_marked_section(&path, "NEW").unwrap_err();
        assert!(
            err.to_string().contains("failed to read marked document"),
            "err={err:#}"
        );
        assert_eq!(std::fs::read(&path).expect("read"), bytes);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn database_lists_reports_without_id() {
        let rows = all_rows(&loaded(vec![serde_json::json!({
            "timestamp": "2025-01-02T03:04:05Z",
            "system": {"os_release": "Debian 12"},
        })]));
        let md = render_database(&rows, "HW DB");
        assert!(
            md.ends_with("| 2025-01-02 | `N/A` | Debian 12 | Unknown | N/A | No notes |\n"),
            "md={md}"
        );
    }

    #[test]
    fn database_rows_use_defaults() {
        let rows = rows(vec![serde_json::json!({
            "report_id": "1234abcd",
            "timestamp": "2025-01-02T03:04:05Z",
            "system": {},
            "processor": {},
        })]);
        let md = render_database(&rows, "HW DB");
        assert!(md.starts_with("# HW DB\n\n> This database"), "md={md}");
        assert!(md.contains("| Date | ID | OS | CPU | GPU | Notes |\n"), "md={md}");
        assert!(
            md.ends_with("| 2025-01-02 | `1234abcd` | Unknown | Unknown | N/A | No notes |\n"),
            "md={md}"
        );
    }

    #[test]
    fn database_without_reports_shows_placeholder() {
        let md = render_database(&[], "HW DB");
        assert!(md.ends_with(&format!("{NO_REPORTS_PLACEHOLDER}\n")), "md={md}");
        assert!(!md.contains("| Date |"));
    }
}
