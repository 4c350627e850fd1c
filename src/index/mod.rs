use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use time::format_description::well_known::Rfc3339;

use crate::core::HardwareReport;
use crate::store::{LoadedReports, ReportStore, SkippedFile};

mod catalog;
mod markdown;

pub use catalog::{Catalog, CatalogEntry, build_catalog, format_generated_at};
pub use markdown::{
    NO_REPORTS_PLACEHOLDER, REPORTS_TABLE_END, REPORTS_TABLE_START, render_database,
    render_reports_table, splice_marked_section, update_marked_section,
};

pub const GPU_SUMMARY_MAX_CHARS: usize = 140;
pub const NOTES_SUMMARY_MAX_CHARS: usize = 180;
pub const DEFAULT_SUMMARY_LIMIT: usize = 5;

/// Output locations and knobs for one rebuild.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub results_dir: PathBuf,
    pub site_index: PathBuf,
    pub database: PathBuf,
    pub catalog: PathBuf,
    pub summary_limit: usize,
    pub database_title: String,
}

impl IndexOptions {
    pub fn results_index(&self) -> PathBuf {
        self.results_dir.join("index.md")
    }
}

#[derive(Debug, Clone)]
pub struct RebuildOutcome {
    pub count: usize,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

/// One summary row per stored report. Rebuilt from scratch on every run.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    pub report_id: String,
    /// Trimmed literal from the report, shown verbatim.
    pub timestamp: String,
    pub parsed_timestamp: Option<OffsetDateTime>,
    pub file_name: String,
    pub report: HardwareReport,
}

impl IndexRow {
    pub fn system_label(&self) -> String {
        self.report.system.label()
    }

    pub fn processor_label(&self) -> String {
        self.report.processor.label()
    }

    pub fn memory_label(&self) -> String {
        self.report.memory.label()
    }

    /// Every device name, comma-joined.
    pub fn gpu_label(&self) -> String {
        self.report.gpu_names().join(", ")
    }

    /// First two graphics entries joined by ` / `, capped for the database table.
    pub fn gpu_summary(&self) -> String {
        let devices: Vec<&str> = self
            .report
            .graphics
            .iter()
            .take(2)
            .filter_map(|g| g.device.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if devices.is_empty() {
            return "N/A".to_string();
        }
        truncate_chars(&devices.join(" / "), GPU_SUMMARY_MAX_CHARS)
    }

    pub fn notes_summary(&self) -> String {
        let notes = self
            .report
            .user_notes
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("No notes")
            .replace('\n', " ");
        truncate_chars(notes.trim(), NOTES_SUMMARY_MAX_CHARS)
    }

    /// `YYYY-MM-DD` prefix of the literal timestamp.
    pub fn date(&self) -> String {
        self.timestamp.chars().take(10).collect()
    }
}

/// Summary rows for every loaded report with a non-empty id, newest first.
pub fn build_rows(loaded: &LoadedReports) -> Vec<IndexRow> {
    all_rows(loaded)
        .into_iter()
        .filter(|row| !row.report_id.is_empty())
        .collect()
}

/// One row per readable stored report, sorted, including reports whose
/// `report_id` is missing or blank (left empty).
pub fn all_rows(loaded: &LoadedReports) -> Vec<IndexRow> {
    let mut rows: Vec<IndexRow> = loaded
        .reports
        .iter()
        .map(|stored| {
            let report = HardwareReport::from_document(&stored.document);
            let report_id = report.report_id.as_deref().unwrap_or("").trim().to_string();
            let timestamp = report.timestamp.as_deref().unwrap_or("").trim().to_string();
            IndexRow {
                parsed_timestamp: parse_timestamp(&timestamp),
                report_id,
                timestamp,
                file_name: stored.file_name.clone(),
                report,
            }
        })
        .collect();
    sort_rows(&mut rows);
    rows
}

/// Newest first; unparsable timestamps sort as the oldest, ties by id
/// descending.
pub fn sort_rows(rows: &mut [IndexRow]) {
    let earliest = PrimitiveDateTime::MIN.assume_utc();
    rows.sort_by(|a, b| {
        let ka = (a.parsed_timestamp.unwrap_or(earliest), a.report_id.as_str());
        let kb = (b.parsed_timestamp.unwrap_or(earliest), b.report_id.as_str());
        kb.cmp(&ka)
    });
}

/// ISO-8601 timestamps; a trailing `Z` means UTC and a missing offset is read
/// as UTC. Anything else is `None`.
pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    let ts = value.trim();
    if ts.is_empty() {
        return None;
    }
    let ts = match ts.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => ts.to_string(),
    };

    if let Ok(dt) = OffsetDateTime::parse(&ts, &Rfc3339) {
        return Some(dt);
    }

    let with_offset = [
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
        ),
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
        ),
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute][offset_hour sign:mandatory]:[offset_minute]"
        ),
    ];
    for fmt in with_offset {
        if let Ok(dt) = OffsetDateTime::parse(&ts, fmt) {
            return Some(dt);
        }
    }

    let naive = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    ];
    for fmt in naive {
        if let Ok(dt) = PrimitiveDateTime::parse(&ts, fmt) {
            return Some(dt.assume_utc());
        }
    }

    Date::parse(&ts, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}

/// Cuts `s` to `max` characters, marking the cut with `…`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

/// Rewrites the results index, the site index, the database page and the
/// JSON catalog from the current store contents.
pub fn rebuild(
    store: &ReportStore,
    opts: &IndexOptions,
    now: OffsetDateTime,
) -> Result<RebuildOutcome> {
    let loaded = store.load_all();
    let every_row = all_rows(&loaded);
    let rows: Vec<IndexRow> = every_row
        .iter()
        .filter(|row| !row.report_id.is_empty())
        .cloned()
        .collect();
    let mut written = Vec::new();

    let results_index = opts.results_index();
    update_marked_section(&results_index, &render_reports_table(&rows, "./", None))?;
    written.push(results_index);

    update_marked_section(
        &opts.site_index,
        &render_reports_table(&rows, "./results/", Some(opts.summary_limit)),
    )?;
    written.push(opts.site_index.clone());

    write_file(&opts.database, &render_database(&every_row, &opts.database_title))?;
    written.push(opts.database.clone());

    let catalog = build_catalog(&every_row, now);
    let mut s = serde_json::to_string_pretty(&catalog).context("failed to serialize catalog")?;
    s.push('\n');
    write_file(&opts.catalog, &s)?;
    written.push(opts.catalog.clone());

    Ok(RebuildOutcome {
        count: rows.len(),
        written,
        skipped: loaded.skipped,
    })
}

pub(crate) fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write: {}", path.display()))
}
