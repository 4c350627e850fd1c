use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::{HardwareReport, ReportId, text_of};

pub const NONE_DETECTED: &str = "- None detected";

/// `<results_dir>/<id>/index.md`
pub fn detail_path(results_dir: &Path, id: &ReportId) -> PathBuf {
    results_dir.join(id.as_str()).join("index.md")
}

/// Markdown detail page for one report. Missing values render as empty
/// strings; no field line is ever omitted.
pub fn render_detail(id: &ReportId, report: &HardwareReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# Hardware Report: {id}"));
    lines.push(String::new());
    lines.push(format!("Timestamp (UTC): {}", s(&report.timestamp)));
    lines.push(String::new());
    lines.push("## Notes".to_string());
    lines.push(
        report
            .user_notes
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "None".to_string()),
    );
    lines.push(String::new());

    lines.push("## System".to_string());
    lines.push(format!("- OS: {}", s(&report.system.os_release)));
    lines.push(format!("- Kernel: {}", s(&report.system.kernel)));
    lines.push(format!("- Platform: {}", s(&report.system.platform)));
    lines.push(String::new());

    lines.push("## Processor".to_string());
    lines.push(format!("- Model: {}", s(&report.processor.model)));
    let cores = text_of(report.processor.cores.as_ref());
    lines.push(format!("- Cores: {}", s(&cores)));
    lines.push(String::new());

    lines.push("## Memory".to_string());
    let total_gb = text_of(report.memory.total_gb.as_ref());
    lines.push(format!("- Total (GB): {}", s(&total_gb)));
    if !report.memory.modules.is_empty() {
        lines.push(String::new());
        lines.push("### Modules".to_string());
        for m in &report.memory.modules {
            lines.push(format!(
                "- {} @ {} (configured: {}, maker: {})",
                s(&m.size),
                s(&m.speed),
                s(&m.configured_speed),
                s(&m.manufacturer)
            ));
        }
    }
    lines.push(String::new());

    lines.push("## Graphics".to_string());
    if report.graphics.is_empty() {
        lines.push(NONE_DETECTED.to_string());
    }
    for gpu in &report.graphics {
        lines.push(format!("- {} (driver: {})", s(&gpu.device), s(&gpu.driver)));
    }
    lines.push(String::new());

    lines.push("## Storage Controllers".to_string());
    if report.storage_controllers.is_empty() {
        lines.push(NONE_DETECTED.to_string());
    }
    for ctrl in &report.storage_controllers {
        lines.push(format!("- {}", s(&ctrl.device)));
    }

    let mut out = lines.join("\n").trim().to_string();
    out.push('\n');
    out
}

pub fn write_detail(results_dir: &Path, id: &ReportId, report: &HardwareReport) -> Result<PathBuf> {
    let path = detail_path(results_dir, id);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(&path, render_detail(id, report))
        .with_context(|| format!("failed to write report page: {}", path.display()))?;
    Ok(path)
}

fn s(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("")
}
