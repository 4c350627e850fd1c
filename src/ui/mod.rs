use anyhow::Error;
use std::io::{self, Write};

use crate::store::SkippedFile;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub json: bool,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "error:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "caused by:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "next:");
    let _ = writeln!(
        stderr,
        "  - re-run with `--verbose` to see report files skipped while indexing"
    );
    let _ = writeln!(
        stderr,
        "  - run `hwreport --help` for the available commands and options"
    );
}

pub fn warn(message: &str) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "warning: {message}");
}

/// Skipped store files only surface with `--verbose`.
pub fn print_skipped(skipped: &[SkippedFile], cfg: &UiConfig) {
    if !cfg.verbose {
        return;
    }
    for s in skipped {
        warn(&format!("skipped {}: {}", s.file_name, s.reason));
    }
}

pub fn print_ingest(report_file: &str, detail_file: &str, dry_run: bool, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    if dry_run {
        let _ = writeln!(out, "dry-run: would write {report_file} and {detail_file}");
    } else {
        let _ = writeln!(out, "Wrote {report_file} and {detail_file}");
    }
}

pub fn print_rebuild(updated: &[String], cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "Updated {}", join_paths(updated));
}

/// `a`, `a and b`, `a, b and c`.
pub fn join_paths(paths: &[String]) -> String {
    match paths {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_paths_reads_naturally() {
        assert_eq!(join_paths(&[]), "");
        assert_eq!(join_paths(&["a".to_string()]), "a");
        assert_eq!(
            join_paths(&["a".to_string(), "b".to_string()]),
            "a and b"
        );
        assert_eq!(
            join_paths(&["a".to_string(), "b".to_string(), "c".to_string()]),
            "a, b and c"
        );
    }
}
