use std::path::PathBuf;

use anyhow::Result;
use time::OffsetDateTime;

use crate::config::{EffectiveConfig, Layout};
use crate::core::ValidatedReport;
use crate::index::{IndexOptions, RebuildOutcome};
use crate::store::ReportStore;

#[derive(Debug, Clone)]
pub struct Engine {
    layout: Layout,
    store: ReportStore,
    index_opts: IndexOptions,
}

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub report: ValidatedReport,
    pub report_file: PathBuf,
    pub detail_file: PathBuf,
    /// `None` for a dry run.
    pub rebuild: Option<RebuildOutcome>,
}

impl Engine {
    pub fn new(cfg: &EffectiveConfig, layout: Layout) -> Self {
        let store = ReportStore::new(&layout.reports_dir);
        let index_opts = cfg.index_options(&layout);
        Self {
            layout,
            store,
            index_opts,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Parses and validates `body`, then persists the report, writes its
    /// detail page and rebuilds every aggregate document. Nothing is written
    /// unless validation passes.
    pub fn ingest(&self, body: &str, dry_run: bool) -> Result<IngestOutcome> {
        let report = crate::parse::parse_report(body)?;
        let report_file = self.store.path_for(&report.id);
        let detail_file = crate::render::detail_path(&self.layout.results_dir, &report.id);

        if dry_run {
            return Ok(IngestOutcome {
                report,
                report_file,
                detail_file,
                rebuild: None,
            });
        }

        let report_file = self.store.save(&report)?;
        let detail_file =
            crate::render::write_detail(&self.layout.results_dir, &report.id, &report.view())?;
        let rebuild = self.rebuild()?;

        Ok(IngestOutcome {
            report,
            report_file,
            detail_file,
            rebuild: Some(rebuild),
        })
    }

    pub fn rebuild(&self) -> Result<RebuildOutcome> {
        crate::index::rebuild(&self.store, &self.index_opts, OffsetDateTime::now_utc())
    }
}
