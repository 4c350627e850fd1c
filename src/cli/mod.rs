use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::Serialize;
use time::OffsetDateTime;

use crate::config::Layout;
use crate::engine::{Engine, IngestOutcome};
use crate::event::InputSource;
use crate::index::RebuildOutcome;
use crate::logs::{RunCommand, RunRecord};
use crate::store::SkippedFile;
use crate::ui::UiConfig;

#[derive(Debug, Parser)]
#[command(
    name = "hwreport",
    version,
    about = "Ingest hardware-compatibility reports and regenerate the report indexes"
)]
pub struct Cli {
    /// Repository root that relative paths resolve against.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a submitted report, store it and rebuild the indexes.
    Ingest(IngestArgs),
    /// Rebuild the indexes from the stored reports.
    Rebuild,
    Config(ConfigArgs),
    Completion(CompletionArgs),
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Event document with an `issue.body` field (default: $GITHUB_EVENT_PATH).
    #[arg(long)]
    pub event: Option<PathBuf>,
    /// File containing the issue text itself.
    #[arg(long)]
    pub body: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Serialize)]
struct IngestSummary {
    report_id: String,
    dry_run: bool,
    report_file: String,
    detail_file: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    updated: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<SkippedFile>,
}

#[derive(Debug, Serialize)]
struct RebuildSummary {
    count: usize,
    updated: Vec<String>,
    skipped: Vec<SkippedFile>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let env_config_path = std::env::var_os("HWREPORT_CONFIG").map(PathBuf::from);
    let cfg = crate::config::load(cli.config.as_deref().or(env_config_path.as_deref()), &root)
        .map_err(crate::exit::invalid_args_err)?;

    let ui_cfg = UiConfig {
        json: cli.json,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    let engine = Engine::new(&cfg, cfg.layout(&root));

    match cli.command {
        Commands::Ingest(args) => {
            let started_at = OffsetDateTime::now_utc();
            let result = ingest(&engine, args, cli.dry_run);
            if !cli.dry_run {
                let record = match &result {
                    Ok(outcome) => ingest_record(engine.layout(), outcome),
                    Err(err) => RunRecord {
                        error: Some(err.to_string()),
                        ..RunRecord::default()
                    },
                };
                write_run_log(engine.layout(), RunCommand::Ingest, started_at, &record);
            }
            let outcome = result?;
            print_ingest(engine.layout(), &outcome, cli.dry_run, &ui_cfg)?;
        }
        Commands::Rebuild => {
            let started_at = OffsetDateTime::now_utc();
            let result = engine.rebuild();
            let record = match &result {
                Ok(outcome) => RunRecord {
                    written: display_paths(engine.layout(), &outcome.written),
                    skipped: outcome.skipped.clone(),
                    ..RunRecord::default()
                },
                Err(err) => RunRecord {
                    error: Some(err.to_string()),
                    ..RunRecord::default()
                },
            };
            write_run_log(engine.layout(), RunCommand::Rebuild, started_at, &record);
            let outcome = result?;
            print_rebuild(engine.layout(), &outcome, &ui_cfg)?;
        }
        Commands::Config(args) => {
            if args.show {
                if cli.json {
                    write_json(&cfg)?;
                } else {
                    print!("{}", toml::to_string_pretty(&cfg)?);
                }
            } else if !ui_cfg.quiet {
                eprintln!("config: use `hwreport config --show`");
            }
        }
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "hwreport", &mut out);
        }
    }

    Ok(())
}

fn ingest(engine: &Engine, args: IngestArgs, dry_run: bool) -> Result<IngestOutcome> {
    let source = InputSource::resolve(args.body, args.event).ok_or_else(|| {
        crate::exit::input_missing(format!("{} not set", crate::event::EVENT_PATH_ENV))
    })?;
    let body = source.read_body().map_err(crate::exit::input_missing_err)?;
    engine.ingest(&body, dry_run)
}

fn ingest_record(layout: &Layout, outcome: &IngestOutcome) -> RunRecord {
    let mut written = display_paths(
        layout,
        &[outcome.report_file.clone(), outcome.detail_file.clone()],
    );
    let mut skipped = Vec::new();
    if let Some(rebuild) = &outcome.rebuild {
        written.extend(display_paths(layout, &rebuild.written));
        skipped = rebuild.skipped.clone();
    }
    RunRecord {
        report_id: Some(outcome.report.id.to_string()),
        written,
        skipped,
        error: None,
    }
}

fn write_run_log(
    layout: &Layout,
    command: RunCommand,
    started_at: OffsetDateTime,
    record: &RunRecord,
) {
    let Some(dir) = layout.logs_dir.as_deref() else {
        return;
    };
    let finished_at = OffsetDateTime::now_utc();
    if let Err(err) = crate::logs::write_run_log(dir, command, started_at, finished_at, record) {
        crate::ui::warn(&format!(
            "{}: failed to write run log: {err}",
            command.as_str()
        ));
    }
}

fn print_ingest(
    layout: &Layout,
    outcome: &IngestOutcome,
    dry_run: bool,
    ui_cfg: &UiConfig,
) -> Result<()> {
    let report_file = layout.display(&outcome.report_file);
    let detail_file = layout.display(&outcome.detail_file);

    if let Some(rebuild) = &outcome.rebuild {
        crate::ui::print_skipped(&rebuild.skipped, ui_cfg);
    }

    if ui_cfg.json {
        let summary = IngestSummary {
            report_id: outcome.report.id.to_string(),
            dry_run,
            report_file,
            detail_file,
            updated: outcome
                .rebuild
                .as_ref()
                .map(|r| display_paths(layout, &r.written))
                .unwrap_or_default(),
            count: outcome.rebuild.as_ref().map(|r| r.count),
            skipped: outcome
                .rebuild
                .as_ref()
                .map(|r| r.skipped.clone())
                .unwrap_or_default(),
        };
        return write_json(&summary);
    }

    crate::ui::print_ingest(&report_file, &detail_file, dry_run, ui_cfg);
    Ok(())
}

fn print_rebuild(layout: &Layout, outcome: &RebuildOutcome, ui_cfg: &UiConfig) -> Result<()> {
    crate::ui::print_skipped(&outcome.skipped, ui_cfg);
    let updated = display_paths(layout, &outcome.written);

    if ui_cfg.json {
        return write_json(&RebuildSummary {
            count: outcome.count,
            updated,
            skipped: outcome.skipped.clone(),
        });
    }

    crate::ui::print_rebuild(&updated, ui_cfg);
    Ok(())
}

fn display_paths(layout: &Layout, paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| layout.display(p)).collect()
}

fn write_json<T: Serialize>(value: &T) -> Result<()> {
    use std::io::Write;

    let buf = serde_json::to_vec_pretty(value)?;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(&buf) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    }
    match stdout.write_all(b"\n") {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_args(format!(
            "unsupported shell: {other} (expected bash|zsh|fish)"
        ))),
    }
}
