//! Report command implementation.
//!
//! Loads the Issues and Timelogs exports, runs the metrics engine and
//! prints the dashboard as text or JSON.

use std::io::{self, Write};

use chrono::Local;
use tracing::{info, warn};

use crate::analytics::{MetricsEngine, Report};
use crate::cli::{Cli, OutputFormat, ReportArgs};
use crate::error::{Result, TimelensError};
use crate::model::SnapshotLoader;
use crate::render::{TextRenderer, NO_DATA_MESSAGE};

/// Run the report command.
pub fn run(cli: &Cli, args: &ReportArgs) -> Result<()> {
    let mut config = cli.load_config()?;
    if let Some(days) = args.sprint_days {
        if days == 0 {
            return Err(TimelensError::InvalidArgument {
                name: "sprint-days".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        config.sprint.length_days = days;
    }

    let mut loader = SnapshotLoader::new().with_lenient(!args.strict);
    let snapshot = loader.load_files(&args.issues, &args.timelogs)?;
    let stats = loader.stats();
    if stats.records_skipped > 0 {
        warn!(
            skipped = stats.records_skipped,
            success_rate = stats.success_rate(),
            "Some records could not be decoded"
        );
    }

    let engine = MetricsEngine::from_config(&config);
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let report = match args.tz_offset {
        Some(offset) => engine.compute(&snapshot, &offset, today),
        None => engine.compute(&snapshot, &Local, today),
    };
    info!(empty = report.is_empty(), "Report computed");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.effective_output() {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
        OutputFormat::Text => match &report {
            Report::NoData => writeln!(out, "{NO_DATA_MESSAGE}")?,
            Report::Ready(dashboard) => {
                TextRenderer::new(&config.display)
                    .with_sections(&args.sections)
                    .render(&mut out, dashboard)?;
            }
        },
    }

    Ok(())
}
