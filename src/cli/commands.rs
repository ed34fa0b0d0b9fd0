use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{BuildService, PublishService, PublishSummary};
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::infrastructure::traits::RealCommandRunner;
use crate::infrastructure::BqLoader;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Build { source_dir, output }) => {
            _build(source_dir.as_deref(), output.as_deref())
        }
        Some(Commands::Publish {
            db_path,
            target,
            dry_run,
        }) => _publish(db_path, target.as_deref(), *dry_run),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

#[instrument]
fn _build(source_dir: Option<&Path>, output: Option<&Path>) -> CliResult<()> {
    let source_dir = source_dir.unwrap_or(Path::new("."));
    debug!("source_dir: {:?}, output: {:?}", source_dir, output);

    if !source_dir.is_dir() {
        return Err(CliError::InvalidArgs(format!(
            "source directory does not exist: {}",
            source_dir.display()
        )));
    }

    let settings = Arc::new(Settings::load()?);
    let report = BuildService::new(settings).build(source_dir, output)?;

    output::success(&format!(
        "{} rows written to {}",
        report.total_rows,
        report.db_path.display()
    ));
    output::detail(&format!("rows with titles: {}", report.titled_rows));

    output::header("Level distribution");
    for (level, count) in &report.level_distribution {
        output::detail(&format!("level {level}: {count}"));
    }

    if report.orphans > 0 {
        output::warning(&format!(
            "{} rows reference a parent that is not in the table",
            report.orphans
        ));
    }
    if report.subgroup_fallbacks > 0 {
        output::warning(&format!(
            "{} subgroup rows resolved their parent via the subclass-prefix fallback",
            report.subgroup_fallbacks
        ));
    }

    Ok(())
}

#[instrument]
fn _publish(db_path: &PathBuf, target: Option<&str>, dry_run: bool) -> CliResult<()> {
    debug!("db_path: {:?}, target: {:?}, dry_run: {}", db_path, target, dry_run);

    let settings = Settings::load()?;
    let target = match target {
        Some(t) => t.to_string(),
        None => settings.warehouse.target().ok_or_else(|| {
            CliError::Usage(
                "no warehouse target configured; pass --target or set \
                 CPCDB_WAREHOUSE__PROJECT and CPCDB_WAREHOUSE__DATASET"
                    .to_string(),
            )
        })?,
    };

    let loader = Arc::new(BqLoader::new(Arc::new(RealCommandRunner)));
    let summary = PublishService::new(loader).publish(db_path, &target, dry_run)?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &PublishSummary) {
    if summary.dry_run {
        output::header(&format!(
            "[dry run] would load {} rows into {}",
            summary.total_rows, summary.target
        ));
        for row in &summary.sample {
            let title = if row.title_en.is_empty() {
                "(no title)"
            } else {
                row.title_en.as_str()
            };
            output::detail(&format!("{}: {}", row.symbol_short, title));
            if let Some(external) = &row.symbol_external {
                output::detail(&format!("  symbol_external: {external}"));
            }
            if !row.title_full.is_empty() {
                output::detail(&format!("  title_full: {}", row.title_full));
            }
        }
        return;
    }

    output::success(&format!(
        "loaded {} rows into {}",
        summary.total_rows, summary.target
    ));
    output::detail(&format!(
        "rows with external symbol: {}",
        summary.external_rows
    ));
    output::detail(&format!("rows with full title: {}", summary.full_title_rows));
}
