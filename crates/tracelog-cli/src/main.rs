mod commands;
mod logging;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use tracelog_core::storage::{self, DataTable, Database, LoadRequest};
use tracelog_core::{annotation, increments, nodes, reconcile, table, AppConfig, UserIds};
use tracing::{error, info, warn};

/// Exit status when the annotation argument is not an nml/xml path.
const USAGE_EXIT: u8 = 2;

fn main() -> ExitCode {
    dotenv().ok();

    let args = Cli::parse();
    let guard = logging::init_logger(args.quiet);

    let code = match run(args) {
        Ok(code) => code,
        Err(err) => {
            error!("Error: {:#}", err);
            1
        }
    };

    // Flush buffered file logs before the process exits.
    drop(guard);
    ExitCode::from(code)
}

fn run(args: Cli) -> Result<u8> {
    let config =
        tracelog_core::config::load_configuration().context("loading configuration")?;

    match args.command {
        Some(Commands::Append { annotation, log }) => return run_append(&annotation, &log),
        Some(Commands::AppendDir { dir, log }) => run_append_dir(&config, &dir, &log)?,
        Some(Commands::Reconcile { files, users, out }) => {
            run_reconcile(&config, &files, &users, &out)?
        }
        Some(Commands::Increments { files, out }) => run_increments(&files, &out)?,
        Some(Commands::Nodes { annotation, out }) => run_nodes(&annotation, &out)?,
        Some(Commands::Load {
            csv,
            table,
            types,
            columns,
            db,
            keep_existing,
            dry_run,
        }) => {
            let mut request = LoadRequest {
                table_name: table,
                columns,
                types,
                replace: !keep_existing,
                date_format: config.date_format,
            };
            if request.columns.as_ref().is_some_and(|c| c.is_empty()) {
                request.columns = None;
            }
            let db_path = db.unwrap_or_else(|| config.database_path.clone());
            run_load(&csv, &db_path, &request, dry_run)?
        }
        Some(Commands::PrintConfig) => println!("Configuration: {:?}", config),
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(0)
}

fn run_append(annotation_path: &Path, log: &Path) -> Result<u8> {
    if let Err(err) = annotation::ensure_annotation_path(annotation_path) {
        eprintln!("{}", err);
        eprintln!("usage: tracelog append <nml/xml file> <log file>");
        return Ok(USAGE_EXIT);
    }

    let props = annotation::append_to_log(annotation_path, log)
        .with_context(|| format!("appending {}", annotation_path.display()))?;
    info!(
        "{}: {} nodes, {} ms -> {}",
        annotation_path.display(),
        format!("{}", props.num_nodes).green(),
        format!("{}", props.time_ms).green(),
        log.display()
    );
    Ok(0)
}

fn run_append_dir(config: &AppConfig, dir: &Path, log: &Path) -> Result<()> {
    let outcome = annotation::append_directory(dir, log, &config.annotation_extensions)
        .with_context(|| format!("walking {}", dir.display()))?;
    info!(
        "{} files appended, {} failed",
        format!("{}", outcome.appended.len()).green(),
        format!("{}", outcome.failed.len()).red(),
    );
    if !outcome.failed.is_empty() {
        anyhow::bail!("{} annotation files could not be read", outcome.failed.len());
    }
    Ok(())
}

fn run_reconcile(config: &AppConfig, files: &Path, users: &Path, out: &Path) -> Result<()> {
    let file_records = table::read_file_records(files)
        .with_context(|| format!("reading file table {}", files.display()))?;
    let activity = table::read_user_activity(users)
        .with_context(|| format!("reading activity sheet {}", users.display()))?;

    let roots = tracelog_core::derive_roots(&file_records, &config.excluded_root_marker);
    if !roots.unresolved.is_empty() {
        warn!("No root for cell ids {:?}", roots.unresolved);
    }

    let mut user_ids = UserIds::new();
    let result = reconcile::build_filenames(&file_records, &activity, &roots, &mut user_ids);
    table::write_reconciled(&result.records, out)
        .with_context(|| format!("writing {}", out.display()))?;

    info!(
        "{} files attributed to {} users, {} misses -> {}",
        format!("{}", result.records.len()).green(),
        format!("{}", user_ids.len()).cyan(),
        format!("{}", result.misses.len()).red(),
        out.display()
    );
    Ok(())
}

fn run_increments(files: &Path, out: &Path) -> Result<()> {
    let file_records = table::read_file_records(files)
        .with_context(|| format!("reading file table {}", files.display()))?;
    let rows = increments::increment_records(&file_records);
    table::write_increments(&rows, out).with_context(|| format!("writing {}", out.display()))?;
    info!("{} increment rows -> {}", rows.len(), out.display());
    Ok(())
}

fn run_nodes(annotation_path: &Path, out: &Path) -> Result<()> {
    let tuples = nodes::read_node_tuples(annotation_path)
        .with_context(|| format!("reading nodes of {}", annotation_path.display()))?;
    nodes::write_node_tuples(&tuples, out).with_context(|| format!("writing {}", out.display()))?;
    info!("{} node tuples -> {}", tuples.len(), out.display());
    Ok(())
}

fn run_load(csv: &Path, db_path: &str, request: &LoadRequest, dry_run: bool) -> Result<()> {
    let data = DataTable::from_csv_path(csv).with_context(|| format!("reading {}", csv.display()))?;
    let mut db = Database::open(db_path).with_context(|| format!("opening {}", db_path))?;

    let tx = db.begin()?;
    let rows = storage::load_table(&tx, &data, request)
        .with_context(|| format!("loading {} into {}", csv.display(), request.table_name))?;

    if dry_run {
        info!(
            "{} rows staged into {}; rolled back (dry run)",
            format!("{}", rows).yellow(),
            request.table_name
        );
        tx.rollback()?;
    } else {
        tx.commit()?;
        info!(
            "{} rows committed to {} in {}",
            format!("{}", rows).green(),
            request.table_name,
            db_path
        );
    }
    Ok(())
}
