// ABOUTME: Export command implementation - filtered primary export plus auxiliary dumps
// ABOUTME: Reconciles columns, runs every \copy, and reports per-table outcomes

use crate::commands::columns::{discover_primary_columns, log_reconciliation};
use crate::config::ExportConfig;
use crate::export::{self, ExportReport};
use crate::postgres::{Psql, PsqlRunner};
use anyhow::{bail, Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Export the primary table restricted to production columns, then the auxiliary tables
///
/// Steps:
/// 1. Validates the configuration and loads the production column snapshot
/// 2. Discovers the primary table's columns on the development database
/// 3. Reconciles them with the snapshot
/// 4. Exports the common columns and writes the import header
/// 5. Exports each auxiliary table in full
///
/// Failed `\copy` runs are logged and recorded in the report; later exports
/// still run. With `strict`, any such failure turns into an error after the
/// report is logged.
///
/// # Errors
///
/// This function will return an error if:
/// - The configuration is invalid or the snapshot cannot be loaded
/// - The development database cannot be reached or queried
/// - No columns are shared with production
/// - The import header cannot be written
/// - The user declines overwriting existing output files
/// - `strict` is set and any export failed
pub async fn export(
    config: &ExportConfig,
    skip_confirmation: bool,
    strict: bool,
) -> Result<ExportReport> {
    tracing::info!("Starting export of '{}'...", config.primary.table);

    config.validate()?;
    crate::utils::check_required_tools()?;
    let prod = config.production_columns()?;

    if !skip_confirmation && !confirm_overwrite(config, std::io::stdin().is_terminal())? {
        bail!("Export cancelled by user");
    }

    std::fs::create_dir_all(&config.output.directory).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output.directory.display()
        )
    })?;

    let dev = discover_primary_columns(config).await?;
    let runner = Psql::new(config.source.clone(), config.resolved_password());
    let report = run_export(config, &runner, &dev, &prod)?;

    log_summary(&report);

    if strict {
        return report.into_strict_result();
    }

    Ok(report)
}

/// Reconcile and export using an already-discovered development column list
///
/// # Errors
///
/// Returns an error if no columns are shared with production (before anything
/// is run or written) or if the import header cannot be written.
pub fn run_export<R: PsqlRunner>(
    config: &ExportConfig,
    runner: &R,
    dev: &[String],
    prod: &BTreeSet<String>,
) -> Result<ExportReport> {
    let columns = export::reconcile(dev, prod);
    log_reconciliation(dev, prod, &columns);

    if !columns.has_common_columns() {
        bail!(
            "Table '{}' shares no columns with the production snapshot.\n\
             Nothing was exported. Check primary.table and the snapshot.",
            config.primary.table
        );
    }

    let schema = config.primary.schema.as_deref();
    let primary = export::export_primary(
        runner,
        schema,
        &config.primary.table,
        &columns.common,
        &config.primary_export_path(),
    )?;

    let import_header = config.primary_import_path();
    export::write_import_header(schema, &config.primary.table, &columns.common, &import_header)?;

    let auxiliary =
        export::export_auxiliary_tables(runner, &config.auxiliary.tables, |table| {
            config.table_export_path(table)
        });

    Ok(ExportReport {
        columns,
        primary,
        import_header,
        auxiliary,
    })
}

/// Output files left by an earlier run
fn existing_outputs(config: &ExportConfig) -> Vec<PathBuf> {
    config
        .output_paths()
        .into_iter()
        .filter(|p| p.exists())
        .collect()
}

/// Ask before replacing output files left by an earlier run
///
/// Without a terminal on stdin there is nobody to ask; the files are
/// overwritten with a warning, as a plain unattended run always did.
fn confirm_overwrite(config: &ExportConfig, interactive: bool) -> Result<bool> {
    let existing = existing_outputs(config);

    if existing.is_empty() {
        return Ok(true);
    }

    if !interactive {
        tracing::warn!(
            "⚠ stdin is not a terminal; overwriting {} existing export file(s) without asking",
            existing.len()
        );
        for path in &existing {
            tracing::warn!("  {}", path.display());
        }
        return Ok(true);
    }

    println!();
    println!("The following files will be overwritten:");
    for path in &existing {
        println!("  {}", path.display());
    }
    println!();

    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Overwrite existing export files?")
        .default(false)
        .interact()
        .context("Failed to get confirmation (pass -y to overwrite without asking)")
}

fn log_summary(report: &ExportReport) {
    tracing::info!("");
    tracing::info!("========================================");
    tracing::info!("Export Summary");
    tracing::info!("========================================");
    for outcome in report.outcomes() {
        if outcome.success {
            match outcome.rows_copied() {
                Some(rows) => tracing::info!("✓ {} ({} rows)", outcome.path.display(), rows),
                None => tracing::info!("✓ {}", outcome.path.display()),
            }
        } else {
            tracing::error!("✗ {} (failed)", outcome.path.display());
        }
    }
    tracing::info!("✓ {} (header only)", report.import_header.display());
    tracing::info!("========================================");

    let failures = report.failures();
    if failures.is_empty() {
        tracing::info!("✅ Export complete");
    } else {
        tracing::warn!("⚠ Export finished with {} failure(s)", failures.len());
        tracing::warn!("  Review the STDERR output above for details");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postgres::PsqlOutput;
    use std::cell::RefCell;
    use tempfile::tempdir;

    struct FakeRunner {
        calls: RefCell<Vec<String>>,
    }

    impl PsqlRunner for FakeRunner {
        fn run(&self, sql: &str) -> Result<PsqlOutput> {
            self.calls.borrow_mut().push(sql.to_string());
            Ok(PsqlOutput {
                stdout: "COPY 1\n".to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            })
        }
    }

    fn list(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_existing_outputs_lists_only_present_files() {
        let dir = tempdir().unwrap();
        let mut config = ExportConfig::default();
        config.output.directory = dir.path().to_path_buf();
        assert!(existing_outputs(&config).is_empty());

        std::fs::write(config.primary_import_path(), "COPY").unwrap();
        std::fs::write(config.table_export_path("scrape_sessions"), "").unwrap();

        assert_eq!(
            existing_outputs(&config),
            vec![
                config.primary_import_path(),
                config.table_export_path("scrape_sessions"),
            ]
        );
    }

    #[test]
    fn test_confirm_overwrite_without_terminal_proceeds() {
        let dir = tempdir().unwrap();
        let mut config = ExportConfig::default();
        config.output.directory = dir.path().to_path_buf();
        std::fs::write(config.primary_export_path(), "1\tvalue\n").unwrap();

        // Must not reach the dialoguer prompt
        assert!(confirm_overwrite(&config, false).unwrap());
    }

    #[test]
    fn test_confirm_overwrite_with_nothing_to_overwrite() {
        let dir = tempdir().unwrap();
        let mut config = ExportConfig::default();
        config.output.directory = dir.path().to_path_buf();

        assert!(confirm_overwrite(&config, true).unwrap());
    }

    #[test]
    fn test_run_export_disjoint_schemas_runs_nothing() {
        let dir = tempdir().unwrap();
        let mut config = ExportConfig::default();
        config.output.directory = dir.path().to_path_buf();

        let runner = FakeRunner {
            calls: RefCell::new(Vec::new()),
        };
        let prod: BTreeSet<String> = list(&["title"]).into_iter().collect();

        let err = run_export(&config, &runner, &list(&["a", "b"]), &prod).unwrap_err();
        assert!(err.to_string().contains("shares no columns"));
        assert!(runner.calls.borrow().is_empty());
        assert!(!config.primary_import_path().exists());
    }

    #[test]
    fn test_run_export_order_of_statements() {
        let dir = tempdir().unwrap();
        let mut config = ExportConfig::default();
        config.output.directory = dir.path().to_path_buf();
        config.auxiliary.tables = list(&["scrape_sessions"]);

        let runner = FakeRunner {
            calls: RefCell::new(Vec::new()),
        };
        let prod: BTreeSet<String> = list(&["id", "year"]).into_iter().collect();

        let report = run_export(&config, &runner, &list(&["year", "extra", "id"]), &prod).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].contains("SELECT \"year\", \"id\" FROM \"uk_lrt\""));
        assert!(calls[1].starts_with("\\copy \"scrape_sessions\""));
        assert_eq!(report.columns.dev_only, list(&["extra"]));
        assert!(report.all_succeeded());
    }
}
