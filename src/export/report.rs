// ABOUTME: Per-statement outcomes and the aggregated report of an export run
// ABOUTME: Records exit status and captured output so failures never stop later exports

use crate::export::reconcile::ColumnReconciliation;
use crate::postgres::PsqlOutput;
use anyhow::{bail, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of exporting one table to one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportOutcome {
    pub table: String,
    pub path: PathBuf,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExportOutcome {
    /// Record a psql result, logging its output
    ///
    /// A psql that could not be started is recorded as a failed outcome
    /// carrying the error text.
    pub fn record(table: &str, path: PathBuf, result: Result<PsqlOutput>) -> Self {
        let outcome = match result {
            Ok(output) => Self {
                table: table.to_string(),
                path,
                success: output.success(),
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            },
            Err(e) => Self {
                table: table.to_string(),
                path,
                success: false,
                exit_code: None,
                stdout: String::new(),
                stderr: format!("{:#}", e),
            },
        };

        let stdout = outcome.stdout.trim();
        if !stdout.is_empty() {
            tracing::info!("  {}", stdout);
        }
        let stderr = outcome.stderr.trim();
        if !stderr.is_empty() {
            tracing::warn!("  STDERR: {}", stderr);
        }

        if outcome.success {
            tracing::info!("✓ Exported '{}' to {}", table, outcome.path.display());
        } else {
            tracing::error!(
                "✗ Export of '{}' failed (exit code: {})",
                table,
                outcome
                    .exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
        }

        outcome
    }

    /// Row count from psql's `COPY n` status line, if present
    pub fn rows_copied(&self) -> Option<u64> {
        self.stdout
            .lines()
            .rev()
            .find_map(|line| line.trim().strip_prefix("COPY "))
            .and_then(|n| n.trim().parse().ok())
    }
}

/// Everything an export run produced
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub columns: ColumnReconciliation,
    pub primary: ExportOutcome,
    pub import_header: PathBuf,
    pub auxiliary: Vec<ExportOutcome>,
}

impl ExportReport {
    /// All outcomes, primary table first
    pub fn outcomes(&self) -> impl Iterator<Item = &ExportOutcome> {
        std::iter::once(&self.primary).chain(self.auxiliary.iter())
    }

    pub fn failures(&self) -> Vec<&ExportOutcome> {
        self.outcomes().filter(|o| !o.success).collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes().all(|o| o.success)
    }

    /// Turn recorded failures into an error, for `export --strict`
    ///
    /// # Errors
    ///
    /// Returns an error naming every failed table when any export failed.
    pub fn into_strict_result(self) -> Result<Self> {
        let failures = self.failures();
        if !failures.is_empty() {
            bail!(
                "{} export(s) failed: {}",
                failures.len(),
                failures
                    .iter()
                    .map(|o| o.table.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Ok(self)
    }
}
