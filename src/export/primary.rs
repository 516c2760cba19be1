// ABOUTME: Filtered export of the primary table and its import header template
// ABOUTME: Runs the column-restricted \copy and writes the matching COPY FROM STDIN header

use crate::export::report::ExportOutcome;
use crate::export::statements;
use crate::postgres::PsqlRunner;
use anyhow::{Context, Result};
use std::path::Path;

/// Export the common columns of the primary table to a COPY TEXT file
///
/// A failing `\copy` is returned as an unsuccessful outcome, not an error.
///
/// # Errors
///
/// Returns an error if `columns` is empty; nothing is run in that case.
pub fn export_primary<R: PsqlRunner>(
    runner: &R,
    schema: Option<&str>,
    table: &str,
    columns: &[String],
    output_path: &Path,
) -> Result<ExportOutcome> {
    let sql = statements::column_export_statement(schema, table, columns, output_path)?;

    tracing::info!(
        "Exporting '{}' ({} columns) to {}...",
        table,
        columns.len(),
        output_path.display()
    );

    Ok(ExportOutcome::record(
        table,
        output_path.to_path_buf(),
        runner.run(&sql),
    ))
}

/// Write the header-only import script for the primary table
///
/// The script holds just the `COPY ... FROM STDIN` line; the data and the
/// `\.` terminator are appended by `assemble`.
pub fn write_import_header(
    schema: Option<&str>,
    table: &str,
    columns: &[String],
    output_path: &Path,
) -> Result<()> {
    let header = statements::column_import_header(schema, table, columns)?;

    std::fs::write(output_path, header).with_context(|| {
        format!(
            "Failed to write import header: {}",
            output_path.display()
        )
    })?;

    tracing::info!("Generated {} (header only)", output_path.display());
    Ok(())
}
