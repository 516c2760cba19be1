// ABOUTME: Full-table exports for auxiliary tables with matching schemas
// ABOUTME: Exports each table independently; one failure never stops the rest

use crate::export::report::ExportOutcome;
use crate::export::statements;
use crate::postgres::PsqlRunner;
use std::path::{Path, PathBuf};

/// Export every auxiliary table in full, in the order given
///
/// `export_path` maps a table name to its output file. Each table gets its own
/// outcome; the loop continues past failures.
pub fn export_auxiliary_tables<R, F>(
    runner: &R,
    tables: &[String],
    export_path: F,
) -> Vec<ExportOutcome>
where
    R: PsqlRunner,
    F: Fn(&str) -> PathBuf,
{
    let mut outcomes = Vec::with_capacity(tables.len());

    for (idx, table) in tables.iter().enumerate() {
        let path = export_path(table.as_str());
        tracing::info!(
            "Exporting auxiliary table {}/{}: '{}'...",
            idx + 1,
            tables.len(),
            table
        );
        outcomes.push(export_table(runner, table, &path));
    }

    outcomes
}

/// Export one whole table to a COPY TEXT file
pub fn export_table<R: PsqlRunner>(runner: &R, table: &str, path: &Path) -> ExportOutcome {
    let sql = statements::table_export_statement(table, path);
    ExportOutcome::record(table, path.to_path_buf(), runner.run(&sql))
}
