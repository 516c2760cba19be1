// ABOUTME: SQL text for COPY TEXT exports and import headers
// ABOUTME: Builds quoted column lists, client-side \copy statements and COPY FROM STDIN headers

use crate::utils::{quote_identifier, quote_literal};
use anyhow::{bail, Result};
use std::path::Path;

/// End-of-data marker for `COPY ... FROM STDIN` in a psql script
pub const END_OF_DATA: &str = "\\.";

/// Build the comma-joined, quoted column list
///
/// # Errors
///
/// Returns an error for an empty list: `()` is not valid SQL, so a disjoint
/// column set is refused instead of producing a broken statement.
pub fn quoted_column_list(columns: &[String]) -> Result<String> {
    if columns.is_empty() {
        bail!(
            "No columns in common between development and production.\n\
             Refusing to build an export with an empty column list."
        );
    }

    Ok(columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", "))
}

/// Quote a table name, schema-qualified when a schema is given
pub fn qualified_table(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) => format!("{}.{}", quote_identifier(schema), quote_identifier(table)),
        None => quote_identifier(table),
    }
}

/// Client-side export of selected columns to a local COPY TEXT file
pub fn column_export_statement(
    schema: Option<&str>,
    table: &str,
    columns: &[String],
    path: &Path,
) -> Result<String> {
    let cols = quoted_column_list(columns)?;
    Ok(format!(
        "\\copy (SELECT {} FROM {}) TO {} WITH (FORMAT text)",
        cols,
        qualified_table(schema, table),
        quote_literal(&path.to_string_lossy())
    ))
}

/// Client-side export of a whole table to a local COPY TEXT file
pub fn table_export_statement(table: &str, path: &Path) -> String {
    format!(
        "\\copy {} TO {} WITH (FORMAT text)",
        quote_identifier(table),
        quote_literal(&path.to_string_lossy())
    )
}

/// Import header for data exported with [`column_export_statement`]
pub fn column_import_header(
    schema: Option<&str>,
    table: &str,
    columns: &[String],
) -> Result<String> {
    let cols = quoted_column_list(columns)?;
    Ok(format!(
        "COPY {} ({}) FROM STDIN WITH (FORMAT text);\n",
        qualified_table(schema, table),
        cols
    ))
}

/// Import header for data exported with [`table_export_statement`]
pub fn table_import_header(table: &str) -> String {
    format!(
        "COPY {} FROM STDIN WITH (FORMAT text);\n",
        quote_identifier(table)
    )
}
