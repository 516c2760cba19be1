// ABOUTME: Column discovery against information_schema
// ABOUTME: Lists a table's columns in ordinal order on the development database

use anyhow::{Context, Result};
use tokio_postgres::Client;

/// List the columns of a table in ordinal position order
///
/// With `schema` unset the lookup is limited to `current_schema()`, the schema
/// an unqualified `\copy` reads from. A table of the same name in another
/// schema is never mixed in. An unknown table yields an empty list rather than
/// an error; callers decide what that means.
pub async fn discover_columns(
    client: &Client,
    table: &str,
    schema: Option<&str>,
) -> Result<Vec<String>> {
    tracing::debug!(
        "Discovering columns for {}{}",
        schema.map(|s| format!("{}.", s)).unwrap_or_default(),
        table
    );

    let rows = match schema {
        Some(schema) => client
            .query(
                "SELECT column_name::text
                 FROM information_schema.columns
                 WHERE table_schema = $1 AND table_name = $2
                 ORDER BY ordinal_position",
                &[&schema, &table],
            )
            .await,
        None => client
            .query(
                "SELECT column_name::text
                 FROM information_schema.columns
                 WHERE table_schema = current_schema() AND table_name = $1
                 ORDER BY ordinal_position",
                &[&table],
            )
            .await,
    }
    .with_context(|| format!("Failed to list columns for table '{}'", table))?;

    let columns = rows
        .iter()
        .map(|row| row.get::<_, String>(0))
        .collect();

    Ok(columns)
}
