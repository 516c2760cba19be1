// ABOUTME: Columns command implementation - report schema drift for the primary table
// ABOUTME: Discovers development columns and reconciles them with the production snapshot

use crate::config::ExportConfig;
use crate::export::{self, ColumnReconciliation};
use crate::postgres;
use anyhow::{Context, Result};
use std::collections::BTreeSet;

/// Discover the primary table's development columns and reconcile them
///
/// Prints the reconciliation as JSON on stdout when `json` is set, otherwise
/// logs a human-readable report. Nothing is exported.
pub async fn columns(config: &ExportConfig, json: bool) -> Result<ColumnReconciliation> {
    config.validate()?;
    let prod = config.production_columns()?;
    let dev = discover_primary_columns(config).await?;

    let reconciliation = export::reconcile(&dev, &prod);

    if json {
        println!("{}", render_json(&reconciliation)?);
    } else {
        log_reconciliation(&dev, &prod, &reconciliation);
    }

    Ok(reconciliation)
}

/// Render the reconciliation as the JSON document printed by `columns --json`
pub fn render_json(reconciliation: &ColumnReconciliation) -> Result<String> {
    serde_json::to_string_pretty(reconciliation).context("Failed to serialize column report")
}

/// Connect to the development database and list the primary table's columns
pub(crate) async fn discover_primary_columns(config: &ExportConfig) -> Result<Vec<String>> {
    tracing::info!("Connecting to development database...");
    let password = config.resolved_password();
    let client = postgres::connect(&config.source, password.as_deref())
        .await
        .context("Failed to connect to development database")?;
    tracing::info!("✓ Connected to {}", config.source.database);

    let dev = export::discover_columns(
        &client,
        &config.primary.table,
        config.primary.schema.as_deref(),
    )
    .await?;

    if dev.is_empty() {
        tracing::warn!(
            "⚠ Table '{}' has no columns in the development database (does it exist?)",
            config.primary.table
        );
    }

    Ok(dev)
}

/// Log column counts and both one-sided differences
pub(crate) fn log_reconciliation(
    dev: &[String],
    prod: &BTreeSet<String>,
    reconciliation: &ColumnReconciliation,
) {
    tracing::info!("Dev columns: {}", dev.len());
    tracing::info!("Prod columns: {}", prod.len());
    tracing::info!("Common columns: {}", reconciliation.common.len());
    if reconciliation.is_exact_match() {
        tracing::info!("✓ Development and production columns match");
    }
    tracing::info!("Dev-only (skipped): {}", reconciliation.dev_only.len());
    for column in &reconciliation.dev_only {
        tracing::info!("  - {}", column);
    }
    if !reconciliation.prod_only.is_empty() {
        tracing::info!(
            "Prod-only (not in dev): {}",
            reconciliation.prod_only.len()
        );
        for column in &reconciliation.prod_only {
            tracing::info!("  - {}", column);
        }
    }
}
