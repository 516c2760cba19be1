// ABOUTME: Pre-flight validation command for an export run
// ABOUTME: Checks tools, configuration, connectivity, and that the tables exist

use crate::config::ExportConfig;
use crate::{export, postgres, utils};
use anyhow::{bail, Context, Result};

pub async fn validate(config: &ExportConfig) -> Result<()> {
    tracing::info!("Starting validation...");

    // Step 1: Client tools
    tracing::info!("Checking PostgreSQL client tools...");
    utils::check_required_tools()?;
    tracing::info!("✓ psql found");

    // Step 2: Configuration
    tracing::info!("Checking configuration...");
    config.validate()?;
    let prod = config.production_columns()?;
    tracing::info!("✓ Production snapshot has {} columns", prod.len());

    if config.output.directory.exists() && !config.output.directory.is_dir() {
        bail!(
            "Output path {} exists and is not a directory",
            config.output.directory.display()
        );
    }

    // Step 3: Connect to development database
    tracing::info!("Connecting to development database...");
    let password = config.resolved_password();
    let client = postgres::connect(&config.source, password.as_deref())
        .await
        .context("Failed to connect to development database")?;
    tracing::info!("✓ Connected to {}", config.source.database);

    // Step 4: Primary table shares columns with production
    tracing::info!("Checking primary table '{}'...", config.primary.table);
    let dev = export::discover_columns(
        &client,
        &config.primary.table,
        config.primary.schema.as_deref(),
    )
    .await?;
    if dev.is_empty() {
        bail!(
            "Table '{}' not found in database '{}'",
            utils::sanitize_identifier(&config.primary.table),
            config.source.database
        );
    }
    let columns = export::reconcile(&dev, &prod);
    if !columns.has_common_columns() {
        bail!(
            "Table '{}' shares no columns with the production snapshot",
            config.primary.table
        );
    }
    tracing::info!(
        "✓ {} of {} columns will be exported ({} skipped)",
        columns.common.len(),
        dev.len(),
        columns.dev_only.len()
    );

    // Step 5: Auxiliary tables exist
    let mut missing = Vec::new();
    for table in &config.auxiliary.tables {
        let cols = export::discover_columns(&client, table, None).await?;
        if cols.is_empty() {
            tracing::warn!("⚠ Auxiliary table '{}' not found", table);
            missing.push(utils::sanitize_identifier(table));
        } else {
            tracing::info!("✓ Auxiliary table '{}' ({} columns)", table, cols.len());
        }
    }
    if !missing.is_empty() {
        bail!("Auxiliary tables not found: {}", missing.join(", "));
    }

    tracing::info!("✅ Validation complete - ready to export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_validate_with_default_config() {
        let result = validate(&ExportConfig::default()).await;
        assert!(result.is_ok(), "{:?}", result);
    }

    #[tokio::test]
    async fn test_validate_with_unreachable_source_fails() {
        let mut config = ExportConfig::default();
        config.source.host = "127.0.0.1".to_string();
        config.source.port = 1;

        assert!(validate(&config).await.is_err());
    }
}
