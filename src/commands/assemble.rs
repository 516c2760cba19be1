// ABOUTME: Assemble command implementation - turn exports into loadable psql scripts
// ABOUTME: Joins each import header with its exported data and the end-of-data marker

use crate::config::ExportConfig;
use crate::export::{self, statements};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Build `<table>_load.sql` scripts from the files of a previous `export` run
///
/// The primary table uses the generated import header so the column list
/// matches the filtered data. Auxiliary tables get a plain `COPY <table> FROM
/// STDIN` header. Tables whose data file is missing are skipped with a warning.
///
/// # Errors
///
/// Returns an error if the primary import header cannot be read, if a script
/// cannot be written, or if no script could be assembled at all.
pub fn assemble(config: &ExportConfig) -> Result<Vec<PathBuf>> {
    config.validate()?;
    tracing::info!(
        "Assembling load scripts in {}...",
        config.output.directory.display()
    );

    let mut written = Vec::new();

    let primary_data = config.primary_export_path();
    if primary_data.exists() {
        let header_path = config.primary_import_path();
        let header = std::fs::read_to_string(&header_path).with_context(|| {
            format!(
                "Failed to read import header {} (run 'export' first)",
                header_path.display()
            )
        })?;
        let output = config.table_load_path(&config.primary.table);
        export::assemble_script(&header, &primary_data, &output)?;
        tracing::info!("✓ {}", output.display());
        written.push(output);
    } else {
        tracing::warn!(
            "⚠ Skipping '{}': {} not found",
            config.primary.table,
            primary_data.display()
        );
    }

    for table in &config.auxiliary.tables {
        let data = config.table_export_path(table);
        if !data.exists() {
            tracing::warn!("⚠ Skipping '{}': {} not found", table, data.display());
            continue;
        }

        let output = config.table_load_path(table);
        export::assemble_script(&statements::table_import_header(table), &data, &output)?;
        tracing::info!("✓ {}", output.display());
        written.push(output);
    }

    if written.is_empty() {
        bail!(
            "No exported data found in {}. Run 'export' first.",
            config.output.directory.display()
        );
    }

    tracing::info!("✅ Assembled {} load script(s)", written.len());
    tracing::info!("  Load with: psql --dbname <production> --file <script>");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> ExportConfig {
        let mut config = ExportConfig::default();
        config.output.directory = dir.to_path_buf();
        config.auxiliary.tables = vec!["scrape_sessions".to_string(), "missing".to_string()];
        config
    }

    #[test]
    fn test_assemble_primary_and_auxiliary() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        std::fs::write(config.primary_export_path(), "1\t2024\n").unwrap();
        std::fs::write(
            config.primary_import_path(),
            "COPY \"uk_lrt\" (\"id\", \"year\") FROM STDIN WITH (FORMAT text);\n",
        )
        .unwrap();
        std::fs::write(config.table_export_path("scrape_sessions"), "7\tdone\n").unwrap();

        let written = assemble(&config).unwrap();
        assert_eq!(
            written,
            vec![
                config.table_load_path("uk_lrt"),
                config.table_load_path("scrape_sessions"),
            ]
        );

        let primary = std::fs::read_to_string(config.table_load_path("uk_lrt")).unwrap();
        assert_eq!(
            primary,
            "COPY \"uk_lrt\" (\"id\", \"year\") FROM STDIN WITH (FORMAT text);\n1\t2024\n\\.\n"
        );
        let aux = std::fs::read_to_string(config.table_load_path("scrape_sessions")).unwrap();
        assert!(aux.starts_with("COPY \"scrape_sessions\" FROM STDIN WITH (FORMAT text);\n"));
        assert!(!config.table_load_path("missing").exists());
    }

    #[test]
    fn test_assemble_without_header_fails() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::write(config.primary_export_path(), "1\n").unwrap();

        let err = assemble(&config).unwrap_err();
        assert!(format!("{:#}", err).contains("run 'export' first"));
    }

    #[test]
    fn test_assemble_nothing_exported() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let err = assemble(&config).unwrap_err();
        assert!(err.to_string().contains("No exported data found"));
    }
}
