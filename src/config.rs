// ABOUTME: TOML configuration for connection parameters, tables and output paths
// ABOUTME: Loads the production column snapshot from inline lists or versioned files

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Environment variable consulted when the config file carries no password
pub const PASSWORD_ENV_VAR: &str = "PG_COLUMN_EXPORT_PASSWORD";

/// Primary table the built-in production snapshot describes
pub const DEFAULT_PRIMARY_TABLE: &str = "uk_lrt";

/// Complete configuration for one export run
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub source: SourceConfig,
    pub primary: PrimaryTableConfig,
    pub auxiliary: AuxiliaryConfig,
    pub output: OutputConfig,
}

/// Connection parameters for the development database
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub ssl_mode: SslMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    Disable,
    #[default]
    Prefer,
    Require,
}

impl SslMode {
    /// Value understood by libpq's `PGSSLMODE`
    pub fn as_libpq(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
        }
    }
}

/// The filtered table and the production schema snapshot it is reconciled against
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrimaryTableConfig {
    pub table: String,
    pub schema: Option<String>,
    pub production_columns: Option<Vec<String>>,
    pub production_columns_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuxiliaryConfig {
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5436,
            user: "postgres".to_string(),
            password: None,
            database: "sertantai_legal_dev".to_string(),
            ssl_mode: SslMode::Prefer,
        }
    }
}

impl Default for PrimaryTableConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_PRIMARY_TABLE.to_string(),
            schema: None,
            production_columns: Some(
                DEFAULT_PRODUCTION_COLUMNS
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            ),
            production_columns_file: None,
        }
    }
}

impl Default for AuxiliaryConfig {
    fn default() -> Self {
        Self {
            tables: vec![
                "cascade_affected_laws".to_string(),
                "scrape_sessions".to_string(),
                "scrape_session_records".to_string(),
            ],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("/tmp"),
        }
    }
}

impl ExportConfig {
    /// Password from the config file, falling back to [`PASSWORD_ENV_VAR`]
    pub fn resolved_password(&self) -> Option<String> {
        self.source
            .password
            .clone()
            .or_else(|| std::env::var(PASSWORD_ENV_VAR).ok())
            .filter(|p| !p.is_empty())
    }

    /// Path of the filtered data file for the primary table
    pub fn primary_export_path(&self) -> PathBuf {
        self.table_export_path(&self.primary.table)
    }

    /// Path of the import header script for the primary table
    pub fn primary_import_path(&self) -> PathBuf {
        self.output
            .directory
            .join(format!("{}_import.sql", self.primary.table))
    }

    pub fn table_export_path(&self, table: &str) -> PathBuf {
        self.output.directory.join(format!("{}_export.tsv", table))
    }

    /// Path of the assembled, ready-to-load script for a table
    pub fn table_load_path(&self, table: &str) -> PathBuf {
        self.output.directory.join(format!("{}_load.sql", table))
    }

    /// Every file an `export` run writes, primary table first
    pub fn output_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.primary_export_path(), self.primary_import_path()];
        paths.extend(
            self.auxiliary
                .tables
                .iter()
                .map(|t| self.table_export_path(t)),
        );
        paths
    }

    /// Check the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any table name or the database name is empty
    /// - Both or neither of `production_columns` and `production_columns_file` are set
    /// - An auxiliary table is listed twice or repeats the primary table
    pub fn validate(&self) -> Result<()> {
        if self.source.database.trim().is_empty() {
            bail!("source.database cannot be empty");
        }
        if self.source.host.trim().is_empty() {
            bail!("source.host cannot be empty");
        }
        if self.primary.table.trim().is_empty() {
            bail!("primary.table cannot be empty");
        }

        match (
            &self.primary.production_columns,
            &self.primary.production_columns_file,
        ) {
            (Some(_), Some(_)) => bail!(
                "Set either primary.production_columns or primary.production_columns_file, not both"
            ),
            (None, None) => bail!(
                "No production column snapshot configured for table '{}'.\n\
                 Set primary.production_columns or primary.production_columns_file",
                self.primary.table
            ),
            _ => {}
        }

        let mut seen = BTreeSet::new();
        for table in &self.auxiliary.tables {
            if table.trim().is_empty() {
                bail!("auxiliary.tables contains an empty table name");
            }
            if table == &self.primary.table {
                bail!(
                    "Table '{}' is both the primary table and an auxiliary table",
                    table
                );
            }
            if !seen.insert(table.as_str()) {
                bail!("Auxiliary table '{}' is listed more than once", table);
            }
        }

        Ok(())
    }

    /// Resolve the production column snapshot into a set
    ///
    /// Inline columns are used as-is. A snapshot file holds one column name per
    /// line; blank lines and lines starting with `#` are skipped. Names are not
    /// normalized beyond stripping the line terminator.
    pub fn production_columns(&self) -> Result<BTreeSet<String>> {
        let columns: BTreeSet<String> = if let Some(inline) = &self.primary.production_columns {
            inline.iter().cloned().collect()
        } else if let Some(path) = &self.primary.production_columns_file {
            let content = std::fs::read_to_string(path).with_context(|| {
                format!(
                    "Failed to read production column snapshot: {}",
                    path.display()
                )
            })?;
            parse_column_snapshot(&content)
        } else {
            bail!("No production column snapshot configured");
        };

        if columns.is_empty() {
            bail!("Production column snapshot is empty");
        }

        Ok(columns)
    }
}

/// Parse a newline-delimited column snapshot
pub fn parse_column_snapshot(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .map(|line| line.to_string())
        .collect()
}

/// Load configuration from a TOML file, or the built-in defaults when no path is given
///
/// A relative `production_columns_file` is resolved against the directory of the
/// config file.
pub fn load_config(path: Option<&Path>) -> Result<ExportConfig> {
    let Some(path) = path else {
        tracing::debug!("No config file given, using built-in defaults");
        return Ok(ExportConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let mut config = parse_config(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    if let Some(file) = &config.primary.production_columns_file {
        if file.is_relative() {
            if let Some(parent) = path.parent() {
                config.primary.production_columns_file = Some(parent.join(file));
            }
        }
    }

    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse configuration from TOML text
///
/// Naming a `production_columns_file` replaces the built-in inline snapshot.
/// The built-in snapshot describes `uk_lrt` only: a config naming another
/// primary table must bring its own snapshot.
pub fn parse_config(content: &str) -> Result<ExportConfig> {
    let mut config: ExportConfig =
        toml::from_str(content).context("Failed to parse TOML configuration")?;

    let raw: toml::Value = toml::from_str(content).context("Failed to parse TOML configuration")?;
    let inline_given = raw
        .get("primary")
        .and_then(|p| p.get("production_columns"))
        .is_some();
    if !inline_given
        && (config.primary.production_columns_file.is_some()
            || config.primary.table != DEFAULT_PRIMARY_TABLE)
    {
        config.primary.production_columns = None;
    }

    Ok(config)
}

/// Production column snapshot of `uk_lrt` used when no config file is given
pub const DEFAULT_PRODUCTION_COLUMNS: &[&str] = &[
    "acronym",
    "amended_by",
    "amended_by_change_log",
    "amending",
    "amending_change_log",
    "article_duty_type",
    "created_at",
    "domain",
    "duties",
    "duty_holder",
    "duty_type",
    "duty_type_article",
    "enacted_by",
    "enacted_by_meta",
    "enacting",
    "family",
    "family_ii",
    "function",
    "geo_detail",
    "geo_extent",
    "geo_region",
    "id",
    "is_amending",
    "is_commencing",
    "is_enacting",
    "is_making",
    "is_rescinding",
    "latest_amend_date",
    "latest_amend_date_month",
    "latest_amend_date_year",
    "latest_change_date",
    "latest_rescind_date",
    "latest_rescind_date_month",
    "latest_rescind_date_year",
    "leg_gov_uk_url",
    "linked_amended_by",
    "linked_amending",
    "linked_enacted_by",
    "linked_rescinded_by",
    "linked_rescinding",
    "live",
    "live_conflict",
    "live_conflict_detail",
    "live_description",
    "live_from_changes",
    "live_from_metadata",
    "live_source",
    "md_attachment_paras",
    "md_body_paras",
    "md_coming_into_force_date",
    "md_date",
    "md_dct_valid_date",
    "md_description",
    "md_enactment_date",
    "md_images",
    "md_made_date",
    "md_modified",
    "md_restrict_extent",
    "md_restrict_start_date",
    "md_schedule_paras",
    "md_subjects",
    "md_total_paras",
    "name",
    "number",
    "number_int",
    "old_style_number",
    "popimar",
    "popimar_details",
    "power_holder",
    "powers",
    "purpose",
    "record_change_log",
    "rescinded_by",
    "rescinding",
    "responsibilities",
    "responsibility_holder",
    "rights",
    "rights_holder",
    "role",
    "role_details",
    "role_gvt",
    "role_gvt_details",
    "si_code",
    "tags",
    "title_en",
    "type_class",
    "type_code",
    "type_desc",
    "updated_at",
    "year",
    "\u{1f53a}_affects_stats_per_law",
    "\u{1f53a}_rescinding_stats_per_law",
    "\u{1f53a}_stats_affected_laws_count",
    "\u{1f53a}_stats_affects_count",
    "\u{1f53a}_stats_rescinding_laws_count",
    "\u{1f53a}\u{1f53b}_stats_self_affects_count",
    "\u{1f53a}\u{1f53b}_stats_self_affects_count_per_law_detailed",
    "\u{1f53b}_affected_by_stats_per_law",
    "\u{1f53b}_rescinded_by_stats_per_law",
    "\u{1f53b}_stats_affected_by_count",
    "\u{1f53b}_stats_affected_by_laws_count",
    "\u{1f53b}_stats_rescinded_by_laws_count",
];
