// ABOUTME: Utility functions for tool checks, SQL quoting and credential files
// ABOUTME: Provides identifier/literal quoting and a scoped .pgpass file for psql

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use which::which;

/// Check that the PostgreSQL client is available
///
/// Verifies that `psql` is installed and in PATH. All exports go through its
/// client-side `\copy`, so the files land on the machine running this tool.
///
/// # Errors
///
/// Returns an error with installation instructions if `psql` is missing.
///
/// # Examples
///
/// ```no_run
/// # use pg_column_export::utils::check_required_tools;
/// # use anyhow::Result;
/// # fn example() -> Result<()> {
/// check_required_tools()?;
/// # Ok(())
/// # }
/// ```
pub fn check_required_tools() -> Result<()> {
    let tools = ["psql"];
    let mut missing = Vec::new();

    for tool in &tools {
        if which(tool).is_err() {
            missing.push(*tool);
        }
    }

    if !missing.is_empty() {
        bail!(
            "Missing required PostgreSQL client tools: {}\n\
             \n\
             Please install PostgreSQL client tools:\n\
             - Ubuntu/Debian: sudo apt-get install postgresql-client\n\
             - macOS: brew install postgresql\n\
             - RHEL/CentOS: sudo yum install postgresql\n\
             - Windows: Download from https://www.postgresql.org/download/windows/",
            missing.join(", ")
        );
    }

    Ok(())
}

/// Quote a SQL identifier with double quotes
///
/// Embedded double quotes are doubled. The name is otherwise kept byte for
/// byte, so non-ASCII column names survive unchanged.
///
/// # Examples
///
/// ```
/// # use pg_column_export::utils::quote_identifier;
/// assert_eq!(quote_identifier("year"), "\"year\"");
/// assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Quote a SQL string literal with single quotes
///
/// # Examples
///
/// ```
/// # use pg_column_export::utils::quote_literal;
/// assert_eq!(quote_literal("/tmp/a.tsv"), "'/tmp/a.tsv'");
/// assert_eq!(quote_literal("it's"), "'it''s'");
/// ```
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Sanitize an identifier (table name, column name, etc.) for display
///
/// Removes control characters and limits length to keep log lines readable.
///
/// **Note**: This is for display purposes only. Use [`quote_identifier`] when
/// building SQL.
///
/// # Examples
///
/// ```
/// # use pg_column_export::utils::sanitize_identifier;
/// assert_eq!(sanitize_identifier("normal_table"), "normal_table");
/// assert_eq!(sanitize_identifier("table\nname"), "tablename");
/// ```
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_control())
        .take(100)
        .collect()
}

/// Escape a field for a .pgpass line (`:` and `\` are special)
fn escape_pgpass_field(field: &str) -> String {
    field.replace('\\', "\\\\").replace(':', "\\:")
}

/// Temporary .pgpass file holding a single credential line
///
/// The file is removed when the value is dropped. Point the child process at it
/// with `PGPASSFILE` so the password never appears in argv or in this process's
/// environment.
pub struct PgPassFile {
    file: NamedTempFile,
}

impl PgPassFile {
    pub fn new(host: &str, port: u16, database: &str, user: &str, password: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("pg-column-export-")
            .suffix(".pgpass")
            .tempfile()
            .context("Failed to create temporary .pgpass file")?;

        writeln!(
            file,
            "{}:{}:{}:{}:{}",
            escape_pgpass_field(host),
            port,
            escape_pgpass_field(database),
            escape_pgpass_field(user),
            escape_pgpass_field(password)
        )
        .context("Failed to write .pgpass file")?;
        file.flush().context("Failed to write .pgpass file")?;

        // libpq ignores a password file readable by group or others
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o600))
                .context("Failed to restrict .pgpass permissions")?;
        }

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
