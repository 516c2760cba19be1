// ABOUTME: Wrapper for the psql client used to run client-side \copy statements
// ABOUTME: Passes credentials per child process and captures stdout, stderr and exit status

use crate::config::SourceConfig;
use crate::utils::PgPassFile;
use anyhow::{Context, Result};
use std::process::Command;

/// Captured result of one psql invocation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PsqlOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl PsqlOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a single SQL command (or psql meta-command) against a database
///
/// `Err` means the client could not be started at all. A command that ran and
/// failed comes back as `Ok` with a non-zero exit code so callers decide
/// whether to continue.
pub trait PsqlRunner {
    fn run(&self, sql: &str) -> Result<PsqlOutput>;
}

/// Runs commands through the `psql` binary
pub struct Psql {
    source: SourceConfig,
    password: Option<String>,
}

impl Psql {
    pub fn new(source: SourceConfig, password: Option<String>) -> Self {
        Self { source, password }
    }

    fn command(&self, sql: &str) -> Command {
        let mut cmd = Command::new("psql");
        cmd.arg("--host")
            .arg(&self.source.host)
            .arg("--port")
            .arg(self.source.port.to_string())
            .arg("--username")
            .arg(&self.source.user)
            .arg("--dbname")
            .arg(&self.source.database)
            .arg("--no-psqlrc")
            .arg("--no-password")
            .arg("--command")
            .arg(sql)
            .env("PGSSLMODE", self.source.ssl_mode.as_libpq());
        cmd
    }
}

impl PsqlRunner for Psql {
    fn run(&self, sql: &str) -> Result<PsqlOutput> {
        let mut cmd = self.command(sql);

        // Held until the child exits; the file is deleted on drop
        let pgpass = match &self.password {
            Some(password) => Some(
                PgPassFile::new(
                    &self.source.host,
                    self.source.port,
                    &self.source.database,
                    &self.source.user,
                    password,
                )
                .context("Failed to create .pgpass file for authentication")?,
            ),
            None => None,
        };
        if let Some(pgpass) = &pgpass {
            cmd.env("PGPASSFILE", pgpass.path());
        }

        tracing::debug!("Running psql: {}", sql);

        let output = cmd.output().context(
            "Failed to execute psql. Is PostgreSQL client installed?\n\
             Install with:\n\
             - Ubuntu/Debian: sudo apt-get install postgresql-client\n\
             - macOS: brew install postgresql\n\
             - RHEL/CentOS: sudo yum install postgresql",
        )?;

        Ok(PsqlOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}
