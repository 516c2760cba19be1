// ABOUTME: PostgreSQL connection utilities for the development database
// ABOUTME: Builds client config from explicit parameters, TLS setup, and error hints

use crate::config::{SourceConfig, SslMode};
use anyhow::{Context, Result};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::Client;

/// Build a client config from explicit connection parameters
///
/// The password is passed in rather than read from the process environment.
pub fn client_config(source: &SourceConfig, password: Option<&str>) -> tokio_postgres::Config {
    let mut config = tokio_postgres::Config::new();
    config
        .host(&source.host)
        .port(source.port)
        .user(&source.user)
        .dbname(&source.database)
        .application_name("pg-column-export")
        .ssl_mode(match source.ssl_mode {
            SslMode::Disable => tokio_postgres::config::SslMode::Disable,
            SslMode::Prefer => tokio_postgres::config::SslMode::Prefer,
            SslMode::Require => tokio_postgres::config::SslMode::Require,
        });

    if let Some(password) = password {
        config.password(password);
    }

    config
}

/// Connect to PostgreSQL with TLS support
pub async fn connect(source: &SourceConfig, password: Option<&str>) -> Result<Client> {
    let config = client_config(source, password);

    let tls_connector = TlsConnector::builder()
        .build()
        .context("Failed to build TLS connector")?;
    let tls = MakeTlsConnector::new(tls_connector);

    tracing::debug!(
        "Connecting to {}:{}/{} as {}",
        source.host,
        source.port,
        source.database,
        source.user
    );

    let (client, connection) = config
        .connect(tls)
        .await
        .map_err(|e| describe_connect_error(&e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Connection error: {}", e);
        }
    });

    Ok(client)
}

/// Turn a driver error message into an actionable one
fn describe_connect_error(error_msg: &str) -> anyhow::Error {
    if error_msg.contains("password authentication failed") {
        anyhow::anyhow!(
            "Authentication failed: Invalid username or password.\n\
             Set source.password in the config file or export {}.",
            crate::config::PASSWORD_ENV_VAR
        )
    } else if error_msg.contains("database") && error_msg.contains("does not exist") {
        anyhow::anyhow!(
            "Database does not exist: {}\n\
             Please check source.database in the config file.",
            error_msg
        )
    } else if error_msg.contains("Connection refused") || error_msg.contains("could not connect")
    {
        anyhow::anyhow!(
            "Connection refused: Unable to reach database server.\n\
             Please check:\n\
             - The host and port are correct\n\
             - The database server is running\n\
             Error: {}",
            error_msg
        )
    } else if error_msg.contains("SSL") || error_msg.contains("TLS") {
        anyhow::anyhow!(
            "TLS/SSL error: Failed to establish secure connection.\n\
             Try source.ssl_mode = \"disable\" for local servers.\n\
             Error: {}",
            error_msg
        )
    } else if error_msg.contains("no pg_hba.conf entry") {
        anyhow::anyhow!(
            "Access denied: No pg_hba.conf entry for host.\n\
             The database server is not configured to accept connections from your host.\n\
             Error: {}",
            error_msg
        )
    } else {
        anyhow::anyhow!("Failed to connect to database: {}", error_msg)
    }
}
