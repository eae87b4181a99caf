//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use su_core::{Backend, RunConfig};
use su_db::{Database, DuckDbBackend, MySqlBackend, MySqlSettings};

/// Install the process logger.
///
/// `RUST_LOG` wins over the default level picked from `verbose`.
pub(crate) fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();
}

/// Connection settings for the MySQL backend.
pub(crate) fn mysql_settings(config: &RunConfig) -> MySqlSettings {
    MySqlSettings {
        host: config.sql_host.clone(),
        port: config.sql_port,
        username: config.sql_username.clone(),
        password: config.sql_password.clone(),
    }
}

/// Open the single connection used for the whole run.
pub(crate) async fn connect(config: &RunConfig) -> Result<Box<dyn Database>> {
    match config.backend {
        Backend::MySql => {
            let settings = mysql_settings(config);
            log::debug!("Connecting to MySQL at {}:{}", settings.host, settings.port);
            let backend = MySqlBackend::connect(&settings).await.with_context(|| {
                format!(
                    "Failed to connect to {}:{} as {}",
                    settings.host, settings.port, settings.username
                )
            })?;
            Ok(Box::new(backend))
        }
        Backend::DuckDb => {
            log::debug!("Opening DuckDB database {}", config.duckdb_path);
            let backend = DuckDbBackend::new(&config.duckdb_path)
                .with_context(|| format!("Failed to open DuckDB database: {}", config.duckdb_path))?;
            Ok(Box::new(backend))
        }
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
