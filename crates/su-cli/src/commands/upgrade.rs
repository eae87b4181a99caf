//! Upgrade command implementation

use anyhow::{Context, Result};
use su_core::load_catalog;
use su_engine::{ExecutorOptions, SchemaExecutor, UpgradeSummary};

use crate::cli::{Cli, OutputFormat};
use crate::commands::common;

/// Execute the upgrade
pub async fn execute(cli: &Cli) -> Result<()> {
    let config = cli.to_run_config().context("Invalid configuration")?;
    log::debug!("Using {:?}", config);

    // The catalog is fully validated before the database is contacted.
    let units = load_catalog(&config.scripts_path)?;
    log::info!(
        "Found {} script(s) in {}",
        units.len(),
        config.scripts_path.display()
    );

    let db = common::connect(&config).await?;
    let executor = SchemaExecutor::new(db.as_ref(), ExecutorOptions::from_config(&config));
    let summary = executor.run(&units).await?;

    match cli.output {
        OutputFormat::Text => print!("{}", render_text(&summary)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

fn version_label(version: Option<i64>) -> String {
    version.map_or_else(|| "none".to_string(), |v| v.to_string())
}

/// Human-readable run summary
pub(crate) fn render_text(summary: &UpgradeSummary) -> String {
    let mut out = String::new();

    if summary.created_database {
        out.push_str(&format!("Created database {}\n", summary.database));
    }
    if summary.created_ledger {
        out.push_str("Created version table\n");
    }

    if summary.is_noop() {
        out.push_str(&format!(
            "{} is up to date at version {} (highest script version: {})\n",
            summary.database,
            version_label(summary.version_before),
            version_label(summary.highest_file_version)
        ));
        return out;
    }

    out.push_str(&format!(
        "Upgraded {} from version {} to {} ({} script(s) applied)\n",
        summary.database,
        version_label(summary.version_before),
        version_label(summary.version_after),
        summary.applied_count()
    ));
    for applied in &summary.applied {
        out.push_str(&format!(
            "  {:>6}  {}  ({} statement(s))\n",
            applied.index, applied.file, applied.statements
        ));
    }
    out
}

#[cfg(test)]
#[path = "upgrade_test.rs"]
mod tests;
