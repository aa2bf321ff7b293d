//! Mailforge demo run
//!
//! Loads the saved form values, creates a batch of simulated accounts and
//! exports them next to the config.
//!
//! Usage: `mailforge [config-path] [count]`

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use accounts::config::DEFAULT_CONFIG_FILE;
use accounts::{load_config, AccountCreator, ConfigSnapshot, ExportFormat, NameFiles, NameSource};
use anyhow::Context;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_COUNT: usize = 3;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut args = env::args().skip(1);
    let config_path = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string()));
    let count = match args.next() {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("invalid account count '{raw}'"))?,
        None => DEFAULT_COUNT,
    };

    let name_files = NameFiles {
        combined: env::var_os("MAILFORGE_NAMES_COMBINED").map(PathBuf::from),
        first_names: env::var_os("MAILFORGE_NAMES_FIRST").map(PathBuf::from),
        last_names: env::var_os("MAILFORGE_NAMES_LAST").map(PathBuf::from),
    };
    let names = if name_files.is_empty() {
        NameSource::builtin()
    } else {
        NameSource::from_files(&name_files).context("failed to load name lists")?
    };

    let snapshot = load_config(&config_path)?.unwrap_or_else(|| {
        info!("No saved config, using defaults");
        ConfigSnapshot::default()
    });
    let template = snapshot.to_request(true)?;

    info!("Mailforge starting: {} x {} (simulation)", count, template.provider);
    let creator = AccountCreator::simulated(Arc::new(names));
    let created = creator.batch_create(count, &template);
    if created.is_empty() {
        warn!("No accounts were created");
        return Ok(());
    }

    let stem = format!(
        "{}_accounts_{}",
        template.provider,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let dir = config_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    for (format, ext) in [(ExportFormat::Text, "txt"), (ExportFormat::Structured, "json")] {
        let path = dir.join(format!("{stem}.{ext}"));
        creator
            .try_export_accounts(&path, format)
            .with_context(|| format!("failed to export to {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    Ok(())
}
