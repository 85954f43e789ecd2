use crate::types::OutputFormat;
use anyhow::{Context, Result, bail};
use bletrace_runtime::Config;
use std::path::PathBuf;

pub fn handle(config_path: &PathBuf, force: bool, format: OutputFormat) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "config already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    let config = Config::default();
    config
        .save_to(config_path)
        .with_context(|| format!("could not write {}", config_path.display()))?;

    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "config_path": config_path.display().to_string(),
                "session_timeout_secs": config.session_timeout_secs,
                "flush_interval_secs": config.flush_interval_secs,
                "throttle_window_secs": config.throttle_window_secs,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Plain => {
            println!("Wrote default config to {}", config_path.display());
            println!("Edit it to set a salt, data directory, or timing.");
        }
    }

    Ok(())
}
