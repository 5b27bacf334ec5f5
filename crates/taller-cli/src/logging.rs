// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::APP_NAME;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_ENV: &str = "TALLER_LOG";

/// Where the log file goes. The terminal belongs to the TUI, so nothing is
/// written to stdout or stderr.
pub fn log_path() -> Result<PathBuf> {
    let data_root = dirs::data_dir()
        .ok_or_else(|| anyhow!("cannot resolve data directory for the log file"))?;
    Ok(data_root.join(APP_NAME).join(format!("{APP_NAME}.log")))
}

/// `TALLER_LOG` wins over the configured level.
pub fn filter_for(config_level: &str) -> Result<EnvFilter> {
    match env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid {LOG_ENV} directives {directives:?}")),
        _ => EnvFilter::try_new(config_level).with_context(|| {
            format!("invalid log.level {config_level:?} -- use e.g. info or debug")
        }),
    }
}

pub fn initialize(config_level: &str) -> Result<PathBuf> {
    let path = log_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(filter_for(config_level)?)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
        .try_init()
        .context("install log subscriber")?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::{filter_for, log_path};
    use anyhow::Result;

    #[test]
    fn log_file_lives_under_the_app_dir() -> Result<()> {
        let path = log_path()?;
        assert!(path.ends_with("taller/taller.log"), "got {}", path.display());
        Ok(())
    }

    #[test]
    fn configured_level_must_parse() {
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("TALLER_LOG");
        }
        assert!(filter_for("debug").is_ok());
        assert!(filter_for("taller_api=trace,warn").is_ok());
        assert!(filter_for("taller=loud").is_err());
    }
}
