// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use taller_app::{DEFAULT_EXPIRING_DAYS, Locale, ViewKind};
use time::UtcOffset;
use time::macros::format_description;
use tracing::debug;

pub const APP_NAME: &str = "taller";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_API_TIMEOUT: &str = "5s";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub locale: Option<String>,
    pub expiring_days: Option<i64>,
    pub start_view: Option<String>,
    /// Shop offset as `+HH:MM`; the system offset when unset.
    pub utc_offset: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("TALLER_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set TALLER_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and keep values under [api], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url {
            let trimmed = base_url.trim();
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                bail!(
                    "api.base_url in {} must start with http:// or https://, got {:?}",
                    path.display(),
                    base_url
                );
            }
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(locale) = &self.ui.locale
            && Locale::parse(locale).is_none()
        {
            let known: Vec<&str> = Locale::ALL.iter().map(|locale| locale.as_str()).collect();
            bail!(
                "ui.locale in {} must be one of {}, got {:?}",
                path.display(),
                known.join(", "),
                locale
            );
        }

        if let Some(days) = self.ui.expiring_days
            && days < 1
        {
            bail!(
                "ui.expiring_days in {} must be at least 1, got {}",
                path.display(),
                days
            );
        }

        if let Some(view) = &self.ui.start_view
            && ViewKind::parse(view).is_none()
        {
            bail!(
                "ui.start_view in {} must be one of {}, got {:?}",
                path.display(),
                view_labels(),
                view
            );
        }

        if let Some(raw) = &self.ui.utc_offset
            && parse_utc_offset(raw).is_err()
        {
            bail!(
                "ui.utc_offset in {} must look like -06:00 or +01:00, got {:?}",
                path.display(),
                raw
            );
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim()
            .trim_end_matches('/')
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_API_TIMEOUT))
    }

    pub fn locale(&self) -> Locale {
        self.ui
            .locale
            .as_deref()
            .and_then(Locale::parse)
            .unwrap_or_default()
    }

    pub fn expiring_days(&self) -> i64 {
        self.ui.expiring_days.unwrap_or(DEFAULT_EXPIRING_DAYS)
    }

    pub fn start_view(&self) -> ViewKind {
        self.ui
            .start_view
            .as_deref()
            .and_then(ViewKind::parse)
            .unwrap_or(ViewKind::PurchaseOrders)
    }

    pub fn utc_offset(&self) -> Result<Option<UtcOffset>> {
        self.ui.utc_offset.as_deref().map(parse_utc_offset).transpose()
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# taller config\n# Place this file at: {}\n\nversion = 1\n\n\
             [api]\nbase_url = \"{}\"\n# <N>ms, <N>s or <N>m\ntimeout = \"{}\"\n\n\
             [ui]\n# es-CR or es-PY\nlocale = \"es-CR\"\n\
             # Rows due within this many days are highlighted\nexpiring_days = {}\n\
             # One of: {}\nstart_view = \"compras\"\n\
             # Shop UTC offset for due dates; defaults to the system offset\n\
             # utc_offset = \"-06:00\"\n\n\
             [log]\n# Overridden by TALLER_LOG\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_API_BASE_URL,
            DEFAULT_API_TIMEOUT,
            DEFAULT_EXPIRING_DAYS,
            view_labels(),
            DEFAULT_LOG_LEVEL,
        )
    }
}

pub fn view_labels() -> String {
    ViewKind::ALL
        .iter()
        .map(|view| view.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_utc_offset(raw: &str) -> Result<UtcOffset> {
    UtcOffset::parse(
        raw.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .with_context(|| format!("invalid UTC offset {raw:?}"))
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
