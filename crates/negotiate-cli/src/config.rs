// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use negotiate_app::StatusFilter;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "negotiate";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_POLL_INTERVAL: &str = "120ms";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub seed: Seed,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ui: Ui::default(),
            seed: Seed::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub default_filter: Option<String>,
    pub show_summary: Option<bool>,
    pub poll_interval: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            default_filter: Some("All".to_owned()),
            show_summary: Some(true),
            poll_interval: Some(DEFAULT_POLL_INTERVAL.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub dir: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            dir: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("NEGOTIATE_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set NEGOTIATE_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
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
                    "config file {} has no version. Add `version = 1` at the top",
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
        if let Some(filter) = &self.ui.default_filter
            && StatusFilter::parse(filter).is_none()
        {
            bail!(
                "ui.default_filter in {} must be one of {}, got {:?}",
                path.display(),
                filter_choices(),
                filter
            );
        }

        if let Some(interval) = &self.ui.poll_interval {
            let parsed = parse_duration(interval)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "ui.poll_interval in {} must be positive, got {}",
                    path.display(),
                    interval
                );
            }
        }

        if let Some(seed_path) = &self.seed.path
            && seed_path.trim().is_empty()
        {
            bail!(
                "seed.path in {} is empty; remove it to use the built-in demo campaign",
                path.display()
            );
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.as_str())
        {
            bail!(
                "log.level in {} must be one of {}, got {:?}",
                path.display(),
                LOG_LEVELS.join(", "),
                level
            );
        }

        Ok(())
    }

    pub fn default_filter(&self) -> StatusFilter {
        self.ui
            .default_filter
            .as_deref()
            .and_then(StatusFilter::parse)
            .unwrap_or_default()
    }

    pub fn show_summary(&self) -> bool {
        self.ui.show_summary.unwrap_or(true)
    }

    pub fn poll_interval(&self) -> Result<Duration> {
        parse_duration(
            self.ui
                .poll_interval
                .as_deref()
                .unwrap_or(DEFAULT_POLL_INTERVAL),
        )
    }

    pub fn seed_path(&self) -> Option<PathBuf> {
        self.seed.path.as_ref().map(PathBuf::from)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.log.dir {
            return Ok(PathBuf::from(dir));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].dir to a writable directory")
        })?;
        Ok(data_root.join(APP_NAME).join("logs"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# negotiate config\n# Place this file at: {}\n\nversion = 1\n\n[ui]\n# One of: {}\ndefault_filter = \"All\"\nshow_summary = true\npoll_interval = \"{}\"\n\n[seed]\n# Optional. JSON seed; print a template with `negotiate --print-demo-seed`\n# path = \"/absolute/path/to/seed.json\"\n\n[log]\nlevel = \"{}\"\n# dir = \"/absolute/path/to/logs\"\n",
            path.display(),
            filter_choices(),
            DEFAULT_POLL_INTERVAL,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn filter_choices() -> String {
    StatusFilter::ALL
        .iter()
        .map(|filter| filter.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid interval duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid interval duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid interval duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 120ms or 1s)")
}
