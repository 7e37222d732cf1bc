use anyhow::{Context, Result};
use logging::LogMode;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use type_index::{NavigationConfig, NavigationConfigBuilder};

use crate::cli::TypenavCli;
use crate::utils::{get_typenav_dir, typenav_dir};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogModeSetting {
    #[default]
    Cli,
    File,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub mode: LogModeSetting,
    pub directory: Option<PathBuf>,
}

/// Contents of `config.toml`, merged with command line overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub separator: Option<char>,
    pub show_accessors: bool,
    pub core_source: Option<String>,
    pub registries: Vec<PathBuf>,
    /// Short name -> full type name, merged over the builtin short names.
    pub aliases: BTreeMap<String, String>,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Reads the explicit config file, or the default one when it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = typenav_dir()?.join(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        // Registry paths in a config file are relative to the file.
        if let Some(base) = path.parent() {
            settings.registries = settings
                .registries
                .into_iter()
                .map(|registry| {
                    if registry.is_relative() {
                        base.join(registry)
                    } else {
                        registry
                    }
                })
                .collect();
        }
        Ok(settings)
    }

    pub fn with_overrides(mut self, cli: &TypenavCli) -> Self {
        if cli.separator.is_some() {
            self.separator = cli.separator;
        }
        self.registries.extend(cli.registries.iter().cloned());
        self
    }

    pub fn navigation_config(&self) -> NavigationConfig {
        NavigationConfigBuilder::build(
            self.separator,
            self.show_accessors,
            self.core_source.clone(),
        )
    }

    pub fn log_mode(&self) -> Result<LogMode> {
        match self.logging.mode {
            LogModeSetting::Cli => Ok(LogMode::Cli),
            LogModeSetting::File => {
                let directory = match &self.logging.directory {
                    Some(directory) => directory.clone(),
                    None => get_typenav_dir()?.join("logs"),
                };
                Ok(LogMode::File { directory })
            }
        }
    }
}
