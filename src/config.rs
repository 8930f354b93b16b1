// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration persistence for kube-lister
//!
//! Stores user preferences in ~/.kube-lister/config.json:
//! - the default manifest file listers are loaded from
//! - the default output format

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;

/// Get the base kube-lister directory (~/.kube-lister/)
pub fn base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".kube-lister"))
        .context("Could not determine home directory")
}

/// kube-lister configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Manifest file used when no --file is given
    #[serde(default)]
    pub manifests: Option<PathBuf>,

    /// Output format used when no --output is given
    #[serde(default)]
    pub output: Option<OutputFormat>,
}

impl Config {
    /// Load config from disk, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Get the config file path (~/.kube-lister/config.json)
    pub fn config_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("config.json"))
    }

    /// Update the default manifest file and save
    pub fn set_manifests(&mut self, path: PathBuf) -> Result<()> {
        self.manifests = Some(path);
        self.save()
    }

    /// Manifest file to load: the explicit one, else the configured default
    pub fn resolve_manifests(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.manifests.clone())
            .context("No manifest file given; pass --file or run `kube-lister use <FILE>`")
    }

    /// Output format: the explicit one, else the configured default, else table
    pub fn resolve_output(&self, explicit: Option<OutputFormat>) -> OutputFormat {
        explicit.or(self.output).unwrap_or_default()
    }
}
