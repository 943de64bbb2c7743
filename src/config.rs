// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor configuration.
//!
//! Read from `config.yaml` in the platform config directory. A missing or
//! malformed file falls back to defaults.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Application directory name under the platform config/data dirs.
const APP_DIR: &str = "romota";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Where the workspace, templates and gallery live.
    pub data_dir: PathBuf,
    /// Where exported images are written.
    pub export_dir: PathBuf,
    /// Maximum number of recent product images.
    pub gallery_limit: usize,
    /// Font names offered when system fonts cannot be enumerated.
    pub fallback_fonts: Vec<String>,
    /// Families tried, in order, when a layer's family does not resolve.
    pub default_font_families: Vec<String>,
    /// Extra font files registered by family name with the static provider.
    pub font_files: BTreeMap<String, PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        let export_dir = dirs::picture_dir().unwrap_or_else(|| data_dir.join("exports"));
        Self {
            data_dir,
            export_dir,
            gallery_limit: 8,
            fallback_fonts: [
                "Impact",
                "Arial Black",
                "Verdana",
                "Tahoma",
                "Georgia",
                "Courier New",
                "Roboto",
                "Montserrat",
                "Oswald",
                "Inter",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            default_font_families: ["DejaVu Sans", "Liberation Sans", "Arial", "Helvetica"]
                .into_iter()
                .map(String::from)
                .collect(),
            font_files: BTreeMap::new(),
        }
    }
}

impl EditorConfig {
    /// Default location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.yaml"))
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&yaml)?)
    }

    /// Load the config at `path`, or defaults if it is missing or malformed.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn workspace_path(&self) -> PathBuf {
        self.data_dir.join("workspace.json")
    }

    pub fn template_store_path(&self) -> PathBuf {
        self.data_dir.join("templates.json")
    }

    pub fn template_cache_path(&self) -> PathBuf {
        self.data_dir.join("templates.cache.json")
    }

    pub fn gallery_path(&self) -> PathBuf {
        self.data_dir.join("gallery.json")
    }
}
