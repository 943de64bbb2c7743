// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Recently used product images.
//!
//! A small most-recent-first list of embedded images, persisted on its own
//! and independent of the template store.

use super::serialization::encode_data_url;
use crate::error::Result;
use crate::models::template::EmbeddedImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One remembered product image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub name: String,
    pub image: EmbeddedImage,
}

/// Bounded most-recent-first gallery.
#[derive(Debug)]
pub struct RecentGallery {
    entries: Vec<GalleryEntry>,
    limit: usize,
    path: Option<PathBuf>,
}

impl RecentGallery {
    /// In-memory gallery.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
            path: None,
        }
    }

    /// Load from `path`; a missing or corrupt file starts empty.
    pub fn open(path: &Path, limit: usize) -> Self {
        let mut gallery = Self::new(limit);
        gallery.path = Some(path.to_path_buf());
        match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<Vec<GalleryEntry>>(&data) {
                Ok(mut entries) => {
                    entries.truncate(gallery.limit);
                    gallery.entries = entries;
                }
                Err(e) => log::warn!("Ignoring corrupt gallery {}: {}", path.display(), e),
            },
            Err(e) => log::info!("No gallery at {}: {}", path.display(), e),
        }
        gallery
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    /// Remember an image, moving it to the front if already present.
    pub fn remember(&mut self, name: &str, encoded: &[u8]) -> Result<()> {
        let image = encode_data_url(encoded);
        self.entries.retain(|e| e.image != image);
        self.entries.insert(
            0,
            GalleryEntry {
                name: name.to_string(),
                image,
            },
        );
        self.entries.truncate(self.limit);
        self.save()
    }

    /// Forget the entry at `index`.
    pub fn remove(&mut self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            self.entries.remove(index);
            self.save()?;
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string(&self.entries)?)?;
        Ok(())
    }
}
