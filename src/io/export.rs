// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Raster export of the finished composition.

use crate::error::Result;
use chrono::{DateTime, Local};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Export file name for a given moment, e.g. `romota-20260101-120000.png`.
pub fn export_file_name(at: DateTime<Local>) -> String {
    format!("romota-{}.png", at.format("%Y%m%d-%H%M%S"))
}

/// Write a rendered canvas as PNG into `dir` under a timestamped name.
/// An existing file is never overwritten; a counter is appended instead.
pub fn export_png(image: &RgbaImage, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let name = export_file_name(Local::now());
    let mut path = dir.join(&name);
    let stem = name.trim_end_matches(".png").to_string();
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{stem}-{n}.png"));
        n += 1;
    }
    image.save_with_format(&path, image::ImageFormat::Png)?;
    log::info!("Exported {}x{} image to {}", image.width(), image.height(), path.display());
    Ok(path)
}
