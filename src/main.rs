// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ROMOTA - product post composer
//!
//! Desktop editor for framing a product cutout over a background, adding
//! text layers and exporting the composition as a PNG.

mod app;
mod ui;

use anyhow::{Context, Result};
use app::RomotaApp;
use romota::canvas::fonts::{select_provider, FontBook};
use romota::{Editor, EditorConfig, Notice};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = EditorConfig::load_or_default(EditorConfig::default_path().as_deref());
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory {}", config.data_dir.display()))?;

    // Probe fonts once; the editor only sees the chosen provider
    let (provider, font_notice) = select_provider(config.fallback_fonts.clone(), &config.font_files);
    let fonts = FontBook::new(provider, config.default_font_families.clone());

    let mut editor = Editor::new(&config, fonts);
    if let Some(message) = font_notice {
        editor.notify(Notice::warning(message));
    }

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("ROMOTA - Product Post Composer"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "ROMOTA",
        options,
        Box::new(move |_cc| Ok(Box::new(RomotaApp::new(editor)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
