// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ROMOTA - product post composer.
//!
//! Frames a product cutout over a background, overlays free-floating text
//! layers and exports the composition as a raster image. Layouts can be kept
//! as named templates in a shared store.
//!
//! The crate is UI-independent: [`editor::Editor`] takes pointer, wheel and
//! panel input and renders with [`canvas::render`]. The `romota` binary wires
//! it to an egui window.

pub mod canvas;
pub mod config;
pub mod editor;
pub mod error;
pub mod io;
pub mod models;
pub mod notice;
pub mod util;

pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{EditorError, Result};
pub use notice::{Notice, NoticeLevel};
