// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Layout and template serialization.
//!
//! This module handles the workspace state file, layout export/import in
//! YAML and JSON, the template codec, and the data-URL encoding used to
//! embed images in templates.

use crate::error::{EditorError, Result};
use crate::models::layout::{Frame, LayoutModel, TextLayer};
use crate::models::template::{EmbeddedImage, Template, TemplateId};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

/// Encode image bytes as a self-contained data URL.
pub fn encode_data_url(bytes: &[u8]) -> EmbeddedImage {
    let mime = image::guess_format(bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream");
    EmbeddedImage(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// Extract the bytes of a base64 data URL.
pub fn decode_data_url(data: &EmbeddedImage) -> Result<Vec<u8>> {
    let rest = data
        .as_str()
        .strip_prefix("data:")
        .ok_or_else(|| EditorError::decode("embedded image is not a data URL"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| EditorError::decode("data URL has no payload"))?;
    if !meta.ends_with(";base64") {
        return Err(EditorError::decode("data URL is not base64 encoded"));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| EditorError::decode(format!("invalid base64 payload: {e}")))
}

/// Snapshot the layout as a template.
///
/// Text layers are deep copies. `id` is the template to update in place, or
/// `None` for a new template. Image arguments are the encoded source bytes
/// of the currently loaded images.
pub fn to_template(
    layout: &LayoutModel,
    name: &str,
    id: Option<TemplateId>,
    background: Option<&[u8]>,
    product: Option<&[u8]>,
) -> Result<Template> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EditorError::invalid_input("template name must not be empty"));
    }
    Ok(Template {
        id: id.unwrap_or_else(TemplateId::generate),
        name: name.to_string(),
        frame: layout.frame,
        text_layers: layout.text_layers.clone(),
        background: background.map(encode_data_url),
        product: product.map(encode_data_url),
    })
}

/// The part of a layout a template replaces, plus images still to decode.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatePatch {
    pub frame: Frame,
    pub text_layers: Vec<TextLayer>,
    pub background: Option<EmbeddedImage>,
    pub product: Option<EmbeddedImage>,
}

impl TemplatePatch {
    /// Apply the geometry part. Images are the caller's business.
    pub fn apply_geometry(&self, layout: &mut LayoutModel) {
        layout.frame = self.frame;
        layout.text_layers = self.text_layers.clone();
    }
}

/// Unpack a template. Every text layer gets a fresh id, so loading the same
/// template twice never produces colliding layers. A template whose geometry
/// breaks the layout invariants is rejected whole.
pub fn from_template(template: &Template) -> Result<TemplatePatch> {
    template.validate()?;
    Ok(TemplatePatch {
        frame: template.frame,
        text_layers: template.text_layers.iter().map(TextLayer::rekeyed).collect(),
        background: template.background.clone(),
        product: template.product.clone(),
    })
}

fn write_creating_dirs(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

/// Persist the workspace layout (no images).
pub fn save_workspace(layout: &LayoutModel, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(layout)?;
    write_creating_dirs(path, &json)
}

/// Load the saved workspace. A missing, corrupt or invalid file yields `None`.
pub fn load_workspace(path: &Path) -> Option<LayoutModel> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            log::info!("No saved workspace at {}: {}", path.display(), e);
            return None;
        }
    };
    let parsed = serde_json::from_str::<LayoutModel>(&json)
        .map_err(EditorError::from)
        .and_then(|layout| layout.validate().map(|()| layout));
    match parsed {
        Ok(layout) => Some(layout),
        Err(e) => {
            log::warn!("Ignoring corrupt workspace {}: {}", path.display(), e);
            None
        }
    }
}

/// Export a layout to YAML format.
pub fn export_yaml(layout: &LayoutModel, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(layout)?;
    write_creating_dirs(path, &yaml)
}

/// Export a layout to JSON format.
pub fn export_json(layout: &LayoutModel, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(layout)?;
    write_creating_dirs(path, &json)
}

/// Import a layout from YAML format.
pub fn import_yaml(path: &Path) -> Result<LayoutModel> {
    let yaml = std::fs::read_to_string(path)?;
    let layout: LayoutModel = serde_yaml::from_str(&yaml)?;
    layout.validate()?;
    Ok(layout)
}

/// Import a layout from JSON format.
pub fn import_json(path: &Path) -> Result<LayoutModel> {
    let json = std::fs::read_to_string(path)?;
    let layout: LayoutModel = serde_json::from_str(&json)?;
    layout.validate()?;
    Ok(layout)
}

/// Export a layout, choosing the format from the file extension.
pub fn export_layout(layout: &LayoutModel, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(layout, path),
        Some("json") => export_json(layout, path),
        other => Err(EditorError::invalid_input(format!("unsupported file extension: {other:?}"))),
    }
}

/// Import a layout, choosing the format from the file extension.
pub fn import_layout(path: &Path) -> Result<LayoutModel> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        other => Err(EditorError::invalid_input(format!("unsupported file extension: {other:?}"))),
    }
}
