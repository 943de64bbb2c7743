// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Layout model: the authoritative, serializable composition state.
//!
//! The layout owns the product frame, the product placement inside it, the
//! ordered list of text layers and the active canvas resolution. Every
//! mutation goes through a method here so that invariants (minimum frame
//! size, positive font size, clamped product scale) are enforced at the
//! mutation boundary and never at render time.

use super::color::Color;
use crate::error::{EditorError, Result};
use crate::util::geometry::{CanvasSize, Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest frame width/height, in canvas units.
pub const MIN_FRAME_SIZE: f32 = 50.0;
/// Product scale range.
pub const MIN_PRODUCT_SCALE: f32 = 0.01;
pub const MAX_PRODUCT_SCALE: f32 = 10.0;
/// Scale change per mouse-wheel notch.
pub const WHEEL_SCALE_STEP: f32 = 0.05;

/// Opaque, never reused identity of a text layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// Generate a fresh id.
    pub fn generate() -> Self {
        Self(format!("layer-{}", uuid::Uuid::new_v4()))
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single positioned, styled line of text.
///
/// `x` is the horizontal centre and `y` the baseline, both in canvas units.
/// `content` keeps the case the operator typed; it is uppercased only when
/// measured or drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    pub id: LayerId,
    pub content: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub font_family: String,
    pub color: Color,
    pub bold: bool,
}

impl TextLayer {
    /// A new layer with the editor's default styling.
    pub fn new(anchor: Point) -> Self {
        Self {
            id: LayerId::generate(),
            content: "NEW TEXT".to_string(),
            x: anchor.x,
            y: anchor.y,
            font_size: 50.0,
            font_family: "Arial Black".to_string(),
            color: Color::WHITE,
            bold: true,
        }
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The text as it is drawn and measured.
    pub fn display_text(&self) -> String {
        self.content.to_uppercase()
    }

    /// Check a layer that did not come through the mutators (loaded from
    /// disk or a template).
    pub fn validate(&self) -> Result<()> {
        validate_font_size(self.font_size)?;
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(EditorError::invalid_input(format!("layer {} has a non-finite position", self.id)));
        }
        Ok(())
    }

    /// Same layer content under a freshly generated id.
    pub fn rekeyed(&self) -> Self {
        Self {
            id: LayerId::generate(),
            ..self.clone()
        }
    }
}

/// Partial update of a text layer's attributes. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerUpdate {
    pub content: Option<String>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub color: Option<Color>,
    pub bold: Option<bool>,
}

impl LayerUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(size) = self.font_size {
            validate_font_size(size)?;
        }
        if let Some(family) = &self.font_family {
            if family.trim().is_empty() {
                return Err(EditorError::invalid_input("font family must not be empty"));
            }
        }
        Ok(())
    }
}

fn validate_font_size(size: f32) -> Result<()> {
    if size.is_finite() && size > 0.0 {
        Ok(())
    } else {
        Err(EditorError::invalid_input(format!("font size must be a positive number, got {size}")))
    }
}

/// Validate a layer list: each layer valid, ids unique.
pub fn validate_layers(layers: &[TextLayer]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for layer in layers {
        layer.validate()?;
        if !seen.insert(&layer.id) {
            return Err(EditorError::invalid_input(format!("duplicate layer id {}", layer.id)));
        }
    }
    Ok(())
}

/// Parse a font size typed by the operator.
pub fn parse_font_size(input: &str) -> Result<f32> {
    let size: f32 = input
        .trim()
        .parse()
        .map_err(|_| EditorError::invalid_input(format!("font size is not a number: {input:?}")))?;
    validate_font_size(size)?;
    Ok(size)
}

/// The product clip rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Move the frame origin.
    pub fn move_to(&mut self, origin: Point) {
        self.x = origin.x;
        self.y = origin.y;
    }

    /// Resize, flooring both sides at [`MIN_FRAME_SIZE`].
    pub fn resize_to(&mut self, width: f32, height: f32) {
        self.width = floor_size(width);
        self.height = floor_size(height);
    }

    /// Reject a frame that `resize_to` could never have produced.
    pub fn validate(&self) -> Result<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(EditorError::invalid_input("frame origin must be finite"));
        }
        for side in [self.width, self.height] {
            if !side.is_finite() || floor_size(side) != side {
                return Err(EditorError::invalid_input(format!(
                    "frame sides must be at least {MIN_FRAME_SIZE}, got {}x{}",
                    self.width, self.height
                )));
            }
        }
        Ok(())
    }
}

fn floor_size(v: f32) -> f32 {
    // NaN fails the comparison and lands on the floor too
    if v >= MIN_FRAME_SIZE {
        v
    } else {
        MIN_FRAME_SIZE
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            x: 200.0,
            y: 300.0,
            width: 680.0,
            height: 500.0,
        }
    }
}

/// Placement of the product bitmap relative to the frame centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPlacement {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for ProductPlacement {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ProductPlacement {
    pub fn offset(&self) -> Point {
        Point::new(self.offset_x, self.offset_y)
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.offset_x = offset.x;
        self.offset_y = offset.y;
    }

    pub fn reset_offset(&mut self) {
        self.set_offset(Point::default());
    }

    /// Set the scale, clamped to the allowed range.
    pub fn set_scale(&mut self, scale: f32) -> Result<()> {
        if !scale.is_finite() {
            return Err(EditorError::invalid_input(format!("product scale must be finite, got {scale}")));
        }
        self.scale = scale.clamp(MIN_PRODUCT_SCALE, MAX_PRODUCT_SCALE);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_PRODUCT_SCALE..=MAX_PRODUCT_SCALE).contains(&self.scale) {
            return Err(EditorError::invalid_input(format!("product scale out of range: {}", self.scale)));
        }
        if !self.offset_x.is_finite() || !self.offset_y.is_finite() {
            return Err(EditorError::invalid_input("product offset must be finite"));
        }
        Ok(())
    }

    /// Adjust scale by whole wheel notches (positive enlarges).
    pub fn nudge_scale(&mut self, notches: f32) {
        let next = self.scale + notches * WHEEL_SCALE_STEP;
        if next.is_finite() {
            self.scale = next.clamp(MIN_PRODUCT_SCALE, MAX_PRODUCT_SCALE);
        }
    }
}

/// Discrete canvas resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasPreset {
    #[default]
    Square,
    Portrait,
    Story,
    Landscape,
}

impl CanvasPreset {
    pub const ALL: [CanvasPreset; 4] = [
        CanvasPreset::Square,
        CanvasPreset::Portrait,
        CanvasPreset::Story,
        CanvasPreset::Landscape,
    ];

    pub fn size(self) -> CanvasSize {
        let (width, height) = match self {
            CanvasPreset::Square => (1080, 1080),
            CanvasPreset::Portrait => (1080, 1350),
            CanvasPreset::Story => (1080, 1920),
            CanvasPreset::Landscape => (1920, 1080),
        };
        CanvasSize { width, height }
    }

    pub fn label(self) -> &'static str {
        match self {
            CanvasPreset::Square => "Square 1:1",
            CanvasPreset::Portrait => "Portrait 4:5",
            CanvasPreset::Story => "Story 9:16",
            CanvasPreset::Landscape => "Landscape 16:9",
        }
    }
}

/// The aggregate root of the editor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutModel {
    pub frame: Frame,
    #[serde(default)]
    pub product: ProductPlacement,
    /// Paint order: later entries are drawn on top and hit-tested first.
    #[serde(default)]
    pub text_layers: Vec<TextLayer>,
    #[serde(default)]
    pub canvas: CanvasPreset,
}

impl Default for LayoutModel {
    fn default() -> Self {
        Self {
            frame: Frame::default(),
            product: ProductPlacement::default(),
            text_layers: vec![TextLayer {
                id: LayerId::generate(),
                content: "ENGINE OIL FILTER".to_string(),
                x: 540.0,
                y: 180.0,
                font_size: 70.0,
                font_family: "Impact".to_string(),
                color: Color::rgb(0xcc, 0x00, 0x00),
                bold: true,
            }],
            canvas: CanvasPreset::Square,
        }
    }
}

impl LayoutModel {
    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas.size()
    }

    /// Switch the canvas resolution. Frame and layer coordinates are kept
    /// verbatim, even when they now fall outside the canvas.
    pub fn set_canvas_preset(&mut self, preset: CanvasPreset) {
        self.canvas = preset;
    }

    /// Append a default layer at the canvas centre and return its id.
    pub fn add_text_layer(&mut self) -> LayerId {
        let size = self.canvas_size();
        let layer = TextLayer::new(Point::new(size.width as f32 / 2.0, size.height as f32 / 2.0));
        let id = layer.id.clone();
        self.text_layers.push(layer);
        id
    }

    /// Check every invariant the mutators enforce. Used on layouts read
    /// from disk, which bypass the mutators.
    pub fn validate(&self) -> Result<()> {
        self.frame.validate()?;
        self.product.validate()?;
        validate_layers(&self.text_layers)
    }

    pub fn layer(&self, id: &LayerId) -> Option<&TextLayer> {
        self.text_layers.iter().find(|l| &l.id == id)
    }

    pub fn layer_mut(&mut self, id: &LayerId) -> Option<&mut TextLayer> {
        self.text_layers.iter_mut().find(|l| &l.id == id)
    }

    /// Remove a layer. Returns whether anything was removed.
    pub fn remove_layer(&mut self, id: &LayerId) -> bool {
        let before = self.text_layers.len();
        self.text_layers.retain(|l| &l.id != id);
        self.text_layers.len() != before
    }

    /// Apply an attribute update, all or nothing.
    pub fn update_layer(&mut self, id: &LayerId, update: &LayerUpdate) -> Result<()> {
        update.validate()?;
        let layer = self
            .layer_mut(id)
            .ok_or_else(|| EditorError::UnknownLayer(id.to_string()))?;

        if let Some(content) = &update.content {
            layer.content = content.clone();
        }
        if let Some(size) = update.font_size {
            layer.font_size = size;
        }
        if let Some(family) = &update.font_family {
            layer.font_family = family.clone();
        }
        if let Some(color) = update.color {
            layer.color = color;
        }
        if let Some(bold) = update.bold {
            layer.bold = bold;
        }
        Ok(())
    }

    /// Reposition a layer's anchor. Returns whether the layer exists.
    pub fn move_layer(&mut self, id: &LayerId, anchor: Point) -> bool {
        match self.layer_mut(id) {
            Some(layer) => {
                layer.x = anchor.x;
                layer.y = anchor.y;
                true
            }
            None => false,
        }
    }
}
