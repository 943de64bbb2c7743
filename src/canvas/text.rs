// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Text measurement shared by the renderer and the hit-tester.
//!
//! Both sides call [`shape_layer`], so the box the operator sees outlined and
//! the box that answers clicks are computed from the same glyph run.

use super::fonts::FontBook;
use crate::models::layout::TextLayer;
use crate::util::geometry::Rect;
use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};

/// Horizontal padding on each side of a text hit box.
pub const TEXT_BOX_MARGIN: f32 = 10.0;
/// How far a text hit box extends below the baseline.
pub const TEXT_BOX_DESCENT: f32 = 10.0;

/// Per-glyph advance estimate (in ems) used when no font resolves.
const ESTIMATED_ADVANCE: f32 = 0.6;
const ESTIMATED_ADVANCE_BOLD: f32 = 0.66;

/// A single line of text laid out left-aligned at x = 0.
pub struct TextRun {
    pub font: Option<FontArc>,
    pub scale: PxScale,
    /// Glyphs with their pen x position.
    pub glyphs: Vec<(GlyphId, f32)>,
    pub width: f32,
}

/// Scale at which `font`'s em square is `size` pixels tall (CSS font-size).
pub fn em_scale(font: &FontArc, size: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(size * font.height_unscaled() / units_per_em)
}

/// Lay out `text` with an optional font. Without a font the width is an
/// estimate and no glyphs are produced.
pub fn shape_text(font: Option<FontArc>, text: &str, size: f32, bold: bool) -> TextRun {
    let Some(font) = font else {
        let per_glyph = if bold { ESTIMATED_ADVANCE_BOLD } else { ESTIMATED_ADVANCE };
        return TextRun {
            font: None,
            scale: PxScale::from(size),
            glyphs: Vec::new(),
            width: text.chars().count() as f32 * size * per_glyph,
        };
    };

    let scale = em_scale(&font, size);
    let scaled = font.as_scaled(scale);
    let mut glyphs = Vec::with_capacity(text.len());
    let mut cursor_x = 0.0f32;
    let mut last: Option<GlyphId> = None;

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = last {
            cursor_x += scaled.kern(prev, id);
        }
        glyphs.push((id, cursor_x));
        cursor_x += scaled.h_advance(id);
        last = Some(id);
    }

    TextRun {
        font: Some(font.clone()),
        scale,
        glyphs,
        width: cursor_x,
    }
}

/// Lay out a layer's uppercased content in its own font, size and weight.
pub fn shape_layer(fonts: &FontBook, layer: &TextLayer) -> TextRun {
    let font = fonts.resolve(&layer.font_family, layer.bold);
    shape_text(font, &layer.display_text(), layer.font_size, layer.bold)
}

/// Rendered width of a layer's text.
pub fn measure_layer(fonts: &FontBook, layer: &TextLayer) -> f32 {
    shape_layer(fonts, layer).width
}

/// Hit box of a layer whose rendered text is `width` wide.
pub fn layer_box_for_width(layer: &TextLayer, width: f32) -> Rect {
    Rect::new(
        layer.x - width / 2.0 - TEXT_BOX_MARGIN,
        layer.y - layer.font_size,
        width + 2.0 * TEXT_BOX_MARGIN,
        layer.font_size + TEXT_BOX_DESCENT,
    )
}

/// Hit box (and selection outline) of a layer.
pub fn layer_box(fonts: &FontBook, layer: &TextLayer) -> Rect {
    layer_box_for_width(layer, measure_layer(fonts, layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::geometry::Point;

    #[test]
    fn test_estimate_counts_uppercased_chars() {
        let fonts = FontBook::headless();
        let mut layer = TextLayer::new(Point::new(540.0, 540.0));
        layer.content = "abcd".to_string();
        layer.font_size = 50.0;
        layer.bold = false;
        assert!((measure_layer(&fonts, &layer) - 4.0 * 50.0 * 0.6).abs() < 0.001);
        layer.bold = true;
        assert!((measure_layer(&fonts, &layer) - 4.0 * 50.0 * 0.66).abs() < 0.001);
    }

    #[test]
    fn test_layer_box_geometry() {
        let fonts = FontBook::headless();
        let mut layer = TextLayer::new(Point::new(540.0, 540.0));
        layer.content = "ab".to_string();
        layer.font_size = 50.0;
        layer.bold = false;
        // width = 2 * 50 * 0.6 = 60
        let b = layer_box(&fonts, &layer);
        assert!((b.x - (540.0 - 30.0 - 10.0)).abs() < 0.001);
        assert!((b.y - 490.0).abs() < 0.001);
        assert!((b.width - 80.0).abs() < 0.001);
        assert!((b.height - 60.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_text_still_has_margin_box() {
        let fonts = FontBook::headless();
        let mut layer = TextLayer::new(Point::new(100.0, 100.0));
        layer.content.clear();
        let b = layer_box(&fonts, &layer);
        assert_eq!(b.width, 2.0 * TEXT_BOX_MARGIN);
    }
}
