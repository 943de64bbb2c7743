// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Hit-testing of canvas points against the layout.
//!
//! Targets are tried in a fixed priority order, first match wins:
//! resize handle, text layers (topmost first), frame body, nothing.

use super::fonts::FontBook;
use super::text;
use crate::models::layout::{Frame, LayerId, LayoutModel};
use crate::util::geometry::{Point, Rect};

/// Side of the visible resize handle square drawn inside the frame corner.
pub const HANDLE_SIZE: f32 = 15.0;
/// How far the handle hotspot reaches inside the frame from the corner.
pub const HOTSPOT_INNER: f32 = 20.0;
/// How far the handle hotspot reaches outside the frame from the corner.
pub const HOTSPOT_OUTER: f32 = 10.0;

/// What a canvas point resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    ResizeHandle,
    TextLayer(LayerId),
    FrameBody,
    Empty,
}

/// Visible footprint of the resize handle.
pub fn handle_rect(frame: &Frame) -> Rect {
    Rect::new(
        frame.x + frame.width - HANDLE_SIZE,
        frame.y + frame.height - HANDLE_SIZE,
        HANDLE_SIZE,
        HANDLE_SIZE,
    )
}

/// Region that grabs the resize handle; larger than the handle itself.
pub fn handle_hotspot(frame: &Frame) -> Rect {
    let right = frame.x + frame.width;
    let bottom = frame.y + frame.height;
    Rect::new(
        right - HOTSPOT_INNER,
        bottom - HOTSPOT_INNER,
        HOTSPOT_INNER + HOTSPOT_OUTER,
        HOTSPOT_INNER + HOTSPOT_OUTER,
    )
}

/// Resolve a canvas point to the interactive target under it.
pub fn hit_test(point: Point, layout: &LayoutModel, fonts: &FontBook) -> Target {
    if handle_hotspot(&layout.frame).contains(point) {
        return Target::ResizeHandle;
    }

    if let Some(layer) = layout
        .text_layers
        .iter()
        .rev()
        .find(|layer| text::layer_box(fonts, layer).contains(point))
    {
        return Target::TextLayer(layer.id.clone());
    }

    if layout.frame.rect().contains(point) {
        return Target::FrameBody;
    }

    Target::Empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layout::TextLayer;

    fn layout_with_layer_at(x: f32, y: f32) -> (LayoutModel, LayerId) {
        let mut layout = LayoutModel::default();
        layout.text_layers.clear();
        let mut layer = TextLayer::new(Point::new(x, y));
        layer.content = "HANDLE".to_string();
        let id = layer.id.clone();
        layout.text_layers.push(layer);
        (layout, id)
    }

    #[test]
    fn test_resize_handle_beats_text() {
        // Text centred on the frame's bottom-right corner (880, 800)
        let (layout, _) = layout_with_layer_at(880.0, 805.0);
        let fonts = FontBook::headless();

        let hotspot = handle_hotspot(&layout.frame);
        let steps = 6;
        for i in 1..steps {
            for j in 1..steps {
                let p = Point::new(
                    hotspot.x + hotspot.width * i as f32 / steps as f32,
                    hotspot.y + hotspot.height * j as f32 / steps as f32,
                );
                assert_eq!(hit_test(p, &layout, &fonts), Target::ResizeHandle, "at {p:?}");
            }
        }
    }

    #[test]
    fn test_hotspot_bounds_for_default_frame() {
        let layout = LayoutModel::default();
        let fonts = FontBook::headless();
        assert_eq!(hit_test(Point::new(870.0, 795.0), &layout, &fonts), Target::ResizeHandle);
        assert_eq!(hit_test(Point::new(889.0, 809.0), &layout, &fonts), Target::ResizeHandle);
        // Edges of the open interval are excluded
        assert_ne!(hit_test(Point::new(890.0, 795.0), &layout, &fonts), Target::ResizeHandle);
        assert_ne!(hit_test(Point::new(860.0, 795.0), &layout, &fonts), Target::ResizeHandle);
    }

    #[test]
    fn test_topmost_text_wins() {
        let (mut layout, bottom) = layout_with_layer_at(540.0, 540.0);
        let mut top = TextLayer::new(Point::new(540.0, 540.0));
        top.content = "HANDLE".to_string();
        let top_id = top.id.clone();
        layout.text_layers.push(top);
        let fonts = FontBook::headless();

        let target = hit_test(Point::new(540.0, 530.0), &layout, &fonts);
        assert_eq!(target, Target::TextLayer(top_id));
        assert_ne!(target, Target::TextLayer(bottom));
    }

    #[test]
    fn test_text_box_uses_measured_width() {
        let (layout, id) = layout_with_layer_at(540.0, 200.0);
        let fonts = FontBook::headless();
        let width = text::measure_layer(&fonts, &layout.text_layers[0]);
        let half = width / 2.0 + text::TEXT_BOX_MARGIN;

        assert_eq!(hit_test(Point::new(540.0 + half - 1.0, 190.0), &layout, &fonts), Target::TextLayer(id));
        assert_eq!(hit_test(Point::new(540.0 + half + 1.0, 190.0), &layout, &fonts), Target::Empty);
        // Just below the descent margin
        assert_eq!(hit_test(Point::new(540.0, 211.0), &layout, &fonts), Target::Empty);
    }

    #[test]
    fn test_frame_body_and_empty() {
        let (layout, _) = layout_with_layer_at(100.0, 100.0);
        let fonts = FontBook::headless();
        assert_eq!(hit_test(Point::new(400.0, 500.0), &layout, &fonts), Target::FrameBody);
        assert_eq!(hit_test(Point::new(1000.0, 1000.0), &layout, &fonts), Target::Empty);
    }
}
