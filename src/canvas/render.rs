// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! CPU renderer for the composition.
//!
//! [`render`] is a pure function from the layout, the decoded bitmaps and
//! the selection to a fresh RGBA image at the canvas logical resolution.
//! Editing guides (frame border, resize handle, selection outline) are
//! skipped in export mode.

use super::fonts::FontBook;
use super::hit_test::handle_rect;
use super::text::{self, TextRun};
use crate::models::color::Color;
use crate::models::layout::{LayerId, LayoutModel};
use crate::util::geometry::Rect;
use ab_glyph::{point, Font};
use image::{Rgba, RgbaImage};

const BACKGROUND_FALLBACK: Color = Color::rgb(0x1e, 0x1e, 0x1e);
const PLACEHOLDER_FILL: Color = Color::rgba(0xff, 0xff, 0xff, 13);
const PLACEHOLDER_TEXT: Color = Color::rgba(0xff, 0xff, 0xff, 51);
const PLACEHOLDER_LABEL: &str = "PRODUCT AREA";
const PLACEHOLDER_FONT_SIZE: f32 = 20.0;
const FRAME_BORDER: Color = Color::rgba(211, 47, 47, 102);
const HANDLE_FILL: Color = Color::rgba(211, 47, 47, 204);
const SELECTION_OUTLINE: Color = Color::rgba(0xff, 0xff, 0xff, 128);

/// Everything the renderer reads.
pub struct RenderInput<'a> {
    pub layout: &'a LayoutModel,
    pub background: Option<&'a RgbaImage>,
    pub product: Option<&'a RgbaImage>,
    pub selected: Option<&'a LayerId>,
    /// Suppress editing guides.
    pub export: bool,
}

/// Draw the composition.
pub fn render(input: &RenderInput, fonts: &FontBook) -> RgbaImage {
    let size = input.layout.canvas_size();
    let mut canvas = RgbaImage::from_pixel(size.width, size.height, Rgba(BACKGROUND_FALLBACK.to_array()));
    let canvas_rect = Rect::new(0.0, 0.0, size.width as f32, size.height as f32);
    let frame = &input.layout.frame;

    // 1. Background, scaled to cover and centred
    if let Some(bg) = input.background {
        let (iw, ih) = (bg.width() as f32, bg.height() as f32);
        let scale = (canvas_rect.width / iw).max(canvas_rect.height / ih);
        let (w, h) = (iw * scale, ih * scale);
        let dest = Rect::new((canvas_rect.width - w) / 2.0, (canvas_rect.height - h) / 2.0, w, h);
        draw_image(&mut canvas, bg, dest, canvas_rect);
    }

    // 2. Frame border
    if !input.export {
        stroke_rect(&mut canvas, frame.rect(), 2.0, Some((10.0, 5.0)), FRAME_BORDER);
    }

    // 3. Product, clipped to the frame
    if let Some(clip) = frame.rect().intersect(&canvas_rect) {
        match input.product {
            Some(product) => {
                let placement = &input.layout.product;
                let w = product.width() as f32 * placement.scale;
                let h = product.height() as f32 * placement.scale;
                let centre = frame.rect().center();
                let dest = Rect::new(
                    centre.x - w / 2.0 + placement.offset_x,
                    centre.y - h / 2.0 + placement.offset_y,
                    w,
                    h,
                );
                draw_image(&mut canvas, product, dest, clip);
            }
            None => {
                fill_rect(&mut canvas, clip, PLACEHOLDER_FILL);
                let run = text::shape_text(fonts.default_font(), PLACEHOLDER_LABEL, PLACEHOLDER_FONT_SIZE, false);
                let centre = frame.rect().center();
                draw_run(&mut canvas, &run, centre.x - run.width / 2.0, centre.y, PLACEHOLDER_TEXT, clip);
            }
        }
    }

    // 4. Resize handle
    if !input.export {
        if let Some(handle) = handle_rect(frame).intersect(&canvas_rect) {
            fill_rect(&mut canvas, handle, HANDLE_FILL);
        }
    }

    // 5. Text layers in paint order
    for layer in &input.layout.text_layers {
        let run = text::shape_layer(fonts, layer);
        if run.font.is_none() && !layer.content.is_empty() {
            log::debug!("Layer {} has no resolvable font; text not drawn", layer.id);
        }
        draw_run(&mut canvas, &run, layer.x - run.width / 2.0, layer.y, layer.color, canvas_rect);

        if !input.export && input.selected == Some(&layer.id) {
            let outline = text::layer_box_for_width(layer, run.width);
            stroke_rect(&mut canvas, outline, 1.0, Some((5.0, 5.0)), SELECTION_OUTLINE);
        }
    }

    canvas
}

/// Source-over blend of `color` at `coverage` into one pixel.
fn blend_pixel(canvas: &mut RgbaImage, x: i32, y: i32, color: Color, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let alpha = (color.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let src = [color.r, color.g, color.b];
    for (d, s) in dst.0.iter_mut().zip(src) {
        *d = (s as f32 * alpha + *d as f32 * (1.0 - alpha)).round() as u8;
    }
    let dst_alpha = dst.0[3] as f32 / 255.0;
    dst.0[3] = ((alpha + dst_alpha * (1.0 - alpha)) * 255.0).round() as u8;
}

/// Pixel index range whose centres fall in `[lo, hi)`.
fn pixel_span(lo: f32, hi: f32) -> std::ops::Range<i32> {
    (lo - 0.5).ceil() as i32..(hi - 0.5).ceil() as i32
}

fn fill_rect(canvas: &mut RgbaImage, rect: Rect, color: Color) {
    for y in pixel_span(rect.y, rect.bottom()) {
        for x in pixel_span(rect.x, rect.right()) {
            blend_pixel(canvas, x, y, color, 1.0);
        }
    }
}

/// Stroke a rectangle outline centred on its edges, optionally dashed with
/// an `(on, off)` pattern that runs continuously around the perimeter. Only
/// the part of each edge that can touch the canvas is walked.
fn stroke_rect(canvas: &mut RgbaImage, rect: Rect, width: f32, dash: Option<(f32, f32)>, color: Color) {
    if ![rect.x, rect.y, rect.width, rect.height].iter().all(|v| v.is_finite()) {
        return;
    }
    let half = width / 2.0;
    let (canvas_w, canvas_h) = (canvas.width() as f32, canvas.height() as f32);
    let edges = [
        (rect.x, rect.y, rect.width, true),
        (rect.right(), rect.y, rect.height, false),
        (rect.right(), rect.bottom(), -rect.width, true),
        (rect.x, rect.bottom(), -rect.height, false),
    ];

    let mut travelled = 0.0f32;
    for (sx, sy, length, horizontal) in edges {
        let steps = length.abs().ceil();
        let dir = length.signum();
        let (start, across, extent, cross_extent) = if horizontal {
            (sx, sy, canvas_w, canvas_h)
        } else {
            (sy, sx, canvas_h, canvas_w)
        };

        if across + half >= 0.0 && across - half <= cross_extent {
            // Unit segments overlapping [0, extent] along the edge
            let (first, last) = if dir >= 0.0 {
                ((-1.0 - start).floor(), (extent + 1.0 - start).ceil())
            } else {
                ((start - extent - 1.0).floor(), (start + 1.0).ceil())
            };
            let first = first.max(0.0) as i32;
            let last = last.min(steps) as i32;

            for step in first..last {
                let distance = travelled + step as f32;
                if let Some((on, off)) = dash {
                    if distance % (on + off) >= on {
                        continue;
                    }
                }
                let along = step as f32 * dir;
                let seg = if horizontal {
                    Rect::new(sx + along.min(along + dir), sy - half, 1.0, width)
                } else {
                    Rect::new(sx - half, sy + along.min(along + dir), width, 1.0)
                };
                fill_rect(canvas, seg, color);
            }
        }
        travelled += length.abs();
    }
}

/// Draw `src` stretched into `dest`, limited to `clip`. Nearest sampling.
fn draw_image(canvas: &mut RgbaImage, src: &RgbaImage, dest: Rect, clip: Rect) {
    if src.width() == 0 || src.height() == 0 || dest.width <= 0.0 || dest.height <= 0.0 {
        return;
    }
    let Some(area) = dest.intersect(&clip) else {
        return;
    };
    let sx = src.width() as f32 / dest.width;
    let sy = src.height() as f32 / dest.height;

    for y in pixel_span(area.y, area.bottom()) {
        let v = ((y as f32 + 0.5 - dest.y) * sy).floor();
        if v < 0.0 || v >= src.height() as f32 {
            continue;
        }
        for x in pixel_span(area.x, area.right()) {
            let u = ((x as f32 + 0.5 - dest.x) * sx).floor();
            if u < 0.0 || u >= src.width() as f32 {
                continue;
            }
            let px = src.get_pixel(u as u32, v as u32).0;
            blend_pixel(canvas, x, y, Color::rgba(px[0], px[1], px[2], px[3]), 1.0);
        }
    }
}

/// Rasterize a shaped run with its left edge at `left` and baseline at
/// `baseline`, limited to `clip`.
fn draw_run(canvas: &mut RgbaImage, run: &TextRun, left: f32, baseline: f32, color: Color, clip: Rect) {
    let Some(font) = &run.font else {
        return;
    };
    for (id, x) in &run.glyphs {
        let glyph = id.with_scale_and_position(run.scale, point(left + x, baseline));
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let px = bounds.min.x as i32 + gx as i32;
            let py = bounds.min.y as i32 + gy as i32;
            let centre = crate::util::geometry::Point::new(px as f32 + 0.5, py as f32 + 0.5);
            if clip.contains(centre) {
                blend_pixel(canvas, px, py, color, coverage);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layout::CanvasPreset;

    fn layout_without_text() -> LayoutModel {
        let mut layout = LayoutModel::default();
        layout.text_layers.clear();
        layout
    }

    fn render_with(layout: &LayoutModel, product: Option<&RgbaImage>, export: bool) -> RgbaImage {
        let input = RenderInput {
            layout,
            background: None,
            product,
            selected: None,
            export,
        };
        render(&input, &FontBook::headless())
    }

    #[test]
    fn test_fallback_background_and_size() {
        let mut layout = layout_without_text();
        let img = render_with(&layout, None, true);
        assert_eq!(img.dimensions(), (1080, 1080));
        assert_eq!(img.get_pixel(5, 5).0, [0x1e, 0x1e, 0x1e, 0xff]);

        layout.set_canvas_preset(CanvasPreset::Story);
        let img = render_with(&layout, None, true);
        assert_eq!(img.dimensions(), (1080, 1920));
    }

    #[test]
    fn test_placeholder_fills_frame() {
        let layout = layout_without_text();
        let img = render_with(&layout, None, true);
        let inside = img.get_pixel(400, 500).0;
        let outside = img.get_pixel(100, 500).0;
        assert_eq!(outside, [0x1e, 0x1e, 0x1e, 0xff]);
        assert!(inside[0] > outside[0]);
    }

    #[test]
    fn test_guides_only_in_preview() {
        let layout = layout_without_text();
        let preview = render_with(&layout, None, false);
        let export = render_with(&layout, None, true);

        // Inside the visible handle (865..880, 785..800)
        let handle_px = preview.get_pixel(872, 792).0;
        assert!(handle_px[0] > 150 && handle_px[1] < 100);
        assert_eq!(export.get_pixel(872, 792).0, export.get_pixel(400, 500).0);

        // Frame border starts dashed at the top-left corner
        assert_ne!(preview.get_pixel(202, 300).0, export.get_pixel(202, 300).0);
    }

    #[test]
    fn test_product_is_clipped_to_frame() {
        let layout = layout_without_text();
        let product = RgbaImage::from_pixel(2000, 2000, Rgba([0, 0, 255, 255]));
        let img = render_with(&layout, Some(&product), true);
        assert_eq!(img.get_pixel(250, 550).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(150, 550).0, [0x1e, 0x1e, 0x1e, 0xff]);
        assert_eq!(img.get_pixel(900, 550).0, [0x1e, 0x1e, 0x1e, 0xff]);
    }

    #[test]
    fn test_product_scale_and_offset() {
        let mut layout = layout_without_text();
        let product = RgbaImage::from_pixel(100, 100, Rgba([0, 255, 0, 255]));
        layout.product.set_scale(2.0).unwrap();
        // 200x200 centred on the frame centre (540, 550), shifted right by 100
        layout.product.offset_x = 100.0;
        let img = render_with(&layout, Some(&product), true);
        assert_eq!(img.get_pixel(640, 550).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(735, 640).0, [0, 255, 0, 255]);
        assert_ne!(img.get_pixel(500, 550).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_background_covers_canvas() {
        let layout = layout_without_text();
        let mut bg = RgbaImage::new(2, 1);
        bg.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        bg.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        let input = RenderInput {
            layout: &layout,
            background: Some(&bg),
            product: None,
            selected: None,
            export: true,
        };
        let img = render(&input, &FontBook::headless());
        assert_eq!(img.get_pixel(100, 100).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(1000, 100).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_selection_outline_suppressed_on_export() {
        let mut layout = layout_without_text();
        let id = layout.add_text_layer();
        let fonts = FontBook::headless();

        let draw = |selected: Option<&LayerId>, export: bool| {
            render(
                &RenderInput {
                    layout: &layout,
                    background: None,
                    product: None,
                    selected,
                    export,
                },
                &fonts,
            )
        };

        assert_ne!(draw(Some(&id), false), draw(None, false));
        assert_eq!(draw(Some(&id), true), draw(None, true));
    }

    #[test]
    fn test_frame_outside_canvas_is_tolerated() {
        let mut layout = layout_without_text();
        layout.frame.x = 5000.0;
        let img = render_with(&layout, None, false);
        assert_eq!(img.get_pixel(540, 540).0, [0x1e, 0x1e, 0x1e, 0xff]);
    }

    #[test]
    fn test_huge_frame_border_is_clipped() {
        let mut layout = layout_without_text();
        layout.frame.width = 1.0e9;
        layout.frame.height = 1.0e9;
        let img = render_with(&layout, None, false);
        // Border dash starts at the frame origin
        assert_ne!(img.get_pixel(203, 299).0, [0x1e, 0x1e, 0x1e, 0xff]);
        assert_eq!(img.get_pixel(100, 100).0, [0x1e, 0x1e, 0x1e, 0xff]);
    }

    fn system_font_data() -> Option<Vec<u8>> {
        use font_kit::family_name::FamilyName;
        use font_kit::properties::Properties;

        let handle = font_kit::source::SystemSource::new()
            .select_best_match(&[FamilyName::SansSerif], &Properties::new())
            .ok()?;
        let font = handle.load().ok()?;
        Some((*font.copy_font_data()?).clone())
    }

    #[test]
    fn test_real_font_pixels_stay_inside_hit_box() {
        use crate::canvas::fonts::StaticFontListProvider;
        use crate::canvas::hit_test::{hit_test, Target};
        use crate::models::layout::TextLayer;
        use crate::util::geometry::Point;

        let Some(data) = system_font_data() else {
            eprintln!("no system font available, skipping");
            return;
        };
        let mut provider = StaticFontListProvider::new(Vec::new());
        if provider.register_font("Test Sans", data).is_err() {
            eprintln!("system font not usable, skipping");
            return;
        }
        let fonts = FontBook::new(Box::new(provider), Vec::new());

        let mut layout = layout_without_text();
        let mut layer = TextLayer::new(Point::new(540.0, 200.0));
        layer.content = "Hit me, Wave".to_string();
        layer.font_size = 60.0;
        layer.font_family = "Test Sans".to_string();
        layer.bold = false;
        let id = layer.id.clone();
        layout.text_layers.push(layer.clone());

        let run = text::shape_layer(&fonts, &layer);
        assert!(run.font.is_some());
        assert!(!run.glyphs.is_empty());
        let hit_box = text::layer_box(&fonts, &layer);

        let input = RenderInput {
            layout: &layout,
            background: None,
            product: None,
            selected: None,
            export: true,
        };
        let img = render(&input, &fonts);

        let frame = layout.frame.rect();
        let mut inked = 0;
        for (x, y, px) in img.enumerate_pixels() {
            let centre = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if frame.contains(centre) || px.0[0] <= 0x1e + 40 {
                continue;
            }
            inked += 1;
            assert!(hit_box.contains(centre), "text pixel ({x}, {y}) outside {hit_box:?}");
            assert_eq!(hit_test(centre, &layout, &fonts), Target::TextLayer(id.clone()));
        }
        assert!(inked > 100, "only {inked} text pixels drawn");
    }
}
