// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the primitives shared by the hit-tester, the drag
//! controller and the renderer, plus the transformation from pointer
//! (display) coordinates to canvas logical coordinates.

use serde::{Deserialize, Serialize};

/// A 2D point in canvas logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict containment: points on the edge are outside.
    pub fn contains(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.right() && p.y > self.y && p.y < self.bottom()
    }

    /// Intersection with another rectangle, `None` when they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }
}

/// The on-screen box the canvas is currently rendered into, in display
/// pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Logical size of the canvas in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// Convert a pointer position in display pixels to canvas logical coordinates.
///
/// Must be called with the display box as it is *now*; the box changes when
/// the window is resized. Returns `None` for a degenerate (zero-sized) box.
pub fn to_canvas_space(pointer: Point, display: &DisplayBox, canvas: CanvasSize) -> Option<Point> {
    if display.width <= 0.0 || display.height <= 0.0 {
        return None;
    }
    Some(Point {
        x: (pointer.x - display.left) * (canvas.width as f32 / display.width),
        y: (pointer.y - display.top) * (canvas.height as f32 / display.height),
    })
}

/// Largest box with the canvas aspect ratio that fits `available`, centred.
pub fn fit_display_box(available: &DisplayBox, canvas: CanvasSize) -> DisplayBox {
    let canvas_aspect = canvas.width as f32 / canvas.height as f32;
    let available_aspect = available.width / available.height;

    let (width, height) = if canvas_aspect > available_aspect {
        // Canvas is wider - fit to width
        (available.width, available.width / canvas_aspect)
    } else {
        (available.height * canvas_aspect, available.height)
    };

    DisplayBox {
        left: available.left + (available.width - width) / 2.0,
        top: available.top + (available.height - height) / 2.0,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: CanvasSize = CanvasSize { width: 1080, height: 1080 };

    #[test]
    fn test_identity_when_displayed_at_logical_size() {
        let display = DisplayBox { left: 0.0, top: 0.0, width: 1080.0, height: 1080.0 };
        let p = to_canvas_space(Point::new(540.0, 270.0), &display, SQUARE).unwrap();
        assert_eq!(p, Point::new(540.0, 270.0));
    }

    #[test]
    fn test_scaled_down_display() {
        // Canvas shown at half size, offset in the window
        let display = DisplayBox { left: 100.0, top: 50.0, width: 540.0, height: 540.0 };
        let p = to_canvas_space(Point::new(370.0, 320.0), &display, SQUARE).unwrap();
        assert!((p.x - 540.0).abs() < 0.0001);
        assert!((p.y - 540.0).abs() < 0.0001);
    }

    #[test]
    fn test_non_square_canvas_scales_axes_independently() {
        let story = CanvasSize { width: 1080, height: 1920 };
        let display = DisplayBox { left: 0.0, top: 0.0, width: 270.0, height: 480.0 };
        let p = to_canvas_space(Point::new(270.0, 480.0), &display, story).unwrap();
        assert!((p.x - 1080.0).abs() < 0.0001);
        assert!((p.y - 1920.0).abs() < 0.0001);
    }

    #[test]
    fn test_degenerate_box_rejected() {
        let display = DisplayBox { left: 0.0, top: 0.0, width: 0.0, height: 100.0 };
        assert!(to_canvas_space(Point::new(1.0, 1.0), &display, SQUARE).is_none());
    }

    #[test]
    fn test_fit_display_box_letterboxes() {
        let available = DisplayBox { left: 0.0, top: 0.0, width: 800.0, height: 400.0 };
        let fitted = fit_display_box(&available, SQUARE);
        assert_eq!(fitted.width, 400.0);
        assert_eq!(fitted.height, 400.0);
        assert_eq!(fitted.left, 200.0);
        assert_eq!(fitted.top, 0.0);
    }

    #[test]
    fn test_rect_contains_is_strict() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(5.0, 5.0)));
        assert!(!r.contains(Point::new(0.0, 5.0)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersect(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert_eq!(a.intersect(&Rect::new(20.0, 20.0, 1.0, 1.0)), None);
    }
}
