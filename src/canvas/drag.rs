// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer-driven direct manipulation.
//!
//! A drag starts on pointer-down from the hit-test result, applies exactly
//! one mutation per pointer-move, and ends on pointer-up or when the pointer
//! leaves the canvas. Moves are absolute: the offset between the pointer and
//! the object's reference point is captured on pointer-down and every move
//! places the object at `pointer - offset`.

use super::fonts::FontBook;
use super::hit_test::{hit_test, Target};
use crate::models::layout::{LayerId, LayoutModel};
use crate::util::geometry::Point;

/// Current manipulation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragMode {
    #[default]
    Idle,
    ResizeHandle,
    Text(LayerId),
    Frame,
    Product,
}

/// Effect of a pointer-down on the text-layer selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Keep,
    Select(LayerId),
    Clear,
}

/// Drag state machine.
#[derive(Debug, Default)]
pub struct DragController {
    mode: DragMode,
    /// Pointer minus reference point, captured on pointer-down.
    offset: Point,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &DragMode {
        &self.mode
    }

    pub fn is_idle(&self) -> bool {
        self.mode == DragMode::Idle
    }

    /// Start a drag. `frame_modifier` is the modifier that turns a press on
    /// the frame body into a frame move instead of a product move.
    pub fn pointer_down(
        &mut self,
        point: Point,
        frame_modifier: bool,
        layout: &LayoutModel,
        fonts: &FontBook,
    ) -> SelectionChange {
        let target = hit_test(point, layout, fonts);
        self.offset = Point::default();

        let (mode, selection) = match target {
            Target::ResizeHandle => (DragMode::ResizeHandle, SelectionChange::Keep),
            Target::TextLayer(id) => match layout.layer(&id) {
                Some(layer) => {
                    self.offset = point - layer.anchor();
                    (DragMode::Text(id.clone()), SelectionChange::Select(id))
                }
                None => (DragMode::Idle, SelectionChange::Clear),
            },
            Target::FrameBody if frame_modifier => {
                self.offset = point - Point::new(layout.frame.x, layout.frame.y);
                (DragMode::Frame, SelectionChange::Clear)
            }
            Target::FrameBody => {
                self.offset = point - layout.product.offset();
                (DragMode::Product, SelectionChange::Clear)
            }
            Target::Empty => (DragMode::Idle, SelectionChange::Clear),
        };

        if mode != DragMode::Idle {
            log::debug!("Drag started: {mode:?} at ({:.1}, {:.1})", point.x, point.y);
        }
        self.mode = mode;
        selection
    }

    /// Apply the current drag to the layout. Returns whether anything changed.
    pub fn pointer_move(&mut self, point: Point, layout: &mut LayoutModel) -> bool {
        let target = point - self.offset;
        match &self.mode {
            DragMode::Idle => false,
            DragMode::ResizeHandle => {
                layout
                    .frame
                    .resize_to(point.x - layout.frame.x, point.y - layout.frame.y);
                true
            }
            DragMode::Text(id) => layout.move_layer(id, target),
            DragMode::Frame => {
                layout.frame.move_to(target);
                true
            }
            DragMode::Product => {
                layout.product.set_offset(target);
                true
            }
        }
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) {
        self.end("pointer up");
    }

    /// Pointer left the canvas; treated like a release.
    pub fn pointer_leave(&mut self) {
        self.end("pointer left canvas");
    }

    fn end(&mut self, reason: &str) {
        if self.mode != DragMode::Idle {
            log::debug!("Drag {:?} ended: {reason}", self.mode);
        }
        self.mode = DragMode::Idle;
        self.offset = Point::default();
    }

    /// Scale the product by wheel notches (positive enlarges). Ignored when no
    /// product image is loaded; independent of the drag state.
    pub fn wheel(&self, notches: f32, product_loaded: bool, layout: &mut LayoutModel) -> bool {
        if !product_loaded || notches == 0.0 {
            return false;
        }
        layout.product.nudge_scale(notches);
        true
    }
}
