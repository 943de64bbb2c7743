// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Canvas widget.
//!
//! Shows the rendered composition scaled to fit the panel and turns raw
//! pointer input into canvas actions. Positions are reported in screen
//! points together with the display box the canvas occupied this frame; the
//! editor maps them into canvas space.

use romota::util::geometry::{fit_display_box, CanvasSize, DisplayBox, Point};

/// Result of canvas interaction.
pub enum CanvasAction {
    PointerDown { pos: Point, display: DisplayBox, frame_modifier: bool },
    PointerMove { pos: Point, display: DisplayBox },
    PointerUp,
    PointerLeave,
    Wheel(f32),
}

/// Display the canvas and collect this frame's pointer actions.
pub fn show(
    ui: &mut egui::Ui,
    texture: Option<&egui::TextureHandle>,
    canvas: CanvasSize,
    dragging: bool,
    loading: bool,
) -> Vec<CanvasAction> {
    let mut actions = Vec::new();
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available = ui.available_rect_before_wrap();
    let display = fit_display_box(
        &DisplayBox {
            left: available.min.x,
            top: available.min.y,
            width: available.width(),
            height: available.height(),
        },
        canvas,
    );
    let image_rect = egui::Rect::from_min_size(
        egui::pos2(display.left, display.top),
        egui::vec2(display.width, display.height),
    );

    let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());

    if let Some(texture) = texture {
        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    if loading {
        ui.painter().text(
            image_rect.left_top() + egui::vec2(12.0, 12.0),
            egui::Align2::LEFT_TOP,
            "Loading image...",
            egui::FontId::proportional(14.0),
            egui::Color32::from_gray(200),
        );
    }

    let (pressed, released, shift, hover, scroll) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.modifiers.shift,
            i.pointer.hover_pos(),
            i.raw_scroll_delta.y,
        )
    });
    let to_point = |p: egui::Pos2| Point::new(p.x, p.y);

    if pressed && response.hovered() {
        if let Some(pos) = response.interact_pointer_pos().or(hover) {
            actions.push(CanvasAction::PointerDown {
                pos: to_point(pos),
                display,
                frame_modifier: shift,
            });
        }
    }

    if dragging {
        match hover {
            Some(pos) if image_rect.contains(pos) => {
                if response.dragged() {
                    actions.push(CanvasAction::PointerMove { pos: to_point(pos), display });
                }
            }
            _ => actions.push(CanvasAction::PointerLeave),
        }
    }

    if released || response.drag_stopped() {
        actions.push(CanvasAction::PointerUp);
    }

    if response.hovered() && scroll != 0.0 {
        actions.push(CanvasAction::Wheel(scroll.signum()));
    }

    actions
}
