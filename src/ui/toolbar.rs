// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar: layer creation, canvas presets and export.

use romota::models::layout::CanvasPreset;

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    AddText,
    SetPreset(CanvasPreset),
    LoadBackground,
    LoadProduct,
    Export,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, current: CanvasPreset, has_product: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("🖼 Background").clicked() {
            action = ToolbarAction::LoadBackground;
        }
        if ui.button("📦 Product").clicked() {
            action = ToolbarAction::LoadProduct;
        }
        if ui.button("T Add Text").clicked() {
            action = ToolbarAction::AddText;
        }

        ui.separator();
        ui.label("Canvas:");
        for preset in CanvasPreset::ALL {
            let size = preset.size();
            if ui
                .selectable_label(current == preset, preset.label())
                .on_hover_text(format!("{}×{}", size.width, size.height))
                .clicked()
            {
                action = ToolbarAction::SetPreset(preset);
            }
        }

        ui.separator();
        if ui.button("⬇ Export PNG").clicked() {
            action = ToolbarAction::Export;
        }

        ui.separator();
        let hint = if has_product {
            "Drag to move product, Shift+drag moves the frame, wheel scales"
        } else {
            "Shift+drag moves the frame, drag the corner handle to resize"
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
