// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Properties panel.
//!
//! Lists the text layers, edits the selected one and holds the product
//! placement controls. Edits come back as actions; the panel never mutates
//! the layout itself.

use romota::models::color::Color;
use romota::models::layout::{
    LayerId, LayerUpdate, LayoutModel, TextLayer, MAX_PRODUCT_SCALE, MIN_PRODUCT_SCALE,
};

/// Result of properties panel interaction.
pub enum PropertiesAction {
    SelectLayer(LayerId),
    UpdateLayer(LayerUpdate),
    SetFontSize(String),
    DeleteLayer,
    SetProductScale(f32),
    ResetAlignment,
}

/// Edit buffers that must survive between frames.
#[derive(Default)]
pub struct PropertiesState {
    /// Layer the buffers were filled from.
    layer: Option<LayerId>,
    font_size: String,
}

impl PropertiesState {
    fn sync(&mut self, layer: &TextLayer) {
        if self.layer.as_ref() != Some(&layer.id) {
            self.layer = Some(layer.id.clone());
            self.font_size = layer.font_size.to_string();
        }
    }
}

/// Display the properties panel.
pub fn show(
    ui: &mut egui::Ui,
    state: &mut PropertiesState,
    layout: &LayoutModel,
    selected: Option<&LayerId>,
    font_names: &[String],
    has_product: bool,
) -> Vec<PropertiesAction> {
    let mut actions = Vec::new();

    ui.heading("Layers");
    ui.separator();

    egui::ScrollArea::vertical()
        .id_source("layer_list")
        .max_height(160.0)
        .show(ui, |ui| {
            // Topmost first
            for layer in layout.text_layers.iter().rev() {
                let is_selected = selected == Some(&layer.id);
                let label = if layer.content.is_empty() { "(empty)" } else { layer.content.as_str() };
                if ui.selectable_label(is_selected, label).clicked() {
                    actions.push(PropertiesAction::SelectLayer(layer.id.clone()));
                }
            }
        });

    ui.add_space(8.0);

    match selected.and_then(|id| layout.layer(id)) {
        Some(layer) => {
            state.sync(layer);
            show_layer(ui, state, layer, font_names, &mut actions);
        }
        None => {
            state.layer = None;
            ui.label(egui::RichText::new("No text layer selected").weak());
        }
    }

    ui.add_space(12.0);
    ui.heading("Product");
    ui.separator();

    ui.add_enabled_ui(has_product, |ui| {
        let mut scale = layout.product.scale;
        let slider = egui::Slider::new(&mut scale, MIN_PRODUCT_SCALE..=MAX_PRODUCT_SCALE)
            .logarithmic(true)
            .text("Scale");
        if ui.add(slider).changed() {
            actions.push(PropertiesAction::SetProductScale(scale));
        }
        ui.label(format!(
            "Offset: ({:.0}, {:.0})",
            layout.product.offset_x, layout.product.offset_y
        ));
        if ui.button("Reset alignment").clicked() {
            actions.push(PropertiesAction::ResetAlignment);
        }
    });

    actions
}

fn show_layer(
    ui: &mut egui::Ui,
    state: &mut PropertiesState,
    layer: &TextLayer,
    font_names: &[String],
    actions: &mut Vec<PropertiesAction>,
) {
    egui::Grid::new("layer_properties")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("Text:");
            let mut content = layer.content.clone();
            if ui.text_edit_singleline(&mut content).changed() {
                actions.push(PropertiesAction::UpdateLayer(LayerUpdate {
                    content: Some(content),
                    ..Default::default()
                }));
            }
            ui.end_row();

            ui.label("Size:");
            let response = ui.text_edit_singleline(&mut state.font_size);
            if response.lost_focus() && state.font_size.trim() != layer.font_size.to_string() {
                actions.push(PropertiesAction::SetFontSize(state.font_size.clone()));
                // Re-read from the layer next frame, whether or not the value was accepted
                state.layer = None;
            }
            ui.end_row();

            ui.label("Font:");
            let mut family = layer.font_family.clone();
            egui::ComboBox::from_id_source("font_family")
                .selected_text(family.as_str())
                .width(160.0)
                .show_ui(ui, |ui| {
                    for name in font_names {
                        ui.selectable_value(&mut family, name.clone(), name.as_str());
                    }
                });
            if family != layer.font_family {
                actions.push(PropertiesAction::UpdateLayer(LayerUpdate {
                    font_family: Some(family),
                    ..Default::default()
                }));
            }
            ui.end_row();

            ui.label("Colour:");
            let c = layer.color;
            let mut color = egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a);
            if ui.color_edit_button_srgba(&mut color).changed() {
                let [r, g, b, a] = color.to_srgba_unmultiplied();
                actions.push(PropertiesAction::UpdateLayer(LayerUpdate {
                    color: Some(Color::rgba(r, g, b, a)),
                    ..Default::default()
                }));
            }
            ui.end_row();

            ui.label("Bold:");
            let mut bold = layer.bold;
            if ui.checkbox(&mut bold, "").changed() {
                actions.push(PropertiesAction::UpdateLayer(LayerUpdate {
                    bold: Some(bold),
                    ..Default::default()
                }));
            }
            ui.end_row();
        });

    ui.label(
        egui::RichText::new(format!("Position: ({:.0}, {:.0})", layer.x, layer.y))
            .small()
            .weak(),
    );

    ui.add_space(4.0);
    if ui.button("🗑 Delete layer").clicked() {
        actions.push(PropertiesAction::DeleteLayer);
    }
}
