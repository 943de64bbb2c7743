// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Template and gallery panel.

use romota::io::gallery::GalleryEntry;
use romota::models::template::{Template, TemplateId};

/// Result of template panel interaction.
pub enum TemplatesAction {
    None,
    SaveNew(String),
    Update(TemplateId, String),
    Apply(TemplateId),
    Delete(TemplateId),
    Refresh,
    UseGalleryEntry(usize),
    ForgetGalleryEntry(usize),
}

/// Edit buffers that must survive between frames.
#[derive(Default)]
pub struct TemplatesState {
    name: String,
    /// Template last applied or saved; "Update" targets it.
    current: Option<TemplateId>,
}

impl TemplatesState {
    pub fn set_current(&mut self, id: Option<TemplateId>) {
        self.current = id;
    }
}

/// Display the template panel.
pub fn show(
    ui: &mut egui::Ui,
    state: &mut TemplatesState,
    templates: &[Template],
    gallery: &[GalleryEntry],
) -> TemplatesAction {
    let mut action = TemplatesAction::None;

    ui.horizontal(|ui| {
        ui.heading("Templates");
        if ui.small_button("⟳").on_hover_text("Reload from store").clicked() {
            action = TemplatesAction::Refresh;
        }
    });
    ui.separator();

    ui.horizontal(|ui| {
        ui.label("Name:");
        ui.text_edit_singleline(&mut state.name);
    });
    ui.horizontal(|ui| {
        if ui.button("Save new").clicked() {
            action = TemplatesAction::SaveNew(state.name.clone());
        }
        let current = state.current.clone().filter(|id| templates.iter().any(|t| &t.id == id));
        let can_update = current.is_some();
        if ui.add_enabled(can_update, egui::Button::new("Update")).clicked() {
            if let Some(id) = current {
                action = TemplatesAction::Update(id, state.name.clone());
            }
        }
    });

    ui.add_space(6.0);

    if templates.is_empty() {
        ui.label(egui::RichText::new("No templates yet").weak());
    }

    egui::ScrollArea::vertical()
        .id_source("template_list")
        .max_height(220.0)
        .show(ui, |ui| {
            for template in templates {
                ui.horizontal(|ui| {
                    let is_current = state.current.as_ref() == Some(&template.id);
                    if ui.selectable_label(is_current, &template.name).clicked() {
                        state.name = template.name.clone();
                        action = TemplatesAction::Apply(template.id.clone());
                    }
                    if ui.small_button("🗑").on_hover_text("Delete template").clicked() {
                        action = TemplatesAction::Delete(template.id.clone());
                    }
                });
            }
        });

    ui.add_space(12.0);
    ui.heading("Recent products");
    ui.separator();

    if gallery.is_empty() {
        ui.label(egui::RichText::new("Products you load appear here").weak());
    }
    for (index, entry) in gallery.iter().enumerate() {
        ui.horizontal(|ui| {
            if ui.link(&entry.name).clicked() {
                action = TemplatesAction::UseGalleryEntry(index);
            }
            if ui.small_button("✕").on_hover_text("Remove from recent products").clicked() {
                action = TemplatesAction::ForgetGalleryEntry(index);
            }
        });
    }

    action
}
