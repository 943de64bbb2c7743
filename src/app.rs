// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application window and egui App implementation.
//!
//! Hosts the [`Editor`] and routes panel and canvas actions to it. The
//! composition is rendered by the editor and uploaded as a texture whenever
//! the editor's revision changes.

use crate::ui::canvas::{self, CanvasAction};
use crate::ui::properties::{self, PropertiesAction, PropertiesState};
use crate::ui::templates::{self, TemplatesAction, TemplatesState};
use crate::ui::toolbar::{self, ToolbarAction};
use romota::io::media::{ImageSlot, ImageSource};
use romota::{Editor, Notice, NoticeLevel};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// How long a notice stays in the status bar.
const NOTICE_TTL: Duration = Duration::from_secs(6);

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif", "tif", "tiff"];

/// Main application state.
pub struct RomotaApp {
    editor: Editor,

    /// Rendered composition for display
    texture: Option<egui::TextureHandle>,

    /// Editor revision the texture was rendered at
    texture_revision: Option<u64>,

    properties: PropertiesState,
    templates: TemplatesState,

    /// Recent notices with the time they arrived
    notices: Vec<(Notice, Instant)>,
}

impl RomotaApp {
    pub fn new(editor: Editor) -> Self {
        Self {
            editor,
            texture: None,
            texture_revision: None,
            properties: PropertiesState::default(),
            templates: TemplatesState::default(),
            notices: Vec::new(),
        }
    }

    fn pick_image(&mut self, slot: ImageSlot) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        {
            log::info!("Loading {:?} image from {}", slot, path.display());
            self.editor.load_image(slot, ImageSource::File(path));
        }
    }

    fn import_layout(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Layouts", &["yaml", "yml", "json"])
            .pick_file()
        {
            if self.editor.import_layout(&path).is_ok() {
                log::info!("Imported layout from {}", path.display());
            }
        }
    }

    fn export_layout(&mut self, filter: &str, extensions: &[&str], file_name: &str) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter(filter, extensions)
            .set_file_name(file_name)
            .save_file()
        {
            self.save_layout_to(path);
        }
    }

    fn save_layout_to(&mut self, path: PathBuf) {
        if self.editor.export_layout(&path).is_ok() {
            self.editor.notify(Notice::info(format!("Layout written to {}", path.display())));
        }
    }

    fn handle_toolbar(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::AddText => {
                self.editor.add_text_layer();
            }
            ToolbarAction::SetPreset(preset) => self.editor.set_canvas_preset(preset),
            ToolbarAction::LoadBackground => self.pick_image(ImageSlot::Background),
            ToolbarAction::LoadProduct => self.pick_image(ImageSlot::Product),
            ToolbarAction::Export => {
                // Outcome is reported as a notice
                let _ = self.editor.export();
            }
            ToolbarAction::None => {}
        }
    }

    fn handle_properties(&mut self, actions: Vec<PropertiesAction>) {
        for action in actions {
            // Rejections are reported as notices by the editor
            let _ = match action {
                PropertiesAction::SelectLayer(id) => {
                    self.editor.select_layer(&id);
                    Ok(())
                }
                PropertiesAction::UpdateLayer(update) => self.editor.update_selected_layer(&update),
                PropertiesAction::SetFontSize(text) => self.editor.set_selected_font_size(&text),
                PropertiesAction::DeleteLayer => {
                    self.editor.delete_selected_layer();
                    Ok(())
                }
                PropertiesAction::SetProductScale(scale) => self.editor.set_product_scale(scale),
                PropertiesAction::ResetAlignment => {
                    self.editor.reset_product_alignment();
                    Ok(())
                }
            };
        }
    }

    fn handle_templates(&mut self, action: TemplatesAction) {
        match action {
            TemplatesAction::SaveNew(name) => {
                if let Ok(id) = self.editor.save_template(&name, None) {
                    self.templates.set_current(Some(id));
                }
            }
            TemplatesAction::Update(id, name) => {
                if let Ok(id) = self.editor.save_template(&name, Some(id)) {
                    self.templates.set_current(Some(id));
                }
            }
            TemplatesAction::Apply(id) => match self.editor.apply_template(&id) {
                Ok(()) => self.templates.set_current(Some(id)),
                Err(e) => self.editor.notify(Notice::error(e.to_string())),
            },
            TemplatesAction::Delete(id) => {
                self.editor.delete_template(&id);
                self.templates.set_current(None);
            }
            TemplatesAction::Refresh => self.editor.refresh_templates(),
            TemplatesAction::UseGalleryEntry(index) => {
                self.editor.use_gallery_entry(index);
            }
            TemplatesAction::ForgetGalleryEntry(index) => {
                self.editor.forget_gallery_entry(index);
            }
            TemplatesAction::None => {}
        }
    }

    fn handle_canvas(&mut self, actions: Vec<CanvasAction>) {
        for action in actions {
            match action {
                CanvasAction::PointerDown { pos, display, frame_modifier } => {
                    self.editor.pointer_down(pos, &display, frame_modifier)
                }
                CanvasAction::PointerMove { pos, display } => self.editor.pointer_move(pos, &display),
                CanvasAction::PointerUp => self.editor.pointer_up(),
                CanvasAction::PointerLeave => self.editor.pointer_leave(),
                CanvasAction::Wheel(notches) => self.editor.wheel(notches),
            }
        }
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let revision = self.editor.revision();
        if self.texture.is_some() && self.texture_revision == Some(revision) {
            return;
        }

        let image = self.editor.render_preview();
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        match &mut self.texture {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("composition", color_image, egui::TextureOptions::LINEAR));
            }
        }
        self.texture_revision = Some(revision);
    }

    fn collect_notices(&mut self) {
        let now = Instant::now();
        self.notices.extend(self.editor.take_notices().into_iter().map(|n| (n, now)));
        self.notices.retain(|(_, at)| now.duration_since(*at) < NOTICE_TTL);
    }
}

impl eframe::App for RomotaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply finished decodes and template syncs
        self.editor.poll();

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Background...").clicked() {
                        self.pick_image(ImageSlot::Background);
                        ui.close_menu();
                    }
                    if ui.button("Open Product...").clicked() {
                        self.pick_image(ImageSlot::Product);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Save State").clicked() {
                        // Outcome is reported as a notice
                        let _ = self.editor.save_state();
                        ui.close_menu();
                    }
                    if ui.button("Import Layout...").clicked() {
                        self.import_layout();
                        ui.close_menu();
                    }
                    ui.menu_button("Export Layout", |ui| {
                        if ui.button("Export as YAML...").clicked() {
                            self.export_layout("YAML", &["yaml", "yml"], "layout.yaml");
                            ui.close_menu();
                        }
                        if ui.button("Export as JSON...").clicked() {
                            self.export_layout("JSON", &["json"], "layout.json");
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Export PNG").clicked() {
                        let _ = self.editor.export();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui.button("Add Text Layer").clicked() {
                        self.editor.add_text_layer();
                        ui.close_menu();
                    }
                    let has_selection = self.editor.selected().is_some();
                    if ui.add_enabled(has_selection, egui::Button::new("Delete Selected")).clicked() {
                        self.editor.delete_selected_layer();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.add_enabled(self.editor.has_product(), egui::Button::new("Reset Alignment")).clicked() {
                        self.editor.reset_product_alignment();
                        ui.close_menu();
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, self.editor.layout().canvas, self.editor.has_product()))
            .inner;
        self.handle_toolbar(toolbar_action);

        // Status bar with recent notices
        self.collect_notices();
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let size = self.editor.layout().canvas_size();
                ui.label(format!("{}×{}", size.width, size.height));
                ui.separator();
                ui.label(format!("Fonts: {}", self.editor.fonts().provider_kind()));
                if let Some((notice, _)) = self.notices.last() {
                    ui.separator();
                    let color = match notice.level {
                        NoticeLevel::Info => egui::Color32::from_gray(200),
                        NoticeLevel::Warning => egui::Color32::from_rgb(230, 180, 60),
                        NoticeLevel::Error => egui::Color32::from_rgb(230, 80, 80),
                    };
                    ui.label(egui::RichText::new(&notice.message).color(color));
                }
            });
        });

        // Templates panel (left side)
        let templates_action = egui::SidePanel::left("templates")
            .default_width(220.0)
            .show(ctx, |ui| {
                templates::show(ui, &mut self.templates, self.editor.templates(), self.editor.gallery())
            })
            .inner;
        self.handle_templates(templates_action);

        // Properties panel (right side)
        let font_names = self.editor.fonts().font_names();
        let properties_actions = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| {
                properties::show(
                    ui,
                    &mut self.properties,
                    self.editor.layout(),
                    self.editor.selected(),
                    &font_names,
                    self.editor.has_product(),
                )
            })
            .inner;
        self.handle_properties(properties_actions);

        // Delete key removes the selected layer unless a text field has focus
        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            self.editor.delete_selected_layer();
        }

        // Main canvas (center)
        self.refresh_texture(ctx);
        let canvas_actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                canvas::show(
                    ui,
                    self.texture.as_ref(),
                    self.editor.layout().canvas_size(),
                    self.editor.is_dragging(),
                    self.editor.is_loading(),
                )
            })
            .inner;
        self.handle_canvas(canvas_actions);

        // Show changes made this frame without waiting for input
        if self.texture_revision != Some(self.editor.revision()) {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(Duration::from_millis(200));
        }
    }
}
