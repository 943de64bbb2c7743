// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor state and interaction handling.
//!
//! [`Editor`] owns everything the editor mutates: the layout, the text-layer
//! selection, the drag state, the decoded images and the template library.
//! Every interaction (pointer, wheel, panel actions, async completions) is a
//! method on it, so there is exactly one place where state changes.

use crate::canvas::drag::{DragController, SelectionChange};
use crate::canvas::fonts::FontBook;
use crate::canvas::render::{render, RenderInput};
use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::io::export::export_png;
use crate::io::gallery::{GalleryEntry, RecentGallery};
use crate::io::media::{DecodeCompleted, DecodedImage, ImageLoader, ImageSlot, ImageSource};
use crate::io::serialization::{self, from_template, to_template};
use crate::io::store::{FileTemplateStore, TemplateLibrary};
use crate::models::layout::{parse_font_size, CanvasPreset, LayerId, LayerUpdate, LayoutModel, TextLayer};
use crate::models::template::{Template, TemplateId};
use crate::notice::Notice;
use crate::util::geometry::{to_canvas_space, DisplayBox, Point};
use image::RgbaImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Decoded image plus bookkeeping for in-flight decodes.
#[derive(Debug, Default)]
struct SlotState {
    image: Option<DecodedImage>,
    /// Sequence number of the newest request; older completions are stale.
    latest_seq: Option<u64>,
    /// Name to remember the image under once decoded (product gallery).
    remember_as: Option<String>,
}

/// The single owner of editor state.
pub struct Editor {
    layout: LayoutModel,
    selected: Option<LayerId>,
    drag: DragController,
    fonts: FontBook,
    background: SlotState,
    product: SlotState,
    loader: ImageLoader,
    library: TemplateLibrary,
    gallery: RecentGallery,
    workspace_path: PathBuf,
    export_dir: PathBuf,
    notices: VecDeque<Notice>,
    /// Bumped on every visible change.
    revision: u64,
}

impl Editor {
    /// Build an editor from the configuration, restoring the saved workspace
    /// and starting a template fetch.
    pub fn new(config: &EditorConfig, fonts: FontBook) -> Self {
        let workspace_path = config.workspace_path();
        let layout = serialization::load_workspace(&workspace_path).unwrap_or_default();
        let store = Arc::new(FileTemplateStore::new(config.template_store_path()));
        let mut library = TemplateLibrary::new(store, Some(config.template_cache_path()));
        library.refresh();

        Self {
            layout,
            selected: None,
            drag: DragController::new(),
            fonts,
            background: SlotState::default(),
            product: SlotState::default(),
            loader: ImageLoader::new(),
            library,
            gallery: RecentGallery::open(&config.gallery_path(), config.gallery_limit),
            workspace_path,
            export_dir: config.export_dir.clone(),
            notices: VecDeque::new(),
            revision: 0,
        }
    }

    // --- Accessors ---

    pub fn layout(&self) -> &LayoutModel {
        &self.layout
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn selected(&self) -> Option<&LayerId> {
        self.selected.as_ref()
    }

    pub fn selected_layer(&self) -> Option<&TextLayer> {
        self.selected.as_ref().and_then(|id| self.layout.layer(id))
    }

    pub fn templates(&self) -> &[Template] {
        self.library.templates()
    }

    pub fn gallery(&self) -> &[GalleryEntry] {
        self.gallery.entries()
    }

    pub fn has_product(&self) -> bool {
        self.product.image.is_some()
    }

    pub fn has_background(&self) -> bool {
        self.background.image.is_some()
    }

    /// Whether any image decode is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.background.latest_seq.is_some() || self.product.latest_seq.is_some()
    }

    /// Whether a pointer drag is in progress.
    pub fn is_dragging(&self) -> bool {
        !self.drag.is_idle()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drain notices for display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn slot_mut(&mut self, slot: ImageSlot) -> &mut SlotState {
        match slot {
            ImageSlot::Background => &mut self.background,
            ImageSlot::Product => &mut self.product,
        }
    }

    // --- Pointer input ---

    fn canvas_point(&self, pointer: Point, display: &DisplayBox) -> Option<Point> {
        to_canvas_space(pointer, display, self.layout.canvas_size())
    }

    /// Pointer pressed at `pointer` (display pixels) over the canvas shown in
    /// `display`. `frame_modifier` selects frame moves over product moves.
    pub fn pointer_down(&mut self, pointer: Point, display: &DisplayBox, frame_modifier: bool) {
        let Some(point) = self.canvas_point(pointer, display) else {
            return;
        };
        match self.drag.pointer_down(point, frame_modifier, &self.layout, &self.fonts) {
            SelectionChange::Keep => {}
            SelectionChange::Select(id) => self.selected = Some(id),
            SelectionChange::Clear => self.selected = None,
        }
        self.touch();
    }

    /// Pointer moved; applies the active drag.
    pub fn pointer_move(&mut self, pointer: Point, display: &DisplayBox) {
        if self.drag.is_idle() {
            return;
        }
        let Some(point) = self.canvas_point(pointer, display) else {
            return;
        };
        if self.drag.pointer_move(point, &mut self.layout) {
            self.touch();
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.drag.pointer_leave();
    }

    /// Mouse wheel, in notches (positive enlarges the product).
    pub fn wheel(&mut self, notches: f32) {
        let loaded = self.has_product();
        if self.drag.wheel(notches, loaded, &mut self.layout) {
            self.touch();
        }
    }

    // --- Layer actions ---

    /// Add a default text layer and select it.
    pub fn add_text_layer(&mut self) -> LayerId {
        let id = self.layout.add_text_layer();
        log::info!("Added text layer {id}, total: {}", self.layout.text_layers.len());
        self.selected = Some(id.clone());
        self.touch();
        id
    }

    pub fn select_layer(&mut self, id: &LayerId) {
        if self.layout.layer(id).is_some() {
            self.selected = Some(id.clone());
            self.touch();
        }
    }

    /// Delete the selected layer. Returns whether a layer was deleted.
    pub fn delete_selected_layer(&mut self) -> bool {
        let Some(id) = self.selected.take() else {
            return false;
        };
        let removed = self.layout.remove_layer(&id);
        if removed {
            log::info!("Deleted text layer {id}, total: {}", self.layout.text_layers.len());
            self.touch();
        }
        removed
    }

    /// Update attributes of the selected layer. Invalid input is rejected
    /// with a notice and leaves the layer untouched.
    pub fn update_selected_layer(&mut self, update: &LayerUpdate) -> Result<()> {
        let Some(id) = self.selected.clone() else {
            return Err(EditorError::invalid_input("no text layer selected"));
        };
        match self.layout.update_layer(&id, update) {
            Ok(()) => {
                self.touch();
                Ok(())
            }
            Err(e) => {
                self.notify(Notice::warning(e.to_string()));
                Err(e)
            }
        }
    }

    /// Set the selected layer's font size from operator text.
    pub fn set_selected_font_size(&mut self, input: &str) -> Result<()> {
        let size = parse_font_size(input).inspect_err(|e| self.notify(Notice::warning(e.to_string())))?;
        self.update_selected_layer(&LayerUpdate {
            font_size: Some(size),
            ..Default::default()
        })
    }

    // --- Product and canvas ---

    pub fn set_product_scale(&mut self, scale: f32) -> Result<()> {
        self.layout.product.set_scale(scale)?;
        self.touch();
        Ok(())
    }

    /// Put the product back in the frame centre.
    pub fn reset_product_alignment(&mut self) {
        self.layout.product.reset_offset();
        self.touch();
    }

    pub fn set_canvas_preset(&mut self, preset: CanvasPreset) {
        if self.layout.canvas != preset {
            log::info!("Canvas preset: {}", preset.label());
            self.layout.set_canvas_preset(preset);
            self.touch();
        }
    }

    // --- Images ---

    /// Start loading an image into a slot. The slot keeps its current image
    /// until the decode succeeds; a newer request supersedes this one.
    pub fn load_image(&mut self, slot: ImageSlot, source: ImageSource) -> u64 {
        let remember_as = match (&source, slot) {
            (ImageSource::File(path), ImageSlot::Product) => Some(
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "product".to_string()),
            ),
            _ => None,
        };
        let seq = self.loader.request(slot, source);
        self.begin_decode(slot, seq, remember_as);
        seq
    }

    /// Load a gallery entry into the product slot.
    pub fn use_gallery_entry(&mut self, index: usize) -> bool {
        let Some(entry) = self.gallery.entries().get(index).cloned() else {
            return false;
        };
        let seq = self.loader.request(ImageSlot::Product, ImageSource::Embedded(entry.image));
        self.begin_decode(ImageSlot::Product, seq, Some(entry.name));
        true
    }

    /// Drop a gallery entry. Returns `false` when `index` is out of range.
    pub fn forget_gallery_entry(&mut self, index: usize) -> bool {
        let Some(name) = self.gallery.entries().get(index).map(|e| e.name.clone()) else {
            return false;
        };
        if let Err(e) = self.gallery.remove(index) {
            log::warn!("Failed to update gallery: {e}");
            self.notify(Notice::warning(format!("Could not save the gallery: {e}")));
        }
        log::info!("Removed {name} from the gallery");
        true
    }

    fn begin_decode(&mut self, slot: ImageSlot, seq: u64, remember_as: Option<String>) {
        let state = self.slot_mut(slot);
        state.latest_seq = Some(seq);
        state.remember_as = remember_as;
        self.touch();
    }

    /// Apply a finished decode unless a newer request for the same slot
    /// superseded it.
    pub fn apply_decode(&mut self, done: DecodeCompleted) {
        let state = self.slot_mut(done.slot);
        if state.latest_seq != Some(done.seq) {
            log::debug!("Dropping superseded {:?} decode #{}", done.slot, done.seq);
            return;
        }
        state.latest_seq = None;
        let remember_as = state.remember_as.take();

        match done.result {
            Ok(decoded) => {
                if let Some(name) = remember_as {
                    if let Err(e) = self.gallery.remember(&name, &decoded.encoded) {
                        log::warn!("Failed to update gallery: {e}");
                    }
                }
                self.slot_mut(done.slot).image = Some(decoded);
            }
            Err(e) => {
                self.notify(Notice::error(format!("Could not load {:?} image: {e}", done.slot)));
            }
        }
        self.touch();
    }

    /// Process async completions (image decodes, template syncs).
    pub fn poll(&mut self) {
        while let Some(done) = self.loader.try_next() {
            self.apply_decode(done);
        }
        let notices = self.library.poll();
        if !notices.is_empty() {
            self.notices.extend(notices);
            self.touch();
        }
    }

    // --- Templates ---

    /// Save the current layout as a template. `target` updates an existing
    /// template in place; `None` creates a new one.
    pub fn save_template(&mut self, name: &str, target: Option<TemplateId>) -> Result<TemplateId> {
        let background = self.background.image.as_ref().map(|i| i.encoded.as_slice());
        let product = self.product.image.as_ref().map(|i| i.encoded.as_slice());
        let template = match to_template(&self.layout, name, target, background, product) {
            Ok(t) => t,
            Err(e) => {
                self.notify(Notice::warning(e.to_string()));
                return Err(e);
            }
        };
        let id = template.id.clone();
        let name = template.name.clone();
        self.library.save(template);
        self.notify(Notice::info(format!("Template \"{name}\" saved.")));
        self.touch();
        Ok(id)
    }

    /// Apply a template: geometry immediately, embedded images once decoded.
    pub fn apply_template(&mut self, id: &TemplateId) -> Result<()> {
        let template = self
            .library
            .get(id)
            .ok_or_else(|| EditorError::invalid_input(format!("unknown template {id}")))?;
        let name = template.name.clone();
        let patch = match from_template(template) {
            Ok(patch) => patch,
            Err(e) => {
                log::warn!("Refusing to apply template {name:?}: {e}");
                self.notify(Notice::warning(format!("Template \"{name}\" is damaged: {e}")));
                return Err(e);
            }
        };

        self.drag.pointer_up();
        self.selected = None;
        patch.apply_geometry(&mut self.layout);
        if let Some(bg) = patch.background {
            let seq = self.loader.request(ImageSlot::Background, ImageSource::Embedded(bg));
            self.begin_decode(ImageSlot::Background, seq, None);
        }
        if let Some(product) = patch.product {
            let seq = self.loader.request(ImageSlot::Product, ImageSource::Embedded(product));
            self.begin_decode(ImageSlot::Product, seq, None);
        }
        log::info!("Applied template {name:?}");
        self.notify(Notice::info(format!("Template \"{name}\" applied.")));
        self.touch();
        Ok(())
    }

    pub fn delete_template(&mut self, id: &TemplateId) {
        if self.library.delete(id) {
            self.touch();
        }
    }

    pub fn refresh_templates(&mut self) {
        self.library.refresh();
    }

    // --- Workspace, export ---

    /// Persist the layout (no images) as the startup workspace.
    pub fn save_state(&mut self) -> Result<()> {
        match serialization::save_workspace(&self.layout, &self.workspace_path) {
            Ok(()) => {
                log::info!("Workspace saved to {}", self.workspace_path.display());
                self.notify(Notice::info("Workspace saved."));
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to save workspace: {e}");
                self.notify(Notice::error(format!("Could not save workspace: {e}")));
                Err(e)
            }
        }
    }

    /// Replace the layout with one imported from a YAML/JSON file.
    pub fn import_layout(&mut self, path: &Path) -> Result<()> {
        let layout = serialization::import_layout(path).inspect_err(|e| {
            self.notify(Notice::error(format!("Could not import layout: {e}")));
        })?;
        self.drag.pointer_up();
        self.selected = None;
        self.layout = layout;
        self.touch();
        Ok(())
    }

    pub fn export_layout(&mut self, path: &Path) -> Result<()> {
        serialization::export_layout(&self.layout, path)
            .inspect_err(|e| self.notify(Notice::error(format!("Could not export layout: {e}"))))
    }

    fn render_with(&self, export: bool) -> RgbaImage {
        let input = RenderInput {
            layout: &self.layout,
            background: self.background.image.as_ref().map(|i| i.bitmap.as_ref()),
            product: self.product.image.as_ref().map(|i| i.bitmap.as_ref()),
            selected: self.selected.as_ref(),
            export,
        };
        render(&input, &self.fonts)
    }

    /// Live preview with guides.
    pub fn render_preview(&self) -> RgbaImage {
        self.render_with(false)
    }

    /// Render without guides and write a timestamped PNG.
    pub fn export(&mut self) -> Result<PathBuf> {
        let image = self.render_with(true);
        match export_png(&image, &self.export_dir) {
            Ok(path) => {
                self.notify(Notice::info(format!("Exported {}", path.display())));
                Ok(path)
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                self.notify(Notice::error(format!("Export failed: {e}")));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::media::tests::png_bytes;
    use crate::notice::NoticeLevel;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(10);

    /// Canvas displayed at half size, offset by (20, 10).
    const DISPLAY: DisplayBox = DisplayBox { left: 20.0, top: 10.0, width: 540.0, height: 540.0 };

    fn screen(x: f32, y: f32) -> Point {
        Point::new(20.0 + x / 2.0, 10.0 + y / 2.0)
    }

    fn editor(dir: &Path) -> Editor {
        let config = EditorConfig {
            data_dir: dir.join("data"),
            export_dir: dir.join("exports"),
            ..Default::default()
        };
        let mut editor = Editor::new(&config, FontBook::headless());
        editor.library.wait_idle(WAIT);
        editor
    }

    fn finish_decodes(editor: &mut Editor, count: usize) {
        for _ in 0..count {
            let done = editor.loader.wait_next(WAIT).unwrap();
            editor.apply_decode(done);
        }
    }

    #[test]
    fn test_drag_text_through_display_transform() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        let id = editor.add_text_layer();

        editor.pointer_down(screen(540.0, 540.0), &DISPLAY, false);
        assert_eq!(editor.selected(), Some(&id));
        editor.pointer_move(screen(590.0, 520.0), &DISPLAY);
        editor.pointer_up();
        assert_eq!(editor.layout().layer(&id).unwrap().anchor(), Point::new(590.0, 520.0));

        // Released: further moves are ignored
        editor.pointer_move(screen(10.0, 10.0), &DISPLAY);
        assert_eq!(editor.layout().layer(&id).unwrap().anchor(), Point::new(590.0, 520.0));
    }

    #[test]
    fn test_resize_through_display_transform() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        editor.pointer_down(screen(870.0, 795.0), &DISPLAY, false);
        editor.pointer_move(screen(1000.0, 900.0), &DISPLAY);
        editor.pointer_leave();
        let frame = editor.layout().frame;
        assert_eq!((frame.x, frame.y, frame.width, frame.height), (200.0, 300.0, 800.0, 600.0));
    }

    #[test]
    fn test_empty_click_clears_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        editor.add_text_layer();
        editor.pointer_down(screen(1050.0, 1050.0), &DISPLAY, false);
        assert!(editor.selected().is_none());
    }

    #[test]
    fn test_delete_selected_layer() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        let id = editor.add_text_layer();
        assert!(editor.delete_selected_layer());
        assert!(editor.layout().layer(&id).is_none());
        assert!(editor.selected().is_none());
        assert!(!editor.delete_selected_layer());
    }

    #[test]
    fn test_bad_font_size_leaves_layer_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        let id = editor.add_text_layer();
        editor.take_notices();

        assert!(editor.set_selected_font_size("huge").is_err());
        assert!(editor.set_selected_font_size("0").is_err());
        assert_eq!(editor.layout().layer(&id).unwrap().font_size, 50.0);
        let notices = editor.take_notices();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.level == NoticeLevel::Warning));

        editor.set_selected_font_size("72").unwrap();
        assert_eq!(editor.layout().layer(&id).unwrap().font_size, 72.0);
    }

    #[test]
    fn test_wheel_only_with_product() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        editor.wheel(1.0);
        assert_eq!(editor.layout().product.scale, 1.0);

        editor.load_image(ImageSlot::Product, ImageSource::Bytes(Arc::new(png_bytes(10, 10, [0, 0, 255, 255]))));
        finish_decodes(&mut editor, 1);
        assert!(editor.has_product());
        editor.wheel(1.0);
        assert!((editor.layout().product.scale - 1.05).abs() < 0.0001);
    }

    #[test]
    fn test_superseded_decode_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        let old = editor.load_image(ImageSlot::Product, ImageSource::Bytes(Arc::new(png_bytes(1, 1, [255, 0, 0, 255]))));
        let new = editor.load_image(ImageSlot::Product, ImageSource::Bytes(Arc::new(png_bytes(2, 2, [0, 255, 0, 255]))));
        assert!(new > old);
        assert!(editor.is_loading());

        finish_decodes(&mut editor, 2);
        let product = editor.product.image.as_ref().unwrap();
        assert_eq!(product.bitmap.dimensions(), (2, 2));
        assert!(!editor.is_loading());
    }

    #[test]
    fn test_stale_completion_after_newer_one_applied() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        let old_seq = editor.loader.next_seq();
        editor.begin_decode(ImageSlot::Background, old_seq, None);
        let new_seq = editor.loader.next_seq();
        editor.begin_decode(ImageSlot::Background, new_seq, None);

        let decoded = |w| DecodedImage {
            bitmap: Arc::new(RgbaImage::new(w, w)),
            encoded: Arc::new(Vec::new()),
        };
        editor.apply_decode(DecodeCompleted { slot: ImageSlot::Background, seq: new_seq, result: Ok(decoded(3)) });
        editor.apply_decode(DecodeCompleted { slot: ImageSlot::Background, seq: old_seq, result: Ok(decoded(7)) });
        assert_eq!(editor.background.image.as_ref().unwrap().bitmap.dimensions(), (3, 3));
    }

    #[test]
    fn test_failed_decode_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        editor.take_notices();
        editor.load_image(ImageSlot::Background, ImageSource::Bytes(Arc::new(b"junk".to_vec())));
        finish_decodes(&mut editor, 1);
        assert!(!editor.has_background());
        let notices = editor.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
    }

    #[test]
    fn test_product_file_goes_to_gallery() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filter.png");
        std::fs::write(&path, png_bytes(2, 2, [5, 5, 5, 255])).unwrap();

        let mut editor = editor(dir.path());
        editor.load_image(ImageSlot::Product, ImageSource::File(path));
        finish_decodes(&mut editor, 1);
        assert_eq!(editor.gallery().len(), 1);
        assert_eq!(editor.gallery()[0].name, "filter.png");

        assert!(editor.use_gallery_entry(0));
        finish_decodes(&mut editor, 1);
        assert!(editor.has_product());
        assert_eq!(editor.gallery().len(), 1);
        assert!(!editor.use_gallery_entry(5));
    }

    #[test]
    fn test_forget_gallery_entry_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lens.png");
        std::fs::write(&path, png_bytes(2, 2, [9, 9, 9, 255])).unwrap();

        let mut editor = editor(dir.path());
        editor.load_image(ImageSlot::Product, ImageSource::File(path));
        finish_decodes(&mut editor, 1);
        assert_eq!(editor.gallery().len(), 1);

        assert!(!editor.forget_gallery_entry(3));
        assert!(editor.forget_gallery_entry(0));
        assert!(editor.gallery().is_empty());
        // Loaded product stays on the canvas
        assert!(editor.has_product());
        drop(editor);

        let reopened = self::editor(dir.path());
        assert!(reopened.gallery().is_empty());
    }

    #[test]
    fn test_template_roundtrip_with_images() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        editor.load_image(ImageSlot::Product, ImageSource::Bytes(Arc::new(png_bytes(4, 4, [0, 0, 255, 255]))));
        finish_decodes(&mut editor, 1);
        editor.layout.frame.x = 111.0;

        let id = editor.save_template("Promo", None).unwrap();
        editor.library.wait_idle(WAIT);
        assert_eq!(editor.templates().len(), 1);
        assert!(editor.templates()[0].product.is_some());
        assert!(editor.templates()[0].background.is_none());

        // Change the live layout and drop the product, then re-apply
        editor.layout.frame.x = 0.0;
        editor.product = SlotState::default();
        let source_ids: Vec<_> = editor.templates()[0].text_layers.iter().map(|l| l.id.clone()).collect();

        editor.apply_template(&id).unwrap();
        assert_eq!(editor.layout().frame.x, 111.0);
        assert!(!editor.has_product());
        assert!(editor.is_loading());
        finish_decodes(&mut editor, 1);
        assert_eq!(editor.product.image.as_ref().unwrap().bitmap.dimensions(), (4, 4));
        for layer in &editor.layout().text_layers {
            assert!(!source_ids.contains(&layer.id));
        }
    }

    #[test]
    fn test_save_template_update_in_place_and_blank_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        let id = editor.save_template("First", None).unwrap();
        let same = editor.save_template("Renamed", Some(id.clone())).unwrap();
        assert_eq!(id, same);
        editor.library.wait_idle(WAIT);
        assert_eq!(editor.templates().len(), 1);
        assert_eq!(editor.templates()[0].name, "Renamed");

        editor.take_notices();
        assert!(editor.save_template("  ", None).is_err());
        assert_eq!(editor.take_notices()[0].level, NoticeLevel::Warning);
        assert_eq!(editor.templates().len(), 1);

        editor.delete_template(&id);
        editor.library.wait_idle(WAIT);
        assert!(editor.templates().is_empty());
    }

    #[test]
    fn test_saved_state_restored_on_startup() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        editor.add_text_layer();
        editor.set_canvas_preset(CanvasPreset::Portrait);
        editor.save_state().unwrap();
        let saved = editor.layout().clone();

        let reopened = self::editor(dir.path());
        assert_eq!(reopened.layout(), &saved);
    }

    #[test]
    fn test_export_writes_guide_free_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        editor.add_text_layer();
        let path = editor.export().unwrap();
        assert!(path.starts_with(dir.path().join("exports")));
        let exported = image::open(&path).unwrap().to_rgba8();
        assert_eq!(exported.dimensions(), (1080, 1080));
        assert_eq!(exported, editor.render_with(true));
        assert_ne!(exported, editor.render_preview());
    }

    #[test]
    fn test_revision_tracks_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        let before = editor.revision();
        editor.pointer_move(screen(1.0, 1.0), &DISPLAY);
        assert_eq!(editor.revision(), before);
        editor.reset_product_alignment();
        assert!(editor.revision() > before);
    }

    #[test]
    fn test_failed_decode_keeps_previous_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor(dir.path());
        editor.load_image(ImageSlot::Product, ImageSource::Bytes(Arc::new(png_bytes(3, 3, [9, 9, 9, 255]))));
        finish_decodes(&mut editor, 1);
        assert!(editor.has_product());

        editor.load_image(ImageSlot::Product, ImageSource::Bytes(Arc::new(b"not an image".to_vec())));
        // Still shown while the replacement decodes
        assert!(editor.has_product());
        finish_decodes(&mut editor, 1);
        assert!(!editor.is_loading());
        assert_eq!(editor.product.image.as_ref().unwrap().bitmap.dimensions(), (3, 3));
    }

    #[test]
    fn test_damaged_template_leaves_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut template = to_template(&LayoutModel::default(), "Damaged", None, None, None).unwrap();
        template.frame = crate::models::layout::Frame { x: 10.0, y: 10.0, width: -5.0, height: 3.0 };
        template.text_layers[0].font_size = -20.0;
        let id = template.id.clone();
        crate::io::store::write_templates(&dir.path().join("data").join("templates.json"), &[template]).unwrap();

        let mut editor = editor(dir.path());
        assert_eq!(editor.templates().len(), 1);
        let before = editor.layout().clone();
        editor.take_notices();

        assert!(editor.apply_template(&id).is_err());
        assert_eq!(editor.layout(), &before);
        assert_eq!(editor.take_notices()[0].level, NoticeLevel::Warning);
    }

    #[test]
    fn test_invalid_workspace_starts_from_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut layout = LayoutModel::default();
        layout.text_layers[0].font_size = 0.0;
        layout.frame.width = 1.0;
        layout.frame.height = 1.0;
        serialization::save_workspace(&layout, &dir.path().join("data").join("workspace.json")).unwrap();

        let editor = editor(dir.path());
        assert_eq!(editor.layout().frame, crate::models::layout::Frame::default());
        assert_eq!(editor.layout().text_layers[0].font_size, 70.0);
    }

    #[test]
    fn test_invalid_import_leaves_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        let mut layout = LayoutModel::default();
        layout.text_layers[0].font_size = -1.0;
        serialization::export_layout(&layout, &path).unwrap();

        let mut editor = editor(dir.path());
        let before = editor.layout().clone();
        editor.take_notices();
        assert!(editor.import_layout(&path).is_err());
        assert_eq!(editor.layout(), &before);
        assert_eq!(editor.take_notices()[0].level, NoticeLevel::Error);
    }
}
