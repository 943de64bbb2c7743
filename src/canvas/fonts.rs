// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Font discovery and loading.
//!
//! Font enumeration is a capability that may be missing on the host, so it
//! sits behind [`FontProvider`] with two implementations: one backed by the
//! system font database and one serving a static list. The provider is
//! probed once at startup; everything downstream only sees the trait.

use crate::error::{EditorError, Result};
use ab_glyph::FontArc;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Source of font names and font data.
pub trait FontProvider {
    /// Short name for logs and notices.
    fn kind(&self) -> &'static str;

    /// Font family names the operator can pick from, sorted.
    fn font_names(&self) -> Vec<String>;

    /// Load a family at regular or bold weight.
    fn load_font(&self, family: &str, bold: bool) -> Option<FontArc>;
}

/// Provider backed by the operating system's font database.
pub struct SystemFontProvider {
    families: Vec<String>,
}

impl SystemFontProvider {
    /// Enumerate system families and merge in `extra` names. Fails when the
    /// platform offers no font database access.
    pub fn probe(extra: &[String]) -> Result<Self> {
        let families = font_kit::source::SystemSource::new()
            .all_families()
            .map_err(|e| EditorError::capability(format!("system font enumeration unavailable: {e:?}")))?;
        Self::from_families(families, extra)
    }

    /// Build the picker list from discovered families plus `extra` names,
    /// sorted without duplicates. An empty discovery counts as no access.
    pub fn from_families(families: Vec<String>, extra: &[String]) -> Result<Self> {
        if families.is_empty() {
            return Err(EditorError::capability("system font database is empty"));
        }
        let mut families: Vec<String> = families.into_iter().chain(extra.iter().cloned()).collect();
        families.sort();
        families.dedup();
        Ok(Self { families })
    }
}

impl FontProvider for SystemFontProvider {
    fn kind(&self) -> &'static str {
        "system"
    }

    fn font_names(&self) -> Vec<String> {
        self.families.clone()
    }

    fn load_font(&self, family: &str, bold: bool) -> Option<FontArc> {
        use font_kit::family_name::FamilyName;
        use font_kit::properties::{Properties, Weight};
        use font_kit::source::SystemSource;

        let mut props = Properties::new();
        if bold {
            props.weight = Weight::BOLD;
        }

        let handle = SystemSource::new()
            .select_best_match(&[FamilyName::Title(family.to_string())], &props)
            .ok()?;
        let font = handle.load().ok()?;
        let data = font.copy_font_data()?;
        FontArc::try_from_vec((*data).clone()).ok()
    }
}

/// Provider serving a fixed list of names, with optional font files
/// registered by name.
#[derive(Default)]
pub struct StaticFontListProvider {
    names: Vec<String>,
    fonts: HashMap<String, FontArc>,
}

impl StaticFontListProvider {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        names.dedup();
        Self {
            names,
            fonts: HashMap::new(),
        }
    }

    /// Register font data under a family name.
    pub fn register_font(&mut self, family: &str, data: Vec<u8>) -> Result<()> {
        let font = FontArc::try_from_vec(data)
            .map_err(|_| EditorError::invalid_input(format!("not a usable font for {family}")))?;
        self.fonts.insert(family.to_string(), font);
        if let Err(pos) = self.names.binary_search_by(|n| n.as_str().cmp(family)) {
            self.names.insert(pos, family.to_string());
        }
        Ok(())
    }

    pub fn register_font_file(&mut self, family: &str, path: &Path) -> Result<()> {
        let data = std::fs::read(path)?;
        self.register_font(family, data)
    }
}

impl FontProvider for StaticFontListProvider {
    fn kind(&self) -> &'static str {
        "static"
    }

    fn font_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn load_font(&self, family: &str, _bold: bool) -> Option<FontArc> {
        self.fonts.get(family).cloned()
    }
}

/// Resolves layer font requests to loaded fonts, with caching and fallback
/// families.
pub struct FontBook {
    provider: Box<dyn FontProvider>,
    fallback_families: Vec<String>,
    cache: RefCell<HashMap<(String, bool), Option<FontArc>>>,
}

impl FontBook {
    pub fn new(provider: Box<dyn FontProvider>, fallback_families: Vec<String>) -> Self {
        Self {
            provider,
            fallback_families,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// A book with no fonts at all; text metrics fall back to estimates.
    pub fn headless() -> Self {
        Self::new(Box::new(StaticFontListProvider::default()), Vec::new())
    }

    pub fn provider_kind(&self) -> &'static str {
        self.provider.kind()
    }

    pub fn font_names(&self) -> Vec<String> {
        self.provider.font_names()
    }

    /// Resolve `family`, falling back to the default families.
    pub fn resolve(&self, family: &str, bold: bool) -> Option<FontArc> {
        let key = (family.to_string(), bold);
        if let Some(cached) = self.cache.borrow().get(&key) {
            return cached.clone();
        }

        let font = self.provider.load_font(family, bold).or_else(|| {
            log::debug!("Font {family:?} unavailable, trying fallbacks");
            self.fallback_families
                .iter()
                .find_map(|f| self.provider.load_font(f, bold))
        });
        if font.is_none() {
            log::warn!("No font could be resolved for {family:?} (bold: {bold})");
        }

        self.cache.borrow_mut().insert(key, font.clone());
        font
    }

    /// The first resolvable fallback family, for chrome such as placeholders.
    pub fn default_font(&self) -> Option<FontArc> {
        self.fallback_families
            .first()
            .and_then(|family| self.resolve(family, false))
    }
}

/// Pick the font provider once at startup.
///
/// `font_files` are registered with the static provider when it is the one
/// chosen. Returns the provider plus a notice for the operator when the
/// system font database is not available.
pub fn select_provider(
    static_names: Vec<String>,
    font_files: &BTreeMap<String, PathBuf>,
) -> (Box<dyn FontProvider>, Option<String>) {
    match SystemFontProvider::probe(&static_names) {
        Ok(provider) => {
            log::info!("Using system fonts ({} families)", provider.families.len());
            (Box::new(provider), None)
        }
        Err(e) => {
            log::warn!("Falling back to static font list: {e}");
            let mut provider = StaticFontListProvider::new(static_names);
            for (family, path) in font_files {
                if let Err(e) = provider.register_font_file(family, path) {
                    log::warn!("Skipping font {family} at {}: {e}", path.display());
                }
            }
            (
                Box::new(provider),
                Some("System font access is not available; showing the built-in font list.".to_string()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_provider_sorted_dedup() {
        let provider = StaticFontListProvider::new(vec![
            "Verdana".to_string(),
            "Impact".to_string(),
            "Verdana".to_string(),
        ]);
        assert_eq!(provider.font_names(), vec!["Impact".to_string(), "Verdana".to_string()]);
        assert!(provider.load_font("Impact", false).is_none());
    }

    #[test]
    fn test_register_rejects_garbage() {
        let mut provider = StaticFontListProvider::default();
        assert!(provider.register_font("Broken", vec![0, 1, 2, 3]).is_err());
        assert!(provider.font_names().is_empty());
    }

    #[test]
    fn test_headless_book_resolves_nothing() {
        let book = FontBook::headless();
        assert_eq!(book.provider_kind(), "static");
        assert!(book.resolve("Impact", true).is_none());
        // Second lookup served from cache
        assert!(book.resolve("Impact", true).is_none());
        assert!(book.default_font().is_none());
    }

    #[test]
    fn test_system_list_keeps_configured_names() {
        let provider = SystemFontProvider::from_families(
            vec!["DejaVu Sans".to_string(), "Impact".to_string()],
            &["Impact".to_string(), "Arial Black".to_string()],
        )
        .unwrap();
        assert_eq!(provider.kind(), "system");
        assert_eq!(
            provider.font_names(),
            vec!["Arial Black".to_string(), "DejaVu Sans".to_string(), "Impact".to_string()]
        );
    }

    #[test]
    fn test_empty_system_list_is_capability_error() {
        let err = SystemFontProvider::from_families(Vec::new(), &["Impact".to_string()])
            .err()
            .unwrap();
        assert!(matches!(err, EditorError::Capability(_)));
    }
}
