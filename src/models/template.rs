// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Saved layout templates.

use super::layout::{validate_layers, Frame, TextLayer};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Template identity, stable across edits so saves can update in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn generate() -> Self {
        Self(format!("tpl-{}", uuid::Uuid::new_v4()))
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A self-contained encoded image: a `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddedImage(pub String);

impl EmbeddedImage {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A named snapshot of frame geometry, text layers and optional images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub frame: Frame,
    pub text_layers: Vec<TextLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<EmbeddedImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<EmbeddedImage>,
}

impl Template {
    /// Check the geometry a stored template would apply.
    pub fn validate(&self) -> Result<()> {
        self.frame.validate()?;
        validate_layers(&self.text_layers)
    }
}
