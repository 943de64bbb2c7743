// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types shared by the composition engine.

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, EditorError>;

/// Everything that can go wrong inside the engine.
///
/// None of these are fatal to the editor: callers either reject the input
/// (model untouched) or fall back to a local copy and raise a notice.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no text layer with id {0}")]
    UnknownLayer(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("template store error: {0}")]
    Store(String),

    #[error("unsupported capability: {0}")]
    Capability(String),
}

impl EditorError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn capability(msg: impl Into<String>) -> Self {
        Self::Capability(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert!(EditorError::invalid_input("x").to_string().starts_with("invalid input:"));
        assert!(EditorError::decode("x").to_string().starts_with("decode error:"));
        assert!(EditorError::store("x").to_string().starts_with("template store error:"));
        assert!(EditorError::capability("x").to_string().starts_with("unsupported capability:"));
    }

    #[test]
    fn test_io_converts() {
        let err: EditorError = std::io::Error::other("boom").into();
        assert!(err.to_string().contains("boom"));
    }
}
