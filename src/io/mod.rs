// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: images, layouts, templates, gallery and export.

pub mod export;
pub mod gallery;
pub mod media;
pub mod serialization;
pub mod store;
