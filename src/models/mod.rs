// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model for the composition editor.

pub mod color;
pub mod layout;
pub mod template;
