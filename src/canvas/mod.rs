// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Canvas composition engine: hit-testing, drag manipulation, text
//! measurement and rendering.

pub mod drag;
pub mod fonts;
pub mod hit_test;
pub mod render;
pub mod text;
