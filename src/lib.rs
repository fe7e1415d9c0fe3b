// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowpane: an interactive flow-diagram engine.
//!
//! A diagram is a command-driven [`model::DiagramState`] owned by a [`state::StateStore`].
//! [`render::SceneSync`] keeps a drawing surface in step with it, [`interact`] turns pointer
//! input back into commands and [`panel`] hosts the whole loop against persistent stores.

pub mod config;
pub mod geometry;
pub mod interact;
pub mod model;
pub mod ops;
pub mod panel;
pub mod render;
pub mod state;
pub mod store;
pub mod tui;
