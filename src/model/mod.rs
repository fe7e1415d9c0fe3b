// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A diagram is a node/flow/annotation graph (plus per-flow decorations) and the layout derived
//! for it: cached node shapes, cumulative positions and the scene-wide pan/zoom transform.

pub mod diagram;
pub mod entity_ref;
pub mod fixtures;
pub mod ids;

pub use diagram::{
    Annotation, AnnotationData, Decoration, DiagramState, DiagramTransform, Flow, FlowData,
    Layout, Model, Node, NodeData, Point, Position, Shape, TitleOffset,
};
pub use entity_ref::{EntityKind, EntityReference};
pub use ids::{DiagramId, GraphId, Id, IdError};
