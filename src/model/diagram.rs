// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::ops::{Add, Div, Sub};

use serde::{Deserialize, Serialize};

use super::entity_ref::{EntityKind, EntityReference};
use super::ids::{DiagramId, GraphId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    pub entity_reference: EntityReference,
    pub name: String,
}

/// A drawn domain object (application, actor, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: GraphId,
    pub data: NodeData,
}

impl Node {
    pub fn new(id: GraphId, entity_reference: EntityReference, name: impl Into<String>) -> Self {
        Self {
            id,
            data: NodeData {
                entity_reference,
                name: name.into(),
            },
        }
    }

    pub fn kind(&self) -> &EntityKind {
        &self.data.entity_reference.kind
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowData {
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_reference: Option<EntityReference>,
}

/// A directed relationship between two nodes.
///
/// `source`/`target` are weak references into `Model::nodes`; they are only checked when the
/// flow is resolved for drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub id: GraphId,
    pub source: GraphId,
    pub target: GraphId,
    pub data: FlowData,
}

impl Flow {
    pub fn new(id: GraphId, source: GraphId, target: GraphId, kind: EntityKind) -> Self {
        Self {
            id,
            source,
            target,
            data: FlowData {
                kind,
                entity_reference: None,
            },
        }
    }

    /// Logical flows carry a flow-bucket marker summarising their decorations.
    pub fn is_logical(&self) -> bool {
        self.data.kind == EntityKind::LogicalDataFlow
    }
}

/// A classification (e.g. data type) attached to a flow; never drawn on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub id: GraphId,
    pub data: EntityReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationData {
    pub entity_reference: EntityReference,
    pub note: String,
}

/// A free-floating note anchored to a node or a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: GraphId,
    pub data: AnnotationData,
}

impl Annotation {
    pub fn new(id: GraphId, entity_reference: EntityReference, note: impl Into<String>) -> Self {
        Self {
            id,
            data: AnnotationData {
                entity_reference,
                note: note.into(),
            },
        }
    }

    pub fn is_on_flow(&self) -> bool {
        self.data.entity_reference.kind == EntityKind::LogicalDataFlow
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

pub type Position = Point;

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Div<f64> for Point {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TitleOffset {
    pub dx: f64,
    pub dy: f64,
}

/// Derived node outline, cached per node id and sized to the rendered label.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Shape {
    pub path: String,
    pub cx: f64,
    pub cy: f64,
    pub icon: String,
    pub title: TitleOffset,
    /// Label width the shape was sized for; used to detect when a re-measure changes it.
    #[serde(default)]
    pub width: f64,
}

impl Shape {
    pub fn center(&self) -> Point {
        Point::new(self.cx, self.cy)
    }
}

/// Pan/zoom applied to the whole scene container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagramTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for DiagramTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl DiagramTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn to_svg_attr(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub flows: Vec<Flow>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub decorations: BTreeMap<GraphId, Vec<Decoration>>,
}

impl Model {
    pub fn node(&self, id: &GraphId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn flow(&self, id: &GraphId) -> Option<&Flow> {
        self.flows.iter().find(|flow| &flow.id == id)
    }

    pub fn annotation(&self, id: &GraphId) -> Option<&Annotation> {
        self.annotations.iter().find(|annotation| &annotation.id == id)
    }

    pub fn decoration_count(&self, flow_id: &GraphId) -> usize {
        self.decorations.get(flow_id).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.flows.is_empty()
            && self.annotations.is_empty()
            && self.decorations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub shapes: BTreeMap<GraphId, Shape>,
    #[serde(default)]
    pub positions: BTreeMap<GraphId, Position>,
    #[serde(default)]
    pub diagram_transform: DiagramTransform,
}

/// The single source of truth for one diagram: model plus layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagramState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram_id: Option<DiagramId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub model: Model,
    #[serde(default)]
    pub layout: Layout,
}

impl DiagramState {
    pub fn position(&self, id: &GraphId) -> Position {
        self.layout
            .positions
            .get(id)
            .copied()
            .unwrap_or(Point::ORIGIN)
    }
}
