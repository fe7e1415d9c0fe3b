// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::geometry::{
    annotation_geometry, bucket_position, dangling_annotation_ref, dangling_flow_refs, flow_path,
    position_for, shape_for, Dangling,
};
use crate::model::{DiagramState, GraphId, Point, Shape};

/// The kinds of drawn element. `Canvas` is the empty background and only used for input routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementClass {
    Annotation,
    Flow,
    FlowBucket,
    Node,
    Canvas,
}

impl ElementClass {
    /// Drawn classes in back-to-front layer order.
    pub const LAYERS: [ElementClass; 4] = [
        ElementClass::Annotation,
        ElementClass::Flow,
        ElementClass::FlowBucket,
        ElementClass::Node,
    ];

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Annotation => "wfd-annotation",
            Self::Flow => "wfd-flow",
            Self::FlowBucket => "wfd-flow-bucket",
            Self::Node => "wfd-node",
            Self::Canvas => "wfd-canvas",
        }
    }

    pub fn is_draggable(self) -> bool {
        matches!(self, Self::Node | Self::Annotation)
    }
}

impl fmt::Display for ElementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_class())
    }
}

/// Marker glyph drawn inside a flow bucket, chosen by how many decorations the flow carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketGlyph {
    Unknown,
    Single,
    Multiple,
}

impl BucketGlyph {
    pub fn for_count(decorations: usize) -> Self {
        match decorations {
            0 => Self::Unknown,
            1 => Self::Single,
            _ => Self::Multiple,
        }
    }

    /// FontAwesome code point: question circle, file, files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "\u{f29c}",
            Self::Single => "\u{f016}",
            Self::Multiple => "\u{f0c5}",
        }
    }
}

/// Buckets of decorated flows are drawn half as large again.
pub fn bucket_radius(decorations: usize, config: &EngineConfig) -> f64 {
    if decorations > 0 {
        config.flow_bucket_radius * 1.5
    } else {
        config.flow_bucket_radius
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeElement {
    pub position: Point,
    pub shape: Shape,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowElement {
    pub path: String,
    pub logical: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketElement {
    pub center: Point,
    pub radius: f64,
    pub glyph: BucketGlyph,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationElement {
    pub line_path: String,
    pub joint: Point,
    pub joint_radius: f64,
    pub text_origin: Point,
    pub text_width: f64,
    pub note: String,
}

/// Fully resolved description of one drawn element. Two equal elements draw identically.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Node(NodeElement),
    Flow(FlowElement),
    FlowBucket(BucketElement),
    Annotation(AnnotationElement),
}

impl Element {
    pub fn class(&self) -> ElementClass {
        match self {
            Self::Node(_) => ElementClass::Node,
            Self::Flow(_) => ElementClass::Flow,
            Self::FlowBucket(_) => ElementClass::FlowBucket,
            Self::Annotation(_) => ElementClass::Annotation,
        }
    }
}

/// Everything that should be on screen for one state, keyed per class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneElements {
    pub by_class: BTreeMap<ElementClass, BTreeMap<GraphId, Element>>,
    pub dangling: Vec<Dangling>,
}

impl SceneElements {
    pub fn class(&self, class: ElementClass) -> Option<&BTreeMap<GraphId, Element>> {
        self.by_class.get(&class)
    }

    fn insert(&mut self, id: &GraphId, element: Element) {
        self.by_class
            .entry(element.class())
            .or_default()
            .insert(id.clone(), element);
    }
}

/// Resolves every drawable entity of `state`. Dangling references still produce elements
/// (drawn from the origin) and are collected for the caller to report.
pub fn scene_elements(state: &DiagramState, config: &EngineConfig) -> SceneElements {
    let mut scene = SceneElements::default();
    for class in ElementClass::LAYERS {
        scene.by_class.insert(class, BTreeMap::new());
    }

    for node in &state.model.nodes {
        scene.insert(
            &node.id,
            Element::Node(NodeElement {
                position: position_for(state, &node.id),
                shape: shape_for(state, &node.id).clone(),
                title: node.name().to_owned(),
            }),
        );
    }

    for flow in &state.model.flows {
        let dangling = dangling_flow_refs(state, flow);
        for missing in &dangling {
            warn!(flow = flow.id.as_str(), missing = missing.missing.as_str(); "Flow references a missing node");
        }
        scene.dangling.extend(dangling);

        scene.insert(
            &flow.id,
            Element::Flow(FlowElement {
                path: flow_path(state, flow),
                logical: flow.is_logical(),
            }),
        );

        if flow.is_logical() {
            let decorations = state.model.decoration_count(&flow.id);
            scene.insert(
                &flow.id,
                Element::FlowBucket(BucketElement {
                    center: bucket_position(state, flow, config),
                    radius: bucket_radius(decorations, config),
                    glyph: BucketGlyph::for_count(decorations),
                }),
            );
        }
    }

    for annotation in &state.model.annotations {
        if let Some(dangling) = dangling_annotation_ref(state, annotation) {
            warn!(
                annotation = annotation.id.as_str(),
                missing = dangling.missing.as_str();
                "Annotation references a missing entity"
            );
            scene.dangling.push(dangling);
        }
        let geometry = annotation_geometry(state, annotation, config);
        scene.insert(
            &annotation.id,
            Element::Annotation(AnnotationElement {
                line_path: geometry.line_path,
                joint: geometry.joint,
                joint_radius: config.annotation_joint_radius,
                text_origin: geometry.text_origin,
                text_width: config.annotation_text_width,
                note: annotation.data.note.clone(),
            }),
        );
    }

    scene
}
