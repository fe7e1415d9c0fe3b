// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::config::EngineConfig;
use crate::geometry::{annotation_geometry, bucket_position, position_for, shape_for};
use crate::model::{DiagramState, Point};
use crate::render::{bucket_radius, ElementClass};

use super::handlers::Target;
use super::zoom::screen_to_diagram;

/// Finds the topmost entity under the screen point `at`.
///
/// Checked front to back: nodes, flow buckets, annotation joints. Flow lines are too thin to
/// grab and are never hit; anything else is the canvas.
pub fn hit_test(state: &DiagramState, config: &EngineConfig, at: Point) -> Target {
    let p = screen_to_diagram(state.layout.diagram_transform, at);

    for node in state.model.nodes.iter().rev() {
        let origin = position_for(state, &node.id);
        let shape = shape_for(state, &node.id);
        let inside_x = p.x >= origin.x && p.x <= origin.x + shape.width;
        let inside_y = p.y >= origin.y && p.y <= origin.y + shape.cy * 2.0;
        if inside_x && inside_y {
            return Target::entity(ElementClass::Node, node.id.clone(), at);
        }
    }

    for flow in state.model.flows.iter().filter(|flow| flow.is_logical()).rev() {
        let center = bucket_position(state, flow, config);
        let radius = bucket_radius(state.model.decoration_count(&flow.id), config);
        if distance(p, center) <= radius {
            return Target::entity(ElementClass::FlowBucket, flow.id.clone(), at);
        }
    }

    for annotation in state.model.annotations.iter().rev() {
        let joint = annotation_geometry(state, annotation, config).joint;
        if distance(p, joint) <= config.annotation_joint_radius {
            return Target::entity(ElementClass::Annotation, annotation.id.clone(), at);
        }
    }

    Target::canvas(at)
}

fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
