// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Geometry resolution.
//!
//! Pure functions from a [`DiagramState`] to on-screen placement. Nothing here mutates state;
//! missing references resolve to the origin and a zero-size shape so one broken entity never
//! stops a draw pass.

use crate::config::EngineConfig;
use crate::model::{Annotation, DiagramState, Flow, GraphId, Point, Shape, TitleOffset};

mod shape;

pub use shape::{
    icon_for, label_width, node_shape, CharWidthMeasure, LabelMeasure, ICON_ACTOR,
    ICON_APPLICATION, ICON_OTHER,
};

/// Where flow arrow heads sit along the line: `source + (target - source) / ARROW_RATIO`.
const ARROW_RATIO: f64 = 1.3;
const ARROW_SIZE: f64 = 8.0;
const ARROW_SPREAD: f64 = 0.5;

/// Text boxes on the right of a leader bar start this far past the joint.
const ANNOTATION_TEXT_GAP: f64 = 10.0;
const ANNOTATION_TEXT_DROP: f64 = 18.0;

static EMPTY_SHAPE: Shape = Shape {
    path: String::new(),
    cx: 0.0,
    cy: 0.0,
    icon: String::new(),
    title: TitleOffset { dx: 0.0, dy: 0.0 },
    width: 0.0,
};

/// A reference an entity makes to something that is not in the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dangling {
    pub owner: GraphId,
    pub missing: GraphId,
}

/// Cached shape for `id`, or a zero-size shape when none exists.
pub fn shape_for<'a>(state: &'a DiagramState, id: &GraphId) -> &'a Shape {
    state.layout.shapes.get(id).unwrap_or(&EMPTY_SHAPE)
}

/// Absolute position for a node or annotation id; the origin when unset.
pub fn position_for(state: &DiagramState, id: &GraphId) -> Point {
    state.position(id)
}

/// Centre of a node: its position plus its shape's centre.
pub fn anchor_for(state: &DiagramState, id: &GraphId) -> Point {
    position_for(state, id) + shape_for(state, id).center()
}

/// Flow-bucket marker position, biased towards the target so the marker reads as "heading to"
/// the destination rather than sitting on the midpoint.
pub fn bucket_position(state: &DiagramState, flow: &Flow, config: &EngineConfig) -> Point {
    let source = anchor_for(state, &flow.source);
    let target = anchor_for(state, &flow.target);
    source + (target - source) / config.bucket_ratio
}

/// Node ids referenced by `flow` that are missing from the model.
pub fn dangling_flow_refs(state: &DiagramState, flow: &Flow) -> Vec<Dangling> {
    [&flow.source, &flow.target]
        .into_iter()
        .filter(|id| state.model.node(id).is_none())
        .map(|id| Dangling {
            owner: flow.id.clone(),
            missing: id.clone(),
        })
        .collect()
}

/// The annotated entity, if the annotation points at something that is not in the model.
pub fn dangling_annotation_ref(state: &DiagramState, annotation: &Annotation) -> Option<Dangling> {
    let Ok(subject_id) = annotation.data.entity_reference.graph_id() else {
        return None;
    };
    let present = if annotation.is_on_flow() {
        state.model.flow(&subject_id).is_some()
    } else {
        state.model.node(&subject_id).is_some()
    };
    (!present).then(|| Dangling {
        owner: annotation.id.clone(),
        missing: subject_id,
    })
}

/// Resolved leader-line geometry for one annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationGeometry {
    /// Anchor on the annotated entity (node centre or flow-bucket position).
    pub subject: Point,
    /// Stored offset from the subject to the joint.
    pub offset: Point,
    /// End of the leader line, where the drag handle sits.
    pub joint: Point,
    /// Signed length of the horizontal bar after the joint.
    pub bar: f64,
    pub line_path: String,
    pub text_origin: Point,
}

pub fn annotation_geometry(
    state: &DiagramState,
    annotation: &Annotation,
    config: &EngineConfig,
) -> AnnotationGeometry {
    let subject_id = annotation.data.entity_reference.graph_id().ok();
    // text hangs from the node's top edge, not its centre
    let (subject, centre_y) = match subject_id {
        Some(id) if annotation.is_on_flow() => match state.model.flow(&id) {
            Some(flow) => (bucket_position(state, flow, config), 0.0),
            None => (Point::ORIGIN, 0.0),
        },
        Some(id) => (anchor_for(state, &id), shape_for(state, &id).center().y),
        None => (Point::ORIGIN, 0.0),
    };
    let offset = position_for(state, &annotation.id);
    let joint = subject + offset;

    let on_right = offset.x > 0.0;
    let bar = if on_right {
        config.annotation_text_width
    } else {
        -config.annotation_text_width
    };
    let text_dx = if on_right {
        ANNOTATION_TEXT_GAP
    } else {
        -config.annotation_text_width
    };

    AnnotationGeometry {
        subject,
        offset,
        joint,
        bar,
        line_path: format!(
            "M{},{} l{},{} l{},0",
            fmt_num(subject.x),
            fmt_num(subject.y),
            fmt_num(offset.x),
            fmt_num(offset.y),
            fmt_num(bar)
        ),
        text_origin: Point::new(
            joint.x + text_dx,
            joint.y - centre_y + ANNOTATION_TEXT_DROP,
        ),
    }
}

/// Straight line between the node centres with an arrow head part-way along it.
pub fn flow_path(state: &DiagramState, flow: &Flow) -> String {
    let source = anchor_for(state, &flow.source);
    let target = anchor_for(state, &flow.target);
    line_with_arrow_path(source, target)
}

fn line_with_arrow_path(source: Point, target: Point) -> String {
    let delta = target - source;
    let head = source + delta / ARROW_RATIO;
    let theta = delta.y.atan2(delta.x);
    let wing = |angle: f64| {
        Point::new(
            head.x - ARROW_SIZE * angle.cos(),
            head.y - ARROW_SIZE * angle.sin(),
        )
    };
    let left = wing(theta + ARROW_SPREAD);
    let right = wing(theta - ARROW_SPREAD);
    format!(
        "M{},{} L{},{} M{},{} L{},{} L{},{}",
        fmt_num(source.x),
        fmt_num(source.y),
        fmt_num(target.x),
        fmt_num(target.y),
        fmt_num(left.x),
        fmt_num(left.y),
        fmt_num(head.x),
        fmt_num(head.y),
        fmt_num(right.x),
        fmt_num(right.y)
    )
}

/// Formats a coordinate with at most two decimals and no trailing zeros.
pub(crate) fn fmt_num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = format!("{rounded:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}
