// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Small hand-built diagrams shared by tests, benches and the `--demo` CLI mode.

use super::diagram::{Annotation, Decoration, DiagramState, Flow, Node, Point};
use super::entity_ref::{EntityKind, EntityReference};
use super::ids::GraphId;
use crate::config::EngineConfig;
use crate::geometry::node_shape;

#[cfg(test)]
pub fn graph_id(value: &str) -> GraphId {
    GraphId::new(value).expect("test graph id")
}

fn fixture_id(value: &str) -> GraphId {
    GraphId::trusted(value.to_owned())
}

fn entity_node(kind: EntityKind, id: i64, name: &str) -> Node {
    let reference = EntityReference::named(kind, id, name);
    let graph_id = GraphId::trusted(format!("{}/{}", reference.kind, reference.id));
    Node::new(graph_id, reference, name)
}

fn app(id: i64, name: &str) -> Node {
    entity_node(EntityKind::Application, id, name)
}

fn actor(id: i64, name: &str) -> Node {
    entity_node(EntityKind::Actor, id, name)
}

fn data_type(flow: &str, id: i64, name: &str) -> Decoration {
    Decoration {
        id: fixture_id(&format!("{flow}:DATA_TYPE/{id}")),
        data: EntityReference::named(EntityKind::DataType, id, name),
    }
}

/// Two applications joined by a decorated logical flow, an actor feeding the first one, and one
/// annotation on a node plus one on the logical flow.
pub fn two_apps_with_logical_flow() -> DiagramState {
    let config = EngineConfig::default();
    let mut state = DiagramState {
        title: Some("Order flow".to_owned()),
        ..DiagramState::default()
    };

    let orders = app(1, "Orders");
    let billing = app(2, "Billing");
    let clerk = actor(3, "Clerk");

    let logical = Flow::new(
        fixture_id("LOGICAL_DATA_FLOW/10"),
        orders.id.clone(),
        billing.id.clone(),
        EntityKind::LogicalDataFlow,
    );
    let manual = Flow::new(
        fixture_id("link/clerk-orders"),
        clerk.id.clone(),
        orders.id.clone(),
        EntityKind::Other("ACTOR_LINK".to_owned()),
    );

    state.model.decorations.insert(
        logical.id.clone(),
        vec![
            data_type("LOGICAL_DATA_FLOW/10", 100, "Invoice"),
            data_type("LOGICAL_DATA_FLOW/10", 101, "Payment"),
        ],
    );

    state.model.annotations.push(Annotation::new(
        fixture_id("ANNOTATION/1"),
        orders.data.entity_reference.clone(),
        "System of record for orders",
    ));
    state.model.annotations.push(Annotation::new(
        fixture_id("ANNOTATION/2"),
        EntityReference::new(EntityKind::LogicalDataFlow, 10),
        "Nightly batch",
    ));

    for (node, at) in [
        (&orders, Point::new(100.0, 100.0)),
        (&billing, Point::new(400.0, 100.0)),
        (&clerk, Point::new(100.0, 300.0)),
    ] {
        state
            .layout
            .shapes
            .insert(node.id.clone(), node_shape(node.kind(), 100.0, &config));
        state.layout.positions.insert(node.id.clone(), at);
    }
    state
        .layout
        .positions
        .insert(fixture_id("ANNOTATION/1"), Point::new(-60.0, -50.0));
    state
        .layout
        .positions
        .insert(fixture_id("ANNOTATION/2"), Point::new(40.0, 60.0));

    state.model.nodes.extend([orders, billing, clerk]);
    state.model.flows.extend([logical, manual]);
    state
}

/// A grid of `count` applications chained by logical flows; used for sizing benches.
pub fn chain_of_apps(count: usize) -> DiagramState {
    let config = EngineConfig::default();
    let mut state = DiagramState::default();
    for idx in 0..count {
        let node = app(idx as i64, &format!("App {idx:04}"));
        let column = (idx % 10) as f64;
        let row = (idx / 10) as f64;
        state
            .layout
            .shapes
            .insert(node.id.clone(), node_shape(node.kind(), 100.0, &config));
        state
            .layout
            .positions
            .insert(node.id.clone(), Point::new(column * 160.0, row * 90.0));
        if idx > 0 {
            let flow_id = fixture_id(&format!("LOGICAL_DATA_FLOW/{idx}"));
            let source = state.model.nodes[idx - 1].id.clone();
            if idx % 3 == 0 {
                state.model.decorations.insert(
                    flow_id.clone(),
                    vec![data_type(flow_id.as_str(), idx as i64, "Record")],
                );
            }
            state.model.flows.push(Flow::new(
                flow_id,
                source,
                node.id.clone(),
                EntityKind::LogicalDataFlow,
            ));
        }
        state.model.nodes.push(node);
    }
    state
}
