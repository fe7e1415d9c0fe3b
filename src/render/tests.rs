// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::rstest;

use super::{
    bucket_radius, scene_elements, BucketGlyph, Element, ElementClass, RetainedScene, SceneSync,
    Surface,
};
use crate::config::EngineConfig;
use crate::model::fixtures::{graph_id, two_apps_with_logical_flow};
use crate::model::{
    Decoration, DiagramState, DiagramTransform, EntityKind, EntityReference, Flow, GraphId,
};
use crate::ops::{apply_commands, Command};

/// Counts surface calls so tests can assert on the exact work a sync did.
#[derive(Debug, Default)]
struct CountingSurface {
    next: u64,
    creates: Vec<(ElementClass, GraphId)>,
    updates: usize,
    removes: usize,
    transforms: usize,
    raises: Vec<u64>,
}

impl Surface for CountingSurface {
    type Handle = u64;

    fn create(&mut self, class: ElementClass, id: &GraphId, _element: &Element) -> u64 {
        self.next += 1;
        self.creates.push((class, id.clone()));
        self.next
    }

    fn update(&mut self, _handle: &u64, _element: &Element) {
        self.updates += 1;
    }

    fn remove(&mut self, _handle: u64) {
        self.removes += 1;
    }

    fn set_transform(&mut self, _transform: &DiagramTransform) {
        self.transforms += 1;
    }

    fn raise(&mut self, handle: &u64) {
        self.raises.push(*handle);
    }
}

fn decorated_state(count: usize) -> (DiagramState, GraphId) {
    let mut state = two_apps_with_logical_flow();
    let flow_id = graph_id("LOGICAL_DATA_FLOW/10");
    let decorations = (0..count)
        .map(|idx| Decoration {
            id: graph_id(&format!("dt-{idx}")),
            data: EntityReference::new(EntityKind::DataType, idx as i64),
        })
        .collect::<Vec<_>>();
    if decorations.is_empty() {
        state.model.decorations.remove(&flow_id);
    } else {
        state.model.decorations.insert(flow_id.clone(), decorations);
    }
    (state, flow_id)
}

#[test]
fn first_sync_creates_every_element_once() {
    let state = two_apps_with_logical_flow();
    let mut sync = SceneSync::new(CountingSurface::default(), EngineConfig::default());

    let report = sync.sync(&state);

    assert_eq!(report.created.nodes, 3);
    assert_eq!(report.created.flows, 2);
    // only the logical flow gets a bucket
    assert_eq!(report.created.flow_buckets, 1);
    assert_eq!(report.created.annotations, 2);
    assert!(report.transform_changed);
    assert!(report.dangling.is_empty());
    assert_eq!(sync.surface().creates.len(), 8);
}

#[test]
fn resync_of_unchanged_state_is_a_noop() {
    let state = two_apps_with_logical_flow();
    let mut sync = SceneSync::new(CountingSurface::default(), EngineConfig::default());
    sync.sync(&state);

    let report = sync.sync(&state);

    assert!(report.is_noop());
    let surface = sync.surface();
    assert_eq!(surface.creates.len(), 8);
    assert_eq!(surface.updates, 0);
    assert_eq!(surface.removes, 0);
    assert_eq!(surface.transforms, 1);
}

#[test]
fn moving_a_node_updates_it_and_what_hangs_off_it() {
    let mut state = two_apps_with_logical_flow();
    let mut sync = SceneSync::new(CountingSurface::default(), EngineConfig::default());
    sync.sync(&state);

    apply_commands(&mut state, &[Command::move_by(graph_id("APPLICATION/2"), 10.0, 0.0)]);
    let report = sync.sync(&state);

    assert_eq!(report.created.total(), 0);
    assert_eq!(report.removed.total(), 0);
    assert_eq!(report.updated.nodes, 1);
    assert_eq!(report.updated.flows, 1);
    assert_eq!(report.updated.flow_buckets, 1);
    // the flow annotation follows the bucket, the node annotation sits on APPLICATION/1
    assert_eq!(report.updated.annotations, 1);
}

#[test]
fn removed_entities_are_deleted_from_the_surface() {
    let mut state = two_apps_with_logical_flow();
    let mut sync = SceneSync::new(CountingSurface::default(), EngineConfig::default());
    sync.sync(&state);

    apply_commands(&mut state, &[Command::RemoveFlow { id: graph_id("LOGICAL_DATA_FLOW/10") }]);
    let report = sync.sync(&state);

    assert_eq!(report.removed.flows, 1);
    assert_eq!(report.removed.flow_buckets, 1);
    assert_eq!(report.removed.annotations, 1);
    assert!(sync.handle(ElementClass::Flow, &graph_id("LOGICAL_DATA_FLOW/10")).is_none());
}

#[test]
fn dangling_references_are_reported_not_fatal() {
    let mut state = DiagramState::default();
    state.model.flows.push(Flow::new(
        graph_id("f"),
        graph_id("APPLICATION/1"),
        graph_id("APPLICATION/2"),
        EntityKind::LogicalDataFlow,
    ));
    let mut sync = SceneSync::new(CountingSurface::default(), EngineConfig::default());

    let report = sync.sync(&state);

    assert_eq!(report.dangling.len(), 2);
    assert_eq!(report.created.flows, 1);
    assert_eq!(report.created.flow_buckets, 1);
}

#[test]
fn raise_forwards_the_rendered_handle() {
    let state = two_apps_with_logical_flow();
    let mut sync = SceneSync::new(CountingSurface::default(), EngineConfig::default());
    sync.sync(&state);

    assert!(sync.raise(ElementClass::Node, &graph_id("APPLICATION/1")));
    assert!(!sync.raise(ElementClass::Node, &graph_id("APPLICATION/404")));
    assert_eq!(sync.surface().raises.len(), 1);
}

#[rstest]
#[case(0, BucketGlyph::Unknown, 10.0)]
#[case(1, BucketGlyph::Single, 15.0)]
#[case(2, BucketGlyph::Multiple, 15.0)]
#[case(5, BucketGlyph::Multiple, 15.0)]
fn bucket_glyph_and_radius_follow_decoration_count(
    #[case] count: usize,
    #[case] glyph: BucketGlyph,
    #[case] radius: f64,
) {
    let config = EngineConfig::default();
    let (state, flow_id) = decorated_state(count);

    let scene = scene_elements(&state, &config);
    let Some(Element::FlowBucket(bucket)) = scene
        .class(ElementClass::FlowBucket)
        .and_then(|buckets| buckets.get(&flow_id))
    else {
        panic!("missing bucket for {flow_id}");
    };

    assert_eq!(bucket.glyph, glyph);
    assert_eq!(bucket.radius, radius);
    assert_eq!(bucket_radius(count, &config), radius);
}

#[test]
fn decorating_a_flow_updates_only_its_bucket() {
    let (mut state, flow_id) = decorated_state(0);
    let mut sync = SceneSync::new(CountingSurface::default(), EngineConfig::default());
    sync.sync(&state);

    apply_commands(
        &mut state,
        &[Command::AddDecoration {
            flow_id,
            decoration: Decoration {
                id: graph_id("dt-new"),
                data: EntityReference::new(EntityKind::DataType, 99),
            },
        }],
    );
    let report = sync.sync(&state);

    assert_eq!(report.updated.flow_buckets, 1);
    assert_eq!(report.updated.total(), 1);
}

#[test]
fn retained_scene_exports_one_group_per_element() {
    let config = EngineConfig::default();
    let mut state = two_apps_with_logical_flow();
    apply_commands(
        &mut state,
        &[Command::TransformDiagram(DiagramTransform { x: 10.0, y: 20.0, k: 1.5 })],
    );
    let mut sync = SceneSync::new(RetainedScene::new(), config.clone());
    sync.sync(&state);
    sync.raise(ElementClass::Node, &graph_id("APPLICATION/2"));

    let scene = sync.surface();
    assert_eq!(scene.len(), 8);
    let nodes = scene.layer(ElementClass::Node);
    assert_eq!(nodes.last().map(|item| item.id.as_str()), Some("APPLICATION/2"));
    assert!(nodes.last().is_some_and(|item| item.active));

    let svg = scene.to_svg(&config).to_string();
    assert!(svg.contains("translate(10,20) scale(1.5)"));
    assert_eq!(svg.matches("data-id=").count(), 8);
    assert_eq!(svg.matches("class=\"wfd-node\"").count(), 2);
    assert!(svg.contains("wfd-node wfd-active"));
    assert!(svg.contains("\u{f0c5}"));
    // annotation layer is drawn first, nodes last
    let annotations_at = svg.find("wfd-annotations").unwrap();
    let nodes_at = svg.find("wfd-nodes").unwrap();
    assert!(annotations_at < nodes_at);
}
