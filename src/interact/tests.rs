// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::{Arc, Mutex};

use super::{
    ClickHandlers, ContextMenus, InteractionConfig, InteractionController, PointerRelease, Target,
};
use crate::model::fixtures::graph_id;
use crate::model::{DiagramTransform, Point};
use crate::ops::Command;
use crate::render::ElementClass;
use crate::state::StateStore;

fn record_revisions(store: &StateStore) -> Arc<Mutex<Vec<DiagramTransform>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store.on_change(move |state| {
        sink.lock().unwrap().push(state.layout.diagram_transform);
    });
    seen
}

fn node_target(id: &str, at: Point) -> Target {
    Target::entity(ElementClass::Node, graph_id(id), at)
}

#[test]
fn each_pointer_move_emits_one_move_command() {
    let store = StateStore::default();
    let notifications = record_revisions(&store);
    let mut controller = InteractionController::new(store.clone(), InteractionConfig::default());

    assert!(controller.pointer_down(node_target("n1", Point::new(0.0, 0.0))));
    for step in 1..=4 {
        let report = controller
            .pointer_move(Point::new(f64::from(step) * 3.0, 1.0))
            .expect("dragging");
        assert_eq!(report.applied, 1);
    }
    assert_eq!(controller.pointer_up(Point::new(12.0, 1.0)), PointerRelease::Dragged(graph_id("n1")));

    assert_eq!(notifications.lock().unwrap().len(), 4);
    assert_eq!(store.state().position(&graph_id("n1")), Point::new(12.0, 1.0));
    assert!(controller.pointer_move(Point::new(50.0, 50.0)).is_none());
}

#[test]
fn drag_deltas_are_scaled_into_diagram_units() {
    let store = StateStore::default();
    store.process_commands(&[Command::TransformDiagram(DiagramTransform {
        x: 0.0,
        y: 0.0,
        k: 2.0,
    })]);
    let mut controller = InteractionController::new(store.clone(), InteractionConfig::default());

    controller.pointer_down(node_target("n1", Point::ORIGIN));
    controller.pointer_move(Point::new(20.0, 10.0));

    assert_eq!(store.state().position(&graph_id("n1")), Point::new(10.0, 5.0));
}

#[test]
fn programmatic_and_interactive_moves_are_the_same_command() {
    let interactive = StateStore::default();
    let mut controller =
        InteractionController::new(interactive.clone(), InteractionConfig::default());
    controller.pointer_down(node_target("n1", Point::ORIGIN));
    controller.pointer_move(Point::new(7.0, -2.0));

    let programmatic = StateStore::default();
    programmatic.process_commands(&[Command::move_by(graph_id("n1"), 7.0, -2.0)]);

    assert_eq!(*interactive.state(), *programmatic.state());
}

#[test]
fn zoom_is_gated_by_the_modifier_and_clamped() {
    let store = StateStore::default();
    let transforms = record_revisions(&store);
    let mut controller = InteractionController::new(store.clone(), InteractionConfig::default());
    let at = Point::new(100.0, 100.0);

    assert!(controller.wheel(at, 1.0).is_none());
    assert!(controller.pan(10.0, 0.0).is_none());
    assert!(transforms.lock().unwrap().is_empty());

    controller.modifier_down();
    for _ in 0..20 {
        controller.wheel(at, 1.0).expect("attached");
    }
    assert_eq!(store.state().layout.diagram_transform.k, 2.0);
    for _ in 0..40 {
        controller.wheel(at, -1.0).expect("attached");
    }
    assert_eq!(store.state().layout.diagram_transform.k, 0.25);

    // released mid-gesture
    controller.modifier_up();
    let emitted = transforms.lock().unwrap().len();
    assert!(controller.wheel(at, 1.0).is_none());
    assert!(controller.pan(5.0, 5.0).is_none());
    assert_eq!(transforms.lock().unwrap().len(), emitted);

    controller.modifier_down();
    assert!(controller.pan(5.0, 5.0).is_some());
}

#[test]
fn click_without_movement_runs_the_click_handler() {
    let clicked = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&clicked);
    let config = InteractionConfig {
        click_handlers: ClickHandlers {
            node: Some(Arc::new(move |target: &Target| {
                sink.lock().unwrap().push(target.id.clone());
            })),
            flow_bucket: None,
        },
        ..InteractionConfig::default()
    };
    let store = StateStore::default();
    let mut controller = InteractionController::new(store.clone(), config);

    controller.pointer_down(node_target("n1", Point::new(3.0, 3.0)));
    let release = controller.pointer_up(Point::new(3.0, 3.0));

    assert!(matches!(release, PointerRelease::Clicked(ref t) if t.class == ElementClass::Node));
    assert_eq!(*clicked.lock().unwrap(), vec![Some(graph_id("n1"))]);
    assert_eq!(store.revision(), 0);
}

#[test]
fn context_menus_dispatch_per_class_and_default_to_noop() {
    let opened = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&opened);
    let config = InteractionConfig {
        context_menus: ContextMenus {
            canvas: Some(Arc::new(move |target: &Target| {
                sink.lock().unwrap().push(target.class);
            })),
            ..ContextMenus::default()
        },
        ..InteractionConfig::default()
    };
    let controller = InteractionController::new(StateStore::default(), config);

    assert!(controller.context_menu(&Target::canvas(Point::ORIGIN)));
    assert!(!controller.context_menu(&node_target("n1", Point::ORIGIN)));
    assert_eq!(*opened.lock().unwrap(), vec![ElementClass::Canvas]);
}

#[test]
fn two_controllers_keep_separate_handlers() {
    let hits = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&hits);
    let with_menu = InteractionConfig {
        context_menus: ContextMenus {
            node: Some(Arc::new(move |_: &Target| {
                *sink.lock().unwrap() += 1;
            })),
            ..ContextMenus::default()
        },
        ..InteractionConfig::default()
    };
    let first = InteractionController::new(StateStore::default(), with_menu);
    let second = InteractionController::new(StateStore::default(), InteractionConfig::default());

    let target = node_target("n1", Point::ORIGIN);
    assert!(first.context_menu(&target));
    assert!(!second.context_menu(&target));
    assert_eq!(*hits.lock().unwrap(), 1);
}
