// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Interaction controller.
//!
//! Turns pointer and keyboard input into commands. Nothing here mutates state directly: drags
//! become `MOVE` commands and pan/zoom becomes `TRANSFORM_DIAGRAM`, both submitted through the
//! same [`StateStore::process_commands`] path that programmatic callers use.

use log::debug;

use crate::model::{GraphId, Point};
use crate::ops::{ApplyReport, Command};
use crate::state::StateStore;

mod drag;
mod handlers;
mod hit;
pub mod term;
mod zoom;

pub use drag::DragState;
pub use handlers::{ClickHandlers, ContextMenus, Handler, InteractionConfig, Target};
pub use hit::hit_test;
pub use zoom::{screen_to_diagram, zoom_about, ZoomGate};

/// What a completed pointer press turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerRelease {
    /// Nothing was pressed.
    None,
    /// The press moved its target; the drag is over.
    Dragged(GraphId),
    /// Press and release without movement.
    Clicked(Target),
}

#[derive(Debug)]
pub struct InteractionController {
    store: StateStore,
    config: InteractionConfig,
    drag: DragState,
    zoom: ZoomGate,
    pressed: Option<Target>,
}

impl InteractionController {
    pub fn new(store: StateStore, config: InteractionConfig) -> Self {
        Self {
            store,
            config,
            drag: DragState::default(),
            zoom: ZoomGate::default(),
            pressed: None,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn zoom_gate(&self) -> &ZoomGate {
        &self.zoom
    }

    /// Primary button pressed over `target`. Returns true when a drag started, in which case the
    /// host should raise the element.
    pub fn pointer_down(&mut self, target: Target) -> bool {
        self.pressed = Some(target.clone());
        match &target.id {
            Some(id) => {
                let started = self.drag.begin(target.class, id.clone(), target.at);
                if started {
                    debug!(class:% = target.class, id = id.as_str(); "Drag started");
                }
                started
            }
            None => false,
        }
    }

    /// Pointer moved to screen point `at`. While dragging, emits exactly one `MOVE` with the
    /// delta since the last event, converted to diagram units.
    pub fn pointer_move(&mut self, at: Point) -> Option<ApplyReport> {
        let (id, delta) = self.drag.step(at)?;
        let k = self.store.state().layout.diagram_transform.k;
        Some(
            self.store
                .process_commands(&[Command::move_by(id, delta.x / k, delta.y / k)]),
        )
    }

    pub fn pointer_up(&mut self, at: Point) -> PointerRelease {
        let pressed = self.pressed.take();
        if let Some((id, true)) = self.drag.end() {
            debug!(id = id.as_str(); "Drag ended");
            return PointerRelease::Dragged(id);
        }
        match pressed {
            Some(mut target) => {
                target.at = at;
                self.config.click(&target);
                PointerRelease::Clicked(target)
            }
            None => PointerRelease::None,
        }
    }

    /// Secondary button over `target`.
    pub fn context_menu(&self, target: &Target) -> bool {
        self.config.open_context_menu(target)
    }

    pub fn modifier_down(&mut self) {
        self.zoom.modifier_down();
    }

    pub fn modifier_up(&mut self) {
        self.zoom.modifier_up();
    }

    pub fn wheel(&mut self, at: Point, notches: f64) -> Option<ApplyReport> {
        let current = self.store.state().layout.diagram_transform;
        let next = self.zoom.wheel(current, at, notches, self.store.config())?;
        Some(self.store.process_commands(&[Command::TransformDiagram(next)]))
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> Option<ApplyReport> {
        let current = self.store.state().layout.diagram_transform;
        let next = self.zoom.pan(current, dx, dy)?;
        Some(self.store.process_commands(&[Command::TransformDiagram(next)]))
    }

    /// Hit-tests `at` against the current state.
    pub fn target_at(&self, at: Point) -> Target {
        hit_test(&self.store.state(), self.store.config(), at)
    }
}

#[cfg(test)]
mod tests;
