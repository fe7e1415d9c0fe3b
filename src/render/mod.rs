// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scene synchronization.
//!
//! [`SceneSync`] keeps a retained drawing surface consistent with a [`DiagramState`]. Each pass
//! resolves the state into keyed [`Element`]s per class, diffs them against what was drawn last
//! time with [`reconcile`], and forwards only the resulting create/update/delete operations to
//! the [`Surface`]. Re-syncing an unchanged state touches nothing.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, trace};

use crate::config::EngineConfig;
use crate::geometry::Dangling;
use crate::model::{DiagramState, DiagramTransform, GraphId};

mod elements;
mod reconcile;
mod scene;

pub use elements::{
    bucket_radius, scene_elements, AnnotationElement, BucketElement, BucketGlyph, Element,
    ElementClass, FlowElement, NodeElement, SceneElements,
};
pub use reconcile::{reconcile, Reconciliation};
pub use scene::{ElementHandle, RetainedScene, SceneItem};

/// A retained drawing target.
///
/// `create` is called once per element lifetime, so surfaces bind per-element input handling
/// there. `update` is only called when the resolved element actually changed.
pub trait Surface {
    type Handle: Clone;

    fn create(&mut self, class: ElementClass, id: &GraphId, element: &Element) -> Self::Handle;

    fn update(&mut self, handle: &Self::Handle, element: &Element);

    fn remove(&mut self, handle: Self::Handle);

    fn set_transform(&mut self, transform: &DiagramTransform);

    /// Brings an element to the front of its layer and marks it active.
    fn raise(&mut self, handle: &Self::Handle);
}

/// Per-class operation counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassCounts {
    pub nodes: usize,
    pub flows: usize,
    pub flow_buckets: usize,
    pub annotations: usize,
}

impl ClassCounts {
    pub fn get(&self, class: ElementClass) -> usize {
        match class {
            ElementClass::Node => self.nodes,
            ElementClass::Flow => self.flows,
            ElementClass::FlowBucket => self.flow_buckets,
            ElementClass::Annotation => self.annotations,
            ElementClass::Canvas => 0,
        }
    }

    fn add(&mut self, class: ElementClass, count: usize) {
        match class {
            ElementClass::Node => self.nodes += count,
            ElementClass::Flow => self.flows += count,
            ElementClass::FlowBucket => self.flow_buckets += count,
            ElementClass::Annotation => self.annotations += count,
            ElementClass::Canvas => {}
        }
    }

    pub fn total(&self) -> usize {
        self.nodes + self.flows + self.flow_buckets + self.annotations
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncReport {
    pub created: ClassCounts,
    pub updated: ClassCounts,
    pub removed: ClassCounts,
    pub transform_changed: bool,
    /// References to entities missing from the model; drawn from the origin.
    pub dangling: Vec<Dangling>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.created.total() == 0
            && self.updated.total() == 0
            && self.removed.total() == 0
            && !self.transform_changed
    }
}

struct Rendered<H> {
    handle: H,
    element: Element,
}

pub struct SceneSync<S: Surface> {
    surface: S,
    config: EngineConfig,
    rendered: BTreeMap<ElementClass, BTreeMap<GraphId, Rendered<S::Handle>>>,
    transform: Option<DiagramTransform>,
}

impl<S: Surface + fmt::Debug> fmt::Debug for SceneSync<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneSync")
            .field("surface", &self.surface)
            .field("classes", &self.rendered.len())
            .field("transform", &self.transform)
            .finish()
    }
}

impl<S: Surface> SceneSync<S> {
    pub fn new(surface: S, config: EngineConfig) -> Self {
        Self {
            surface,
            config,
            rendered: BTreeMap::new(),
            transform: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn handle(&self, class: ElementClass, id: &GraphId) -> Option<&S::Handle> {
        self.rendered
            .get(&class)
            .and_then(|by_id| by_id.get(id))
            .map(|rendered| &rendered.handle)
    }

    /// Raises a drawn element; false when nothing with that id is on screen.
    pub fn raise(&mut self, class: ElementClass, id: &GraphId) -> bool {
        let Some(handle) = self.handle(class, id).cloned() else {
            return false;
        };
        self.surface.raise(&handle);
        true
    }

    pub fn sync(&mut self, state: &DiagramState) -> SyncReport {
        let mut next = scene_elements(state, &self.config);
        let mut report = SyncReport {
            dangling: std::mem::take(&mut next.dangling),
            ..SyncReport::default()
        };

        let transform = state.layout.diagram_transform;
        if self.transform != Some(transform) {
            self.surface.set_transform(&transform);
            self.transform = Some(transform);
            report.transform_changed = true;
        }

        for class in ElementClass::LAYERS {
            let wanted = next.by_class.remove(&class).unwrap_or_default();
            let drawn = self.rendered.entry(class).or_default();
            let diff = reconcile(
                drawn.iter().map(|(id, rendered)| (id, &rendered.element)),
                &wanted,
            );

            for id in &diff.delete {
                if let Some(rendered) = drawn.remove(id) {
                    trace!(class:% = class, id = id.as_str(); "Removing element");
                    self.surface.remove(rendered.handle);
                }
            }
            for id in &diff.update {
                if let (Some(rendered), Some(element)) = (drawn.get_mut(id), wanted.get(id)) {
                    trace!(class:% = class, id = id.as_str(); "Updating element");
                    self.surface.update(&rendered.handle, element);
                    rendered.element = element.clone();
                }
            }
            for id in &diff.create {
                if let Some(element) = wanted.get(id) {
                    trace!(class:% = class, id = id.as_str(); "Creating element");
                    let handle = self.surface.create(class, id, element);
                    drawn.insert(
                        id.clone(),
                        Rendered {
                            handle,
                            element: element.clone(),
                        },
                    );
                }
            }

            report.created.add(class, diff.create.len());
            report.updated.add(class, diff.update.len());
            report.removed.add(class, diff.delete.len());
        }

        debug!(
            created = report.created.total(),
            updated = report.updated.total(),
            removed = report.removed.total(),
            dangling = report.dangling.len();
            "Synchronized scene"
        );
        report
    }
}

#[cfg(test)]
mod tests;
