// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::model::{GraphId, Point};
use crate::render::ElementClass;

/// What a pointer event landed on.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub class: ElementClass,
    /// `None` for the canvas.
    pub id: Option<GraphId>,
    /// Pointer position in screen coordinates.
    pub at: Point,
}

impl Target {
    pub fn entity(class: ElementClass, id: GraphId, at: Point) -> Self {
        Self {
            class,
            id: Some(id),
            at,
        }
    }

    pub fn canvas(at: Point) -> Self {
        Self {
            class: ElementClass::Canvas,
            id: None,
            at,
        }
    }
}

pub type Handler = Arc<dyn Fn(&Target) + Send + Sync>;

/// Optional context-menu handler per element class. Unset slots show no menu.
#[derive(Clone, Default)]
pub struct ContextMenus {
    pub node: Option<Handler>,
    pub flow: Option<Handler>,
    pub flow_bucket: Option<Handler>,
    pub canvas: Option<Handler>,
    pub annotation: Option<Handler>,
}

impl ContextMenus {
    pub fn slot(&self, class: ElementClass) -> Option<&Handler> {
        match class {
            ElementClass::Node => self.node.as_ref(),
            ElementClass::Flow => self.flow.as_ref(),
            ElementClass::FlowBucket => self.flow_bucket.as_ref(),
            ElementClass::Canvas => self.canvas.as_ref(),
            ElementClass::Annotation => self.annotation.as_ref(),
        }
    }
}

/// Click handlers. Only nodes and flow buckets are clickable.
#[derive(Clone, Default)]
pub struct ClickHandlers {
    pub node: Option<Handler>,
    pub flow_bucket: Option<Handler>,
}

impl ClickHandlers {
    pub fn slot(&self, class: ElementClass) -> Option<&Handler> {
        match class {
            ElementClass::Node => self.node.as_ref(),
            ElementClass::FlowBucket => self.flow_bucket.as_ref(),
            _ => None,
        }
    }
}

/// Per-instance interaction wiring. Each engine instance owns its own copy, so two diagrams on
/// one host never share handlers.
#[derive(Clone, Default)]
pub struct InteractionConfig {
    pub context_menus: ContextMenus,
    pub click_handlers: ClickHandlers,
}

impl InteractionConfig {
    /// Runs the context-menu handler for `target`'s class; returns whether one was set.
    pub fn open_context_menu(&self, target: &Target) -> bool {
        match self.context_menus.slot(target.class) {
            Some(handler) => {
                handler(target);
                true
            }
            None => {
                debug!(class:% = target.class, id:? = target.id; "No context menu configured");
                false
            }
        }
    }

    /// Runs the click handler for `target`'s class; returns whether one was set.
    pub fn click(&self, target: &Target) -> bool {
        match self.click_handlers.slot(target.class) {
            Some(handler) => {
                handler(target);
                true
            }
            None => {
                debug!(class:% = target.class, id:? = target.id; "Default click handler");
                false
            }
        }
    }
}

fn slots<const N: usize>(names: [(&str, bool); N]) -> Vec<&str> {
    names
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
}

impl fmt::Debug for InteractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let menus = &self.context_menus;
        let clicks = &self.click_handlers;
        f.debug_struct("InteractionConfig")
            .field(
                "context_menus",
                &slots([
                    ("node", menus.node.is_some()),
                    ("flow", menus.flow.is_some()),
                    ("flow_bucket", menus.flow_bucket.is_some()),
                    ("canvas", menus.canvas.is_some()),
                    ("annotation", menus.annotation.is_some()),
                ]),
            )
            .field(
                "click_handlers",
                &slots([
                    ("node", clicks.node.is_some()),
                    ("flow_bucket", clicks.flow_bucket.is_some()),
                ]),
            )
            .finish()
    }
}
