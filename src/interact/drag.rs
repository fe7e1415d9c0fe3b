// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{GraphId, Point};
use crate::render::ElementClass;

/// Pointer drag state machine.
///
/// `Idle --begin--> Dragging --step*--> Dragging --end--> Idle`
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        id: GraphId,
        class: ElementClass,
        /// Last pointer position seen, in screen coordinates.
        last: Point,
        moved: bool,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    pub fn dragged_id(&self) -> Option<&GraphId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } => Some(id),
        }
    }

    /// Starts dragging `id` if its class can be dragged. A drag already in progress is replaced.
    pub fn begin(&mut self, class: ElementClass, id: GraphId, at: Point) -> bool {
        if !class.is_draggable() {
            return false;
        }
        *self = Self::Dragging {
            id,
            class,
            last: at,
            moved: false,
        };
        true
    }

    /// Screen-space delta since the previous step, or `None` when idle or the pointer did not
    /// move.
    pub fn step(&mut self, at: Point) -> Option<(GraphId, Point)> {
        let Self::Dragging {
            id, last, moved, ..
        } = self
        else {
            return None;
        };
        let delta = at - *last;
        if delta == Point::ORIGIN {
            return None;
        }
        *last = at;
        *moved = true;
        Some((id.clone(), delta))
    }

    /// Returns to idle. Yields the dragged id and whether it actually moved.
    pub fn end(&mut self) -> Option<(GraphId, bool)> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Dragging { id, moved, .. } => Some((id, moved)),
        }
    }
}
