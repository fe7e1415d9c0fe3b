// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Crossterm input adapter.
//!
//! Maps terminal events onto [`InteractionController`] calls. Terminal cells are converted to
//! screen pixels with a fixed cell size so the rest of the engine never sees cell coordinates.
//!
//! Ctrl, Super and Meta all count as the zoom modifier. Most terminals only report modifiers
//! alongside other input, so the gate is re-synced from every key and mouse event; terminals with
//! keyboard enhancement also send bare modifier press/release events, which are honoured.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode, MouseButton,
    MouseEvent, MouseEventKind,
};

use super::{InteractionController, PointerRelease, Target};
use crate::model::Point;
use crate::ops::ApplyReport;

/// Screen pixels moved per Ctrl+arrow press.
const PAN_STEP: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub width: f64,
    pub height: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            width: 8.0,
            height: 16.0,
        }
    }
}

impl CellMetrics {
    /// Centre of the cell at `(column, row)`.
    pub fn to_screen(&self, column: u16, row: u16) -> Point {
        Point::new(
            (f64::from(column) + 0.5) * self.width,
            (f64::from(row) + 0.5) * self.height,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TermAction {
    Ignored,
    Applied(ApplyReport),
    /// A drag started on this target; the host should raise it.
    DragStarted(Target),
    Released(PointerRelease),
    /// Secondary click; `opened` is false when no menu is configured for the class.
    ContextMenu { target: Target, opened: bool },
    Quit,
}

#[derive(Debug, Clone, Default)]
pub struct TermInput {
    cell: CellMetrics,
}

impl TermInput {
    pub fn new(cell: CellMetrics) -> Self {
        Self { cell }
    }

    pub fn cell(&self) -> CellMetrics {
        self.cell
    }

    pub fn handle(&mut self, controller: &mut InteractionController, event: &Event) -> TermAction {
        match event {
            Event::Key(key) => self.handle_key(controller, key),
            Event::Mouse(mouse) => self.handle_mouse(controller, mouse),
            _ => TermAction::Ignored,
        }
    }

    fn handle_key(&mut self, controller: &mut InteractionController, key: &KeyEvent) -> TermAction {
        if let KeyCode::Modifier(code) = key.code {
            if is_zoom_modifier(code) {
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => controller.modifier_down(),
                    KeyEventKind::Release => controller.modifier_up(),
                }
            }
            return TermAction::Ignored;
        }

        sync_modifiers(controller, key.modifiers);
        if key.kind == KeyEventKind::Release {
            return TermAction::Ignored;
        }

        let pan = match key.code {
            KeyCode::Char('q') | KeyCode::Esc if key.modifiers.is_empty() => {
                return TermAction::Quit;
            }
            KeyCode::Left => (PAN_STEP, 0.0),
            KeyCode::Right => (-PAN_STEP, 0.0),
            KeyCode::Up => (0.0, PAN_STEP),
            KeyCode::Down => (0.0, -PAN_STEP),
            _ => return TermAction::Ignored,
        };
        applied(controller.pan(pan.0, pan.1))
    }

    fn handle_mouse(
        &mut self,
        controller: &mut InteractionController,
        mouse: &MouseEvent,
    ) -> TermAction {
        sync_modifiers(controller, mouse.modifiers);
        let at = self.cell.to_screen(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let target = controller.target_at(at);
                if controller.pointer_down(target.clone()) {
                    TermAction::DragStarted(target)
                } else {
                    TermAction::Ignored
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => applied(controller.pointer_move(at)),
            MouseEventKind::Up(MouseButton::Left) => {
                TermAction::Released(controller.pointer_up(at))
            }
            MouseEventKind::Down(MouseButton::Right) => {
                let target = controller.target_at(at);
                let opened = controller.context_menu(&target);
                TermAction::ContextMenu { target, opened }
            }
            MouseEventKind::ScrollUp => applied(controller.wheel(at, 1.0)),
            MouseEventKind::ScrollDown => applied(controller.wheel(at, -1.0)),
            _ => TermAction::Ignored,
        }
    }
}

fn applied(report: Option<ApplyReport>) -> TermAction {
    report.map_or(TermAction::Ignored, TermAction::Applied)
}

fn is_zoom_modifier(code: ModifierKeyCode) -> bool {
    matches!(
        code,
        ModifierKeyCode::LeftControl
            | ModifierKeyCode::RightControl
            | ModifierKeyCode::LeftSuper
            | ModifierKeyCode::RightSuper
            | ModifierKeyCode::LeftMeta
            | ModifierKeyCode::RightMeta
    )
}

fn sync_modifiers(controller: &mut InteractionController, modifiers: KeyModifiers) {
    let held = modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META);
    if held {
        controller.modifier_down();
    } else {
        controller.modifier_up();
    }
}
