// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use log::trace;

use crate::config::EngineConfig;
use crate::model::{DiagramTransform, Point};

/// One wheel notch scales by `2^WHEEL_STEP`.
const WHEEL_STEP: f64 = 0.25;

/// Pan/zoom is only attached while the modifier (Ctrl or Meta) is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoomGate {
    attached: bool,
}

impl ZoomGate {
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn modifier_down(&mut self) {
        if !self.attached {
            trace!("Zoom attached");
        }
        self.attached = true;
    }

    /// Detaches immediately, even in the middle of a gesture.
    pub fn modifier_up(&mut self) {
        if self.attached {
            trace!("Zoom detached");
        }
        self.attached = false;
    }

    /// Zooms about `at` by `notches` wheel steps (positive zooms in).
    pub fn wheel(
        &self,
        current: DiagramTransform,
        at: Point,
        notches: f64,
        config: &EngineConfig,
    ) -> Option<DiagramTransform> {
        if !self.attached || notches == 0.0 || !notches.is_finite() {
            return None;
        }
        let factor = (notches * WHEEL_STEP).exp2();
        Some(zoom_about(current, at, current.k * factor, config))
    }

    pub fn pan(&self, current: DiagramTransform, dx: f64, dy: f64) -> Option<DiagramTransform> {
        if !self.attached || !(dx.is_finite() && dy.is_finite()) || (dx == 0.0 && dy == 0.0) {
            return None;
        }
        Some(DiagramTransform {
            x: current.x + dx,
            y: current.y + dy,
            k: current.k,
        })
    }
}

/// Rescales to `k` (clamped to the configured extent) keeping the diagram point under the
/// screen point `at` fixed.
pub fn zoom_about(
    current: DiagramTransform,
    at: Point,
    k: f64,
    config: &EngineConfig,
) -> DiagramTransform {
    let k = config.clamp_scale(k);
    let anchor = screen_to_diagram(current, at);
    DiagramTransform {
        x: at.x - anchor.x * k,
        y: at.y - anchor.y * k,
        k,
    }
}

pub fn screen_to_diagram(transform: DiagramTransform, at: Point) -> Point {
    Point::new(
        (at.x - transform.x) / transform.k,
        (at.y - transform.y) / transform.k,
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{screen_to_diagram, zoom_about, ZoomGate};
    use crate::config::EngineConfig;
    use crate::model::{DiagramTransform, Point};

    #[test]
    fn input_without_modifier_is_ignored() {
        let gate = ZoomGate::default();
        let config = EngineConfig::default();
        assert_eq!(gate.wheel(DiagramTransform::IDENTITY, Point::ORIGIN, 1.0, &config), None);
        assert_eq!(gate.pan(DiagramTransform::IDENTITY, 5.0, 5.0), None);
    }

    #[test]
    fn releasing_the_modifier_detaches_immediately() {
        let mut gate = ZoomGate::default();
        let config = EngineConfig::default();
        gate.modifier_down();
        assert!(gate.wheel(DiagramTransform::IDENTITY, Point::ORIGIN, 1.0, &config).is_some());
        gate.modifier_up();
        assert_eq!(gate.wheel(DiagramTransform::IDENTITY, Point::ORIGIN, 1.0, &config), None);
        gate.modifier_down();
        assert!(gate.pan(DiagramTransform::IDENTITY, 1.0, 0.0).is_some());
    }

    #[rstest]
    #[case(100.0, 2.0)]
    #[case(-100.0, 0.25)]
    #[case(4.0, 2.0)]
    #[case(-8.0, 0.25)]
    fn wheel_scale_is_clamped(#[case] notches: f64, #[case] expected: f64) {
        let mut gate = ZoomGate::default();
        gate.modifier_down();
        let next = gate
            .wheel(DiagramTransform::IDENTITY, Point::ORIGIN, notches, &EngineConfig::default())
            .unwrap();
        assert_eq!(next.k, expected);
    }

    #[test]
    fn zoom_keeps_the_pointer_anchor_fixed() {
        let config = EngineConfig::default();
        let current = DiagramTransform { x: 40.0, y: -20.0, k: 1.0 };
        let at = Point::new(240.0, 180.0);
        let before = screen_to_diagram(current, at);

        let next = zoom_about(current, at, 2.0, &config);

        assert_eq!(next.k, 2.0);
        assert_eq!(screen_to_diagram(next, at), before);
    }
}
