// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::config::EngineConfig;
use crate::model::{EntityKind, Shape, TitleOffset};

/// FontAwesome code points used for node icons.
pub const ICON_ACTOR: &str = "\u{f2be}";
pub const ICON_APPLICATION: &str = "\u{f108}";
pub const ICON_OTHER: &str = "\u{f1b2}";

const TITLE_DX: f64 = 8.0;
const TITLE_DY: f64 = 13.0;

/// Pixel width of rendered label text.
///
/// Measuring text is a capability of the rendering host (font metrics, DOM, terminal cells);
/// the engine only needs the resulting width.
pub trait LabelMeasure: Send + Sync {
    fn measure(&self, text: &str) -> f64;
}

/// Fixed-advance estimate: every character is `px_per_char` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharWidthMeasure {
    pub px_per_char: f64,
}

impl Default for CharWidthMeasure {
    fn default() -> Self {
        Self { px_per_char: 7.0 }
    }
}

impl LabelMeasure for CharWidthMeasure {
    fn measure(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.px_per_char
    }
}

/// Node width for a measured label: label plus icon padding, never narrower than the minimum.
pub fn label_width(measured: f64, config: &EngineConfig) -> f64 {
    (measured + config.label_padding).max(config.min_node_width)
}

pub fn icon_for(kind: &EntityKind) -> &'static str {
    match kind {
        EntityKind::Actor => ICON_ACTOR,
        EntityKind::Application => ICON_APPLICATION,
        _ => ICON_OTHER,
    }
}

/// Outline for a node of `kind` whose label needs `width` pixels.
pub fn node_shape(kind: &EntityKind, width: f64, config: &EngineConfig) -> Shape {
    let height = config.node_height;
    let path = match kind {
        // actors get rounded ends so people read differently from systems
        EntityKind::Actor => {
            let r = height / 2.0;
            format!(
                "M{r},0 L{},0 A{r},{r} 0 0 1 {},{height} L{r},{height} A{r},{r} 0 0 1 {r},0 z",
                width - r,
                width - r
            )
        }
        _ => format!("M0,0 L{width},0 L{width},{height} L0,{height} z"),
    };
    Shape {
        path,
        cx: width / 2.0,
        cy: height / 2.0,
        icon: icon_for(kind).to_owned(),
        title: TitleOffset {
            dx: TITLE_DX,
            dy: TITLE_DY,
        },
        width,
    }
}
