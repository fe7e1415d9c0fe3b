// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory retained scene with SVG export.

use std::collections::BTreeMap;

use svg::node::element as svg_element;
use svg::Document;

use super::{Element, ElementClass, Surface};
use crate::config::EngineConfig;
use crate::geometry::fmt_num;
use crate::model::{DiagramTransform, GraphId, Point};

const ICON_FONT: &str = "FontAwesome";
const ICON_GAP: f64 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct SceneItem {
    pub class: ElementClass,
    pub id: GraphId,
    pub element: Element,
    /// Stacking order inside the item's layer; higher draws on top.
    pub z: u64,
    pub active: bool,
}

/// A [`Surface`] that just remembers what it was told to draw.
#[derive(Debug, Clone, Default)]
pub struct RetainedScene {
    items: BTreeMap<ElementHandle, SceneItem>,
    transform: DiagramTransform,
    next_handle: u64,
    next_z: u64,
}

impl RetainedScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn transform(&self) -> DiagramTransform {
        self.transform
    }

    pub fn item(&self, handle: ElementHandle) -> Option<&SceneItem> {
        self.items.get(&handle)
    }

    pub fn find(&self, class: ElementClass, id: &GraphId) -> Option<&SceneItem> {
        self.items
            .values()
            .find(|item| item.class == class && &item.id == id)
    }

    /// Items of one class, back to front.
    pub fn layer(&self, class: ElementClass) -> Vec<&SceneItem> {
        let mut items = self
            .items
            .values()
            .filter(|item| item.class == class)
            .collect::<Vec<_>>();
        items.sort_by_key(|item| item.z);
        items
    }

    /// Clears the active mark left by the last `raise` (end of a drag).
    pub fn clear_active(&mut self) {
        for item in self.items.values_mut() {
            item.active = false;
        }
    }

    fn bump_z(&mut self) -> u64 {
        self.next_z += 1;
        self.next_z
    }

    pub fn to_svg(&self, config: &EngineConfig) -> Document {
        let mut container = svg_element::Group::new()
            .set("class", "wfd-container")
            .set("transform", self.transform.to_svg_attr());

        for class in ElementClass::LAYERS {
            let mut layer = svg_element::Group::new().set("class", format!("{}s", class.css_class()));
            for item in self.layer(class) {
                layer = layer.add(render_item(item));
            }
            container = container.add(layer);
        }

        Document::new()
            .set(
                "viewBox",
                format!("0 0 {} {}", config.canvas_width, config.canvas_height),
            )
            .set("width", config.canvas_width)
            .set("height", config.canvas_height)
            .add(container)
    }
}

impl Surface for RetainedScene {
    type Handle = ElementHandle;

    fn create(&mut self, class: ElementClass, id: &GraphId, element: &Element) -> ElementHandle {
        self.next_handle += 1;
        let handle = ElementHandle(self.next_handle);
        let z = self.bump_z();
        self.items.insert(
            handle,
            SceneItem {
                class,
                id: id.clone(),
                element: element.clone(),
                z,
                active: false,
            },
        );
        handle
    }

    fn update(&mut self, handle: &ElementHandle, element: &Element) {
        if let Some(item) = self.items.get_mut(handle) {
            item.element = element.clone();
        }
    }

    fn remove(&mut self, handle: ElementHandle) {
        self.items.remove(&handle);
    }

    fn set_transform(&mut self, transform: &DiagramTransform) {
        self.transform = *transform;
    }

    fn raise(&mut self, handle: &ElementHandle) {
        if !self.items.contains_key(handle) {
            return;
        }
        let z = self.bump_z();
        for (key, item) in &mut self.items {
            item.active = key == handle;
            if key == handle {
                item.z = z;
            }
        }
    }
}

fn translate(at: Point) -> String {
    format!("translate({},{})", fmt_num(at.x), fmt_num(at.y))
}

fn render_item(item: &SceneItem) -> svg_element::Group {
    let mut group = svg_element::Group::new()
        .set("class", item_class(item))
        .set("data-id", item.id.as_str());

    match &item.element {
        Element::Node(node) => {
            let title = &node.shape.title;
            group = group
                .set("transform", translate(node.position))
                .add(
                    svg_element::Path::new()
                        .set("d", node.shape.path.as_str())
                        .set("stroke", "#ccc")
                        .set("fill", "#eee"),
                )
                .add(
                    svg_element::Text::new(node.shape.icon.as_str())
                        .set("font-family", ICON_FONT)
                        .set("x", title.dx)
                        .set("y", title.dy)
                        .set("dominant-baseline", "hanging"),
                )
                .add(
                    svg_element::Text::new(node.title.as_str())
                        .set("x", title.dx + ICON_GAP)
                        .set("y", title.dy)
                        .set("dominant-baseline", "hanging"),
                );
        }
        Element::Flow(flow) => {
            group = group.add(
                svg_element::Path::new()
                    .set("d", flow.path.as_str())
                    .set("fill", "none")
                    .set("stroke", if flow.logical { "#999" } else { "#ccc" }),
            );
        }
        Element::FlowBucket(bucket) => {
            group = group
                .set("transform", translate(bucket.center))
                .add(
                    svg_element::Circle::new()
                        .set("r", bucket.radius)
                        .set("fill", "#fff")
                        .set("stroke", "#999"),
                )
                .add(
                    svg_element::Text::new(bucket.glyph.as_str())
                        .set("font-family", ICON_FONT)
                        .set("dx", -6)
                        .set("dy", 5),
                );
        }
        Element::Annotation(annotation) => {
            group = group
                .add(
                    svg_element::Path::new()
                        .set("d", annotation.line_path.as_str())
                        .set("fill", "none")
                        .set("stroke", "#aaa"),
                )
                .add(
                    svg_element::Circle::new()
                        .set("cx", fmt_num(annotation.joint.x))
                        .set("cy", fmt_num(annotation.joint.y))
                        .set("r", annotation.joint_radius)
                        .set("fill", "#fff")
                        .set("stroke", "#aaa"),
                )
                .add(
                    svg_element::Text::new(annotation.note.as_str())
                        .set("x", fmt_num(annotation.text_origin.x))
                        .set("y", fmt_num(annotation.text_origin.y))
                        .set("textLength", annotation.text_width)
                        .set("lengthAdjust", "spacingAndGlyphs"),
                );
        }
    }
    group
}

fn item_class(item: &SceneItem) -> String {
    if item.active {
        format!("{} wfd-active", item.class.css_class())
    } else {
        item.class.css_class().to_owned()
    }
}
