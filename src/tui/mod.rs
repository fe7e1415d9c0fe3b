// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal viewer.
//!
//! A ratatui host for one engine instance: the retained scene is drawn on a braille canvas in
//! screen pixels (see [`CellMetrics`]) and crossterm events go through [`TermInput`], so the
//! terminal is just another surface plus another input source.

use std::{error::Error, io, time::Duration};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine, Rectangle},
        Paragraph,
    },
};

use crate::interact::term::{CellMetrics, TermAction, TermInput};
use crate::interact::{InteractionConfig, InteractionController, PointerRelease};
use crate::model::{DiagramTransform, Point};
use crate::render::{Element, ElementClass, RetainedScene, SceneItem, SceneSync};
use crate::state::StateStore;

const NODE_COLOR: Color = Color::White;
const ACTIVE_COLOR: Color = Color::LightGreen;
const FLOW_COLOR: Color = Color::Gray;
const LOGICAL_FLOW_COLOR: Color = Color::Cyan;
const BUCKET_COLOR: Color = Color::Yellow;
const ANNOTATION_COLOR: Color = Color::DarkGray;

/// Runs the viewer until the user quits.
pub fn run(store: StateStore, interaction: InteractionConfig) -> Result<(), Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut viewer = Viewer::new(store, interaction, CellMetrics::default());

    while !viewer.should_quit() {
        viewer.sync_scene();
        terminal.draw(|frame| draw(frame, &viewer))?;

        if event::poll(Duration::from_millis(250))? {
            let event = event::read()?;
            viewer.handle_event(&event);
        }
    }

    Ok(())
}

/// Viewer state without the terminal, so event handling can be driven directly.
#[derive(Debug)]
pub struct Viewer {
    controller: InteractionController,
    input: TermInput,
    scene: SceneSync<RetainedScene>,
    synced_revision: Option<u64>,
    status: String,
    should_quit: bool,
}

impl Viewer {
    pub fn new(store: StateStore, interaction: InteractionConfig, cell: CellMetrics) -> Self {
        let config = store.config().clone();
        Self {
            controller: InteractionController::new(store, interaction),
            input: TermInput::new(cell),
            scene: SceneSync::new(RetainedScene::new(), config),
            synced_revision: None,
            status: String::new(),
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn scene(&self) -> &RetainedScene {
        self.scene.surface()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// Brings the scene up to date with the store; a no-op when nothing changed since last time.
    pub fn sync_scene(&mut self) {
        let revision = self.controller.store().revision();
        if self.synced_revision == Some(revision) {
            return;
        }
        let report = self.scene.sync(&self.controller.store().state());
        debug!(
            revision,
            created = report.created.total(),
            updated = report.updated.total(),
            removed = report.removed.total();
            "Synced terminal scene"
        );
        self.synced_revision = Some(revision);
    }

    pub fn handle_event(&mut self, event: &Event) {
        match self.input.handle(&mut self.controller, event) {
            TermAction::Quit => self.should_quit = true,
            TermAction::DragStarted(target) => {
                self.sync_scene();
                if let Some(id) = &target.id {
                    self.scene.raise(target.class, id);
                }
            }
            TermAction::Released(release) => {
                self.scene.surface_mut().clear_active();
                self.status = match release {
                    PointerRelease::Dragged(id) => format!("moved {id}"),
                    PointerRelease::Clicked(target) => match target.id {
                        Some(id) => format!("{} {id}", target.class),
                        None => String::new(),
                    },
                    PointerRelease::None => String::new(),
                };
            }
            TermAction::ContextMenu { target, opened } => {
                if !opened {
                    self.status = format!("no menu for {}", target.class);
                }
            }
            TermAction::Applied(_) | TermAction::Ignored => {}
        }
    }

    fn status_line(&self) -> String {
        let state = self.controller.store().state();
        let title = state.title.as_deref().unwrap_or("untitled");
        let k = state.layout.diagram_transform.k;
        if self.status.is_empty() {
            format!(" {title} | zoom {k:.2} | ctrl+wheel zoom, ctrl+arrows pan, q quit")
        } else {
            format!(" {title} | zoom {k:.2} | {}", self.status)
        }
    }
}

/// One primitive to draw, in screen pixels (y grows downwards).
#[derive(Debug, Clone, PartialEq)]
pub enum Stroke {
    Segment {
        from: Point,
        to: Point,
        color: Color,
    },
    Frame {
        origin: Point,
        width: f64,
        height: f64,
        color: Color,
    },
    Disc {
        center: Point,
        radius: f64,
        color: Color,
    },
    Label {
        at: Point,
        text: String,
        color: Color,
    },
}

/// Flattens the scene into strokes, back layer first, with the diagram transform applied.
pub fn scene_strokes(scene: &RetainedScene) -> Vec<Stroke> {
    let transform = scene.transform();
    let mut strokes = Vec::new();
    for class in ElementClass::LAYERS {
        for item in scene.layer(class) {
            item_strokes(item, transform, &mut strokes);
        }
    }
    strokes
}

fn item_strokes(item: &SceneItem, transform: DiagramTransform, out: &mut Vec<Stroke>) {
    let screen = |p: Point| {
        Point::new(
            p.x * transform.k + transform.x,
            p.y * transform.k + transform.y,
        )
    };
    match &item.element {
        Element::Node(node) => {
            let color = if item.active { ACTIVE_COLOR } else { NODE_COLOR };
            out.push(Stroke::Frame {
                origin: screen(node.position),
                width: node.shape.width * transform.k,
                height: node.shape.cy * 2.0 * transform.k,
                color,
            });
            let title = Point::new(
                node.position.x + node.shape.title.dx,
                node.position.y + node.shape.cy,
            );
            out.push(Stroke::Label {
                at: screen(title),
                text: node.title.clone(),
                color,
            });
        }
        Element::Flow(flow) => {
            let color = if flow.logical { LOGICAL_FLOW_COLOR } else { FLOW_COLOR };
            for (from, to) in path_segments(&flow.path) {
                out.push(Stroke::Segment {
                    from: screen(from),
                    to: screen(to),
                    color,
                });
            }
        }
        Element::FlowBucket(bucket) => out.push(Stroke::Disc {
            center: screen(bucket.center),
            radius: bucket.radius * transform.k,
            color: BUCKET_COLOR,
        }),
        Element::Annotation(annotation) => {
            for (from, to) in path_segments(&annotation.line_path) {
                out.push(Stroke::Segment {
                    from: screen(from),
                    to: screen(to),
                    color: ANNOTATION_COLOR,
                });
            }
            out.push(Stroke::Label {
                at: screen(annotation.text_origin),
                text: annotation.note.clone(),
                color: ANNOTATION_COLOR,
            });
        }
    }
}

/// Straight segments of an SVG path made of `M`/`L` commands, absolute or relative.
/// Other commands (arcs, `z`) are skipped along with their arguments.
fn path_segments(path: &str) -> Vec<(Point, Point)> {
    let spaced = path.chars().fold(String::with_capacity(path.len()), |mut out, c| {
        if c.is_ascii_alphabetic() {
            out.push(' ');
            out.push(c);
            out.push(' ');
        } else {
            out.push(c);
        }
        out
    });

    let mut segments = Vec::new();
    let mut cursor = Point::ORIGIN;
    let mut command = 'M';
    let mut args = Vec::with_capacity(2);
    for token in spaced
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
    {
        if let Some(c) = token.chars().next().filter(char::is_ascii_alphabetic) {
            command = c;
            args.clear();
            continue;
        }
        if !matches!(command, 'M' | 'm' | 'L' | 'l') {
            continue;
        }
        let Ok(value) = token.parse::<f64>() else {
            continue;
        };
        args.push(value);
        if args.len() < 2 {
            continue;
        }
        let offset = Point::new(args[0], args[1]);
        args.clear();
        let next = if command.is_ascii_lowercase() {
            cursor + offset
        } else {
            offset
        };
        if matches!(command, 'L' | 'l') {
            segments.push((cursor, next));
        }
        cursor = next;
    }
    segments
}

fn draw(frame: &mut Frame<'_>, viewer: &Viewer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.size());
    let area = chunks[0];

    let cell = viewer.input.cell();
    let width = f64::from(area.width) * cell.width;
    let height = f64::from(area.height) * cell.height;
    let strokes = scene_strokes(viewer.scene());

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([-height, 0.0])
        .paint(move |ctx| {
            for stroke in &strokes {
                match stroke {
                    Stroke::Segment { from, to, color } => ctx.draw(&CanvasLine {
                        x1: from.x,
                        y1: -from.y,
                        x2: to.x,
                        y2: -to.y,
                        color: *color,
                    }),
                    Stroke::Frame {
                        origin,
                        width,
                        height,
                        color,
                    } => ctx.draw(&Rectangle {
                        x: origin.x,
                        y: -(origin.y + height),
                        width: *width,
                        height: *height,
                        color: *color,
                    }),
                    Stroke::Disc {
                        center,
                        radius,
                        color,
                    } => ctx.draw(&Circle {
                        x: center.x,
                        y: -center.y,
                        radius: *radius,
                        color: *color,
                    }),
                    Stroke::Label { at, text, color } => {
                        let span = Span::styled(text.clone(), Style::default().fg(*color));
                        ctx.print(at.x, -at.y, span);
                    }
                }
            }
        });
    frame.render_widget(canvas, area);
    frame.render_widget(
        Paragraph::new(viewer.status_line()).style(Style::default().fg(Color::Gray)),
        chunks[1],
    );
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
}
