// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Command protocol for diagram mutation.
//!
//! Every change to a [`DiagramState`] is described by a [`Command`] and applied by a pure
//! reducer. Batches apply strictly in order against a working copy; a command that fails is
//! rejected on its own and the rest of the batch still applies.

use std::collections::BTreeSet;

use log::{trace, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Annotation, DiagramState, DiagramTransform, Flow, GraphId, Node};
use crate::model::{Decoration, Point};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Adds `(dx, dy)` to the position of a node or annotation.
    Move { id: GraphId, dx: f64, dy: f64 },
    TransformDiagram(DiagramTransform),
    SetTitle(String),
    AddNode(Node),
    RemoveNode { id: GraphId },
    AddFlow(Flow),
    RemoveFlow { id: GraphId },
    AddDecoration {
        #[serde(rename = "ref")]
        flow_id: GraphId,
        decoration: Decoration,
    },
    RemoveDecoration {
        #[serde(rename = "ref")]
        flow_id: GraphId,
        decoration_id: GraphId,
    },
    AddAnnotation(Annotation),
    UpdateAnnotation { id: GraphId, note: String },
    RemoveAnnotation { id: GraphId },
}

/// Every command name the protocol understands, in wire form.
pub const COMMAND_NAMES: &[&str] = &[
    "MOVE",
    "TRANSFORM_DIAGRAM",
    "SET_TITLE",
    "ADD_NODE",
    "REMOVE_NODE",
    "ADD_FLOW",
    "REMOVE_FLOW",
    "ADD_DECORATION",
    "REMOVE_DECORATION",
    "ADD_ANNOTATION",
    "UPDATE_ANNOTATION",
    "REMOVE_ANNOTATION",
];

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "MOVE",
            Self::TransformDiagram(_) => "TRANSFORM_DIAGRAM",
            Self::SetTitle(_) => "SET_TITLE",
            Self::AddNode(_) => "ADD_NODE",
            Self::RemoveNode { .. } => "REMOVE_NODE",
            Self::AddFlow(_) => "ADD_FLOW",
            Self::RemoveFlow { .. } => "REMOVE_FLOW",
            Self::AddDecoration { .. } => "ADD_DECORATION",
            Self::RemoveDecoration { .. } => "REMOVE_DECORATION",
            Self::AddAnnotation(_) => "ADD_ANNOTATION",
            Self::UpdateAnnotation { .. } => "UPDATE_ANNOTATION",
            Self::RemoveAnnotation { .. } => "REMOVE_ANNOTATION",
        }
    }

    pub fn move_by(id: GraphId, dx: f64, dy: f64) -> Self {
        Self::Move { id, dx, dy }
    }
}

/// Untyped wire form of a command: `{ "command": "MOVE", "payload": { ... } }`.
///
/// Hosts that receive commands from outside (files, other processes) hand these to the store;
/// decoding happens per command so one unknown kind cannot poison a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub command: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl From<&Command> for CommandEnvelope {
    fn from(command: &Command) -> Self {
        let payload = serde_json::to_value(command)
            .ok()
            .and_then(|mut value| value.get_mut("payload").map(serde_json::Value::take))
            .unwrap_or(serde_json::Value::Null);
        Self {
            command: command.name().to_owned(),
            payload,
        }
    }
}

impl TryFrom<&CommandEnvelope> for Command {
    type Error = CommandError;

    fn try_from(envelope: &CommandEnvelope) -> Result<Self, Self::Error> {
        if !COMMAND_NAMES.contains(&envelope.command.as_str()) {
            return Err(CommandError::UnknownCommand {
                command: envelope.command.clone(),
            });
        }
        let tagged = serde_json::json!({
            "command": envelope.command,
            "payload": envelope.payload,
        });
        serde_json::from_value(tagged).map_err(|source| CommandError::InvalidPayload {
            command: envelope.command.clone(),
            reason: source.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityClass {
    Node,
    Flow,
    Decoration,
    Annotation,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown command kind '{command}'")]
    UnknownCommand { command: String },
    #[error("invalid payload for {command}: {reason}")]
    InvalidPayload { command: String, reason: String },
    #[error("{class:?} already exists (id={id})")]
    AlreadyExists { class: EntityClass, id: GraphId },
    #[error("{class:?} not found (id={id})")]
    NotFound { class: EntityClass, id: GraphId },
}

/// A command that did not apply, with its position in the submitted batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub index: usize,
    pub command: String,
    pub error: CommandError,
}

/// Coarse description of which entities a batch touched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<GraphId>,
    pub removed: Vec<GraphId>,
    pub updated: Vec<GraphId>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApplyReport {
    pub applied: usize,
    pub rejected: Vec<Rejected>,
    pub delta: Delta,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<GraphId>,
    removed: BTreeSet<GraphId>,
    updated: BTreeSet<GraphId>,
}

impl DeltaBuilder {
    fn record_added(&mut self, id: &GraphId) {
        self.updated.remove(id);
        // re-adding something removed earlier in the batch is an update from the outside
        if self.removed.remove(id) {
            self.updated.insert(id.clone());
            return;
        }
        self.added.insert(id.clone());
    }

    fn record_removed(&mut self, id: &GraphId) {
        self.updated.remove(id);
        if self.added.remove(id) {
            return;
        }
        self.removed.insert(id.clone());
    }

    fn record_updated(&mut self, id: &GraphId) {
        if self.added.contains(id) || self.removed.contains(id) {
            return;
        }
        self.updated.insert(id.clone());
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
        }
    }
}

/// Applies `commands` in order. The state is replaced once, after the whole batch.
pub fn apply_commands(state: &mut DiagramState, commands: &[Command]) -> ApplyReport {
    let mut batch = Batch::new(state);
    for (index, command) in commands.iter().enumerate() {
        batch.apply(index, command);
    }
    batch.finish(state)
}

/// Decodes and applies wire-form commands; undecodable entries are rejected individually.
pub fn apply_envelopes(state: &mut DiagramState, envelopes: &[CommandEnvelope]) -> ApplyReport {
    let mut batch = Batch::new(state);
    for (index, envelope) in envelopes.iter().enumerate() {
        match Command::try_from(envelope) {
            Ok(command) => batch.apply(index, &command),
            Err(error) => batch.reject(index, &envelope.command, error),
        }
    }
    batch.finish(state)
}

struct Batch {
    working: DiagramState,
    delta: DeltaBuilder,
    applied: usize,
    rejected: Vec<Rejected>,
}

impl Batch {
    fn new(state: &DiagramState) -> Self {
        Self {
            working: state.clone(),
            delta: DeltaBuilder::default(),
            applied: 0,
            rejected: Vec::new(),
        }
    }

    fn apply(&mut self, index: usize, command: &Command) {
        trace!(index, command = command.name(); "Applying command");
        match apply_command(&mut self.working, command, &mut self.delta) {
            Ok(()) => self.applied += 1,
            Err(error) => self.reject(index, command.name(), error),
        }
    }

    fn reject(&mut self, index: usize, command: &str, error: CommandError) {
        warn!(index, command, error:% = error; "Rejected command");
        self.rejected.push(Rejected {
            index,
            command: command.to_owned(),
            error,
        });
    }

    fn finish(self, state: &mut DiagramState) -> ApplyReport {
        *state = self.working;
        ApplyReport {
            applied: self.applied,
            rejected: self.rejected,
            delta: self.delta.finish(),
        }
    }
}

// Per-command reducers.
include!("ops_impl.rs");
