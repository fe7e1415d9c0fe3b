// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Single owner of the diagram state.
//!
//! [`StateStore`] is the only place a [`DiagramState`] is replaced. Commands, loads and resets
//! all go through it; each call swaps in a new immutable snapshot and then notifies listeners
//! once, outside the lock.
//!
//! `load` is the one suspension point. It takes a generation token before awaiting the backing
//! store and only applies the result if no `reset` or newer `load` happened in the meantime.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::geometry::{label_width, node_shape, CharWidthMeasure, LabelMeasure};
use crate::model::{DiagramId, DiagramState, GraphId};
use crate::ops::{apply_commands, apply_envelopes, ApplyReport, Command, CommandEnvelope};
use crate::store::{DiagramStore, StoreError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("load of diagram {id} superseded (generation {generation})")]
    Superseded { id: DiagramId, generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&Arc<DiagramState>) + Send + Sync>;

struct Inner {
    state: Arc<DiagramState>,
    revision: u64,
    generation: u64,
    next_listener: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl Inner {
    /// Installs `state` and returns what the caller must notify once the lock is released.
    fn replace(&mut self, state: DiagramState) -> (Arc<DiagramState>, Vec<Listener>) {
        self.state = Arc::new(state);
        self.revision = self.revision.wrapping_add(1);
        let listeners = self.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
        (Arc::clone(&self.state), listeners)
    }
}

/// Cheap-clone handle to one diagram's state.
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<Mutex<Inner>>,
    config: Arc<EngineConfig>,
    measure: Arc<dyn LabelMeasure>,
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("StateStore")
            .field("revision", &inner.revision)
            .field("generation", &inner.generation)
            .field("listeners", &inner.listeners.len())
            .field("nodes", &inner.state.model.nodes.len())
            .finish()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl StateStore {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_measure(config, CharWidthMeasure::default())
    }

    pub fn with_measure(config: EngineConfig, measure: impl LabelMeasure + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: Arc::new(DiagramState::default()),
                revision: 0,
                generation: 0,
                next_listener: 0,
                listeners: Vec::new(),
            })),
            config: Arc::new(config),
            measure: Arc::new(measure),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current snapshot. Later mutations never change a snapshot already handed out.
    pub fn state(&self) -> Arc<DiagramState> {
        Arc::clone(&self.lock().state)
    }

    /// Bumped on every replacement of the state (commands, load, reset).
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Bumped by every `load` and `reset`; commands leave it alone. Async work that depends on
    /// which diagram is showing compares it before and after awaiting.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn on_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Arc<DiagramState>) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(listener_id, _)| *listener_id != id);
        inner.listeners.len() != before
    }

    pub fn process_commands(&self, commands: &[Command]) -> ApplyReport {
        self.apply_batch(|state| apply_commands(state, commands))
    }

    pub fn process_envelopes(&self, envelopes: &[CommandEnvelope]) -> ApplyReport {
        self.apply_batch(|state| apply_envelopes(state, envelopes))
    }

    fn apply_batch(&self, apply: impl FnOnce(&mut DiagramState) -> ApplyReport) -> ApplyReport {
        let (snapshot, listeners, report) = {
            let mut inner = self.lock();
            let mut working = DiagramState::clone(&inner.state);
            let report = apply(&mut working);
            let settled = settle_shapes(&mut working, self.measure.as_ref(), &self.config);
            debug!(
                applied = report.applied,
                rejected = report.rejected.len(),
                settled;
                "Applied command batch"
            );
            let (snapshot, listeners) = inner.replace(working);
            (snapshot, listeners, report)
        };
        notify(&listeners, &snapshot);
        report
    }

    /// Empties the model and layout and invalidates any in-flight `load`.
    pub fn reset(&self) {
        let (snapshot, listeners) = {
            let mut inner = self.lock();
            inner.generation = inner.generation.wrapping_add(1);
            debug!(generation = inner.generation; "Reset diagram state");
            inner.replace(DiagramState::default())
        };
        notify(&listeners, &snapshot);
    }

    /// Fetches `id` from `store` and installs it, unless a `reset` or newer `load` started
    /// while the fetch was pending. A failed fetch leaves the current state untouched.
    pub async fn load<S>(&self, store: &S, id: &DiagramId) -> Result<(), LoadError>
    where
        S: DiagramStore + ?Sized,
    {
        let generation = {
            let mut inner = self.lock();
            inner.generation = inner.generation.wrapping_add(1);
            inner.generation
        };
        debug!(diagram = id.as_str(), generation; "Loading diagram");

        let fetched = store.load_diagram(id).await;

        let (snapshot, listeners) = {
            let mut inner = self.lock();
            if inner.generation != generation {
                warn!(
                    diagram = id.as_str(),
                    generation,
                    current = inner.generation;
                    "Discarding superseded diagram load"
                );
                return Err(LoadError::Superseded {
                    id: id.clone(),
                    generation,
                });
            }
            let mut state = match fetched {
                Ok(state) => state,
                Err(err) => {
                    warn!(diagram = id.as_str(), error:% = err; "Diagram load failed");
                    return Err(err.into());
                }
            };
            state.diagram_id = Some(id.clone());
            drop_duplicate_ids(&mut state);
            settle_shapes(&mut state, self.measure.as_ref(), &self.config);
            debug!(
                diagram = id.as_str(),
                nodes = state.model.nodes.len(),
                flows = state.model.flows.len();
                "Loaded diagram"
            );
            inner.replace(state)
        };
        notify(&listeners, &snapshot);
        Ok(())
    }
}

fn notify(listeners: &[Listener], snapshot: &Arc<DiagramState>) {
    for listener in listeners {
        listener(snapshot);
    }
}

/// Recomputes cached shapes for nodes whose shape is missing or whose label width changed,
/// and drops shapes that no longer belong to a node. Returns how many shapes changed.
fn settle_shapes(state: &mut DiagramState, measure: &dyn LabelMeasure, config: &EngineConfig) -> usize {
    let mut changed = 0;
    for node in &state.model.nodes {
        let width = label_width(measure.measure(node.name()), config);
        let current = state.layout.shapes.get(&node.id);
        if current.is_some_and(|shape| shape.width == width) {
            continue;
        }
        state
            .layout
            .shapes
            .insert(node.id.clone(), node_shape(node.kind(), width, config));
        changed += 1;
    }

    let live = state
        .model
        .nodes
        .iter()
        .map(|node| &node.id)
        .collect::<BTreeSet<_>>();
    let before = state.layout.shapes.len();
    state.layout.shapes.retain(|id, _| live.contains(id));
    changed + (before - state.layout.shapes.len())
}

/// Persisted diagrams may contain repeated ids; the first occurrence wins.
fn drop_duplicate_ids(state: &mut DiagramState) {
    fn dedupe<T>(items: &mut Vec<T>, id_of: impl Fn(&T) -> &GraphId) {
        let mut seen = BTreeSet::new();
        items.retain(|item| {
            let id = id_of(item);
            if seen.insert(id.clone()) {
                return true;
            }
            warn!(id = id.as_str(); "Dropping duplicate entity from loaded diagram");
            false
        });
    }

    dedupe(&mut state.model.nodes, |node| &node.id);
    dedupe(&mut state.model.flows, |flow| &flow.id);
    dedupe(&mut state.model.annotations, |annotation| &annotation.id);
}
