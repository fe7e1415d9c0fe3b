// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram panel: the host around one engine instance.
//!
//! Drives the state store through the diagram lifecycle (pick, view, create, edit, dismiss) and
//! answers node / flow-bucket drill-down. Bucket detail is the panel's own suspension point and
//! carries a generation token, like `StateStore::load`: any newer selection, reset or dismiss
//! makes a pending lookup drop its result.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use thiserror::Error;

use crate::model::{Decoration, DiagramId, EntityReference, Flow, GraphId, Node};
use crate::ops::{ApplyReport, Command};
use crate::state::{LoadError, StateStore};
use crate::store::{
    DiagramStore, DiagramSummary, EntitySelector, FlowSpecStore, PhysicalFlow,
    PhysicalSpecification, StoreError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    ReadOnly,
    Editor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramListing {
    pub id: DiagramId,
    pub title: Option<String>,
    pub notable: bool,
}

impl DiagramListing {
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(self.id.as_str())
    }
}

/// One decoration of a flow bucket, joined to its physical flow and that flow's specification.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketDecoration {
    pub decoration: Decoration,
    pub flow: PhysicalFlow,
    pub specification: Option<PhysicalSpecification>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetailError {
    #[error("physical flow lookup failed: {0}")]
    PhysicalFlows(String),
    #[error("specification lookup failed: {0}")]
    Specifications(String),
    #[error("flow {0} has no catalog reference")]
    NoReference(GraphId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowBucketDetail {
    pub flow: Flow,
    pub decorations: Vec<BucketDecoration>,
    /// Sub-lookups that failed; `decorations` holds whatever could still be joined.
    pub failures: Vec<DetailError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BucketLookup {
    Shown(FlowBucketDetail),
    /// A newer selection, reset or dismiss happened while the lookup was pending.
    Superseded,
    /// The flow is not in the current diagram.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pub diagram: Option<DiagramListing>,
    pub node: Option<Node>,
    pub flow_bucket: Option<FlowBucketDetail>,
}

#[derive(Debug, Default)]
struct PanelState {
    visibility: Visibility,
    selection: Selection,
    listings: Vec<DiagramListing>,
    notable: BTreeSet<DiagramId>,
    detail_generation: u64,
}

impl PanelState {
    fn clear_selection(&mut self) {
        self.selection = Selection::default();
        self.detail_generation = self.detail_generation.wrapping_add(1);
    }
}

#[derive(Debug)]
pub struct DiagramPanel<D, F> {
    state: StateStore,
    diagrams: D,
    catalog: F,
    inner: Mutex<PanelState>,
}

impl<D, F> DiagramPanel<D, F>
where
    D: DiagramStore,
    F: FlowSpecStore,
{
    pub fn new(state: StateStore, diagrams: D, catalog: F) -> Self {
        Self {
            state,
            diagrams,
            catalog,
            inner: Mutex::new(PanelState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PanelState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn diagram_store(&self) -> &D {
        &self.diagrams
    }

    pub fn visibility(&self) -> Visibility {
        self.lock().visibility
    }

    pub fn selection(&self) -> Selection {
        self.lock().selection.clone()
    }

    pub fn listings(&self) -> Vec<DiagramListing> {
        self.lock().listings.clone()
    }

    /// Marks which diagrams are notable for this panel's subject; applied on the next refresh.
    pub fn set_notable(&self, notable: impl IntoIterator<Item = DiagramId>) {
        let mut inner = self.lock();
        inner.notable = notable.into_iter().collect();
        let notable = inner.notable.clone();
        for listing in &mut inner.listings {
            listing.notable = notable.contains(&listing.id);
        }
    }

    /// Reloads the diagram list from the store.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let summaries = self.diagrams.list_diagrams().await?;
        let mut inner = self.lock();
        inner.listings = to_listings(summaries, &inner.notable);
        debug!(diagrams = inner.listings.len(); "Refreshed diagram list");
        Ok(())
    }

    /// Shows `listing` read-only and loads it into the state store.
    pub async fn select_diagram(&self, listing: DiagramListing) -> Result<(), LoadError> {
        let id = listing.id.clone();
        {
            let mut inner = self.lock();
            inner.visibility = Visibility::ReadOnly;
            inner.clear_selection();
            inner.selection.diagram = Some(listing);
        }
        self.state.reset();
        self.state.load(&self.diagrams, &id).await?;

        // a listing built from a bare id takes the stored title
        let title = self.state.state().title.clone();
        let mut inner = self.lock();
        if let Some(listing) = inner.selection.diagram.as_mut() {
            if listing.id == id && listing.title.is_none() {
                listing.title = title;
            }
        }
        Ok(())
    }

    pub fn dismiss(&self) {
        {
            let mut inner = self.lock();
            inner.visibility = Visibility::Hidden;
            inner.clear_selection();
        }
        self.state.reset();
    }

    /// Starts a fresh diagram in the editor, seeded with `commands`.
    pub fn create_diagram(&self, commands: &[Command]) -> ApplyReport {
        self.state.reset();
        {
            let mut inner = self.lock();
            inner.visibility = Visibility::Editor;
            inner.clear_selection();
        }
        self.state.process_commands(commands)
    }

    /// Switches the selected diagram into the editor, carrying its name over as the title.
    pub fn edit_diagram(&self) -> Option<ApplyReport> {
        let title = {
            let mut inner = self.lock();
            inner.visibility = Visibility::Editor;
            inner
                .selection
                .diagram
                .as_ref()
                .map(|listing| listing.display_name().to_owned())
        }?;
        Some(self.state.process_commands(&[Command::SetTitle(title)]))
    }

    /// Persists the current diagram under `id`.
    pub async fn save(&self, id: &DiagramId) -> Result<(), StoreError> {
        let mut snapshot = (*self.state.state()).clone();
        snapshot.diagram_id = Some(id.clone());
        self.diagrams.save_diagram(id, &snapshot).await
    }

    /// Closes the editor and reloads the diagram list.
    pub async fn dismiss_editor(&self) -> Result<(), StoreError> {
        self.dismiss();
        self.refresh().await
    }

    pub fn show_node_detail(&self, node_id: &GraphId) -> Option<Node> {
        let node = self.state.state().model.node(node_id).cloned();
        let mut inner = self.lock();
        inner.detail_generation = inner.detail_generation.wrapping_add(1);
        inner.selection.node = node.clone();
        inner.selection.flow_bucket = None;
        node
    }

    /// Selects the bucket of `flow_id` and joins its decorations to physical flows and
    /// specifications from the catalog. Both catalog queries run concurrently.
    pub async fn show_flow_bucket_detail(&self, flow_id: &GraphId) -> BucketLookup {
        let snapshot = self.state.state();
        let store_generation = self.state.generation();
        let Some(flow) = snapshot.model.flow(flow_id).cloned() else {
            let mut inner = self.lock();
            inner.detail_generation = inner.detail_generation.wrapping_add(1);
            inner.selection.node = None;
            inner.selection.flow_bucket = None;
            return BucketLookup::Missing;
        };
        let decorations = snapshot
            .model
            .decorations
            .get(flow_id)
            .cloned()
            .unwrap_or_default();

        let mut detail = FlowBucketDetail {
            flow: flow.clone(),
            decorations: Vec::new(),
            failures: Vec::new(),
        };
        let generation = {
            let mut inner = self.lock();
            inner.detail_generation = inner.detail_generation.wrapping_add(1);
            inner.selection.node = None;
            inner.selection.flow_bucket = Some(detail.clone());
            inner.detail_generation
        };
        if decorations.is_empty() {
            return BucketLookup::Shown(detail);
        }

        let Some(reference) = flow
            .data
            .entity_reference
            .clone()
            .or_else(|| EntityReference::from_graph_id(&flow.id))
        else {
            detail.failures.push(DetailError::NoReference(flow.id.clone()));
            return self.publish_detail(generation, store_generation, detail);
        };
        let selector = EntitySelector::exact(reference);
        debug!(flow = flow_id.as_str(), generation; "Looking up flow bucket detail");

        let (flows, specs) = tokio::join!(
            self.catalog.find_physical_flows(&selector),
            self.catalog.find_specifications(&selector)
        );

        let flows = flows.unwrap_or_else(|err| {
            warn!(flow = flow_id.as_str(), error:% = err; "Physical flow lookup failed");
            detail.failures.push(DetailError::PhysicalFlows(err.to_string()));
            Vec::new()
        });
        let specs = specs.unwrap_or_else(|err| {
            warn!(flow = flow_id.as_str(), error:% = err; "Specification lookup failed");
            detail
                .failures
                .push(DetailError::Specifications(err.to_string()));
            Vec::new()
        });
        detail.decorations = join_decorations(&decorations, flows, specs);

        self.publish_detail(generation, store_generation, detail)
    }

    fn publish_detail(
        &self,
        generation: u64,
        store_generation: u64,
        detail: FlowBucketDetail,
    ) -> BucketLookup {
        let mut inner = self.lock();
        if inner.detail_generation != generation || self.state.generation() != store_generation {
            warn!(
                flow = detail.flow.id.as_str(),
                generation;
                "Discarding superseded bucket detail"
            );
            return BucketLookup::Superseded;
        }
        inner.selection.flow_bucket = Some(detail.clone());
        BucketLookup::Shown(detail)
    }
}

fn to_listings(
    summaries: Vec<DiagramSummary>,
    notable: &BTreeSet<DiagramId>,
) -> Vec<DiagramListing> {
    summaries
        .into_iter()
        .map(|summary| DiagramListing {
            notable: notable.contains(&summary.id),
            id: summary.id,
            title: summary.title,
        })
        .collect()
}

/// Decorations whose id matches no physical flow are left out.
fn join_decorations(
    decorations: &[Decoration],
    flows: Vec<PhysicalFlow>,
    specs: Vec<PhysicalSpecification>,
) -> Vec<BucketDecoration> {
    let flows_by_id = flows
        .into_iter()
        .map(|flow| (flow.id, flow))
        .collect::<HashMap<_, _>>();
    let specs_by_id = specs
        .into_iter()
        .map(|spec| (spec.id, spec))
        .collect::<BTreeMap<_, _>>();

    decorations
        .iter()
        .filter_map(|decoration| {
            let flow = flows_by_id.get(&decoration.data.id)?;
            Some(BucketDecoration {
                decoration: decoration.clone(),
                flow: flow.clone(),
                specification: specs_by_id.get(&flow.specification_id).cloned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests;
