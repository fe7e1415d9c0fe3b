// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-process stores for demos and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{
    DiagramStore, DiagramSummary, EntitySelector, FlowSpecStore, PhysicalFlow,
    PhysicalSpecification, StoreError,
};
use crate::model::{DiagramId, DiagramState, EntityKind};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct MemoryDiagramStore {
    diagrams: Mutex<BTreeMap<DiagramId, DiagramState>>,
}

impl MemoryDiagramStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagram(self, id: DiagramId, state: DiagramState) -> Self {
        lock(&self.diagrams).insert(id, state);
        self
    }

    pub fn len(&self) -> usize {
        lock(&self.diagrams).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagramStore for MemoryDiagramStore {
    async fn load_diagram(&self, id: &DiagramId) -> Result<DiagramState, StoreError> {
        let mut state = lock(&self.diagrams)
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
        state.diagram_id = Some(id.clone());
        Ok(state)
    }

    async fn save_diagram(&self, id: &DiagramId, state: &DiagramState) -> Result<(), StoreError> {
        lock(&self.diagrams).insert(id.clone(), state.clone());
        Ok(())
    }

    async fn list_diagrams(&self) -> Result<Vec<DiagramSummary>, StoreError> {
        Ok(lock(&self.diagrams)
            .iter()
            .map(|(id, state)| DiagramSummary {
                id: id.clone(),
                title: state.title.clone(),
            })
            .collect())
    }
}

type EntityKey = (EntityKind, i64);

/// Physical flows and specifications indexed by the entity they were registered against.
#[derive(Debug, Default)]
pub struct MemoryFlowSpecStore {
    flows: Mutex<HashMap<EntityKey, Vec<PhysicalFlow>>>,
    specifications: Mutex<HashMap<EntityKey, Vec<PhysicalSpecification>>>,
    unavailable: Mutex<Option<String>>,
}

impl MemoryFlowSpecStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_flow(&self, kind: EntityKind, id: i64, flow: PhysicalFlow) {
        lock(&self.flows).entry((kind, id)).or_default().push(flow);
    }

    pub fn insert_specification(&self, kind: EntityKind, id: i64, spec: PhysicalSpecification) {
        lock(&self.specifications)
            .entry((kind, id))
            .or_default()
            .push(spec);
    }

    /// Makes every subsequent query fail with [`StoreError::Unavailable`] until cleared.
    pub fn set_unavailable(&self, reason: Option<&str>) {
        *lock(&self.unavailable) = reason.map(str::to_owned);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        match lock(&self.unavailable).as_ref() {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

fn key_of(selector: &EntitySelector) -> EntityKey {
    let reference = &selector.entity_reference;
    (reference.kind.clone(), reference.id)
}

impl FlowSpecStore for MemoryFlowSpecStore {
    async fn find_physical_flows(
        &self,
        selector: &EntitySelector,
    ) -> Result<Vec<PhysicalFlow>, StoreError> {
        self.check_available()?;
        Ok(lock(&self.flows)
            .get(&key_of(selector))
            .cloned()
            .unwrap_or_default())
    }

    async fn find_specifications(
        &self,
        selector: &EntitySelector,
    ) -> Result<Vec<PhysicalSpecification>, StoreError> {
        self.check_available()?;
        Ok(lock(&self.specifications)
            .get(&key_of(selector))
            .cloned()
            .unwrap_or_default())
    }
}
