// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence and catalog collaborators.
//!
//! The engine does not own a storage format; it talks to a [`DiagramStore`] for whole diagrams
//! and to a [`FlowSpecStore`] for the physical flows/specifications behind a flow bucket. Both
//! are async because real implementations sit behind a network or disk.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{DiagramId, DiagramState, EntityReference, IdError};

pub mod diagram_folder;
pub mod memory;

pub use diagram_folder::{DiagramFolder, WriteDurability};
pub use memory::{MemoryDiagramStore, MemoryFlowSpecStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("json error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("diagram not found (id={id})")]
    NotFound { id: DiagramId },
    #[error("invalid id '{value}': {source}")]
    InvalidId { value: String, source: IdError },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramSummary {
    pub id: DiagramId,
    pub title: Option<String>,
}

/// Source of persisted diagrams.
#[allow(async_fn_in_trait)]
pub trait DiagramStore {
    async fn load_diagram(&self, id: &DiagramId) -> Result<DiagramState, StoreError>;

    async fn save_diagram(&self, id: &DiagramId, state: &DiagramState) -> Result<(), StoreError>;

    async fn list_diagrams(&self) -> Result<Vec<DiagramSummary>, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectorScope {
    #[default]
    Exact,
    Parents,
    Children,
}

/// Selects catalog records related to one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySelector {
    pub entity_reference: EntityReference,
    pub scope: SelectorScope,
}

impl EntitySelector {
    pub fn exact(entity_reference: EntityReference) -> Self {
        Self {
            entity_reference,
            scope: SelectorScope::Exact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalFlow {
    pub id: i64,
    pub specification_id: i64,
    #[serde(default)]
    pub transport: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalSpecification {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub format: Option<String>,
}

/// Catalog of physical flows and their specifications, used for flow-bucket drill-down.
#[allow(async_fn_in_trait)]
pub trait FlowSpecStore {
    async fn find_physical_flows(
        &self,
        selector: &EntitySelector,
    ) -> Result<Vec<PhysicalFlow>, StoreError>;

    async fn find_specifications(
        &self,
        selector: &EntitySelector,
    ) -> Result<Vec<PhysicalSpecification>, StoreError>;
}
