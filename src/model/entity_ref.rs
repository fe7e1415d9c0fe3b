// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ids::{GraphId, IdError};

/// Kind of the external domain entity a diagram element stands for.
///
/// Unknown kinds are intentionally representable so diagrams written by newer hosts still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Application,
    Actor,
    LogicalDataFlow,
    PhysicalFlow,
    PhysicalSpecification,
    DataType,
    Other(String),
}

impl EntityKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Application => "APPLICATION",
            Self::Actor => "ACTOR",
            Self::LogicalDataFlow => "LOGICAL_DATA_FLOW",
            Self::PhysicalFlow => "PHYSICAL_FLOW",
            Self::PhysicalSpecification => "PHYSICAL_SPECIFICATION",
            Self::DataType => "DATA_TYPE",
            Self::Other(kind) => kind,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "APPLICATION" => Self::Application,
            "ACTOR" => Self::Actor,
            "LOGICAL_DATA_FLOW" => Self::LogicalDataFlow,
            "PHYSICAL_FLOW" => Self::PhysicalFlow,
            "PHYSICAL_SPECIFICATION" => Self::PhysicalSpecification,
            "DATA_TYPE" => Self::DataType,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl Serialize for EntityKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.parse() {
            Ok(kind) => Ok(kind),
            Err(never) => match never {},
        }
    }
}

/// Reference to an entity owned by an external catalog (kind + numeric id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityReference {
    pub kind: EntityKind,
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityReference {
    pub fn new(kind: EntityKind, id: i64) -> Self {
        Self {
            kind,
            id,
            name: None,
        }
    }

    pub fn named(kind: EntityKind, id: i64, name: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            name: Some(name.into()),
        }
    }

    /// The id under which this entity is drawn: `KIND/id`.
    pub fn graph_id(&self) -> Result<GraphId, IdError> {
        GraphId::new(format!("{}/{}", self.kind, self.id))
    }

    /// Inverse of [`graph_id`](Self::graph_id) for ids of the form `KIND/<number>`.
    pub fn from_graph_id(id: &GraphId) -> Option<Self> {
        let (kind, number) = id.as_str().rsplit_once('/')?;
        let number = number.parse().ok()?;
        let kind = kind.parse().ok()?;
        Some(Self::new(kind, number))
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityKind, EntityReference};
    use crate::model::GraphId;

    #[test]
    fn graph_id_prefixes_kind() {
        let reference = EntityReference::new(EntityKind::LogicalDataFlow, 42);
        assert_eq!(
            reference.graph_id().expect("graph id").as_str(),
            "LOGICAL_DATA_FLOW/42"
        );
    }

    #[test]
    fn graph_ids_parse_back_into_references() {
        let reference = EntityReference::new(EntityKind::LogicalDataFlow, 42);
        let id = reference.graph_id().expect("graph id");
        assert_eq!(EntityReference::from_graph_id(&id), Some(reference));

        let free_form = GraphId::new("link/clerk-orders").expect("graph id");
        assert_eq!(EntityReference::from_graph_id(&free_form), None);
    }

    #[test]
    fn unknown_kinds_round_trip_through_json() {
        let reference = EntityReference::named(EntityKind::Other("SERVER".to_owned()), 7, "srv");
        let json = serde_json::to_string(&reference).expect("json");
        assert!(json.contains("\"SERVER\""));

        let back: EntityReference = serde_json::from_str(&json).expect("read");
        assert_eq!(back, reference);
    }

    #[test]
    fn known_kinds_parse_to_named_variants() {
        let kind: EntityKind = "ACTOR".parse().expect("kind");
        assert_eq!(kind, EntityKind::Actor);
    }
}
