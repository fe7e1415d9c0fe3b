// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Mutex;

use rstest::rstest;
use tokio::sync::oneshot;

use super::{BucketLookup, DetailError, DiagramListing, DiagramPanel, Visibility};
use crate::model::fixtures::{graph_id, two_apps_with_logical_flow};
use crate::model::{DiagramId, EntityKind, EntityReference, Node};
use crate::ops::Command;
use crate::state::StateStore;
use crate::store::{
    EntitySelector, FlowSpecStore, MemoryDiagramStore, MemoryFlowSpecStore, PhysicalFlow,
    PhysicalSpecification, StoreError,
};

/// Catalog that can hold the first physical-flow query until released and can fail the
/// specification query on demand.
struct ScriptedCatalog {
    inner: MemoryFlowSpecStore,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    fail_specifications: bool,
}

impl ScriptedCatalog {
    fn stocked() -> Self {
        let inner = MemoryFlowSpecStore::new();
        inner.insert_flow(
            EntityKind::LogicalDataFlow,
            10,
            PhysicalFlow {
                id: 100,
                specification_id: 7,
                transport: Some("FILE_TRANSPORT".to_owned()),
                frequency: Some("DAILY".to_owned()),
            },
        );
        inner.insert_specification(
            EntityKind::LogicalDataFlow,
            10,
            PhysicalSpecification {
                id: 7,
                name: "invoice-extract".to_owned(),
                format: Some("CSV".to_owned()),
            },
        );
        Self {
            inner,
            gate: Mutex::new(None),
            fail_specifications: false,
        }
    }

    fn gated(self) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        (self, tx)
    }

    fn failing_specifications(mut self) -> Self {
        self.fail_specifications = true;
        self
    }
}

impl FlowSpecStore for ScriptedCatalog {
    async fn find_physical_flows(
        &self,
        selector: &EntitySelector,
    ) -> Result<Vec<PhysicalFlow>, StoreError> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.inner.find_physical_flows(selector).await
    }

    async fn find_specifications(
        &self,
        selector: &EntitySelector,
    ) -> Result<Vec<PhysicalSpecification>, StoreError> {
        if self.fail_specifications {
            return Err(StoreError::Unavailable("catalog offline".to_owned()));
        }
        self.inner.find_specifications(selector).await
    }
}

fn diagram_id(value: &str) -> DiagramId {
    DiagramId::new(value).unwrap()
}

fn listing(id: &str, title: Option<&str>) -> DiagramListing {
    DiagramListing {
        id: diagram_id(id),
        title: title.map(str::to_owned),
        notable: false,
    }
}

type TestPanel = DiagramPanel<MemoryDiagramStore, ScriptedCatalog>;

async fn loaded_panel(catalog: ScriptedCatalog) -> TestPanel {
    let diagrams =
        MemoryDiagramStore::new().with_diagram(diagram_id("orders"), two_apps_with_logical_flow());
    let panel = DiagramPanel::new(StateStore::default(), diagrams, catalog);
    panel
        .select_diagram(listing("orders", Some("Order flow")))
        .await
        .unwrap();
    panel
}

#[tokio::test]
async fn bucket_detail_joins_decorations_to_physical_flows() {
    let panel = loaded_panel(ScriptedCatalog::stocked()).await;

    let lookup = panel
        .show_flow_bucket_detail(&graph_id("LOGICAL_DATA_FLOW/10"))
        .await;

    let detail = match lookup {
        BucketLookup::Shown(detail) => detail,
        other => panic!("expected detail, got {other:?}"),
    };
    assert!(detail.failures.is_empty());
    // DATA_TYPE/101 has no physical flow in the catalog
    assert_eq!(detail.decorations.len(), 1);
    let joined = &detail.decorations[0];
    assert_eq!(joined.decoration.data.id, 100);
    assert_eq!(joined.flow.frequency.as_deref(), Some("DAILY"));
    assert_eq!(
        joined.specification.as_ref().map(|spec| spec.name.as_str()),
        Some("invoice-extract")
    );
    assert_eq!(panel.selection().flow_bucket, Some(detail));
    assert_eq!(panel.selection().node, None);
}

#[tokio::test]
async fn failed_specification_lookup_keeps_partial_detail() {
    let panel = loaded_panel(ScriptedCatalog::stocked().failing_specifications()).await;

    let lookup = panel
        .show_flow_bucket_detail(&graph_id("LOGICAL_DATA_FLOW/10"))
        .await;

    let detail = match lookup {
        BucketLookup::Shown(detail) => detail,
        other => panic!("expected detail, got {other:?}"),
    };
    assert_eq!(detail.decorations.len(), 1);
    assert_eq!(detail.decorations[0].specification, None);
    assert!(matches!(
        detail.failures.as_slice(),
        [DetailError::Specifications(message)] if message.contains("catalog offline")
    ));
}

#[tokio::test]
async fn undecorated_flow_shows_empty_detail_without_querying() {
    let catalog = ScriptedCatalog::stocked();
    catalog.inner.set_unavailable(Some("must not be queried"));
    let panel = loaded_panel(catalog).await;

    let lookup = panel
        .show_flow_bucket_detail(&graph_id("link/clerk-orders"))
        .await;

    let detail = match lookup {
        BucketLookup::Shown(detail) => detail,
        other => panic!("expected detail, got {other:?}"),
    };
    assert!(detail.decorations.is_empty());
    assert!(detail.failures.is_empty());
}

#[tokio::test]
async fn unknown_flow_is_missing_and_clears_the_selection() {
    let panel = loaded_panel(ScriptedCatalog::stocked()).await;
    panel
        .show_flow_bucket_detail(&graph_id("LOGICAL_DATA_FLOW/10"))
        .await;

    let lookup = panel
        .show_flow_bucket_detail(&graph_id("LOGICAL_DATA_FLOW/99"))
        .await;

    assert_eq!(lookup, BucketLookup::Missing);
    assert_eq!(panel.selection().flow_bucket, None);
}

#[tokio::test]
async fn newer_bucket_lookup_supersedes_a_pending_one() {
    let (catalog, release) = ScriptedCatalog::stocked().gated();
    let panel = loaded_panel(catalog).await;
    let flow_id = graph_id("LOGICAL_DATA_FLOW/10");

    let (first, second) = tokio::join!(panel.show_flow_bucket_detail(&flow_id), async {
        let lookup = panel.show_flow_bucket_detail(&flow_id).await;
        release.send(()).unwrap();
        lookup
    });

    assert_eq!(first, BucketLookup::Superseded);
    let detail = match second {
        BucketLookup::Shown(detail) => detail,
        other => panic!("expected detail, got {other:?}"),
    };
    assert_eq!(panel.selection().flow_bucket, Some(detail));
}

#[tokio::test]
async fn node_selection_supersedes_a_pending_bucket_lookup() {
    let (catalog, release) = ScriptedCatalog::stocked().gated();
    let panel = loaded_panel(catalog).await;
    let flow = graph_id("LOGICAL_DATA_FLOW/10");

    let (lookup, node) = tokio::join!(
        panel.show_flow_bucket_detail(&flow),
        async {
            let node = panel.show_node_detail(&graph_id("APPLICATION/2"));
            release.send(()).unwrap();
            node
        }
    );

    assert_eq!(lookup, BucketLookup::Superseded);
    assert_eq!(node.as_ref().map(Node::name), Some("Billing"));
    let selection = panel.selection();
    assert_eq!(selection.flow_bucket, None);
    assert_eq!(selection.node, node);
}

#[rstest]
#[case::panel_dismissed(true)]
#[case::state_reset_elsewhere(false)]
#[tokio::test]
async fn reset_supersedes_a_pending_bucket_lookup(#[case] via_panel: bool) {
    let (catalog, release) = ScriptedCatalog::stocked().gated();
    let panel = loaded_panel(catalog).await;
    let flow = graph_id("LOGICAL_DATA_FLOW/10");

    let (lookup, ()) = tokio::join!(
        panel.show_flow_bucket_detail(&flow),
        async {
            if via_panel {
                panel.dismiss();
            } else {
                panel.state().reset();
            }
            release.send(()).unwrap();
        }
    );

    assert_eq!(lookup, BucketLookup::Superseded);
    assert!(panel.state().state().model.is_empty());
}

#[tokio::test]
async fn view_edit_and_dismiss_cycle() {
    let panel = loaded_panel(ScriptedCatalog::stocked()).await;
    panel.set_notable([diagram_id("orders")]);
    panel.refresh().await.unwrap();

    assert_eq!(panel.visibility(), Visibility::ReadOnly);
    assert_eq!(panel.listings().len(), 1);
    assert!(panel.listings()[0].notable);
    assert_eq!(panel.state().state().model.nodes.len(), 3);

    let report = panel.edit_diagram().expect("a diagram is selected");
    assert_eq!(report.applied, 1);
    assert_eq!(panel.visibility(), Visibility::Editor);
    assert_eq!(panel.state().state().title.as_deref(), Some("Order flow"));

    panel
        .state()
        .process_commands(&[Command::SetTitle("Order flow v2".to_owned())]);
    panel.save(&diagram_id("orders-v2")).await.unwrap();
    panel.dismiss_editor().await.unwrap();

    assert_eq!(panel.visibility(), Visibility::Hidden);
    assert_eq!(panel.selection().diagram, None);
    assert!(panel.state().state().model.is_empty());
    let titles = panel
        .listings()
        .into_iter()
        .map(|listing| listing.title)
        .collect::<Vec<_>>();
    assert_eq!(
        titles,
        vec![Some("Order flow".to_owned()), Some("Order flow v2".to_owned())]
    );
}

#[rstest]
#[case::listing_title_wins(Some("Quarterly close"), Some("Order flow"), "Quarterly close")]
#[case::stored_title_kept(None, Some("Order flow"), "Order flow")]
#[case::falls_back_to_id(None, None, "orders")]
#[tokio::test]
async fn editing_carries_the_listing_name_as_title(
    #[case] title: Option<&str>,
    #[case] stored: Option<&str>,
    #[case] expected: &str,
) {
    let mut state = two_apps_with_logical_flow();
    state.title = stored.map(str::to_owned);
    let diagrams = MemoryDiagramStore::new().with_diagram(diagram_id("orders"), state);
    let panel = DiagramPanel::new(StateStore::default(), diagrams, ScriptedCatalog::stocked());
    panel.select_diagram(listing("orders", title)).await.unwrap();

    panel.edit_diagram();

    assert_eq!(panel.state().state().title.as_deref(), Some(expected));
    let selected = panel.selection().diagram.expect("a diagram is selected");
    assert_eq!(selected.display_name(), expected);
}

#[test]
fn editing_without_a_selection_is_a_noop() {
    let panel = DiagramPanel::new(
        StateStore::default(),
        MemoryDiagramStore::new(),
        ScriptedCatalog::stocked(),
    );
    assert_eq!(panel.edit_diagram(), None);
    assert_eq!(panel.state().revision(), 0);
}

#[test]
fn create_starts_a_fresh_editor_session() {
    let panel = DiagramPanel::new(
        StateStore::default(),
        MemoryDiagramStore::new(),
        ScriptedCatalog::stocked(),
    );
    panel.state().process_commands(&[Command::SetTitle("stale".to_owned())]);

    let reference = EntityReference::named(EntityKind::Application, 5, "Ledger");
    let node = Node::new(reference.graph_id().unwrap(), reference, "Ledger");
    let report = panel.create_diagram(&[Command::AddNode(node)]);

    assert_eq!(report.applied, 1);
    assert_eq!(panel.visibility(), Visibility::Editor);
    let state = panel.state().state();
    assert_eq!(state.title, None);
    assert_eq!(state.model.nodes.len(), 1);
    assert!(state.layout.shapes.contains_key(&graph_id("APPLICATION/5")));
}
