// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Reducer for a single command against the batch's working copy.
/// Keeps `ops::mod` focused on the public protocol types and batch orchestration.
fn apply_command(
    state: &mut DiagramState,
    command: &Command,
    delta: &mut DeltaBuilder,
) -> Result<(), CommandError> {
    match command {
        Command::Move { id, dx, dy } => {
            if !(dx.is_finite() && dy.is_finite()) {
                return Err(invalid_payload(command, "dx/dy must be finite"));
            }
            let position = state
                .layout
                .positions
                .entry(id.clone())
                .or_insert(Point::ORIGIN);
            position.x += dx;
            position.y += dy;
            delta.record_updated(id);
            Ok(())
        }
        Command::TransformDiagram(transform) => {
            let finite = transform.x.is_finite() && transform.y.is_finite();
            if !finite || !(transform.k.is_finite() && transform.k > 0.0) {
                return Err(invalid_payload(command, "transform must be finite with k > 0"));
            }
            state.layout.diagram_transform = *transform;
            Ok(())
        }
        Command::SetTitle(title) => {
            state.title = Some(title.clone());
            Ok(())
        }
        Command::AddNode(node) => {
            if state.model.node(&node.id).is_some() {
                return Err(CommandError::AlreadyExists {
                    class: EntityClass::Node,
                    id: node.id.clone(),
                });
            }
            state.model.nodes.push(node.clone());
            delta.record_added(&node.id);
            Ok(())
        }
        Command::RemoveNode { id } => remove_node(state, id, delta),
        Command::AddFlow(flow) => {
            if state.model.flow(&flow.id).is_some() {
                return Err(CommandError::AlreadyExists {
                    class: EntityClass::Flow,
                    id: flow.id.clone(),
                });
            }
            state.model.flows.push(flow.clone());
            delta.record_added(&flow.id);
            Ok(())
        }
        Command::RemoveFlow { id } => remove_flow(state, id, delta),
        Command::AddDecoration {
            flow_id,
            decoration,
        } => {
            let decorations = state.model.decorations.entry(flow_id.clone()).or_default();
            if decorations.iter().any(|d| d.id == decoration.id) {
                return Err(CommandError::AlreadyExists {
                    class: EntityClass::Decoration,
                    id: decoration.id.clone(),
                });
            }
            decorations.push(decoration.clone());
            delta.record_updated(flow_id);
            Ok(())
        }
        Command::RemoveDecoration {
            flow_id,
            decoration_id,
        } => {
            let not_found = || CommandError::NotFound {
                class: EntityClass::Decoration,
                id: decoration_id.clone(),
            };
            let decorations = state
                .model
                .decorations
                .get_mut(flow_id)
                .ok_or_else(not_found)?;
            let before = decorations.len();
            decorations.retain(|d| &d.id != decoration_id);
            if decorations.len() == before {
                return Err(not_found());
            }
            if decorations.is_empty() {
                state.model.decorations.remove(flow_id);
            }
            delta.record_updated(flow_id);
            Ok(())
        }
        Command::AddAnnotation(annotation) => {
            if state.model.annotation(&annotation.id).is_some() {
                return Err(CommandError::AlreadyExists {
                    class: EntityClass::Annotation,
                    id: annotation.id.clone(),
                });
            }
            state.model.annotations.push(annotation.clone());
            delta.record_added(&annotation.id);
            Ok(())
        }
        Command::UpdateAnnotation { id, note } => {
            let Some(annotation) = state.model.annotations.iter_mut().find(|a| &a.id == id) else {
                return Err(CommandError::NotFound {
                    class: EntityClass::Annotation,
                    id: id.clone(),
                });
            };
            annotation.data.note = note.clone();
            delta.record_updated(id);
            Ok(())
        }
        Command::RemoveAnnotation { id } => {
            let before = state.model.annotations.len();
            state.model.annotations.retain(|a| &a.id != id);
            if state.model.annotations.len() == before {
                return Err(CommandError::NotFound {
                    class: EntityClass::Annotation,
                    id: id.clone(),
                });
            }
            state.layout.positions.remove(id);
            delta.record_removed(id);
            Ok(())
        }
    }
}

fn invalid_payload(command: &Command, reason: &str) -> CommandError {
    CommandError::InvalidPayload {
        command: command.name().to_owned(),
        reason: reason.to_owned(),
    }
}

/// Removes a node together with everything that only makes sense while it exists: its layout,
/// flows touching it, and annotations pointing at it.
fn remove_node(
    state: &mut DiagramState,
    id: &GraphId,
    delta: &mut DeltaBuilder,
) -> Result<(), CommandError> {
    let before = state.model.nodes.len();
    state.model.nodes.retain(|node| &node.id != id);
    if state.model.nodes.len() == before {
        return Err(CommandError::NotFound {
            class: EntityClass::Node,
            id: id.clone(),
        });
    }
    state.layout.positions.remove(id);
    state.layout.shapes.remove(id);
    delta.record_removed(id);

    let touching = state
        .model
        .flows
        .iter()
        .filter(|flow| &flow.source == id || &flow.target == id)
        .map(|flow| flow.id.clone())
        .collect::<Vec<_>>();
    for flow_id in touching {
        remove_flow(state, &flow_id, delta)?;
    }

    remove_annotations_on(state, id, delta);
    Ok(())
}

fn remove_flow(
    state: &mut DiagramState,
    id: &GraphId,
    delta: &mut DeltaBuilder,
) -> Result<(), CommandError> {
    let before = state.model.flows.len();
    state.model.flows.retain(|flow| &flow.id != id);
    if state.model.flows.len() == before {
        return Err(CommandError::NotFound {
            class: EntityClass::Flow,
            id: id.clone(),
        });
    }
    state.model.decorations.remove(id);
    delta.record_removed(id);
    remove_annotations_on(state, id, delta);
    Ok(())
}

fn remove_annotations_on(state: &mut DiagramState, subject: &GraphId, delta: &mut DeltaBuilder) {
    let orphaned = state
        .model
        .annotations
        .iter()
        .filter(|annotation| {
            annotation
                .data
                .entity_reference
                .graph_id()
                .is_ok_and(|target| &target == subject)
        })
        .map(|annotation| annotation.id.clone())
        .collect::<Vec<_>>();
    if orphaned.is_empty() {
        return;
    }
    state
        .model
        .annotations
        .retain(|annotation| !orphaned.contains(&annotation.id));
    for annotation_id in &orphaned {
        state.layout.positions.remove(annotation_id);
        delta.record_removed(annotation_id);
    }
}
