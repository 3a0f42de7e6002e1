//! Rebuild a snapshot from the event log.
//!
//! Every event payload carries the full post-mutation entity, so replay
//! is an upsert fold. Actors are created outside the logged mutation
//! surface and are not reconstructed here.

use crate::model::{
    Attachment, Comment, Event, EventKind, Item, Outline, Project, Snapshot,
};
use crate::store::StoreError;

/// Fold events (ascending seq) into a fresh snapshot.
pub fn replay(events: &[Event]) -> Result<Snapshot, StoreError> {
    let mut snap = Snapshot::default();
    for event in events {
        apply_event(&mut snap, event)?;
    }
    Ok(snap)
}

fn apply_event(snap: &mut Snapshot, event: &Event) -> Result<(), StoreError> {
    let corrupt = |detail: String| StoreError::Corrupt {
        what: format!("event seq {}", event.seq),
        detail,
    };
    match event.kind {
        EventKind::ItemCreate
        | EventKind::ItemUpdate
        | EventKind::ItemArchive
        | EventKind::ItemUnarchive
        | EventKind::ItemMove
        | EventKind::ItemDuplicate => {
            let item: Item =
                serde_json::from_value(event.payload.clone()).map_err(|e| corrupt(e.to_string()))?;
            snap.items.insert(item.id.clone(), item);
        }
        EventKind::CommentCreate | EventKind::CommentUpdate => {
            let comment: Comment =
                serde_json::from_value(event.payload.clone()).map_err(|e| corrupt(e.to_string()))?;
            snap.comments.insert(comment.id.clone(), comment);
        }
        EventKind::AttachmentCreate => {
            let attachment: Attachment =
                serde_json::from_value(event.payload.clone()).map_err(|e| corrupt(e.to_string()))?;
            snap.attachments.insert(attachment.id.clone(), attachment);
        }
        EventKind::OutlineCreate | EventKind::OutlineUpdate => {
            let outline: Outline =
                serde_json::from_value(event.payload.clone()).map_err(|e| corrupt(e.to_string()))?;
            snap.outlines.insert(outline.id.clone(), outline);
        }
        EventKind::ProjectCreate | EventKind::ProjectUpdate => {
            let project: Project =
                serde_json::from_value(event.payload.clone()).map_err(|e| corrupt(e.to_string()))?;
            snap.projects.insert(project.id.clone(), project);
        }
    }
    Ok(())
}
