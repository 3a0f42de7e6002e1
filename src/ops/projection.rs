//! Flattening outline trees into ordered, indented, collapsible rows.

use std::collections::HashSet;

use crate::model::{Item, Snapshot};

/// One visible item row in an outline projection
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub item_id: String,
    pub depth: usize,
    pub has_children: bool,
    pub collapsed: bool,
    /// Descendants (recursive) whose status is an end-state
    pub done_children: usize,
    /// All descendants, recursive, collapsed or not
    pub total_children: usize,
}

/// What the list delegate renders: item rows plus the trailing
/// insertion affordance
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineRow {
    Item(Row),
    AddRow,
}

impl OutlineRow {
    pub fn item_id(&self) -> Option<&str> {
        match self {
            OutlineRow::Item(row) => Some(&row.item_id),
            OutlineRow::AddRow => None,
        }
    }
}

/// Flatten an outline into display rows.
///
/// `collapsed` holds item ids whose descendants are elided. When `root`
/// is set the projection is narrowed: the row list starts at that item
/// (depth 0) and contains only its descendants. `filter` is a
/// case-insensitive substring over title+description; matches keep their
/// ancestors up to the projection root but expansion state is untouched.
/// Archived items never appear, with one exception: a narrowed root that
/// is itself archived projects its full subtree, archived descendants
/// included, so an archived item can still be inspected. `with_add_row`
/// appends the interactive insertion sentinel.
pub fn outline_rows(
    snap: &Snapshot,
    outline_id: &str,
    collapsed: &HashSet<String>,
    root: Option<&str>,
    filter: &str,
    with_add_row: bool,
) -> Vec<OutlineRow> {
    let keep = filter_keep_set(snap, outline_id, root, filter);

    let mut rows = Vec::new();
    match root {
        Some(root_id) => {
            if let Some(item) = snap.item(root_id) {
                let include_archived = item.archived;
                push_subtree(
                    snap,
                    item,
                    0,
                    collapsed,
                    keep.as_ref(),
                    include_archived,
                    &mut rows,
                );
            }
        }
        None => {
            for item in snap.roots_of(outline_id) {
                if !item.archived {
                    push_subtree(snap, item, 0, collapsed, keep.as_ref(), false, &mut rows);
                }
            }
        }
    }
    if with_add_row {
        rows.push(OutlineRow::AddRow);
    }
    rows
}

fn push_subtree(
    snap: &Snapshot,
    item: &Item,
    depth: usize,
    collapsed: &HashSet<String>,
    keep: Option<&HashSet<String>>,
    include_archived: bool,
    rows: &mut Vec<OutlineRow>,
) {
    // A node outside the keep set has no matching descendants either
    if keep.is_some_and(|k| !k.contains(&item.id)) {
        return;
    }
    let children: Vec<&Item> = snap
        .children_of(&item.id)
        .into_iter()
        .filter(|c| include_archived || !c.archived)
        .collect();
    let has_children = !children.is_empty();
    let is_collapsed = has_children && collapsed.contains(&item.id);

    let (total, done) = descendant_counts(snap, &item.id, include_archived);
    rows.push(OutlineRow::Item(Row {
        item_id: item.id.clone(),
        depth,
        has_children,
        collapsed: is_collapsed,
        done_children: done,
        total_children: total,
    }));

    if !is_collapsed {
        for child in children {
            push_subtree(snap, child, depth + 1, collapsed, keep, include_archived, rows);
        }
    }
}

/// Count descendants and how many sit in an end-state; archived ones
/// only count when `include_archived` is set
fn descendant_counts(snap: &Snapshot, item_id: &str, include_archived: bool) -> (usize, usize) {
    let mut total = 0;
    let mut done = 0;
    for id in snap.descendants_of(item_id) {
        let Some(item) = snap.item(&id) else { continue };
        if item.archived && !include_archived {
            continue;
        }
        total += 1;
        if snap
            .outline(&item.outline_id)
            .is_some_and(|o| o.is_end_state(&item.status_id))
        {
            done += 1;
        }
    }
    (total, done)
}

/// Ids to retain under an active filter: matches plus their ancestors up
/// to the projection root. None when the filter is empty (keep all).
fn filter_keep_set(
    snap: &Snapshot,
    outline_id: &str,
    root: Option<&str>,
    filter: &str,
) -> Option<HashSet<String>> {
    if filter.is_empty() {
        return None;
    }
    let mut keep = HashSet::new();
    for item in snap.items.values() {
        if item.outline_id != outline_id || item.archived || !item.matches(filter) {
            continue;
        }
        // Walk up to the projection root, collecting ancestors
        let mut current = Some(item.id.clone());
        let mut chain = Vec::new();
        let mut under_root = root.is_none();
        while let Some(id) = current {
            chain.push(id.clone());
            if root == Some(id.as_str()) {
                under_root = true;
                break;
            }
            current = snap.item(&id).and_then(|i| i.parent_id.clone());
        }
        if under_root {
            keep.extend(chain);
        }
    }
    // The narrowed root stays visible even without matches below it
    if let Some(root_id) = root {
        if !keep.is_empty() {
            keep.insert(root_id.to_string());
        }
    }
    Some(keep)
}
