//! Reorder engine
//!
//! Pure computation of the `order` values resulting from a drag-and-drop
//! move. Columns are always treated as their order-sorted lists; after a move
//! every touched column is reassigned a dense `0..n-1` sequence, so the
//! output may include projects whose values did not actually change. The
//! engine never mutates anything; the board controller decides what to do
//! with the plan.

use crate::error::{Error, Result};
use crate::project::{Project, ProjectStatus};

/// Where a dragged card was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub column: ProjectStatus,
    pub index: usize,
}

/// A move emitted by the drag-and-drop surface.
///
/// `destination: None` signals a cancelled drop (released outside any
/// column); such events produce no plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEvent {
    pub dragged_id: i64,
    pub source_column: ProjectStatus,
    pub source_index: usize,
    pub destination: Option<DropTarget>,
}

/// The projects of one column, sorted ascending by `order`.
fn column_sorted(projects: &[Project], column: ProjectStatus) -> Vec<Project> {
    let mut list: Vec<Project> = projects
        .iter()
        .filter(|p| p.status == column)
        .cloned()
        .collect();
    list.sort_by_key(|p| p.order);
    list
}

/// Reassign `order = 0..n-1` by position.
fn assign_dense_order(list: &mut [Project]) {
    for (index, project) in list.iter_mut().enumerate() {
        project.order = index as i64;
    }
}

/// Compute the set of project records that must be persisted for `event`.
///
/// Returns an empty plan for cancelled drops and for moves that land on
/// their own source position. Fails with [`Error::ProjectNotFound`] when the
/// dragged id is not in the working set; no partial output is produced.
pub fn plan_move(projects: &[Project], event: &MoveEvent) -> Result<Vec<Project>> {
    let Some(dest) = event.destination else {
        return Ok(Vec::new());
    };

    // Dropped back where it was picked up
    if dest.column == event.source_column && dest.index == event.source_index {
        return Ok(Vec::new());
    }

    let dragged = projects
        .iter()
        .find(|p| p.id == event.dragged_id)
        .ok_or(Error::ProjectNotFound(event.dragged_id))?
        .clone();

    if dest.column == event.source_column {
        // Same-column reorder: pull the card out, reinsert at the target
        // index, renumber the whole column.
        let mut column = column_sorted(projects, event.source_column);
        column.retain(|p| p.id != dragged.id);
        let insert_at = dest.index.min(column.len());
        column.insert(insert_at, dragged);
        assign_dense_order(&mut column);
        return Ok(column);
    }

    // Cross-column move: renumber the shrunken source column, then insert
    // the card (with its new status) into the destination column and
    // renumber that as well.
    let mut source = column_sorted(projects, event.source_column);
    source.retain(|p| p.id != dragged.id);
    assign_dense_order(&mut source);

    let mut moved = dragged;
    moved.status = dest.column;

    let mut destination = column_sorted(projects, dest.column);
    let insert_at = dest.index.min(destination.len());
    destination.insert(insert_at, moved);
    assign_dense_order(&mut destination);

    let mut plan = source;
    plan.extend(destination);
    Ok(plan)
}
