//! Reordering of a community's shapes.
//!
//! Stored priorities may repeat or already disagree with the display order.
//! A reorder first turns the existing priorities into a strictly increasing
//! sequence, moving values only where needed, then hands those priorities
//! out in the requested order. Only shapes whose priority actually changes
//! are returned, so the caller writes as little as possible.

use serde::{Deserialize, Serialize};
use shapekit_types::ShapeId;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// A new sort priority for one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityUpdate {
    pub id: ShapeId,
    pub sort_priority: i64,
}

/// Why a requested order can not be realized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("shape {0} appears more than once")]
    DuplicateId(ShapeId),

    #[error("shape {0} does not belong to this community")]
    UnknownId(ShapeId),

    #[error("shape {0} is missing from the requested order")]
    MissingId(ShapeId),

    /// No priority is left above `after` to keep the order strictly increasing.
    #[error("no sort priority left after {after}")]
    PriorityOverflow { after: i64 },
}

/// Derives a strictly increasing sequence from `priorities`.
///
/// A value is kept when it is greater than the previously chosen one;
/// otherwise it becomes `previous + 1`. Fails when that would pass
/// `i64::MAX`.
pub fn distinguishable_order(priorities: &[i64]) -> Result<Vec<i64>, ReorderError> {
    let mut chosen: Vec<i64> = Vec::with_capacity(priorities.len());
    for &priority in priorities {
        let next = match chosen.last() {
            Some(&previous) if priority <= previous => previous
                .checked_add(1)
                .ok_or(ReorderError::PriorityOverflow { after: previous })?,
            _ => priority,
        };
        chosen.push(next);
    }
    Ok(chosen)
}

/// Computes the priority updates that put `desired` into display order.
///
/// `current` is the community's snapshot in display order (ascending
/// priority, ties in storage order). `desired` must name exactly the same
/// shapes; anything else is rejected before any priority is computed.
pub fn reorder(
    current: &[(ShapeId, i64)],
    desired: &[ShapeId],
) -> Result<Vec<PriorityUpdate>, ReorderError> {
    check_permutation(current, desired)?;

    let original: HashMap<ShapeId, i64> = current.iter().copied().collect();
    let priorities: Vec<i64> = current.iter().map(|(_, priority)| *priority).collect();

    let updates = desired
        .iter()
        .zip(distinguishable_order(&priorities)?)
        .filter(|(id, priority)| original.get(*id) != Some(priority))
        .map(|(id, sort_priority)| PriorityUpdate {
            id: *id,
            sort_priority,
        })
        .collect();

    Ok(updates)
}

fn check_permutation(current: &[(ShapeId, i64)], desired: &[ShapeId]) -> Result<(), ReorderError> {
    let known: HashSet<ShapeId> = current.iter().map(|(id, _)| *id).collect();

    let mut seen = HashSet::with_capacity(desired.len());
    for id in desired {
        if !known.contains(id) {
            return Err(ReorderError::UnknownId(*id));
        }
        if !seen.insert(*id) {
            return Err(ReorderError::DuplicateId(*id));
        }
    }

    match current.iter().find(|(id, _)| !seen.contains(id)) {
        Some((missing, _)) => Err(ReorderError::MissingId(*missing)),
        None => Ok(()),
    }
}
