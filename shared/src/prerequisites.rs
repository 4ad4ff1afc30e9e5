//! Prerequisite lock evaluation for articles and learning paths
//!
//! An item is locked while any of its prerequisites lacks a completed
//! progress record for the requesting user. This is a set-membership check
//! only: prerequisite chains are not followed and cycles are not detected.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Result of evaluating an item's prerequisites
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockState {
    pub locked: bool,
    /// Prerequisites not yet completed, in declaration order
    pub missing: Vec<Uuid>,
}

impl LockState {
    pub fn unlocked() -> Self {
        Self::default()
    }
}

/// Evaluate the lock state of an item
///
/// Duplicate prerequisite ids count once.
pub fn evaluate_lock(prerequisites: &[Uuid], completed: &HashSet<Uuid>) -> LockState {
    let mut seen = HashSet::with_capacity(prerequisites.len());
    let missing: Vec<Uuid> = prerequisites
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .filter(|id| !completed.contains(id))
        .collect();

    LockState {
        locked: !missing.is_empty(),
        missing,
    }
}

/// Shorthand for `evaluate_lock(..).locked`
pub fn is_locked(prerequisites: &[Uuid], completed: &HashSet<Uuid>) -> bool {
    prerequisites.iter().any(|id| !completed.contains(id))
}
