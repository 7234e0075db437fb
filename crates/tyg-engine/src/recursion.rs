//! Recursion guard for structural decomposition.
//!
//! Walking a type's supertype/interface structure can revisit the same
//! binding through diamond hierarchies, and pathological (binary-only or
//! cyclic) hierarchies could otherwise fail to terminate. Each top-level
//! decomposition call owns one guard tracking visited binding keys; a
//! revisited key terminates that branch.
//!
//! A visit cap backstops the visited set: exceeding it means the hierarchy
//! is degenerate beyond anything real code produces, and the walk stops.

use rustc_hash::FxHashSet;
use tracing::warn;
use tyg_common::Atom;

/// Upper bound on distinct types visited by one decomposition call.
pub const DECOMPOSITION_VISIT_LIMIT: usize = 10_000;

/// Visited-set guard for one structural decomposition.
pub struct DecompositionGuard {
    visited: FxHashSet<Atom>,
    exceeded: bool,
}

impl Default for DecompositionGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl DecompositionGuard {
    pub fn new() -> Self {
        Self {
            visited: FxHashSet::default(),
            exceeded: false,
        }
    }

    /// Try to enter the type with the given binding key.
    ///
    /// Returns `false` if the key was already visited in this decomposition
    /// or the visit cap is exhausted; the caller must skip the branch.
    pub fn enter(&mut self, key: Atom) -> bool {
        if self.exceeded {
            return false;
        }
        if self.visited.len() >= DECOMPOSITION_VISIT_LIMIT {
            self.exceeded = true;
            warn!(
                limit = DECOMPOSITION_VISIT_LIMIT,
                "decomposition visit limit exceeded; truncating hierarchy walk"
            );
            return false;
        }
        self.visited.insert(key)
    }

    /// Whether the visit cap was hit.
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    /// Number of distinct types entered so far.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
