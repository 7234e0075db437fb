//! Type constraints.
//!
//! A constraint is a binary relation between two canonical variables,
//! tagged with an operator. Equality is deliberately *not* an operator
//! here: equal variables are merged into equivalence representatives
//! instead of being stored as edges, so the main constraint table only
//! ever holds subtype edges.

use crate::variables::CvId;

/// Handle to an interned constraint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConstraintId(pub u32);

/// Constraint operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintOp {
    /// Left must be a subtype of right.
    Subtype,
}

/// A directed relation between two canonical constraint variables.
///
/// Operands are canonical ids, so structural equality of constraints is
/// plain tuple equality; the interning table is keyed by `key()`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeConstraint {
    pub left: CvId,
    pub right: CvId,
    pub op: ConstraintOp,
}

impl TypeConstraint {
    pub const fn new(left: CvId, right: CvId, op: ConstraintOp) -> Self {
        Self { left, right, op }
    }

    /// Interning-table key.
    pub const fn key(&self) -> (CvId, CvId, ConstraintOp) {
        (self.left, self.right, self.op)
    }

    /// Whether the constraint references the given variable.
    pub fn references(&self, cv: CvId) -> bool {
        self.left == cv || self.right == cv
    }
}
