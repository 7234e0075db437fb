//! Generic-Type-Argument Constraint Engine
//!
//! This crate builds the constraint graph that a downstream solver uses to
//! assign concrete type arguments to raw-type usages. It uses:
//!
//! - **Interning**: constraint variables and constraints are canonicalized
//!   by structural identity, so side data (used-in lists, element-variable
//!   maps) accumulates on one shared record per entity
//! - **Arena-indexed equivalence classes**: equality constraints merge
//!   variables into representative sets with index back-pointers, no
//!   dangling references on merge
//! - **Bounded structural decomposition**: generic supertype/interface
//!   hierarchies are walked with a visited-set guard, deriving per-type-
//!   parameter element variables and the equality constraints that make
//!   subtype relationships propagate into type arguments
//!
//! The engine only *builds* the graph. Solving it, resolving types, and
//! rewriting source are external concerns.

mod constraints;
mod elements;
mod environment;
mod equivalence;
mod model;
mod recursion;
mod variables;

pub use constraints::{ConstraintId, ConstraintOp, TypeConstraint};
pub use environment::{TypeEnvironment, TypeFacts, TypeId};
pub use equivalence::{EquivalenceClasses, EquivalenceRepresentative, RepId};
pub use model::ConstraintModel;
pub use recursion::DecompositionGuard;
pub use variables::{CastVariable, ConstraintVariable, CvFlags, CvId, CvKey, CvKind};
