//! Common types and utilities for the tyg constraint engine.
//!
//! This crate provides foundational types used across all tyg crates:
//! - String interning (`Atom`, `Interner`) for binding keys and names
//! - Translation-unit identity (`CompilationUnitId`)
//! - Source ranges (`SourceRange`, `CompilationUnitRange`)

// String interning for key/name deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Unit identity and source ranges
pub mod unit;
pub use unit::{CompilationUnitId, CompilationUnitRange, SourceRange};
