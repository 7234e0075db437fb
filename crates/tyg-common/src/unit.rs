//! Translation-unit identity and source ranges.
//!
//! A `CompilationUnitId` identifies one analyzed source unit; a
//! `CompilationUnitRange` pins a syntactic occurrence (a type reference or a
//! cast expression) to a byte range inside one unit. Both are supplied by
//! the upstream analysis pass and treated as opaque identity here.

/// Identity of one translation unit in a multi-unit analysis run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompilationUnitId(pub u32);

impl CompilationUnitId {
    /// Sentinel value for an invalid unit id.
    pub const INVALID: Self = Self(u32::MAX);

    /// Check if this id refers to a real unit.
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

/// Half-open byte range `[start, end)` in a source file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceRange {
    pub start: u32,
    pub end: u32,
}

impl SourceRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(self) -> bool {
        self.start >= self.end
    }
}

/// A source range anchored to its translation unit.
///
/// Two syntactic occurrences are the same occurrence iff unit and range both
/// match; this is the identity key for type-reference constraint variables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompilationUnitRange {
    pub unit: CompilationUnitId,
    pub range: SourceRange,
}

impl CompilationUnitRange {
    pub const fn new(unit: CompilationUnitId, range: SourceRange) -> Self {
        Self { unit, range }
    }
}
