//! Constraint variables.
//!
//! A constraint variable is a node representing "the type of something": a
//! declaration, an expression, a method parameter or return, a syntactic
//! type occurrence, or a synthesized placeholder. Variables live in an
//! arena addressed by `CvId`, and structural identity is captured by
//! `CvKey`, the lookup key of the interning table.
//!
//! The side data the original model kept in a string-keyed bag (used-in
//! list, owning unit, element-variable map, debug label) is typed fields
//! here; a whole class of wrong-key bugs cannot exist.

use crate::constraints::ConstraintId;
use crate::environment::TypeId;
use crate::equivalence::RepId;
use bitflags::bitflags;
use indexmap::IndexMap;
use smallvec::SmallVec;
use tyg_bindings::{MethodBindingId, VariableBindingId};
use tyg_common::{Atom, CompilationUnitId, CompilationUnitRange};

/// Handle to an interned constraint variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CvId(pub u32);

bitflags! {
    /// Per-variable flag set.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct CvFlags: u8 {
        /// Only meaningful inside the unit that created it; eligible for
        /// pruning at the next unit boundary if unused.
        const UNIT_SCOPED = 1 << 0;
    }
}

/// What a constraint variable stands for, with exactly the identity fields
/// each variant needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CvKind {
    /// Type of a variable declaration or reference.
    Variable { binding: VariableBindingId },
    /// Type of a syntactic type occurrence at a source range.
    TypeRef { range: CompilationUnitRange },
    /// Type of a formal parameter, keyed by (method, index).
    Parameter { method: MethodBindingId, index: u32 },
    /// Type of a method's return type.
    ReturnType { method: MethodBindingId },
    /// Free-standing type not tied to a program element (constants,
    /// structurally supplied type arguments). Keyed by its type.
    Independent,
    /// Type of an instantiated generic type. Keyed by its type.
    ParameterizedType,
    /// Type of a raw binding with no further structure. Keyed by its type.
    PlainType,
    /// One generic type parameter's argument on an owning variable.
    /// `declared_index` is the parameter's position in the owner's declared
    /// list, or `None` when inherited through a supertype/interface.
    /// Identity is (owner, type_param); the index is carried data.
    CollectionElement {
        owner: CvId,
        type_param: Atom,
        declared_index: Option<u32>,
    },
}

/// Structural identity of a constraint variable: the interning-table key.
///
/// Two variables are the same entity iff their keys are equal; this is the
/// explicit equality+hash strategy the interning tables are keyed by.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CvKey {
    Variable(VariableBindingId),
    TypeRef(CompilationUnitRange),
    Parameter(MethodBindingId, u32),
    ReturnType(MethodBindingId),
    Independent(TypeId),
    ParameterizedType(TypeId),
    PlainType(TypeId),
    CollectionElement(CvId, Atom),
}

/// An interned constraint variable.
#[derive(Clone, Debug)]
pub struct ConstraintVariable {
    pub kind: CvKind,
    /// Canonical type of the entity this variable stands for.
    pub ty: TypeId,
    /// Constraints referencing this variable. One constraint is the common
    /// case; the vector spills on the second.
    pub(crate) used_in: SmallVec<[ConstraintId; 1]>,
    /// Element variables, keyed by type-parameter identity key.
    pub(crate) element_vars: IndexMap<Atom, CvId>,
    /// Equivalence representative, if the variable participates in any
    /// equality constraint.
    pub(crate) representative: Option<RepId>,
    /// Owning translation unit (declared variants only).
    pub(crate) unit: Option<CompilationUnitId>,
    pub(crate) flags: CvFlags,
    /// Human-readable label; diagnostic only, never affects semantics.
    pub(crate) label: Option<String>,
}

impl ConstraintVariable {
    pub fn new(kind: CvKind, ty: TypeId) -> Self {
        Self {
            kind,
            ty,
            used_in: SmallVec::new(),
            element_vars: IndexMap::new(),
            representative: None,
            unit: None,
            flags: CvFlags::empty(),
            label: None,
        }
    }

    /// Structural identity key.
    pub fn key(&self) -> CvKey {
        match self.kind {
            CvKind::Variable { binding } => CvKey::Variable(binding),
            CvKind::TypeRef { range } => CvKey::TypeRef(range),
            CvKind::Parameter { method, index } => CvKey::Parameter(method, index),
            CvKind::ReturnType { method } => CvKey::ReturnType(method),
            CvKind::Independent => CvKey::Independent(self.ty),
            CvKind::ParameterizedType => CvKey::ParameterizedType(self.ty),
            CvKind::PlainType => CvKey::PlainType(self.ty),
            CvKind::CollectionElement {
                owner, type_param, ..
            } => CvKey::CollectionElement(owner, type_param),
        }
    }

    /// Constraints referencing this variable (empty when none).
    pub fn used_in(&self) -> &[ConstraintId] {
        &self.used_in
    }

    /// Element variables by type-parameter key, in derivation order.
    pub fn element_variables(&self) -> &IndexMap<Atom, CvId> {
        &self.element_vars
    }

    pub fn representative(&self) -> Option<RepId> {
        self.representative
    }

    /// Owning translation unit, set on declared variants.
    pub fn compilation_unit(&self) -> Option<CompilationUnitId> {
        self.unit
    }

    pub fn is_unit_scoped(&self) -> bool {
        self.flags.contains(CvFlags::UNIT_SCOPED)
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether this is a collection-element variable.
    pub fn is_element(&self) -> bool {
        matches!(self.kind, CvKind::CollectionElement { .. })
    }

    /// Whether this is an independent-type variable.
    pub fn is_independent(&self) -> bool {
        matches!(self.kind, CvKind::Independent)
    }
}

/// A syntactic cast's target type and the expression variable being cast.
/// Cast variables are kept in a plain ordered list: never interned, never
/// pruned, never shared.
#[derive(Copy, Clone, Debug)]
pub struct CastVariable {
    pub ty: TypeId,
    pub range: CompilationUnitRange,
    pub expression: CvId,
}
