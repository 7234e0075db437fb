//! The constraint model.
//!
//! `ConstraintModel` owns every table of the engine: the variable and
//! constraint interning tables, the equivalence-class arena, the cast-
//! variable list, and the per-unit accumulators. It is created once per
//! analysis run and driven unit by unit: the analysis pass calls the
//! factories and `create_subtype_constraint` while walking one translation
//! unit, then `begin_unit` before the next.
//!
//! Responsibilities:
//! - Canonicalize variables and constraints by structural identity
//! - Record used-in back-edges on both operands of every kept constraint
//! - Merge equality-constrained variables into equivalence representatives
//! - Track per-unit novelty and prune stale unit-scoped variables
//!
//! Element-variable derivation lives in `elements.rs`; this file is the
//! graph bookkeeping and the variable factories.

use crate::constraints::{ConstraintId, ConstraintOp, TypeConstraint};
use crate::environment::TypeEnvironment;
use crate::equivalence::{EquivalenceClasses, EquivalenceRepresentative, RepId};
use crate::variables::{CastVariable, ConstraintVariable, CvFlags, CvId, CvKey, CvKind};
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use tracing::trace;
use tyg_bindings::{BindingStore, MethodBindingId, TypeBindingId, VariableBindingId};
use tyg_common::{CompilationUnitId, CompilationUnitRange};

/// Constraint-graph model for one analysis run.
pub struct ConstraintModel<'a> {
    pub(crate) store: &'a BindingStore,
    pub(crate) env: TypeEnvironment,

    /// Variable arena; pruned slots are tombstoned so surviving ids stay
    /// stable.
    variables: Vec<Option<ConstraintVariable>>,
    variable_ids: FxHashMap<CvKey, CvId>,

    constraints: Vec<TypeConstraint>,
    constraint_ids: FxHashMap<(CvId, CvId, ConstraintOp), ConstraintId>,

    equivalence: EquivalenceClasses,
    cast_variables: Vec<CastVariable>,

    /// Variables scoped to the unit currently being processed.
    unit_scoped: IndexSet<CvId>,

    /// Deltas for the current unit.
    new_constraints: Vec<ConstraintId>,
    new_variables: Vec<CvId>,

    /// Store human-readable labels on newly interned variables. Diagnostic
    /// only; must never affect constraint semantics.
    store_labels: bool,
}

impl<'a> ConstraintModel<'a> {
    pub fn new(store: &'a BindingStore) -> Self {
        Self {
            store,
            env: TypeEnvironment::new(),
            variables: Vec::new(),
            variable_ids: FxHashMap::default(),
            constraints: Vec::new(),
            constraint_ids: FxHashMap::default(),
            equivalence: EquivalenceClasses::new(),
            cast_variables: Vec::new(),
            unit_scoped: IndexSet::new(),
            new_constraints: Vec::new(),
            new_variables: Vec::new(),
            store_labels: cfg!(debug_assertions),
        }
    }

    /// Toggle label storage. For diagnostics and tests only.
    pub fn set_store_labels(&mut self, store: bool) {
        self.store_labels = store;
    }

    /// The type environment backing this model.
    pub fn type_environment(&self) -> &TypeEnvironment {
        &self.env
    }

    // -------------------------------------------------------------------------
    // Variable interning
    // -------------------------------------------------------------------------

    /// Look up a variable. `None` for out-of-range or pruned ids.
    pub fn variable(&self, id: CvId) -> Option<&ConstraintVariable> {
        self.variables.get(id.0 as usize).and_then(|v| v.as_ref())
    }

    pub(crate) fn var(&self, id: CvId) -> &ConstraintVariable {
        self.variables[id.0 as usize]
            .as_ref()
            .expect("constraint variable was pruned")
    }

    pub(crate) fn var_mut(&mut self, id: CvId) -> &mut ConstraintVariable {
        self.variables[id.0 as usize]
            .as_mut()
            .expect("constraint variable was pruned")
    }

    /// Canonicalize a freshly built variable.
    ///
    /// Returns the canonical id and whether the input was newly stored
    /// (`false` means a structurally equal variable already existed and the
    /// input was discarded). Newly stored variables are appended to the
    /// current unit's delta.
    pub(crate) fn intern_variable(&mut self, cv: ConstraintVariable) -> (CvId, bool) {
        let key = cv.key();
        if let Some(&id) = self.variable_ids.get(&key) {
            return (id, false);
        }
        let id = CvId(self.variables.len() as u32);
        trace!(id = id.0, kind = ?cv.kind, "ConstraintModel::intern_variable");
        self.variables.push(Some(cv));
        self.variable_ids.insert(key, id);
        self.new_variables.push(id);
        (id, true)
    }

    pub(crate) fn mark_unit_scoped(&mut self, id: CvId) {
        self.var_mut(id).flags |= CvFlags::UNIT_SCOPED;
        self.unit_scoped.insert(id);
    }

    // -------------------------------------------------------------------------
    // Constraint creation
    // -------------------------------------------------------------------------

    /// Whether a constraint between the two canonical operands is worth
    /// storing.
    ///
    /// The policy is deliberately literal (solver correctness downstream
    /// depends on the exact keep/drop boundary):
    /// - same canonical variable: drop (vacuous)
    /// - either operand a collection-element variable: keep
    /// - either operand an independent-type variable: keep
    /// - either operand's declared type generic/parameterized/raw: keep
    /// - otherwise: drop (noise between non-generic plain types)
    fn keep(&self, cv1: CvId, cv2: CvId) -> bool {
        if cv1 == cv2 {
            return false;
        }
        // Distinct ids with equal structure mean an uninterned duplicate
        // leaked past the factories; continuing would corrupt interning.
        assert!(
            self.var(cv1).key() != self.var(cv2).key(),
            "structurally equal constraint operands with distinct identity"
        );

        let a = self.var(cv1);
        let b = self.var(cv2);
        if a.is_element() || b.is_element() {
            return true;
        }
        if a.is_independent() || b.is_independent() {
            return true;
        }
        if self.env.is_a_generic_type(a.ty) || self.env.is_a_generic_type(b.ty) {
            return true;
        }
        false
    }

    /// Create (or find) the subtype constraint `cv1 <= cv2`.
    ///
    /// No-op when either operand is absent or the filter rejects the pair.
    pub fn create_subtype_constraint(&mut self, cv1: Option<CvId>, cv2: Option<CvId>) {
        let (Some(left), Some(right)) = (cv1, cv2) else {
            return;
        };
        self.create_simple_constraint(left, right, ConstraintOp::Subtype);
    }

    fn create_simple_constraint(&mut self, left: CvId, right: CvId, op: ConstraintOp) {
        if !self.keep(left, right) {
            return;
        }

        let key = (left, right, op);
        let id = match self.constraint_ids.get(&key) {
            Some(&id) => id,
            None => {
                let id = ConstraintId(self.constraints.len() as u32);
                trace!(id = id.0, ?left, ?right, "ConstraintModel::create_simple_constraint");
                self.constraints.push(TypeConstraint::new(left, right, op));
                self.constraint_ids.insert(key, id);
                self.new_constraints.push(id);
                id
            }
        };

        self.register_used_in(left, id);
        self.register_used_in(right, id);
    }

    fn register_used_in(&mut self, cv: CvId, constraint: ConstraintId) {
        let used_in = &mut self.var_mut(cv).used_in;
        if !used_in.contains(&constraint) {
            used_in.push(constraint);
        }
    }

    /// Constraints referencing the variable (empty when none).
    pub fn used_in(&self, cv: CvId) -> &[ConstraintId] {
        self.variable(cv).map(|v| v.used_in()).unwrap_or(&[])
    }

    /// Look up a stored constraint.
    pub fn constraint(&self, id: ConstraintId) -> Option<&TypeConstraint> {
        self.constraints.get(id.0 as usize)
    }

    // -------------------------------------------------------------------------
    // Equality / equivalence classes
    // -------------------------------------------------------------------------

    /// Record that two variables must have equal types.
    ///
    /// No-op when either is absent or both are the same canonical variable.
    /// Otherwise merges their equivalence classes, creating, extending, or
    /// absorbing representatives as needed.
    pub fn add_equals(&mut self, v1: Option<CvId>, v2: Option<CvId>) {
        let (Some(left), Some(right)) = (v1, v2) else {
            return;
        };
        if left == right {
            return;
        }

        let left_rep = self.var(left).representative;
        let right_rep = self.var(right).representative;
        match (left_rep, right_rep) {
            (None, None) => {
                let rep = self.equivalence.create(left, right);
                self.var_mut(left).representative = Some(rep);
                self.var_mut(right).representative = Some(rep);
            }
            (None, Some(rep)) => {
                self.equivalence.add_member(rep, left);
                self.var_mut(left).representative = Some(rep);
            }
            (Some(rep), None) => {
                self.equivalence.add_member(rep, right);
                self.var_mut(right).representative = Some(rep);
            }
            (Some(l), Some(r)) if l == r => {}
            (Some(l), Some(r)) => {
                for absorbed in self.equivalence.merge(l, r) {
                    self.var_mut(absorbed).representative = Some(l);
                }
            }
        }
    }

    /// A live equivalence representative.
    pub fn representative(&self, id: RepId) -> Option<&EquivalenceRepresentative> {
        self.equivalence.get(id)
    }

    // -------------------------------------------------------------------------
    // Unit lifecycle
    // -------------------------------------------------------------------------

    /// Start processing the next translation unit.
    ///
    /// Clears the per-unit delta accumulators, prunes unit-scoped variables
    /// from the previous unit that no constraint or element derivation ever
    /// referenced, and resets the scoped set.
    pub fn begin_unit(&mut self) {
        self.new_constraints.clear();
        self.new_variables.clear();
        self.prune_unused_unit_scoped();
        self.unit_scoped.clear();
    }

    fn prune_unused_unit_scoped(&mut self) {
        let scoped: Vec<CvId> = self.unit_scoped.iter().copied().collect();
        for id in scoped {
            let Some(var) = self.variables[id.0 as usize].as_ref() else {
                continue;
            };
            if var.used_in.is_empty() && var.element_vars.is_empty() {
                let key = var.key();
                trace!(id = id.0, "ConstraintModel::prune unit-scoped variable");
                self.variable_ids.remove(&key);
                self.variables[id.0 as usize] = None;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Snapshot accessors (downstream/solver interface)
    // -------------------------------------------------------------------------

    /// All live constraint variables.
    pub fn all_constraint_variables(&self) -> Vec<CvId> {
        self.variables
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|_| CvId(i as u32)))
            .collect()
    }

    /// All live equivalence representatives.
    pub fn equivalence_representatives(&self) -> Vec<RepId> {
        self.equivalence.live()
    }

    /// All cast variables, in creation order.
    pub fn cast_variables(&self) -> Vec<CastVariable> {
        self.cast_variables.clone()
    }

    /// Constraints first stored during the current unit.
    pub fn new_type_constraints(&self) -> Vec<ConstraintId> {
        self.new_constraints.clone()
    }

    /// Variables first interned during the current unit.
    pub fn new_constraint_variables(&self) -> Vec<CvId> {
        self.new_variables.clone()
    }

    // -------------------------------------------------------------------------
    // Variable factories
    // -------------------------------------------------------------------------

    fn set_label(&mut self, id: CvId, label: String) {
        if self.store_labels {
            self.var_mut(id).label = Some(label);
        }
    }

    /// Variable for the type of a variable declaration or reference.
    pub fn make_variable_variable(&mut self, binding: VariableBindingId) -> Option<CvId> {
        let variable = self.store.variable(binding)?;
        if self.store.is_primitive(variable.ty) {
            return None;
        }
        let ty = self.env.create(self.store, variable.ty)?;
        let (id, is_new) = self.intern_variable(ConstraintVariable::new(
            CvKind::Variable { binding },
            ty,
        ));
        if is_new {
            self.make_element_variables_for(id, variable.ty);
            self.set_label(id, format!("[{}]", self.store.resolve(variable.name)));
        }
        Some(id)
    }

    /// Declared form of [`make_variable_variable`]: binds the owning unit
    /// and unit-scopes non-field declarations.
    ///
    /// [`make_variable_variable`]: Self::make_variable_variable
    pub fn make_declared_variable_variable(
        &mut self,
        binding: VariableBindingId,
        unit: CompilationUnitId,
    ) -> Option<CvId> {
        let id = self.make_variable_variable(binding)?;
        self.var_mut(id).unit = Some(unit);
        let variable = self.store.variable(binding)?;
        if !variable.is_field {
            self.mark_unit_scoped(id);
        }
        Some(id)
    }

    /// Variable for a syntactic type occurrence. Always unit-scoped.
    pub fn make_type_variable(
        &mut self,
        binding: TypeBindingId,
        range: CompilationUnitRange,
    ) -> Option<CvId> {
        if self.store.is_primitive(binding) {
            return None;
        }
        let ty = self.env.create(self.store, binding)?;
        let (id, is_new) =
            self.intern_variable(ConstraintVariable::new(CvKind::TypeRef { range }, ty));
        if is_new {
            self.mark_unit_scoped(id);
            if self.store.is_a_generic_type(binding) {
                self.make_element_variables_for(id, binding);
            }
            let name = self
                .store
                .type_binding(binding)
                .map(|b| self.store.resolve(b.name))
                .unwrap_or_default();
            self.set_label(id, name);
        }
        Some(id)
    }

    /// Free-standing variable for a type not tied to a program element.
    ///
    /// Element variables are deliberately not derived here; independent
    /// variables are created *during* decomposition and recursing back in
    /// would be unbounded.
    pub fn make_independent_type_variable(&mut self, binding: TypeBindingId) -> Option<CvId> {
        if self.store.is_primitive(binding) {
            return None;
        }
        let ty = self.env.create(self.store, binding)?;
        let (id, is_new) = self.intern_variable(ConstraintVariable::new(CvKind::Independent, ty));
        if is_new {
            let name = self
                .store
                .type_binding(binding)
                .map(|b| self.store.resolve(b.name))
                .unwrap_or_default();
            self.set_label(id, format!("IndependentType({name})"));
        }
        Some(id)
    }

    /// Variable for an instantiated generic type.
    pub fn make_parameterized_type_variable(&mut self, binding: TypeBindingId) -> Option<CvId> {
        if self.store.is_primitive(binding) {
            return None;
        }
        let ty = self.env.create(self.store, binding)?;
        let (id, is_new) =
            self.intern_variable(ConstraintVariable::new(CvKind::ParameterizedType, ty));
        if is_new {
            self.make_element_variables_for(id, binding);
            let name = self
                .store
                .type_binding(binding)
                .map(|b| self.store.resolve(b.name))
                .unwrap_or_default();
            self.set_label(id, format!("ParameterizedType({name})"));
        }
        Some(id)
    }

    /// Variable for a method's formal parameter type.
    pub fn make_parameter_type_variable(
        &mut self,
        method: MethodBindingId,
        index: u32,
    ) -> Option<CvId> {
        let m = self.store.method(method)?;
        let param_ty = *m.parameter_types.get(index as usize)?;
        if self.store.is_primitive(param_ty) {
            return None;
        }
        let ty = self.env.create(self.store, param_ty)?;
        let (id, is_new) =
            self.intern_variable(ConstraintVariable::new(CvKind::Parameter { method, index }, ty));
        if is_new {
            self.make_element_variables_for(id, param_ty);
            self.set_label(
                id,
                format!("[Parameter({index},{})]", self.store.resolve(m.name)),
            );
        }
        Some(id)
    }

    /// Declared form of [`make_parameter_type_variable`]: binds the owning
    /// unit and unit-scopes parameters of local-class or private methods.
    ///
    /// [`make_parameter_type_variable`]: Self::make_parameter_type_variable
    pub fn make_declared_parameter_type_variable(
        &mut self,
        method: MethodBindingId,
        index: u32,
        unit: CompilationUnitId,
    ) -> Option<CvId> {
        let id = self.make_parameter_type_variable(method, index)?;
        self.var_mut(id).unit = Some(unit);
        let m = self.store.method(method)?;
        if self.store.method_in_local_class(method) || m.is_private {
            self.mark_unit_scoped(id);
        }
        Some(id)
    }

    /// Variable for a method's return type.
    pub fn make_return_type_variable(&mut self, method: MethodBindingId) -> Option<CvId> {
        let m = self.store.method(method)?;
        if self.store.is_primitive(m.return_type) {
            return None;
        }
        let ty = self.env.create(self.store, m.return_type)?;
        let (id, is_new) =
            self.intern_variable(ConstraintVariable::new(CvKind::ReturnType { method }, ty));
        if is_new {
            self.make_element_variables_for(id, m.return_type);
            self.set_label(id, format!("[ReturnType({})]", self.store.resolve(m.name)));
        }
        Some(id)
    }

    /// Declared form of [`make_return_type_variable`]: binds the owning
    /// unit and unit-scopes returns of local-class methods.
    ///
    /// [`make_return_type_variable`]: Self::make_return_type_variable
    pub fn make_declared_return_type_variable(
        &mut self,
        method: MethodBindingId,
        unit: CompilationUnitId,
    ) -> Option<CvId> {
        let id = self.make_return_type_variable(method)?;
        self.var_mut(id).unit = Some(unit);
        if self.store.method_in_local_class(method) {
            self.mark_unit_scoped(id);
        }
        Some(id)
    }

    /// Variable for a raw type binding with no further structure.
    /// No element variables, no label.
    pub fn make_plain_type_variable(&mut self, binding: TypeBindingId) -> Option<CvId> {
        if self.store.is_primitive(binding) {
            return None;
        }
        let ty = self.env.create(self.store, binding)?;
        let (id, _) = self.intern_variable(ConstraintVariable::new(CvKind::PlainType, ty));
        Some(id)
    }

    /// Record a cast: target type plus the expression variable being cast.
    /// Cast variables are appended to a plain list, never interned or
    /// pruned. Returns the index into [`cast_variables`].
    ///
    /// [`cast_variables`]: Self::cast_variables
    pub fn make_cast_variable(
        &mut self,
        binding: TypeBindingId,
        range: CompilationUnitRange,
        expression: CvId,
    ) -> Option<usize> {
        if self.store.is_primitive(binding) {
            return None;
        }
        let ty = self.env.create(self.store, binding)?;
        let index = self.cast_variables.len();
        self.cast_variables.push(CastVariable {
            ty,
            range,
            expression,
        });
        Some(index)
    }
}

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod tests;
