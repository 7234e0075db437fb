//! Element variables and supertype decomposition.
//!
//! Every variable whose type is generic carries one element variable per
//! reachable type parameter, including parameters inherited through the
//! superclass chain and implemented interfaces. The walk also derives the
//! equality constraints that tie inherited parameters to the parameters of
//! the subtype (`List<E> extends Collection<E>` makes the two `E`s one
//! equivalence class on any owner).
//!
//! Split out of `model.rs` because the recursion has its own shape: a
//! [`DecompositionGuard`] bounds the supertype walk on cyclic or degenerate
//! binding graphs.

use crate::model::ConstraintModel;
use crate::recursion::DecompositionGuard;
use crate::variables::{ConstraintVariable, CvId, CvKind};
use tracing::trace;
use tyg_bindings::{Genericity, TypeBindingId, TypeBindingKind, TypeParamId};
use tyg_common::Atom;

impl<'a> ConstraintModel<'a> {
    /// Derive element variables for `owner` from its type binding, walking
    /// the whole supertype graph.
    pub(crate) fn make_element_variables_for(&mut self, owner: CvId, binding: TypeBindingId) {
        let mut guard = DecompositionGuard::new();
        self.make_element_variables_inner(owner, binding, true, &mut guard);
    }

    fn make_element_variables_inner(
        &mut self,
        owner: CvId,
        binding: TypeBindingId,
        is_declaration: bool,
        guard: &mut DecompositionGuard,
    ) {
        let Some(b) = self.store.type_binding(binding) else {
            return;
        };
        if !guard.enter(b.key) {
            return;
        }

        if self.store.is_a_generic_type(binding) {
            let params = self.store.declared_type_parameters(binding);
            for (i, param) in params.into_iter().enumerate() {
                let declared_index = is_declaration.then_some(i as u32);
                self.make_element_variable(owner, param, declared_index);
                // TODO: subtype constraints for type parameters with declared bounds
            }
        }

        // Supertypes hang off the generic declaration, not the reference.
        let declaration = self.store.declaration_of(binding);
        let Some(decl) = self.store.type_binding(declaration) else {
            return;
        };
        if let Some(superclass) = decl.superclass {
            self.make_element_variables_inner(owner, superclass, false, guard);
            self.create_type_variables_equality_constraints(owner, owner, superclass);
        }
        for interface in decl.interfaces {
            self.make_element_variables_inner(owner, interface, false, guard);
            self.create_type_variables_equality_constraints(owner, owner, interface);
        }
    }

    /// The element variable of `owner` for one declared type parameter,
    /// creating it on first request.
    ///
    /// `declared_index` is the parameter's position when `owner`'s own type
    /// declares it, `None` when it is inherited from a supertype. The index
    /// is carried data only; identity is (owner, parameter key), so a
    /// declared and an inherited sighting of the same parameter are one
    /// variable.
    pub(crate) fn make_element_variable(
        &mut self,
        owner: CvId,
        param: TypeParamId,
        declared_index: Option<u32>,
    ) -> Option<CvId> {
        let param_rec = self.store.type_param(param)?;
        let key = param_rec.key;
        if let Some(&existing) = self.var(owner).element_variables().get(&key) {
            return Some(existing);
        }
        if !self.env.is_a_generic_type(self.var(owner).ty) {
            return None;
        }

        let ty = self.env.create(self.store, param_rec.binding)?;
        let (id, _) = self.intern_variable(ConstraintVariable::new(
            CvKind::CollectionElement {
                owner,
                type_param: key,
                declared_index,
            },
            ty,
        ));
        trace!(owner = owner.0, element = id.0, "ConstraintModel::make_element_variable");
        let previous = self.var_mut(owner).element_vars.insert(key, id);
        assert!(
            previous.is_none() || previous == Some(id),
            "conflicting element variable for one type parameter"
        );
        Some(id)
    }

    /// Derive equality constraints from a parameterized (or raw) reference.
    ///
    /// For each declared parameter of the referenced declaration, paired
    /// with the reference's type argument at the same position:
    /// - a type-variable argument resolves to the matching element variable
    ///   of `expression_cv` (the inheriting side)
    /// - a wildcard argument constrains nothing
    /// - any other argument becomes an independent type variable
    ///
    /// and the result is equated with the element variable of
    /// `reference_cv` for that parameter. Raw references carry no type
    /// arguments, so they contribute no equalities.
    pub fn create_type_variables_equality_constraints(
        &mut self,
        expression_cv: CvId,
        reference_cv: CvId,
        reference: TypeBindingId,
    ) {
        let Some(b) = self.store.type_binding(reference) else {
            return;
        };
        if !matches!(b.genericity, Genericity::Parameterized | Genericity::Raw) {
            return;
        }

        let params = self.store.declared_type_parameters(reference);
        for (param, arg) in params.into_iter().zip(b.type_arguments.iter().copied()) {
            let Some(param_rec) = self.store.type_param(param) else {
                continue;
            };
            let param_cv = self.element_variable_by_key(reference_cv, param_rec.key);

            let Some(arg_binding) = self.store.type_binding(arg) else {
                continue;
            };
            let arg_cv = match arg_binding.kind {
                TypeBindingKind::TypeVariable => {
                    self.element_variable_by_key(expression_cv, arg_binding.key)
                }
                TypeBindingKind::Wildcard => None,
                _ => self.make_independent_type_variable(arg),
            };

            self.add_equals(param_cv, arg_cv);
        }
    }

    /// The element variable of `owner` for a declared type parameter, if
    /// one was derived.
    pub fn element_variable(&self, owner: CvId, param: TypeParamId) -> Option<CvId> {
        let key = self.store.type_param(param)?.key;
        self.element_variable_by_key(owner, key)
    }

    /// Element-variable lookup by type-parameter identity key.
    pub fn element_variable_by_key(&self, owner: CvId, key: Atom) -> Option<CvId> {
        self.variable(owner)?.element_variables().get(&key).copied()
    }

    /// All element variables of `owner`, in derivation order.
    pub fn element_variables_of(&self, owner: CvId) -> Vec<(Atom, CvId)> {
        self.variable(owner)
            .map(|v| v.element_variables().iter().map(|(k, v)| (*k, *v)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "tests/elements_tests.rs"]
mod tests;
