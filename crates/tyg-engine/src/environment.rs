//! Canonical type representations.
//!
//! The engine never compares opaque `TypeBindingId`s structurally; it asks
//! the `TypeEnvironment` for a canonical `TypeId` once and compares handles
//! from then on (O(1) equality via interning). The environment also caches
//! the two facts the engine queries constantly: primitiveness and
//! generic-ness.

use rustc_hash::FxHashMap;
use tracing::trace;
use tyg_bindings::{BindingStore, TypeBindingId};
use tyg_common::Atom;

/// Canonical handle for a type, one per structurally distinct binding key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

/// Cached facts about a canonical type.
#[derive(Clone, Debug)]
pub struct TypeFacts {
    /// The binding this type was created from (first registration wins).
    pub binding: TypeBindingId,
    /// Stable identity key of the binding.
    pub key: Atom,
    /// Generic, parameterized, or raw.
    pub is_generic: bool,
    pub is_primitive: bool,
}

/// Lookup/caching collaborator mapping bindings to canonical `TypeId`s.
pub struct TypeEnvironment {
    by_key: FxHashMap<Atom, TypeId>,
    types: Vec<TypeFacts>,
}

impl Default for TypeEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeEnvironment {
    pub fn new() -> Self {
        Self {
            by_key: FxHashMap::default(),
            types: Vec::new(),
        }
    }

    /// Canonicalize a binding. Returns the existing handle for a key seen
    /// before, or registers a new one. `None` when the binding is unknown
    /// to the store (upstream resolution failure — treated as absence).
    pub fn create(&mut self, store: &BindingStore, binding: TypeBindingId) -> Option<TypeId> {
        let b = store.type_binding(binding)?;
        if let Some(&id) = self.by_key.get(&b.key) {
            return Some(id);
        }
        let id = TypeId(self.types.len() as u32);
        trace!(id = id.0, "TypeEnvironment::create");
        self.by_key.insert(b.key, id);
        self.types.push(TypeFacts {
            binding,
            key: b.key,
            is_generic: b.is_a_generic_type(),
            is_primitive: b.is_primitive(),
        });
        Some(id)
    }

    /// Facts for a canonical type.
    pub fn facts(&self, id: TypeId) -> Option<&TypeFacts> {
        self.types.get(id.0 as usize)
    }

    /// Whether the canonical type is generic, parameterized, or raw.
    pub fn is_a_generic_type(&self, id: TypeId) -> bool {
        self.facts(id).map(|f| f.is_generic).unwrap_or(false)
    }

    /// The binding a canonical type was registered from.
    pub fn binding(&self, id: TypeId) -> Option<TypeBindingId> {
        self.facts(id).map(|f| f.binding)
    }

    /// Number of canonical types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
