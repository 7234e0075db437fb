//! Thread-safe storage for bindings.
//!
//! The resolution pass registers bindings as it resolves program elements;
//! the engine reads them. Registration is deduplicated on the stable `key`,
//! so re-resolving the same element in a later translation unit hands back
//! the id allocated the first time.

use crate::binding::{
    Genericity, MethodBinding, MethodBindingId, TypeBinding, TypeBindingId, TypeParam, TypeParamId,
    VariableBinding, VariableBindingId,
};
use dashmap::DashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;
use tyg_common::{Atom, Interner};

/// Thread-safe registry of resolved bindings.
///
/// Uses `DashMap` so a resolution pass may fill it from multiple threads;
/// the engine itself reads it single-threaded.
///
/// ## Usage
///
/// ```
/// use tyg_bindings::{BindingStore, TypeBinding};
///
/// let store = BindingStore::new();
/// let name = store.intern("String");
/// let key = store.intern("Ljava/lang/String;");
/// let id = store.register_type(TypeBinding::class(name, key));
/// assert_eq!(store.register_type(TypeBinding::class(name, key)), id);
/// ```
pub struct BindingStore {
    names: RwLock<Interner>,

    types: DashMap<TypeBindingId, TypeBinding>,
    types_by_key: DashMap<Atom, TypeBindingId>,
    next_type: AtomicU32,

    methods: DashMap<MethodBindingId, MethodBinding>,
    methods_by_key: DashMap<Atom, MethodBindingId>,
    next_method: AtomicU32,

    variables: DashMap<VariableBindingId, VariableBinding>,
    variables_by_key: DashMap<Atom, VariableBindingId>,
    next_variable: AtomicU32,

    type_params: DashMap<TypeParamId, TypeParam>,
    next_type_param: AtomicU32,
}

impl Default for BindingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let mut interner = Interner::new();
        interner.intern_common();
        Self {
            names: RwLock::new(interner),
            types: DashMap::new(),
            types_by_key: DashMap::new(),
            next_type: AtomicU32::new(TypeBindingId::FIRST_VALID),
            methods: DashMap::new(),
            methods_by_key: DashMap::new(),
            next_method: AtomicU32::new(MethodBindingId::FIRST_VALID),
            variables: DashMap::new(),
            variables_by_key: DashMap::new(),
            next_variable: AtomicU32::new(VariableBindingId::FIRST_VALID),
            type_params: DashMap::new(),
            next_type_param: AtomicU32::new(TypeParamId::FIRST_VALID),
        }
    }

    // -------------------------------------------------------------------------
    // String interning
    // -------------------------------------------------------------------------

    /// Intern a string, returning its atom.
    pub fn intern(&self, s: &str) -> Atom {
        match self.names.write() {
            Ok(mut names) => names.intern(s),
            Err(_) => Atom::NONE,
        }
    }

    /// Resolve an atom to its owned string (empty for invalid atoms).
    pub fn resolve(&self, atom: Atom) -> String {
        self.names
            .read()
            .map(|names| names.resolve(atom).to_string())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Type bindings
    // -------------------------------------------------------------------------

    /// Register a type binding, deduplicating on its key.
    pub fn register_type(&self, binding: TypeBinding) -> TypeBindingId {
        if let Some(existing) = self.types_by_key.get(&binding.key) {
            return *existing;
        }
        let id = TypeBindingId(self.next_type.fetch_add(1, Ordering::SeqCst));
        trace!(id = id.0, kind = ?binding.kind, "BindingStore::register_type");
        self.types_by_key.insert(binding.key, id);
        self.types.insert(id, binding);
        id
    }

    /// Look up a type binding.
    pub fn type_binding(&self, id: TypeBindingId) -> Option<TypeBinding> {
        self.types.get(&id).map(|r| r.clone())
    }

    /// Register a parameterized reference `declaration<args...>`.
    ///
    /// The reference shares the declaration's kind and supertype structure;
    /// its key is derived from the declaration key and the argument keys so
    /// `List<String>` registered twice is one binding.
    pub fn parameterized(&self, declaration: TypeBindingId, args: Vec<TypeBindingId>) -> TypeBindingId {
        let Some(decl) = self.type_binding(declaration) else {
            return TypeBindingId::INVALID;
        };
        let mut key = self.resolve(decl.key);
        key.push('<');
        for arg in &args {
            if let Some(a) = self.type_binding(*arg) {
                key.push_str(&self.resolve(a.key));
            }
            key.push(';');
        }
        key.push('>');
        let key = self.intern(&key);
        let binding = TypeBinding {
            genericity: Genericity::Parameterized,
            type_parameters: Vec::new(),
            type_arguments: args,
            declaration: Some(declaration),
            ..TypeBinding { key, ..decl }
        };
        self.register_type(binding)
    }

    /// Register a raw reference to a generic declaration (`List` used raw).
    pub fn raw(&self, declaration: TypeBindingId) -> TypeBindingId {
        let Some(decl) = self.type_binding(declaration) else {
            return TypeBindingId::INVALID;
        };
        let key = self.intern(&format!("{}#RAW", self.resolve(decl.key)));
        let binding = TypeBinding {
            genericity: Genericity::Raw,
            type_parameters: Vec::new(),
            type_arguments: Vec::new(),
            declaration: Some(declaration),
            ..TypeBinding { key, ..decl }
        };
        self.register_type(binding)
    }

    /// Whether the type is generic, parameterized, or raw.
    pub fn is_a_generic_type(&self, id: TypeBindingId) -> bool {
        self.types
            .get(&id)
            .map(|t| t.is_a_generic_type())
            .unwrap_or(false)
    }

    /// Whether the type is primitive.
    pub fn is_primitive(&self, id: TypeBindingId) -> bool {
        self.types.get(&id).map(|t| t.is_primitive()).unwrap_or(false)
    }

    /// The generic declaration behind a reference (`List<String>` → `List<E>`).
    /// Declarations answer with themselves.
    pub fn declaration_of(&self, id: TypeBindingId) -> TypeBindingId {
        self.types
            .get(&id)
            .and_then(|t| t.declaration)
            .unwrap_or(id)
    }

    /// Declared type parameters, resolved through the declaration.
    pub fn declared_type_parameters(&self, id: TypeBindingId) -> Vec<TypeParamId> {
        let decl = self.declaration_of(id);
        self.types
            .get(&decl)
            .map(|t| t.type_parameters.clone())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Type parameters
    // -------------------------------------------------------------------------

    /// Register a declared type parameter, creating its type-variable binding.
    ///
    /// `key` must be unique per declaration site (e.g. `Ljava/util/List;:TE;`).
    pub fn type_parameter(&self, name: Atom, key: Atom) -> TypeParamId {
        let binding = self.register_type(TypeBinding::type_variable(name, key));
        let id = TypeParamId(self.next_type_param.fetch_add(1, Ordering::SeqCst));
        trace!(id = id.0, "BindingStore::type_parameter");
        self.type_params.insert(
            id,
            TypeParam {
                name,
                key,
                binding,
                bounds: Vec::new(),
            },
        );
        id
    }

    /// Look up a type parameter.
    pub fn type_param(&self, id: TypeParamId) -> Option<TypeParam> {
        self.type_params.get(&id).map(|r| r.clone())
    }

    /// Set the bounds of a declared type parameter.
    pub fn set_type_param_bounds(&self, id: TypeParamId, bounds: Vec<TypeBindingId>) {
        if let Some(mut param) = self.type_params.get_mut(&id) {
            param.bounds = bounds;
        }
    }

    // -------------------------------------------------------------------------
    // Method and variable bindings
    // -------------------------------------------------------------------------

    /// Register a method binding, deduplicating on its key.
    pub fn register_method(&self, binding: MethodBinding) -> MethodBindingId {
        if let Some(existing) = self.methods_by_key.get(&binding.key) {
            return *existing;
        }
        let id = MethodBindingId(self.next_method.fetch_add(1, Ordering::SeqCst));
        trace!(id = id.0, "BindingStore::register_method");
        self.methods_by_key.insert(binding.key, id);
        self.methods.insert(id, binding);
        id
    }

    /// Look up a method binding.
    pub fn method(&self, id: MethodBindingId) -> Option<MethodBinding> {
        self.methods.get(&id).map(|r| r.clone())
    }

    /// Register a variable binding, deduplicating on its key.
    pub fn register_variable(&self, binding: VariableBinding) -> VariableBindingId {
        if let Some(existing) = self.variables_by_key.get(&binding.key) {
            return *existing;
        }
        let id = VariableBindingId(self.next_variable.fetch_add(1, Ordering::SeqCst));
        trace!(id = id.0, "BindingStore::register_variable");
        self.variables_by_key.insert(binding.key, id);
        self.variables.insert(id, binding);
        id
    }

    /// Look up a variable binding.
    pub fn variable(&self, id: VariableBindingId) -> Option<VariableBinding> {
        self.variables.get(&id).map(|r| r.clone())
    }

    /// Whether the method's declaring class is a local class.
    pub fn method_in_local_class(&self, id: MethodBindingId) -> bool {
        self.method(id)
            .and_then(|m| self.type_binding(m.declaring_class))
            .map(|t| t.is_local)
            .unwrap_or(false)
    }
}
