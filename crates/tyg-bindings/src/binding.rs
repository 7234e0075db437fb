//! Binding records and their id newtypes.
//!
//! A binding is the resolved identity of a program element. Bindings carry
//! a stable `key` (the identity string the resolution pass computes, after
//! the Java binding-key convention); two bindings describe the same element
//! iff their keys are equal. The `BindingStore` deduplicates on that key,
//! so id equality is element identity everywhere downstream.

use tyg_common::Atom;

// =============================================================================
// Id newtypes
// =============================================================================

/// Handle to a registered type binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeBindingId(pub u32);

/// Handle to a registered method binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodBindingId(pub u32);

/// Handle to a registered variable binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariableBindingId(pub u32);

/// Handle to a declared type parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamId(pub u32);

macro_rules! impl_validity {
    ($($id:ident),*) => {$(
        impl $id {
            /// Sentinel value for an invalid handle.
            pub const INVALID: Self = Self(0);

            /// First valid raw id.
            pub const FIRST_VALID: u32 = 1;

            /// Check if this handle is valid.
            pub const fn is_valid(self) -> bool {
                self.0 >= Self::FIRST_VALID
            }
        }
    )*};
}

impl_validity!(TypeBindingId, MethodBindingId, VariableBindingId, TypeParamId);

// =============================================================================
// Type bindings
// =============================================================================

/// Kind of a type binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeBindingKind {
    /// A class declaration or class reference.
    Class,
    /// An interface declaration or interface reference.
    Interface,
    /// A type variable (the use of a declared type parameter, e.g. `E`).
    TypeVariable,
    /// A wildcard type argument (`?`, `? extends X`, `? super X`).
    Wildcard,
    /// A primitive type (`int`, `boolean`, ...). Never carries constraints.
    Primitive,
    /// An array type; `element` is the component type binding.
    Array { element: TypeBindingId },
}

/// Generic-ness of a type binding.
///
/// | Value | Meaning | Example |
/// |-------|---------|---------|
/// | `NotGeneric` | no type parameters anywhere | `String` |
/// | `Generic` | the declaration itself | `List<E>` as declared |
/// | `Parameterized` | an instantiation | `List<String>` |
/// | `Raw` | an erased reference | `List` used raw |
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Genericity {
    NotGeneric,
    Generic,
    Parameterized,
    Raw,
}

/// A resolved type.
///
/// For `Parameterized` and `Raw` references, `declaration` points at the
/// generic declaration binding (which carries the declared
/// `type_parameters`); `type_arguments` is filled for parameterized
/// references and empty for raw ones. `superclass`/`interfaces` are the
/// *declared* supertype references and may themselves be parameterized
/// (e.g. `ArrayList<E> extends AbstractList<E>` — the superclass reference
/// is parameterized with the type variable `E` as its argument).
#[derive(Clone, Debug)]
pub struct TypeBinding {
    pub kind: TypeBindingKind,
    pub name: Atom,
    /// Stable identity key; `BindingStore` deduplicates on it.
    pub key: Atom,
    pub genericity: Genericity,
    /// Declared type parameters (populated on generic declarations).
    pub type_parameters: Vec<TypeParamId>,
    /// Type arguments (populated on parameterized references).
    pub type_arguments: Vec<TypeBindingId>,
    /// The generic declaration for parameterized/raw references.
    pub declaration: Option<TypeBindingId>,
    pub superclass: Option<TypeBindingId>,
    pub interfaces: Vec<TypeBindingId>,
    /// Whether this is a local (method-scoped) class.
    pub is_local: bool,
}

impl TypeBinding {
    fn base(kind: TypeBindingKind, name: Atom, key: Atom) -> Self {
        Self {
            kind,
            name,
            key,
            genericity: Genericity::NotGeneric,
            type_parameters: Vec::new(),
            type_arguments: Vec::new(),
            declaration: None,
            superclass: None,
            interfaces: Vec::new(),
            is_local: false,
        }
    }

    /// A class declaration.
    pub fn class(name: Atom, key: Atom) -> Self {
        Self::base(TypeBindingKind::Class, name, key)
    }

    /// An interface declaration.
    pub fn interface(name: Atom, key: Atom) -> Self {
        Self::base(TypeBindingKind::Interface, name, key)
    }

    /// A primitive type. Keyed by its own name (`int` is `int` everywhere).
    pub fn primitive(name: Atom) -> Self {
        Self::base(TypeBindingKind::Primitive, name, name)
    }

    /// A type variable (use of a declared type parameter).
    pub fn type_variable(name: Atom, key: Atom) -> Self {
        Self::base(TypeBindingKind::TypeVariable, name, key)
    }

    /// A wildcard type argument.
    pub fn wildcard(key: Atom) -> Self {
        Self::base(TypeBindingKind::Wildcard, Atom::NONE, key)
    }

    /// An array type over `element`.
    pub fn array(element: TypeBindingId, name: Atom, key: Atom) -> Self {
        Self::base(TypeBindingKind::Array { element }, name, key)
    }

    /// Declare type parameters, marking the binding as a generic declaration.
    pub fn with_type_parameters(mut self, params: Vec<TypeParamId>) -> Self {
        self.genericity = Genericity::Generic;
        self.type_parameters = params;
        self
    }

    /// Set the declared superclass reference.
    pub fn with_superclass(mut self, superclass: TypeBindingId) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Set the declared interface references.
    pub fn with_interfaces(mut self, interfaces: Vec<TypeBindingId>) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Mark as a local (method-scoped) class.
    pub fn local(mut self) -> Self {
        self.is_local = true;
        self
    }

    /// Whether the binding is generic, parameterized, or raw.
    pub fn is_a_generic_type(&self) -> bool {
        !matches!(self.genericity, Genericity::NotGeneric)
    }

    /// Whether the binding is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeBindingKind::Primitive)
    }
}

/// A declared type parameter.
///
/// `key` doubles as the stable key of the parameter's type-variable binding:
/// looking up an element variable by a type-variable argument and by the
/// declared parameter it refers to must land on the same slot.
#[derive(Clone, Debug)]
pub struct TypeParam {
    pub name: Atom,
    pub key: Atom,
    /// The type-variable binding representing uses of this parameter.
    pub binding: TypeBindingId,
    /// Declared bounds; fetched lazily by callers, never forced here.
    pub bounds: Vec<TypeBindingId>,
}

// =============================================================================
// Method and variable bindings
// =============================================================================

/// A resolved method.
#[derive(Clone, Debug)]
pub struct MethodBinding {
    pub name: Atom,
    pub key: Atom,
    pub declaring_class: TypeBindingId,
    pub parameter_types: Vec<TypeBindingId>,
    pub return_type: TypeBindingId,
    pub is_private: bool,
}

/// A resolved variable (local, parameter, or field).
#[derive(Clone, Debug)]
pub struct VariableBinding {
    pub name: Atom,
    pub key: Atom,
    pub ty: TypeBindingId,
    pub is_field: bool,
}
