//! Upstream binding contract for the tyg constraint engine.
//!
//! Source parsing and symbol resolution are external collaborators: they
//! hand the engine *bindings* — resolved, canonical descriptions of types,
//! methods, type parameters and variables. This crate models that contract:
//!
//! - **Id newtypes**: `TypeBindingId`, `MethodBindingId`, `TypeParamId`,
//!   `VariableBindingId` — opaque handles with a validity convention
//! - **Records**: `TypeBinding`, `MethodBinding`, `TypeParam`,
//!   `VariableBinding` — the capability set the engine consumes
//!   (generic-ness, supertype, interfaces, declared type parameters,
//!   type arguments, primitiveness, array element type)
//! - **`BindingStore`**: thread-safe registry the resolution pass fills and
//!   the engine reads
//!
//! The engine never creates bindings of its own; everything here is input.

mod binding;
mod store;

pub use binding::{
    Genericity, MethodBinding, MethodBindingId, TypeBinding, TypeBindingId, TypeBindingKind,
    TypeParam, TypeParamId, VariableBinding, VariableBindingId,
};
pub use store::BindingStore;
