//! Host type system abstraction.
//!
//! Dispatch never inspects types directly. Everything it needs to know about
//! a type (its own linearized ancestors, the subtype relation, whether it is
//! an abstract capability type that may gain virtual subtypes later, and the
//! version of the virtual-subtype universe) comes through [`TypeSystem`].
//!
//! [`TypeUniverse`] is a ready-made implementation with C3-linearized class
//! hierarchies, abstract capability types, structural subtype checks and
//! virtual-subclass registration.
//!
//! # Module Structure
//!
//! - [`mro`] - C3 linearization
//! - [`universe`] - The [`TypeUniverse`] class table
//! - [`builtins`] - A universe seeded with common builtin types

use std::fmt::Debug;
use std::hash::Hash;

pub mod builtins;
pub mod mro;
pub mod universe;

pub use builtins::Builtins;
pub use mro::{compute_c3_mro, Mro};
pub use universe::{ClassId, ClassKind, TypeUniverse};

/// The capabilities dispatch requires from a host type system.
pub trait TypeSystem {
    /// Opaque type identifier.
    type Type: Copy + Eq + Hash + Debug;

    /// The universal base type every chain terminates at.
    fn object(&self) -> Self::Type;

    /// The type's own linearization, most specific first, starting with the
    /// type itself and ending with [`object`](Self::object).
    ///
    /// `None` for bare marker types that have no precedence order of their
    /// own; those are never inserted into a composed order.
    fn mro(&self, ty: Self::Type) -> Option<Vec<Self::Type>>;

    /// `true` if `sub` is `sup` or a (possibly virtual) subtype of it.
    fn is_subtype(&self, sub: Self::Type, sup: Self::Type) -> bool;

    /// `true` for abstract capability types whose set of subtypes can grow
    /// after the fact without appearing in any concrete type's own chain.
    fn is_incomplete_virtual(&self, ty: Self::Type) -> bool;

    /// Version of the virtual-subtype universe. Changes whenever a new
    /// virtual-subtype relation may have been declared.
    fn cache_token(&self) -> u64;

    /// `true` if `ty` is a type this system knows about.
    fn contains(&self, ty: Self::Type) -> bool;

    /// Display name used in diagnostics.
    fn type_name(&self, ty: Self::Type) -> String;
}

/// A runtime value whose type drives dispatch.
pub trait Instance<T> {
    /// The concrete type of this value.
    fn class_of(&self) -> T;
}
