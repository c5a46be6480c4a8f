//! Single-dispatch generic functions.
//!
//! A generic function has a default implementation plus implementations
//! registered for specific types. A call is routed by the runtime type of its
//! first argument to the implementation registered for that type's most
//! specific ancestor.
//!
//! Ancestry comes from a host [`TypeSystem`]. Besides a type's own linearized
//! chain it may include abstract capability types the type satisfies only
//! structurally or through later virtual registration; the resolver splices
//! those into the chain before choosing, and refuses to choose between two
//! unrelated candidates of equal standing.
//!
//! # Modules
//!
//! - [`dispatch`] - MRO composition, registry and cached resolution
//! - [`function`] - [`GenericFunction`], the callable surface
//! - [`types`] - The [`TypeSystem`] trait and the [`TypeUniverse`] host
//! - [`config`] - Dispatcher configuration
//! - [`error`] - Error types

pub mod config;
pub mod dispatch;
pub mod error;
pub mod function;
pub mod types;

pub use config::{CacheConfig, DispatchConfig};
pub use dispatch::{compose_mro, find_impl, CacheStats, Dispatcher, Registry, RegistryView};
pub use error::{ConfigError, DispatchError, DispatchResult, TypeError};
pub use function::{FunctionMeta, GenericFunction, Implementation};
pub use types::{Builtins, ClassId, ClassKind, Instance, TypeSystem, TypeUniverse};
