//! Single-dispatch resolution.
//!
//! Selects the implementation registered for the most specific ancestor of a
//! concrete type. Abstract capability types the type satisfies only
//! structurally or virtually are spliced into its MRO before the scan.
//!
//! # Algorithm Overview
//!
//! 1. **Check cache**: drop it first if the virtual-subtype universe moved
//! 2. **Exact match**: a direct registration wins outright
//! 3. **Compose**: extend the type's MRO with relevant registered types
//! 4. **Scan**: the first registered entry wins
//! 5. **Check ambiguity**: refuse when the runner-up is an unrelated peer
//!
//! # Module Structure
//!
//! - [`compose`] - Extended MRO composition
//! - [`registry`] - Type to implementation mapping and read-only views
//! - [`resolver`] - The cached [`Dispatcher`]
//! - [`stats`] - Cache counters

pub mod compose;
pub mod registry;
pub mod resolver;
pub mod stats;

#[cfg(test)]
mod tests;

pub use compose::compose_mro;
pub use registry::{Registry, RegistryView};
pub use resolver::{find_impl, Dispatcher};
pub use stats::CacheStats;
