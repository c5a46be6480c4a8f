//! Dispatch resolution with a lookup cache.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::compose::compose_mro;
use super::registry::{Registry, RegistryView};
use super::stats::{CacheStats, Counters};
use crate::config::DispatchConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::types::TypeSystem;

struct DispatchState<T, I> {
    registry: Registry<T, I>,
    cache: FxHashMap<T, I>,
    /// `None` until an incomplete-virtual type is registered.
    cache_token: Option<u64>,
}

/// Resolves concrete types to registered implementations.
///
/// Owns the registry and a memo of past resolutions. The memo is dropped
/// wholesale on every registration and, once an abstract capability type has
/// been registered, whenever the host type system's cache token moves.
///
/// Cache hits only take a read lock. Misses, registrations and clears take
/// the write lock, so concurrent callers never observe a half-applied
/// registration.
pub struct Dispatcher<S: TypeSystem, I> {
    types: Arc<S>,
    config: DispatchConfig,
    state: RwLock<DispatchState<S::Type, I>>,
    counters: Counters,
}

impl<S, I> Dispatcher<S, I>
where
    S: TypeSystem,
    I: Clone,
{
    /// Create a dispatcher with `default` registered for `object`.
    pub fn new(types: Arc<S>, default: I) -> Self {
        Self::with_config(types, default, DispatchConfig::default())
    }

    pub fn with_config(types: Arc<S>, default: I, config: DispatchConfig) -> Self {
        let registry = Registry::new(types.object(), default);
        Self {
            types,
            config,
            state: RwLock::new(DispatchState {
                registry,
                cache: FxHashMap::default(),
                cache_token: None,
            }),
            counters: Counters::default(),
        }
    }

    /// The host type system.
    pub fn types(&self) -> &Arc<S> {
        &self.types
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Register `implementation` for `ty`, replacing any previous one.
    ///
    /// Returns the implementation unchanged.
    pub fn register(&self, ty: S::Type, implementation: I) -> DispatchResult<I> {
        if !self.types.contains(ty) {
            return Err(DispatchError::NotAType(format!("{ty:?}")));
        }

        let mut state = self.state.write();
        state.registry.register(ty, implementation.clone());
        if state.cache_token.is_none() && self.types.is_incomplete_virtual(ty) {
            let token = self.types.cache_token();
            state.cache_token = Some(token);
            debug!(ty = %self.types.type_name(ty), token, "tracking virtual subtype changes");
        }
        state.cache.clear();
        self.counters.invalidated();

        debug!(ty = %self.types.type_name(ty), "registered implementation");
        Ok(implementation)
    }

    /// Resolve the implementation for `class`.
    pub fn resolve(&self, class: S::Type) -> DispatchResult<I> {
        {
            let state = self.state.read();
            let token_current = state
                .cache_token
                .map_or(true, |token| token == self.types.cache_token());
            if token_current {
                if let Some(implementation) = state.cache.get(&class) {
                    self.counters.hit();
                    trace!(?class, "dispatch cache hit");
                    return Ok(implementation.clone());
                }
            }
        }

        let mut state = self.state.write();
        if let Some(stored) = state.cache_token {
            let current = self.types.cache_token();
            if stored != current {
                debug!(stored, current, "virtual subtypes changed, clearing dispatch cache");
                state.cache.clear();
                state.cache_token = Some(current);
                self.counters.invalidated();
            }
        }

        // Another caller may have filled the entry while we waited.
        if let Some(implementation) = state.cache.get(&class) {
            self.counters.hit();
            return Ok(implementation.clone());
        }
        self.counters.miss();

        let implementation = match state.registry.lookup_exact(class) {
            Some(implementation) => implementation.clone(),
            None => find_impl(&*self.types, class, &state.registry)?,
        };

        // A zero bound stores nothing, like a disabled cache.
        if self.config.cache.enabled && self.config.cache.max_entries != Some(0) {
            if let Some(max) = self.config.cache.max_entries {
                if state.cache.len() >= max {
                    debug!(max, "dispatch cache full, clearing");
                    state.cache.clear();
                    self.counters.invalidated();
                }
            }
            state.cache.insert(class, implementation.clone());
        }

        trace!(class = %self.types.type_name(class), "resolved dispatch");
        Ok(implementation)
    }

    /// Drop every memoized resolution.
    pub fn clear_cache(&self) {
        self.state.write().cache.clear();
        self.counters.invalidated();
    }

    /// Read-only snapshot of the registry.
    pub fn registry(&self) -> RegistryView<S::Type, I> {
        self.state.read().registry.view()
    }

    /// Number of memoized resolutions.
    pub fn cache_len(&self) -> usize {
        self.state.read().cache.len()
    }

    /// `true` once an abstract capability type has been registered.
    pub fn is_tracking_virtual(&self) -> bool {
        self.state.read().cache_token.is_some()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}

/// Find the best registered implementation for `class` by scanning its
/// extended MRO.
///
/// The first registered entry wins unless the next registered entry is an
/// unrelated type of equal standing: when the winner is neither a subtype of
/// that entry nor part of `class`'s own chain, the answer is ambiguous and no
/// guess is made.
pub fn find_impl<S, I>(
    types: &S,
    class: S::Type,
    registry: &Registry<S::Type, I>,
) -> DispatchResult<I>
where
    S: TypeSystem + ?Sized,
    I: Clone,
{
    let mro = compose_mro(types, class, registry.keys());
    let mut registered = mro.iter().copied().filter(|&ty| registry.contains(ty));

    let Some(matched) = registered.next() else {
        return Ok(registry.fallback().clone());
    };

    if let Some(next) = registered.next() {
        let own = types.mro(class).unwrap_or_else(|| vec![class]);
        if !types.is_subtype(matched, next) && !own.contains(&matched) {
            return Err(DispatchError::Ambiguous {
                first: types.type_name(matched),
                second: types.type_name(next),
            });
        }
    }

    match registry.lookup_exact(matched) {
        Some(implementation) => Ok(implementation.clone()),
        None => Ok(registry.fallback().clone()),
    }
}
