//! Type to implementation registry.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

type Table<T, I> = IndexMap<T, I, FxBuildHasher>;

/// Mapping from registered types to implementations.
///
/// Always holds an entry for the universal base type. Entries keep their
/// first-registration order, which makes MRO composition deterministic.
/// The table sits behind an [`Arc`] so [`Registry::view`] is a cheap
/// snapshot; writes copy only while a snapshot is alive.
#[derive(Clone)]
pub struct Registry<T, I> {
    entries: Arc<Table<T, I>>,
}

impl<T, I> Registry<T, I>
where
    T: Copy + Eq + Hash,
    I: Clone,
{
    /// Create a registry with `fallback` registered for `object`.
    pub fn new(object: T, fallback: I) -> Self {
        let mut entries = Table::default();
        entries.insert(object, fallback);
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Insert or overwrite the implementation for `ty`. Returns the
    /// implementation previously registered, if any.
    pub fn register(&mut self, ty: T, implementation: I) -> Option<I> {
        Arc::make_mut(&mut self.entries).insert(ty, implementation)
    }

    /// Direct lookup, no traversal.
    pub fn lookup_exact(&self, ty: T) -> Option<&I> {
        self.entries.get(&ty)
    }

    pub fn contains(&self, ty: T) -> bool {
        self.entries.contains_key(&ty)
    }

    /// The implementation registered for `object`.
    pub fn fallback(&self) -> &I {
        // `object` is inserted first at construction and never removed.
        &self.entries[0]
    }

    /// Registered types in registration order.
    pub fn keys(&self) -> impl Iterator<Item = T> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; the fallback entry cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read-only snapshot of the current contents.
    pub fn view(&self) -> RegistryView<T, I> {
        RegistryView {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T: fmt::Debug, I> fmt::Debug for Registry<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Immutable snapshot of a [`Registry`].
///
/// Later registrations are not reflected; take a new view to observe them.
#[derive(Clone)]
pub struct RegistryView<T, I> {
    entries: Arc<Table<T, I>>,
}

impl<T, I> RegistryView<T, I>
where
    T: Copy + Eq + Hash,
{
    pub fn get(&self, ty: T) -> Option<&I> {
        self.entries.get(&ty)
    }

    pub fn contains(&self, ty: T) -> bool {
        self.entries.contains_key(&ty)
    }

    pub fn keys(&self) -> impl Iterator<Item = T> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (T, &I)> + '_ {
        self.entries.iter().map(|(&ty, implementation)| (ty, implementation))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: fmt::Debug, I> fmt::Debug for RegistryView<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
