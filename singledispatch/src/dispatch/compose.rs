//! Extended MRO composition.
//!
//! A concrete type's own chain knows nothing about abstract capability types
//! it satisfies only structurally or virtually. Before scanning for a match
//! the resolver splices the relevant registered types into the chain.

use rustc_hash::FxHashSet;

use crate::types::TypeSystem;

/// Compute the MRO of `class` extended with the relevant entries of `haystack`.
///
/// A candidate from `haystack` is inserted when it is not already part of the
/// class's own chain, has a chain of its own, and is an ancestor of `class`.
/// It goes immediately before the first entry that is not one of its
/// subtypes. If that entry belongs to the class's own chain and the candidate
/// is not a subtype of it, the candidate goes one position later: chain
/// members and their subtypes sort before independently registered types.
///
/// Candidates are processed in `haystack` order. A `class` without a chain of
/// its own starts from just itself.
pub fn compose_mro<S, I>(types: &S, class: S::Type, haystack: I) -> Vec<S::Type>
where
    S: TypeSystem + ?Sized,
    I: IntoIterator<Item = S::Type>,
{
    let own = types.mro(class).unwrap_or_else(|| vec![class]);
    let bases: FxHashSet<S::Type> = own.iter().copied().collect();
    let mut mro = own;

    for needle in haystack {
        if bases.contains(&needle)
            || types.mro(needle).is_none()
            || !types.is_subtype(class, needle)
        {
            continue;
        }

        let mut index = mro
            .iter()
            .position(|&base| !types.is_subtype(base, needle))
            .unwrap_or(mro.len());
        if let Some(&base) = mro.get(index) {
            if bases.contains(&base) && !types.is_subtype(needle, base) {
                index += 1;
            }
        }
        mro.insert(index, needle);
    }

    mro
}
