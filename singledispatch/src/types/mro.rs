//! C3 linearization of class hierarchies.
//!
//! Produces the method resolution order used as a type's own chain:
//! the class itself, then a merge of its bases' orders that preserves local
//! precedence (bases are consulted in declaration order) and monotonicity
//! (every base's order is a subsequence of the result).

use std::fmt::Debug;

use crate::error::TypeError;

/// A linearized ancestor chain, most specific first.
pub type Mro<T> = Vec<T>;

/// Compute the C3 linearization of `class` with the given direct `bases`.
///
/// `mro_lookup` returns the already-computed order of a base, or `None` if the
/// base has no order (marker types cannot be inherited from). `name_of` is
/// only used to render diagnostics.
pub fn compute_c3_mro<T, F, N>(
    class: T,
    bases: &[T],
    mro_lookup: F,
    name_of: N,
) -> Result<Mro<T>, TypeError>
where
    T: Copy + Eq + Debug,
    F: Fn(T) -> Option<Mro<T>>,
    N: Fn(T) -> String,
{
    let mut sequences: Vec<Vec<T>> = Vec::with_capacity(bases.len() + 1);
    for &base in bases {
        let base_mro = mro_lookup(base).ok_or_else(|| TypeError::NotChainBearing(name_of(base)))?;
        sequences.push(base_mro);
    }
    sequences.push(bases.to_vec());

    let mut result = vec![class];
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(result);
        }

        // A good head appears in no other sequence's tail.
        let head = sequences
            .iter()
            .map(|seq| seq[0])
            .find(|candidate| {
                !sequences
                    .iter()
                    .any(|seq| seq[1..].contains(candidate))
            });

        let Some(head) = head else {
            let names: Vec<_> = bases.iter().map(|&b| name_of(b)).collect();
            return Err(TypeError::InconsistentMro {
                bases: names.join(", "),
            });
        };

        result.push(head);
        for seq in sequences.iter_mut() {
            if seq[0] == head {
                seq.remove(0);
            }
        }
    }
}
