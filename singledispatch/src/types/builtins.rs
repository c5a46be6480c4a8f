//! A universe seeded with common builtin types and collection capabilities.

use super::universe::{ClassId, TypeUniverse};
use crate::error::TypeError;

/// Handles to the classes created by [`TypeUniverse::with_builtins`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtins {
    pub object: ClassId,
    pub int: ClassId,
    pub bool: ClassId,
    pub float: ClassId,
    pub str: ClassId,
    pub list: ClassId,
    pub tuple: ClassId,
    pub dict: ClassId,

    pub hashable: ClassId,
    pub sized: ClassId,
    pub iterable: ClassId,
    pub container: ClassId,
    pub collection: ClassId,
    pub reversible: ClassId,
    pub sequence: ClassId,
    pub mutable_sequence: ClassId,
    pub mapping: ClassId,
}

impl TypeUniverse {
    /// Create a universe with `int`, `bool`, `float`, `str`, `list`, `tuple`,
    /// `dict` and the collection capability types.
    ///
    /// `Hashable`, `Sized`, `Iterable`, `Container`, `Collection` and
    /// `Reversible` are structural. `Sequence`, `MutableSequence` and
    /// `Mapping` are nominal; the builtin containers are registered as their
    /// virtual subclasses.
    pub fn with_builtins() -> Result<(Self, Builtins), TypeError> {
        let universe = TypeUniverse::new();
        let object = ClassId::OBJECT;

        let hashable = universe.define_abstract("Hashable", &[], &["__hash__"])?;
        let sized = universe.define_abstract("Sized", &[], &["__len__"])?;
        let iterable = universe.define_abstract("Iterable", &[], &["__iter__"])?;
        let container = universe.define_abstract("Container", &[], &["__contains__"])?;
        let collection = universe.define_abstract(
            "Collection",
            &[sized, iterable, container],
            &["__len__", "__iter__", "__contains__"],
        )?;
        let reversible =
            universe.define_abstract("Reversible", &[iterable], &["__reversed__", "__iter__"])?;
        let sequence = universe.define_abstract("Sequence", &[reversible, collection], &[])?;
        let mutable_sequence = universe.define_abstract("MutableSequence", &[sequence], &[])?;
        let mapping = universe.define_abstract("Mapping", &[collection], &[])?;

        let int = universe.define_class("int", &[], &["__hash__", "__int__", "__add__"])?;
        let bool = universe.define_class("bool", &[int], &["__and__", "__or__"])?;
        let float = universe.define_class("float", &[], &["__hash__", "__float__", "__add__"])?;
        let str = universe.define_class(
            "str",
            &[],
            &["__hash__", "__len__", "__iter__", "__contains__", "__getitem__"],
        )?;
        let list = universe.define_class(
            "list",
            &[],
            &[
                "__len__",
                "__iter__",
                "__contains__",
                "__reversed__",
                "__getitem__",
                "__setitem__",
            ],
        )?;
        let tuple = universe.define_class(
            "tuple",
            &[],
            &["__hash__", "__len__", "__iter__", "__contains__", "__getitem__"],
        )?;
        let dict = universe.define_class(
            "dict",
            &[],
            &["__len__", "__iter__", "__contains__", "__getitem__", "__setitem__"],
        )?;

        universe.register_virtual(sequence, str)?;
        universe.register_virtual(sequence, tuple)?;
        universe.register_virtual(mutable_sequence, list)?;
        universe.register_virtual(mapping, dict)?;

        Ok((
            universe,
            Builtins {
                object,
                int,
                bool,
                float,
                str,
                list,
                tuple,
                dict,
                hashable,
                sized,
                iterable,
                container,
                collection,
                reversible,
                sequence,
                mutable_sequence,
                mapping,
            },
        ))
    }
}
