//! A class table implementing [`TypeSystem`].
//!
//! Classes are identified by dense [`ClassId`]s. Concrete and abstract
//! classes carry a C3-linearized MRO; marker types carry none. Abstract
//! classes may gain members after the fact in two ways:
//!
//! - **Structural**: an abstract class with required methods accepts any class
//!   whose MRO provides all of them.
//! - **Virtual registration**: [`TypeUniverse::register_virtual`] declares a
//!   class to be a subtype without touching its chain.
//!
//! Every change that can widen an existing abstract class bumps the
//! universe's cache token so armed dispatchers drop stale answers: a
//! successful virtual registration, or defining an abstract class with
//! required methods beneath an abstract base.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::mro::{compute_c3_mro, Mro};
use super::TypeSystem;
use crate::error::TypeError;

/// Identifier of a class in a [`TypeUniverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    /// The universal base class, `object`.
    pub const OBJECT: ClassId = ClassId(0);

    /// Raw index into the class table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What sort of type a class is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// An ordinary class.
    Concrete,
    /// An abstract capability type that accepts structural and virtual subtypes.
    Abstract,
    /// A bare marker type with no precedence order of its own.
    Marker,
}

#[derive(Debug)]
struct ClassInfo {
    name: String,
    kind: ClassKind,
    mro: Option<Mro<ClassId>>,
    /// Methods defined directly on the class.
    methods: FxHashSet<String>,
    /// Methods whose presence makes a class a structural subtype.
    required: Vec<String>,
    virtual_subclasses: Vec<ClassId>,
    subclasses: Vec<ClassId>,
}

#[derive(Debug, Default)]
struct ClassTable {
    classes: Vec<ClassInfo>,
    by_name: FxHashMap<String, ClassId>,
}

impl ClassTable {
    fn get(&self, id: ClassId) -> Option<&ClassInfo> {
        self.classes.get(id.index())
    }

    fn name_of(&self, id: ClassId) -> String {
        self.get(id)
            .map(|info| info.name.clone())
            .unwrap_or_else(|| format!("<unknown {id}>"))
    }

    fn require(&self, id: ClassId) -> Result<&ClassInfo, TypeError> {
        self.get(id)
            .ok_or_else(|| TypeError::UnknownType(id.to_string()))
    }

    fn provides_all(&self, class: ClassId, required: &[String]) -> bool {
        let Some(mro) = self.get(class).and_then(|info| info.mro.as_ref()) else {
            return false;
        };
        required.iter().all(|method| {
            mro.iter()
                .filter_map(|&ancestor| self.get(ancestor))
                .any(|ancestor| ancestor.methods.contains(method))
        })
    }

    fn is_subtype(&self, sub: ClassId, sup: ClassId) -> bool {
        if sub == sup {
            return true;
        }
        let (Some(sub_info), Some(sup_info)) = (self.get(sub), self.get(sup)) else {
            return false;
        };
        if sup == ClassId::OBJECT {
            return true;
        }
        if sub_info.mro.as_ref().is_some_and(|mro| mro.contains(&sup)) {
            return true;
        }
        if sup_info.kind == ClassKind::Concrete {
            return false;
        }

        if !sup_info.required.is_empty() && self.provides_all(sub, &sup_info.required) {
            return true;
        }
        if sup_info
            .virtual_subclasses
            .iter()
            .any(|&registered| self.is_subtype(sub, registered))
        {
            return true;
        }
        // A concrete subclass of `sup` can only contain `sub` through its own
        // chain, which the MRO check above already covered.
        sup_info
            .subclasses
            .iter()
            .filter(|&&declared| {
                self.get(declared)
                    .is_some_and(|info| info.kind != ClassKind::Concrete)
            })
            .any(|&declared| self.is_subtype(sub, declared))
    }
}

/// A thread-safe, append-only class table with a virtual-subtype version token.
#[derive(Debug)]
pub struct TypeUniverse {
    table: RwLock<ClassTable>,
    token: AtomicU64,
}

impl TypeUniverse {
    /// Create a universe containing only `object`.
    pub fn new() -> Self {
        let mut table = ClassTable::default();
        table.classes.push(ClassInfo {
            name: "object".to_string(),
            kind: ClassKind::Concrete,
            mro: Some(vec![ClassId::OBJECT]),
            methods: ["__eq__", "__repr__"]
                .into_iter()
                .map(String::from)
                .collect(),
            required: Vec::new(),
            virtual_subclasses: Vec::new(),
            subclasses: Vec::new(),
        });
        table.by_name.insert("object".to_string(), ClassId::OBJECT);

        Self {
            table: RwLock::new(table),
            token: AtomicU64::new(0),
        }
    }

    /// Define a concrete class. An empty `bases` slice means `object`.
    pub fn define_class(
        &self,
        name: &str,
        bases: &[ClassId],
        methods: &[&str],
    ) -> Result<ClassId, TypeError> {
        self.define(name, ClassKind::Concrete, bases, methods, &[])
    }

    /// Define an abstract capability type.
    ///
    /// When `required` is non-empty, every class whose MRO defines all of the
    /// listed methods is a structural subtype.
    pub fn define_abstract(
        &self,
        name: &str,
        bases: &[ClassId],
        required: &[&str],
    ) -> Result<ClassId, TypeError> {
        self.define(name, ClassKind::Abstract, bases, required, required)
    }

    /// Define a bare marker type without a precedence order.
    pub fn define_marker(&self, name: &str) -> Result<ClassId, TypeError> {
        self.define(name, ClassKind::Marker, &[], &[], &[])
    }

    fn define(
        &self,
        name: &str,
        kind: ClassKind,
        bases: &[ClassId],
        methods: &[&str],
        required: &[&str],
    ) -> Result<ClassId, TypeError> {
        let mut table = self.table.write();
        if table.by_name.contains_key(name) {
            return Err(TypeError::AlreadyDefined(name.to_string()));
        }

        let mut seen = FxHashSet::default();
        for &base in bases {
            table.require(base)?;
            if !seen.insert(base) {
                return Err(TypeError::DuplicateBase {
                    class: name.to_string(),
                    base: table.name_of(base),
                });
            }
        }

        let id = ClassId(table.classes.len() as u32);
        let (bases, mro) = match kind {
            ClassKind::Marker => (Vec::new(), None),
            _ => {
                let bases = if bases.is_empty() {
                    vec![ClassId::OBJECT]
                } else {
                    bases.to_vec()
                };
                let mro = compute_c3_mro(
                    id,
                    &bases,
                    |base| table.get(base).and_then(|info| info.mro.clone()),
                    |base| table.name_of(base),
                )?;
                (bases, Some(mro))
            }
        };

        table.classes.push(ClassInfo {
            name: name.to_string(),
            kind,
            mro,
            methods: methods.iter().map(|m| m.to_string()).collect(),
            required: required.iter().map(|m| m.to_string()).collect(),
            virtual_subclasses: Vec::new(),
            subclasses: Vec::new(),
        });
        table.by_name.insert(name.to_string(), id);
        // Existing classes that provide `required` become subtypes of every
        // abstract base through the new declared subclass.
        let widens_abstract_bases = !required.is_empty()
            && bases.iter().any(|&base| {
                table
                    .get(base)
                    .is_some_and(|info| info.kind != ClassKind::Concrete)
            });
        for &base in &bases {
            table.classes[base.index()].subclasses.push(id);
        }

        if widens_abstract_bases {
            let token = self.token.fetch_add(1, Ordering::AcqRel) + 1;
            debug!(class = name, ?kind, token, "defined structural abstract subclass");
        } else {
            debug!(class = name, ?kind, "defined class");
        }
        Ok(id)
    }

    /// Declare `subclass` a virtual subclass of `target`.
    ///
    /// A no-op when the relation already holds. Refuses relations that would
    /// make `target` its own ancestor. Returns `subclass` so the call can wrap
    /// a definition.
    pub fn register_virtual(
        &self,
        target: ClassId,
        subclass: ClassId,
    ) -> Result<ClassId, TypeError> {
        let mut table = self.table.write();
        let target_info = table.require(target)?;
        if target_info.kind == ClassKind::Concrete {
            return Err(TypeError::NotAbstract(target_info.name.clone()));
        }
        table.require(subclass)?;

        if table.is_subtype(subclass, target) {
            return Ok(subclass);
        }
        if table.is_subtype(target, subclass) {
            return Err(TypeError::InheritanceCycle {
                abstract_ty: table.name_of(target),
                subclass: table.name_of(subclass),
            });
        }

        table.classes[target.index()].virtual_subclasses.push(subclass);
        let token = self.token.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(
            abstract_ty = %table.name_of(target),
            subclass = %table.name_of(subclass),
            token,
            "registered virtual subclass"
        );
        Ok(subclass)
    }

    /// Look up a class by name.
    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.table.read().by_name.get(name).copied()
    }

    /// The class's name, if it exists.
    pub fn name(&self, id: ClassId) -> Option<String> {
        self.table.read().get(id).map(|info| info.name.clone())
    }

    /// The class's kind, if it exists.
    pub fn kind(&self, id: ClassId) -> Option<ClassKind> {
        self.table.read().get(id).map(|info| info.kind)
    }

    /// Number of classes, `object` included.
    pub fn len(&self) -> usize {
        self.table.read().classes.len()
    }

    /// Always `false`; `object` is present from construction.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TypeUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeSystem for TypeUniverse {
    type Type = ClassId;

    fn object(&self) -> ClassId {
        ClassId::OBJECT
    }

    fn mro(&self, ty: ClassId) -> Option<Vec<ClassId>> {
        self.table.read().get(ty).and_then(|info| info.mro.clone())
    }

    fn is_subtype(&self, sub: ClassId, sup: ClassId) -> bool {
        self.table.read().is_subtype(sub, sup)
    }

    fn is_incomplete_virtual(&self, ty: ClassId) -> bool {
        self.kind(ty) == Some(ClassKind::Abstract)
    }

    fn cache_token(&self) -> u64 {
        self.token.load(Ordering::Acquire)
    }

    fn contains(&self, ty: ClassId) -> bool {
        ty.index() < self.len()
    }

    fn type_name(&self, ty: ClassId) -> String {
        self.table.read().name_of(ty)
    }
}
