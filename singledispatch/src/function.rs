//! Generic functions: the public face of single dispatch.
//!
//! A [`GenericFunction`] wraps a default implementation and a
//! [`Dispatcher`]. Calling it resolves the class of the first argument and
//! invokes whichever implementation was registered for the closest ancestor.
//!
//! ```ignore
//! let (universe, b) = TypeUniverse::with_builtins()?;
//! let describe = GenericFunction::new(
//!     Arc::new(universe),
//!     FunctionMeta::new("describe").with_doc("Describe a value."),
//!     |_args: &[Value]| "object".to_string(),
//! );
//! describe.register(b.int, |_args: &[Value]| "integer".to_string())?;
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::DispatchConfig;
use crate::dispatch::{CacheStats, Dispatcher, RegistryView};
use crate::error::{DispatchError, DispatchResult};
use crate::types::{Instance, TypeSystem};

/// A registered implementation. Receives every argument, the dispatched one
/// included.
pub type Implementation<A, R> = Arc<dyn Fn(&[A]) -> R + Send + Sync>;

/// Descriptive metadata copied from the default implementation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionMeta {
    pub name: String,
    pub qualname: String,
    pub module: Option<String>,
    pub doc: Option<String>,
}

impl FunctionMeta {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            qualname: name.clone(),
            name,
            module: None,
            doc: None,
        }
    }

    pub fn with_qualname(mut self, qualname: impl Into<String>) -> Self {
        self.qualname = qualname.into();
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// A function whose behaviour depends on the type of its first argument.
pub struct GenericFunction<S: TypeSystem, A, R> {
    meta: FunctionMeta,
    default: Implementation<A, R>,
    dispatcher: Dispatcher<S, Implementation<A, R>>,
}

impl<S, A, R> GenericFunction<S, A, R>
where
    S: TypeSystem,
    A: Instance<S::Type>,
{
    /// Create a generic function with `default` handling `object`.
    pub fn new<F>(types: Arc<S>, meta: FunctionMeta, default: F) -> Self
    where
        F: Fn(&[A]) -> R + Send + Sync + 'static,
    {
        Self::with_config(types, meta, default, DispatchConfig::default())
    }

    pub fn with_config<F>(types: Arc<S>, meta: FunctionMeta, default: F, config: DispatchConfig) -> Self
    where
        F: Fn(&[A]) -> R + Send + Sync + 'static,
    {
        let default: Implementation<A, R> = Arc::new(default);
        debug!(function = %meta.qualname, "created generic function");
        Self {
            dispatcher: Dispatcher::with_config(types, Arc::clone(&default), config),
            default,
            meta,
        }
    }

    /// Dispatch on the class of `args[0]` and invoke the chosen
    /// implementation with all of `args`.
    pub fn call(&self, args: &[A]) -> DispatchResult<R> {
        let first = args.first().ok_or_else(|| DispatchError::MissingArgument {
            function: self.meta.qualname.clone(),
        })?;
        let implementation = self.dispatcher.resolve(first.class_of())?;
        Ok(implementation(args))
    }

    /// Register `f` for `ty`. Returns the stored implementation.
    pub fn register<F>(&self, ty: S::Type, f: F) -> DispatchResult<Implementation<A, R>>
    where
        F: Fn(&[A]) -> R + Send + Sync + 'static,
    {
        self.register_impl(ty, Arc::new(f))
    }

    /// Register an already shared implementation for `ty` and return it.
    pub fn register_impl(
        &self,
        ty: S::Type,
        implementation: Implementation<A, R>,
    ) -> DispatchResult<Implementation<A, R>> {
        self.dispatcher.register(ty, implementation)
    }

    /// Deferred registration: the returned closure registers whatever
    /// implementation it is applied to for `ty` and hands it back.
    pub fn registrar(
        &self,
        ty: S::Type,
    ) -> impl Fn(Implementation<A, R>) -> DispatchResult<Implementation<A, R>> + '_ {
        move |implementation| self.register_impl(ty, implementation)
    }

    /// The implementation that would handle an argument of class `ty`.
    pub fn dispatch(&self, ty: S::Type) -> DispatchResult<Implementation<A, R>> {
        self.dispatcher.resolve(ty)
    }

    /// Read-only snapshot of the registrations.
    pub fn registry(&self) -> RegistryView<S::Type, Implementation<A, R>> {
        self.dispatcher.registry()
    }

    pub fn clear_cache(&self) {
        self.dispatcher.clear_cache();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.dispatcher.stats()
    }

    pub fn meta(&self) -> &FunctionMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.meta.doc.as_deref()
    }

    /// The default implementation the function was built from.
    pub fn wrapped(&self) -> &Implementation<A, R> {
        &self.default
    }

    pub fn dispatcher(&self) -> &Dispatcher<S, Implementation<A, R>> {
        &self.dispatcher
    }
}

impl<S, A, R> fmt::Debug for GenericFunction<S, A, R>
where
    S: TypeSystem,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericFunction")
            .field("meta", &self.meta)
            .field("registry", &self.dispatcher.registry())
            .finish()
    }
}
