//! Error types for dispatch resolution and the host type universe.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by dispatch resolution and registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Two unrelated registered types are equally specific matches.
    #[error("Ambiguous dispatch: {first} or {second}")]
    Ambiguous { first: String, second: String },

    /// A registration key the host type system does not know about.
    #[error("invalid first argument to `register()`: {0} is not a type")]
    NotAType(String),

    /// `call` was invoked without the argument dispatch is based on.
    #[error("{function} requires at least 1 positional argument")]
    MissingArgument { function: String },
}

/// Dispatch result type.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors raised while building or mutating a [`TypeUniverse`](crate::TypeUniverse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("type `{0}` is already defined")]
    AlreadyDefined(String),

    #[error("duplicate base class `{base}` in definition of `{class}`")]
    DuplicateBase { class: String, base: String },

    #[error(
        "cannot create a consistent method resolution order (MRO) for bases {bases}"
    )]
    InconsistentMro { bases: String },

    #[error("`{0}` has no method resolution order and cannot be used as a base")]
    NotChainBearing(String),

    #[error("`{0}` is not an abstract type; only abstract types accept virtual subclasses")]
    NotAbstract(String),

    #[error("refusing to create an inheritance cycle: `{subclass}` is an ancestor of `{abstract_ty}`")]
    InheritanceCycle { abstract_ty: String, subclass: String },
}

/// Errors raised while loading a [`DispatchConfig`](crate::DispatchConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dispatch configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
