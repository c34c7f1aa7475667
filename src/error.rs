//! Error types for binding and parsing.

use thiserror::Error;

/// Result type for flagtree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A literal could not be turned into a value of the target type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to parse {literal:?} into {target}: {reason}")]
pub struct ConversionError {
    pub literal: String,
    pub target: &'static str,
    pub reason: String,
}

impl ConversionError {
    pub fn new(literal: impl Into<String>, target: &'static str, reason: impl ToString) -> Self {
        Self {
            literal: literal.into(),
            target,
            reason: reason.to_string(),
        }
    }

    /// Shorthand naming `T` as the target type.
    pub fn of<T: ?Sized>(literal: impl Into<String>, reason: impl ToString) -> Self {
        Self::new(literal, std::any::type_name::<T>(), reason)
    }
}

/// Raised while walking a schema; aborts the whole bind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("no converter registered for {type_name}")]
    Unregistered { type_name: &'static str },

    #[error("{field} is a list of unsupported element type {element}")]
    UnsupportedElement {
        field: String,
        element: &'static str,
    },

    #[error("found action field with duplicate name {name}")]
    DuplicateAction { name: String },

    #[error("option {name} is defined more than once")]
    DuplicateOption { name: String },

    #[error("{field}: {source}")]
    InvalidHint {
        field: String,
        #[source]
        source: HintError,
    },
}

/// A field hint a converter cannot work with, e.g. `base=7`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {hint} hint {value:?}: {reason}")]
pub struct HintError {
    pub hint: &'static str,
    pub value: String,
    pub reason: String,
}

/// Raised by a node's option set while consuming its slice of tokens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FlagError {
    #[error("flag provided but not defined: {0}")]
    Unknown(String),

    #[error("flag needs an argument: {0}")]
    MissingValue(String),

    #[error("invalid value {value:?} for flag {flag}: {source}")]
    InvalidValue {
        flag: String,
        value: String,
        #[source]
        source: ConversionError,
    },

    #[error("bad flag syntax: {0}")]
    BadSyntax(String),

    #[error("unexpected argument {0:?}")]
    Unexpected(String),

    #[error("help requested")]
    Help,
}

/// A bare token appeared where a child action name was expected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("found unrecognized action {token:?}")]
pub struct ActionError {
    pub token: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Flag(#[from] FlagError),

    #[error(transparent)]
    Action(#[from] ActionError),
}

impl Error {
    /// True when the token stream asked for usage text instead of a parse.
    pub fn is_help(&self) -> bool {
        matches!(self, Error::Flag(FlagError::Help))
    }
}
