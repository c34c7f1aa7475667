//! Command line flags generated from struct definitions.
//!
//! A [`Schema`] lists a struct's fields; [`Filler::fill`] turns them into
//! options and nested actions, and [`Filler::parse_args`] writes the parsed
//! values straight back into the struct.

mod binder;
mod convert;
mod error;
mod filler;
mod flagset;
mod list;
mod node;
pub mod pretty;
pub mod registry;
mod scanner;
mod value;

pub use binder::{
    Bindable, BindingKind, Field, FieldBinding, RenameFn, Schema, Walker, default_renamer,
};
pub use convert::{
    BoolConverter, DEFAULT_TIME_LAYOUT, DurationConverter, FloatConverter, IntConverter, IntWidth,
    StringConverter, TextCodec, TimestampConverter, format_duration, parse_duration,
};
pub use error::{
    ActionError, BindError, ConversionError, Error, FlagError, HintError, Result,
};
pub use filler::{ErrorHandling, Filler, FillerConfig};
pub use flagset::{Flag, FlagSet, FlagValue};
pub use list::{ListElement, ListTarget, ListValue, SEPARATOR};
pub use node::{OptionUsage, ParserNode, UsageNode};
pub use pretty::pretty_struct;
pub use registry::{Codec, Converter, Hints, TypeRegistry};
pub use scanner::{ActionScanner, ScanState, dispatch};
pub use value::ScalarValue;
