//! Built-in converters registered by [`TypeRegistry::with_builtins`].

mod int;
mod scalar;
mod text;
mod time;

pub use int::{IntConverter, IntWidth};
pub use scalar::{BoolConverter, FloatConverter, StringConverter};
pub use text::TextCodec;
pub use time::{
    DEFAULT_TIME_LAYOUT, DurationConverter, TimestampConverter, format_duration, parse_duration,
};

use crate::registry::TypeRegistry;

pub(crate) fn register_builtins(registry: &mut TypeRegistry) {
    int::register(registry);
    scalar::register(registry);
    time::register(registry);
}
