use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::error::ConversionError;
use crate::registry::{Converter, Hints};

/// Bridges any `FromStr + Display` type into the [`Converter`] interface.
///
/// Used for field types with no registered converter, such as `IpAddr` or
/// types declared with [`impl_text_codec!`](crate::impl_text_codec).
pub struct TextCodec<T>(PhantomData<fn() -> T>);

impl<T> TextCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for TextCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Converter<T> for TextCodec<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    fn to_str(&self, value: &T, _hints: &Hints) -> String {
        value.to_string()
    }

    fn from_str(&self, input: &str, _hints: &Hints) -> Result<T, ConversionError> {
        input
            .parse::<T>()
            .map_err(|err| ConversionError::of::<T>(input, err))
    }
}
