use crate::error::ConversionError;
use crate::flagset::FlagValue;
use crate::registry::{Codec, Hints};

/// A single struct field exposed as an option through a [`Codec`].
pub struct ScalarValue<'a, T> {
    slot: &'a mut T,
    codec: Codec<T>,
    hints: Hints,
}

impl<'a, T> ScalarValue<'a, T> {
    pub fn new(slot: &'a mut T, codec: Codec<T>, hints: Hints) -> Self {
        Self { slot, codec, hints }
    }
}

impl<T> FlagValue for ScalarValue<'_, T> {
    fn render(&self) -> String {
        self.codec.to_str(&*self.slot, &self.hints)
    }

    fn set(&mut self, input: &str) -> Result<(), ConversionError> {
        *self.slot = self.codec.from_str(input, &self.hints)?;
        Ok(())
    }

    fn is_bool_flag(&self) -> bool {
        self.codec.is_bool_flag()
    }
}
