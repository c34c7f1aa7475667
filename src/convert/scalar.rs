use crate::error::ConversionError;
use crate::registry::{Converter, Hints, TypeRegistry};

#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl Converter<String> for StringConverter {
    fn to_str(&self, value: &String, _hints: &Hints) -> String {
        value.clone()
    }

    fn from_str(&self, input: &str, _hints: &Hints) -> Result<String, ConversionError> {
        Ok(input.to_string())
    }
}

/// Accepts `1 t T true TRUE True` and `0 f F false FALSE False`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolConverter;

impl Converter<bool> for BoolConverter {
    fn to_str(&self, value: &bool, _hints: &Hints) -> String {
        value.to_string()
    }

    fn from_str(&self, input: &str, _hints: &Hints) -> Result<bool, ConversionError> {
        match input.trim() {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(ConversionError::of::<bool>(input, "invalid syntax")),
        }
    }

    fn is_bool_flag(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatConverter;

impl Converter<f32> for FloatConverter {
    fn to_str(&self, value: &f32, _hints: &Hints) -> String {
        value.to_string()
    }

    fn from_str(&self, input: &str, _hints: &Hints) -> Result<f32, ConversionError> {
        input
            .trim()
            .parse()
            .map_err(|err| ConversionError::of::<f32>(input, err))
    }
}

impl Converter<f64> for FloatConverter {
    fn to_str(&self, value: &f64, _hints: &Hints) -> String {
        value.to_string()
    }

    fn from_str(&self, input: &str, _hints: &Hints) -> Result<f64, ConversionError> {
        input
            .trim()
            .parse()
            .map_err(|err| ConversionError::of::<f64>(input, err))
    }
}

pub(super) fn register(registry: &mut TypeRegistry) {
    registry.register::<String>(StringConverter);
    registry.register::<bool>(BoolConverter);
    registry.register::<f32>(FloatConverter);
    registry.register::<f64>(FloatConverter);
}
