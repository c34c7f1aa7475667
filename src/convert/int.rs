use crate::error::{ConversionError, HintError};
use crate::registry::{Converter, Hints, TypeRegistry};

/// Declared width of an integer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    /// Pointer-sized (`isize` / `usize`).
    Unsized,
    Bits8,
    Bits16,
    Bits32,
    Bits64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::Unsized => usize::BITS,
            IntWidth::Bits8 => 8,
            IntWidth::Bits16 => 16,
            IntWidth::Bits32 => 32,
            IntWidth::Bits64 => 64,
        }
    }
}

/// Integer conversion honouring the `base` hint (2, 8, 10 or 16).
///
/// Literals may carry the prefix matching the base (`0x`, `0o`, `0b`).
/// Negative values render as sign plus magnitude in every base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntConverter {
    width: IntWidth,
    signed: bool,
}

impl IntConverter {
    pub const fn signed(width: IntWidth) -> Self {
        Self {
            width,
            signed: true,
        }
    }

    pub const fn unsigned(width: IntWidth) -> Self {
        Self {
            width,
            signed: false,
        }
    }

    /// Inclusive bounds of the declared width.
    pub fn bounds(&self) -> (i128, i128) {
        let bits = self.width.bits();
        if self.signed {
            (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
        } else {
            (0, (1i128 << bits) - 1)
        }
    }

    fn parse(&self, input: &str, radix: u32) -> Result<i128, String> {
        let literal = input.trim();
        let (negative, unsigned_part) = match literal.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, literal.strip_prefix('+').unwrap_or(literal)),
        };
        if negative && !self.signed {
            return Err("invalid syntax".to_string());
        }
        let digits = strip_radix_prefix(unsigned_part, radix);
        if digits.starts_with(['+', '-']) {
            return Err("invalid syntax".to_string());
        }
        let magnitude = u128::from_str_radix(digits, radix).map_err(|err| err.to_string())?;
        if magnitude > u64::MAX as u128 {
            return Err("value out of range".to_string());
        }
        let value = if negative {
            -(magnitude as i128)
        } else {
            magnitude as i128
        };
        let (min, max) = self.bounds();
        if value < min || value > max {
            return Err("value out of range".to_string());
        }
        Ok(value)
    }
}

impl<T> Converter<T> for IntConverter
where
    T: Copy + TryFrom<i128> + TryInto<i128> + Send + Sync,
{
    fn to_str(&self, value: &T, hints: &Hints) -> String {
        let radix = radix(hints).unwrap_or(10);
        match (*value).try_into() {
            Ok(n) => format_radix(n, radix),
            Err(_) => String::new(),
        }
    }

    fn from_str(&self, input: &str, hints: &Hints) -> Result<T, ConversionError> {
        let radix = radix(hints).map_err(|err| ConversionError::of::<T>(input, err))?;
        let value = self
            .parse(input, radix)
            .map_err(|reason| ConversionError::of::<T>(input, reason))?;
        T::try_from(value).map_err(|_| ConversionError::of::<T>(input, "value out of range"))
    }

    fn check_hints(&self, hints: &Hints) -> Result<(), HintError> {
        radix(hints).map(|_| ())
    }
}

/// Radix selected by the `base` hint, 10 when absent.
pub(crate) fn radix(hints: &Hints) -> Result<u32, HintError> {
    match hints.get("base") {
        None => Ok(10),
        Some("2") => Ok(2),
        Some("8") => Ok(8),
        Some("10") => Ok(10),
        Some("16") => Ok(16),
        Some(other) => Err(HintError {
            hint: "base",
            value: other.to_string(),
            reason: "base must be one of 2, 8, 10 or 16".to_string(),
        }),
    }
}

fn strip_radix_prefix(digits: &str, radix: u32) -> &str {
    let prefixes: &[&str] = match radix {
        2 => &["0b", "0B"],
        8 => &["0o", "0O"],
        16 => &["0x", "0X"],
        _ => &[],
    };
    prefixes
        .iter()
        .find_map(|p| digits.strip_prefix(p))
        .unwrap_or(digits)
}

fn format_radix(value: i128, radix: u32) -> String {
    let magnitude = value.unsigned_abs();
    let digits = match radix {
        2 => format!("{magnitude:b}"),
        8 => format!("{magnitude:o}"),
        16 => format!("{magnitude:x}"),
        _ => magnitude.to_string(),
    };
    if value < 0 {
        format!("-{digits}")
    } else {
        digits
    }
}

pub(super) fn register(registry: &mut TypeRegistry) {
    registry.register::<isize>(IntConverter::signed(IntWidth::Unsized));
    registry.register::<i8>(IntConverter::signed(IntWidth::Bits8));
    registry.register::<i16>(IntConverter::signed(IntWidth::Bits16));
    registry.register::<i32>(IntConverter::signed(IntWidth::Bits32));
    registry.register::<i64>(IntConverter::signed(IntWidth::Bits64));
    registry.register::<usize>(IntConverter::unsigned(IntWidth::Unsized));
    registry.register::<u8>(IntConverter::unsigned(IntWidth::Bits8));
    registry.register::<u16>(IntConverter::unsigned(IntWidth::Bits16));
    registry.register::<u32>(IntConverter::unsigned(IntWidth::Bits32));
    registry.register::<u64>(IntConverter::unsigned(IntWidth::Bits64));
}
