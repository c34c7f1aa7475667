//! Durations and timestamps.

use std::fmt::Write;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

use crate::error::{ConversionError, HintError};
use crate::registry::{Converter, Hints, TypeRegistry};

/// Layout used when a field carries no `layout` hint.
pub const DEFAULT_TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(NANOS_PER_MINUTE),
        "h" => Some(NANOS_PER_HOUR),
        _ => None,
    }
}

/// Parse a literal such as `1h30m`, `-1.5s` or `300ms`.
///
/// Returns the sign and the magnitude in nanoseconds. A bare `0` needs no unit.
pub fn parse_duration(input: &str) -> Result<(bool, u128), String> {
    let mut rest = input.trim();
    let mut negative = false;
    if let Some(tail) = rest.strip_prefix('-') {
        negative = true;
        rest = tail;
    } else if let Some(tail) = rest.strip_prefix('+') {
        rest = tail;
    }
    if rest == "0" {
        return Ok((negative, 0));
    }
    if rest.is_empty() {
        return Err(format!("invalid duration {input:?}"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (int_part, tail) = rest.split_at(int_len);
        rest = tail;

        let mut frac_part = "";
        if let Some(tail) = rest.strip_prefix('.') {
            let frac_len = tail
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(tail.len());
            frac_part = &tail[..frac_len];
            rest = &tail[frac_len..];
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(format!("invalid duration {input:?}"));
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, tail) = rest.split_at(unit_len);
        rest = tail;
        if unit.is_empty() {
            return Err(format!("missing unit in duration {input:?}"));
        }
        let scale =
            unit_nanos(unit).ok_or_else(|| format!("unknown unit {unit:?} in duration {input:?}"))?;

        let overflow = || format!("invalid duration {input:?}: out of range");
        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };
        let mut component = whole.checked_mul(scale).ok_or_else(overflow)?;
        if !frac_part.is_empty() {
            // Digits past nanosecond resolution of the largest unit cannot matter.
            let digits = &frac_part[..frac_part.len().min(18)];
            let numerator: u128 = digits.parse().map_err(|_| overflow())?;
            component += numerator * scale / 10u128.pow(digits.len() as u32);
        }
        total = total.checked_add(component).ok_or_else(overflow)?;
    }
    Ok((negative, total))
}

/// Canonical rendering: `0s`, `750ns`, `1.5µs`, `20ms`, `1h30m0s`, `2m0.5s`.
pub fn format_duration(negative: bool, nanos: u128) -> String {
    if nanos == 0 {
        return "0s".to_string();
    }
    let body = if nanos < NANOS_PER_MICRO {
        format!("{nanos}ns")
    } else if nanos < NANOS_PER_MILLI {
        format!("{}µs", decimal(nanos, NANOS_PER_MICRO, 3))
    } else if nanos < NANOS_PER_SEC {
        format!("{}ms", decimal(nanos, NANOS_PER_MILLI, 6))
    } else {
        let hours = nanos / NANOS_PER_HOUR;
        let minutes = (nanos % NANOS_PER_HOUR) / NANOS_PER_MINUTE;
        let rest = nanos % NANOS_PER_MINUTE;
        let mut out = String::new();
        if hours > 0 {
            write!(&mut out, "{hours}h").ok();
        }
        if hours > 0 || minutes > 0 {
            write!(&mut out, "{minutes}m").ok();
        }
        write!(&mut out, "{}s", decimal(rest, NANOS_PER_SEC, 9)).ok();
        out
    };
    if negative { format!("-{body}") } else { body }
}

fn decimal(value: u128, unit: u128, width: usize) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Compound duration literals (`1h30m`, `-1.5s`) for `std::time::Duration` and `chrono::TimeDelta`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationConverter;

impl Converter<Duration> for DurationConverter {
    fn to_str(&self, value: &Duration, _hints: &Hints) -> String {
        format_duration(false, value.as_nanos())
    }

    fn from_str(&self, input: &str, _hints: &Hints) -> Result<Duration, ConversionError> {
        let (negative, nanos) =
            parse_duration(input).map_err(|reason| ConversionError::of::<Duration>(input, reason))?;
        if negative && nanos != 0 {
            return Err(ConversionError::of::<Duration>(
                input,
                "negative durations are not representable",
            ));
        }
        let secs = u64::try_from(nanos / NANOS_PER_SEC)
            .map_err(|_| ConversionError::of::<Duration>(input, "value out of range"))?;
        Ok(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
    }
}

impl Converter<TimeDelta> for DurationConverter {
    fn to_str(&self, value: &TimeDelta, _hints: &Hints) -> String {
        let total = value.num_seconds() as i128 * NANOS_PER_SEC as i128
            + value.subsec_nanos() as i128;
        format_duration(total < 0, total.unsigned_abs())
    }

    fn from_str(&self, input: &str, _hints: &Hints) -> Result<TimeDelta, ConversionError> {
        let (negative, nanos) =
            parse_duration(input).map_err(|reason| ConversionError::of::<TimeDelta>(input, reason))?;
        let out_of_range = || ConversionError::of::<TimeDelta>(input, "value out of range");
        let magnitude = i128::try_from(nanos).map_err(|_| out_of_range())?;
        let total = if negative { -magnitude } else { magnitude };
        let secs = i64::try_from(total.div_euclid(NANOS_PER_SEC as i128))
            .map_err(|_| out_of_range())?;
        let subsec = total.rem_euclid(NANOS_PER_SEC as i128) as u32;
        TimeDelta::new(secs, subsec).ok_or_else(out_of_range)
    }
}

/// strftime-style timestamps; the `layout` hint overrides [`DEFAULT_TIME_LAYOUT`].
///
/// Layouts without an offset are read as UTC. A layout without a time of day
/// yields midnight.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampConverter;

fn layout(hints: &Hints) -> &str {
    hints.get("layout").unwrap_or(DEFAULT_TIME_LAYOUT)
}

fn check_layout(hints: &Hints) -> Result<(), HintError> {
    let layout = layout(hints);
    if StrftimeItems::new(layout).any(|item| matches!(item, Item::Error)) {
        return Err(HintError {
            hint: "layout",
            value: layout.to_string(),
            reason: "not a valid strftime layout".to_string(),
        });
    }
    Ok(())
}

fn parse_naive(input: &str, layout: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(input, layout).or_else(|err| {
        match NaiveDate::parse_from_str(input, layout)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            Some(midnight) => Ok(midnight),
            None => Err(err),
        }
    })
}

// Some layouts only fail when formatting (`%z` on a naive value); those fall
// back to the default layout so rendering stays total.
fn render(format: impl Fn(&str, &mut String) -> std::fmt::Result, hints: &Hints) -> String {
    let mut out = String::new();
    if check_layout(hints).is_ok() && format(layout(hints), &mut out).is_ok() {
        return out;
    }
    out.clear();
    format(DEFAULT_TIME_LAYOUT, &mut out).ok();
    out
}

impl Converter<DateTime<Utc>> for TimestampConverter {
    fn to_str(&self, value: &DateTime<Utc>, hints: &Hints) -> String {
        render(|layout, out| write!(out, "{}", value.format(layout)), hints)
    }

    fn from_str(&self, input: &str, hints: &Hints) -> Result<DateTime<Utc>, ConversionError> {
        check_layout(hints).map_err(|err| ConversionError::of::<DateTime<Utc>>(input, err))?;
        let layout = layout(hints);
        let literal = input.trim();
        DateTime::parse_from_str(literal, layout)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| parse_naive(literal, layout).map(|naive| naive.and_utc()))
            .map_err(|err| ConversionError::of::<DateTime<Utc>>(input, err))
    }

    fn check_hints(&self, hints: &Hints) -> Result<(), HintError> {
        check_layout(hints)
    }
}

impl Converter<NaiveDateTime> for TimestampConverter {
    fn to_str(&self, value: &NaiveDateTime, hints: &Hints) -> String {
        render(|layout, out| write!(out, "{}", value.format(layout)), hints)
    }

    fn from_str(&self, input: &str, hints: &Hints) -> Result<NaiveDateTime, ConversionError> {
        check_layout(hints).map_err(|err| ConversionError::of::<NaiveDateTime>(input, err))?;
        parse_naive(input.trim(), layout(hints))
            .map_err(|err| ConversionError::of::<NaiveDateTime>(input, err))
    }

    fn check_hints(&self, hints: &Hints) -> Result<(), HintError> {
        check_layout(hints)
    }
}

pub(super) fn register(registry: &mut TypeRegistry) {
    registry.register::<Duration>(DurationConverter);
    registry.register::<TimeDelta>(DurationConverter);
    registry.register::<DateTime<Utc>>(TimestampConverter);
    registry.register::<NaiveDateTime>(TimestampConverter);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn compound_literals() {
        assert_eq!(parse_duration("1h30m").unwrap(), (false, 90 * NANOS_PER_MINUTE));
        assert_eq!(parse_duration("-1.5s").unwrap(), (true, 1_500_000_000));
        assert_eq!(parse_duration("300ms").unwrap(), (false, 300 * NANOS_PER_MILLI));
        assert_eq!(parse_duration("2us").unwrap(), parse_duration("2µs").unwrap());
        assert_eq!(parse_duration(".5m").unwrap(), (false, 30 * NANOS_PER_SEC));
        assert_eq!(parse_duration("0").unwrap(), (false, 0));
    }

    #[test]
    fn malformed_literals() {
        for bad in ["", "h", "10", "1x", "--1s", "1.5.3h", "."] {
            assert!(parse_duration(bad).is_err(), "{bad:?} should fail");
        }
        // a trailing dot still leaves a complete number
        assert_eq!(parse_duration("1.h").unwrap(), (false, NANOS_PER_HOUR));
    }

    #[test]
    fn canonical_rendering() {
        assert_eq!(format_duration(false, 0), "0s");
        assert_eq!(format_duration(false, 750), "750ns");
        assert_eq!(format_duration(false, 1_500), "1.5µs");
        assert_eq!(format_duration(false, 20 * NANOS_PER_MILLI), "20ms");
        assert_eq!(format_duration(false, 90 * NANOS_PER_MINUTE), "1h30m0s");
        assert_eq!(format_duration(true, 2 * NANOS_PER_MINUTE + NANOS_PER_SEC / 2), "-2m0.5s");
    }

    #[test]
    fn durations_round_trip() {
        let hints = Hints::new();
        for value in [
            Duration::ZERO,
            Duration::from_nanos(1),
            Duration::from_micros(1_234),
            Duration::from_millis(5_400_123),
            Duration::new(86_400 * 365, 999_999_999),
        ] {
            let text = DurationConverter.to_str(&value, &hints);
            let back: Duration = DurationConverter.from_str(&text, &hints).unwrap();
            assert_eq!(back, value, "literal {text}");
        }
        for value in [
            TimeDelta::zero(),
            TimeDelta::milliseconds(-1_500),
            TimeDelta::nanoseconds(-7),
            TimeDelta::hours(49) + TimeDelta::nanoseconds(3),
        ] {
            let text = DurationConverter.to_str(&value, &hints);
            let back: TimeDelta = DurationConverter.from_str(&text, &hints).unwrap();
            assert_eq!(back, value, "literal {text}");
        }
    }

    #[test]
    fn negative_std_duration_is_rejected() {
        let err = Converter::<Duration>::from_str(&DurationConverter, "-1s", &Hints::new())
            .unwrap_err();
        assert_eq!(err.literal, "-1s");
    }

    #[test]
    fn timestamp_default_layout_round_trip() {
        let hints = Hints::new();
        let value = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 1).unwrap();
        let text = TimestampConverter.to_str(&value, &hints);
        assert_eq!(text, "2024-02-29 23:59:01");
        let back: DateTime<Utc> = TimestampConverter.from_str(&text, &hints).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn timestamp_layout_hint() {
        let hints = Hints::new().with("layout", "%Y %d %b %H:%M");
        let back: DateTime<Utc> = TimestampConverter.from_str("2023 02 Jan 15:04", &hints).unwrap();
        assert_eq!(back, Utc.with_ymd_and_hms(2023, 1, 2, 15, 4, 0).unwrap());

        let mismatch = Converter::<DateTime<Utc>>::from_str(
            &TimestampConverter,
            "2023-01-02 15:04:00",
            &hints,
        );
        assert!(mismatch.is_err());
    }

    #[test]
    fn date_only_layout_yields_midnight() {
        let hints = Hints::new().with("layout", "%Y-%m-%d");
        let back: NaiveDateTime = TimestampConverter.from_str("2020-05-17", &hints).unwrap();
        assert_eq!(
            back,
            NaiveDate::from_ymd_opt(2020, 5, 17)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn broken_layout_is_a_hint_error() {
        let hints = Hints::new().with("layout", "%Q");
        let err = Converter::<NaiveDateTime>::check_hints(&TimestampConverter, &hints).unwrap_err();
        assert_eq!(err.hint, "layout");
        let value = NaiveDate::from_ymd_opt(2020, 5, 17)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(TimestampConverter.to_str(&value, &hints), "2020-05-17 00:00:00");
    }
}
