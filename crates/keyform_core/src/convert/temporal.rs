//! Temporal encodings.

use crate::error::EvalError;
use std::fmt;
use time::macros::format_description;
use time::OffsetDateTime;

/// Resolution of an epoch counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EpochResolution {
    /// Seconds since the Unix epoch (`unix`).
    Seconds,
    /// Milliseconds since the Unix epoch (`unixmilli`).
    Millis,
    /// Nanoseconds since the Unix epoch (`unixnano`).
    Nanos,
}

impl EpochResolution {
    /// Returns the modifier token naming this resolution.
    #[must_use]
    pub const fn modifier(self) -> &'static str {
        match self {
            EpochResolution::Seconds => "unix",
            EpochResolution::Millis => "unixmilli",
            EpochResolution::Nanos => "unixnano",
        }
    }
}

/// A string encoding of a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimestampFormat {
    /// `2024-05-01T09:30:00+02:00`; whole seconds, offset preserved.
    Rfc3339,
    /// `2024-05-01T07:30:00.120000000Z`; always nine fraction digits.
    Rfc3339Fixed,
    /// `2024-05-01T07:30:00.12Z`; fraction with trailing zeros removed.
    Rfc3339Nano,
    /// A `time` format description such as `[year][month][day]`.
    Layout(String),
}

impl TimestampFormat {
    /// Returns the modifier token naming this format.
    #[must_use]
    pub fn modifier(&self) -> &str {
        match self {
            TimestampFormat::Rfc3339 => "rfc3339",
            TimestampFormat::Rfc3339Fixed => "rfc3339fixed",
            TimestampFormat::Rfc3339Nano => "rfc3339nano",
            TimestampFormat::Layout(layout) => layout,
        }
    }
}

/// The primary format of a temporal field reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemporalFormat {
    /// Integer epoch counter.
    Epoch(EpochResolution),
    /// String timestamp.
    Timestamp(TimestampFormat),
}

impl TemporalFormat {
    /// Interprets a primary modifier. Unknown tokens are custom layouts.
    #[must_use]
    pub fn from_modifier(token: &str) -> Self {
        match token {
            "unix" => TemporalFormat::Epoch(EpochResolution::Seconds),
            "unixmilli" => TemporalFormat::Epoch(EpochResolution::Millis),
            "unixnano" => TemporalFormat::Epoch(EpochResolution::Nanos),
            "rfc3339" => TemporalFormat::Timestamp(TimestampFormat::Rfc3339),
            "rfc3339fixed" => TemporalFormat::Timestamp(TimestampFormat::Rfc3339Fixed),
            "rfc3339nano" => TemporalFormat::Timestamp(TimestampFormat::Rfc3339Nano),
            layout => TemporalFormat::Timestamp(TimestampFormat::Layout(layout.to_string())),
        }
    }
}

impl fmt::Display for TemporalFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalFormat::Epoch(res) => f.write_str(res.modifier()),
            TemporalFormat::Timestamp(format) => f.write_str(format.modifier()),
        }
    }
}

/// Checks that a custom layout is a valid format description.
pub(crate) fn validate_layout(layout: &str) -> Result<(), String> {
    time::format_description::parse(layout)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Counts epoch units. Millisecond counts floor toward negative infinity so
/// that pre-epoch instants keep their order.
pub(crate) fn epoch(t: OffsetDateTime, resolution: EpochResolution) -> Result<i64, EvalError> {
    match resolution {
        EpochResolution::Seconds => Ok(t.unix_timestamp()),
        EpochResolution::Millis => i64::try_from(t.unix_timestamp_nanos().div_euclid(1_000_000))
            .map_err(|_| EvalError::out_of_range("millisecond epoch exceeds i64")),
        EpochResolution::Nanos => i64::try_from(t.unix_timestamp_nanos())
            .map_err(|_| EvalError::out_of_range("nanosecond epoch exceeds i64")),
    }
}

/// Formats a timestamp in one of the string encodings.
pub(crate) fn format_timestamp(
    t: OffsetDateTime,
    format: &TimestampFormat,
) -> Result<String, EvalError> {
    let mut out = match format {
        TimestampFormat::Layout(layout) => {
            let items = time::format_description::parse(layout).map_err(temporal_error)?;
            return t.format(items.as_slice()).map_err(temporal_error);
        }
        _ => t
            .format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second]"
            ))
            .map_err(temporal_error)?,
    };

    let nanos = t.nanosecond();
    match format {
        TimestampFormat::Rfc3339Fixed => out.push_str(&format!(".{nanos:09}")),
        TimestampFormat::Rfc3339Nano if nanos != 0 => {
            let fraction = format!("{nanos:09}");
            out.push('.');
            out.push_str(fraction.trim_end_matches('0'));
        }
        _ => {}
    }

    if t.offset().is_utc() {
        out.push('Z');
    } else {
        let offset = t
            .format(format_description!(
                "[offset_hour sign:mandatory]:[offset_minute]"
            ))
            .map_err(temporal_error)?;
        out.push_str(&offset);
    }
    Ok(out)
}

fn temporal_error(e: impl fmt::Display) -> EvalError {
    EvalError::Temporal {
        message: e.to_string(),
    }
}
