//! printf-style width specs (`%020d`, `%020.2f`, `%-8s`).
//!
//! Only the subset that matters for key encoding is supported:
//! flags `-`, `+`, space and `0`; an optional width; an optional precision;
//! and one of the verbs `d`, `x`, `X`, `f`, `s`, `v`.

use crate::error::EvalError;
use std::fmt;

/// Largest width or precision a directive may carry.
pub const MAX_WIDTH: usize = 1024;

/// The conversion verb of a width spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `d`: base-10 integer.
    Decimal,
    /// `x`: lowercase base-16 integer.
    LowerHex,
    /// `X`: uppercase base-16 integer.
    UpperHex,
    /// `f`: fixed-point decimal.
    Fixed,
    /// `s`: text.
    Text,
    /// `v`: natural format of whatever value is given.
    Natural,
}

/// A parsed printf directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WidthSpec {
    raw: String,
    left_align: bool,
    plus: bool,
    space: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
    verb: Verb,
}

impl WidthSpec {
    /// Parses a directive such as `%020d`. Returns `None` if the text is not
    /// a single supported directive or its width or precision exceeds
    /// [`MAX_WIDTH`].
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix('%')?;
        let mut chars = rest.chars().peekable();

        let (mut left_align, mut plus, mut space, mut zero) = (false, false, false, false);
        while let Some(&c) = chars.peek() {
            match c {
                '-' => left_align = true,
                '+' => plus = true,
                ' ' => space = true,
                '0' => zero = true,
                _ => break,
            }
            chars.next();
        }

        let width = take_number(&mut chars)?;

        let precision = if chars.peek() == Some(&'.') {
            chars.next();
            Some(take_number(&mut chars)?.unwrap_or(0))
        } else {
            None
        };

        let verb = match chars.next()? {
            'd' => Verb::Decimal,
            'x' => Verb::LowerHex,
            'X' => Verb::UpperHex,
            'f' => Verb::Fixed,
            's' => Verb::Text,
            'v' => Verb::Natural,
            _ => return None,
        };

        if chars.next().is_some() {
            return None;
        }
        if width.max(precision).is_some_and(|n| n > MAX_WIDTH) {
            return None;
        }

        Some(Self {
            raw: raw.to_string(),
            left_align,
            plus,
            space,
            zero,
            width,
            precision,
            verb,
        })
    }

    /// Returns the directive as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the verb.
    #[must_use]
    pub const fn verb(&self) -> Verb {
        self.verb
    }

    /// Returns the minimum field width.
    #[must_use]
    pub const fn width(&self) -> Option<usize> {
        self.width
    }

    /// Returns the precision.
    #[must_use]
    pub const fn precision(&self) -> Option<usize> {
        self.precision
    }

    /// Returns true if output is right-aligned and padded with zeros to a
    /// non-zero total width.
    #[must_use]
    pub fn is_zero_padded(&self) -> bool {
        self.zero && !self.left_align && self.width.is_some_and(|w| w > 0)
    }

    /// Returns true if the verb can format integers.
    #[must_use]
    pub const fn accepts_integer(&self) -> bool {
        matches!(
            self.verb,
            Verb::Decimal | Verb::LowerHex | Verb::UpperHex | Verb::Natural
        )
    }

    /// Returns true if the verb can format floats.
    #[must_use]
    pub const fn accepts_float(&self) -> bool {
        matches!(self.verb, Verb::Fixed | Verb::Natural)
    }

    /// Returns true if the verb can format text.
    #[must_use]
    pub const fn accepts_text(&self) -> bool {
        matches!(self.verb, Verb::Text | Verb::Natural)
    }

    /// Formats an integer.
    ///
    /// Precision is a minimum digit count. With a precision the `0` flag is
    /// ignored, so padding falls back to spaces.
    #[must_use]
    pub fn format_integer(&self, n: i128) -> String {
        let magnitude = n.unsigned_abs();
        let mut digits = match self.verb {
            Verb::LowerHex => format!("{magnitude:x}"),
            Verb::UpperHex => format!("{magnitude:X}"),
            _ => magnitude.to_string(),
        };
        if let Some(p) = self.precision {
            if digits.len() < p {
                digits.insert_str(0, &"0".repeat(p - digits.len()));
            }
        }
        let zero = self.zero && self.precision.is_none();
        self.pad_number(self.sign(n < 0), &digits, zero)
    }

    /// Formats a float. Precision defaults to 6 for `f`; `v` without a
    /// precision uses the shortest round-trip form.
    pub fn format_float(&self, x: f64) -> Result<String, EvalError> {
        if !x.is_finite() {
            return Err(EvalError::NonFiniteFloat);
        }
        let body = match (self.verb, self.precision) {
            (Verb::Natural, None) => format!("{}", x.abs()),
            (_, precision) => format!("{:.*}", precision.unwrap_or(6), x.abs()),
        };
        Ok(self.pad_number(self.sign(x < 0.0), &body, self.zero))
    }

    /// Formats text. Precision truncates to that many characters; width pads
    /// with spaces, or with zeros under the `0` flag when right-aligned.
    #[must_use]
    pub fn format_text(&self, s: &str) -> String {
        let body: String = match self.precision {
            Some(p) => s.chars().take(p).collect(),
            None => s.to_string(),
        };
        let len = body.chars().count();
        match self.width {
            Some(w) if w > len => {
                if self.left_align {
                    body + &" ".repeat(w - len)
                } else if self.zero {
                    "0".repeat(w - len) + &body
                } else {
                    " ".repeat(w - len) + &body
                }
            }
            _ => body,
        }
    }

    fn sign(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        }
    }

    fn pad_number(&self, sign: &str, body: &str, zero: bool) -> String {
        let len = sign.len() + body.len();
        let Some(width) = self.width.filter(|w| *w > len) else {
            return format!("{sign}{body}");
        };
        let fill = width - len;
        if self.left_align {
            format!("{sign}{body}{}", " ".repeat(fill))
        } else if zero {
            format!("{sign}{}{body}", "0".repeat(fill))
        } else {
            format!("{}{sign}{body}", " ".repeat(fill))
        }
    }
}

impl fmt::Display for WidthSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Reads a run of ASCII digits. `Ok(None)` when there are none; `None` on
/// overflow.
fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<Option<usize>> {
    let mut value: Option<usize> = None;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        let digit = usize::try_from(d).ok()?;
        value = Some(value.unwrap_or(0).checked_mul(10)?.checked_add(digit)?);
        chars.next();
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(raw: &str) -> WidthSpec {
        WidthSpec::parse(raw).unwrap()
    }

    #[test]
    fn parse_components() {
        let s = spec("%020.2f");
        assert!(s.is_zero_padded());
        assert_eq!(s.width(), Some(20));
        assert_eq!(s.precision(), Some(2));
        assert_eq!(s.verb(), Verb::Fixed);

        let s = spec("%.2f");
        assert!(!s.is_zero_padded());
        assert_eq!(s.width(), None);

        assert_eq!(spec("%.f").precision(), Some(0));
        assert!(!spec("%-020d").is_zero_padded());
    }

    #[test]
    fn parse_rejects_garbage() {
        for raw in ["020d", "%", "%020", "%020q", "%020dd", "%99999999999999999999999d"] {
            assert!(WidthSpec::parse(raw).is_none(), "{raw} should not parse");
        }
    }

    #[test]
    fn parse_caps_width_and_precision() {
        assert_eq!(spec("%01024d").width(), Some(MAX_WIDTH));
        assert_eq!(spec("%.1024f").precision(), Some(MAX_WIDTH));
        for raw in ["%01025d", "%.70000f", "%.1025s", "%65536x", "%18446744073709551615d"] {
            assert!(WidthSpec::parse(raw).is_none(), "{raw} should not parse");
        }
    }

    #[test]
    fn zero_padded_integers() {
        assert_eq!(spec("%020d").format_integer(9), "00000000000000000009");
        assert_eq!(spec("%020d").format_integer(10), "00000000000000000010");
        assert_eq!(spec("%05d").format_integer(-42), "-0042");
        assert_eq!(spec("%+05d").format_integer(42), "+0042");
        assert_eq!(spec("%5d").format_integer(42), "   42");
        assert_eq!(spec("%-5d").format_integer(42), "42   ");
    }

    #[test]
    fn integer_precision_and_hex() {
        assert_eq!(spec("%.4d").format_integer(7), "0007");
        assert_eq!(spec("%08.4d").format_integer(7), "    0007");
        assert_eq!(spec("%08x").format_integer(255), "000000ff");
        assert_eq!(spec("%X").format_integer(255), "FF");
    }

    #[test]
    fn floats() {
        assert_eq!(spec("%020.2f").format_float(3.14159).unwrap(), "00000000000000003.14");
        assert_eq!(spec("%.2f").format_float(-1.005).unwrap(), "-1.00");
        assert_eq!(spec("%f").format_float(1.5).unwrap(), "1.500000");
        assert_eq!(spec("%v").format_float(0.25).unwrap(), "0.25");
        assert_eq!(
            spec("%08.1f").format_float(f64::NAN).unwrap_err(),
            EvalError::NonFiniteFloat
        );
    }

    #[test]
    fn text() {
        assert_eq!(spec("%8s").format_text("abc"), "     abc");
        assert_eq!(spec("%-8s").format_text("abc"), "abc     ");
        assert_eq!(spec("%.2s").format_text("abc"), "ab");
        assert_eq!(spec("%3s").format_text("ééé"), "ééé");
        assert_eq!(spec("%08s").format_text("ab"), "000000ab");
        assert_eq!(spec("%-08s").format_text("ab"), "ab      ");
    }

    #[test]
    fn verb_acceptance() {
        assert!(spec("%d").accepts_integer());
        assert!(!spec("%d").accepts_text());
        assert!(spec("%v").accepts_float());
        assert!(!spec("%s").accepts_float());
    }
}
