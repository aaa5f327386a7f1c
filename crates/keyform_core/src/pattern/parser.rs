//! Pattern string scanner.

use super::{FieldRef, Segment};
use crate::error::ParseError;

/// Splits a raw pattern into literal and field-reference segments.
///
/// Braces are ASCII, so scanning bytes never splits a UTF-8 sequence and
/// every slice boundary below is a char boundary.
pub(super) fn scan(raw: &str) -> Result<Vec<Segment>, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::EmptyPattern);
    }

    let bytes = raw.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => {
                let open = pos;
                let close = find_close(bytes, open)?;

                if open > literal_start {
                    segments.push(Segment::Literal {
                        value: raw[literal_start..open].to_string(),
                        offset: literal_start,
                    });
                }

                let body = &raw[open + 1..close];
                if body.is_empty() {
                    return Err(ParseError::EmptyFieldReference { offset: open });
                }
                segments.push(Segment::Field(FieldRef::parse_at(body, open + 1)?));

                pos = close + 1;
                literal_start = pos;
            }
            b'}' => return Err(ParseError::UnexpectedClosingBrace { offset: pos }),
            _ => pos += 1,
        }
    }

    if literal_start < bytes.len() {
        segments.push(Segment::Literal {
            value: raw[literal_start..].to_string(),
            offset: literal_start,
        });
    }

    Ok(segments)
}

fn find_close(bytes: &[u8], open: usize) -> Result<usize, ParseError> {
    for (i, b) in bytes.iter().enumerate().skip(open + 1) {
        match b {
            b'}' => return Ok(i),
            b'{' => return Err(ParseError::NestedFieldReference { offset: i }),
            _ => {}
        }
    }
    Err(ParseError::UnclosedFieldReference { offset: open })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_only() {
        let segments = scan("PROFILE").unwrap();
        assert_eq!(
            segments,
            vec![Segment::Literal {
                value: "PROFILE".to_string(),
                offset: 0
            }]
        );
    }

    #[test]
    fn adjacent_references() {
        let segments = scan("{a}{b}").unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].as_field().map(FieldRef::path), Some("a"));
        assert_eq!(segments[1].as_field().map(FieldRef::path), Some("b"));
        assert_eq!(segments[1].offset(), 4);
    }

    #[test]
    fn trailing_literal_kept() {
        let segments = scan("{id}#META").unwrap();
        assert_eq!(segments[1].as_literal(), Some("#META"));
        assert_eq!(segments[1].offset(), 4);
    }

    #[test]
    fn multibyte_literals() {
        let segments = scan("ünï#{id}→").unwrap();
        assert_eq!(segments[0].as_literal(), Some("ünï#"));
        assert_eq!(segments[2].as_literal(), Some("→"));
    }

    #[test]
    fn brace_errors() {
        assert_eq!(
            scan("USER#{id").unwrap_err(),
            ParseError::UnclosedFieldReference { offset: 5 }
        );
        assert_eq!(
            scan("USER#id}").unwrap_err(),
            ParseError::UnexpectedClosingBrace { offset: 7 }
        );
        assert_eq!(
            scan("{a{b}}").unwrap_err(),
            ParseError::NestedFieldReference { offset: 2 }
        );
        assert_eq!(
            scan("X{}").unwrap_err(),
            ParseError::EmptyFieldReference { offset: 1 }
        );
    }

    #[test]
    fn path_offsets_point_into_raw() {
        assert_eq!(
            scan("USER#{a..b}").unwrap_err(),
            ParseError::InvalidFieldPath {
                path: "a..b".to_string(),
                offset: 6
            }
        );
    }
}
