//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use keyform_attr::AttributeValue;
use keyform_core::FieldValue;
use proptest::prelude::*;
use time::{OffsetDateTime, UtcOffset};

/// Modifier chains a generated field reference may carry.
pub const MODIFIER_CHAINS: &[&str] = &[
    "",
    ":unix",
    ":unixmilli",
    ":utc:unixnano",
    ":rfc3339",
    ":utc:rfc3339fixed",
    ":rfc3339nano",
];

/// Width specs a generated field reference may carry.
pub const WIDTH_SPECS: &[&str] = &["", ":%020d", ":%08x", ":%-5s", ":%020.2f", ":%v"];

/// Strategy for generating valid dotted field paths.
pub fn field_path_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-zA-Z0-9_]{0,11}(\\.[a-z][a-zA-Z0-9_]{0,11}){0,2}")
        .expect("Invalid regex")
}

/// Strategy for generating literal pattern text (no braces).
pub fn literal_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z0-9#_:.-]{1,8}").expect("Invalid regex")
}

/// Strategy for generating a `{...}` field reference.
pub fn field_ref_strategy() -> impl Strategy<Value = String> {
    (
        field_path_strategy(),
        prop::sample::select(MODIFIER_CHAINS),
        prop::sample::select(WIDTH_SPECS),
    )
        .prop_map(|(path, modifiers, width)| format!("{{{path}{modifiers}{width}}}"))
}

/// Strategy for generating syntactically valid patterns.
pub fn pattern_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            2 => literal_strategy(),
            3 => field_ref_strategy(),
        ],
        1..6,
    )
    .prop_map(|parts| parts.concat())
}

/// Strategy for generating timestamps between 1970 and 2100 with whole-hour
/// offsets.
pub fn timestamp_strategy() -> impl Strategy<Value = OffsetDateTime> {
    (0i64..4_102_444_800, 0u32..1_000_000_000, -12i8..=12).prop_map(|(secs, nanos, hours)| {
        let utc = OffsetDateTime::from_unix_timestamp(secs)
            .expect("timestamp in range")
            .replace_nanosecond(nanos)
            .expect("nanosecond in range");
        let offset = UtcOffset::from_hms(hours, 0, 0).expect("offset in range");
        utc.to_offset(offset)
    })
}

/// Strategy for generating typed field values.
pub fn field_value_strategy() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,16}".prop_map(FieldValue::Text),
        any::<i64>().prop_map(FieldValue::Int),
        any::<u64>().prop_map(FieldValue::UInt),
        (-1.0e12f64..1.0e12).prop_map(FieldValue::Float),
        timestamp_strategy().prop_map(FieldValue::Timestamp),
        any::<bool>().prop_map(FieldValue::Bool),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(FieldValue::Bytes),
    ]
}

/// Strategy for generating scalar stored attributes that have a string form.
pub fn scalar_attribute_strategy() -> impl Strategy<Value = AttributeValue> {
    prop_oneof![
        "[a-zA-Z0-9#]{0,16}".prop_map(AttributeValue::S),
        any::<i64>().prop_map(AttributeValue::number),
        any::<bool>().prop_map(AttributeValue::Bool),
        "[a-z]{0,8}".prop_map(|s| AttributeValue::from(s.into_bytes())),
    ]
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
