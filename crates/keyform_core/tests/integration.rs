//! End-to-end tests for pattern compilation and key derivation.

use keyform_core::{
    check_sort_safety, convert, parse, AttributeKind, AttributeMap, AttributeValue,
    CompilerConfig, ConversionError, ConversionSide, CoreError, EntityDefinition, ExtractionNode,
    FieldRef, FieldTypeTable, FieldValue, IndexCompiler, IndexDefinition, IndexParticipation,
    IndexRegistry, KeyDefinition, KeyExtractor, ParseError, PatternSpec, Segment, SemanticType,
};
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use time::{Duration, OffsetDateTime, UtcOffset};

fn field(pattern: &str) -> FieldRef {
    parse(pattern)
        .unwrap()
        .field_refs()
        .next()
        .cloned()
        .unwrap()
}

fn ticket_schema() -> FieldTypeTable {
    [
        ("tenant", "string"),
        ("id", "string"),
        ("assignee.id", "string"),
        ("priority", "u8"),
        ("createdAt", "timestamp"),
    ]
    .into_iter()
    .collect()
}

fn ticket() -> EntityDefinition {
    EntityDefinition::new(
        "Ticket",
        IndexDefinition::new("primary", KeyDefinition::new("pk", "TENANT#{tenant}"))
            .with_sort(KeyDefinition::new("sk", "TICKET#{id}")),
    )
    .with_secondary(
        IndexDefinition::new("byAssignee", KeyDefinition::new("gsi1pk", "USER#{assignee.id}"))
            .with_sort(KeyDefinition::new(
                "gsi1sk",
                "{priority:%03d}#{createdAt:utc:rfc3339fixed}",
            )),
    )
}

#[test]
fn constant_pattern() {
    let spec = parse("PROFILE").unwrap();
    assert!(spec.is_constant());
    assert_eq!(spec.constant_value(), Some("PROFILE"));
}

#[test]
fn literal_then_field() {
    let spec = parse("USER#{id}").unwrap();
    assert_eq!(spec.segments().len(), 2);
    assert_eq!(spec.segments()[0].as_literal(), Some("USER#"));
    assert_eq!(spec.segments()[1].as_field().unwrap().path(), "id");
    assert_eq!(spec.leading_literal_prefix(), "USER#");
    assert!(!spec.is_constant());
}

#[test]
fn field_order_preserved() {
    let spec = parse("ORDER#{tenant}#{id}").unwrap();
    let paths: Vec<_> = spec.field_refs().map(FieldRef::path).collect();
    assert_eq!(paths, ["tenant", "id"]);
}

#[test]
fn invalid_patterns() {
    assert_eq!(parse("").unwrap_err(), ParseError::EmptyPattern);
    assert!(matches!(
        parse("USER#{}"),
        Err(ParseError::EmptyFieldReference { offset: 5 })
    ));
    assert!(matches!(
        parse("USER#{a..b}"),
        Err(ParseError::InvalidFieldPath { .. })
    ));
}

#[test]
fn padded_integers_sort_numerically() {
    let d = convert(&field("{n:%020d}"), &SemanticType::from("i64")).unwrap();
    let nine = d.apply_value(&FieldValue::Int(9)).unwrap();
    let ten = d.apply_value(&FieldValue::Int(10)).unwrap();
    assert_eq!(nine, "00000000000000000009");
    assert_eq!(ten, "00000000000000000010");
    assert!(nine < ten);
}

#[test]
fn float_without_format_fails() {
    assert!(matches!(
        convert(&field("{price}"), &SemanticType::from("f64")),
        Err(ConversionError::MissingFloatFormat { .. })
    ));
}

#[test]
fn sortability_examples() {
    let int = SemanticType::from("int");
    assert!(check_sort_safety(&field("{count}"), &int, "E").is_some());
    assert!(check_sort_safety(&field("{count:%020d}"), &int, "E").is_none());
    assert!(check_sort_safety(&field("{ts:rfc3339}"), &SemanticType::Temporal, "E").is_some());
    assert!(
        check_sort_safety(&field("{ts:utc:rfc3339fixed}"), &SemanticType::Temporal, "E").is_none()
    );
}

#[test]
fn extraction_is_idempotent() {
    let node = ExtractionNode::build(&parse("A#{x.y}#{z}").unwrap());
    let record = AttributeMap::from([
        (
            "x".to_string(),
            AttributeValue::map([("y", AttributeValue::from("1"))]),
        ),
        ("z".to_string(), AttributeValue::number(2)),
    ]);
    let first = node.apply(AttributeKind::String, &record).unwrap();
    assert_eq!(first, node.apply(AttributeKind::String, &record).unwrap());
    assert_eq!(first, AttributeValue::from("A#1#2"));
}

#[test]
fn sparse_secondary_never_fails_on_missing_field() {
    let entity = IndexCompiler::default()
        .compile(&ticket(), &ticket_schema())
        .unwrap();
    let record = AttributeMap::from([
        ("tenant".to_string(), AttributeValue::from("acme")),
        ("id".to_string(), AttributeValue::from("t1")),
    ]);
    let keys = entity.derive_keys(&record).unwrap();
    assert!(matches!(
        keys.get("byAssignee").unwrap().participation,
        IndexParticipation::Excluded { ref missing } if missing == "assignee.id"
    ));
    assert_eq!(keys.attributes().len(), 2);

    let record = AttributeMap::from([("id".to_string(), AttributeValue::from("t1"))]);
    assert!(matches!(
        entity.derive_keys(&record),
        Err(CoreError::PrimaryKey { .. })
    ));
}

#[test]
fn rendered_keys_match_derived_keys() {
    let entity = IndexCompiler::default()
        .compile(&ticket(), &ticket_schema())
        .unwrap();
    assert!(entity.diagnostics().is_empty());

    let created = OffsetDateTime::UNIX_EPOCH + Duration::days(19_000);
    let sort = entity.index("byAssignee").unwrap().sort().unwrap();

    let mut values = HashMap::new();
    values.insert("priority".to_string(), FieldValue::UInt(2));
    values.insert("createdAt".to_string(), FieldValue::from(created));
    let rendered = sort.render(ConversionSide::Parameter, &values).unwrap();
    assert_eq!(
        rendered,
        AttributeValue::from("002#2022-01-08T00:00:00.000000000Z")
    );

    // A stored record carries the already-encoded sort key text.
    let record = AttributeMap::from([
        ("tenant".to_string(), AttributeValue::from("acme")),
        ("id".to_string(), AttributeValue::from("t1")),
        (
            "assignee".to_string(),
            AttributeValue::map([("id", AttributeValue::from("u9"))]),
        ),
        ("priority".to_string(), AttributeValue::from("002")),
        (
            "createdAt".to_string(),
            AttributeValue::from("2022-01-08T00:00:00.000000000Z"),
        ),
    ]);
    let keys = entity.derive_keys(&record).unwrap();
    assert_eq!(keys.attributes().get("gsi1sk"), Some(&rendered));
    assert_eq!(
        keys.attributes().get("gsi1pk"),
        Some(&AttributeValue::from("USER#u9"))
    );
}

#[test]
fn compilation_is_atomic() {
    let definition = ticket().with_secondary(IndexDefinition::new(
        "broken",
        KeyDefinition::new("gsi2pk", "{createdAt}"),
    ));
    assert!(matches!(
        IndexCompiler::new(CompilerConfig::new().log_diagnostics(false))
            .compile(&definition, &ticket_schema()),
        Err(CoreError::Conversion(ConversionError::MissingTemporalFormat { .. }))
    ));
}

#[test]
fn registry_serves_concurrent_readers() {
    let registry = Arc::new(IndexRegistry::new());
    let entity = IndexCompiler::default()
        .compile(&ticket(), &ticket_schema())
        .unwrap();
    registry.register(entity).unwrap();
    registry.seal();

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..100 {
                    let entity = registry.get("Ticket").unwrap();
                    assert_eq!(entity.primary().partition().prefix(), "TENANT#");
                }
            })
        })
        .collect();
    for reader in readers {
        reader.join().unwrap();
    }

    let late = IndexCompiler::default()
        .compile(
            &EntityDefinition::new(
                "Late",
                IndexDefinition::new("primary", KeyDefinition::new("pk", "{id}")),
            ),
            &ticket_schema(),
        )
        .unwrap();
    assert!(matches!(registry.register(late), Err(CoreError::RegistrySealed)));
}

#[test]
fn key_extractor_honours_pattern_kind() {
    let spec = PatternSpec::parse_with_kind("{n}", AttributeKind::Number).unwrap();
    let extractor = KeyExtractor::build(&spec);
    assert_eq!(extractor.kind(), AttributeKind::Number);
    let record = AttributeMap::from([("n".to_string(), AttributeValue::number(5))]);
    assert_eq!(extractor.apply(&record).unwrap(), AttributeValue::number(5));
    assert!(matches!(
        spec.segments()[0],
        Segment::Field(ref f) if f.path() == "n"
    ));
}

proptest! {
    #[test]
    fn zero_padded_integers_preserve_order(a in 0i64..i64::MAX, b in 0i64..i64::MAX) {
        let d = convert(&field("{n:%020d}"), &SemanticType::from("i64")).unwrap();
        let ka = d.apply_value(&FieldValue::Int(a)).unwrap();
        let kb = d.apply_value(&FieldValue::Int(b)).unwrap();
        prop_assert_eq!(a.cmp(&b), ka.cmp(&kb));
    }

    #[test]
    fn utc_fixed_timestamps_preserve_order(
        a in 0i64..4_000_000_000,
        b in 0i64..4_000_000_000,
        nanos in 0i64..1_000_000_000,
        offset_hours in -12i8..=12,
    ) {
        let d = convert(&field("{ts:utc:rfc3339fixed}"), &SemanticType::Temporal).unwrap();
        let offset = UtcOffset::from_hms(offset_hours, 0, 0).unwrap();
        let ta = (OffsetDateTime::from_unix_timestamp(a).unwrap() + Duration::nanoseconds(nanos))
            .to_offset(offset);
        let tb = OffsetDateTime::from_unix_timestamp(b).unwrap();
        let ka = d.apply_value(&FieldValue::from(ta)).unwrap();
        let kb = d.apply_value(&FieldValue::from(tb)).unwrap();
        prop_assert_eq!(ta.cmp(&tb), ka.cmp(&kb));
    }

    #[test]
    fn padded_epochs_preserve_order(a in 0i64..4_000_000_000, b in 0i64..4_000_000_000) {
        let d = convert(&field("{ts:unixmilli:%020d}"), &SemanticType::Temporal).unwrap();
        let ka = d.apply_value(&FieldValue::from(OffsetDateTime::from_unix_timestamp(a).unwrap())).unwrap();
        let kb = d.apply_value(&FieldValue::from(OffsetDateTime::from_unix_timestamp(b).unwrap())).unwrap();
        prop_assert_eq!(a.cmp(&b), ka.cmp(&kb));
    }
}
