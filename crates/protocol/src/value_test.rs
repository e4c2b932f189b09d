//! Tests for property value rendering

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use super::*;

fn provider() -> FormatProvider {
    FormatProvider::default()
}

// =============================================================================
// Scalars
// =============================================================================

#[test]
fn test_scalar_rendering() {
    let p = provider();
    assert_eq!(ScalarValue::Null.render(&p), "null");
    assert_eq!(ScalarValue::Bool(true).render(&p), "true");
    assert_eq!(ScalarValue::I32(-7).render(&p), "-7");
    assert_eq!(ScalarValue::U64(u64::MAX).render(&p), "18446744073709551615");
    assert_eq!(ScalarValue::F64(1.5).render(&p), "1.5");
    assert_eq!(ScalarValue::Char('x').render(&p), "'x'");
    assert_eq!(ScalarValue::from("hi").render(&p), "\"hi\"");
    assert_eq!(ScalarValue::from(vec![0x0a, 0xff]).render(&p), "0x0aff");
}

#[test]
fn test_string_quotes_are_escaped() {
    let rendered = ScalarValue::from("say \"hi\"").render(&provider());
    assert_eq!(rendered, r#""say \"hi\"""#);
}

#[test]
fn test_timestamp_rendering() {
    let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    assert_eq!(ScalarValue::DateTime(ts).render(&provider()), "2024-03-01T12:30:00Z");

    let custom = provider().with_timestamp_format("%Y/%m/%d");
    assert_eq!(ScalarValue::DateTime(ts).render(&custom), "2024/03/01");
}

#[test]
fn test_decimal_separator() {
    let p = provider().with_decimal_separator(',');
    assert_eq!(ScalarValue::F64(2.25).render(&p), "2,25");
}

#[test]
fn test_uuid_rendering() {
    let id = Uuid::nil();
    assert_eq!(
        ScalarValue::Uuid(id).render(&provider()),
        "00000000-0000-0000-0000-000000000000"
    );
}

// =============================================================================
// Composites
// =============================================================================

#[test]
fn test_sequence_rendering() {
    let value = PropertyValue::Sequence(vec![1.into(), "a".into(), 2.5.into()]);
    assert_eq!(value.render(&provider()), r#"[1, "a", 2.5]"#);
}

#[test]
fn test_empty_sequence() {
    assert_eq!(PropertyValue::Sequence(vec![]).render(&provider()), "[]");
}

#[test]
fn test_mapping_rendering_keeps_order_and_duplicates() {
    let value = PropertyValue::Mapping(vec![
        ("b".into(), 1.into()),
        (ScalarValue::I32(2), "two".into()),
        ("b".into(), 3.into()),
    ]);
    assert_eq!(
        value.render(&provider()),
        r#"[("b": 1), (2: "two"), ("b": 3)]"#
    );
}

#[test]
fn test_structure_rendering() {
    let value = PropertyValue::structure(
        Some("Point"),
        vec![("X".into(), 1.into()), ("Y".into(), 2.into())],
    );
    assert_eq!(value.render(&provider()), "Point { X: 1, Y: 2 }");

    let anonymous = PropertyValue::structure(None::<String>, vec![("A".into(), true.into())]);
    assert_eq!(anonymous.render(&provider()), "{ A: true }");

    let empty = PropertyValue::structure(Some("Empty"), vec![]);
    assert_eq!(empty.render(&provider()), "Empty { }");
}

#[test]
fn test_nested_rendering() {
    let inner = PropertyValue::Sequence(vec!["x".into()]);
    let value = PropertyValue::structure(Some("Outer"), vec![("Items".into(), inner)]);
    assert_eq!(value.render(&provider()), r#"Outer { Items: ["x"] }"#);
}

#[test]
fn test_deep_nesting_is_cut() {
    let mut value = PropertyValue::from(1);
    for _ in 0..1_000 {
        value = PropertyValue::Sequence(vec![value]);
    }

    let rendered = value.render(&provider());
    assert!(rendered.ends_with("]"));
    assert!(rendered.contains("..."));
    assert_eq!(rendered.matches('[').count(), MAX_RENDER_DEPTH);

    // drop iteratively enough for the test thread stack
    let mut stack = vec![value];
    while let Some(v) = stack.pop() {
        if let PropertyValue::Sequence(items) = v {
            stack.extend(items);
        }
    }
}
