//! Tests for value formatting and entity encoding

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Utc};
use tablelog_protocol::{
    FormatProvider, LogEvent, LogLevel, MessageTemplate, PropertyValue, ProtocolError,
    ScalarValue, TemplateRenderer,
};
use uuid::Uuid;

use super::*;

fn at(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap()
}

fn event(template: &str) -> LogEvent {
    LogEvent::new(at("2024-01-15T10:30:45+00:00"), LogLevel::Information, template)
}

fn encode(event: &LogEvent) -> TableEntity {
    encode_entity(event, &EncoderOptions::default(), &DefaultKeyGenerator).unwrap()
}

fn encode_with(event: &LogEvent, options: &EncoderOptions) -> TableEntity {
    encode_entity(event, options, &DefaultKeyGenerator).unwrap()
}

fn with_numbered_properties(count: usize) -> LogEvent {
    let mut e = event("Many properties");
    for i in 0..count {
        e.add_property(format!("P{i}"), i as i32);
    }
    e
}

fn text(entity: &TableEntity, column: &str) -> String {
    entity
        .get(column)
        .and_then(EntityValue::as_str)
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug)]
struct FailingRenderer;

impl TemplateRenderer for FailingRenderer {
    fn render(
        &self,
        template: &MessageTemplate,
        _properties: &[(String, PropertyValue)],
        _provider: &FormatProvider,
    ) -> tablelog_protocol::Result<String> {
        Err(ProtocolError::render(template.text(), "broken renderer"))
    }
}

// =============================================================================
// Value formatting
// =============================================================================

#[test]
fn test_format_native_scalars() {
    let p = FormatProvider::default();
    let ts = Utc::now();
    let id = Uuid::new_v4();

    assert_eq!(format_value(&true.into(), &p), EntityValue::Bool(true));
    assert_eq!(format_value(&7i32.into(), &p), EntityValue::Int32(7));
    assert_eq!(format_value(&7i64.into(), &p), EntityValue::Int64(7));
    assert_eq!(format_value(&1.5f64.into(), &p), EntityValue::Double(1.5));
    assert_eq!(format_value(&"s".into(), &p), EntityValue::from("s"));
    assert_eq!(
        format_value(&vec![1u8, 2].into(), &p),
        EntityValue::Binary(Bytes::from_static(&[1, 2]))
    );
    assert_eq!(format_value(&ts.into(), &p), EntityValue::DateTime(ts));
    assert_eq!(format_value(&id.into(), &p), EntityValue::Guid(id));

    let offset = at("2024-01-15T10:30:45+02:00");
    assert_eq!(
        format_value(&offset.into(), &p),
        EntityValue::DateTimeOffset(offset)
    );
}

#[test]
fn test_format_text_fallbacks() {
    let p = FormatProvider::default();

    assert_eq!(format_value(&u64::MAX.into(), &p), EntityValue::from("18446744073709551615"));
    assert_eq!(format_value(&'x'.into(), &p), EntityValue::from("'x'"));
    assert_eq!(
        format_value(&PropertyValue::Scalar(ScalarValue::Null), &p),
        EntityValue::from("null")
    );
    assert_eq!(format_value(&2.5f32.into(), &p), EntityValue::from("2.5"));
}

#[test]
fn test_format_composites_as_text() {
    let p = FormatProvider::default();

    let seq = PropertyValue::Sequence(vec![1.into(), "a".into()]);
    assert_eq!(format_value(&seq, &p), EntityValue::from("[1, \"a\"]"));

    let st = PropertyValue::structure(Some("User"), vec![("Id".into(), 5.into())]);
    assert_eq!(format_value(&st, &p), EntityValue::from("User { Id: 5 }"));
}

#[test]
fn test_entity_value_type_names() {
    assert_eq!(EntityValue::Bool(true).type_name(), "Edm.Boolean");
    assert_eq!(EntityValue::from("x").type_name(), "Edm.String");
    assert_eq!(EntityValue::Guid(Uuid::nil()).type_name(), "Edm.Guid");
}

// =============================================================================
// Column names
// =============================================================================

#[test]
fn test_valid_column_names() {
    for name in ["Name", "_private", "user.id", "a.b.c", "Ünïcode", "x1"] {
        assert!(is_valid_column_name(name), "{name}");
    }
}

#[test]
fn test_invalid_column_names() {
    for name in ["", "1abc", "has space", "a..b", "trailing.", ".leading", "a.1b", "dash-ed", "$x"] {
        assert!(!is_valid_column_name(name), "{name}");
    }
}

// =============================================================================
// Encoding
// =============================================================================

#[test]
fn test_encode_hello_world() {
    let e = event("Hello {Name}").with_property("Name", "World");
    let entity = encode(&e);

    assert_eq!(text(&entity, COLUMN_MESSAGE_TEMPLATE), "Hello {Name}");
    assert_eq!(text(&entity, COLUMN_LEVEL), "Information");
    assert_eq!(text(&entity, COLUMN_RENDERED_MESSAGE), "Hello \"World\"");
    assert_eq!(entity.get("Name"), Some(&EntityValue::from("World")));
    assert!(!entity.contains(COLUMN_EXCEPTION));
    assert!(!entity.contains(COLUMN_AGGREGATED_PROPERTIES));
    assert_eq!(entity.column_count(), 4);
}

#[test]
fn test_encode_keys_and_timestamp() {
    let e = event("x");
    let entity = encode(&e);

    assert_eq!(entity.partition_key(), DefaultKeyGenerator.partition_key(&e));
    assert!(entity.row_key().contains("|Information|"));
    assert_eq!(entity.timestamp(), e.timestamp());
}

#[test]
fn test_encode_exception_column() {
    let e = event("Failed").with_exception("io error: disk full");
    let entity = encode(&e);
    assert_eq!(text(&entity, COLUMN_EXCEPTION), "io error: disk full");
}

#[test]
fn test_encode_column_order_follows_properties() {
    let e = event("x").with_property("B", 1).with_property("A", 2);
    let entity = encode(&e);
    let names: Vec<&str> = entity.columns().iter().map(|(n, _)| n.as_str()).collect();

    assert_eq!(
        names,
        [COLUMN_MESSAGE_TEMPLATE, COLUMN_LEVEL, COLUMN_RENDERED_MESSAGE, "B", "A"]
    );
}

#[test]
fn test_encode_drops_invalid_names() {
    let e = event("x")
        .with_property("ok.name", 1)
        .with_property("1bad", 2)
        .with_property("has space", 3);
    let entity = encode(&e);

    assert!(entity.contains("ok.name"));
    assert!(!entity.contains("1bad"));
    assert!(!entity.contains("has space"));
    assert!(!entity.contains(COLUMN_AGGREGATED_PROPERTIES));
}

#[test]
fn test_encode_reserved_names_overflow() {
    let e = event("x")
        .with_property("Level", "custom")
        .with_property(COLUMN_AGGREGATED_PROPERTIES, 1);
    let entity = encode(&e);

    assert_eq!(text(&entity, COLUMN_LEVEL), "Information");
    assert_eq!(
        text(&entity, COLUMN_AGGREGATED_PROPERTIES),
        "[(\"Level\": \"custom\"), (\"AggregatedProperties\": 1)]"
    );
}

#[test]
fn test_encode_duplicate_property_overflows() {
    let e = event("x").with_property("Id", 1).with_property("Id", 2);
    let entity = encode(&e);

    assert_eq!(entity.get("Id"), Some(&EntityValue::Int32(1)));
    assert_eq!(text(&entity, COLUMN_AGGREGATED_PROPERTIES), "[(\"Id\": 2)]");
}

#[test]
fn test_encode_allow_list() {
    let options = EncoderOptions {
        allowed_columns: Some(HashSet::from(["Keep".to_string()])),
        ..EncoderOptions::default()
    };
    let e = event("x").with_property("Keep", 1).with_property("Drop", 2);
    let entity = encode_with(&e, &options);

    assert!(entity.contains("Keep"));
    assert!(!entity.contains("Drop"));
    assert!(!entity.contains(COLUMN_AGGREGATED_PROPERTIES));
}

#[test]
fn test_encode_three_hundred_properties() {
    let entity = encode(&with_numbered_properties(300));

    assert_eq!(entity.column_count(), MAX_DATA_COLUMNS);
    assert!(entity.contains("P247"));
    assert!(!entity.contains("P248"));

    let aggregated = text(&entity, COLUMN_AGGREGATED_PROPERTIES);
    assert!(aggregated.starts_with("[(\"P248\": 248), "));
    assert!(aggregated.ends_with("(\"P299\": 299)]"));
    assert_eq!(aggregated.matches("\": ").count(), 52);
}

#[test]
fn test_encode_column_cap_holds() {
    for count in 0..=300 {
        let entity = encode(&with_numbered_properties(count));
        assert!(entity.column_count() <= MAX_DATA_COLUMNS, "count={count}");

        if count <= 248 {
            assert_eq!(entity.column_count(), 3 + count);
            assert!(!entity.contains(COLUMN_AGGREGATED_PROPERTIES));
        } else {
            assert_eq!(entity.column_count(), MAX_DATA_COLUMNS);
        }
    }
}

#[test]
fn test_encode_crops_long_strings() {
    let long = "😀".repeat(40_000);
    let e = event("{Big}").with_property("Big", long.as_str());
    let entity = encode(&e);

    let big = text(&entity, "Big");
    assert_eq!(utf16_byte_len(&big), MAX_STRING_BYTES);
    assert!(long.starts_with(&big));

    let rendered = text(&entity, COLUMN_RENDERED_MESSAGE);
    assert!(utf16_byte_len(&rendered) <= MAX_STRING_BYTES);
    assert!(rendered.starts_with('"'));

    for (_, value) in entity.columns() {
        if let Some(s) = value.as_str() {
            assert!(utf16_byte_len(s) <= MAX_STRING_BYTES);
        }
    }
}

#[test]
fn test_encode_crops_aggregated_properties() {
    let mut e = with_numbered_properties(248);
    e.add_property("Overflow", "x".repeat(MAX_STRING_BYTES));
    let entity = encode(&e);

    let aggregated = text(&entity, COLUMN_AGGREGATED_PROPERTIES);
    assert_eq!(utf16_byte_len(&aggregated), MAX_STRING_BYTES);
    assert!(aggregated.starts_with("[(\"Overflow\": \"xxx"));
}

#[test]
fn test_encode_timestamp_in_utc() {
    let e = LogEvent::new(at("2024-01-15T12:30:45+02:00"), LogLevel::Debug, "x");
    let options = EncoderOptions {
        store_timestamp_in_utc: true,
        ..EncoderOptions::default()
    };

    let utc = encode_with(&e, &options);
    assert_eq!(utc.timestamp().offset().local_minus_utc(), 0);
    assert_eq!(utc.timestamp(), e.timestamp());

    let local = encode(&e);
    assert_eq!(local.timestamp().offset().local_minus_utc(), 7200);
}

#[test]
fn test_encode_row_key_suffix() {
    let options = EncoderOptions {
        row_key_suffix: Some("web-01".into()),
        ..EncoderOptions::default()
    };
    let entity = encode_with(&event("x"), &options);
    assert!(entity.row_key().contains("|web-01|"));
}

#[test]
fn test_encode_render_failure() {
    let e = event("Hello {Name}").with_renderer(Arc::new(FailingRenderer));
    let err = encode_entity(&e, &EncoderOptions::default(), &DefaultKeyGenerator).unwrap_err();

    assert!(matches!(err, TableSinkError::Encode(_)));
    assert!(err.to_string().contains("broken renderer"));
}

#[test]
fn test_entity_encoder_uses_strategy() {
    let encoder = EntityEncoder::new(EncoderOptions::default(), Arc::new(PropertiesKeyGenerator));
    let e = event("Hello {Name}").with_property("Name", "World");

    let entity = encoder.encode(&e).unwrap();
    assert!(entity.row_key().starts_with("Information|Hello {Name}|"));
    assert_eq!(entity.partition_key(), encoder.partition_key(&e));
}

#[test]
fn test_entity_merge_replaces_and_appends() {
    let ts = at("2024-01-15T10:30:45Z");
    let mut stored = TableEntity::new("p", "r", ts);
    stored.push("A", EntityValue::Int32(1));
    stored.push("B", EntityValue::Int32(2));

    let mut update = TableEntity::new("p", "r", at("2024-01-15T10:31:00Z"));
    update.push("B", EntityValue::Int32(20));
    update.push("C", EntityValue::Int32(30));

    stored.merge(update);
    assert_eq!(stored.get("A"), Some(&EntityValue::Int32(1)));
    assert_eq!(stored.get("B"), Some(&EntityValue::Int32(20)));
    assert_eq!(stored.get("C"), Some(&EntityValue::Int32(30)));
    assert_eq!(stored.timestamp(), at("2024-01-15T10:31:00Z"));
}
