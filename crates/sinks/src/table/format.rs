//! Property value formatting
//!
//! Maps a [`PropertyValue`] onto the store's native column types. Values with
//! no native counterpart (composites, unsigned and single-precision numbers,
//! chars, nulls) are stored as their canonical text rendering.

use tablelog_protocol::{FormatProvider, PropertyValue, ScalarValue};

use super::entity::EntityValue;

/// Convert a property value into a storable column value
pub fn format_value(value: &PropertyValue, provider: &FormatProvider) -> EntityValue {
    let PropertyValue::Scalar(scalar) = value else {
        return EntityValue::String(value.render(provider));
    };

    match scalar {
        ScalarValue::Bool(v) => EntityValue::Bool(*v),
        ScalarValue::I32(v) => EntityValue::Int32(*v),
        ScalarValue::I64(v) => EntityValue::Int64(*v),
        ScalarValue::F64(v) => EntityValue::Double(*v),
        ScalarValue::String(v) => EntityValue::String(v.clone()),
        ScalarValue::Bytes(v) => EntityValue::Binary(v.clone()),
        ScalarValue::DateTime(v) => EntityValue::DateTime(*v),
        ScalarValue::DateTimeOffset(v) => EntityValue::DateTimeOffset(*v),
        ScalarValue::Uuid(v) => EntityValue::Guid(*v),
        ScalarValue::Null
        | ScalarValue::U64(_)
        | ScalarValue::F32(_)
        | ScalarValue::Char(_) => EntityValue::String(scalar.render(provider)),
    }
}
