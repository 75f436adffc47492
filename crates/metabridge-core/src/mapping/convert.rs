//! Value conversion between catalog fields and generic properties.

use crate::{
    catalog::FieldValue,
    types::{PrimitiveValue, PropertyValue, epoch_millis},
};
use time::OffsetDateTime;

/// Generic value of a catalog field. Null fields and empty reference lists
/// have no generic value; references surface as the referenced name when
/// known, else the id.
#[must_use]
pub fn field_to_property(value: &FieldValue) -> Option<PropertyValue> {
    let out = match value {
        FieldValue::Bool(v) => PropertyValue::bool(*v),
        FieldValue::Date(ms) => PropertyValue::date(date_from_millis(*ms)?),
        FieldValue::Float(v) => PropertyValue::Primitive(PrimitiveValue::Float(*v)),
        FieldValue::Int(v) => PropertyValue::int(*v),
        FieldValue::Text(v) => PropertyValue::string(v.clone()),
        FieldValue::Reference(r) => PropertyValue::string(r.name.clone().unwrap_or_else(|| r.id.clone())),
        FieldValue::References(refs) if !refs.is_empty() => PropertyValue::Array(
            refs.iter()
                .map(|r| PropertyValue::string(r.name.clone().unwrap_or_else(|| r.id.clone())))
                .collect(),
        ),
        FieldValue::References(_) | FieldValue::Null => return None,
    };

    Some(out)
}

/// Catalog value for a generic property being written. Only scalar values
/// can be written.
#[must_use]
pub fn property_to_field(value: &PropertyValue) -> Option<FieldValue> {
    match value {
        PropertyValue::Primitive(p) => Some(match p {
            PrimitiveValue::Bool(v) => FieldValue::Bool(*v),
            PrimitiveValue::Date(v) => FieldValue::Date(epoch_millis(*v)),
            PrimitiveValue::Float(v) => FieldValue::Float(*v),
            PrimitiveValue::Int(v) => FieldValue::Int(*v),
            PrimitiveValue::String(v) => FieldValue::Text(v.clone()),
        }),
        PropertyValue::Enum { symbolic_name, .. } => Some(FieldValue::Text(symbolic_name.clone())),
        PropertyValue::Array(_) | PropertyValue::Map(_) => None,
    }
}

#[must_use]
pub fn date_from_millis(ms: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).ok()
}
