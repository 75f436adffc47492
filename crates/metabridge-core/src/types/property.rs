use std::collections::BTreeMap;
use time::OffsetDateTime;

///
/// PrimitiveValue
///

#[derive(Clone, Debug, PartialEq)]
pub enum PrimitiveValue {
    Bool(bool),
    Date(OffsetDateTime),
    Float(f64),
    Int(i64),
    String(String),
}

impl PrimitiveValue {
    /// Literal form used when the value is compared inside a catalog
    /// condition. Dates compare as epoch milliseconds.
    #[must_use]
    pub fn literal(&self) -> String {
        match self {
            Self::Bool(v) => v.to_string(),
            Self::Date(v) => epoch_millis(*v).to_string(),
            Self::Float(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::String(v) => v.clone(),
        }
    }
}

/// Milliseconds since the unix epoch, saturating at the i64 range.
#[must_use]
pub fn epoch_millis(at: OffsetDateTime) -> i64 {
    i64::try_from(at.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

///
/// PropertyValue
///
/// A typed generic property value. Maps and arrays nest arbitrarily.
///

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Array(Vec<Self>),
    Enum { ordinal: i32, symbolic_name: String },
    Map(BTreeMap<String, Self>),
    Primitive(PrimitiveValue),
}

impl PropertyValue {
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Primitive(PrimitiveValue::String(value.into()))
    }

    #[must_use]
    pub const fn int(value: i64) -> Self {
        Self::Primitive(PrimitiveValue::Int(value))
    }

    #[must_use]
    pub const fn bool(value: bool) -> Self {
        Self::Primitive(PrimitiveValue::Bool(value))
    }

    #[must_use]
    pub const fn date(value: OffsetDateTime) -> Self {
        Self::Primitive(PrimitiveValue::Date(value))
    }

    #[must_use]
    pub fn enumeration(ordinal: i32, symbolic_name: impl Into<String>) -> Self {
        Self::Enum {
            ordinal,
            symbolic_name: symbolic_name.into(),
        }
    }

    /// Borrow the string payload of a primitive string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Primitive(PrimitiveValue::String(s)) => Some(s),
            _ => None,
        }
    }
}

///
/// InstanceProperties
///
/// Named property values on an instance, ordered by name.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceProperties {
    values: BTreeMap<String, PropertyValue>,
}

impl InstanceProperties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.values.insert(name.into(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, PropertyValue)> for InstanceProperties {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
