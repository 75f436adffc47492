use crate::catalog::{ID_FIELD, PLACEHOLDER_TYPE, TYPE_FIELD};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, slice};

///
/// ObjectRef
///
/// Lightweight pointer to another catalog object, as embedded in reference
/// fields.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ObjectRef {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_type")]
    pub object_type: String,

    #[serde(rename = "_name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ObjectRef {
    #[must_use]
    pub fn new(id: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object_type: object_type.into(),
            name: None,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

///
/// FieldValue
///
/// Dates are carried as epoch milliseconds, the catalog's native form.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Bool(bool),
    Date(i64),
    Float(f64),
    Int(i64),
    Null,
    Reference(ObjectRef),
    References(Vec<ObjectRef>),
    Text(String),
}

impl FieldValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Literal used when comparing against a condition value.
    /// Reference fields compare on the referenced id; lists have no single
    /// literal.
    #[must_use]
    pub fn literal(&self) -> Option<String> {
        match self {
            Self::Bool(v) => Some(v.to_string()),
            Self::Date(v) | Self::Int(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Reference(r) => Some(r.id.clone()),
            Self::Text(v) => Some(v.clone()),
            Self::Null | Self::References(_) => None,
        }
    }

    /// Null, or an empty reference list.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::References(refs) => refs.is_empty(),
            _ => false,
        }
    }

    /// Borrow any references held by this value.
    #[must_use]
    pub fn references(&self) -> &[ObjectRef] {
        match self {
            Self::Reference(r) => slice::from_ref(r),
            Self::References(refs) => refs,
            _ => &[],
        }
    }
}

///
/// CatalogObject
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CatalogObject {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_type")]
    pub object_type: String,

    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl CatalogObject {
    #[must_use]
    pub fn new(id: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object_type: object_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// An object known only through a reference. Carries the name when the
    /// reference had one.
    #[must_use]
    pub fn from_ref(reference: &ObjectRef) -> Self {
        let mut object = Self::new(reference.id.clone(), reference.object_type.clone());
        if let Some(name) = &reference.name {
            object.set("name", FieldValue::Text(name.clone()));
        }

        object
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn date(&self, name: &str) -> Option<i64> {
        match self.fields.get(name) {
            Some(FieldValue::Date(ms)) => Some(*ms),
            _ => None,
        }
    }

    #[must_use]
    pub fn references(&self, name: &str) -> &[ObjectRef] {
        self.fields.get(name).map_or(&[][..], FieldValue::references)
    }

    /// Value a condition on `name` sees, including the `_id` and `_type`
    /// pseudo-fields.
    #[must_use]
    pub fn condition_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            ID_FIELD => Some(FieldValue::Text(self.id.clone())),
            TYPE_FIELD => Some(FieldValue::Text(self.object_type.clone())),
            _ => self.fields.get(name).cloned(),
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.object_type == PLACEHOLDER_TYPE
    }

    #[must_use]
    pub fn to_ref(&self) -> ObjectRef {
        ObjectRef {
            id: self.id.clone(),
            object_type: self.object_type.clone(),
            name: self.text("name").map(ToString::to_string),
        }
    }

    /// Keep only the named fields.
    #[must_use]
    pub fn project(mut self, fields: &[String]) -> Self {
        if !fields.is_empty() {
            self.fields.retain(|k, _| fields.iter().any(|f| f == k));
        }

        self
    }
}

///
/// UpdateValue
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateValue {
    /// Append references to a list field, skipping ones already present.
    Append(Vec<ObjectRef>),

    /// Replace the field value.
    Set(FieldValue),
}

///
/// ObjectUpdate
///

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ObjectUpdate {
    pub changes: BTreeMap<String, UpdateValue>,
}

impl ObjectUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.changes.insert(field.into(), UpdateValue::Set(value));
        self
    }

    #[must_use]
    pub fn append(mut self, field: impl Into<String>, reference: ObjectRef) -> Self {
        match self
            .changes
            .entry(field.into())
            .or_insert_with(|| UpdateValue::Append(Vec::new()))
        {
            UpdateValue::Append(refs) => refs.push(reference),
            slot @ UpdateValue::Set(_) => *slot = UpdateValue::Append(vec![reference]),
        }

        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
