use crate::{
    catalog::{CatalogObject, Condition, ObjectUpdate},
    mapping::convert::{field_to_property, property_to_field},
    types::InstanceProperties,
};
use thiserror::Error as ThisError;

///
/// ClassificationWriteError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum ClassificationWriteError {
    #[error("classification '{name}' requires property '{property}'")]
    MissingProperty { name: String, property: String },

    #[error("classification '{name}' is read-only")]
    ReadOnly { name: String },

    #[error("classification '{name}' property '{property}' must be a scalar value")]
    UnwritableValue { name: String, property: String },
}

///
/// ClassificationMapping
///
/// A generic classification derived from fields of the classified object.
/// `presence` decides whether an object carries the classification at all;
/// the same condition doubles as the search limiter.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassificationMapping {
    pub generic_type: String,
    pub applies_to: Vec<String>,
    pub presence: Condition,
    pub properties: Vec<(String, String)>,
    pub writable: bool,
}

impl ClassificationMapping {
    #[must_use]
    pub fn new(generic_type: impl Into<String>, applies_to: &[&str], presence: Condition) -> Self {
        Self {
            generic_type: generic_type.into(),
            applies_to: applies_to.iter().map(ToString::to_string).collect(),
            presence,
            properties: Vec::new(),
            writable: false,
        }
    }

    #[must_use]
    pub fn with_field(mut self, generic: impl Into<String>, field: impl Into<String>) -> Self {
        self.properties.push((generic.into(), field.into()));
        self
    }

    #[must_use]
    pub const fn writable(mut self) -> Self {
        self.writable = true;
        self
    }

    #[must_use]
    pub fn applies_to_type(&self, external_type: &str) -> bool {
        self.applies_to.iter().any(|t| t == external_type)
    }

    #[must_use]
    pub fn is_present(&self, object: &CatalogObject) -> bool {
        self.presence.matches(object)
    }

    #[must_use]
    pub fn properties_of(&self, object: &CatalogObject) -> InstanceProperties {
        self.properties
            .iter()
            .filter_map(|(generic, field)| {
                let value = object.field(field).and_then(field_to_property)?;
                Some((generic.clone(), value))
            })
            .collect()
    }

    pub fn mapped_properties(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(g, _)| g.as_str())
    }

    /// Catalog fields the classification reads.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        let mut fields = vec![self.presence.field.clone()];
        for (_, field) in &self.properties {
            if !fields.contains(field) {
                fields.push(field.clone());
            }
        }

        fields
    }

    /// Field changes that attach this classification with the given values.
    /// Every mapped property must be supplied.
    pub fn update_for(
        &self,
        values: Option<&InstanceProperties>,
    ) -> Result<ObjectUpdate, ClassificationWriteError> {
        if !self.writable {
            return Err(ClassificationWriteError::ReadOnly {
                name: self.generic_type.clone(),
            });
        }

        let mut update = ObjectUpdate::new();
        for (generic, field) in &self.properties {
            let value = values.and_then(|v| v.get(generic)).ok_or_else(|| {
                ClassificationWriteError::MissingProperty {
                    name: self.generic_type.clone(),
                    property: generic.clone(),
                }
            })?;
            let value =
                property_to_field(value).ok_or_else(|| ClassificationWriteError::UnwritableValue {
                    name: self.generic_type.clone(),
                    property: generic.clone(),
                })?;

            update = update.set(field.clone(), value);
        }

        Ok(update)
    }
}
