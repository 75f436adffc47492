use crate::{
    catalog::{CREATED_BY_FIELD, CREATED_ON_FIELD, CatalogObject, MODIFIED_BY_FIELD, MODIFIED_ON_FIELD},
    id::{self, Identity},
    mapping::DerivedProperty,
};
use std::sync::Arc;

///
/// PropertySource
///
/// Where a generic property's value comes from: one catalog field, or a
/// derivation that may read several fields and contribute several search
/// conditions.
///

#[derive(Clone, Debug)]
pub enum PropertySource {
    Derived(Arc<dyn DerivedProperty>),
    Field(String),
}

///
/// PropertyMapping
///

#[derive(Clone, Debug)]
pub struct PropertyMapping {
    pub generic: String,
    pub source: PropertySource,
}

impl PropertyMapping {
    #[must_use]
    pub fn external_field(&self) -> Option<&str> {
        match &self.source {
            PropertySource::Field(f) => Some(f),
            PropertySource::Derived(_) => None,
        }
    }
}

///
/// EntityMapping
///
/// Correspondence between one generic entity type and one catalog type.
/// Mappings with a prefix are synthesized entities: they share the catalog
/// object with their siblings and differ only by guid prefix.
///

#[derive(Clone, Debug)]
pub struct EntityMapping {
    pub generic_type: String,
    pub external_type: String,
    pub prefix: Option<String>,
    pub properties: Vec<PropertyMapping>,
    pub relationships: Vec<String>,
    pub classifications: Vec<String>,
}

impl EntityMapping {
    #[must_use]
    pub fn new(generic_type: impl Into<String>, external_type: impl Into<String>) -> Self {
        Self {
            generic_type: generic_type.into(),
            external_type: external_type.into(),
            prefix: None,
            properties: Vec::new(),
            relationships: Vec::new(),
            classifications: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Map a generic property straight onto a catalog field.
    #[must_use]
    pub fn with_field(mut self, generic: impl Into<String>, field: impl Into<String>) -> Self {
        self.properties.push(PropertyMapping {
            generic: generic.into(),
            source: PropertySource::Field(field.into()),
        });
        self
    }

    #[must_use]
    pub fn with_derived(
        mut self,
        generic: impl Into<String>,
        derivation: Arc<dyn DerivedProperty>,
    ) -> Self {
        self.properties.push(PropertyMapping {
            generic: generic.into(),
            source: PropertySource::Derived(derivation),
        });
        self
    }

    #[must_use]
    pub fn with_relationships(mut self, names: &[&str]) -> Self {
        self.relationships
            .extend(names.iter().map(ToString::to_string));
        self
    }

    #[must_use]
    pub fn with_classifications(mut self, names: &[&str]) -> Self {
        self.classifications
            .extend(names.iter().map(ToString::to_string));
        self
    }

    #[must_use]
    pub fn property(&self, generic: &str) -> Option<&PropertyMapping> {
        self.properties.iter().find(|p| p.generic == generic)
    }

    pub fn mapped_properties(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.generic.as_str())
    }

    /// True for the mapping that owns unprefixed guids of its catalog type.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.prefix.is_none()
    }

    #[must_use]
    pub fn guid_for(&self, external_id: &str) -> String {
        id::encode_prefixed(self.prefix.as_deref(), external_id)
    }

    #[must_use]
    pub fn identity_for(&self, object: &CatalogObject) -> Identity {
        Identity::new(self.prefix.as_deref(), &object.object_type, &object.id)
    }

    /// Catalog fields this mapping reads for its own properties, plus the
    /// audit fields.
    #[must_use]
    pub fn field_projection(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        let mut add = |name: &str| {
            if !fields.iter().any(|f| f == name) {
                fields.push(name.to_string());
            }
        };

        for property in &self.properties {
            match &property.source {
                PropertySource::Field(f) => add(f),
                PropertySource::Derived(d) => d.fields().iter().for_each(|f| add(f)),
            }
        }
        for audit in [CREATED_BY_FIELD, CREATED_ON_FIELD, MODIFIED_BY_FIELD, MODIFIED_ON_FIELD] {
            add(audit);
        }

        fields
    }
}
