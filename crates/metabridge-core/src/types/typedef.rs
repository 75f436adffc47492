use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// TypeDefCategory
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum TypeDefCategory {
    Entity,
    Relationship,
    Classification,
}

///
/// ExternalStandard
///
/// A standard type this generic type corresponds to.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ExternalStandard {
    pub standard: String,
    pub organization: String,
    pub identifier: String,
}

///
/// TypeDef
///
/// A generic type definition as handed over by the calling framework.
/// `properties` lists the attribute names declared directly on this type;
/// inherited attributes live on the supertype chain.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeDef {
    pub guid: String,
    pub name: String,
    pub category: TypeDefCategory,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_standards: Vec<ExternalStandard>,
}

impl TypeDef {
    #[must_use]
    pub fn new(guid: impl Into<String>, name: impl Into<String>, category: TypeDefCategory) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            category,
            super_type: None,
            properties: Vec::new(),
            external_standards: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_super_type(mut self, super_type: impl Into<String>) -> Self {
        self.super_type = Some(super_type.into());
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: &[&str]) -> Self {
        self.properties = properties.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_external_standard(
        mut self,
        standard: &str,
        organization: &str,
        identifier: &str,
    ) -> Self {
        self.external_standards.push(ExternalStandard {
            standard: standard.to_string(),
            organization: organization.to_string(),
            identifier: identifier.to_string(),
        });
        self
    }

    /// True if one external standard agrees with every part given.
    #[must_use]
    pub fn has_external_standard(
        &self,
        standard: Option<&str>,
        organization: Option<&str>,
        identifier: Option<&str>,
    ) -> bool {
        let agrees = |wanted: Option<&str>, have: &str| wanted.is_none_or(|w| w == have);

        self.external_standards.iter().any(|s| {
            agrees(standard, &s.standard)
                && agrees(organization, &s.organization)
                && agrees(identifier, &s.identifier)
        })
    }

    /// True if the attribute is declared directly on this type.
    #[must_use]
    pub fn declares(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }
}
