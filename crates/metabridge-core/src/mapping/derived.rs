//! Generic properties with no single backing catalog field.

use crate::{
    catalog::{CatalogObject, Condition, ConditionSet, ID_FIELD, Operator},
    id::Identity,
    mapping::EntityMapping,
    query::{StringMatch, TranslateError},
    types::PropertyValue,
};
use std::fmt;

///
/// DerivedProperty
///
/// Custom derivation for a generic property. `derive` computes the value
/// from a catalog object; `add_search_conditions` translates a match value
/// into whatever conditions select it.
///

pub trait DerivedProperty: fmt::Debug + Send + Sync {
    fn derive(&self, mapping: &EntityMapping, object: &CatalogObject) -> Option<PropertyValue>;

    fn add_search_conditions(
        &self,
        mapping: &EntityMapping,
        property: &str,
        value: &PropertyValue,
        conditions: &mut ConditionSet,
    ) -> Result<(), TranslateError>;

    /// Catalog fields `derive` reads.
    fn fields(&self) -> &'static [&'static str] {
        &[]
    }
}

/// A condition no catalog object satisfies.
fn never() -> Condition {
    Condition::is_null(ID_FIELD)
}

///
/// QualifiedName
///
/// Derives the identity string `({type})={id}` (prefixed for synthesized
/// mappings) and searches it by constraining `_id`.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct QualifiedName;

impl DerivedProperty for QualifiedName {
    fn derive(&self, mapping: &EntityMapping, object: &CatalogObject) -> Option<PropertyValue> {
        Some(PropertyValue::string(mapping.identity_for(object).encode()))
    }

    fn add_search_conditions(
        &self,
        mapping: &EntityMapping,
        property: &str,
        value: &PropertyValue,
        conditions: &mut ConditionSet,
    ) -> Result<(), TranslateError> {
        let pattern = value.as_str().ok_or_else(|| TranslateError::InvalidValue {
            generic_type: mapping.generic_type.clone(),
            property: property.to_string(),
            expected: "string",
        })?;

        // everything before the id is fixed for this mapping
        let head = Identity::new(mapping.prefix.as_deref(), &mapping.external_type, "")
            .encode();

        let condition = match StringMatch::parse(pattern)? {
            StringMatch::Exact(lit) => lit
                .strip_prefix(head.as_str())
                .filter(|id| !id.is_empty())
                .map_or_else(never, |id| Condition::eq(ID_FIELD, id)),

            StringMatch::StartsWith(lit) => {
                if head.starts_with(lit.as_str()) {
                    return Ok(());
                }
                lit.strip_prefix(head.as_str())
                    .map_or_else(never, |id| {
                        Condition::new(ID_FIELD, Operator::LikeStartsWith, id)
                    })
            }

            StringMatch::EndsWith(lit) => match lit.rsplit_once(")=") {
                Some((before, id)) if head.ends_with(&format!("{before})=")) => {
                    Condition::eq(ID_FIELD, id)
                }
                Some(_) => never(),
                None => Condition::new(ID_FIELD, Operator::LikeEndsWith, lit),
            },

            StringMatch::Contains(lit) => {
                if head.contains(lit.as_str()) {
                    return Ok(());
                }
                // a literal spanning the `)=` boundary pins the start of the id
                let type_section = head.strip_suffix(")=").unwrap_or(&head);
                match lit.split_once(")=") {
                    Some((before, id)) if type_section.ends_with(before) => {
                        Condition::new(ID_FIELD, Operator::LikeStartsWith, id)
                    }
                    Some(_) => never(),
                    None => Condition::new(ID_FIELD, Operator::LikeContains, lit),
                }
            }
        };

        conditions.push(condition);

        Ok(())
    }
}

///
/// FixedEnum
///
/// A constant enum value shared by every instance of the mapping.
///

#[derive(Clone, Copy, Debug)]
pub struct FixedEnum {
    pub ordinal: i32,
    pub symbolic_name: &'static str,
}

impl DerivedProperty for FixedEnum {
    fn derive(&self, _: &EntityMapping, _: &CatalogObject) -> Option<PropertyValue> {
        Some(PropertyValue::enumeration(self.ordinal, self.symbolic_name))
    }

    fn add_search_conditions(
        &self,
        mapping: &EntityMapping,
        property: &str,
        value: &PropertyValue,
        conditions: &mut ConditionSet,
    ) -> Result<(), TranslateError> {
        let matches = match value {
            PropertyValue::Enum { symbolic_name, .. } => symbolic_name == self.symbolic_name,
            PropertyValue::Primitive(_) => value
                .as_str()
                .map(StringMatch::parse)
                .transpose()?
                .is_some_and(|m| m.is_match(self.symbolic_name)),
            _ => {
                return Err(TranslateError::InvalidValue {
                    generic_type: mapping.generic_type.clone(),
                    property: property.to_string(),
                    expected: "enum",
                });
            }
        };

        if !matches {
            conditions.push(never());
        }

        Ok(())
    }
}
