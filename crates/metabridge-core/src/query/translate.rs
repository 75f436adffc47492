use crate::{
    IDENTITY_PROPERTY,
    catalog::{Condition, ConditionSet, ID_FIELD, SearchQuery, Sort},
    id::Identity,
    mapping::{ClassificationMapping, EntityMapping, MappingRegistry, PropertySource},
    query::{StringMatch, TranslateError},
    types::{InstanceProperties, MatchCriteria, PropertyValue, SequencingOrder},
};

///
/// Translation
///
/// Property conditions for one mapping. `satisfiable` is false when the
/// request can never match objects of this mapping, e.g. an ALL request
/// naming a property the mapping does not carry.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Translation {
    pub conditions: ConditionSet,
    pub satisfiable: bool,
}

impl Translation {
    #[must_use]
    pub fn unconstrained() -> Self {
        Self {
            conditions: ConditionSet::all(),
            satisfiable: true,
        }
    }
}

///
/// Translator
///

#[derive(Clone, Copy, Debug)]
pub struct Translator<'a> {
    registry: &'a MappingRegistry,
}

impl<'a> Translator<'a> {
    #[must_use]
    pub const fn new(registry: &'a MappingRegistry) -> Self {
        Self { registry }
    }

    /// Conditions for a set of match properties under a match mode.
    /// ALL combines with AND, ANY with OR, NONE with a negated AND.
    pub fn translate_match(
        &self,
        mapping: &EntityMapping,
        properties: Option<&InstanceProperties>,
        criteria: MatchCriteria,
    ) -> Result<Translation, TranslateError> {
        let Some(properties) = properties.filter(|p| !p.is_empty()) else {
            return Ok(Translation::unconstrained());
        };

        let mut conditions = root(criteria);
        let mut unmapped = Vec::new();
        let mut mapped = 0usize;
        let mut always = false;

        for (name, value) in properties.iter() {
            let Some(property) = mapping.property(name) else {
                unmapped.push(name);
                continue;
            };
            mapped += 1;

            let mut term = ConditionSet::all();
            match &property.source {
                PropertySource::Field(field) => push_value_conditions(field, value, &mut term)?,
                PropertySource::Derived(derived) => {
                    derived.add_search_conditions(mapping, name, value, &mut term)?;
                }
            }

            match term.len() {
                0 => always = true,
                1 => conditions.members.extend(term.members),
                _ => conditions.nest(term),
            }
        }

        if !unmapped.is_empty() {
            log::debug!(
                target: "metabridge::query",
                "{} does not map {}",
                mapping.generic_type,
                unmapped.join(", ")
            );
        }

        let satisfiable = match criteria {
            MatchCriteria::All => unmapped.is_empty(),
            MatchCriteria::Any => mapped > 0,
            MatchCriteria::None => !always,
        };
        if always && criteria == MatchCriteria::Any {
            conditions.members.clear();
        }

        Ok(Translation {
            conditions,
            satisfiable,
        })
    }

    /// Conditions on a classification's own properties, combined the same
    /// way as entity properties. Classification properties are plain
    /// fields, so every mapped property adds at least one condition.
    pub fn translate_classification_match(
        &self,
        classification: &ClassificationMapping,
        properties: Option<&InstanceProperties>,
        criteria: MatchCriteria,
    ) -> Result<Translation, TranslateError> {
        let Some(properties) = properties.filter(|p| !p.is_empty()) else {
            return Ok(Translation::unconstrained());
        };

        let mut conditions = root(criteria);
        let mut mapped = 0usize;
        let mut unmapped = 0usize;

        for (name, value) in properties.iter() {
            let Some((_, field)) = classification.properties.iter().find(|(g, _)| g == name) else {
                unmapped += 1;
                continue;
            };
            mapped += 1;

            let mut term = ConditionSet::all();
            push_value_conditions(field, value, &mut term)?;
            if term.len() == 1 {
                conditions.members.extend(term.members);
            } else {
                conditions.nest(term);
            }
        }

        let satisfiable = match criteria {
            MatchCriteria::All => unmapped == 0,
            MatchCriteria::Any => mapped > 0,
            MatchCriteria::None => true,
        };

        Ok(Translation {
            conditions,
            satisfiable,
        })
    }

    /// Presence conditions for classification limiters, ANDed together.
    /// `None` when any limiter cannot apply to the mapping, which excludes
    /// the mapping from the search.
    #[must_use]
    pub fn classification_limiters(
        &self,
        mapping: &EntityMapping,
        names: &[String],
    ) -> Option<ConditionSet> {
        let mut limiters = ConditionSet::all();

        for name in names {
            let applicable = self
                .registry
                .classifications_for(mapping)
                .into_iter()
                .find(|c| &c.generic_type == name);

            match applicable {
                Some(classification) => limiters.push(classification.presence.clone()),
                None => {
                    log::debug!(
                        target: "metabridge::query",
                        "skipping {}: classification {name} does not apply",
                        mapping.generic_type
                    );
                    return None;
                }
            }
        }

        Some(limiters)
    }

    /// Free-text conditions: the pattern against every string field of the
    /// catalog type, ORed, minus the excluded fields.
    pub fn free_text(
        &self,
        mapping: &EntityMapping,
        pattern: &str,
        exclusions: &[String],
    ) -> Result<ConditionSet, TranslateError> {
        let schema = self.registry.schema();
        if schema.get(&mapping.external_type).is_none() {
            return Err(TranslateError::NoSchema {
                external_type: mapping.external_type.clone(),
            });
        }

        let shape = StringMatch::parse(pattern)?;
        let mut any = ConditionSet::any();
        for field in schema.string_fields(&mapping.external_type) {
            if !exclusions.iter().any(|e| e == field) {
                any.push(shape.condition(field));
            }
        }

        if any.is_empty() {
            // nothing to search
            return Ok(ConditionSet::all().with(Condition::is_null(ID_FIELD)));
        }

        Ok(any)
    }

    /// Fields a search must return to materialize entities of this mapping.
    #[must_use]
    pub fn projection(&self, mapping: &EntityMapping) -> Vec<String> {
        let mut fields = mapping.field_projection();

        for classification in self.registry.classifications_for(mapping) {
            fields.extend(classification.fields());
        }
        for (relationship, end) in self.registry.relationships_for(mapping) {
            fields.extend(relationship.end(end).link_field.clone());
        }

        let schema = self.registry.schema();
        let mut out: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            if schema.has_field(&mapping.external_type, &field) && !out.contains(&field) {
                out.push(field);
            }
        }

        out
    }

    /// The catalog query for one mapping. Limiters, when present, are
    /// nested under an AND so the match mode never changes their meaning.
    #[must_use]
    pub fn search_query(
        &self,
        mapping: &EntityMapping,
        conditions: ConditionSet,
        limiters: ConditionSet,
        sort: Option<Sort>,
        begin_at: usize,
        page_size: usize,
    ) -> SearchQuery {
        let conditions = match (conditions.is_empty(), limiters.is_empty()) {
            (_, true) => conditions,
            (true, false) => limiters,
            (false, false) => conditions & limiters,
        };

        SearchQuery::new(mapping.external_type.clone())
            .with_properties(self.projection(mapping))
            .with_conditions(conditions)
            .with_paging(begin_at, page_size)
            .with_sort(sort)
    }
}

fn root(criteria: MatchCriteria) -> ConditionSet {
    match criteria {
        MatchCriteria::All => ConditionSet::all(),
        MatchCriteria::Any => ConditionSet::any(),
        MatchCriteria::None => ConditionSet::all().negated(),
    }
}

/// Leaf conditions for one value against one catalog field. Strings are
/// interpreted as search patterns; other primitives compare on their
/// literal form; enums on their symbolic name; maps and arrays recurse.
pub(super) fn push_value_conditions(
    field: &str,
    value: &PropertyValue,
    conditions: &mut ConditionSet,
) -> Result<(), TranslateError> {
    match value {
        PropertyValue::Primitive(primitive) => {
            let condition = match value.as_str() {
                Some(pattern) => StringMatch::parse(pattern)?.condition(field),
                None => Condition::eq(field, primitive.literal()),
            };
            conditions.push(condition);
        }
        PropertyValue::Enum { symbolic_name, .. } => {
            conditions.push(Condition::eq(field, symbolic_name.clone()));
        }
        PropertyValue::Map(entries) => {
            for nested in entries.values() {
                push_value_conditions(field, nested, conditions)?;
            }
        }
        PropertyValue::Array(items) => {
            for nested in items {
                push_value_conditions(field, nested, conditions)?;
            }
        }
    }

    Ok(())
}

/// Catalog sort key for a sequencing order.
pub fn sort_for(order: SequencingOrder) -> Result<Option<Sort>, TranslateError> {
    Ok(match order {
        SequencingOrder::Any => None,
        SequencingOrder::Guid => Some(Sort::by_id()),
        SequencingOrder::CreationDateRecent => Some(Sort::by_creation(false)),
        SequencingOrder::CreationDateOldest => Some(Sort::by_creation(true)),
        SequencingOrder::LastUpdateRecent => Some(Sort::by_modification(false)),
        SequencingOrder::LastUpdateOldest => Some(Sort::by_modification(true)),
        SequencingOrder::PropertyAscending | SequencingOrder::PropertyDescending => {
            return Err(TranslateError::PropertySequencing);
        }
    })
}

///
/// IdentityLookup
///
/// What a request matching only on the identity property pins down.
/// `Exact` names one entity; `Within` names a catalog type and prefix
/// whose ids still need matching.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IdentityLookup {
    Exact(Identity),
    Within {
        prefix: Option<String>,
        external_type: String,
    },
}

impl IdentityLookup {
    /// Whether a mapping can hold the entities this lookup selects.
    #[must_use]
    pub fn covers(&self, mapping: &EntityMapping) -> bool {
        let (prefix, external_type) = match self {
            Self::Exact(identity) => (identity.prefix.as_deref(), identity.external_type.as_str()),
            Self::Within {
                prefix,
                external_type,
            } => (prefix.as_deref(), external_type.as_str()),
        };

        mapping.external_type == external_type && mapping.prefix.as_deref() == prefix
    }
}

/// The identity a request names, when its only match property is the
/// identity property with an exact or starts-with literal carrying a
/// complete identity head.
#[must_use]
pub fn identity_lookup(
    properties: Option<&InstanceProperties>,
    criteria: MatchCriteria,
) -> Option<IdentityLookup> {
    let properties = properties?;
    if properties.len() != 1 || criteria == MatchCriteria::None {
        return None;
    }

    let pattern = properties.get(IDENTITY_PROPERTY)?.as_str()?;
    match StringMatch::parse(pattern).ok()? {
        StringMatch::Exact(literal) => Identity::parse(&literal).map(IdentityLookup::Exact),
        StringMatch::StartsWith(literal) => {
            Identity::parse_head(&literal).map(|(prefix, external_type)| IdentityLookup::Within {
                prefix: prefix.map(ToString::to_string),
                external_type: external_type.to_string(),
            })
        }
        StringMatch::Contains(_) | StringMatch::EndsWith(_) => None,
    }
}
