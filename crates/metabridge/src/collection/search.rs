use crate::{
    collection::{MetadataCollection, SearchOptions, page_of},
    error::{Error, ErrorKind},
};
use metabridge_core::{
    catalog::{CatalogClient, ConditionSet, Sort},
    id::Identity,
    mapping::{EntityMapping, TypeLookup},
    materialize::drain_pages,
    query::{IdentityLookup, TranslateError, identity_lookup},
    types::{EntityDetail, InstanceProperties, MatchCriteria, SequencingOrder, TypeDefCategory},
};
use std::cmp::Ordering;

///
/// Scope
///
/// The mappings one search request covers, with its catalog sort key.
///

struct Scope<'a> {
    mappings: Vec<&'a EntityMapping>,
    sort: Option<Sort>,
    order: SequencingOrder,
}

impl<C: CatalogClient> MetadataCollection<C> {
    /// Entities whose properties match. `type_guid` limits the search to
    /// one entity type and its subtypes.
    pub fn find_entities_by_property(
        &self,
        type_guid: Option<&str>,
        properties: Option<&InstanceProperties>,
        criteria: MatchCriteria,
        options: &SearchOptions,
    ) -> Result<Vec<EntityDetail>, Error> {
        self.find_by_property(type_guid, properties, criteria, options)
            .map_err(|e| e.in_operation("find_entities_by_property"))
    }

    /// Entities carrying a classification whose properties match.
    pub fn find_entities_by_classification(
        &self,
        type_guid: Option<&str>,
        classification: &str,
        properties: Option<&InstanceProperties>,
        criteria: MatchCriteria,
        options: &SearchOptions,
    ) -> Result<Vec<EntityDetail>, Error> {
        self.find_by_classification(type_guid, classification, properties, criteria, options)
            .map_err(|e| e.in_operation("find_entities_by_classification"))
    }

    /// Entities with any string field matching a regular expression.
    pub fn find_entities_by_property_value(
        &self,
        type_guid: Option<&str>,
        criteria: &str,
        options: &SearchOptions,
    ) -> Result<Vec<EntityDetail>, Error> {
        self.find_by_value(type_guid, criteria, options)
            .map_err(|e| e.in_operation("find_entities_by_property_value"))
    }

    fn find_by_property(
        &self,
        type_guid: Option<&str>,
        properties: Option<&InstanceProperties>,
        criteria: MatchCriteria,
        options: &SearchOptions,
    ) -> Result<Vec<EntityDetail>, Error> {
        let Some(mut scope) = self.scope(type_guid, options)? else {
            return Ok(Vec::new());
        };

        match identity_lookup(properties, criteria) {
            Some(IdentityLookup::Exact(identity)) => {
                return self.find_by_identity(&scope, &identity, options);
            }
            // ids still match in the catalog, only the mapping is pinned
            Some(lookup) => scope.mappings.retain(|m| lookup.covers(m)),
            None => {}
        }

        let translator = self.translator();
        self.run_search(&scope, options, |mapping| {
            let translation = translator.translate_match(mapping, properties, criteria)?;

            Ok(translation.satisfiable.then_some(translation.conditions))
        })
    }

    fn find_by_classification(
        &self,
        type_guid: Option<&str>,
        classification: &str,
        properties: Option<&InstanceProperties>,
        criteria: MatchCriteria,
        options: &SearchOptions,
    ) -> Result<Vec<EntityDetail>, Error> {
        match self.registry.lookup_name(classification) {
            TypeLookup::Implemented(def) if def.category == TypeDefCategory::Classification => {}
            TypeLookup::Implemented(def) => {
                return Err(Error::invalid_parameter(
                    classification,
                    format!("'{}' is a {} type, not a classification", def.name, def.category),
                ));
            }
            TypeLookup::Unimplemented(_) => {
                return Err(Error::new(
                    ErrorKind::TypeNotSupported,
                    classification,
                    format!("classification '{classification}' is not supported by this catalog"),
                ));
            }
            TypeLookup::Unknown => {
                return Err(Error::new(
                    ErrorKind::TypeNotKnown,
                    classification,
                    format!("classification '{classification}' is not known"),
                ));
            }
        }

        let Some(scope) = self.scope(type_guid, options)? else {
            return Ok(Vec::new());
        };

        // the searched classification doubles as a limiter
        let mut options = options.clone();
        if !options.limit_by_classifications.iter().any(|c| c == classification) {
            options.limit_by_classifications.push(classification.to_string());
        }

        let translator = self.translator();
        self.run_search(&scope, &options, |mapping| {
            let Some(mapped) = self
                .registry
                .classifications_for(mapping)
                .into_iter()
                .find(|c| c.generic_type == classification)
            else {
                return Ok(None);
            };
            let translation = translator.translate_classification_match(mapped, properties, criteria)?;

            Ok(translation.satisfiable.then_some(translation.conditions))
        })
    }

    fn find_by_value(
        &self,
        type_guid: Option<&str>,
        pattern: &str,
        options: &SearchOptions,
    ) -> Result<Vec<EntityDetail>, Error> {
        if pattern.is_empty() {
            return Err(Error::invalid_parameter(
                "searchCriteria",
                "search criteria must not be empty",
            ));
        }

        let Some(scope) = self.scope(type_guid, options)? else {
            return Ok(Vec::new());
        };

        let translator = self.translator();
        let exclusions = self.config.exclusions();
        self.run_search(&scope, options, |mapping| {
            match translator.free_text(mapping, pattern, exclusions) {
                Ok(conditions) => Ok(Some(conditions)),
                Err(TranslateError::NoSchema { external_type }) => {
                    log::warn!(
                        target: "metabridge",
                        "skipping {}: no schema for catalog type {external_type}",
                        mapping.generic_type
                    );
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Mappings a request covers. `None` when the status limit rules out
    /// every result, in which case no query is issued.
    fn scope(&self, type_guid: Option<&str>, options: &SearchOptions) -> Result<Option<Scope<'_>>, Error> {
        let sort = Self::check_options(options)?;

        if options.excludes_active() {
            log::debug!(
                target: "metabridge",
                "status limit {:?} excludes active instances, not searching",
                options.limit_by_status
            );
            return Ok(None);
        }

        let filter = type_guid
            .map(|guid| self.type_for_guid(guid, TypeDefCategory::Entity))
            .transpose()?;
        let mappings = self.registry.mappings_for_search(
            filter.map(|d| d.name.as_str()),
            &self.config.search_all_excludes,
        );

        if let Some(def) = filter
            && mappings.is_empty()
        {
            return Err(Error::new(
                ErrorKind::TypeNotSupported,
                def.guid.clone(),
                format!("no implemented type covers '{}'", def.name),
            ));
        }

        Ok(Some(Scope {
            mappings,
            sort,
            order: options.sequencing_order,
        }))
    }

    /// Run one query per mapping and concatenate the results. A single
    /// mapping pages in the catalog; several are each drained from the start
    /// and the page is sliced from the combined result.
    fn run_search<F>(
        &self,
        scope: &Scope<'_>,
        options: &SearchOptions,
        mut conditions_for: F,
    ) -> Result<Vec<EntityDetail>, Error>
    where
        F: FnMut(&EntityMapping) -> Result<Option<ConditionSet>, Error>,
    {
        let page_size = self.page_size(options);
        let single = scope.mappings.len() == 1;
        let (begin_at, budget) = if single {
            (options.from_element, page_size)
        } else {
            (0, options.from_element.saturating_add(page_size))
        };

        let translator = self.translator();
        let materializer = self.materializer();
        let mut results = Vec::new();

        for &mapping in &scope.mappings {
            let Some(limiters) =
                translator.classification_limiters(mapping, &options.limit_by_classifications)
            else {
                continue;
            };
            let Some(conditions) = conditions_for(mapping)? else {
                log::debug!(
                    target: "metabridge",
                    "skipping {}: request cannot match",
                    mapping.generic_type
                );
                continue;
            };

            let query = translator.search_query(
                mapping,
                conditions,
                limiters,
                scope.sort.clone(),
                begin_at,
                page_size,
            );
            let found = drain_pages(&self.client, query, budget, |object| {
                if object.object_type != mapping.external_type {
                    return Ok(None);
                }
                materializer
                    .entity_detail(mapping, Some(object), &mapping.guid_for(&object.id))
                    .map(Some)
            })?;

            results.extend(found);
        }

        if single {
            return Ok(results);
        }

        sort_details(&mut results, scope.order);

        Ok(page_of(results, options.from_element, page_size))
    }

    /// Answer an identity search with a direct lookup. The object must
    /// belong to a mapping in scope and pass any classification limits.
    fn find_by_identity(
        &self,
        scope: &Scope<'_>,
        identity: &Identity,
        options: &SearchOptions,
    ) -> Result<Vec<EntityDetail>, Error> {
        if options.from_element > 0 {
            return Ok(Vec::new());
        }

        let lookup = IdentityLookup::Exact(identity.clone());
        let Some(mapping) = scope.mappings.iter().copied().find(|m| lookup.covers(m)) else {
            return Ok(Vec::new());
        };

        let Some(object) = self
            .client
            .get_object(&identity.external_id)?
            .filter(|o| !o.is_placeholder() && o.object_type == identity.external_type)
        else {
            return Ok(Vec::new());
        };

        let passes_limits = self
            .translator()
            .classification_limiters(mapping, &options.limit_by_classifications)
            .is_some_and(|limits| limits.matches(&object));
        if !passes_limits {
            return Ok(Vec::new());
        }

        let detail = self
            .materializer()
            .entity_detail(mapping, Some(&object), &identity.guid())?;

        Ok(vec![detail])
    }
}

/// Order results combined from several mappings the way the catalog
/// orders a single query.
fn sort_details(details: &mut [EntityDetail], order: SequencingOrder) {
    let by: fn(&EntityDetail, &EntityDetail) -> Ordering = match order {
        SequencingOrder::Guid => |a, b| a.guid().cmp(b.guid()),
        SequencingOrder::CreationDateOldest => |a, b| a.header.create_time.cmp(&b.header.create_time),
        SequencingOrder::CreationDateRecent => |a, b| b.header.create_time.cmp(&a.header.create_time),
        SequencingOrder::LastUpdateOldest => |a, b| a.header.update_time.cmp(&b.header.update_time),
        SequencingOrder::LastUpdateRecent => |a, b| b.header.update_time.cmp(&a.header.update_time),
        SequencingOrder::Any
        | SequencingOrder::PropertyAscending
        | SequencingOrder::PropertyDescending => return,
    };

    details.sort_by(by);
}
