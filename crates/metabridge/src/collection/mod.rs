//! Module: collection
//! Responsibility: the generic metadata-collection operations, orchestrating
//! registry lookups, query translation, catalog I/O and materialization.
//! Does not own: mapping definitions, condition syntax or instance shapes.
//! Boundary: every core error is converted to the public `Error` here.

mod entities;
mod relationships;
mod search;
mod types;

use crate::{
    config::ConnectorConfig,
    error::{Error, ErrorKind},
};
use metabridge_core::{
    catalog::{CatalogClient, CatalogObject, Sort},
    id,
    mapping::{MappingRegistry, TypeLookup, attribute_type_defs, type_defs},
    materialize::Materializer,
    query::{Translator, sort_for},
    types::{InstanceStatus, SequencingOrder, TypeDef, TypeDefCategory},
};
use time::OffsetDateTime;

///
/// SearchOptions
///
/// Paging, status, sequencing and classification limits shared by the
/// search operations. A `page_size` of zero asks for everything, capped at
/// the configured maximum page size.
///

#[derive(Clone, Debug, Default)]
pub struct SearchOptions {
    pub from_element: usize,
    pub page_size: usize,
    pub limit_by_classifications: Vec<String>,
    pub limit_by_status: Vec<InstanceStatus>,
    pub as_of_time: Option<OffsetDateTime>,
    pub sequencing_property: Option<String>,
    pub sequencing_order: SequencingOrder,
}

impl SearchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_paging(mut self, from_element: usize, page_size: usize) -> Self {
        self.from_element = from_element;
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_classifications(mut self, names: &[&str]) -> Self {
        self.limit_by_classifications = names.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_statuses(mut self, statuses: &[InstanceStatus]) -> Self {
        self.limit_by_status = statuses.to_vec();
        self
    }

    #[must_use]
    pub const fn with_order(mut self, order: SequencingOrder) -> Self {
        self.sequencing_order = order;
        self
    }

    #[must_use]
    pub const fn as_of(mut self, time: OffsetDateTime) -> Self {
        self.as_of_time = Some(time);
        self
    }

    /// The catalog only holds active instances, so any status limit other
    /// than exactly ACTIVE can never match.
    #[must_use]
    pub fn excludes_active(&self) -> bool {
        !self.limit_by_status.is_empty() && self.limit_by_status != [InstanceStatus::Active]
    }
}

///
/// MetadataCollection
///
/// Serves generic metadata operations from one catalog. The registry is
/// populated during start-up and only read once requests flow.
///

#[derive(Debug)]
pub struct MetadataCollection<C> {
    client: C,
    registry: MappingRegistry,
    config: ConnectorConfig,
}

impl<C: CatalogClient> MetadataCollection<C> {
    /// Collection with an empty registry for the configured catalog release.
    #[must_use]
    pub fn new(client: C, config: ConnectorConfig) -> Self {
        let registry = MappingRegistry::new(config.catalog_version);

        Self::with_registry(client, config, registry)
    }

    #[must_use]
    pub const fn with_registry(client: C, config: ConnectorConfig, registry: MappingRegistry) -> Self {
        Self {
            client,
            registry,
            config,
        }
    }

    /// Collection with every builtin type definition offered to the
    /// registry. Types without an implementation are recorded as such.
    #[must_use]
    pub fn with_builtin_types(client: C, config: ConnectorConfig) -> Self {
        let mut collection = Self::new(client, config);
        let failures = collection.add_type_def_gallery(type_defs());
        for def in attribute_type_defs() {
            let name = def.name.clone();
            if let Err(e) = collection.registry.register_attribute(def) {
                log::debug!(target: "metabridge", "attribute type {name} not registered: {e}");
            }
        }
        log::info!(
            target: "metabridge",
            "registered builtin types for catalog {}: {} implemented, {} not supported",
            collection.config.catalog_version,
            collection.registry.type_defs().count(),
            failures.len()
        );

        collection
    }

    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    #[must_use]
    pub const fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    const fn materializer(&self) -> Materializer<'_> {
        Materializer::new(&self.registry)
    }

    const fn translator(&self) -> Translator<'_> {
        Translator::new(&self.registry)
    }

    // ------------------------------------------------------------------
    // Shared request plumbing
    // ------------------------------------------------------------------

    /// Reject what the catalog can never serve and return the sort key.
    fn check_options(options: &SearchOptions) -> Result<Option<Sort>, Error> {
        if options.as_of_time.is_some() {
            return Err(Error::not_supported(
                "asOfTime",
                "historical queries are not supported",
            ));
        }
        if let Some(property) = &options.sequencing_property {
            return Err(Error::not_supported(
                property.clone(),
                "sequencing by property is not supported",
            ));
        }

        Ok(sort_for(options.sequencing_order)?)
    }

    /// Effective page size; zero means the configured maximum.
    const fn page_size(&self, options: &SearchOptions) -> usize {
        if options.page_size == 0 {
            self.config.max_page_size
        } else {
            options.page_size
        }
    }

    /// Fetch the object behind a generic guid. Placeholders count as
    /// absent.
    fn fetch_object(&self, guid: &str) -> Result<Option<CatalogObject>, Error> {
        if guid.is_empty() {
            return Err(Error::invalid_parameter("guid", "guid must not be empty"));
        }

        let object = self.client.get_object(id::decode_external_id(guid))?;

        Ok(object.filter(|o| !o.is_placeholder()))
    }

    /// Implemented or unimplemented type definition for a type guid, checked
    /// against the expected category.
    fn type_for_guid(&self, guid: &str, category: TypeDefCategory) -> Result<&TypeDef, Error> {
        let def = match self.registry.lookup_guid(guid) {
            TypeLookup::Implemented(def) | TypeLookup::Unimplemented(def) => def,
            TypeLookup::Unknown => {
                return Err(Error::new(
                    ErrorKind::TypeNotKnown,
                    guid,
                    format!("type guid '{guid}' is not known"),
                ));
            }
        };

        if def.category != category {
            return Err(Error::invalid_parameter(
                guid,
                format!("'{}' is a {} type, expected {category}", def.name, def.category),
            ));
        }

        Ok(def)
    }
}

/// Slice one page out of an accumulated result.
fn page_of<T>(mut items: Vec<T>, from_element: usize, page_size: usize) -> Vec<T> {
    if from_element >= items.len() {
        return Vec::new();
    }

    items.drain(..from_element);
    items.truncate(page_size);
    items
}
