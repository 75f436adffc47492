//! Module: materialize
//! Responsibility: turn catalog objects into generic entities and
//! relationships, and drain paged search results.
//! Does not own: query construction or mapping selection for searches.
//! Boundary: every generic instance returned to callers is built here.

mod entity;
mod page;
mod relationship;

#[cfg(test)]
mod tests;

use crate::{catalog::CatalogError, mapping::MappingRegistry};
use thiserror::Error as ThisError;

// re-exports
pub use page::drain_pages;

///
/// MaterializeError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum MaterializeError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("entity '{guid}' is not known to the catalog")]
    EntityNotKnown { guid: String },

    #[error("catalog returned placeholder object '{guid}' of type '{object_type}'")]
    InvalidEntityFromStore { guid: String, object_type: String },

    #[error("no mapping for catalog type '{external_type}' (prefix {prefix:?})")]
    NoMapping {
        external_type: String,
        prefix: Option<String>,
    },

    #[error("relationship '{guid}' is not known to the catalog")]
    RelationshipNotKnown { guid: String },
}

///
/// Materializer
///
/// Builds generic instances from catalog objects using the registry's
/// mappings. Holds no state beyond the registry borrow.
///

#[derive(Clone, Copy, Debug)]
pub struct Materializer<'a> {
    registry: &'a MappingRegistry,
}

impl<'a> Materializer<'a> {
    #[must_use]
    pub const fn new(registry: &'a MappingRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub const fn registry(&self) -> &'a MappingRegistry {
        self.registry
    }
}
