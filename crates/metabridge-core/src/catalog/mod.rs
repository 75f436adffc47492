//! Module: catalog
//! Responsibility: the external asset catalog's object model, condition
//! language, per-type field capabilities, and the transport seam.
//! Does not own: generic-model semantics or any mapping decisions.
//! Boundary: everything the engine sends to or reads from the catalog.

mod memory;
mod object;
mod schema;
mod search;


use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

// re-exports
pub use memory::MemoryCatalog;
pub use object::{CatalogObject, FieldValue, ObjectRef, ObjectUpdate, UpdateValue};
pub use schema::{FieldDescriptor, FieldKind, SchemaCatalog, TypeDescriptor};
pub use search::{
    Combinator, Condition, ConditionNode, ConditionSet, Operator, ResultPage, SearchQuery, Sort,
};

///
/// CONSTANTS
///

/// Catalog type name the catalog uses for objects it cannot fully type.
/// Such objects are never mapped and never counted against page budgets.
pub const PLACEHOLDER_TYPE: &str = "main_object";

/// Field holding an object's id in conditions and sorts.
pub const ID_FIELD: &str = "_id";

/// Field holding an object's type in conditions.
pub const TYPE_FIELD: &str = "_type";

pub const CREATED_BY_FIELD: &str = "created_by";
pub const CREATED_ON_FIELD: &str = "created_on";
pub const MODIFIED_BY_FIELD: &str = "modified_by";
pub const MODIFIED_ON_FIELD: &str = "modified_on";

///
/// CatalogVersion
///
/// Catalog release line. Selects the schema capability table and the
/// mapping variants that differ between releases.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum CatalogVersion {
    #[display("11.5.0.2")]
    #[serde(rename = "11.5.0.2")]
    V11502,

    #[default]
    #[display("11.5.0.2 SP6")]
    #[serde(rename = "11.5.0.2 SP6")]
    V11502Sp6,

    #[display("11.7.0.2")]
    #[serde(rename = "11.7.0.2")]
    V11702,

    #[display("11.7.0.3")]
    #[serde(rename = "11.7.0.3")]
    V11703,
}

impl CatalogVersion {
    pub const ALL: [Self; 4] = [Self::V11502, Self::V11502Sp6, Self::V11702, Self::V11703];

    /// True for releases from the 11.7 line onwards.
    #[must_use]
    pub const fn is_v117_or_later(self) -> bool {
        matches!(self, Self::V11702 | Self::V11703)
    }
}

///
/// CatalogError
///
/// Failures reported by a catalog transport.
///

#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("catalog rejected {operation} (status {status}): {message}")]
    Rejected {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("catalog request failed: {message}")]
    Transport { message: String },

    #[error("catalog object '{id}' cannot be updated: {message}")]
    UpdateRejected { id: String, message: String },
}

///
/// CatalogClient
///
/// Blocking seam to the external catalog. Implementations own the session,
/// retries and wire format; the engine only sees objects and pages.
///

pub trait CatalogClient {
    /// Fetch one object by id. `Ok(None)` means the catalog has no such object.
    fn get_object(&self, id: &str) -> Result<Option<CatalogObject>, CatalogError>;

    /// Run one page of a search.
    fn search(&self, query: &SearchQuery) -> Result<ResultPage, CatalogError>;

    /// Apply field changes to one object.
    fn update(&self, id: &str, update: &ObjectUpdate) -> Result<(), CatalogError>;
}

impl<C: CatalogClient + ?Sized> CatalogClient for &C {
    fn get_object(&self, id: &str) -> Result<Option<CatalogObject>, CatalogError> {
        (**self).get_object(id)
    }

    fn search(&self, query: &SearchQuery) -> Result<ResultPage, CatalogError> {
        (**self).search(query)
    }

    fn update(&self, id: &str, update: &ObjectUpdate) -> Result<(), CatalogError> {
        (**self).update(id, update)
    }
}
