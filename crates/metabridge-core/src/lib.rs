//! Core mapping engine for metabridge: the generic metadata model, the
//! external catalog model, identifier codec, mapping registry, query
//! translator, and result materializer.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod catalog;
pub mod id;
pub mod mapping;
pub mod materialize;
pub mod query;
pub mod types;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Generic property that carries a catalog object's identity string.
///
/// Searches that constrain only this property with an exact or starts-with
/// literal are answered by a direct id lookup instead of a catalog search.
pub const IDENTITY_PROPERTY: &str = "qualifiedName";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, transports, or translators are re-exported here.
///

pub mod prelude {
    pub use crate::{
        catalog::{CatalogObject, CatalogVersion, FieldValue, ObjectRef},
        types::{
            AttributeTypeDef, AttributeTypeDefCategory, Classification, EntityDetail, EntityProxy,
            EntitySummary, InstanceProperties, InstanceStatus, MatchCriteria, PrimitiveValue,
            PropertyValue, Relationship, SequencingOrder, TypeDef, TypeDefCategory,
        },
    };
}
