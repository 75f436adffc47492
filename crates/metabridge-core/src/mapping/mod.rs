//! Module: mapping
//! Responsibility: correspondence records between generic types and catalog
//! types, the registration table that builds them, and the registry that
//! indexes them.
//! Does not own: query construction or result materialization.
//! Boundary: the registry is built once at start-up and read-only after.

mod builtin;
mod classification;
mod derived;
mod entity;
mod registry;
mod relationship;

pub mod convert;


// re-exports
pub use builtin::{
    BUILTIN_ENUM_MAPPINGS, BUILTIN_MAPPINGS, EnumMapping, MappingDef, MappingEntry,
    attribute_type_defs, type_defs,
};
pub use classification::{ClassificationMapping, ClassificationWriteError};
pub use derived::{DerivedProperty, FixedEnum, QualifiedName};
pub use entity::{EntityMapping, PropertyMapping, PropertySource};
pub use registry::{MappingRegistry, RegistryError, TypeLookup};
pub use relationship::{End, Endpoint, PropertyHolder, RelationshipKind, RelationshipMapping};
