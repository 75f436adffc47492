//! Module: types
//! Responsibility: the generic metadata model the calling framework speaks.
//! Does not own: type-definition authority, validation of instances against
//! their definitions, or persistence.
//! Boundary: everything the facade accepts from or returns to callers.

mod attribute;
mod instance;
mod property;
mod typedef;


use derive_more::Display;
use serde::{Deserialize, Serialize};

// re-exports
pub use attribute::{AttributeTypeDef, AttributeTypeDefCategory, EnumElement};
pub use instance::{
    Classification, EntityDetail, EntityProxy, EntitySummary, InstanceHeader, Relationship,
};
pub use property::{InstanceProperties, PrimitiveValue, PropertyValue, epoch_millis};
pub use typedef::{ExternalStandard, TypeDef, TypeDefCategory};

///
/// MatchCriteria
///
/// How multiple match properties combine on a search.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum MatchCriteria {
    #[default]
    All,
    Any,
    None,
}

///
/// SequencingOrder
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum SequencingOrder {
    #[default]
    Any,
    CreationDateOldest,
    CreationDateRecent,
    Guid,
    LastUpdateOldest,
    LastUpdateRecent,
    PropertyAscending,
    PropertyDescending,
}

impl SequencingOrder {
    /// True for orders that sequence on a caller-named property.
    #[must_use]
    pub const fn is_property_based(self) -> bool {
        matches!(self, Self::PropertyAscending | Self::PropertyDescending)
    }
}

///
/// InstanceStatus
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum InstanceStatus {
    Unknown,
    Proposed,
    Draft,
    Prepared,
    #[default]
    Active,
    Deleted,
}
