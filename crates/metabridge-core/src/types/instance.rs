use crate::types::{InstanceProperties, InstanceStatus};
use time::OffsetDateTime;

///
/// InstanceHeader
///
/// Identity, type and audit fields common to every returned instance.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceHeader {
    pub guid: String,
    pub type_name: String,
    pub type_guid: String,
    pub status: InstanceStatus,
    pub created_by: Option<String>,
    pub create_time: Option<OffsetDateTime>,
    pub updated_by: Option<String>,
    pub update_time: Option<OffsetDateTime>,
    pub version: i64,
}

///
/// Classification
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Classification {
    pub name: String,
    pub type_guid: String,
    pub properties: InstanceProperties,
}

///
/// EntitySummary
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntitySummary {
    pub header: InstanceHeader,
    pub classifications: Vec<Classification>,
}

impl EntitySummary {
    #[must_use]
    pub fn guid(&self) -> &str {
        &self.header.guid
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.header.type_name
    }

    #[must_use]
    pub fn classification(&self, name: &str) -> Option<&Classification> {
        self.classifications.iter().find(|c| c.name == name)
    }
}

///
/// EntityDetail
///
/// Summary plus the entity's mapped properties.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityDetail {
    pub header: InstanceHeader,
    pub classifications: Vec<Classification>,
    pub properties: InstanceProperties,
}

impl EntityDetail {
    #[must_use]
    pub fn guid(&self) -> &str {
        &self.header.guid
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.header.type_name
    }

    #[must_use]
    pub fn classification(&self, name: &str) -> Option<&Classification> {
        self.classifications.iter().find(|c| c.name == name)
    }

    /// Drop the property payload.
    #[must_use]
    pub fn into_summary(self) -> EntitySummary {
        EntitySummary {
            header: self.header,
            classifications: self.classifications,
        }
    }
}

///
/// EntityProxy
///
/// One end of a relationship: header plus unique properties only.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityProxy {
    pub header: InstanceHeader,
    pub unique_properties: InstanceProperties,
}

impl EntityProxy {
    #[must_use]
    pub fn guid(&self) -> &str {
        &self.header.guid
    }
}

///
/// Relationship
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Relationship {
    pub header: InstanceHeader,
    pub properties: InstanceProperties,
    pub entity_one: EntityProxy,
    pub entity_two: EntityProxy,
}

impl Relationship {
    #[must_use]
    pub fn guid(&self) -> &str {
        &self.header.guid
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.header.type_name
    }
}
