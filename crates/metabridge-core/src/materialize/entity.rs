use crate::{
    catalog::{CREATED_BY_FIELD, CREATED_ON_FIELD, CatalogObject, MODIFIED_BY_FIELD, MODIFIED_ON_FIELD},
    mapping::{EntityMapping, PropertySource, convert},
    materialize::{MaterializeError, Materializer},
    types::{
        Classification, EntityDetail, EntityProxy, EntitySummary, InstanceHeader,
        InstanceProperties, InstanceStatus,
    },
    IDENTITY_PROPERTY,
};

impl Materializer<'_> {
    /// Full entity for a catalog object under one mapping.
    /// `requested` is the guid the caller asked for, used in errors.
    pub fn entity_detail(
        &self,
        mapping: &EntityMapping,
        object: Option<&CatalogObject>,
        requested: &str,
    ) -> Result<EntityDetail, MaterializeError> {
        let object = checked(object, requested)?;

        Ok(EntityDetail {
            header: self.header(mapping, object),
            classifications: self.classifications(mapping, object),
            properties: properties(mapping, object),
        })
    }

    /// Header and classifications only.
    pub fn entity_summary(
        &self,
        mapping: &EntityMapping,
        object: Option<&CatalogObject>,
        requested: &str,
    ) -> Result<EntitySummary, MaterializeError> {
        let object = checked(object, requested)?;

        Ok(EntitySummary {
            header: self.header(mapping, object),
            classifications: self.classifications(mapping, object),
        })
    }

    /// Relationship end for an object. Only the identity property is carried
    /// as a unique property.
    #[must_use]
    pub fn entity_proxy(&self, mapping: &EntityMapping, object: &CatalogObject) -> EntityProxy {
        let mut unique_properties = InstanceProperties::new();
        if let Some(PropertySource::Derived(derived)) =
            mapping.property(IDENTITY_PROPERTY).map(|p| &p.source)
            && let Some(value) = derived.derive(mapping, object)
        {
            unique_properties.insert(IDENTITY_PROPERTY, value);
        }

        EntityProxy {
            header: self.header(mapping, object),
            unique_properties,
        }
    }

    /// Resolve the mapping that owns `requested` for this object, then
    /// materialize the full entity.
    pub fn resolve_detail(
        &self,
        object: Option<&CatalogObject>,
        requested: &str,
    ) -> Result<EntityDetail, MaterializeError> {
        let checked = checked(object, requested)?;
        let mapping = self.resolve(checked, requested)?;

        self.entity_detail(mapping, Some(checked), requested)
    }

    pub(crate) fn resolve(
        &self,
        object: &CatalogObject,
        guid: &str,
    ) -> Result<&EntityMapping, MaterializeError> {
        self.registry()
            .resolve_guid(guid, &object.object_type)
            .ok_or_else(|| MaterializeError::NoMapping {
                external_type: object.object_type.clone(),
                prefix: crate::id::decode_prefix(guid).map(ToString::to_string),
            })
    }

    pub(crate) fn header(&self, mapping: &EntityMapping, object: &CatalogObject) -> InstanceHeader {
        let created = object.date(CREATED_ON_FIELD);
        let modified = object.date(MODIFIED_ON_FIELD);

        InstanceHeader {
            guid: mapping.guid_for(&object.id),
            type_name: mapping.generic_type.clone(),
            type_guid: self.registry().type_guid(&mapping.generic_type),
            status: InstanceStatus::Active,
            created_by: object.text(CREATED_BY_FIELD).map(ToString::to_string),
            create_time: created.and_then(convert::date_from_millis),
            updated_by: object.text(MODIFIED_BY_FIELD).map(ToString::to_string),
            update_time: modified.and_then(convert::date_from_millis),
            version: modified.or(created).unwrap_or_default(),
        }
    }

    fn classifications(&self, mapping: &EntityMapping, object: &CatalogObject) -> Vec<Classification> {
        self.registry()
            .classifications_for(mapping)
            .into_iter()
            .filter(|c| c.is_present(object))
            .map(|c| Classification {
                name: c.generic_type.clone(),
                type_guid: self.registry().type_guid(&c.generic_type),
                properties: c.properties_of(object),
            })
            .collect()
    }
}

/// Reject absent and placeholder objects.
fn checked<'o>(
    object: Option<&'o CatalogObject>,
    requested: &str,
) -> Result<&'o CatalogObject, MaterializeError> {
    match object {
        None => Err(MaterializeError::EntityNotKnown {
            guid: requested.to_string(),
        }),
        Some(o) if o.is_placeholder() => Err(MaterializeError::InvalidEntityFromStore {
            guid: requested.to_string(),
            object_type: o.object_type.clone(),
        }),
        Some(o) => Ok(o),
    }
}

fn properties(mapping: &EntityMapping, object: &CatalogObject) -> InstanceProperties {
    let mut out = InstanceProperties::new();

    for property in &mapping.properties {
        let value = match &property.source {
            PropertySource::Field(field) => object.field(field).and_then(convert::field_to_property),
            PropertySource::Derived(derived) => derived.derive(mapping, object),
        };
        if let Some(value) = value {
            out.insert(property.generic.clone(), value);
        }
    }

    out
}
