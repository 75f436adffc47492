use crate::{
    collection::{MetadataCollection, SearchOptions, page_of},
    error::{Error, ErrorKind},
};
use metabridge_core::{
    catalog::{CatalogClient, FieldValue, ObjectUpdate},
    id::{self, RelationshipId},
    mapping::End,
    types::{InstanceProperties, InstanceStatus, Relationship, SequencingOrder, TypeDefCategory},
};

impl<C: CatalogClient> MetadataCollection<C> {
    /// Relationships an entity takes part in, optionally of one type.
    pub fn get_relationships_for_entity(
        &self,
        guid: &str,
        relationship_type_guid: Option<&str>,
        options: &SearchOptions,
    ) -> Result<Vec<Relationship>, Error> {
        self.relationships_for_entity(guid, relationship_type_guid, options)
            .map_err(|e| e.in_operation("get_relationships_for_entity"))
    }

    /// The relationship if both its ends exist and are linked, `None`
    /// otherwise.
    pub fn is_relationship_known(&self, guid: &str) -> Result<Option<Relationship>, Error> {
        match self.relationship(guid) {
            Ok(relationship) => Ok(Some(relationship)),
            Err(e) if e.kind == ErrorKind::RelationshipNotKnown => Ok(None),
            Err(e) => Err(e.in_operation("is_relationship_known")),
        }
    }

    pub fn get_relationship(&self, guid: &str) -> Result<Relationship, Error> {
        self.relationship(guid)
            .map_err(|e| e.in_operation("get_relationship"))
    }

    /// Link two entities. Only entity-level relationships can be written;
    /// the link is stored in one end's linkage field.
    pub fn add_relationship(
        &self,
        relationship_type_guid: &str,
        properties: Option<&InstanceProperties>,
        one_guid: &str,
        two_guid: &str,
        status: InstanceStatus,
    ) -> Result<Relationship, Error> {
        self.link(relationship_type_guid, properties, one_guid, two_guid, status)
            .map_err(|e| e.in_operation("add_relationship"))
    }

    fn relationships_for_entity(
        &self,
        guid: &str,
        relationship_type_guid: Option<&str>,
        options: &SearchOptions,
    ) -> Result<Vec<Relationship>, Error> {
        Self::check_options(options)?;
        if options.excludes_active() {
            return Ok(Vec::new());
        }

        let filter = relationship_type_guid
            .map(|g| self.type_for_guid(g, TypeDefCategory::Relationship))
            .transpose()?
            .map(|d| d.name.as_str());

        let (object, mapping) = self.entity_object(guid)?;
        let mut relationships = self
            .materializer()
            .relationships_for_entity(&self.client, mapping, &object, filter)?;

        if options.sequencing_order == SequencingOrder::Guid {
            relationships.sort_by(|a, b| a.guid().cmp(b.guid()));
        }

        Ok(page_of(
            relationships,
            options.from_element,
            self.page_size(options),
        ))
    }

    fn relationship(&self, guid: &str) -> Result<Relationship, Error> {
        let id = RelationshipId::decode(guid).ok_or_else(|| {
            Error::new(
                ErrorKind::RelationshipNotKnown,
                guid,
                format!("'{guid}' is not a relationship id"),
            )
        })?;

        Ok(self.materializer().relationship_from_id(&self.client, &id)?)
    }

    fn link(
        &self,
        relationship_type_guid: &str,
        properties: Option<&InstanceProperties>,
        one_guid: &str,
        two_guid: &str,
        status: InstanceStatus,
    ) -> Result<Relationship, Error> {
        if status != InstanceStatus::Active {
            return Err(Error::invalid_parameter(
                "initialStatus",
                format!("relationships can only be created with status {}", InstanceStatus::Active),
            ));
        }
        if properties.is_some_and(|p| !p.is_empty()) {
            return Err(Error::not_supported(
                "relationshipProperties",
                "relationship properties cannot be written",
            ));
        }

        let def = self.type_for_guid(relationship_type_guid, TypeDefCategory::Relationship)?;
        let name = def.name.clone();

        let (one, _) = self.entity_object(one_guid)?;
        let (two, _) = self.entity_object(two_guid)?;

        let mapping = self
            .registry
            .relationship_mapping(
                &name,
                (&one.object_type, id::decode_prefix(one_guid)),
                (&two.object_type, id::decode_prefix(two_guid)),
            )
            .ok_or_else(|| {
                Error::invalid_parameter(
                    relationship_type_guid,
                    format!(
                        "{name} cannot join '{}' and '{}'",
                        one.object_type, two.object_type
                    ),
                )
            })?;

        if mapping.is_self_contained() {
            return Err(Error::not_supported(
                name,
                "relationships derived from a single catalog object cannot be created",
            ));
        }
        if mapping.is_object_level() {
            return Err(Error::not_supported(
                name,
                "relationships held in their own catalog objects cannot be created",
            ));
        }

        let (end, from, to) = if mapping.one.link_field.is_some() {
            (End::One, &one, &two)
        } else {
            (End::Two, &two, &one)
        };
        let Some(field) = mapping.end(end).link_field.as_deref() else {
            return Err(Error::not_supported(name, "relationship has no linkage field"));
        };

        let update = if self.registry.schema().is_list(&from.object_type, field) {
            ObjectUpdate::new().append(field, to.to_ref())
        } else {
            ObjectUpdate::new().set(field, FieldValue::Reference(to.to_ref()))
        };
        log::info!(target: "metabridge", "linking {one_guid} to {two_guid} as {name} via {field}");
        self.client.update(&from.id, &update)?;

        let id = RelationshipId::new(one_guid, two_guid, &name);

        Ok(self.materializer().relationship_from_id(&self.client, &id)?)
    }
}
