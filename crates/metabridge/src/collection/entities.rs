use crate::{
    collection::MetadataCollection,
    error::{Error, ErrorKind},
};
use metabridge_core::{
    catalog::{CatalogClient, CatalogObject},
    id::RelationshipId,
    mapping::EntityMapping,
    types::{EntityDetail, EntitySummary, InstanceProperties},
};

impl<C: CatalogClient> MetadataCollection<C> {
    /// The entity if the catalog has it, `None` if it does not.
    pub fn is_entity_known(&self, guid: &str) -> Result<Option<EntityDetail>, Error> {
        match self.entity_detail(guid) {
            Ok(detail) => Ok(Some(detail)),
            Err(e) if e.kind == ErrorKind::EntityNotKnown => Ok(None),
            Err(e) => Err(e.in_operation("is_entity_known")),
        }
    }

    pub fn get_entity_summary(&self, guid: &str) -> Result<EntitySummary, Error> {
        self.entity_detail(guid)
            .map(EntityDetail::into_summary)
            .map_err(|e| e.in_operation("get_entity_summary"))
    }

    pub fn get_entity_detail(&self, guid: &str) -> Result<EntityDetail, Error> {
        self.entity_detail(guid)
            .map_err(|e| e.in_operation("get_entity_detail"))
    }

    /// Attach a classification to an entity by writing the classification's
    /// fields, then return the entity as the catalog now has it.
    pub fn classify_entity(
        &self,
        guid: &str,
        classification: &str,
        properties: Option<&InstanceProperties>,
    ) -> Result<EntityDetail, Error> {
        self.classify(guid, classification, properties)
            .map_err(|e| e.in_operation("classify_entity"))
    }

    fn entity_detail(&self, guid: &str) -> Result<EntityDetail, Error> {
        if RelationshipId::decode(guid).is_some() {
            return Err(Error::new(
                ErrorKind::EntityNotKnown,
                guid,
                format!("'{guid}' is a relationship id"),
            ));
        }

        let object = self.fetch_object(guid)?;

        Ok(self.materializer().resolve_detail(object.as_ref(), guid)?)
    }

    /// The catalog object and owning mapping for an entity guid.
    pub(super) fn entity_object(&self, guid: &str) -> Result<(CatalogObject, &EntityMapping), Error> {
        let object = self.fetch_object(guid)?.ok_or_else(|| {
            Error::new(
                ErrorKind::EntityNotKnown,
                guid,
                format!("entity '{guid}' is not known to the catalog"),
            )
        })?;
        let mapping = self
            .registry
            .resolve_guid(guid, &object.object_type)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::EntityNotKnown,
                    guid,
                    format!("no generic type maps catalog type '{}'", object.object_type),
                )
            })?;

        Ok((object, mapping))
    }

    fn classify(
        &self,
        guid: &str,
        classification: &str,
        properties: Option<&InstanceProperties>,
    ) -> Result<EntityDetail, Error> {
        let (object, mapping) = self.entity_object(guid)?;

        let classification_mapping = self
            .registry
            .classifications_for(mapping)
            .into_iter()
            .find(|c| c.generic_type == classification)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::ClassificationError,
                    classification,
                    format!(
                        "classification '{classification}' does not apply to {}",
                        mapping.generic_type
                    ),
                )
            })?;

        let update = classification_mapping.update_for(properties)?;
        log::info!(
            target: "metabridge",
            "classifying {guid} as {classification} ({} fields)",
            update.changes.len()
        );
        self.client.update(&object.id, &update)?;

        let refreshed = self.client.get_object(&object.id)?.ok_or_else(|| {
            Error::new(
                ErrorKind::RepositoryError,
                guid,
                format!("entity '{guid}' vanished after classification"),
            )
        })?;

        Ok(self
            .materializer()
            .entity_detail(mapping, Some(&refreshed), guid)?)
    }
}
