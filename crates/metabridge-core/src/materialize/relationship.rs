use crate::{
    catalog::{CatalogClient, CatalogObject},
    id::{self, RelationshipId},
    mapping::{End, Endpoint, EntityMapping, PropertyHolder, RelationshipMapping, convert},
    materialize::{MaterializeError, Materializer},
    types::{InstanceHeader, InstanceProperties, InstanceStatus, Relationship},
};

impl Materializer<'_> {
    /// Relationship joining two catalog objects under one mapping. For
    /// self-contained mappings both objects are the same.
    pub fn relationship(
        &self,
        mapping: &RelationshipMapping,
        one: &CatalogObject,
        two: &CatalogObject,
    ) -> Result<Relationship, MaterializeError> {
        self.assemble(mapping, one, two, None)
    }

    /// Relationship standing for a relationship object of an object-level
    /// mapping. `None` when the object does not lead to an accepted end on
    /// both sides.
    pub fn relationship_of_object(
        &self,
        mapping: &RelationshipMapping,
        object: &CatalogObject,
    ) -> Result<Option<Relationship>, MaterializeError> {
        let reached = |endpoint: &Endpoint| {
            let field = endpoint.via_field.as_deref()?;
            object
                .references(field)
                .iter()
                .find(|r| endpoint.accepts_type(&r.object_type))
                .map(CatalogObject::from_ref)
        };
        let (Some(one), Some(two)) = (reached(&mapping.one), reached(&mapping.two)) else {
            return Ok(None);
        };

        self.assemble(mapping, &one, &two, Some(object)).map(Some)
    }

    fn assemble(
        &self,
        mapping: &RelationshipMapping,
        one: &CatalogObject,
        two: &CatalogObject,
        relationship_object: Option<&CatalogObject>,
    ) -> Result<Relationship, MaterializeError> {
        let entity_one = self.entity_proxy(self.end_mapping(&mapping.one, one)?, one);
        let entity_two = self.entity_proxy(self.end_mapping(&mapping.two, two)?, two);

        // a relationship object's id fills both ends of the relationship id
        let guid = match relationship_object {
            Some(object) => RelationshipId::new(&object.id, &object.id, &mapping.generic_type),
            None => RelationshipId::new(entity_one.guid(), entity_two.guid(), &mapping.generic_type),
        }
        .encode();

        let source = match mapping.properties_from {
            PropertyHolder::End(End::One) => Some(one),
            PropertyHolder::End(End::Two) => Some(two),
            PropertyHolder::RelationshipObject => relationship_object,
        };
        let properties: InstanceProperties = source
            .into_iter()
            .flat_map(|source| {
                mapping.properties.iter().filter_map(|(generic, field)| {
                    let value = source.field(field).and_then(convert::field_to_property)?;
                    Some((generic.clone(), value))
                })
            })
            .collect();

        Ok(Relationship {
            header: InstanceHeader {
                guid,
                type_name: mapping.generic_type.clone(),
                type_guid: self.registry().type_guid(&mapping.generic_type),
                status: InstanceStatus::Active,
                ..InstanceHeader::default()
            },
            properties,
            entity_one,
            entity_two,
        })
    }

    /// Relationships an entity takes part in, read from the link fields of
    /// its own object. The far end is fetched only when relationship
    /// properties live on it; relationship objects are always fetched.
    pub fn relationships_for_entity<C: CatalogClient + ?Sized>(
        &self,
        client: &C,
        mapping: &EntityMapping,
        object: &CatalogObject,
        type_filter: Option<&str>,
    ) -> Result<Vec<Relationship>, MaterializeError> {
        let mut out = Vec::new();

        for (relationship, end) in self.registry().relationships_for(mapping) {
            if type_filter.is_some_and(|t| t != relationship.generic_type) {
                continue;
            }

            if relationship.is_self_contained() {
                out.push(self.relationship(relationship, object, object)?);
                continue;
            }

            let Some(field) = relationship.end(end).link_field.as_deref() else {
                continue;
            };

            if relationship.is_object_level() {
                out.extend(self.object_relationships(client, relationship, end, object, field)?);
                continue;
            }

            let far_end = relationship.end(end.other());
            let fetch_far = relationship.properties_from == PropertyHolder::End(end.other())
                && !relationship.properties.is_empty();

            for reference in object.references(field) {
                if !far_end.accepts_type(&reference.object_type) {
                    continue;
                }

                let other = if fetch_far {
                    if let Some(other) = client.get_object(&reference.id)? {
                        other
                    } else {
                        log::warn!(
                            target: "metabridge::materialize",
                            "{} end '{}' vanished while reading relationships of '{}'",
                            relationship.generic_type,
                            reference.id,
                            object.id
                        );
                        continue;
                    }
                } else {
                    CatalogObject::from_ref(reference)
                };

                let (one, two) = match end {
                    End::One => (object, &other),
                    End::Two => (&other, object),
                };
                out.push(self.relationship(relationship, one, two)?);
            }
        }

        Ok(out)
    }

    /// Relationships held in relationship objects the entity links to. An
    /// object only counts when it leads back to this entity on `end`.
    fn object_relationships<C: CatalogClient + ?Sized>(
        &self,
        client: &C,
        mapping: &RelationshipMapping,
        end: End,
        object: &CatalogObject,
        field: &str,
    ) -> Result<Vec<Relationship>, MaterializeError> {
        let back = mapping.end(end).via_field.as_deref();
        let mut out = Vec::new();

        for reference in object.references(field) {
            if !mapping.is_held_by(&reference.object_type) {
                continue;
            }

            let Some(held) = client
                .get_object(&reference.id)?
                .filter(|o| !o.is_placeholder())
            else {
                log::warn!(
                    target: "metabridge::materialize",
                    "{} object '{}' vanished while reading relationships of '{}'",
                    mapping.generic_type,
                    reference.id,
                    object.id
                );
                continue;
            };

            let leads_back = back.is_some_and(|f| held.references(f).iter().any(|r| r.id == object.id));
            if !leads_back {
                continue;
            }

            if let Some(relationship) = self.relationship_of_object(mapping, &held)? {
                out.push(relationship);
            }
        }

        Ok(out)
    }

    /// Relationship named by a decoded id. Both ends are fetched and must
    /// actually be linked; an id naming one relationship object twice
    /// resolves through that object.
    pub fn relationship_from_id<C: CatalogClient + ?Sized>(
        &self,
        client: &C,
        id: &RelationshipId,
    ) -> Result<Relationship, MaterializeError> {
        let not_known = || MaterializeError::RelationshipNotKnown { guid: id.encode() };

        let fetch = |guid: &str| -> Result<Option<CatalogObject>, MaterializeError> {
            Ok(client
                .get_object(id::decode_external_id(guid))?
                .filter(|o| !o.is_placeholder()))
        };

        let one = fetch(&id.one_guid)?.ok_or_else(not_known)?;

        if id.one_guid == id.two_guid
            && let Some(mapping) = self
                .registry()
                .relationship_object_mapping(&id.relationship_type, &one.object_type)
        {
            return self.relationship_of_object(mapping, &one)?.ok_or_else(not_known);
        }

        let two = if id.is_self_contained() {
            one.clone()
        } else {
            fetch(&id.two_guid)?.ok_or_else(not_known)?
        };

        let mapping = self
            .registry()
            .relationship_mapping(
                &id.relationship_type,
                (&one.object_type, id::decode_prefix(&id.one_guid)),
                (&two.object_type, id::decode_prefix(&id.two_guid)),
            )
            .ok_or_else(not_known)?;

        if mapping.is_object_level()
            || mapping.is_self_contained() != id.is_self_contained()
            || (!mapping.is_self_contained() && !linked(mapping, &one, &two))
        {
            return Err(not_known());
        }

        self.relationship(mapping, &one, &two)
    }

    fn end_mapping(
        &self,
        endpoint: &Endpoint,
        object: &CatalogObject,
    ) -> Result<&EntityMapping, MaterializeError> {
        self.registry()
            .resolve_by_external_type(&object.object_type, endpoint.prefix.as_deref())
            .filter(|m| m.prefix == endpoint.prefix)
            .ok_or_else(|| MaterializeError::NoMapping {
                external_type: object.object_type.clone(),
                prefix: endpoint.prefix.clone(),
            })
    }
}

/// Either end's link field references the other end.
fn linked(mapping: &RelationshipMapping, one: &CatalogObject, two: &CatalogObject) -> bool {
    let points_at = |endpoint: &Endpoint, from: &CatalogObject, to: &CatalogObject| {
        endpoint
            .link_field
            .as_deref()
            .is_some_and(|f| from.references(f).iter().any(|r| r.id == to.id))
    };

    points_at(&mapping.one, one, two) || points_at(&mapping.two, two, one)
}
