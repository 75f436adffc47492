use crate::{
    collection::MetadataCollection,
    error::{Error, ErrorKind},
};
use metabridge_core::{
    catalog::CatalogClient,
    mapping::TypeLookup,
    types::{AttributeTypeDef, AttributeTypeDefCategory, TypeDef, TypeDefCategory},
};
use regex::Regex;

impl<C: CatalogClient> MetadataCollection<C> {
    //
    // Lookup
    //

    /// Every implemented type definition, ordered by name.
    #[must_use]
    pub fn get_all_types(&self) -> Vec<TypeDef> {
        self.registry.type_defs().cloned().collect()
    }

    #[must_use]
    pub fn find_type_defs_by_category(&self, category: TypeDefCategory) -> Vec<TypeDef> {
        self.registry
            .type_defs()
            .filter(|d| d.category == category)
            .cloned()
            .collect()
    }

    /// Implemented types declaring any of the named properties.
    pub fn find_type_defs_by_property(&self, names: &[String]) -> Result<Vec<TypeDef>, Error> {
        if names.is_empty() {
            return Err(Error::invalid_parameter(
                "matchCriteria",
                "at least one property name is required",
            )
            .in_operation("find_type_defs_by_property"));
        }

        Ok(self
            .registry
            .type_defs()
            .filter(|d| names.iter().any(|n| d.declares(n)))
            .cloned()
            .collect())
    }

    /// Implemented types whose name matches a regular expression.
    pub fn search_for_type_defs(&self, pattern: &str) -> Result<Vec<TypeDef>, Error> {
        let regex = Regex::new(pattern).map_err(|e| {
            Error::invalid_parameter(pattern, e.to_string()).in_operation("search_for_type_defs")
        })?;

        Ok(self
            .registry
            .type_defs()
            .filter(|d| regex.is_match(&d.name))
            .cloned()
            .collect())
    }

    /// Implemented types corresponding to an external standard type. Parts
    /// left out match anything; with none given every type is returned.
    #[must_use]
    pub fn find_types_by_external_id(
        &self,
        standard: Option<&str>,
        organization: Option<&str>,
        identifier: Option<&str>,
    ) -> Vec<TypeDef> {
        let unfiltered = standard.is_none() && organization.is_none() && identifier.is_none();

        self.registry
            .type_defs()
            .filter(|d| unfiltered || d.has_external_standard(standard, organization, identifier))
            .cloned()
            .collect()
    }

    pub fn get_type_def_by_guid(&self, guid: &str) -> Result<TypeDef, Error> {
        implemented(self.registry.lookup_guid(guid), guid)
            .map_err(|e| e.in_operation("get_type_def_by_guid"))
    }

    pub fn get_type_def_by_name(&self, name: &str) -> Result<TypeDef, Error> {
        implemented(self.registry.lookup_name(name), name)
            .map_err(|e| e.in_operation("get_type_def_by_name"))
    }

    #[must_use]
    pub fn find_attribute_type_defs_by_category(
        &self,
        category: AttributeTypeDefCategory,
    ) -> Vec<AttributeTypeDef> {
        self.registry
            .attribute_type_defs()
            .filter(|d| d.category == category)
            .cloned()
            .collect()
    }

    pub fn get_attribute_type_def_by_guid(&self, guid: &str) -> Result<AttributeTypeDef, Error> {
        self.registry
            .attribute_type_def_by_guid(guid)
            .cloned()
            .ok_or_else(|| {
                attribute_not_known(guid).in_operation("get_attribute_type_def_by_guid")
            })
    }

    pub fn get_attribute_type_def_by_name(&self, name: &str) -> Result<AttributeTypeDef, Error> {
        self.registry
            .attribute_type_def(name)
            .cloned()
            .ok_or_else(|| {
                attribute_not_known(name).in_operation("get_attribute_type_def_by_name")
            })
    }

    //
    // Registration
    //

    pub fn add_type_def(&mut self, def: TypeDef) -> Result<(), Error> {
        self.registry
            .register(def)
            .map_err(|e| Error::from(e).in_operation("add_type_def"))
    }

    /// Register a batch of definitions. One failing type does not stop the
    /// batch; the per-type failures are returned.
    pub fn add_type_def_gallery(&mut self, defs: impl IntoIterator<Item = TypeDef>) -> Vec<Error> {
        let mut failures = Vec::new();

        for def in defs {
            let name = def.name.clone();
            if let Err(e) = self.registry.register(def) {
                log::debug!(target: "metabridge", "type {name} not registered: {e}");
                failures.push(Error::from(e).in_operation("add_type_def_gallery"));
            }
        }

        failures
    }

    /// Enum types register only when the catalog's values map onto their
    /// elements; primitive and collection types always register.
    pub fn add_attribute_type_def(&mut self, def: AttributeTypeDef) -> Result<(), Error> {
        self.registry
            .register_attribute(def)
            .map_err(|e| Error::from(e).in_operation("add_attribute_type_def"))
    }

    /// Primitive and collection types are always usable. An enum is usable
    /// once it has been added.
    pub fn verify_attribute_type_def(&self, def: &AttributeTypeDef) -> Result<bool, Error> {
        if def.name.is_empty() || def.guid.is_empty() {
            return Err(Error::invalid_parameter(
                "attributeTypeDef",
                "attribute type definitions need a name and a guid",
            )
            .in_operation("verify_attribute_type_def"));
        }

        Ok(match def.category {
            AttributeTypeDefCategory::Primitive | AttributeTypeDefCategory::Collection => true,
            AttributeTypeDefCategory::Enum => {
                self.registry.attribute_type_def_by_guid(&def.guid).is_some()
            }
        })
    }

    /// `Ok(true)` when the type is implemented and every property it
    /// declares or inherits is mapped, `Ok(false)` when the type was never
    /// offered. Partial or missing implementations are `TypeNotSupported`.
    pub fn verify_type_def(&self, def: &TypeDef) -> Result<bool, Error> {
        let not_supported = |message: String| {
            Err(Error::new(ErrorKind::TypeNotSupported, def.name.clone(), message)
                .in_operation("verify_type_def"))
        };

        match self.registry.lookup_guid(&def.guid) {
            TypeLookup::Unknown => Ok(false),
            TypeLookup::Unimplemented(_) => {
                not_supported(format!("type '{}' has no implementation", def.name))
            }
            TypeLookup::Implemented(registered) => {
                let mapped = self.registry.mapped_properties(registered);
                let unmapped: Vec<String> = self
                    .registry
                    .all_properties(def)
                    .into_iter()
                    .filter(|p| !mapped.contains(p))
                    .collect();

                if unmapped.is_empty() {
                    Ok(true)
                } else {
                    not_supported(format!(
                        "type '{}' does not map properties: {}",
                        def.name,
                        unmapped.join(", ")
                    ))
                }
            }
        }
    }
}

fn implemented(lookup: TypeLookup<'_>, key: &str) -> Result<TypeDef, Error> {
    match lookup {
        TypeLookup::Implemented(def) => Ok(def.clone()),
        TypeLookup::Unimplemented(def) => Err(Error::new(
            ErrorKind::TypeNotSupported,
            key,
            format!("type '{}' is not supported by this catalog", def.name),
        )),
        TypeLookup::Unknown => Err(Error::new(
            ErrorKind::TypeNotKnown,
            key,
            format!("type '{key}' is not known"),
        )),
    }
}

fn attribute_not_known(key: &str) -> Error {
    Error::new(
        ErrorKind::TypeNotKnown,
        key,
        format!("attribute type '{key}' is not known"),
    )
}
