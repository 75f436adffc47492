use crate::{
    catalog::{CatalogVersion, SchemaCatalog},
    id,
    mapping::{
        BUILTIN_ENUM_MAPPINGS, BUILTIN_MAPPINGS, ClassificationMapping, End, EntityMapping,
        EnumMapping, MappingDef, MappingEntry, PropertySource, RelationshipMapping,
    },
    types::{AttributeTypeDef, AttributeTypeDefCategory, TypeDef, TypeDefCategory},
};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error as ThisError;

/// Supertype chains deeper than this are treated as cyclic.
const MAX_TYPE_DEPTH: usize = 64;

///
/// RegistryError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum RegistryError {
    #[error("catalog type '{external_type}' already has a default mapping ('{existing}')")]
    DuplicateDefault {
        external_type: String,
        existing: String,
    },

    #[error("prefix '{prefix}' is already used by mapping '{existing}'")]
    DuplicatePrefix { prefix: String, existing: String },

    #[error("type '{name}' is already registered with guid '{existing}'")]
    GuidConflict { name: String, existing: String },

    #[error("invalid type definition: {reason}")]
    InvalidTypeDef { reason: String },

    #[error("builder for '{name}' produced a mapping for '{built}'")]
    MappingMismatch { name: String, built: String },

    #[error("type '{name}' is not supported: {reason}")]
    NotSupported { name: String, reason: String },

    #[error("mapping '{mapping}' targets unknown catalog type '{external_type}'")]
    UnknownExternalType {
        mapping: String,
        external_type: String,
    },

    #[error("mapping '{mapping}' reads field '{field}' missing from catalog type '{external_type}'")]
    UnknownField {
        mapping: String,
        external_type: String,
        field: String,
    },
}

///
/// TypeLookup
///
/// Registry state of a generic type: implemented, known but unimplemented,
/// or never offered.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeLookup<'a> {
    Implemented(&'a TypeDef),
    Unimplemented(&'a TypeDef),
    Unknown,
}

///
/// MappingRegistry
///
/// Built once for one catalog release, then read-only. Indexes entity
/// mappings by generic type, catalog type and prefix; relationship and
/// classification mappings by generic name.
///

#[derive(Debug)]
pub struct MappingRegistry {
    schema: SchemaCatalog,
    table: Vec<MappingEntry>,
    enum_table: Vec<EnumMapping>,

    implemented: BTreeMap<String, TypeDef>,
    unimplemented: BTreeMap<String, TypeDef>,
    names_by_guid: HashMap<String, String>,

    attribute_types: BTreeMap<String, AttributeTypeDef>,
    attribute_names_by_guid: HashMap<String, String>,

    entities: Vec<EntityMapping>,
    entity_by_generic: HashMap<String, usize>,
    entities_by_external: BTreeMap<String, Vec<usize>>,
    prefixes: HashMap<String, usize>,

    relationships: BTreeMap<String, Vec<RelationshipMapping>>,
    classifications: BTreeMap<String, ClassificationMapping>,
}

impl MappingRegistry {
    /// Registry over the builtin schema table and mapping table.
    #[must_use]
    pub fn new(version: CatalogVersion) -> Self {
        Self::with_table(SchemaCatalog::builtin(version), BUILTIN_MAPPINGS)
    }

    #[must_use]
    pub fn with_table(schema: SchemaCatalog, table: &[MappingEntry]) -> Self {
        Self {
            schema,
            table: table.to_vec(),
            enum_table: BUILTIN_ENUM_MAPPINGS.to_vec(),
            implemented: BTreeMap::new(),
            unimplemented: BTreeMap::new(),
            names_by_guid: HashMap::new(),
            attribute_types: BTreeMap::new(),
            attribute_names_by_guid: HashMap::new(),
            entities: Vec::new(),
            entity_by_generic: HashMap::new(),
            entities_by_external: BTreeMap::new(),
            prefixes: HashMap::new(),
            relationships: BTreeMap::new(),
            classifications: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn version(&self) -> CatalogVersion {
        self.schema.version()
    }

    #[must_use]
    pub const fn schema(&self) -> &SchemaCatalog {
        &self.schema
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a generic type. Types with no implementation in the table
    /// are recorded as unimplemented and reported as `NotSupported`.
    /// Re-registering an implemented type is a no-op.
    pub fn register(&mut self, def: TypeDef) -> Result<(), RegistryError> {
        if def.name.is_empty() || def.guid.is_empty() {
            return Err(RegistryError::InvalidTypeDef {
                reason: "type definitions need a name and a guid".to_string(),
            });
        }

        if let Some(existing) = self.implemented.get(&def.name) {
            if existing.guid == def.guid {
                return Ok(());
            }
            return Err(RegistryError::GuidConflict {
                name: def.name,
                existing: existing.guid.clone(),
            });
        }

        let entry = self
            .table
            .iter()
            .find(|e| e.name == def.name && e.category == def.category)
            .copied();
        let built = entry.and_then(|e| (e.build)(self.version()));

        let Some(built) = built else {
            let reason = if entry.is_some() {
                format!("no implementation for catalog release {}", self.version())
            } else {
                format!("no {} mapping implementation", def.category)
            };
            log::debug!(target: "metabridge::registry", "recording {} as unimplemented: {reason}", def.name);

            let name = def.name.clone();
            self.record(def, false);

            return Err(RegistryError::NotSupported { name, reason });
        };

        let installed = match built {
            MappingDef::Entity(mapping) => self.install_entity(&def.name, mapping),
            MappingDef::Relationship(mappings) => self.install_relationships(&def.name, mappings),
            MappingDef::Classification(mapping) => self.install_classification(&def.name, mapping),
        };
        if let Err(e) = installed {
            log::warn!(target: "metabridge::registry", "recording {} as unimplemented: {e}", def.name);
            self.record(def, false);

            return Err(e);
        }

        log::debug!(target: "metabridge::registry", "registered {} ({})", def.name, def.category);
        self.record(def, true);

        Ok(())
    }

    fn record(&mut self, def: TypeDef, implemented: bool) {
        self.names_by_guid.insert(def.guid.clone(), def.name.clone());
        if implemented {
            self.unimplemented.remove(&def.name);
            self.implemented.insert(def.name.clone(), def);
        } else {
            self.unimplemented.insert(def.name.clone(), def);
        }
    }

    /// Register an attribute type. Primitive and collection types are kept
    /// as given; an enum needs a mapping whose symbolic names it declares.
    pub fn register_attribute(&mut self, def: AttributeTypeDef) -> Result<(), RegistryError> {
        if def.name.is_empty() || def.guid.is_empty() {
            return Err(RegistryError::InvalidTypeDef {
                reason: "attribute type definitions need a name and a guid".to_string(),
            });
        }

        if let Some(existing) = self.attribute_types.get(&def.name) {
            if existing.guid == def.guid {
                return Ok(());
            }
            return Err(RegistryError::GuidConflict {
                name: def.name,
                existing: existing.guid.clone(),
            });
        }

        if def.category == AttributeTypeDefCategory::Enum {
            let not_supported = |reason: String| RegistryError::NotSupported {
                name: def.name.clone(),
                reason,
            };
            let mapping = self
                .enum_table
                .iter()
                .find(|m| m.name == def.name)
                .ok_or_else(|| not_supported("no enum mapping implementation".to_string()))?;

            let missing = mapping.missing_from(&def);
            if !missing.is_empty() {
                return Err(not_supported(format!(
                    "catalog values with no element: {}",
                    missing.join(", ")
                )));
            }
        }

        log::debug!(
            target: "metabridge::registry",
            "registered attribute type {} ({})",
            def.name,
            def.category
        );
        self.attribute_names_by_guid
            .insert(def.guid.clone(), def.name.clone());
        self.attribute_types.insert(def.name.clone(), def);

        Ok(())
    }

    fn install_entity(&mut self, name: &str, mapping: EntityMapping) -> Result<(), RegistryError> {
        check_built_name(name, &mapping.generic_type)?;
        let fields: Vec<&str> = mapping
            .properties
            .iter()
            .flat_map(|p| match &p.source {
                PropertySource::Field(f) => vec![f.as_str()],
                PropertySource::Derived(d) => d.fields().to_vec(),
            })
            .collect();
        self.check_fields(name, &mapping.external_type, fields)?;

        let siblings = self
            .entities_by_external
            .get(&mapping.external_type)
            .map(Vec::as_slice)
            .unwrap_or_default();

        match &mapping.prefix {
            Some(prefix) => {
                if let Some(existing) = self.prefixes.get(prefix) {
                    return Err(RegistryError::DuplicatePrefix {
                        prefix: prefix.clone(),
                        existing: self.entities[*existing].generic_type.clone(),
                    });
                }
            }
            None => {
                if let Some(existing) = siblings.iter().find(|i| self.entities[**i].is_default()) {
                    return Err(RegistryError::DuplicateDefault {
                        external_type: mapping.external_type.clone(),
                        existing: self.entities[*existing].generic_type.clone(),
                    });
                }
            }
        }

        let index = self.entities.len();
        if let Some(prefix) = &mapping.prefix {
            self.prefixes.insert(prefix.clone(), index);
        }
        self.entity_by_generic
            .insert(mapping.generic_type.clone(), index);
        self.entities_by_external
            .entry(mapping.external_type.clone())
            .or_default()
            .push(index);
        self.entities.push(mapping);

        Ok(())
    }

    fn install_relationships(
        &mut self,
        name: &str,
        mappings: Vec<RelationshipMapping>,
    ) -> Result<(), RegistryError> {
        for mapping in &mappings {
            check_built_name(name, &mapping.generic_type)?;
            for (external_type, fields) in mapping.fields_by_type() {
                self.check_fields(name, external_type, fields)?;
            }
        }

        self.relationships
            .entry(name.to_string())
            .or_default()
            .extend(mappings);

        Ok(())
    }

    fn install_classification(
        &mut self,
        name: &str,
        mapping: ClassificationMapping,
    ) -> Result<(), RegistryError> {
        check_built_name(name, &mapping.generic_type)?;
        let fields = mapping.fields();
        for external_type in &mapping.applies_to {
            self.check_fields(name, external_type, fields.iter().map(String::as_str))?;
        }

        self.classifications.insert(name.to_string(), mapping);

        Ok(())
    }

    fn check_fields<'f>(
        &self,
        mapping: &str,
        external_type: &str,
        fields: impl IntoIterator<Item = &'f str>,
    ) -> Result<(), RegistryError> {
        if self.schema.get(external_type).is_none() {
            return Err(RegistryError::UnknownExternalType {
                mapping: mapping.to_string(),
                external_type: external_type.to_string(),
            });
        }

        for field in fields {
            if !self.schema.has_field(external_type, field) {
                return Err(RegistryError::UnknownField {
                    mapping: mapping.to_string(),
                    external_type: external_type.to_string(),
                    field: field.to_string(),
                });
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Type definitions
    // ------------------------------------------------------------------

    #[must_use]
    pub fn lookup_name(&self, name: &str) -> TypeLookup<'_> {
        if let Some(def) = self.implemented.get(name) {
            TypeLookup::Implemented(def)
        } else if let Some(def) = self.unimplemented.get(name) {
            TypeLookup::Unimplemented(def)
        } else {
            TypeLookup::Unknown
        }
    }

    #[must_use]
    pub fn lookup_guid(&self, guid: &str) -> TypeLookup<'_> {
        self.names_by_guid
            .get(guid)
            .map_or(TypeLookup::Unknown, |name| self.lookup_name(name))
    }

    #[must_use]
    pub fn attribute_type_def(&self, name: &str) -> Option<&AttributeTypeDef> {
        self.attribute_types.get(name)
    }

    #[must_use]
    pub fn attribute_type_def_by_guid(&self, guid: &str) -> Option<&AttributeTypeDef> {
        self.attribute_names_by_guid
            .get(guid)
            .and_then(|name| self.attribute_types.get(name))
    }

    /// Registered attribute types, ordered by name.
    pub fn attribute_type_defs(&self) -> impl Iterator<Item = &AttributeTypeDef> {
        self.attribute_types.values()
    }

    /// Implemented type definitions, ordered by name.
    pub fn type_defs(&self) -> impl Iterator<Item = &TypeDef> {
        self.implemented.values()
    }

    #[must_use]
    pub fn type_guid(&self, name: &str) -> String {
        match self.lookup_name(name) {
            TypeLookup::Implemented(def) | TypeLookup::Unimplemented(def) => def.guid.clone(),
            TypeLookup::Unknown => String::new(),
        }
    }

    fn any_def(&self, name: &str) -> Option<&TypeDef> {
        self.implemented
            .get(name)
            .or_else(|| self.unimplemented.get(name))
    }

    /// True when `name` is `ancestor` or inherits from it.
    #[must_use]
    pub fn is_type_of(&self, name: &str, ancestor: &str) -> bool {
        let mut current = Some(name);
        for _ in 0..MAX_TYPE_DEPTH {
            match current {
                Some(n) if n == ancestor => return true,
                Some(n) => current = self.any_def(n).and_then(|d| d.super_type.as_deref()),
                None => return false,
            }
        }

        false
    }

    /// All properties a type declares or inherits.
    #[must_use]
    pub fn all_properties(&self, def: &TypeDef) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut current = Some(def);
        for _ in 0..MAX_TYPE_DEPTH {
            let Some(d) = current else { break };
            for p in &d.properties {
                if !out.contains(p) {
                    out.push(p.clone());
                }
            }
            current = d.super_type.as_deref().and_then(|s| self.any_def(s));
        }

        out
    }

    /// Generic properties the installed mapping(s) for a type can produce.
    #[must_use]
    pub fn mapped_properties(&self, def: &TypeDef) -> Vec<String> {
        let names: Vec<&str> = match def.category {
            TypeDefCategory::Entity => self
                .entity_mapping(&def.name)
                .map(|m| m.mapped_properties().collect())
                .unwrap_or_default(),
            TypeDefCategory::Relationship => self
                .relationship_mappings(&def.name)
                .iter()
                .flat_map(RelationshipMapping::mapped_properties)
                .collect(),
            TypeDefCategory::Classification => self
                .classifications
                .get(&def.name)
                .map(|m| m.mapped_properties().collect())
                .unwrap_or_default(),
        };

        names.into_iter().map(ToString::to_string).collect()
    }

    // ------------------------------------------------------------------
    // Entity mappings
    // ------------------------------------------------------------------

    pub fn entity_mappings(&self) -> impl Iterator<Item = &EntityMapping> {
        self.entities.iter()
    }

    #[must_use]
    pub fn entity_mapping(&self, generic_type: &str) -> Option<&EntityMapping> {
        self.entity_by_generic
            .get(generic_type)
            .map(|i| &self.entities[*i])
    }

    /// Mapping for a generic type guid.
    #[must_use]
    pub fn resolve_by_generic_id(&self, type_guid: &str) -> Option<&EntityMapping> {
        self.names_by_guid
            .get(type_guid)
            .and_then(|name| self.entity_mapping(name))
    }

    /// Every mapping backed by the catalog type, default first.
    #[must_use]
    pub fn mappings_for_external_type(&self, external_type: &str) -> Vec<&EntityMapping> {
        let mut out: Vec<&EntityMapping> = self
            .entities_by_external
            .get(external_type)
            .into_iter()
            .flatten()
            .map(|i| &self.entities[*i])
            .collect();
        out.sort_by_key(|m| !m.is_default());

        out
    }

    /// The mapping for a catalog type and prefix, falling back to the type's
    /// default mapping when no mapping owns the prefix.
    #[must_use]
    pub fn resolve_by_external_type(
        &self,
        external_type: &str,
        prefix: Option<&str>,
    ) -> Option<&EntityMapping> {
        let candidates = self.mappings_for_external_type(external_type);

        prefix
            .and_then(|p| candidates.iter().find(|m| m.prefix.as_deref() == Some(p)))
            .or_else(|| candidates.iter().find(|m| m.is_default()))
            .copied()
    }

    /// The mapping owning a generic guid, given the catalog type of the
    /// object the guid decodes to.
    #[must_use]
    pub fn resolve_guid(&self, guid: &str, external_type: &str) -> Option<&EntityMapping> {
        self.resolve_by_external_type(external_type, id::decode_prefix(guid))
    }

    /// Mappings a search over `type_filter` must cover: every mapping whose
    /// generic type is the filter or a subtype of it. Without a filter,
    /// every mapping except the excluded generic types.
    #[must_use]
    pub fn mappings_for_search(
        &self,
        type_filter: Option<&str>,
        excludes: &[String],
    ) -> Vec<&EntityMapping> {
        self.entities
            .iter()
            .filter(|m| match type_filter {
                Some(filter) => self.is_type_of(&m.generic_type, filter),
                None => !excludes.contains(&m.generic_type),
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Relationship and classification mappings
    // ------------------------------------------------------------------

    #[must_use]
    pub fn relationship_mappings(&self, name: &str) -> &[RelationshipMapping] {
        self.relationships.get(name).map_or(&[][..], Vec::as_slice)
    }

    /// The mapping of `name` joining the two typed ends.
    #[must_use]
    pub fn relationship_mapping(
        &self,
        name: &str,
        one: (&str, Option<&str>),
        two: (&str, Option<&str>),
    ) -> Option<&RelationshipMapping> {
        self.relationship_mappings(name)
            .iter()
            .find(|m| m.joins(one, two))
    }

    /// Installed relationship mappings an entity of this mapping takes part
    /// in, with the end it plays.
    #[must_use]
    pub fn relationships_for(&self, mapping: &EntityMapping) -> Vec<(&RelationshipMapping, End)> {
        mapping
            .relationships
            .iter()
            .flat_map(|name| self.relationship_mappings(name))
            .flat_map(|rel| {
                rel.ends_for(&mapping.external_type, mapping.prefix.as_deref())
                    .into_iter()
                    .map(move |end| (rel, end))
            })
            .collect()
    }

    /// The object-level mapping of `name` whose relationship objects have
    /// this catalog type.
    #[must_use]
    pub fn relationship_object_mapping(
        &self,
        name: &str,
        external_type: &str,
    ) -> Option<&RelationshipMapping> {
        self.relationship_mappings(name)
            .iter()
            .find(|m| m.is_held_by(external_type))
    }

    #[must_use]
    pub fn classification_mapping(&self, name: &str) -> Option<&ClassificationMapping> {
        self.classifications.get(name)
    }

    /// Installed classifications an entity of this mapping can carry.
    #[must_use]
    pub fn classifications_for(&self, mapping: &EntityMapping) -> Vec<&ClassificationMapping> {
        mapping
            .classifications
            .iter()
            .filter_map(|name| self.classifications.get(name))
            .filter(|c| c.applies_to_type(&mapping.external_type))
            .collect()
    }
}

fn check_built_name(name: &str, built: &str) -> Result<(), RegistryError> {
    if name == built {
        Ok(())
    } else {
        Err(RegistryError::MappingMismatch {
            name: name.to_string(),
            built: built.to_string(),
        })
    }
}
