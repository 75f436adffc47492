//! Builtin registration table: which generic types this engine implements
//! against the catalog, and how.

use crate::{
    IDENTITY_PROPERTY,
    catalog::{CatalogVersion, Condition},
    mapping::{
        ClassificationMapping, End, Endpoint, EntityMapping, FixedEnum, PropertyHolder,
        QualifiedName, RelationshipMapping,
    },
    types::{AttributeTypeDef, AttributeTypeDefCategory, TypeDef, TypeDefCategory},
};
use std::sync::Arc;

///
/// MappingDef
///
/// What a builder produces for one generic type.
///

#[derive(Clone, Debug)]
pub enum MappingDef {
    Classification(ClassificationMapping),
    Entity(EntityMapping),
    Relationship(Vec<RelationshipMapping>),
}

///
/// MappingEntry
///
/// One row of a registration table. A builder returning `None` means the
/// type has no implementation for that catalog release.
///

#[derive(Clone, Copy, Debug)]
pub struct MappingEntry {
    pub name: &'static str,
    pub category: TypeDefCategory,
    pub build: fn(CatalogVersion) -> Option<MappingDef>,
}

impl MappingEntry {
    #[must_use]
    pub const fn entity(name: &'static str, build: fn(CatalogVersion) -> Option<MappingDef>) -> Self {
        Self {
            name,
            category: TypeDefCategory::Entity,
            build,
        }
    }

    #[must_use]
    pub const fn relationship(
        name: &'static str,
        build: fn(CatalogVersion) -> Option<MappingDef>,
    ) -> Self {
        Self {
            name,
            category: TypeDefCategory::Relationship,
            build,
        }
    }

    #[must_use]
    pub const fn classification(
        name: &'static str,
        build: fn(CatalogVersion) -> Option<MappingDef>,
    ) -> Self {
        Self {
            name,
            category: TypeDefCategory::Classification,
            build,
        }
    }
}

pub static BUILTIN_MAPPINGS: &[MappingEntry] = &[
    MappingEntry::entity("DataFile", data_file),
    MappingEntry::entity("RelationalTable", relational_table),
    MappingEntry::entity("RelationalColumn", relational_column),
    MappingEntry::entity("RelationalColumnType", relational_column_type),
    MappingEntry::entity("GlossaryTerm", glossary_term),
    MappingEntry::entity("GlossaryCategory", glossary_category),
    MappingEntry::entity("Team", team),
    MappingEntry::entity("ContactDetails", contact_details),
    MappingEntry::entity("DataClass", data_class),
    MappingEntry::relationship("AttributeForSchema", attribute_for_schema),
    MappingEntry::relationship("SchemaAttributeType", schema_attribute_type),
    MappingEntry::relationship("ContactThrough", contact_through),
    MappingEntry::relationship("SemanticAssignment", semantic_assignment),
    MappingEntry::relationship("TermCategorization", term_categorization),
    MappingEntry::relationship("CategoryHierarchyLink", category_hierarchy_link),
    MappingEntry::relationship("DataClassAssignment", data_class_assignment),
    MappingEntry::classification("Confidentiality", confidentiality),
    MappingEntry::classification("PrimaryKey", primary_key),
];

///
/// EnumMapping
///
/// A generic enum attribute type the catalog produces values of.
/// `symbolic_names` are the elements those values translate to; an offered
/// definition must declare every one of them.
///

#[derive(Clone, Copy, Debug)]
pub struct EnumMapping {
    pub name: &'static str,
    pub symbolic_names: &'static [&'static str],
}

impl EnumMapping {
    /// Symbolic names the offered definition lacks.
    #[must_use]
    pub fn missing_from(&self, def: &AttributeTypeDef) -> Vec<&'static str> {
        self.symbolic_names
            .iter()
            .copied()
            .filter(|name| def.element(name).is_none())
            .collect()
    }
}

pub static BUILTIN_ENUM_MAPPINGS: &[EnumMapping] = &[EnumMapping {
    name: "ContactMethodType",
    symbolic_names: &["Email"],
}];

///
/// ENTITIES
///

fn qualified(generic: &str, external: &str) -> EntityMapping {
    EntityMapping::new(generic, external).with_derived(IDENTITY_PROPERTY, Arc::new(QualifiedName))
}

fn data_file(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = qualified("DataFile", "data_file")
        .with_field("name", "name")
        .with_field("description", "short_description")
        .with_field("pathName", "path")
        .with_relationships(&["SemanticAssignment"])
        .with_classifications(&["Confidentiality"]);

    Some(MappingDef::Entity(mapping))
}

fn relational_table(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = qualified("RelationalTable", "database_table")
        .with_field("displayName", "name")
        .with_field("description", "short_description")
        .with_relationships(&["AttributeForSchema", "SemanticAssignment"])
        .with_classifications(&["Confidentiality"]);

    Some(MappingDef::Entity(mapping))
}

fn relational_column(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = qualified("RelationalColumn", "database_column")
        .with_field("displayName", "name")
        .with_field("description", "short_description")
        .with_field("position", "position")
        .with_field("isNullable", "allows_null_values")
        .with_relationships(&[
            "AttributeForSchema",
            "SchemaAttributeType",
            "SemanticAssignment",
            "DataClassAssignment",
        ])
        .with_classifications(&["Confidentiality", "PrimaryKey"]);

    Some(MappingDef::Entity(mapping))
}

fn relational_column_type(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = qualified("RelationalColumnType", "database_column")
        .with_prefix("RCT")
        .with_field("displayName", "name")
        .with_field("description", "short_description")
        .with_field("dataType", "data_type")
        .with_relationships(&["SchemaAttributeType"]);

    Some(MappingDef::Entity(mapping))
}

fn glossary_term(version: CatalogVersion) -> Option<MappingDef> {
    let mut mapping = qualified("GlossaryTerm", "term")
        .with_field("displayName", "name")
        .with_field("summary", "short_description")
        .with_field("description", "long_description")
        .with_field("examples", "example")
        .with_relationships(&["SemanticAssignment", "TermCategorization"]);

    if version.is_v117_or_later() {
        mapping = mapping.with_field("abbreviation", "abbreviation");
    }

    Some(MappingDef::Entity(mapping))
}

fn glossary_category(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = qualified("GlossaryCategory", "category")
        .with_field("displayName", "name")
        .with_field("description", "short_description")
        .with_relationships(&["TermCategorization", "CategoryHierarchyLink"]);

    Some(MappingDef::Entity(mapping))
}

fn team(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = qualified("Team", "group")
        .with_field("name", "group_name")
        .with_relationships(&["ContactThrough"]);

    Some(MappingDef::Entity(mapping))
}

fn contact_details(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = EntityMapping::new("ContactDetails", "group")
        .with_prefix("CD")
        .with_derived(
            "contactMethodType",
            Arc::new(FixedEnum {
                ordinal: 0,
                symbolic_name: "Email",
            }),
        )
        .with_field("contactMethodValue", "email_address")
        .with_relationships(&["ContactThrough"]);

    Some(MappingDef::Entity(mapping))
}

fn data_class(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = qualified("DataClass", "data_class")
        .with_field("name", "name")
        .with_field("description", "short_description")
        .with_field("dataClassCode", "class_code")
        .with_relationships(&["DataClassAssignment"]);

    Some(MappingDef::Entity(mapping))
}

///
/// RELATIONSHIPS
///

fn attribute_for_schema(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = RelationshipMapping::entity_level(
        "AttributeForSchema",
        Endpoint::new("RelationalTable", &["database_table"]).linked_by("database_columns"),
        Endpoint::new("RelationalColumn", &["database_column"]).linked_by("database_table_or_view"),
    )
    .with_property("position", "position", End::Two);

    Some(MappingDef::Relationship(vec![mapping]))
}

fn schema_attribute_type(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = RelationshipMapping::self_contained(
        "SchemaAttributeType",
        Endpoint::new("RelationalColumn", &["database_column"]),
        Endpoint::new("RelationalColumnType", &["database_column"]).with_prefix("RCT"),
    );

    Some(MappingDef::Relationship(vec![mapping]))
}

fn contact_through(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = RelationshipMapping::self_contained(
        "ContactThrough",
        Endpoint::new("Team", &["group"]),
        Endpoint::new("ContactDetails", &["group"]).with_prefix("CD"),
    );

    Some(MappingDef::Relationship(vec![mapping]))
}

fn semantic_assignment(_: CatalogVersion) -> Option<MappingDef> {
    let term = || Endpoint::new("GlossaryTerm", &["term"]).linked_by("assigned_assets");

    Some(MappingDef::Relationship(vec![
        RelationshipMapping::entity_level(
            "SemanticAssignment",
            Endpoint::new("Referenceable", &["database_column", "database_table"])
                .linked_by("assigned_to_terms"),
            term(),
        ),
        RelationshipMapping::entity_level(
            "SemanticAssignment",
            Endpoint::new("Referenceable", &["data_file"]).linked_by("assigned_to_terms"),
            term(),
        ),
    ]))
}

fn term_categorization(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = RelationshipMapping::entity_level(
        "TermCategorization",
        Endpoint::new("GlossaryCategory", &["category"]).linked_by("terms"),
        Endpoint::new("GlossaryTerm", &["term"]).linked_by("parent_category"),
    );

    Some(MappingDef::Relationship(vec![mapping]))
}

fn category_hierarchy_link(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = RelationshipMapping::entity_level(
        "CategoryHierarchyLink",
        Endpoint::new("GlossaryCategory", &["category"]).linked_by("subcategories"),
        Endpoint::new("GlossaryCategory", &["category"]).linked_by("parent_category"),
    );

    Some(MappingDef::Relationship(vec![mapping]))
}

fn data_class_assignment(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = RelationshipMapping::object_level(
        "DataClassAssignment",
        "classification",
        Endpoint::new("Referenceable", &["database_column"])
            .linked_by("detected_classifications")
            .reached_by("classifies_asset"),
        Endpoint::new("DataClass", &["data_class"])
            .linked_by("classifications_selected")
            .reached_by("data_class"),
    )
    .with_property("confidence", "confidence", PropertyHolder::RelationshipObject)
    .with_property("valueFrequency", "value_frequency", PropertyHolder::RelationshipObject);

    Some(MappingDef::Relationship(vec![mapping]))
}

///
/// CLASSIFICATIONS
///

fn confidentiality(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = ClassificationMapping::new(
        "Confidentiality",
        &["data_file", "database_table", "database_column"],
        Condition::is_not_null("confidentiality_level"),
    )
    .with_field("level", "confidentiality_level")
    .writable();

    Some(MappingDef::Classification(mapping))
}

fn primary_key(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = ClassificationMapping::new(
        "PrimaryKey",
        &["database_column"],
        Condition::is_not_null("defined_primary_key"),
    );

    Some(MappingDef::Classification(mapping))
}

///
/// TYPE DEFINITIONS
///

/// Generic type definitions matching the builtin table, including the
/// abstract supertypes it maps through. Hosts that do not receive type
/// definitions from a framework can register these at start-up.
#[must_use]
pub fn type_defs() -> Vec<TypeDef> {
    use TypeDefCategory::{Classification, Entity, Relationship};

    let def = |n: u32, name: &str, category| {
        TypeDef::new(format!("6b0f3c1e-0b5c-4f1d-9a55-{n:012}"), name, category)
    };

    vec![
        def(1, "Referenceable", Entity).with_properties(&[IDENTITY_PROPERTY]),
        def(2, "Asset", Entity)
            .with_super_type("Referenceable")
            .with_properties(&["name", "description"]),
        def(3, "DataFile", Entity)
            .with_super_type("Asset")
            .with_properties(&["pathName"]),
        def(4, "SchemaElement", Entity)
            .with_super_type("Referenceable")
            .with_properties(&["displayName", "description"]),
        def(5, "RelationalTable", Entity)
            .with_super_type("SchemaElement")
            .with_external_standard("SQL", "ISO", "TABLE"),
        def(6, "RelationalColumn", Entity)
            .with_super_type("SchemaElement")
            .with_properties(&["position", "isNullable"])
            .with_external_standard("SQL", "ISO", "COLUMN"),
        def(7, "RelationalColumnType", Entity)
            .with_super_type("SchemaElement")
            .with_properties(&["dataType"]),
        def(8, "GlossaryTerm", Entity)
            .with_super_type("Referenceable")
            .with_properties(&["displayName", "summary", "description", "abbreviation", "examples"])
            .with_external_standard("SKOS", "W3C", "Concept"),
        def(9, "GlossaryCategory", Entity)
            .with_super_type("Referenceable")
            .with_properties(&["displayName", "description"]),
        def(10, "ActorProfile", Entity)
            .with_super_type("Referenceable")
            .with_properties(&["name"]),
        def(11, "Team", Entity).with_super_type("ActorProfile"),
        def(12, "ContactDetails", Entity)
            .with_properties(&["contactMethodType", "contactMethodValue"]),
        def(13, "Glossary", Entity)
            .with_super_type("Referenceable")
            .with_properties(&["displayName"]),
        def(14, "DataClass", Entity)
            .with_super_type("Referenceable")
            .with_properties(&["name", "description", "dataClassCode"]),
        def(20, "AttributeForSchema", Relationship).with_properties(&["position"]),
        def(21, "SchemaAttributeType", Relationship),
        def(22, "ContactThrough", Relationship),
        def(23, "SemanticAssignment", Relationship),
        def(24, "TermCategorization", Relationship),
        def(25, "CategoryHierarchyLink", Relationship),
        def(26, "DataClassAssignment", Relationship).with_properties(&["confidence", "valueFrequency"]),
        def(30, "Confidentiality", Classification).with_properties(&["level"]),
        def(31, "PrimaryKey", Classification),
    ]
}

/// Attribute types the builtin type definitions use.
#[must_use]
pub fn attribute_type_defs() -> Vec<AttributeTypeDef> {
    use AttributeTypeDefCategory::{Collection, Enum, Primitive};

    let def = |n: u32, name: &str, category| {
        AttributeTypeDef::new(format!("3d1a9e70-5c2b-4e8f-b1d4-{n:012}"), name, category)
    };

    vec![
        def(1, "string", Primitive),
        def(2, "int", Primitive),
        def(3, "long", Primitive),
        def(4, "float", Primitive),
        def(5, "boolean", Primitive),
        def(6, "date", Primitive),
        def(10, "array<string>", Collection),
        def(11, "map<string,string>", Collection),
        def(20, "ContactMethodType", Enum)
            .with_elements(&["Email", "Phone", "Chat", "Profile", "Other"]),
        def(21, "KeyPattern", Enum).with_elements(&["LocalKey", "RecycledKey", "NaturalKey"]),
    ]
}
