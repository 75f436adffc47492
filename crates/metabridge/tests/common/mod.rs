#![allow(dead_code)]

use metabridge::{
    ConnectorConfig, MetadataCollection,
    core::{
        catalog::{CatalogObject, CatalogVersion, FieldValue, MemoryCatalog, ObjectRef, SchemaCatalog},
        mapping::{EntityMapping, MappingDef, MappingEntry, MappingRegistry},
        types::{TypeDef, TypeDefCategory},
    },
};

pub const CREATED_MS: i64 = 1_600_000_000_000;
pub const MODIFIED_MS: i64 = 1_700_000_000_000;

pub type Collection = MetadataCollection<MemoryCatalog>;

pub fn config(version: CatalogVersion) -> ConnectorConfig {
    ConnectorConfig {
        catalog_version: version,
        ..ConnectorConfig::default()
    }
}

/// Builtin types over the 11.7.0.2 catalog.
pub fn builtin(objects: impl IntoIterator<Item = CatalogObject>) -> Collection {
    builtin_on(CatalogVersion::V11702, objects)
}

pub fn builtin_on(
    version: CatalogVersion,
    objects: impl IntoIterator<Item = CatalogObject>,
) -> Collection {
    MetadataCollection::with_builtin_types(MemoryCatalog::with_objects(objects), config(version))
}

pub fn type_guid(collection: &Collection, name: &str) -> String {
    collection
        .get_type_def_by_name(name)
        .expect("fixture type should be implemented")
        .guid
}

//
// Catalog objects
//

fn audited(object: CatalogObject) -> CatalogObject {
    object
        .with("created_by", FieldValue::text("etl"))
        .with("created_on", FieldValue::Date(CREATED_MS))
        .with("modified_by", FieldValue::text("steward"))
        .with("modified_on", FieldValue::Date(MODIFIED_MS))
}

pub fn data_file(id: &str, name: &str) -> CatalogObject {
    audited(
        CatalogObject::new(id, "data_file")
            .with("name", FieldValue::text(name))
            .with("path", FieldValue::text(format!("/landing/{name}"))),
    )
}

pub fn table(id: &str, name: &str, columns: &[&str]) -> CatalogObject {
    let refs = columns
        .iter()
        .map(|c| ObjectRef::new(*c, "database_column"))
        .collect();

    audited(
        CatalogObject::new(id, "database_table")
            .with("name", FieldValue::text(name))
            .with("database_columns", FieldValue::References(refs)),
    )
}

pub fn column(id: &str, name: &str, table: &str) -> CatalogObject {
    audited(
        CatalogObject::new(id, "database_column")
            .with("name", FieldValue::text(name))
            .with("data_type", FieldValue::text("VARCHAR"))
            .with("position", FieldValue::Int(1))
            .with(
                "database_table_or_view",
                FieldValue::Reference(ObjectRef::new(table, "database_table")),
            ),
    )
}

pub fn term(id: &str, name: &str) -> CatalogObject {
    audited(CatalogObject::new(id, "term").with("name", FieldValue::text(name)))
}

pub fn assigned(object: CatalogObject, terms: &[&str]) -> CatalogObject {
    let refs = terms.iter().map(|t| ObjectRef::new(*t, "term")).collect();

    object.with("assigned_to_terms", FieldValue::References(refs))
}

pub fn data_class(id: &str, name: &str) -> CatalogObject {
    audited(
        CatalogObject::new(id, "data_class")
            .with("name", FieldValue::text(name))
            .with("class_code", FieldValue::text(name.to_uppercase())),
    )
}

/// A data class detected on a column, with the detection linked from both.
pub fn detection(
    id: &str,
    column: CatalogObject,
    class: CatalogObject,
    confidence: i64,
) -> [CatalogObject; 3] {
    let held = audited(
        CatalogObject::new(id, "classification")
            .with("classifies_asset", FieldValue::Reference(column.to_ref()))
            .with("data_class", FieldValue::Reference(class.to_ref()))
            .with("confidence", FieldValue::Int(confidence)),
    );
    let link = |object: CatalogObject, field: &str| {
        let mut refs = object.references(field).to_vec();
        refs.push(ObjectRef::new(id, "classification"));
        object.with(field, FieldValue::References(refs))
    };

    [
        link(column, "detected_classifications"),
        link(class, "classifications_selected"),
        held,
    ]
}

//
// Custom registry: Asset and its synthesized AssetType, both over data_file
//

pub const ASSET_GUID: &str = "asset-0001";
pub const ASSET_TYPE_GUID: &str = "asset-type-0001";

static ASSET_TABLE: &[MappingEntry] = &[
    MappingEntry::entity("Asset", asset),
    MappingEntry::entity("AssetType", asset_type),
];

fn asset(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = EntityMapping::new("Asset", "data_file")
        .with_field("name", "name")
        .with_field("description", "short_description");

    Some(MappingDef::Entity(mapping))
}

fn asset_type(_: CatalogVersion) -> Option<MappingDef> {
    let mapping = EntityMapping::new("AssetType", "data_file")
        .with_prefix("AT")
        .with_field("name", "name");

    Some(MappingDef::Entity(mapping))
}

pub fn assets(objects: impl IntoIterator<Item = CatalogObject>) -> Collection {
    let version = CatalogVersion::default();
    let registry = MappingRegistry::with_table(SchemaCatalog::builtin(version), ASSET_TABLE);
    let mut collection =
        MetadataCollection::with_registry(MemoryCatalog::with_objects(objects), config(version), registry);

    collection
        .add_type_def(
            TypeDef::new(ASSET_GUID, "Asset", TypeDefCategory::Entity)
                .with_properties(&["name", "description"]),
        )
        .expect("Asset should register");
    collection
        .add_type_def(
            TypeDef::new(ASSET_TYPE_GUID, "AssetType", TypeDefCategory::Entity)
                .with_properties(&["name"]),
        )
        .expect("AssetType should register");

    collection
}
