use super::*;
use crate::{
    catalog::{CatalogObject, FieldValue, MemoryCatalog, ObjectRef, ResultPage, SearchQuery},
    id::RelationshipId,
    mapping::{End, PropertyHolder},
    test_support::{ScriptedCatalog, page_of, registry},
    types::PropertyValue,
};
use time::macros::datetime;

const CREATED_MS: i64 = 1_600_000_000_000;
const MODIFIED_MS: i64 = 1_700_000_000_000;

fn data_file() -> CatalogObject {
    CatalogObject::new("f1", "data_file")
        .with("name", FieldValue::text("orders.csv"))
        .with("short_description", FieldValue::text("daily orders"))
        .with("path", FieldValue::text("/data/orders.csv"))
        .with("created_by", FieldValue::text("alice"))
        .with("created_on", FieldValue::Date(CREATED_MS))
        .with("modified_by", FieldValue::text("bob"))
        .with("modified_on", FieldValue::Date(MODIFIED_MS))
}

fn column() -> CatalogObject {
    CatalogObject::new("c1", "database_column")
        .with("name", FieldValue::text("order_id"))
        .with("data_type", FieldValue::text("BIGINT"))
        .with("position", FieldValue::Int(1))
        .with(
            "database_table_or_view",
            FieldValue::Reference(ObjectRef::new("t1", "database_table").named("orders")),
        )
}

fn table() -> CatalogObject {
    CatalogObject::new("t1", "database_table")
        .with("name", FieldValue::text("orders"))
        .with(
            "database_columns",
            FieldValue::References(vec![
                ObjectRef::new("c1", "database_column"),
                ObjectRef::new("x9", "data_file"),
            ]),
        )
}

// ---------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------

#[test]
fn detail_maps_fields_and_audit_header() {
    let registry = registry();
    let materializer = Materializer::new(&registry);
    let object = data_file();

    let detail = materializer
        .resolve_detail(Some(&object), "f1")
        .expect("data file should materialize");

    assert_eq!(detail.guid(), "f1");
    assert_eq!(detail.type_name(), "DataFile");
    assert_eq!(detail.header.type_guid, registry.type_guid("DataFile"));
    assert_eq!(detail.header.created_by.as_deref(), Some("alice"));
    assert_eq!(detail.header.updated_by.as_deref(), Some("bob"));
    assert_eq!(detail.header.create_time, Some(datetime!(2020-09-13 12:26:40 UTC)));
    assert_eq!(detail.header.version, MODIFIED_MS);

    let props = &detail.properties;
    assert_eq!(props.get("name"), Some(&PropertyValue::string("orders.csv")));
    assert_eq!(props.get("description"), Some(&PropertyValue::string("daily orders")));
    assert_eq!(props.get("pathName"), Some(&PropertyValue::string("/data/orders.csv")));
    assert_eq!(
        props.get("qualifiedName"),
        Some(&PropertyValue::string("(data_file)=f1"))
    );
}

#[test]
fn version_falls_back_to_creation_time() {
    let registry = registry();
    let object = CatalogObject::new("f2", "data_file").with("created_on", FieldValue::Date(CREATED_MS));

    let summary = Materializer::new(&registry)
        .entity_summary(
            registry.entity_mapping("DataFile").expect("DataFile mapping"),
            Some(&object),
            "f2",
        )
        .expect("summary should build");

    assert_eq!(summary.header.version, CREATED_MS);
    assert!(summary.header.update_time.is_none());
}

#[test]
fn prefixed_guid_selects_the_prefixed_mapping() {
    let registry = registry();
    let object = column();

    let detail = Materializer::new(&registry)
        .resolve_detail(Some(&object), "__|RCT|__c1")
        .expect("column type should materialize");

    assert_eq!(detail.type_name(), "RelationalColumnType");
    assert_eq!(detail.guid(), "__|RCT|__c1");
    assert_eq!(detail.properties.get("dataType"), Some(&PropertyValue::string("BIGINT")));
    assert_eq!(
        detail.properties.get("qualifiedName"),
        Some(&PropertyValue::string("__|RCT|__(database_column)=c1"))
    );
    assert!(detail.properties.get("position").is_none());
}

#[test]
fn missing_and_placeholder_objects_are_rejected() {
    let registry = registry();
    let materializer = Materializer::new(&registry);

    let err = materializer
        .resolve_detail(None, "gone")
        .expect_err("absent object should fail");
    assert!(matches!(err, MaterializeError::EntityNotKnown { ref guid } if guid == "gone"));

    let placeholder = CatalogObject::new("p1", "main_object");
    let err = materializer
        .resolve_detail(Some(&placeholder), "p1")
        .expect_err("placeholder should fail");
    assert!(matches!(err, MaterializeError::InvalidEntityFromStore { .. }));
}

#[test]
fn unmapped_catalog_types_have_no_mapping() {
    let registry = registry();
    let object = CatalogObject::new("z1", "data_rule");

    let err = Materializer::new(&registry)
        .resolve_detail(Some(&object), "z1")
        .expect_err("data_rule is not mapped");

    assert!(matches!(err, MaterializeError::NoMapping { ref external_type, .. } if external_type == "data_rule"));
}

#[test]
fn classifications_follow_object_fields() {
    let registry = registry();
    let object = column()
        .with("confidentiality_level", FieldValue::Int(4))
        .with(
            "defined_primary_key",
            FieldValue::References(vec![ObjectRef::new("k1", "key")]),
        );

    let summary = Materializer::new(&registry)
        .resolve_detail(Some(&object), "c1")
        .expect("column should materialize")
        .into_summary();

    let level = summary
        .classification("Confidentiality")
        .expect("confidentiality should be present");
    assert_eq!(level.properties.get("level"), Some(&PropertyValue::int(4)));
    assert!(summary.classification("PrimaryKey").is_some());

    let bare = Materializer::new(&registry)
        .resolve_detail(Some(&column()), "c1")
        .expect("bare column should materialize");
    assert!(bare.classifications.is_empty());
}

#[test]
fn proxies_carry_only_the_qualified_name() {
    let registry = registry();
    let mapping = registry.entity_mapping("DataFile").expect("DataFile mapping");

    let proxy = Materializer::new(&registry).entity_proxy(mapping, &data_file());

    assert_eq!(proxy.guid(), "f1");
    assert_eq!(proxy.unique_properties.len(), 1);
    assert!(proxy.unique_properties.contains("qualifiedName"));
}

// ---------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------

#[test]
fn entity_level_relationships_fetch_the_property_end() {
    let registry = registry();
    let catalog = MemoryCatalog::with_objects([table(), column()]);
    let mapping = registry.entity_mapping("RelationalTable").expect("table mapping");

    let relationships = Materializer::new(&registry)
        .relationships_for_entity(&catalog, mapping, &table(), None)
        .expect("relationships should build");

    assert_eq!(relationships.len(), 1, "data_file refs are not columns");
    let rel = &relationships[0];
    assert_eq!(rel.type_name(), "AttributeForSchema");
    assert_eq!(rel.guid(), "t1((AttributeForSchema))c1");
    assert_eq!(rel.entity_one.header.type_name, "RelationalTable");
    assert_eq!(rel.entity_two.header.type_name, "RelationalColumn");
    assert_eq!(rel.properties.get("position"), Some(&PropertyValue::int(1)));
    assert_eq!(catalog.lookups(), vec!["c1".to_string()]);
}

#[test]
fn properties_on_the_near_end_need_no_lookup() {
    let registry = registry();
    let catalog = MemoryCatalog::new();
    let mapping = registry.entity_mapping("RelationalColumn").expect("column mapping");

    let relationships = Materializer::new(&registry)
        .relationships_for_entity(&catalog, mapping, &column(), Some("AttributeForSchema"))
        .expect("relationships should build");

    assert_eq!(relationships.len(), 1);
    assert_eq!(relationships[0].entity_one.guid(), "t1");
    assert_eq!(relationships[0].properties.get("position"), Some(&PropertyValue::int(1)));
    assert!(catalog.lookups().is_empty());
}

#[test]
fn vanished_far_ends_are_skipped() {
    let registry = registry();
    let catalog = MemoryCatalog::new();
    let mapping = registry.entity_mapping("RelationalTable").expect("table mapping");

    let relationships = Materializer::new(&registry)
        .relationships_for_entity(&catalog, mapping, &table(), None)
        .expect("missing column should not fail");

    assert!(relationships.is_empty());
}

#[test]
fn self_contained_relationships_join_prefixed_views() {
    let registry = registry();
    let catalog = MemoryCatalog::new();
    let mapping = registry.entity_mapping("RelationalColumn").expect("column mapping");

    let relationships = Materializer::new(&registry)
        .relationships_for_entity(&catalog, mapping, &column(), Some("SchemaAttributeType"))
        .expect("relationships should build");

    assert_eq!(relationships.len(), 1);
    let rel = &relationships[0];
    assert_eq!(rel.guid(), "c1((SchemaAttributeType))__|RCT|__c1");
    assert_eq!(rel.entity_two.header.type_name, "RelationalColumnType");
}

#[test]
fn categories_appear_at_both_hierarchy_ends() {
    let registry = registry();
    let catalog = MemoryCatalog::new();
    let mapping = registry.entity_mapping("GlossaryCategory").expect("category mapping");
    let middle = CatalogObject::new("cat2", "category")
        .with(
            "parent_category",
            FieldValue::Reference(ObjectRef::new("cat1", "category")),
        )
        .with(
            "subcategories",
            FieldValue::References(vec![ObjectRef::new("cat3", "category")]),
        );

    let relationships = Materializer::new(&registry)
        .relationships_for_entity(&catalog, mapping, &middle, Some("CategoryHierarchyLink"))
        .expect("relationships should build");

    let mut guids: Vec<_> = relationships.iter().map(|r| r.guid().to_string()).collect();
    guids.sort();
    assert_eq!(
        guids,
        vec![
            "cat1((CategoryHierarchyLink))cat2".to_string(),
            "cat2((CategoryHierarchyLink))cat3".to_string(),
        ]
    );
}

#[test]
fn relationship_ids_resolve_only_when_linked() {
    let registry = registry();
    let catalog = MemoryCatalog::with_objects([table(), column()]);
    let materializer = Materializer::new(&registry);

    let rel = materializer
        .relationship_from_id(&catalog, &RelationshipId::new("t1", "c1", "AttributeForSchema"))
        .expect("linked ends should resolve");
    assert_eq!(rel.properties.get("position"), Some(&PropertyValue::int(1)));

    catalog.insert(CatalogObject::new("c2", "database_column"));
    let err = materializer
        .relationship_from_id(&catalog, &RelationshipId::new("t1", "c2", "AttributeForSchema"))
        .expect_err("unlinked ends should not resolve");
    assert!(matches!(err, MaterializeError::RelationshipNotKnown { .. }));

    let err = materializer
        .relationship_from_id(&catalog, &RelationshipId::new("t1", "c1", "TermCategorization"))
        .expect_err("wrong relationship type should not resolve");
    assert!(matches!(err, MaterializeError::RelationshipNotKnown { .. }));
}

#[test]
fn self_contained_ids_resolve_from_one_object() {
    let registry = registry();
    let catalog = MemoryCatalog::with_objects([column()]);

    let rel = Materializer::new(&registry)
        .relationship_from_id(
            &catalog,
            &RelationshipId::new("c1", "__|RCT|__c1", "SchemaAttributeType"),
        )
        .expect("self-contained id should resolve");

    assert_eq!(rel.entity_one.guid(), "c1");
    assert_eq!(rel.entity_two.guid(), "__|RCT|__c1");
    assert_eq!(catalog.lookups(), vec!["c1".to_string()]);
}

fn detected(id: &str, column: &str, confidence: i64) -> CatalogObject {
    CatalogObject::new(id, "classification")
        .with(
            "classifies_asset",
            FieldValue::Reference(ObjectRef::new(column, "database_column").named("order_id")),
        )
        .with(
            "data_class",
            FieldValue::Reference(ObjectRef::new("dc1", "data_class").named("Order Number")),
        )
        .with("confidence", FieldValue::Int(confidence))
}

#[test]
fn relationship_objects_lead_to_both_ends() {
    let registry = registry();
    let catalog = MemoryCatalog::with_objects([detected("x1", "c1", 80), detected("x2", "c7", 40)]);
    let mapping = registry.entity_mapping("RelationalColumn").expect("column mapping");
    let column = column().with(
        "detected_classifications",
        FieldValue::References(vec![
            ObjectRef::new("x1", "classification"),
            ObjectRef::new("x2", "classification"),
            ObjectRef::new("x3", "classification"),
        ]),
    );

    let relationships = Materializer::new(&registry)
        .relationships_for_entity(&catalog, mapping, &column, Some("DataClassAssignment"))
        .expect("relationships should build");

    assert_eq!(relationships.len(), 1, "x2 leads elsewhere and x3 is gone");
    let rel = &relationships[0];
    assert_eq!(rel.guid(), "x1((DataClassAssignment))x1");
    assert_eq!(rel.entity_one.guid(), "c1");
    assert_eq!(rel.entity_two.guid(), "dc1");
    assert_eq!(rel.entity_two.header.type_name, "DataClass");
    assert_eq!(rel.properties.get("confidence"), Some(&PropertyValue::int(80)));
    assert_eq!(catalog.lookups(), ["x1", "x2", "x3"]);
}

#[test]
fn relationship_object_ids_resolve_through_the_object() {
    let registry = registry();
    let catalog = MemoryCatalog::with_objects([detected("x1", "c1", 80), column()]);
    let materializer = Materializer::new(&registry);

    let rel = materializer
        .relationship_from_id(&catalog, &RelationshipId::new("x1", "x1", "DataClassAssignment"))
        .expect("relationship object should resolve");
    assert_eq!(rel.entity_one.guid(), "c1");
    assert_eq!(rel.entity_two.guid(), "dc1");
    assert_eq!(catalog.lookups(), ["x1"]);

    for id in [
        RelationshipId::new("c1", "c1", "DataClassAssignment"),
        RelationshipId::new("c1", "dc1", "DataClassAssignment"),
        RelationshipId::new("x1", "x1", "SemanticAssignment"),
    ] {
        let err = materializer
            .relationship_from_id(&catalog, &id)
            .expect_err("only the relationship object names the relationship");
        assert!(matches!(err, MaterializeError::RelationshipNotKnown { .. }), "{}", id.encode());
    }
}

#[test]
fn relationship_ends_are_checked_against_endpoint_prefixes() {
    let registry = registry();
    let mapping = registry
        .relationship_mappings("SchemaAttributeType")
        .first()
        .expect("schema attribute mapping");
    assert_eq!(mapping.properties_from, PropertyHolder::End(End::One));

    let err = Materializer::new(&registry)
        .relationship(mapping, &column(), &table())
        .expect_err("a table cannot be a column type");
    assert!(matches!(err, MaterializeError::NoMapping { ref prefix, .. } if prefix.as_deref() == Some("RCT")));
}

// ---------------------------------------------------------------------
// Page draining
// ---------------------------------------------------------------------

fn ids(client: &ScriptedCatalog, budget: usize) -> Vec<String> {
    drain_pages(client, SearchQuery::new("data_file").with_paging(0, 3), budget, |o| {
        Ok(Some(o.id.clone()))
    })
    .expect("draining should succeed")
}

#[test]
fn draining_stops_at_the_budget() {
    let client = ScriptedCatalog::new([page_of("a", "data_file", 3, true), page_of("b", "data_file", 3, true)]);

    let out = ids(&client, 4);

    assert_eq!(out, vec!["a0", "a1", "a2", "b0"]);
    let queries = client.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].begin_at, 3);
}

#[test]
fn an_empty_page_ends_draining_even_if_more_is_claimed() {
    let client = ScriptedCatalog::new([page_of("a", "data_file", 2, true), ResultPage {
        items: Vec::new(),
        total: 0,
        has_more: true,
    }]);

    let out = ids(&client, 0);

    assert_eq!(out, vec!["a0", "a1"]);
    assert_eq!(client.queries().len(), 2);
}

#[test]
fn placeholders_do_not_consume_the_budget() {
    let mut first = page_of("a", "data_file", 2, true);
    first.items.insert(0, CatalogObject::new("p", "main_object"));
    let client = ScriptedCatalog::new([first, page_of("b", "data_file", 2, false)]);

    let out = ids(&client, 3);

    assert_eq!(out, vec!["a0", "a1", "b0"]);
}

#[test]
fn vanished_entities_are_skipped_and_other_errors_propagate() {
    let client = ScriptedCatalog::new([page_of("a", "data_file", 3, false)]);

    let out = drain_pages(&client, SearchQuery::new("data_file"), 0, |o| {
        if o.id == "a1" {
            Err(MaterializeError::EntityNotKnown { guid: o.id.clone() })
        } else {
            Ok(Some(o.id.clone()))
        }
    })
    .expect("vanished entity should be skipped");
    assert_eq!(out, vec!["a0", "a2"]);

    let client = ScriptedCatalog::new([page_of("a", "data_file", 3, false)]);
    let err = drain_pages(&client, SearchQuery::new("data_file"), 0, |o| {
        Err::<Option<String>, _>(MaterializeError::NoMapping {
            external_type: o.object_type.clone(),
            prefix: None,
        })
    })
    .expect_err("mapping errors should propagate");
    assert!(matches!(err, MaterializeError::NoMapping { .. }));
}
