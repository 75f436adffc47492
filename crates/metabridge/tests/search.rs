mod common;

use common::{
    ASSET_GUID, Collection, assets, builtin, builtin_on, column, data_file, table, term, type_guid,
};
use metabridge::{
    ErrorKind, SearchOptions,
    core::{
        catalog::{CatalogVersion, FieldValue},
        types::{
            EntityDetail, InstanceProperties, InstanceStatus, MatchCriteria, PropertyValue,
            SequencingOrder,
        },
    },
};
use time::macros::datetime;

fn by_name(name: &str) -> InstanceProperties {
    InstanceProperties::new().with("name", PropertyValue::string(name))
}

fn guids(found: &[EntityDetail]) -> Vec<&str> {
    let mut guids: Vec<&str> = found.iter().map(EntityDetail::guid).collect();
    guids.sort_unstable();
    guids
}

fn files() -> Collection {
    builtin([
        data_file("f1", "customers"),
        data_file("f2", "orders"),
        data_file("f3", "customer_archive"),
    ])
}

//
// Request validation
//

#[test]
fn status_limit_without_active_issues_no_query() {
    let collection = files();
    let options = SearchOptions::new().with_statuses(&[InstanceStatus::Deleted]);

    let found = collection
        .find_entities_by_property(None, Some(&by_name("customers")), MatchCriteria::All, &options)
        .expect("status limit should not be an error");

    assert!(found.is_empty());
    assert!(
        collection.client().searches().is_empty(),
        "no catalog query should be issued"
    );
}

#[test]
fn active_status_limit_searches_normally() {
    let collection = files();
    let guid = type_guid(&collection, "DataFile");
    let options = SearchOptions::new().with_statuses(&[InstanceStatus::Active]);

    let found = collection
        .find_entities_by_property(Some(&guid), Some(&by_name("orders")), MatchCriteria::All, &options)
        .expect("search should succeed");

    assert_eq!(guids(&found), ["f2"]);
}

#[test]
fn historical_and_property_sequenced_requests_are_not_supported() {
    let collection = files();

    let mut as_of = SearchOptions::new().as_of(datetime!(2024-01-01 0:00 UTC));
    let err = collection
        .find_entities_by_property(None, None, MatchCriteria::All, &as_of)
        .expect_err("as-of search should fail");
    assert_eq!(err.kind, ErrorKind::FunctionNotSupported);
    assert_eq!(err.operation, "find_entities_by_property");

    as_of.as_of_time = None;
    as_of.sequencing_property = Some("name".to_string());
    let err = collection
        .find_entities_by_property_value(None, ".*x.*", &as_of)
        .expect_err("property sequencing should fail");
    assert_eq!(err.kind, ErrorKind::FunctionNotSupported);

    let by_property = SearchOptions::new().with_order(SequencingOrder::PropertyAscending);
    let err = collection
        .find_entities_by_property(None, None, MatchCriteria::All, &by_property)
        .expect_err("property ordering should fail");
    assert_eq!(err.kind, ErrorKind::FunctionNotSupported);
    assert!(collection.client().searches().is_empty());
}

#[test]
fn unknown_type_filter_is_type_not_known() {
    let collection = files();

    let err = collection
        .find_entities_by_property(Some("no-such-type"), None, MatchCriteria::All, &SearchOptions::new())
        .expect_err("unknown type should fail");

    assert_eq!(err.kind, ErrorKind::TypeNotKnown);
}

#[test]
fn relationship_type_filter_is_invalid_for_entity_search() {
    let collection = files();
    let guid = type_guid(&collection, "SemanticAssignment");

    let err = collection
        .find_entities_by_property(Some(&guid), None, MatchCriteria::All, &SearchOptions::new())
        .expect_err("relationship type should be rejected");

    assert_eq!(err.kind, ErrorKind::InvalidParameter);
}

#[test]
fn unsupported_pattern_is_not_supported() {
    let collection = files();
    let guid = type_guid(&collection, "DataFile");

    let err = collection
        .find_entities_by_property(
            Some(&guid),
            Some(&by_name("cust(omer)?s")),
            MatchCriteria::All,
            &SearchOptions::new(),
        )
        .expect_err("optional groups cannot become a like condition");

    assert_eq!(err.kind, ErrorKind::FunctionNotSupported);
}

//
// Match modes
//

#[test]
fn match_modes_combine_property_conditions() {
    let collection = files();
    let guid = type_guid(&collection, "DataFile");
    let options = SearchOptions::new();
    let properties = InstanceProperties::new()
        .with("name", PropertyValue::string("orders"))
        .with("pathName", PropertyValue::string("/landing/customers"));

    let all = collection
        .find_entities_by_property(Some(&guid), Some(&properties), MatchCriteria::All, &options)
        .expect("ALL search should succeed");
    let any = collection
        .find_entities_by_property(Some(&guid), Some(&properties), MatchCriteria::Any, &options)
        .expect("ANY search should succeed");
    let none = collection
        .find_entities_by_property(Some(&guid), Some(&properties), MatchCriteria::None, &options)
        .expect("NONE search should succeed");

    assert!(all.is_empty(), "no file has both values");
    assert_eq!(guids(&any), ["f1", "f2"]);
    assert_eq!(guids(&none), ["f3"]);
}

#[test]
fn all_mode_skips_mappings_missing_a_property() {
    let collection = files();
    let properties = by_name("customers").with("dataType", PropertyValue::string("VARCHAR"));

    let found = collection
        .find_entities_by_property(None, Some(&properties), MatchCriteria::All, &SearchOptions::new())
        .expect("search should succeed");

    assert!(found.is_empty());
    assert!(
        collection.client().searches().is_empty(),
        "no mapping carries both name and dataType"
    );
}

#[test]
fn supertype_filter_searches_implemented_subtypes() {
    let collection = builtin([
        data_file("f1", "customers"),
        table("t1", "customers", &[]),
    ]);
    let asset = type_guid_any(&collection, "Asset");

    let found = collection
        .find_entities_by_property(
            Some(&asset),
            Some(&by_name("customers")),
            MatchCriteria::All,
            &SearchOptions::new(),
        )
        .expect("Asset is searched through DataFile");

    assert_eq!(guids(&found), ["f1"]);
    assert_eq!(found[0].type_name(), "DataFile");
}

/// Guid of a builtin type whether or not it is implemented.
fn type_guid_any(collection: &Collection, name: &str) -> String {
    collection.registry().type_guid(name)
}

//
// Paging and sequencing
//

#[test]
fn combined_mappings_are_drained_then_sliced() {
    let collection = assets([data_file("1-2-3", "customers"), data_file("4-5-6", "orders")]);
    let options = SearchOptions::new()
        .with_paging(1, 2)
        .with_order(SequencingOrder::Guid);

    let found = collection
        .find_entities_by_property(None, None, MatchCriteria::All, &options)
        .expect("search should succeed");

    let page: Vec<&str> = found.iter().map(EntityDetail::guid).collect();
    assert_eq!(page, ["4-5-6", "__|AT|__1-2-3"]);

    let searches = collection.client().searches();
    assert_eq!(searches.len(), 2, "one query per mapping");
    assert!(
        searches.iter().all(|q| q.begin_at == 0),
        "each mapping is read from its first result"
    );
}

#[test]
fn single_mapping_pages_in_the_catalog() {
    let collection = assets([
        data_file("1-2-3", "customers"),
        data_file("4-5-6", "orders"),
        data_file("7-8-9", "returns"),
    ]);
    let options = SearchOptions::new()
        .with_paging(1, 1)
        .with_order(SequencingOrder::Guid);

    let found = collection
        .find_entities_by_property(Some(ASSET_GUID), None, MatchCriteria::All, &options)
        .expect("search should succeed");

    let page: Vec<&str> = found.iter().map(EntityDetail::guid).collect();
    assert_eq!(page, ["4-5-6"]);

    let searches = collection.client().searches();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].begin_at, 1);
    assert_eq!(searches[0].page_size, 1);
}

#[test]
fn zero_page_size_uses_the_configured_maximum() {
    let collection = files();
    let guid = type_guid(&collection, "DataFile");

    collection
        .find_entities_by_property(Some(&guid), None, MatchCriteria::All, &SearchOptions::new())
        .expect("search should succeed");

    assert_eq!(
        collection.client().searches()[0].page_size,
        collection.config().max_page_size
    );
}

//
// Identity lookups
//

#[test]
fn exact_identity_is_a_direct_lookup() {
    let collection = files();
    let properties =
        InstanceProperties::new().with("qualifiedName", PropertyValue::string(r"\Q(data_file)=f1\E"));

    let found = collection
        .find_entities_by_property(None, Some(&properties), MatchCriteria::All, &SearchOptions::new())
        .expect("identity search should succeed");

    assert_eq!(guids(&found), ["f1"]);
    assert_eq!(found[0].type_name(), "DataFile");
    assert!(collection.client().searches().is_empty(), "no catalog search");
    assert_eq!(collection.client().lookups(), ["f1"]);
}

#[test]
fn prefixed_identity_selects_the_synthesized_mapping() {
    let collection = builtin([table("t1", "accounts", &["c1"]), column("c1", "id", "t1")]);
    let properties = InstanceProperties::new().with(
        "qualifiedName",
        PropertyValue::string(r"\Q__|RCT|__(database_column)=c1\E"),
    );

    let found = collection
        .find_entities_by_property(None, Some(&properties), MatchCriteria::All, &SearchOptions::new())
        .expect("identity search should succeed");

    assert_eq!(guids(&found), ["__|RCT|__c1"]);
    assert_eq!(found[0].type_name(), "RelationalColumnType");
}

#[test]
fn identity_outside_the_type_filter_finds_nothing() {
    let collection = files();
    let guid = type_guid(&collection, "GlossaryTerm");
    let properties =
        InstanceProperties::new().with("qualifiedName", PropertyValue::string(r"\Q(data_file)=f1\E"));

    let found = collection
        .find_entities_by_property(Some(&guid), Some(&properties), MatchCriteria::All, &SearchOptions::new())
        .expect("identity search should succeed");

    assert!(found.is_empty());
    assert!(collection.client().lookups().is_empty());
}

#[test]
fn identity_prefix_searches_the_named_mapping_only() {
    let collection = builtin([
        data_file("1-2-3", "ledger"),
        data_file("1-3-4", "journal"),
        table("1-2-9", "accounts", &[]),
    ]);

    for (pattern, expected) in [
        (r"\Q(data_file)=1-2\E.*", vec!["1-2-3"]),
        (r"\Q(data_file)=\E.*", vec!["1-2-3", "1-3-4"]),
        (r"\Q(data_file)=9\E.*", vec![]),
    ] {
        collection.client().clear_journal();
        let properties =
            InstanceProperties::new().with("qualifiedName", PropertyValue::string(pattern));

        let found = collection
            .find_entities_by_property(None, Some(&properties), MatchCriteria::All, &SearchOptions::new())
            .expect("prefix search should succeed");

        assert_eq!(guids(&found), expected, "{pattern}");
        assert!(collection.client().lookups().is_empty(), "{pattern}: not a direct lookup");
        let searched: Vec<Vec<String>> = collection
            .client()
            .searches()
            .into_iter()
            .map(|q| q.types)
            .collect();
        assert_eq!(searched, [vec!["data_file".to_string()]], "{pattern}");
    }
}

#[test]
fn qualified_name_contains_may_span_type_and_id() {
    let collection = builtin([data_file("1-2-3", "ledger"), table("1-2-9", "accounts", &[])]);

    for (pattern, expected) in [
        (r".*\Qfile)=1-2\E.*", vec!["1-2-3"]),
        (r".*\Q)=1-2\E.*", vec!["1-2-3", "1-2-9"]),
        (r".*\Qtable)=1-2\E.*", vec!["1-2-9"]),
        (r".*\Qfile)=9\E.*", vec![]),
    ] {
        let properties =
            InstanceProperties::new().with("qualifiedName", PropertyValue::string(pattern));

        let found = collection
            .find_entities_by_property(None, Some(&properties), MatchCriteria::All, &SearchOptions::new())
            .expect("contains search should succeed");

        assert_eq!(guids(&found), expected, "{pattern}");
    }
}

#[test]
fn identity_lookup_honours_paging() {
    let collection = files();
    let properties =
        InstanceProperties::new().with("qualifiedName", PropertyValue::string(r"\Q(data_file)=f1\E"));

    let found = collection
        .find_entities_by_property(
            None,
            Some(&properties),
            MatchCriteria::All,
            &SearchOptions::new().with_paging(1, 10),
        )
        .expect("identity search should succeed");

    assert!(found.is_empty(), "the single result precedes from_element");
}

//
// Free text
//

#[test]
fn free_text_skips_excluded_fields() {
    let collection = files();
    let guid = type_guid(&collection, "DataFile");

    let found = collection
        .find_entities_by_property_value(Some(&guid), ".*customer.*", &SearchOptions::new())
        .expect("free-text search should succeed");

    assert_eq!(guids(&found), ["f1", "f3"]);

    let searches = collection.client().searches();
    let fields: Vec<&str> = searches[0]
        .conditions
        .leaves()
        .into_iter()
        .map(|c| c.field.as_str())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"path"));
    assert!(
        !fields.contains(&"long_description"),
        "11.7.0.2 excludes long_description from free text"
    );
}

#[test]
fn free_text_searches_every_string_field_on_older_releases() {
    let collection = builtin_on(CatalogVersion::V11502Sp6, [data_file("f1", "customers")]);
    let guid = type_guid(&collection, "DataFile");

    collection
        .find_entities_by_property_value(Some(&guid), ".*customer.*", &SearchOptions::new())
        .expect("free-text search should succeed");

    let searches = collection.client().searches();
    assert!(
        searches[0]
            .conditions
            .leaves()
            .iter()
            .any(|c| c.field == "long_description")
    );
}

#[test]
fn empty_free_text_is_invalid() {
    let collection = files();

    let err = collection
        .find_entities_by_property_value(None, "", &SearchOptions::new())
        .expect_err("empty criteria should fail");

    assert_eq!(err.kind, ErrorKind::InvalidParameter);
}

//
// Classifications
//

fn classified() -> Collection {
    builtin([
        data_file("f1", "customers").with("confidentiality_level", FieldValue::Int(3)),
        data_file("f2", "orders").with("confidentiality_level", FieldValue::Int(1)),
        data_file("f3", "returns"),
        table("t1", "accounts", &[]).with("confidentiality_level", FieldValue::Int(3)),
        term("g1", "customer"),
    ])
}

#[test]
fn classification_search_matches_its_properties() {
    let collection = classified();
    let level = InstanceProperties::new().with("level", PropertyValue::int(3));

    let found = collection
        .find_entities_by_classification(
            None,
            "Confidentiality",
            Some(&level),
            MatchCriteria::All,
            &SearchOptions::new(),
        )
        .expect("classification search should succeed");

    assert_eq!(guids(&found), ["f1", "t1"]);
    for detail in &found {
        let classification = detail
            .classification("Confidentiality")
            .expect("results should carry the classification");
        assert_eq!(classification.properties.get("level"), Some(&PropertyValue::int(3)));
    }
}

#[test]
fn classification_search_without_properties_finds_every_carrier() {
    let collection = classified();
    let guid = type_guid(&collection, "DataFile");

    let found = collection
        .find_entities_by_classification(
            Some(&guid),
            "Confidentiality",
            None,
            MatchCriteria::All,
            &SearchOptions::new(),
        )
        .expect("classification search should succeed");

    assert_eq!(guids(&found), ["f1", "f2"]);
}

#[test]
fn inapplicable_classification_excludes_the_mapping() {
    let collection = classified();
    let guid = type_guid(&collection, "DataFile");

    let found = collection
        .find_entities_by_classification(
            Some(&guid),
            "PrimaryKey",
            None,
            MatchCriteria::All,
            &SearchOptions::new(),
        )
        .expect("classification search should succeed");

    assert!(found.is_empty());
    assert!(collection.client().searches().is_empty());
}

#[test]
fn classification_limiters_narrow_property_search() {
    let collection = classified();
    let guid = type_guid(&collection, "DataFile");
    let options = SearchOptions::new().with_classifications(&["Confidentiality"]);

    let found = collection
        .find_entities_by_property(Some(&guid), None, MatchCriteria::All, &options)
        .expect("search should succeed");

    assert_eq!(guids(&found), ["f1", "f2"]);
}

#[test]
fn unknown_classification_is_type_not_known() {
    let collection = classified();

    let err = collection
        .find_entities_by_classification(None, "Secret", None, MatchCriteria::All, &SearchOptions::new())
        .expect_err("unknown classification should fail");
    assert_eq!(err.kind, ErrorKind::TypeNotKnown);

    let err = collection
        .find_entities_by_classification(None, "DataFile", None, MatchCriteria::All, &SearchOptions::new())
        .expect_err("an entity type is not a classification");
    assert_eq!(err.kind, ErrorKind::InvalidParameter);
}

#[test]
fn catalog_failures_surface_as_repository_errors() {
    let collection = files();
    collection.client().fail_with("connection reset");

    let err = collection
        .find_entities_by_property_value(None, ".*customer.*", &SearchOptions::new())
        .expect_err("transport failure should propagate");

    assert_eq!(err.kind, ErrorKind::RepositoryError);
    assert!(err.is_transient());
    assert!(err.message.contains("connection reset"));
}
