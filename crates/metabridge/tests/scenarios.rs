mod common;

use common::{ASSET_GUID, assets, data_file};
use metabridge::{
    SearchOptions,
    core::{
        catalog::Operator,
        types::{InstanceProperties, MatchCriteria, PropertyValue},
    },
};
use time::macros::datetime;

#[test]
fn bare_id_fetches_the_default_mapping() {
    let collection = assets([data_file("1-2-3", "customers")]);

    let detail = collection
        .get_entity_detail("1-2-3")
        .expect("bare id should resolve");

    assert_eq!(detail.type_name(), "Asset");
    assert_eq!(detail.guid(), "1-2-3");
    assert_eq!(detail.header.type_guid, ASSET_GUID);
    assert_eq!(
        detail.properties.get("name"),
        Some(&PropertyValue::string("customers")),
        "name should come from the data_file name field"
    );
    assert_eq!(detail.header.create_time, Some(datetime!(2020-09-13 12:26:40 UTC)));
    assert_eq!(detail.header.created_by.as_deref(), Some("etl"));
}

#[test]
fn prefixed_and_bare_ids_share_one_catalog_object() {
    let collection = assets([data_file("1-2-3", "customers")]);

    let synthesized = collection
        .get_entity_detail("__|AT|__1-2-3")
        .expect("prefixed id should resolve");
    let asset = collection
        .get_entity_detail("1-2-3")
        .expect("bare id should resolve");

    assert_eq!(synthesized.type_name(), "AssetType");
    assert_eq!(synthesized.guid(), "__|AT|__1-2-3");
    assert_eq!(asset.type_name(), "Asset");
    assert_eq!(
        collection.client().lookups(),
        vec!["1-2-3".to_string(), "1-2-3".to_string()],
        "both ids should read the same catalog object"
    );
}

#[test]
fn contains_search_becomes_a_like_condition() {
    let collection = assets([
        data_file("1-2-3", "customers"),
        data_file("4-5-6", "orders"),
        data_file("7-8-9", "big customer list"),
    ]);
    let properties = InstanceProperties::new().with("name", PropertyValue::string(".*cust.*"));

    let found = collection
        .find_entities_by_property(
            Some(ASSET_GUID),
            Some(&properties),
            MatchCriteria::All,
            &SearchOptions::new(),
        )
        .expect("search should succeed");

    let mut guids: Vec<&str> = found.iter().map(|d| d.guid()).collect();
    guids.sort_unstable();
    assert_eq!(guids, ["1-2-3", "7-8-9"]);
    assert!(found.iter().all(|d| d.type_name() == "Asset"));

    let searches = collection.client().searches();
    assert_eq!(searches.len(), 1, "only the Asset mapping should be searched");
    let leaves = searches[0].conditions.leaves();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].field, "name");
    assert_eq!(leaves[0].operator, Operator::LikeContains);
    assert_eq!(leaves[0].operator.as_catalog_str(), "like %{0}%");
    assert_eq!(leaves[0].value.as_deref(), Some("cust"));
}
