use metabridge::{
    ConfigError, ConnectorConfig, Error, ErrorKind, LoggingConfig, core::catalog::CatalogVersion,
    logging,
};

#[test]
fn empty_document_is_the_default_configuration() {
    let config = ConnectorConfig::from_toml_str("").expect("empty config should parse");

    assert_eq!(config, ConnectorConfig::default());
    assert_eq!(config.catalog_version, CatalogVersion::V11502Sp6);
    assert_eq!(config.max_page_size, 100);
    assert_eq!(config.search_all_excludes, ["Referenceable"]);
    assert!(
        config.exclusions().is_empty(),
        "default exclusions only cover 11.7.0.2"
    );
}

#[test]
fn full_document_overrides_every_section() {
    let config = ConnectorConfig::from_toml_str(
        r#"
        catalog_version = "11.7.0.3"
        max_page_size = 25
        search_all_excludes = []

        [free_text_exclusions]
        "11.7.0.3" = ["long_description", "example"]

        [logging]
        level = "debug"
        "#,
    )
    .expect("config should parse");

    assert_eq!(config.catalog_version, CatalogVersion::V11703);
    assert_eq!(config.max_page_size, 25);
    assert!(config.search_all_excludes.is_empty());
    assert_eq!(config.exclusions(), ["long_description", "example"]);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn invalid_documents_are_rejected() {
    let cases = [
        ("max_page_size = 0", "zero page size"),
        ("[logging]\nlevel = \"loud\"", "unknown log level"),
        ("[free_text_exclusions]\n\"12.0\" = [\"name\"]", "unknown release"),
    ];

    for (source, why) in cases {
        let err = ConnectorConfig::from_toml_str(source).expect_err(why);
        assert!(matches!(err, ConfigError::Invalid(_)), "{why}: {err}");
    }

    let err = ConnectorConfig::from_toml_str("page_size = 10").expect_err("unknown key");
    assert!(matches!(err, ConfigError::Parse(_)), "{err}");

    let err = ConnectorConfig::from_toml_str("catalog_version = \"9.0\"").expect_err("unknown version");
    assert!(matches!(err, ConfigError::Parse(_)), "{err}");
}

#[test]
fn missing_file_is_an_io_error() {
    let err = ConnectorConfig::from_path("/nonexistent/metabridge.toml")
        .expect_err("file does not exist");

    assert!(matches!(err, ConfigError::Io { .. }), "{err}");
    assert_eq!(Error::from(err).kind, ErrorKind::InvalidParameter);
}

#[test]
fn logging_init_tolerates_repeated_calls() {
    let config = LoggingConfig {
        level: "warn".to_string(),
    };

    logging::init(&config);
    logging::init(&config);
}
