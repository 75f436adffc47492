//! Per-type field capability table for the catalog, keyed by catalog type
//! name. Answers "does type T have field F", "is F a list", and "which
//! fields of T are strings" for a given catalog release.

use crate::catalog::CatalogVersion;
use std::collections::BTreeMap;

///
/// FieldKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Boolean,
    Date,
    Number,
    Reference,
    ReferenceList,
    Text,
}

impl FieldKind {
    #[must_use]
    pub const fn is_list(self) -> bool {
        matches!(self, Self::ReferenceList)
    }

    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::Text)
    }
}

///
/// FieldDescriptor
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,

    /// First release that carries the field; `None` means all releases.
    pub since: Option<CatalogVersion>,
}

impl FieldDescriptor {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            since: None,
        }
    }

    #[must_use]
    pub const fn since(mut self, version: CatalogVersion) -> Self {
        self.since = Some(version);
        self
    }

    fn available_in(&self, version: CatalogVersion) -> bool {
        self.since.is_none_or(|since| version >= since)
    }
}

///
/// TypeDescriptor
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TypeDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub fields: &'static [FieldDescriptor],

    /// Whether the type carries the created/modified audit fields.
    pub modification_details: bool,
}

///
/// SchemaCatalog
///

#[derive(Clone, Debug)]
pub struct SchemaCatalog {
    version: CatalogVersion,
    types: BTreeMap<&'static str, &'static TypeDescriptor>,
}

impl SchemaCatalog {
    /// The builtin capability table as seen by the given release.
    #[must_use]
    pub fn builtin(version: CatalogVersion) -> Self {
        Self::from_descriptors(version, BUILTIN_TYPES)
    }

    #[must_use]
    pub fn from_descriptors(
        version: CatalogVersion,
        descriptors: &'static [TypeDescriptor],
    ) -> Self {
        Self {
            version,
            types: descriptors.iter().map(|d| (d.name, d)).collect(),
        }
    }

    #[must_use]
    pub const fn version(&self) -> CatalogVersion {
        self.version
    }

    #[must_use]
    pub fn get(&self, object_type: &str) -> Option<&'static TypeDescriptor> {
        self.types.get(object_type).copied()
    }

    #[must_use]
    pub fn field(&self, object_type: &str, field: &str) -> Option<&'static FieldDescriptor> {
        self.get(object_type)?
            .fields
            .iter()
            .find(|f| f.name == field && f.available_in(self.version))
    }

    #[must_use]
    pub fn has_field(&self, object_type: &str, field: &str) -> bool {
        self.field(object_type, field).is_some()
    }

    #[must_use]
    pub fn is_list(&self, object_type: &str, field: &str) -> bool {
        self.field(object_type, field).is_some_and(|f| f.kind.is_list())
    }

    /// String-valued fields of the type, in table order.
    #[must_use]
    pub fn string_fields(&self, object_type: &str) -> Vec<&'static str> {
        self.get(object_type)
            .map(|d| {
                d.fields
                    .iter()
                    .filter(|f| f.kind.is_string() && f.available_in(self.version))
                    .map(|f| f.name)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn includes_modification_details(&self, object_type: &str) -> bool {
        self.get(object_type).is_some_and(|d| d.modification_details)
    }
}

///
/// BUILTIN TABLE
///

use FieldKind::{Boolean, Date, Number, Reference, ReferenceList, Text};

const fn f(name: &'static str, kind: FieldKind) -> FieldDescriptor {
    FieldDescriptor::new(name, kind)
}

const AUDIT: [FieldDescriptor; 4] = [
    f("created_by", Text),
    f("created_on", Date),
    f("modified_by", Text),
    f("modified_on", Date),
];

static DATA_FILE: [FieldDescriptor; 10] = [
    f("name", Text),
    f("short_description", Text),
    f("long_description", Text),
    f("path", Text),
    f("assigned_to_terms", ReferenceList),
    f("confidentiality_level", Number),
    AUDIT[0],
    AUDIT[1],
    AUDIT[2],
    AUDIT[3],
];

static DATABASE_TABLE: [FieldDescriptor; 10] = [
    f("name", Text),
    f("short_description", Text),
    f("long_description", Text),
    f("database_columns", ReferenceList),
    f("assigned_to_terms", ReferenceList),
    f("confidentiality_level", Number),
    AUDIT[0],
    AUDIT[1],
    AUDIT[2],
    AUDIT[3],
];

static DATABASE_COLUMN: [FieldDescriptor; 15] = [
    f("name", Text),
    f("short_description", Text),
    f("long_description", Text),
    f("data_type", Text),
    f("position", Number),
    f("allows_null_values", Boolean),
    f("database_table_or_view", Reference),
    f("assigned_to_terms", ReferenceList),
    f("defined_primary_key", ReferenceList),
    f("detected_classifications", ReferenceList),
    f("confidentiality_level", Number),
    AUDIT[0],
    AUDIT[1],
    AUDIT[2],
    AUDIT[3],
];

static TERM: [FieldDescriptor; 11] = [
    f("name", Text),
    f("short_description", Text),
    f("long_description", Text),
    f("abbreviation", Text).since(CatalogVersion::V11702),
    f("example", Text),
    f("parent_category", Reference),
    f("assigned_assets", ReferenceList),
    AUDIT[0],
    AUDIT[1],
    AUDIT[2],
    AUDIT[3],
];

static CATEGORY: [FieldDescriptor; 10] = [
    f("name", Text),
    f("short_description", Text),
    f("long_description", Text),
    f("parent_category", Reference),
    f("subcategories", ReferenceList),
    f("terms", ReferenceList),
    AUDIT[0],
    AUDIT[1],
    AUDIT[2],
    AUDIT[3],
];

static DATA_CLASS: [FieldDescriptor; 9] = [
    f("name", Text),
    f("short_description", Text),
    f("class_code", Text),
    f("classifications_selected", ReferenceList),
    f("enabled", Boolean),
    AUDIT[0],
    AUDIT[1],
    AUDIT[2],
    AUDIT[3],
];

static CLASSIFICATION: [FieldDescriptor; 8] = [
    f("classifies_asset", Reference),
    f("data_class", Reference),
    f("confidence", Number),
    f("value_frequency", Number),
    AUDIT[0],
    AUDIT[1],
    AUDIT[2],
    AUDIT[3],
];

static GROUP: [FieldDescriptor; 5] = [
    f("principal_id", Text),
    f("group_name", Text),
    f("email_address", Text),
    f("web_address", Text),
    f("group_members", ReferenceList),
];

static BUILTIN_TYPES: &[TypeDescriptor] = &[
    TypeDescriptor {
        name: "category",
        display_name: "Category",
        fields: &CATEGORY,
        modification_details: true,
    },
    TypeDescriptor {
        name: "classification",
        display_name: "Data Class Assignment",
        fields: &CLASSIFICATION,
        modification_details: true,
    },
    TypeDescriptor {
        name: "data_class",
        display_name: "Data Class",
        fields: &DATA_CLASS,
        modification_details: true,
    },
    TypeDescriptor {
        name: "data_file",
        display_name: "Data File",
        fields: &DATA_FILE,
        modification_details: true,
    },
    TypeDescriptor {
        name: "database_column",
        display_name: "Database Column",
        fields: &DATABASE_COLUMN,
        modification_details: true,
    },
    TypeDescriptor {
        name: "database_table",
        display_name: "Database Table",
        fields: &DATABASE_TABLE,
        modification_details: true,
    },
    TypeDescriptor {
        name: "group",
        display_name: "Group",
        fields: &GROUP,
        modification_details: false,
    },
    TypeDescriptor {
        name: "term",
        display_name: "Term",
        fields: &TERM,
        modification_details: true,
    },
];
