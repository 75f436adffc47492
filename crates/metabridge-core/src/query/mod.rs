//! Module: query
//! Responsibility: translate generic match requests into catalog condition
//! trees, projections and sort keys.
//! Does not own: executing queries or choosing which mappings to search.
//! Boundary: produces `SearchQuery` values; never performs I/O.

mod pattern;
mod translate;


use thiserror::Error as ThisError;

// re-exports
pub use pattern::StringMatch;
pub use translate::{IdentityLookup, Translation, Translator, identity_lookup, sort_for};

///
/// TranslateError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum TranslateError {
    #[error("property '{property}' of '{generic_type}' needs a {expected} value")]
    InvalidValue {
        generic_type: String,
        property: String,
        expected: &'static str,
    },

    #[error("no schema descriptor for catalog type '{external_type}'")]
    NoSchema { external_type: String },

    #[error("sequencing by property is not supported")]
    PropertySequencing,

    #[error("regular expression '{pattern}' is not a supported search shape")]
    UnsupportedPattern { pattern: String },
}
