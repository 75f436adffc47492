//! ## Crate layout
//! - `collection`: the `MetadataCollection` facade serving generic metadata
//!   operations from an external catalog.
//! - `config`: connector configuration read from TOML.
//! - `error`: the public error taxonomy.
//! - `logging`: `env_logger` bootstrap for standalone hosts.
//!
//! The mapping engine itself lives in `metabridge-core`, re-exported as
//! `core`.

pub use metabridge_core as core;

pub mod collection;
pub mod config;
pub mod error;
pub mod logging;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// re-exports
pub use collection::{MetadataCollection, SearchOptions};
pub use config::{ConfigError, ConnectorConfig, LoggingConfig};
pub use error::{Error, ErrorKind};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        collection::{MetadataCollection, SearchOptions},
        config::ConnectorConfig,
        core::{catalog::CatalogClient, prelude::*},
        error::{Error, ErrorKind},
    };
}
