use crate::config::ConfigError;
use derive_more::Display;
use metabridge_core::{
    catalog::CatalogError,
    mapping::{ClassificationWriteError, RegistryError},
    materialize::MaterializeError,
    query::TranslateError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind taxonomy.
/// `operation` names the collection operation that failed and `subject` the
/// type, guid or property involved.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{kind} in {operation}: {message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub operation: String,
    pub subject: String,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation: String::new(),
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_parameter(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParameter, subject, message)
    }

    pub(crate) fn not_supported(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FunctionNotSupported, subject, message)
    }

    /// Attach the operation name. An operation set further down is kept.
    #[must_use]
    pub fn in_operation(mut self, operation: &str) -> Self {
        if self.operation.is_empty() {
            self.operation = operation.to_string();
        }
        self
    }

    #[must_use]
    pub const fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        let subject = match &err {
            CatalogError::Rejected { operation, .. } => operation.clone(),
            CatalogError::UpdateRejected { id, .. } => id.clone(),
            CatalogError::Transport { .. } => String::new(),
        };

        Self::new(ErrorKind::RepositoryError, subject, err.to_string())
    }
}

impl From<ClassificationWriteError> for Error {
    fn from(err: ClassificationWriteError) -> Self {
        match &err {
            ClassificationWriteError::ReadOnly { name } => Self::not_supported(name.clone(), err.to_string()),
            ClassificationWriteError::MissingProperty { property, .. }
            | ClassificationWriteError::UnwritableValue { property, .. } => {
                Self::invalid_parameter(property.clone(), err.to_string())
            }
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::invalid_parameter("config", err.to_string())
    }
}

impl From<MaterializeError> for Error {
    fn from(err: MaterializeError) -> Self {
        match err {
            MaterializeError::Catalog(err) => err.into(),
            MaterializeError::EntityNotKnown { ref guid }
            | MaterializeError::InvalidEntityFromStore { ref guid, .. } => {
                Self::new(ErrorKind::EntityNotKnown, guid.clone(), err.to_string())
            }
            MaterializeError::NoMapping {
                ref external_type, ..
            } => Self::new(ErrorKind::EntityNotKnown, external_type.clone(), err.to_string()),
            MaterializeError::RelationshipNotKnown { ref guid } => {
                Self::new(ErrorKind::RelationshipNotKnown, guid.clone(), err.to_string())
            }
        }
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        match &err {
            RegistryError::GuidConflict { name, .. } => Self::invalid_parameter(name.clone(), err.to_string()),
            RegistryError::InvalidTypeDef { .. } => Self::invalid_parameter("typeDef", err.to_string()),
            RegistryError::NotSupported { name, .. } | RegistryError::MappingMismatch { name, .. } => {
                Self::new(ErrorKind::TypeNotSupported, name.clone(), err.to_string())
            }
            RegistryError::DuplicateDefault { external_type, .. } => {
                Self::new(ErrorKind::TypeNotSupported, external_type.clone(), err.to_string())
            }
            RegistryError::DuplicatePrefix { prefix, .. } => {
                Self::new(ErrorKind::TypeNotSupported, prefix.clone(), err.to_string())
            }
            RegistryError::UnknownExternalType { mapping, .. }
            | RegistryError::UnknownField { mapping, .. } => {
                Self::new(ErrorKind::TypeNotSupported, mapping.clone(), err.to_string())
            }
        }
    }
}

impl From<TranslateError> for Error {
    fn from(err: TranslateError) -> Self {
        match &err {
            TranslateError::InvalidValue { property, .. } => {
                Self::invalid_parameter(property.clone(), err.to_string())
            }
            TranslateError::NoSchema { external_type } => {
                Self::new(ErrorKind::TypeNotSupported, external_type.clone(), err.to_string())
            }
            TranslateError::PropertySequencing => Self::not_supported("sequencingOrder", err.to_string()),
            TranslateError::UnsupportedPattern { pattern } => {
                Self::not_supported(pattern.clone(), err.to_string())
            }
        }
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers of the metadata collection.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorKind {
    /// Classification does not apply to the entity's type.
    ClassificationError,

    EntityNotKnown,

    /// The request needs a feature the catalog cannot serve. Stable.
    FunctionNotSupported,

    /// Malformed input. Never worth retrying.
    InvalidParameter,

    RelationshipNotKnown,

    /// Catalog or transport fault.
    RepositoryError,

    /// Never offered to the registry.
    TypeNotKnown,

    /// Known to the registry but not implemented over this catalog.
    TypeNotSupported,
}

impl ErrorKind {
    /// Only catalog faults may go away on retry.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::RepositoryError)
    }
}
