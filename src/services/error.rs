use thiserror::Error;
use uuid::Uuid;

use crate::database::store::StoreError;
use crate::filter::FilterError;

/// Typed outcome of every core operation; exactly one of these per failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unknown(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ServiceError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ServiceError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        ServiceError::Unknown(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            ServiceError::BadRequest(msg)
            | ServiceError::Unauthorized(msg)
            | ServiceError::Forbidden(msg)
            | ServiceError::NotFound(msg)
            | ServiceError::Conflict(msg)
            | ServiceError::Unknown(msg) => msg,
        }
    }

    /// Convert a persistence failure, logging anything unexpected with its context.
    pub fn from_store(err: StoreError, operation: &str, list_id: Option<Uuid>, user_id: Option<Uuid>) -> Self {
        match err {
            StoreError::NotFound(what) => ServiceError::not_found(format!("{} cannot be found", what)),
            StoreError::Conflict { expected, actual, .. } => ServiceError::conflict(format!(
                "The list was modified concurrently (expected version {}, current version {})",
                expected, actual
            )),
            StoreError::Duplicate(what) => ServiceError::bad_request(format!("{} already exists", what)),
            other => {
                tracing::error!(
                    operation,
                    list_id = ?list_id,
                    user_id = ?user_id,
                    "Store failure: {}",
                    other
                );
                ServiceError::unknown(format!("Failed to {}", operation.replace('_', " ")))
            }
        }
    }

    /// Shorthand for `map_err` in the list service, which always knows list and user
    pub(crate) fn store(operation: &'static str, list_id: Uuid, user_id: Uuid) -> impl FnOnce(StoreError) -> Self {
        move |err| Self::from_store(err, operation, Some(list_id), Some(user_id))
    }
}

impl From<FilterError> for ServiceError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::MissingAccessor(_) => {
                tracing::error!("Attribute registry incomplete: {}", err);
                ServiceError::unknown("Failed to evaluate item attributes")
            }
            other => ServiceError::bad_request(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_store_errors_become_unknown() {
        let err = ServiceError::from_store(StoreError::Backend("socket closed".into()), "delete_list", None, None);
        assert_eq!(err, ServiceError::unknown("Failed to delete list"));
    }

    #[test]
    fn version_conflicts_stay_typed() {
        let err = ServiceError::from_store(
            StoreError::Conflict { list_id: Uuid::nil(), expected: 3, actual: 4 },
            "update_list",
            None,
            None,
        );
        assert!(matches!(err, ServiceError::Conflict(_)));
    }
}
