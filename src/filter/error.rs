use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unsupported attribute: {0}")]
    UnsupportedAttribute(String),

    #[error("Invalid sort order: {0}")]
    InvalidSortOrder(String),

    #[error("No accessor registered for attribute {0}")]
    MissingAccessor(&'static str),
}
