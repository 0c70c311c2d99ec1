pub mod backend_error;
pub mod locator_error;

pub use backend_error::BackendError;
pub use locator_error::LocatorError;

use crate::locator::LocatorKind;

/// Errors surfaced by the search operations.
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error("Unable to locate element by {kind}: {value}")]
    NoSuchElement { kind: LocatorKind, value: String },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Malformed search response: {0}")]
    MalformedResponse(String),
}

impl SearchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SearchError::NoSuchElement { .. })
    }
}
