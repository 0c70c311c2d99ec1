use crate::locator::LocatorKind;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    #[error("Locator '{descriptor}' can not be matched by 'By.<kind>: <value>'")]
    InvalidLocatorFormat { descriptor: String },

    #[error("Unknown locator kind: {token}")]
    UnknownLocatorKind { token: String },

    #[error("There is no CSS equivalent for locator kind {kind}")]
    UnsupportedLocatorKind { kind: LocatorKind },
}
