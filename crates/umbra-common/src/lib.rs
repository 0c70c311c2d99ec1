pub mod error;
pub mod locator;
pub mod protocol;

pub use error::{BackendError, LocatorError, SearchError};
pub use locator::{Locator, LocatorKind, ToLocator};
pub use protocol::{ElementHandle, FoundBy, FoundElement, SearchRoot, ShadowMatch};
