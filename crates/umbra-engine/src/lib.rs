pub mod backend;
pub mod config;
pub mod script;
pub mod search;

pub use umbra_common::error;
pub use umbra_common::locator;
pub use umbra_common::protocol;
pub use search::ShadowRootSearch;
