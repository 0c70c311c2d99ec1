use async_trait::async_trait;
pub use umbra_common::error::backend_error::BackendError;
use umbra_common::protocol::{ElementHandle, FoundBy};

/// A browser session able to run a script with bound arguments.
///
/// This is the only channel the search uses to reach the page. Each search
/// makes exactly one `execute_script` call.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// Run `script` as a function body with `args` bound to `arguments` and
    /// return its JSON-serialized result (`null` when it returns nothing).
    async fn execute_script(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, BackendError>;

    /// Attach diagnostic metadata to a returned handle.
    /// Hosts without a place to record it keep the default no-op.
    async fn annotate(
        &self,
        _handle: &ElementHandle,
        _found_by: &FoundBy,
    ) -> Result<(), BackendError> {
        Ok(())
    }
}

#[async_trait]
impl<H: ScriptHost + ?Sized> ScriptHost for Box<H> {
    async fn execute_script(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, BackendError> {
        (**self).execute_script(script, args).await
    }

    async fn annotate(&self, handle: &ElementHandle, found_by: &FoundBy) -> Result<(), BackendError> {
        (**self).annotate(handle, found_by).await
    }
}

#[async_trait]
impl<H: ScriptHost + ?Sized> ScriptHost for std::sync::Arc<H> {
    async fn execute_script(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, BackendError> {
        (**self).execute_script(script, args).await
    }

    async fn annotate(&self, handle: &ElementHandle, found_by: &FoundBy) -> Result<(), BackendError> {
        (**self).annotate(handle, found_by).await
    }
}
