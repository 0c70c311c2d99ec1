use crate::webdriver::WebDriverClient;
use async_trait::async_trait;
use fantoccini::Client;
use fantoccini::elements::Element;
use tracing::{debug, info};
use umbra_engine::backend::{BackendError, ScriptHost};
use umbra_engine::protocol::ElementHandle;

/// Runs search scripts through a WebDriver session.
pub struct WebDriverHost {
    client: WebDriverClient,
}

impl WebDriverHost {
    /// Open a new session on the WebDriver server at `url`.
    pub async fn connect(
        url: &str,
        capabilities: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Self, BackendError> {
        info!("Connecting to WebDriver at {}...", url);
        let client = WebDriverClient::connect(url, capabilities)
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap a session opened elsewhere.
    pub fn from_client(client: Client) -> Self {
        Self {
            client: WebDriverClient { client },
        }
    }

    pub fn client(&self) -> &Client {
        &self.client.client
    }

    pub async fn navigate(&self, url: &str) -> Result<(), BackendError> {
        info!("Navigating to: {}", url);
        self.client
            .client
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))
    }

    pub async fn close(self) -> Result<(), BackendError> {
        self.client
            .close()
            .await
            .map_err(|e| BackendError::Other(e.to_string()))
    }

    /// Element reference of a driver-side element, usable as a search root.
    pub fn handle_of(element: &Element) -> Result<ElementHandle, BackendError> {
        let value = serde_json::to_value(element)?;
        Ok(serde_json::from_value(value)?)
    }

    /// `textContent` of a found element.
    pub async fn text_of(&self, handle: &ElementHandle) -> Result<String, BackendError> {
        let value = self
            .execute_script("return arguments[0].textContent;", vec![handle.to_json()])
            .await?;
        text_from(value)
    }
}

fn text_from(value: serde_json::Value) -> Result<String, BackendError> {
    match value {
        serde_json::Value::String(text) => Ok(text),
        other => Err(BackendError::Other(format!(
            "Expected textContent to be a string, got {}",
            other
        ))),
    }
}

#[async_trait]
impl ScriptHost for WebDriverHost {
    async fn execute_script(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, BackendError> {
        debug!("Executing script with {} argument(s)", args.len());
        self.client
            .client
            .execute(script, args)
            .await
            .map_err(|e| BackendError::Script(e.to_string()))
    }
}
