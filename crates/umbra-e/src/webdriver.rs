use fantoccini::{Client, ClientBuilder};

/// Default address of a locally running chromedriver.
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

pub struct WebDriverClient {
    pub client: Client,
}

impl WebDriverClient {
    pub async fn connect(
        url: &str,
        capabilities: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut caps = serde_json::Map::new();

        // User capabilities override the defaults
        if let Some(user_caps) = capabilities {
            for (k, v) in user_caps {
                caps.insert(k, v);
            }
        }

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(url)
            .await
            .map_err(|e| format!("Failed to connect to WebDriver at {}: {}", url, e))?;

        Ok(Self { client })
    }

    /// Capabilities for a headless Chrome session.
    pub fn headless_chrome_capabilities() -> serde_json::Map<String, serde_json::Value> {
        let mut caps = serde_json::Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({ "args": ["--headless", "--no-sandbox", "--disable-gpu"] }),
        );
        caps
    }

    pub async fn close(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.client
            .close()
            .await
            .map_err(|e| format!("Failed to close session: {}", e))?;
        Ok(())
    }
}
