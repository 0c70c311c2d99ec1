use crate::backend::ScriptHost;
use crate::config::{ConfigError, ConfigLoader, SearchConfig, UmbraConfig};
use crate::script::{Operation, ScriptTemplate, SearchPlan};
use serde_json::Value;
use tracing::{debug, warn};
use umbra_common::error::{LocatorError, SearchError};
use umbra_common::locator::{Locator, LocatorKind, ToLocator};
use umbra_common::protocol::{
    ElementHandle, FoundBy, FoundElement, RawShadowMatch, SearchRoot, ShadowMatch,
};

/// Finds elements through any number of nested shadow roots.
///
/// Every operation renders the traversal script with one invocation line,
/// runs it once on the host with the search root as `arguments[0]`, and
/// converts the raw result. Singular operations fail with
/// [`SearchError::NoSuchElement`] when nothing matches; plural operations
/// return an empty vector instead.
pub struct ShadowRootSearch<H> {
    host: H,
    template: ScriptTemplate,
    annotate: bool,
    log_scripts: bool,
}

impl<H: ScriptHost> ShadowRootSearch<H> {
    pub fn new(host: H) -> Self {
        let defaults = SearchConfig::default();
        Self {
            host,
            template: ScriptTemplate::embedded(),
            annotate: defaults.annotate,
            log_scripts: defaults.log_scripts,
        }
    }

    /// Build a search from a loaded configuration, reading the script
    /// override if the configuration names one.
    pub async fn from_config(host: H, config: &UmbraConfig) -> Result<Self, ConfigError> {
        let template = ConfigLoader::load_script(config).await?;
        Ok(Self::new(host)
            .with_template(template)
            .with_options(&config.search))
    }

    pub fn with_template(mut self, template: ScriptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_options(mut self, options: &SearchConfig) -> Self {
        self.annotate = options.annotate;
        self.log_scripts = options.log_scripts;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub async fn find_element<L>(&self, locator: &L) -> Result<FoundElement, SearchError>
    where
        L: ToLocator + ?Sized,
    {
        self.find_element_in(&SearchRoot::Document, locator).await
    }

    pub async fn find_element_from<L>(
        &self,
        root: &ElementHandle,
        locator: &L,
    ) -> Result<FoundElement, SearchError>
    where
        L: ToLocator + ?Sized,
    {
        self.find_element_in(&SearchRoot::from(root), locator).await
    }

    pub async fn find_element_in<L>(
        &self,
        root: &SearchRoot,
        locator: &L,
    ) -> Result<FoundElement, SearchError>
    where
        L: ToLocator + ?Sized,
    {
        let locator = locator.to_locator()?;
        let raw = self.run(Operation::FindElement, root, &locator).await?;
        let handle = parse_element(raw)?.ok_or_else(|| not_found(&locator))?;
        Ok(self.found(handle, &locator).await)
    }

    pub async fn find_elements<L>(&self, locator: &L) -> Result<Vec<FoundElement>, SearchError>
    where
        L: ToLocator + ?Sized,
    {
        self.find_elements_in(&SearchRoot::Document, locator).await
    }

    pub async fn find_elements_from<L>(
        &self,
        root: &ElementHandle,
        locator: &L,
    ) -> Result<Vec<FoundElement>, SearchError>
    where
        L: ToLocator + ?Sized,
    {
        self.find_elements_in(&SearchRoot::from(root), locator).await
    }

    pub async fn find_elements_in<L>(
        &self,
        root: &SearchRoot,
        locator: &L,
    ) -> Result<Vec<FoundElement>, SearchError>
    where
        L: ToLocator + ?Sized,
    {
        let locator = locator.to_locator()?;
        let raw = self.run(Operation::FindElements, root, &locator).await?;
        let handles = parse_elements(raw)?;
        debug!("Found {} element(s) by {}", handles.len(), locator);

        let mut elements = Vec::with_capacity(handles.len());
        for handle in handles {
            elements.push(self.found(handle, &locator).await);
        }
        Ok(elements)
    }

    pub async fn find_element_with_shadow_path<L>(
        &self,
        locator: &L,
    ) -> Result<ShadowMatch, SearchError>
    where
        L: ToLocator + ?Sized,
    {
        self.find_element_with_shadow_path_in(&SearchRoot::Document, locator)
            .await
    }

    pub async fn find_element_with_shadow_path_from<L>(
        &self,
        root: &ElementHandle,
        locator: &L,
    ) -> Result<ShadowMatch, SearchError>
    where
        L: ToLocator + ?Sized,
    {
        self.find_element_with_shadow_path_in(&SearchRoot::from(root), locator)
            .await
    }

    pub async fn find_element_with_shadow_path_in<L>(
        &self,
        root: &SearchRoot,
        locator: &L,
    ) -> Result<ShadowMatch, SearchError>
    where
        L: ToLocator + ?Sized,
    {
        let locator = locator.to_locator()?;
        let raw = self
            .run(Operation::FindElementWithShadowPath, root, &locator)
            .await?;
        let raw_match = parse_match(raw)?.ok_or_else(|| not_found(&locator))?;
        Ok(ShadowMatch {
            element: self.found(raw_match.element, &locator).await,
            element_path: raw_match.element_path,
        })
    }

    pub async fn find_elements_with_shadow_path<L>(
        &self,
        locator: &L,
    ) -> Result<Vec<ShadowMatch>, SearchError>
    where
        L: ToLocator + ?Sized,
    {
        self.find_elements_with_shadow_path_in(&SearchRoot::Document, locator)
            .await
    }

    pub async fn find_elements_with_shadow_path_from<L>(
        &self,
        root: &ElementHandle,
        locator: &L,
    ) -> Result<Vec<ShadowMatch>, SearchError>
    where
        L: ToLocator + ?Sized,
    {
        self.find_elements_with_shadow_path_in(&SearchRoot::from(root), locator)
            .await
    }

    pub async fn find_elements_with_shadow_path_in<L>(
        &self,
        root: &SearchRoot,
        locator: &L,
    ) -> Result<Vec<ShadowMatch>, SearchError>
    where
        L: ToLocator + ?Sized,
    {
        let locator = locator.to_locator()?;
        let raw = self
            .run(Operation::FindElementsWithShadowPath, root, &locator)
            .await?;
        let raw_matches = parse_matches(raw)?;
        debug!("Found {} element(s) by {}", raw_matches.len(), locator);

        let mut matches = Vec::with_capacity(raw_matches.len());
        for raw_match in raw_matches {
            matches.push(ShadowMatch {
                element: self.found(raw_match.element, &locator).await,
                element_path: raw_match.element_path,
            });
        }
        Ok(matches)
    }

    /// Find a shadow host anywhere on the page, then query its shadow root
    /// directly for `item`.
    ///
    /// Only the host lookup pierces shadow roots; the item must be a direct
    /// resident of the host's own shadow tree. `item` must have a CSS form.
    pub async fn find_in_shadow_host<L, M>(
        &self,
        shadow_host: &L,
        item: &M,
    ) -> Result<FoundElement, SearchError>
    where
        L: ToLocator + ?Sized,
        M: ToLocator + ?Sized,
    {
        let item = item.to_locator()?;
        let selector = match item.kind {
            LocatorKind::Css => item.value.clone(),
            LocatorKind::XPath => {
                return Err(LocatorError::UnsupportedLocatorKind { kind: item.kind }.into());
            }
            LocatorKind::Id
            | LocatorKind::ClassName
            | LocatorKind::LinkText
            | LocatorKind::PartialLinkText
            | LocatorKind::Name
            | LocatorKind::TagName
            | LocatorKind::IdOrName
            | LocatorKind::Unset => item.to_css_selector()?,
        };

        let shadow_host = self.find_element(shadow_host).await?;
        let raw = self
            .host
            .execute_script(
                "const host = arguments[0];\n\
                 return host.shadowRoot ? host.shadowRoot.querySelector(arguments[1]) : null;",
                vec![shadow_host.handle.to_json(), Value::String(selector)],
            )
            .await?;

        let handle = parse_element(raw)?.ok_or_else(|| not_found(&item))?;
        Ok(self.found(handle, &item).await)
    }

    async fn run(
        &self,
        operation: Operation,
        root: &SearchRoot,
        locator: &Locator,
    ) -> Result<Value, SearchError> {
        let plan = SearchPlan::for_locator(operation, locator)?;
        let script = self.template.render(&plan);

        if self.log_scripts {
            debug!("Executing search script:\n{}", script);
        } else {
            debug!("Executing {}", plan.invocation());
        }

        let raw = self
            .host
            .execute_script(&script, vec![root.to_argument()])
            .await?;
        Ok(raw)
    }

    async fn found(&self, handle: ElementHandle, locator: &Locator) -> FoundElement {
        let found_by = FoundBy::from(locator);
        if self.annotate {
            if let Err(e) = self.host.annotate(&handle, &found_by).await {
                warn!(
                    "Failed to annotate element {} found by {}: {}",
                    handle.id(),
                    found_by,
                    e
                );
            }
        }
        FoundElement::new(handle).with_found_by(found_by)
    }
}

impl<H> std::fmt::Debug for ShadowRootSearch<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadowRootSearch")
            .field("annotate", &self.annotate)
            .field("log_scripts", &self.log_scripts)
            .finish_non_exhaustive()
    }
}

fn not_found(locator: &Locator) -> SearchError {
    SearchError::NoSuchElement {
        kind: locator.kind,
        value: locator.value.clone(),
    }
}

fn malformed(expected: &str, raw: &Value, err: serde_json::Error) -> SearchError {
    SearchError::MalformedResponse(format!("expected {}, got {} ({})", expected, raw, err))
}

fn parse_element(raw: Value) -> Result<Option<ElementHandle>, SearchError> {
    if raw.is_null() {
        return Ok(None);
    }
    serde_json::from_value(raw.clone())
        .map(Some)
        .map_err(|e| malformed("an element reference", &raw, e))
}

fn parse_elements(raw: Value) -> Result<Vec<ElementHandle>, SearchError> {
    if raw.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(raw.clone()).map_err(|e| malformed("an array of element references", &raw, e))
}

fn parse_match(raw: Value) -> Result<Option<RawShadowMatch>, SearchError> {
    if raw.is_null() {
        return Ok(None);
    }
    serde_json::from_value(raw.clone())
        .map(Some)
        .map_err(|e| malformed("an element with its path", &raw, e))
}

fn parse_matches(raw: Value) -> Result<Vec<RawShadowMatch>, SearchError> {
    if raw.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(raw.clone())
        .map_err(|e| malformed("an array of elements with paths", &raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use umbra_common::protocol::W3C_ELEMENT_KEY;

    #[test]
    fn test_parse_element_null_is_absent() {
        assert!(parse_element(Value::Null).unwrap().is_none());
        let handle = parse_element(json!({ W3C_ELEMENT_KEY: "e1" })).unwrap().unwrap();
        assert_eq!(handle.id(), "e1");
    }

    #[test]
    fn test_parse_elements_null_is_empty() {
        assert!(parse_elements(Value::Null).unwrap().is_empty());
        assert!(parse_elements(json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        assert!(matches!(
            parse_element(json!(42)),
            Err(SearchError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_elements(json!({ W3C_ELEMENT_KEY: "e1" })),
            Err(SearchError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_match(json!({ "elementPath": "" })),
            Err(SearchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_matches_keeps_paths() {
        let matches = parse_matches(json!([
            { "elementPath": "", "element": { W3C_ELEMENT_KEY: "a" } },
            { "elementPath": ".shadowRoot", "element": { W3C_ELEMENT_KEY: "b" } },
        ]))
        .unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].element_path, "");
        assert_eq!(matches[1].element.id(), "b");
        assert_eq!(matches[1].element_path, ".shadowRoot");
    }
}
