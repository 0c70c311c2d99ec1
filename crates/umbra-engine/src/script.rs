//! Search script templating.
//!
//! A rendered script is the traversal source followed by one invocation line:
//!
//! ```text
//! <shadow_search.js>
//! return findElementsWithShadowPath(arguments[0], "<selector>");
//! ```
//!
//! The selector is the only interpolated value. The search root always
//! travels as a bound argument.

use std::borrow::Cow;
use umbra_common::error::LocatorError;
use umbra_common::locator::{Locator, LocatorKind};

/// The four search operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FindElement,
    FindElements,
    FindElementWithShadowPath,
    FindElementsWithShadowPath,
}

impl Operation {
    pub fn is_plural(self) -> bool {
        matches!(
            self,
            Operation::FindElements | Operation::FindElementsWithShadowPath
        )
    }

    pub fn with_path(self) -> bool {
        matches!(
            self,
            Operation::FindElementWithShadowPath | Operation::FindElementsWithShadowPath
        )
    }
}

/// Selector language handed to the traversal script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Css,
    XPath,
}

/// Which entry point to call and with what selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    pub operation: Operation,
    pub dialect: Dialect,
    pub selector: String,
}

impl SearchPlan {
    pub fn for_locator(operation: Operation, locator: &Locator) -> Result<Self, LocatorError> {
        let (dialect, selector) = match locator.kind {
            LocatorKind::Css => (Dialect::Css, locator.value.clone()),
            LocatorKind::XPath => (Dialect::XPath, locator.value.clone()),
            LocatorKind::Id
            | LocatorKind::ClassName
            | LocatorKind::LinkText
            | LocatorKind::PartialLinkText
            | LocatorKind::Name
            | LocatorKind::TagName
            | LocatorKind::IdOrName
            | LocatorKind::Unset => (Dialect::Css, locator.to_css_selector()?),
        };

        Ok(Self {
            operation,
            dialect,
            selector,
        })
    }

    pub fn entry_point(&self) -> &'static str {
        match (self.operation, self.dialect) {
            (Operation::FindElement, Dialect::Css) => "findElement",
            (Operation::FindElements, Dialect::Css) => "findElements",
            (Operation::FindElementWithShadowPath, Dialect::Css) => "findElementWithShadowPath",
            (Operation::FindElementsWithShadowPath, Dialect::Css) => "findElementsWithShadowPath",
            (Operation::FindElement, Dialect::XPath) => "findElementByXpath",
            (Operation::FindElements, Dialect::XPath) => "findElementsByXpath",
            (Operation::FindElementWithShadowPath, Dialect::XPath) => {
                "findElementWithShadowPathByXpath"
            }
            (Operation::FindElementsWithShadowPath, Dialect::XPath) => {
                "findElementsWithShadowPathByXpath"
            }
        }
    }

    /// `return <entryPoint>(arguments[0], "<selector>");`
    pub fn invocation(&self) -> String {
        format!(
            "return {}(arguments[0], \"{}\");",
            self.entry_point(),
            escape_js_string(&self.selector)
        )
    }
}

/// Escape text for a double-quoted JavaScript string literal.
pub fn escape_js_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Traversal source plus the invocation slot.
#[derive(Debug, Clone)]
pub struct ScriptTemplate {
    source: Cow<'static, str>,
}

impl ScriptTemplate {
    /// Template over the script shipped with `umbra-scanner`.
    pub fn embedded() -> Self {
        Self {
            source: Cow::Borrowed(umbra_scanner::SHADOW_SEARCH_JS),
        }
    }

    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: Cow::Owned(source.into()),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn render(&self, plan: &SearchPlan) -> String {
        format!("{}\n{}", self.source, plan.invocation())
    }
}

impl Default for ScriptTemplate {
    fn default() -> Self {
        Self::embedded()
    }
}
