//! Locator normalization.
//!
//! Driver locators are described by strings of the form `By.<kind>: <value>`
//! (the way WebDriver bindings print them). This module turns such a
//! descriptor into a typed [`Locator`] and, for the kinds that are neither CSS
//! nor XPath, into an equivalent CSS selector that the traversal script can
//! hand to `querySelectorAll`.

use crate::error::LocatorError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static! {
    static ref DESCRIPTOR_RE: Regex = Regex::new(r"^By\.(\w+): (.*)$").unwrap();
}

/// The closed set of locator strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocatorKind {
    Id,
    ClassName,
    Css,
    #[serde(rename = "XPATH")]
    XPath,
    LinkText,
    PartialLinkText,
    Name,
    TagName,
    IdOrName,
    Unset,
}

impl LocatorKind {
    pub const ALL: [LocatorKind; 10] = [
        LocatorKind::Id,
        LocatorKind::ClassName,
        LocatorKind::Css,
        LocatorKind::XPath,
        LocatorKind::LinkText,
        LocatorKind::PartialLinkText,
        LocatorKind::Name,
        LocatorKind::TagName,
        LocatorKind::IdOrName,
        LocatorKind::Unset,
    ];

    /// Canonical upper snake-case name, e.g. `PARTIAL_LINK_TEXT`.
    pub fn canonical_name(self) -> &'static str {
        match self {
            LocatorKind::Id => "ID",
            LocatorKind::ClassName => "CLASS_NAME",
            LocatorKind::Css => "CSS",
            LocatorKind::XPath => "XPATH",
            LocatorKind::LinkText => "LINK_TEXT",
            LocatorKind::PartialLinkText => "PARTIAL_LINK_TEXT",
            LocatorKind::Name => "NAME",
            LocatorKind::TagName => "TAG_NAME",
            LocatorKind::IdOrName => "ID_OR_NAME",
            LocatorKind::Unset => "UNSET",
        }
    }

    /// Token used in the `By.<token>: <value>` descriptor form.
    pub fn descriptor_token(self) -> &'static str {
        match self {
            LocatorKind::Id => "id",
            LocatorKind::ClassName => "className",
            LocatorKind::Css => "cssSelector",
            LocatorKind::XPath => "xpath",
            LocatorKind::LinkText => "linkText",
            LocatorKind::PartialLinkText => "partialLinkText",
            LocatorKind::Name => "name",
            LocatorKind::TagName => "tagName",
            LocatorKind::IdOrName => "id_or_name",
            LocatorKind::Unset => "unset",
        }
    }

    /// Resolve a descriptor token. Matching is case-insensitive; the
    /// camel-case driver spellings collapse onto their canonical kinds.
    pub fn from_token(token: &str) -> Result<Self, LocatorError> {
        let upper = token.to_uppercase();
        let kind = match upper.as_str() {
            "LINKTEXT" => LocatorKind::LinkText,
            "PARTIALLINKTEXT" => LocatorKind::PartialLinkText,
            "TAGNAME" => LocatorKind::TagName,
            "CLASSNAME" => LocatorKind::ClassName,
            "CSSSELECTOR" => LocatorKind::Css,
            other => LocatorKind::ALL
                .into_iter()
                .find(|kind| kind.canonical_name() == other)
                .ok_or_else(|| LocatorError::UnknownLocatorKind {
                    token: token.to_string(),
                })?,
        };
        Ok(kind)
    }
}

impl fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// A normalized locator. `value` is the raw text supplied by the caller,
/// never escaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub kind: LocatorKind,
    pub value: String,
}

impl Locator {
    pub fn new(kind: LocatorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Id, value)
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::ClassName, value)
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Css, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::XPath, value)
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::LinkText, value)
    }

    pub fn partial_link_text(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::PartialLinkText, value)
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Name, value)
    }

    pub fn tag_name(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::TagName, value)
    }

    /// Normalize a `By.<kind>: <value>` descriptor.
    pub fn parse(descriptor: &str) -> Result<Self, LocatorError> {
        let caps = DESCRIPTOR_RE.captures(descriptor).ok_or_else(|| {
            LocatorError::InvalidLocatorFormat {
                descriptor: descriptor.to_string(),
            }
        })?;

        let (Some(token), Some(value)) = (caps.get(1), caps.get(2)) else {
            return Err(LocatorError::InvalidLocatorFormat {
                descriptor: descriptor.to_string(),
            });
        };

        Ok(Self {
            kind: LocatorKind::from_token(token.as_str())?,
            value: value.as_str().to_string(),
        })
    }

    /// Equivalent CSS selector for kinds that have one.
    ///
    /// The value is quote-escaped before interpolation. CSS and XPath
    /// locators are passed to the traversal script as they are, so they have
    /// no translation here.
    pub fn to_css_selector(&self) -> Result<String, LocatorError> {
        let value = escape_quotes(&self.value);
        match self.kind {
            LocatorKind::Id => Ok(format!("#{}", value)),
            LocatorKind::ClassName => Ok(format!(".{}", value)),
            LocatorKind::LinkText => Ok(format!("[href=\"{}\"]", value)),
            LocatorKind::PartialLinkText => Ok(format!("[href*=\"{}\"]", value)),
            LocatorKind::Name => Ok(format!("[name=\"{}\"]", value)),
            LocatorKind::TagName => Ok(value),
            LocatorKind::Css
            | LocatorKind::XPath
            | LocatorKind::IdOrName
            | LocatorKind::Unset => Err(LocatorError::UnsupportedLocatorKind { kind: self.kind }),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "By.{}: {}", self.kind.descriptor_token(), self.value)
    }
}

impl FromStr for Locator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locator::parse(s)
    }
}

/// Backslash-escape every double quote so the text can sit inside a
/// double-quoted script literal or CSS attribute value.
pub fn escape_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}

/// Anything that can be normalized into a [`Locator`].
pub trait ToLocator {
    fn to_locator(&self) -> Result<Locator, LocatorError>;
}

impl ToLocator for Locator {
    fn to_locator(&self) -> Result<Locator, LocatorError> {
        Ok(self.clone())
    }
}

impl ToLocator for str {
    fn to_locator(&self) -> Result<Locator, LocatorError> {
        Locator::parse(self)
    }
}

impl ToLocator for String {
    fn to_locator(&self) -> Result<Locator, LocatorError> {
        Locator::parse(self)
    }
}

impl<T: ToLocator + ?Sized> ToLocator for &T {
    fn to_locator(&self) -> Result<Locator, LocatorError> {
        (**self).to_locator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_driver_descriptors() {
        let cases = [
            ("By.id: outside-1", LocatorKind::Id, "outside-1"),
            ("By.className: outside", LocatorKind::ClassName, "outside"),
            ("By.cssSelector: .inside", LocatorKind::Css, ".inside"),
            ("By.xpath: .//*[@class='inside']", LocatorKind::XPath, ".//*[@class='inside']"),
            ("By.linkText: index.html", LocatorKind::LinkText, "index.html"),
            ("By.partialLinkText: index", LocatorKind::PartialLinkText, "index"),
            ("By.name: outside-2", LocatorKind::Name, "outside-2"),
            ("By.tagName: a", LocatorKind::TagName, "a"),
        ];

        for (descriptor, kind, value) in cases {
            let locator = Locator::parse(descriptor).unwrap();
            assert_eq!(locator.kind, kind, "kind for {}", descriptor);
            assert_eq!(locator.value, value, "value for {}", descriptor);
        }
    }

    #[test]
    fn test_kind_tokens_are_case_insensitive() {
        assert_eq!(Locator::parse("By.ID: x").unwrap().kind, LocatorKind::Id);
        assert_eq!(Locator::parse("By.CssSelector: x").unwrap().kind, LocatorKind::Css);
        assert_eq!(Locator::parse("By.css: x").unwrap().kind, LocatorKind::Css);
        assert_eq!(Locator::parse("By.XPath: //a").unwrap().kind, LocatorKind::XPath);
        assert_eq!(
            Locator::parse("By.id_or_name: x").unwrap().kind,
            LocatorKind::IdOrName
        );
    }

    #[test]
    fn test_value_keeps_everything_after_first_separator() {
        let locator = Locator::parse("By.cssSelector: a[title=\"x: y\"]: z").unwrap();
        assert_eq!(locator.value, "a[title=\"x: y\"]: z");

        let locator = Locator::parse("By.cssSelector: ").unwrap();
        assert_eq!(locator.value, "");
    }

    #[test]
    fn test_malformed_descriptors() {
        for descriptor in ["NotABy(something)", "By.id:missing-space", "By.: x", "id: x", ""] {
            assert!(
                matches!(
                    Locator::parse(descriptor),
                    Err(LocatorError::InvalidLocatorFormat { .. })
                ),
                "{} should be rejected",
                descriptor
            );
        }
    }

    #[test]
    fn test_unknown_kind() {
        let err = Locator::parse("By.shadowText: foo").unwrap_err();
        match err {
            LocatorError::UnknownLocatorKind { token } => assert_eq!(token, "shadowText"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_css_translation_table() {
        assert_eq!(Locator::id("outside-1").to_css_selector().unwrap(), "#outside-1");
        assert_eq!(Locator::class_name("outside").to_css_selector().unwrap(), ".outside");
        assert_eq!(
            Locator::link_text("index.html").to_css_selector().unwrap(),
            "[href=\"index.html\"]"
        );
        assert_eq!(
            Locator::partial_link_text("index").to_css_selector().unwrap(),
            "[href*=\"index\"]"
        );
        assert_eq!(
            Locator::name("outside-2").to_css_selector().unwrap(),
            "[name=\"outside-2\"]"
        );
        assert_eq!(Locator::tag_name("a").to_css_selector().unwrap(), "a");
    }

    #[test]
    fn test_css_translation_escapes_quotes() {
        assert_eq!(
            Locator::name("say \"hi\"").to_css_selector().unwrap(),
            "[name=\"say \\\"hi\\\"\"]"
        );
        assert_eq!(Locator::id("a\"b").to_css_selector().unwrap(), "#a\\\"b");
    }

    #[test]
    fn test_css_translation_unsupported_kinds() {
        for locator in [
            Locator::css(".x"),
            Locator::xpath("//x"),
            Locator::new(LocatorKind::IdOrName, "x"),
            Locator::new(LocatorKind::Unset, "x"),
        ] {
            assert!(matches!(
                locator.to_css_selector(),
                Err(LocatorError::UnsupportedLocatorKind { kind }) if kind == locator.kind
            ));
        }
    }

    #[test]
    fn test_display_round_trips() {
        for kind in LocatorKind::ALL {
            let locator = Locator::new(kind, "some \"value\": here");
            let parsed: Locator = locator.to_string().parse().unwrap();
            assert_eq!(parsed, locator);
        }
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_value(Locator::partial_link_text("index")).unwrap();
        assert_eq!(json["kind"], "PARTIAL_LINK_TEXT");
        let json = serde_json::to_value(Locator::xpath("//a")).unwrap();
        assert_eq!(json["kind"], "XPATH");
    }
}
