use crate::locator::{Locator, LocatorKind};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// W3C WebDriver web element identifier key.
pub const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Key used by the legacy JSON wire protocol.
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Opaque reference to a node owned by the browser session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    id: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ W3C_ELEMENT_KEY: self.id })
    }
}

impl Serialize for ElementHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(W3C_ELEMENT_KEY, &self.id)?;
        map.end()
    }
}

#[derive(Deserialize)]
struct RawElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf", default)]
    w3c: Option<String>,
    #[serde(rename = "ELEMENT", default)]
    legacy: Option<String>,
}

impl<'de> Deserialize<'de> for ElementHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawElementRef::deserialize(deserializer)?;
        raw.w3c
            .or(raw.legacy)
            .map(ElementHandle::new)
            .ok_or_else(|| D::Error::custom("object is not a web element reference"))
    }
}

/// Where a search starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchRoot {
    #[default]
    Document,
    Element(ElementHandle),
}

impl SearchRoot {
    /// Value bound to `arguments[0]`. The traversal script treats `null` as
    /// the document.
    pub fn to_argument(&self) -> serde_json::Value {
        match self {
            SearchRoot::Document => serde_json::Value::Null,
            SearchRoot::Element(handle) => handle.to_json(),
        }
    }
}

impl From<ElementHandle> for SearchRoot {
    fn from(handle: ElementHandle) -> Self {
        SearchRoot::Element(handle)
    }
}

impl From<&ElementHandle> for SearchRoot {
    fn from(handle: &ElementHandle) -> Self {
        SearchRoot::Element(handle.clone())
    }
}

/// How an element was found, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundBy {
    pub kind: LocatorKind,
    pub value: String,
}

impl From<&Locator> for FoundBy {
    fn from(locator: &Locator) -> Self {
        Self {
            kind: locator.kind,
            value: locator.value.clone(),
        }
    }
}

impl std::fmt::Display for FoundBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.value)
    }
}

/// An element returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundElement {
    pub handle: ElementHandle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_by: Option<FoundBy>,
}

impl FoundElement {
    pub fn new(handle: ElementHandle) -> Self {
        Self {
            handle,
            found_by: None,
        }
    }

    pub fn with_found_by(mut self, found_by: FoundBy) -> Self {
        self.found_by = Some(found_by);
        self
    }
}

/// An element together with the reach path from the search root to the
/// shadow root (or document) that contains it.
///
/// `element_path` is empty when no shadow boundary was crossed. It is a
/// navigation hint for the DOM as it was at search time, not an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowMatch {
    pub element: FoundElement,
    pub element_path: String,
}

impl ShadowMatch {
    pub fn crossed_shadow_boundary(&self) -> bool {
        !self.element_path.is_empty()
    }
}

/// Path record as produced by the traversal script.
#[derive(Debug, Clone, Deserialize)]
pub struct RawShadowMatch {
    pub element: ElementHandle,
    #[serde(rename = "elementPath", default)]
    pub element_path: String,
}
