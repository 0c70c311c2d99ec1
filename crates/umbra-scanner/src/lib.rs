/// The shadow-piercing traversal script.
/// Backends prepend this source to every search invocation.
pub const SHADOW_SEARCH_JS: &str = include_str!("shadow_search.js");

/// Global functions the script defines, one per search variant.
pub const ENTRY_POINTS: [&str; 8] = [
    "findElement",
    "findElements",
    "findElementWithShadowPath",
    "findElementsWithShadowPath",
    "findElementByXpath",
    "findElementsByXpath",
    "findElementWithShadowPathByXpath",
    "findElementsWithShadowPathByXpath",
];
