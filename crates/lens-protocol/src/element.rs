//! Inspected element snapshots
//!
//! An [`InspectedElement`] is a by-value copy of one element taken at click
//! time. It never refers back into the sandboxed document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters of serialized inner markup carried in a snapshot
pub const INNER_HTML_EXCERPT_LIMIT: usize = 200;

/// Computed style properties captured per click, as `(css name, wire name)`
///
/// Order is the wire order and the order consumers list them in.
pub const STYLE_PROPERTIES: [(&str, &str); 15] = [
    ("display", "display"),
    ("position", "position"),
    ("width", "width"),
    ("height", "height"),
    ("margin", "margin"),
    ("padding", "padding"),
    ("background-color", "backgroundColor"),
    ("color", "color"),
    ("font-size", "fontSize"),
    ("font-weight", "fontWeight"),
    ("border", "border"),
    ("border-radius", "borderRadius"),
    ("box-shadow", "boxShadow"),
    ("text-align", "textAlign"),
    ("line-height", "lineHeight"),
];

/// Keep the first `limit` characters of `markup`
///
/// No ellipsis or other marker is appended.
#[must_use]
pub fn truncate_excerpt(markup: &str, limit: usize) -> &str {
    match markup.char_indices().nth(limit) {
        Some((byte_idx, _)) => &markup[..byte_idx],
        None => markup,
    }
}

/// The fixed allow-list of computed styles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStyles {
    /// `display`
    pub display: String,
    /// `position`
    pub position: String,
    /// `width`
    pub width: String,
    /// `height`
    pub height: String,
    /// `margin`
    pub margin: String,
    /// `padding`
    pub padding: String,
    /// `background-color`
    pub background_color: String,
    /// `color`
    pub color: String,
    /// `font-size`
    pub font_size: String,
    /// `font-weight`
    pub font_weight: String,
    /// `border`
    pub border: String,
    /// `border-radius`
    pub border_radius: String,
    /// `box-shadow`
    pub box_shadow: String,
    /// `text-align`
    pub text_align: String,
    /// `line-height`
    pub line_height: String,
}

impl ComputedStyles {
    /// Build from a lookup keyed by CSS property name
    pub fn from_fn(mut lookup: impl FnMut(&'static str) -> String) -> Self {
        Self {
            display: lookup("display"),
            position: lookup("position"),
            width: lookup("width"),
            height: lookup("height"),
            margin: lookup("margin"),
            padding: lookup("padding"),
            background_color: lookup("background-color"),
            color: lookup("color"),
            font_size: lookup("font-size"),
            font_weight: lookup("font-weight"),
            border: lookup("border"),
            border_radius: lookup("border-radius"),
            box_shadow: lookup("box-shadow"),
            text_align: lookup("text-align"),
            line_height: lookup("line-height"),
        }
    }

    /// Value by wire name (`"backgroundColor"`) or CSS name (`"background-color"`)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter()
            .zip(STYLE_PROPERTIES)
            .find(|((wire, _), (css, _))| *wire == name || *css == name)
            .map(|((_, value), _)| value)
    }

    /// `(wire name, value)` pairs in wire order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            &self.display,
            &self.position,
            &self.width,
            &self.height,
            &self.margin,
            &self.padding,
            &self.background_color,
            &self.color,
            &self.font_size,
            &self.font_weight,
            &self.border,
            &self.border_radius,
            &self.box_shadow,
            &self.text_align,
            &self.line_height,
        ]
        .into_iter()
        .zip(STYLE_PROPERTIES)
        .map(|(value, (_, wire))| (wire, value.as_str()))
    }
}

/// Immutable snapshot of one clicked element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectedElement {
    tag_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class_name: Option<String>,
    attributes: IndexMap<String, String>,
    styles: ComputedStyles,
    #[serde(rename = "innerHTML")]
    inner_html: String,
}

impl InspectedElement {
    /// Assemble a snapshot
    ///
    /// Empty `id`/`class` attribute values are treated as absent.
    /// `inner_html` is cut to [`INNER_HTML_EXCERPT_LIMIT`] characters.
    #[must_use]
    pub fn new(
        tag_name: impl Into<String>,
        attributes: IndexMap<String, String>,
        styles: ComputedStyles,
        inner_html: &str,
    ) -> Self {
        Self::with_excerpt_limit(tag_name, attributes, styles, inner_html, INNER_HTML_EXCERPT_LIMIT)
    }

    /// Like [`InspectedElement::new`] with an explicit excerpt limit
    #[must_use]
    pub fn with_excerpt_limit(
        tag_name: impl Into<String>,
        attributes: IndexMap<String, String>,
        styles: ComputedStyles,
        inner_html: &str,
        limit: usize,
    ) -> Self {
        let non_empty = |name: &str| {
            attributes
                .get(name)
                .filter(|v| !v.is_empty())
                .cloned()
        };
        Self {
            tag_name: tag_name.into(),
            id: non_empty("id"),
            class_name: non_empty("class"),
            styles,
            inner_html: truncate_excerpt(inner_html, limit).to_string(),
            attributes,
        }
    }

    /// Tag identifier (`"DIV"`, or source case for foreign elements such as `"svg"`)
    #[inline]
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// `id` attribute, if present and non-empty
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Raw `class` attribute, if present and non-empty
    #[inline]
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// All attributes at capture time, in document order
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Captured computed styles
    #[inline]
    #[must_use]
    pub fn styles(&self) -> &ComputedStyles {
        &self.styles
    }

    /// Truncated serialized inner markup
    #[inline]
    #[must_use]
    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    /// Snapshot-derived identity for recognising repeat inspections
    #[must_use]
    pub fn key(&self) -> ElementKey {
        let mut hasher = blake3::Hasher::new();
        for (name, value) in &self.attributes {
            hasher.update(name.as_bytes());
            hasher.update(&[0]);
            hasher.update(value.as_bytes());
            hasher.update(&[0]);
        }
        hasher.update(self.inner_html.as_bytes());
        ElementKey {
            tag_name: self.tag_name.clone(),
            id: self.id.clone(),
            class_name: self.class_name.clone(),
            digest: *hasher.finalize().as_bytes(),
        }
    }
}

/// Identity of an inspected element derived purely from its snapshot
///
/// Two clicks on the same unchanged element produce equal keys. There is no
/// object identity across the boundary, so this is the only sound cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementKey {
    tag_name: String,
    id: Option<String>,
    class_name: Option<String>,
    digest: [u8; 32],
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag_name)?;
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        if let Some(class) = &self.class_name {
            for token in class.split_whitespace() {
                write!(f, ".{token}")?;
            }
        }
        write!(f, "@{}", &hex::encode(self.digest)[..12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attrs(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn truncate_keeps_exact_prefix() {
        let long = "a".repeat(500);
        assert_eq!(truncate_excerpt(&long, 200).len(), 200);
        assert_eq!(truncate_excerpt("short", 200), "short");
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let s = "é".repeat(10);
        assert_eq!(truncate_excerpt(&s, 3), "ééé");
    }

    #[test]
    fn empty_id_and_class_are_absent() {
        let el = InspectedElement::new(
            "DIV",
            attrs(&[("id", ""), ("class", "")]),
            ComputedStyles::default(),
            "",
        );
        assert_eq!(el.id(), None);
        assert_eq!(el.class_name(), None);
        assert_eq!(el.attributes().len(), 2);
    }

    #[test]
    fn serializes_with_wire_names() {
        let el = InspectedElement::new(
            "SECTION",
            attrs(&[("id", "hero"), ("class", "card primary")]),
            ComputedStyles::from_fn(|_| "x".to_string()),
            "<p>hi</p>",
        );
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["tagName"], "SECTION");
        assert_eq!(json["id"], "hero");
        assert_eq!(json["className"], "card primary");
        assert_eq!(json["innerHTML"], "<p>hi</p>");

        let keys: Vec<&str> = json["styles"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        let expected: Vec<&str> = STYLE_PROPERTIES.iter().map(|(_, wire)| *wire).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn absent_id_is_not_serialized() {
        let el = InspectedElement::new("P", IndexMap::new(), ComputedStyles::default(), "");
        let json = serde_json::to_value(&el).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("className").is_none());
    }

    #[test]
    fn styles_lookup_by_either_name() {
        let styles = ComputedStyles::from_fn(|css| format!("v:{css}"));
        assert_eq!(styles.get("backgroundColor"), Some("v:background-color"));
        assert_eq!(styles.get("line-height"), Some("v:line-height"));
        assert_eq!(styles.get("float"), None);
    }

    #[test]
    fn key_is_stable_across_equal_snapshots() {
        let make = || {
            InspectedElement::new(
                "A",
                attrs(&[("href", "/x"), ("class", "link")]),
                ComputedStyles::default(),
                "go",
            )
        };
        assert_eq!(make().key(), make().key());

        let other = InspectedElement::new(
            "A",
            attrs(&[("href", "/y"), ("class", "link")]),
            ComputedStyles::default(),
            "go",
        );
        assert_ne!(make().key(), other.key());
        assert!(make().key().to_string().starts_with("A.link@"));
    }

    proptest::proptest! {
        #[test]
        fn excerpt_is_a_char_prefix(markup in "\\PC{0,300}", limit in 0usize..320) {
            let excerpt = truncate_excerpt(&markup, limit);
            proptest::prop_assert!(markup.starts_with(excerpt));
            proptest::prop_assert_eq!(excerpt.chars().count(), markup.chars().count().min(limit));
        }
    }
}
