//! Document model for the sandboxed surface
//!
//! Markup goes through html5ever's tree builder (via [`scraper`]), so the
//! tree, entity decoding and serialization are the ones a browser would
//! produce. Ids stay valid after a node is detached; the node simply stops
//! being connected to the root.
//!
//! Presentation state owned by the runtime (the selection marker and the
//! inspector hover affordance) lives beside the tree, never in attributes, so
//! it cannot leak into captured snapshots.

mod excerpt;

use indexmap::IndexMap;
use scraper::{ElementRef, Html, Selector};

pub use scraper::node::Element;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const HTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Handle to a node in one [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(ego_tree::NodeId);

/// Element namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Ordinary HTML elements
    Html,
    /// Elements inside an `<svg>` subtree
    Svg,
    /// Anything else the parser produced, such as `MathML`
    Other,
}

/// DOM views of a parsed element
pub trait ElementExt {
    /// Namespace the parser placed the element in
    fn namespace(&self) -> Namespace;

    /// DOM `tagName`: uppercase for HTML, source case otherwise
    fn tag_name(&self) -> String;

    /// All attributes in source order
    fn attribute_map(&self) -> IndexMap<String, String>;
}

impl ElementExt for Element {
    fn namespace(&self) -> Namespace {
        match &*self.name.ns {
            HTML_NS => Namespace::Html,
            SVG_NS => Namespace::Svg,
            _ => Namespace::Other,
        }
    }

    fn tag_name(&self) -> String {
        match self.namespace() {
            Namespace::Html => self.name().to_ascii_uppercase(),
            Namespace::Svg | Namespace::Other => self.name().to_string(),
        }
    }

    fn attribute_map(&self) -> IndexMap<String, String> {
        self.attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

/// A selector the document could not parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid selector {selector:?}: {reason}")]
pub struct SelectorError {
    /// Selector as given
    pub selector: String,
    /// Parser message
    pub reason: String,
}

/// A loaded document
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
    selected: Vec<NodeId>,
    hover_affordance: bool,
}

impl Document {
    /// Build a document from arbitrary markup
    ///
    /// Never fails: malformed markup produces whatever tree the HTML parsing
    /// algorithm recovers, the way a browser renders something rather than
    /// nothing.
    #[must_use]
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
            selected: Vec::new(),
            hover_affordance: false,
        }
    }

    /// Root node
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(self.html.tree.root().id())
    }

    /// Whether `id` refers to a node of this document
    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.html.tree.get(id.0).is_some()
    }

    /// Element payload, if `id` is an element
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.html.tree.get(id.0)?.value().as_element()
    }

    /// Child nodes in order
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.html
            .tree
            .get(id.0)
            .map(|node| node.children().map(|child| NodeId(child.id())).collect())
            .unwrap_or_default()
    }

    /// Ancestors from the parent up to the top of the node's tree
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        self.html
            .tree
            .get(id.0)
            .map(|node| node.ancestors().map(|parent| NodeId(parent.id())).collect())
            .unwrap_or_default()
    }

    /// Whether the node is still attached to the root
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        id == self.root() || self.ancestors(id).last() == Some(&self.root())
    }

    /// Remove a node (and its subtree) from its parent
    ///
    /// Returns false if the node had no parent.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(mut node) = self.html.tree.get_mut(id.0) else {
            return false;
        };
        if node.parent().is_none() {
            return false;
        }
        node.detach();
        true
    }

    /// First connected element matching a CSS selector, in document order
    ///
    /// # Errors
    /// [`SelectorError`] if the selector does not parse.
    pub fn query_selector(&self, source: &str) -> Result<Option<NodeId>, SelectorError> {
        let selector = Selector::parse(source).map_err(|err| SelectorError {
            selector: source.to_string(),
            reason: err.to_string(),
        })?;
        Ok(self
            .html
            .tree
            .root()
            .descendants()
            .find(|&node| ElementRef::wrap(node).is_some_and(|element| selector.matches(&element)))
            .map(|node| NodeId(node.id())))
    }

    /// Serialized markup of the element's children
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        self.inner_html_prefix(id, usize::MAX)
    }

    /// The first `limit` characters of [`Document::inner_html`]
    ///
    /// Serialization stops as soon as `limit` characters exist, so the cost
    /// does not depend on the size or depth of the subtree.
    #[must_use]
    pub fn inner_html_prefix(&self, id: NodeId, limit: usize) -> String {
        match self.html.tree.get(id.0).and_then(ElementRef::wrap) {
            Some(element) => excerpt::children_of(element, limit),
            None => String::new(),
        }
    }

    /// Set or clear the selection highlight on a node
    pub fn set_selected(&mut self, id: NodeId, selected: bool) {
        if selected {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        } else {
            self.selected.retain(|&node| node != id);
        }
    }

    /// Whether the node carries the selection highlight
    #[must_use]
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    /// Every node carrying the selection highlight, connected or not
    #[must_use]
    pub fn highlighted(&self) -> Vec<NodeId> {
        self.selected.clone()
    }

    /// Turn the inspector hover styling on or off for the whole document
    pub fn set_hover_affordance(&mut self, enabled: bool) {
        self.hover_affordance = enabled;
    }

    /// Whether hover styling is active
    #[inline]
    #[must_use]
    pub fn hover_affordance(&self) -> bool {
        self.hover_affordance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn find(doc: &Document, selector: &str) -> NodeId {
        doc.query_selector(selector).unwrap().unwrap()
    }

    #[test]
    fn detach_disconnects_subtree() {
        let mut doc = Document::parse("<div id=a><span id=b>x</span></div>");
        let a = find(&doc, "#a");
        let b = find(&doc, "#b");
        assert!(doc.is_connected(b));

        assert!(doc.detach(a));
        assert!(!doc.is_connected(a));
        assert!(!doc.is_connected(b));
        assert_eq!(doc.query_selector("#b").unwrap(), None);
        assert!(!doc.detach(a));
        assert!(!doc.detach(doc.root()));
    }

    #[test]
    fn selection_marker_is_not_an_attribute() {
        let mut doc = Document::parse("<div id=wrap><p class=lead>x</p></div>");
        let p = find(&doc, "p");
        doc.set_selected(p, true);
        doc.set_selected(p, true);
        assert!(doc.is_selected(p));
        assert_eq!(doc.element(p).unwrap().attr("class"), Some("lead"));
        assert_eq!(doc.highlighted(), vec![p]);
        assert_eq!(doc.inner_html(find(&doc, "#wrap")), "<p class=\"lead\">x</p>");

        doc.set_selected(p, false);
        assert!(doc.highlighted().is_empty());
    }

    #[test]
    fn named_references_are_decoded_like_a_browser() {
        let doc = Document::parse("<div id=\"d\"><p title=\"a&hellip;\">a&mdash;b&eacute;</p></div>");
        let d = find(&doc, "#d");
        assert_eq!(doc.inner_html(d), "<p title=\"a…\">a—bé</p>");
    }

    #[test]
    fn serialization_escapes_text_and_keeps_raw_text_elements() {
        let doc = Document::parse("<div id=d>1 &lt; 2 &amp; <b>3</b><br><script>if (a < b) {}</script></div>");
        let d = find(&doc, "#d");
        assert_eq!(
            doc.inner_html(d),
            "1 &lt; 2 &amp; <b>3</b><br><script>if (a < b) {}</script>"
        );
    }

    #[test]
    fn prefix_stops_at_the_limit() {
        let doc = Document::parse("<div id=d><em>é</em>tail</div>");
        let d = find(&doc, "#d");
        assert_eq!(doc.inner_html_prefix(d, 5), "<em>é");
        assert_eq!(doc.inner_html_prefix(d, 0), "");
        assert_eq!(doc.inner_html_prefix(d, 100), "<em>é</em>tail");
    }

    #[test]
    fn text_nodes_have_no_inner_html() {
        let doc = Document::parse("<p>text</p>");
        let text = doc.children(find(&doc, "p"))[0];
        assert!(doc.element(text).is_none());
        assert_eq!(doc.inner_html(text), "");
    }

    #[test]
    fn tag_names_follow_the_namespace() {
        let doc = Document::parse("<div class=\"  card   primary \"><svg><foreignObject></foreignObject></svg></div>");
        let div = doc.element(find(&doc, "div")).unwrap();
        assert_eq!(div.tag_name(), "DIV");
        assert_eq!(div.namespace(), Namespace::Html);
        assert_eq!(div.classes().collect::<Vec<_>>(), vec!["card", "primary"]);

        let svg = find(&doc, "svg");
        let foreign = doc.element(doc.children(svg)[0]).unwrap();
        assert_eq!(foreign.namespace(), Namespace::Svg);
        assert_eq!(foreign.tag_name(), "foreignObject");
    }

    #[test]
    fn attributes_keep_source_order() {
        let doc = Document::parse("<a href=/x id=link data-z=1 class=c>x</a>");
        let names: Vec<String> = doc.element(find(&doc, "a")).unwrap().attribute_map().into_keys().collect();
        assert_eq!(names, vec!["href", "id", "data-z", "class"]);
    }

    #[test]
    fn bad_selector_is_an_error() {
        let doc = Document::parse("<p>x</p>");
        let err = doc.query_selector("p[").unwrap_err();
        assert_eq!(err.selector, "p[");
        assert!(doc.query_selector("").is_err());
        assert_eq!(doc.query_selector("div p").unwrap(), None);
    }
}
