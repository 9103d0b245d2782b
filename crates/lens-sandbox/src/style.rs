//! Computed style resolution
//!
//! [`StyleResolver`] is the seam to whatever actually lays the document out.
//! [`CascadeResolver`] is the built-in one: user-agent defaults, inheritance
//! of text properties, then inline `style` declarations.

use crate::dom::{Document, Element, ElementExt, Namespace, NodeId};
use crate::error::CaptureError;
use cssparser::{Delimiter, ParseError, Parser, ParserInput};
use lens_protocol::ComputedStyles;
use std::collections::HashMap;

/// Produces the computed style allow-list for one element
pub trait StyleResolver: Send {
    /// Resolve styles for `node`
    ///
    /// # Errors
    /// Any [`CaptureError`]; the runtime turns it into a no-op click.
    fn computed(&self, document: &Document, node: NodeId) -> Result<ComputedStyles, CaptureError>;
}

/// Properties that flow from parent to child
const INHERITED: [&str; 5] = ["color", "font-size", "font-weight", "text-align", "line-height"];

/// User-agent defaults + inheritance + inline declarations
#[derive(Debug, Clone, Copy, Default)]
pub struct CascadeResolver;

impl StyleResolver for CascadeResolver {
    fn computed(&self, document: &Document, node: NodeId) -> Result<ComputedStyles, CaptureError> {
        if !document.contains(node) {
            return Err(CaptureError::UnknownNode(node));
        }
        let element = document.element(node).ok_or(CaptureError::NotAnElement(node))?;
        if !document.is_connected(node) {
            return Err(CaptureError::Detached(node));
        }

        let mut inherited: HashMap<&'static str, String> = INHERITED
            .iter()
            .map(|&prop| (prop, initial_value(prop).to_string()))
            .collect();

        let mut chain = document.ancestors(node);
        chain.reverse();
        for ancestor in chain.into_iter().filter_map(|id| document.element(id)) {
            let declared = declared_values(ancestor);
            for prop in INHERITED {
                if let Some(value) = declared.get(prop) {
                    inherited.insert(prop, value.clone());
                }
            }
        }

        let declared = declared_values(element);
        let color = declared
            .get("color")
            .or_else(|| inherited.get("color"))
            .cloned()
            .unwrap_or_else(|| initial_value("color").to_string());

        Ok(ComputedStyles::from_fn(|prop| {
            if let Some(value) = declared.get(prop) {
                return value.clone();
            }
            if let Some(value) = inherited.get(prop) {
                return value.clone();
            }
            match prop {
                // border colour defaults to currentcolor
                "border" => format!("0px none {color}"),
                _ => initial_value(prop).to_string(),
            }
        }))
    }
}

/// User-agent defaults for the element, overlaid with its inline `style`
fn declared_values(element: &Element) -> HashMap<&'static str, String> {
    let mut values: HashMap<&'static str, String> = user_agent_defaults(element)
        .iter()
        .map(|&(prop, value)| (prop, value.to_string()))
        .collect();
    if let Some(style) = element.attr("style") {
        for (prop, value) in parse_inline(style) {
            values.insert(prop, value);
        }
    }
    values
}

/// Inline declarations restricted to the captured allow-list
///
/// Tokenized with `cssparser`, so comments, quoted strings and nested
/// functions in values survive. Malformed declarations are skipped up to the
/// next `;`.
pub fn parse_inline(style: &str) -> Vec<(&'static str, String)> {
    let mut input = ParserInput::new(style);
    let mut parser = Parser::new(&mut input);
    let mut out = Vec::new();
    while !parser.is_exhausted() {
        let Ok((name, value)) = parser.parse_until_after(Delimiter::Semicolon, declaration) else {
            continue;
        };
        let value = value.trim().trim_end_matches("!important").trim();
        if value.is_empty() {
            continue;
        }
        if let Some(known) = lens_protocol::STYLE_PROPERTIES
            .iter()
            .map(|(css, _)| *css)
            .find(|css| *css == name)
        {
            out.push((known, value.to_string()));
        }
    }
    out
}

/// `name: value` with the value as its source text
fn declaration<'i>(input: &mut Parser<'i, '_>) -> Result<(String, &'i str), ParseError<'i, ()>> {
    let name = {
        let ident: &str = input.expect_ident()?;
        ident.to_ascii_lowercase()
    };
    input.expect_colon()?;
    let start = input.position();
    while input.next().is_ok() {}
    Ok((name, input.slice_from(start)))
}

fn initial_value(prop: &str) -> &'static str {
    match prop {
        "display" => "inline",
        "position" => "static",
        "width" | "height" => "auto",
        "margin" | "padding" | "border-radius" => "0px",
        "background-color" => "rgba(0, 0, 0, 0)",
        "color" => "rgb(0, 0, 0)",
        "font-size" => "16px",
        "font-weight" => "400",
        "box-shadow" => "none",
        "text-align" => "start",
        "line-height" => "normal",
        _ => "",
    }
}

const BLOCK: [&str; 28] = [
    "html", "body", "div", "section", "article", "aside", "header", "footer", "main", "nav", "p",
    "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "form", "fieldset", "figure", "blockquote",
    "pre", "hr", "address", "details", "dl",
];

const HIDDEN: [&str; 8] = ["head", "script", "style", "title", "meta", "link", "template", "base"];

fn user_agent_defaults(element: &Element) -> &'static [(&'static str, &'static str)] {
    if element.namespace() == Namespace::Svg {
        return &[];
    }
    match element.name() {
        "body" => &[("display", "block"), ("margin", "8px")],
        "h1" => &[("display", "block"), ("font-size", "32px"), ("font-weight", "700"), ("margin", "21.44px 0px")],
        "h2" => &[("display", "block"), ("font-size", "24px"), ("font-weight", "700"), ("margin", "19.92px 0px")],
        "h3" => &[("display", "block"), ("font-size", "18.72px"), ("font-weight", "700"), ("margin", "18.72px 0px")],
        "h4" => &[("display", "block"), ("font-weight", "700"), ("margin", "21.28px 0px")],
        "h5" => &[("display", "block"), ("font-size", "13.28px"), ("font-weight", "700"), ("margin", "22.18px 0px")],
        "h6" => &[("display", "block"), ("font-size", "10.72px"), ("font-weight", "700"), ("margin", "24.97px 0px")],
        "p" | "dl" => &[("display", "block"), ("margin", "16px 0px")],
        "ul" | "ol" => &[("display", "block"), ("margin", "16px 0px"), ("padding", "0px 0px 0px 40px")],
        "li" => &[("display", "list-item")],
        "a" => &[("color", "rgb(0, 0, 238)")],
        "b" | "strong" => &[("font-weight", "700")],
        "small" => &[("font-size", "13.3333px")],
        "button" => &[("display", "inline-block"), ("padding", "1px 6px"), ("text-align", "center")],
        "img" | "input" | "select" | "textarea" => &[("display", "inline-block")],
        "table" => &[("display", "table")],
        "tr" => &[("display", "table-row")],
        "td" => &[("display", "table-cell"), ("padding", "1px")],
        "th" => &[("display", "table-cell"), ("padding", "1px"), ("font-weight", "700"), ("text-align", "center")],
        "blockquote" | "figure" => &[("display", "block"), ("margin", "16px 40px")],
        name if HIDDEN.contains(&name) => &[("display", "none")],
        name if BLOCK.contains(&name) => &[("display", "block")],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn styles_of(markup: &str, selector: &str) -> ComputedStyles {
        let doc = Document::parse(markup);
        let node = doc.query_selector(selector).unwrap().unwrap();
        CascadeResolver.computed(&doc, node).unwrap()
    }

    #[test]
    fn plain_span_gets_initial_values() {
        let styles = styles_of("<span>x</span>", "span");
        assert_eq!(styles.display, "inline");
        assert_eq!(styles.position, "static");
        assert_eq!(styles.background_color, "rgba(0, 0, 0, 0)");
        assert_eq!(styles.border, "0px none rgb(0, 0, 0)");
        assert_eq!(styles.line_height, "normal");
    }

    #[test]
    fn headings_use_user_agent_defaults() {
        let styles = styles_of("<h1>T</h1>", "h1");
        assert_eq!(styles.display, "block");
        assert_eq!(styles.font_size, "32px");
        assert_eq!(styles.font_weight, "700");
    }

    #[test]
    fn inline_style_wins() {
        let styles = styles_of(
            "<div style=\"display: flex; padding:12px ; color: red !important; float: left\">x</div>",
            "div",
        );
        assert_eq!(styles.display, "flex");
        assert_eq!(styles.padding, "12px");
        assert_eq!(styles.color, "red");
        assert_eq!(styles.border, "0px none red");
    }

    #[test]
    fn text_properties_inherit() {
        let styles = styles_of(
            "<div style=\"color: rgb(1, 2, 3); text-align: center; margin: 4px\"><span>x</span></div>",
            "span",
        );
        assert_eq!(styles.color, "rgb(1, 2, 3)");
        assert_eq!(styles.text_align, "center");
        assert_eq!(styles.margin, "0px");
    }

    #[test]
    fn heading_weight_inherits_into_children() {
        let styles = styles_of("<h2><em>x</em></h2>", "em");
        assert_eq!(styles.font_weight, "700");
        assert_eq!(styles.font_size, "24px");
        assert_eq!(styles.display, "inline");
    }

    #[test]
    fn detached_and_text_nodes_fail() {
        let mut doc = Document::parse("<div><p>x</p></div>");
        let p = doc.query_selector("p").unwrap().unwrap();
        let text = doc.children(p)[0];
        assert!(matches!(CascadeResolver.computed(&doc, text), Err(CaptureError::NotAnElement(_))));

        doc.detach(p);
        assert!(matches!(CascadeResolver.computed(&doc, p), Err(CaptureError::Detached(_))));
    }

    #[test]
    fn inline_parser_ignores_unknown_properties() {
        let parsed = parse_inline("float: left; BOX-SHADOW: none; width:;");
        assert_eq!(parsed, vec![("box-shadow", "none".to_string())]);
    }

    #[test]
    fn inline_parser_keeps_functions_and_skips_garbage() {
        let parsed = parse_inline(
            "/* note */ box-shadow: 0 10px 30px rgba(0, 0, 0, 0.1); 12px; color: rgb(1, 2, 3); margin: 4px",
        );
        assert_eq!(
            parsed,
            vec![
                ("box-shadow", "0 10px 30px rgba(0, 0, 0, 0.1)".to_string()),
                ("color", "rgb(1, 2, 3)".to_string()),
                ("margin", "4px".to_string()),
            ]
        );
    }
}
