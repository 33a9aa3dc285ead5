//! HTML parsing for the Wombat renderer.
//!
//! Tokenization and tree construction are delegated to `scraper` (html5ever);
//! this crate converts its tree into the arena [`DomTree`] that layout reads
//! and extracts inline `<style>` text.
//!
//! The conversion keeps elements (lowercased local names and all
//! attributes), text and comments. Doctypes and processing instructions are
//! dropped.

use std::collections::HashMap;
use std::fmt::Write as _;

use scraper::Html;
use scraper::node::Node as HtmlNode;
use wombat_dom::{AttributesMap, DomTree, ElementData, NodeId, NodeType};

/// Parse a full HTML document into a [`DomTree`].
///
/// Parsing never fails: html5ever recovers from malformed markup the way a
/// browser does, inserting the implied `html`/`head`/`body` elements.
#[must_use]
pub fn parse_html(html: &str) -> DomTree {
    let document = Html::parse_document(html);
    let mut tree = DomTree::new();
    let mut ids = HashMap::new();

    // Pre-order, so every parent is converted before its children.
    for node in document.tree.root().descendants() {
        let parent = node
            .parent()
            .and_then(|p| ids.get(&p.id()).copied())
            .unwrap_or(NodeId::ROOT);
        let id = match node.value() {
            HtmlNode::Document => {
                let _ = ids.insert(node.id(), NodeId::ROOT);
                continue;
            }
            HtmlNode::Element(element) => {
                let attrs: AttributesMap = element
                    .attrs()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect();
                tree.alloc(NodeType::Element(ElementData {
                    tag_name: element.name().to_ascii_lowercase(),
                    attrs,
                }))
            }
            HtmlNode::Text(text) => tree.alloc(NodeType::Text(String::from(&**text))),
            HtmlNode::Comment(comment) => tree.alloc(NodeType::Comment(String::from(&**comment))),
            _ => continue,
        };
        tree.append_child(parent, id);
        let _ = ids.insert(node.id(), id);
    }
    tree
}

/// [HTML Standard § 4.2.6 The style element](https://html.spec.whatwg.org/multipage/semantics.html#the-style-element)
///
/// Extract CSS text from all `<style>` elements, in document order.
#[must_use]
pub fn extract_style_content(tree: &DomTree) -> String {
    let mut css = String::new();
    for id in tree.descendants(tree.root()) {
        let is_style = tree
            .as_element(id)
            .is_some_and(|e| e.tag_name.eq_ignore_ascii_case("style"));
        if !is_style {
            continue;
        }
        for &child_id in tree.children(id) {
            if let Some(text) = tree.as_text(child_id) {
                css.push_str(text);
                css.push('\n');
            }
        }
    }
    css
}

/// Render the tree as an indented outline, one node per line.
#[must_use]
pub fn format_tree(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    format_node(tree, id, 0, &mut out);
    out
}

fn format_node(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    let prefix = "  ".repeat(indent);
    let _ = match &node.node_type {
        NodeType::Document => writeln!(out, "{prefix}Document"),
        NodeType::Element(data) if data.attrs.is_empty() => {
            writeln!(out, "{prefix}<{}>", data.tag_name)
        }
        NodeType::Element(data) => {
            let mut attrs: Vec<String> = data
                .attrs
                .iter()
                .map(|(k, v)| {
                    if v.is_empty() {
                        k.clone()
                    } else {
                        format!("{k}=\"{v}\"")
                    }
                })
                .collect();
            attrs.sort();
            writeln!(out, "{prefix}<{} {}>", data.tag_name, attrs.join(" "))
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            writeln!(out, "{prefix}\"{display}\"")
        }
        NodeType::Comment(data) => writeln!(out, "{prefix}<!-- {data} -->"),
    };
    for &child in tree.children(id) {
        format_node(tree, child, indent + 1, out);
    }
}
