//! Tests for building and walking the markup tree.

use wombat_dom::{DomTree, ElementData, NodeId, NodeType};

/// Builds `<html><body class="card"><div>Hi</div><!--x--></body></html>`.
fn sample_tree() -> (DomTree, NodeId, NodeId) {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, ElementData::new("html"));
    let body = tree.append_element(html, ElementData::new("BODY").with_attr("class", "card"));
    let div = tree.append_element(body, ElementData::new("div"));
    let _ = tree.append_text(div, "Hi");
    let comment = tree.alloc(NodeType::Comment("x".to_string()));
    tree.append_child(body, comment);
    (tree, body, div)
}

#[test]
fn test_append_sets_parent_and_order() {
    let (tree, body, div) = sample_tree();
    assert_eq!(tree.parent(div), Some(body));
    assert_eq!(tree.children(body).len(), 2);
    assert_eq!(tree.children(body)[0], div);
}

#[test]
fn test_body_lookup_is_case_insensitive() {
    let (tree, body, _) = sample_tree();
    assert_eq!(tree.body(), Some(body));
    assert_eq!(tree.as_element(body).unwrap().tag_name, "body");
}

#[test]
fn test_descendants_are_preorder() {
    let (tree, body, div) = sample_tree();
    let order: Vec<NodeId> = tree.descendants(body).collect();
    assert_eq!(order[0], body);
    assert_eq!(order[1], div);
    assert_eq!(tree.as_text(order[2]), Some("Hi"));
    assert_eq!(order.len(), 4);
}

#[test]
fn test_classes_split_on_whitespace() {
    let el = ElementData::new("p").with_attr("class", "  title \t big ");
    assert_eq!(el.classes().collect::<Vec<_>>(), vec!["title", "big"]);
    assert_eq!(ElementData::new("p").class_attr(), "");
}

#[test]
fn test_missing_body() {
    let mut tree = DomTree::new();
    let _ = tree.append_element(NodeId::ROOT, ElementData::new("div"));
    assert_eq!(tree.body(), None);
}
