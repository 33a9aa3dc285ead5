//! Property tests for unit resolution and box nesting.

use quickcheck_macros::quickcheck;
use wombat_css::{LayoutContext, MemoryImageSource, Rule, Style, layout_document, resolve_length};
use wombat_dom::{DomTree, ElementData};

#[quickcheck]
fn prop_percentages_floor(percent: u16, reference: u16) -> bool {
    let resolved = resolve_length(&format!("{percent}%"), i32::from(reference)).unwrap();
    resolved == i32::from(percent) * i32::from(reference) / 100
}

#[quickcheck]
fn prop_pixels_round_trip(px: u16) -> bool {
    resolve_length(&format!("{px}px"), 999).unwrap() == i32::from(px)
}

/// Build a body with one nested chain per entry of `specs`. Each entry is
/// `(margin, padding, inline, text)`.
fn build(specs: &[(u8, u8, bool, bool)]) -> (DomTree, Vec<Rule>) {
    let mut tree = DomTree::new();
    let html = tree.append_element(tree.root(), ElementData::new("html"));
    let body = tree.append_element(html, ElementData::new("body"));
    let mut rules = vec![Rule::new(
        "body",
        Style {
            width: "400px".to_string(),
            font_size: "12px".to_string(),
            ..Style::default()
        },
    )];

    let mut parent = body;
    for (i, &(margin, padding, inline, text)) in specs.iter().enumerate() {
        let class = format!("n{i}");
        let tag = if inline { "span" } else { "div" };
        let element = ElementData::new(tag).with_attr("class", &class);
        let id = tree.append_element(parent, element);
        let mut style = Style::default();
        style.margin.merge_from(&wombat_css::Edges::all(&format!("{}px", margin % 24)));
        style.padding.merge_from(&wombat_css::Edges::all(&format!("{}px", padding % 24)));
        rules.push(Rule::new(&format!(".{class}"), style));
        if text {
            let _ = tree.append_text(id, "lorem ipsum dolor");
        }
        // Alternate between nesting and adding siblings
        if i % 2 == 0 {
            parent = id;
        }
    }
    (tree, rules)
}

#[quickcheck]
fn prop_rectangles_nest(specs: Vec<(u8, u8, bool, bool)>) -> bool {
    let specs: Vec<_> = specs.into_iter().take(6).collect();
    let (tree, rules) = build(&specs);
    let source = MemoryImageSource::new();
    let ctx = LayoutContext::new(&source);
    let Ok(boxes) = layout_document(&tree, &rules, &ctx) else {
        return false;
    };
    boxes.iter().all(|b| {
        b.outer.contains(&b.container)
            && b.container.contains(&b.inner)
            && b.outer.area() >= b.container.area()
            && b.container.area() >= b.inner.area()
    })
}

#[quickcheck]
fn prop_layout_is_deterministic(specs: Vec<(u8, u8, bool, bool)>) -> bool {
    let specs: Vec<_> = specs.into_iter().take(6).collect();
    let (tree, rules) = build(&specs);
    let source = MemoryImageSource::new();
    let ctx = LayoutContext::new(&source);
    layout_document(&tree, &rules, &ctx).ok() == layout_document(&tree, &rules, &ctx).ok()
}
