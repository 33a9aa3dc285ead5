//! Box layout tests.

use image::{Rgba, RgbaImage};
use wombat_common::Error;
use wombat_common::image::LoadedImage;
use wombat_css::{
    BoxTree, LayoutBox, LayoutContext, MemoryImageSource, NodeKind, Payload, Rect, layout_document,
    parse_rules,
};
use wombat_html::parse_html;

fn images() -> MemoryImageSource {
    let pixels = RgbaImage::from_pixel(200, 100, Rgba([200, 10, 10, 255]));
    MemoryImageSource::new().with("photo.png", LoadedImage::new("png", pixels))
}

fn try_layout(html: &str, css: &str) -> wombat_common::Result<BoxTree> {
    let tree = parse_html(html);
    let rules = parse_rules(css)?;
    let source = images();
    let ctx = LayoutContext::new(&source);
    layout_document(&tree, &rules, &ctx)
}

fn lay(html: &str, css: &str) -> BoxTree {
    try_layout(html, css).unwrap()
}

/// First box with the given tag, in pre-order.
fn find<'a>(tree: &'a BoxTree, tag: &str) -> &'a LayoutBox {
    tree.iter()
        .find(|b| b.tag_name == tag)
        .unwrap_or_else(|| panic!("no <{tag}> box"))
}

fn text_lines(tree: &BoxTree) -> Vec<(&str, Rect)> {
    tree.iter()
        .filter_map(|b| b.text().map(|t| (t, b.inner)))
        .collect()
}

#[test]
fn test_padding_with_explicit_height() {
    let tree = lay(
        "<body><div></div></body>",
        "body { width: 600px } div { padding: 10px; height: 40px }",
    );
    let div = find(&tree, "div");
    assert_eq!(div.container, Rect::new(0, 0, 599, 59));
    assert_eq!(div.inner, Rect::new(10, 10, 589, 49));
    assert_eq!(div.outer, div.container);
    assert_eq!((tree.width, tree.height), (600, 60));
}

#[test]
fn test_percentage_width_and_margins() {
    let tree = lay(
        "<body><div></div></body>",
        "body { width: 200px } div { width: 50%; margin-left: 10%; height: 5px }",
    );
    let div = find(&tree, "div");
    assert_eq!(div.container, Rect::new(20, 0, 119, 4));
    assert_eq!(div.outer.x1, 0);
}

#[test]
fn test_missing_body_width() {
    let err = try_layout("<body><p>hi</p></body>", "").unwrap_err();
    assert!(matches!(err, Error::MissingBodyWidth));
    let err = try_layout("<body></body>", "body { width: 50% }").unwrap_err();
    assert!(matches!(err, Error::MissingBodyWidth));
}

#[test]
fn test_malformed_length_is_fatal() {
    let err = try_layout(
        "<body><div></div></body>",
        "body { width: 100px } div { margin: -4px }",
    )
    .unwrap_err();
    assert!(matches!(err, Error::MalformedLength { ref value } if value == "-4px"));
}

#[test]
fn test_blocks_stack_vertically() {
    let tree = lay(
        r#"<body><div class="a"></div><div class="b"></div></body>"#,
        "body { width: 100px } .a { height: 10px; margin-bottom: 5px } .b { height: 20px }",
    );
    let boxes: Vec<&LayoutBox> = tree.iter().filter(|b| b.tag_name == "div").collect();
    assert_eq!(boxes[0].outer, Rect::new(0, 0, 99, 14));
    assert_eq!(boxes[1].outer, Rect::new(0, 15, 99, 34));
    assert_eq!(tree.root.inner.y2, 34);
}

#[test]
fn test_text_wraps_at_container_edge() {
    // Narrow characters are 17px at 30px: five fit in 100px.
    let tree = lay(
        "<body><p>abcdefghij</p></body>",
        "body { width: 100px; font-size: 30px }",
    );
    let lines = text_lines(&tree);
    assert_eq!(
        lines,
        vec![
            ("abcde", Rect::new(0, 0, 84, 29)),
            ("fghij", Rect::new(0, 30, 84, 59)),
        ]
    );
    assert_eq!(find(&tree, "p").inner.y2, 59);
}

#[test]
fn test_line_height_sets_stride() {
    let tree = lay(
        "<body><p>one</p><p>two</p></body>",
        "body { width: 300px; font-size: 10px; line-height: 24px }",
    );
    let lines = text_lines(&tree);
    assert_eq!(lines[0].1.y1, 0);
    assert_eq!(lines[0].1.y2, 23);
    assert_eq!(lines[1].1.y1, 24);
}

#[test]
fn test_inline_content_shares_a_row() {
    let tree = lay(
        "<body><p><span>ab</span>cd</p><div></div></body>",
        "body { width: 300px; font-size: 30px } div { height: 1px }",
    );
    let lines = text_lines(&tree);
    assert_eq!(lines[0], ("ab", Rect::new(0, 0, 33, 29)));
    assert_eq!(lines[1], ("cd", Rect::new(34, 0, 67, 29)));

    let span = find(&tree, "span");
    assert_eq!(span.outer, Rect::new(0, 0, 33, 29));
    assert!(span.is_inline());

    // The following block starts below the row
    assert_eq!(find(&tree, "div").outer.y1, 30);
}

#[test]
fn test_inline_padding_and_margin_apply_on_the_way_out() {
    let tree = lay(
        "<body><p><span>ab</span>cd</p></body>",
        "body { width: 300px; font-size: 30px } span { padding: 3px; margin: 2px }",
    );
    let span = find(&tree, "span");
    assert_eq!(span.outer, Rect::new(0, 0, 43, 39));
    assert_eq!(span.container, Rect::new(2, 2, 41, 37));
    assert_eq!(span.inner, Rect::new(5, 5, 38, 34));

    let lines = text_lines(&tree);
    assert_eq!(lines[0], ("ab", Rect::new(5, 5, 38, 34)));
    // Past the right padding and margin, back on the row the span started
    assert_eq!(lines[1], ("cd", Rect::new(44, 0, 77, 29)));
    assert_eq!(find(&tree, "p").inner.y2, 39);
}

#[test]
fn test_whitespace_only_text_is_skipped() {
    let tree = lay(
        "<body>\n  <div>  a \n b  </div>\n</body>",
        "body { width: 300px }",
    );
    let lines = text_lines(&tree);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, "a b");
}

#[test]
fn test_inherited_text_style() {
    let tree = lay(
        r#"<body><div class="c"><p>hi</p></div></body>"#,
        "body { width: 300px; font-family: Mono } .c { color: #0f0; font-size: 50% }",
    );
    let text = tree.iter().find(|b| b.kind == NodeKind::Text).unwrap();
    assert_eq!(text.style.color, "#0f0");
    assert_eq!(text.style.font_size, "8px");
    assert_eq!(text.style.font_family, "Mono");
    assert_eq!(text.inner.height(), 8);
}

#[test]
fn test_image_keeps_aspect_ratio() {
    let tree = lay(
        r#"<body><img src="photo.png"></body>"#,
        "body { width: 300px } img { width: 100px; margin: 5px }",
    );
    let img = find(&tree, "img");
    assert_eq!(img.container, Rect::new(5, 5, 104, 54));
    assert_eq!(img.inner, img.container);
    assert_eq!(img.outer, Rect::new(0, 0, 109, 59));
    let Payload::Image(image) = &img.payload else {
        panic!("img without image payload");
    };
    assert_eq!((image.width(), image.height()), (100, 50));

    let tree = lay(
        r#"<body><img src="photo.png"></body>"#,
        "body { width: 300px } img { height: 50px }",
    );
    assert_eq!(find(&tree, "img").container, Rect::new(0, 0, 99, 49));
}

#[test]
fn test_missing_image_is_fatal() {
    let err = try_layout(
        r#"<body><img src="nope.png"></body>"#,
        "body { width: 300px }",
    )
    .unwrap_err();
    assert!(matches!(err, Error::Fetch { .. }));
}

#[test]
fn test_absolute_box_ignores_flow() {
    let tree = lay(
        r#"<body><div class="spacer"></div><div class="abs"><p>x</p></div><div class="after"></div></body>"#,
        "body { width: 300px } .spacer { height: 70px } .after { height: 5px }
         .abs { position: absolute; left: 10px; top: 20px; width: 50px; height: 30px }",
    );
    let abs = tree.iter().find(|b| b.class == "abs").unwrap();
    let rect = Rect::new(10, 20, 60, 50);
    assert_eq!((abs.outer, abs.container, abs.inner), (rect, rect, rect));

    // Children flow inside the positioned box
    assert_eq!(find(&tree, "p").outer.x1, 10);
    assert_eq!(find(&tree, "p").outer.y1, 20);

    // The next sibling continues where the spacer ended
    let after = tree.iter().find(|b| b.class == "after").unwrap();
    assert_eq!(after.outer.y1, 70);
    assert_eq!(tree.root.inner.y2, 74);
}

#[test]
fn test_hidden_elements_generate_no_boxes() {
    let tree = lay(
        r#"<body><style>p { color: red }</style><p class="gone">x</p><p>y</p></body>"#,
        "body { width: 300px } .gone { display: none }",
    );
    assert!(tree.iter().all(|b| b.tag_name != "style"));
    assert!(tree.iter().all(|b| b.class != "gone"));
    assert_eq!(text_lines(&tree)[0].0, "y");
}

#[test]
fn test_display_overrides() {
    let tree = lay(
        r#"<body><span class="b"></span><div class="i">x</div></body>"#,
        "body { width: 300px } .b { display: block } .i { display: inline }",
    );
    assert!(!find(&tree, "span").is_inline());
    assert!(find(&tree, "div").is_inline());
}

#[test]
fn test_nesting_limit() {
    let html = format!("<body>{}x{}</body>", "<div>".repeat(12), "</div>".repeat(12));
    let tree = parse_html(&html);
    let rules = parse_rules("body { width: 100px }").unwrap();
    let source = MemoryImageSource::new();

    let ctx = LayoutContext::new(&source).with_max_depth(8);
    let err = layout_document(&tree, &rules, &ctx).unwrap_err();
    assert!(matches!(err, Error::NestingTooDeep { limit: 8 }));

    let ctx = LayoutContext::new(&source);
    assert!(layout_document(&tree, &rules, &ctx).is_ok());
}

#[test]
fn test_layout_is_deterministic() {
    let html = r#"<body><div class="card"><span>Hello</span> world <img src="photo.png"></div></body>"#;
    let css = "body { width: 240px } .card { padding: 6px; border: 1px solid #000 } img { width: 40px }";
    assert_eq!(lay(html, css), lay(html, css));
}

#[test]
fn test_huge_block_width_saturates() {
    let tree = lay(
        "<body><div></div></body>",
        "body { width: 100px } div { margin-left: 5px; width: 2147483647px; height: 1px }",
    );
    let div = find(&tree, "div");
    assert_eq!(div.container, Rect::new(5, 0, i32::MAX, 0));
    assert_eq!(div.outer, Rect::new(0, 0, i32::MAX, 0));
    assert_eq!(div.inner.width(), i32::MAX - 4);
    assert_eq!((tree.width, tree.height), (100, 1));
}

#[test]
fn test_huge_block_margin_saturates() {
    let tree = lay(
        "<body><div></div><div></div></body>",
        "body { width: 100px } div { margin-top: 2147483647px; height: 10px }",
    );
    let divs: Vec<&LayoutBox> = tree.iter().filter(|b| b.tag_name == "div").collect();
    assert_eq!(divs[0].container, Rect::new(0, i32::MAX, 99, i32::MAX));
    assert_eq!(divs[1].container.y1, i32::MAX);
    assert_eq!(tree.height, i32::MAX as u32);
}

#[test]
fn test_huge_absolute_offset_saturates() {
    let tree = lay(
        r#"<body><div class="abs"><p>x</p></div></body>"#,
        "body { width: 100px }
         .abs { position: absolute; left: 2147483647px; width: 10px; height: 5px }",
    );
    let abs = tree.iter().find(|b| b.class == "abs").unwrap();
    assert_eq!(abs.outer, Rect::new(i32::MAX, 0, i32::MAX, 5));
    assert_eq!(text_lines(&tree), vec![("x", Rect::new(i32::MAX, 0, i32::MAX, 15))]);
}

#[test]
fn test_huge_image_margin_saturates() {
    let tree = lay(
        r#"<body><img src="photo.png"></body>"#,
        "body { width: 100px } img { width: 10px; margin-left: 2147483647px }",
    );
    let img = find(&tree, "img");
    assert_eq!(img.container, Rect::new(i32::MAX, 0, i32::MAX, 4));
    assert_eq!(img.outer, Rect::new(0, 0, i32::MAX, 4));
}

#[test]
fn test_huge_image_size_is_rejected() {
    let err = try_layout(
        r#"<body><img src="photo.png"></body>"#,
        "body { width: 100px } img { width: 2147483647px }",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::TooLarge {
            width: 2_147_483_647,
            height: 1_073_741_823
        }
    ));
}

#[test]
fn test_huge_font_size_saturates() {
    let tree = lay(
        "<body><p>ab</p></body>",
        "body { width: 100px; font-size: 2147483647px }",
    );
    // One character per line; 17 tenths of an em each
    let lines = text_lines(&tree);
    assert_eq!(lines[0], ("a", Rect::new(0, 0, 1_216_907_398, i32::MAX - 1)));
    assert_eq!(lines[1], ("b", Rect::new(0, i32::MAX, 1_216_907_398, i32::MAX)));
    assert_eq!(tree.height, i32::MAX as u32);
}

#[test]
fn test_huge_inline_margin_saturates() {
    let tree = lay(
        "<body><p><span>ab</span>cd</p></body>",
        "body { width: 300px; font-size: 30px } span { margin-right: 2147483647px }",
    );
    assert_eq!(find(&tree, "span").outer, Rect::new(0, 0, i32::MAX, 29));
    let lines = text_lines(&tree);
    assert_eq!(lines[1], ("c", Rect::new(i32::MAX, 0, i32::MAX, 29)));
    assert_eq!(lines[2], ("d", Rect::new(0, 30, 16, 59)));
    assert_eq!(tree.width, 300);
}
