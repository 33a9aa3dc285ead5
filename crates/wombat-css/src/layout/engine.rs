//! [§ 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)
//!
//! Single-pass flow layout. Each container keeps a [`Flow`] cursor:
//!
//! - blocks and images start on a fresh row at the container's left edge
//!   and move the cursor below their outer bottom;
//! - spans and text continue on the current row and wrap to the left edge
//!   of the nearest box with a known right edge;
//! - absolutely positioned boxes sit at their offsets and leave the cursor
//!   alone.
//!
//! A row ends below the tallest inline content placed on it.

use wombat_common::image::check_size;
use wombat_common::{Error, Result};
use wombat_dom::{DomTree, ElementData, NodeId, NodeType};

use super::{
    BoxTree, ImageSource, LayoutBox, NodeKind, Payload, Rect, is_hidden_element, is_inline_element,
    replaced_size,
};
use crate::cascade::{cascade, compute_style, font_size_px, line_height_px};
use crate::rule::Rule;
use crate::style::{Edges, Style};
use crate::text::{LineSplitter, line_advance, normalize_whitespace, text_width};
use crate::units::resolve_length;

/// Deepest element nesting layout accepts.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Inputs layout needs besides the tree and the rules.
pub struct LayoutContext<'a> {
    /// Where `img` sources are loaded from.
    pub images: &'a dyn ImageSource,
    /// Nesting limit; deeper markup fails with [`Error::NestingTooDeep`].
    pub max_depth: usize,
}

impl<'a> LayoutContext<'a> {
    /// Context with the default nesting limit.
    #[must_use]
    pub fn new(images: &'a dyn ImageSource) -> Self {
        Self {
            images,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the nesting limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Lay out the document's first `body` element.
///
/// # Errors
///
/// Returns [`Error::MissingBody`] when the document has no body, and
/// otherwise whatever [`layout`] returns.
pub fn layout_document(tree: &DomTree, rules: &[Rule], ctx: &LayoutContext<'_>) -> Result<BoxTree> {
    let body = tree.body().ok_or(Error::MissingBody)?;
    layout(tree, body, rules, ctx)
}

/// Lay out the subtree rooted at `body`, which becomes the box tree root
/// at the canvas origin.
///
/// # Errors
///
/// - [`Error::MissingBody`] when `body` is not an element
/// - [`Error::MissingBodyWidth`] when the body resolves to no positive width
/// - [`Error::MalformedLength`] for malformed lengths anywhere in the tree
/// - [`Error::NestingTooDeep`] past [`LayoutContext::max_depth`]
/// - any image fetch or decode error
pub fn layout(tree: &DomTree, body: NodeId, rules: &[Rule], ctx: &LayoutContext<'_>) -> Result<BoxTree> {
    let element = tree.as_element(body).ok_or(Error::MissingBody)?;
    let style = compute_style(&cascade(element, rules), &Style::default())?;

    // The body is the only box whose percentages have nothing to refer to.
    let width = resolve_length(&style.width, 0)?;
    if width <= 0 {
        return Err(Error::MissingBodyWidth);
    }
    let explicit_height = resolve_length(&style.height, 0)?;

    let canvas = Frame {
        inner: Rect::new(0, 0, width - 1, 0),
        style: Style::default(),
        ref_width: width,
        height: explicit_height,
        inline: false,
        parent: None,
    };
    let engine = LayoutEngine { tree, rules, ctx };
    let mut flow = Flow::new(&canvas.inner);
    let root = engine.layout_block(body, element, style, &canvas, &mut flow, 0)?;

    let canvas_width = root.outer.x2.saturating_add(1);
    let canvas_height = if explicit_height > 0 {
        explicit_height
    } else {
        root.outer.y2.saturating_add(1)
    };
    tracing::debug!(
        target: "layout",
        width = canvas_width,
        height = canvas_height,
        boxes = root.iter().count(),
        "layout complete"
    );

    Ok(BoxTree {
        root,
        width: u32::try_from(canvas_width).unwrap_or(0),
        height: u32::try_from(canvas_height).unwrap_or(0),
    })
}

/// One entry of the ancestor chain: what children see of a box while it
/// is being laid out.
#[derive(Debug)]
struct Frame<'p> {
    /// Content edge; the bottom is not known yet.
    inner: Rect,
    /// Computed style, for inheritance.
    style: Style,
    /// Percentage reference for widths, margins, padding and offsets.
    ref_width: i32,
    /// Percentage reference for heights.
    height: i32,
    /// True for inline containers, whose right edge is not known yet.
    inline: bool,
    parent: Option<&'p Frame<'p>>,
}

impl Frame<'_> {
    /// The nearest frame, starting at this one, with a known right edge.
    fn containing(&self) -> &Self {
        let mut frame = self;
        while frame.inline {
            match frame.parent {
                Some(parent) => frame = parent,
                None => break,
            }
        }
        frame
    }

    /// Left and right edge lines wrap between.
    fn bounds(&self) -> (i32, i32) {
        let containing = self.containing();
        (containing.inner.x1, containing.inner.x2)
    }
}

/// Placement cursor inside one container.
#[derive(Debug, Clone, Copy)]
struct Flow {
    x: i32,
    y: i32,
    /// Where rows start.
    left: i32,
    /// Bottom of the tallest inline content on the current row.
    row_bottom: Option<i32>,
    /// Furthest right and bottom edges of in-flow content so far.
    end: (i32, i32),
    has_content: bool,
}

impl Flow {
    const fn new(inner: &Rect) -> Self {
        Self {
            x: inner.x1,
            y: inner.y1,
            left: inner.x1,
            row_bottom: None,
            end: (inner.x1, inner.y1),
            has_content: false,
        }
    }

    /// Move below the current row, back to the left edge.
    fn close_row(&mut self) {
        if let Some(bottom) = self.row_bottom.take() {
            self.y = self.y.max(bottom.saturating_add(1));
        }
        self.x = self.left;
    }

    fn extend_row(&mut self, bottom: i32) {
        self.row_bottom = Some(self.row_bottom.map_or(bottom, |b| b.max(bottom)));
    }

    fn include(&mut self, rect: &Rect) {
        self.end = (self.end.0.max(rect.x2), self.end.1.max(rect.y2));
        self.has_content = true;
    }
}

/// Resolved four-sided lengths.
#[derive(Debug, Clone, Copy, Default)]
struct Sides {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl Sides {
    fn resolve(edges: &Edges, reference: i32) -> Result<Self> {
        Ok(Self {
            left: resolve_length(&edges.left, reference)?,
            top: resolve_length(&edges.top, reference)?,
            right: resolve_length(&edges.right, reference)?,
            bottom: resolve_length(&edges.bottom, reference)?,
        })
    }
}

struct LayoutEngine<'a> {
    tree: &'a DomTree,
    rules: &'a [Rule],
    ctx: &'a LayoutContext<'a>,
}

impl LayoutEngine<'_> {
    fn layout_children(
        &self,
        parent: NodeId,
        frame: &Frame<'_>,
        depth: usize,
    ) -> Result<(Vec<LayoutBox>, Flow)> {
        if depth > self.ctx.max_depth {
            return Err(Error::NestingTooDeep {
                limit: self.ctx.max_depth,
            });
        }

        let mut flow = Flow::new(&frame.inner);
        let mut boxes = Vec::new();
        for &child in self.tree.children(parent) {
            let Some(node) = self.tree.get(child) else {
                continue;
            };
            match &node.node_type {
                NodeType::Text(text) => self.layout_text(text, frame, &mut flow, &mut boxes)?,
                NodeType::Element(element) => {
                    if let Some(layout_box) =
                        self.layout_element(child, element, frame, &mut flow, depth)?
                    {
                        boxes.push(layout_box);
                    }
                }
                NodeType::Comment(_) | NodeType::Document => {}
            }
        }
        Ok((boxes, flow))
    }

    fn layout_element(
        &self,
        id: NodeId,
        element: &ElementData,
        parent: &Frame<'_>,
        flow: &mut Flow,
        depth: usize,
    ) -> Result<Option<LayoutBox>> {
        let style = compute_style(&cascade(element, self.rules), &parent.style)?;
        if is_hidden_element(&element.tag_name, &style) {
            return Ok(None);
        }

        let layout_box = if element.tag_name == "img" {
            self.layout_image(element, style, parent, flow)?
        } else if style.is_absolute() {
            self.layout_absolute(id, element, style, parent, depth)?
        } else if is_inline_element(&element.tag_name, &style) {
            self.layout_inline(id, element, style, parent, flow, depth)?
        } else {
            self.layout_block(id, element, style, parent, flow, depth)?
        };

        #[cfg(feature = "layout-trace")]
        tracing::trace!(
            target: "layout",
            tag = %layout_box.tag_name,
            outer = ?layout_box.outer,
            container = ?layout_box.container,
            inner = ?layout_box.inner,
            "box"
        );

        Ok(Some(layout_box))
    }

    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "In a block formatting context, boxes are laid out one after the
    /// other, vertically, beginning at the top of a containing block."
    ///
    /// Without an explicit width the box stretches to the containing right
    /// edge. The content bottom follows the in-flow children, or the
    /// explicit height when there are none.
    fn layout_block(
        &self,
        id: NodeId,
        element: &ElementData,
        style: Style,
        parent: &Frame<'_>,
        flow: &mut Flow,
        depth: usize,
    ) -> Result<LayoutBox> {
        flow.close_row();
        let margin = Sides::resolve(&style.margin, parent.ref_width)?;
        let padding = Sides::resolve(&style.padding, parent.ref_width)?;
        let width = resolve_length(&style.width, parent.ref_width)?;
        let height = resolve_length(&style.height, parent.height)?;

        let mut container = Rect::new(
            flow.x.saturating_add(margin.left),
            flow.y.saturating_add(margin.top),
            0,
            0,
        );
        container.x2 = if width > 0 {
            container.x1.saturating_add(width - 1)
        } else {
            parent.bounds().1.saturating_sub(margin.right)
        }
        .max(container.x1);

        let mut inner = Rect::new(
            container.x1.saturating_add(padding.left).min(container.x2),
            container.y1.saturating_add(padding.top),
            0,
            0,
        );
        inner.x2 = container.x2.saturating_sub(padding.right).clamp(inner.x1, container.x2);
        inner.y2 = inner.y1;

        let frame = Frame {
            inner,
            style,
            ref_width: inner.width(),
            height,
            inline: false,
            parent: Some(parent),
        };
        let (children, child_flow) = self.layout_children(id, &frame, depth + 1)?;

        inner.y2 = if child_flow.has_content {
            child_flow.end.1.max(inner.y1)
        } else if height > 0 {
            inner.y1.saturating_add(height - 1)
        } else {
            inner.y1
        };
        container.y2 = inner.y2.saturating_add(padding.bottom);
        let outer = container.expanded(margin.left, margin.top, margin.right, margin.bottom);

        flow.include(&outer);
        flow.y = outer.y2.saturating_add(1);
        flow.x = flow.left;

        Ok(element_box(element, frame.style, [outer, container, inner], Payload::None, children))
    }

    /// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// "In an inline formatting context, boxes are laid out horizontally,
    /// one after the other, beginning at the top of a containing block."
    ///
    /// The box shrinks to its content. The cursor continues after the
    /// content's end, back on the starting row when nothing wrapped.
    fn layout_inline(
        &self,
        id: NodeId,
        element: &ElementData,
        style: Style,
        parent: &Frame<'_>,
        flow: &mut Flow,
        depth: usize,
    ) -> Result<LayoutBox> {
        let margin = Sides::resolve(&style.margin, parent.ref_width)?;
        let padding = Sides::resolve(&style.padding, parent.ref_width)?;

        let (outer_x1, outer_y1) = (flow.x, flow.y);
        let container_x1 = outer_x1.saturating_add(margin.left);
        let container_y1 = outer_y1.saturating_add(margin.top);
        let inner_x1 = container_x1.saturating_add(padding.left);
        let inner_y1 = container_y1.saturating_add(padding.top);

        let frame = Frame {
            inner: Rect::new(inner_x1, inner_y1, inner_x1, inner_y1),
            style,
            ref_width: parent.ref_width,
            height: parent.height,
            inline: true,
            parent: Some(parent),
        };
        let (children, child_flow) = self.layout_children(id, &frame, depth + 1)?;

        let inner = Rect::new(
            inner_x1,
            inner_y1,
            child_flow.end.0.max(inner_x1),
            child_flow.end.1.max(inner_y1),
        );
        let container = Rect::new(
            container_x1,
            container_y1,
            inner.x2.saturating_add(padding.right),
            inner.y2.saturating_add(padding.bottom),
        );
        let outer = Rect::new(
            outer_x1,
            outer_y1,
            container.x2.saturating_add(margin.right),
            container.y2.saturating_add(margin.bottom),
        );

        flow.include(&outer);
        flow.extend_row(outer.y2);
        flow.x = child_flow
            .x
            .saturating_add(padding.right)
            .saturating_add(margin.right);
        if child_flow.y != inner_y1 {
            flow.y = child_flow.y;
        }

        Ok(element_box(element, frame.style, [outer, container, inner], Payload::None, children))
    }

    /// [§ 4.8.3 The img element](https://html.spec.whatwg.org/multipage/embedded-content.html#the-img-element)
    ///
    /// Images are block-level and have no padding box. The decoded image is
    /// resized here so the rasterizer receives it at its final size.
    fn layout_image(
        &self,
        element: &ElementData,
        style: Style,
        parent: &Frame<'_>,
        flow: &mut Flow,
    ) -> Result<LayoutBox> {
        flow.close_row();
        let margin = Sides::resolve(&style.margin, parent.ref_width)?;
        let width = resolve_length(&style.width, parent.ref_width)?;
        let height = resolve_length(&style.height, parent.height)?;

        let image = self.ctx.images.load(element.attr("src"))?;
        let (w, h) = replaced_size((image.width(), image.height()), width, height);
        check_size(u64::from(w), u64::from(h))?;
        let image = image.resized(w, h);

        let x1 = flow.x.saturating_add(margin.left);
        let y1 = flow.y.saturating_add(margin.top);
        let container = Rect::new(
            x1,
            y1,
            x1.saturating_add(i32::try_from(w).unwrap_or(i32::MAX) - 1),
            y1.saturating_add(i32::try_from(h).unwrap_or(i32::MAX) - 1),
        );
        let outer = container.expanded(margin.left, margin.top, margin.right, margin.bottom);

        flow.include(&outer);
        flow.y = outer.y2.saturating_add(1);
        flow.x = flow.left;

        Ok(element_box(
            element,
            style,
            [outer, container, container],
            Payload::Image(image),
            Vec::new(),
        ))
    }

    /// [§ 3.5 Absolute positioning](https://www.w3.org/TR/css-position-3/#abspos-insets)
    ///
    /// The box spans `(left, top)` to `(left + width, top + height)` in
    /// canvas coordinates. Its children flow inside it; it takes no room in
    /// its parent's flow.
    fn layout_absolute(
        &self,
        id: NodeId,
        element: &ElementData,
        style: Style,
        parent: &Frame<'_>,
        depth: usize,
    ) -> Result<LayoutBox> {
        let left = resolve_length(&style.offset.left, parent.ref_width)?;
        let top = resolve_length(&style.offset.top, parent.ref_width)?;
        let width = resolve_length(&style.width, parent.ref_width)?;
        let height = resolve_length(&style.height, parent.height)?;
        let rect = Rect::new(left, top, left.saturating_add(width), top.saturating_add(height));

        let frame = Frame {
            inner: rect,
            style,
            ref_width: width,
            height,
            inline: false,
            parent: Some(parent),
        };
        let (children, _) = self.layout_children(id, &frame, depth + 1)?;

        Ok(element_box(element, frame.style, [rect, rect, rect], Payload::None, children))
    }

    /// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// One box per line. Text directly inside a block ends its row; text
    /// inside an inline container leaves the cursor after its last line.
    fn layout_text(
        &self,
        raw: &str,
        parent: &Frame<'_>,
        flow: &mut Flow,
        boxes: &mut Vec<LayoutBox>,
    ) -> Result<()> {
        let Some(text) = normalize_whitespace(raw) else {
            return Ok(());
        };
        let style = Style::default().inherit_from(&parent.style);
        let font_size = font_size_px(&style)?;
        let advance = line_advance(font_size, line_height_px(&style)?);
        let (left, right) = parent.bounds();

        for (i, line) in LineSplitter::new(&text, font_size, flow.x, left, right).enumerate() {
            if i > 0 {
                flow.close_row();
                flow.x = left;
            }
            let width = text_width(line, font_size);
            let rect = Rect::new(
                flow.x,
                flow.y,
                flow.x.saturating_add(width.max(1) - 1),
                flow.y.saturating_add(advance - 1),
            );
            flow.include(&rect);
            flow.extend_row(rect.y2);
            flow.x = flow.x.saturating_add(width);
            boxes.push(LayoutBox {
                kind: NodeKind::Text,
                tag_name: String::new(),
                class: String::new(),
                style: style.clone(),
                outer: rect,
                container: rect,
                inner: rect,
                payload: Payload::Text(line.to_string()),
                children: Vec::new(),
            });
        }

        if !parent.inline {
            flow.close_row();
        }
        Ok(())
    }
}

fn element_box(
    element: &ElementData,
    style: Style,
    [outer, container, inner]: [Rect; 3],
    payload: Payload,
    children: Vec<LayoutBox>,
) -> LayoutBox {
    LayoutBox {
        kind: NodeKind::Element,
        tag_name: element.tag_name.clone(),
        class: element.class_attr().to_string(),
        style,
        outer,
        container,
        inner,
        payload,
        children,
    }
}
