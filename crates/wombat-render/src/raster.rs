//! Rasterizer: paint a [`BoxTree`] into an RGBA buffer.
//!
//! [CSS 2.1 Appendix E: Elaborate description of Stacking Contexts](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! Boxes paint in document order: background, then borders, then content,
//! then children. A [`DrawCursor`] is threaded through the walk and moves
//! by the same rules the layout flow uses, so text advances by the same
//! estimated widths and line strides that positioned it.

use image::RgbaImage;
use wombat_common::Result;
use wombat_common::image::check_size;
use wombat_common::warning::warn_once;
use wombat_css::cascade::{font_size_px, line_height_px};
use wombat_css::{BoxTree, Color, LayoutBox, NodeKind, Payload, Rect, line_advance, resolve_length, text_width};

use crate::compositor::{self, blend_pixel, fill_rect};
use crate::fonts::FontRegistry;

/// Resolution that maps one CSS pixel to one point.
pub const DEFAULT_DPI: f32 = 72.0;

/// Glyphs rasterize at no more than this many pixels.
const MAX_GLYPH_PX: f32 = 4096.0;

/// Rendering settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Glyphs rasterize at `font-size * dpi / 72` pixels.
    pub dpi: f32,
    /// Text color when nothing in the ancestor chain sets `color`.
    pub default_color: Color,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            default_color: Color::BLACK,
        }
    }
}

/// The pen, plus the bottom of the tallest content on the current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DrawCursor {
    x: i32,
    y: i32,
    /// Where rows start.
    left: i32,
    row_bottom: Option<i32>,
}

impl DrawCursor {
    /// A cursor at the content origin of `inner`.
    const fn at(inner: &Rect) -> Self {
        Self {
            x: inner.x1,
            y: inner.y1,
            left: inner.x1,
            row_bottom: None,
        }
    }

    fn close_row(&mut self) {
        if let Some(bottom) = self.row_bottom.take() {
            self.y = self.y.max(bottom.saturating_add(1));
        }
        self.x = self.left;
    }

    fn extend_row(&mut self, bottom: i32) {
        self.row_bottom = Some(self.row_bottom.map_or(bottom, |b| b.max(bottom)));
    }

    /// The cursor children of `node` start with: from the pen at the
    /// box's Outer origin, through its margin and then its padding.
    const fn enter(&self, node: &LayoutBox) -> Self {
        let x = self
            .x
            .saturating_add(node.container.x1 - node.outer.x1)
            .saturating_add(node.inner.x1 - node.container.x1);
        let y = self
            .y
            .saturating_add(node.container.y1 - node.outer.y1)
            .saturating_add(node.inner.y1 - node.container.y1);
        Self {
            x,
            y,
            left: node.inner.x1,
            row_bottom: None,
        }
    }
}

/// Paint `tree` onto a white canvas of the tree's size.
///
/// # Errors
///
/// - [`wombat_common::Error::UnknownFont`] when a text line's family is not
///   registered
/// - [`wombat_common::Error::MalformedColor`] for malformed colors
/// - [`wombat_common::Error::MalformedLength`] for malformed border widths
/// - [`wombat_common::Error::TooLarge`] when the canvas exceeds
///   [`MAX_PIXELS`](wombat_common::image::MAX_PIXELS)
pub fn render(tree: &BoxTree, fonts: &FontRegistry, options: &RenderOptions) -> Result<RgbaImage> {
    check_size(u64::from(tree.width), u64::from(tree.height))?;
    let mut canvas = RgbaImage::from_pixel(tree.width, tree.height, compositor::to_rgba(Color::WHITE));

    // The body background covers the whole canvas, margins included.
    if let Some(background) = Color::parse_optional(&tree.root.style.background_color)? {
        let full = Rect::new(
            0,
            0,
            i32::try_from(tree.width).unwrap_or(i32::MAX) - 1,
            i32::try_from(tree.height).unwrap_or(i32::MAX) - 1,
        );
        fill_rect(&mut canvas, full, background);
    }

    let mut rasterizer = Rasterizer {
        canvas,
        fonts,
        options,
        glyphs: 0,
    };
    let mut cursor = DrawCursor::at(&tree.root.outer);
    rasterizer.paint_block(&tree.root, &mut cursor, true)?;

    tracing::debug!(
        target: "raster",
        width = tree.width,
        height = tree.height,
        glyphs = rasterizer.glyphs,
        "raster complete"
    );
    Ok(rasterizer.canvas)
}

struct Rasterizer<'a> {
    canvas: RgbaImage,
    fonts: &'a FontRegistry,
    options: &'a RenderOptions,
    glyphs: usize,
}

impl Rasterizer<'_> {
    fn paint_children(&mut self, node: &LayoutBox, inline: bool, cursor: &mut DrawCursor) -> Result<()> {
        for child in &node.children {
            match child.kind {
                NodeKind::Text => self.paint_text(child, inline, cursor)?,
                NodeKind::Element => self.paint_element(child, cursor)?,
                NodeKind::Comment => {}
            }
        }
        Ok(())
    }

    /// Branches in the same order layout does.
    fn paint_element(&mut self, node: &LayoutBox, cursor: &mut DrawCursor) -> Result<()> {
        if node.tag_name == "img" {
            self.paint_image(node, cursor);
            Ok(())
        } else if node.style.is_absolute() {
            self.paint_absolute(node)
        } else if node.is_inline() {
            self.paint_inline(node, cursor)
        } else {
            self.paint_block(node, cursor, false)
        }
    }

    /// Blocks start a fresh row and leave the pen at the start of the row
    /// below their Outer bottom. The body's background is already painted.
    fn paint_block(&mut self, node: &LayoutBox, cursor: &mut DrawCursor, root: bool) -> Result<()> {
        cursor.close_row();
        cursor.x = node.outer.x1;
        cursor.y = node.outer.y1;

        // [§ 4.4 The hr element](https://html.spec.whatwg.org/multipage/grouping-content.html#the-hr-element)
        // Rules only take up room.
        if node.tag_name != "hr" {
            self.paint_decorations(node, !root)?;
        }

        let mut inner = cursor.enter(node);
        self.paint_children(node, false, &mut inner)?;

        cursor.y = node.outer.y2.saturating_add(1);
        cursor.x = cursor.left;
        Ok(())
    }

    /// Inline containers continue the current row. Afterwards the pen sits
    /// past the right padding and margin, back on the starting row when no
    /// line inside wrapped.
    fn paint_inline(&mut self, node: &LayoutBox, cursor: &mut DrawCursor) -> Result<()> {
        cursor.x = node.outer.x1;
        cursor.y = node.outer.y1;
        self.paint_decorations(node, true)?;

        let mut inner = cursor.enter(node);
        self.paint_children(node, true, &mut inner)?;

        let padding_right = node.container.x2 - node.inner.x2;
        let margin_right = node.outer.x2 - node.container.x2;
        cursor.x = inner.x.saturating_add(padding_right).saturating_add(margin_right);
        if inner.y != node.inner.y1 {
            cursor.y = inner.y;
        }
        cursor.extend_row(node.outer.y2);
        Ok(())
    }

    /// Absolute boxes paint at their own rectangle and leave the cursor of
    /// the enclosing flow untouched.
    fn paint_absolute(&mut self, node: &LayoutBox) -> Result<()> {
        self.paint_decorations(node, true)?;
        let mut inner = DrawCursor::at(&node.inner);
        self.paint_children(node, false, &mut inner)
    }

    /// [§ 4.8.3 The img element](https://html.spec.whatwg.org/multipage/embedded-content.html#the-img-element)
    fn paint_image(&mut self, node: &LayoutBox, cursor: &mut DrawCursor) {
        let Payload::Image(image) = &node.payload else {
            return;
        };
        cursor.close_row();
        cursor.x = node.outer.x1;
        cursor.y = node.outer.y1;
        let pen = cursor.enter(node);

        let target = (
            u32::try_from(node.container.width()).unwrap_or(0).max(1),
            u32::try_from(node.container.height()).unwrap_or(0).max(1),
        );
        let fitted = compositor::fit(image, target.0, target.1);
        compositor::composite(&mut self.canvas, &fitted, pen.x, pen.y);

        cursor.y = node.outer.y2.saturating_add(1);
        cursor.x = cursor.left;
    }

    /// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// A line laid out left of the pen is the continuation of a wrapped run
    /// and starts a new row. Lines directly inside a block end their row.
    fn paint_text(&mut self, node: &LayoutBox, inline_parent: bool, cursor: &mut DrawCursor) -> Result<()> {
        let Some(line) = node.text() else {
            return Ok(());
        };
        if node.inner.x1 < cursor.x {
            cursor.close_row();
            cursor.x = node.inner.x1;
        }

        let font_size = font_size_px(&node.style)?;
        let advance = line_advance(font_size, line_height_px(&node.style)?);
        let color = Color::parse_optional(&node.style.color)?.unwrap_or(self.options.default_color);
        self.draw_text(line, &node.style.font_family, cursor.x, cursor.y, font_size, color)?;

        if (cursor.x, cursor.y) != (node.inner.x1, node.inner.y1) {
            tracing::debug!(
                target: "raster",
                line,
                pen = ?(cursor.x, cursor.y),
                laid_out = ?(node.inner.x1, node.inner.y1),
                "pen drifted from layout"
            );
        }

        cursor.extend_row(cursor.y.saturating_add(advance - 1));
        cursor.x = cursor.x.saturating_add(text_width(line, font_size));
        if !inline_parent {
            cursor.close_row();
        }
        Ok(())
    }

    /// [§ 14.2 The canvas background](https://www.w3.org/TR/CSS2/colors.html#background)
    /// and [§ 8.5 Border properties](https://www.w3.org/TR/CSS2/box.html#border-properties)
    ///
    /// Fill the Container with `background-color`, then draw solid borders
    /// inside its edge.
    fn paint_decorations(&mut self, node: &LayoutBox, background: bool) -> Result<()> {
        let style = &node.style;
        let rect = node.container;
        let fill = if background {
            Color::parse_optional(&style.background_color)?
        } else {
            None
        };
        if let Some(color) = fill {
            fill_rect(&mut self.canvas, rect, color);
        }
        if !style.background_image.is_empty() {
            warn_once("raster", &format!("background-image is not painted: {}", style.background_image));
        }
        if !style.border_radius.is_empty() {
            warn_once("raster", "border-radius is not painted; corners stay square");
        }

        let reference = rect.width();
        let fallback = Color::parse_optional(&style.color)?.unwrap_or(self.options.default_color);
        let sides = [
            (&style.border_width.left, &style.border_color.left, &style.border_style.left),
            (&style.border_width.top, &style.border_color.top, &style.border_style.top),
            (&style.border_width.right, &style.border_color.right, &style.border_style.right),
            (&style.border_width.bottom, &style.border_color.bottom, &style.border_style.bottom),
        ];
        for (side, (width, color, line_style)) in sides.into_iter().enumerate() {
            if !is_painted_border(line_style) {
                continue;
            }
            let width = resolve_length(width, reference)?;
            if width <= 0 {
                continue;
            }
            let color = Color::parse_optional(color)?.unwrap_or(fallback);
            let band = match side {
                0 => Rect::new(rect.x1, rect.y1, rect.x1.saturating_add(width - 1), rect.y2),
                1 => Rect::new(rect.x1, rect.y1, rect.x2, rect.y1.saturating_add(width - 1)),
                2 => Rect::new(rect.x2.saturating_sub(width - 1), rect.y1, rect.x2, rect.y2),
                _ => Rect::new(rect.x1, rect.y2.saturating_sub(width - 1), rect.x2, rect.y2),
            };
            fill_rect(&mut self.canvas, band, color);
        }
        Ok(())
    }

    /// Draw `text` with its top at `y`; the baseline sits one font size
    /// below.
    fn draw_text(
        &mut self,
        text: &str,
        family: &str,
        x: i32,
        y: i32,
        font_size: i32,
        color: Color,
    ) -> Result<()> {
        let font = self.fonts.resolve(family)?;
        if x >= self.canvas.width() as i32 || y >= self.canvas.height() as i32 {
            return Ok(());
        }
        let mut px = font_size as f32 * self.options.dpi / DEFAULT_DPI;
        if px > MAX_GLYPH_PX {
            warn_once("raster", &format!("glyphs above {MAX_GLYPH_PX}px are drawn at {MAX_GLYPH_PX}px"));
            px = MAX_GLYPH_PX;
        }
        let baseline = y.saturating_add(px.round() as i32);
        let mut pen_x = x as f32;

        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            if ch != ' ' && font.lookup_glyph_index(ch) == 0 {
                warn_once("raster", &format!("no glyph for {ch:?} in font-family '{family}'"));
            }
            let (metrics, bitmap) = font.rasterize(ch, px);
            let glyph_x = (pen_x.round() as i32).saturating_add(metrics.xmin);
            let glyph_y = baseline
                .saturating_sub(metrics.ymin)
                .saturating_sub(metrics.height as i32);

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage > 0 {
                        let (px_x, px_y) = (glyph_x.saturating_add(gx as i32), glyph_y.saturating_add(gy as i32));
                        blend_pixel(&mut self.canvas, px_x, px_y, color, coverage);
                    }
                }
            }
            self.glyphs += 1;
            pen_x += metrics.advance_width;
        }
        Ok(())
    }
}

/// [§ 8.5.3 Border style](https://www.w3.org/TR/CSS2/box.html#border-style-properties)
///
/// Every visible style paints as `solid`.
fn is_painted_border(line_style: &str) -> bool {
    let line_style = line_style.trim();
    !line_style.is_empty()
        && !line_style.eq_ignore_ascii_case("none")
        && !line_style.eq_ignore_ascii_case("hidden")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_row_moves_below_tallest() {
        let mut cursor = DrawCursor::at(&Rect::new(5, 0, 100, 0));
        cursor.x = 40;
        cursor.extend_row(19);
        cursor.extend_row(29);
        cursor.close_row();
        assert_eq!((cursor.x, cursor.y, cursor.row_bottom), (5, 30, None));

        // An empty row only returns to the left edge
        cursor.x = 60;
        cursor.close_row();
        assert_eq!((cursor.x, cursor.y), (5, 30));
    }

    #[test]
    fn test_enter_reaches_content_origin() {
        let node = LayoutBox {
            kind: NodeKind::Element,
            tag_name: "div".to_string(),
            class: String::new(),
            style: wombat_css::Style::default(),
            outer: Rect::new(0, 0, 50, 50),
            container: Rect::new(3, 4, 47, 46),
            inner: Rect::new(8, 10, 42, 40),
            payload: Payload::None,
            children: Vec::new(),
        };
        let inner = DrawCursor::at(&node.outer).enter(&node);
        assert_eq!((inner.x, inner.y, inner.left), (8, 10, 8));
        assert_eq!(inner.row_bottom, None);
    }

    #[test]
    fn test_border_styles() {
        assert!(is_painted_border("solid"));
        assert!(is_painted_border("dashed"));
        assert!(!is_painted_border("none"));
        assert!(!is_painted_border("Hidden"));
        assert!(!is_painted_border(""));
    }

    #[test]
    fn test_oversized_canvas_is_rejected() {
        let rect = Rect::new(0, 0, i32::MAX, 0);
        let tree = BoxTree {
            root: LayoutBox {
                kind: NodeKind::Element,
                tag_name: "body".to_string(),
                class: String::new(),
                style: wombat_css::Style {
                    background_color: "red".to_string(),
                    ..wombat_css::Style::default()
                },
                outer: rect,
                container: rect,
                inner: rect,
                payload: Payload::None,
                children: Vec::new(),
            },
            width: u32::MAX,
            height: 1,
        };
        let err = render(&tree, &FontRegistry::new(), &RenderOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            wombat_common::Error::TooLarge {
                width: 4_294_967_295,
                height: 1
            }
        ));
    }
}
