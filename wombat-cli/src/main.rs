//! Wombat CLI
//!
//! Render an HTML document and its stylesheet to an image file.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use wombat_common::ErrorKind;
use wombat_common::net::fetch_resource;
use wombat_css::{LayoutBox, LayoutContext, Rule, Style, layout_document, parse_rules, rules_from_json};
use wombat_render::html::{extract_style_content, parse_html};
use wombat_render::{
    DEFAULT_DPI, DEFAULT_QUALITY, FontRegistry, ImageLoader, RenderOptions, render_tree, save,
};

/// Wombat - render restricted HTML and CSS to an image
#[derive(Parser, Debug)]
#[command(name = "wombat")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Render a card 600px wide
    wombat card.html --width 600 -o card.jpg

    # Add a stylesheet and a font
    wombat card.html --css theme.css --font "Inter=fonts/Inter.ttf" -o card.jpg

    # Print the box tree instead of rendering
    wombat --html '<body><p>Hi</p></body>' --width 200 --layout
"#)]
struct Cli {
    /// Path or URL of the HTML document
    #[arg(value_name = "FILE|URL", required_unless_present = "html")]
    path: Option<String>,

    /// Render an HTML string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Stylesheet to apply before the document's own <style> rules
    #[arg(long = "css", value_name = "FILE")]
    stylesheets: Vec<PathBuf>,

    /// JSON rule list: [{"selector": "...", "style": {...}}]
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Register a font as FAMILY=PATH (repeatable)
    #[arg(long = "font", value_name = "FAMILY=PATH", value_parser = parse_font)]
    fonts: Vec<(String, PathBuf)>,

    /// Family used for text without font-family (default: first --font)
    #[arg(long, value_name = "FAMILY")]
    default_font: Option<String>,

    /// Body width in pixels, overridden by any body width rule
    #[arg(long)]
    width: Option<u32>,

    /// Rendering resolution
    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: f32,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = DEFAULT_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Deepest element nesting accepted
    #[arg(long, default_value_t = wombat_css::layout::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Output file; the extension picks the format
    #[arg(short, long, default_value = "out.jpg")]
    output: PathBuf,

    /// Print the box tree instead of rendering
    #[arg(long)]
    layout: bool,

    /// Log debug events
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            for cause in err.chain().skip(1) {
                eprintln!("  {} {cause}", "caused by:".yellow());
            }
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let (html, base) = load_html(cli)?;
    let rules = load_rules(cli)?;
    let images = ImageLoader::new(base.as_deref());
    let ctx = LayoutContext::new(&images).with_max_depth(cli.max_depth);
    let tree = parse_html(&html);

    if cli.layout {
        let mut all_rules = rules;
        all_rules.extend(parse_rules(&extract_style_content(&tree)).context("in <style>")?);
        let boxes = layout_document(&tree, &all_rules, &ctx)?;
        println!("canvas {}x{}", boxes.width, boxes.height);
        print_layout(&boxes.root, 0);
        return Ok(());
    }

    let fonts = load_fonts(cli)?;
    let options = RenderOptions {
        dpi: cli.dpi,
        ..RenderOptions::default()
    };
    let image = render_tree(&tree, &rules, &fonts, &ctx, &options)?;
    save(&image, &cli.output, cli.quality)?;
    println!(
        "Rendered {}x{} to {}",
        image.width(),
        image.height(),
        cli.output.display().green()
    );
    Ok(())
}

/// The document and the location relative sources resolve against.
fn load_html(cli: &Cli) -> Result<(String, Option<String>)> {
    if let Some(html) = &cli.html {
        return Ok((html.clone(), None));
    }
    let Some(path) = &cli.path else {
        anyhow::bail!("no document given; pass a path, a URL or --html");
    };
    let bytes = fetch_resource(path).with_context(|| format!("reading {path}"))?;
    Ok((String::from_utf8_lossy(&bytes).into_owned(), Some(path.clone())))
}

/// `--width` first, then stylesheets in order, then the JSON rules.
fn load_rules(cli: &Cli) -> Result<Vec<Rule>> {
    let mut rules = Vec::new();
    if let Some(width) = cli.width {
        rules.push(Rule::new(
            "body",
            Style {
                width: format!("{width}px"),
                ..Style::default()
            },
        ));
    }
    for path in &cli.stylesheets {
        let css = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        rules.extend(parse_rules(&css).with_context(|| format!("in {}", path.display()))?);
    }
    if let Some(path) = &cli.rules {
        let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        rules.extend(rules_from_json(&json).with_context(|| format!("in {}", path.display()))?);
    }
    Ok(rules)
}

fn load_fonts(cli: &Cli) -> Result<FontRegistry> {
    let mut fonts = if cli.fonts.is_empty() {
        FontRegistry::with_system_font()
    } else {
        FontRegistry::new()
    };
    for (family, path) in &cli.fonts {
        fonts.register_file(family, path)?;
    }
    if let Some(family) = &cli.default_font {
        fonts.set_default(family)?;
    }
    tracing::debug!(?fonts, "font registry ready");
    Ok(fonts)
}

fn parse_font(value: &str) -> std::result::Result<(String, PathBuf), String> {
    let (family, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected FAMILY=PATH, got '{value}'"))?;
    if family.trim().is_empty() || path.trim().is_empty() {
        return Err(format!("expected FAMILY=PATH, got '{value}'"));
    }
    Ok((family.trim().to_string(), PathBuf::from(path.trim())))
}

/// Exit status by error kind: 2 configuration, 3 input, 4 environment.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<wombat_common::Error>())
        .map_or(1, |err| match err.kind() {
            ErrorKind::Config => 2,
            ErrorKind::Input => 3,
            ErrorKind::Environment => 4,
        })
}

fn print_layout(layout_box: &LayoutBox, depth: usize) {
    let indent = "  ".repeat(depth);
    let r = |rect: wombat_css::Rect| format!("({},{})-({},{})", rect.x1, rect.y1, rect.x2, rect.y2);
    if let Some(text) = layout_box.text() {
        println!("{indent}{} {:?}", r(layout_box.inner).dimmed(), text);
        return;
    }
    let mut label = layout_box.tag_name.clone();
    for class in layout_box.class.split_whitespace() {
        label.push('.');
        label.push_str(class);
    }
    println!(
        "{indent}{} outer={} container={} inner={}",
        label.cyan(),
        r(layout_box.outer),
        r(layout_box.container),
        r(layout_box.inner)
    );
    for child in &layout_box.children {
        print_layout(child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_font() {
        assert_eq!(
            parse_font("Inter = fonts/Inter.ttf").unwrap(),
            ("Inter".to_string(), PathBuf::from("fonts/Inter.ttf"))
        );
        assert!(parse_font("Inter").is_err());
        assert!(parse_font("=x.ttf").is_err());
    }

    #[test]
    fn test_width_rule_comes_first() {
        let cli = Cli::parse_from(["wombat", "--html", "<p></p>", "--width", "320"]);
        let rules = load_rules(&cli).unwrap();
        assert_eq!(rules[0].selector, "body");
        assert_eq!(rules[0].style.width, "320px");
    }

    #[test]
    fn test_exit_codes() {
        let err = anyhow::Error::new(wombat_common::Error::MissingBodyWidth);
        assert_eq!(exit_code(&err), 2);
        let err = anyhow::Error::new(wombat_common::Error::MalformedColor {
            value: "#zz".to_string(),
        })
        .context("rendering");
        assert_eq!(exit_code(&err), 3);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }
}
