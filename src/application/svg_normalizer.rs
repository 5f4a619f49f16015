// SVG normalizer - Sanitizes fetched SVG so theme CSS can take over
use crate::domain::error::GraphError;
use regex::Regex;
use roxmltree::{Document, Node, ParsingOptions};
use std::sync::LazyLock;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Elements dropped entirely: embedded presentation rules and filter effects
const STRIPPED_ELEMENTS: &[&str] = &["style", "filter"];

static WHITE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(#fff|#ffffff|white|rgb\(\s*255\s*,\s*255\s*,\s*255\s*\))\s*$")
        .expect("white color pattern")
});

static WHITE_FILL_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(^|;)\s*fill\s*:\s*(#fff|#ffffff|white|rgb\(\s*255\s*,\s*255\s*,\s*255\s*\))\s*(!important\s*)?(;|$)",
    )
    .expect("white fill declaration pattern")
});

static FILL_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|;)\s*fill\s*:\s*[^;]+;?").expect("fill declaration pattern")
});

/// Sanitize SVG markup:
/// - synthesize a `viewBox` from numeric `width`/`height` when missing
/// - drop `<style>` and `<filter>` elements and every `filter` attribute
/// - turn opaque white `<rect>` fills into `fill="none"`
/// - force `background` on the first element inside each `<foreignObject>`
///
/// The first `svg` element of the document is the output root. Running the
/// result through again yields the same bytes.
pub fn normalize_svg(source: &str, background: &str) -> Result<String, GraphError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(source, options).map_err(|e| {
        tracing::debug!("SVG parse failed: {}", e);
        GraphError::InvalidSvgContent
    })?;

    let root = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "svg")
        .ok_or(GraphError::InvalidSvgContent)?;

    let mut writer = SvgWriter {
        out: String::with_capacity(source.len()),
        background_declaration: format!("background:{} !important;", background),
    };
    writer.write_element(root, None, true, false);

    Ok(writer.out)
}

/// Case-insensitive, whitespace tolerant check for the four white spellings
pub fn is_white(value: &str) -> bool {
    WHITE_VALUE.is_match(value)
}

struct SvgWriter {
    out: String,
    background_declaration: String,
}

impl SvgWriter {
    fn write_element(&mut self, node: Node, parent: Option<Node>, is_root: bool, patch_background: bool) {
        let tag = element_name(node);
        self.out.push('<');
        self.out.push_str(&tag);

        for ns in node.namespaces() {
            if ns.name() == Some("xml") {
                continue;
            }
            let inherited = parent
                .map(|p| p.namespaces().any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri()))
                .unwrap_or(false);
            if inherited {
                continue;
            }
            match ns.name() {
                Some(prefix) => self.write_attribute(&format!("xmlns:{}", prefix), ns.uri()),
                None => self.write_attribute("xmlns", ns.uri()),
            }
        }

        let mut attributes: Vec<(String, String)> = node
            .attributes()
            .filter(|a| !(a.namespace().is_none() && a.name() == "filter"))
            .map(|a| (attribute_name(node, a.namespace(), a.name()), a.value().to_string()))
            .collect();

        if is_root {
            ensure_view_box(&mut attributes);
        }
        if node.tag_name().name() == "rect" {
            neutralize_white_fill(&mut attributes);
        }
        if patch_background {
            self.force_background(&mut attributes);
        }

        for (name, value) in &attributes {
            self.write_attribute(name, value);
        }

        let children: Vec<Node> = node
            .children()
            .filter(|c| c.is_text() || c.is_comment() || (c.is_element() && !is_stripped(*c)))
            .collect();

        if children.is_empty() {
            self.out.push_str("/>");
            return;
        }

        self.out.push('>');
        let is_foreign_object = node.tag_name().name() == "foreignObject";
        let mut patched = false;
        for child in children {
            if child.is_element() {
                let patch = is_foreign_object && !patched;
                patched = patched || patch;
                self.write_element(child, Some(node), false, patch);
            } else if child.is_comment() {
                self.out.push_str("<!--");
                self.out.push_str(child.text().unwrap_or_default());
                self.out.push_str("-->");
            } else if let Some(text) = child.text() {
                self.out.push_str(&escape_text(text));
            }
        }
        self.out.push_str("</");
        self.out.push_str(&tag);
        self.out.push('>');
    }

    fn write_attribute(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        self.out.push_str(&escape_attribute(value));
        self.out.push('"');
    }

    fn force_background(&self, attributes: &mut Vec<(String, String)>) {
        match attributes.iter_mut().find(|(name, _)| name == "style") {
            Some((_, style)) => {
                if !style.contains(&self.background_declaration) {
                    *style = format!("{};{}", style, self.background_declaration);
                }
            }
            None => attributes.push(("style".to_string(), format!(";{}", self.background_declaration))),
        }
    }
}

fn is_stripped(node: Node) -> bool {
    STRIPPED_ELEMENTS.contains(&node.tag_name().name())
}

fn ensure_view_box(attributes: &mut Vec<(String, String)>) {
    if attributes.iter().any(|(name, _)| name == "viewBox") {
        return;
    }

    let dimension = |key: &str| {
        attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.trim().trim_end_matches("px").trim().to_string())
            .filter(|value| value.parse::<f64>().is_ok())
    };

    if let (Some(width), Some(height)) = (dimension("width"), dimension("height")) {
        attributes.push(("viewBox".to_string(), format!("0 0 {} {}", width, height)));
    }
}

fn neutralize_white_fill(attributes: &mut Vec<(String, String)>) {
    let fill_is_white = attributes
        .iter()
        .any(|(name, value)| name == "fill" && is_white(value));
    let style = attributes
        .iter()
        .find(|(name, _)| name == "style")
        .map(|(_, value)| value.clone());
    let style_is_white = style
        .as_deref()
        .map(|s| WHITE_FILL_DECLARATION.is_match(s))
        .unwrap_or(false);

    if !fill_is_white && !style_is_white {
        return;
    }

    match attributes.iter_mut().find(|(name, _)| name == "fill") {
        Some((_, value)) => *value = "none".to_string(),
        None => attributes.push(("fill".to_string(), "none".to_string())),
    }

    if let Some(style) = style {
        let stripped = FILL_DECLARATION.replace_all(&style, "${1}").into_owned();
        if stripped.trim().trim_matches(';').trim().is_empty() {
            attributes.retain(|(name, _)| name != "style");
        } else if let Some((_, value)) = attributes.iter_mut().find(|(name, _)| name == "style") {
            *value = stripped;
        }
    }
}

fn element_name(node: Node) -> String {
    let local = node.tag_name().name();
    let Some(uri) = node.tag_name().namespace() else {
        return local.to_string();
    };

    // A default namespace binding wins over a prefixed one for the same URI
    if node.namespaces().any(|ns| ns.name().is_none() && ns.uri() == uri) {
        return local.to_string();
    }
    match node.namespaces().find(|ns| ns.uri() == uri).and_then(|ns| ns.name()) {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}

fn attribute_name(node: Node, namespace: Option<&str>, local: &str) -> String {
    let Some(uri) = namespace else {
        return local.to_string();
    };
    if uri == XML_NAMESPACE {
        return format!("xml:{}", local);
    }
    match node
        .namespaces()
        .find(|ns| ns.name().is_some() && ns.uri() == uri)
        .and_then(|ns| ns.name())
    {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\t', "&#9;")
}
