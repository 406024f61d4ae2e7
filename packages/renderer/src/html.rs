//! HTML serialisation of rendered documents

use crate::vdom::{RenderedDocument, VNode};
use blockwork_style::{css_property_name, to_css_text};

/// Options for HTML output
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
    /// Wrap in a complete `<!DOCTYPE html>` page with a `<style>` head
    pub full_page: bool,
    pub title: String,
    pub lang: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ".to_string(),
            full_page: false,
            title: String::new(),
            lang: "en".to_string(),
        }
    }
}

impl HtmlOptions {
    pub fn page(title: impl Into<String>) -> Self {
        Self {
            pretty: true,
            full_page: true,
            title: title.into(),
            ..Self::default()
        }
    }
}

struct Context<'o> {
    options: &'o HtmlOptions,
    depth: usize,
    buffer: String,
}

impl<'o> Context<'o> {
    fn new(options: &'o HtmlOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        self.newline();
    }

    fn newline(&mut self) {
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Compact HTML fragment of the document's nodes
pub fn to_html(document: &RenderedDocument) -> String {
    to_html_with(document, &HtmlOptions::default())
}

pub fn to_html_with(document: &RenderedDocument, options: &HtmlOptions) -> String {
    let mut ctx = Context::new(options);

    if options.full_page {
        ctx.add_line("<!DOCTYPE html>");
        ctx.add_line(&format!("<html lang=\"{}\">", escape_html(&options.lang)));
        ctx.indent();
        write_head(document, &mut ctx);
        ctx.add_line("<body>");
        ctx.indent();
    }

    for node in &document.nodes {
        write_node(node, &mut ctx, false);
    }

    if options.full_page {
        ctx.dedent();
        ctx.add_line("</body>");
        ctx.dedent();
        ctx.add_line("</html>");
    }

    ctx.get_output()
}

fn write_head(document: &RenderedDocument, ctx: &mut Context<'_>) {
    ctx.add_line("<head>");
    ctx.indent();

    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    let title = format!("<title>{}</title>", escape_html(&ctx.options.title));
    ctx.add_line(&title);

    let css = to_css_text(&document.styles);
    if !css.is_empty() {
        ctx.add_line("<style>");
        ctx.indent();
        for line in css.lines() {
            ctx.add_line(line);
        }
        ctx.dedent();
        ctx.add_line("</style>");
    }

    ctx.dedent();
    ctx.add_line("</head>");
}

/// `inline` nodes are written inside their parent's line
fn write_node(node: &VNode, ctx: &mut Context<'_>, inline: bool) {
    match node {
        VNode::Element {
            tag,
            attributes,
            styles,
            children,
            ..
        } => {
            if ctx.options.pretty && !inline {
                ctx.add_indent();
            }
            ctx.add(&format!("<{}", tag));

            for (name, value) in attributes {
                ctx.add(&format!(" {}=\"{}\"", name, escape_html(value)));
            }

            if !styles.is_empty() {
                let css = styles
                    .iter()
                    .map(|(k, v)| format!("{}: {}", css_property_name(k), v))
                    .collect::<Vec<_>>()
                    .join("; ");
                ctx.add(&format!(" style=\"{}\"", escape_html(&css)));
            }

            if children.is_empty() && is_self_closing(tag) {
                ctx.add(" />");
                if !inline {
                    ctx.newline();
                }
                return;
            }

            ctx.add(">");

            let block_children = has_element_children(children);
            if block_children {
                ctx.newline();
                ctx.indent();
            }
            for child in children {
                write_node(child, ctx, !block_children);
            }
            if block_children {
                ctx.dedent();
                if ctx.options.pretty {
                    ctx.add_indent();
                }
            }

            ctx.add(&format!("</{}>", tag));
            if !inline {
                ctx.newline();
            }
        }

        VNode::Text { content } => write_leaf(&escape_html(content), ctx, inline),

        VNode::Comment { content } => {
            write_leaf(&format!("<!-- {} -->", content.replace("--", "- -")), ctx, inline)
        }

        VNode::Raw { html } => write_leaf(html, ctx, inline),

        VNode::Placeholder { message, .. } => write_leaf(
            &format!("<div class=\"bw-placeholder\">{}</div>", escape_html(message)),
            ctx,
            inline,
        ),
    }
}

fn write_leaf(text: &str, ctx: &mut Context<'_>, inline: bool) {
    if inline {
        ctx.add(text);
    } else {
        ctx.add_line(text);
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_self_closing(tag: &str) -> bool {
    matches!(
        tag,
        "img" | "input" | "br" | "hr" | "meta" | "link" | "area" | "base" | "col" | "embed" | "source" | "track" | "wbr"
    )
}

fn has_element_children(children: &[VNode]) -> bool {
    children
        .iter()
        .any(|child| !matches!(child, VNode::Text { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockwork_style::CssRule;
    use std::collections::BTreeMap;

    fn doc(nodes: Vec<VNode>) -> RenderedDocument {
        RenderedDocument { nodes, styles: vec![] }
    }

    #[test]
    fn test_compact_output() {
        let node = VNode::element("p")
            .with_attr("class", "lead")
            .with_style("fontSize", "2rem")
            .with_child(VNode::text("a < b & \"c\""));
        assert_eq!(
            to_html(&doc(vec![node])),
            "<p class=\"lead\" style=\"font-size: 2rem\">a &lt; b &amp; &quot;c&quot;</p>"
        );
    }

    #[test]
    fn test_void_and_raw() {
        let nodes = vec![
            VNode::element("img").with_attr("src", "/a.png"),
            VNode::element("div").with_child(VNode::raw("<b>bold</b>")),
        ];
        assert_eq!(
            to_html(&doc(nodes)),
            "<img src=\"/a.png\" /><div><b>bold</b></div>"
        );
    }

    #[test]
    fn test_placeholder_is_escaped() {
        let node = VNode::placeholder("Missing block: <Foo>", Some("x".into()));
        assert_eq!(
            to_html(&doc(vec![node])),
            "<div class=\"bw-placeholder\">Missing block: &lt;Foo&gt;</div>"
        );
    }

    #[test]
    fn test_pretty_nesting() {
        let node = VNode::element("main").with_child(VNode::element("h1").with_child(VNode::text("Hi")));
        let options = HtmlOptions {
            pretty: true,
            ..HtmlOptions::default()
        };
        assert_eq!(to_html_with(&doc(vec![node]), &options), "<main>\n  <h1>Hi</h1>\n</main>\n");
    }

    #[test]
    fn test_full_page_includes_styles() {
        let mut document = doc(vec![VNode::element("main")]);
        document.styles.push(CssRule {
            selector: ".bw-a".into(),
            media: None,
            properties: BTreeMap::from([("color".to_string(), "red".to_string())]),
        });
        let html = to_html_with(&document, &HtmlOptions::page("Home"));
        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\">\n"));
        assert!(html.contains("<title>Home</title>"));
        assert!(html.contains("<style>"));
        assert!(html.contains(".bw-a"));
        assert!(html.contains("<main></main>"));
    }
}
