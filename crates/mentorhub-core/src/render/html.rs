//! HTML serialization of a rendered tree.
//!
//! Every text run and attribute value is escaped. Math is emitted as a
//! `span.math` carrying escaped TeX for client-side KaTeX.

use mentorhub_types::render::{Alignment, CodeSpan, ElementKind, RenderedNode};

pub fn to_html(node: &RenderedNode) -> String {
    let mut out = String::new();
    write_node(node, false, &mut out);
    out
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn write_children(children: &[RenderedNode], in_head: bool, out: &mut String) {
    for child in children {
        write_node(child, in_head, out);
    }
}

fn write_node(node: &RenderedNode, in_head: bool, out: &mut String) {
    match node {
        RenderedNode::Text { text } => out.push_str(&escape_html(text)),
        RenderedNode::InlineCode { code } => {
            out.push_str("<code>");
            out.push_str(&escape_html(code));
            out.push_str("</code>");
        }
        RenderedNode::CodeBlock {
            language, lines, ..
        } => {
            match language {
                Some(lang) => {
                    out.push_str("<pre><code class=\"language-");
                    out.push_str(&escape_html(lang));
                    out.push_str("\">");
                }
                None => out.push_str("<pre><code>"),
            }
            for (index, line) in lines.iter().enumerate() {
                if index > 0 {
                    out.push('\n');
                }
                for span in line {
                    write_code_span(span, out);
                }
            }
            out.push_str("</code></pre>");
        }
        RenderedNode::Math { display, tex } => {
            let class = if *display { "math math-display" } else { "math math-inline" };
            out.push_str("<span class=\"");
            out.push_str(class);
            out.push_str("\">");
            out.push_str(&escape_html(tex));
            out.push_str("</span>");
        }
        RenderedNode::TaskMarker { checked } => {
            if *checked {
                out.push_str("<input type=\"checkbox\" disabled checked /> ");
            } else {
                out.push_str("<input type=\"checkbox\" disabled /> ");
            }
        }
        RenderedNode::SoftBreak => out.push('\n'),
        RenderedNode::HardBreak => out.push_str("<br />"),
        RenderedNode::Rule => out.push_str("<hr />"),
        RenderedNode::Element { kind, children } => write_element(kind, children, in_head, out),
    }
}

fn write_element(kind: &ElementKind, children: &[RenderedNode], in_head: bool, out: &mut String) {
    let wrap = |out: &mut String, tag: &str, children: &[RenderedNode]| {
        out.push('<');
        out.push_str(tag);
        out.push('>');
        write_children(children, in_head, out);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    };

    match kind {
        ElementKind::Document => write_children(children, in_head, out),
        ElementKind::Paragraph => wrap(out, "p", children),
        ElementKind::Heading { level } => {
            let tag = format!("h{}", (*level).clamp(1, 6));
            wrap(out, &tag, children);
        }
        ElementKind::BlockQuote => wrap(out, "blockquote", children),
        ElementKind::List { ordered: false, .. } => wrap(out, "ul", children),
        ElementKind::List {
            ordered: true,
            start,
        } => match start {
            Some(n) if *n != 1 => {
                out.push_str(&format!("<ol start=\"{n}\">"));
                write_children(children, in_head, out);
                out.push_str("</ol>");
            }
            _ => wrap(out, "ol", children),
        },
        ElementKind::ListItem => wrap(out, "li", children),
        ElementKind::Table => wrap(out, "table", children),
        ElementKind::TableHead => {
            out.push_str("<thead><tr>");
            write_children(children, true, out);
            out.push_str("</tr></thead>");
        }
        ElementKind::TableRow => {
            out.push_str("<tr>");
            write_children(children, false, out);
            out.push_str("</tr>");
        }
        ElementKind::TableCell { alignment } => {
            let tag = if in_head { "th" } else { "td" };
            out.push('<');
            out.push_str(tag);
            if let Some(align) = alignment_css(*alignment) {
                out.push_str(" style=\"text-align: ");
                out.push_str(align);
                out.push('"');
            }
            out.push('>');
            write_children(children, in_head, out);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        ElementKind::Emphasis => wrap(out, "em", children),
        ElementKind::Strong => wrap(out, "strong", children),
        ElementKind::Strikethrough => wrap(out, "del", children),
        ElementKind::Link { href, title } => {
            out.push_str("<a href=\"");
            out.push_str(&escape_html(href));
            out.push('"');
            if let Some(title) = title {
                out.push_str(" title=\"");
                out.push_str(&escape_html(title));
                out.push('"');
            }
            out.push('>');
            write_children(children, in_head, out);
            out.push_str("</a>");
        }
        ElementKind::Image { src, title } => {
            let alt = super::plain::to_plain_text(&RenderedNode::element(
                ElementKind::Document,
                children.to_vec(),
            ));
            out.push_str("<img src=\"");
            out.push_str(&escape_html(src));
            out.push_str("\" alt=\"");
            out.push_str(&escape_html(&alt));
            out.push('"');
            if let Some(title) = title {
                out.push_str(" title=\"");
                out.push_str(&escape_html(title));
                out.push('"');
            }
            out.push_str(" />");
        }
        ElementKind::Semantic { class } => {
            out.push_str("<span class=\"");
            out.push_str(class.as_class());
            out.push_str("\">");
            write_children(children, in_head, out);
            out.push_str("</span>");
        }
    }
}

fn write_code_span(span: &CodeSpan, out: &mut String) {
    let text = escape_html(&span.text);
    let Some(style) = span.style else {
        out.push_str(&text);
        return;
    };
    out.push_str("<span style=\"color: ");
    out.push_str(&style.foreground.to_hex());
    if style.bold {
        out.push_str("; font-weight: bold");
    }
    if style.italic {
        out.push_str("; font-style: italic");
    }
    if style.underline {
        out.push_str("; text-decoration: underline");
    }
    out.push_str("\">");
    out.push_str(&text);
    out.push_str("</span>");
}

fn alignment_css(alignment: Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render, render_fragment};

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_markdown_html_escapes_raw_html() {
        let html = to_html(&render("hi <img src=x onerror=alert(1)>"));
        assert_eq!(html, "<p>hi &lt;img src=x onerror=alert(1)&gt;</p>");
    }

    #[test]
    fn test_fragment_html_keeps_semantic_spans() {
        let html = to_html(&render_fragment(
            "<p><span class=\"definition\">Overfitting</span><script>x</script></p>",
        ));
        assert_eq!(
            html,
            "<p><span class=\"definition\">Overfitting</span>&lt;script&gt;x&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn test_math_html() {
        let html = to_html(&render("$a<b$"));
        assert_eq!(html, "<p><span class=\"math math-inline\">a&lt;b</span></p>");
    }

    #[test]
    fn test_highlighted_code_html_uses_inline_colors() {
        let html = to_html(&render("```python\nx = 1\n```"));
        assert!(html.starts_with("<pre><code class=\"language-python\">"));
        assert!(html.contains("<span style=\"color: #"));
        assert!(html.ends_with("</code></pre>"));
    }

    #[test]
    fn test_plain_code_html() {
        let html = to_html(&render("```\n<b>\n```"));
        assert_eq!(html, "<pre><code>&lt;b&gt;</code></pre>");
    }

    #[test]
    fn test_table_html() {
        let html = to_html(&render("| h |\n|:-:|\n| c |"));
        assert_eq!(
            html,
            "<table><thead><tr><th style=\"text-align: center\">h</th></tr></thead><tr><td style=\"text-align: center\">c</td></tr></table>"
        );
    }

    #[test]
    fn test_link_html() {
        let html = to_html(&render("[docs](https://example.com \"Docs\")"));
        assert_eq!(
            html,
            "<p><a href=\"https://example.com\" title=\"Docs\">docs</a></p>"
        );
    }
}
