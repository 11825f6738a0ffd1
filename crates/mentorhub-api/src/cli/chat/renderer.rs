//! Terminal rendering of the structured content tree.
//!
//! `ChatRenderer` walks a [`RenderedNode`] and produces styled terminal
//! text with `console` styles. Code blocks arrive already highlighted; their
//! span colours are replayed through syntect's 24-bit escape helper.

use console::style;
use syntect::highlighting::{Color, FontStyle, Style};
use syntect::util::as_24_bit_terminal_escaped;

use mentorhub_types::render::{CodeSpan, ElementKind, RenderedNode, SemanticKind, SpanStyle};

/// Terminal renderer for rendered message content.
#[derive(Debug, Clone)]
pub struct ChatRenderer {
    indent: String,
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatRenderer {
    pub fn new() -> Self {
        Self {
            indent: "  ".to_string(),
        }
    }

    /// Render a whole tree, indenting every line.
    pub fn render(&self, node: &RenderedNode) -> String {
        let mut out = String::new();
        self.block(node, &mut out);
        let body = out.trim_end();
        body.lines()
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{}{line}", self.indent)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn block(&self, node: &RenderedNode, out: &mut String) {
        match node {
            RenderedNode::Element { kind, children } => match kind {
                ElementKind::Document => {
                    for child in children {
                        self.block(child, out);
                    }
                }
                ElementKind::Paragraph => {
                    out.push_str(&self.inlines(children));
                    out.push_str("\n\n");
                }
                ElementKind::Heading { level } => {
                    let text = self.inlines(children);
                    let styled = if *level <= 2 {
                        style(text).cyan().bold().underlined().to_string()
                    } else {
                        style(text).cyan().bold().to_string()
                    };
                    out.push_str(&styled);
                    out.push_str("\n\n");
                }
                ElementKind::BlockQuote => {
                    let mut inner = String::new();
                    for child in children {
                        self.block(child, &mut inner);
                    }
                    for line in inner.trim_end().lines() {
                        out.push_str(&format!("{} {}\n", style("│").dim(), line));
                    }
                    out.push('\n');
                }
                ElementKind::List { ordered, start } => {
                    self.list(*ordered, start.unwrap_or(1), children, out);
                    out.push('\n');
                }
                ElementKind::Table => {
                    for row in children {
                        let is_head = matches!(
                            row,
                            RenderedNode::Element {
                                kind: ElementKind::TableHead,
                                ..
                            }
                        );
                        let cells: Vec<String> =
                            row.children().iter().map(|c| self.inlines(c.children())).collect();
                        let line = cells.join(&format!(" {} ", style("│").dim()));
                        if is_head {
                            out.push_str(&style(line).bold().to_string());
                        } else {
                            out.push_str(&line);
                        }
                        out.push('\n');
                    }
                    out.push('\n');
                }
                // Inline containers at block level
                _ => {
                    out.push_str(&self.inline(node));
                    out.push_str("\n\n");
                }
            },
            RenderedNode::CodeBlock {
                language, lines, ..
            } => {
                out.push_str(&self.code_block(language.as_deref(), lines));
                out.push('\n');
            }
            RenderedNode::Math { display: true, tex } => {
                out.push_str(&style(tex).italic().to_string());
                out.push_str("\n\n");
            }
            RenderedNode::Rule => {
                out.push_str(&style("─".repeat(40)).dim().to_string());
                out.push_str("\n\n");
            }
            other => {
                out.push_str(&self.inline(other));
                out.push('\n');
            }
        }
    }

    fn list(&self, ordered: bool, start: u64, items: &[RenderedNode], out: &mut String) {
        for (index, item) in items.iter().enumerate() {
            let marker = if ordered {
                format!("{}.", start + index as u64)
            } else {
                "•".to_string()
            };
            let pad = " ".repeat(marker.chars().count() + 1);

            let mut inner = String::new();
            let mut inline_run = Vec::new();
            for child in item.children() {
                if is_inline(child) {
                    inline_run.push(child.clone());
                } else {
                    if !inline_run.is_empty() {
                        inner.push_str(&self.inlines(&inline_run));
                        inner.push('\n');
                        inline_run.clear();
                    }
                    self.block(child, &mut inner);
                }
            }
            if !inline_run.is_empty() {
                inner.push_str(&self.inlines(&inline_run));
                inner.push('\n');
            }

            let mut lines = inner.trim_end().lines().filter(|l| !l.trim().is_empty());
            let first = lines.next().unwrap_or_default();
            out.push_str(&format!("{} {first}\n", style(&marker).cyan()));
            for line in lines {
                out.push_str(&format!("{pad}{line}\n"));
            }
        }
    }

    fn inlines(&self, nodes: &[RenderedNode]) -> String {
        nodes.iter().map(|n| self.inline(n)).collect()
    }

    fn inline(&self, node: &RenderedNode) -> String {
        match node {
            RenderedNode::Text { text } => text.clone(),
            RenderedNode::InlineCode { code } => style(code).yellow().to_string(),
            RenderedNode::Math { tex, .. } => style(tex).italic().to_string(),
            RenderedNode::TaskMarker { checked: true } => format!("{} ", style("[x]").green()),
            RenderedNode::TaskMarker { checked: false } => "[ ] ".to_string(),
            RenderedNode::SoftBreak => " ".to_string(),
            RenderedNode::HardBreak => "\n".to_string(),
            RenderedNode::Rule => style("─".repeat(40)).dim().to_string(),
            RenderedNode::CodeBlock {
                language, lines, ..
            } => self.code_block(language.as_deref(), lines),
            RenderedNode::Element { kind, children } => {
                let text = self.inlines(children);
                match kind {
                    ElementKind::Emphasis => style(text).italic().to_string(),
                    ElementKind::Strong => style(text).bold().to_string(),
                    ElementKind::Strikethrough => style(text).strikethrough().to_string(),
                    ElementKind::Link { href, .. } => {
                        if text == *href {
                            style(text).blue().underlined().to_string()
                        } else {
                            format!("{} ({})", style(text).underlined(), style(href).blue())
                        }
                    }
                    ElementKind::Image { src, .. } => {
                        format!("[image: {text}] ({})", style(src).blue())
                    }
                    ElementKind::Semantic { class } => semantic(*class, text),
                    _ => text,
                }
            }
        }
    }

    fn code_block(&self, language: Option<&str>, lines: &[Vec<CodeSpan>]) -> String {
        let mut output = String::new();
        let label = language.unwrap_or("code");
        output.push_str(&format!("{}\n", style(format!("--- {label} ---")).dim()));
        for line in lines {
            for span in line {
                match span.style {
                    Some(span_style) => {
                        let ranges = [(to_syntect_style(span_style), span.text.as_str())];
                        output.push_str(&as_24_bit_terminal_escaped(&ranges, false));
                    }
                    None => output.push_str(&span.text),
                }
            }
            output.push_str("\x1b[0m\n");
        }
        output
    }
}

fn is_inline(node: &RenderedNode) -> bool {
    match node {
        RenderedNode::Element { kind, .. } => matches!(
            kind,
            ElementKind::Emphasis
                | ElementKind::Strong
                | ElementKind::Strikethrough
                | ElementKind::Link { .. }
                | ElementKind::Image { .. }
                | ElementKind::Semantic { .. }
        ),
        RenderedNode::CodeBlock { .. } | RenderedNode::Rule => false,
        RenderedNode::Math { display, .. } => !display,
        _ => true,
    }
}

fn semantic(class: SemanticKind, text: String) -> String {
    match class {
        SemanticKind::Definition => style(text).yellow().bold().to_string(),
        SemanticKind::Example => style(text).green().to_string(),
        SemanticKind::Tip => format!("{} {}", style("tip:").magenta().bold(), style(text).magenta()),
    }
}

fn to_syntect_style(span: SpanStyle) -> Style {
    let mut font_style = FontStyle::empty();
    if span.bold {
        font_style.insert(FontStyle::BOLD);
    }
    if span.italic {
        font_style.insert(FontStyle::ITALIC);
    }
    if span.underline {
        font_style.insert(FontStyle::UNDERLINE);
    }
    Style {
        foreground: Color {
            r: span.foreground.r,
            g: span.foreground.g,
            b: span.foreground.b,
            a: 0xff,
        },
        background: Color::BLACK,
        font_style,
    }
}

#[cfg(test)]
mod tests {
    use mentorhub_core::render::{render, render_fragment};
    use mentorhub_types::render::Rgb;

    use super::*;

    fn plain(node: &RenderedNode) -> String {
        console::set_colors_enabled(false);
        ChatRenderer::new().render(node)
    }

    #[test]
    fn test_paragraphs_and_headings_are_indented() {
        let out = plain(&render("# Title\n\nSome **bold** text."));
        assert_eq!(out, "  Title\n\n  Some bold text.");
    }

    #[test]
    fn test_lists_get_markers() {
        let out = plain(&render("- one\n- two\n\n3. three\n4. four"));
        assert!(out.contains("• one"));
        assert!(out.contains("• two"));
        assert!(out.contains("3. three"));
        assert!(out.contains("4. four"));
    }

    #[test]
    fn test_link_shows_target() {
        let out = plain(&render("[docs](https://example.com)"));
        assert!(out.contains("docs (https://example.com)"));
    }

    #[test]
    fn test_semantic_tip_is_labelled() {
        let out = plain(&render_fragment("<p><span class=\"tip\">Practice daily</span></p>"));
        assert!(out.contains("tip: Practice daily"));
    }

    #[test]
    fn test_code_block_replays_span_colours() {
        let node = RenderedNode::CodeBlock {
            language: Some("python".to_string()),
            highlighted: true,
            lines: vec![vec![
                CodeSpan {
                    text: "import".to_string(),
                    style: Some(SpanStyle {
                        foreground: Rgb { r: 180, g: 142, b: 173 },
                        bold: false,
                        italic: false,
                        underline: false,
                    }),
                },
                CodeSpan::plain(" os"),
            ]],
        };
        let out = ChatRenderer::new().render(&node);
        assert!(out.contains("--- python ---"));
        assert!(out.contains("\x1b[38;2;180;142;173mimport"));
        assert!(out.contains(" os"));
    }
}
