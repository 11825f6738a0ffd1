//! Markdown to [`RenderedNode`] tree.
//!
//! Uses pulldown-cmark with GFM tables, strikethrough, task lists and math.
//! Raw HTML in the source is kept as literal text. Links and images with a
//! scheme other than http(s)/mailto are reduced to their text.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

use mentorhub_types::render::{Alignment, ElementKind, RenderedNode};

use super::MAX_NESTING;
use super::highlight::Highlighter;

pub fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_MATH
}

enum FrameKind {
    Element(ElementKind),
    /// Children are spliced into the parent (unsafe links, unknown tags).
    Transparent,
    Code { language: Option<String>, text: String },
}

struct Frame {
    kind: FrameKind,
    children: Vec<RenderedNode>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }
}

struct TreeBuilder<'h> {
    highlighter: &'h Highlighter,
    stack: Vec<Frame>,
    table_alignments: Vec<Alignment>,
    cell_index: usize,
}

impl<'h> TreeBuilder<'h> {
    fn new(highlighter: &'h Highlighter) -> Self {
        Self {
            highlighter,
            stack: vec![Frame::new(FrameKind::Element(ElementKind::Document))],
            table_alignments: Vec::new(),
            cell_index: 0,
        }
    }

    fn push_node(&mut self, node: RenderedNode) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        if let FrameKind::Code { text, .. } = &mut frame.kind {
            // Only text reaches a code block; anything else is flattened.
            match &node {
                RenderedNode::Text { text: raw } => text.push_str(raw),
                other => text.push_str(&super::plain::to_plain_text(other)),
            }
            return;
        }
        push_merged(&mut frame.children, node);
    }

    fn push_text(&mut self, text: &str) {
        self.push_node(RenderedNode::text(text));
    }

    fn start(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => FrameKind::Element(ElementKind::Paragraph),
            Tag::Heading { level, .. } => FrameKind::Element(ElementKind::Heading {
                level: heading_level(level),
            }),
            Tag::BlockQuote { .. } => FrameKind::Element(ElementKind::BlockQuote),
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => FrameKind::Code {
                language: info
                    .split_whitespace()
                    .next()
                    .map(str::to_string),
                text: String::new(),
            },
            Tag::CodeBlock(CodeBlockKind::Indented) => FrameKind::Code {
                language: None,
                text: String::new(),
            },
            Tag::HtmlBlock { .. } => FrameKind::Element(ElementKind::Paragraph),
            Tag::List(start) => FrameKind::Element(ElementKind::List {
                ordered: start.is_some(),
                start,
            }),
            Tag::Item => FrameKind::Element(ElementKind::ListItem),
            Tag::Table(alignments) => {
                self.table_alignments = alignments.into_iter().map(alignment).collect();
                FrameKind::Element(ElementKind::Table)
            }
            Tag::TableHead => {
                self.cell_index = 0;
                FrameKind::Element(ElementKind::TableHead)
            }
            Tag::TableRow => {
                self.cell_index = 0;
                FrameKind::Element(ElementKind::TableRow)
            }
            Tag::TableCell => {
                let alignment = self
                    .table_alignments
                    .get(self.cell_index)
                    .copied()
                    .unwrap_or_default();
                self.cell_index += 1;
                FrameKind::Element(ElementKind::TableCell { alignment })
            }
            Tag::Emphasis => FrameKind::Element(ElementKind::Emphasis),
            Tag::Strong => FrameKind::Element(ElementKind::Strong),
            Tag::Strikethrough => FrameKind::Element(ElementKind::Strikethrough),
            Tag::Link {
                dest_url, title, ..
            } => match is_safe_url(&dest_url) {
                true => FrameKind::Element(ElementKind::Link {
                    href: dest_url.to_string(),
                    title: non_empty(&title),
                }),
                false => FrameKind::Transparent,
            },
            Tag::Image {
                dest_url, title, ..
            } => match is_safe_url(&dest_url) {
                true => FrameKind::Element(ElementKind::Image {
                    src: dest_url.to_string(),
                    title: non_empty(&title),
                }),
                false => FrameKind::Transparent,
            },
            _ => FrameKind::Transparent,
        };
        let kind = match kind {
            FrameKind::Element(_) if self.stack.len() > MAX_NESTING => FrameKind::Transparent,
            kind => kind,
        };
        self.stack.push(Frame::new(kind));
    }

    fn end(&mut self) {
        // The document frame is never popped by an end event.
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame.kind {
            FrameKind::Element(kind) => {
                self.push_node(RenderedNode::Element {
                    kind,
                    children: frame.children,
                });
            }
            FrameKind::Transparent => {
                for child in frame.children {
                    self.push_node(child);
                }
            }
            FrameKind::Code { language, text } => {
                let text = text.strip_suffix('\n').unwrap_or(&text);
                let code = self.highlighter.highlight(text, language.as_deref());
                self.push_node(RenderedNode::CodeBlock {
                    language,
                    highlighted: code.highlighted,
                    lines: code.lines,
                });
            }
        }
    }

    fn finish(mut self) -> RenderedNode {
        while self.stack.len() > 1 {
            self.end();
        }
        match self.stack.pop() {
            Some(root) => RenderedNode::Element {
                kind: ElementKind::Document,
                children: root.children,
            },
            None => RenderedNode::element(ElementKind::Document, Vec::new()),
        }
    }
}

/// Render markdown `content` into a document node.
pub fn render_markdown(content: &str, highlighter: &Highlighter) -> RenderedNode {
    let mut builder = TreeBuilder::new(highlighter);
    for event in Parser::new_ext(content, parser_options()) {
        match event {
            Event::Start(tag) => builder.start(tag),
            Event::End(_) => builder.end(),
            Event::Text(text) => builder.push_text(&text),
            Event::Code(code) => builder.push_node(RenderedNode::InlineCode {
                code: code.to_string(),
            }),
            Event::InlineMath(tex) => builder.push_node(RenderedNode::Math {
                display: false,
                tex: tex.to_string(),
            }),
            Event::DisplayMath(tex) => builder.push_node(RenderedNode::Math {
                display: true,
                tex: tex.to_string(),
            }),
            Event::Html(html) | Event::InlineHtml(html) => builder.push_text(&html),
            Event::FootnoteReference(name) => builder.push_text(&format!("[^{name}]")),
            Event::SoftBreak => builder.push_node(RenderedNode::SoftBreak),
            Event::HardBreak => builder.push_node(RenderedNode::HardBreak),
            Event::Rule => builder.push_node(RenderedNode::Rule),
            Event::TaskListMarker(checked) => {
                builder.push_node(RenderedNode::TaskMarker { checked })
            }
        }
    }
    builder.finish()
}

/// Append `node`, merging adjacent text runs.
pub(crate) fn push_merged(children: &mut Vec<RenderedNode>, node: RenderedNode) {
    if let RenderedNode::Text { text } = &node {
        if let Some(RenderedNode::Text { text: last }) = children.last_mut() {
            last.push_str(text);
            return;
        }
    }
    children.push(node);
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn alignment(value: pulldown_cmark::Alignment) -> Alignment {
    match value {
        pulldown_cmark::Alignment::None => Alignment::None,
        pulldown_cmark::Alignment::Left => Alignment::Left,
        pulldown_cmark::Alignment::Center => Alignment::Center,
        pulldown_cmark::Alignment::Right => Alignment::Right,
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Relative URLs, fragments, and http/https/mailto are allowed.
pub fn is_safe_url(url: &str) -> bool {
    let trimmed = url.trim();
    match trimmed.split_once(':') {
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => {
            matches!(
                scheme.to_ascii_lowercase().as_str(),
                "http" | "https" | "mailto"
            )
        }
        _ => true,
    }
}
