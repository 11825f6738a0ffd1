//! Rendered content nodes.
//!
//! Model output is never injected as raw markup. Both render modes produce
//! a tree drawn from this closed vocabulary, which clients turn into DOM
//! nodes (or which `to_html` serializes with every text run escaped).

use serde::{Deserialize, Serialize};

/// How a message payload should be interpreted before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    #[default]
    Markdown,
    /// Pre-formed HTML restricted to paragraph/list/emphasis tags and the
    /// semantic spans.
    HtmlFragment,
}

/// One node of rendered content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderedNode {
    Element {
        kind: ElementKind,
        children: Vec<RenderedNode>,
    },
    Text {
        text: String,
    },
    InlineCode {
        code: String,
    },
    CodeBlock {
        /// First word of the fence info string, kept even when unknown.
        language: Option<String>,
        highlighted: bool,
        lines: Vec<Vec<CodeSpan>>,
    },
    Math {
        display: bool,
        tex: String,
    },
    TaskMarker {
        checked: bool,
    },
    SoftBreak,
    HardBreak,
    Rule,
}

impl RenderedNode {
    pub fn text(text: impl Into<String>) -> Self {
        RenderedNode::Text { text: text.into() }
    }

    pub fn element(kind: ElementKind, children: Vec<RenderedNode>) -> Self {
        RenderedNode::Element { kind, children }
    }

    /// Children of an element, or an empty slice for leaves.
    pub fn children(&self) -> &[RenderedNode] {
        match self {
            RenderedNode::Element { children, .. } => children,
            _ => &[],
        }
    }
}

/// Container kinds. Closed set; there is no raw-HTML escape hatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    Document,
    Paragraph,
    Heading { level: u8 },
    BlockQuote,
    List { ordered: bool, start: Option<u64> },
    ListItem,
    Table,
    TableHead,
    TableRow,
    TableCell { alignment: Alignment },
    Emphasis,
    Strong,
    Strikethrough,
    Link { href: String, title: Option<String> },
    Image { src: String, title: Option<String> },
    Semantic { class: SemanticKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// The semantic span classes recognised by the HTML-fragment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticKind {
    Definition,
    Example,
    Tip,
}

impl SemanticKind {
    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            "definition" => Some(SemanticKind::Definition),
            "example" => Some(SemanticKind::Example),
            "tip" => Some(SemanticKind::Tip),
            _ => None,
        }
    }

    pub fn as_class(&self) -> &'static str {
        match self {
            SemanticKind::Definition => "definition",
            SemanticKind::Example => "example",
            SemanticKind::Tip => "tip",
        }
    }
}

/// A run of code text with an optional highlight style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSpan {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<SpanStyle>,
}

impl CodeSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanStyle {
    pub foreground: Rgb,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
