//! Render pipeline: message text to structured, safe content.
//!
//! `render` is pure and deterministic for any input string and never
//! panics. Output is a closed [`RenderedNode`] tree; [`to_html`] serializes
//! it with every text run escaped.

pub mod fragment;
pub mod highlight;
pub mod html;
pub mod markdown;
pub mod plain;

use std::sync::OnceLock;

use mentorhub_types::render::{ContentFormat, RenderedNode};

pub use html::to_html;
pub use plain::to_plain_text;

use self::highlight::Highlighter;

/// Deepest container chain either render mode builds. Openers past it are
/// flattened, which keeps the tree and its JSON form shallow.
pub const MAX_NESTING: usize = 32;

/// Owns the syntax set and theme used for code blocks.
///
/// Loading syntect's defaults is expensive; use [`RenderPipeline::global`]
/// unless a separate instance is needed.
pub struct RenderPipeline {
    highlighter: Highlighter,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self {
            highlighter: Highlighter::new(),
        }
    }

    /// Process-wide pipeline, built on first use.
    pub fn global() -> &'static RenderPipeline {
        static PIPELINE: OnceLock<RenderPipeline> = OnceLock::new();
        PIPELINE.get_or_init(RenderPipeline::new)
    }

    pub fn render(&self, content: &str) -> RenderedNode {
        markdown::render_markdown(content, &self.highlighter)
    }

    pub fn render_fragment(&self, content: &str) -> RenderedNode {
        fragment::render_fragment(content)
    }

    pub fn render_as(&self, format: ContentFormat, content: &str) -> RenderedNode {
        match format {
            ContentFormat::Markdown => self.render(content),
            ContentFormat::HtmlFragment => self.render_fragment(content),
        }
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Render markdown `content` with the global pipeline.
pub fn render(content: &str) -> RenderedNode {
    RenderPipeline::global().render(content)
}

/// Render an HTML fragment restricted to the trusted tag vocabulary.
pub fn render_fragment(content: &str) -> RenderedNode {
    fragment::render_fragment(content)
}

pub fn render_as(format: ContentFormat, content: &str) -> RenderedNode {
    RenderPipeline::global().render_as(format, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NASTY_INPUTS: &[&str] = &[
        "",
        " ",
        "```",
        "```python",
        "```python\nunterminated",
        "$",
        "$$",
        "$$ unclosed display",
        "$\\frac{1}{$",
        "\\[ x \\]",
        "| a |\n|---",
        "| a | b |\n|---|---|\n| only one",
        "<",
        "</",
        "<p",
        "<span class=",
        "&",
        "&#xFFFFFFFF;",
        "&#55296;",
        "[link](",
        "![img](javascript:x)",
        "*unclosed **strong",
        "~~~\n~~~~",
        "- [ ]",
        "> > > nested",
        "\0\u{feff}\u{202e}",
        "😀 `code` 😀",
    ];

    #[test]
    fn test_render_never_panics_and_is_idempotent() {
        for input in NASTY_INPUTS {
            for format in [ContentFormat::Markdown, ContentFormat::HtmlFragment] {
                let first = render_as(format, input);
                let second = render_as(format, input);
                assert_eq!(first, second, "not idempotent for {input:?}");
                let _ = to_html(&first);
                let _ = to_plain_text(&first);
            }
        }
    }

    #[test]
    fn test_global_pipeline_matches_fresh_instance() {
        let fresh = RenderPipeline::new();
        let content = "# T\n\n```rust\nfn main() {}\n```";
        assert_eq!(fresh.render(content), render(content));
    }

    #[test]
    fn test_render_as_dispatches() {
        let markdown = render_as(ContentFormat::Markdown, "**b**");
        let fragment = render_as(ContentFormat::HtmlFragment, "**b**");
        assert_ne!(markdown, fragment);
        assert_eq!(to_plain_text(&fragment), "**b**");
    }
}
