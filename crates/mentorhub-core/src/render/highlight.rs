//! Syntax highlighting for fenced code blocks.

use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use mentorhub_types::render::{CodeSpan, Rgb, SpanStyle};

const THEME_NAME: &str = "base16-ocean.dark";

/// Highlighted (or plain) code, split into lines of spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedCode {
    pub highlighted: bool,
    pub lines: Vec<Vec<CodeSpan>>,
}

pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new() -> Self {
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(THEME_NAME)
            .unwrap_or_default();
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Whether `language` names a syntax we can highlight.
    pub fn knows(&self, language: &str) -> bool {
        !language.is_empty() && self.syntax_set.find_syntax_by_token(language).is_some()
    }

    /// Highlight `code` as `language`.
    ///
    /// Unknown or absent languages, and any highlighter error, produce
    /// unstyled lines with `highlighted: false`.
    pub fn highlight(&self, code: &str, language: Option<&str>) -> HighlightedCode {
        let syntax = language
            .filter(|lang| !lang.is_empty())
            .and_then(|lang| self.syntax_set.find_syntax_by_token(lang));

        let Some(syntax) = syntax else {
            return plain(code);
        };

        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let mut lines = Vec::new();
        for line in LinesWithEndings::from(code) {
            let ranges = match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => ranges,
                Err(err) => {
                    tracing::debug!(error = %err, "highlighting failed, falling back to plain");
                    return plain(code);
                }
            };
            let spans = ranges
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = text.trim_end_matches(['\n', '\r']);
                    (!text.is_empty()).then(|| CodeSpan {
                        text: text.to_string(),
                        style: Some(span_style(style)),
                    })
                })
                .collect();
            lines.push(spans);
        }

        HighlightedCode {
            highlighted: true,
            lines,
        }
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

fn plain(code: &str) -> HighlightedCode {
    HighlightedCode {
        highlighted: false,
        lines: code
            .lines()
            .map(|line| {
                if line.is_empty() {
                    Vec::new()
                } else {
                    vec![CodeSpan::plain(line)]
                }
            })
            .collect(),
    }
}

fn span_style(style: Style) -> SpanStyle {
    SpanStyle {
        foreground: Rgb {
            r: style.foreground.r,
            g: style.foreground.g,
            b: style.foreground.b,
        },
        bold: style.font_style.contains(FontStyle::BOLD),
        italic: style.font_style.contains(FontStyle::ITALIC),
        underline: style.font_style.contains(FontStyle::UNDERLINE),
    }
}
