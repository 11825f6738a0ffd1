//! HTML-fragment render mode.
//!
//! Replies from the tutor assistant arrive as small HTML fragments. Nothing
//! is injected as markup: a tokenizer recognises a fixed tag vocabulary and
//! turns everything else (unknown tags, attributes, stray `<`) into text.
//!
//! Trusted: `p`, `ul`, `ol`, `li`, `strong`/`b`, `em`/`i`, `br`, and
//! `span class="definition|example|tip"`. No other attributes are accepted.

use mentorhub_types::render::{ElementKind, RenderedNode, SemanticKind};

use super::MAX_NESTING;
use super::markdown::push_merged;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrustedTag {
    Paragraph,
    UnorderedList,
    OrderedList,
    ListItem,
    Strong,
    Emphasis,
    Break,
    Span(SemanticKind),
}

impl TrustedTag {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "p" => Some(TrustedTag::Paragraph),
            "ul" => Some(TrustedTag::UnorderedList),
            "ol" => Some(TrustedTag::OrderedList),
            "li" => Some(TrustedTag::ListItem),
            "strong" | "b" => Some(TrustedTag::Strong),
            "em" | "i" => Some(TrustedTag::Emphasis),
            "br" => Some(TrustedTag::Break),
            _ => None,
        }
    }

    /// Closing tags match by element kind, so `<b>..</strong>` closes.
    fn closes(&self, open: &TrustedTag) -> bool {
        match (self, open) {
            (TrustedTag::Span(_), TrustedTag::Span(_)) => true,
            (a, b) => a == b,
        }
    }

    fn element_kind(&self) -> ElementKind {
        match self {
            TrustedTag::Paragraph => ElementKind::Paragraph,
            TrustedTag::UnorderedList => ElementKind::List {
                ordered: false,
                start: None,
            },
            TrustedTag::OrderedList => ElementKind::List {
                ordered: true,
                start: Some(1),
            },
            TrustedTag::ListItem => ElementKind::ListItem,
            TrustedTag::Strong => ElementKind::Strong,
            TrustedTag::Emphasis => ElementKind::Emphasis,
            TrustedTag::Span(class) => ElementKind::Semantic { class: *class },
            // Never opened as a container.
            TrustedTag::Break => ElementKind::Paragraph,
        }
    }

    fn is_block_container(&self) -> bool {
        matches!(
            self,
            TrustedTag::UnorderedList | TrustedTag::OrderedList
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    /// The raw opener is kept so one past the nesting limit stays text.
    Open(TrustedTag, &'a str),
    /// The raw closer is kept so an unmatched one is echoed verbatim.
    Close(TrustedTag, &'a str),
    Break,
}

struct OpenElement {
    tag: TrustedTag,
    children: Vec<RenderedNode>,
}

/// Render an HTML fragment into a document node.
pub fn render_fragment(content: &str) -> RenderedNode {
    let mut root: Vec<RenderedNode> = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();

    for token in tokenize(content) {
        match token {
            Token::Text(raw) => {
                let text = decode_entities(raw);
                let in_block_container = stack
                    .last()
                    .map(|open| open.tag.is_block_container())
                    .unwrap_or(true);
                // Formatting whitespace between block tags is not content.
                if in_block_container && text.trim().is_empty() && text.contains('\n') {
                    continue;
                }
                push_into(&mut stack, &mut root, RenderedNode::text(text));
            }
            Token::Break => push_into(&mut stack, &mut root, RenderedNode::HardBreak),
            Token::Open(_, raw) if stack.len() >= MAX_NESTING => {
                push_into(&mut stack, &mut root, RenderedNode::text(raw));
            }
            Token::Open(tag, _) => stack.push(OpenElement {
                tag,
                children: Vec::new(),
            }),
            Token::Close(tag, raw) => {
                let Some(position) = stack.iter().rposition(|open| tag.closes(&open.tag)) else {
                    push_into(&mut stack, &mut root, RenderedNode::text(raw));
                    continue;
                };
                while stack.len() > position {
                    close_top(&mut stack, &mut root);
                }
            }
        }
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut root);
    }
    RenderedNode::element(ElementKind::Document, root)
}

fn push_into(stack: &mut [OpenElement], root: &mut Vec<RenderedNode>, node: RenderedNode) {
    match stack.last_mut() {
        Some(open) => push_merged(&mut open.children, node),
        None => push_merged(root, node),
    }
}

fn close_top(stack: &mut Vec<OpenElement>, root: &mut Vec<RenderedNode>) {
    if let Some(open) = stack.pop() {
        let node = RenderedNode::element(open.tag.element_kind(), open.children);
        push_into(stack, root, node);
    }
}

fn tokenize(content: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;
    // First `>` at or after the last `<` looked at, reused until passed.
    let mut next_gt: Option<usize> = None;

    while let Some(offset) = content[cursor..].find('<') {
        let lt = cursor + offset;
        let gt = match next_gt.filter(|gt| *gt > lt) {
            Some(gt) => gt,
            None => match content[lt..].find('>') {
                Some(offset) => {
                    next_gt = Some(lt + offset);
                    lt + offset
                }
                // No tag can close: the rest is text.
                None => break,
            },
        };
        // A later `<` before the `>` starts the next candidate instead.
        if let Some(offset) = content[lt + 1..gt].find('<') {
            cursor = lt + 1 + offset;
            continue;
        }
        cursor = gt + 1;
        if let Some(token) = parse_tag(&content[lt..cursor]) {
            if text_start < lt {
                tokens.push(Token::Text(&content[text_start..lt]));
            }
            tokens.push(token);
            text_start = cursor;
        }
    }
    if text_start < content.len() {
        tokens.push(Token::Text(&content[text_start..]));
    }
    tokens
}

/// Parse one complete `<...>` candidate with no inner `<`.
fn parse_tag(raw: &str) -> Option<Token<'_>> {
    let inner = raw.strip_prefix('<')?.strip_suffix('>')?;

    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let (self_closing, inner) = match inner.trim_end().strip_suffix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };

    let name_len = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    if name_len == 0 {
        return None;
    }
    let name = inner[..name_len].to_ascii_lowercase();
    let attributes = inner[name_len..].trim();

    let tag = if name == "span" {
        if closing {
            if !attributes.is_empty() {
                return None;
            }
            // Class is irrelevant for matching a closer.
            TrustedTag::Span(SemanticKind::Definition)
        } else {
            TrustedTag::Span(parse_span_class(attributes)?)
        }
    } else {
        if !attributes.is_empty() {
            return None;
        }
        TrustedTag::from_name(&name)?
    };

    let token = match (tag, closing) {
        (TrustedTag::Break, false) => Token::Break,
        (TrustedTag::Break, true) => return None,
        (_, _) if self_closing => return None,
        (tag, false) => Token::Open(tag, raw),
        (tag, true) => Token::Close(tag, raw),
    };
    Some(token)
}

/// Accepts exactly `class="definition|example|tip"` (single or double quotes).
fn parse_span_class(attributes: &str) -> Option<SemanticKind> {
    let value = attributes.strip_prefix("class")?.trim_start();
    let value = value.strip_prefix('=')?.trim_start();
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &value[1..];
    let close = value.find(quote)?;
    if !value[close + 1..].trim().is_empty() {
        return None;
    }
    SemanticKind::from_class(value[..close].trim())
}

/// Decode the common named entities and numeric character references.
/// Anything unrecognised is left as written.
pub fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        match candidate.find(';').filter(|semi| *semi <= 10) {
            Some(semi) => match decode_entity(&candidate[1..semi]) {
                Some(ch) => {
                    out.push(ch);
                    rest = &candidate[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = &candidate[1..];
                }
            },
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::plain::to_plain_text;

    fn semantic(class: SemanticKind, text: &str) -> RenderedNode {
        RenderedNode::element(ElementKind::Semantic { class }, vec![RenderedNode::text(text)])
    }

    #[test]
    fn test_trusted_vocabulary() {
        let doc = render_fragment(
            "<p>A <span class=\"definition\">tensor</span> is <strong>big</strong>.</p>\n<ul>\n<li>one</li>\n<li><em>two</em></li>\n</ul>",
        );
        let children = doc.children();
        assert_eq!(children.len(), 2);

        let para = children[0].children();
        assert_eq!(para[0], RenderedNode::text("A "));
        assert_eq!(para[1], semantic(SemanticKind::Definition, "tensor"));
        assert_eq!(
            para[3],
            RenderedNode::element(ElementKind::Strong, vec![RenderedNode::text("big")])
        );

        let list = &children[1];
        assert_eq!(list.children().len(), 2);
        assert_eq!(
            list.children()[1],
            RenderedNode::element(
                ElementKind::ListItem,
                vec![RenderedNode::element(
                    ElementKind::Emphasis,
                    vec![RenderedNode::text("two")]
                )]
            )
        );
    }

    #[test]
    fn test_untrusted_tags_become_text() {
        let doc = render_fragment("<script>alert('x')</script><img src=x onerror=alert(1)>");
        assert_eq!(
            doc.children(),
            &[RenderedNode::text(
                "<script>alert('x')</script><img src=x onerror=alert(1)>"
            )]
        );
    }

    #[test]
    fn test_attributes_on_trusted_tags_are_rejected() {
        let doc = render_fragment("<p onclick=\"steal()\">hi</p> <span class=\"tip\" id=\"x\">t</span>");
        assert_eq!(to_plain_text(&doc), "<p onclick=\"steal()\">hi</p> <span class=\"tip\" id=\"x\">t</span>");
        assert!(doc.children().iter().all(|n| matches!(n, RenderedNode::Text { .. })));
    }

    #[test]
    fn test_unknown_span_class_is_text() {
        let doc = render_fragment("<span class=\"warning\">w</span>");
        assert_eq!(
            doc.children(),
            &[RenderedNode::text("<span class=\"warning\">w</span>")]
        );
    }

    #[test]
    fn test_single_quoted_span_class() {
        let doc = render_fragment("<span class='example'>e.g.</span>");
        assert_eq!(doc.children(), &[semantic(SemanticKind::Example, "e.g.")]);
    }

    #[test]
    fn test_unmatched_closer_is_text_and_open_autocloses() {
        let doc = render_fragment("</li><p>open <b>bold");
        assert_eq!(doc.children()[0], RenderedNode::text("</li>"));
        assert_eq!(
            doc.children()[1],
            RenderedNode::element(
                ElementKind::Paragraph,
                vec![
                    RenderedNode::text("open "),
                    RenderedNode::element(ElementKind::Strong, vec![RenderedNode::text("bold")])
                ]
            )
        );
    }

    #[test]
    fn test_break_and_entities() {
        let doc = render_fragment("<p>a &lt; b<br/>c &amp;&#39;d&#x21; &bogus; &</p>");
        let para = doc.children()[0].children();
        assert_eq!(para[0], RenderedNode::text("a < b"));
        assert_eq!(para[1], RenderedNode::HardBreak);
        assert_eq!(para[2], RenderedNode::text("c &'d! &bogus; &"));
    }

    #[test]
    fn test_stray_angle_brackets() {
        let doc = render_fragment("if a < b and c > d <p");
        assert_eq!(doc.children(), &[RenderedNode::text("if a < b and c > d <p")]);
    }

    #[test]
    fn test_plain_text_passes_through() {
        let doc = render_fragment("just words");
        assert_eq!(doc.children(), &[RenderedNode::text("just words")]);
    }

    fn depth(node: &RenderedNode) -> usize {
        1 + node.children().iter().map(depth).max().unwrap_or(0)
    }

    #[test]
    fn test_deep_nesting_is_capped() {
        let input = "<b>".repeat(30_000) + "x" + &"</b>".repeat(30_000);
        let doc = render_fragment(&input);
        // Document plus the capped chain of openers.
        assert!(depth(&doc) <= MAX_NESTING + 2);
        let html = crate::render::to_html(&doc);
        assert!(html.contains("&lt;b&gt;x"));
        assert!(to_plain_text(&doc).ends_with("</b>"));
    }

    #[test]
    fn test_unclosed_angle_brackets_stay_linear() {
        let input = "<".repeat(200_000);
        let started = std::time::Instant::now();
        let doc = render_fragment(&input);
        assert_eq!(doc.children(), &[RenderedNode::text(input.clone())]);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));

        let spaced = "< ".repeat(100_000) + "<p>end</p>";
        let doc = render_fragment(&spaced);
        assert_eq!(
            doc.children().last(),
            Some(&RenderedNode::element(
                ElementKind::Paragraph,
                vec![RenderedNode::text("end")]
            ))
        );
    }

    #[test]
    fn test_angle_before_real_tag() {
        let doc = render_fragment("a <<b>bold</b>");
        assert_eq!(doc.children()[0], RenderedNode::text("a <"));
        assert_eq!(
            doc.children()[1],
            RenderedNode::element(ElementKind::Strong, vec![RenderedNode::text("bold")])
        );
    }

    #[test]
    fn test_decode_entities_multibyte() {
        assert_eq!(decode_entities("caf&#233; &#x1F600;"), "café 😀");
    }
}
