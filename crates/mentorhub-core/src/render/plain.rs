//! Plain-text projection of a rendered tree.

use mentorhub_types::render::{ElementKind, RenderedNode};

/// Concatenate the visible text of `node`.
///
/// Block elements are separated by blank lines and list items by newlines;
/// math is projected as its TeX source.
pub fn to_plain_text(node: &RenderedNode) -> String {
    let mut out = String::new();
    write_plain(node, &mut out);
    out.trim_end().to_string()
}

fn write_plain(node: &RenderedNode, out: &mut String) {
    match node {
        RenderedNode::Text { text } => out.push_str(text),
        RenderedNode::InlineCode { code } => out.push_str(code),
        RenderedNode::Math { tex, .. } => out.push_str(tex),
        RenderedNode::CodeBlock { lines, .. } => {
            let code: Vec<String> = lines
                .iter()
                .map(|line| line.iter().map(|span| span.text.as_str()).collect())
                .collect();
            out.push_str(&code.join("\n"));
            out.push_str("\n\n");
        }
        RenderedNode::TaskMarker { checked } => out.push_str(if *checked { "[x] " } else { "[ ] " }),
        RenderedNode::SoftBreak | RenderedNode::HardBreak => out.push('\n'),
        RenderedNode::Rule => out.push_str("---\n\n"),
        RenderedNode::Element { kind, children } => {
            for child in children {
                write_plain(child, out);
            }
            match kind {
                ElementKind::Paragraph
                | ElementKind::Heading { .. }
                | ElementKind::BlockQuote
                | ElementKind::List { .. }
                | ElementKind::Table => {
                    trim_trailing_newlines(out);
                    out.push_str("\n\n");
                }
                ElementKind::ListItem | ElementKind::TableHead | ElementKind::TableRow => {
                    trim_trailing_newlines(out);
                    out.push('\n');
                }
                ElementKind::TableCell { .. } => out.push('\t'),
                _ => {}
            }
        }
    }
}

fn trim_trailing_newlines(out: &mut String) {
    while out.ends_with('\n') || out.ends_with('\t') {
        out.pop();
    }
}
