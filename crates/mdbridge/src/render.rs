//! Document tree to HTML rendering.
//!
//! A single depth-first pass over the tree. Text and attribute values are
//! escaped exactly once here; raw HTML nodes are written verbatim and left to
//! the sanitizer.

use mdbridge_core::{Block, Inline, ListItem, Root, TableRow};

use crate::diagram::{DiagramCodec, DIAGRAM_LANGUAGE};
use crate::utilities::escape_html;

/// Render a document tree to an HTML string
pub fn render(root: &Root) -> String {
    let mut out = String::with_capacity(4096);
    for block in &root.children {
        render_block(block, &mut out);
    }
    out
}

fn render_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { depth, children } => {
            let depth = (*depth).clamp(1, 6);
            out.push_str(&format!("<h{}>", depth));
            render_inlines(children, out);
            out.push_str(&format!("</h{}>", depth));
        }

        Block::Paragraph(inlines) => {
            out.push_str("<p>");
            render_inlines(inlines, out);
            out.push_str("</p>");
        }

        Block::CodeBlock { lang, value } => match lang.as_deref() {
            Some(DIAGRAM_LANGUAGE) => out.push_str(&DiagramCodec::render_element(value)),
            Some(lang) => {
                out.push_str(&format!(
                    r#"<pre><code class="language-{}">"#,
                    escape_html(lang)
                ));
                out.push_str(&escape_html(value));
                out.push_str("</code></pre>");
            }
            None => {
                out.push_str("<pre><code>");
                out.push_str(&escape_html(value));
                out.push_str("</code></pre>");
            }
        },

        Block::Blockquote(blocks) => {
            out.push_str("<blockquote>");
            for block in blocks {
                render_block(block, out);
            }
            out.push_str("</blockquote>");
        }

        Block::List {
            ordered,
            start,
            children,
        } => {
            let tag = if *ordered { "ol" } else { "ul" };
            if *ordered && *start != 1 {
                out.push_str(&format!(r#"<ol start="{}">"#, start));
            } else {
                out.push_str(&format!("<{}>", tag));
            }
            for item in children {
                render_list_item(item, out);
            }
            out.push_str(&format!("</{}>", tag));
        }

        Block::ThematicBreak => out.push_str("<hr />"),

        Block::Table(rows) => render_table(rows, out),

        Block::RawHtml(html) => out.push_str(html),
    }
}

fn render_list_item(item: &ListItem, out: &mut String) {
    out.push_str("<li>");
    match item.checked {
        Some(true) => out.push_str(r#"<input type="checkbox" checked disabled />"#),
        Some(false) => out.push_str(r#"<input type="checkbox" disabled />"#),
        None => {}
    }
    for block in &item.children {
        render_block(block, out);
    }
    out.push_str("</li>");
}

fn render_table(rows: &[TableRow], out: &mut String) {
    let Some((header, body)) = rows.split_first() else {
        return;
    };

    out.push_str("<table><thead><tr>");
    for cell in &header.children {
        out.push_str("<th>");
        render_inlines(&cell.children, out);
        out.push_str("</th>");
    }
    out.push_str("</tr></thead><tbody>");

    for row in body {
        out.push_str("<tr>");
        for cell in &row.children {
            out.push_str("<td>");
            render_inlines(&cell.children, out);
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
}

fn render_inlines(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        render_inline(inline, out);
    }
}

fn render_inline(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Text(text) => out.push_str(&escape_html(text)),

        Inline::Strong(children) => wrap("strong", children, out),
        Inline::Emphasis(children) => wrap("em", children, out),
        Inline::Strikethrough(children) => wrap("del", children, out),

        Inline::Code(code) => {
            out.push_str("<code>");
            out.push_str(&escape_html(code));
            out.push_str("</code>");
        }

        Inline::Link {
            url,
            title,
            children,
        } => {
            out.push_str(&format!(r#"<a href="{}""#, escape_html(url)));
            if let Some(title) = title {
                out.push_str(&format!(r#" title="{}""#, escape_html(title)));
            }
            out.push('>');
            render_inlines(children, out);
            out.push_str("</a>");
        }

        Inline::Image { url, alt, title } => {
            out.push_str(&format!(
                r#"<img src="{}" alt="{}""#,
                escape_html(url),
                escape_html(alt)
            ));
            if let Some(title) = title {
                out.push_str(&format!(r#" title="{}""#, escape_html(title)));
            }
            out.push_str(" />");
        }

        Inline::Break => out.push_str("<br />"),

        Inline::Html(html) => out.push_str(html),
    }
}

fn wrap(tag: &str, children: &[Inline], out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    render_inlines(children, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}
