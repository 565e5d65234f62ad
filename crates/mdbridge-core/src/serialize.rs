//! Markdown tree serialization
//!
//! Converts a document tree back into Markdown text that parses to an
//! equivalent tree. Formatting is canonical rather than source-preserving.

use crate::ast::{Block, Inline, ListItem, Root, TableRow};
use crate::options::{CodeBlockStyle, HeadingStyle, Options};

/// Serialize a document tree to a Markdown string
pub fn stringify(root: &Root, options: &Options) -> String {
    let mut output = String::with_capacity(4096);
    serialize_blocks(&root.children, options, &mut output);

    // Every block leaves a blank line behind it; keep a single final newline
    let len = output.trim_end_matches('\n').len();
    output.truncate(len);
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

/// Where inline content ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Flow,
    /// A pipe table cell: every `|`, even inside code spans, must be escaped
    TableCell,
}

fn serialize_blocks(blocks: &[Block], options: &Options, out: &mut String) {
    let mut previous: Option<&Block> = None;
    let mut alternate = false;

    for block in blocks {
        if let Block::Paragraph(inlines) = block {
            if inlines.iter().all(Inline::is_blank) {
                continue;
            }
        }

        alternate = alternates(previous, block, alternate);
        serialize_block(block, options, alternate, out);
        previous = Some(block);
    }
}

/// Two adjacent lists of the same kind would merge into one, so every other
/// one switches marker
fn alternates(previous: Option<&Block>, block: &Block, alternate: bool) -> bool {
    match (previous, block) {
        (Some(Block::List { ordered: a, .. }), Block::List { ordered: b, .. }) if a == b => {
            !alternate
        }
        _ => false,
    }
}

fn serialize_block(block: &Block, options: &Options, alternate: bool, out: &mut String) {
    match block {
        Block::Heading { depth, children } => serialize_heading(*depth, children, options, out),

        Block::Paragraph(inlines) => {
            serialize_inlines(inlines, options, Context::Flow, out);
            out.push_str("\n\n");
        }

        Block::Blockquote(blocks) => {
            let mut inner = String::new();
            serialize_blocks(blocks, options, &mut inner);

            for (i, line) in inner.trim_end().split('\n').enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push('>');
                if !line.is_empty() {
                    out.push(' ');
                    out.push_str(line);
                }
            }
            out.push_str("\n\n");
        }

        Block::List {
            ordered,
            start,
            children,
        } => serialize_list(*ordered, *start, children, options, alternate, out),

        Block::CodeBlock { lang, value } => {
            serialize_code_block(lang.as_deref(), value, options, out)
        }

        Block::ThematicBreak => {
            out.push_str(&options.hr);
            out.push_str("\n\n");
        }

        Block::Table(rows) => serialize_table(rows, options, out),

        Block::RawHtml(html) => {
            out.push_str(html.trim_end_matches('\n'));
            out.push_str("\n\n");
        }
    }
}

fn serialize_heading(depth: u8, children: &[Inline], options: &Options, out: &mut String) {
    let depth = depth.clamp(1, 6);

    let mut content = String::new();
    serialize_inlines(children, options, Context::Flow, &mut content);
    let mut content = content.replace('\n', " ").trim().to_string();

    // A trailing run of `#` would be read as a closing sequence
    if content.ends_with('#') {
        content.pop();
        content.push_str("\\#");
    }

    match options.heading_style {
        HeadingStyle::Setext if depth <= 2 && !content.is_empty() => {
            let underline = if depth == 1 { "=" } else { "-" };
            out.push_str(&content);
            out.push('\n');
            out.push_str(&underline.repeat(content.chars().count().max(3)));
        }
        _ => {
            for _ in 0..depth {
                out.push('#');
            }
            if !content.is_empty() {
                out.push(' ');
                out.push_str(&content);
            }
        }
    }
    out.push_str("\n\n");
}

fn serialize_list(
    ordered: bool,
    start: u32,
    items: &[ListItem],
    options: &Options,
    alternate: bool,
    out: &mut String,
) {
    let bullet = match (alternate, options.bullet_list_marker) {
        (false, marker) => marker,
        (true, '*') => '-',
        (true, _) => '*',
    };
    let delimiter = if alternate { ')' } else { '.' };

    for (i, item) in items.iter().enumerate() {
        let prefix = if ordered {
            format!("{}{} ", start.saturating_add(i as u32), delimiter)
        } else {
            format!("{} ", bullet)
        };

        let mut body = String::new();
        if let Some(checked) = item.checked {
            body.push_str(if checked { "[x] " } else { "[ ] " });
        }
        serialize_list_item(item, options, &mut body);

        let body = body.trim_end();
        if body.is_empty() {
            out.push_str(prefix.trim_end());
            out.push('\n');
            continue;
        }

        // Continuation lines line up with the first character after the marker
        let continuation = " ".repeat(prefix.len());
        for (n, line) in body.split('\n').enumerate() {
            if n == 0 {
                out.push_str(&prefix);
            } else if !line.is_empty() {
                out.push_str(&continuation);
            }
            out.push_str(line);
            out.push('\n');
        }
    }

    out.push('\n');
}

fn serialize_list_item(item: &ListItem, options: &Options, out: &mut String) {
    let mut alternate = false;

    for (i, block) in item.children.iter().enumerate() {
        let previous = i.checked_sub(1).map(|p| &item.children[p]);
        alternate = alternates(previous, block, alternate);

        if i > 0 {
            // Only a list that may interrupt a paragraph can follow it directly
            let tight = matches!(
                (&item.children[i - 1], block),
                (Block::Paragraph(_), Block::List { ordered: false, .. })
                    | (Block::Paragraph(_), Block::List { start: 1, .. })
            );
            out.push_str(if tight { "\n" } else { "\n\n" });
        }

        let mut chunk = String::new();
        serialize_block(block, options, alternate, &mut chunk);
        out.push_str(chunk.trim_end_matches('\n'));
    }
}

fn serialize_code_block(lang: Option<&str>, code: &str, options: &Options, out: &mut String) {
    let indented = options.code_block_style == CodeBlockStyle::Indented
        && lang.is_none()
        && !code.trim().is_empty();

    if indented {
        for line in code.split('\n') {
            if !line.is_empty() {
                out.push_str("    ");
                out.push_str(line);
            }
            out.push('\n');
        }
        out.push('\n');
        return;
    }

    let fence = fence_for(code, &options.fence);
    out.push_str(&fence);
    out.push_str(lang.unwrap_or(""));
    out.push('\n');
    if !code.is_empty() {
        out.push_str(code);
        out.push('\n');
    }
    out.push_str(&fence);
    out.push_str("\n\n");
}

/// Pick a fence longer than any run of the fence character inside `code`
pub fn fence_for(code: &str, minimum: &str) -> String {
    let fence_char = minimum.chars().next().unwrap_or('`');
    let longest = code
        .chars()
        .fold((0usize, 0usize), |(max, current), c| {
            if c == fence_char {
                (max.max(current + 1), current + 1)
            } else {
                (max, 0)
            }
        })
        .0;

    let len = minimum.chars().count().max(3).max(longest + 1);
    std::iter::repeat(fence_char).take(len).collect()
}

fn serialize_table(rows: &[TableRow], options: &Options, out: &mut String) {
    if rows.is_empty() {
        return;
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.children
                .iter()
                .map(|cell| {
                    let mut text = String::new();
                    serialize_inlines(&cell.children, options, Context::TableCell, &mut text);
                    text.replace('\n', " ").trim().to_string()
                })
                .collect()
        })
        .collect();

    let col_count = cells.iter().map(|r| r.len()).max().unwrap_or(0).max(1);

    // Minimum width of 3 for separator
    let mut widths = vec![3usize; col_count];
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    for (row_index, row) in cells.iter().enumerate() {
        out.push('|');
        for (i, width) in widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            out.push(' ');
            out.push_str(cell);
            for _ in cell.chars().count()..*width {
                out.push(' ');
            }
            out.push_str(" |");
        }
        out.push('\n');

        if row_index == 0 {
            out.push('|');
            for width in &widths {
                out.push(' ');
                for _ in 0..*width {
                    out.push('-');
                }
                out.push_str(" |");
            }
            out.push('\n');
        }
    }

    out.push('\n');
}

fn serialize_inlines(inlines: &[Inline], options: &Options, context: Context, out: &mut String) {
    for (i, inline) in inlines.iter().enumerate() {
        serialize_inline(inline, inlines.get(i + 1), options, context, out);
    }
}

fn serialize_inline(
    inline: &Inline,
    next: Option<&Inline>,
    options: &Options,
    context: Context,
    out: &mut String,
) {
    match inline {
        Inline::Text(text) => push_escaped(text, out),

        Inline::Strong(content) => {
            wrap_delimited(content, &options.strong_delimiter, options, context, out)
        }

        Inline::Emphasis(content) => {
            // `_` does not open or close emphasis inside a word
            let inside_word = out.chars().last().is_some_and(char::is_alphanumeric)
                || next.is_some_and(starts_alphanumeric);
            let delimiter = if inside_word && options.em_delimiter == '_' {
                '*'
            } else {
                options.em_delimiter
            };
            wrap_delimited(content, &delimiter.to_string(), options, context, out);
        }

        Inline::Strikethrough(content) => wrap_delimited(content, "~~", options, context, out),

        Inline::Code(code) => {
            let longest = code
                .chars()
                .fold((0usize, 0usize), |(max, current), c| {
                    if c == '`' {
                        (max.max(current + 1), current + 1)
                    } else {
                        (max, 0)
                    }
                })
                .0;
            let backticks = "`".repeat(longest + 1);
            let padded = code.starts_with('`')
                || code.ends_with('`')
                || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
            let space = if padded { " " } else { "" };

            out.push_str(&backticks);
            out.push_str(space);
            push_cell_safe(code, context, out);
            out.push_str(space);
            out.push_str(&backticks);
        }

        Inline::Link {
            url,
            title,
            children,
        } => {
            out.push('[');
            serialize_inlines(children, options, context, out);
            out.push_str("](");
            push_destination(url, title.as_deref(), context, out);
            out.push(')');
        }

        Inline::Image { url, alt, title } => {
            out.push_str("![");
            push_escaped(alt, out);
            out.push_str("](");
            push_destination(url, title.as_deref(), context, out);
            out.push(')');
        }

        Inline::Break => out.push_str("  \n"),

        Inline::Html(html) => out.push_str(html),
    }
}

fn wrap_delimited(
    content: &[Inline],
    delimiter: &str,
    options: &Options,
    context: Context,
    out: &mut String,
) {
    let mut inner = String::new();
    serialize_inlines(content, options, context, &mut inner);
    if inner.trim().is_empty() {
        out.push_str(&inner);
        return;
    }

    // Delimiters must hug non-whitespace, so move outer spaces outside
    let trimmed_start = inner.trim_start();
    let leading = &inner[..inner.len() - trimmed_start.len()];
    let trimmed = trimmed_start.trim_end();
    let trailing = &trimmed_start[trimmed.len()..];

    out.push_str(leading);
    out.push_str(delimiter);
    out.push_str(trimmed);
    out.push_str(delimiter);
    out.push_str(trailing);
}

fn starts_alphanumeric(inline: &Inline) -> bool {
    match inline {
        Inline::Text(text) => text.chars().next().is_some_and(char::is_alphanumeric),
        _ => false,
    }
}

/// Write text that is not otherwise escaped, guarding `|` inside table cells
fn push_cell_safe(text: &str, context: Context, out: &mut String) {
    match context {
        Context::Flow => out.push_str(text),
        Context::TableCell => {
            for c in text.chars() {
                if c == '|' {
                    out.push('\\');
                }
                out.push(c);
            }
        }
    }
}

fn push_destination(url: &str, title: Option<&str>, context: Context, out: &mut String) {
    let needs_brackets = url.is_empty()
        || url
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>'));

    if needs_brackets {
        out.push('<');
        for c in url.chars() {
            if matches!(c, '<' | '>') || (c == '|' && context == Context::TableCell) {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('>');
    } else {
        push_cell_safe(url, context, out);
    }

    if let Some(title) = title {
        out.push_str(" \"");
        push_cell_safe(&title.replace('"', "\\\""), context, out);
        out.push('"');
    }
}

/// Escape text so that it reads back as the same literal characters
fn push_escaped(text: &str, out: &mut String) {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let line_start = out.is_empty() || out.ends_with('\n');

        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '~' | '|' => {
                out.push('\\');
                out.push(c);
            }
            '&' if chars
                .get(i + 1)
                .is_some_and(|n| n.is_ascii_alphanumeric() || *n == '#') =>
            {
                out.push_str("\\&");
            }
            '#' | '>' | '-' | '+' | '=' if line_start => {
                out.push('\\');
                out.push(c);
            }
            d if line_start && d.is_ascii_digit() => {
                // `1.` or `1)` at the start of a line opens an ordered list
                let run = chars[i..].iter().take_while(|c| c.is_ascii_digit()).count();
                out.extend(&chars[i..i + run]);
                i += run;
                if let Some(&delimiter) = chars.get(i).filter(|c| matches!(**c, '.' | ')')) {
                    out.push('\\');
                    out.push(delimiter);
                    i += 1;
                }
                continue;
            }
            _ => out.push(c),
        }
        i += 1;
    }
}
