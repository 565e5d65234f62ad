//! Markdown document tree
//!
//! This module defines the nodes produced by the Markdown parser and consumed
//! by both the HTML renderer and the Markdown serializer. A tree is built fresh
//! for every conversion and holds no references into the source text.

/// Root of a parsed document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Root {
    pub children: Vec<Block>,
}

impl Root {
    pub fn new(children: Vec<Block>) -> Self {
        Self { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// A block-level Markdown node
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Heading with depth (1-6) and inline content
    Heading { depth: u8, children: Vec<Inline> },

    /// Paragraph containing inline content
    Paragraph(Vec<Inline>),

    /// Fenced or indented code block. `lang` is the first word of the info string.
    CodeBlock { lang: Option<String>, value: String },

    /// Block quote containing nested blocks
    Blockquote(Vec<Block>),

    /// List (ordered or unordered)
    List {
        ordered: bool,
        start: u32,
        children: Vec<ListItem>,
    },

    /// Thematic break (horizontal rule)
    ThematicBreak,

    /// GFM table; the first row is the header row
    Table(Vec<TableRow>),

    /// Raw HTML block, passed through verbatim
    RawHtml(String),
}

/// A list item containing blocks
///
/// `checked` is `Some` only for GFM task list items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListItem {
    pub children: Vec<Block>,
    pub checked: Option<bool>,
}

impl ListItem {
    pub fn new(children: Vec<Block>) -> Self {
        Self {
            children,
            checked: None,
        }
    }

    pub fn from_inlines(inlines: Vec<Inline>) -> Self {
        Self::new(vec![Block::Paragraph(inlines)])
    }

    pub fn task(checked: bool, inlines: Vec<Inline>) -> Self {
        Self {
            children: vec![Block::Paragraph(inlines)],
            checked: Some(checked),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub children: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub children: Vec<Inline>,
}

/// An inline Markdown node
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Plain text, unescaped
    Text(String),

    /// Strong emphasis (bold)
    Strong(Vec<Inline>),

    /// Emphasis (italic)
    Emphasis(Vec<Inline>),

    /// GFM strikethrough
    Strikethrough(Vec<Inline>),

    /// Inline code
    Code(String),

    /// Link with content, URL, and optional title
    Link {
        url: String,
        title: Option<String>,
        children: Vec<Inline>,
    },

    /// Image with alt text, URL, and optional title
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },

    /// Hard line break
    Break,

    /// Raw inline HTML
    Html(String),
}

impl Inline {
    pub fn text(value: impl Into<String>) -> Self {
        Inline::Text(value.into())
    }

    /// Check if this inline is empty/blank
    pub fn is_blank(&self) -> bool {
        match self {
            Inline::Text(text) => text.trim().is_empty(),
            Inline::Strong(inlines) | Inline::Emphasis(inlines) | Inline::Strikethrough(inlines) => {
                inlines.iter().all(|i| i.is_blank())
            }
            Inline::Code(code) => code.is_empty(),
            Inline::Link { .. } | Inline::Image { .. } => false,
            Inline::Break => false,
            Inline::Html(html) => html.trim().is_empty(),
        }
    }

    /// Plain-text rendition, used for image alt text
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Strong(inlines)
            | Inline::Emphasis(inlines)
            | Inline::Strikethrough(inlines)
            | Inline::Link {
                children: inlines, ..
            } => inlines.iter().for_each(|i| i.collect_text(out)),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::Break => out.push('\n'),
            Inline::Html(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_inlines() {
        assert!(Inline::text(" \n ").is_blank());
        assert!(Inline::Strong(vec![Inline::text("  ")]).is_blank());
        assert!(!Inline::Code(" ".to_string()).is_blank());
        assert!(!Inline::Break.is_blank());
    }

    #[test]
    fn test_plain_text_flattens_nested_inlines() {
        let inline = Inline::Strong(vec![
            Inline::text("a "),
            Inline::Emphasis(vec![Inline::text("b")]),
            Inline::Code("c".to_string()),
        ]);
        assert_eq!(inline.plain_text(), "a bc");
    }
}
