//! Configuration options for Markdown serialization

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
    /// Use setext-style headings (underlined with = or -)
    /// Only works for h1 and h2, falls back to ATX for h3-h6
    Setext,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeBlockStyle {
    /// Use fenced code blocks (```)
    #[default]
    Fenced,
    /// Use indented code blocks (4 spaces).
    /// Blocks carrying a language are always fenced.
    Indented,
}

/// Options for Markdown serialization
#[derive(Debug, Clone)]
pub struct Options {
    /// Heading style (atx or setext)
    pub heading_style: HeadingStyle,

    /// Thematic break string
    pub hr: String,

    /// Bullet list marker; sibling lists alternate with `*`
    pub bullet_list_marker: char,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Shortest fence for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter, falls back to `*` inside words
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            hr: "---".to_string(),
            bullet_list_marker: '-',
            code_block_style: CodeBlockStyle::Fenced,
            fence: "```".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
        }
    }
}
