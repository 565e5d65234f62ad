//! # mdbridge
//!
//! Convert Markdown to HTML for a rich-text editor and back again, keeping
//! diagram blocks byte-for-byte intact.
//!
//! ## Design
//!
//! The two directions are deliberately asymmetric:
//!
//! - **Markdown to HTML** parses into the [`mdbridge_core`] document tree and
//!   renders that tree.
//! - **HTML to Markdown** walks the parsed DOM with a table of [`Rule`]s;
//!   custom rules are checked before the built-in GFM ones.
//!
//! Fenced blocks tagged `mermaid` are carried through HTML as
//! `<div data-mermaid="true" data-code="...">`. Two older encodings are still
//! recognized on the way back, see [`DiagramCodec`].
//!
//! ## Example
//!
//! ```rust
//! use mdbridge::{html_to_markdown, markdown_to_html, ConversionOptions};
//!
//! let options = ConversionOptions::default();
//! let html = markdown_to_html("```mermaid\nA-->B\n```", &options).unwrap();
//! assert!(html.contains("data-mermaid"));
//!
//! let markdown = html_to_markdown(&html, &options).unwrap();
//! assert_eq!(markdown, "```mermaid\nA-->B\n```\n");
//! ```
//!
//! ## Example (service with a custom rule)
//!
//! ```rust
//! use mdbridge::{ConversionOptions, ConversionService, Rule};
//!
//! let mut service = ConversionService::new();
//! service.add_rule(
//!     "kbd",
//!     Rule::for_tag("kbd", |node, walker| format!("<kbd>{}</kbd>", walker.children(node))),
//! );
//!
//! let markdown = service
//!     .html_to_markdown("<p>Press <kbd>Enter</kbd></p>", &ConversionOptions::unsanitized())
//!     .unwrap();
//! assert_eq!(markdown, "Press <kbd>Enter</kbd>\n");
//! ```

pub mod diagram;
pub mod node;
mod parser;
mod render;
mod rules;
pub mod sanitize;
mod service;
mod utilities;

pub use diagram::{DiagramCodec, DiagramForm};
pub use mdbridge_core::{
    Block, CodeBlockStyle, HeadingStyle, Inline, ListItem, Options, Root, TableCell, TableRow,
};
pub use rules::{Filter, ReplacementFn, Rule, Rules};
pub use sanitize::{AmmoniaSanitizer, BoxError, NoopSanitizer, Sanitizer};
pub use service::{ConversionOptions, ConversionService, Walker};

/// Error type for conversion operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The sanitizer failed; its error is passed through unmodified
    #[error(transparent)]
    Sanitizer(BoxError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parse Markdown into a document tree. Never fails; the empty string gives
/// an empty [`Root`].
pub fn parse_markdown(markdown: &str) -> Root {
    parser::parse(markdown)
}

/// Serialize a document tree to Markdown with default options
pub fn stringify_markdown(tree: &Root) -> String {
    mdbridge_core::stringify(tree, &Options::default())
}

/// Parse and re-serialize Markdown
pub fn normalize_markdown(markdown: &str) -> String {
    stringify_markdown(&parse_markdown(markdown))
}

/// Convert Markdown to HTML using a default [`ConversionService`]
pub fn markdown_to_html(markdown: &str, options: &ConversionOptions) -> Result<String> {
    ConversionService::new().markdown_to_html(markdown, options)
}

/// Convert HTML to Markdown using a default [`ConversionService`]
pub fn html_to_markdown(html: &str, options: &ConversionOptions) -> Result<String> {
    ConversionService::new().html_to_markdown(html, options)
}
