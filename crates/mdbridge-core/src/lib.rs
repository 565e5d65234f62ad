//! mdbridge-core - Markdown document tree and serialization
//!
//! This crate provides the document tree shared by the `mdbridge` converters
//! and the serializer that turns a tree back into canonical Markdown.
//!
//! # Architecture
//!
//! ```text
//! Markdown ──parse──▶ ┌───────────────┐ ──render──▶ HTML
//!                     │ Document tree │
//! Markdown ◀─stringify┤               │
//!                     └───────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use mdbridge_core::{stringify, Block, Inline, Options, Root};
//!
//! let tree = Root::new(vec![
//!     Block::Heading {
//!         depth: 1,
//!         children: vec![Inline::text("Hello World")],
//!     },
//!     Block::Paragraph(vec![
//!         Inline::text("This is "),
//!         Inline::Strong(vec![Inline::text("bold")]),
//!         Inline::text(" text."),
//!     ]),
//! ]);
//!
//! let markdown = stringify(&tree, &Options::default());
//! assert_eq!(markdown, "# Hello World\n\nThis is **bold** text.\n");
//! ```

mod ast;
mod options;
mod serialize;

pub use ast::{Block, Inline, ListItem, Root, TableCell, TableRow};
pub use options::{CodeBlockStyle, HeadingStyle, Options};
pub use serialize::{fence_for, stringify};
