//! Markdown parsing into the document tree.
//!
//! The pulldown-cmark event stream is folded into [`Root`] with an explicit
//! stack of open containers. Constructs the tree has no place for (footnotes,
//! metadata blocks, math) degrade to their text content.

use mdbridge_core::{Block, Inline, ListItem, Root, TableCell, TableRow};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Parse Markdown (with GFM tables, task lists and strikethrough) into a tree.
///
/// Never fails: any input, including the empty string, yields a [`Root`].
pub fn parse(markdown: &str) -> Root {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(markdown, options) {
        builder.event(event);
    }
    builder.finish()
}

/// A container that is still collecting children
enum Open {
    Root,
    Blockquote,
    List { ordered: bool, start: u32 },
    Item { checked: Option<bool> },
    Paragraph,
    Heading(u8),
    CodeBlock { lang: Option<String> },
    HtmlBlock,
    Table,
    Row,
    Cell,
    Strong,
    Emphasis,
    Strikethrough,
    Link { url: String, title: Option<String> },
    Image { url: String, title: Option<String> },
    /// Unsupported container whose content is spliced into the parent
    Transparent,
}

struct Frame {
    open: Open,
    blocks: Vec<Block>,
    inlines: Vec<Inline>,
    items: Vec<ListItem>,
    rows: Vec<TableRow>,
    cells: Vec<TableCell>,
    text: String,
}

impl Frame {
    fn new(open: Open) -> Self {
        Self {
            open,
            blocks: Vec::new(),
            inlines: Vec::new(),
            items: Vec::new(),
            rows: Vec::new(),
            cells: Vec::new(),
            text: String::new(),
        }
    }

    /// Wrap loose inline content (tight list items) into a paragraph
    fn flush_inlines(&mut self) {
        if !self.inlines.is_empty() {
            let inlines = std::mem::take(&mut self.inlines);
            self.blocks.push(Block::Paragraph(inlines));
        }
    }
}

/// What a closed frame hands to its parent
enum Finished {
    Block(Block),
    Inline(Inline),
    Item(ListItem),
    Row(TableRow),
    Cell(TableCell),
    Splice(Vec<Block>, Vec<Inline>),
}

struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame::new(Open::Root)],
        }
    }

    fn top(&mut self) -> &mut Frame {
        // The root frame is never popped before `finish`
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_inline(Inline::Code(code.into_string())),
            Event::InlineMath(math) | Event::DisplayMath(math) => self.text(&math),
            Event::Html(html) => self.html(&html),
            Event::InlineHtml(html) => self.push_inline(Inline::Html(html.into_string())),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.push_inline(Inline::Break),
            Event::Rule => self.push_block(Block::ThematicBreak),
            Event::TaskListMarker(checked) => self.task_marker(checked),
            Event::FootnoteReference(label) => self.text(&format!("[^{}]", label)),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let open = match tag {
            Tag::Paragraph => Open::Paragraph,
            Tag::Heading { level, .. } => Open::Heading(heading_depth(level)),
            Tag::BlockQuote(_) => Open::Blockquote,
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => Open::CodeBlock {
                lang: info
                    .split_whitespace()
                    .next()
                    .map(|lang| lang.to_string()),
            },
            Tag::CodeBlock(CodeBlockKind::Indented) => Open::CodeBlock { lang: None },
            Tag::HtmlBlock => Open::HtmlBlock,
            Tag::List(start) => Open::List {
                ordered: start.is_some(),
                start: start
                    .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
                    .unwrap_or(1),
            },
            Tag::Item => Open::Item { checked: None },
            Tag::Table(_) => Open::Table,
            // Header cells arrive directly inside the head, without a row
            Tag::TableHead | Tag::TableRow => Open::Row,
            Tag::TableCell => Open::Cell,
            Tag::Emphasis => Open::Emphasis,
            Tag::Strong => Open::Strong,
            Tag::Strikethrough => Open::Strikethrough,
            Tag::Link {
                dest_url, title, ..
            } => Open::Link {
                url: dest_url.into_string(),
                title: non_empty(title.into_string()),
            },
            Tag::Image {
                dest_url, title, ..
            } => Open::Image {
                url: dest_url.into_string(),
                title: non_empty(title.into_string()),
            },
            _ => Open::Transparent,
        };
        self.stack.push(Frame::new(open));
    }

    fn end(&mut self, _tag: TagEnd) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(frame) = self.stack.pop() {
            let finished = close(frame);
            self.attach(finished);
        }
    }

    fn attach(&mut self, finished: Finished) {
        match finished {
            Finished::Block(block) => self.push_block(block),
            Finished::Inline(inline) => self.push_inline(inline),
            Finished::Item(item) => self.top().items.push(item),
            Finished::Row(row) => self.top().rows.push(row),
            Finished::Cell(cell) => self.top().cells.push(cell),
            Finished::Splice(blocks, inlines) => {
                for block in blocks {
                    self.push_block(block);
                }
                for inline in inlines {
                    self.push_inline(inline);
                }
            }
        }
    }

    fn push_block(&mut self, block: Block) {
        let top = self.top();
        top.flush_inlines();
        top.blocks.push(block);
    }

    fn push_inline(&mut self, inline: Inline) {
        self.top().inlines.push(inline);
    }

    fn text(&mut self, text: &str) {
        let top = self.top();
        match top.open {
            Open::CodeBlock { .. } | Open::HtmlBlock => top.text.push_str(text),
            _ => {
                // The parser may split one run of text into several events
                if let Some(Inline::Text(last)) = top.inlines.last_mut() {
                    last.push_str(text);
                } else {
                    top.inlines.push(Inline::text(text));
                }
            }
        }
    }

    fn html(&mut self, html: &str) {
        if matches!(self.top().open, Open::HtmlBlock) {
            self.top().text.push_str(html);
        } else {
            self.push_block(Block::RawHtml(html.to_string()));
        }
    }

    fn task_marker(&mut self, checked: bool) {
        // The marker sits inside the item, or inside its first paragraph
        for frame in self.stack.iter_mut().rev() {
            if let Open::Item { checked: slot } = &mut frame.open {
                *slot = Some(checked);
                return;
            }
        }
    }

    fn finish(mut self) -> Root {
        while self.stack.len() > 1 {
            if let Some(frame) = self.stack.pop() {
                let finished = close(frame);
                self.attach(finished);
            }
        }

        let mut root = self
            .stack
            .pop()
            .unwrap_or_else(|| Frame::new(Open::Root));
        root.flush_inlines();
        Root::new(root.blocks)
    }
}

fn close(mut frame: Frame) -> Finished {
    match frame.open {
        Open::Paragraph => Finished::Block(Block::Paragraph(frame.inlines)),
        Open::Heading(depth) => Finished::Block(Block::Heading {
            depth,
            children: frame.inlines,
        }),
        Open::CodeBlock { lang } => {
            let mut value = frame.text;
            if value.ends_with('\n') {
                value.pop();
            }
            Finished::Block(Block::CodeBlock { lang, value })
        }
        Open::HtmlBlock => Finished::Block(Block::RawHtml(frame.text)),
        Open::Blockquote => {
            frame.flush_inlines();
            Finished::Block(Block::Blockquote(frame.blocks))
        }
        Open::List { ordered, start } => Finished::Block(Block::List {
            ordered,
            start,
            children: frame.items,
        }),
        Open::Item { checked } => {
            frame.flush_inlines();
            Finished::Item(ListItem {
                children: frame.blocks,
                checked,
            })
        }
        Open::Table => Finished::Block(Block::Table(frame.rows)),
        Open::Row => Finished::Row(TableRow {
            children: frame.cells,
        }),
        Open::Cell => Finished::Cell(TableCell {
            children: frame.inlines,
        }),
        Open::Strong => Finished::Inline(Inline::Strong(frame.inlines)),
        Open::Emphasis => Finished::Inline(Inline::Emphasis(frame.inlines)),
        Open::Strikethrough => Finished::Inline(Inline::Strikethrough(frame.inlines)),
        Open::Link { url, title } => Finished::Inline(Inline::Link {
            url,
            title,
            children: frame.inlines,
        }),
        Open::Image { url, title } => Finished::Inline(Inline::Image {
            url,
            alt: frame.inlines.iter().map(Inline::plain_text).collect(),
            title,
        }),
        Open::Root | Open::Transparent => Finished::Splice(frame.blocks, frame.inlines),
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Inline {
        Inline::text(value)
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("   \n\n  ").is_empty());
    }

    #[test]
    fn test_paragraph() {
        let root = parse("Hello World");
        assert_eq!(root.children, vec![Block::Paragraph(vec![text("Hello World")])]);
    }

    #[test]
    fn test_headings() {
        let root = parse("# One\n\n###### Six");
        assert_eq!(
            root.children,
            vec![
                Block::Heading {
                    depth: 1,
                    children: vec![text("One")],
                },
                Block::Heading {
                    depth: 6,
                    children: vec![text("Six")],
                },
            ]
        );
    }

    #[test]
    fn test_inline_spans() {
        let root = parse("**b** _i_ ~~s~~ `c`");
        assert_eq!(
            root.children,
            vec![Block::Paragraph(vec![
                Inline::Strong(vec![text("b")]),
                text(" "),
                Inline::Emphasis(vec![text("i")]),
                text(" "),
                Inline::Strikethrough(vec![text("s")]),
                text(" "),
                Inline::Code("c".to_string()),
            ])]
        );
    }

    #[test]
    fn test_soft_break_stays_in_text() {
        let root = parse("one\ntwo");
        assert_eq!(root.children, vec![Block::Paragraph(vec![text("one\ntwo")])]);
    }

    #[test]
    fn test_hard_break() {
        let root = parse("one  \ntwo");
        assert_eq!(
            root.children,
            vec![Block::Paragraph(vec![text("one"), Inline::Break, text("two")])]
        );
    }

    #[test]
    fn test_fenced_code_block() {
        let root = parse("```rust extra\nlet x = 1;\n```");
        assert_eq!(
            root.children,
            vec![Block::CodeBlock {
                lang: Some("rust".to_string()),
                value: "let x = 1;".to_string(),
            }]
        );
    }

    #[test]
    fn test_indented_code_block() {
        let root = parse("    indented");
        assert_eq!(
            root.children,
            vec![Block::CodeBlock {
                lang: None,
                value: "indented".to_string(),
            }]
        );
    }

    #[test]
    fn test_tight_list_items_get_paragraphs() {
        let root = parse("- a\n- b");
        assert_eq!(
            root.children,
            vec![Block::List {
                ordered: false,
                start: 1,
                children: vec![
                    ListItem::from_inlines(vec![text("a")]),
                    ListItem::from_inlines(vec![text("b")]),
                ],
            }]
        );
    }

    #[test]
    fn test_ordered_list_start() {
        match &parse("3. three\n4. four").children[0] {
            Block::List {
                ordered, start, children,
            } => {
                assert!(*ordered);
                assert_eq!(*start, 3);
                assert_eq!(children.len(), 2);
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_task_list() {
        let root = parse("- [x] Done\n- [ ] Todo\n- plain");
        assert_eq!(
            root.children,
            vec![Block::List {
                ordered: false,
                start: 1,
                children: vec![
                    ListItem::task(true, vec![text("Done")]),
                    ListItem::task(false, vec![text("Todo")]),
                    ListItem::from_inlines(vec![text("plain")]),
                ],
            }]
        );
    }

    #[test]
    fn test_nested_list() {
        let root = parse("- outer\n  - inner");
        let Block::List { children, .. } = &root.children[0] else {
            panic!("expected list");
        };
        assert_eq!(children[0].children.len(), 2);
        assert!(matches!(children[0].children[1], Block::List { .. }));
    }

    #[test]
    fn test_blockquote_with_paragraphs() {
        let root = parse("> one\n>\n> two");
        assert_eq!(
            root.children,
            vec![Block::Blockquote(vec![
                Block::Paragraph(vec![text("one")]),
                Block::Paragraph(vec![text("two")]),
            ])]
        );
    }

    #[test]
    fn test_link_and_image() {
        let root = parse("[Example](https://example.com \"Title\") ![Alt *text*](img.png)");
        assert_eq!(
            root.children,
            vec![Block::Paragraph(vec![
                Inline::Link {
                    url: "https://example.com".to_string(),
                    title: Some("Title".to_string()),
                    children: vec![text("Example")],
                },
                text(" "),
                Inline::Image {
                    url: "img.png".to_string(),
                    alt: "Alt text".to_string(),
                    title: None,
                },
            ])]
        );
    }

    #[test]
    fn test_thematic_break() {
        assert_eq!(parse("---").children, vec![Block::ThematicBreak]);
    }

    #[test]
    fn test_table() {
        let root = parse("| A | B |\n| --- | --- |\n| 1 | 2 |");
        let Block::Table(rows) = &root.children[0] else {
            panic!("expected table");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].children.len(), 2);
        assert_eq!(rows[1].children[1].children, vec![text("2")]);
    }

    #[test]
    fn test_raw_html_block() {
        let root = parse("<div>\nhi\n</div>");
        assert!(matches!(&root.children[0], Block::RawHtml(html) if html.contains("<div>")));
    }

    #[test]
    fn test_unclosed_constructs_degrade() {
        let root = parse("**not closed\n\n```\nopen fence");
        assert_eq!(root.children.len(), 2);
        assert_eq!(
            root.children[0],
            Block::Paragraph(vec![text("**not closed")])
        );
    }
}
