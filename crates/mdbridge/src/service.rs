//! ConversionService - the entry point for both conversion directions.

use log::debug;
use mdbridge_core::{stringify, Options, Root};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};

use crate::diagram::{DiagramCodec, DiagramForm};
use crate::node::ElementExt;
use crate::rules::{Rule, Rules};
use crate::sanitize::{AmmoniaSanitizer, Sanitizer};
use crate::utilities::indent_continuation;
use crate::{parser, render, Error, Result};

/// Leading `[ ]` / `[x]` left in an item's text by some editors
static TASK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[.\]\s*").expect("task marker pattern"));

/// Options accepted by every conversion entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Pass HTML through the sanitizer: after rendering (Markdown to HTML)
    /// or before parsing (HTML to Markdown)
    pub sanitize: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self { sanitize: true }
    }
}

impl ConversionOptions {
    /// Options with sanitization turned off
    pub fn unsanitized() -> Self {
        Self { sanitize: false }
    }
}

/// Converts between Markdown and the editor's HTML.
///
/// Markdown to HTML goes through the document tree; HTML to Markdown walks
/// the parsed DOM directly with a rule table. Holds no per-call state, so
/// one instance can serve many documents concurrently.
pub struct ConversionService {
    sanitizer: Box<dyn Sanitizer>,
    rules: Rules,
    diagrams: DiagramCodec,
    markdown_options: Options,
}

impl ConversionService {
    /// Create a service with the ammonia sanitizer and default rules
    pub fn new() -> Self {
        Self::with_sanitizer(AmmoniaSanitizer::new())
    }

    /// Create a service with a caller-supplied sanitizer
    pub fn with_sanitizer<S>(sanitizer: S) -> Self
    where
        S: Sanitizer + 'static,
    {
        Self {
            sanitizer: Box::new(sanitizer),
            rules: Rules::new(),
            diagrams: DiagramCodec::new(),
            markdown_options: Options::default(),
        }
    }

    /// Replace the serializer options used by `stringify` and `normalize`
    pub fn with_markdown_options(mut self, options: Options) -> Self {
        self.markdown_options = options;
        self
    }

    /// Replace the diagram codec
    pub fn with_diagrams(mut self, diagrams: DiagramCodec) -> Self {
        self.diagrams = diagrams;
        self
    }

    /// Recognize an additional diagram encoding, after the built-in ones
    pub fn add_diagram_form<F>(&mut self, form: F) -> &mut Self
    where
        F: DiagramForm + 'static,
    {
        let diagrams = std::mem::take(&mut self.diagrams);
        self.diagrams = diagrams.with_form(form);
        self
    }

    /// Add a custom rule, checked before the built-in ones
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Get the serializer options
    pub fn markdown_options(&self) -> &Options {
        &self.markdown_options
    }

    /// Parse Markdown into a document tree
    pub fn parse(&self, markdown: &str) -> Root {
        parser::parse(markdown)
    }

    /// Serialize a document tree to Markdown
    pub fn stringify(&self, tree: &Root) -> String {
        stringify(tree, &self.markdown_options)
    }

    /// Re-serialize Markdown in canonical form
    pub fn normalize(&self, markdown: &str) -> String {
        self.stringify(&self.parse(markdown))
    }

    /// Convert Markdown to HTML for the editor
    pub fn markdown_to_html(&self, markdown: &str, options: &ConversionOptions) -> Result<String> {
        debug!(
            "markdown to html: {} bytes, sanitize={}",
            markdown.len(),
            options.sanitize
        );

        let tree = self.parse(markdown);
        let html = render::render(&tree);

        if options.sanitize {
            self.sanitize(&html)
        } else {
            Ok(html)
        }
    }

    /// Convert editor HTML back to Markdown
    pub fn html_to_markdown(&self, html: &str, options: &ConversionOptions) -> Result<String> {
        debug!(
            "html to markdown: {} bytes, sanitize={}",
            html.len(),
            options.sanitize
        );

        let clean;
        let html = if options.sanitize {
            clean = self.sanitize(html)?;
            clean.as_str()
        } else {
            html
        };

        let document = Html::parse_fragment(html);
        let walker = Walker::new(&self.rules, &self.diagrams);
        let result = walker.children(&document.root_element());

        Ok(post_process(&result))
    }

    fn sanitize(&self, html: &str) -> Result<String> {
        self.sanitizer.sanitize(html).map_err(Error::Sanitizer)
    }
}

impl Default for ConversionService {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim surrounding blank lines and end with a single newline
fn post_process(output: &str) -> String {
    let trimmed = output.trim_matches('\n');
    if trimmed.trim().is_empty() {
        return String::new();
    }
    format!("{}\n", trimmed)
}

/// Recursive DOM to Markdown conversion, handed to every rule
pub struct Walker<'a> {
    rules: &'a Rules,
    diagrams: &'a DiagramCodec,
}

impl<'a> Walker<'a> {
    fn new(rules: &'a Rules, diagrams: &'a DiagramCodec) -> Self {
        Self { rules, diagrams }
    }

    /// Convert all child nodes of an element and concatenate the results
    pub fn children(&self, element: &ElementRef) -> String {
        let mut result = String::new();

        for child in element.children() {
            match child.value() {
                // Entities are already decoded by the DOM parser
                Node::Text(text) => result.push_str(&text.text),
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        result.push_str(&self.element(&child_element));
                    }
                }
                _ => {}
            }
        }

        result
    }

    /// Convert a single element
    pub fn element(&self, element: &ElementRef) -> String {
        if let Some(source) = self.diagrams.extract(element) {
            return DiagramCodec::fenced_block(&source);
        }

        let tag = element.tag_name();
        match self.rules.for_element(tag, element) {
            Some(rule) => rule.replace(element, self),
            // Unknown elements contribute their children unchanged
            None => self.children(element),
        }
    }

    /// Convert a `<ul>` or `<ol>` into Markdown list lines.
    ///
    /// Each item's own content and its nested lists are converted separately,
    /// then nested lines are indented by the width of the item's marker.
    pub fn list(&self, list: &ElementRef) -> String {
        let ordered = list.tag_name() == "ol";

        let entries: Vec<String> = list
            .element_children()
            .filter(|child| child.tag_name() == "li")
            .enumerate()
            .map(|(index, item)| {
                let marker = if ordered {
                    format!("{}. ", index + 1)
                } else {
                    "- ".to_string()
                };

                let mut body = self.list_item(&item);
                for nested in item.element_children().filter(|c| c.is_list()) {
                    body.push('\n');
                    body.push_str(&self.list(&nested));
                }

                let continuation = " ".repeat(marker.len());
                format!("{}{}", marker, indent_continuation(&body, &continuation))
            })
            .collect();

        entries.join("\n")
    }

    /// Own content of a list item, excluding directly nested lists.
    ///
    /// Task items come out as `[x] text` or `[ ] text`.
    pub fn list_item(&self, item: &ElementRef) -> String {
        let mut checked = item.attr("data-checked").map(|v| v == "true");
        let mut content = String::new();

        for child in item.children() {
            match child.value() {
                Node::Text(text) => content.push_str(&text.text),
                Node::Element(_) => {
                    let Some(element) = ElementRef::wrap(child) else {
                        continue;
                    };
                    if element.is_list() {
                        continue;
                    }
                    if checked.is_none() {
                        checked = own_checkbox(&element).map(|input| input.has_attr("checked"));
                    }
                    content.push_str(&self.element(&element));
                }
                _ => {}
            }
        }

        let content = content.trim();
        match checked {
            Some(checked) => {
                let text = TASK_MARKER.replace(content, "");
                let mark = if checked { 'x' } else { ' ' };
                format!("[{}] {}", mark, text.trim())
            }
            None => content.to_string(),
        }
    }
}

/// Checkbox belonging to an item: `element` itself or a descendant that is
/// not inside a nested list
fn own_checkbox<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    if element.is_checkbox() {
        return Some(*element);
    }
    if element.is_list() {
        return None;
    }
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|candidate| {
            candidate.is_checkbox()
                && !candidate
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .take_while(|ancestor| ancestor != element)
                    .any(|ancestor| ancestor.is_list())
        })
}
