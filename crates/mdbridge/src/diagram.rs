//! Diagram block encoding.
//!
//! A fenced code block tagged `mermaid` becomes a block element carrying the
//! diagram source in an attribute, so the rich-text editor never reflows or
//! re-escapes it. Reading HTML back accepts the current element form plus the
//! older encodings still found in saved documents.
//!
//! Recognition is an ordered list of [`DiagramForm`] strategies; the first
//! form that matches an element wins.

use log::trace;
use mdbridge_core::fence_for;
use scraper::ElementRef;

use crate::node::ElementExt;
use crate::utilities::{escape_html, strip_trailing_newline};

/// Fenced code block language that marks a diagram
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

/// Boolean attribute marking the current element form
pub const MARKER_ATTR: &str = "data-mermaid";

/// Attribute holding the raw diagram source
pub const CODE_ATTR: &str = "data-code";

/// Attribute of the legacy `data-type="mermaid"` form
pub const LEGACY_TYPE_ATTR: &str = "data-type";

/// One recognized HTML encoding of a diagram block
pub trait DiagramForm: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Return the diagram source if `element` is encoded in this form
    fn extract(&self, element: &ElementRef<'_>) -> Option<String>;
}

/// `<div data-mermaid="true" data-code="...">`, the form the renderer emits
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerAttributeForm;

impl DiagramForm for MarkerAttributeForm {
    fn name(&self) -> &'static str {
        "marker-attribute"
    }

    fn extract(&self, element: &ElementRef<'_>) -> Option<String> {
        let marker = element.attr(MARKER_ATTR)?;
        if marker.eq_ignore_ascii_case("false") {
            return None;
        }
        Some(source_from_attribute_or_text(element))
    }
}

/// `<pre><code class="language-mermaid">...</code></pre>`
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageClassForm;

impl DiagramForm for LanguageClassForm {
    fn name(&self) -> &'static str {
        "language-class"
    }

    fn extract(&self, element: &ElementRef<'_>) -> Option<String> {
        if element.tag_name() != "pre" {
            return None;
        }
        let class = format!("language-{}", DIAGRAM_LANGUAGE);
        element
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.tag_name() == "code" && e.has_class(&class))
            .map(|code| strip_trailing_newline(&code.text_content()).to_string())
    }
}

/// `<div data-type="mermaid" data-code="...">`, written by older editor builds
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyTypeForm;

impl DiagramForm for LegacyTypeForm {
    fn name(&self) -> &'static str {
        "legacy-type"
    }

    fn extract(&self, element: &ElementRef<'_>) -> Option<String> {
        if element.attr(LEGACY_TYPE_ATTR)? != DIAGRAM_LANGUAGE {
            return None;
        }
        Some(source_from_attribute_or_text(element))
    }
}

fn source_from_attribute_or_text(element: &ElementRef<'_>) -> String {
    match element.attr(CODE_ATTR) {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => strip_trailing_newline(&element.text_content()).to_string(),
    }
}

/// Ordered set of diagram forms plus the emitting side of the encoding
pub struct DiagramCodec {
    forms: Vec<Box<dyn DiagramForm>>,
}

impl DiagramCodec {
    /// Codec recognizing the marker, language-class and legacy forms, in that order
    pub fn new() -> Self {
        Self::empty()
            .with_form(MarkerAttributeForm)
            .with_form(LanguageClassForm)
            .with_form(LegacyTypeForm)
    }

    /// Codec recognizing nothing; diagrams fall back to ordinary code blocks
    pub fn empty() -> Self {
        Self { forms: Vec::new() }
    }

    /// Append a form, tried after all existing ones
    pub fn with_form<F>(mut self, form: F) -> Self
    where
        F: DiagramForm + 'static,
    {
        self.forms.push(Box::new(form));
        self
    }

    /// Names of the recognized forms, in priority order
    pub fn form_names(&self) -> Vec<&'static str> {
        self.forms.iter().map(|f| f.name()).collect()
    }

    /// Extract diagram source from the first matching form
    pub fn extract(&self, element: &ElementRef<'_>) -> Option<String> {
        self.forms.iter().find_map(|form| {
            let source = form.extract(element)?;
            trace!(
                "diagram recognized as {} on <{}> ({} bytes)",
                form.name(),
                element.tag_name(),
                source.len()
            );
            Some(source)
        })
    }

    /// HTML element form for a diagram source
    pub fn render_element(source: &str) -> String {
        format!(
            r#"<div {}="true" {}="{}"></div>"#,
            MARKER_ATTR,
            CODE_ATTR,
            escape_html(source)
        )
    }

    /// Markdown fenced block for a diagram source
    pub fn fenced_block(source: &str) -> String {
        let fence = fence_for(source, "```");
        format!("{fence}{DIAGRAM_LANGUAGE}\n{source}\n{fence}\n\n")
    }
}

impl Default for DiagramCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn extract_first(codec: &DiagramCodec, html: &str) -> Option<String> {
        let document = Html::parse_fragment(html);
        let root = document.root_element();
        let element = root.element_children().next()?;
        codec.extract(&element)
    }

    #[test]
    fn test_render_element_escapes_source() {
        let html = DiagramCodec::render_element("A --> B & \"c\"");
        assert_eq!(
            html,
            r#"<div data-mermaid="true" data-code="A --&gt; B &amp; &quot;c&quot;"></div>"#
        );
    }

    #[test]
    fn test_marker_form_reads_attribute() {
        let codec = DiagramCodec::new();
        let source = extract_first(
            &codec,
            r#"<div data-mermaid="true" data-code="graph TD&#10;  A --&gt; B"></div>"#,
        );
        assert_eq!(source.as_deref(), Some("graph TD\n  A --> B"));
    }

    #[test]
    fn test_marker_form_falls_back_to_text() {
        let codec = DiagramCodec::new();
        let source = extract_first(&codec, "<div data-mermaid>A --&gt; B\n</div>");
        assert_eq!(source.as_deref(), Some("A --> B"));
    }

    #[test]
    fn test_language_class_form() {
        let codec = DiagramCodec::new();
        let source = extract_first(
            &codec,
            r#"<pre><code class="language-mermaid">sequenceDiagram
    A->>B: Hello
</code></pre>"#,
        );
        assert_eq!(source.as_deref(), Some("sequenceDiagram\n    A->>B: Hello"));
    }

    #[test]
    fn test_legacy_type_form() {
        let codec = DiagramCodec::new();
        let source = extract_first(
            &codec,
            r#"<div data-type="mermaid" data-code="A --&gt; B"></div>"#,
        );
        assert_eq!(source.as_deref(), Some("A --> B"));
    }

    #[test]
    fn test_ordinary_elements_are_not_diagrams() {
        let codec = DiagramCodec::new();
        assert_eq!(extract_first(&codec, "<div data-type=\"note\">x</div>"), None);
        assert_eq!(
            extract_first(&codec, r#"<pre><code class="language-rust">x</code></pre>"#),
            None
        );
        assert_eq!(extract_first(&codec, r#"<div data-mermaid="false">x</div>"#), None);
    }

    #[test]
    fn test_empty_codec_recognizes_nothing() {
        let codec = DiagramCodec::empty();
        assert!(codec.form_names().is_empty());
        assert_eq!(
            extract_first(&codec, r#"<div data-mermaid="true" data-code="x"></div>"#),
            None
        );
    }

    #[test]
    fn test_form_priority() {
        assert_eq!(
            DiagramCodec::new().form_names(),
            vec!["marker-attribute", "language-class", "legacy-type"]
        );
    }

    #[test]
    fn test_fenced_block() {
        assert_eq!(
            DiagramCodec::fenced_block("A --> B"),
            "```mermaid\nA --> B\n```\n\n"
        );
    }
}
