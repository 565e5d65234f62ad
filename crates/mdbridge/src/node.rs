//! DOM accessors used by the HTML to Markdown rules.
//!
//! `scraper` exposes the parsed DOM as [`ElementRef`]; this extension trait
//! adds the handful of lookups the rules and diagram forms rely on.

use scraper::ElementRef;

/// Convenience accessors on a parsed HTML element
pub trait ElementExt<'a> {
    /// Get the tag name (lowercase)
    fn tag_name(&self) -> &'a str;

    /// Get an attribute value by name
    fn attr(&self, name: &str) -> Option<&'a str>;

    /// Check if an attribute exists
    fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Check if the `class` attribute contains `class`
    fn has_class(&self, class: &str) -> bool;

    /// Tag name of the parent element, if any
    fn parent_tag(&self) -> Option<&'a str>;

    /// Child elements, skipping text and comments
    fn element_children(&self) -> Box<dyn Iterator<Item = ElementRef<'a>> + 'a>;

    /// First descendant element with the given tag
    fn find_descendant(&self, tag: &str) -> Option<ElementRef<'a>>;

    /// Concatenated text of all descendant text nodes
    fn text_content(&self) -> String;

    /// Whether this is a `<ul>` or `<ol>`
    fn is_list(&self) -> bool {
        matches!(self.tag_name(), "ul" | "ol")
    }

    /// Whether this is an `<input type="checkbox">`
    fn is_checkbox(&self) -> bool {
        self.tag_name() == "input"
            && self
                .attr("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
    }
}

impl<'a> ElementExt<'a> for ElementRef<'a> {
    fn tag_name(&self) -> &'a str {
        self.value().name()
    }

    fn attr(&self, name: &str) -> Option<&'a str> {
        self.value().attr(name)
    }

    fn has_class(&self, class: &str) -> bool {
        self.value()
            .attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn parent_tag(&self) -> Option<&'a str> {
        self.parent()
            .and_then(ElementRef::wrap)
            .map(|parent| parent.value().name())
    }

    fn element_children(&self) -> Box<dyn Iterator<Item = ElementRef<'a>> + 'a> {
        Box::new(self.children().filter_map(ElementRef::wrap))
    }

    fn find_descendant(&self, tag: &str) -> Option<ElementRef<'a>> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == tag)
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }
}
