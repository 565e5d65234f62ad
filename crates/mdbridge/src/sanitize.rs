//! HTML sanitization seam.
//!
//! Both conversion directions pass HTML through a [`Sanitizer`] when
//! sanitization is enabled. The default implementation is backed by
//! `ammonia`, with an allow-list extended for the markup the renderer emits.

use crate::diagram::{CODE_ATTR, LEGACY_TYPE_ATTR, MARKER_ATTR};

/// Error type a sanitizer may report; passed to callers untouched
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Strips unsafe markup from an HTML string.
///
/// Implementations must be callable concurrently and must not retain input
/// between calls. They must keep the diagram marker and source attributes.
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, html: &str) -> Result<String, BoxError>;
}

impl<F> Sanitizer for F
where
    F: Fn(&str) -> Result<String, BoxError> + Send + Sync,
{
    fn sanitize(&self, html: &str) -> Result<String, BoxError> {
        self(html)
    }
}

/// `ammonia`-backed sanitizer.
///
/// Keeps the default safe tag set and adds: the diagram attributes on `div`,
/// `class` on `code` (language markers), checkbox inputs for task items,
/// `start` on `ol`. Script and style elements are removed with their content.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmmoniaSanitizer;

impl AmmoniaSanitizer {
    pub fn new() -> Self {
        Self
    }

    fn builder() -> ammonia::Builder<'static> {
        let mut builder = ammonia::Builder::default();
        builder
            .add_tags(&["input", "label"])
            .add_tag_attributes("div", &[MARKER_ATTR, CODE_ATTR, LEGACY_TYPE_ATTR])
            .add_tag_attributes("code", &["class"])
            .add_tag_attributes("input", &["type", "checked", "disabled"])
            .add_tag_attributes("li", &["data-checked", LEGACY_TYPE_ATTR])
            .add_tag_attributes("ol", &["start"])
            .link_rel(None);
        builder
    }
}

impl Sanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> Result<String, BoxError> {
        Ok(Self::builder().clean(html).to_string())
    }
}

/// Sanitizer that returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSanitizer;

impl Sanitizer for NoopSanitizer {
    fn sanitize(&self, html: &str) -> Result<String, BoxError> {
        Ok(html.to_string())
    }
}
