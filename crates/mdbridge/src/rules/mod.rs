//! Rule system for HTML to Markdown conversion.

mod gfm;
mod rule;

pub use gfm::gfm_rules;
pub use rule::{Filter, ReplacementFn, Rule};

use indexmap::IndexMap;
use scraper::ElementRef;

/// Collection of rules for conversion
pub struct Rules {
    /// Custom rules added by the user (checked first, in insertion order)
    custom_rules: IndexMap<String, Rule>,
    /// Built-in GFM rules
    gfm_rules: Vec<Rule>,
}

impl Rules {
    /// Create a new Rules instance with the GFM rules
    pub fn new() -> Self {
        Self {
            custom_rules: IndexMap::new(),
            gfm_rules: gfm_rules(),
        }
    }

    /// Add a custom rule; a rule with the same key is replaced in place
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom_rules.insert(key.to_string(), rule);
    }

    /// Find the appropriate rule for an element
    pub fn for_element<'a>(&'a self, tag: &str, element: &ElementRef) -> Option<&'a Rule> {
        if let Some((key, rule)) = self
            .custom_rules
            .iter()
            .find(|(_, rule)| rule.filter.matches(tag, element))
        {
            log::trace!("custom rule {} matched <{}>", key, tag);
            return Some(rule);
        }

        self.gfm_rules
            .iter()
            .find(|rule| rule.filter.matches(tag, element))
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}
