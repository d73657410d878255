//! The read-only view of a document tree that the evaluator walks.
//!
//! The distiller never builds or mutates markup itself: anything that can
//! answer the questions in [`DocumentNode`] can be distilled. An
//! implementation for [`scraper`] documents is provided.

use itertools::Itertools;
use scraper::{ElementRef, Html};

/// A single element of a parsed document.
pub trait DocumentNode: Clone {
    /// The element's local name, e.g. `p` or `body`.
    fn name(&self) -> &str;

    /// Looks up an attribute by its qualified name (`about`, `xml:lang`, ...).
    fn attr(&self, name: &str) -> Option<&str>;

    /// All attributes, keyed by qualified name.
    fn attrs(&self) -> Vec<(String, &str)>;

    /// Child elements, in document order. Text and comments are not included.
    fn element_children(&self) -> Vec<Self>;

    /// The enclosing element, or `None` for the root element.
    fn parent_element(&self) -> Option<Self>;

    /// Identity comparison: do both values refer to the same element?
    fn is_same_element(&self, other: &Self) -> bool;

    /// The concatenation of all descendant text nodes.
    fn text_content(&self) -> String;

    /// The serialized markup of all descendants, excluding the element itself.
    fn inner_markup(&self) -> String;

    fn has_element_children(&self) -> bool {
        !self.element_children().is_empty()
    }

    /// An `html>head>p`-style path, used in trace output and diagnostics.
    fn path(&self) -> String {
        let mut names = vec![self.name().to_string()];
        let mut current = self.parent_element();
        while let Some(parent) = current {
            names.push(parent.name().to_string());
            current = parent.parent_element();
        }
        names.iter().rev().join(">")
    }
}

impl DocumentNode for ElementRef<'_> {
    fn name(&self) -> &str {
        self.value().name()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn attrs(&self) -> Vec<(String, &str)> {
        self.value()
            .attrs
            .iter()
            .map(|(qn, val)| {
                let name = match qn.prefix.as_deref() {
                    Some(prefix) => format!("{prefix}:{}", qn.local.as_ref()),
                    None => qn.local.to_string(),
                };
                (name, val.as_ref())
            })
            .collect()
    }

    fn element_children(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn is_same_element(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    fn text_content(&self) -> String {
        ElementRef::text(self).collect()
    }

    fn inner_markup(&self) -> String {
        self.inner_html()
    }
}

/// Finds the `href` of the first `<base>` inside `<head>`, if any.
pub fn html_base_href(document: &Html) -> Option<&str> {
    let selector = scraper::Selector::parse("html>head>base[href]").ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|base| base.value().attr("href"))
}
