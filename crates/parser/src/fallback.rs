//! Ordered extraction strategies
//!
//! Nodes in the wild disagree on namespaces and element names. Each
//! lookup is expressed as a list of alternatives in priority order; the
//! first alternative that yields something wins and later ones are never
//! consulted.

use crate::document::{Element, Name};

/// Run `extract` for each strategy in order and return the first
/// non-empty result, or an empty collection when all come up empty.
pub fn first_non_empty<S, T, F>(strategies: &[S], mut extract: F) -> Vec<T>
where
    F: FnMut(&S) -> Vec<T>,
{
    strategies
        .iter()
        .map(|strategy| extract(strategy))
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

/// Alternative locations of a single text field
#[derive(Debug, Clone, Copy)]
pub struct FieldPaths<'a> {
    names: &'a [Name<'a>],
}

impl<'a> FieldPaths<'a> {
    pub const fn new(names: &'a [Name<'a>]) -> Self {
        FieldPaths { names }
    }

    /// Text of the first descendant matching the highest-priority name
    /// whose first match carries text.
    ///
    /// Only the first match per name is inspected: a later element with
    /// the same name is not a fallback for an empty earlier one.
    pub fn descendant_text<'e>(&self, element: &'e Element) -> Option<&'e str> {
        self.names
            .iter()
            .find_map(|name| element.find(*name).and_then(Element::text))
    }
}
