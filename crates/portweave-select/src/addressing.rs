//! Addressing layer consumed by port tables and patterns
//!
//! Tables never interpret selector text themselves. Everything that turns a
//! selector into identifiers, or decides ambiguity and disjointness, goes
//! through [`Addressing`].

use std::fmt;

use portweave_core::{PortId, WeaveError, WeaveResult};

use crate::Path;

/// Compiled selector that can test identifiers
pub trait PortMatcher {
    fn matches(&self, id: &PortId) -> bool;
}

/// Resolver from selectors to hierarchical identifiers
pub trait Addressing: fmt::Debug + Send + Sync {
    /// Token form of a selector
    fn parse(&self, selector: &str) -> WeaveResult<Vec<Path>>;

    /// True if the selector does not denote a finite, concrete set
    fn is_ambiguous(&self, selector: &str) -> WeaveResult<bool>;

    /// True if no identifier is denoted by more than one of the selectors
    fn are_disjoint(&self, selectors: &[&str]) -> WeaveResult<bool>;

    /// Largest number of levels of any path in the selector
    fn max_levels(&self, selector: &str) -> WeaveResult<usize>;

    /// Expand an unambiguous selector, in selector order, rejecting duplicates
    fn make_index(&self, selector: &str) -> WeaveResult<Vec<PortId>>;

    /// Compile a selector for repeated matching
    fn matcher(&self, selector: &str) -> WeaveResult<Box<dyn PortMatcher>>;

    /// Canonical selector string of an identifier
    fn to_identifier(&self, id: &PortId) -> String {
        id.to_selector()
    }

    /// True if the text names exactly one concrete identifier
    fn is_identifier(&self, selector: &str) -> bool;

    fn matches(&self, selector: &str, id: &PortId) -> WeaveResult<bool> {
        Ok(self.matcher(selector)?.matches(id))
    }

    /// Identifiers among `ids` matched by the selector; empty if none match
    fn select<'a>(&self, ids: &'a [PortId], selector: &str) -> WeaveResult<Vec<&'a PortId>> {
        let m = self.matcher(selector)?;
        Ok(ids.iter().filter(|id| m.matches(id)).collect())
    }

    /// Like [`Addressing::select`], but a selector that resolves to nothing is an error
    fn get_index(&self, ids: &[PortId], selector: &str) -> WeaveResult<Vec<PortId>> {
        let found: Vec<PortId> = self.select(ids, selector)?.into_iter().cloned().collect();
        if found.is_empty() {
            return Err(WeaveError::AmbiguousSelector(selector.to_string()));
        }
        Ok(found)
    }
}
