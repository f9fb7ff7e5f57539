//! Path-like selector implementation of the addressing layer

use std::collections::HashSet;

use portweave_core::{PortId, Token, WeaveError, WeaveResult};
use tracing::trace;

use crate::path::{parse_selector, path_matches, paths_overlap, Path};
use crate::{Addressing, PortMatcher};

/// Selector configuration
#[derive(Clone, Debug)]
pub struct SelectorConfig {
    /// Maximum number of identifiers one selector may expand to
    pub max_expansion: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            max_expansion: 1 << 20,
        }
    }
}

impl SelectorConfig {
    /// Small expansion limit for tests and fuzzing
    pub fn small() -> Self {
        SelectorConfig {
            max_expansion: 1 << 12,
        }
    }
}

/// Path-like selectors (`/foo[0:3]`, `/[a,b]/*`, `/x[0],/y[1]`)
#[derive(Clone, Debug, Default)]
pub struct PathSelector {
    config: SelectorConfig,
}

/// Parsed selector ready for repeated matching
#[derive(Clone, Debug)]
pub struct CompiledSelector {
    paths: Vec<Path>,
}

impl PortMatcher for CompiledSelector {
    fn matches(&self, id: &PortId) -> bool {
        self.paths.iter().any(|p| path_matches(p, id))
    }
}

impl PathSelector {
    pub fn new() -> Self {
        PathSelector::default()
    }

    pub fn with_config(config: SelectorConfig) -> Self {
        PathSelector { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    fn expand_paths(&self, selector: &str, paths: &[Path]) -> WeaveResult<Vec<PortId>> {
        let mut total = 0usize;
        for path in paths {
            let mut count = 1usize;
            for level in path {
                let width = level
                    .width()
                    .ok_or_else(|| WeaveError::AmbiguousSelector(selector.to_string()))?;
                count = count.saturating_mul(width);
            }
            total = total.saturating_add(count);
        }
        if total > self.config.max_expansion {
            return Err(WeaveError::ExpansionLimit {
                selector: selector.to_string(),
                limit: self.config.max_expansion,
            });
        }

        let mut ids = Vec::with_capacity(total);
        for path in paths {
            let mut partial: Vec<Vec<Token>> = vec![Vec::with_capacity(path.len())];
            for level in path {
                let tokens = level.expand();
                let mut next = Vec::with_capacity(partial.len() * tokens.len());
                for prefix in &partial {
                    for t in &tokens {
                        let mut row = prefix.clone();
                        row.push(t.clone());
                        next.push(row);
                    }
                }
                partial = next;
            }
            ids.extend(partial.into_iter().map(PortId::new));
        }
        Ok(ids)
    }
}

impl Addressing for PathSelector {
    fn parse(&self, selector: &str) -> WeaveResult<Vec<Path>> {
        parse_selector(selector)
    }

    fn is_ambiguous(&self, selector: &str) -> WeaveResult<bool> {
        let paths = parse_selector(selector)?;
        Ok(paths.iter().flatten().any(|level| level.is_ambiguous()))
    }

    fn are_disjoint(&self, selectors: &[&str]) -> WeaveResult<bool> {
        let parsed = selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<WeaveResult<Vec<_>>>()?;
        for (i, a) in parsed.iter().enumerate() {
            for b in &parsed[i + 1..] {
                if a.iter().any(|pa| b.iter().any(|pb| paths_overlap(pa, pb))) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn max_levels(&self, selector: &str) -> WeaveResult<usize> {
        let paths = parse_selector(selector)?;
        Ok(paths.iter().map(|p| p.len()).max().unwrap_or(0))
    }

    fn make_index(&self, selector: &str) -> WeaveResult<Vec<PortId>> {
        let paths = parse_selector(selector)?;
        if paths.iter().flatten().any(|level| level.is_ambiguous()) {
            return Err(WeaveError::AmbiguousSelector(selector.to_string()));
        }
        let ids = self.expand_paths(selector, &paths)?;

        if let Some(first) = ids.first() {
            let expected = first.levels();
            if let Some(bad) = ids.iter().find(|id| id.levels() != expected) {
                return Err(WeaveError::ArityMismatch {
                    expected,
                    actual: bad.levels(),
                });
            }
        }

        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(id) {
                return Err(WeaveError::DuplicateIdentifier(id.to_selector()));
            }
        }

        trace!(selector, count = ids.len(), "expanded selector");
        Ok(ids)
    }

    fn matcher(&self, selector: &str) -> WeaveResult<Box<dyn PortMatcher>> {
        Ok(Box::new(CompiledSelector {
            paths: parse_selector(selector)?,
        }))
    }

    fn is_identifier(&self, selector: &str) -> bool {
        match parse_selector(selector) {
            Ok(paths) => {
                paths.len() == 1 && paths[0].iter().all(|level| level.single_token().is_some())
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portweave_core::port;
    use proptest::prelude::*;

    #[test]
    fn test_make_index_order() {
        let sel = PathSelector::new();
        let ids = sel.make_index("/[bbb,aaa][0:2]").unwrap();
        assert_eq!(
            ids,
            vec![
                port!("bbb", 0),
                port!("bbb", 1),
                port!("aaa", 0),
                port!("aaa", 1),
            ]
        );
        assert!(sel.make_index("").unwrap().is_empty());
    }

    #[test]
    fn test_make_index_rejects_duplicates() {
        let sel = PathSelector::new();
        let err = sel.make_index("/foo[0],/foo[0]").unwrap_err();
        assert!(matches!(err, WeaveError::DuplicateIdentifier(_)));
    }

    #[test]
    fn test_make_index_rejects_ambiguous() {
        let sel = PathSelector::new();
        assert!(sel.is_ambiguous("/foo/*").unwrap());
        assert!(sel.is_ambiguous("/foo[1:]").unwrap());
        assert!(!sel.is_ambiguous("/foo[:4]").unwrap());
        assert!(matches!(
            sel.make_index("/foo[*]"),
            Err(WeaveError::AmbiguousSelector(_))
        ));
    }

    #[test]
    fn test_make_index_arity() {
        let sel = PathSelector::new();
        assert!(matches!(
            sel.make_index("/foo[0],/bar"),
            Err(WeaveError::ArityMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_expansion_limit() {
        let sel = PathSelector::with_config(SelectorConfig { max_expansion: 10 });
        assert!(matches!(
            sel.make_index("/foo[0:11]"),
            Err(WeaveError::ExpansionLimit { limit: 10, .. })
        ));
        assert_eq!(sel.make_index("/foo[0:10]").unwrap().len(), 10);
    }

    #[test]
    fn test_expansion_limit_extreme_bounds() {
        let sel = PathSelector::new();
        for selector in [
            "/a[-5:9223372036854775807]",
            "/a[-9223372036854775808:9223372036854775807]",
            "/a[0:9223372036854775807,-9223372036854775808:0]",
        ] {
            assert!(matches!(
                sel.make_index(selector),
                Err(WeaveError::ExpansionLimit { .. })
            ));
        }
        assert!(sel.make_index("/a[9223372036854775807:-5]").unwrap().is_empty());
    }

    #[test]
    fn test_disjoint() {
        let sel = PathSelector::new();
        assert!(sel.are_disjoint(&["/foo[0:3]", "/bar[0:3]"]).unwrap());
        assert!(!sel.are_disjoint(&["/aaa[0:3]", "/aaa[0:2]"]).unwrap());
        assert!(!sel.are_disjoint(&["/x[0:3]", "/y[0]", "/x[2]"]).unwrap());
        assert!(sel.are_disjoint(&["/aaa[0:3]", "/aaa[3:5]"]).unwrap());
    }

    #[test]
    fn test_select_and_get_index() {
        let sel = PathSelector::new();
        let ids = sel.make_index("/foo[0:4]").unwrap();
        let hits = sel.select(&ids, "/foo[1:3]").unwrap();
        assert_eq!(hits, vec![&port!("foo", 1), &port!("foo", 2)]);
        assert!(sel.select(&ids, "/bar").unwrap().is_empty());
        assert!(sel.get_index(&ids, "/bar[0]").is_err());
        assert_eq!(sel.get_index(&ids, "/foo/*").unwrap().len(), 4);
    }

    #[test]
    fn test_identifiers() {
        let sel = PathSelector::new();
        assert!(sel.is_identifier("/foo[0]"));
        assert!(!sel.is_identifier("/foo[0:2]"));
        assert!(!sel.is_identifier("/foo[0],/foo[1]"));
        assert!(!sel.is_identifier("/foo/*"));
        assert_eq!(sel.to_identifier(&port!("foo", "bar", 3)), "/foo/bar[3]");
        assert_eq!(sel.max_levels("/a[0],/b/c[1]").unwrap(), 3);
    }

    proptest! {
        #[test]
        fn prop_index_roundtrip(names in proptest::collection::btree_set("[a-z]{1,6}", 1..4), n in 1i64..20) {
            let sel = PathSelector::new();
            let list = names.iter().cloned().collect::<Vec<_>>().join(",");
            let selector = format!("/[{}][0:{}]", list, n);
            let ids = sel.make_index(&selector).unwrap();
            prop_assert_eq!(ids.len(), names.len() * n as usize);

            // Each identifier renders to a selector that expands back to itself
            for id in &ids {
                let single = sel.to_identifier(id);
                prop_assert!(sel.is_identifier(&single));
                prop_assert_eq!(sel.make_index(&single).unwrap(), vec![id.clone()]);
            }

            // Re-expansion is idempotent
            let again = sel.make_index(&selector).unwrap();
            prop_assert_eq!(ids, again);
        }

        #[test]
        fn prop_disjoint_matches_expansion(a in 0i64..10, b in 0i64..10, c in 0i64..10, d in 0i64..10) {
            let sel = PathSelector::new();
            let s1 = format!("/p[{}:{}]", a, a + b);
            let s2 = format!("/p[{}:{}]", c, c + d);
            let x: HashSet<PortId> = sel.make_index(&s1).unwrap().into_iter().collect();
            let y: HashSet<PortId> = sel.make_index(&s2).unwrap().into_iter().collect();
            prop_assert_eq!(sel.are_disjoint(&[&s1, &s2]).unwrap(), x.is_disjoint(&y));
        }
    }
}
