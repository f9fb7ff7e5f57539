//! Path-like selector syntax
//!
//! ```text
//! selector := path ("," path)*
//! path     := step+
//! step     := "/" name | "/*" | "/[" items "]" | "[" items "]" | "[*]"
//! items    := item ("," item)*
//! item     := int | int? ":" int? | name
//! ```
//!
//! Each path denotes the product of its per-level token sets, so two paths
//! intersect exactly when they have the same length and every level pair
//! intersects.

use portweave_core::{PortId, Token, WeaveError, WeaveResult};

/// One element inside a level
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Token(Token),
    /// Half-open integer range; `stop == None` is open-ended
    Range { start: i64, stop: Option<i64> },
}

impl Item {
    fn matches(&self, token: &Token) -> bool {
        match self {
            Item::Token(t) => t == token,
            Item::Range { start, stop } => match token.as_int() {
                Some(v) => v >= *start && stop.map_or(true, |s| v < s),
                None => false,
            },
        }
    }

    fn overlaps(&self, other: &Item) -> bool {
        match (self, other) {
            (Item::Token(a), b) => b.matches(a),
            (a, Item::Token(b)) => a.matches(b),
            (
                Item::Range { start: s1, stop: e1 },
                Item::Range { start: s2, stop: e2 },
            ) => {
                let lo = (*s1).max(*s2);
                let hi = match (e1, e2) {
                    (Some(a), Some(b)) => Some((*a).min(*b)),
                    (Some(a), None) | (None, Some(a)) => Some(*a),
                    (None, None) => None,
                };
                hi.map_or(true, |h| lo < h)
            }
        }
    }
}

/// One level of a path
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Level {
    /// Wildcard, matches any token
    Any,
    Items(Vec<Item>),
}

impl Level {
    pub fn is_ambiguous(&self) -> bool {
        match self {
            Level::Any => true,
            Level::Items(items) => items
                .iter()
                .any(|i| matches!(i, Item::Range { stop: None, .. })),
        }
    }

    pub fn matches(&self, token: &Token) -> bool {
        match self {
            Level::Any => true,
            Level::Items(items) => items.iter().any(|i| i.matches(token)),
        }
    }

    pub fn overlaps(&self, other: &Level) -> bool {
        match (self, other) {
            (Level::Any, _) | (_, Level::Any) => true,
            (Level::Items(a), Level::Items(b)) => {
                a.iter().any(|x| b.iter().any(|y| x.overlaps(y)))
            }
        }
    }

    /// Upper bound on the number of tokens this level expands to
    pub(crate) fn width(&self) -> Option<usize> {
        match self {
            Level::Any => None,
            Level::Items(items) => items.iter().try_fold(0usize, |acc, item| match item {
                Item::Token(_) => Some(acc.saturating_add(1)),
                Item::Range { start, stop } => {
                    let stop = (*stop)?;
                    let n = (i128::from(stop) - i128::from(*start)).max(0);
                    Some(acc.saturating_add(usize::try_from(n).unwrap_or(usize::MAX)))
                }
            }),
        }
    }

    /// Concrete tokens, in selector order. Only valid for unambiguous levels.
    pub(crate) fn expand(&self) -> Vec<Token> {
        match self {
            Level::Any => Vec::new(),
            Level::Items(items) => {
                let mut out = Vec::new();
                for item in items {
                    match item {
                        Item::Token(t) => out.push(t.clone()),
                        Item::Range { start, stop: Some(stop) } => {
                            out.extend((*start..*stop).map(Token::Int));
                        }
                        Item::Range { stop: None, .. } => {}
                    }
                }
                out
            }
        }
    }

    /// The single token of a concrete level (`/foo`, `[3]`)
    pub(crate) fn single_token(&self) -> Option<&Token> {
        match self {
            Level::Items(items) if items.len() == 1 => match &items[0] {
                Item::Token(t) => Some(t),
                Item::Range { .. } => None,
            },
            _ => None,
        }
    }
}

/// A sequence of levels
pub type Path = Vec<Level>;

pub(crate) fn path_matches(path: &[Level], id: &PortId) -> bool {
    path.len() == id.levels()
        && path
            .iter()
            .zip(id.tokens())
            .all(|(level, token)| level.matches(token))
}

pub(crate) fn paths_overlap(a: &[Level], b: &[Level]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.overlaps(y))
}

/// Parse a selector into its paths. The empty selector has no paths.
pub fn parse_selector(selector: &str) -> WeaveResult<Vec<Path>> {
    let chars: Vec<char> = selector.chars().filter(|c| !c.is_whitespace()).collect();
    let mut parser = Parser {
        selector,
        chars,
        pos: 0,
    };
    parser.selector()
}

struct Parser<'a> {
    selector: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> WeaveError {
        WeaveError::InvalidSelector {
            selector: self.selector.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn selector(&mut self) -> WeaveResult<Vec<Path>> {
        let mut paths = Vec::new();
        if self.chars.is_empty() {
            return Ok(paths);
        }
        loop {
            paths.push(self.path()?);
            match self.bump() {
                None => return Ok(paths),
                Some(',') => continue,
                Some(c) => return Err(self.error(format!("unexpected `{}` at {}", c, self.pos - 1))),
            }
        }
    }

    fn path(&mut self) -> WeaveResult<Path> {
        let mut levels = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '/' => {
                    self.bump();
                    match self.peek() {
                        Some('*') => {
                            self.bump();
                            levels.push(Level::Any);
                        }
                        Some('[') => levels.push(self.bracket()?),
                        _ => {
                            let name = self.name();
                            if name.is_empty() {
                                return Err(self.error(format!("empty name at {}", self.pos)));
                            }
                            levels.push(Level::Items(vec![Item::Token(Token::Str(name))]));
                        }
                    }
                }
                '[' => levels.push(self.bracket()?),
                _ => break,
            }
        }
        if levels.is_empty() {
            return Err(self.error(format!("expected `/` or `[` at {}", self.pos)));
        }
        Ok(levels)
    }

    fn name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        name
    }

    fn bracket(&mut self) -> WeaveResult<Level> {
        self.bump(); // '['
        if self.peek() == Some('*') {
            self.bump();
            return match self.bump() {
                Some(']') => Ok(Level::Any),
                _ => Err(self.error("expected `]` after `*`")),
            };
        }
        let mut items = Vec::new();
        let mut raw = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated `[`")),
                Some(',') => {
                    items.push(self.item(&raw)?);
                    raw.clear();
                }
                Some(']') => {
                    items.push(self.item(&raw)?);
                    return Ok(Level::Items(items));
                }
                Some(c) => raw.push(c),
            }
        }
    }

    fn item(&self, raw: &str) -> WeaveResult<Item> {
        if raw.is_empty() {
            return Err(self.error("empty bracket item"));
        }
        if let Some((start, stop)) = raw.split_once(':') {
            let start = if start.is_empty() {
                0
            } else {
                start
                    .parse::<i64>()
                    .map_err(|_| self.error(format!("bad range start `{}`", start)))?
            };
            let stop = if stop.is_empty() {
                None
            } else {
                Some(
                    stop.parse::<i64>()
                        .map_err(|_| self.error(format!("bad range stop `{}`", stop)))?,
                )
            };
            return Ok(Item::Range { start, stop });
        }
        if let Ok(v) = raw.parse::<i64>() {
            return Ok(Item::Token(Token::Int(v)));
        }
        if raw
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            return Ok(Item::Token(Token::Str(raw.to_string())));
        }
        Err(self.error(format!("bad bracket item `{}`", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let paths = parse_selector("/foo[0:3]").unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(
            paths[0],
            vec![
                Level::Items(vec![Item::Token(Token::Str("foo".into()))]),
                Level::Items(vec![Item::Range { start: 0, stop: Some(3) }]),
            ]
        );
    }

    #[test]
    fn test_parse_lists_and_union() {
        let paths = parse_selector("/[aaa,bbb][0:3], /x[1,4]").unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0][0].expand(), vec![Token::from("aaa"), Token::from("bbb")]);
        assert_eq!(paths[1][1].expand(), vec![Token::Int(1), Token::Int(4)]);
    }

    #[test]
    fn test_parse_wildcards() {
        let paths = parse_selector("/foo/*[2:]").unwrap();
        assert!(!paths[0][0].is_ambiguous());
        assert!(paths[0][1].is_ambiguous());
        assert!(paths[0][2].is_ambiguous());
        assert!(paths[0][2].matches(&Token::Int(7)));
        assert!(!paths[0][2].matches(&Token::Int(1)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_selector("foo").is_err());
        assert!(parse_selector("/foo[").is_err());
        assert!(parse_selector("/foo[]").is_err());
        assert!(parse_selector("/foo[a:b]").is_err());
        assert!(parse_selector("/foo,").is_err());
        assert!(parse_selector("/").is_err());
    }

    #[test]
    fn test_overlap() {
        let a = parse_selector("/aaa[0:3]").unwrap();
        let b = parse_selector("/aaa[2:5]").unwrap();
        let c = parse_selector("/aaa[3:5]").unwrap();
        let d = parse_selector("/aaa[*]").unwrap();
        assert!(paths_overlap(&a[0], &b[0]));
        assert!(!paths_overlap(&a[0], &c[0]));
        assert!(paths_overlap(&c[0], &d[0]));
        assert!(!paths_overlap(&a[0], &parse_selector("/aaa").unwrap()[0]));
    }
}
