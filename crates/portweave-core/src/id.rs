//! Port identifiers
//!
//! A port is addressed by a fixed-arity tuple of tokens. String tokens render
//! as path segments (`/foo`), integer tokens as indices (`[0]`), so the
//! canonical selector of `('foo', 0)` is `/foo[0]`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One level of a port identifier
///
/// Ordering is level-wise canonical: integers sort before strings, integers
/// numerically, strings lexicographically.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    Int(i64),
    Str(String),
}

impl Token {
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Token::Int(v) => Some(*v),
            Token::Str(_) => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::Str(s) => Some(s),
            Token::Int(_) => None,
        }
    }

    /// Parse a raw field: integers become `Int`, anything else `Str`
    pub fn parse_field(raw: &str) -> Token {
        match raw.parse::<i64>() {
            Ok(v) => Token::Int(v),
            Err(_) => Token::Str(raw.to_string()),
        }
    }
}

impl From<i64> for Token {
    fn from(v: i64) -> Self {
        Token::Int(v)
    }
}

impl From<i32> for Token {
    fn from(v: i32) -> Self {
        Token::Int(v as i64)
    }
}

impl From<usize> for Token {
    fn from(v: usize) -> Self {
        Token::Int(v as i64)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token::Str(s.to_string())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token::Str(s)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int(v) => write!(f, "{}", v),
            Token::Str(s) => write!(f, "'{}'", s),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int(v) => write!(f, "[{}]", v),
            Token::Str(s) => write!(f, "/{}", s),
        }
    }
}

/// Hierarchical port identifier
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(Vec<Token>);

impl PortId {
    #[inline]
    pub fn new(tokens: Vec<Token>) -> Self {
        PortId(tokens)
    }

    /// Number of levels
    #[inline]
    pub fn levels(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    #[inline]
    pub fn get(&self, level: usize) -> Option<&Token> {
        self.0.get(level)
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.0
    }

    /// Canonical selector string (`/foo[0]`)
    pub fn to_selector(&self) -> String {
        self.to_string()
    }
}

impl From<Vec<Token>> for PortId {
    fn from(tokens: Vec<Token>) -> Self {
        PortId(tokens)
    }
}

impl FromIterator<Token> for PortId {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        PortId(iter.into_iter().collect())
    }
}

impl fmt::Debug for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, t) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", t)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in &self.0 {
            write!(f, "{}", t)?;
        }
        Ok(())
    }
}

/// Build a [`PortId`] from a list of tokens: `port!("foo", 0)`
#[macro_export]
macro_rules! port {
    ($($tok:expr),* $(,)?) => {
        $crate::PortId::new(vec![$($crate::Token::from($tok)),*])
    };
}

/// Identifier-or-selector argument
///
/// Operations that address ports accept either a selector string, resolved by
/// the addressing layer, or an already resolved list of identifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortSpec {
    Selector(String),
    Ids(Vec<PortId>),
}

impl PortSpec {
    pub fn as_selector(&self) -> Option<&str> {
        match self {
            PortSpec::Selector(s) => Some(s),
            PortSpec::Ids(_) => None,
        }
    }
}

impl From<&str> for PortSpec {
    fn from(s: &str) -> Self {
        PortSpec::Selector(s.to_string())
    }
}

impl From<String> for PortSpec {
    fn from(s: String) -> Self {
        PortSpec::Selector(s)
    }
}

impl From<&String> for PortSpec {
    fn from(s: &String) -> Self {
        PortSpec::Selector(s.clone())
    }
}

impl From<PortId> for PortSpec {
    fn from(id: PortId) -> Self {
        PortSpec::Ids(vec![id])
    }
}

impl From<&PortId> for PortSpec {
    fn from(id: &PortId) -> Self {
        PortSpec::Ids(vec![id.clone()])
    }
}

impl From<Vec<PortId>> for PortSpec {
    fn from(ids: Vec<PortId>) -> Self {
        PortSpec::Ids(ids)
    }
}

impl From<&[PortId]> for PortSpec {
    fn from(ids: &[PortId]) -> Self {
        PortSpec::Ids(ids.to_vec())
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSpec::Selector(s) => write!(f, "{}", s),
            PortSpec::Ids(ids) => {
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", id)?;
                }
                Ok(())
            }
        }
    }
}
