//! Attribute values stored in port and connection tables

use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known column names
pub mod columns {
    /// Interface group a port belongs to
    pub const INTERFACE: &str = "interface";
    /// Port direction (`in` / `out`)
    pub const IO: &str = "io";
    /// Free-form port type
    pub const TYPE: &str = "type";
    /// Connection flag
    pub const CONN: &str = "conn";

    /// Columns every port table must carry
    pub const REQUIRED: [&str; 3] = [INTERFACE, IO, TYPE];
}

/// Value of one table cell
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    #[default]
    Unset,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    #[inline]
    pub fn is_unset(&self) -> bool {
        matches!(self, AttrValue::Unset)
    }

    /// True for numeric or boolean zero. Unset and strings are never zero.
    pub fn is_zero(&self) -> bool {
        match self {
            AttrValue::Bool(b) => !*b,
            AttrValue::Int(v) => *v == 0,
            AttrValue::Float(v) => *v == 0.0,
            AttrValue::Unset | AttrValue::Str(_) => false,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            AttrValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Infer a value from a text field: empty is `Unset`, then bool, int,
    /// float, and finally string.
    pub fn parse_field(raw: &str) -> AttrValue {
        if raw.is_empty() {
            return AttrValue::Unset;
        }
        match raw {
            "true" => return AttrValue::Bool(true),
            "false" => return AttrValue::Bool(false),
            _ => {}
        }
        if let Ok(v) = raw.parse::<i64>() {
            return AttrValue::Int(v);
        }
        if let Ok(v) = raw.parse::<f64>() {
            return AttrValue::Float(v);
        }
        AttrValue::Str(raw.to_string())
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Unset => Ok(()),
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{:?}", v),
            AttrValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v as i64)
    }
}

impl From<usize> for AttrValue {
    fn from(v: usize) -> Self {
        AttrValue::Int(v as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<Io> for AttrValue {
    fn from(io: Io) -> Self {
        AttrValue::Str(io.as_str().to_string())
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Io {
    In,
    Out,
}

impl Io {
    pub fn as_str(self) -> &'static str {
        match self {
            Io::In => "in",
            Io::Out => "out",
        }
    }

    pub fn opposite(self) -> Io {
        match self {
            Io::In => Io::Out,
            Io::Out => Io::In,
        }
    }

    /// Read a direction from a cell; anything other than `in`/`out` is `None`
    pub fn from_value(value: &AttrValue) -> Option<Io> {
        match value.as_str() {
            Some("in") => Some(Io::In),
            Some("out") => Some(Io::Out),
            _ => None,
        }
    }
}

impl fmt::Display for Io {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(AttrValue::parse_field(""), AttrValue::Unset);
        assert_eq!(AttrValue::parse_field("1"), AttrValue::Int(1));
        assert_eq!(AttrValue::parse_field("0.5"), AttrValue::Float(0.5));
        assert_eq!(AttrValue::parse_field("true"), AttrValue::Bool(true));
        assert_eq!(AttrValue::parse_field("spike"), AttrValue::Str("spike".into()));
    }

    #[test]
    fn test_is_zero() {
        assert!(AttrValue::Int(0).is_zero());
        assert!(AttrValue::Float(0.0).is_zero());
        assert!(AttrValue::Bool(false).is_zero());
        assert!(!AttrValue::Unset.is_zero());
        assert!(!AttrValue::Int(1).is_zero());
        assert!(!AttrValue::Str("0".into()).is_zero());
    }

    #[test]
    fn test_io_roundtrip() {
        assert_eq!(Io::from_value(&AttrValue::from(Io::In)), Some(Io::In));
        assert_eq!(Io::from_value(&AttrValue::Unset), None);
        assert_eq!(Io::Out.opposite(), Io::In);
    }
}
