//! Value assignment and column coercion
//!
//! A write names zero or more target columns and carries one of three value
//! shapes. [`Assign::resolve`] turns the pair into concrete column/value cells
//! with a fixed precedence:
//! - a scalar broadcasts to every target column
//! - a mapping assigns by column name
//! - ordered values zip with the target columns positionally

use crate::{AttrValue, WeaveError, WeaveResult};

/// Value carried by a table write
#[derive(Clone, Debug, PartialEq)]
pub enum Assign {
    Scalar(AttrValue),
    Mapping(Vec<(String, AttrValue)>),
    Ordered(Vec<AttrValue>),
}

impl Assign {
    /// Resolve against the explicit target columns of a write.
    ///
    /// With no explicit columns, a scalar targets the first declared column
    /// and ordered values zip with all declared columns.
    pub fn resolve(
        self,
        explicit: &[&str],
        declared: &[String],
    ) -> WeaveResult<Vec<(String, AttrValue)>> {
        match self {
            Assign::Scalar(value) => {
                if explicit.is_empty() {
                    let first = declared.first().ok_or_else(|| {
                        WeaveError::ValueShape("table declares no columns".into())
                    })?;
                    Ok(vec![(first.clone(), value)])
                } else {
                    Ok(explicit
                        .iter()
                        .map(|c| (c.to_string(), value.clone()))
                        .collect())
                }
            }
            Assign::Mapping(pairs) => {
                if pairs.is_empty() {
                    return Err(WeaveError::ValueShape("empty mapping".into()));
                }
                Ok(pairs)
            }
            Assign::Ordered(values) => {
                if values.is_empty() {
                    return Err(WeaveError::ValueShape("empty value list".into()));
                }
                let targets: Vec<String> = if explicit.is_empty() {
                    declared.to_vec()
                } else {
                    explicit.iter().map(|c| c.to_string()).collect()
                };
                if values.len() > targets.len() {
                    return Err(WeaveError::ValueShape(format!(
                        "{} values for {} columns",
                        values.len(),
                        targets.len()
                    )));
                }
                Ok(targets.into_iter().zip(values).collect())
            }
        }
    }
}

impl From<AttrValue> for Assign {
    fn from(v: AttrValue) -> Self {
        Assign::Scalar(v)
    }
}

impl From<i64> for Assign {
    fn from(v: i64) -> Self {
        Assign::Scalar(AttrValue::Int(v))
    }
}

impl From<i32> for Assign {
    fn from(v: i32) -> Self {
        Assign::Scalar(AttrValue::Int(v as i64))
    }
}

impl From<f64> for Assign {
    fn from(v: f64) -> Self {
        Assign::Scalar(AttrValue::Float(v))
    }
}

impl From<bool> for Assign {
    fn from(v: bool) -> Self {
        Assign::Scalar(AttrValue::Bool(v))
    }
}

impl From<&str> for Assign {
    fn from(s: &str) -> Self {
        Assign::Scalar(AttrValue::from(s))
    }
}

impl From<String> for Assign {
    fn from(s: String) -> Self {
        Assign::Scalar(AttrValue::Str(s))
    }
}

impl From<Vec<AttrValue>> for Assign {
    fn from(values: Vec<AttrValue>) -> Self {
        Assign::Ordered(values)
    }
}

impl From<Vec<(&str, AttrValue)>> for Assign {
    fn from(pairs: Vec<(&str, AttrValue)>) -> Self {
        Assign::Mapping(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

impl From<Vec<(String, AttrValue)>> for Assign {
    fn from(pairs: Vec<(String, AttrValue)>) -> Self {
        Assign::Mapping(pairs)
    }
}

/// Build an ordered [`Assign`] from heterogeneous values: `values![1, "in", "spike"]`
#[macro_export]
macro_rules! values {
    ($($v:expr),* $(,)?) => {
        $crate::Assign::Ordered(vec![$($crate::AttrValue::from($v)),*])
    };
}
