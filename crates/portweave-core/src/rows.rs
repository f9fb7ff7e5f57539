//! Row sets returned by table reads

use std::fmt;

use crate::AttrValue;

/// Matching rows of a read, in canonical key order
#[derive(Clone, Debug, PartialEq)]
pub struct Rows<K> {
    columns: Vec<String>,
    entries: Vec<(K, Vec<AttrValue>)>,
}

impl<K> Rows<K> {
    pub fn new(columns: Vec<String>, entries: Vec<(K, Vec<AttrValue>)>) -> Self {
        Rows { columns, entries }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(K, Vec<AttrValue>)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// All values of one column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&AttrValue>> {
        let pos = self.columns.iter().position(|c| c == name)?;
        Some(self.entries.iter().map(|(_, vals)| &vals[pos]).collect())
    }

    pub fn into_entries(self) -> Vec<(K, Vec<AttrValue>)> {
        self.entries
    }
}

impl<K: PartialEq> Rows<K> {
    /// Values of the row keyed by `key`
    pub fn get(&self, key: &K) -> Option<&[AttrValue]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, vals)| vals.as_slice())
    }

    /// Single cell lookup
    pub fn value(&self, key: &K, column: &str) -> Option<&AttrValue> {
        let pos = self.columns.iter().position(|c| c == column)?;
        self.get(key).map(|vals| &vals[pos])
    }
}

impl<K: fmt::Debug> fmt::Display for Rows<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key")?;
        for c in &self.columns {
            write!(f, "\t{}", c)?;
        }
        writeln!(f)?;
        for (key, vals) in &self.entries {
            write!(f, "{:?}", key)?;
            for v in vals {
                write!(f, "\t{}", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
