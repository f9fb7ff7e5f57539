//! Port attribute table
//!
//! Maps each hierarchical port identifier to its attributes. Rows live in an
//! ordered map keyed by identifier, so canonical (level-wise lexicographic)
//! order is maintained on every insert without a re-sort pass.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use portweave_core::{columns, Assign, AttrValue, PortId, PortSpec, Rows, WeaveError, WeaveResult};
use portweave_select::{Addressing, PathSelector};
use tracing::{debug, trace};

use crate::PortRow;

/// Port table configuration
#[derive(Clone, Debug)]
pub struct InterfaceConfig {
    /// Declared columns; must include `interface`, `io` and `type`
    pub columns: Vec<String>,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        InterfaceConfig {
            columns: columns::REQUIRED.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl InterfaceConfig {
    /// Required columns followed by `extra`
    pub fn with_extra_columns(extra: &[&str]) -> Self {
        let mut config = InterfaceConfig::default();
        config.columns.extend(extra.iter().map(|c| c.to_string()));
        config
    }
}

/// Set of interfaces comprising ports
#[derive(Clone, Debug)]
pub struct Interface {
    addressing: Arc<dyn Addressing>,
    /// Identifier arity; 0 while the table is empty
    levels: usize,
    columns: Vec<String>,
    rows: BTreeMap<PortId, Vec<AttrValue>>,
}

impl Interface {
    /// Create a table over the ports of `spec` with the default columns
    pub fn new(spec: impl Into<PortSpec>) -> WeaveResult<Self> {
        Self::with_config(spec, InterfaceConfig::default())
    }

    pub fn with_config(spec: impl Into<PortSpec>, config: InterfaceConfig) -> WeaveResult<Self> {
        Self::with_addressing(spec, config, Arc::new(PathSelector::new()))
    }

    pub fn with_addressing(
        spec: impl Into<PortSpec>,
        config: InterfaceConfig,
        addressing: Arc<dyn Addressing>,
    ) -> WeaveResult<Self> {
        validate_columns(&config.columns)?;
        let mut table = Interface {
            addressing,
            levels: 0,
            columns: config.columns,
            rows: BTreeMap::new(),
        };

        let ids = table.expand(&spec.into())?;
        table.levels = ids.first().map_or(0, PortId::levels);
        let width = table.columns.len();
        for id in ids {
            table.rows.insert(id, vec![AttrValue::Unset; width]);
        }

        debug!(ports = table.rows.len(), levels = table.levels, "created port table");
        Ok(table)
    }

    /// Empty table sharing this table's addressing layer and columns
    pub(crate) fn empty_like(&self) -> Self {
        Interface {
            addressing: Arc::clone(&self.addressing),
            levels: self.levels,
            columns: self.columns.clone(),
            rows: BTreeMap::new(),
        }
    }

    pub fn addressing(&self) -> &Arc<dyn Addressing> {
        &self.addressing
    }

    /// Identifier arity
    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: &PortId) -> bool {
        self.rows.contains_key(id)
    }

    /// Identifiers in canonical order
    pub fn ids(&self) -> impl Iterator<Item = &PortId> {
        self.rows.keys()
    }

    /// Rows in canonical order
    pub fn iter(&self) -> impl Iterator<Item = PortRow<'_>> {
        self.rows
            .iter()
            .map(move |(id, vals)| PortRow::new(id, &self.columns, vals))
    }

    pub fn row(&self, id: &PortId) -> Option<PortRow<'_>> {
        let (id, vals) = self.rows.get_key_value(id)?;
        Some(PortRow::new(id, &self.columns, vals))
    }

    /// Single cell lookup
    pub fn value(&self, id: &PortId, column: &str) -> Option<&AttrValue> {
        let pos = self.column_index(column)?;
        self.rows.get(id).map(|vals| &vals[pos])
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Interface group of a port, if set
    pub fn group_of(&self, id: &PortId) -> Option<i64> {
        self.row(id).and_then(|r| r.interface())
    }

    /// Existing identifiers addressed by `spec`, in canonical order.
    ///
    /// Never fails on an empty match; fails only if the selector is malformed.
    pub fn matching(&self, spec: &PortSpec) -> WeaveResult<Vec<PortId>> {
        match spec {
            PortSpec::Selector(s) => {
                let m = self.addressing.matcher(s)?;
                Ok(self.rows.keys().filter(|id| m.matches(id)).cloned().collect())
            }
            PortSpec::Ids(ids) => {
                let wanted: HashSet<&PortId> = ids.iter().collect();
                Ok(self
                    .rows
                    .keys()
                    .filter(|id| wanted.contains(id))
                    .cloned()
                    .collect())
            }
        }
    }

    /// Ports addressed by `spec`, every one of which must exist.
    ///
    /// Unambiguous specs keep their expansion order; ambiguous selectors
    /// yield the matching ports in canonical order. Resolving to nothing is
    /// an error.
    pub fn resolve_existing(&self, spec: &PortSpec) -> WeaveResult<Vec<PortId>> {
        let ambiguous = match spec {
            PortSpec::Selector(s) => self.addressing.is_ambiguous(s)?,
            PortSpec::Ids(_) => false,
        };
        let ids = if ambiguous {
            self.matching(spec)?
        } else {
            self.expand(spec)?
        };
        if let Some(missing) = ids.iter().find(|id| !self.rows.contains_key(id)) {
            return Err(WeaveError::UnknownPort(missing.to_selector()));
        }
        if ids.is_empty() {
            return Err(WeaveError::UnknownPort(spec.to_string()));
        }
        Ok(ids)
    }

    /// Read the rows addressed by `spec`, restricted to `columns` (all when empty)
    pub fn get(&self, spec: impl Into<PortSpec>, columns: &[&str]) -> WeaveResult<Rows<PortId>> {
        let positions: Vec<usize> = if columns.is_empty() {
            (0..self.columns.len()).collect()
        } else {
            columns
                .iter()
                .map(|c| {
                    self.column_index(c)
                        .ok_or_else(|| WeaveError::UnknownColumn(c.to_string()))
                })
                .collect::<WeaveResult<_>>()?
        };
        let names = positions.iter().map(|&p| self.columns[p].clone()).collect();

        let entries = self
            .matching(&spec.into())?
            .into_iter()
            .map(|id| {
                let vals = &self.rows[&id];
                let picked = positions.iter().map(|&p| vals[p].clone()).collect();
                (id, picked)
            })
            .collect();
        Ok(Rows::new(names, entries))
    }

    /// Write `value` into `columns` of the rows addressed by `spec`.
    ///
    /// Unambiguous targets are upserted: present identifiers are updated in
    /// place, new ones are inserted with every other column unset. Ambiguous
    /// targets can only update existing rows.
    pub fn set(
        &mut self,
        spec: impl Into<PortSpec>,
        columns: &[&str],
        value: impl Into<Assign>,
    ) -> WeaveResult<()> {
        let cells = value.into().resolve(columns, &self.columns)?;
        let spec = spec.into();
        let targets = self.resolve_targets(&spec)?;
        trace!(spec = %spec, rows = targets.len(), cells = cells.len(), "set port attributes");
        self.write_cells(targets, &cells);
        Ok(())
    }

    /// Identifiers a write to `spec` touches, creating nothing yet
    fn resolve_targets(&self, spec: &PortSpec) -> WeaveResult<Vec<PortId>> {
        let ambiguous = match spec {
            PortSpec::Selector(s) => self.addressing.is_ambiguous(s)?,
            PortSpec::Ids(_) => false,
        };
        if ambiguous {
            let found = self.matching(spec)?;
            if found.is_empty() {
                return Err(WeaveError::AmbiguousSelector(spec.to_string()));
            }
            return Ok(found);
        }

        let ids = self.expand(spec)?;
        if self.levels != 0 {
            if let Some(bad) = ids.iter().find(|id| id.levels() != self.levels) {
                return Err(WeaveError::ArityMismatch {
                    expected: self.levels,
                    actual: bad.levels(),
                });
            }
        }
        Ok(ids)
    }

    /// Apply resolved cells to resolved targets. Infallible by construction.
    fn write_cells(&mut self, targets: Vec<PortId>, cells: &[(String, AttrValue)]) {
        let positions: Vec<usize> = cells.iter().map(|(c, _)| self.ensure_column(c)).collect();
        let width = self.columns.len();
        if self.levels == 0 {
            if let Some(first) = targets.first() {
                self.levels = first.levels();
            }
        }
        for id in targets {
            let row = self
                .rows
                .entry(id)
                .or_insert_with(|| vec![AttrValue::Unset; width]);
            for (&pos, (_, value)) in positions.iter().zip(cells) {
                row[pos] = value.clone();
            }
        }
    }

    /// Position of `column`, appending it (unset on every row) if new
    fn ensure_column(&mut self, column: &str) -> usize {
        if let Some(pos) = self.column_index(column) {
            return pos;
        }
        self.columns.push(column.to_string());
        for vals in self.rows.values_mut() {
            vals.push(AttrValue::Unset);
        }
        self.columns.len() - 1
    }

    /// Concrete, duplicate-free, uniform-arity identifiers of a spec
    fn expand(&self, spec: &PortSpec) -> WeaveResult<Vec<PortId>> {
        match spec {
            PortSpec::Selector(s) => {
                if self.addressing.is_ambiguous(s)? {
                    return Err(WeaveError::AmbiguousSelector(s.clone()));
                }
                self.addressing.make_index(s)
            }
            PortSpec::Ids(ids) => {
                check_identifiers(ids.iter())?;
                Ok(ids.clone())
            }
        }
    }

    /// Keep only the rows passing `keep`
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&PortId, &[AttrValue]) -> bool) {
        self.rows.retain(|id, vals| keep(id, vals));
    }

    pub(crate) fn insert_row(&mut self, id: PortId, values: Vec<AttrValue>) {
        self.rows.insert(id, values);
    }

    pub(crate) fn set_levels(&mut self, levels: usize) {
        self.levels = levels;
    }
}

impl PartialEq for Interface {
    fn eq(&self, other: &Self) -> bool {
        self.levels == other.levels && self.columns == other.columns && self.rows == other.rows
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Interface")?;
        writeln!(f, "---------")?;
        write!(f, "port")?;
        for c in &self.columns {
            write!(f, "\t{}", c)?;
        }
        writeln!(f)?;
        for (id, vals) in &self.rows {
            write!(f, "{}", id)?;
            for v in vals {
                write!(f, "\t{}", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Required columns present, no duplicate names
pub(crate) fn validate_columns(cols: &[String]) -> WeaveResult<()> {
    for required in columns::REQUIRED {
        if !cols.iter().any(|c| c == required) {
            return Err(WeaveError::ValueShape(format!(
                "port table requires column `{}`",
                required
            )));
        }
    }
    let mut seen = HashSet::with_capacity(cols.len());
    for c in cols {
        if !seen.insert(c) {
            return Err(WeaveError::ValueShape(format!("duplicate column `{}`", c)));
        }
    }
    Ok(())
}

/// Identifiers are duplicate free and share one arity
pub(crate) fn check_identifiers<'a>(ids: impl Iterator<Item = &'a PortId>) -> WeaveResult<()> {
    let mut seen = HashSet::new();
    let mut arity = None;
    for id in ids {
        match arity {
            None => arity = Some(id.levels()),
            Some(expected) if expected != id.levels() => {
                return Err(WeaveError::ArityMismatch {
                    expected,
                    actual: id.levels(),
                })
            }
            Some(_) => {}
        }
        if !seen.insert(id) {
            return Err(WeaveError::DuplicateIdentifier(id.to_selector()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portweave_core::{port, values};
    use proptest::prelude::*;

    fn fixture() -> Interface {
        let mut i = Interface::new("/foo[0:3]").unwrap();
        i.set("/foo[0]", &["interface", "io"], values![0, "in"]).unwrap();
        i.set("/foo[1:3]", &["interface", "io"], values![0, "out"]).unwrap();
        i
    }

    #[test]
    fn test_create_empty() {
        let i = Interface::new("").unwrap();
        assert_eq!(i.len(), 0);
        assert_eq!(i.levels(), 0);
    }

    #[test]
    fn test_create_dup_identifiers() {
        assert!(matches!(
            Interface::new("/foo[0],/foo[0]"),
            Err(WeaveError::DuplicateIdentifier(_))
        ));
        assert!(matches!(
            Interface::new(vec![port!("foo", 0), port!("foo", 0)]),
            Err(WeaveError::DuplicateIdentifier(_))
        ));
    }

    #[test]
    fn test_create_ambiguous() {
        assert!(matches!(
            Interface::new("/foo/*"),
            Err(WeaveError::AmbiguousSelector(_))
        ));
    }

    #[test]
    fn test_required_columns() {
        let config = InterfaceConfig {
            columns: vec!["interface".into(), "io".into()],
        };
        assert!(matches!(
            Interface::with_config("/foo[0]", config),
            Err(WeaveError::ValueShape(_))
        ));
    }

    #[test]
    fn test_get_columns() {
        let i = fixture();
        let rows = i.get("/foo[1:3]", &["io"]).unwrap();
        assert_eq!(rows.columns(), &["io".to_string()]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.value(&port!("foo", 2), "io"), Some(&AttrValue::from("out")));

        assert!(i.get("/bar[0]", &[]).unwrap().is_empty());
        assert!(matches!(
            i.get("/foo[0]", &["missing"]),
            Err(WeaveError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_set_scalar_broadcast() {
        let mut i = fixture();
        i.set("/foo[0:3]", &["type"], "spike").unwrap();
        assert!(i.iter().all(|r| r.port_type() == &AttrValue::from("spike")));
    }

    #[test]
    fn test_set_appends_new_rows_in_order() {
        let mut i = fixture();
        i.set("/foo[5],/bar[0]", &["interface"], 1).unwrap();
        let ids: Vec<_> = i.ids().cloned().collect();
        assert_eq!(
            ids,
            vec![
                port!("bar", 0),
                port!("foo", 0),
                port!("foo", 1),
                port!("foo", 2),
                port!("foo", 5),
            ]
        );
        assert_eq!(i.value(&port!("foo", 5), "io"), Some(&AttrValue::Unset));
        assert_eq!(i.group_of(&port!("bar", 0)), Some(1));
    }

    #[test]
    fn test_set_new_column() {
        let mut i = fixture();
        i.set("/foo[0]", &["gain"], 0.5).unwrap();
        assert_eq!(i.columns().len(), 4);
        assert_eq!(i.value(&port!("foo", 0), "gain"), Some(&AttrValue::Float(0.5)));
        assert_eq!(i.value(&port!("foo", 1), "gain"), Some(&AttrValue::Unset));
    }

    #[test]
    fn test_set_ambiguous() {
        let mut i = fixture();
        i.set("/foo/*", &["type"], "gpot").unwrap();
        assert_eq!(i.value(&port!("foo", 2), "type"), Some(&AttrValue::from("gpot")));

        let err = i.set("/bar/*", &["type"], "gpot").unwrap_err();
        assert!(matches!(err, WeaveError::AmbiguousSelector(_)));
    }

    #[test]
    fn test_set_rejects_bad_shape_without_mutation() {
        let mut i = fixture();
        let before = i.clone();
        let err = i.set("/foo[7]", &["io"], values![1, 2]).unwrap_err();
        assert!(matches!(err, WeaveError::ValueShape(_)));
        assert_eq!(i, before);
    }

    #[test]
    fn test_set_arity_mismatch() {
        let mut i = fixture();
        assert!(matches!(
            i.set("/foo/bar[0]", &["io"], "in"),
            Err(WeaveError::ArityMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_display() {
        let i = fixture();
        let text = i.to_string();
        assert!(text.starts_with("Interface\n"));
        assert!(text.contains("/foo[0]\t0\tin\t"));
    }

    proptest! {
        #[test]
        fn prop_upsert_keeps_rows_unique_and_canonical(starts in proptest::collection::vec(0i64..50, 1..6)) {
            let mut i = Interface::new("").unwrap();
            for s in &starts {
                i.set(format!("/p[{}:{}]", s, s + 5), &["type"], "x").unwrap();
            }
            let ids: Vec<PortId> = i.ids().cloned().collect();
            let mut canonical = ids.clone();
            canonical.sort();
            canonical.dedup();
            prop_assert_eq!(ids, canonical);
        }
    }
}
