//! Directed connectivity pattern
//!
//! A pattern owns one port table covering two or more disjoint interface
//! groups, and an edge table keyed by `(source, destination)`. Every write is
//! validated as a whole before any state changes, so a rejected batch leaves
//! both tables untouched.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use portweave_core::{
    columns, Assign, AttrValue, Io, PortId, PortSpec, Rows, WeaveError, WeaveResult,
};
use portweave_interface::{Interface, InterfaceConfig};
use portweave_select::{Addressing, PathSelector, PortMatcher};
use tracing::{debug, trace};

/// Edge key: `(source, destination)`
pub type Conn = (PortId, PortId);

/// Pattern configuration
#[derive(Clone, Debug)]
pub struct PatternConfig {
    /// Edge attribute columns
    pub columns: Vec<String>,
    /// Port table columns
    pub interface_columns: Vec<String>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        PatternConfig {
            columns: vec![columns::CONN.to_string()],
            interface_columns: InterfaceConfig::default().columns,
        }
    }
}

impl PatternConfig {
    /// `conn` followed by `extra` edge columns
    pub fn with_edge_columns(extra: &[&str]) -> Self {
        let mut config = PatternConfig::default();
        config.columns.extend(extra.iter().map(|c| c.to_string()));
        config
    }
}

/// Connectivity pattern between interface groups
#[derive(Clone, Debug)]
pub struct Pattern {
    interface: Interface,
    columns: Vec<String>,
    edges: BTreeMap<Conn, Vec<AttrValue>>,
    /// destination -> its only source
    sources: HashMap<PortId, PortId>,
}

impl Pattern {
    /// Create a pattern whose groups are the given selectors, in order
    pub fn new<S: AsRef<str>>(selectors: &[S]) -> WeaveResult<Self> {
        Self::with_config(selectors, PatternConfig::default())
    }

    pub fn with_config<S: AsRef<str>>(selectors: &[S], config: PatternConfig) -> WeaveResult<Self> {
        let groups = selectors
            .iter()
            .map(|s| PortSpec::from(s.as_ref()))
            .collect();
        Self::with_addressing(groups, config, Arc::new(PathSelector::new()))
    }

    /// Create a pattern from explicit group specs and an addressing layer.
    ///
    /// Group `i` gets `interface = i` on every one of its ports.
    pub fn with_addressing(
        groups: Vec<PortSpec>,
        config: PatternConfig,
        addressing: Arc<dyn Addressing>,
    ) -> WeaveResult<Self> {
        if groups.len() < 2 {
            return Err(WeaveError::TooFewInterfaces(groups.len()));
        }
        validate_edge_columns(&config.columns)?;

        let mut members = Vec::with_capacity(groups.len());
        for spec in &groups {
            let ids = match spec {
                PortSpec::Selector(s) => {
                    if addressing.is_ambiguous(s)? {
                        return Err(WeaveError::AmbiguousSelector(s.clone()));
                    }
                    addressing.make_index(s)?
                }
                PortSpec::Ids(ids) => ids.clone(),
            };
            members.push(ids);
        }

        let disjoint = match groups
            .iter()
            .map(PortSpec::as_selector)
            .collect::<Option<Vec<_>>>()
        {
            Some(selectors) => addressing.are_disjoint(&selectors)?,
            None => groups_disjoint(&members),
        };
        if !disjoint {
            let names: Vec<String> = groups.iter().map(|g| g.to_string()).collect();
            return Err(WeaveError::Disjointness(names.join(" | ")));
        }

        let union: Vec<PortId> = members.iter().flatten().cloned().collect();
        let mut interface = Interface::with_addressing(
            PortSpec::Ids(union),
            InterfaceConfig {
                columns: config.interface_columns,
            },
            addressing,
        )?;
        for (group, ids) in members.into_iter().enumerate() {
            interface.set(PortSpec::Ids(ids), &[columns::INTERFACE], group as i64)?;
        }

        debug!(
            groups = groups.len(),
            ports = interface.len(),
            columns = config.columns.len(),
            "created pattern"
        );
        Ok(Pattern {
            interface,
            columns: config.columns,
            edges: BTreeMap::new(),
            sources: HashMap::new(),
        })
    }

    /// Connect every port of `src` to every port of `dst`.
    ///
    /// Sources are tagged `io = in`, destinations `io = out`. Existing edges
    /// are updated in the assigned columns only; new edges start with every
    /// column unset except `conn`, which is 1.
    pub fn connect(
        &mut self,
        src: impl Into<PortSpec>,
        dst: impl Into<PortSpec>,
        columns: &[&str],
        value: impl Into<Assign>,
    ) -> WeaveResult<()> {
        let srcs = self.interface.resolve_existing(&src.into())?;
        let dsts = self.interface.resolve_existing(&dst.into())?;
        let pairs = srcs
            .iter()
            .flat_map(|s| dsts.iter().map(move |d| (s.clone(), d.clone())))
            .collect();
        self.insert_pairs(pairs, columns, value.into())
    }

    /// Connect the i-th port of `src` to the i-th port of `dst`
    pub fn connect_each(
        &mut self,
        src: impl Into<PortSpec>,
        dst: impl Into<PortSpec>,
        columns: &[&str],
        value: impl Into<Assign>,
    ) -> WeaveResult<()> {
        let srcs = self.interface.resolve_existing(&src.into())?;
        let dsts = self.interface.resolve_existing(&dst.into())?;
        if srcs.len() != dsts.len() {
            return Err(WeaveError::ValueShape(format!(
                "{} sources cannot be paired with {} destinations",
                srcs.len(),
                dsts.len()
            )));
        }
        let pairs = srcs.into_iter().zip(dsts).collect();
        self.insert_pairs(pairs, columns, value.into())
    }

    fn insert_pairs(&mut self, pairs: Vec<Conn>, columns: &[&str], value: Assign) -> WeaveResult<()> {
        let cells = value.resolve(columns, &self.columns)?;
        self.check_pairs(&pairs)?;

        let srcs: BTreeSet<&PortId> = pairs.iter().map(|(s, _)| s).collect();
        let dsts: BTreeSet<&PortId> = pairs.iter().map(|(_, d)| d).collect();
        let srcs = PortSpec::Ids(srcs.into_iter().cloned().collect());
        let dsts = PortSpec::Ids(dsts.into_iter().cloned().collect());
        self.interface.set(srcs, &[columns::IO], AttrValue::from(Io::In))?;
        self.interface.set(dsts, &[columns::IO], AttrValue::from(Io::Out))?;

        let positions: Vec<usize> = cells.iter().map(|(c, _)| self.ensure_column(c)).collect();
        let width = self.columns.len();
        let conn = self.column_index(columns::CONN);
        let batch = pairs.len();
        for (s, d) in pairs {
            self.sources.insert(d.clone(), s.clone());
            let row = self.edges.entry((s, d)).or_insert_with(|| {
                let mut row = vec![AttrValue::Unset; width];
                if let Some(pos) = conn {
                    row[pos] = AttrValue::Int(1);
                }
                row
            });
            for (&pos, (_, v)) in positions.iter().zip(&cells) {
                row[pos] = v.clone();
            }
        }

        trace!(edges = batch, total = self.edges.len(), "connected ports");
        Ok(())
    }

    /// Reject the whole batch if any pair is invalid
    fn check_pairs(&self, pairs: &[Conn]) -> WeaveResult<()> {
        let mut staged: HashMap<&PortId, &PortId> = HashMap::with_capacity(pairs.len());
        for (s, d) in pairs {
            match (self.interface.group_of(s), self.interface.group_of(d)) {
                (Some(a), Some(b)) if a != b => {}
                _ => {
                    return Err(WeaveError::Direction(format!(
                        "{} and {} do not belong to two different interfaces",
                        s, d
                    )))
                }
            }
            if let Some(existing) = self.sources.get(d) {
                if existing != s {
                    return Err(fan_in(s, d, existing));
                }
            }
            match staged.insert(d, s) {
                Some(prev) if prev == s => {
                    return Err(WeaveError::DuplicateIdentifier(format!("{} -> {}", s, d)))
                }
                Some(prev) => return Err(fan_in(s, d, prev)),
                None => {}
            }
        }
        Ok(())
    }

    /// Position of edge column `column`, appending it (unset on every edge) if new
    fn ensure_column(&mut self, column: &str) -> usize {
        if let Some(pos) = self.column_index(column) {
            return pos;
        }
        self.columns.push(column.to_string());
        for vals in self.edges.values_mut() {
            vals.push(AttrValue::Unset);
        }
        self.columns.len() - 1
    }

    /// Read the edges from `src` to `dst`, restricted to `columns` (all when empty)
    pub fn get(
        &self,
        src: impl Into<PortSpec>,
        dst: impl Into<PortSpec>,
        columns: &[&str],
    ) -> WeaveResult<Rows<Conn>> {
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

        let from = self.filter(&src.into())?;
        let to = self.filter(&dst.into())?;
        let entries = self
            .edges
            .iter()
            .filter(|((s, d), _)| from.accepts(s) && to.accepts(d))
            .map(|(key, vals)| {
                let picked = positions.iter().map(|&p| vals[p].clone()).collect();
                (key.clone(), picked)
            })
            .collect();
        Ok(Rows::new(names, entries))
    }

    /// Remove the edges from `src` to `dst`, returning how many were removed
    pub fn disconnect(&mut self, src: impl Into<PortSpec>, dst: impl Into<PortSpec>) -> WeaveResult<usize> {
        let from = self.filter(&src.into())?;
        let to = self.filter(&dst.into())?;
        let doomed: Vec<Conn> = self
            .edges
            .keys()
            .filter(|(s, d)| from.accepts(s) && to.accepts(d))
            .cloned()
            .collect();
        for key in &doomed {
            self.edges.remove(key);
            self.sources.remove(&key.1);
        }
        trace!(edges = doomed.len(), total = self.edges.len(), "disconnected ports");
        Ok(doomed.len())
    }

    /// Remove every edge. Port attributes, including `io` tags, are kept.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.sources.clear();
    }

    pub(crate) fn filter(&self, spec: &PortSpec) -> WeaveResult<PortFilter> {
        Ok(match spec {
            PortSpec::Selector(s) => PortFilter::Selector(self.interface.addressing().matcher(s)?),
            PortSpec::Ids(ids) => PortFilter::Ids(ids.iter().cloned().collect()),
        })
    }

    /// Swap in a complete edge table that has already been validated
    pub(crate) fn replace_edges(
        &mut self,
        columns: Vec<String>,
        edges: BTreeMap<Conn, Vec<AttrValue>>,
        sources: HashMap<PortId, PortId>,
    ) {
        self.columns = columns;
        self.edges = edges;
        self.sources = sources;
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    /// Mutable port table, for editing port attributes
    pub fn interface_mut(&mut self) -> &mut Interface {
        &mut self.interface
    }

    /// Identifier arity
    pub fn levels(&self) -> usize {
        self.interface.levels()
    }

    /// Edge columns
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges in canonical order
    pub fn edges(&self) -> impl Iterator<Item = (&Conn, &[AttrValue])> {
        self.edges.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn edge(&self, src: &PortId, dst: &PortId) -> Option<&[AttrValue]> {
        self.edges
            .get(&(src.clone(), dst.clone()))
            .map(Vec::as_slice)
    }

    /// Single edge cell lookup
    pub fn edge_value(&self, src: &PortId, dst: &PortId, column: &str) -> Option<&AttrValue> {
        let pos = self.column_index(column)?;
        self.edge(src, dst).map(|vals| &vals[pos])
    }

    /// The port feeding `dst`, if any
    pub fn source_of(&self, dst: &PortId) -> Option<&PortId> {
        self.sources.get(dst)
    }

    pub fn interface_ids(&self) -> BTreeSet<i64> {
        self.interface.interface_ids()
    }

    /// Copy of the ports of group `group`
    pub fn get_interface(&self, group: i64) -> Interface {
        self.interface.get_interface(group)
    }

    pub fn which_int(&self, spec: impl Into<PortSpec>) -> WeaveResult<BTreeSet<i64>> {
        self.interface.which_int(spec)
    }

    pub fn in_interfaces(&self, spec: impl Into<PortSpec>) -> WeaveResult<bool> {
        self.interface.in_interfaces(spec)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.interface == other.interface && self.columns == other.columns && self.edges == other.edges
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pattern")?;
        writeln!(f, "-------")?;
        write!(f, "from\tto")?;
        for c in &self.columns {
            write!(f, "\t{}", c)?;
        }
        writeln!(f)?;
        for ((s, d), vals) in &self.edges {
            write!(f, "{}\t{}", s, d)?;
            for v in vals {
                write!(f, "\t{}", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Compiled identifier-or-selector test over edge endpoints
pub(crate) enum PortFilter {
    Selector(Box<dyn PortMatcher>),
    Ids(HashSet<PortId>),
}

impl PortFilter {
    pub(crate) fn accepts(&self, id: &PortId) -> bool {
        match self {
            PortFilter::Selector(m) => m.matches(id),
            PortFilter::Ids(ids) => ids.contains(id),
        }
    }
}

fn fan_in(from: &PortId, to: &PortId, existing: &PortId) -> WeaveError {
    WeaveError::FanIn {
        from: from.to_selector(),
        to: to.to_selector(),
        existing: existing.to_selector(),
    }
}

/// No identifier appears in two different groups
fn groups_disjoint(members: &[Vec<PortId>]) -> bool {
    let mut owner: HashMap<&PortId, usize> = HashMap::new();
    for (group, ids) in members.iter().enumerate() {
        for id in ids {
            if let Some(&prev) = owner.get(id) {
                if prev != group {
                    return false;
                }
            }
            owner.insert(id, group);
        }
    }
    true
}

pub(crate) fn validate_edge_columns(cols: &[String]) -> WeaveResult<()> {
    let mut seen = HashSet::with_capacity(cols.len());
    for c in cols {
        if !seen.insert(c) {
            return Err(WeaveError::ValueShape(format!("duplicate edge column `{}`", c)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portweave_core::{port, values, ErrorKind};

    fn foo_bar() -> Pattern {
        Pattern::new(&["/foo[0:3]", "/bar[0:3]"]).unwrap()
    }

    #[test]
    fn test_create() {
        let p = foo_bar();
        assert_eq!(p.len(), 0);
        assert_eq!(p.columns(), &["conn".to_string()]);
        assert_eq!(p.interface().len(), 6);
        assert_eq!(p.interface().group_of(&port!("foo", 1)), Some(0));
        assert_eq!(p.interface().group_of(&port!("bar", 2)), Some(1));
        assert_eq!(p.interface_ids().into_iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_create_needs_two_groups() {
        assert!(matches!(
            Pattern::new(&["/foo[0:3]"]),
            Err(WeaveError::TooFewInterfaces(1))
        ));
    }

    #[test]
    fn test_create_overlapping() {
        let err = Pattern::new(&["/aaa[0:3]", "/aaa[0:2]"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Disjointness);
    }

    #[test]
    fn test_create_ambiguous() {
        assert!(matches!(
            Pattern::new(&["/foo/*", "/bar[0]"]),
            Err(WeaveError::AmbiguousSelector(_))
        ));
    }

    #[test]
    fn test_create_from_ids() {
        let groups = vec![
            PortSpec::Ids(vec![port!("a", 0), port!("a", 1)]),
            PortSpec::Ids(vec![port!("b", 0)]),
        ];
        let p = Pattern::with_addressing(groups, PatternConfig::default(), Arc::new(PathSelector::new()))
            .unwrap();
        assert_eq!(p.interface().len(), 3);

        let overlapping = vec![
            PortSpec::Ids(vec![port!("a", 0)]),
            PortSpec::Ids(vec![port!("a", 0)]),
        ];
        assert!(matches!(
            Pattern::with_addressing(overlapping, PatternConfig::default(), Arc::new(PathSelector::new())),
            Err(WeaveError::Disjointness(_))
        ));
    }

    #[test]
    fn test_connect_tags_ports() {
        let mut p = foo_bar();
        p.connect("/foo[0]", "/bar[0:2]", &[], 1).unwrap();
        assert_eq!(p.len(), 2);
        let io = |id: PortId| p.interface().row(&id).and_then(|r| r.io());
        assert_eq!(io(port!("foo", 0)), Some(Io::In));
        assert_eq!(io(port!("bar", 0)), Some(Io::Out));
        assert_eq!(io(port!("bar", 1)), Some(Io::Out));
        assert_eq!(io(port!("bar", 2)), None);
        assert_eq!(p.source_of(&port!("bar", 1)), Some(&port!("foo", 0)));
    }

    #[test]
    fn test_connect_default_conn() {
        let mut p = Pattern::with_config(&["/a[0:2]", "/b[0:2]"], PatternConfig::with_edge_columns(&["delay"]))
            .unwrap();
        p.connect("/a[0]", "/b[0]", &["delay"], 2.5).unwrap();
        assert_eq!(p.edge_value(&port!("a", 0), &port!("b", 0), "conn"), Some(&AttrValue::Int(1)));
        assert_eq!(
            p.edge_value(&port!("a", 0), &port!("b", 0), "delay"),
            Some(&AttrValue::Float(2.5))
        );

        p.connect("/a[1]", "/b[1]", &["conn"], 0).unwrap();
        assert_eq!(p.edge_value(&port!("a", 1), &port!("b", 1), "delay"), Some(&AttrValue::Unset));
        assert!(p.edge_value(&port!("a", 1), &port!("b", 1), "conn").unwrap().is_zero());
    }

    #[test]
    fn test_connect_both_directions() {
        let mut p = foo_bar();
        p.connect("/foo[0]", "/bar[0]", &[], 1).unwrap();
        p.connect("/foo[0]", "/bar[1]", &[], 1).unwrap();
        p.connect("/foo[2]", "/bar[2]", &[], 1).unwrap();
        p.connect("/bar[0]", "/foo[0]", &[], 1).unwrap();
        p.connect("/bar[1]", "/foo[2]", &[], 1).unwrap();
        p.connect("/bar[2]", "/foo[1]", &[], 1).unwrap();
        assert_eq!(p.len(), 6);
    }

    #[test]
    fn test_connect_rejects_fan_in() {
        let mut p = foo_bar();
        p.connect("/bar[0]", "/foo[0]", &[], 1).unwrap();
        let err = p.connect("/bar[1]", "/foo[0]", &[], 1).unwrap_err();
        assert!(matches!(err, WeaveError::FanIn { .. }));
        assert_eq!(p.len(), 1);
        assert_eq!(p.interface().value(&port!("bar", 1), "io"), Some(&AttrValue::Unset));
    }

    #[test]
    fn test_connect_rejects_fan_in_within_batch() {
        let mut p = foo_bar();
        let before = p.clone();
        let err = p.connect("/bar[0:2]", "/foo[0]", &[], 1).unwrap_err();
        assert!(matches!(err, WeaveError::FanIn { .. }));
        assert_eq!(p, before);
    }

    #[test]
    fn test_connect_rejects_duplicate_pair() {
        let mut p = foo_bar();
        let pair = vec![port!("foo", 0), port!("foo", 0)];
        let err = p
            .connect_each(pair, vec![port!("bar", 0), port!("bar", 0)], &[], 1)
            .unwrap_err();
        assert!(matches!(
            err,
            WeaveError::DuplicateIdentifier(_)
        ));
        assert!(p.is_empty());
    }

    #[test]
    fn test_connect_same_group() {
        let mut p = foo_bar();
        assert!(matches!(
            p.connect("/foo[0]", "/foo[1]", &[], 1),
            Err(WeaveError::Direction(_))
        ));
    }

    #[test]
    fn test_connect_unknown_port() {
        let mut p = foo_bar();
        assert!(matches!(
            p.connect("/foo[0]", "/baz[0]", &[], 1),
            Err(WeaveError::UnknownPort(_))
        ));
        assert!(matches!(
            p.connect("/foo[7]", "/bar[0]", &[], 1),
            Err(WeaveError::UnknownPort(_))
        ));
        assert!(matches!(
            p.connect("/qux/*", "/bar[0]", &[], 1),
            Err(WeaveError::UnknownPort(_))
        ));
    }

    #[test]
    fn test_overwrite_keeps_one_edge() {
        let mut p = Pattern::with_config(&["/foo[0:3]", "/bar[0:3]"], PatternConfig::with_edge_columns(&["weight"]))
            .unwrap();
        p.connect("/foo[0]", "/bar[0]", &["weight"], 1.0).unwrap();
        p.connect("/foo[0]", "/bar[0]", &["weight"], 3.0).unwrap();
        assert_eq!(p.len(), 1);
        assert_eq!(
            p.edge_value(&port!("foo", 0), &port!("bar", 0), "weight"),
            Some(&AttrValue::Float(3.0))
        );
    }

    #[test]
    fn test_bad_shape_leaves_no_edges() {
        let mut p = foo_bar();
        let err = p
            .connect("/foo[0]", "/bar[0]", &["conn"], values![1, 2])
            .unwrap_err();
        assert!(matches!(err, WeaveError::ValueShape(_)));
        assert!(p.is_empty());
        assert_eq!(p.interface().value(&port!("foo", 0), "io"), Some(&AttrValue::Unset));
    }

    #[test]
    fn test_connect_each() {
        let mut p = foo_bar();
        p.connect_each("/foo[0:3]", "/bar[0:3]", &[], 1).unwrap();
        let conns: Vec<Conn> = p.edges().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            conns,
            vec![
                (port!("foo", 0), port!("bar", 0)),
                (port!("foo", 1), port!("bar", 1)),
                (port!("foo", 2), port!("bar", 2)),
            ]
        );
        assert!(matches!(
            p.connect_each("/foo[0:2]", "/bar[0:3]", &[], 1),
            Err(WeaveError::ValueShape(_))
        ));
    }

    #[test]
    fn test_new_edge_column() {
        let mut p = foo_bar();
        p.connect("/foo[0]", "/bar[0]", &[], 1).unwrap();
        p.connect("/foo[1]", "/bar[1]", &["delay"], 4).unwrap();
        assert_eq!(p.columns().len(), 2);
        assert_eq!(p.edge_value(&port!("foo", 0), &port!("bar", 0), "delay"), Some(&AttrValue::Unset));
        assert_eq!(p.edge_value(&port!("foo", 1), &port!("bar", 1), "delay"), Some(&AttrValue::Int(4)));
    }

    #[test]
    fn test_get() {
        let mut p = foo_bar();
        p.connect("/foo[0]", "/bar[0:2]", &[], 1).unwrap();
        p.connect("/bar[2]", "/foo[1]", &[], 1).unwrap();

        let rows = p.get("/foo/*", "/bar/*", &[]).unwrap();
        assert_eq!(rows.len(), 2);
        let rows = p.get("/bar[2]", "/foo[1]", &["conn"]).unwrap();
        assert_eq!(rows.value(&(port!("bar", 2), port!("foo", 1)), "conn"), Some(&AttrValue::Int(1)));
        assert!(p.get("/foo[2]", "/bar[0]", &[]).unwrap().is_empty());
        assert!(matches!(
            p.get("/foo[0]", "/bar[0]", &["delay"]),
            Err(WeaveError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_disconnect_frees_destination() {
        let mut p = foo_bar();
        p.connect("/foo[0]", "/bar[0:3]", &[], 1).unwrap();
        assert_eq!(p.disconnect("/foo[0]", "/bar[0:2]").unwrap(), 2);
        assert_eq!(p.len(), 1);
        assert_eq!(p.source_of(&port!("bar", 0)), None);
        p.connect("/foo[1]", "/bar[0]", &[], 1).unwrap();
        assert_eq!(p.disconnect("/foo[2]", "/bar/*").unwrap(), 0);
    }

    #[test]
    fn test_clear_keeps_port_attributes() {
        let mut p = foo_bar();
        p.connect("/foo[0]", "/bar[0]", &[], 1).unwrap();
        p.clear();
        assert!(p.is_empty());
        assert_eq!(p.interface().value(&port!("foo", 0), "io"), Some(&AttrValue::from("in")));
        assert_eq!(p.interface().group_of(&port!("bar", 0)), Some(1));
        p.connect("/foo[1]", "/bar[0]", &[], 1).unwrap();
    }

    #[test]
    fn test_interface_mut_type_tags() {
        let mut p = foo_bar();
        p.interface_mut().set("/foo[0:2]", &["type"], "spike").unwrap();
        assert_eq!(p.get_interface(0).get("/foo/*", &["type"]).unwrap().len(), 3);
        assert_eq!(p.which_int("/bar[0]").unwrap().into_iter().collect::<Vec<_>>(), vec![1]);
        assert!(p.in_interfaces("/foo[2]").unwrap());
        assert!(!p.in_interfaces("/baz[0]").unwrap());
    }

    #[test]
    fn test_display() {
        let mut p = foo_bar();
        p.connect("/foo[0]", "/bar[1]", &[], 1).unwrap();
        let text = p.to_string();
        assert!(text.starts_with("Pattern\n"));
        assert!(text.contains("/foo[0]\t/bar[1]\t1"));
    }
}
