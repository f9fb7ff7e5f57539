//! Connection queries between interface groups

use std::collections::HashSet;

use portweave_core::{columns, AttrValue, PortId, PortSpec, WeaveError, WeaveResult};

use crate::pattern::PortFilter;
use crate::{Conn, Pattern};

/// Optional filters for [`Pattern::src_idx`] and [`Pattern::dest_idx`]
#[derive(Clone, Debug, Default)]
pub struct IdxQuery {
    /// Only sources whose `type` equals this value
    pub src_type: Option<AttrValue>,
    /// Only destinations whose `type` equals this value
    pub dest_type: Option<AttrValue>,
    /// Only sources addressed by this spec
    pub src_ports: Option<PortSpec>,
    /// Only destinations addressed by this spec
    pub dest_ports: Option<PortSpec>,
}

impl IdxQuery {
    pub fn new() -> Self {
        IdxQuery::default()
    }

    pub fn src_type(mut self, value: impl Into<AttrValue>) -> Self {
        self.src_type = Some(value.into());
        self
    }

    pub fn dest_type(mut self, value: impl Into<AttrValue>) -> Self {
        self.dest_type = Some(value.into());
        self
    }

    pub fn src_ports(mut self, spec: impl Into<PortSpec>) -> Self {
        self.src_ports = Some(spec.into());
        self
    }

    pub fn dest_ports(mut self, spec: impl Into<PortSpec>) -> Self {
        self.dest_ports = Some(spec.into());
        self
    }
}

/// Endpoint predicate: group, optional type, optional port filter
struct Side<'a> {
    pattern: &'a Pattern,
    group: i64,
    port_type: Option<&'a AttrValue>,
    ports: Option<PortFilter>,
}

impl Side<'_> {
    fn accepts(&self, id: &PortId) -> bool {
        let Some(row) = self.pattern.interface().row(id) else {
            return false;
        };
        row.interface() == Some(self.group)
            && self.port_type.map_or(true, |t| row.port_type() == t)
            && self.ports.as_ref().map_or(true, |f| f.accepts(id))
    }
}

impl Pattern {
    /// Source ports of `src_group` with at least one edge into the selected
    /// destination ports of `dest_group`, in first-seen canonical edge order
    pub fn src_idx(&self, src_group: i64, dest_group: i64, query: &IdxQuery) -> WeaveResult<Vec<PortId>> {
        self.endpoints(src_group, dest_group, query, |(s, _)| s)
    }

    /// Destination ports of `dest_group` fed by the selected source ports of
    /// `src_group`, in first-seen canonical edge order
    pub fn dest_idx(&self, src_group: i64, dest_group: i64, query: &IdxQuery) -> WeaveResult<Vec<PortId>> {
        self.endpoints(src_group, dest_group, query, |(_, d)| d)
    }

    fn endpoints(
        &self,
        src_group: i64,
        dest_group: i64,
        query: &IdxQuery,
        pick: impl Fn(&Conn) -> &PortId,
    ) -> WeaveResult<Vec<PortId>> {
        self.check_groups(src_group, dest_group)?;
        let from = Side {
            pattern: self,
            group: src_group,
            port_type: query.src_type.as_ref(),
            ports: query.src_ports.as_ref().map(|s| self.filter(s)).transpose()?,
        };
        let to = Side {
            pattern: self,
            group: dest_group,
            port_type: query.dest_type.as_ref(),
            ports: query.dest_ports.as_ref().map(|s| self.filter(s)).transpose()?,
        };

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (key, _) in self.edges() {
            if from.accepts(&key.0) && to.accepts(&key.1) {
                let id = pick(key);
                if seen.insert(id) {
                    out.push(id.clone());
                }
            }
        }
        Ok(out)
    }

    /// True if some edge with a non-zero `conn` runs from a port of
    /// `from_group` to a port of `to_group`
    pub fn is_connected(&self, from_group: i64, to_group: i64) -> WeaveResult<bool> {
        self.check_groups(from_group, to_group)?;
        let conn = self.column_index(columns::CONN);
        let interface = self.interface();
        Ok(self.edges().any(|((s, d), vals)| {
            interface.group_of(s) == Some(from_group)
                && interface.group_of(d) == Some(to_group)
                && conn.map_or(true, |pos| !vals[pos].is_zero())
        }))
    }

    /// All edge keys in canonical order
    pub fn get_conns(&self) -> Vec<Conn> {
        self.edges().map(|(key, _)| key.clone()).collect()
    }

    /// All edge keys as canonical selector strings
    pub fn get_conn_selectors(&self) -> Vec<(String, String)> {
        let addressing = self.interface().addressing();
        self.edges()
            .map(|((s, d), _)| (addressing.to_identifier(s), addressing.to_identifier(d)))
            .collect()
    }

    fn check_groups(&self, a: i64, b: i64) -> WeaveResult<()> {
        if a == b {
            return Err(WeaveError::Direction(format!(
                "source and destination are both interface {}",
                a
            )));
        }
        let groups = self.interface_ids();
        for g in [a, b] {
            if !groups.contains(&g) {
                return Err(WeaveError::UnknownInterface(g));
            }
        }
        Ok(())
    }
}
