//! Group queries, filtering and alternate constructors for port tables

use std::collections::BTreeSet;

use portweave_core::{Assign, AttrValue, Io, PortId, PortSpec, WeaveError, WeaveResult};

use crate::interface::check_identifiers;
use crate::{Interface, InterfaceConfig, PortRow};

impl Interface {
    /// Create a table from selector/value entries.
    ///
    /// The union of all selectors must be duplicate free. Each value is
    /// assigned with no explicit columns: a scalar goes to the first column,
    /// ordered values fill the columns in order.
    pub fn from_map<S, V>(entries: Vec<(S, V)>) -> WeaveResult<Interface>
    where
        S: AsRef<str>,
        V: Into<Assign>,
    {
        let union = entries
            .iter()
            .map(|(s, _)| s.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        let mut table = Interface::new(union)?;
        for (selector, value) in entries {
            table.set(selector.as_ref(), &[], value)?;
        }
        Ok(table)
    }

    /// Create a table from pre-built rows, copying them
    pub fn from_rows(
        columns: Vec<String>,
        rows: Vec<(PortId, Vec<AttrValue>)>,
    ) -> WeaveResult<Interface> {
        check_identifiers(rows.iter().map(|(id, _)| id))?;
        if let Some((id, vals)) = rows.iter().find(|(_, vals)| vals.len() != columns.len()) {
            return Err(WeaveError::ValueShape(format!(
                "row {} has {} values for {} columns",
                id,
                vals.len(),
                columns.len()
            )));
        }

        let mut table = Interface::with_config(PortSpec::Ids(Vec::new()), InterfaceConfig { columns })?;
        table.set_levels(rows.first().map_or(0, |(id, _)| id.levels()));
        for (id, vals) in rows {
            table.insert_row(id, vals);
        }
        Ok(table)
    }

    /// Canonical selector strings of `ids`
    pub fn as_selectors<'a>(ids: impl IntoIterator<Item = &'a PortId>) -> Vec<String> {
        ids.into_iter().map(PortId::to_selector).collect()
    }

    /// Set of all interface groups with at least one port
    pub fn interface_ids(&self) -> BTreeSet<i64> {
        self.iter().filter_map(|r| r.interface()).collect()
    }

    /// True if `spec` addresses at least one port of this table
    pub fn in_interfaces(&self, spec: impl Into<PortSpec>) -> WeaveResult<bool> {
        Ok(!self.matching(&spec.into())?.is_empty())
    }

    /// Interface groups of the ports addressed by `spec`, ignoring unset groups
    pub fn which_int(&self, spec: impl Into<PortSpec>) -> WeaveResult<BTreeSet<i64>> {
        Ok(self
            .matching(&spec.into())?
            .iter()
            .filter_map(|id| self.group_of(id))
            .collect())
    }

    /// Ports of group `group`
    pub fn ports(&self, group: i64) -> Vec<PortId> {
        self.ids_where(|r| r.interface() == Some(group))
    }

    /// Ports of group `group` whose direction is `in`
    pub fn in_ports(&self, group: i64) -> Vec<PortId> {
        self.ids_where(|r| r.interface() == Some(group) && r.io() == Some(Io::In))
    }

    /// Ports of group `group` whose direction is `out`
    pub fn out_ports(&self, group: i64) -> Vec<PortId> {
        self.ids_where(|r| r.interface() == Some(group) && r.io() == Some(Io::Out))
    }

    fn ids_where(&self, f: impl Fn(&PortRow<'_>) -> bool) -> Vec<PortId> {
        self.iter().filter(|r| f(r)).map(|r| r.id().clone()).collect()
    }

    /// Table restricted to the ports of `group`
    pub fn get_interface(&self, group: i64) -> Interface {
        self.data_select(|r| r.interface() == Some(group))
    }

    /// Check whether group `a` of this table can be connected to group `b` of `other`.
    ///
    /// Both groups must comprise the same identifiers, and every identifier
    /// must be `in` on one side and `out` on the other. Every compared port
    /// needs its direction set.
    pub fn is_compatible(&self, a: i64, other: &Interface, b: i64) -> WeaveResult<bool> {
        let ours = directions(self, a)?;
        let theirs = directions(other, b)?;
        if ours.len() != theirs.len() {
            return Ok(false);
        }
        Ok(ours
            .iter()
            .zip(&theirs)
            .all(|((id_a, io_a), (id_b, io_b))| id_a == id_b && io_a.opposite() == *io_b))
    }

    /// Copy of the table keeping only rows passing `f`
    pub fn data_select(&self, f: impl Fn(&PortRow<'_>) -> bool) -> Interface {
        let mut out = self.empty_like();
        for row in self.iter().filter(|r| f(r)) {
            out.insert_row(row.id().clone(), row.values().to_vec());
        }
        out
    }

    /// Keep only rows passing `f`
    pub fn data_select_in_place(&mut self, f: impl Fn(&PortRow<'_>) -> bool) -> &mut Self {
        let columns = self.columns().to_vec();
        self.retain(|id, vals| f(&PortRow::new(id, &columns, vals)));
        self
    }

    /// Copy of the table keeping only ports whose identifier passes `f`
    pub fn port_select(&self, f: impl Fn(&PortId) -> bool) -> Interface {
        self.data_select(|r| f(r.id()))
    }

    /// Keep only ports whose identifier passes `f`
    pub fn port_select_in_place(&mut self, f: impl Fn(&PortId) -> bool) -> &mut Self {
        self.retain(|id, _| f(id));
        self
    }
}

/// Directions of the ports of one group, failing on unset direction
fn directions(table: &Interface, group: i64) -> WeaveResult<Vec<(PortId, Io)>> {
    table
        .iter()
        .filter(|r| r.interface() == Some(group))
        .map(|r| match r.io() {
            Some(io) => Ok((r.id().clone(), io)),
            None => Err(WeaveError::Direction(format!(
                "port {} has no io direction set",
                r.id()
            ))),
        })
        .collect()
}
