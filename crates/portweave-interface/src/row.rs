//! Read-only view of one port record

use portweave_core::{columns, AttrValue, Io, PortId};

/// One port record, as seen by selection predicates
#[derive(Clone, Copy, Debug)]
pub struct PortRow<'a> {
    id: &'a PortId,
    columns: &'a [String],
    values: &'a [AttrValue],
}

impl<'a> PortRow<'a> {
    pub(crate) fn new(id: &'a PortId, columns: &'a [String], values: &'a [AttrValue]) -> Self {
        PortRow {
            id,
            columns,
            values,
        }
    }

    #[inline]
    pub fn id(&self) -> &'a PortId {
        self.id
    }

    pub fn values(&self) -> &'a [AttrValue] {
        self.values
    }

    /// Cell by column name
    pub fn get(&self, column: &str) -> Option<&'a AttrValue> {
        let pos = self.columns.iter().position(|c| c == column)?;
        self.values.get(pos)
    }

    /// Interface group, if set
    pub fn interface(&self) -> Option<i64> {
        self.get(columns::INTERFACE).and_then(AttrValue::as_int)
    }

    /// Direction, if set to `in` or `out`
    pub fn io(&self) -> Option<Io> {
        self.get(columns::IO).and_then(Io::from_value)
    }

    pub fn port_type(&self) -> &'a AttrValue {
        const UNSET: &AttrValue = &AttrValue::Unset;
        self.get(columns::TYPE).unwrap_or(UNSET)
    }
}
