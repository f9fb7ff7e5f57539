//! Bulk pattern construction

use portweave_core::{Assign, WeaveResult};
use tracing::debug;

use crate::{Pattern, PatternConfig};

impl Pattern {
    /// Pattern over `selectors` with every port of `from` connected to every
    /// port of `to`, each edge carrying `data`
    pub fn from_product<S: AsRef<str>>(
        selectors: &[S],
        from: &str,
        to: &str,
        data: impl Into<Assign>,
        config: PatternConfig,
    ) -> WeaveResult<Pattern> {
        let mut pattern = Pattern::with_config(selectors, config)?;
        pattern.connect(from, to, &[], data)?;
        debug!(edges = pattern.len(), "built pattern from product");
        Ok(pattern)
    }

    /// Pattern over `selectors` with the i-th port of `from` connected to the
    /// i-th port of `to`. Both sides must expand to the same number of ports.
    pub fn from_concat<S: AsRef<str>>(
        selectors: &[S],
        from: &str,
        to: &str,
        data: impl Into<Assign>,
        config: PatternConfig,
    ) -> WeaveResult<Pattern> {
        let mut pattern = Pattern::with_config(selectors, config)?;
        pattern.connect_each(from, to, &[], data)?;
        debug!(edges = pattern.len(), "built pattern from concatenation");
        Ok(pattern)
    }
}
