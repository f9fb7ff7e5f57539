//! portweave connectivity patterns
//!
//! A [`Pattern`] connects ports of two or more disjoint interface groups with
//! directed edges. Every destination has at most one source (fan-out only),
//! and both endpoints of an edge always belong to different groups.
//!
//! - [`Pattern`]: port table plus edge table, validated on every write
//! - [`IdxQuery`]: filters for source/destination lookups
//! - [`graph`]: `petgraph` export and import
//! - [`table`]: delimited text export and import
//!
//! ```rust
//! use portweave_pattern::{IdxQuery, Pattern};
//!
//! let mut p = Pattern::new(&["/foo[0:3]", "/bar[0:3]"]).unwrap();
//! p.connect("/foo[0]", "/bar[0:2]", &[], 1).unwrap();
//! p.connect("/bar[2]", "/foo[1]", &[], 1).unwrap();
//! assert_eq!(p.len(), 3);
//! assert!(p.is_connected(0, 1).unwrap());
//!
//! let q = IdxQuery::new().dest_ports("/bar[1]");
//! assert_eq!(p.src_idx(0, 1, &q).unwrap().len(), 1);
//! ```

pub mod build;
pub mod graph;
pub mod pattern;
pub mod query;
pub mod table;

pub use graph::{ConnEdge, GraphConfig, PatternGraph, PortNode};
pub use pattern::{Conn, Pattern, PatternConfig};
pub use query::IdxQuery;
pub use table::CsvConfig;
