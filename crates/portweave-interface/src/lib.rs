//! portweave port attribute tables
//!
//! An [`Interface`] holds a set of ports, each addressed by a hierarchical
//! identifier and carrying at least these attributes:
//! - `interface`: which interface group the port belongs to
//! - `io`: whether the port receives input (`in`) or emits output (`out`)
//! - `type`: free-form port type
//!
//! ```rust
//! use portweave_core::values;
//! use portweave_interface::Interface;
//!
//! let mut i = Interface::new("/foo[0:4],/bar[0:3]").unwrap();
//! i.set("/foo[0:2]", &["interface", "io", "type"], values![0, "in", "spike"]).unwrap();
//! i.set("/foo[2:4]", &["interface", "io", "type"], values![1, "out", "spike"]).unwrap();
//! assert_eq!(i.in_ports(0).len(), 2);
//! ```

pub mod interface;
pub mod query;
pub mod row;

pub use interface::{Interface, InterfaceConfig};
pub use row::PortRow;
