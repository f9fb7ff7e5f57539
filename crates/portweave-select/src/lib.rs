//! portweave addressing layer
//!
//! Resolves selectors into hierarchical port identifiers:
//! - [`Addressing`]: the narrow interface port tables consume
//! - [`PathSelector`]: path-like selector implementation (`/foo[0:3]`)
//!
//! ```rust
//! use portweave_select::{Addressing, PathSelector};
//!
//! let sel = PathSelector::new();
//! let ids = sel.make_index("/foo[0:2]").unwrap();
//! assert_eq!(sel.to_identifier(&ids[1]), "/foo[1]");
//! assert!(sel.are_disjoint(&["/foo[0:2]", "/bar[0:2]"]).unwrap());
//! ```

pub mod addressing;
pub mod path;
pub mod selector;

pub use addressing::*;
pub use path::{parse_selector, Item, Level, Path};
pub use selector::*;
