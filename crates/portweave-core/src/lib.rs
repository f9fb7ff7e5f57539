//! portweave core - fundamental types
//!
//! This crate defines the types shared by every layer of portweave:
//! - Port identifiers (Token, PortId) and the identifier-or-selector argument (PortSpec)
//! - Attribute values, port directions and well-known column names
//! - Value assignment with column coercion
//! - Row sets returned by table reads
//! - Error types

pub mod assign;
pub mod error;
pub mod id;
pub mod rows;
pub mod value;

pub use assign::*;
pub use error::*;
pub use id::*;
pub use rows::*;
pub use value::*;
