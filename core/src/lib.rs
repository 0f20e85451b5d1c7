//! VGraph Core Types
//!
//! This crate provides the foundational types used throughout VGraph:
//! - Identity helpers (UUIDv4 generation and validation)
//! - Property values (the `PropertyValue` tagged union and `Properties` map)
//! - Validation grammars for labels, property keys, values and repos
//! - The content hash used to detect no-op writes
//! - Validation error types

mod error;
mod hash;
mod id;
mod validation;
mod value;

pub use error::*;
pub use hash::*;
pub use id::*;
pub use validation::*;
pub use value::*;
