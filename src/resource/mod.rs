//! Per-resource adapters
//!
//! The reconciliation engine is generic; everything that differs between
//! comments, contact requests, notifications and chat groups lives in a
//! [`ResourceAdapter`]: where the entity sits in a push payload, which field
//! is its id, which fields are searchable and filterable, and which field
//! says it is soft-deleted.

pub mod builtin;
mod adapter;
mod catalog;

pub use adapter::*;
pub use catalog::*;
