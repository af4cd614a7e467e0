//! Data model shared by the normalizer, registry and reconciler.

mod entity;
mod event;
mod query;
mod snapshot;

pub use entity::*;
pub use event::*;
pub use query::*;
pub use snapshot::*;

#[cfg(test)]
mod query_test;
