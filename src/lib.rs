//! Realtime reconciliation of paginated, filtered view caches against a live
//! stream of entity mutation events.
//!
//! Push events are normalized into canonical upsert/remove operations,
//! matched against every registered view's predicate and applied in place
//! without refetching. A version signal tells observers when any view
//! changed.
pub mod constants;
pub mod metrics;
pub mod resource;
pub mod utils;

mod config;
mod connection;
mod core;
mod errors;
mod live;
mod model;

pub use self::core::*;

pub use config::*;
pub use connection::*;
pub use errors::*;
pub use live::*;
pub use metrics::gather_metrics;
pub use model::*;
pub use resource::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
