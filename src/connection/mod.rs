//! This module is the push-event connection layer
//!
//! One logical connection per process, shared by every consumer through a
//! cloneable [`ConnectionManager`] handle. The manager multiplexes many
//! subscribers over a single transport session, reconnects with capped
//! exponential backoff and reattaches every subscribed event name each time
//! the connection comes back.
mod identity;
mod local;
mod manager;
mod state;
mod subscription;
mod transport;

pub use identity::*;
pub use local::*;
pub use manager::*;
pub use state::*;
pub use subscription::*;
pub use transport::*;
