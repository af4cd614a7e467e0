//! Reconciliation core: normalize push events, match them against view
//! predicates, reconcile the registry and signal changes.
mod engine;
mod matcher;
mod normalizer;
mod pump;
mod reconciler;
mod registry;
mod version;

pub use engine::*;
pub use matcher::*;
pub use normalizer::*;
pub use pump::*;
pub use reconciler::*;
pub use registry::*;
pub use version::*;
