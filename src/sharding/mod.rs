//! Type-based sharding across suites
//!
//! - `router`: static type → suite tables
//! - `identity`: composite `{suite, id}` identities
//! - `dispatcher`: the composed graph itself

pub mod dispatcher;
pub mod identity;
pub mod router;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use identity::CompositeId;
pub use router::TypeRouter;
