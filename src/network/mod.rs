pub mod sync;
pub mod transport;

#[cfg(test)]
pub mod testing;

pub use sync::{Subscription, SyncConfig, SyncEngine};
pub use transport::{ChatBackend, HttpTransport};
