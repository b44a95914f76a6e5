//! Event delivery
//!
//! Event instructions build [`Event`](crate::interpreter::types::Event)
//! records; the registry here routes them to the listeners registered on
//! the skeleton they concern.

pub mod registry;

pub use registry::{Listener, ListenerId, ListenerRegistry, RegistryError};
