//! In-memory store used by tests and the CLI demo mode.

pub mod store;

pub use store::{MemoryStore, MemoryTransaction};
