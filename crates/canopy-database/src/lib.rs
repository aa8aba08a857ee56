//! # canopy-database
//!
//! Store contracts consumed by the tree engine, their PostgreSQL
//! implementations, and an in-memory implementation used by tests and the
//! CLI's demo mode.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::PgStores;
pub use memory::MemoryStore;
pub use store::{
    ApplicationStore, ChildRecord, ClusterStore, FolderStore, FolderTransaction,
    MembershipProvider,
};
