//! Membership entities consumed by folder authorization.

pub mod model;
pub mod role;

pub use model::{Member, ResourceType};
pub use role::Role;
