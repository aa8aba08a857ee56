//! Folder domain entities.

pub mod model;
pub mod traversal;

pub use model::{Folder, NewFolder, UpdateFolder, VisibilityLevel};
pub use traversal::TraversalIds;
