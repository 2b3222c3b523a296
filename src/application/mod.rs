//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod document;
pub mod error;
pub mod error_ext;
pub mod render;
pub mod services;

pub use document::{ForestDocument, LeafSnapshot, NamedForest};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use render::{render_forest, TreeNodeConvert};
