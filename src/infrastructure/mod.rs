//! Infrastructure layer: I/O implementations
//!
//! This layer implements the I/O boundary traits used by services.

pub mod error;
pub mod traits;

pub use error::InfraError;
pub use traits::{FileSystem, RealFileSystem};
