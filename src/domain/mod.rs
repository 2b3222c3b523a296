//! Domain layer: leaf entities, sibling positions and compaction
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod compactor;
pub mod error;
pub mod forest;
pub mod position;

pub use compactor::{compact_positions, PositionCompactor};
pub use error::{DomainError, DomainResult};
pub use forest::{Descendants, Forest, LeafId, LeafNode};
pub use position::{compare_position, Position, Positioned, POSITION_FLOOR};
