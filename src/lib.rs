//! Hierarchical leaf entities with sibling positions.
//!
//! A [`domain::Forest`] owns leaves in a generational arena. Each leaf has an
//! optional parent, a duplicate-free child set and a float `position` used to
//! order it among its siblings. [`domain::PositionCompactor`] reassigns
//! integer positions to a sibling group after fractional insertions.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    compact_positions, DomainError, DomainResult, Forest, LeafId, LeafNode, Position,
    PositionCompactor, Positioned,
};
