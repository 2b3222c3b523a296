//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::forest::LeafId;

/// Domain errors represent violations of the leaf model.
///
/// `SelfParent` is the only behavioral failure of the model. `UnknownLeaf`
/// guards arena handles that do not name a live node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("an entity cannot have itself as a parent: {0}")]
    SelfParent(LeafId),

    #[error("unknown leaf: {0}")]
    UnknownLeaf(LeafId),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
