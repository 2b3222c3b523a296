//! Forest documents
//!
//! A forest document is a TOML file with one `[[leaves]]` table per root and
//! nested `children` arrays:
//!
//! ```toml
//! [[leaves]]
//! name = "home"
//! position = 0.0
//!
//!   [[leaves.children]]
//!   name = "about"
//!   position = 1.5
//! ```
//!
//! Leaf names are unique within a document and are how the CLI addresses leaves.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Forest, LeafId, Positioned};

/// Serializable view of one leaf and its subtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeafSnapshot {
    pub name: String,
    #[serde(default)]
    pub position: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LeafSnapshot>,
}

/// Top-level document: the roots of the forest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ForestDocument {
    #[serde(default)]
    pub leaves: Vec<LeafSnapshot>,
}

impl ForestDocument {
    pub fn parse(content: &str) -> ApplicationResult<Self> {
        toml::from_str(content).map_err(|e| ApplicationError::Document {
            message: e.to_string(),
        })
    }

    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string(self).map_err(|e| ApplicationError::Document {
            message: e.to_string(),
        })
    }
}

/// Forest of named leaves built from a document.
#[derive(Debug, Default)]
pub struct NamedForest {
    pub forest: Forest<String>,
    index: HashMap<String, LeafId>,
}

impl NamedForest {
    pub fn parse(content: &str) -> ApplicationResult<Self> {
        Self::from_document(&ForestDocument::parse(content)?)
    }

    /// Build the forest through the leaf operations, so positions go through
    /// the same floor as any other caller.
    #[instrument(level = "debug", skip(document))]
    pub fn from_document(document: &ForestDocument) -> ApplicationResult<Self> {
        let mut named = Self::default();
        let mut stack: Vec<(&LeafSnapshot, Option<LeafId>)> =
            document.leaves.iter().rev().map(|leaf| (leaf, None)).collect();

        while let Some((snapshot, parent)) = stack.pop() {
            let name = snapshot.name.trim();
            if name.is_empty() {
                return Err(ApplicationError::Document {
                    message: "leaf name must not be blank".to_string(),
                });
            }
            if named.index.contains_key(name) {
                return Err(ApplicationError::DuplicateName(name.to_string()));
            }

            let id = named.forest.insert(name.to_string());
            named.forest.set_position(id, snapshot.position)?;
            if let Some(parent) = parent {
                named.forest.add_child(parent, id)?;
            }
            named.index.insert(name.to_string(), id);

            // Reverse so children are linked in document order
            for child in snapshot.children.iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        debug!(leaves = named.forest.len(), "forest loaded");
        Ok(named)
    }

    pub fn lookup(&self, name: &str) -> ApplicationResult<LeafId> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ApplicationError::LeafNotFound(name.to_string()))
    }

    pub fn name(&self, id: LeafId) -> Option<&str> {
        self.forest.get(id).map(|node| node.data.as_str())
    }

    pub fn to_document(&self) -> ForestDocument {
        ForestDocument {
            leaves: self
                .forest
                .roots()
                .into_iter()
                .filter_map(|root| self.snapshot(root))
                .collect(),
        }
    }

    pub fn to_toml(&self) -> ApplicationResult<String> {
        self.to_document().to_toml()
    }

    fn snapshot(&self, id: LeafId) -> Option<LeafSnapshot> {
        let node = self.forest.get(id)?;
        Some(LeafSnapshot {
            name: node.data.clone(),
            position: node.position(),
            children: node
                .children()
                .iter()
                .filter_map(|&child| self.snapshot(child))
                .collect(),
        })
    }
}
