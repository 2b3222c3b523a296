//! Forest document service
//!
//! Loads forest documents through the filesystem boundary and answers the
//! queries the CLI exposes.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::render::render_forest;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt, NamedForest};
use crate::domain::{LeafId, PositionCompactor, Positioned};
use crate::infrastructure::traits::FileSystem;

/// Outcome of compacting every sibling group of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactReport {
    /// Sibling groups processed (the roots plus every non-empty child set)
    pub groups: usize,
    /// Leaves in the document
    pub leaves: usize,
    /// Leaves whose position changed
    pub moved: usize,
    /// Whether the document was rewritten
    pub written: bool,
}

/// Service for loading, querying and compacting forest documents.
pub struct TreeService {
    fs: Arc<dyn FileSystem>,
}

impl TreeService {
    /// Create a new tree service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load and link a forest document.
    pub fn load(&self, path: &Path) -> ApplicationResult<NamedForest> {
        debug!("load: path={}", path.display());
        if !self.fs.exists(path) {
            return Err(ApplicationError::DocumentNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read forest document", path)?;
        NamedForest::parse(&content)
    }

    /// Render the document as text trees.
    pub fn render(&self, path: &Path, show_positions: bool) -> ApplicationResult<String> {
        let named = self.load(path)?;
        Ok(render_forest(&named.forest, show_positions))
    }

    /// Render the document back as normalized TOML.
    pub fn render_toml(&self, path: &Path) -> ApplicationResult<String> {
        self.load(path)?.to_toml()
    }

    /// Depth of the named leaf (`0` for a root).
    pub fn depth(&self, path: &Path, name: &str) -> ApplicationResult<usize> {
        let named = self.load(path)?;
        let id = named.lookup(name)?;
        Ok(named.forest.depth(id)?)
    }

    /// Names of the ancestors of the named leaf, root first.
    pub fn ancestors(&self, path: &Path, name: &str) -> ApplicationResult<Vec<String>> {
        let named = self.load(path)?;
        let id = named.lookup(name)?;
        Ok(named
            .forest
            .parents(id)?
            .into_iter()
            .filter_map(|ancestor| named.name(ancestor).map(str::to_string))
            .collect())
    }

    /// Next free position after the last child of `parent`, or after the last root.
    ///
    /// Counts the sibling group without changing it.
    pub fn next_position(&self, path: &Path, parent: Option<&str>) -> ApplicationResult<usize> {
        let mut named = self.load(path)?;
        let compactor = PositionCompactor::dry_run();
        let next = match parent {
            Some(name) => {
                let id = named.lookup(name)?;
                named.forest.compact_children(id, &compactor)?
            }
            None => named.forest.compact_roots(&compactor)?,
        };
        Ok(next)
    }

    /// Compact every sibling group and write the document back when positions moved.
    ///
    /// With `dry_run` the report is computed but nothing is written.
    pub fn compact(&self, path: &Path, dry_run: bool) -> ApplicationResult<CompactReport> {
        let mut named = self.load(path)?;
        let before: HashMap<LeafId, f64> = named
            .forest
            .iter()
            .map(|(id, node)| (id, node.position()))
            .collect();

        let groups = named.forest.compact_all(&PositionCompactor::new())?;
        let moved = named
            .forest
            .iter()
            .filter(|(id, node)| before.get(id) != Some(&node.position()))
            .count();

        let written = !dry_run && moved > 0;
        if written {
            let content = named.to_toml()?;
            self.fs
                .write(path, &content)
                .with_path_context("write forest document", path)?;
            info!("compacted {} leaves in {}", moved, path.display());
        }

        Ok(CompactReport {
            groups,
            leaves: named.forest.len(),
            moved,
            written,
        })
    }
}
