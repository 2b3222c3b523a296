use std::cmp::Ordering;
use std::fmt;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::compactor::PositionCompactor;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::position::{compare_position, Position, Positioned};

/// Handle of a leaf inside a [`Forest`].
///
/// Handles are the identity of a leaf: two handles name the same entity iff
/// they are equal. A handle never keeps its target alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeafId(Index);

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}v{}", slot, generation)
    }
}

/// Tree node wrapping an entity payload with its sibling position and links.
#[derive(Debug)]
pub struct LeafNode<T> {
    /// Entity payload embedding the tree capability
    pub data: T,
    position: Position,
    /// Non-owning back-reference, None for root nodes
    parent: Option<LeafId>,
    /// Duplicate-free, insertion ordered
    children: Vec<LeafId>,
}

impl<T> LeafNode<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            position: Position::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<LeafId> {
        self.parent
    }

    pub fn children(&self) -> &[LeafId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_child(&self, child: LeafId) -> bool {
        self.children.contains(&child)
    }
}

impl<T> Positioned for LeafNode<T> {
    fn position(&self) -> f64 {
        self.position.get()
    }

    fn set_position(&mut self, value: f64) -> &mut Self {
        self.position.set(value);
        self
    }
}

/// Arena owning every leaf of one or more trees.
///
/// All parent/children mutation goes through the forest so that each side of a
/// link can be updated in turn. Mutations are two-step (own field, then the
/// other side) and not atomic; callers serialize access to a forest.
///
/// Parent chains are expected to be acyclic. Only the self-parent case is
/// rejected; longer cycles make [`Forest::parents`], [`Forest::depth`] and
/// [`Forest::descendants`] non-terminating.
#[derive(Debug)]
pub struct Forest<T> {
    arena: Arena<LeafNode<T>>,
}

impl<T> Default for Forest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Forest<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: LeafId) -> bool {
        self.arena.contains(id.0)
    }

    /// Adds a new root leaf at position `0.0`.
    #[instrument(level = "trace", skip(self, data))]
    pub fn insert(&mut self, data: T) -> LeafId {
        LeafId(self.arena.insert(LeafNode::new(data)))
    }

    pub fn get(&self, id: LeafId) -> Option<&LeafNode<T>> {
        self.arena.get(id.0)
    }

    pub fn get_mut(&mut self, id: LeafId) -> Option<&mut LeafNode<T>> {
        self.arena.get_mut(id.0)
    }

    fn node(&self, id: LeafId) -> DomainResult<&LeafNode<T>> {
        self.arena.get(id.0).ok_or(DomainError::UnknownLeaf(id))
    }

    fn node_mut(&mut self, id: LeafId) -> DomainResult<&mut LeafNode<T>> {
        self.arena.get_mut(id.0).ok_or(DomainError::UnknownLeaf(id))
    }

    fn ensure(&self, id: LeafId) -> DomainResult<()> {
        self.node(id).map(|_| ())
    }

    pub fn position(&self, id: LeafId) -> DomainResult<f64> {
        Ok(self.node(id)?.position())
    }

    /// Values at or below `-1.0` are silently ignored.
    #[instrument(level = "trace", skip(self))]
    pub fn set_position(&mut self, id: LeafId, value: f64) -> DomainResult<&mut Self> {
        self.node_mut(id)?.set_position(value);
        Ok(self)
    }

    pub fn children(&self, id: LeafId) -> DomainResult<&[LeafId]> {
        Ok(self.node(id)?.children())
    }

    pub fn parent(&self, id: LeafId) -> DomainResult<Option<LeafId>> {
        Ok(self.node(id)?.parent)
    }

    /// Appends `child` to the child set of `parent` unless already present.
    ///
    /// Touches the parent side only. Returns whether the set changed.
    fn link(&mut self, parent: LeafId, child: LeafId) -> DomainResult<bool> {
        let node = self.node_mut(parent)?;
        if node.has_child(child) {
            return Ok(false);
        }
        node.children.push(child);
        Ok(true)
    }

    /// Replaces the child set of `id` wholesale and points every new child at `id`.
    ///
    /// Repeated handles collapse to their first occurrence. Leaves dropped
    /// from the old set keep their parent link, and a new child stays in its
    /// former parent's child set: detach them first if they are reused elsewhere.
    #[instrument(level = "trace", skip(self, new_children))]
    pub fn set_children<I>(&mut self, id: LeafId, new_children: I) -> DomainResult<&mut Self>
    where
        I: IntoIterator<Item = LeafId>,
    {
        self.ensure(id)?;
        let children: Vec<LeafId> = new_children.into_iter().unique().collect();
        for &child in &children {
            if child == id {
                debug!(%id, "set_children: leaf listed as its own child");
                return Err(DomainError::SelfParent(id));
            }
            self.ensure(child)?;
        }

        self.node_mut(id)?.children = children.clone();
        for child in children {
            self.node_mut(child)?.parent = Some(id);
        }
        Ok(self)
    }

    /// Adds `child` under `parent`. Adding a present child is a no-op.
    #[instrument(level = "trace", skip(self))]
    pub fn add_child(&mut self, parent: LeafId, child: LeafId) -> DomainResult<&mut Self> {
        if parent == child {
            debug!(%child, "add_child: leaf cannot be its own child");
            return Err(DomainError::SelfParent(child));
        }
        self.ensure(child)?;
        if self.link(parent, child)? {
            self.node_mut(child)?.parent = Some(parent);
        }
        Ok(self)
    }

    /// Removes `child` from `parent` and clears its parent link. No-op if absent.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_child(&mut self, parent: LeafId, child: LeafId) -> DomainResult<&mut Self> {
        self.ensure(child)?;
        let index = self.node(parent)?.children.iter().position(|&c| c == child);
        if let Some(index) = index {
            self.node_mut(parent)?.children.remove(index);
            self.node_mut(child)?.parent = None;
        }
        Ok(self)
    }

    /// Sets the parent link of `id`; a new parent also gains `id` as a child.
    ///
    /// `None` clears the back-reference only: the former parent still lists
    /// `id`. Use [`Forest::detach`] for a symmetric detachment.
    #[instrument(level = "trace", skip(self))]
    pub fn set_parent(&mut self, id: LeafId, parent: Option<LeafId>) -> DomainResult<&mut Self> {
        if parent == Some(id) {
            debug!(%id, "set_parent: leaf cannot be its own parent");
            return Err(DomainError::SelfParent(id));
        }
        self.ensure(id)?;
        if let Some(parent) = parent {
            self.ensure(parent)?;
        }

        self.node_mut(id)?.parent = parent;
        if let Some(parent) = parent {
            self.link(parent, id)?;
        }
        Ok(self)
    }

    /// Removes `id` from its parent's child set and clears its parent link.
    ///
    /// Returns the former parent.
    #[instrument(level = "trace", skip(self))]
    pub fn detach(&mut self, id: LeafId) -> DomainResult<Option<LeafId>> {
        let former = self.node(id)?.parent;
        if let Some(parent) = former.and_then(|p| self.arena.get_mut(p.0)) {
            parent.children.retain(|&c| c != id);
        }
        self.node_mut(id)?.parent = None;
        Ok(former)
    }

    /// Ancestors of `id`, root first and immediate parent last.
    #[instrument(level = "trace", skip(self))]
    pub fn parents(&self, id: LeafId) -> DomainResult<Vec<LeafId>> {
        let mut ancestors = Vec::new();
        let mut current = self.node(id)?.parent;
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.node(parent)?.parent;
        }
        ancestors.reverse();
        Ok(ancestors)
    }

    /// `0` for a root, one more than the parent's depth otherwise.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self, id: LeafId) -> DomainResult<usize> {
        match self.node(id)?.parent {
            None => Ok(0),
            Some(parent) => Ok(self.depth(parent)? + 1),
        }
    }

    /// Every leaf of the forest in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (LeafId, &LeafNode<T>)> + '_ {
        self.arena.iter().map(|(idx, node)| (LeafId(idx), node))
    }

    /// Leaves without a parent, in insertion order.
    pub fn roots(&self) -> Vec<LeafId> {
        self.arena
            .iter()
            .filter(|(_, node)| node.is_root())
            .map(|(idx, _)| LeafId(idx))
            .collect()
    }

    /// The sibling group of `id`, `id` included: its parent's children, or the roots.
    pub fn siblings(&self, id: LeafId) -> DomainResult<Vec<LeafId>> {
        match self.node(id)?.parent {
            Some(parent) => Ok(self.children(parent)?.to_vec()),
            None => Ok(self.roots()),
        }
    }

    /// Children sorted by position; equal positions keep child-set order.
    pub fn children_by_position(&self, id: LeafId) -> DomainResult<Vec<LeafId>> {
        Ok(self.by_position(self.children(id)?))
    }

    fn by_position(&self, ids: &[LeafId]) -> Vec<LeafId> {
        ids.iter()
            .copied()
            .sorted_by(|a, b| match (self.get(*a), self.get(*b)) {
                (Some(a), Some(b)) => compare_position(a, b),
                _ => Ordering::Equal,
            })
            .collect()
    }

    /// Pre-order walk of the subtree rooted at `id`.
    pub fn descendants(&self, id: LeafId) -> DomainResult<Descendants<'_, T>> {
        self.ensure(id)?;
        Ok(Descendants {
            forest: self,
            stack: vec![id],
        })
    }

    /// Members of the subtree rooted at `id` that have no children.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self, id: LeafId) -> DomainResult<Vec<LeafId>> {
        Ok(self
            .descendants(id)?
            .filter(|(_, node)| node.children.is_empty())
            .map(|(idx, _)| idx)
            .collect())
    }

    /// Runs `compactor` over the given siblings in the given order.
    ///
    /// Repeated handles count once. Unknown handles fail before anything is assigned.
    #[instrument(level = "debug", skip(self, compactor))]
    pub fn compact_siblings(
        &mut self,
        order: &[LeafId],
        compactor: &PositionCompactor,
    ) -> DomainResult<usize> {
        let order: Vec<LeafId> = order.iter().copied().unique().collect();
        for &id in &order {
            self.ensure(id)?;
        }

        for (index, &id) in order.iter().enumerate() {
            compactor.assign(index, self.node_mut(id)?);
        }
        debug!(next = order.len(), dry_run = compactor.is_dry_run(), "siblings compacted");
        Ok(order.len())
    }

    /// Compacts the children of `parent` in their current position order.
    pub fn compact_children(
        &mut self,
        parent: LeafId,
        compactor: &PositionCompactor,
    ) -> DomainResult<usize> {
        let order = self.children_by_position(parent)?;
        self.compact_siblings(&order, compactor)
    }

    /// Compacts the roots in their current position order.
    pub fn compact_roots(&mut self, compactor: &PositionCompactor) -> DomainResult<usize> {
        let order = self.by_position(&self.roots());
        self.compact_siblings(&order, compactor)
    }

    /// Compacts every sibling group: the roots and each non-empty child set.
    ///
    /// A child whose parent link points elsewhere (left behind by
    /// `set_parent(child, None)` or a later `set_parent`) is skipped in that
    /// child set, so it is compacted once, in the group its link names.
    ///
    /// Returns the number of groups processed.
    #[instrument(level = "debug", skip(self, compactor))]
    pub fn compact_all(&mut self, compactor: &PositionCompactor) -> DomainResult<usize> {
        if self.is_empty() {
            return Ok(0);
        }
        self.compact_roots(compactor)?;
        let mut groups = 1;

        let parents: Vec<LeafId> = self
            .arena
            .iter()
            .filter(|(_, node)| !node.children.is_empty())
            .map(|(idx, _)| LeafId(idx))
            .collect();
        for parent in parents {
            let order: Vec<LeafId> = self
                .children_by_position(parent)?
                .into_iter()
                .filter(|&child| self.get(child).and_then(LeafNode::parent) == Some(parent))
                .collect();
            self.compact_siblings(&order, compactor)?;
            groups += 1;
        }
        debug!(groups, "compact_all done");
        Ok(groups)
    }
}

/// Pre-order iterator over a subtree, children in child-set order.
pub struct Descendants<'a, T> {
    forest: &'a Forest<T>,
    stack: Vec<LeafId>,
}

impl<'a, T> Iterator for Descendants<'a, T> {
    type Item = (LeafId, &'a LeafNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.forest.get(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}
