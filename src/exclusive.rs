//! Exclusive-ownership tree backed by a generational arena.
//!
//! In this model, lifetime and structure coincide: every node is owned by
//! the tree through its parent chain, a destroyed subtree takes all of its
//! nodes with it immediately, and there is no detached or orphaned state.
//! Nodes never leave the arena, so copying or relocating a node is not
//! expressible; callers only ever hold [`NodeId`] handles, and a handle
//! whose node has been destroyed turns stale (its generation no longer
//! matches) instead of dangling.

use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::errors::{TreeError, TreeResult};

/// Copyable handle to a node in an [`ExclusiveTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

struct NodeEntry {
    name: String,
    /// Arena index of the parent, `None` for the root.
    parent: Option<Index>,
    /// Arena indices of the owned children, in insertion order.
    children: Vec<Index>,
}

/// Tree that exclusively owns its nodes.
pub struct ExclusiveTree {
    arena: Arena<NodeEntry>,
    root: Index,
}

impl Default for ExclusiveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ExclusiveTree {
    /// Creates a tree holding a single root node named "root".
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(NodeEntry {
            name: "root".to_owned(),
            parent: None,
            children: Vec::new(),
        });
        Self { arena, root }
    }

    /// The root node. Always present.
    pub fn root(&self) -> NodeId {
        NodeId(self.root)
    }

    fn entry(&self, id: NodeId) -> TreeResult<&NodeEntry> {
        self.arena.get(id.0).ok_or(TreeError::StaleNode)
    }

    fn entry_mut(&mut self, id: NodeId) -> TreeResult<&mut NodeEntry> {
        self.arena.get_mut(id.0).ok_or(TreeError::StaleNode)
    }

    pub fn name(&self, id: NodeId) -> TreeResult<&str> {
        Ok(&self.entry(id)?.name)
    }

    #[instrument(level = "trace", skip(self, name))]
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> TreeResult<()> {
        self.entry_mut(id)?.name = name.into();
        Ok(())
    }

    /// Parent handle; `None` for the root.
    pub fn parent(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.entry(id)?.parent.map(NodeId))
    }

    pub fn num_children(&self, id: NodeId) -> TreeResult<usize> {
        Ok(self.entry(id)?.children.len())
    }

    /// Child at `index`, left to right.
    pub fn child(&self, id: NodeId, index: usize) -> TreeResult<NodeId> {
        let entry = self.entry(id)?;
        entry
            .children
            .get(index)
            .copied()
            .map(NodeId)
            .ok_or(TreeError::ChildIndexOutOfRange {
                index,
                len: entry.children.len(),
            })
    }

    /// Appends a new child under `parent` and returns its handle.
    ///
    /// Allocation failure is fatal, not recoverable; the only error here is
    /// a stale parent handle.
    #[instrument(level = "trace", skip(self))]
    pub fn create_child(&mut self, parent: NodeId, name: &str) -> TreeResult<NodeId> {
        let child = self.arena.insert(NodeEntry {
            name: name.to_owned(),
            parent: Some(parent.0),
            children: Vec::new(),
        });
        match self.arena.get_mut(parent.0) {
            Some(entry) => {
                entry.children.push(child);
                Ok(NodeId(child))
            }
            None => {
                self.arena.remove(child);
                Err(TreeError::StaleNode)
            }
        }
    }

    /// Destroys the entire owned subtree under `id`, immediately and
    /// synchronously. Handles into the destroyed subtree turn stale.
    ///
    /// The walk uses an explicit worklist: subtree depth is caller
    /// controlled, so teardown must not grow the call stack with it.
    #[instrument(level = "debug", skip(self))]
    pub fn clear_children(&mut self, id: NodeId) -> TreeResult<()> {
        let mut worklist = std::mem::take(&mut self.entry_mut(id)?.children);
        while let Some(index) = worklist.pop() {
            if let Some(entry) = self.arena.remove(index) {
                worklist.extend(entry.children);
            }
        }
        Ok(())
    }

    /// Number of live nodes, root included.
    pub fn num_nodes(&self) -> usize {
        self.arena.len()
    }

    /// Length of the longest root-to-leaf chain.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((index, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(entry) = self.arena.get(index) {
                stack.extend(entry.children.iter().map(|&child| (child, depth + 1)));
            }
        }
        max_depth
    }

    /// Names of leaf nodes, left to right.
    pub fn leaf_names(&self) -> Vec<String> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            if let Some(entry) = self.arena.get(index) {
                if entry.children.is_empty() {
                    leaves.push(entry.name.clone());
                } else {
                    stack.extend(entry.children.iter().rev());
                }
            }
        }
        leaves
    }

    /// Pre-order traversal over node handles.
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Post-order traversal over node handles (children before parents).
    pub fn iter_postorder(&self) -> PostOrderIter<'_> {
        PostOrderIter {
            tree: self,
            stack: vec![(self.root, false)],
        }
    }

    /// Renders the hierarchy for diagnostics.
    pub fn render(&self) -> termtree::Tree<String> {
        fn build(tree: &ExclusiveTree, index: Index) -> termtree::Tree<String> {
            match tree.arena.get(index) {
                Some(entry) => {
                    let leaves: Vec<_> = entry
                        .children
                        .iter()
                        .map(|&child| build(tree, child))
                        .collect();
                    termtree::Tree::new(entry.name.clone()).with_leaves(leaves)
                }
                None => termtree::Tree::new(String::new()),
            }
        }
        build(self, self.root)
    }
}

impl fmt::Display for ExclusiveTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl fmt::Debug for ExclusiveTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusiveTree")
            .field("num_nodes", &self.num_nodes())
            .finish()
    }
}

pub struct TreeIter<'a> {
    tree: &'a ExclusiveTree,
    stack: Vec<Index>,
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(index) = self.stack.pop() {
            if let Some(entry) = self.tree.arena.get(index) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(entry.children.iter().rev());
                return Some(NodeId(index));
            }
        }
        None
    }
}

pub struct PostOrderIter<'a> {
    tree: &'a ExclusiveTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, visited)) = self.stack.pop() {
            if let Some(entry) = self.tree.arena.get(index) {
                if visited {
                    return Some(NodeId(index));
                }
                self.stack.push((index, true));
                for &child in entry.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}
