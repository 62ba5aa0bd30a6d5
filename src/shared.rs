//! Shared-ownership tree with weak back-references and iterative detach.
//!
//! Nodes are shared-ownership entities: any holder may keep a node alive
//! past its removal from the tree. Structure is a separate concern from
//! lifetime, and the tree is its sole authority: the children vectors hold
//! the only structural strong references, back-links (child→parent,
//! node→tree) are weak, and removal runs a detach walk that severs every
//! link in the removed subtree no matter how many external strong
//! references remain. A detached node keeps its name and stays usable for
//! as long as someone holds it, permanently orphaned: no parent, no tree,
//! no children.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::errors::{TreeError, TreeResult};
use crate::identity::{Identify, ReferentId};
use crate::weak::WeakRef;

/// Owner handle of a shared tree.
///
/// Deliberately not cloneable: the tree core has exactly one owner. Nodes
/// reach the core through weak back-links only, so no node can keep its
/// tree alive. Dropping the handle detaches every node still in the tree,
/// root included; nodes that external holders keep alive survive detached.
pub struct SharedTree {
    core: Arc<TreeCore>,
}

/// Shared identity and root storage of a tree.
///
/// Nodes reach the core through their weak back-link while attached; a
/// resolved core hands out the root but carries no structural mutators of
/// its own.
pub struct TreeCore {
    root: Arc<SharedNode>,
}

/// A node under shared ownership.
pub struct SharedNode {
    /// Weak self-reference installed at construction, so the node can hand
    /// out parent back-links for its children without a strong reference
    /// to itself ever existing inside the node.
    self_ref: Weak<SharedNode>,
    state: RwLock<NodeState>,
}

struct NodeState {
    name: String,
    /// Weak back-link to the owning tree; null once detached.
    tree: Weak<TreeCore>,
    /// Weak back-link to the parent; null for the root and once detached.
    parent: Weak<SharedNode>,
    /// The only structural strong references in the system.
    children: Vec<Arc<SharedNode>>,
}

impl SharedTree {
    /// Creates a tree holding a single root node named "root".
    pub fn new() -> Self {
        let core = Arc::new_cyclic(|core: &Weak<TreeCore>| TreeCore {
            root: SharedNode::attached(core.clone(), Weak::new(), "root"),
        });
        Self { core }
    }

    /// The root node. Resolvable for the whole lifetime of this handle.
    pub fn root(&self) -> WeakRef<SharedNode> {
        self.core.root()
    }

    /// Renders the attached structure for diagnostics.
    pub fn render(&self) -> termtree::Tree<String> {
        fn build(node: &Arc<SharedNode>) -> termtree::Tree<String> {
            let state = node.state.read();
            let leaves: Vec<_> = state.children.iter().map(build).collect();
            termtree::Tree::new(state.name.clone()).with_leaves(leaves)
        }
        build(&self.core.root)
    }
}

impl Default for SharedTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SharedTree {
    /// Tree destruction detaches the entire tree; the root is not exempt.
    fn drop(&mut self) {
        detach_subtree(vec![self.core.root.clone()]);
    }
}

impl Identify for SharedTree {
    fn identity(&self) -> ReferentId {
        ReferentId::Entity(Arc::as_ptr(&self.core) as usize)
    }
}

impl fmt::Display for SharedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl fmt::Debug for SharedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedTree")
            .field("root", &self.core.root)
            .finish()
    }
}

impl TreeCore {
    /// The root node of this tree.
    pub fn root(&self) -> WeakRef<SharedNode> {
        WeakRef::from(&self.root)
    }
}

impl SharedNode {
    /// Node construction is only reachable through the owning structure:
    /// [`SharedTree::new`] for the root, [`create_child`] for everything
    /// else. Both back-links are installed here, before any caller can
    /// observe the node.
    ///
    /// [`create_child`]: SharedNode::create_child
    fn attached(tree: Weak<TreeCore>, parent: Weak<SharedNode>, name: &str) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            self_ref: self_ref.clone(),
            state: RwLock::new(NodeState {
                name: name.to_owned(),
                tree,
                parent,
                children: Vec::new(),
            }),
        })
    }

    pub fn name(&self) -> String {
        self.state.read().name.clone()
    }

    #[instrument(level = "trace", skip(self, name))]
    pub fn set_name(&self, name: impl Into<String>) {
        self.state.write().name = name.into();
    }

    /// Weak back-link to the owning tree.
    ///
    /// Resolves to `None` once this node is detached, and likewise once the
    /// tree owner itself is gone.
    pub fn tree(&self) -> WeakRef<TreeCore> {
        WeakRef::from_weak(self.state.read().tree.clone())
    }

    /// Weak back-link to the parent; null for the root and for detached
    /// nodes.
    pub fn parent(&self) -> WeakRef<SharedNode> {
        WeakRef::from_weak(self.state.read().parent.clone())
    }

    pub fn num_children(&self) -> usize {
        self.state.read().children.len()
    }

    /// Child at `index`, left to right.
    ///
    /// The returned reference does not keep the child alive. A concurrent
    /// detach may win the race before the caller resolves it; resolution
    /// failing is the defined outcome of that race.
    pub fn child(&self, index: usize) -> TreeResult<WeakRef<SharedNode>> {
        let state = self.state.read();
        state
            .children
            .get(index)
            .map(WeakRef::from)
            .ok_or(TreeError::ChildIndexOutOfRange {
                index,
                len: state.children.len(),
            })
    }

    /// Appends a child and returns a non-owning reference to it: callers
    /// decide for themselves whether the child should outlive its
    /// attachment. Allocation failure is fatal, not recoverable.
    #[instrument(level = "trace", skip(self))]
    pub fn create_child(&self, name: &str) -> WeakRef<SharedNode> {
        let mut state = self.state.write();
        let child = SharedNode::attached(state.tree.clone(), self.self_ref.clone(), name);
        let handle = WeakRef::from(&child);
        state.children.push(child);
        handle
    }

    /// Structurally removes every descendant of this node.
    ///
    /// Each removed node ends up with no tree, no parent, and no children,
    /// regardless of how many external strong references to it exist.
    /// Removal is one-way: a detached node is never re-attached.
    #[instrument(level = "debug", skip(self))]
    pub fn clear_children(&self) {
        let removed = std::mem::take(&mut self.state.write().children);
        detach_subtree(removed);
    }
}

impl fmt::Debug for SharedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("SharedNode")
            .field("name", &state.name)
            .field("num_children", &state.children.len())
            .finish()
    }
}

/// Severs every link in a removed subtree.
///
/// The walk uses an explicit worklist instead of call-stack recursion:
/// subtree depth is caller-controlled and unbounded. Every node processed
/// here is reached through a strong reference the structure already held;
/// teardown never re-acquires a reference to a node from the node itself.
#[instrument(level = "debug", skip(worklist), fields(roots = worklist.len()))]
fn detach_subtree(mut worklist: Vec<Arc<SharedNode>>) {
    let mut detached = 0usize;
    while let Some(node) = worklist.pop() {
        {
            let mut state = node.state.write();
            state.tree = Weak::new();
            state.parent = Weak::new();
            worklist.append(&mut state.children);
        }
        detached += 1;
        // `node` may be the last strong reference; its children were just
        // surrendered to the worklist, so the drop frees one node at most.
    }
    debug!(detached, "detached subtree");
}
