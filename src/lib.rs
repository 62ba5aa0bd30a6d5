//! Hierarchical ownership trees.
//!
//! Two tree models over the same vocabulary of reference kinds:
//!
//! - [`ExclusiveTree`]: the structure owns its nodes outright; lifetime and
//!   structure coincide, destruction is transitive and immediate.
//! - [`SharedTree`]: nodes are shared-ownership entities that external
//!   holders may keep alive past removal; the tree is the sole structural
//!   authority and severs removed subtrees with an iterative detach walk.
//!
//! Back-references (child→parent, node→tree, observer→subject) are always
//! weak: they record identity without extending lifetime and must be
//! resolved before use ([`WeakRef`]). Identity comparison works across
//! reference kinds ([`same_entity`]), and the [`widget`] module shows the
//! one-directional layering rule that keeps callbacks from smuggling
//! reference cycles between entity kinds.
//!
//! ```
//! use owntree::{same_entity, SharedTree};
//!
//! let tree = SharedTree::new();
//! let root = tree.root().resolve().expect("root lives as long as the tree");
//! let child = root.create_child("child");
//! assert!(same_entity(&child.resolve().unwrap().tree(), &tree));
//!
//! // Keep the child alive past its removal from the tree.
//! let survivor = child.resolve().unwrap();
//! root.clear_children();
//!
//! assert_eq!(root.num_children(), 0);
//! assert!(survivor.parent().resolve().is_none());
//! assert!(survivor.tree().resolve().is_none());
//! assert_eq!(survivor.name(), "child"); // alive, but orphaned
//! ```

pub mod errors;
pub mod exclusive;
pub mod identity;
pub mod shared;
pub mod weak;
pub mod widget;

pub use errors::{TreeError, TreeResult};
pub use exclusive::{ExclusiveTree, NodeId};
pub use identity::{same_entity, Identify, ReferentId};
pub use shared::{SharedNode, SharedTree, TreeCore};
pub use weak::WeakRef;
pub use widget::{weak_callback, Action, Callback, Widget};
