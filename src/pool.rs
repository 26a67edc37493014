//! Shared-object arena.
//!
//! Event files alias aggressively: one model tree is referenced by several
//! scenes, one animation drives several entries, and the writer must emit
//! each shared object exactly once.  Instead of `Rc` webs, every shareable
//! object lives in an append-only arena owned by the event, and the rest of
//! the crate passes small `Copy` handles around.  Two handles compare equal
//! exactly when they name the same object, which is the identity the
//! deduplicating writer keys on.
//!
//! Handles are only minted by the arena that owns the object and arenas
//! never remove entries, so a handle can not dangle within its pool.

use crate::model::{Attach, Node};
use crate::motion::{Camera, Motion};

macro_rules! handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

handle!(
    /// A model tree node in the pool.
    NodeHandle
);
handle!(
    /// Geometry attached to a node.
    AttachHandle
);
handle!(
    /// A node or shape animation.
    MotionHandle
);
handle!(
    /// Camera data paired with a camera animation.
    CameraHandle
);

/// Append-only storage for one object kind.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: Vec<T>,
}

// manual impl, the derive would demand T: Default
impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Arena<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, item: T) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }
}

/// All shareable objects of one event.
#[derive(Debug, Clone, Default)]
pub struct EventPool {
    nodes: Arena<Node>,
    attaches: Arena<Attach>,
    motions: Arena<Motion>,
    cameras: Arena<Camera>,
}

impl EventPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        NodeHandle::new(self.nodes.push(node))
    }

    pub fn add_attach(&mut self, attach: Attach) -> AttachHandle {
        AttachHandle::new(self.attaches.push(attach))
    }

    pub fn add_motion(&mut self, motion: Motion) -> MotionHandle {
        MotionHandle::new(self.motions.push(motion))
    }

    pub fn add_camera(&mut self, camera: Camera) -> CameraHandle {
        CameraHandle::new(self.cameras.push(camera))
    }

    pub fn node(&self, handle: NodeHandle) -> &Node {
        &self.nodes.items[handle.index()]
    }

    pub fn attach(&self, handle: AttachHandle) -> &Attach {
        &self.attaches.items[handle.index()]
    }

    pub fn motion(&self, handle: MotionHandle) -> &Motion {
        &self.motions.items[handle.index()]
    }

    pub fn camera(&self, handle: CameraHandle) -> &Camera {
        &self.cameras.items[handle.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn motion_count(&self) -> usize {
        self.motions.len()
    }

    /// Number of nodes in the tree rooted at `handle`, counting the root,
    /// its children and all siblings of children but not siblings of the
    /// root itself.
    pub fn tree_node_count(&self, handle: NodeHandle) -> usize {
        let node = self.node(handle);
        let mut count = 1;
        let mut child = node.child;
        while let Some(c) = child {
            count += self.tree_node_count(c);
            child = self.node(c).sibling;
        }
        count
    }
}
