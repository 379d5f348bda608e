use std::fmt;

use crate::scene::transform::LocalTransform;

/// Index of a node in the [`SceneGraph`](crate::scene::SceneGraph) arena.
///
/// The arena owns every node; child lists, skin joints and animation
/// targets only hold indices, so a node listed by several parents is one
/// instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

impl NodeIndex {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

/// A scene graph vertex as described by the document.
///
/// Only rest-state data lives here. The per-frame local and global
/// transforms are kept in a [`Pose`](crate::scene::Pose).
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: Option<String>,
    /// Rest transform, as declared.
    pub transform: LocalTransform,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
    pub camera: Option<usize>,
    pub(crate) children: Vec<NodeIndex>,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Child indices in declaration order.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    #[inline]
    pub fn push_child(&mut self, child: NodeIndex) {
        self.children.push(child);
    }
}
