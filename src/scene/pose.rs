use glam::{Quat, Vec3};

use crate::math::Matrix4;
use crate::scene::node::NodeIndex;
use crate::scene::scene::SceneGraph;
use crate::scene::transform::LocalTransform;

/// Mutable per-frame state layered over a [`SceneGraph`].
///
/// The animation system writes local transforms; the transform system
/// reads them and writes global transforms and joint palettes. The two run
/// in sequence, never interleaved.
#[derive(Debug, Clone, Default)]
pub struct Pose {
    pub(crate) locals: Vec<LocalTransform>,
    pub(crate) globals: Vec<Matrix4>,
    pub(crate) joint_matrices: Vec<Vec<Matrix4>>,
}

impl Pose {
    /// The rest pose of `graph`, with identity global transforms.
    #[must_use]
    pub fn rest(graph: &SceneGraph) -> Self {
        let mut pose = Self::default();
        pose.reset(graph);
        pose
    }

    /// Restores every local transform to the graph's rest state.
    pub fn reset(&mut self, graph: &SceneGraph) {
        self.locals.clear();
        self.locals.extend(
            graph
                .nodes
                .iter()
                .map(|node| node.as_ref().map(|n| n.transform).unwrap_or_default()),
        );
        self.globals.clear();
        self.globals.resize(graph.node_count(), Matrix4::IDENTITY);
        self.joint_matrices.clear();
        self.joint_matrices.resize(graph.skin_count(), Vec::new());
    }

    #[inline]
    #[must_use]
    pub fn local(&self, node: NodeIndex) -> Option<&LocalTransform> {
        self.locals.get(node.index())
    }

    #[inline]
    pub fn local_mut(&mut self, node: NodeIndex) -> Option<&mut LocalTransform> {
        self.locals.get_mut(node.index())
    }

    /// Global transform written by the last evaluation pass.
    #[inline]
    #[must_use]
    pub fn global(&self, node: NodeIndex) -> Option<&Matrix4> {
        self.globals.get(node.index())
    }

    #[inline]
    #[must_use]
    pub fn globals(&self) -> &[Matrix4] {
        &self.globals
    }

    /// Joint palette of `skin` from the last evaluation pass.
    #[inline]
    #[must_use]
    pub fn joint_matrices(&self, skin: usize) -> Option<&[Matrix4]> {
        self.joint_matrices.get(skin).map(Vec::as_slice)
    }

    // Convenience writers. They return `false` for an unknown node or a
    // matrix-driven node.

    pub fn set_translation(&mut self, node: NodeIndex, value: Vec3) -> bool {
        self.local_mut(node).is_some_and(|local| local.set_translation(value))
    }

    pub fn set_rotation(&mut self, node: NodeIndex, value: Quat) -> bool {
        self.local_mut(node).is_some_and(|local| local.set_rotation(value))
    }

    pub fn set_scale(&mut self, node: NodeIndex, value: Vec3) -> bool {
        self.local_mut(node).is_some_and(|local| local.set_scale(value))
    }
}
