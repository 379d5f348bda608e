use crate::math::Matrix4;
use crate::scene::node::NodeIndex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    pub node: NodeIndex,
    /// Transforms mesh-space vertices into the joint's bind space.
    pub inverse_bind_matrix: Matrix4,
}

/// Ordered joint list. Joint `i` feeds palette slot `i` of every mesh
/// skinned by this skin.
#[derive(Debug, Clone, Default)]
pub struct Skin {
    pub name: Option<String>,
    pub joints: Vec<Joint>,
    pub skeleton: Option<NodeIndex>,
}

impl Skin {
    /// Writes `jointGlobal * inverseBind` for each joint, in joint order.
    ///
    /// `globals` is indexed by node; joints whose node has no global
    /// transform keep their previous palette entry.
    pub fn compute_joint_matrices(&self, globals: &[Matrix4], out: &mut Vec<Matrix4>) {
        out.resize(self.joints.len(), Matrix4::IDENTITY);
        for (slot, joint) in out.iter_mut().zip(&self.joints) {
            let Some(global) = globals.get(joint.node.index()) else {
                continue;
            };
            *slot = global.multiply(&joint.inverse_bind_matrix);
        }
    }
}
