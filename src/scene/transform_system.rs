//! 变换系统 (Transform System)
//!
//! 从一组根节点遍历场景图，把世界矩阵写入 [`Pose`]，
//! 然后向 [`GraphicsBackend`] 提交骨骼矩阵和绘制请求。
//!
//! 分两遍执行：
//! 1. [`update_hierarchy`]：每个可达节点计算 `global = parent_global * local`，
//!    深度优先，父节点先于子节点。结果是覆盖写入而不是累加，
//!    所以 local 不变时重复执行得到相同结果。
//! 2. [`submit`]：深度优先后序遍历（子节点先于父节点）。带皮肤的节点
//!    先用已完成的关节 global 计算骨骼矩阵并上传，再绘制网格。
//!
//! 两遍都使用显式栈。不检测 children 中的环，有环时不会终止。

use crate::math::Matrix4;
use crate::render::GraphicsBackend;
use crate::scene::node::NodeIndex;
use crate::scene::pose::Pose;
use crate::scene::scene::SceneGraph;

fn ensure_layout(graph: &SceneGraph, pose: &mut Pose) {
    if pose.locals.len() != graph.node_count() || pose.joint_matrices.len() != graph.skin_count() {
        log::debug!("Pose does not match the scene graph layout, resetting to rest pose");
        pose.reset(graph);
    }
}

/// Computes global transforms for every node reachable from `roots`,
/// seeding the roots with `root_transform`.
pub fn update_hierarchy(graph: &SceneGraph, pose: &mut Pose, roots: &[NodeIndex], root_transform: Matrix4) {
    ensure_layout(graph, pose);

    let mut stack: Vec<(NodeIndex, Matrix4)> = Vec::with_capacity(64);
    for &root in roots.iter().rev() {
        stack.push((root, root_transform));
    }

    while let Some((index, parent_global)) = stack.pop() {
        let Some(node) = graph.node(index) else {
            continue;
        };
        let local = pose.locals[index.index()].matrix();
        let global = parent_global.multiply(&local);
        pose.globals[index.index()] = global;

        for &child in node.children().iter().rev() {
            stack.push((child, global));
        }
    }
}

/// Nodes reachable from `roots`, children before their parent.
#[must_use]
pub fn post_order(graph: &SceneGraph, roots: &[NodeIndex]) -> Vec<NodeIndex> {
    let mut order = Vec::new();
    let mut stack: Vec<(NodeIndex, bool)> = roots.iter().rev().map(|&root| (root, false)).collect();

    while let Some((index, expanded)) = stack.pop() {
        let Some(node) = graph.node(index) else {
            continue;
        };
        if expanded {
            order.push(index);
            continue;
        }
        stack.push((index, true));
        for &child in node.children().iter().rev() {
            stack.push((child, false));
        }
    }
    order
}

/// Submits joint palettes and draw requests for every node reachable from
/// `roots`. Requires [`update_hierarchy`] to have run for the same roots.
pub fn submit<B: GraphicsBackend + ?Sized>(
    graph: &SceneGraph,
    pose: &mut Pose,
    roots: &[NodeIndex],
    backend: &mut B,
) {
    ensure_layout(graph, pose);

    for index in post_order(graph, roots) {
        let Some(node) = graph.node(index) else {
            continue;
        };

        let skin = node.skin.and_then(|index| graph.skin(index).map(|skin| (index, skin)));
        if let Some((skin_index, skin)) = skin {
            let mut palette = std::mem::take(&mut pose.joint_matrices[skin_index]);
            skin.compute_joint_matrices(&pose.globals, &mut palette);
            pose.joint_matrices[skin_index] = palette;
        }

        let Some(mesh) = node.mesh.and_then(|mesh| graph.mesh(mesh)) else {
            continue;
        };
        for primitive in &mesh.primitives {
            if let Some((skin_index, _)) = skin {
                backend.set_joint_matrices(primitive.drawable, &pose.joint_matrices[skin_index]);
            }
            backend.draw_mesh(primitive.drawable);
        }
    }
}

/// Evaluates and submits one scene: [`update_hierarchy`] then [`submit`].
pub fn render_roots<B: GraphicsBackend + ?Sized>(
    graph: &SceneGraph,
    pose: &mut Pose,
    roots: &[NodeIndex],
    root_transform: Matrix4,
    backend: &mut B,
) {
    update_hierarchy(graph, pose, roots, root_transform);
    submit(graph, pose, roots, backend);
}
