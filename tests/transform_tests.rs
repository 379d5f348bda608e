//! Transform System Tests
//!
//! Tests for:
//! - LocalTransform matrix/TRS handling
//! - Global transform propagation from a seeded root transform
//! - Idempotent re-evaluation
//! - Skin joint palettes and their upload before the draw
//! - Post-order draw submission (children before parents)
//! - End-to-end: document → loader → pose → backend

mod common;

use glam::{Quat, Vec3};
use serde_json::{Value, json};

use common::{BinBuilder, MockBackend, init_logger, mat_approx};
use gltf_scene::scene::transform_system::{post_order, render_roots, update_hierarchy};
use gltf_scene::scene::{LocalTransform, Node, NodeIndex, Pose, SceneGraph};
use gltf_scene::{Asset, GltfLoader, LoaderSettings, Matrix4, MemoryFetcher};

fn load(doc: &Value, backend: &mut MockBackend) -> Asset {
    init_logger();
    let bytes = serde_json::to_vec(doc).unwrap();
    let mut fetcher = MemoryFetcher::new();
    let settings = LoaderSettings::default();
    GltfLoader::load_slice(&bytes, "", &mut fetcher, backend, &settings).unwrap()
}

fn translated(x: f32, y: f32, z: f32) -> Node {
    let mut node = Node::new();
    node.transform = LocalTransform::from_translation(Vec3::new(x, y, z));
    node
}

/// Root (mesh 1) with a joint child and a skinned mesh child (mesh 0).
/// The joint is animated from y=2 to y=4 over one second.
fn skinned_document() -> Value {
    let mut bin = BinBuilder::new();
    let (positions_offset, positions_length) = bin.push_f32(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    let (indices_offset, indices_length) = bin.push_u16(&[0, 1, 2]);
    let inverse_bind = Matrix4::from_translation(Vec3::new(0.0, -2.0, 0.0));
    let (ibm_offset, ibm_length) = bin.push_f32(&inverse_bind.0);
    let (times_offset, times_length) = bin.push_f32(&[0.0, 1.0]);
    let (values_offset, values_length) = bin.push_f32(&[0.0, 2.0, 0.0, 0.0, 4.0, 0.0]);

    json!({
        "asset": {"version": "2.0"},
        "buffers": [{"uri": bin.data_uri(), "byteLength": bin.bytes.len()}],
        "bufferViews": [
            {"buffer": 0, "byteOffset": positions_offset, "byteLength": positions_length},
            {"buffer": 0, "byteOffset": indices_offset, "byteLength": indices_length},
            {"buffer": 0, "byteOffset": ibm_offset, "byteLength": ibm_length},
            {"buffer": 0, "byteOffset": times_offset, "byteLength": times_length},
            {"buffer": 0, "byteOffset": values_offset, "byteLength": values_length}
        ],
        "accessors": [
            {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"},
            {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"},
            {"bufferView": 2, "componentType": 5126, "count": 1, "type": "MAT4"},
            {"bufferView": 3, "componentType": 5126, "count": 2, "type": "SCALAR"},
            {"bufferView": 4, "componentType": 5126, "count": 2, "type": "VEC3"}
        ],
        "meshes": [
            {"name": "body", "primitives": [{"attributes": {"POSITION": 0}, "indices": 1}]},
            {"name": "base", "primitives": [{"attributes": {"POSITION": 0}}]}
        ],
        "skins": [{"joints": [1], "inverseBindMatrices": 2}],
        "nodes": [
            {"name": "root", "mesh": 1, "children": [1, 2]},
            {"name": "joint", "translation": [0.0, 2.0, 0.0]},
            {"name": "skinned", "mesh": 0, "skin": 0}
        ],
        "animations": [{
            "samplers": [{"input": 3, "output": 4}],
            "channels": [{"sampler": 0, "target": {"node": 1, "path": "translation"}}]
        }],
        "scenes": [{"nodes": [0]}],
        "scene": 0
    })
}

// ============================================================================
// LocalTransform
// ============================================================================

#[test]
fn trs_matrix_is_translation_rotation_scale() {
    let local = LocalTransform::Trs {
        translation: Vec3::new(1.0, 2.0, 3.0),
        rotation: Quat::from_rotation_y(0.5),
        scale: Vec3::splat(2.0),
    };
    let expected = Matrix4::from_trs(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.5), Vec3::splat(2.0));
    assert_eq!(local.matrix(), expected);
}

#[test]
fn matrix_transform_rejects_component_writes() {
    let mut local = LocalTransform::Matrix(Matrix4::from_scale(Vec3::splat(3.0)));
    assert!(local.is_matrix());
    assert!(!local.set_translation(Vec3::ONE));
    assert!(!local.set_rotation(Quat::from_rotation_x(1.0)));
    assert!(!local.set_scale(Vec3::ONE));
    assert_eq!(local.matrix(), Matrix4::from_scale(Vec3::splat(3.0)));

    let mut trs = LocalTransform::default();
    assert!(trs.set_translation(Vec3::X));
    assert_eq!(trs.matrix(), Matrix4::from_translation(Vec3::X));
}

// ============================================================================
// Hierarchy propagation
// ============================================================================

#[test]
fn globals_compose_down_the_hierarchy() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(translated(1.0, 0.0, 0.0));
    let child = graph.add_node(translated(0.0, 1.0, 0.0));
    let grandchild = graph.add_node(translated(0.0, 0.0, 1.0));
    graph.attach(root, child);
    graph.attach(child, grandchild);

    let mut pose = Pose::rest(&graph);
    update_hierarchy(&graph, &mut pose, &[root], Matrix4::IDENTITY);

    let expected = Matrix4::from_translation(Vec3::new(1.0, 1.0, 1.0));
    assert!(mat_approx(pose.global(grandchild).unwrap(), &expected));
}

#[test]
fn root_transform_seeds_the_roots() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(translated(1.0, 0.0, 0.0));
    let child = graph.add_node(translated(0.0, 1.0, 0.0));
    graph.attach(root, child);

    let mut pose = Pose::rest(&graph);
    let seed = Matrix4::from_scale(Vec3::splat(2.0));
    update_hierarchy(&graph, &mut pose, &[root], seed);

    assert!(mat_approx(
        pose.global(child).unwrap(),
        &Matrix4::from_translation(Vec3::new(2.0, 2.0, 0.0)).multiply(&seed)
    ));
}

#[test]
fn re_evaluation_is_idempotent() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(translated(0.5, 0.0, 0.0));
    let child = graph.add_node(translated(0.0, 0.25, 0.0));
    graph.attach(root, child);

    let mut pose = Pose::rest(&graph);
    pose.set_rotation(root, Quat::from_rotation_z(0.3));
    update_hierarchy(&graph, &mut pose, &[root], Matrix4::IDENTITY);
    let first = pose.globals().to_vec();
    update_hierarchy(&graph, &mut pose, &[root], Matrix4::IDENTITY);
    assert_eq!(pose.globals(), first.as_slice());
}

#[test]
fn post_order_visits_children_first() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(Node::new());
    let a = graph.add_node(Node::new());
    let b = graph.add_node(Node::new());
    let leaf = graph.add_node(Node::new());
    graph.attach(root, a);
    graph.attach(root, b);
    graph.attach(a, leaf);

    assert_eq!(post_order(&graph, &[root]), vec![leaf, a, b, root]);
}

#[test]
fn pose_from_other_graph_is_reset() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(translated(3.0, 0.0, 0.0));

    let mut pose = Pose::default();
    let mut backend = MockBackend::new();
    render_roots(&graph, &mut pose, &[root], Matrix4::IDENTITY, &mut backend);
    assert!(mat_approx(
        pose.global(root).unwrap(),
        &Matrix4::from_translation(Vec3::new(3.0, 0.0, 0.0))
    ));
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn translated_node_end_to_end() {
    let mut positions = BinBuilder::new();
    positions.push_f32(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    let mut indices = BinBuilder::new();
    indices.push_u16(&[0, 1, 2]);

    let doc = json!({
        "buffers": [
            {"uri": positions.data_uri(), "byteLength": positions.bytes.len()},
            {"uri": indices.data_uri(), "byteLength": indices.bytes.len()}
        ],
        "bufferViews": [
            {"buffer": 0, "byteLength": 36},
            {"buffer": 1, "byteLength": 6}
        ],
        "accessors": [
            {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"},
            {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
        ],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "indices": 1}]}],
        "nodes": [{"mesh": 0, "translation": [1.0, 0.0, 0.0]}],
        "scenes": [{"nodes": [0]}]
    });

    let mut backend = MockBackend::new();
    let mut asset = load(&doc, &mut backend);
    assert!(asset.report().is_empty());

    asset.render(&mut backend).unwrap();
    assert!(mat_approx(
        asset.pose.global(NodeIndex(0)).unwrap(),
        &Matrix4::from_translation(Vec3::new(1.0, 0.0, 0.0))
    ));

    assert_eq!(backend.draws.len(), 1);
    let record = &backend.meshes[backend.draws[0]];
    assert_eq!(record.indices.as_deref(), Some(&[0, 1, 2][..]));
    assert_eq!(record.attribute("a_position").unwrap().len(), 9);
}

#[test]
fn skin_palette_is_uploaded_before_draw() {
    let mut backend = MockBackend::new();
    let mut asset = load(&skinned_document(), &mut backend);
    assert!(asset.report().is_empty(), "{}", asset.report());

    asset.render(&mut backend).unwrap();

    // Joint at its bind pose: global * inverse bind is identity.
    let palette = asset.pose.joint_matrices(0).unwrap();
    assert_eq!(palette.len(), 1);
    assert!(mat_approx(&palette[0], &Matrix4::IDENTITY));

    let skinned = asset.graph.mesh(0).unwrap().primitives[0].drawable;
    let base = asset.graph.mesh(1).unwrap().primitives[0].drawable;

    // Skinned child first, its palette uploaded once, then the root.
    assert_eq!(backend.draws, vec![skinned, base]);
    assert_eq!(backend.joint_uploads.len(), 1);
    assert_eq!(backend.joint_uploads[0].0, skinned);
}

#[test]
fn animated_joint_moves_palette() {
    let mut backend = MockBackend::new();
    let mut asset = load(&skinned_document(), &mut backend);
    assert_eq!(asset.duration(), 1.0);

    asset.animate(0.5).unwrap();
    asset.render(&mut backend).unwrap();

    let joint = asset.graph.find_node_by_name("joint").unwrap();
    assert!(mat_approx(
        asset.pose.global(joint).unwrap(),
        &Matrix4::from_translation(Vec3::new(0.0, 3.0, 0.0))
    ));
    let palette = asset.pose.joint_matrices(0).unwrap();
    assert!(mat_approx(
        &palette[0],
        &Matrix4::from_translation(Vec3::new(0.0, 1.0, 0.0))
    ));
    let uploaded = &backend.joint_uploads.last().unwrap().1;
    assert!(mat_approx(&uploaded[0], &palette[0]));

    asset.reset_pose();
    asset.render(&mut backend).unwrap();
    assert!(mat_approx(
        &asset.pose.joint_matrices(0).unwrap()[0],
        &Matrix4::IDENTITY
    ));
}

#[test]
fn render_scene_applies_root_transform() {
    let mut backend = MockBackend::new();
    let mut asset = load(&skinned_document(), &mut backend);

    let seed = Matrix4::from_translation(Vec3::new(10.0, 0.0, 0.0));
    asset.render_scene(0, seed, &mut backend).unwrap();

    let joint = asset.graph.find_node_by_name("joint").unwrap();
    assert!(mat_approx(
        asset.pose.global(joint).unwrap(),
        &Matrix4::from_translation(Vec3::new(10.0, 2.0, 0.0))
    ));
    assert!(asset.render_scene(5, Matrix4::IDENTITY, &mut backend).is_err());
}
