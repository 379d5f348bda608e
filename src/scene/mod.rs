//! Scene graph
//!
//! - Node: arena vertex with rest transform, mesh/skin/camera references and children
//! - LocalTransform: matrix or TRS local transform
//! - SceneGraph: arena owning nodes, meshes, skins, cameras and scenes
//! - SceneGraphBuilder: resolves document indices into a SceneGraph
//! - Pose: per-frame locals, globals and joint palettes
//! - TransformSystem: global transform evaluation and draw submission

pub mod builder;
pub mod camera;
pub mod mesh;
pub mod node;
pub mod pose;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod skin;
pub mod transform;
pub mod transform_system;

pub use builder::SceneGraphBuilder;
pub use camera::{Camera, OrthographicCamera, PerspectiveCamera, Projection};
pub use mesh::{AttributeKey, Mesh, Primitive, Topology};
pub use node::{Node, NodeIndex};
pub use pose::Pose;
pub use scene::{Scene, SceneGraph};
pub use skin::{Joint, Skin};
pub use transform::LocalTransform;
