//! 场景图构建 (Scene Graph Builder)
//!
//! 把 [`Document`] 中的下标引用解析为 [`SceneGraph`]。
//!
//! 节点分两步构建：
//! 1. 先为每个节点分配空占位，任何节点下标都可以作为引用目标；
//! 2. 再按描述填充节点，children 可以引用前面或后面的节点。
//!
//! Every entity is built independently. A failure is recorded in the
//! [`LoadReport`] under its stage and index and leaves a hole; siblings
//! continue.

use crate::assets::accessor::{AccessorShape, AccessorTable, ComponentKind};
use crate::assets::document::{Document, MeshDesc, NodeDesc, PrimitiveDesc, SceneDesc, SkinDesc};
use crate::assets::settings::LoaderSettings;
use crate::errors::{AssetError, LoadReport, Result, Stage};
use crate::math::Matrix4;
use crate::render::GraphicsBackend;
use crate::scene::camera::Camera;
use crate::scene::mesh::{AttributeKey, Mesh, Primitive, Topology};
use crate::scene::node::{Node, NodeIndex};
use crate::scene::scene::{Scene, SceneGraph};
use crate::scene::skin::{Joint, Skin};
use crate::scene::transform::LocalTransform;

pub struct SceneGraphBuilder<'a> {
    document: &'a Document,
    accessors: &'a AccessorTable,
    settings: &'a LoaderSettings,
}

impl<'a> SceneGraphBuilder<'a> {
    #[must_use]
    pub fn new(document: &'a Document, accessors: &'a AccessorTable, settings: &'a LoaderSettings) -> Self {
        Self {
            document,
            accessors,
            settings,
        }
    }

    /// Builds every mesh, skin, camera, node and scene of the document.
    pub fn build<B: GraphicsBackend + ?Sized>(&self, backend: &mut B, report: &mut LoadReport) -> SceneGraph {
        let document = self.document;
        let mut graph = SceneGraph::new();

        // 先创建占位节点，之后任何节点下标都是有效引用
        graph.nodes = vec![Some(Node::new()); document.nodes.len()];

        graph.meshes = collect(report, Stage::Mesh, &document.meshes, |desc| {
            self.build_mesh(desc, backend)
        });
        graph.skins = collect(report, Stage::Skin, &document.skins, |desc| self.build_skin(desc));
        graph.cameras = collect(report, Stage::Camera, &document.cameras, |desc| {
            Camera::from_desc(desc, self.settings)
        });

        for (index, desc) in document.nodes.iter().enumerate() {
            match self.populate_node(desc) {
                Ok(node) => graph.nodes[index] = Some(node),
                Err(err) => {
                    graph.nodes[index] = None;
                    report.record(Stage::Node, index, err);
                }
            }
        }

        graph.scenes = collect(report, Stage::Scene, &document.scenes, |desc| self.build_scene(desc));
        graph.default_scene = document.default_scene_index();
        if let Some(index) = graph.default_scene
            && index >= graph.scenes.len()
        {
            report.record(
                Stage::Scene,
                index,
                AssetError::malformed(format!(
                    "default scene {index} out of range ({} scenes)",
                    graph.scenes.len()
                )),
            );
            graph.default_scene = None;
        }

        log::debug!(
            "Built scene graph: {} nodes, {} meshes, {} skins, {} scenes",
            graph.node_count(),
            graph.mesh_count(),
            graph.skin_count(),
            graph.scene_count()
        );
        graph
    }

    // ========================================================================
    // Meshes
    // ========================================================================

    fn build_mesh<B: GraphicsBackend + ?Sized>(&self, desc: &MeshDesc, backend: &mut B) -> Result<Mesh> {
        let primitives = desc
            .primitives
            .iter()
            .map(|primitive| self.build_primitive(primitive, backend))
            .collect::<Result<Vec<_>>>()?;

        Ok(Mesh {
            name: desc.name.clone(),
            primitives,
        })
    }

    fn build_primitive<B: GraphicsBackend + ?Sized>(
        &self,
        desc: &PrimitiveDesc,
        backend: &mut B,
    ) -> Result<Primitive> {
        let topology = desc.mode.map_or(Ok(Topology::default()), Topology::try_from)?;

        let index_accessor = match desc.indices {
            Some(index) => {
                let accessor = self.accessors.get(index)?;
                let integral = matches!(
                    accessor.component_kind,
                    ComponentKind::U8 | ComponentKind::U16 | ComponentKind::U32
                );
                if accessor.shape != AccessorShape::Scalar || !integral {
                    return Err(AssetError::malformed(format!(
                        "index accessor {index} is not an unsigned scalar"
                    )));
                }
                Some(accessor)
            }
            None => None,
        };

        let mut attributes = Vec::with_capacity(desc.attributes.len());
        let mut bound = Vec::with_capacity(desc.attributes.len());
        for (semantic, &accessor_index) in &desc.attributes {
            let key = AttributeKey::from_semantic(semantic);
            bound.push((key.clone(), self.accessors.get(accessor_index)?));
            attributes.push((key, accessor_index));
        }

        let drawable = backend.build_indexed_mesh(topology, index_accessor, &bound)?;

        Ok(Primitive {
            topology,
            indices: desc.indices,
            attributes,
            material: desc.material,
            drawable,
        })
    }

    // ========================================================================
    // Skins
    // ========================================================================

    fn build_skin(&self, desc: &SkinDesc) -> Result<Skin> {
        let node_count = self.document.nodes.len();
        let inverse_bind_matrices = match desc.inverse_bind_matrices {
            Some(index) => {
                let floats = self.accessors.get(index)?.read_f32();
                let needed = desc.joints.len() * 16;
                if floats.len() < needed {
                    return Err(AssetError::malformed(format!(
                        "inverse bind accessor {index} has {} floats, {} joints need {needed}",
                        floats.len(),
                        desc.joints.len()
                    )));
                }
                floats
                    .chunks_exact(16)
                    .filter_map(Matrix4::from_slice)
                    .collect()
            }
            None => vec![Matrix4::IDENTITY; desc.joints.len()],
        };

        let joints = desc
            .joints
            .iter()
            .zip(inverse_bind_matrices)
            .map(|(&node, inverse_bind_matrix)| {
                Ok(Joint {
                    node: node_ref(node, node_count)?,
                    inverse_bind_matrix,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let skeleton = desc
            .skeleton
            .map(|node| node_ref(node, node_count))
            .transpose()?;

        Ok(Skin {
            name: desc.name.clone(),
            joints,
            skeleton,
        })
    }

    // ========================================================================
    // Nodes & scenes
    // ========================================================================

    fn populate_node(&self, desc: &NodeDesc) -> Result<Node> {
        let document = self.document;
        let node_count = document.nodes.len();

        let transform = LocalTransform::from_desc(desc)?;
        let mesh = checked(desc.mesh, document.meshes.len(), "mesh")?;
        let skin = checked(desc.skin, document.skins.len(), "skin")?;
        let camera = checked(desc.camera, document.cameras.len(), "camera")?;
        if skin.is_some() && mesh.is_none() {
            log::warn!("Node {:?} has a skin but no mesh", desc.name);
        }

        let children = desc
            .children
            .iter()
            .map(|&child| node_ref(child, node_count))
            .collect::<Result<Vec<_>>>()?;

        Ok(Node {
            name: desc.name.clone(),
            transform,
            mesh,
            skin,
            camera,
            children,
        })
    }

    fn build_scene(&self, desc: &SceneDesc) -> Result<Scene> {
        let node_count = self.document.nodes.len();
        let roots = desc
            .nodes
            .iter()
            .map(|&node| node_ref(node, node_count))
            .collect::<Result<Vec<_>>>()?;

        Ok(Scene {
            name: desc.name.clone(),
            roots,
        })
    }
}

/// Builds each entity, recording failures and leaving holes in their place.
fn collect<D, T>(
    report: &mut LoadReport,
    stage: Stage,
    descs: &[D],
    mut build: impl FnMut(&D) -> Result<T>,
) -> Vec<Option<T>> {
    descs
        .iter()
        .enumerate()
        .map(|(index, desc)| match build(desc) {
            Ok(entity) => Some(entity),
            Err(err) => {
                report.record(stage, index, err);
                None
            }
        })
        .collect()
}

fn node_ref(index: usize, node_count: usize) -> Result<NodeIndex> {
    if index < node_count {
        Ok(NodeIndex(index))
    } else {
        Err(AssetError::malformed(format!(
            "node {index} out of range ({node_count} nodes)"
        )))
    }
}

fn checked(index: Option<usize>, count: usize, what: &str) -> Result<Option<usize>> {
    match index {
        Some(index) if index >= count => Err(AssetError::malformed(format!(
            "{what} {index} out of range ({count} available)"
        ))),
        other => Ok(other),
    }
}
