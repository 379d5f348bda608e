use crate::scene::camera::Camera;
use crate::scene::mesh::Mesh;
use crate::scene::node::{Node, NodeIndex};
use crate::scene::skin::Skin;

/// Ordered list of root nodes.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub name: Option<String>,
    pub roots: Vec<NodeIndex>,
}

/// Arena owning every node, mesh, skin, camera and scene of an asset.
///
/// Entities are addressed by their document index. An entity that failed
/// to build is a hole (`None`) so the indices of its siblings stay valid;
/// the failure itself is listed in the load report.
///
/// The graph is the immutable rest-state description. Per-frame transforms
/// live in a [`Pose`](crate::scene::Pose).
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    pub(crate) nodes: Vec<Option<Node>>,
    pub(crate) meshes: Vec<Option<Mesh>>,
    pub(crate) skins: Vec<Option<Skin>>,
    pub(crate) cameras: Vec<Option<Camera>>,
    pub(crate) scenes: Vec<Option<Scene>>,
    pub(crate) default_scene: Option<usize>,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        self.nodes.push(Some(node));
        NodeIndex(self.nodes.len() - 1)
    }

    /// Appends `child` to `parent`'s child list. No-op if `parent` is a hole.
    ///
    /// A child may be attached to several parents; cycles are not checked.
    pub fn attach(&mut self, parent: NodeIndex, child: NodeIndex) {
        if let Some(Some(node)) = self.nodes.get_mut(parent.index()) {
            node.push_child(child);
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(Some(mesh));
        self.meshes.len() - 1
    }

    pub fn add_skin(&mut self, skin: Skin) -> usize {
        self.skins.push(Some(skin));
        self.skins.len() - 1
    }

    /// Adds a scene; the first scene added becomes the default.
    pub fn add_scene(&mut self, scene: Scene) -> usize {
        self.scenes.push(Some(scene));
        let index = self.scenes.len() - 1;
        self.default_scene.get_or_insert(index);
        index
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(index.index()).and_then(Option::as_mut)
    }

    /// Number of node slots, holes included.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.as_ref().map(|node| (NodeIndex(i), node)))
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index).and_then(Option::as_ref)
    }

    #[inline]
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    #[inline]
    #[must_use]
    pub fn skin(&self, index: usize) -> Option<&Skin> {
        self.skins.get(index).and_then(Option::as_ref)
    }

    #[inline]
    #[must_use]
    pub fn skin_count(&self) -> usize {
        self.skins.len()
    }

    #[inline]
    #[must_use]
    pub fn camera(&self, index: usize) -> Option<&Camera> {
        self.cameras.get(index).and_then(Option::as_ref)
    }

    #[inline]
    #[must_use]
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    #[inline]
    #[must_use]
    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index).and_then(Option::as_ref)
    }

    #[inline]
    #[must_use]
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    #[inline]
    #[must_use]
    pub fn default_scene_index(&self) -> Option<usize> {
        self.default_scene
    }

    #[must_use]
    pub fn default_scene(&self) -> Option<&Scene> {
        self.default_scene.and_then(|index| self.scene(index))
    }

    /// First node carrying `name`.
    #[must_use]
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeIndex> {
        self.nodes()
            .find(|(_, node)| node.name.as_deref() == Some(name))
            .map(|(index, _)| index)
    }
}
