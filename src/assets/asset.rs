use crate::animation::{Animation, AnimationSystem};
use crate::assets::accessor::AccessorTable;
use crate::assets::io::ImageHandle;
use crate::errors::{AssetError, LoadReport, Result};
use crate::math::Matrix4;
use crate::render::{GraphicsBackend, TextureHandle};
use crate::scene::transform_system;
use crate::scene::{Camera, Pose, SceneGraph};

/// A loaded document: scene graph, per-frame pose, decoded accessors,
/// animations, backend handles and the report of entities that failed.
///
/// Per frame, call [`Asset::animate`] and then [`Asset::render`].
#[derive(Debug)]
pub struct Asset {
    pub graph: SceneGraph,
    pub pose: Pose,
    pub accessors: AccessorTable,
    /// Indexed like the document's animations; failed ones are `None`.
    pub animations: Vec<Option<Animation>>,
    pub images: Vec<Option<ImageHandle>>,
    pub textures: Vec<Option<TextureHandle>>,
    pub(crate) fallback_camera: Camera,
    pub report: LoadReport,
}

impl Asset {
    #[inline]
    #[must_use]
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    #[must_use]
    pub fn animation(&self, index: usize) -> Option<&Animation> {
        self.animations.get(index).and_then(Option::as_ref)
    }

    /// Longest animation duration, `0.0` without animations.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.animations
            .iter()
            .flatten()
            .map(Animation::duration)
            .fold(0.0_f32, f32::max)
    }

    /// Samples every animation at `time` into the pose.
    pub fn animate(&mut self, time: f32) -> Result<()> {
        AnimationSystem::update(self.animations.iter_mut().flatten(), time, &mut self.pose)
    }

    /// Restores the rest pose.
    pub fn reset_pose(&mut self) {
        self.pose.reset(&self.graph);
    }

    /// Evaluates the default scene from identity and submits skins and draws.
    ///
    /// A document without scenes renders nothing.
    pub fn render<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B) -> Result<()> {
        match self.graph.default_scene_index() {
            Some(index) => self.render_scene(index, Matrix4::IDENTITY, backend),
            None => {
                log::debug!("No default scene, nothing to render");
                Ok(())
            }
        }
    }

    /// Evaluates scene `index` seeded with `root_transform` and submits
    /// skins and draws.
    pub fn render_scene<B: GraphicsBackend + ?Sized>(
        &mut self,
        index: usize,
        root_transform: Matrix4,
        backend: &mut B,
    ) -> Result<()> {
        let scene = self
            .graph
            .scene(index)
            .ok_or_else(|| AssetError::malformed(format!("scene {index} is not available")))?;
        transform_system::render_roots(&self.graph, &mut self.pose, &scene.roots, root_transform, backend);
        Ok(())
    }

    /// The document's first camera, or a perspective camera built from the
    /// loader's defaults.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        (0..self.graph.camera_count())
            .find_map(|index| self.graph.camera(index))
            .unwrap_or(&self.fallback_camera)
    }
}
