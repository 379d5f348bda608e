//! Graphics backend capability
//!
//! The pipeline hands decoded geometry, images, joint palettes and draw
//! requests to a [`GraphicsBackend`] and keeps only the opaque handles it
//! returns. Nothing here knows about a concrete graphics API.

use slotmap::new_key_type;

use crate::assets::accessor::Accessor;
use crate::assets::document::SamplerDesc;
use crate::assets::io::ImageHandle;
use crate::errors::Result;
use crate::math::Matrix4;
use crate::scene::mesh::{AttributeKey, Topology};

new_key_type! {
    /// Opaque handle to a drawable primitive created by the backend.
    pub struct DrawableHandle;
    /// Opaque handle to a texture created by the backend.
    pub struct TextureHandle;
}

/// Consumer of decoded geometry and per-frame draw requests.
pub trait GraphicsBackend {
    /// Creates a drawable from one primitive.
    ///
    /// `indices` is `None` for non-indexed primitives. Attributes are passed
    /// sorted by their document semantic name.
    fn build_indexed_mesh(
        &mut self,
        topology: Topology,
        indices: Option<&Accessor>,
        attributes: &[(AttributeKey, &Accessor)],
    ) -> Result<DrawableHandle>;

    fn build_image_texture(&mut self, image: ImageHandle, options: &TextureOptions) -> Result<TextureHandle>;

    fn draw_mesh(&mut self, drawable: DrawableHandle);

    /// Supplies the joint palette for the next draw of `drawable`, in skin
    /// joint order.
    fn set_joint_matrices(&mut self, drawable: DrawableHandle, matrices: &[Matrix4]);
}

// ============================================================================
// Texture sampling
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    ClampToEdge,
    MirroredRepeat,
    #[default]
    Repeat,
}

/// Filtering and wrapping of a texture, resolved from its sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureOptions {
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    /// Filter between mip levels; `None` if the sampler does not use mipmaps.
    pub mipmap_filter: Option<FilterMode>,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
}

impl TextureOptions {
    const NEAREST: u32 = 9728;
    const LINEAR: u32 = 9729;
    const NEAREST_MIPMAP_NEAREST: u32 = 9984;
    const LINEAR_MIPMAP_NEAREST: u32 = 9985;
    const NEAREST_MIPMAP_LINEAR: u32 = 9986;
    const LINEAR_MIPMAP_LINEAR: u32 = 9987;

    const CLAMP_TO_EDGE: u32 = 33071;
    const MIRRORED_REPEAT: u32 = 33648;

    /// Maps sampler enumerants to options. Unknown or absent values keep
    /// the defaults (linear filtering, repeat wrapping).
    #[must_use]
    pub fn from_sampler(sampler: &SamplerDesc) -> Self {
        let mag_filter = match sampler.mag_filter {
            Some(Self::NEAREST) => FilterMode::Nearest,
            _ => FilterMode::Linear,
        };
        let (min_filter, mipmap_filter) = match sampler.min_filter {
            Some(Self::NEAREST) => (FilterMode::Nearest, None),
            Some(Self::LINEAR) | None => (FilterMode::Linear, None),
            Some(Self::NEAREST_MIPMAP_NEAREST) => (FilterMode::Nearest, Some(FilterMode::Nearest)),
            Some(Self::LINEAR_MIPMAP_NEAREST) => (FilterMode::Linear, Some(FilterMode::Nearest)),
            Some(Self::NEAREST_MIPMAP_LINEAR) => (FilterMode::Nearest, Some(FilterMode::Linear)),
            Some(Self::LINEAR_MIPMAP_LINEAR) => (FilterMode::Linear, Some(FilterMode::Linear)),
            Some(other) => {
                log::warn!("Unknown minFilter {other}, using LINEAR");
                (FilterMode::Linear, None)
            }
        };

        Self {
            mag_filter,
            min_filter,
            mipmap_filter,
            wrap_s: Self::wrap(sampler.wrap_s),
            wrap_t: Self::wrap(sampler.wrap_t),
        }
    }

    fn wrap(mode: Option<u32>) -> WrapMode {
        match mode {
            Some(Self::CLAMP_TO_EDGE) => WrapMode::ClampToEdge,
            Some(Self::MIRRORED_REPEAT) => WrapMode::MirroredRepeat,
            _ => WrapMode::Repeat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampler_enumerants() {
        let sampler = SamplerDesc {
            mag_filter: Some(9728),
            min_filter: Some(9987),
            wrap_s: Some(33071),
            wrap_t: None,
        };
        let options = TextureOptions::from_sampler(&sampler);
        assert_eq!(options.mag_filter, FilterMode::Nearest);
        assert_eq!(options.min_filter, FilterMode::Linear);
        assert_eq!(options.mipmap_filter, Some(FilterMode::Linear));
        assert_eq!(options.wrap_s, WrapMode::ClampToEdge);
        assert_eq!(options.wrap_t, WrapMode::Repeat);
    }
}
