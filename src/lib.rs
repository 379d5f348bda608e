//! Scene interchange decoding and scene reconstruction.
//!
//! [`GltfLoader`] fetches a document through a [`ResourceFetcher`], decodes
//! its binary accessors, and builds a [`SceneGraph`] whose meshes and
//! textures are created by a [`GraphicsBackend`]. The resulting [`Asset`] is
//! animated and evaluated per frame:
//!
//! ```rust,ignore
//! let settings = LoaderSettings::default();
//! let mut asset = GltfLoader::load("models/Fox.gltf", &mut fetcher, &mut backend, &settings)?;
//! asset.animate(time)?;
//! asset.render(&mut backend)?;
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::float_cmp)]

pub mod animation;
pub mod assets;
pub mod errors;
pub mod math;
pub mod render;
pub mod scene;

pub use animation::{Animation, AnimationSystem, InterpolationMode, KeyframeTrack, TargetPath};
pub use assets::{
    Accessor, Asset, FileFetcher, GltfLoader, ImageHandle, LoaderSettings, MemoryFetcher, ResourceFetcher,
};
pub use errors::{AssetError, FetchError, LoadReport, Result, Stage};
pub use math::Matrix4;
pub use render::{DrawableHandle, GraphicsBackend, TextureHandle, TextureOptions};
pub use scene::{Camera, LocalTransform, Node, NodeIndex, Pose, SceneGraph};
