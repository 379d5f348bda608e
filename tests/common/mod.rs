//! Shared fixtures: a recording graphics backend, a binary buffer builder
//! and small document helpers.

#![allow(dead_code)]

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use slotmap::SlotMap;

use gltf_scene::assets::accessor::Accessor;
use gltf_scene::render::{DrawableHandle, GraphicsBackend, TextureHandle, TextureOptions};
use gltf_scene::scene::{AttributeKey, Topology};
use gltf_scene::{AssetError, ImageHandle, Matrix4, Result};

pub const EPSILON: f32 = 1e-5;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Mock backend
// ============================================================================

#[derive(Debug, Clone)]
pub struct MeshRecord {
    pub topology: Topology,
    pub indices: Option<Vec<u32>>,
    pub attributes: Vec<(String, Vec<f32>)>,
}

impl MeshRecord {
    pub fn attribute(&self, shader_name: &str) -> Option<&[f32]> {
        self.attributes
            .iter()
            .find(|(name, _)| name == shader_name)
            .map(|(_, values)| values.as_slice())
    }
}

/// Records every call; handles are minted by slot maps.
#[derive(Debug, Default)]
pub struct MockBackend {
    pub meshes: SlotMap<DrawableHandle, MeshRecord>,
    pub textures: SlotMap<TextureHandle, (ImageHandle, TextureOptions)>,
    pub draws: Vec<DrawableHandle>,
    pub joint_uploads: Vec<(DrawableHandle, Vec<Matrix4>)>,
    /// Reject meshes built with this topology.
    pub reject_topology: Option<Topology>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphicsBackend for MockBackend {
    fn build_indexed_mesh(
        &mut self,
        topology: Topology,
        indices: Option<&Accessor>,
        attributes: &[(AttributeKey, &Accessor)],
    ) -> Result<DrawableHandle> {
        if self.reject_topology == Some(topology) {
            return Err(AssetError::Backend(format!("{topology:?} not supported")));
        }
        let indices = indices.map(Accessor::read_indices).transpose()?;
        let attributes = attributes
            .iter()
            .map(|(key, accessor)| (key.shader_name().to_string(), accessor.read_f32()))
            .collect();
        Ok(self.meshes.insert(MeshRecord {
            topology,
            indices,
            attributes,
        }))
    }

    fn build_image_texture(&mut self, image: ImageHandle, options: &TextureOptions) -> Result<TextureHandle> {
        Ok(self.textures.insert((image, *options)))
    }

    fn draw_mesh(&mut self, drawable: DrawableHandle) {
        self.draws.push(drawable);
    }

    fn set_joint_matrices(&mut self, drawable: DrawableHandle, matrices: &[Matrix4]) {
        self.joint_uploads.push((drawable, matrices.to_vec()));
    }
}

// ============================================================================
// Binary buffers
// ============================================================================

/// Little-endian byte buffer with 4-byte aligned sections.
#[derive(Debug, Default)]
pub struct BinBuilder {
    pub bytes: Vec<u8>,
}

impl BinBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn align(&mut self) -> usize {
        while self.bytes.len() % 4 != 0 {
            self.bytes.push(0);
        }
        self.bytes.len()
    }

    /// Appends floats and returns `(byte_offset, byte_length)`.
    pub fn push_f32(&mut self, values: &[f32]) -> (usize, usize) {
        let offset = self.align();
        for v in values {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
        (offset, self.bytes.len() - offset)
    }

    pub fn push_u16(&mut self, values: &[u16]) -> (usize, usize) {
        let offset = self.align();
        for v in values {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
        (offset, self.bytes.len() - offset)
    }

    pub fn push_u8(&mut self, values: &[u8]) -> (usize, usize) {
        let offset = self.align();
        self.bytes.extend_from_slice(values);
        (offset, self.bytes.len() - offset)
    }

    pub fn push_bytes(&mut self, values: &[u8]) -> (usize, usize) {
        self.push_u8(values)
    }

    pub fn data_uri(&self) -> String {
        data_uri("application/octet-stream", &self.bytes)
    }
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Encodes a solid-colour RGBA PNG.
pub fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut out = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("PNG encoding");
    out.into_inner()
}

pub fn mat_approx(a: &Matrix4, b: &Matrix4) -> bool {
    a.max_abs_diff(b) < 1e-4
}
