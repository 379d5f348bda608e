//! Document schema
//!
//! The JSON scene description, deserialized as-is. Every cross reference is a
//! plain index into one of the top-level arrays; nothing here is resolved or
//! validated beyond what `serde` enforces. Resolution happens in the buffer
//! view / accessor decoders and in the scene graph builder.
//!
//! Binary `.glb` containers are unpacked by [`parse_container`], which returns
//! the document together with the embedded binary chunk.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::errors::{AssetError, Result};

// ============================================================================
// Root
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Default scene index (if present).
    pub scene: Option<usize>,
    #[serde(default)]
    pub scenes: Vec<SceneDesc>,
    #[serde(default)]
    pub nodes: Vec<NodeDesc>,
    #[serde(default)]
    pub meshes: Vec<MeshDesc>,
    #[serde(default)]
    pub accessors: Vec<AccessorDesc>,
    #[serde(default)]
    pub buffer_views: Vec<BufferViewDesc>,
    #[serde(default)]
    pub buffers: Vec<BufferDesc>,
    #[serde(default)]
    pub skins: Vec<SkinDesc>,
    #[serde(default)]
    pub animations: Vec<AnimationDesc>,
    #[serde(default)]
    pub images: Vec<ImageDesc>,
    #[serde(default)]
    pub textures: Vec<TextureDesc>,
    #[serde(default)]
    pub samplers: Vec<SamplerDesc>,
    #[serde(default)]
    pub cameras: Vec<CameraDesc>,
    #[serde(default)]
    pub extensions_used: Vec<String>,
    #[serde(default)]
    pub extensions_required: Vec<String>,
}

impl Document {
    pub fn from_slice(json: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Index of the scene to show: the declared default, else the first one.
    #[must_use]
    pub fn default_scene_index(&self) -> Option<usize> {
        match self.scene {
            Some(index) => Some(index),
            None if !self.scenes.is_empty() => Some(0),
            None => None,
        }
    }
}

// ============================================================================
// Binary data
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferDesc {
    pub name: Option<String>,
    /// Relative path or `data:` URI. Absent for the GLB binary chunk.
    pub uri: Option<String>,
    pub byte_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferViewDesc {
    pub buffer: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub byte_length: usize,
    /// Byte distance between consecutive elements; absent means tightly packed.
    pub byte_stride: Option<usize>,
    pub target: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessorDesc {
    pub buffer_view: Option<usize>,
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: u32,
    #[serde(default)]
    pub normalized: bool,
    pub count: usize,
    /// Shape tag: `SCALAR`, `VEC2`, `VEC3`, `VEC4`, `MAT2`, `MAT3`, `MAT4`.
    #[serde(rename = "type")]
    pub shape: String,
    pub sparse: Option<SparseDesc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseDesc {
    /// Number of overridden elements; independent of the accessor count.
    pub count: usize,
    pub indices: SparseIndicesDesc,
    pub values: SparseValuesDesc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseIndicesDesc {
    pub buffer_view: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseValuesDesc {
    pub buffer_view: usize,
    #[serde(default)]
    pub byte_offset: usize,
}

// ============================================================================
// Geometry
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshDesc {
    pub name: Option<String>,
    pub primitives: Vec<PrimitiveDesc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveDesc {
    /// Semantic name (`POSITION`, `NORMAL`, ...) to accessor index.
    #[serde(default)]
    pub attributes: BTreeMap<String, usize>,
    pub indices: Option<usize>,
    pub mode: Option<u32>,
    pub material: Option<usize>,
}

// ============================================================================
// Hierarchy
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDesc {
    pub name: Option<String>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
    pub camera: Option<usize>,
    /// Child node indices.
    #[serde(default)]
    pub children: Vec<usize>,
    /// 4x4 transformation matrix (column-major).
    pub matrix: Option<[f32; 16]>,
    /// Translation (T in TRS).
    pub translation: Option<[f32; 3]>,
    /// Rotation quaternion [x, y, z, w] (R in TRS).
    pub rotation: Option<[f32; 4]>,
    /// Scale (S in TRS).
    pub scale: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinDesc {
    pub name: Option<String>,
    pub inverse_bind_matrices: Option<usize>,
    pub joints: Vec<usize>,
    pub skeleton: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDesc {
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<usize>,
}

// ============================================================================
// Animation
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDesc {
    pub name: Option<String>,
    pub channels: Vec<ChannelDesc>,
    pub samplers: Vec<AnimationSamplerDesc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDesc {
    pub sampler: usize,
    pub target: ChannelTargetDesc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTargetDesc {
    pub node: Option<usize>,
    /// `translation`, `rotation`, `scale` or `weights`.
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSamplerDesc {
    pub input: usize,
    pub output: usize,
    #[serde(default = "default_interpolation")]
    pub interpolation: String,
}

fn default_interpolation() -> String {
    "LINEAR".to_string()
}

// ============================================================================
// Images, textures, cameras
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDesc {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub mime_type: Option<String>,
    pub buffer_view: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureDesc {
    pub name: Option<String>,
    pub source: Option<usize>,
    pub sampler: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplerDesc {
    pub mag_filter: Option<u32>,
    pub min_filter: Option<u32>,
    pub wrap_s: Option<u32>,
    pub wrap_t: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDesc {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub perspective: Option<PerspectiveDesc>,
    pub orthographic: Option<OrthographicDesc>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerspectiveDesc {
    pub aspect_ratio: Option<f32>,
    pub yfov: Option<f32>,
    pub zfar: Option<f32>,
    pub znear: Option<f32>,
}

/// Orthographic parameters; all four are required, checked when the camera is built.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrthographicDesc {
    pub xmag: Option<f32>,
    pub ymag: Option<f32>,
    pub zfar: Option<f32>,
    pub znear: Option<f32>,
}

// ============================================================================
// GLB Binary Container
// ============================================================================

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF" in little-endian
const GLB_VERSION: u32 = 2;
const GLB_CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const GLB_CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

/// Returns `true` if the bytes start with the GLB magic.
#[must_use]
pub fn is_glb(data: &[u8]) -> bool {
    read_u32_le(data, 0) == Some(GLB_MAGIC)
}

/// Parses either a JSON document or a GLB container.
///
/// The second element is the GLB binary chunk, if any.
pub fn parse_container(data: &[u8]) -> Result<(Document, Option<Vec<u8>>)> {
    if !is_glb(data) {
        return Ok((Document::from_slice(data)?, None));
    }

    let version = read_u32_le(data, 4).ok_or_else(|| glb_error("truncated header"))?;
    if version != GLB_VERSION {
        return Err(glb_error(format!("unsupported version {version}")));
    }
    let total = read_u32_le(data, 8).ok_or_else(|| glb_error("truncated header"))? as usize;
    if total > data.len() {
        return Err(glb_error(format!(
            "declared length {total} exceeds file size {}",
            data.len()
        )));
    }

    let mut json_chunk: Option<&[u8]> = None;
    let mut bin_chunk: Option<&[u8]> = None;
    let mut offset = 12;
    while offset + 8 <= total {
        let (Some(length), Some(kind)) = (read_u32_le(data, offset), read_u32_le(data, offset + 4))
        else {
            break;
        };
        let start = offset + 8;
        let end = start + length as usize;
        if end > total {
            return Err(glb_error("chunk extends past end of file"));
        }
        let chunk = &data[start..end];
        match kind {
            GLB_CHUNK_JSON if json_chunk.is_none() => json_chunk = Some(chunk),
            GLB_CHUNK_BIN if bin_chunk.is_none() => bin_chunk = Some(chunk),
            _ => log::debug!("Skipping GLB chunk 0x{kind:08X}"),
        }
        // Chunks are 4-byte aligned.
        offset = (end + 3) & !3;
    }

    let json = json_chunk.ok_or_else(|| glb_error("no JSON chunk"))?;
    Ok((Document::from_slice(json)?, bin_chunk.map(<[u8]>::to_vec)))
}

fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

fn glb_error(reason: impl Into<String>) -> AssetError {
    AssetError::InvalidGlb(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document_defaults() {
        let doc = Document::from_slice(br#"{"asset":{"version":"2.0"}}"#).unwrap();
        assert!(doc.nodes.is_empty());
        assert_eq!(doc.default_scene_index(), None);
    }

    #[test]
    fn default_scene_falls_back_to_first() {
        let doc = Document::from_slice(br#"{"scenes":[{"nodes":[0]}],"nodes":[{}]}"#).unwrap();
        assert_eq!(doc.default_scene_index(), Some(0));
    }

    #[test]
    fn sampler_interpolation_defaults_to_linear() {
        let json = br#"{"animations":[{"channels":[],"samplers":[{"input":0,"output":1}]}]}"#;
        let doc = Document::from_slice(json).unwrap();
        assert_eq!(doc.animations[0].samplers[0].interpolation, "LINEAR");
    }

    fn glb(json: &[u8], bin: &[u8]) -> Vec<u8> {
        let pad = |n: usize| (n + 3) & !3;
        let json_len = pad(json.len());
        let bin_len = pad(bin.len());
        let total = 12 + 8 + json_len + 8 + bin_len;

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        out.extend_from_slice(&GLB_VERSION.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json_len as u32).to_le_bytes());
        out.extend_from_slice(&GLB_CHUNK_JSON.to_le_bytes());
        out.extend_from_slice(json);
        out.resize(20 + json_len, b' ');
        out.extend_from_slice(&(bin_len as u32).to_le_bytes());
        out.extend_from_slice(&GLB_CHUNK_BIN.to_le_bytes());
        out.extend_from_slice(bin);
        out.resize(total, 0);
        out
    }

    #[test]
    fn glb_container_yields_binary_chunk() {
        let data = glb(br#"{"buffers":[{"byteLength":4}]}"#, &[1, 2, 3, 4]);
        assert!(is_glb(&data));

        let (doc, bin) = parse_container(&data).unwrap();
        assert_eq!(doc.buffers.len(), 1);
        assert_eq!(bin.as_deref(), Some(&[1u8, 2, 3, 4][..]));
    }

    #[test]
    fn glb_rejects_wrong_version() {
        let mut data = glb(b"{}", &[]);
        data[4] = 1;
        assert!(matches!(parse_container(&data), Err(AssetError::InvalidGlb(_))));
    }
}
