use std::fmt;

use crate::errors::{AssetError, Result};
use crate::render::DrawableHandle;

/// Primitive assembly mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Topology {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    /// The document's `mode` enumerant.
    #[must_use]
    pub const fn mode(self) -> u32 {
        match self {
            Topology::Points => 0,
            Topology::Lines => 1,
            Topology::LineLoop => 2,
            Topology::LineStrip => 3,
            Topology::Triangles => 4,
            Topology::TriangleStrip => 5,
            Topology::TriangleFan => 6,
        }
    }
}

impl TryFrom<u32> for Topology {
    type Error = AssetError;

    fn try_from(mode: u32) -> Result<Self> {
        Ok(match mode {
            0 => Topology::Points,
            1 => Topology::Lines,
            2 => Topology::LineLoop,
            3 => Topology::LineStrip,
            4 => Topology::Triangles,
            5 => Topology::TriangleStrip,
            6 => Topology::TriangleFan,
            other => return Err(AssetError::malformed(format!("unknown primitive mode {other}"))),
        })
    }
}

/// Renderer-facing vertex attribute slot.
///
/// Semantics without a dedicated slot are kept verbatim in
/// [`AttributeKey::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeKey {
    Position,
    Normal,
    Tangent,
    TexCoord0,
    TexCoord1,
    Joints0,
    Joints1,
    Weights0,
    Weights1,
    Other(String),
}

impl AttributeKey {
    /// Maps a document semantic (`POSITION`, `TEXCOORD_0`, ...) to its slot.
    ///
    /// Unknown semantics pass through unchanged with a warning.
    #[must_use]
    pub fn from_semantic(semantic: &str) -> Self {
        match semantic {
            "POSITION" => AttributeKey::Position,
            "NORMAL" => AttributeKey::Normal,
            "TANGENT" => AttributeKey::Tangent,
            "TEXCOORD_0" => AttributeKey::TexCoord0,
            "TEXCOORD_1" => AttributeKey::TexCoord1,
            "JOINTS_0" => AttributeKey::Joints0,
            "JOINTS_1" => AttributeKey::Joints1,
            "WEIGHTS_0" => AttributeKey::Weights0,
            "WEIGHTS_1" => AttributeKey::Weights1,
            other => {
                log::warn!("Unknown attribute semantic {other}, passing it through");
                AttributeKey::Other(other.to_string())
            }
        }
    }

    /// Shader input name of the slot.
    #[must_use]
    pub fn shader_name(&self) -> &str {
        match self {
            AttributeKey::Position => "a_position",
            AttributeKey::Normal => "a_normal",
            AttributeKey::Tangent => "a_tangent",
            AttributeKey::TexCoord0 => "a_texcoord_0",
            AttributeKey::TexCoord1 => "a_texcoord_1",
            AttributeKey::Joints0 => "a_joint_0",
            AttributeKey::Joints1 => "a_joint_1",
            AttributeKey::Weights0 => "a_weight_0",
            AttributeKey::Weights1 => "a_weight_1",
            AttributeKey::Other(name) => name,
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shader_name())
    }
}

/// One draw call worth of geometry.
///
/// Accessors are referenced by index into the asset's accessor table.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub topology: Topology,
    pub indices: Option<usize>,
    pub attributes: Vec<(AttributeKey, usize)>,
    pub material: Option<usize>,
    pub drawable: DrawableHandle,
}

impl Primitive {
    /// Accessor index bound to `key`, if any.
    #[must_use]
    pub fn attribute(&self, key: &AttributeKey) -> Option<usize> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|&(_, accessor)| accessor)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantics_map_to_shader_names() {
        assert_eq!(AttributeKey::from_semantic("POSITION").shader_name(), "a_position");
        assert_eq!(AttributeKey::from_semantic("JOINTS_1").shader_name(), "a_joint_1");
        assert_eq!(AttributeKey::from_semantic("WEIGHTS_0").shader_name(), "a_weight_0");
    }

    #[test]
    fn unknown_semantic_passes_through() {
        let key = AttributeKey::from_semantic("_BATCHID");
        assert_eq!(key, AttributeKey::Other("_BATCHID".to_string()));
        assert_eq!(key.shader_name(), "_BATCHID");
    }

    #[test]
    fn topology_modes() {
        for mode in 0..=6 {
            assert_eq!(Topology::try_from(mode).unwrap().mode(), mode);
        }
        assert!(Topology::try_from(7).is_err());
        assert_eq!(Topology::default(), Topology::Triangles);
    }
}
