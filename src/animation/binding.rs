use std::str::FromStr;

use crate::errors::{AssetError, Result};
use crate::scene::NodeIndex;

/// Node property driven by a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    /// Morph target weights. Parsed, never applied.
    Weights,
}

impl TargetPath {
    /// Floats per keyframe the property expects; `None` for weights, whose
    /// arity depends on the mesh.
    #[must_use]
    pub const fn arity(self) -> Option<usize> {
        match self {
            TargetPath::Translation | TargetPath::Scale => Some(3),
            TargetPath::Rotation => Some(4),
            TargetPath::Weights => None,
        }
    }
}

impl FromStr for TargetPath {
    type Err = AssetError;

    fn from_str(path: &str) -> Result<Self> {
        match path {
            "translation" => Ok(TargetPath::Translation),
            "rotation" => Ok(TargetPath::Rotation),
            "scale" => Ok(TargetPath::Scale),
            "weights" => Ok(TargetPath::Weights),
            other => Err(AssetError::malformed(format!("unknown channel path {other:?}"))),
        }
    }
}

/// Binds track `track_index` of an animation to one property of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node: NodeIndex,
    pub target: TargetPath,
}
