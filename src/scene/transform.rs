use glam::{Quat, Vec3};

use crate::assets::document::NodeDesc;
use crate::errors::{AssetError, Result};
use crate::math::Matrix4;

/// Local transform of a node: either one matrix or independent TRS parts.
///
/// The two forms are mutually exclusive. Animation writes only ever touch
/// the TRS form; a matrix-driven node keeps its matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalTransform {
    Matrix(Matrix4),
    Trs {
        translation: Vec3,
        rotation: Quat,
        scale: Vec3,
    },
}

impl Default for LocalTransform {
    fn default() -> Self {
        LocalTransform::Trs {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl LocalTransform {
    /// Reads the transform a node declares.
    ///
    /// A node that declares both a matrix and any TRS component is
    /// malformed.
    pub fn from_desc(desc: &NodeDesc) -> Result<Self> {
        let has_trs = desc.translation.is_some() || desc.rotation.is_some() || desc.scale.is_some();
        match desc.matrix {
            Some(_) if has_trs => Err(AssetError::malformed(
                "node declares both matrix and translation/rotation/scale",
            )),
            Some(matrix) => Ok(LocalTransform::Matrix(Matrix4(matrix))),
            None => Ok(LocalTransform::Trs {
                translation: desc.translation.map_or(Vec3::ZERO, Vec3::from_array),
                rotation: desc.rotation.map_or(Quat::IDENTITY, Quat::from_array),
                scale: desc.scale.map_or(Vec3::ONE, Vec3::from_array),
            }),
        }
    }

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        LocalTransform::Trs {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// The local matrix: the matrix itself, or `T * R * S`.
    #[must_use]
    pub fn matrix(&self) -> Matrix4 {
        match *self {
            LocalTransform::Matrix(matrix) => matrix,
            LocalTransform::Trs {
                translation,
                rotation,
                scale,
            } => Matrix4::from_trs(translation, rotation, scale),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_matrix(&self) -> bool {
        matches!(self, LocalTransform::Matrix(_))
    }

    /// Overwrites the translation. Returns `false` for a matrix transform.
    pub fn set_translation(&mut self, value: Vec3) -> bool {
        match self {
            LocalTransform::Trs { translation, .. } => {
                *translation = value;
                true
            }
            LocalTransform::Matrix(_) => false,
        }
    }

    /// Overwrites the rotation. Returns `false` for a matrix transform.
    pub fn set_rotation(&mut self, value: Quat) -> bool {
        match self {
            LocalTransform::Trs { rotation, .. } => {
                *rotation = value;
                true
            }
            LocalTransform::Matrix(_) => false,
        }
    }

    /// Overwrites the scale. Returns `false` for a matrix transform.
    pub fn set_scale(&mut self, value: Vec3) -> bool {
        match self {
            LocalTransform::Trs { scale, .. } => {
                *scale = value;
                true
            }
            LocalTransform::Matrix(_) => false,
        }
    }
}
