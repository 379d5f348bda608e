use glam::Vec3;

use crate::assets::document::CameraDesc;
use crate::assets::settings::LoaderSettings;
use crate::errors::{AssetError, Result};
use crate::math::Matrix4;

/// Perspective camera with an Euler-angle orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub aspect: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// Rotation about X, Y and Z in radians.
    pub rotation: Vec3,
}

impl PerspectiveCamera {
    #[must_use]
    pub fn new(aspect: f32, fov: f32, near: f32, far: f32) -> Self {
        Self {
            aspect,
            fov,
            near,
            far,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }

    /// Combined view and projection matrix, `P * Rx * Ry * Rz * T(position)`,
    /// expanded into one closed form.
    ///
    /// `P` has `fx = tan(PI/2 + fov/2)` on the X diagonal and `fx * aspect`
    /// on the Y diagonal.
    #[must_use]
    pub fn view_projection(&self) -> Matrix4 {
        let Vec3 { x: rx, y: ry, z: rz } = self.rotation;
        let Vec3 { x: tx, y: ty, z: tz } = self.position;

        let fx = (std::f32::consts::FRAC_PI_2 + self.fov * 0.5).tan();
        let fy = fx * self.aspect;
        let ir = 1.0 / (self.near - self.far);
        let dz = (self.near + self.far) * ir;
        let dw = self.near * self.far * ir * 2.0;

        let (sx, cx) = rx.sin_cos();
        let (sy, cy) = ry.sin_cos();
        let (sz, cz) = rz.sin_cos();

        let cycz = cy * cz;
        let cxsz = cx * sz;
        let sxcz = sx * cz;
        let cysz = cy * sz;
        let cxcz = cx * cz;
        let sxsz = sx * sz;
        let sxcy = sx * cy;
        let cxcy = cx * cy;

        let r10 = cxsz + sxcz * sy;
        let r20 = sxsz - cxcz * sy;
        let r11 = cxcz - sxsz * sy;
        let r21 = sxcz + cxsz * sy;

        let a = tx * cz - ty * sz;
        let b = tx * sz + ty * cz;
        let t0 = tz * sy + a * cy;
        let c = tz * cy - a * sy;
        let t1 = b * cx - c * sx;
        let t2 = b * sx + c * cx;

        Matrix4([
            cycz * fx,
            r10 * fy,
            r20 * dz,
            -r20,
            -cysz * fx,
            r11 * fy,
            r21 * dz,
            -r21,
            sy * fx,
            -sxcy * fy,
            cxcy * dz,
            -cxcy,
            t0 * fx,
            t1 * fy,
            t2 * dz + dw,
            -t2,
        ])
    }
}

/// Orthographic camera with half-extents `xmag` and `ymag`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicCamera {
    pub xmag: f32,
    pub ymag: f32,
    pub near: f32,
    pub far: f32,
}

impl OrthographicCamera {
    #[must_use]
    pub fn projection(&self) -> Matrix4 {
        let ir = 1.0 / (self.near - self.far);
        Matrix4([
            1.0 / self.xmag,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0 / self.ymag,
            0.0,
            0.0,
            0.0,
            0.0,
            2.0 * ir,
            0.0,
            0.0,
            0.0,
            (self.far + self.near) * ir,
            1.0,
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Perspective(PerspectiveCamera),
    Orthographic(OrthographicCamera),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: Option<String>,
    pub projection: Projection,
}

impl Camera {
    /// Builds a camera from its document description.
    ///
    /// Missing aspect ratios fall back to the viewport; missing perspective
    /// parameters fall back to `settings.default_camera`. Orthographic
    /// cameras must give all four extents.
    pub fn from_desc(desc: &CameraDesc, settings: &LoaderSettings) -> Result<Self> {
        let defaults = settings.default_camera;
        let projection = match desc.kind.as_str() {
            "perspective" => {
                let p = desc
                    .perspective
                    .ok_or_else(|| AssetError::malformed("perspective camera without parameters"))?;
                Projection::Perspective(PerspectiveCamera::new(
                    p.aspect_ratio.unwrap_or_else(|| settings.aspect_ratio()),
                    p.yfov.unwrap_or(defaults.yfov),
                    p.znear.unwrap_or(defaults.znear),
                    p.zfar.unwrap_or(defaults.zfar),
                ))
            }
            "orthographic" => {
                let o = desc
                    .orthographic
                    .ok_or_else(|| AssetError::malformed("orthographic camera without parameters"))?;
                let (Some(xmag), Some(ymag), Some(znear), Some(zfar)) = (o.xmag, o.ymag, o.znear, o.zfar) else {
                    return Err(AssetError::malformed(
                        "orthographic camera needs xmag, ymag, znear and zfar",
                    ));
                };
                Projection::Orthographic(OrthographicCamera {
                    xmag,
                    ymag,
                    near: znear,
                    far: zfar,
                })
            }
            other => return Err(AssetError::malformed(format!("unknown camera type {other:?}"))),
        };

        Ok(Self {
            name: desc.name.clone(),
            projection,
        })
    }

    /// Camera used when a document declares none.
    #[must_use]
    pub fn fallback(settings: &LoaderSettings) -> Self {
        let defaults = settings.default_camera;
        Self {
            name: None,
            projection: Projection::Perspective(PerspectiveCamera::new(
                settings.aspect_ratio(),
                defaults.yfov,
                defaults.znear,
                defaults.zfar,
            )),
        }
    }

    /// Projection matrix (for a perspective camera, including its own
    /// position and rotation).
    #[must_use]
    pub fn matrix(&self) -> Matrix4 {
        match &self.projection {
            Projection::Perspective(camera) => camera.view_projection(),
            Projection::Orthographic(camera) => camera.projection(),
        }
    }
}
