use std::f32::consts::FRAC_PI_2;

use serde::Deserialize;

/// Loader configuration.
///
/// Build from [`Default`] with struct-update syntax, or deserialize from any
/// serde format; missing fields keep their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Abort with [`AssetError::Incomplete`](crate::errors::AssetError::Incomplete)
    /// if any entity failed to build.
    pub strict: bool,
    /// Fetch images and build textures. When disabled, images and textures
    /// are skipped entirely.
    pub load_images: bool,
    /// Viewport size in pixels; its aspect ratio is used by cameras that
    /// do not declare one.
    pub viewport: [u32; 2],
    pub default_camera: CameraDefaults,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            strict: false,
            load_images: true,
            viewport: [1280, 720],
            default_camera: CameraDefaults::default(),
        }
    }
}

impl LoaderSettings {
    /// Viewport width over height; `1.0` for a degenerate viewport.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        let [width, height] = self.viewport;
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }
}

/// Perspective parameters for cameras that leave them out, and for the
/// fallback camera of a document without any.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraDefaults {
    pub yfov: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraDefaults {
    fn default() -> Self {
        Self {
            yfov: FRAC_PI_2,
            znear: 0.01,
            zfar: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_keep_defaults() {
        let settings: LoaderSettings = serde_json::from_str(r#"{"strict":true}"#).unwrap();
        assert!(settings.strict);
        assert!(settings.load_images);
        assert_eq!(settings.viewport, [1280, 720]);
        assert_eq!(settings.default_camera, CameraDefaults::default());
    }

    #[test]
    fn aspect_ratio_of_viewport() {
        let settings = LoaderSettings {
            viewport: [800, 400],
            ..Default::default()
        };
        assert_eq!(settings.aspect_ratio(), 2.0);
    }
}
