//! Error Types
//!
//! This module defines the error types used throughout the pipeline.
//!
//! # Overview
//!
//! The main error type [`AssetError`] covers every failure mode:
//! - Malformed documents and binary data (`MalformedAsset`, `InvalidGlb`)
//! - Fetch failures of the document, buffers, and images (`ResourceUnavailable`)
//! - Interpolation modes that are named but not provided (`NotImplemented`)
//! - Aggregated per-entity failures of a load (`Incomplete`)
//!
//! Low-level decoders (buffer views, accessors) return structured errors
//! instead of zeroed data. The scene graph builder collects per-entity
//! failures into a [`LoadReport`] so independent siblings still load.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gltf_scene::errors::{AssetError, Result};
//!
//! fn decode() -> Result<()> {
//!     Err(AssetError::MalformedAsset("count is zero".into()))
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// The main error type for asset decoding and scene reconstruction.
#[derive(Error, Debug)]
pub enum AssetError {
    // ========================================================================
    // Document & Binary Layout Errors
    // ========================================================================
    /// The document or its binary data violates the expected layout
    /// (unknown tag, out-of-range index, slice out of bounds, bad length).
    #[error("Malformed asset: {0}")]
    MalformedAsset(String),

    /// The binary container header or chunk layout is invalid.
    #[error("Invalid GLB: {0}")]
    InvalidGlb(String),

    /// JSON parse error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error in a `data:` URI.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// A document, buffer, or image could not be fetched. Fatal to the load.
    #[error("Resource unavailable: {path}: {source}")]
    ResourceUnavailable {
        /// Path or URI that was requested
        path: String,
        /// Underlying fetch failure
        #[source]
        source: FetchError,
    },

    // ========================================================================
    // Evaluation Errors
    // ========================================================================
    /// A named extension point without an implementation was exercised.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// The graphics backend refused to create a resource.
    #[error("Graphics backend error: {0}")]
    Backend(String),

    /// One or more entities failed while the load ran in strict mode.
    #[error("Load incomplete:\n{0}")]
    Incomplete(LoadReport),
}

impl AssetError {
    /// Shorthand for building a [`AssetError::MalformedAsset`].
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        AssetError::MalformedAsset(reason.into())
    }
}

/// Failure reported by a [`ResourceFetcher`](crate::assets::io::ResourceFetcher).
///
/// "Not found" is kept distinct from transport failures so callers can tell a
/// broken reference from a flaky connection.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decode error: {0}")]
    Decode(String),
}

impl From<image::ImageError> for FetchError {
    fn from(err: image::ImageError) -> Self {
        FetchError::Decode(err.to_string())
    }
}

// ============================================================================
// Per-entity failure aggregation
// ============================================================================

/// Pipeline stage an entity failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    BufferView,
    Accessor,
    Image,
    Texture,
    Mesh,
    Skin,
    Node,
    Scene,
    Camera,
    Animation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::BufferView => "bufferView",
            Stage::Accessor => "accessor",
            Stage::Image => "image",
            Stage::Texture => "texture",
            Stage::Mesh => "mesh",
            Stage::Skin => "skin",
            Stage::Node => "node",
            Stage::Scene => "scene",
            Stage::Camera => "camera",
            Stage::Animation => "animation",
        };
        f.write_str(name)
    }
}

/// A single entity that failed to build.
#[derive(Debug)]
pub struct EntityFailure {
    pub stage: Stage,
    pub index: usize,
    pub error: AssetError,
}

/// Failures collected while building a document.
///
/// An empty report means every entity was built.
#[derive(Debug, Default)]
pub struct LoadReport {
    failures: Vec<EntityFailure>,
}

impl LoadReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure and logs it once.
    pub fn record(&mut self, stage: Stage, index: usize, error: AssetError) {
        log::error!("{stage} {index} failed: {error}");
        self.failures.push(EntityFailure {
            stage,
            index,
            error,
        });
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[EntityFailure] {
        &self.failures
    }

    /// Returns `true` if the given entity is listed as failed.
    #[must_use]
    pub fn has_failed(&self, stage: Stage, index: usize) -> bool {
        self.failures
            .iter()
            .any(|f| f.stage == stage && f.index == index)
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for failure in &self.failures {
            writeln!(f, "{} {}: {}", failure.stage, failure.index, failure.error)?;
        }
        Ok(())
    }
}

/// Alias for `Result<T, AssetError>`.
pub type Result<T> = std::result::Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_stage_and_index() {
        let mut report = LoadReport::new();
        report.record(Stage::Mesh, 3, AssetError::malformed("accessor 7 unavailable"));

        assert!(report.has_failed(Stage::Mesh, 3));
        assert!(!report.has_failed(Stage::Node, 3));
        assert_eq!(
            report.to_string(),
            "mesh 3: Malformed asset: accessor 7 unavailable\n"
        );
    }
}
