//! Resource fetching
//!
//! The loader never touches the file system directly. Documents, buffers and
//! images are requested through a [`ResourceFetcher`], so the same pipeline
//! runs against a directory on disk ([`FileFetcher`]) or an in-memory table
//! ([`MemoryFetcher`]).
//!
//! Images are decoded by the fetcher and stored in an [`ImageStore`]; the
//! pipeline only ever sees the opaque [`ImageHandle`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use slotmap::{SlotMap, new_key_type};

use crate::errors::FetchError;

new_key_type! {
    /// Opaque handle to a decoded image.
    pub struct ImageHandle;
}

/// Where an image's encoded bytes come from.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    /// Path relative to the fetcher root.
    Path(&'a str),
    /// Bytes already in memory (buffer view or `data:` URI).
    Bytes(&'a [u8]),
}

/// Capability that provides raw bytes and decoded images by path.
pub trait ResourceFetcher {
    fn fetch_json(&mut self, path: &str) -> Result<Vec<u8>, FetchError>;

    fn fetch_buffer(&mut self, path: &str) -> Result<Vec<u8>, FetchError>;

    /// Decodes an image and returns a handle to it.
    ///
    /// `mime_type` selects the decoder when present; otherwise the format is
    /// guessed from the content.
    fn fetch_image(
        &mut self,
        source: ImageSource<'_>,
        mime_type: Option<&str>,
    ) -> Result<ImageHandle, FetchError>;
}

// ============================================================================
// Image storage
// ============================================================================

/// Decoded RGBA8 images addressed by [`ImageHandle`].
#[derive(Debug, Default)]
pub struct ImageStore {
    images: SlotMap<ImageHandle, RgbaImage>,
}

impl ImageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: RgbaImage) -> ImageHandle {
        self.images.insert(image)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, handle: ImageHandle) -> Option<&RgbaImage> {
        self.images.get(handle)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Decodes and stores an encoded image.
    pub fn decode(&mut self, bytes: &[u8], mime_type: Option<&str>) -> Result<ImageHandle, FetchError> {
        let decoded = match mime_type.and_then(ImageFormat::from_mime_type) {
            Some(format) => image::load_from_memory_with_format(bytes, format)?,
            None => image::load_from_memory(bytes)?,
        };
        Ok(self.insert(decoded.to_rgba8()))
    }
}

// ============================================================================
// File system
// ============================================================================

/// Reads resources from a root directory.
#[derive(Debug)]
pub struct FileFetcher {
    root_path: PathBuf,
    images: ImageStore,
}

impl FileFetcher {
    /// Creates a fetcher rooted at `path`, or at its parent if `path` is a file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self {
            root_path,
            images: ImageStore::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    #[inline]
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let full = self.root_path.join(path);
        fs::read(&full).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound(full.display().to_string()),
            _ => FetchError::Io(err),
        })
    }
}

impl ResourceFetcher for FileFetcher {
    fn fetch_json(&mut self, path: &str) -> Result<Vec<u8>, FetchError> {
        self.read(path)
    }

    fn fetch_buffer(&mut self, path: &str) -> Result<Vec<u8>, FetchError> {
        self.read(path)
    }

    fn fetch_image(
        &mut self,
        source: ImageSource<'_>,
        mime_type: Option<&str>,
    ) -> Result<ImageHandle, FetchError> {
        match source {
            ImageSource::Path(path) => {
                let bytes = self.read(path)?;
                let mime_type = mime_type.or_else(|| mime_from_extension(path));
                self.images.decode(&bytes, mime_type)
            }
            ImageSource::Bytes(bytes) => self.images.decode(bytes, mime_type),
        }
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Serves resources from a path-to-bytes table.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    files: HashMap<String, Vec<u8>>,
    images: ImageStore,
}

impl MemoryFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    #[inline]
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}

impl ResourceFetcher for MemoryFetcher {
    fn fetch_json(&mut self, path: &str) -> Result<Vec<u8>, FetchError> {
        self.read(path)
    }

    fn fetch_buffer(&mut self, path: &str) -> Result<Vec<u8>, FetchError> {
        self.read(path)
    }

    fn fetch_image(
        &mut self,
        source: ImageSource<'_>,
        mime_type: Option<&str>,
    ) -> Result<ImageHandle, FetchError> {
        match source {
            ImageSource::Path(path) => {
                let bytes = self.read(path)?;
                let mime_type = mime_type.or_else(|| mime_from_extension(path));
                self.images.decode(&bytes, mime_type)
            }
            ImageSource::Bytes(bytes) => self.images.decode(bytes, mime_type),
        }
    }
}

// ============================================================================
// Path helpers
// ============================================================================

/// Directory part of a document path, including the trailing `/`.
#[must_use]
pub fn base_directory(path: &str) -> &str {
    match path.rfind('/') {
        Some(slash) => &path[..=slash],
        None => "",
    }
}

fn mime_from_extension(path: &str) -> Option<&'static str> {
    let extension = Path::new(path).extension()?.to_str()?;
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}
