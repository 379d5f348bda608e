//! glTF 加载器 (Document Loader)
//!
//! 按固定顺序执行各个阶段：
//!
//! 1. 获取并解析文档（JSON 或 GLB）
//! 2. 获取 buffers（文件、`data:` URI、GLB 二进制块）
//! 3. 解析 buffer views，再解码所有 accessor
//! 4. 获取图片并创建纹理
//! 5. 构建 meshes、skins、cameras、nodes 和 scenes
//! 6. 解码动画
//!
//! Fetch failures abort the load with `ResourceUnavailable`. Every other
//! failure is confined to its entity and recorded in the asset's
//! [`LoadReport`]; in strict mode a non-empty report aborts the load with
//! `Incomplete`.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::animation::Animation;
use crate::assets::accessor::AccessorTable;
use crate::assets::asset::Asset;
use crate::assets::buffer_view::BufferViewTable;
use crate::assets::document::{Document, ImageDesc, TextureDesc, parse_container};
use crate::assets::io::{ImageHandle, ImageSource, ResourceFetcher, base_directory};
use crate::assets::settings::LoaderSettings;
use crate::errors::{AssetError, FetchError, LoadReport, Result, Stage};
use crate::render::{GraphicsBackend, TextureHandle, TextureOptions};
use crate::scene::{Camera, Pose, SceneGraphBuilder};

pub struct GltfLoader<'a, F: ResourceFetcher + ?Sized, B: GraphicsBackend + ?Sized> {
    fetcher: &'a mut F,
    backend: &'a mut B,
    settings: &'a LoaderSettings,
    base_path: String,
}

impl<'a, F: ResourceFetcher + ?Sized, B: GraphicsBackend + ?Sized> GltfLoader<'a, F, B> {
    /// Loads the document at `path` and everything it references.
    pub fn load(path: &str, fetcher: &'a mut F, backend: &'a mut B, settings: &'a LoaderSettings) -> Result<Asset> {
        log::info!("Loading {path}");
        let bytes = fetcher.fetch_json(path).map_err(|source| unavailable(path, source))?;

        let mut loader = Self {
            fetcher,
            backend,
            settings,
            base_path: base_directory(path).to_string(),
        };
        loader.run(&bytes)
    }

    /// Loads a document already in memory. Relative references resolve
    /// against `base_path`.
    pub fn load_slice(
        data: &[u8],
        base_path: &str,
        fetcher: &'a mut F,
        backend: &'a mut B,
        settings: &'a LoaderSettings,
    ) -> Result<Asset> {
        let mut base_path = base_path.to_string();
        if !base_path.is_empty() && !base_path.ends_with('/') {
            base_path.push('/');
        }
        let mut loader = Self {
            fetcher,
            backend,
            settings,
            base_path,
        };
        loader.run(data)
    }

    fn run(&mut self, data: &[u8]) -> Result<Asset> {
        let (document, bin) = parse_container(data)?;
        check_extensions(&document);

        let buffers = self.load_buffers(&document, bin)?;
        log::debug!("Fetched {} buffers", buffers.len());

        let mut report = LoadReport::new();
        let views = BufferViewTable::build(&document, &buffers, &mut report);
        let accessors = AccessorTable::build(&document, &views, &mut report);

        let (images, textures) = if self.settings.load_images {
            let images = self.load_images(&document, &views, &mut report)?;
            let textures = self.build_textures(&document, &images, &mut report);
            (images, textures)
        } else {
            (vec![None; document.images.len()], vec![None; document.textures.len()])
        };

        let graph = SceneGraphBuilder::new(&document, &accessors, self.settings).build(&mut *self.backend, &mut report);

        let animations = document
            .animations
            .iter()
            .enumerate()
            .map(|(index, desc)| match Animation::from_desc(desc, &accessors, graph.node_count()) {
                Ok(animation) => Some(animation),
                Err(err) => {
                    report.record(Stage::Animation, index, err);
                    None
                }
            })
            .collect();

        if self.settings.strict && !report.is_empty() {
            return Err(AssetError::Incomplete(report));
        }
        if !report.is_empty() {
            log::warn!("Loaded with {} failed entities", report.failures().len());
        }

        let pose = Pose::rest(&graph);
        let fallback_camera = Camera::fallback(self.settings);
        Ok(Asset {
            graph,
            pose,
            accessors,
            animations,
            images,
            textures,
            fallback_camera,
            report,
        })
    }

    // ========================================================================
    // Buffers
    // ========================================================================

    fn load_buffers(&mut self, document: &Document, mut bin: Option<Vec<u8>>) -> Result<Vec<Vec<u8>>> {
        let mut buffers = Vec::with_capacity(document.buffers.len());
        for (index, desc) in document.buffers.iter().enumerate() {
            let data = match desc.uri.as_deref() {
                Some(uri) => match decode_data_uri(uri)? {
                    Some((_, bytes)) => bytes,
                    None => {
                        let path = format!("{}{uri}", self.base_path);
                        self.fetcher
                            .fetch_buffer(&path)
                            .map_err(|source| unavailable(&path, source))?
                    }
                },
                None => bin
                    .take()
                    .ok_or_else(|| AssetError::InvalidGlb(format!("buffer {index} has no URI and no binary chunk")))?,
            };
            if data.len() < desc.byte_length {
                log::warn!(
                    "Buffer {index} holds {} bytes, declares {}",
                    data.len(),
                    desc.byte_length
                );
            }
            buffers.push(data);
        }
        Ok(buffers)
    }

    // ========================================================================
    // 图片与纹理 (Images & textures)
    // ========================================================================

    fn load_images(
        &mut self,
        document: &Document,
        views: &BufferViewTable<'_>,
        report: &mut LoadReport,
    ) -> Result<Vec<Option<ImageHandle>>> {
        let mut images = Vec::with_capacity(document.images.len());
        for (index, desc) in document.images.iter().enumerate() {
            match self.load_image(index, desc, views) {
                Ok(handle) => images.push(Some(handle)),
                Err(err @ AssetError::ResourceUnavailable { .. }) => return Err(err),
                Err(err) => {
                    report.record(Stage::Image, index, err);
                    images.push(None);
                }
            }
        }
        Ok(images)
    }

    fn load_image(&mut self, index: usize, desc: &ImageDesc, views: &BufferViewTable<'_>) -> Result<ImageHandle> {
        let mime_type = desc.mime_type.as_deref();
        match (desc.uri.as_deref(), desc.buffer_view) {
            (Some(uri), _) => match decode_data_uri(uri)? {
                Some((data_mime, bytes)) => self
                    .fetcher
                    .fetch_image(ImageSource::Bytes(&bytes), mime_type.or(data_mime.as_deref()))
                    .map_err(|source| image_error(&format!("image {index}"), source)),
                None => {
                    let path = format!("{}{uri}", self.base_path);
                    self.fetcher
                        .fetch_image(ImageSource::Path(&path), mime_type)
                        .map_err(|source| image_error(&path, source))
                }
            },
            (None, Some(view_index)) => {
                let view = views.get(view_index)?;
                self.fetcher
                    .fetch_image(ImageSource::Bytes(view.bytes), mime_type)
                    .map_err(|source| image_error(&format!("image {index}"), source))
            }
            (None, None) => Err(AssetError::malformed("image has neither uri nor bufferView")),
        }
    }

    fn build_textures(
        &mut self,
        document: &Document,
        images: &[Option<ImageHandle>],
        report: &mut LoadReport,
    ) -> Vec<Option<TextureHandle>> {
        let mut textures = Vec::with_capacity(document.textures.len());
        for (index, desc) in document.textures.iter().enumerate() {
            match self.build_texture(document, desc, images) {
                Ok(handle) => textures.push(Some(handle)),
                Err(err) => {
                    report.record(Stage::Texture, index, err);
                    textures.push(None);
                }
            }
        }
        textures
    }

    fn build_texture(
        &mut self,
        document: &Document,
        desc: &TextureDesc,
        images: &[Option<ImageHandle>],
    ) -> Result<TextureHandle> {
        let source = desc
            .source
            .ok_or_else(|| AssetError::malformed("texture has no source image"))?;
        let image = images
            .get(source)
            .copied()
            .flatten()
            .ok_or_else(|| AssetError::malformed(format!("image {source} unavailable")))?;
        let options = match desc.sampler {
            Some(sampler) => document
                .samplers
                .get(sampler)
                .map(TextureOptions::from_sampler)
                .ok_or_else(|| AssetError::malformed(format!("sampler {sampler} out of range")))?,
            None => TextureOptions::default(),
        };
        self.backend.build_image_texture(image, &options)
    }
}

fn unavailable(path: &str, source: FetchError) -> AssetError {
    AssetError::ResourceUnavailable {
        path: path.to_string(),
        source,
    }
}

/// Undecodable image data stays confined to its image; anything else
/// is a fetch failure.
fn image_error(path: &str, source: FetchError) -> AssetError {
    match source {
        FetchError::Decode(reason) => AssetError::malformed(format!("{path}: {reason}")),
        other => unavailable(path, other),
    }
}

fn check_extensions(document: &Document) {
    if !document.extensions_required.is_empty() {
        log::warn!(
            "Document requires unsupported extensions: {:?}",
            document.extensions_required
        );
    }
    if !document.extensions_used.is_empty() {
        log::info!(
            "Document uses extensions that will be ignored: {:?}",
            document.extensions_used
        );
    }
}

/// Decodes a `data:[<mime>][;base64],<payload>` URI.
///
/// Returns `Ok(None)` for any other URI.
pub fn decode_data_uri(uri: &str) -> Result<Option<(Option<String>, Vec<u8>)>> {
    let Some(rest) = uri.strip_prefix("data:") else {
        return Ok(None);
    };
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AssetError::malformed("data URI without payload"))?;
    let Some(mime) = header.strip_suffix(";base64") else {
        return Err(AssetError::malformed("only base64 data URIs are supported"));
    };
    let mime = (!mime.is_empty()).then(|| mime.to_string());
    Ok(Some((mime, BASE64.decode(payload)?)))
}
