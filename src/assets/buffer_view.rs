//! Buffer slice resolution
//!
//! Turns buffer-view descriptors into borrowed byte ranges over the fetched
//! buffers. Resolution is pure slicing: no bytes are copied and repeated
//! calls with the same inputs return equal views.

use crate::assets::document::Document;
use crate::errors::{AssetError, LoadReport, Result, Stage};

/// A read-only byte range inside a fetched buffer plus its element stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferView<'a> {
    /// Byte distance between elements; `0` means tightly packed.
    pub byte_stride: usize,
    pub bytes: &'a [u8],
}

/// Slices `byte_length` bytes at `byte_offset` out of buffer `buffer`.
///
/// Fails with `MalformedAsset` if the buffer does not exist or the range
/// does not fit inside it.
pub fn resolve_slice<'a>(
    buffers: &'a [Vec<u8>],
    buffer: usize,
    byte_offset: usize,
    byte_length: usize,
    byte_stride: usize,
) -> Result<BufferView<'a>> {
    let source = buffers.get(buffer).ok_or_else(|| {
        AssetError::malformed(format!(
            "buffer {buffer} out of range ({} buffers)",
            buffers.len()
        ))
    })?;

    let end = byte_offset
        .checked_add(byte_length)
        .filter(|&end| end <= source.len())
        .ok_or_else(|| {
            AssetError::malformed(format!(
                "slice {byte_offset}+{byte_length} exceeds buffer {buffer} of {} bytes",
                source.len()
            ))
        })?;

    Ok(BufferView {
        byte_stride,
        bytes: &source[byte_offset..end],
    })
}

/// All buffer views of a document, resolved once up front.
///
/// Views that failed to resolve are kept as holes so indices stay stable;
/// the failures are recorded in the [`LoadReport`].
#[derive(Debug, Default)]
pub struct BufferViewTable<'a> {
    views: Vec<Option<BufferView<'a>>>,
}

impl<'a> BufferViewTable<'a> {
    pub fn build(document: &Document, buffers: &'a [Vec<u8>], report: &mut LoadReport) -> Self {
        let views = document
            .buffer_views
            .iter()
            .enumerate()
            .map(|(index, desc)| {
                let resolved = resolve_slice(
                    buffers,
                    desc.buffer,
                    desc.byte_offset,
                    desc.byte_length,
                    desc.byte_stride.unwrap_or(0),
                );
                match resolved {
                    Ok(view) => Some(view),
                    Err(err) => {
                        report.record(Stage::BufferView, index, err);
                        None
                    }
                }
            })
            .collect();

        Self { views }
    }

    /// Returns the resolved view, or `MalformedAsset` if it is missing or failed.
    pub fn get(&self, index: usize) -> Result<&BufferView<'a>> {
        match self.views.get(index) {
            Some(Some(view)) => Ok(view),
            Some(None) => Err(AssetError::malformed(format!(
                "bufferView {index} failed to resolve"
            ))),
            None => Err(AssetError::malformed(format!(
                "bufferView {index} out of range ({} views)",
                self.views.len()
            ))),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_is_idempotent() {
        let buffers = vec![(0u8..32).collect::<Vec<_>>()];
        let a = resolve_slice(&buffers, 0, 4, 8, 0).unwrap();
        let b = resolve_slice(&buffers, 0, 4, 8, 0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.bytes, &[4, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn slice_out_of_bounds_is_malformed() {
        let buffers = vec![vec![0u8; 16]];
        assert!(matches!(
            resolve_slice(&buffers, 0, 12, 8, 0),
            Err(AssetError::MalformedAsset(_))
        ));
        assert!(matches!(
            resolve_slice(&buffers, 1, 0, 4, 0),
            Err(AssetError::MalformedAsset(_))
        ));
        assert!(resolve_slice(&buffers, 0, usize::MAX, 2, 0).is_err());
    }

    #[test]
    fn slice_ending_at_buffer_end_is_valid() {
        let buffers = vec![vec![7u8; 16]];
        let view = resolve_slice(&buffers, 0, 8, 8, 4).unwrap();
        assert_eq!(view.bytes.len(), 8);
        assert_eq!(view.byte_stride, 4);
    }
}
