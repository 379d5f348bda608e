//! Accessor decoding
//!
//! Maps a buffer view byte range plus a component/shape descriptor into a
//! typed numeric array. Strided data is kept in place: element `i` starts at
//! component `i * stride_in_components`. Sparse overlays are applied once
//! while decoding, so reads never consult the sparse block again.
//!
//! Component kinds and shape tags are closed enums; an unknown tag in the
//! document becomes `MalformedAsset` instead of falling through.

use std::str::FromStr;

use crate::assets::buffer_view::BufferViewTable;
use crate::assets::document::{AccessorDesc, Document, SparseDesc};
use crate::errors::{AssetError, LoadReport, Result, Stage};

// ============================================================================
// Component kinds & shapes
// ============================================================================

/// Numeric type of a single component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
}

impl ComponentKind {
    pub const INT8: u32 = 0x1400;
    pub const UINT8: u32 = 0x1401;
    pub const INT16: u32 = 0x1402;
    pub const UINT16: u32 = 0x1403;
    pub const INT32: u32 = 0x1404;
    pub const UINT32: u32 = 0x1405;
    pub const FLOAT32: u32 = 0x1406;

    /// Size of one component in bytes.
    #[inline]
    #[must_use]
    pub const fn byte_width(self) -> usize {
        match self {
            ComponentKind::I8 | ComponentKind::U8 => 1,
            ComponentKind::I16 | ComponentKind::U16 => 2,
            ComponentKind::I32 | ComponentKind::U32 | ComponentKind::F32 => 4,
        }
    }

    /// The enumerant used in the document (and by GL-style backends).
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            ComponentKind::I8 => Self::INT8,
            ComponentKind::U8 => Self::UINT8,
            ComponentKind::I16 => Self::INT16,
            ComponentKind::U16 => Self::UINT16,
            ComponentKind::I32 => Self::INT32,
            ComponentKind::U32 => Self::UINT32,
            ComponentKind::F32 => Self::FLOAT32,
        }
    }
}

impl TryFrom<u32> for ComponentKind {
    type Error = AssetError;

    fn try_from(code: u32) -> Result<Self> {
        Ok(match code {
            Self::INT8 => ComponentKind::I8,
            Self::UINT8 => ComponentKind::U8,
            Self::INT16 => ComponentKind::I16,
            Self::UINT16 => ComponentKind::U16,
            Self::INT32 => ComponentKind::I32,
            Self::UINT32 => ComponentKind::U32,
            Self::FLOAT32 => ComponentKind::F32,
            other => {
                return Err(AssetError::malformed(format!(
                    "unknown component type 0x{other:04X}"
                )));
            }
        })
    }
}

/// Element shape tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorShape {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorShape {
    /// Number of components per element.
    #[inline]
    #[must_use]
    pub const fn components(self) -> usize {
        match self {
            AccessorShape::Scalar => 1,
            AccessorShape::Vec2 => 2,
            AccessorShape::Vec3 => 3,
            AccessorShape::Vec4 | AccessorShape::Mat2 => 4,
            AccessorShape::Mat3 => 9,
            AccessorShape::Mat4 => 16,
        }
    }
}

impl FromStr for AccessorShape {
    type Err = AssetError;

    fn from_str(tag: &str) -> Result<Self> {
        Ok(match tag {
            "SCALAR" => AccessorShape::Scalar,
            "VEC2" => AccessorShape::Vec2,
            "VEC3" => AccessorShape::Vec3,
            "VEC4" => AccessorShape::Vec4,
            "MAT2" => AccessorShape::Mat2,
            "MAT3" => AccessorShape::Mat3,
            "MAT4" => AccessorShape::Mat4,
            other => {
                return Err(AssetError::malformed(format!(
                    "unknown accessor type {other:?}"
                )));
            }
        })
    }
}

// ============================================================================
// Typed storage
// ============================================================================

/// Typed component array backing an accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessorData {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    F32(Vec<f32>),
}

macro_rules! with_data {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            AccessorData::I8($v) => $body,
            AccessorData::U8($v) => $body,
            AccessorData::I16($v) => $body,
            AccessorData::U16($v) => $body,
            AccessorData::I32($v) => $body,
            AccessorData::U32($v) => $body,
            AccessorData::F32($v) => $body,
        }
    };
}

fn read_le<T, const N: usize>(bytes: &[u8], len: usize, from: fn([u8; N]) -> T) -> Vec<T> {
    bytes
        .chunks_exact(N)
        .take(len)
        .map(|chunk| from(std::array::from_fn(|i| chunk[i])))
        .collect()
}

impl AccessorData {
    /// Decodes `len` little-endian components starting at `byte_offset`.
    pub fn decode(kind: ComponentKind, bytes: &[u8], byte_offset: usize, len: usize) -> Result<Self> {
        let end = len
            .checked_mul(kind.byte_width())
            .and_then(|n| n.checked_add(byte_offset))
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| {
                AssetError::malformed(format!(
                    "{len} components of {kind:?} at byte {byte_offset} exceed view of {} bytes",
                    bytes.len()
                ))
            })?;
        let bytes = &bytes[byte_offset..end];

        Ok(match kind {
            ComponentKind::I8 => AccessorData::I8(read_le(bytes, len, i8::from_le_bytes)),
            ComponentKind::U8 => AccessorData::U8(bytes.to_vec()),
            ComponentKind::I16 => AccessorData::I16(read_le(bytes, len, i16::from_le_bytes)),
            ComponentKind::U16 => AccessorData::U16(read_le(bytes, len, u16::from_le_bytes)),
            ComponentKind::I32 => AccessorData::I32(read_le(bytes, len, i32::from_le_bytes)),
            ComponentKind::U32 => AccessorData::U32(read_le(bytes, len, u32::from_le_bytes)),
            ComponentKind::F32 => AccessorData::F32(read_le(bytes, len, f32::from_le_bytes)),
        })
    }

    #[must_use]
    pub fn zeroed(kind: ComponentKind, len: usize) -> Self {
        match kind {
            ComponentKind::I8 => AccessorData::I8(vec![0; len]),
            ComponentKind::U8 => AccessorData::U8(vec![0; len]),
            ComponentKind::I16 => AccessorData::I16(vec![0; len]),
            ComponentKind::U16 => AccessorData::U16(vec![0; len]),
            ComponentKind::I32 => AccessorData::I32(vec![0; len]),
            ComponentKind::U32 => AccessorData::U32(vec![0; len]),
            ComponentKind::F32 => AccessorData::F32(vec![0.0; len]),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        match self {
            AccessorData::I8(_) => ComponentKind::I8,
            AccessorData::U8(_) => ComponentKind::U8,
            AccessorData::I16(_) => ComponentKind::I16,
            AccessorData::U16(_) => ComponentKind::U16,
            AccessorData::I32(_) => ComponentKind::I32,
            AccessorData::U32(_) => ComponentKind::U32,
            AccessorData::F32(_) => ComponentKind::F32,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        with_data!(self, v => v.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw native-endian bytes, ready for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        with_data!(self, v => bytemuck::cast_slice(v))
    }

    #[must_use]
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            AccessorData::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Component `i` as a float, applying normalization for integer kinds.
    fn component_f32(&self, i: usize, normalized: bool) -> f32 {
        match self {
            AccessorData::I8(v) if normalized => (f32::from(v[i]) / 127.0).max(-1.0),
            AccessorData::U8(v) if normalized => f32::from(v[i]) / 255.0,
            AccessorData::I16(v) if normalized => (f32::from(v[i]) / 32767.0).max(-1.0),
            AccessorData::U16(v) if normalized => f32::from(v[i]) / 65535.0,
            AccessorData::I8(v) => f32::from(v[i]),
            AccessorData::U8(v) => f32::from(v[i]),
            AccessorData::I16(v) => f32::from(v[i]),
            AccessorData::U16(v) => f32::from(v[i]),
            AccessorData::I32(v) => v[i] as f32,
            AccessorData::U32(v) => v[i] as f32,
            AccessorData::F32(v) => v[i],
        }
    }

    /// Component `i` as an element index, if it is a non-negative integer.
    fn index_at(&self, i: usize) -> Option<usize> {
        match self {
            AccessorData::I8(v) => usize::try_from(v[i]).ok(),
            AccessorData::U8(v) => Some(usize::from(v[i])),
            AccessorData::I16(v) => usize::try_from(v[i]).ok(),
            AccessorData::U16(v) => Some(usize::from(v[i])),
            AccessorData::I32(v) => usize::try_from(v[i]).ok(),
            AccessorData::U32(v) => usize::try_from(v[i]).ok(),
            AccessorData::F32(v) => {
                let x = v[i];
                (x >= 0.0 && x.fract() == 0.0 && x.is_finite()).then_some(x as usize)
            }
        }
    }

    /// Copies `n` components from `src[src_start..]` to `self[dst_start..]`.
    fn overwrite(&mut self, dst_start: usize, src: &AccessorData, src_start: usize, n: usize) -> Result<()> {
        let dst_len = self.len();
        if dst_start + n > dst_len || src_start + n > src.len() {
            return Err(AssetError::malformed(format!(
                "sparse write of {n} components at {dst_start} exceeds array of {dst_len}"
            )));
        }

        macro_rules! copy {
            ($($variant:ident),*) => {
                match (self, src) {
                    $((AccessorData::$variant(dst), AccessorData::$variant(src)) => {
                        dst[dst_start..dst_start + n].copy_from_slice(&src[src_start..src_start + n]);
                        Ok(())
                    })*
                    _ => Err(AssetError::malformed("sparse values differ in component type")),
                }
            };
        }
        copy!(I8, U8, I16, U16, I32, U32, F32)
    }
}

// ============================================================================
// Accessor
// ============================================================================

/// Upper bound on the zero-filled storage of an accessor without a buffer view.
pub const MAX_ZEROED_BYTES: usize = 256 * 1024 * 1024;

/// A decoded, typed, strided view of one attribute or keyframe array.
#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub component_kind: ComponentKind,
    pub shape: AccessorShape,
    pub components_per_element: usize,
    pub element_count: usize,
    pub stride_in_components: usize,
    pub normalized: bool,
    /// At least `(element_count - 1) * stride_in_components + components_per_element` long.
    pub data: AccessorData,
}

impl Accessor {
    /// Decodes one accessor descriptor, applying its sparse overlay.
    pub fn decode(desc: &AccessorDesc, views: &BufferViewTable<'_>) -> Result<Self> {
        let shape: AccessorShape = desc.shape.parse()?;
        let component_kind = ComponentKind::try_from(desc.component_type)?;
        let components_per_element = shape.components();
        let width = component_kind.byte_width();

        if desc.count == 0 {
            return Err(AssetError::malformed("accessor count is zero"));
        }

        let (stride_in_components, mut data) = match desc.buffer_view {
            Some(view_index) => {
                let view = views.get(view_index)?;
                let stride = match view.byte_stride {
                    0 => components_per_element,
                    byte_stride if byte_stride % width == 0 => byte_stride / width,
                    byte_stride => {
                        return Err(AssetError::malformed(format!(
                            "byte stride {byte_stride} is not a multiple of {width}"
                        )));
                    }
                };
                let length = (desc.count - 1)
                    .checked_mul(stride)
                    .and_then(|n| n.checked_add(components_per_element))
                    .ok_or_else(|| AssetError::malformed("accessor length overflows"))?;
                let data = AccessorData::decode(component_kind, view.bytes, desc.byte_offset, length)?;
                (stride, data)
            }
            None => {
                let length = desc
                    .count
                    .checked_mul(components_per_element)
                    .filter(|&n| n.checked_mul(width).is_some_and(|bytes| bytes <= MAX_ZEROED_BYTES))
                    .ok_or_else(|| {
                        AssetError::malformed(format!(
                            "{} {shape:?} elements without a buffer view exceed {MAX_ZEROED_BYTES} bytes",
                            desc.count
                        ))
                    })?;
                (components_per_element, AccessorData::zeroed(component_kind, length))
            }
        };

        if let Some(sparse) = &desc.sparse {
            apply_sparse(&mut data, sparse, component_kind, components_per_element, desc.count, views)?;
        }

        Ok(Self {
            component_kind,
            shape,
            components_per_element,
            element_count: desc.count,
            stride_in_components,
            normalized: desc.normalized,
            data,
        })
    }

    /// Component offset of element `i` in [`Accessor::data`].
    #[inline]
    #[must_use]
    pub fn element_offset(&self, i: usize) -> usize {
        i * self.stride_in_components
    }

    /// All elements as tightly packed floats (stride removed, normalization applied).
    #[must_use]
    pub fn read_f32(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.element_count * self.components_per_element);
        for i in 0..self.element_count {
            let start = self.element_offset(i);
            for c in 0..self.components_per_element {
                out.push(self.data.component_f32(start + c, self.normalized));
            }
        }
        out
    }

    /// Scalar elements as vertex indices.
    pub fn read_indices(&self) -> Result<Vec<u32>> {
        (0..self.element_count)
            .map(|i| {
                self.data
                    .index_at(self.element_offset(i))
                    .and_then(|index| u32::try_from(index).ok())
                    .ok_or_else(|| AssetError::malformed(format!("element {i} is not a valid index")))
            })
            .collect()
    }
}

fn apply_sparse(
    data: &mut AccessorData,
    sparse: &SparseDesc,
    component_kind: ComponentKind,
    components_per_element: usize,
    element_count: usize,
    views: &BufferViewTable<'_>,
) -> Result<()> {
    let index_kind = ComponentKind::try_from(sparse.indices.component_type)?;
    let indices_view = views.get(sparse.indices.buffer_view)?;
    let indices = AccessorData::decode(
        index_kind,
        indices_view.bytes,
        sparse.indices.byte_offset,
        sparse.count,
    )?;

    let values_len = sparse
        .count
        .checked_mul(components_per_element)
        .ok_or_else(|| AssetError::malformed("sparse value count overflows"))?;
    let values_view = views.get(sparse.values.buffer_view)?;
    let values = AccessorData::decode(
        component_kind,
        values_view.bytes,
        sparse.values.byte_offset,
        values_len,
    )?;

    // Declaration order, so a repeated index keeps the later value.
    for entry in 0..sparse.count {
        let index = indices
            .index_at(entry)
            .filter(|&index| index < element_count)
            .ok_or_else(|| {
                AssetError::malformed(format!(
                    "sparse entry {entry} targets an element outside 0..{element_count}"
                ))
            })?;
        data.overwrite(
            index * components_per_element,
            &values,
            entry * components_per_element,
            components_per_element,
        )?;
    }
    Ok(())
}

// ============================================================================
// Accessor table
// ============================================================================

/// Every accessor of a document, decoded once and kept for the whole build.
#[derive(Debug, Default)]
pub struct AccessorTable {
    accessors: Vec<Option<Accessor>>,
}

impl AccessorTable {
    pub fn build(document: &Document, views: &BufferViewTable<'_>, report: &mut LoadReport) -> Self {
        let accessors = document
            .accessors
            .iter()
            .enumerate()
            .map(|(index, desc)| match Accessor::decode(desc, views) {
                Ok(accessor) => Some(accessor),
                Err(err) => {
                    report.record(Stage::Accessor, index, err);
                    None
                }
            })
            .collect();

        Self { accessors }
    }

    pub fn get(&self, index: usize) -> Result<&Accessor> {
        match self.accessors.get(index) {
            Some(Some(accessor)) => Ok(accessor),
            Some(None) => Err(AssetError::malformed(format!("accessor {index} failed to decode"))),
            None => Err(AssetError::malformed(format!(
                "accessor {index} out of range ({} accessors)",
                self.accessors.len()
            ))),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_tags() {
        assert_eq!("MAT2".parse::<AccessorShape>().unwrap().components(), 4);
        assert_eq!("MAT3".parse::<AccessorShape>().unwrap().components(), 9);
        assert!("VEC5".parse::<AccessorShape>().is_err());
    }

    #[test]
    fn component_widths() {
        for (code, width) in [(0x1400, 1), (0x1401, 1), (0x1402, 2), (0x1403, 2), (0x1404, 4), (0x1405, 4), (0x1406, 4)] {
            let kind = ComponentKind::try_from(code).unwrap();
            assert_eq!(kind.byte_width(), width);
            assert_eq!(kind.code(), code);
        }
        assert!(ComponentKind::try_from(0x140A).is_err());
    }

    #[test]
    fn decode_reads_little_endian() {
        let bytes = [0x01, 0x02, 0xFF, 0xFF];
        let data = AccessorData::decode(ComponentKind::U16, &bytes, 0, 2).unwrap();
        assert_eq!(data, AccessorData::U16(vec![0x0201, 0xFFFF]));
        let data = AccessorData::decode(ComponentKind::I16, &bytes, 2, 1).unwrap();
        assert_eq!(data, AccessorData::I16(vec![-1]));
    }

    #[test]
    fn normalized_components() {
        let data = AccessorData::I8(vec![-128, 127]);
        assert_eq!(data.component_f32(0, true), -1.0);
        assert_eq!(data.component_f32(1, true), 1.0);
        let data = AccessorData::U8(vec![255]);
        assert_eq!(data.component_f32(0, true), 1.0);
        assert_eq!(data.component_f32(0, false), 255.0);
    }

    #[test]
    fn float_index_must_be_integral() {
        let data = AccessorData::F32(vec![2.0, 1.5, -1.0]);
        assert_eq!(data.index_at(0), Some(2));
        assert_eq!(data.index_at(1), None);
        assert_eq!(data.index_at(2), None);
    }
}
