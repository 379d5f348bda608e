use std::ops::{Add, Mul, Sub};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// A 4x4 transform matrix stored as 16 floats in column-major order.
///
/// Element `(row, col)` lives at `col * 4 + row`, so the translation of an
/// affine matrix occupies elements 12, 13 and 14. This is the layout used by
/// the interchange format for node matrices and inverse bind matrices, and it
/// is `Pod` so joint palettes can be uploaded with `bytemuck::cast_slice`.
///
/// Matrices act on column vectors: `a * b` applies `b` first, then `a`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Matrix4(pub [f32; 16]);

impl Matrix4 {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Builds a matrix from a slice of at least 16 floats.
    ///
    /// Returns `None` when the slice is too short.
    #[must_use]
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        let array: [f32; 16] = values.get(..16)?.try_into().ok()?;
        Some(Self(array))
    }

    #[inline]
    #[must_use]
    pub const fn to_cols_array(&self) -> [f32; 16] {
        self.0
    }

    /// Index of element `(x = column, y = row)` in column-major storage.
    #[inline]
    #[must_use]
    pub const fn index(x: usize, y: usize) -> usize {
        (x << 2) + y
    }

    /// Standard 4x4 product. The result applies `b` first, then `self`.
    #[must_use]
    pub fn multiply(&self, b: &Self) -> Self {
        let [a0, a1, a2, a3, a4, a5, a6, a7, a8, a9, aa, ab, ac, ad, ae, af] = self.0;
        let [b0, b1, b2, b3, b4, b5, b6, b7, b8, b9, ba, bb, bc, bd, be, bf] = b.0;
        Self([
            a0 * b0 + a4 * b1 + a8 * b2 + ac * b3,
            a1 * b0 + a5 * b1 + a9 * b2 + ad * b3,
            a2 * b0 + a6 * b1 + aa * b2 + ae * b3,
            a3 * b0 + a7 * b1 + ab * b2 + af * b3,
            a0 * b4 + a4 * b5 + a8 * b6 + ac * b7,
            a1 * b4 + a5 * b5 + a9 * b6 + ad * b7,
            a2 * b4 + a6 * b5 + aa * b6 + ae * b7,
            a3 * b4 + a7 * b5 + ab * b6 + af * b7,
            a0 * b8 + a4 * b9 + a8 * ba + ac * bb,
            a1 * b8 + a5 * b9 + a9 * ba + ad * bb,
            a2 * b8 + a6 * b9 + aa * ba + ae * bb,
            a3 * b8 + a7 * b9 + ab * ba + af * bb,
            a0 * bc + a4 * bd + a8 * be + ac * bf,
            a1 * bc + a5 * bd + a9 * be + ad * bf,
            a2 * bc + a6 * bd + aa * be + ae * bf,
            a3 * bc + a7 * bd + ab * be + af * bf,
        ])
    }

    /// Inverse by in-place Gauss-Jordan elimination without pivoting.
    ///
    /// A singular matrix (or one with a zero leading pivot) yields
    /// non-finite elements; the caller must not pass one.
    #[must_use]
    pub fn invert(&self) -> Self {
        let [m0, mut m1, mut m2, mut m3, m4, mut m5, mut m6, mut m7, m8, mut m9, mut ma, mut mb, mc, mut md, mut me, mut mf] =
            self.0;

        let mut r0 = 1.0 / m0;
        m1 *= r0;
        m2 *= r0;
        m3 *= r0;
        m5 -= m1 * m4;
        m6 -= m2 * m4;
        m7 -= m3 * m4;
        let mut r4 = -r0 * m4;
        m9 -= m1 * m8;
        ma -= m2 * m8;
        mb -= m3 * m8;
        let mut r8 = -r0 * m8;
        md -= m1 * mc;
        me -= m2 * mc;
        mf -= m3 * mc;
        let mut rc = -r0 * mc;

        let mut r5 = 1.0 / m5;
        m6 *= r5;
        m7 *= r5;
        r4 *= r5;
        m2 -= m6 * m1;
        m3 -= m7 * m1;
        r0 -= r4 * m1;
        let mut r1 = -r5 * m1;
        ma -= m6 * m9;
        mb -= m7 * m9;
        r8 -= r4 * m9;
        let mut r9 = -r5 * m9;
        me -= m6 * md;
        mf -= m7 * md;
        rc -= r4 * md;
        let mut rd = -r5 * md;

        let mut ra = 1.0 / ma;
        mb *= ra;
        r8 *= ra;
        r9 *= ra;
        m3 -= mb * m2;
        r0 -= r8 * m2;
        r1 -= r9 * m2;
        let mut r2 = -ra * m2;
        m7 -= mb * m6;
        r4 -= r8 * m6;
        r5 -= r9 * m6;
        let mut r6 = -ra * m6;
        mf -= mb * me;
        rc -= r8 * me;
        rd -= r9 * me;
        let mut re = -ra * me;

        let rf = 1.0 / mf;
        rc *= rf;
        rd *= rf;
        re *= rf;
        r0 -= rc * m3;
        r1 -= rd * m3;
        r2 -= re * m3;
        let r3 = -rf * m3;
        r4 -= rc * m7;
        r5 -= rd * m7;
        r6 -= re * m7;
        let r7 = -rf * m7;
        r8 -= rc * mb;
        r9 -= rd * mb;
        ra -= re * mb;
        let rb = -rf * mb;

        Self([
            r0, r1, r2, r3, //
            r4, r5, r6, r7, //
            r8, r9, ra, rb, //
            rc, rd, re, rf,
        ])
    }

    #[must_use]
    pub fn transpose(&self) -> Self {
        let [m0, m1, m2, m3, m4, m5, m6, m7, m8, m9, ma, mb, mc, md, me, mf] = self.0;
        Self([
            m0, m4, m8, mc, //
            m1, m5, m9, md, //
            m2, m6, ma, me, //
            m3, m7, mb, mf,
        ])
    }

    /// Rotation matrix of a unit quaternion `[x, y, z, w]`.
    ///
    /// The quaternion is not normalized here.
    #[must_use]
    pub fn from_rotation(q: Quat) -> Self {
        let (x, y, z, s) = (q.x, q.y, q.z, q.w);
        Self([
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y + s * z),
            2.0 * (x * z - s * y),
            0.0,
            2.0 * (x * y - s * z),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z + s * x),
            0.0,
            2.0 * (x * z + s * y),
            2.0 * (y * z - s * x),
            1.0 - 2.0 * (x * x + y * y),
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }

    #[must_use]
    pub fn from_translation(c: Vec3) -> Self {
        Self([
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            c.x, c.y, c.z, 1.0,
        ])
    }

    #[must_use]
    pub fn from_scale(c: Vec3) -> Self {
        Self([
            c.x, 0.0, 0.0, 0.0, //
            0.0, c.y, 0.0, 0.0, //
            0.0, 0.0, c.z, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// `T * R * S`, the local matrix of a node given as components.
    #[must_use]
    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self::from_translation(translation)
            .multiply(&Self::from_rotation(rotation))
            .multiply(&Self::from_scale(scale))
    }

    /// Largest absolute element-wise difference to `other`.
    #[must_use]
    pub fn max_abs_diff(&self, other: &Self) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    #[inline]
    fn mul(self, rhs: Matrix4) -> Matrix4 {
        self.multiply(&rhs)
    }
}

impl Add for Matrix4 {
    type Output = Matrix4;

    fn add(self, rhs: Matrix4) -> Matrix4 {
        Matrix4(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl Sub for Matrix4 {
    type Output = Matrix4;

    fn sub(self, rhs: Matrix4) -> Matrix4 {
        Matrix4(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}

impl From<Mat4> for Matrix4 {
    fn from(m: Mat4) -> Self {
        Self(m.to_cols_array())
    }
}

impl From<Matrix4> for Mat4 {
    fn from(m: Matrix4) -> Self {
        Mat4::from_cols_array(&m.0)
    }
}
