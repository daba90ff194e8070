use std::ops::Mul;

use cavesync_serde::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

use super::vec3::Vec3;

/// A column-major 4x4 matrix, laid out the way OpenGL consumes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    /// `cols[column][row]`
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub const fn from_cols(cols: [[f32; 4]; 4]) -> Self {
        Self { cols }
    }

    pub fn from_translation(v: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [v.x, v.y, v.z, 1.0];
        m
    }

    /// Rotation taking world coordinates into the frame spanned by the three
    /// orthonormal axes (the axes become the matrix rows).
    pub fn from_basis_rows(x: Vec3, y: Vec3, z: Vec3) -> Self {
        Self::from_cols([
            [x.x, y.x, z.x, 0.0],
            [x.y, y.y, z.y, 0.0],
            [x.z, y.z, z.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Off-center perspective frustum (OpenGL `glFrustum` convention,
    /// clip space depth in [-1, 1]).
    pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rml = right - left;
        let tmb = top - bottom;
        let fmn = far - near;

        Self::from_cols([
            [2.0 * near / rml, 0.0, 0.0, 0.0],
            [0.0, 2.0 * near / tmb, 0.0, 0.0],
            [
                (right + left) / rml,
                (top + bottom) / tmb,
                -(far + near) / fmn,
                -1.0,
            ],
            [0.0, 0.0, -2.0 * far * near / fmn, 0.0],
        ])
    }

    pub fn transpose(&self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for (c, col) in self.cols.iter().enumerate() {
            for (r, value) in col.iter().enumerate() {
                out[r][c] = *value;
            }
        }
        Self::from_cols(out)
    }

    /// Position of the transform's origin
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.cols[3][0], self.cols[3][1], self.cols[3][2])
    }

    /// Transforms a direction (ignores translation)
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let c = &self.cols;
        Vec3::new(
            c[0][0] * v.x + c[1][0] * v.y + c[2][0] * v.z,
            c[0][1] * v.x + c[1][1] * v.y + c[2][1] * v.z,
            c[0][2] * v.x + c[1][2] * v.y + c[2][2] * v.z,
        )
    }

    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        self.transform_vector(v) + self.translation()
    }

    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for (c, out_col) in out.iter_mut().enumerate() {
            for (r, value) in out_col.iter_mut().enumerate() {
                *value = (0..4).map(|k| self.cols[k][r] * rhs.cols[c][k]).sum();
            }
        }
        Self::from_cols(out)
    }
}

impl Serde for Mat4 {
    fn ser(&self, writer: &mut ByteWriter) {
        self.cols.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self::from_cols(<[[f32; 4]; 4]>::de(reader)?))
    }

    fn byte_length(&self) -> usize {
        Self::const_byte_length()
    }
}

impl ConstByteLength for Mat4 {
    fn const_byte_length() -> usize {
        <[[f32; 4]; 4]>::const_byte_length()
    }
}
