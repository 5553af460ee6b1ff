//! Sound-field rotation for head tracking.
//!
//! Rotates an ACN/SN3D Ambisonic mix by a unit quaternion. Real
//! spherical-harmonic rotation matrices are built per degree with the
//! Ivanic-Ruedenberg recurrence; the degree-1 matrix comes straight from the
//! 3x3 rotation matrix with the (y, z, x) axis permutation. Rotation changes
//! smaller than a quantization threshold are treated as static; larger
//! changes are interpolated across the buffer in fixed-size chunks to avoid
//! zipper artifacts.

use ambra_core::num_ambisonic_channels;

use crate::buffer::AudioBuffer;
use crate::simd;

/// Rotation differences below this angle (radians) do not trigger a matrix
/// update.
pub const ROTATION_QUANTIZATION_RAD: f32 = 1e-3;

/// Frames per interpolation step while the rotation is in motion.
const SLERP_FRAME_INTERVAL: usize = 32;

/// Unit quaternion (w, x, y, z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// Quaternion for a rotation of `angle_rad` about the (unit) axis.
    pub fn from_axis_angle(axis: [f32; 3], angle_rad: f32) -> Self {
        let half = 0.5 * angle_rad;
        let s = half.sin();
        Self {
            w: half.cos(),
            x: axis[0] * s,
            y: axis[1] * s,
            z: axis[2] * s,
        }
    }

    pub fn normalized(self) -> Self {
        let norm = (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if norm <= f32::EPSILON {
            return Self::IDENTITY;
        }
        Self {
            w: self.w / norm,
            x: self.x / norm,
            y: self.y / norm,
            z: self.z / norm,
        }
    }

    fn dot(self, other: Self) -> f32 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Angle of the relative rotation between two unit quaternions.
    pub fn angular_difference(self, other: Self) -> f32 {
        2.0 * self.dot(other).abs().clamp(0.0, 1.0).acos()
    }

    /// Spherical linear interpolation from `self` to `other`.
    pub fn slerp(self, other: Self, t: f32) -> Self {
        let mut cos_half = self.dot(other);
        // Take the short arc.
        let other = if cos_half < 0.0 {
            cos_half = -cos_half;
            Self::new(-other.w, -other.x, -other.y, -other.z)
        } else {
            other
        };
        if cos_half > 1.0 - 1e-6 {
            // Nearly parallel: fall back to nlerp.
            return Self::new(
                self.w + t * (other.w - self.w),
                self.x + t * (other.x - self.x),
                self.y + t * (other.y - self.y),
                self.z + t * (other.z - self.z),
            )
            .normalized();
        }
        let half_angle = cos_half.clamp(-1.0, 1.0).acos();
        let sin_half = half_angle.sin();
        let a = ((1.0 - t) * half_angle).sin() / sin_half;
        let b = (t * half_angle).sin() / sin_half;
        Self::new(
            a * self.w + b * other.w,
            a * self.x + b * other.x,
            a * self.y + b * other.y,
            a * self.z + b * other.z,
        )
    }

    /// Row-major 3x3 rotation matrix, axes ordered (x, y, z).
    fn rotation_matrix(self) -> [[f32; 3]; 3] {
        let Self { w, x, y, z } = self.normalized();
        [
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - w * z),
                2.0 * (x * z + w * y),
            ],
            [
                2.0 * (x * y + w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - w * x),
            ],
            [
                2.0 * (x * z - w * y),
                2.0 * (y * z + w * x),
                1.0 - 2.0 * (x * x + y * y),
            ],
        ]
    }
}

pub struct SoundFieldRotator {
    ambisonic_order: usize,
    /// Rotation currently baked into `band_matrices`.
    current_rotation: Quaternion,
    /// Per-degree rotation matrix, row major, (2l+1) x (2l+1) for degree l.
    band_matrices: Vec<Vec<f32>>,
    /// Rotated-rows scratch for the widest band.
    scratch: AudioBuffer,
}

impl SoundFieldRotator {
    pub fn new(ambisonic_order: usize, frames_per_buffer: usize) -> Self {
        assert!(ambisonic_order > 0);
        let band_matrices = (0..=ambisonic_order)
            .map(|degree| {
                let size = 2 * degree + 1;
                let mut matrix = vec![0.0; size * size];
                for i in 0..size {
                    matrix[i * size + i] = 1.0;
                }
                matrix
            })
            .collect();
        Self {
            ambisonic_order,
            current_rotation: Quaternion::IDENTITY,
            band_matrices,
            scratch: AudioBuffer::new(2 * ambisonic_order + 1, frames_per_buffer),
        }
    }

    /// Rotates the mix bus in place toward `target`. Returns false when both
    /// the applied and target rotations sit within the quantization threshold
    /// of identity and the buffer is left untouched.
    pub fn process(&mut self, target: Quaternion, buffer: &mut AudioBuffer) -> bool {
        assert_eq!(
            buffer.num_channels(),
            num_ambisonic_channels(self.ambisonic_order)
        );
        let target = target.normalized();

        if self.current_rotation.angular_difference(Quaternion::IDENTITY)
            < ROTATION_QUANTIZATION_RAD
            && target.angular_difference(Quaternion::IDENTITY) < ROTATION_QUANTIZATION_RAD
        {
            return false;
        }

        let num_frames = buffer.num_frames();
        if self.current_rotation.angular_difference(target) < ROTATION_QUANTIZATION_RAD {
            self.apply(buffer, 0, num_frames);
            return true;
        }

        // Interpolate toward the target across the buffer in fixed chunks.
        let num_chunks = num_frames.div_ceil(SLERP_FRAME_INTERVAL).max(1);
        let start = self.current_rotation;
        for chunk in 0..num_chunks {
            let t = (chunk + 1) as f32 / num_chunks as f32;
            self.update_band_matrices(start.slerp(target, t));
            let begin = chunk * SLERP_FRAME_INTERVAL;
            let end = (begin + SLERP_FRAME_INTERVAL).min(num_frames);
            self.apply(buffer, begin, end);
        }
        self.current_rotation = target;
        true
    }

    /// Rebuilds every per-degree matrix for `rotation`.
    fn update_band_matrices(&mut self, rotation: Quaternion) {
        let r = rotation.rotation_matrix();
        // Degree 1 in ACN order (m = -1, 0, 1) maps to the axes (y, z, x).
        let band_1 = &mut self.band_matrices[1];
        band_1[0] = r[1][1];
        band_1[1] = r[1][2];
        band_1[2] = r[1][0];
        band_1[3] = r[2][1];
        band_1[4] = r[2][2];
        band_1[5] = r[2][0];
        band_1[6] = r[0][1];
        band_1[7] = r[0][2];
        band_1[8] = r[0][0];

        for degree in 2..=self.ambisonic_order {
            self.compute_band(degree);
        }
        self.current_rotation = rotation;
    }

    /// Ivanic-Ruedenberg recurrence: the degree-l matrix from degrees 1 and
    /// l-1.
    fn compute_band(&mut self, degree: usize) {
        let l = degree as i32;
        let mut matrix = std::mem::take(&mut self.band_matrices[degree]);
        for m in -l..=l {
            for n in -l..=l {
                let d = if m == 0 { 1.0f32 } else { 0.0 };
                let denom = if n.abs() == l {
                    (2 * l * (2 * l - 1)) as f32
                } else {
                    ((l + n) * (l - n)) as f32
                };
                let mut u = (((l + m) * (l - m)) as f32 / denom).sqrt();
                let mut v = 0.5
                    * (((1.0 + d) * ((l + m.abs() - 1) * (l + m.abs())) as f32) / denom).sqrt()
                    * (1.0 - 2.0 * d);
                let mut w = -0.5
                    * ((((l - m.abs() - 1) * (l - m.abs())) as f32) / denom).sqrt()
                    * (1.0 - d);
                if u != 0.0 {
                    u *= self.term_u(m, n, l);
                }
                if v != 0.0 {
                    v *= self.term_v(m, n, l);
                }
                if w != 0.0 {
                    w *= self.term_w(m, n, l);
                }
                let size = 2 * degree + 1;
                matrix[((m + l) as usize) * size + (n + l) as usize] = u + v + w;
            }
        }
        self.band_matrices[degree] = matrix;
    }

    /// Centered element of a band matrix: indices in [-l, l].
    #[inline]
    fn band_element(&self, degree: i32, row: i32, column: i32) -> f32 {
        let size = (2 * degree + 1) as usize;
        self.band_matrices[degree as usize][((row + degree) as usize) * size
            + (column + degree) as usize]
    }

    fn term_p(&self, i: i32, a: i32, b: i32, l: i32) -> f32 {
        if b == l {
            self.band_element(1, i, 1) * self.band_element(l - 1, a, l - 1)
                - self.band_element(1, i, -1) * self.band_element(l - 1, a, -l + 1)
        } else if b == -l {
            self.band_element(1, i, 1) * self.band_element(l - 1, a, -l + 1)
                + self.band_element(1, i, -1) * self.band_element(l - 1, a, l - 1)
        } else {
            self.band_element(1, i, 0) * self.band_element(l - 1, a, b)
        }
    }

    fn term_u(&self, m: i32, n: i32, l: i32) -> f32 {
        self.term_p(0, m, n, l)
    }

    fn term_v(&self, m: i32, n: i32, l: i32) -> f32 {
        if m == 0 {
            self.term_p(1, 1, n, l) + self.term_p(-1, -1, n, l)
        } else if m > 0 {
            let d = if m == 1 { 1.0f32 } else { 0.0 };
            self.term_p(1, m - 1, n, l) * (1.0 + d).sqrt()
                - self.term_p(-1, -m + 1, n, l) * (1.0 - d)
        } else {
            let d = if m == -1 { 1.0f32 } else { 0.0 };
            self.term_p(1, m + 1, n, l) * (1.0 - d)
                + self.term_p(-1, -m - 1, n, l) * (1.0 + d).sqrt()
        }
    }

    fn term_w(&self, m: i32, n: i32, l: i32) -> f32 {
        if m == 0 {
            0.0
        } else if m > 0 {
            self.term_p(1, m + 1, n, l) + self.term_p(-1, -m - 1, n, l)
        } else {
            self.term_p(1, m - 1, n, l) - self.term_p(-1, -m + 1, n, l)
        }
    }

    /// Applies the baked matrices to frames [begin, end) of the buffer.
    /// Degree 0 is rotation invariant and left alone.
    fn apply(&mut self, buffer: &mut AudioBuffer, begin: usize, end: usize) {
        for degree in 1..=self.ambisonic_order {
            let size = 2 * degree + 1;
            let base = degree * degree;
            for row in 0..size {
                let scratch_row = &mut self.scratch.channel_mut(row)[begin..end];
                scratch_row.fill(0.0);
                for column in 0..size {
                    let weight = self.band_matrices[degree][row * size + column];
                    if weight != 0.0 {
                        simd::scalar_multiply_and_accumulate(
                            weight,
                            &buffer.channel(base + column)[begin..end],
                            scratch_row,
                        );
                    }
                }
            }
            for row in 0..size {
                buffer.channel_mut(base + row)[begin..end]
                    .copy_from_slice(&self.scratch.channel(row)[begin..end]);
            }
        }
    }
}
