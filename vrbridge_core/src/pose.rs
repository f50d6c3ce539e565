//! Pose conversion between runtime transform matrices and position + quaternion
//!
//! VR runtimes report each tracked device as a 3x4 row-major matrix: the left
//! 3x3 block is the rotation and the last column is the translation. The
//! bridge publishes position + unit quaternion in `(x, y, z, w)` order.
//!
//! A quaternion and its negation describe the same rotation. The conversion
//! keeps whatever sign the closed-form extraction yields and never flips it
//! to a canonical hemisphere.

use nalgebra::{Matrix3, Quaternion, Rotation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// 3 rows x 4 columns, row-major, as reported by the VR runtime
pub type Matrix34 = [[f32; 4]; 3];

/// Identity transform (no rotation, origin)
pub const IDENTITY_MATRIX34: Matrix34 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
];

/// One device slot as reported by a single runtime query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    /// Device-to-tracking-space transform
    pub matrix: Matrix34,
    /// Whether the runtime trusts this transform for the current frame
    pub valid: bool,
}

impl PoseSample {
    pub fn new(matrix: Matrix34, valid: bool) -> Self {
        Self { matrix, valid }
    }

    /// A slot with no usable tracking data
    pub fn invalid() -> Self {
        Self {
            matrix: IDENTITY_MATRIX34,
            valid: false,
        }
    }

    /// Convert to a pose, or `None` when the sample must not be trusted
    pub fn to_pose(&self) -> Option<Pose> {
        self.valid.then(|| matrix34_to_pose(&self.matrix))
    }
}

impl Default for PoseSample {
    fn default() -> Self {
        Self::invalid()
    }
}

/// Position and orientation of a tracked device at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation in meters `[x, y, z]`
    pub position: [f64; 3],
    /// Unit quaternion `[x, y, z, w]`
    pub orientation: [f64; 4],
}

impl Pose {
    pub fn new(position: [f64; 3], orientation: [f64; 4]) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn identity() -> Self {
        Self::new([0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0])
    }

    /// Euclidean norm of the orientation quaternion
    pub fn orientation_norm(&self) -> f64 {
        self.orientation.iter().map(|c| c * c).sum::<f64>().sqrt()
    }

    /// True when both poses describe the same rotation, treating q and -q as equal
    pub fn same_rotation(&self, other: &Pose, epsilon: f64) -> bool {
        let dot: f64 = self
            .orientation
            .iter()
            .zip(other.orientation.iter())
            .map(|(a, b)| a * b)
            .sum();
        (dot.abs() - 1.0).abs() <= epsilon
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Convert a 3x4 rigid transform into position + unit quaternion.
///
/// The input is not checked for orthonormality. The quaternion is
/// renormalised so that the `f32` noise of runtime matrices does not leak
/// into the published orientation.
pub fn matrix34_to_pose(matrix: &Matrix34) -> Pose {
    let m = |r: usize, c: usize| matrix[r][c] as f64;

    #[rustfmt::skip]
    let rotation = Rotation3::from_matrix_unchecked(Matrix3::new(
        m(0, 0), m(0, 1), m(0, 2),
        m(1, 0), m(1, 1), m(1, 2),
        m(2, 0), m(2, 1), m(2, 2),
    ));
    let extracted = UnitQuaternion::from_rotation_matrix(&rotation);
    let q = UnitQuaternion::new_normalize(extracted.into_inner()).into_inner();

    Pose {
        position: [m(0, 3), m(1, 3), m(2, 3)],
        orientation: [q.coords.x, q.coords.y, q.coords.z, q.coords.w],
    }
}

/// Rebuild the 3x4 transform for a pose
pub fn pose_to_matrix34(pose: &Pose) -> Matrix34 {
    let [x, y, z, w] = pose.orientation;
    let rotation =
        UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)).to_rotation_matrix();
    let r = rotation.matrix();

    let mut out = [[0.0f32; 4]; 3];
    for (row, out_row) in out.iter_mut().enumerate() {
        for col in 0..3 {
            out_row[col] = r[(row, col)] as f32;
        }
        out_row[3] = pose.position[row] as f32;
    }
    out
}
