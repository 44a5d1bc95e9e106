//! 3D rotation and quantization utilities.
//!
//! Continuous positions are centered on the cube: grid cell `(1, 1, 1)` sits at
//! the origin and neighbouring cells are `pitch` world units apart. Every
//! committed turn goes through a quaternion and then back through
//! [`snap_to_grid`], which is the only way floating-point results re-enter the
//! discrete model.

use std::f64::consts::FRAC_PI_2;

use nalgebra::{Matrix3, Rotation3, Unit, UnitQuaternion, Vector3};

use crate::pieces::Coord;

/// Largest grid index along any axis.
pub const MAX_GRID_INDEX: i32 = 2;

/// One of the three world axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index of this axis (0 = X, 1 = Y, 2 = Z).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Unit vector along the positive direction of this axis.
    pub fn unit(self) -> Unit<Vector3<f64>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }

    /// Returns the component of a grid coordinate along this axis.
    pub const fn component(self, (x, y, z): Coord) -> i32 {
        match self {
            Axis::X => x,
            Axis::Y => y,
            Axis::Z => z,
        }
    }
}

/// One of the six outward directions of the cube.
///
/// Order matches the per-face sticker slots of a cubie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    /// +X
    Right,
    /// -X
    Left,
    /// +Y
    Up,
    /// -Y
    Down,
    /// +Z
    Front,
    /// -Z
    Back,
}

impl Face {
    /// All faces in sticker-slot order.
    pub const ALL: [Face; 6] = [
        Face::Right,
        Face::Left,
        Face::Up,
        Face::Down,
        Face::Front,
        Face::Back,
    ];

    /// Axis perpendicular to this face.
    pub const fn axis(self) -> Axis {
        match self {
            Face::Right | Face::Left => Axis::X,
            Face::Up | Face::Down => Axis::Y,
            Face::Front | Face::Back => Axis::Z,
        }
    }

    /// Whether the outward normal points along the positive axis.
    pub const fn is_positive(self) -> bool {
        matches!(self, Face::Right | Face::Up | Face::Front)
    }

    /// Outward unit normal.
    pub fn normal(self) -> Vector3<f64> {
        let sign = if self.is_positive() { 1.0 } else { -1.0 };
        self.axis().unit().into_inner() * sign
    }

    /// Face whose normal is closest to `normal`, using the dominant component.
    ///
    /// Ties between X and another axis fall through to the later axis, and a
    /// tie between Y and Z resolves to Z.
    pub fn from_normal(normal: &Vector3<f64>) -> Face {
        let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
        if ax > ay && ax > az {
            if normal.x > 0.0 {
                Face::Right
            } else {
                Face::Left
            }
        } else if ay > ax && ay > az {
            if normal.y > 0.0 {
                Face::Up
            } else {
                Face::Down
            }
        } else if normal.z > 0.0 {
            Face::Front
        } else {
            Face::Back
        }
    }
}

/// Rotation by `quarter_turns` × 90° about the positive direction of `axis`.
pub fn quarter_turn(axis: Axis, quarter_turns: i32) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&axis.unit(), f64::from(quarter_turns) * FRAC_PI_2)
}

/// Converts an angle to a whole number of quarter turns.
///
/// Returns `None` if `angle` is not within a small tolerance of a multiple of
/// 90°.
pub fn angle_to_quarter_turns(angle: f64) -> Option<i32> {
    const TOLERANCE: f64 = 1e-9;

    if !angle.is_finite() {
        return None;
    }
    let turns = angle / FRAC_PI_2;
    let rounded = turns.round();
    ((turns - rounded).abs() <= TOLERANCE).then_some(rounded as i32)
}

/// Center of grid cell `coord` in world space.
pub fn world_position((x, y, z): Coord, pitch: f64) -> Vector3<f64> {
    Vector3::new(
        f64::from(x - 1) * pitch,
        f64::from(y - 1) * pitch,
        f64::from(z - 1) * pitch,
    )
}

/// Rounds a continuous world position to the nearest grid cell.
///
/// Each axis is clamped to `0..=2` so numerical drift can never produce an
/// out-of-range coordinate.
pub fn snap_to_grid(position: &Vector3<f64>, pitch: f64) -> Coord {
    let snap = |value: f64| ((value / pitch).round() as i32 + 1).clamp(0, MAX_GRID_INDEX);
    (snap(position.x), snap(position.y), snap(position.z))
}

/// Re-quantizes an accumulated orientation onto the 24 axis-aligned rotations.
///
/// Products of many quarter-turn quaternions drift; rounding the rotation
/// matrix entries to -1, 0 or 1 removes that drift. Orientations that are not
/// close to an axis-aligned rotation are returned renormalized instead.
pub fn snap_orientation(orientation: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    let matrix = orientation.to_rotation_matrix().into_inner();
    let rounded: Matrix3<f64> = matrix.map(f64::round);

    // a signed permutation matrix has exactly one nonzero entry per row
    let one_per_row = rounded
        .row_iter()
        .all(|row| row.iter().filter(|entry| **entry != 0.0).count() == 1);
    let is_signed_permutation = one_per_row && (rounded.determinant() - 1.0).abs() < 1e-9;

    if is_signed_permutation {
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rounded))
    } else {
        UnitQuaternion::new_normalize(orientation.into_inner())
    }
}

/// Whether two orientations are equal up to floating-point noise.
pub fn orientations_match(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>) -> bool {
    a.angle_to(b) < 1e-6
}
