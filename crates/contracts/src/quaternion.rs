//! Quaternion value type
//!
//! Hamilton convention, stored as `(x, y, z, w)` to match the pose record
//! layout. Arithmetic is delegated to nalgebra; only the operations the
//! alignment pipeline needs are exposed.

use std::ops::{Mul, Neg};

use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::AlignError;

/// Below this norm a quaternion cannot be normalized.
const MIN_NORM: f64 = 1e-12;

/// Half-angle sine under which slerp falls back to normalized lerp.
const SLERP_EPSILON: f64 = 1e-9;

/// Quaternion `x·i + y·j + z·k + w`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    /// Create a quaternion from raw components (not normalized)
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Identity rotation
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Rotation of `angle` radians about `axis`
    ///
    /// A zero axis yields the identity.
    pub fn from_axis_angle(axis: Vector3<f64>, angle: f64) -> Self {
        match Unit::try_new(axis, MIN_NORM) {
            Some(axis) => UnitQuaternion::from_axis_angle(&axis, angle).into(),
            None => Self::identity(),
        }
    }

    /// Vector (imaginary) part
    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn norm(&self) -> f64 {
        self.raw().norm()
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.raw().dot(&other.raw())
    }

    /// Unit-norm copy
    ///
    /// # Errors
    /// `MalformedInput` when the norm is zero or any component is not finite.
    pub fn normalized(&self) -> Result<Self, AlignError> {
        let norm = self.norm();
        if !norm.is_finite() || norm < MIN_NORM {
            return Err(AlignError::malformed(format!(
                "quaternion ({}, {}, {}, {}) cannot be normalized (norm = {norm})",
                self.x, self.y, self.z, self.w
            )));
        }
        Ok(self.raw().normalize().into())
    }

    pub fn conjugate(&self) -> Self {
        self.raw().conjugate().into()
    }

    /// Multiplicative inverse; equals the conjugate for unit quaternions
    pub fn inverse(&self) -> Result<Self, AlignError> {
        let norm_sq = self.raw().norm_squared();
        if !norm_sq.is_finite() || norm_sq < MIN_NORM * MIN_NORM {
            return Err(AlignError::malformed("quaternion with zero norm has no inverse"));
        }
        self.raw()
            .try_inverse()
            .map(Self::from)
            .ok_or_else(|| AlignError::malformed("quaternion with zero norm has no inverse"))
    }

    /// Shortest rotation angle (radians, in `[0, π]`) taking `self` to `other`
    ///
    /// Both inputs are assumed to be unit quaternions. Uses `atan2` on the
    /// relative rotation so tiny angles keep full precision.
    pub fn angle_to(&self, other: &Self) -> f64 {
        let relative = self.raw().conjugate() * other.raw();
        2.0 * relative.imag().norm().atan2(relative.w.abs())
    }

    /// Shortest-arc spherical interpolation, `t` in `[0, 1]`
    ///
    /// nalgebra flips the sign of `other` when needed so the path never takes
    /// the long way round; `q` and `-q` therefore interpolate to a constant.
    pub fn slerp(&self, other: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let (start, end) = (self.to_unit(), other.to_unit());
        match start.try_slerp(&end, t, SLERP_EPSILON) {
            Some(q) => q.into(),
            None => {
                // Nearly parallel: normalized lerp on the same hemisphere
                let end = if start.dot(&end) < 0.0 {
                    -end.into_inner()
                } else {
                    end.into_inner()
                };
                start.into_inner().lerp(&end, t).normalize().into()
            }
        }
    }

    /// Rotate a vector by this (unit) quaternion
    pub fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.to_unit().transform_vector(v)
    }

    /// Convert to nalgebra's unit quaternion (renormalizes)
    pub fn to_unit(&self) -> UnitQuaternion<f64> {
        Unit::new_normalize(self.raw())
    }

    fn raw(&self) -> nalgebra::Quaternion<f64> {
        nalgebra::Quaternion::new(self.w, self.x, self.y, self.z)
    }
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product
    fn mul(self, rhs: Self) -> Self {
        (self.raw() * rhs.raw()).into()
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl From<nalgebra::Quaternion<f64>> for Quaternion {
    fn from(q: nalgebra::Quaternion<f64>) -> Self {
        Self::new(q.i, q.j, q.k, q.w)
    }
}

impl From<UnitQuaternion<f64>> for Quaternion {
    fn from(q: UnitQuaternion<f64>) -> Self {
        q.into_inner().into()
    }
}
