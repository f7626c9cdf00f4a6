//! Blending of skeletal joint transforms
//!
//! Joint transforms are treated as rotation plus translation only. Any scale
//! in an input matrix is divided out before the rotation is extracted and is
//! not carried into the result.

use nalgebra::{Rotation3, UnitQuaternion};
use nalgebra_glm as glm;

/// Below this the slerp angle is considered ambiguous and a normalized lerp
/// is used instead
const SLERP_EPSILON: f32 = 1.0e-6;

/// Columns shorter than this are left alone when removing scale
const SCALE_EPSILON: f32 = 1.0e-8;

/// Splits a transform into its rotation and translation
#[must_use]
pub fn decompose(m: &glm::Mat4) -> (glm::Quat, glm::Vec3) {
    let mut m3 = glm::mat4_to_mat3(m);
    for mut column in m3.column_iter_mut() {
        let length = column.norm();
        if length > SCALE_EPSILON {
            column /= length;
        }
    }
    let rotation = UnitQuaternion::from_rotation_matrix(
        &Rotation3::from_matrix(&m3), //
    );
    (rotation.into_inner(), translation(m))
}

/// Builds a transform that rotates then translates
#[must_use]
pub fn compose(rotation: &glm::Quat, translation: &glm::Vec3) -> glm::Mat4 {
    glm::translation(translation) * glm::quat_to_mat4(rotation)
}

/// Translation part of a transform
#[must_use]
pub fn translation(m: &glm::Mat4) -> glm::Vec3 {
    glm::vec3(m.m14, m.m24, m.m34)
}

/// Spherical interpolation along the shortest arc. Inputs do not need to be
/// normalized. Nearly identical rotations fall back to a normalized lerp so
/// this never fails.
#[must_use]
pub fn slerp(a: &glm::Quat, b: &glm::Quat, t: f32) -> glm::Quat {
    let qa = UnitQuaternion::new_normalize(*a);
    let mut qb = UnitQuaternion::new_normalize(*b);
    if qa.coords.dot(&qb.coords) < 0.0 {
        // Same rotation, other hemisphere
        qb = UnitQuaternion::new_unchecked(-qb.into_inner());
    }
    qa.try_slerp(&qb, t, SLERP_EPSILON)
        .unwrap_or_else(|| qa.nlerp(&qb, t))
        .into_inner()
}

/// Blends two joint transforms. Rotation uses shortest arc slerp, translation
/// is linear. `t` is clamped to [0, 1].
#[must_use]
pub fn blend(a: &glm::Mat4, b: &glm::Mat4, t: f32) -> glm::Mat4 {
    let t = t.clamp(0.0, 1.0);
    let (ra, ta) = decompose(a);
    let (rb, tb) = decompose(b);
    compose(&slerp(&ra, &rb, t), &glm::lerp(&ta, &tb, t))
}

/// Transforms a 3D position using a 4x4 matrix
#[must_use]
pub fn transform_point(position: &glm::Vec3, matrix: &glm::Mat4) -> glm::Vec3 {
    let v = matrix * glm::vec4(position.x, position.y, position.z, 1.0f32);
    glm::vec3(v.x, v.y, v.z)
}
