//! Transform helpers on top of `glam`.
//!
//! Conventions: right-handed, column vectors (`M * v`), clip-space depth in
//! `[0, 1]` as wgpu expects.

use glam::{Mat3, Mat4, Vec3};

#[inline]
pub fn make_identity() -> Mat4 {
    Mat4::IDENTITY
}

#[inline]
pub fn make_translate(v: Vec3) -> Mat4 {
    Mat4::from_translation(v)
}

#[inline]
pub fn make_scale(v: Vec3) -> Mat4 {
    Mat4::from_scale(v)
}

#[inline]
pub fn make_x_rotate(angle_radians: f32) -> Mat4 {
    Mat4::from_rotation_x(angle_radians)
}

#[inline]
pub fn make_y_rotate(angle_radians: f32) -> Mat4 {
    Mat4::from_rotation_y(angle_radians)
}

#[inline]
pub fn make_z_rotate(angle_radians: f32) -> Mat4 {
    Mat4::from_rotation_z(angle_radians)
}

/// Right-handed perspective projection mapping `[near, far]` to depth `[0, 1]`.
#[inline]
pub fn make_perspective(fov_radians: f32, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_radians, aspect, z_near, z_far)
}

/// Upper-left 3×3 of `m`, used as the normal transform.
///
/// Only valid as a normal matrix for transforms without non-uniform scale.
#[inline]
pub fn discard_translation(m: Mat4) -> Mat3 {
    Mat3::from_mat4(m)
}
