//! Per-frame animation state and the pure producers of per-frame GPU records.
//!
//! Everything here is CPU-only and deterministic: the same `AnimationState`
//! always yields bit-identical instance, light and camera records.

use std::f32::consts::PI;

use bytemuck::Zeroable;
use glam::{Mat4, Vec3};

use super::math;
use super::shader_types::{CameraData, InstanceData, LightData};

pub const INSTANCE_ROWS: usize = 10;
pub const INSTANCE_COLUMNS: usize = 10;
pub const INSTANCE_DEPTH: usize = 10;
pub const NUM_INSTANCES: usize = INSTANCE_ROWS * INSTANCE_COLUMNS * INSTANCE_DEPTH;

/// Seconds added to the animation clock per drawn frame.
pub const TIME_STEP: f32 = 0.016;
/// Radians added to the global wobble angle per drawn frame.
pub const ANGLE_STEP: f32 = 0.002;

const INSTANCE_SCALE: f32 = 0.2;
const OBJECT_POSITION: Vec3 = Vec3::new(0.0, 0.0, -10.0);

const LIGHT_ORBIT_RADIUS: f32 = 5.0;
const LIGHT_HEIGHT: f32 = 5.0;
const LIGHT_COLOR: [f32; 3] = [1.0, 0.9, 0.8];
const LIGHT_INTENSITY: f32 = 2.0;
const LIGHT_RANGE: f32 = 30.0;
const LIGHT_PULSE_SPEED: f32 = 2.0;

const CAMERA_FOV_DEGREES: f32 = 45.0;
const CAMERA_ASPECT: f32 = 1.0;
const CAMERA_NEAR: f32 = 0.03;
const CAMERA_FAR: f32 = 500.0;

/// Monotonic animation clock. Advanced by fixed steps, once per frame.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct AnimationState {
    pub elapsed_time: f32,
    pub global_angle: f32,
}

impl AnimationState {
    pub const fn new() -> Self {
        Self {
            elapsed_time: 0.0,
            global_angle: 0.0,
        }
    }

    /// Steps the clock by one frame.
    pub fn advance(&mut self) {
        self.elapsed_time += TIME_STEP;
        self.global_angle += ANGLE_STEP;
    }

    /// Fills `out` with one record per grid cell.
    ///
    /// Cells are enumerated `ix` fastest, then `iy`, then `iz`, so record `i`
    /// sits at `(i % 10, (i / 10) % 10, i / 100)`.
    pub fn write_instances(&self, out: &mut [InstanceData]) {
        debug_assert_eq!(out.len(), NUM_INSTANCES);

        let angle = self.global_angle;
        let wobble = math::make_translate(OBJECT_POSITION)
            * math::make_y_rotate(-angle)
            * math::make_x_rotate(angle * 0.5)
            * math::make_translate(-OBJECT_POSITION);
        let scale = math::make_scale(Vec3::splat(INSTANCE_SCALE));

        for (i, slot) in out.iter_mut().enumerate() {
            let ix = i % INSTANCE_ROWS;
            let iy = (i / INSTANCE_ROWS) % INSTANCE_COLUMNS;
            let iz = i / (INSTANCE_ROWS * INSTANCE_COLUMNS);

            let z_rot = math::make_z_rotate(angle * (ix as f32).sin());
            let y_rot = math::make_y_rotate(angle * (iy as f32).cos());
            let translate = math::make_translate(OBJECT_POSITION + grid_offset(ix, iy, iz));

            let transform: Mat4 = wobble * translate * y_rot * z_rot * scale;

            *slot = InstanceData::new(
                transform,
                math::discard_translation(transform),
                instance_color(i),
            );
        }
    }

    /// Convenience wrapper over [`write_instances`](Self::write_instances).
    pub fn instances(&self) -> Vec<InstanceData> {
        let mut out = vec![InstanceData::zeroed(); NUM_INSTANCES];
        self.write_instances(&mut out);
        out
    }

    /// Point light orbiting the Y axis at a fixed height.
    pub fn light(&self) -> LightData {
        let t = self.elapsed_time;
        LightData::new(
            Vec3::new(
                LIGHT_ORBIT_RADIUS * t.sin(),
                LIGHT_HEIGHT,
                LIGHT_ORBIT_RADIUS * t.cos(),
            ),
            LIGHT_COLOR,
            LIGHT_INTENSITY,
            LIGHT_RANGE,
            LIGHT_PULSE_SPEED,
            t,
        )
    }

    /// Fixed projection with an identity world transform.
    ///
    /// Recomputed every frame even though it does not depend on the clock.
    pub fn camera(&self) -> CameraData {
        let perspective = math::make_perspective(
            CAMERA_FOV_DEGREES.to_radians(),
            CAMERA_ASPECT,
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        let world = math::make_identity();
        CameraData::new(perspective, world, math::discard_translation(world))
    }
}

/// Position of a grid cell relative to the object origin.
fn grid_offset(ix: usize, iy: usize, iz: usize) -> Vec3 {
    let step = 2.0 * INSTANCE_SCALE;
    Vec3::new(
        (ix as f32 - INSTANCE_ROWS as f32 / 2.0) * step + INSTANCE_SCALE,
        (iy as f32 - INSTANCE_COLUMNS as f32 / 2.0) * step + INSTANCE_SCALE,
        (iz as f32 - INSTANCE_DEPTH as f32 / 2.0) * step,
    )
}

/// Red ramps 0→1 over the instance range, green is its complement and blue
/// follows one sine period of the same ramp.
pub fn instance_color(index: usize) -> [f32; 4] {
    let r = index as f32 / (NUM_INSTANCES - 1) as f32;
    let g = 1.0 - r;
    let b = (2.0 * PI * r).sin();
    [r, g, b, 1.0]
}
