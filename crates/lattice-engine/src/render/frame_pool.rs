//! Rotating per-frame GPU buffers.
//!
//! Each data kind gets `MAX_FRAMES_IN_FLIGHT` independent buffers so the CPU
//! can fill frame K+1 while the GPU still reads frame K. The slot that is
//! writable right now is tracked by a [`SlotRing`]; moving to the next slot
//! needs `&mut self`, so there is exactly one writer per slot.
//!
//! ```text
//! draw 1:  slot 1  CPU writes → submit
//! draw 2:  slot 2  CPU writes → submit      (slot 1 may still be read by GPU)
//! draw 3:  slot 0  CPU writes → submit
//! draw 4:  slot 1  reused once its permit came back
//! ```

use std::mem::size_of;

use super::shader_types::{CameraData, InstanceData, LightData};

/// Number of frames the CPU may run ahead of the GPU.
pub const MAX_FRAMES_IN_FLIGHT: usize = 3;

/// Index of one rotating copy, in `[0, MAX_FRAMES_IN_FLIGHT)`.
pub type FrameSlot = usize;

/// Kinds of per-frame data stored in the pool.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FrameDataKind {
    Instances,
    Camera,
    Light,
}

// ── slot ring ─────────────────────────────────────────────────────────────

/// Modular slot counter. Starts at slot 0; the first `advance` yields 1.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct SlotRing {
    current: FrameSlot,
}

impl SlotRing {
    pub const fn new() -> Self {
        Self { current: 0 }
    }

    /// Moves to the next slot and returns it.
    pub fn advance(&mut self) -> FrameSlot {
        self.current = (self.current + 1) % MAX_FRAMES_IN_FLIGHT;
        self.current
    }

    pub fn current(&self) -> FrameSlot {
        self.current
    }
}

// ── pool ──────────────────────────────────────────────────────────────────

/// Owns the per-frame instance, camera and light buffers plus one bind group
/// per slot referencing that slot's camera and light uniforms.
pub struct FramePool {
    ring: SlotRing,
    instances: [wgpu::Buffer; MAX_FRAMES_IN_FLIGHT],
    cameras: [wgpu::Buffer; MAX_FRAMES_IN_FLIGHT],
    lights: [wgpu::Buffer; MAX_FRAMES_IN_FLIGHT],
    bind_groups: [wgpu::BindGroup; MAX_FRAMES_IN_FLIGHT],
    instance_count: usize,
}

impl FramePool {
    /// Allocates every slot up front. Sizes never change afterwards.
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        instance_count: usize,
    ) -> Self {
        let instances: [wgpu::Buffer; MAX_FRAMES_IN_FLIGHT] = std::array::from_fn(|i| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("lattice instance buffer {i}")),
                size: (instance_count * size_of::<InstanceData>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let cameras: [wgpu::Buffer; MAX_FRAMES_IN_FLIGHT] = std::array::from_fn(|i| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("lattice camera ubo {i}")),
                size: size_of::<CameraData>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let lights: [wgpu::Buffer; MAX_FRAMES_IN_FLIGHT] = std::array::from_fn(|i| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("lattice light ubo {i}")),
                size: size_of::<LightData>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let bind_groups: [wgpu::BindGroup; MAX_FRAMES_IN_FLIGHT] = std::array::from_fn(|i| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("lattice frame bind group {i}")),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: cameras[i].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: lights[i].as_entire_binding(),
                    },
                ],
            })
        });

        Self {
            ring: SlotRing::new(),
            instances,
            cameras,
            lights,
            bind_groups,
            instance_count,
        }
    }

    /// Rotates to the next slot. Call once per frame, before any writes.
    pub fn advance(&mut self) -> FrameSlot {
        self.ring.advance()
    }

    pub fn current_slot(&self) -> FrameSlot {
        self.ring.current()
    }

    /// Buffer holding `kind` for `slot`.
    pub fn buffer_for(&self, kind: FrameDataKind, slot: FrameSlot) -> &wgpu::Buffer {
        match kind {
            FrameDataKind::Instances => &self.instances[slot],
            FrameDataKind::Camera => &self.cameras[slot],
            FrameDataKind::Light => &self.lights[slot],
        }
    }

    /// Camera + light bind group for `slot`.
    pub fn bind_group_for(&self, slot: FrameSlot) -> &wgpu::BindGroup {
        &self.bind_groups[slot]
    }

    pub fn instance_count(&self) -> usize {
        self.instance_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_starts_at_zero() {
        assert_eq!(SlotRing::new().current(), 0);
    }

    #[test]
    fn ring_slot_after_n_advances_is_n_mod_capacity() {
        let mut ring = SlotRing::new();
        for n in 1..=50usize {
            let slot = ring.advance();
            assert_eq!(slot, n % MAX_FRAMES_IN_FLIGHT);
            assert_eq!(ring.current(), slot);
        }
    }

    #[test]
    fn ring_visits_every_slot_once_per_cycle() {
        let mut ring = SlotRing::new();
        let mut seen: Vec<FrameSlot> = (0..MAX_FRAMES_IN_FLIGHT).map(|_| ring.advance()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }
}
