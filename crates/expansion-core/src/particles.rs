//! Particle ensemble stored as flat, parallel xyz arrays.
//!
//! The layout matches what a GPU vertex buffer wants: `3 * count` floats per
//! attribute. `base_positions` is written once at construction and only read
//! afterwards (it is copied back into `positions` on reset).

use crate::constants::{CHARGE_STEP_FACTOR, CHARGE_STRENGTH, IDLE_COLOR};
use glam::Vec3;
use rand::Rng;

pub struct ParticleField {
    positions: Vec<f32>,
    base_positions: Vec<f32>,
    velocities: Vec<f32>,
    colors: Vec<f32>,
    time_scale: f32,
}

impl ParticleField {
    /// Scatter `count` particles uniformly through the spherical shell between
    /// `min_radius` and `spread`. Velocities start at zero and colors at the
    /// idle baseline.
    pub fn new<R: Rng + ?Sized>(count: usize, spread: f32, min_radius: f32, rng: &mut R) -> Self {
        let len = count * 3;
        let mut positions = Vec::with_capacity(len);
        for _ in 0..count {
            let theta = rng.gen::<f32>() * std::f32::consts::TAU;
            let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
            // cube root keeps the density uniform in volume
            let r = min_radius + rng.gen::<f32>().cbrt() * (spread - min_radius);
            positions.push(r * phi.sin() * theta.cos());
            positions.push(r * phi.sin() * theta.sin());
            positions.push(r * phi.cos());
        }
        let base_positions = positions.clone();
        let colors = IDLE_COLOR.iter().copied().cycle().take(len).collect();
        Self {
            positions,
            base_positions,
            velocities: vec![0.0; len],
            colors,
            time_scale: 1.0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Integrate velocities over `dt` seconds of simulation time.
    pub fn update(&mut self, dt: f32) {
        for (p, v) in self.positions.iter_mut().zip(&self.velocities) {
            *p += v * dt;
        }
    }

    /// Integrate over wall-clock `dt`, warped by the current time-scale.
    pub fn step(&mut self, dt: f32) {
        self.update(dt * self.time_scale);
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Pull every particle toward the origin. `t` is the charge progress in
    /// [0, 1]. The blend is applied once per call, so the collapse speed
    /// follows the frame rate rather than elapsed time.
    pub fn charge_inward(&mut self, t: f32) {
        let strength = t.clamp(0.0, 1.0) * CHARGE_STRENGTH;
        let k = strength * CHARGE_STEP_FACTOR;
        for p in &mut self.positions {
            *p += (0.0 - *p) * k;
        }
    }

    /// Back to the construction-time layout: base positions, zero velocity,
    /// idle color.
    pub fn reset(&mut self) {
        self.positions.copy_from_slice(&self.base_positions);
        self.velocities.fill(0.0);
        for rgb in self.colors.chunks_exact_mut(3) {
            rgb.copy_from_slice(&IDLE_COLOR);
        }
    }

    // ---------------- Per-particle accessors ----------------

    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[i * 3..i * 3 + 3])
    }

    #[inline]
    pub fn base_position(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.base_positions[i * 3..i * 3 + 3])
    }

    #[inline]
    pub fn velocity(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.velocities[i * 3..i * 3 + 3])
    }

    #[inline]
    pub fn set_velocity(&mut self, i: usize, v: Vec3) {
        v.write_to_slice(&mut self.velocities[i * 3..i * 3 + 3]);
    }

    #[inline]
    pub fn color(&self, i: usize) -> [f32; 3] {
        [
            self.colors[i * 3],
            self.colors[i * 3 + 1],
            self.colors[i * 3 + 2],
        ]
    }

    #[inline]
    pub fn set_color(&mut self, i: usize, rgb: [f32; 3]) {
        self.colors[i * 3..i * 3 + 3].copy_from_slice(&rgb);
    }

    // ---------------- Raw views for the render backend ----------------

    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    #[inline]
    pub fn base_positions(&self) -> &[f32] {
        &self.base_positions
    }

    #[inline]
    pub fn velocities(&self) -> &[f32] {
        &self.velocities
    }

    #[inline]
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Position buffer as bytes, ready for a vertex buffer upload.
    #[inline]
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    #[inline]
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }
}
