//! Hollow Purple: chaotic directions with a shared breathing pulse.

use super::{mix_rgb, Atmosphere, DomainBehavior};
use crate::constants::ACTIVE_BLOOM;
use crate::particles::ParticleField;
use glam::Vec3;
use rand::{Rng, RngCore};

const SPEED_MIN: f32 = 0.3;
const SPEED_SPAN: f32 = 1.2;
const BLOOM_BOOST: f32 = 0.3; // purple reads as the most intense domain
const PULSE_RATE: f64 = 3.0; // rad/s
pub const PULSE_FLOOR: f32 = 0.2;
const PURPLE: [f32; 3] = [0.53, 0.0, 0.6];
const MAGENTA: [f32; 3] = [1.0, 0.1, 1.0];
const BACKDROP: [f32; 3] = [0.039, 0.0, 0.082]; // dark violet

/// Speed multiplier at `time` seconds, oscillating in `[PULSE_FLOOR, 1]`.
#[inline]
pub fn pulse_envelope(time: f64) -> f32 {
    let pulse = ((time * PULSE_RATE).sin() * 0.5 + 0.5) as f32;
    PULSE_FLOOR + (1.0 - PULSE_FLOOR) * pulse
}

#[derive(Debug, Default)]
pub struct Purple {
    base_speeds: Option<Vec<f32>>,
}

impl Purple {
    /// Per-particle speeds chosen by the last `apply`, if still bound.
    pub fn base_speeds(&self) -> Option<&[f32]> {
        self.base_speeds.as_deref()
    }
}

impl DomainBehavior for Purple {
    fn apply(&mut self, field: &mut ParticleField, rng: &mut dyn RngCore) -> Atmosphere {
        let mut speeds = Vec::with_capacity(field.len());
        for i in 0..field.len() {
            let theta = rng.gen::<f32>() * std::f32::consts::TAU;
            let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
            let speed = SPEED_MIN + rng.gen::<f32>() * SPEED_SPAN;
            let dir = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
            speeds.push(speed);
            field.set_velocity(i, dir * speed);
            field.set_color(i, mix_rgb(PURPLE, MAGENTA, rng.gen()));
        }
        self.base_speeds = Some(speeds);
        Atmosphere {
            backdrop: BACKDROP,
            bloom: ACTIVE_BLOOM + BLOOM_BOOST,
        }
    }

    /// Rescale every velocity to `base_speed * envelope(time)` keeping its
    /// direction. `dt` does not enter the envelope.
    fn tick(&mut self, _dt: f32, time: f64, field: &mut ParticleField) {
        let Some(speeds) = &self.base_speeds else {
            return;
        };
        let envelope = pulse_envelope(time);
        for (i, &base) in speeds.iter().enumerate().take(field.len()) {
            if base == 0.0 {
                continue;
            }
            let v = field.velocity(i);
            let len = v.length();
            if len == 0.0 {
                continue;
            }
            field.set_velocity(i, v * (base * envelope / len));
        }
    }

    fn has_tick(&self) -> bool {
        true
    }

    fn reset(&mut self, field: &mut ParticleField) {
        self.base_speeds = None;
        field.reset();
    }
}
