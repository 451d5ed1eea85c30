//! Malevolent Shrine: embers flung outward, then dragged down.

use super::{mix_rgb, Atmosphere, DomainBehavior};
use crate::constants::ACTIVE_BLOOM;
use crate::particles::ParticleField;
use glam::Vec3;
use rand::{Rng, RngCore};

const SPEED_MIN: f32 = 0.3;
const SPEED_SPAN: f32 = 0.4;
pub const SHRINE_GRAVITY: Vec3 = Vec3::new(0.0, -0.5, 0.0);
const RED: [f32; 3] = [1.0, 0.13, 0.0];
const ORANGE: [f32; 3] = [1.0, 0.53, 0.05];
const BACKDROP: [f32; 3] = [0.1, 0.0, 0.0]; // deep crimson

#[derive(Clone, Copy, Debug, Default)]
pub struct Shrine;

impl DomainBehavior for Shrine {
    fn apply(&mut self, field: &mut ParticleField, rng: &mut dyn RngCore) -> Atmosphere {
        for i in 0..field.len() {
            let radial = field.position(i).normalize_or_zero();
            let speed = SPEED_MIN + rng.gen::<f32>() * SPEED_SPAN;
            field.set_velocity(i, radial * speed + SHRINE_GRAVITY);
            field.set_color(i, mix_rgb(RED, ORANGE, rng.gen()));
        }
        Atmosphere {
            backdrop: BACKDROP,
            bloom: ACTIVE_BLOOM,
        }
    }

    fn reset(&mut self, field: &mut ParticleField) {
        field.reset();
    }
}
