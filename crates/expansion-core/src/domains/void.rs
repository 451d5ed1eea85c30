//! Infinite Void: a slow inward spiral, light collapsing into a point.

use super::{mix_rgb, Atmosphere, DomainBehavior};
use crate::constants::ACTIVE_BLOOM;
use crate::particles::ParticleField;
use glam::Vec3;
use rand::{Rng, RngCore};

const SPEED_MIN: f32 = 0.3;
const SPEED_SPAN: f32 = 0.5;
const INWARD_PULL: f32 = -0.2;
const DAMPING: f32 = 0.4;
// above this |radial.y| the cross product with +Y degenerates
const POLAR_THRESHOLD: f32 = 0.9;
const ICE_BLUE: [f32; 3] = [0.27, 0.53, 1.0];
const WHITE: [f32; 3] = [0.94, 0.93, 1.0];
const BACKDROP: [f32; 3] = [0.0, 0.0, 0.067]; // deep black-blue

#[derive(Clone, Copy, Debug, Default)]
pub struct Void;

/// Unit tangent around the origin for a unit radial direction.
pub fn tangent_for(radial: Vec3) -> Vec3 {
    let axis = if radial.y.abs() > POLAR_THRESHOLD {
        Vec3::X
    } else {
        Vec3::Y
    };
    radial.cross(axis).normalize_or_zero()
}

impl DomainBehavior for Void {
    fn apply(&mut self, field: &mut ParticleField, rng: &mut dyn RngCore) -> Atmosphere {
        for i in 0..field.len() {
            let radial = field.position(i).normalize_or_zero();
            let tangent = tangent_for(radial);
            let speed = SPEED_MIN + rng.gen::<f32>() * SPEED_SPAN;
            field.set_velocity(i, (tangent * speed + radial * INWARD_PULL) * DAMPING);
            field.set_color(i, mix_rgb(ICE_BLUE, WHITE, rng.gen()));
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
