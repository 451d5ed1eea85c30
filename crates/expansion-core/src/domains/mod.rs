//! Domain visual profiles and the behaviors that drive the particle field
//! while a domain is bound.
//!
//! The set of domains is closed. Keys coming from the outside (gestures,
//! scripts) are resolved once through [`DomainRegistry`]; everything past that
//! point works with the [`Domain`] tag.

mod purple;
mod shrine;
mod void;

pub use purple::{pulse_envelope, Purple, PULSE_FLOOR};
pub use shrine::{Shrine, SHRINE_GRAVITY};
pub use void::{tangent_for, Void};

use crate::constants::{BASE_BACKDROP, BASE_BLOOM, ORBIT_INERTIA, ORBIT_SENSITIVITY};
use crate::error::{ExpansionError, Result};
use crate::particles::ParticleField;
use fnv::FnvHashMap;
use rand::RngCore;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Domain {
    Shrine,
    Void,
    Purple,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Shrine, Domain::Void, Domain::Purple];

    pub fn key(self) -> &'static str {
        match self {
            Domain::Shrine => "shrine",
            Domain::Void => "void",
            Domain::Purple => "purple",
        }
    }

    /// Caption text shown while the domain is active.
    pub fn display_name(self) -> &'static str {
        match self {
            Domain::Shrine => "Malevolent Shrine",
            Domain::Void => "Infinite Void",
            Domain::Purple => "Hollow Purple",
        }
    }

    /// Voice line played on activation, relative to the asset root.
    pub fn voice_asset(self) -> &'static str {
        match self {
            Domain::Shrine => "assets/audio/shrine_voice.mp3",
            Domain::Void => "assets/audio/void_voice.mp3",
            Domain::Purple => "assets/audio/mahito_voice.mp3",
        }
    }

    /// Orbit tuning used once the domain hands over camera control.
    pub fn camera_profile(self) -> CameraProfile {
        match self {
            // slow, floaty drift suits the void
            Domain::Void => CameraProfile {
                sensitivity: 0.6,
                inertia: 0.03,
            },
            Domain::Shrine | Domain::Purple => CameraProfile::default(),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraProfile {
    pub sensitivity: f32,
    pub inertia: f32,
}

impl Default for CameraProfile {
    fn default() -> Self {
        Self {
            sensitivity: ORBIT_SENSITIVITY,
            inertia: ORBIT_INERTIA,
        }
    }
}

/// One-shot ambient directive returned by [`DomainBehavior::apply`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Atmosphere {
    pub backdrop: [f32; 3],
    pub bloom: f32,
}

impl Atmosphere {
    /// Idle scene: black backdrop, base bloom.
    pub const BASELINE: Atmosphere = Atmosphere {
        backdrop: BASE_BACKDROP,
        bloom: BASE_BLOOM,
    };
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self::BASELINE
    }
}

pub trait DomainBehavior {
    /// Seed per-particle velocity and color for the burst.
    fn apply(&mut self, field: &mut ParticleField, rng: &mut dyn RngCore) -> Atmosphere;

    /// Continuous modulation while the domain is active or under control.
    fn tick(&mut self, _dt: f32, _time: f64, _field: &mut ParticleField) {}

    /// Whether [`DomainBehavior::tick`] does anything. Lets the frame loop skip
    /// a full pass over the field for static domains.
    fn has_tick(&self) -> bool {
        false
    }

    /// Restore the field baseline and drop any auxiliary data.
    fn reset(&mut self, field: &mut ParticleField);
}

/// Validated key -> behavior mapping, built once at startup.
pub struct DomainRegistry {
    keys: FnvHashMap<&'static str, Domain>,
    shrine: Shrine,
    void: Void,
    purple: Purple,
}

impl Default for DomainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainRegistry {
    pub fn new() -> Self {
        let keys = Domain::ALL.iter().map(|d| (d.key(), *d)).collect();
        Self {
            keys,
            shrine: Shrine,
            void: Void,
            purple: Purple::default(),
        }
    }

    pub fn resolve(&self, key: &str) -> Result<Domain> {
        self.keys
            .get(key)
            .copied()
            .ok_or_else(|| ExpansionError::UnknownDomain(key.to_owned()))
    }

    /// Caption text for a raw domain key; unknown keys are logged.
    pub fn caption_for_key(&self, key: &str) -> Option<&'static str> {
        match self.resolve(key) {
            Ok(d) => Some(d.display_name()),
            Err(e) => {
                log::warn!("[captions] {}", e);
                None
            }
        }
    }

    /// Voice asset for a raw domain key; unknown keys are logged.
    pub fn voice_for_key(&self, key: &str) -> Option<&'static str> {
        match self.resolve(key) {
            Ok(d) => Some(d.voice_asset()),
            Err(e) => {
                log::warn!("[audio] {}", e);
                None
            }
        }
    }

    pub fn behavior_mut(&mut self, domain: Domain) -> &mut dyn DomainBehavior {
        match domain {
            Domain::Shrine => &mut self.shrine,
            Domain::Void => &mut self.void,
            Domain::Purple => &mut self.purple,
        }
    }

    pub fn purple(&self) -> &Purple {
        &self.purple
    }
}

/// Linear blend between two colors.
#[inline]
pub(crate) fn mix_rgb(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}
