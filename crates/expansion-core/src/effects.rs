//! Timed transient overlays: charge ramp, freeze-frame and active spike, plus
//! the continuous shake that samples whatever they request.
//!
//! Each overlay is a start timestamp and a fixed duration. Every frame the
//! controller folds the running overlays into one [`FrameParameters`]. For
//! size, exposure, bloom, tint and time-scale exactly one overlay is in charge
//! (picked by the activation state); shake is the maximum any overlay asks for.

use crate::constants::*;
use crate::domains::Atmosphere;
use crate::state::ActivationState;
use glam::Vec3;
use rand::{Rng, RngCore};

/// Start time and fixed duration of one overlay. No start time means idle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectTimer {
    start_sec: Option<f64>,
    duration_sec: f64,
}

impl EffectTimer {
    pub const fn new(duration_sec: f64) -> Self {
        Self {
            start_sec: None,
            duration_sec,
        }
    }

    pub fn start(&mut self, now_sec: f64) {
        self.start_sec = Some(now_sec);
    }

    pub fn stop(&mut self) {
        self.start_sec = None;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.start_sec.is_some()
    }

    #[inline]
    pub fn started_at(&self) -> Option<f64> {
        self.start_sec
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration_sec
    }

    /// Elapsed fraction clamped to [0, 1], or `None` when not running.
    pub fn progress(&self, now_sec: f64) -> Option<f32> {
        let start = self.start_sec?;
        if self.duration_sec <= 0.0 {
            return Some(1.0);
        }
        Some(((now_sec - start) / self.duration_sec).clamp(0.0, 1.0) as f32)
    }

    pub fn is_expired(&self, now_sec: f64) -> bool {
        self.start_sec
            .is_some_and(|start| now_sec - start >= self.duration_sec)
    }
}

/// Per-frame modifiers. Recomputed from scratch every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParameters {
    pub size_multiplier: f32,
    pub exposure_multiplier: f32,
    pub bloom: f32,
    pub backdrop: [f32; 3],
    pub time_scale_target: f32,
    pub shake_magnitude: f32,
    /// Ambient field rotation in rad/s around +Y.
    pub rotation_rate: f32,
    /// Charge progress to feed into the inward collapse, when charging.
    pub collapse: Option<f32>,
}

impl FrameParameters {
    pub fn baseline(ambient: Atmosphere) -> Self {
        Self {
            size_multiplier: 1.0,
            exposure_multiplier: 1.0,
            bloom: ambient.bloom,
            backdrop: ambient.backdrop,
            time_scale_target: 1.0,
            shake_magnitude: 0.0,
            rotation_rate: 0.0,
            collapse: None,
        }
    }
}

/// Which overlay currently owns the non-additive parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    Charge,
    Freeze,
    Spike,
}

pub struct TransientEffects {
    charge: EffectTimer,
    freeze: EffectTimer,
    spike: EffectTimer,
}

impl Default for TransientEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl TransientEffects {
    pub fn new() -> Self {
        Self {
            charge: EffectTimer::new(CHARGE_DURATION_SEC),
            freeze: EffectTimer::new(FREEZE_DURATION_SEC),
            spike: EffectTimer::new(SPIKE_DURATION_SEC),
        }
    }

    pub fn start_charge(&mut self, now_sec: f64) {
        self.charge.start(now_sec);
    }

    /// The freeze takes over from a finished charge ramp.
    pub fn start_freeze(&mut self, now_sec: f64) {
        self.charge.stop();
        self.freeze.start(now_sec);
    }

    pub fn start_spike(&mut self, now_sec: f64) {
        self.charge.stop();
        self.freeze.stop();
        self.spike.start(now_sec);
    }

    /// Drop the charge ramp and the freeze, leaving any spike alone.
    pub fn end_charge(&mut self) {
        self.charge.stop();
        self.freeze.stop();
    }

    /// Forget every overlay.
    pub fn clear(&mut self) {
        self.charge.stop();
        self.freeze.stop();
        self.spike.stop();
    }

    pub fn timer(&self, overlay: Overlay) -> &EffectTimer {
        match overlay {
            Overlay::Charge => &self.charge,
            Overlay::Freeze => &self.freeze,
            Overlay::Spike => &self.spike,
        }
    }

    pub fn is_running(&self, overlay: Overlay) -> bool {
        self.timer(overlay).is_running()
    }

    pub fn any_running(&self) -> bool {
        self.charge.is_running() || self.freeze.is_running() || self.spike.is_running()
    }

    /// Fold the running overlays into this frame's parameters.
    ///
    /// `ambient` is the baseline the overlays modulate around (idle scene or
    /// the bound domain's atmosphere). An expired spike is retired here, which
    /// hands every parameter back to that baseline.
    pub fn evaluate(
        &mut self,
        state: ActivationState,
        now_sec: f64,
        ambient: Atmosphere,
    ) -> FrameParameters {
        if self.spike.is_expired(now_sec) {
            log::debug!("[fx] spike finished");
            self.spike.stop();
        }

        let mut out = FrameParameters::baseline(ambient);
        match state {
            ActivationState::Charging => {
                if self.freeze.is_running() {
                    apply_freeze(&mut out, ambient);
                } else if let Some(t) = self.charge.progress(now_sec) {
                    apply_charge(&mut out, ambient, t);
                }
            }
            ActivationState::Active | ActivationState::Control => {
                if let Some(t) = self.spike.progress(now_sec) {
                    apply_spike(&mut out, ambient, t);
                }
            }
            ActivationState::Intro | ActivationState::Idle => {}
        }
        out.shake_magnitude = self.requested_shake(state, now_sec);
        out
    }

    /// Largest shake magnitude asked for by the overlays `state` owns. Charge
    /// and freeze shake only while charging, the spike only once active.
    pub fn requested_shake(&self, state: ActivationState, now_sec: f64) -> f32 {
        match state {
            ActivationState::Charging => {
                let charge = self
                    .charge
                    .progress(now_sec)
                    .map_or(0.0, |t| CHARGE_SHAKE_MAX * t);
                let freeze = if self.freeze.is_running() {
                    FREEZE_SHAKE
                } else {
                    0.0
                };
                charge.max(freeze)
            }
            ActivationState::Active | ActivationState::Control => self
                .spike
                .progress(now_sec)
                .map_or(0.0, |t| SPIKE_SHAKE * spike_envelope(t)),
            ActivationState::Intro | ActivationState::Idle => 0.0,
        }
    }
}

/// Eased 1 -> 0 decay used by the spike.
#[inline]
pub fn spike_envelope(t: f32) -> f32 {
    let k = 1.0 - t.clamp(0.0, 1.0);
    k * k
}

fn apply_charge(out: &mut FrameParameters, ambient: Atmosphere, t: f32) {
    out.size_multiplier = lerp(1.0, CHARGE_SIZE_PEAK, t);
    out.exposure_multiplier = lerp(1.0, CHARGE_EXPOSURE_PEAK, t);
    out.bloom = lerp(ambient.bloom, CHARGE_BLOOM, t);
    out.backdrop = add_rgb(ambient.backdrop, CHARGE_TINT, t);
    out.time_scale_target = 1.0 - CHARGE_SLOWDOWN * t;
    out.rotation_rate = CHARGE_ROTATION_RATE;
    out.collapse = Some(t);
}

// Holds the charge peak while time nearly stops.
fn apply_freeze(out: &mut FrameParameters, ambient: Atmosphere) {
    out.size_multiplier = CHARGE_SIZE_PEAK;
    out.exposure_multiplier = FREEZE_EXPOSURE;
    out.bloom = CHARGE_BLOOM;
    out.backdrop = add_rgb(ambient.backdrop, CHARGE_TINT, 1.0);
    out.time_scale_target = FREEZE_TIME_SCALE;
}

fn apply_spike(out: &mut FrameParameters, ambient: Atmosphere, t: f32) {
    let e = spike_envelope(t);
    out.size_multiplier = 1.0 + SPIKE_SIZE_BOOST * e;
    out.exposure_multiplier = 1.0 + SPIKE_EXPOSURE_BOOST * e;
    out.backdrop = add_rgb(ambient.backdrop, SPIKE_FLASH_TINT, e);
    out.time_scale_target = 1.0 + (BURST_TIME_SCALE - 1.0) * e;
}

/// One random screen-plane offset for this frame.
pub fn shake_offset(magnitude: f32, rng: &mut dyn RngCore) -> Vec3 {
    if magnitude <= 0.0 {
        return Vec3::ZERO;
    }
    let x = rng.gen::<f32>() * 2.0 - 1.0;
    let y = rng.gen::<f32>() * 2.0 - 1.0;
    Vec3::new(x, y, 0.0) * magnitude
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn add_rgb(base: [f32; 3], tint: [f32; 3], amount: f32) -> [f32; 3] {
    [
        (base[0] + tint[0] * amount).clamp(0.0, 1.0),
        (base[1] + tint[1] * amount).clamp(0.0, 1.0),
        (base[2] + tint[2] * amount).clamp(0.0, 1.0),
    ]
}
