//! The activation sequence and the per-frame update.
//!
//! ```text
//! idle --gesture--> charging --charge elapsed--> (freeze window)
//!      --freeze elapsed--> active --voice finished--> control --reset--> idle
//! ```
//!
//! [`Orchestrator`] is the only mutator of the particle field, the state
//! machine, the overlays and the camera. External collaborators are borrowed
//! per call through [`Host`].

use crate::camera::{Camera, CameraOrbitController};
use crate::constants::*;
use crate::domains::{Atmosphere, Domain, DomainRegistry};
use crate::effects::{shake_offset, FrameParameters, TransientEffects};
use crate::host::{Host, PlaybackToken};
use crate::particles::ParticleField;
use crate::scheduler::{Scheduler, TaskId};
use crate::state::{ActivationState, StateMachine, Transition};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f32::consts::TAU;

/// Construction-time knobs. Everything else is a constant.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    pub particle_count: usize,
    pub spread: f32,
    pub min_radius: f32,
    pub seed: u64,
    pub aspect: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            spread: PARTICLE_SPREAD,
            min_radius: MIN_RADIUS,
            seed: DEFAULT_SEED,
            aspect: 16.0 / 9.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trigger {
    FreezeStart,
    FreezeEnd,
}

pub struct Orchestrator {
    machine: StateMachine,
    registry: DomainRegistry,
    field: ParticleField,
    effects: TransientEffects,
    orbit: CameraOrbitController,
    camera: Camera,
    scheduler: Scheduler<Trigger>,
    pending_trigger: Option<TaskId>,
    rng: StdRng,

    active_domain: Option<Domain>,
    ambient: Atmosphere,
    charge_started_at: Option<f64>,
    pending_voice: Option<PlaybackToken>,
    voice_generation: u64,

    time_scale: f32,
    time_scale_target: f32,
    applied_shake: Vec3,
    idle_since: f64,
    rotation: f32,
    last_params: FrameParameters,
}

impl Orchestrator {
    pub fn new(settings: SessionSettings) -> Self {
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let field = ParticleField::new(
            settings.particle_count,
            settings.spread,
            settings.min_radius,
            &mut rng,
        );
        log::info!(
            "[orchestrator] {} particles, spread={:.1}, seed={}",
            field.len(),
            settings.spread,
            settings.seed
        );
        Self {
            machine: StateMachine::new(),
            registry: DomainRegistry::new(),
            field,
            effects: TransientEffects::new(),
            orbit: CameraOrbitController::new(),
            camera: Camera::front(settings.aspect),
            scheduler: Scheduler::new(),
            pending_trigger: None,
            rng,
            active_domain: None,
            ambient: Atmosphere::BASELINE,
            charge_started_at: None,
            pending_voice: None,
            voice_generation: 0,
            time_scale: 1.0,
            time_scale_target: 1.0,
            applied_shake: Vec3::ZERO,
            idle_since: 0.0,
            rotation: 0.0,
            last_params: FrameParameters::baseline(Atmosphere::BASELINE),
        }
    }

    // ---------------- Read access ----------------

    #[inline]
    pub fn state(&self) -> ActivationState {
        self.machine.state()
    }

    #[inline]
    pub fn active_domain(&self) -> Option<Domain> {
        self.active_domain
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orbit(&self) -> &CameraOrbitController {
        &self.orbit
    }

    pub fn effects(&self) -> &TransientEffects {
        &self.effects
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    /// Parameters composed by the most recent frame.
    pub fn last_params(&self) -> &FrameParameters {
        &self.last_params
    }

    pub fn ambient(&self) -> Atmosphere {
        self.ambient
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn time_scale_target(&self) -> f32 {
        self.time_scale_target
    }

    /// Shake offset currently baked into the camera eye.
    pub fn applied_shake(&self) -> Vec3 {
        self.applied_shake
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn charge_started_at(&self) -> Option<f64> {
        self.charge_started_at
    }

    /// Deferred triggers still waiting to fire.
    pub fn pending_triggers(&self) -> usize {
        self.scheduler.len()
    }

    /// Completion token of the voice line currently playing, if any.
    pub fn pending_voice(&self) -> Option<PlaybackToken> {
        self.pending_voice
    }

    /// Register an observer of state transitions. Observers run synchronously,
    /// in registration order, before the transition call returns.
    pub fn on_state_change<F>(&mut self, listener: F)
    where
        F: FnMut(ActivationState, ActivationState) + 'static,
    {
        self.machine.on_state_change(listener);
    }

    // ---------------- External events ----------------

    /// One-time `intro -> idle`, fired when the intro screen is dismissed.
    pub fn enter(&mut self, now_sec: f64, host: &mut Host<'_>) {
        if self.state() != ActivationState::Intro {
            log::debug!("[intro] enter ignored in state {}", self.state());
            return;
        }
        self.transition(ActivationState::Idle, now_sec, host);
    }

    /// A recognized hand sign (or its key stub). Returns whether charging
    /// started.
    pub fn on_gesture(&mut self, key: &str, now_sec: f64, host: &mut Host<'_>) -> bool {
        let state = self.state();
        if state != ActivationState::Idle {
            log::debug!("[gesture] \"{}\" ignored in state {}", key, state);
            return false;
        }
        let domain = match self.registry.resolve(key) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("[gesture] {}", e);
                return false;
            }
        };
        self.active_domain = Some(domain);
        self.transition(ActivationState::Charging, now_sec, host);
        true
    }

    /// Normalized pointer position, forwarded to the orbit controller.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.orbit.pointer_moved(x, y);
    }

    /// Idle re-trigger, valid from any state.
    pub fn reset_to_idle(&mut self, now_sec: f64, host: &mut Host<'_>) {
        self.transition(ActivationState::Idle, now_sec, host);
    }

    /// Transition by name. Unknown names are logged and ignored, as are
    /// requests that would bind a phase without a domain.
    pub fn request_state(&mut self, name: &str, now_sec: f64, host: &mut Host<'_>) {
        let next = match name.parse::<ActivationState>() {
            Ok(s) => s,
            Err(e) => {
                log::warn!("[state] {}", e);
                return;
            }
        };
        match next {
            ActivationState::Intro => {
                log::warn!("[state] intro is only reachable at startup");
            }
            ActivationState::Idle => self.reset_to_idle(now_sec, host),
            _ if self.active_domain.is_none() => {
                log::warn!("[state] {} requires a bound domain", next);
            }
            _ => self.transition(next, now_sec, host),
        }
    }

    /// Report the end of a voice line. Only the token of the current `play`
    /// request is honored, and only once.
    pub fn voice_finished(
        &mut self,
        token: PlaybackToken,
        now_sec: f64,
        host: &mut Host<'_>,
    ) -> bool {
        if self.pending_voice != Some(token) {
            log::debug!("[audio] ignoring stale completion {:?}", token);
            return false;
        }
        self.pending_voice = None;
        if self.state() != ActivationState::Active {
            log::debug!("[audio] completion in state {} ignored", self.state());
            return false;
        }
        self.transition(ActivationState::Control, now_sec, host);
        true
    }

    /// Fire every deferred trigger due at `now_sec`, earliest first.
    pub fn poll_timers(&mut self, now_sec: f64, host: &mut Host<'_>) {
        while let Some(task) = self.scheduler.pop_due(now_sec) {
            if self.pending_trigger == Some(task.id) {
                self.pending_trigger = None;
            }
            // Triggers only make sense inside the charge phase.
            if self.state() != ActivationState::Charging {
                log::debug!("[timer] {:?} dropped in state {}", task.payload, self.state());
                continue;
            }
            match task.payload {
                Trigger::FreezeStart => {
                    log::debug!("[timer] freeze at {:.3}s", task.due_sec);
                    self.effects.start_freeze(task.due_sec);
                    self.schedule(task.due_sec + FREEZE_DURATION_SEC, Trigger::FreezeEnd);
                }
                Trigger::FreezeEnd => {
                    self.transition(ActivationState::Active, task.due_sec, host);
                }
            }
        }
    }

    // ---------------- Frame ----------------

    /// Advance one display frame. `dt_sec` is the wall-clock delta since the
    /// previous frame, `now_sec` the session time.
    pub fn frame(&mut self, dt_sec: f32, now_sec: f64, host: &mut Host<'_>) {
        self.poll_timers(now_sec, host);
        let dt = dt_sec.max(0.0);
        let state = self.state();

        // 1. time-scale smoothing drives the field integration
        let alpha = 1.0 - (-dt / TIME_SCALE_TAU_SEC).exp();
        self.time_scale += (self.time_scale_target - self.time_scale) * alpha;
        self.field.set_time_scale(self.time_scale);
        self.field.step(dt);

        // 2. last frame's shake comes out before the orbit sees the camera
        self.camera.eye -= self.applied_shake;
        self.applied_shake = Vec3::ZERO;

        // 3.
        self.orbit.tick(&mut self.camera);

        // 4.
        if state == ActivationState::Idle {
            self.camera.eye = idle_drift(now_sec - self.idle_since);
            self.camera.look_at_origin();
        }

        // 5.
        let params = self.effects.evaluate(state, now_sec, self.ambient);
        if let Some(t) = params.collapse {
            self.field.charge_inward(t);
        }
        self.rotation = (self.rotation + params.rotation_rate * dt) % TAU;
        self.time_scale_target = params.time_scale_target;

        // 6.
        let shake = shake_offset(params.shake_magnitude, &mut self.rng);
        self.camera.eye += shake;
        self.applied_shake = shake;

        // 7.
        if matches!(state, ActivationState::Active | ActivationState::Control) {
            if let Some(domain) = self.active_domain {
                let behavior = self.registry.behavior_mut(domain);
                if behavior.has_tick() {
                    behavior.tick(dt, now_sec, &mut self.field);
                }
            }
        }

        self.last_params = params;
        self.push_frame(host);
    }

    // ---------------- Internals ----------------

    fn transition(&mut self, next: ActivationState, now_sec: f64, host: &mut Host<'_>) {
        if let Some(transition) = self.machine.set_state(next) {
            self.on_enter(transition, now_sec, host);
        }
    }

    fn on_enter(&mut self, transition: Transition, now_sec: f64, host: &mut Host<'_>) {
        // charge and freeze belong to the charging phase alone
        if transition.prev == ActivationState::Charging {
            self.effects.end_charge();
            self.scheduler.cancel_all();
            self.pending_trigger = None;
        }
        match transition.next {
            ActivationState::Intro => {}
            ActivationState::Idle => self.enter_idle(now_sec, host),
            ActivationState::Charging => self.enter_charging(now_sec),
            ActivationState::Active => self.enter_active(now_sec, host),
            ActivationState::Control => self.enter_control(),
        }
    }

    fn enter_charging(&mut self, now_sec: f64) {
        self.charge_started_at = Some(now_sec);
        self.effects.start_charge(now_sec);
        self.schedule(now_sec + CHARGE_DURATION_SEC, Trigger::FreezeStart);
        if let Some(domain) = self.active_domain {
            log::info!("[orchestrator] charging {}", domain);
        }
    }

    fn enter_active(&mut self, now_sec: f64, host: &mut Host<'_>) {
        let Some(domain) = self.active_domain else {
            log::warn!("[orchestrator] active without a domain");
            return;
        };
        self.effects.start_spike(now_sec);
        self.time_scale_target = BURST_TIME_SCALE;
        self.ambient = self
            .registry
            .behavior_mut(domain)
            .apply(&mut self.field, &mut self.rng);

        self.voice_generation += 1;
        let token = PlaybackToken::new(self.voice_generation);
        self.pending_voice = Some(token);
        // A rejected line never reports completion, so control is never
        // reached on this path. Left as is: the user can still reset to idle.
        if let Err(e) = host.voice.play(domain, token) {
            log::warn!("[audio] {}", e);
        }
        host.captions.show(domain);
    }

    fn enter_control(&mut self) {
        let profile = self
            .active_domain
            .map(Domain::camera_profile)
            .unwrap_or_default();
        self.orbit
            .enable(Some(profile.sensitivity), Some(profile.inertia));
    }

    fn enter_idle(&mut self, now_sec: f64, host: &mut Host<'_>) {
        let cancelled = self.scheduler.cancel_all();
        self.pending_trigger = None;
        if cancelled > 0 {
            log::debug!("[timer] cancelled {} pending trigger(s)", cancelled);
        }

        self.orbit.disable(&mut self.camera);
        self.applied_shake = Vec3::ZERO;
        self.idle_since = now_sec;

        self.pending_voice = None;
        host.voice.stop();
        host.captions.hide();

        self.effects.clear();
        self.time_scale = 1.0;
        self.time_scale_target = 1.0;
        self.field.set_time_scale(1.0);

        if let Some(domain) = self.active_domain.take() {
            self.registry.behavior_mut(domain).reset(&mut self.field);
        }
        self.charge_started_at = None;
        self.ambient = Atmosphere::BASELINE;
        self.rotation = 0.0;
        self.last_params = FrameParameters::baseline(self.ambient);
        self.push_frame(host);
    }

    /// Replace any pending trigger with a new one.
    fn schedule(&mut self, due_sec: f64, trigger: Trigger) {
        if let Some(id) = self.pending_trigger.take() {
            if self.scheduler.cancel(id) {
                log::debug!("[timer] superseded pending trigger");
            }
        }
        self.pending_trigger = Some(self.scheduler.schedule(due_sec, trigger));
    }

    fn push_frame(&self, host: &mut Host<'_>) {
        let p = &self.last_params;
        let render = &mut *host.render;
        render.set_time_scale(self.time_scale);
        render.set_bloom_strength(p.bloom);
        render.set_particle_size(PARTICLE_SIZE * p.size_multiplier);
        render.set_exposure(TONE_EXPOSURE * p.exposure_multiplier);
        render.set_backdrop(p.backdrop);
        render.set_fog_color(p.backdrop);
        render.set_field_rotation(self.rotation);
        render.set_camera(&self.camera);
        render.upload_particles(&self.field);
    }
}

/// Slow wander of the idle camera, independent of the orbit controller.
/// `elapsed_sec` counts from idle entry, so the path starts at the front
/// position the camera was snapped to.
pub fn idle_drift(elapsed_sec: f64) -> Vec3 {
    let t = elapsed_sec as f32;
    Vec3::new(
        IDLE_DRIFT_AMPLITUDE[0] * (t * IDLE_DRIFT_FREQUENCY[0]).sin(),
        IDLE_DRIFT_AMPLITUDE[1] * (t * IDLE_DRIFT_FREQUENCY[1]).sin(),
        CAM_DISTANCE,
    )
}
