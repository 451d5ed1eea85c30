// Recording doubles for the external collaborators, shared by the
// integration tests.

#![allow(dead_code)]

use expansion_core::*;
use glam::Vec3;

pub const FPS: f64 = 60.0;

#[derive(Default)]
pub struct RecordingRender {
    pub bloom: f32,
    pub time_scale: f32,
    pub backdrop: [f32; 3],
    pub fog: [f32; 3],
    pub size: f32,
    pub exposure: f32,
    pub rotation: f32,
    pub eye: Vec3,
    pub uploads: usize,
}

impl RenderBackend for RecordingRender {
    fn set_bloom_strength(&mut self, strength: f32) {
        self.bloom = strength;
    }
    fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }
    fn set_camera(&mut self, camera: &Camera) {
        self.eye = camera.eye;
    }
    fn set_backdrop(&mut self, rgb: [f32; 3]) {
        self.backdrop = rgb;
    }
    fn set_fog_color(&mut self, rgb: [f32; 3]) {
        self.fog = rgb;
    }
    fn set_particle_size(&mut self, size: f32) {
        self.size = size;
    }
    fn set_exposure(&mut self, exposure: f32) {
        self.exposure = exposure;
    }
    fn set_field_rotation(&mut self, radians: f32) {
        self.rotation = radians;
    }
    fn upload_particles(&mut self, field: &ParticleField) {
        assert_eq!(field.position_bytes().len(), field.len() * 12);
        self.uploads += 1;
    }
}

#[derive(Default)]
pub struct RecordingVoice {
    pub plays: Vec<(Domain, PlaybackToken)>,
    pub stops: usize,
    pub reject: bool,
}

impl VoicePlayer for RecordingVoice {
    fn play(&mut self, domain: Domain, token: PlaybackToken) -> Result<(), ExpansionError> {
        self.plays.push((domain, token));
        if self.reject {
            return Err(ExpansionError::PlaybackRejected("autoplay blocked".into()));
        }
        Ok(())
    }
    fn stop(&mut self) {
        self.stops += 1;
    }
}

#[derive(Default)]
pub struct RecordingCaptions {
    pub shown: Vec<Domain>,
    pub hides: usize,
}

impl CaptionDisplay for RecordingCaptions {
    fn show(&mut self, domain: Domain) {
        self.shown.push(domain);
    }
    fn hide(&mut self) {
        self.hides += 1;
    }
}

#[derive(Default)]
pub struct Rig {
    pub render: RecordingRender,
    pub voice: RecordingVoice,
    pub captions: RecordingCaptions,
}

impl Rig {
    pub fn host(&mut self) -> Host<'_> {
        Host::new(&mut self.render, &mut self.voice, &mut self.captions)
    }

    pub fn last_token(&self) -> PlaybackToken {
        self.voice.plays.last().expect("no play request").1
    }
}

pub fn small_session(particle_count: usize) -> Orchestrator {
    Orchestrator::new(SessionSettings {
        particle_count,
        seed: 7,
        ..SessionSettings::default()
    })
}

/// Orchestrator already past the intro, sitting in idle at t=0.
pub fn idle_session(particle_count: usize, rig: &mut Rig) -> Orchestrator {
    let mut orch = small_session(particle_count);
    orch.enter(0.0, &mut rig.host());
    assert_eq!(orch.state(), ActivationState::Idle);
    orch
}

#[inline]
pub fn frame_time(index: u32) -> f64 {
    index as f64 / FPS
}

/// Run frames `from..to` (frame indices at 60 fps).
pub fn run_frames(orch: &mut Orchestrator, rig: &mut Rig, from: u32, to: u32) {
    for i in from..to {
        orch.frame((1.0 / FPS) as f32, frame_time(i), &mut rig.host());
    }
}

/// First frame index whose time is at or after `t`.
pub fn frame_at(t: f64) -> u32 {
    (t * FPS).ceil() as u32
}
