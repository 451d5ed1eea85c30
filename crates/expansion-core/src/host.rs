//! Interfaces to the collaborators that live outside the core: the renderer,
//! the voice channel and the caption overlay.
//!
//! None of these are stored by the orchestrator. Every call that may touch
//! them borrows a [`Host`] for its own duration only.

use crate::camera::Camera;
use crate::domains::Domain;
use crate::error::Result;
use crate::particles::ParticleField;

/// Mutable view of the render pipeline. The core never builds or owns it.
pub trait RenderBackend {
    fn set_bloom_strength(&mut self, strength: f32);
    fn set_time_scale(&mut self, time_scale: f32);
    fn set_camera(&mut self, camera: &Camera);
    fn set_backdrop(&mut self, rgb: [f32; 3]);
    fn set_fog_color(&mut self, rgb: [f32; 3]);
    fn set_particle_size(&mut self, size: f32);
    fn set_exposure(&mut self, exposure: f32);
    /// Ambient rotation of the particle object around +Y, in radians.
    fn set_field_rotation(&mut self, radians: f32);
    /// Hand the current particle arrays over for upload.
    fn upload_particles(&mut self, field: &ParticleField);
}

/// Identifies one `play` request. Completion is reported back with the same
/// token and is accepted at most once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaybackToken(u64);

impl PlaybackToken {
    pub(crate) fn new(generation: u64) -> Self {
        Self(generation)
    }

    #[inline]
    pub fn generation(self) -> u64 {
        self.0
    }
}

pub trait VoicePlayer {
    /// Start the voice line for `domain`. When it ends, the host reports
    /// `token` through `Orchestrator::voice_finished`. A rejected or blocked
    /// playback may never report completion.
    fn play(&mut self, domain: Domain, token: PlaybackToken) -> Result<()>;
    fn stop(&mut self);
}

/// Fire-and-forget subtitle overlay.
pub trait CaptionDisplay {
    fn show(&mut self, domain: Domain);
    fn hide(&mut self);
}

/// Per-call borrow of every external collaborator.
pub struct Host<'a> {
    pub render: &'a mut dyn RenderBackend,
    pub voice: &'a mut dyn VoicePlayer,
    pub captions: &'a mut dyn CaptionDisplay,
}

impl<'a> Host<'a> {
    pub fn new(
        render: &'a mut dyn RenderBackend,
        voice: &'a mut dyn VoicePlayer,
        captions: &'a mut dyn CaptionDisplay,
    ) -> Self {
        Self {
            render,
            voice,
            captions,
        }
    }
}
