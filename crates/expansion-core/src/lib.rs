pub mod camera;
pub mod clock;
pub mod constants;
pub mod domains;
pub mod effects;
pub mod error;
pub mod gesture;
pub mod host;
pub mod orchestrator;
pub mod particles;
pub mod scheduler;
pub mod state;

pub use camera::*;
pub use clock::SessionClock;
pub use constants::*;
pub use domains::{Atmosphere, CameraProfile, Domain, DomainBehavior, DomainRegistry};
pub use effects::{FrameParameters, Overlay, TransientEffects};
pub use error::ExpansionError;
pub use host::*;
pub use orchestrator::*;
pub use particles::ParticleField;
pub use state::*;
