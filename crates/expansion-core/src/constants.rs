use glam::Vec3;

// Shared visual tuning constants. There are no runtime flags.

// Particles
pub const PARTICLE_COUNT: usize = 12_000;
pub const PARTICLE_SIZE: f32 = 1.2; // base sprite size before multipliers
pub const PARTICLE_SPREAD: f32 = 50.0; // outer radius of the initial volume
pub const MIN_RADIUS: f32 = 2.0; // keeps the core of the volume empty
pub const IDLE_COLOR: [f32; 3] = [0.7, 0.8, 1.0]; // subtle bluish-white

// Inward collapse during charge (applied per frame, not per second)
pub const CHARGE_STRENGTH: f32 = 0.3;
pub const CHARGE_STEP_FACTOR: f32 = 0.02;

// Timing (seconds)
pub const CHARGE_DURATION_SEC: f64 = 1.2;
pub const FREEZE_DURATION_SEC: f64 = 0.18;
pub const SPIKE_DURATION_SEC: f64 = 0.6;

// Bloom
pub const BASE_BLOOM: f32 = 0.8;
pub const CHARGE_BLOOM: f32 = 1.8;
pub const ACTIVE_BLOOM: f32 = 2.5;

// Renderer
pub const FOG_DENSITY: f32 = 0.02;
pub const TONE_EXPOSURE: f32 = 0.9;
pub const BASE_BACKDROP: [f32; 3] = [0.0, 0.0, 0.0];

// Charge ramp peaks
pub const CHARGE_SIZE_PEAK: f32 = 1.35;
pub const CHARGE_EXPOSURE_PEAK: f32 = 1.25;
pub const CHARGE_ROTATION_RATE: f32 = 0.35; // rad/s around +Y
pub const CHARGE_TINT: [f32; 3] = [0.10, 0.03, 0.14];
pub const CHARGE_SHAKE_MAX: f32 = 0.35;
pub const CHARGE_SLOWDOWN: f32 = 0.15; // time-scale target at t=1 is 1 - this

// Freeze-frame
pub const FREEZE_TIME_SCALE: f32 = 0.05;
pub const FREEZE_EXPOSURE: f32 = 1.35;
pub const FREEZE_SHAKE: f32 = 0.05;

// Active spike (scaled by the eased envelope)
pub const SPIKE_SIZE_BOOST: f32 = 1.5;
pub const SPIKE_EXPOSURE_BOOST: f32 = 0.8;
pub const SPIKE_SHAKE: f32 = 1.2;
pub const SPIKE_FLASH_TINT: [f32; 3] = [0.35, 0.35, 0.40];
pub const BURST_TIME_SCALE: f32 = 1.6;

// Time-scale smoothing
pub const TIME_SCALE_TAU_SEC: f32 = 0.08;

// Camera
pub const CAM_DISTANCE: f32 = 60.0;
pub const CAM_FOV_DEGREES: f32 = 65.0;
pub const CAM_NEAR: f32 = 0.1;
pub const CAM_FAR: f32 = 500.0;
pub const ORBIT_THETA_RANGE: f32 = std::f32::consts::PI * 0.4; // ±72°
pub const ORBIT_PHI_RANGE: f32 = std::f32::consts::PI * 0.2; // ±36°
pub const ORBIT_SENSITIVITY: f32 = 1.0;
pub const ORBIT_INERTIA: f32 = 0.05; // fraction of remaining distance per tick

// Idle drift
pub const IDLE_DRIFT_AMPLITUDE: [f32; 2] = [1.5, 0.8];
pub const IDLE_DRIFT_FREQUENCY: [f32; 2] = [0.11, 0.07];

// Session seed used when none is supplied
pub const DEFAULT_SEED: u64 = 42;

#[inline]
pub fn front_camera_position() -> Vec3 {
    Vec3::new(0.0, 0.0, CAM_DISTANCE)
}
