//! Scene camera and the pointer-driven orbit used in the control phase.

use crate::constants::*;
use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::front(16.0 / 9.0)
    }
}

impl Camera {
    /// Canonical front-facing camera looking at the origin.
    pub fn front(aspect: f32) -> Self {
        Self {
            eye: front_camera_position(),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            fovy_radians: CAM_FOV_DEGREES.to_radians(),
            znear: CAM_NEAR,
            zfar: CAM_FAR,
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// World to clip space, the single matrix a point-sprite pass needs.
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Normalized device coordinates of a world point, or `None` when it
    /// sits behind the eye.
    pub fn project(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.view_projection() * world.extend(1.0);
        (clip.w > 0.0).then(|| clip.truncate() / clip.w)
    }

    #[inline]
    pub fn look_at_origin(&mut self) {
        self.target = Vec3::ZERO;
    }
}

/// Smooths the camera toward a spherical target derived from the pointer.
///
/// Pointer coordinates are normalized to `[-1, 1]` on both axes. Horizontal
/// input maps to `theta` within ±72°, vertical input to `phi` within ±36°
/// around the equator.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraOrbitController {
    enabled: bool,
    theta: f32,
    phi: f32,
    sensitivity: f32,
    inertia: f32,
}

impl Default for CameraOrbitController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraOrbitController {
    pub fn new() -> Self {
        Self {
            enabled: false,
            theta: 0.0,
            phi: FRAC_PI_2,
            sensitivity: ORBIT_SENSITIVITY,
            inertia: ORBIT_INERTIA,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    #[inline]
    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    /// `(theta, phi)` the camera is easing toward.
    #[inline]
    pub fn target_angles(&self) -> (f32, f32) {
        (self.theta, self.phi)
    }

    pub fn enable(&mut self, sensitivity: Option<f32>, inertia: Option<f32>) {
        self.enabled = true;
        self.sensitivity = sensitivity.unwrap_or(ORBIT_SENSITIVITY);
        self.inertia = inertia.unwrap_or(ORBIT_INERTIA).clamp(0.0, 1.0);
        log::debug!(
            "[camera] orbit on (sensitivity={:.2}, inertia={:.3})",
            self.sensitivity,
            self.inertia
        );
    }

    /// Turn the orbit off, restore defaults and snap `camera` to the front.
    pub fn disable(&mut self, camera: &mut Camera) {
        *self = Self::new();
        camera.eye = front_camera_position();
        camera.look_at_origin();
    }

    /// Update the target from a normalized pointer position. Ignored while
    /// disabled.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if !self.enabled {
            return;
        }
        let nx = (x * self.sensitivity).clamp(-1.0, 1.0);
        let ny = (y * self.sensitivity).clamp(-1.0, 1.0);
        self.theta = nx * ORBIT_THETA_RANGE;
        self.phi = FRAC_PI_2 + ny * ORBIT_PHI_RANGE;
    }

    /// Cartesian point on the orbit sphere for the current target angles.
    pub fn target_position(&self) -> Vec3 {
        let r = CAM_DISTANCE;
        Vec3::new(
            r * self.phi.sin() * self.theta.sin(),
            r * self.phi.cos(),
            r * self.phi.sin() * self.theta.cos(),
        )
    }

    /// Ease `camera` a fraction `inertia` of the way to the target.
    pub fn tick(&self, camera: &mut Camera) {
        if !self.enabled {
            return;
        }
        let target = self.target_position();
        camera.eye += (target - camera.eye) * self.inertia;
        camera.look_at_origin();
    }
}
