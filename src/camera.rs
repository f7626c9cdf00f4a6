//! Orbit camera for the rigging viewport
//!
//! Motion capture data is Z up. The eye circles a focus point: yaw turns
//! around +Z starting from the -Y side, pitch lifts the eye above the XY
//! plane. Projection is right-handed with OpenGL clip depth, so NDC Y points
//! up as the projector expects.

use crate::types::CameraTrait;
use log::debug;
use nalgebra_glm as glm;
use std::f32::consts::FRAC_PI_2;

const NEAR_CLIP_METERS: f32 = 0.1;
const FAR_CLIP_METERS: f32 = 100.0;
const MIN_DISTANCE: f32 = 0.5;
// Keeps the view direction off the up axis
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
// Room left around a framed skeleton
const FRAME_MARGIN: f32 = 1.1;

#[derive(Debug, Copy, Clone)]
pub struct OrbitCamera {
    focus: glm::Vec3,
    distance: f32,
    yaw: f32,
    pitch: f32,
    aspect_ratio: f32,
    fovy: f32,
    view: glm::Mat4,
    proj: glm::Mat4,
}

impl Default for OrbitCamera {
    /// Eight metres in front of a point at standing chest height
    fn default() -> Self {
        Self::new(glm::vec3(0.0, 0.0, 1.0), 8.0)
    }
}

impl CameraTrait for OrbitCamera {
    fn view_matrix(&self) -> glm::Mat4 {
        self.view
    }

    fn proj_matrix(&self) -> glm::Mat4 {
        self.proj
    }
}

impl OrbitCamera {
    /// Camera looking at `focus` from `distance` away along -Y, with a 16:9
    /// viewport and a 27 degree vertical field of view
    #[must_use]
    pub fn new(focus: glm::Vec3, distance: f32) -> Self {
        let mut camera = Self {
            focus,
            distance: distance.max(MIN_DISTANCE),
            yaw: 0.0,
            pitch: 0.0,
            aspect_ratio: 16.0 / 9.0,
            fovy: 0.471,
            view: glm::Mat4::identity(),
            proj: glm::Mat4::identity(),
        };
        camera.rebuild();
        camera
    }

    /// Replaces the lens. Non-positive or non-finite values are ignored.
    pub fn set_lens(&mut self, aspect_ratio: f32, fovy: f32) {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
        }
        if fovy.is_finite() && fovy > 0.0 && fovy < std::f32::consts::PI {
            self.fovy = fovy;
        }
        self.rebuild();
    }

    /// Turns the eye around the focus. Pitch is held short of straight up
    /// or down.
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        if delta_yaw.is_finite() {
            self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
        }
        if delta_pitch.is_finite() {
            self.pitch =
                (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        self.rebuild();
    }

    /// Scales the distance to the focus, 0.5 moves halfway in
    pub fn dolly(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).max(MIN_DISTANCE);
            self.rebuild();
        }
    }

    pub fn set_focus(&mut self, focus: &glm::Vec3) {
        self.focus = *focus;
        self.rebuild();
    }

    /// Moves the focus to the centre of `points` and backs off until the
    /// sphere around them fits the narrower field of view. Direction is
    /// kept. Returns false, leaving the camera alone, for no points.
    pub fn frame(&mut self, points: &[glm::Vec3]) -> bool {
        let Some(first) = points.first() else {
            return false;
        };
        let (lo, hi) = points.iter().fold((*first, *first), |(lo, hi), p| {
            (glm::min2(&lo, p), glm::max2(&hi, p))
        });
        let centre = (lo + hi) * 0.5;
        let radius = points
            .iter()
            .map(|p| glm::distance(p, &centre))
            .fold(0.0f32, f32::max);
        let fovx = 2.0 * ((self.fovy * 0.5).tan() * self.aspect_ratio).atan();
        let half_angle = self.fovy.min(fovx) * 0.5;
        self.focus = centre;
        self.distance =
            (FRAME_MARGIN * radius / half_angle.sin()).max(MIN_DISTANCE);
        debug!(
            "framed {} points radius={} distance={}",
            points.len(),
            radius,
            self.distance
        );
        self.rebuild();
        true
    }

    /// Position of the eye in world space
    #[must_use]
    pub fn eye(&self) -> glm::Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.focus
            + glm::vec3(sin_yaw * cos_pitch, -cos_yaw * cos_pitch, sin_pitch)
                * self.distance
    }

    #[must_use]
    pub const fn focus(&self) -> glm::Vec3 {
        self.focus
    }

    #[must_use]
    pub const fn distance(&self) -> f32 {
        self.distance
    }

    /// Calculate the combined projection, view and model matrix
    #[must_use]
    pub fn mvp(&self, m: &glm::Mat4) -> glm::Mat4 {
        self.proj * self.view * m
    }

    fn rebuild(&mut self) {
        self.view = glm::look_at_rh(
            &self.eye(),
            &self.focus,
            &glm::vec3(0.0, 0.0, 1.0),
        );
        // Far plane grows with the skeleton so a framed rig is never clipped
        let far = FAR_CLIP_METERS.max(self.distance * 3.0);
        self.proj = glm::perspective_rh_no(
            self.aspect_ratio,
            self.fovy,
            NEAR_CLIP_METERS,
            far,
        );
    }
}

/// Vertical field of view for a focal length in mm on a 35mm sensor
#[must_use]
pub fn focal_length_to_fovy(focal_length: f32) -> f32 {
    // Half of the 24mm sensor height
    (12.0 / focal_length.max(1.0)).atan() * 2.0
}
