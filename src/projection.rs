use crate::types::CameraTrait;
use nalgebra_glm as glm;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Clip space w closer to zero than this can't be divided by
const W_EPSILON: f32 = 1.0e-6;

/// A vertex that landed inside the view, in pixel coordinates with row 0 at
/// the top
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedVertex {
    pub index: usize,
    pub screen: glm::Vec2,
}

impl ProjectedVertex {
    /// Nearest pixel, clamped into an image of the given size
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn pixel(&self, dimensions: [u32; 2]) -> [u32; 2] {
        let clamp = |v: f32, size: u32| {
            v.round().clamp(0.0, size.saturating_sub(1) as f32) as u32
        };
        [
            clamp(self.screen.x, dimensions[0]),
            clamp(self.screen.y, dimensions[1]),
        ]
    }
}

/// Projects one position. Returns `None` if w is too close to zero or the
/// point falls outside [-1, 1] in x or y after the perspective divide.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn project_point(
    position: &glm::Vec3,
    mvp: &glm::Mat4,
    dimensions: [u32; 2],
) -> Option<glm::Vec2> {
    let clip = mvp * glm::vec4(position.x, position.y, position.z, 1.0);
    if clip.w.abs() < W_EPSILON {
        return None;
    }
    let ndc = glm::vec2(clip.x / clip.w, clip.y / clip.w);
    if !(-1.0..=1.0).contains(&ndc.x) || !(-1.0..=1.0).contains(&ndc.y) {
        return None;
    }
    let width = dimensions[0] as f32;
    let height = dimensions[1] as f32;
    Some(glm::vec2(
        (ndc.x + 1.0) * 0.5 * width,
        (1.0 - (ndc.y + 1.0) * 0.5) * height,
    ))
}

/// Projects mesh positions through `projection * view * model`. Vertices
/// that can't be evaluated this frame are left out, so the output is not
/// index aligned with the input; use `ProjectedVertex::index`.
#[must_use]
pub fn project(
    positions: &[glm::Vec3],
    model: &glm::Mat4,
    view: &glm::Mat4,
    projection: &glm::Mat4,
    dimensions: [u32; 2],
) -> Vec<ProjectedVertex> {
    let mvp = projection * view * model;

    #[cfg(feature = "rayon")]
    let it = positions.par_iter().enumerate();
    #[cfg(not(feature = "rayon"))]
    let it = positions.iter().enumerate();
    it.filter_map(|(index, position)| {
        project_point(position, &mvp, dimensions)
            .map(|screen| ProjectedVertex { index, screen })
    })
    .collect()
}

/// Convenience wrapper taking the view and projection from a camera
#[must_use]
pub fn project_with_camera(
    positions: &[glm::Vec3],
    model: &glm::Mat4,
    camera: &impl CameraTrait,
    dimensions: [u32; 2],
) -> Vec<ProjectedVertex> {
    project(
        positions,
        model,
        &camera.view_matrix(),
        &camera.proj_matrix(),
        dimensions,
    )
}
