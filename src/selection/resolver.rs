use super::SelectionMask;
use crate::{projection, rig_error::RigError, types::CameraTrait};
use log::{debug, warn};
use nalgebra_glm as glm;

/// Turns a rendered mask into per-vertex selection flags. The flag buffer is
/// kept between calls to avoid reallocating for every lasso.
#[derive(Clone, Debug)]
pub struct SelectionResolver {
    flags: Vec<bool>,
    threshold: f32,
}

impl Default for SelectionResolver {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl SelectionResolver {
    /// Mask coverage above `threshold` selects a vertex
    #[must_use]
    pub const fn new(threshold: f32) -> Self {
        Self {
            flags: Vec::new(),
            threshold,
        }
    }

    /// Resets the flags to unselected for `vertex_count` vertices
    pub fn clear(&mut self, vertex_count: usize) {
        self.flags.clear();
        self.flags.resize(vertex_count, false);
    }

    /// Marks every vertex whose projected pixel is inside the mask. Vertices
    /// behind the camera or off screen are left unselected. The mask must be
    /// the one rendered for the current polygon.
    ///
    /// # Errors
    /// Returns `RigError::DegenerateMask` for a mask smaller than 2x2, with
    /// all flags cleared
    pub fn resolve(
        &mut self,
        positions: &[glm::Vec3],
        model: &glm::Mat4,
        camera: &impl CameraTrait,
        mask: &SelectionMask,
    ) -> Result<&[bool], RigError> {
        self.clear(positions.len());
        if mask.is_degenerate() {
            let [width, height] = mask.dimensions();
            warn!("selection mask {}x{} is degenerate", width, height);
            return Err(RigError::DegenerateMask { width, height });
        }

        let dimensions = mask.dimensions();
        let projected = projection::project_with_camera(
            positions, model, camera, dimensions,
        );
        for vertex in &projected {
            let [x, y] = vertex.pixel(dimensions);
            if mask.is_inside(x, y, self.threshold) {
                self.flags[vertex.index] = true;
            }
        }
        debug!(
            "resolved {} of {} projected vertices ({} total)",
            self.flags.iter().filter(|f| **f).count(),
            projected.len(),
            positions.len()
        );
        Ok(&self.flags)
    }

    #[must_use]
    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    #[must_use]
    pub fn selected_indices(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(i, _)| i)
            .collect()
    }
}
