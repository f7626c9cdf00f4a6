use super::{SelectionPolygon, SelectionResolver};
use crate::{
    config::RigConfig,
    rig_error::RigError,
    types::{CameraTrait, MaskRenderer},
};
use log::{info, warn};
use nalgebra_glm as glm;

/// Lasso workflow. Dragging only grows the polygon; the mask render and
/// resolve happen once, in `complete`, which blocks until the renderer has
/// the mask readable.
pub struct SelectionTool {
    polygon: SelectionPolygon,
    resolver: SelectionResolver,
    renderer: Box<dyn MaskRenderer>,
    mask_size: [u32; 2],
    point_epsilon: f32,
    dragging: bool,
}

impl std::fmt::Debug for SelectionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SelectionTool")
            .field("polygon", &self.polygon)
            .field("mask_size", &self.mask_size)
            .field("dragging", &self.dragging)
            .finish_non_exhaustive()
    }
}

impl SelectionTool {
    #[must_use]
    pub fn new(renderer: Box<dyn MaskRenderer>, config: &RigConfig) -> Self {
        Self {
            polygon: SelectionPolygon::new(config.point_epsilon),
            resolver: SelectionResolver::new(config.mask_threshold),
            renderer,
            mask_size: config.mask_size,
            point_epsilon: config.point_epsilon,
            dragging: false,
        }
    }

    /// Starts a new lasso, discarding any previous polygon
    pub fn begin(&mut self, point: glm::Vec2) {
        self.polygon = SelectionPolygon::new(self.point_epsilon);
        self.polygon.push(point);
        self.dragging = true;
    }

    /// Adds a point to the lasso being drawn. Ignored when not dragging.
    pub fn drag(&mut self, point: glm::Vec2) -> bool {
        self.dragging && self.polygon.push(point)
    }

    /// Finishes the lasso and resolves it against the mesh. A polygon with
    /// fewer than 3 points clears the selection and is not an error.
    ///
    /// # Errors
    /// Returns `RigError::MaskUnavailable` wrapping the renderer's error, or
    /// `RigError::DegenerateMask` for a mask smaller than 2x2. The selection
    /// is cleared in both cases.
    pub fn complete(
        &mut self,
        positions: &[glm::Vec3],
        model: &glm::Mat4,
        camera: &impl CameraTrait,
    ) -> Result<Vec<usize>, RigError> {
        self.dragging = false;
        self.polygon.complete();
        if self.polygon.is_empty() {
            info!(
                "lasso with {} points selects nothing",
                self.polygon.points().len()
            );
            self.resolver.clear(positions.len());
            return Ok(Vec::new());
        }

        let mask = match self.renderer.render_mask(&self.polygon, self.mask_size)
        {
            Ok(mask) => mask,
            Err(e) => {
                warn!("selection mask unavailable: {e}");
                self.resolver.clear(positions.len());
                return Err(RigError::MaskUnavailable(Box::new(e)));
            }
        };
        self.resolver.resolve(positions, model, camera, &mask)?;
        let selected = self.resolver.selected_indices();
        info!("lasso selected {} vertices", selected.len());
        Ok(selected)
    }

    /// Drops the polygon and any selection
    pub fn cancel(&mut self) {
        self.polygon = SelectionPolygon::new(self.point_epsilon);
        self.resolver.clear(0);
        self.dragging = false;
    }

    #[must_use]
    pub const fn polygon(&self) -> &SelectionPolygon {
        &self.polygon
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Selection flags from the last completed lasso
    #[must_use]
    pub fn flags(&self) -> &[bool] {
        self.resolver.flags()
    }

    #[must_use]
    pub fn selected_indices(&self) -> Vec<usize> {
        self.resolver.selected_indices()
    }
}
