use super::{SelectionMask, SelectionPolygon};
use crate::{rig_error::RigError, types::MaskRenderer};
use image::{Rgba, RgbaImage};
use log::debug;
use nalgebra_glm as glm;

const INSIDE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const OUTSIDE: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// CPU stand-in for the GPU mask pass. Each pixel centre is converted back
/// to NDC and tested against the polygon, matching the orientation used by
/// the vertex projection (row 0 at the top).
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftwareMaskRenderer;

impl SoftwareMaskRenderer {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rasterize(
        polygon: &SelectionPolygon,
        dimensions: [u32; 2],
    ) -> SelectionMask {
        let [width, height] = dimensions;
        let image = RgbaImage::from_fn(width, height, |x, y| {
            let ndc = glm::vec2(
                (x as f32 + 0.5) / width as f32 * 2.0 - 1.0,
                1.0 - (y as f32 + 0.5) / height as f32 * 2.0,
            );
            if polygon.contains(&ndc) {
                INSIDE
            } else {
                OUTSIDE
            }
        });
        SelectionMask::from_rgba(image)
    }
}

impl MaskRenderer for SoftwareMaskRenderer {
    fn render_mask(
        &mut self,
        polygon: &SelectionPolygon,
        dimensions: [u32; 2],
    ) -> Result<SelectionMask, RigError> {
        debug!(
            "software mask {}x{} for {} points",
            dimensions[0],
            dimensions[1],
            polygon.points().len()
        );
        Ok(Self::rasterize(polygon, dimensions))
    }
}
