use crate::{
    rig_error::RigError,
    selection::{SelectionMask, SelectionPolygon},
};
use nalgebra_glm as glm;

/// Trait for camera matrices, needed for projecting vertices to the screen
pub trait CameraTrait {
    fn view_matrix(&self) -> glm::Mat4;
    fn proj_matrix(&self) -> glm::Mat4;
}

/// The operations the rigging workflow needs from whatever mesh is being
/// edited. Selection writes through `assign_joint_to_vertices`, the skin
/// update writes through `update_vertex_position`.
pub trait RigTarget {
    fn vertex_count(&self) -> usize;

    /// Indices of the vertices currently selected
    fn selected_vertices(&self) -> Vec<usize>;

    /// Binds the current selection to a joint. Returns false if the joint
    /// index was rejected.
    fn assign_joint_to_vertices(&mut self, joint_index: i32) -> bool;

    fn clear_joint_assignments(&mut self);

    fn update_vertex_position(&mut self, index: usize, position: glm::Vec3);
}

/// Produces the selection mask for a completed polygon. Implementations must
/// not return until the mask is readable on the CPU.
pub trait MaskRenderer {
    /// # Errors
    /// Returns `RigError` when the mask could not be rendered or read back
    fn render_mask(
        &mut self,
        polygon: &SelectionPolygon,
        dimensions: [u32; 2],
    ) -> Result<SelectionMask, RigError>;
}

/// Hard cap on reported hierarchy depth
pub const MAX_DEPTH: usize = 10;
