use crate::{
    assignment::JointAssignmentStore, rig_error::RigError, skin::SkinBinding,
    types::RigTarget, vertex,
};
use log::{debug, warn};
use nalgebra_glm as glm;

/// A mesh being rigged: rest positions, the currently posed positions, the
/// lasso selection and the binding table
#[derive(Clone, Debug)]
pub struct RiggedMesh {
    rest: Vec<glm::Vec3>,
    current: Vec<glm::Vec3>,
    selected: Vec<bool>,
    assignments: JointAssignmentStore,
}

impl RiggedMesh {
    #[must_use]
    pub fn new(positions: Vec<glm::Vec3>) -> Self {
        let count = positions.len();
        Self {
            current: positions.clone(),
            rest: positions,
            selected: vec![false; count],
            assignments: JointAssignmentStore::with_vertex_count(count),
        }
    }

    /// # Errors
    /// Returns `RigError::DataNotConverted` for a malformed position stream
    pub fn from_position_bytes(bytes: &[u8]) -> Result<Self, RigError> {
        Ok(Self::new(vertex::positions_from_bytes(bytes)?))
    }

    #[must_use]
    pub fn rest_positions(&self) -> &[glm::Vec3] {
        &self.rest
    }

    /// Positions after the last skin update
    #[must_use]
    pub fn positions(&self) -> &[glm::Vec3] {
        &self.current
    }

    #[must_use]
    pub const fn assignments(&self) -> &JointAssignmentStore {
        &self.assignments
    }

    #[must_use]
    pub fn selection_flags(&self) -> &[bool] {
        &self.selected
    }

    /// Replaces the selection. Indices past the end are ignored.
    pub fn set_selection(&mut self, vertices: &[usize]) {
        self.selected.fill(false);
        for &v in vertices {
            if let Some(flag) = self.selected.get_mut(v) {
                *flag = true;
            } else {
                warn!("selection index {} out of range", v);
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.fill(false);
    }

    /// Unbinds one joint's vertices, returning how many were unbound
    pub fn clear_joint(&mut self, joint_index: usize) -> usize {
        self.assignments.clear_joint(joint_index)
    }

    /// Moves every bound vertex by its joint's skinning matrix for the pose
    /// and puts unbound vertices back at rest
    pub fn apply_pose(&mut self, binding: &SkinBinding, pose: &[glm::Mat4]) {
        let skinned = binding.skin(&self.rest, &self.assignments, pose);
        for (index, position) in skinned.into_iter().enumerate() {
            self.update_vertex_position(index, position);
        }
    }

    pub fn reset_pose(&mut self) {
        self.current.clone_from(&self.rest);
    }
}

impl RigTarget for RiggedMesh {
    fn vertex_count(&self) -> usize {
        self.rest.len()
    }

    fn selected_vertices(&self) -> Vec<usize> {
        self.selected
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(i, _)| i)
            .collect()
    }

    fn assign_joint_to_vertices(&mut self, joint_index: i32) -> bool {
        let vertices = self.selected_vertices();
        if vertices.is_empty() {
            debug!("nothing selected to bind to joint {}", joint_index);
        }
        self.assignments.assign(&vertices, joint_index)
    }

    fn clear_joint_assignments(&mut self) {
        self.assignments.clear_all();
    }

    fn update_vertex_position(&mut self, index: usize, position: glm::Vec3) {
        if let Some(p) = self.current.get_mut(index) {
            *p = position;
        }
    }
}
