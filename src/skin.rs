//! Rigid skinning of bound vertices
//!
//! Each bound vertex follows exactly one joint:
//! `skinned = world[j] * inverse_bind[j] * rest`, where the bind pose is the
//! first frame of the clip. Unbound vertices stay at their rest position.

use crate::{
    animation::Animation, assignment::JointAssignmentStore, interpolate,
};
use ahash::{HashSet, HashSetExt};
use bytemuck::{Pod, Zeroable};
use log::{debug, warn};
use nalgebra_glm as glm;

/// Composes joint local transforms into world space. Walks up each parent
/// chain with the same guards as the hierarchy walk, so cyclic or out of
/// range parents end the chain instead of looping.
#[must_use]
pub fn world_transforms(
    parents: &[Option<usize>],
    locals: &[glm::Mat4],
) -> Vec<glm::Mat4> {
    let count = parents.len().min(locals.len());
    let mut visited = HashSet::with_capacity(count);
    let mut chain = Vec::new();
    (0..count)
        .map(|index| {
            visited.clear();
            chain.clear();
            let mut current = Some(index);
            while let Some(i) = current {
                if i >= count || !visited.insert(i) {
                    break;
                }
                chain.push(i);
                current = parents[i];
            }
            // Chain runs child to root, compose root first
            chain
                .iter()
                .rev()
                .fold(glm::Mat4::identity(), |world, i| world * locals[*i])
        })
        .collect()
}

/// Column major joint matrix laid out for upload to a GPU buffer
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Zeroable, Pod)]
pub struct JointMatrix {
    pub columns: [[f32; 4]; 4],
}

impl From<&glm::Mat4> for JointMatrix {
    fn from(m: &glm::Mat4) -> Self {
        Self {
            columns: (*m).into(),
        }
    }
}

/// Converts a set of transforms for upload
#[must_use]
pub fn palette(transforms: &[glm::Mat4]) -> Vec<JointMatrix> {
    transforms.iter().map(JointMatrix::from).collect()
}

#[must_use]
pub fn palette_bytes(palette: &[JointMatrix]) -> &[u8] {
    bytemuck::cast_slice(palette)
}

/// Bind pose of a clip's skeleton
#[derive(Clone, Debug)]
pub struct SkinBinding {
    parents: Vec<Option<usize>>,
    inverse_bind: Vec<glm::Mat4>,
}

impl SkinBinding {
    /// Captures the bind pose from the first frame. Returns `None` for a clip
    /// without frames.
    #[must_use]
    pub fn from_animation(animation: &Animation) -> Option<Self> {
        let first = animation.first_frame()?;
        let parents: Vec<Option<usize>> =
            first.joints.iter().map(|j| j.parent).collect();
        let world = world_transforms(&parents, &first.pose());
        let inverse_bind = world
            .iter()
            .enumerate()
            .map(|(i, m)| {
                m.try_inverse().unwrap_or_else(|| {
                    warn!("joint {} bind transform is not invertible", i);
                    glm::Mat4::identity()
                })
            })
            .collect();
        Some(Self {
            parents,
            inverse_bind,
        })
    }

    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.parents.len()
    }

    /// Per joint skinning matrices for a pose of joint local transforms
    #[must_use]
    pub fn skinning_matrices(&self, locals: &[glm::Mat4]) -> Vec<glm::Mat4> {
        world_transforms(&self.parents, locals)
            .iter()
            .zip(&self.inverse_bind)
            .map(|(world, inverse)| world * inverse)
            .collect()
    }

    /// Skinned position of every vertex. Vertices bound to a joint the pose
    /// doesn't cover stay at rest.
    #[must_use]
    pub fn skin(
        &self,
        rest: &[glm::Vec3],
        assignments: &JointAssignmentStore,
        locals: &[glm::Mat4],
    ) -> Vec<glm::Vec3> {
        let matrices = self.skinning_matrices(locals);
        let mut missing = 0usize;
        let positions = rest
            .iter()
            .enumerate()
            .map(|(v, p)| match assignments.joint_for(v) {
                Some(j) if j < matrices.len() => {
                    interpolate::transform_point(p, &matrices[j])
                }
                Some(_) => {
                    missing += 1;
                    *p
                }
                None => *p,
            })
            .collect();
        if missing > 0 {
            debug!("{} vertices bound to joints outside the pose", missing);
        }
        positions
    }
}

#[cfg(test)]
mod tests {
    use nalgebra_glm as glm;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn cyclic_parents_terminate() {
        let parents = [Some(1), Some(0), Some(2)];
        let locals = [glm::translation(&glm::vec3(1.0, 0.0, 0.0)); 3];
        let world = super::world_transforms(&parents, &locals);
        assert_eq!(world.len(), 3);
        // Each chain visits both joints of the cycle once
        let expected = glm::translation(&glm::vec3(2.0, 0.0, 0.0));
        let c = glm::equal_columns_eps(&world[0], &expected, EPSILON);
        assert!(c.x && c.y && c.z && c.w);
        let c = glm::equal_columns_eps(&world[2], &locals[2], EPSILON);
        assert!(c.x && c.y && c.z && c.w);
    }

    #[test]
    fn palette_layout() {
        let m = glm::translation(&glm::vec3(5.0, 6.0, 7.0));
        let palette = super::palette(&[m]);
        assert_eq!(palette[0].columns[3], [5.0, 6.0, 7.0, 1.0]);
        assert_eq!(super::palette_bytes(&palette).len(), 64);
    }
}
