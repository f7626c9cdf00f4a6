//! Vertex to joint binding table
//!
//! Binding is binary: each vertex is driven by at most one joint. The table
//! keeps a forward map (vertex to joint) and an inverse map (joint to set of
//! vertices) that are always mutual inverses:
//! `forward[v] == j` exactly when `v` is in `inverse[j]`.
//!
//! Single writer, main thread only. The skin update reads it through `iter`
//! and `joint_for`.

use crate::rig_error::RigError;
use ahash::{HashMap, HashMapExt, HashSet};
use log::{debug, warn};

#[derive(Clone, Debug, Default)]
pub struct JointAssignmentStore {
    forward: HashMap<usize, usize>,
    inverse: HashMap<usize, HashSet<usize>>,
    vertex_count: Option<usize>,
}

impl JointAssignmentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects vertex indices at or beyond `vertex_count`
    #[must_use]
    pub fn with_vertex_count(vertex_count: usize) -> Self {
        Self {
            forward: HashMap::new(),
            inverse: HashMap::new(),
            vertex_count: Some(vertex_count),
        }
    }

    /// Binds every vertex to `joint_index`, moving vertices already bound to
    /// another joint. A negative joint index or an out of range vertex rejects
    /// the whole call without changing anything.
    pub fn assign(&mut self, vertices: &[usize], joint_index: i32) -> bool {
        match self.try_assign(vertices, joint_index) {
            Ok(_) => true,
            Err(e) => {
                warn!("assign rejected: {e}");
                false
            }
        }
    }

    /// As `assign`, returning the number of vertices moved from another
    /// joint
    ///
    /// # Errors
    /// Returns `RigError::InvalidJoint` or `RigError::VertexOutOfRange`, in
    /// which case nothing was changed
    pub fn try_assign(
        &mut self,
        vertices: &[usize],
        joint_index: i32,
    ) -> Result<usize, RigError> {
        let joint = usize::try_from(joint_index)
            .map_err(|_| RigError::InvalidJoint(i64::from(joint_index)))?;
        if let Some(limit) = self.vertex_count {
            if let Some(bad) = vertices.iter().find(|v| **v >= limit) {
                return Err(RigError::VertexOutOfRange(*bad));
            }
        }

        let mut moved = 0usize;
        for &vertex in vertices {
            if let Some(previous) = self.forward.insert(vertex, joint) {
                if previous == joint {
                    continue;
                }
                self.unlink(vertex, previous);
                moved += 1;
            }
            self.inverse.entry(joint).or_default().insert(vertex);
        }
        debug!(
            "assigned {} vertices to joint {} ({} moved)",
            vertices.len(),
            joint,
            moved
        );
        Ok(moved)
    }

    /// Removes `vertex` from the inverse set of `joint`, dropping the set
    /// when it empties
    fn unlink(&mut self, vertex: usize, joint: usize) {
        if let Some(set) = self.inverse.get_mut(&joint) {
            set.remove(&vertex);
            if set.is_empty() {
                self.inverse.remove(&joint);
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.forward.clear();
        self.inverse.clear();
    }

    /// Unbinds the vertices currently on `joint_index`. Returns how many were
    /// unbound.
    pub fn clear_joint(&mut self, joint_index: usize) -> usize {
        let Some(vertices) = self.inverse.remove(&joint_index) else {
            return 0;
        };
        for vertex in &vertices {
            self.forward.remove(vertex);
        }
        vertices.len()
    }

    /// Vertices bound to `joint_index`, for per joint UI badges
    #[must_use]
    pub fn assignment_count(&self, joint_index: usize) -> usize {
        self.inverse.get(&joint_index).map_or(0, HashSet::len)
    }

    #[must_use]
    pub fn joint_for(&self, vertex_index: usize) -> Option<usize> {
        self.forward.get(&vertex_index).copied()
    }

    /// Vertices bound to `joint_index` in ascending order
    #[must_use]
    pub fn vertices_for(&self, joint_index: usize) -> Vec<usize> {
        let mut vertices: Vec<usize> = self
            .inverse
            .get(&joint_index)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        vertices.sort_unstable();
        vertices
    }

    /// Total number of bound vertices
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Joints with at least one vertex, in ascending order
    #[must_use]
    pub fn joints(&self) -> Vec<usize> {
        let mut joints: Vec<usize> = self.inverse.keys().copied().collect();
        joints.sort_unstable();
        joints
    }

    /// `(vertex, joint)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.forward.iter().map(|(v, j)| (*v, *j))
    }

    /// Checks that the forward and inverse maps are mutual inverses
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let forward_ok = self.forward.iter().all(|(v, j)| {
            self.inverse.get(j).is_some_and(|set| set.contains(v))
        });
        let inverse_total: usize = self.inverse.values().map(HashSet::len).sum();
        let inverse_ok = self.inverse.iter().all(|(j, set)| {
            !set.is_empty()
                && set.iter().all(|v| self.forward.get(v) == Some(j))
        });
        forward_ok && inverse_ok && inverse_total == self.forward.len()
    }
}
