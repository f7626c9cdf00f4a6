//! Display hierarchy for a flat, parent indexed joint array
//!
//! Joints stay in their array and are addressed by index. No parent or child
//! object graph is built. Capture data can contain parent indices that are
//! out of range, self referencing or cyclic, so every walk up the parent
//! chain is bounded by a visited set and a depth cap.

use crate::{animation::Joint, types::MAX_DEPTH};
use ahash::{HashSet, HashSetExt};
use log::debug;

/// UI facing view of one joint
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HierarchyNode {
    pub joint_id: i32,
    /// Length of the ancestor chain, capped at `max_depth` and `MAX_DEPTH`
    pub depth: usize,
    pub is_root: bool,
    /// No other joint names this one as its parent
    pub is_leaf: bool,
    pub is_anomalous: bool,
}

/// Named thresholds for the hierarchy walk.
///
/// `anomaly_gap` encodes one capture tool's ordering convention, where joint
/// order roughly follows depth and a parent index jumping back by more than
/// the gap marks an index reset. It is not expected to hold for arbitrary
/// skeletons.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HierarchyOptions {
    pub anomaly_gap: usize,
    pub max_depth: usize,
}

impl Default for HierarchyOptions {
    fn default() -> Self {
        Self {
            anomaly_gap: 5,
            max_depth: MAX_DEPTH,
        }
    }
}

/// Depth of joint `index` found by walking up the parent links. Stops at a
/// root, an out of range parent, a joint already visited, or the cap.
/// `max_depth` can lower the cap below `MAX_DEPTH` but not raise it.
#[must_use]
pub fn depth(parents: &[Option<usize>], index: usize, max_depth: usize) -> usize {
    let max_depth = max_depth.min(MAX_DEPTH);
    let count = parents.len();
    let mut visited = HashSet::new();
    visited.insert(index);
    let mut depth = 0;
    let mut current = parents.get(index).copied().flatten();
    while let Some(parent) = current {
        if parent >= count || depth >= max_depth || !visited.insert(parent) {
            break;
        }
        depth += 1;
        current = parents[parent];
    }
    depth
}

fn is_anomalous(
    parents: &[Option<usize>],
    index: usize,
    gap: usize,
) -> bool {
    if index == 0 {
        return false;
    }
    let Some(parent) = parents[index] else {
        return false;
    };
    // Parent far behind this joint's own index
    let far_behind = parent + gap < index;
    // Previous joint's parent far ahead of this one
    let reset = parents[index - 1].is_some_and(|prev| prev > parent + gap);
    far_behind || reset
}

/// Builds one node per joint, in input order, using the default thresholds
#[must_use]
pub fn build(joints: &[Joint]) -> Vec<HierarchyNode> {
    build_with(joints, &HierarchyOptions::default())
}

#[must_use]
pub fn build_with(
    joints: &[Joint],
    options: &HierarchyOptions,
) -> Vec<HierarchyNode> {
    let parents: Vec<Option<usize>> = joints.iter().map(|j| j.parent).collect();
    let count = parents.len();

    // Count children so the leaf test is a single pass. Self references
    // don't make a joint its own child.
    let mut child_counts = vec![0usize; count];
    for (index, parent) in parents.iter().enumerate() {
        if let Some(p) = *parent {
            if p < count && p != index {
                child_counts[p] += 1;
            }
        }
    }

    let nodes: Vec<HierarchyNode> = joints
        .iter()
        .enumerate()
        .map(|(index, joint)| HierarchyNode {
            joint_id: joint.id,
            depth: depth(&parents, index, options.max_depth),
            is_root: joint.parent.is_none(),
            is_leaf: child_counts[index] == 0,
            is_anomalous: is_anomalous(&parents, index, options.anomaly_gap),
        })
        .collect();

    debug!(
        "hierarchy joints={} roots={} anomalies={}",
        count,
        nodes.iter().filter(|n| n.is_root).count(),
        nodes.iter().filter(|n| n.is_anomalous).count()
    );
    nodes
}

/// Indices of the joints whose parent is `index`, in array order
#[must_use]
pub fn children(joints: &[Joint], index: usize) -> Vec<usize> {
    joints
        .iter()
        .enumerate()
        .filter(|(i, j)| *i != index && j.parent == Some(index))
        .map(|(i, _)| i)
        .collect()
}
