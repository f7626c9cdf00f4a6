use super::types::Animation;
use crate::interpolate;
use nalgebra_glm as glm;

/// Where a time falls between two frames of a clip
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePosition {
    pub index: usize,
    pub next: usize,
    /// Blend factor from `index` towards `next`, in [0, 1)
    pub factor: f32,
}

/// Maps a time to a pair of frames. Frames are treated as evenly spaced over
/// the duration; timestamps stored in the frames are not consulted.
#[must_use]
pub fn frame_position(
    current_time: f32,
    duration: f32,
    frame_count: usize,
) -> FramePosition {
    if frame_count < 2 || duration <= 0.0 {
        return FramePosition {
            index: 0,
            next: 0,
            factor: 0.0,
        };
    }
    let last = frame_count - 1;
    let progress = (current_time / duration).clamp(0.0, 1.0);
    #[allow(clippy::cast_precision_loss)]
    let exact = progress * last as f32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (exact.floor() as usize).min(last);
    #[allow(clippy::cast_precision_loss)]
    let factor = (exact - index as f32).clamp(0.0, 1.0);
    FramePosition {
        index,
        next: (index + 1).min(last),
        factor,
    }
}

/// Returns the joint local transforms for an animation at an arbitrary
/// time. An empty clip produces an empty pose.
#[must_use]
pub fn sample(animation: &Animation, current_time: f32) -> Vec<glm::Mat4> {
    let frames = animation.frames();
    if frames.is_empty() {
        return Vec::new();
    }
    let pos =
        frame_position(current_time, animation.duration(), frames.len());
    let (a, b) = (&frames[pos.index], &frames[pos.next]);
    if pos.factor <= 0.0 || pos.index == pos.next {
        return a.pose();
    }
    a.joints
        .iter()
        .zip(&b.joints)
        .map(|(ja, jb)| interpolate::blend(&ja.local, &jb.local, pos.factor))
        .collect()
}
