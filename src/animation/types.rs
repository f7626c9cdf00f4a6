use crate::rig_error::RigError;
use nalgebra_glm as glm;

#[derive(Clone, Debug)]
pub struct Joint {
    pub id: i32,
    pub name: String,
    /// Index of the parent in the same joint array. Not necessarily lower
    /// than this joint's own index.
    pub parent: Option<usize>,
    pub local: glm::Mat4,
    pub world: glm::Mat4,
}

impl Joint {
    /// Creates a joint whose world transform is initially its local transform
    #[must_use]
    pub fn new(
        id: i32,
        name: &str,
        parent: Option<usize>,
        local: glm::Mat4,
    ) -> Self {
        Self {
            id,
            name: name.to_owned(),
            parent,
            local,
            world: local,
        }
    }
}

/// One sampled instant of an animation
#[derive(Clone, Debug)]
pub struct Frame {
    pub id: i32,
    pub joints: Vec<Joint>,
    pub timestamp: f32,
    pub body: glm::Mat4,
}

impl Frame {
    #[must_use]
    pub fn new(id: i32, timestamp: f32, joints: Vec<Joint>) -> Self {
        Self {
            id,
            joints,
            timestamp,
            body: glm::Mat4::identity(),
        }
    }

    /// Joint local transforms in joint order
    #[must_use]
    pub fn pose(&self) -> Vec<glm::Mat4> {
        self.joints.iter().map(|j| j.local).collect()
    }
}

/// A captured clip. Frames are private so the joint count invariant can't be
/// broken after construction.
#[derive(Clone, Debug)]
pub struct Animation {
    pub id: u32,
    pub name: String,
    frames: Vec<Frame>,
    duration: f32,
    frame_rate: f32,
    pub recording_date: Option<String>,
}

impl Animation {
    /// Creates an animation after checking that every frame has the same
    /// joint count and that a non-empty clip has a positive duration. The
    /// frame rate defaults to the rate implied by the frame count and
    /// duration.
    ///
    /// # Errors
    /// May return `RigError`
    pub fn new(
        id: u32,
        name: &str,
        frames: Vec<Frame>,
        duration: f32,
    ) -> Result<Self, RigError> {
        if let Some(first) = frames.first() {
            let expected = first.joints.len();
            if let Some((frame, found)) = frames
                .iter()
                .map(|f| f.joints.len())
                .enumerate()
                .find(|(_, n)| *n != expected)
            {
                return Err(RigError::FrameJointMismatch {
                    frame,
                    expected,
                    found,
                });
            }
            if !(duration > 0.0 && duration.is_finite()) {
                return Err(RigError::InvalidDuration);
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let frame_rate = if frames.len() > 1 {
            (frames.len() - 1) as f32 / duration
        } else {
            0.0
        };
        Ok(Self {
            id,
            name: name.to_owned(),
            frames,
            duration: duration.max(0.0),
            frame_rate,
            recording_date: None,
        })
    }

    #[must_use]
    pub const fn with_frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    #[must_use]
    pub fn with_recording_date(mut self, recording_date: &str) -> Self {
        self.recording_date = Some(recording_date.to_owned());
        self
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[must_use]
    pub const fn duration(&self) -> f32 {
        self.duration
    }

    #[must_use]
    pub const fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.frames.first().map_or(0, |f| f.joints.len())
    }

    #[must_use]
    pub fn first_frame(&self) -> Option<&Frame> {
        self.frames.first()
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Playback needs at least one frame and a positive duration
    #[must_use]
    pub fn is_playable(&self) -> bool {
        !self.frames.is_empty() && self.duration > 0.0
    }
}
