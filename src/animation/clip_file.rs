//! YAML clip storage
//!
//! A reference storage adapter. Transforms are written as four columns of
//! four floats. A negative `parent` is read as "no parent", matching capture
//! tools that write -1 for roots. A joint without a `world` transform gets
//! one composed from its parents' local transforms.

use super::{
    loader::ClipSource,
    types::{Animation, Frame, Joint},
};
use crate::{rig_error::RigError, skin};
use log::{debug, info};
use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

type Columns = [[f32; 4]; 4];

const IDENTITY: Columns = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

const fn identity() -> Columns {
    IDENTITY
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ClipFile {
    pub clips: Vec<ClipRecord>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ClipRecord {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    pub duration: f32,
    #[serde(default)]
    pub frame_rate: Option<f32>,
    #[serde(default)]
    pub recording_date: Option<String>,
    pub frames: Vec<FrameRecord>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FrameRecord {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub timestamp: f32,
    #[serde(default = "identity")]
    pub body: Columns,
    pub joints: Vec<JointRecord>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct JointRecord {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default = "identity")]
    pub local: Columns,
    #[serde(default)]
    pub world: Option<Columns>,
}

fn convert_frame(record: FrameRecord) -> Frame {
    let parents: Vec<Option<usize>> = record
        .joints
        .iter()
        .map(|j| j.parent.and_then(|p| usize::try_from(p).ok()))
        .collect();
    let locals: Vec<glm::Mat4> =
        record.joints.iter().map(|j| j.local.into()).collect();
    let composed = skin::world_transforms(&parents, &locals);

    let joints = record
        .joints
        .into_iter()
        .zip(parents)
        .zip(locals.iter().zip(composed))
        .map(|((j, parent), (local, derived))| Joint {
            id: j.id,
            name: j.name,
            parent,
            local: *local,
            world: j.world.map_or(derived, Into::into),
        })
        .collect();
    Frame {
        id: record.id,
        joints,
        timestamp: record.timestamp,
        body: record.body.into(),
    }
}

fn convert_clip(record: ClipRecord) -> Result<Animation, RigError> {
    debug!(
        "clip {} {:?} frames={} duration={}",
        record.id,
        record.name,
        record.frames.len(),
        record.duration
    );
    let frames = record.frames.into_iter().map(convert_frame).collect();
    let mut animation =
        Animation::new(record.id, &record.name, frames, record.duration)?;
    if let Some(rate) = record.frame_rate {
        animation = animation.with_frame_rate(rate);
    }
    if let Some(date) = &record.recording_date {
        animation = animation.with_recording_date(date);
    }
    Ok(animation)
}

/// Parses a YAML clip document
///
/// # Errors
/// May return `RigError`
pub fn parse_clips(text: &str) -> Result<Vec<Animation>, RigError> {
    let file: ClipFile = serde_yaml::from_str(text)?;
    file.clips.into_iter().map(convert_clip).collect()
}

/// Loads clips from a YAML file on disk
#[derive(Clone, Debug)]
pub struct YamlClipSource {
    path: PathBuf,
}

impl YamlClipSource {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl ClipSource for YamlClipSource {
    fn load(&self) -> Result<Vec<Animation>, RigError> {
        info!("loading clips from {:?}", self.path);
        let text = fs::read_to_string(&self.path)?;
        parse_clips(&text)
    }
}
