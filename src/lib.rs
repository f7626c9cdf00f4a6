//! Rig a mesh to a recorded motion capture skeleton.
//!
//! Clips are loaded in the background and handed to a [`session::RigSession`]
//! which derives the joint hierarchy, resolves lasso selections against the
//! mesh, binds the selected vertices to a joint and replays the clip with the
//! bound vertices following their joints.
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod assignment;
pub mod camera;
pub mod config;
pub mod hierarchy;
pub mod interpolate;
pub mod mesh;
pub mod projection;
pub mod rig_error;
pub mod selection;
pub mod session;
pub mod skin;
pub mod types;
pub mod vertex;

// Re-exports
pub use {
    assignment::JointAssignmentStore, config::RigConfig, mesh::RiggedMesh,
    rig_error::RigError, session::RigSession,
};
