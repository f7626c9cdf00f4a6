//! Rigging session
//!
//! Owns everything the main thread mutates: the active clip and its
//! hierarchy view, the player, the lasso tool, the mesh and its binding
//! table. Clips loaded in the background are handed in through
//! `select_animation` once the worker has finished.

use crate::{
    animation::{
        Animation, AnimationPlayer, ListenerId, PendingClips, PlaybackEvent,
    },
    config::RigConfig,
    hierarchy::{self, HierarchyNode},
    mesh::RiggedMesh,
    rig_error::RigError,
    selection::SelectionTool,
    skin::SkinBinding,
    types::{CameraTrait, MaskRenderer, RigTarget},
};
use log::{info, warn};
use nalgebra_glm as glm;
use std::sync::Arc;

#[derive(Debug)]
pub struct RigSession {
    config: RigConfig,
    animation: Option<Arc<Animation>>,
    hierarchy: Vec<HierarchyNode>,
    binding: Option<SkinBinding>,
    player: AnimationPlayer,
    tool: SelectionTool,
    mesh: RiggedMesh,
    model: glm::Mat4,
}

impl RigSession {
    #[must_use]
    pub fn new(
        mesh: RiggedMesh,
        renderer: Box<dyn MaskRenderer>,
        config: RigConfig,
    ) -> Self {
        Self {
            player: AnimationPlayer::new(&config),
            tool: SelectionTool::new(renderer, &config),
            animation: None,
            hierarchy: Vec::new(),
            binding: None,
            mesh,
            model: glm::Mat4::identity(),
            config,
        }
    }

    /// Makes `animation` the active clip. The player is stopped, the lasso
    /// and selection are dropped and every joint assignment is cleared,
    /// since joint indices from the previous clip no longer mean anything.
    pub fn select_animation(&mut self, animation: Arc<Animation>) {
        self.cancel_lasso();
        self.mesh.clear_joint_assignments();
        self.mesh.reset_pose();
        self.hierarchy = animation.first_frame().map_or_else(Vec::new, |f| {
            hierarchy::build_with(&f.joints, &self.config.hierarchy_options())
        });
        self.binding = SkinBinding::from_animation(&animation);
        info!(
            "selected {:?} joints={} frames={}",
            animation.name,
            animation.joint_count(),
            animation.frame_count()
        );
        self.animation = Some(animation);
    }

    /// Polls a background load once and selects the first clip when it
    /// arrives. Returns the loaded clips, or `None` while still loading.
    ///
    /// # Errors
    /// Returns the loader's error
    pub fn poll_clips(
        &mut self,
        pending: &PendingClips,
    ) -> Option<Result<Vec<Arc<Animation>>, RigError>> {
        let result = pending.try_take()?;
        Some(result.map(|clips| {
            let clips: Vec<Arc<Animation>> =
                clips.into_iter().map(Arc::new).collect();
            if let Some(first) = clips.first() {
                self.select_animation(first.clone());
            }
            clips
        }))
    }

    #[must_use]
    pub const fn animation(&self) -> Option<&Arc<Animation>> {
        self.animation.as_ref()
    }

    #[must_use]
    pub fn hierarchy(&self) -> &[HierarchyNode] {
        &self.hierarchy
    }

    /// Starts the active clip from the beginning
    pub fn play(&mut self) {
        if let Some(animation) = &self.animation {
            self.player.play(animation.clone(), 0.0);
        } else {
            warn!("play ignored, no animation selected");
        }
    }

    pub fn player_mut(&mut self) -> &mut AnimationPlayer {
        &mut self.player
    }

    #[must_use]
    pub const fn player(&self) -> &AnimationPlayer {
        &self.player
    }

    pub fn add_event_listener(
        &mut self,
        listener: impl FnMut(PlaybackEvent) + 'static,
    ) -> ListenerId {
        self.player.add_event_listener(listener)
    }

    /// Advances playback and moves the bound vertices. Returns the pose used.
    pub fn tick(&mut self, delta_time: f32) -> Vec<glm::Mat4> {
        let pose = self.player.update(delta_time);
        if let (false, Some(binding)) = (pose.is_empty(), &self.binding) {
            self.mesh.apply_pose(binding, &pose);
        }
        pose
    }

    pub fn set_model_matrix(&mut self, model: glm::Mat4) {
        self.model = model;
    }

    pub fn begin_lasso(&mut self, point: glm::Vec2) {
        self.tool.begin(point);
    }

    pub fn drag_lasso(&mut self, point: glm::Vec2) -> bool {
        self.tool.drag(point)
    }

    /// Resolves the lasso against the mesh as currently posed and makes the
    /// result the mesh selection. Returns the number of vertices selected.
    ///
    /// # Errors
    /// May return `RigError`. The selection is cleared on error.
    pub fn complete_lasso(
        &mut self,
        camera: &impl CameraTrait,
    ) -> Result<usize, RigError> {
        match self.tool.complete(self.mesh.positions(), &self.model, camera) {
            Ok(selected) => {
                self.mesh.set_selection(&selected);
                Ok(selected.len())
            }
            Err(e) => {
                self.mesh.clear_selection();
                Err(e)
            }
        }
    }

    /// Drops the lasso in progress and the selection, and stops playback
    pub fn cancel_lasso(&mut self) {
        self.player.stop();
        self.tool.cancel();
        self.mesh.clear_selection();
    }

    #[must_use]
    pub const fn tool(&self) -> &SelectionTool {
        &self.tool
    }

    /// Binds the selected vertices to a joint of the active clip. Rejects a
    /// joint index the clip doesn't have.
    pub fn assign_selection(&mut self, joint_index: i32) -> bool {
        if let Some(animation) = &self.animation {
            let in_range = usize::try_from(joint_index)
                .is_ok_and(|j| j < animation.joint_count());
            if joint_index >= 0 && !in_range {
                warn!(
                    "assign rejected, joint {} not in {:?}",
                    joint_index, animation.name
                );
                return false;
            }
        }
        self.mesh.assign_joint_to_vertices(joint_index)
    }

    /// Unbinds one joint's vertices and puts them back at rest
    pub fn clear_joint(&mut self, joint_index: usize) -> usize {
        let cleared = self.mesh.clear_joint(joint_index);
        self.refresh_pose();
        cleared
    }

    pub fn clear_assignments(&mut self) {
        self.mesh.clear_joint_assignments();
        self.mesh.reset_pose();
    }

    #[must_use]
    pub fn assignment_count(&self, joint_index: usize) -> usize {
        self.mesh.assignments().assignment_count(joint_index)
    }

    #[must_use]
    pub const fn mesh(&self) -> &RiggedMesh {
        &self.mesh
    }

    #[must_use]
    pub const fn config(&self) -> &RigConfig {
        &self.config
    }

    /// Re-skins with the current pose without advancing time
    fn refresh_pose(&mut self) {
        let pose = self.player.current_pose();
        match (&self.binding, pose.is_empty()) {
            (Some(binding), false) => self.mesh.apply_pose(binding, &pose),
            _ => self.mesh.reset_pose(),
        }
    }
}
