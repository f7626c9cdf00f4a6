use super::{
    event::{ListenerId, Listeners, PlaybackEvent},
    types::Animation,
    util,
};
use crate::config::RigConfig;
use log::{debug, info, trace, warn};
use nalgebra_glm as glm;
use smallvec::SmallVec;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
    pub current_time: f32,
    pub state: PlayState,
    pub speed: f32,
    pub reversed: bool,
    pub looping: bool,
}

type Events = SmallVec<[PlaybackEvent; 2]>;

/// Drives a clip over time. Owned by the main thread and ticked once per
/// display frame by `update`, which never blocks.
///
/// After a clip runs to its end without looping, the player is stopped but
/// keeps the final pose so that further calls to `update` keep returning it
/// until `play` or `stop` is called.
#[derive(Debug)]
pub struct AnimationPlayer {
    animation: Option<Arc<Animation>>,
    playback: PlaybackState,
    min_speed: f32,
    settled: Vec<glm::Mat4>,
    listeners: Listeners,
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self::new(&RigConfig::default())
    }
}

impl AnimationPlayer {
    #[must_use]
    pub fn new(config: &RigConfig) -> Self {
        Self {
            animation: None,
            playback: PlaybackState {
                current_time: 0.0,
                state: PlayState::Stopped,
                speed: 1.0,
                reversed: false,
                looping: config.loop_playback,
            },
            min_speed: config.min_playback_speed.max(f32::EPSILON),
            settled: Vec::new(),
            listeners: Listeners::default(),
        }
    }

    /// Binds an animation and starts playing from `start_time`, clamped to
    /// the clip. A non-finite start plays from the beginning. A clip with no
    /// frames or no duration is refused and the player is left as it was.
    pub fn play(&mut self, animation: Arc<Animation>, start_time: f32) {
        if !animation.is_playable() {
            warn!(
                "play ignored, animation {:?} has {} frames and duration {}",
                animation.name,
                animation.frame_count(),
                animation.duration()
            );
            return;
        }
        info!(
            "play {:?} frames={} duration={} start={}",
            animation.name,
            animation.frame_count(),
            animation.duration(),
            start_time
        );
        self.playback.current_time = if start_time.is_finite() {
            start_time.clamp(0.0, animation.duration())
        } else {
            warn!("play from non-finite start {}, using 0", start_time);
            0.0
        };
        self.playback.state = PlayState::Playing;
        self.animation = Some(animation);
        self.settled.clear();
        self.listeners.dispatch(PlaybackEvent::Started);
    }

    pub fn pause(&mut self) {
        if self.playback.state == PlayState::Playing {
            self.playback.state = PlayState::Paused;
            self.listeners.dispatch(PlaybackEvent::Paused);
        } else {
            debug!("pause ignored in state {:?}", self.playback.state);
        }
    }

    pub fn resume(&mut self) {
        if self.playback.state == PlayState::Paused {
            self.playback.state = PlayState::Playing;
            self.listeners.dispatch(PlaybackEvent::Resumed);
        } else {
            debug!("resume ignored in state {:?}", self.playback.state);
        }
    }

    /// Unbinds the animation and resets time. Emits `Stopped` only if the
    /// player was playing or paused.
    pub fn stop(&mut self) {
        self.settled.clear();
        if self.halt() {
            self.listeners.dispatch(PlaybackEvent::Stopped);
        }
    }

    /// Returns true if there was a transition to stopped
    fn halt(&mut self) -> bool {
        let was_active = self.playback.state != PlayState::Stopped;
        self.animation = None;
        self.playback.current_time = 0.0;
        self.playback.state = PlayState::Stopped;
        was_active
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.playback.looping = looping;
    }

    /// Speed is clamped to the configured minimum. A non-finite speed is
    /// ignored.
    pub fn set_playback_speed(&mut self, speed: f32) {
        if speed.is_finite() {
            self.playback.speed = speed.max(self.min_speed);
        } else {
            warn!("ignored non-finite playback speed {}", speed);
        }
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.playback.reversed = reversed;
    }

    /// Advances time and returns one joint local transform per joint. Returns
    /// an empty pose unless playing, except for the settled pose kept after a
    /// clip completes.
    pub fn update(&mut self, delta_time: f32) -> Vec<glm::Mat4> {
        if self.playback.state != PlayState::Playing {
            return self.settled.clone();
        }
        let Some(animation) = self.animation.clone() else {
            return Vec::new();
        };
        if !delta_time.is_finite() {
            warn!("update ignored non-finite delta time {}", delta_time);
            return util::sample(&animation, self.playback.current_time);
        }

        let direction = if self.playback.reversed { -1.0 } else { 1.0 };
        let duration = animation.duration();
        let mut time = self.playback.current_time
            + delta_time.max(0.0) * self.playback.speed * direction;
        if !time.is_finite() {
            // Step too large for f32, treat it as running off the end
            warn!("time step overflowed at dt={}", delta_time);
            time = duration * direction;
        }
        let mut events = Events::new();

        if time >= duration || time < 0.0 {
            if self.playback.looping {
                time = time.rem_euclid(duration);
                if time >= duration {
                    // Rounding of a tiny negative remainder
                    time = 0.0;
                }
                events.push(PlaybackEvent::Looped);
            } else {
                let final_frame = if time < 0.0 {
                    animation.first_frame()
                } else {
                    animation.last_frame()
                };
                self.settled = final_frame.map(|f| f.pose()).unwrap_or_default();
                debug!(
                    "{:?} completed at time {}",
                    animation.name,
                    time.clamp(0.0, duration)
                );
                self.halt();
                events.push(PlaybackEvent::Stopped);
                events.push(PlaybackEvent::Completed);
                self.emit(&events);
                return self.settled.clone();
            }
        }

        self.playback.current_time = time;
        trace!(
            "update dt={} time={} progress={}",
            delta_time,
            time,
            self.progress()
        );
        self.emit(&events);
        util::sample(&animation, time)
    }

    fn emit(&mut self, events: &Events) {
        for event in events {
            self.listeners.dispatch(*event);
        }
    }

    /// Moves to a point in the clip without changing state. Progress is
    /// clamped to [0, 1]. A non-finite progress is ignored.
    pub fn seek_to(&mut self, progress: f32) {
        if !progress.is_finite() {
            warn!("seek ignored non-finite progress {}", progress);
            return;
        }
        if let Some(animation) = &self.animation {
            self.playback.current_time =
                progress.clamp(0.0, 1.0) * animation.duration();
        }
    }

    /// Pose at the current time without advancing
    #[must_use]
    pub fn current_pose(&self) -> Vec<glm::Mat4> {
        self.animation.as_ref().map_or_else(
            || self.settled.clone(),
            |a| util::sample(a, self.playback.current_time),
        )
    }

    /// Fraction of the clip played, or 0 if no clip with a duration is bound
    #[must_use]
    pub fn progress(&self) -> f32 {
        match &self.animation {
            Some(a) if a.duration() > 0.0 => {
                self.playback.current_time / a.duration()
            }
            _ => 0.0,
        }
    }

    pub fn add_event_listener(
        &mut self,
        listener: impl FnMut(PlaybackEvent) + 'static,
    ) -> ListenerId {
        self.listeners.add(Box::new(listener))
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn remove_all_event_listeners(&mut self) {
        self.listeners.clear();
    }

    #[must_use]
    pub const fn playback_state(&self) -> PlaybackState {
        self.playback
    }

    #[must_use]
    pub const fn state(&self) -> PlayState {
        self.playback.state
    }

    #[must_use]
    pub const fn current_time(&self) -> f32 {
        self.playback.current_time
    }

    #[must_use]
    pub fn duration(&self) -> f32 {
        self.animation.as_ref().map_or(0.0, |a| a.duration())
    }

    #[must_use]
    pub const fn animation(&self) -> Option<&Arc<Animation>> {
        self.animation.as_ref()
    }

    #[must_use]
    pub const fn is_looping(&self) -> bool {
        self.playback.looping
    }

    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.playback.speed
    }

    #[must_use]
    pub const fn is_reversed(&self) -> bool {
        self.playback.reversed
    }
}
