pub mod clip_file;
pub mod event;
pub mod loader;
pub mod player;
mod types;
pub mod util;

// Re-exports
pub use {
    clip_file::{parse_clips, YamlClipSource},
    event::{ListenerId, PlaybackEvent},
    loader::{spawn_load, ClipSource, PendingClips},
    player::{AnimationPlayer, PlayState, PlaybackState},
    types::{Animation, Frame, Joint},
};
