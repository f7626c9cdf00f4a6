//! Background loading of clips with a single hand-off to the main thread.
//!
//! Storage runs on a worker thread and the finished, immutable result is
//! placed in a slot that can be filled exactly once. The main thread either
//! polls the slot once per tick with `try_take` or blocks with `wait`.

use super::types::Animation;
use crate::rig_error::RigError;
use log::{error, info};
use parking_lot::{Condvar, Mutex};
use std::{sync::Arc, thread};

/// Storage collaborator that produces clips
pub trait ClipSource: Send + 'static {
    /// # Errors
    /// May return `RigError`
    fn load(&self) -> Result<Vec<Animation>, RigError>;
}

type LoadResult = Result<Vec<Animation>, RigError>;

enum SlotState {
    Waiting,
    Ready(LoadResult),
    Taken,
}

struct Slot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

/// Worker side of the slot. If the worker unwinds before filling the slot the
/// drop fills it with `LoaderDisconnected` so the main thread never waits
/// forever.
struct Producer {
    slot: Arc<Slot>,
}

impl Producer {
    fn fill(&self, result: LoadResult) {
        let mut state = self.slot.state.lock();
        if matches!(*state, SlotState::Waiting) {
            *state = SlotState::Ready(result);
        }
    }
}

impl Drop for Producer {
    fn drop(&mut self) {
        let mut state = self.slot.state.lock();
        if matches!(*state, SlotState::Waiting) {
            error!("clip loader exited without a result");
            *state = SlotState::Ready(Err(RigError::LoaderDisconnected));
        }
        drop(state);
        self.slot.ready.notify_all();
    }
}

/// Main thread side of a load in progress
pub struct PendingClips {
    slot: Arc<Slot>,
}

impl PendingClips {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*self.slot.state.lock(), SlotState::Ready(_))
    }

    /// Takes the result if the worker has finished. Returns `None` while the
    /// load is still running and after the result has been taken.
    pub fn try_take(&self) -> Option<LoadResult> {
        let mut state = self.slot.state.lock();
        if !matches!(*state, SlotState::Ready(_)) {
            return None;
        }
        match std::mem::replace(&mut *state, SlotState::Taken) {
            SlotState::Ready(result) => Some(result),
            _ => None,
        }
    }

    /// Blocks until the worker has finished
    ///
    /// # Errors
    /// Returns the loader's error, or `RigError::LoaderDisconnected` if the
    /// result was already taken
    pub fn wait(self) -> LoadResult {
        let mut state = self.slot.state.lock();
        while matches!(*state, SlotState::Waiting) {
            self.slot.ready.wait(&mut state);
        }
        match std::mem::replace(&mut *state, SlotState::Taken) {
            SlotState::Ready(result) => result,
            _ => Err(RigError::LoaderDisconnected),
        }
    }
}

/// Starts loading `source` on a worker thread
///
/// # Errors
/// May return `RigError` if the thread could not be spawned
pub fn spawn_load<S: ClipSource>(source: S) -> Result<PendingClips, RigError> {
    let slot = Arc::new(Slot {
        state: Mutex::new(SlotState::Waiting),
        ready: Condvar::new(),
    });
    let producer = Producer { slot: slot.clone() };
    thread::Builder::new()
        .name("clip-loader".to_owned())
        .spawn(move || {
            let result = source.load();
            if let Ok(clips) = &result {
                info!("loaded {} clips", clips.len());
            }
            producer.fill(result);
        })?;
    Ok(PendingClips { slot })
}
