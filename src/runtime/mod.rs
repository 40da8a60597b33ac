//! Worker threads, the event dispatcher, and their shared run state.
//!
//! Three flows of control cooperate through a [`RunState`]:
//!
//! - the dispatcher, on the thread that owns the platform, pumps events;
//! - the [`RenderWorker`] redraws every graph at a fixed frame rate;
//! - the [`IngestWorker`] reads input lines and appends samples.
//!
//! A [`Session`] wires them together and enforces shutdown ordering.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::backend::Wake;

mod dispatch;
mod ingest;
mod render;
mod session;

pub use dispatch::{Dispatcher, Flow};
pub use ingest::{IngestWorker, Ingestor, LineOutcome, parse_leading_f32, spawn_line_reader};
pub use render::RenderWorker;
pub use session::{Session, ShutdownReport};

/// Flags shared by the dispatcher and both workers.
pub struct RunState {
    running: AtomicBool,
    paused: AtomicBool,
    render_finished: AtomicBool,
    ingest_finished: AtomicBool,
    waker: Option<Arc<dyn Wake>>,
}

impl RunState {
    /// Create a running, unpaused state that wakes `waker` on quit.
    pub fn new(waker: Arc<dyn Wake>) -> Self {
        Self {
            waker: Some(waker),
            ..Self::detached()
        }
    }

    /// Create a state with nothing to wake, for driving workers directly.
    pub fn detached() -> Self {
        Self {
            running: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            render_finished: AtomicBool::new(false),
            ingest_finished: AtomicBool::new(false),
            waker: None,
        }
    }

    /// Whether the session should keep going.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clear the run flag and wake the dispatcher.
    pub fn request_quit(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            debug!("quit requested");
        }
        self.wake();
    }

    /// Post a synthetic wake to the dispatcher.
    pub fn wake(&self) {
        if let Some(waker) = &self.waker {
            waker.wake();
        }
    }

    /// Whether rendering is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Set the pause flag.
    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    /// Flip the pause flag, returning the new value.
    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::AcqRel)
    }

    /// Whether the render worker has left its loop.
    pub fn render_finished(&self) -> bool {
        self.render_finished.load(Ordering::Acquire)
    }

    pub(crate) fn mark_render_finished(&self) {
        self.render_finished.store(true, Ordering::Release);
    }

    /// Whether the ingestion worker has left its loop.
    pub fn ingest_finished(&self) -> bool {
        self.ingest_finished.load(Ordering::Acquire)
    }

    pub(crate) fn mark_ingest_finished(&self) {
        self.ingest_finished.store(true, Ordering::Release);
    }
}

impl std::fmt::Debug for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunState")
            .field("running", &self.is_running())
            .field("paused", &self.is_paused())
            .field("render_finished", &self.render_finished())
            .field("ingest_finished", &self.ingest_finished())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingWake(AtomicUsize);

    impl Wake for CountingWake {
        fn wake(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn quit_clears_running_and_wakes() {
        let wake = Arc::new(CountingWake::default());
        let state = RunState::new(wake.clone());
        assert!(state.is_running());
        state.request_quit();
        assert!(!state.is_running());
        assert_eq!(wake.0.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn pause_toggles() {
        let state = RunState::detached();
        assert!(state.toggle_pause());
        assert!(state.is_paused());
        assert!(!state.toggle_pause());
        assert!(!state.is_paused());
    }
}
