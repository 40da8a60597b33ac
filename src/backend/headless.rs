//! Headless backend that records frames instead of drawing them.
//!
//! Windows keep their presented frames as [`RenderList`]s; a cloneable
//! [`HeadlessHandle`] lets other threads inject events and inspect windows
//! after they have been handed to graphs.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use super::{
    Event, EventQueue, Platform, Wake, Window, WindowEventKind, WindowId, WindowRequest,
};
use crate::error::PlatformError;
use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::{FrameRecorder, RenderCommand, RenderList};
use crate::style::Color;
use crate::text::Texture;

#[derive(Debug, Default)]
struct Shared {
    queue: Mutex<VecDeque<Event>>,
    ready: Condvar,
    windows: Mutex<Vec<(WindowId, Arc<Mutex<WindowState>>)>>,
    frames: Condvar,
    raises: Mutex<Vec<WindowId>>,
}

impl Shared {
    fn push(&self, event: Event) {
        self.queue.lock().expect("event queue lock").push_back(event);
        self.ready.notify_all();
    }
}

#[derive(Debug)]
struct WindowState {
    request: WindowRequest,
    recorder: FrameRecorder,
    last_frame: Option<RenderList>,
    minimized: bool,
    raised: u64,
    destroyed: bool,
}

/// Recording [`Platform`] for tests and demos without a display.
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    shared: Arc<Shared>,
    next_id: u64,
    fail_init: bool,
    fail_surface: bool,
    window_limit: Option<usize>,
}

impl HeadlessPlatform {
    /// Create a platform with no windows and an empty event queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make [`Platform::init`] fail.
    pub fn with_failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Make every window's drawing surface fail to create.
    pub fn with_failing_surface(mut self) -> Self {
        self.fail_surface = true;
        self
    }

    /// Refuse to create more than `limit` windows.
    pub fn with_window_limit(mut self, limit: usize) -> Self {
        self.window_limit = Some(limit);
        self
    }

    /// A handle for injecting events and inspecting windows.
    pub fn handle(&self) -> HeadlessHandle {
        HeadlessHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl EventQueue for HeadlessPlatform {
    fn peek_window_event(&mut self) -> Option<WindowEventKind> {
        self.shared
            .queue
            .lock()
            .expect("event queue lock")
            .iter()
            .find_map(|event| match event {
                Event::Window { kind, .. } => Some(*kind),
                _ => None,
            })
    }

    fn flush_window_events(&mut self) {
        self.shared
            .queue
            .lock()
            .expect("event queue lock")
            .retain(|event| !matches!(event, Event::Window { .. }));
    }
}

impl Platform for HeadlessPlatform {
    fn init(&mut self) -> Result<(), PlatformError> {
        if self.fail_init {
            return Err(PlatformError::Unavailable("headless platform disabled".into()));
        }
        Ok(())
    }

    fn create_window(&mut self, request: &WindowRequest) -> Result<Box<dyn Window>, PlatformError> {
        let mut windows = self.shared.windows.lock().expect("window list lock");
        if self.window_limit.is_some_and(|limit| windows.len() >= limit) {
            return Err(PlatformError::WindowCreation(format!(
                "window limit reached opening {:?}",
                request.title
            )));
        }
        if self.fail_surface {
            return Err(PlatformError::SurfaceCreation(format!(
                "no surface for {:?}",
                request.title
            )));
        }

        self.next_id += 1;
        let id = WindowId(self.next_id);
        let state = Arc::new(Mutex::new(WindowState {
            request: request.clone(),
            recorder: FrameRecorder::new(),
            last_frame: None,
            minimized: false,
            raised: 0,
            destroyed: false,
        }));
        windows.push((id, Arc::clone(&state)));
        Ok(Box::new(HeadlessWindow {
            id,
            state,
            shared: Arc::clone(&self.shared),
        }))
    }

    fn wait_event(&mut self) -> Event {
        let mut queue = self.shared.queue.lock().expect("event queue lock");
        loop {
            if let Some(event) = queue.pop_front() {
                return event;
            }
            queue = self.shared.ready.wait(queue).expect("event queue lock");
        }
    }

    fn waker(&self) -> Arc<dyn Wake> {
        Arc::new(HeadlessWaker {
            shared: Arc::clone(&self.shared),
        })
    }
}

struct HeadlessWaker {
    shared: Arc<Shared>,
}

impl Wake for HeadlessWaker {
    fn wake(&self) {
        self.shared.push(Event::Wake);
    }
}

struct HeadlessWindow {
    id: WindowId,
    state: Arc<Mutex<WindowState>>,
    shared: Arc<Shared>,
}

impl HeadlessWindow {
    fn state(&self) -> std::sync::MutexGuard<'_, WindowState> {
        self.state.lock().expect("headless window lock")
    }
}

impl Window for HeadlessWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn clear(&mut self, color: Color) {
        self.state().recorder.record(RenderCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Color) {
        self.state()
            .recorder
            .record(RenderCommand::FillRect { rect, color });
    }

    fn draw_lines(&mut self, points: &[ScreenPoint], color: Color) {
        self.state().recorder.record(RenderCommand::Polyline {
            points: points.to_vec(),
            color,
        });
    }

    fn draw_texture(&mut self, texture: &Arc<Texture>, dest: ScreenRect) {
        self.state().recorder.record(RenderCommand::Texture {
            texture: Arc::clone(texture),
            dest,
        });
    }

    fn present(&mut self) {
        {
            let mut state = self.state();
            let frame = state.recorder.present();
            state.last_frame = Some(frame);
        }
        self.shared.frames.notify_all();
    }

    fn minimize(&mut self) {
        self.state().minimized = true;
    }

    fn restore(&mut self) {
        self.state().minimized = false;
    }

    fn raise(&mut self) {
        self.state().raised += 1;
        self.shared
            .raises
            .lock()
            .expect("raise log lock")
            .push(self.id);
    }
}

impl Drop for HeadlessWindow {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.destroyed = true;
        }
    }
}

/// Point-in-time copy of a headless window's state.
#[derive(Debug, Clone)]
pub struct WindowSnapshot {
    /// Window id.
    pub id: WindowId,
    /// The request the window was created from.
    pub request: WindowRequest,
    /// Number of frames presented.
    pub frames_presented: u64,
    /// The most recently presented frame.
    pub last_frame: Option<RenderList>,
    /// Commands drawn since the last present.
    pub pending: RenderList,
    /// Whether the window is minimized.
    pub minimized: bool,
    /// How many times the window was raised.
    pub raised: u64,
    /// Whether the window has been destroyed.
    pub destroyed: bool,
}

/// Cross-thread access to a [`HeadlessPlatform`].
#[derive(Debug, Clone)]
pub struct HeadlessHandle {
    shared: Arc<Shared>,
}

impl HeadlessHandle {
    /// Queue an event for the dispatcher.
    pub fn push_event(&self, event: Event) {
        self.shared.push(event);
    }

    /// Number of events waiting in the queue.
    pub fn pending_events(&self) -> usize {
        self.shared.queue.lock().expect("event queue lock").len()
    }

    /// Ids of every window ever created, in creation order.
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.shared
            .windows
            .lock()
            .expect("window list lock")
            .iter()
            .map(|(id, _)| *id)
            .collect()
    }

    /// Snapshot a window.
    pub fn snapshot(&self, id: WindowId) -> Option<WindowSnapshot> {
        let windows = self.shared.windows.lock().expect("window list lock");
        let (_, state) = windows.iter().find(|(window, _)| *window == id)?;
        let state = state.lock().expect("headless window lock");
        Some(WindowSnapshot {
            id,
            request: state.request.clone(),
            frames_presented: state.recorder.presented(),
            last_frame: state.last_frame.clone(),
            pending: state.recorder.pending().clone(),
            minimized: state.minimized,
            raised: state.raised,
            destroyed: state.destroyed,
        })
    }

    /// Every raise, in the order it happened.
    pub fn raise_log(&self) -> Vec<WindowId> {
        self.shared.raises.lock().expect("raise log lock").clone()
    }

    /// Block until `id` has presented at least `count` frames.
    ///
    /// Returns `false` on timeout or if the window does not exist.
    pub fn wait_for_frames(&self, id: WindowId, count: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut windows = self.shared.windows.lock().expect("window list lock");
        loop {
            let Some((_, state)) = windows.iter().find(|(window, _)| *window == id) else {
                return false;
            };
            if state.lock().expect("headless window lock").recorder.presented() >= count {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            // Presents notify without the window-list lock, so poll in slices.
            windows = self
                .shared
                .frames
                .wait_timeout(windows, (deadline - now).min(Duration::from_millis(10)))
                .expect("window list lock")
                .0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::WindowPlacement;
    use crate::style::Rgb;

    fn request(title: &str) -> WindowRequest {
        WindowRequest {
            title: title.into(),
            width: 100,
            height: 80,
            placement: WindowPlacement::Unspecified,
        }
    }

    #[test]
    fn windows_record_presented_frames() {
        let mut platform = HeadlessPlatform::new();
        let handle = platform.handle();
        let mut window = platform.create_window(&request("a")).unwrap();
        window.clear(Rgb::WHITE.with_alpha(0xFF));
        window.present();
        let snapshot = handle.snapshot(window.id()).unwrap();
        assert_eq!(snapshot.frames_presented, 1);
        assert_eq!(snapshot.last_frame.unwrap().len(), 1);
        drop(window);
        assert!(handle.snapshot(WindowId(1)).unwrap().destroyed);
    }

    #[test]
    fn window_limit_and_surface_failures() {
        let mut platform = HeadlessPlatform::new().with_window_limit(1);
        assert!(platform.create_window(&request("a")).is_ok());
        let err = platform.create_window(&request("b")).err().unwrap();
        assert!(matches!(err, PlatformError::WindowCreation(_)));

        let mut platform = HeadlessPlatform::new().with_failing_surface();
        let err = platform.create_window(&request("c")).err().unwrap();
        assert!(matches!(err, PlatformError::SurfaceCreation(_)));
        assert!(HeadlessPlatform::new().with_failing_init().init().is_err());
    }

    #[test]
    fn wake_unblocks_wait() {
        let mut platform = HeadlessPlatform::new();
        let waker = platform.waker();
        let thread = std::thread::spawn(move || waker.wake());
        assert_eq!(platform.wait_event(), Event::Wake);
        thread.join().unwrap();
    }

    #[test]
    fn peek_and_flush_only_touch_window_events() {
        let mut platform = HeadlessPlatform::new();
        let handle = platform.handle();
        handle.push_event(Event::Quit);
        handle.push_event(Event::Window {
            window: WindowId(1),
            kind: WindowEventKind::Moved,
        });
        assert_eq!(platform.peek_window_event(), Some(WindowEventKind::Moved));
        assert_eq!(handle.pending_events(), 2);
        platform.flush_window_events();
        assert_eq!(platform.peek_window_event(), None);
        assert_eq!(platform.wait_event(), Event::Quit);
    }
}
