//! GPUI integration for stripchart.
//!
//! GPUI owns its windows on the application main thread, while the
//! dispatcher and the workers run elsewhere. [`GpuiPlatform`] is the
//! dispatcher-side [`Platform`]: window creation and window operations are
//! sent as requests to a [`GpuiBridge`] running inside the GPUI app, and
//! window input comes back as [`Event`]s. Recorded frames are published into
//! a per-window slot that the view repaints on every bridge tick.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use gpui::{
    App, AppContext, AsyncApp, Bounds, Timer, TitlebarOptions, WindowBounds, WindowHandle,
    WindowOptions, point, px, size,
};
use log::{debug, warn};

use crate::backend::{
    Event, EventQueue, Platform, Wake, Window, WindowEventKind, WindowId, WindowRequest,
};
use crate::error::PlatformError;
use crate::setup::WindowPlacement;

mod paint;
mod view;
mod window;

pub use view::StripChartView;

use window::{FrameSlot, GpuiSurface};

/// How often the bridge serves requests and repaints windows.
const REPAINT_INTERVAL: Duration = Duration::from_millis(16);
/// How long window creation waits for the bridge before failing.
const OPEN_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) enum Request {
    Open {
        id: WindowId,
        request: WindowRequest,
        slot: FrameSlot,
        reply: Sender<Result<(), PlatformError>>,
    },
    Op {
        window: WindowId,
        op: WindowOp,
    },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowOp {
    Minimize,
    Restore,
    Raise,
    Close,
}

/// Create a connected platform and bridge.
///
/// The bridge must be attached to the running GPUI app; the platform can be
/// moved to the thread that runs the session.
pub fn channel() -> (GpuiPlatform, GpuiBridge) {
    let (request_tx, request_rx) = unbounded();
    let (event_tx, event_rx) = unbounded();
    let platform = GpuiPlatform {
        requests: request_tx,
        events: event_rx,
        event_tx: event_tx.clone(),
        buffered: VecDeque::new(),
        next_id: 0,
    };
    let bridge = GpuiBridge {
        requests: request_rx,
        events: event_tx,
        windows: HashMap::new(),
    };
    (platform, bridge)
}

/// Dispatcher-side handle to a GPUI application.
pub struct GpuiPlatform {
    requests: Sender<Request>,
    events: Receiver<Event>,
    event_tx: Sender<Event>,
    buffered: VecDeque<Event>,
    next_id: u64,
}

impl GpuiPlatform {
    /// Handle that quits the GPUI app.
    pub fn app_handle(&self) -> AppHandle {
        AppHandle {
            requests: self.requests.clone(),
        }
    }

    fn pull_pending(&mut self) {
        self.buffered.extend(self.events.try_iter());
    }
}

impl EventQueue for GpuiPlatform {
    fn peek_window_event(&mut self) -> Option<WindowEventKind> {
        self.pull_pending();
        self.buffered.iter().find_map(|event| match event {
            Event::Window { kind, .. } => Some(*kind),
            _ => None,
        })
    }

    fn flush_window_events(&mut self) {
        self.pull_pending();
        self.buffered
            .retain(|event| !matches!(event, Event::Window { .. }));
    }
}

impl Platform for GpuiPlatform {
    fn init(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }

    fn create_window(&mut self, request: &WindowRequest) -> Result<Box<dyn Window>, PlatformError> {
        self.next_id += 1;
        let id = WindowId(self.next_id);
        let slot = FrameSlot::default();
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.requests
            .send(Request::Open {
                id,
                request: request.clone(),
                slot: slot.clone(),
                reply: reply_tx,
            })
            .map_err(|_| PlatformError::Unavailable("gpui app is not running".into()))?;
        reply_rx
            .recv_timeout(OPEN_TIMEOUT)
            .map_err(|err| PlatformError::WindowCreation(err.to_string()))??;
        Ok(Box::new(GpuiSurface::new(id, slot, self.requests.clone())))
    }

    fn wait_event(&mut self) -> Event {
        if let Some(event) = self.buffered.pop_front() {
            return event;
        }
        // Both ends live in this struct, so the channel never disconnects.
        self.events.recv().unwrap_or(Event::Quit)
    }

    fn waker(&self) -> Arc<dyn Wake> {
        Arc::new(ChannelWaker(self.event_tx.clone()))
    }
}

struct ChannelWaker(Sender<Event>);

impl Wake for ChannelWaker {
    fn wake(&self) {
        let _ = self.0.send(Event::Wake);
    }
}

/// Quits the GPUI application from any thread.
#[derive(Clone)]
pub struct AppHandle {
    requests: Sender<Request>,
}

impl AppHandle {
    /// Ask the app to quit.
    pub fn quit(&self) {
        let _ = self.requests.send(Request::Quit);
    }
}

/// App-side half of [`channel`]: opens windows and applies window operations.
pub struct GpuiBridge {
    requests: Receiver<Request>,
    events: Sender<Event>,
    windows: HashMap<WindowId, WindowHandle<StripChartView>>,
}

impl GpuiBridge {
    /// Start serving requests on the app's foreground executor.
    pub fn attach(self, cx: &mut App) {
        cx.spawn(move |cx: &mut AsyncApp| {
            let cx = cx.clone();
            let mut bridge = self;
            async move {
                loop {
                    Timer::after(REPAINT_INTERVAL).await;
                    let keep_going = cx.update(|cx| bridge.tick(cx)).unwrap_or(false);
                    if !keep_going {
                        break;
                    }
                }
            }
        })
        .detach();
    }

    fn tick(&mut self, cx: &mut App) -> bool {
        let requests: Vec<Request> = self.requests.try_iter().collect();
        for request in requests {
            match request {
                Request::Open {
                    id,
                    request,
                    slot,
                    reply,
                } => {
                    let result = self.open(id, &request, slot, cx);
                    if let Err(err) = &result {
                        warn!("{err}");
                    }
                    let _ = reply.send(result);
                }
                Request::Op { window, op } => self.apply(window, op, cx),
                Request::Quit => {
                    cx.quit();
                    return false;
                }
            }
        }
        self.windows
            .retain(|_, handle| handle.update(cx, |_, _, cx| cx.notify()).is_ok());
        true
    }

    fn open(
        &mut self,
        id: WindowId,
        request: &WindowRequest,
        slot: FrameSlot,
        cx: &mut App,
    ) -> Result<(), PlatformError> {
        let window_size = size(px(request.width as f32), px(request.height as f32));
        let bounds = match request.placement {
            WindowPlacement::At { x, y } => {
                Bounds::new(point(px(x as f32), px(y as f32)), window_size)
            }
            WindowPlacement::Unspecified => Bounds::centered(None, window_size, cx),
        };
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(bounds)),
            titlebar: Some(TitlebarOptions {
                title: Some(request.title.clone().into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let events = self.events.clone();
        let handle = cx
            .open_window(options, |window, cx| {
                cx.new(|cx| StripChartView::new(id, slot, events, window, cx))
            })
            .map_err(|err| PlatformError::WindowCreation(err.to_string()))?;
        debug!("opened gpui window {id:?} ({:?})", request.title);
        self.windows.insert(id, handle);
        Ok(())
    }

    fn apply(&mut self, id: WindowId, op: WindowOp, cx: &mut App) {
        let Some(handle) = self.windows.get(&id).cloned() else {
            return;
        };
        let result = handle.update(cx, |_, window, _| match op {
            WindowOp::Minimize => window.minimize_window(),
            WindowOp::Restore | WindowOp::Raise => window.activate_window(),
            WindowOp::Close => window.remove_window(),
        });
        if op == WindowOp::Close || result.is_err() {
            self.windows.remove(&id);
        }
    }
}
