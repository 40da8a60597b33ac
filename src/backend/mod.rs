//! Windowing and 2D drawing boundary.
//!
//! A [`Platform`] creates windows and pumps events on the thread that owns
//! them. Each [`Window`] is a drawing surface the render worker draws into.
//! Any immediate-mode 2D backend can implement these traits; the crate ships
//! a [`headless`] recording backend and, behind the `gpui` feature, a GPUI
//! backend.

use std::sync::Arc;

use crate::error::PlatformError;
use crate::geom::{ScreenPoint, ScreenRect};
use crate::setup::{SetupDescriptor, WindowPlacement};
use crate::style::Color;
use crate::text::Texture;

pub mod headless;

pub use headless::{HeadlessHandle, HeadlessPlatform, WindowSnapshot};

/// Identifier of a window within its platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// Everything a platform needs to open a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRequest {
    /// Window title, already truncated.
    pub title: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Screen position.
    pub placement: WindowPlacement,
}

impl WindowRequest {
    /// Build the request for a descriptor.
    pub fn from_setup(setup: &SetupDescriptor) -> Self {
        Self {
            title: setup.window_title().to_string(),
            width: setup.width,
            height: setup.height,
            placement: setup.placement,
        }
    }
}

/// A native window with a drawing surface.
///
/// Drawing calls go to a back buffer that becomes visible on
/// [`Window::present`]. Alpha in draw colors is advisory; draws replace
/// pixels rather than blend.
pub trait Window: Send {
    /// Platform id of this window.
    fn id(&self) -> WindowId;

    /// Fill the whole back buffer.
    fn clear(&mut self, color: Color);

    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: ScreenRect, color: Color);

    /// Draw connected line segments through `points`.
    fn draw_lines(&mut self, points: &[ScreenPoint], color: Color);

    /// Blit a label texture into `dest`.
    fn draw_texture(&mut self, texture: &Arc<Texture>, dest: ScreenRect);

    /// Make the back buffer visible.
    fn present(&mut self);

    /// Minimize the window.
    fn minimize(&mut self);

    /// Restore the window from minimized state.
    fn restore(&mut self);

    /// Raise the window above others and give it input focus.
    fn raise(&mut self);
}

/// Posts a synthetic event that wakes a blocked [`Platform::wait_event`].
pub trait Wake: Send + Sync {
    /// Wake the event loop.
    fn wake(&self);
}

/// Keys the dispatcher reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Escape.
    Escape,
    /// A printable character.
    Char(char),
    /// Anything else.
    Other,
}

/// Window state changes reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEventKind {
    /// Window became visible.
    Shown,
    /// Window was hidden.
    Hidden,
    /// Window contents need repainting.
    Exposed,
    /// Window moved.
    Moved,
    /// Window was resized by the user.
    Resized,
    /// Window size changed for any reason.
    SizeChanged,
    /// Window was minimized.
    Minimized,
    /// Window was maximized.
    Maximized,
    /// Window was restored.
    Restored,
    /// Pointer entered the window.
    Enter,
    /// Pointer left the window.
    Leave,
    /// Window gained keyboard focus.
    FocusGained,
    /// Window lost keyboard focus.
    FocusLost,
    /// Window close was requested.
    Close,
}

/// An event delivered to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Application quit requested.
    Quit,
    /// A key was pressed.
    Key {
        /// Window with keyboard focus, if known.
        window: Option<WindowId>,
        /// The key.
        key: Key,
    },
    /// A window changed state.
    Window {
        /// Window the event concerns.
        window: WindowId,
        /// What happened.
        kind: WindowEventKind,
    },
    /// Synthetic wake posted through [`Wake`].
    Wake,
}

/// Pending-event inspection used by the dispatcher.
pub trait EventQueue {
    /// Kind of the next pending window event, without removing it.
    fn peek_window_event(&mut self) -> Option<WindowEventKind>;

    /// Drop every pending window event.
    fn flush_window_events(&mut self);
}

/// Owner of windows and of the event pump.
///
/// Methods must be called on the thread that created the platform.
pub trait Platform: EventQueue {
    /// Initialize the windowing subsystem.
    fn init(&mut self) -> Result<(), PlatformError>;

    /// Open a window and its drawing surface.
    fn create_window(&mut self, request: &WindowRequest) -> Result<Box<dyn Window>, PlatformError>;

    /// Block until the next event.
    fn wait_event(&mut self) -> Event;

    /// Handle other threads use to interrupt [`Platform::wait_event`].
    fn waker(&self) -> Arc<dyn Wake>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_truncated_title() {
        let setup = SetupDescriptor::default()
            .with_title("x".repeat(200))
            .with_size(320, 200);
        let request = WindowRequest::from_setup(&setup);
        assert_eq!(request.title.len(), 128);
        assert_eq!((request.width, request.height), (320, 200));
    }
}
