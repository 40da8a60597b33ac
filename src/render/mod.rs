//! Recorded drawing commands.
//!
//! These types are backend-agnostic. Backends that cannot draw immediately
//! from the render thread (the headless backend, the GPUI backend) record
//! each frame into a [`RenderList`] and hand it off on present.

use std::sync::Arc;

use crate::geom::{ScreenPoint, ScreenRect};
use crate::style::Color;
use crate::text::Texture;

/// One drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Fill the whole window.
    Clear(Color),
    /// Fill a rectangle.
    FillRect {
        /// Rectangle bounds.
        rect: ScreenRect,
        /// Fill color.
        color: Color,
    },
    /// Draw connected line segments through every point.
    Polyline {
        /// Points to connect, in order.
        points: Vec<ScreenPoint>,
        /// Stroke color.
        color: Color,
    },
    /// Blit a rendered label.
    Texture {
        /// Label texture.
        texture: Arc<Texture>,
        /// Destination rectangle.
        dest: ScreenRect,
    },
}

/// Aggregated render commands for one frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderList {
    commands: Vec<RenderCommand>,
}

impl RenderList {
    /// Create an empty render list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a render command.
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Access all render commands.
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no commands were recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The last polyline recorded, if any.
    pub fn last_polyline(&self) -> Option<&[ScreenPoint]> {
        self.commands.iter().rev().find_map(|command| match command {
            RenderCommand::Polyline { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }

    /// Every texture blit, in order.
    pub fn textures(&self) -> impl Iterator<Item = (&Arc<Texture>, ScreenRect)> {
        self.commands.iter().filter_map(|command| match command {
            RenderCommand::Texture { texture, dest } => Some((texture, *dest)),
            _ => None,
        })
    }
}

/// Back-buffer emulation shared by recording backends.
///
/// Draw calls append to a pending list; [`FrameRecorder::present`] moves the
/// pending list out as the finished frame. A [`RenderCommand::Clear`]
/// discards whatever was pending, since it paints over all of it.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pending: RenderList,
    presented: u64,
}

impl FrameRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a draw call.
    pub fn record(&mut self, command: RenderCommand) {
        if matches!(command, RenderCommand::Clear(_)) {
            self.pending.commands.clear();
        }
        self.pending.push(command);
    }

    /// Commands drawn since the last present.
    pub fn pending(&self) -> &RenderList {
        &self.pending
    }

    /// Finish the frame, returning its commands.
    pub fn present(&mut self) -> RenderList {
        self.presented += 1;
        std::mem::take(&mut self.pending)
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}
