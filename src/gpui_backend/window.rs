use std::sync::{Arc, Mutex};

use crossbeam_channel::Sender;

use crate::backend::{self, WindowId};
use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::{FrameRecorder, RenderCommand, RenderList};
use crate::style::Color;
use crate::text::Texture;

use super::{Request, WindowOp};

/// The latest presented frame of one window.
///
/// GPUI repaints every frame from scratch, so the most recent clear color
/// is retained and painted underneath frames that only fill the plot area.
#[derive(Debug, Clone, Default)]
pub(crate) struct FrameSnapshot {
    pub(crate) background: Option<Color>,
    pub(crate) commands: Arc<RenderList>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FrameSlot(Arc<Mutex<FrameSnapshot>>);

impl FrameSlot {
    pub(crate) fn snapshot(&self) -> FrameSnapshot {
        self.0.lock().expect("frame slot lock").clone()
    }

    fn publish(&self, frame: RenderList) {
        let clear = frame.commands().iter().rev().find_map(|command| match command {
            RenderCommand::Clear(color) => Some(*color),
            _ => None,
        });
        let mut slot = self.0.lock().expect("frame slot lock");
        if clear.is_some() {
            slot.background = clear;
        }
        slot.commands = Arc::new(frame);
    }
}

/// Drawing surface of a GPUI window, used from the render thread.
pub(crate) struct GpuiSurface {
    id: WindowId,
    recorder: FrameRecorder,
    slot: FrameSlot,
    requests: Sender<Request>,
}

impl GpuiSurface {
    pub(crate) fn new(id: WindowId, slot: FrameSlot, requests: Sender<Request>) -> Self {
        Self {
            id,
            recorder: FrameRecorder::new(),
            slot,
            requests,
        }
    }

    fn send(&self, op: WindowOp) {
        let _ = self.requests.send(Request::Op {
            window: self.id,
            op,
        });
    }
}

impl backend::Window for GpuiSurface {
    fn id(&self) -> WindowId {
        self.id
    }

    fn clear(&mut self, color: Color) {
        self.recorder.record(RenderCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Color) {
        self.recorder.record(RenderCommand::FillRect { rect, color });
    }

    fn draw_lines(&mut self, points: &[ScreenPoint], color: Color) {
        self.recorder.record(RenderCommand::Polyline {
            points: points.to_vec(),
            color,
        });
    }

    fn draw_texture(&mut self, texture: &Arc<Texture>, dest: ScreenRect) {
        self.recorder.record(RenderCommand::Texture {
            texture: Arc::clone(texture),
            dest,
        });
    }

    fn present(&mut self) {
        let frame = self.recorder.present();
        self.slot.publish(frame);
    }

    fn minimize(&mut self) {
        self.send(WindowOp::Minimize);
    }

    fn restore(&mut self) {
        self.send(WindowOp::Restore);
    }

    fn raise(&mut self) {
        self.send(WindowOp::Raise);
    }
}

impl Drop for GpuiSurface {
    fn drop(&mut self) {
        self.send(WindowOp::Close);
    }
}
