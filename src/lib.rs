//! stripchart draws live-updating line graphs, one per window, fed by a
//! stream of numeric samples from another thread.
//!
//! Each [`Graph`] keeps a fixed-capacity ring of samples and redraws it as a
//! left-to-right time series. Axis captions are rasterized once through the
//! [`GlyphCache`] and reused every frame. The [`runtime`] module runs a
//! frame-paced render worker, a line-oriented ingestion worker, and an event
//! dispatcher, and coordinates their shutdown.

#![forbid(unsafe_code)]

pub mod axis;
pub mod backend;
pub mod config;
pub mod error;
pub mod geom;
pub mod graph;
pub mod layout;
pub mod library;
pub mod render;
pub mod runtime;
pub mod samples;
pub mod setup;
pub mod style;
pub mod text;
pub mod transform;

#[cfg(feature = "gpui")]
pub mod gpui_backend;

pub use axis::{LABEL_WIDTH, TickFormatter, tick_values};
pub use backend::{
    Event, EventQueue, HeadlessHandle, HeadlessPlatform, Key, Platform, Wake, Window,
    WindowEventKind, WindowId, WindowRequest, WindowSnapshot,
};
pub use config::RuntimeConfig;
pub use error::{ErrorMask, GraphError, GraphResult, InitError, PlatformError, TextError, TextResult};
pub use geom::{ScreenPoint, ScreenRect};
pub use graph::{Caption, Graph};
pub use layout::PlotLayout;
pub use library::Library;
pub use render::{FrameRecorder, RenderCommand, RenderList};
pub use runtime::{Dispatcher, Flow, LineOutcome, RunState, Session, ShutdownReport};
pub use samples::{OutOfRange, SampleRing, SyncStrategy};
pub use setup::{Margins, Need, SetupDescriptor, WindowPlacement};
pub use style::{Color, Rgb, Theme};
pub use text::{
    BlockRasterizer, Bitmap, Font, FontId, GlyphCache, TextRasterizer, Texture, TtfRasterizer,
};
pub use transform::SampleTransform;
