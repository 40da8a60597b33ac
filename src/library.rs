//! Library lifetime: platform ownership, the glyph cache, and graph creation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{info, warn};

use crate::backend::{Platform, Wake, WindowRequest};
use crate::error::{ErrorMask, GraphResult, InitError};
use crate::graph::{Graph, LiveToken};
use crate::setup::SetupDescriptor;
use crate::text::{GlyphCache, TextRasterizer};

/// An initialized library instance.
///
/// Owns the windowing platform and the process-wide glyph cache. Graphs
/// are created through it and may be destroyed in any order, but all of
/// them should be gone before [`Library::shutdown`].
pub struct Library {
    platform: Box<dyn Platform>,
    glyphs: Option<GlyphCache>,
    status: ErrorMask,
    live: Arc<AtomicUsize>,
}

impl Library {
    /// Initialize the windowing and font subsystems.
    ///
    /// A windowing failure is fatal and returned as an error. A font
    /// subsystem failure is recorded in [`Library::status`] as
    /// [`ErrorMask::FONT_INIT`]; graphs still plot, without captions.
    pub fn init(
        mut platform: Box<dyn Platform>,
        rasterizer: Arc<dyn TextRasterizer>,
    ) -> Result<Self, InitError> {
        let mut status = ErrorMask::empty();
        let glyphs = match rasterizer.init() {
            Ok(()) => Some(GlyphCache::new(rasterizer)),
            Err(err) => {
                warn!("{err}; graphs will have no captions");
                status |= ErrorMask::FONT_INIT;
                None
            }
        };
        if let Err(source) = platform.init() {
            status |= source.mask();
            return Err(InitError {
                mask: status,
                source,
            });
        }
        info!("library initialized (status {status:?})");
        Ok(Self {
            platform,
            glyphs,
            status,
            live: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Non-fatal failures recorded during init.
    pub fn status(&self) -> ErrorMask {
        self.status
    }

    /// A descriptor populated with library defaults.
    ///
    /// Every call returns an independent value.
    pub fn default_descriptor() -> SetupDescriptor {
        SetupDescriptor::default()
    }

    /// Build a graph, consuming the descriptor.
    pub fn create_graph(&mut self, setup: SetupDescriptor) -> GraphResult<Graph> {
        self.create_graph_from(&setup)
    }

    /// Build a graph from a borrowed descriptor, leaving it reusable.
    pub fn create_graph_from(&mut self, setup: &SetupDescriptor) -> GraphResult<Graph> {
        let request = WindowRequest::from_setup(setup);
        let window = self.platform.create_window(&request).inspect_err(|err| {
            warn!("graph {} ({:?}) not created: {err}", setup.id, request.title);
        })?;
        Ok(Graph::new(
            setup,
            window,
            self.glyphs.as_ref(),
            LiveToken::new(&self.live),
        ))
    }

    /// Build a graph honouring the descriptor's `consume` flag.
    ///
    /// The descriptor is handed back when `consume` is false.
    pub fn build(&mut self, setup: SetupDescriptor) -> GraphResult<(Graph, Option<SetupDescriptor>)> {
        let graph = self.create_graph_from(&setup)?;
        let returned = if setup.consume { None } else { Some(setup) };
        Ok((graph, returned))
    }

    /// Destroy a graph, closing its window. Empty slots are left alone.
    pub fn destroy_graph(&self, graph: &mut Option<Graph>) {
        drop(graph.take());
    }

    /// Number of graphs created by this library that are still alive.
    pub fn live_graphs(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// The glyph cache, absent when the font subsystem failed to initialize.
    pub fn glyphs(&self) -> Option<&GlyphCache> {
        self.glyphs.as_ref()
    }

    /// The windowing platform.
    pub fn platform_mut(&mut self) -> &mut dyn Platform {
        self.platform.as_mut()
    }

    /// Handle that interrupts the platform's event wait.
    pub fn waker(&self) -> Arc<dyn Wake> {
        self.platform.waker()
    }

    /// Release every cached font and texture.
    pub fn shutdown(self) {
        let live = self.live_graphs();
        if live > 0 {
            warn!("library shut down with {live} graph(s) still alive");
        }
        if let Some(glyphs) = &self.glyphs {
            let (fonts, labels) = glyphs.clear();
            info!("library shut down: released {fonts} font(s), {labels} label(s)");
        } else {
            info!("library shut down");
        }
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("status", &self.status)
            .field("glyphs", &self.glyphs)
            .field("live", &self.live_graphs())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessPlatform;
    use crate::text::BlockRasterizer;

    fn library() -> Library {
        Library::init(
            Box::new(HeadlessPlatform::new()),
            Arc::new(BlockRasterizer::new()),
        )
        .unwrap()
    }

    #[test]
    fn platform_failure_is_fatal() {
        let err = Library::init(
            Box::new(HeadlessPlatform::new().with_failing_init()),
            Arc::new(BlockRasterizer::new().with_failing_init()),
        )
        .err()
        .unwrap();
        assert_eq!(err.mask, ErrorMask::VIDEO_INIT | ErrorMask::FONT_INIT);
        assert!(err.mask.is_fatal());
    }

    #[test]
    fn font_failure_is_soft() {
        let mut library = Library::init(
            Box::new(HeadlessPlatform::new()),
            Arc::new(BlockRasterizer::new().with_failing_init()),
        )
        .unwrap();
        assert_eq!(library.status(), ErrorMask::FONT_INIT);
        let graph = library.create_graph(Library::default_descriptor()).unwrap();
        assert!(graph.captions().is_empty());
        assert!(graph.font().is_none());
    }

    #[test]
    fn build_honours_consume_flag() {
        let mut library = library();
        let (_, kept) = library
            .build(Library::default_descriptor().with_consume(false))
            .unwrap();
        let template = kept.unwrap();
        let (_, consumed) = library.build(template.clone()).unwrap();
        assert!(consumed.is_none());
        let again = library.create_graph_from(&template).unwrap();
        assert_eq!(again.id(), template.id);
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut library = library();
        let mut slot = Some(library.create_graph(Library::default_descriptor()).unwrap());
        assert_eq!(library.live_graphs(), 1);
        library.destroy_graph(&mut slot);
        library.destroy_graph(&mut slot);
        assert!(slot.is_none());
        assert_eq!(library.live_graphs(), 0);
    }

    #[test]
    fn window_failure_leaves_no_graph() {
        let mut library = Library::init(
            Box::new(HeadlessPlatform::new().with_window_limit(1)),
            Arc::new(BlockRasterizer::new()),
        )
        .unwrap();
        let _first = library.create_graph(Library::default_descriptor()).unwrap();
        let err = library
            .create_graph(Library::default_descriptor())
            .unwrap_err();
        assert_eq!(err.mask(), ErrorMask::WINDOW_CREATE);
        assert_eq!(library.live_graphs(), 1);
    }

    #[test]
    fn shutdown_clears_cache() {
        let mut library = library();
        let mut graph = Some(library.create_graph(Library::default_descriptor()).unwrap());
        assert_eq!(library.glyphs().unwrap().label_count(), 5);
        library.destroy_graph(&mut graph);
        library.shutdown();
    }
}
