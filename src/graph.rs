//! Graph state: one window, one sample ring, and the geometry between them.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info, warn};

use crate::backend::{Window, WindowId};
use crate::error::GraphResult;
use crate::geom::{ScreenPoint, ScreenRect};
use crate::layout::PlotLayout;
use crate::samples::SampleRing;
use crate::setup::SetupDescriptor;
use crate::style::Theme;
use crate::text::{Font, GlyphCache, Texture};
use crate::transform::SampleTransform;

/// A y-axis caption placed left of the axis.
#[derive(Debug, Clone)]
pub struct Caption {
    value: f64,
    rect: ScreenRect,
    texture: Arc<Texture>,
}

impl Caption {
    /// Tick value the caption labels.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Where the caption is blitted.
    pub fn rect(&self) -> ScreenRect {
        self.rect
    }

    /// The cached label texture.
    pub fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }
}

/// Counts graphs alive for their library.
#[derive(Debug)]
pub(crate) struct LiveToken(Arc<AtomicUsize>);

impl LiveToken {
    pub(crate) fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(Arc::clone(counter))
    }
}

impl Drop for LiveToken {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// One live strip chart.
///
/// Owns its window; dropping the graph closes the window. The sample ring is
/// shared with writers through [`Graph::sample_ring`], and outlives the
/// graph if a writer still holds it.
pub struct Graph {
    id: u64,
    title: String,
    window: Box<dyn Window>,
    layout: PlotLayout,
    transform: SampleTransform,
    theme: Theme,
    samples: Arc<SampleRing>,
    points: Vec<ScreenPoint>,
    captions: Vec<Caption>,
    font: Option<Arc<Font>>,
    _live: LiveToken,
}

impl Graph {
    pub(crate) fn new(
        setup: &SetupDescriptor,
        window: Box<dyn Window>,
        glyphs: Option<&GlyphCache>,
        live: LiveToken,
    ) -> Self {
        let layout = PlotLayout::new(setup);
        let transform = SampleTransform::new(&layout);
        let samples = Arc::new(SampleRing::new(layout.capacity(), setup.sync));
        let points = (0..layout.capacity())
            .map(|index| transform.to_screen(index, 0.0))
            .collect();

        let font = glyphs.and_then(|glyphs| glyphs.font_with_fallback(&setup.font_path, setup.font_size));
        let captions = match (glyphs, &font) {
            (Some(glyphs), Some(font)) => build_captions(setup, &layout, glyphs, font),
            _ => Vec::new(),
        };

        let mut graph = Self {
            id: setup.id,
            title: setup.window_title().to_string(),
            window,
            layout,
            transform,
            theme: setup.theme,
            samples,
            points,
            captions,
            font,
            _live: live,
        };
        graph.draw_initial_frame();
        info!(
            "graph {} ({:?}) created: {} samples, {} captions",
            graph.id,
            graph.title,
            graph.layout.capacity(),
            graph.captions.len()
        );
        graph
    }

    /// Id of the descriptor this graph was built from.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Platform id of the graph's window.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Derived geometry.
    pub fn layout(&self) -> &PlotLayout {
        &self.layout
    }

    /// Drawing colors.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Number of samples kept.
    pub fn capacity(&self) -> usize {
        self.samples.capacity()
    }

    /// Index of the next slot to overwrite.
    pub fn cursor(&self) -> usize {
        self.samples.cursor()
    }

    /// Shared handle to the sample ring for writer threads.
    pub fn sample_ring(&self) -> Arc<SampleRing> {
        Arc::clone(&self.samples)
    }

    /// Samples from oldest to newest.
    pub fn chronological(&self) -> Vec<f32> {
        self.samples.chronological()
    }

    /// Overwrite the sample at an absolute slot index.
    pub fn set_sample(&self, index: usize, value: f32) -> GraphResult<()> {
        self.samples.set(index, value)?;
        Ok(())
    }

    /// Overwrite the oldest sample and advance the cursor.
    pub fn append_sample(&self, value: f32) -> usize {
        self.samples.append(value)
    }

    /// Placed y-axis captions, top to bottom.
    pub fn captions(&self) -> &[Caption] {
        &self.captions
    }

    /// The caption font, if one could be opened.
    pub fn font(&self) -> Option<&Arc<Font>> {
        self.font.as_ref()
    }

    /// Screen points of the last rendered frame, oldest first.
    pub fn points(&self) -> &[ScreenPoint] {
        &self.points
    }

    /// Draw the current samples and present the frame.
    ///
    /// With unchanged samples two calls draw the same thing; nothing is
    /// allocated or rasterized here.
    pub fn render(&mut self) {
        let theme = self.theme;
        self.window
            .fill_rect(self.layout.clear_rect(), theme.background_color());
        self.draw_guides();

        let transform = self.transform;
        let points = &mut self.points;
        self.samples.for_each_chronological(|index, value| {
            points[index] = transform.to_screen(index, value);
        });
        self.window.draw_lines(&self.points, theme.plot_color());
        self.window.present();
    }

    /// Minimize the graph's window.
    pub fn minimize(&mut self) {
        self.window.minimize();
    }

    /// Restore the graph's window.
    pub fn restore(&mut self) {
        self.window.restore();
    }

    /// Raise the graph's window.
    pub fn raise(&mut self) {
        self.window.raise();
    }

    fn draw_initial_frame(&mut self) {
        self.window.clear(self.theme.background_color());
        self.draw_guides();
    }

    fn draw_guides(&mut self) {
        let foreground = self.theme.foreground_color();
        self.window.draw_lines(&self.layout.sidebar(), foreground);
        for mark in self.layout.x_tick_marks() {
            self.window.draw_lines(&mark, foreground);
        }
        for caption in &self.captions {
            self.window.draw_texture(&caption.texture, caption.rect);
        }
    }
}

impl Drop for Graph {
    fn drop(&mut self) {
        debug!("graph {} ({:?}) destroyed", self.id, self.title);
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("window", &self.window.id())
            .field("capacity", &self.samples.capacity())
            .field("captions", &self.captions.len())
            .finish_non_exhaustive()
    }
}

fn build_captions(
    setup: &SetupDescriptor,
    layout: &PlotLayout,
    glyphs: &GlyphCache,
    font: &Font,
) -> Vec<Caption> {
    let mut captions = Vec::with_capacity(layout.y_tick_count());
    for (value, tick_y) in layout.y_ticks() {
        let text = setup.formatter.format(value);
        match glyphs.label(font, setup.theme.foreground, &text) {
            Ok(texture) => {
                let rect = layout.caption_rect(
                    tick_y,
                    texture.width() as f32,
                    texture.height() as f32,
                );
                captions.push(Caption {
                    value,
                    rect,
                    texture,
                });
            }
            Err(err) => warn!("skipping caption {:?}: {err}", text.trim()),
        }
    }
    captions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessHandle, HeadlessPlatform};
    use crate::library::Library;
    use crate::render::RenderCommand;
    use crate::text::BlockRasterizer;

    fn fixture() -> (Library, HeadlessHandle) {
        let platform = HeadlessPlatform::new();
        let handle = platform.handle();
        let library = Library::init(Box::new(platform), Arc::new(BlockRasterizer::new())).unwrap();
        (library, handle)
    }

    #[test]
    fn construction_draws_without_presenting() {
        let (mut library, handle) = fixture();
        let graph = library
            .create_graph(Library::default_descriptor().with_capacity(4))
            .unwrap();
        let window = handle.snapshot(graph.window_id()).unwrap();
        assert_eq!(window.frames_presented, 0);
        assert!(matches!(
            window.pending.commands().first(),
            Some(RenderCommand::Clear(_))
        ));
        assert_eq!(window.pending.textures().count(), 5);
        assert_eq!(graph.captions().len(), 5);
    }

    #[test]
    fn render_draws_samples_oldest_first() {
        let (mut library, handle) = fixture();
        let mut graph = library
            .create_graph(Library::default_descriptor().with_capacity(4))
            .unwrap();
        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            graph.append_sample(value);
        }
        graph.render();

        let transform = SampleTransform::new(graph.layout());
        let expected: Vec<_> = [2.0, 3.0, 4.0, 5.0]
            .iter()
            .enumerate()
            .map(|(index, value)| transform.to_screen(index, *value))
            .collect();
        let frame = handle
            .snapshot(graph.window_id())
            .unwrap()
            .last_frame
            .unwrap();
        assert_eq!(frame.last_polyline().unwrap(), expected.as_slice());
        assert_eq!(graph.points(), expected.as_slice());
    }

    #[test]
    fn render_fills_clear_rect_before_guides() {
        let (mut library, handle) = fixture();
        let mut graph = library.create_graph(Library::default_descriptor()).unwrap();
        graph.render();
        graph.render();
        let window = handle.snapshot(graph.window_id()).unwrap();
        let frame = window.last_frame.unwrap();
        match frame.commands().first() {
            Some(RenderCommand::FillRect { rect, color }) => {
                assert_eq!(*rect, graph.layout().clear_rect());
                assert_eq!(*color, graph.theme().background_color());
            }
            other => panic!("unexpected first command {other:?}"),
        }
        assert_eq!(frame.textures().count(), 5);
        assert_eq!(window.frames_presented, 2);
    }

    #[test]
    fn missing_font_falls_back_then_gives_up() {
        let platform = HeadlessPlatform::new();
        let rasterizer = Arc::new(
            BlockRasterizer::new()
                .with_failing_path("missing.ttf")
                .with_failing_path(crate::setup::DEFAULT_FONT_PATH),
        );
        let mut library = Library::init(Box::new(platform), rasterizer).unwrap();
        let graph = library
            .create_graph(Library::default_descriptor().with_font("missing.ttf", 12))
            .unwrap();
        assert!(graph.font().is_none());
        assert!(graph.captions().is_empty());
    }

    #[test]
    fn set_sample_checks_bounds() {
        let (mut library, _handle) = fixture();
        let graph = library
            .create_graph(Library::default_descriptor().with_capacity(4))
            .unwrap();
        graph.set_sample(3, 7.0).unwrap();
        assert_eq!(graph.chronological(), vec![0.0, 0.0, 0.0, 7.0]);
        assert!(graph.set_sample(4, 1.0).is_err());
        assert_eq!(graph.cursor(), 0);
    }
}
