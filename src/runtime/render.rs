use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::info;

use super::RunState;
use crate::graph::Graph;

/// Frame-paced loop that redraws every graph.
///
/// Pacing is a fixed delay: each pass sleeps for whatever is left of the
/// frame interval. Slow passes are not made up for.
pub struct RenderWorker {
    graphs: Vec<Arc<Mutex<Graph>>>,
    state: Arc<RunState>,
    frame_interval: Duration,
}

impl RenderWorker {
    /// Create a worker over a set of graphs.
    pub fn new(
        graphs: Vec<Arc<Mutex<Graph>>>,
        state: Arc<RunState>,
        frame_interval: Duration,
    ) -> Self {
        Self {
            graphs,
            state,
            frame_interval,
        }
    }

    /// Render every graph once unless paused. Returns whether anything was drawn.
    pub fn step(&self) -> bool {
        if self.state.is_paused() {
            return false;
        }
        for graph in &self.graphs {
            graph.lock().expect("graph lock").render();
        }
        true
    }

    /// Run until the run flag clears, then mark the worker finished.
    pub fn run(self) {
        info!("render worker started ({} graphs)", self.graphs.len());
        let mut frames = 0_u64;
        while self.state.is_running() {
            let started = Instant::now();
            if self.step() {
                frames += 1;
            }
            if let Some(rest) = self.frame_interval.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }
        self.state.mark_render_finished();
        info!("render worker stopped after {frames} frames");
    }

    /// Run on a new named thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("stripchart-render".into())
            .spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessHandle, HeadlessPlatform};
    use crate::library::Library;
    use crate::text::BlockRasterizer;

    fn graphs(count: usize) -> (HeadlessHandle, Library, Vec<Arc<Mutex<Graph>>>) {
        let platform = HeadlessPlatform::new();
        let handle = platform.handle();
        let mut library =
            Library::init(Box::new(platform), Arc::new(BlockRasterizer::new())).unwrap();
        let graphs = (0..count)
            .map(|_| {
                let graph = library.create_graph(Library::default_descriptor()).unwrap();
                Arc::new(Mutex::new(graph))
            })
            .collect();
        (handle, library, graphs)
    }

    #[test]
    fn paused_step_draws_nothing() {
        let (handle, _library, graphs) = graphs(1);
        let id = graphs[0].lock().unwrap().window_id();
        let state = Arc::new(RunState::detached());
        let worker = RenderWorker::new(graphs, state.clone(), Duration::ZERO);
        assert!(worker.step());
        state.set_paused(true);
        assert!(!worker.step());
        assert_eq!(handle.snapshot(id).unwrap().frames_presented, 1);
    }

    #[test]
    fn run_marks_finished_on_quit() {
        let (handle, _library, graphs) = graphs(2);
        let ids: Vec<_> = graphs.iter().map(|g| g.lock().unwrap().window_id()).collect();
        let state = Arc::new(RunState::detached());
        let worker = RenderWorker::new(graphs, state.clone(), Duration::from_millis(1));
        let thread = worker.spawn().unwrap();
        for id in &ids {
            assert!(handle.wait_for_frames(*id, 2, Duration::from_secs(5)));
        }
        state.request_quit();
        thread.join().unwrap();
        assert!(state.render_finished());
    }

    #[test]
    fn pacing_caps_frame_rate() {
        let (handle, _library, graphs) = graphs(1);
        let id = graphs[0].lock().unwrap().window_id();
        let state = Arc::new(RunState::detached());
        let worker = RenderWorker::new(graphs, state.clone(), Duration::from_millis(20));
        let started = Instant::now();
        let thread = worker.spawn().unwrap();
        thread::sleep(Duration::from_millis(100));
        state.request_quit();
        thread.join().unwrap();
        let allowed = started.elapsed().as_millis() as u64 / 20 + 1;
        let presented = handle.snapshot(id).unwrap().frames_presented;
        assert!(presented >= 1);
        assert!(presented <= allowed, "{presented} frames in {allowed} intervals");
    }
}
