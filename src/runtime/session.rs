use std::io::BufRead;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::{Sender, bounded};
use log::{debug, info, warn};

use super::{Dispatcher, IngestWorker, Ingestor, RenderWorker, RunState, spawn_line_reader};
use crate::config::RuntimeConfig;
use crate::graph::Graph;
use crate::library::Library;

/// What [`Session::shutdown`] managed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShutdownReport {
    /// The render worker was joined and had marked itself finished.
    pub render_finished: bool,
    /// The ingestion worker was joined and had marked itself finished.
    pub ingest_finished: bool,
    /// Graphs destroyed during shutdown.
    pub graphs_destroyed: usize,
}

/// A running set of graphs with their workers.
///
/// Typical use: build graphs through the [`Library`], hand both to
/// [`Session::new`], start the workers, call [`Session::dispatch`] on the
/// platform thread, then [`Session::shutdown`].
pub struct Session {
    library: Option<Library>,
    graphs: Vec<Arc<Mutex<Graph>>>,
    state: Arc<RunState>,
    config: RuntimeConfig,
    render: Option<JoinHandle<()>>,
    ingest: Option<(JoinHandle<()>, Sender<()>)>,
}

impl Session {
    /// Take ownership of a library and its graphs.
    pub fn new(library: Library, graphs: Vec<Graph>, config: RuntimeConfig) -> Self {
        let state = Arc::new(RunState::new(library.waker()));
        Self {
            library: Some(library),
            graphs: graphs.into_iter().map(|graph| Arc::new(Mutex::new(graph))).collect(),
            state,
            config,
            render: None,
            ingest: None,
        }
    }

    /// Shared run state.
    pub fn state(&self) -> &Arc<RunState> {
        &self.state
    }

    /// The graphs, in input-field order.
    pub fn graphs(&self) -> &[Arc<Mutex<Graph>>] {
        &self.graphs
    }

    /// Start the render worker. Does nothing if it is already running.
    pub fn start_render(&mut self) -> std::io::Result<()> {
        if self.render.is_some() {
            return Ok(());
        }
        let worker = RenderWorker::new(
            self.graphs.clone(),
            Arc::clone(&self.state),
            self.config.frame_interval,
        );
        self.render = Some(worker.spawn()?);
        Ok(())
    }

    /// Start ingesting lines from `input`. Does nothing if already started.
    pub fn start_ingest<R>(&mut self, input: R) -> std::io::Result<()>
    where
        R: BufRead + Send + 'static,
    {
        if self.ingest.is_some() {
            return Ok(());
        }
        let sinks = self
            .graphs
            .iter()
            .map(|graph| graph.lock().expect("graph lock").sample_ring())
            .collect();
        let ingestor = Ingestor::new(sinks, &self.config, Arc::clone(&self.state));
        let lines = spawn_line_reader(input)?;
        let (shutdown_tx, shutdown_rx) = bounded(0);
        let worker = IngestWorker::new(ingestor, lines, shutdown_rx, self.config.ingest_poll);
        self.ingest = Some((worker.spawn()?, shutdown_tx));
        Ok(())
    }

    /// Run the event dispatcher on this thread until quit.
    pub fn dispatch(&mut self) {
        let Some(library) = self.library.as_mut() else {
            return;
        };
        let mut dispatcher = Dispatcher::new(Arc::clone(&self.state), &self.config);
        dispatcher.run(library.platform_mut(), &self.graphs);
    }

    /// Request quit from any thread holding the run state.
    pub fn request_quit(&self) {
        self.state.request_quit();
    }

    /// Stop the workers, destroy every graph, and shut the library down.
    ///
    /// The render worker is joined before any window is destroyed. The
    /// ingestion worker is interrupted through its shutdown channel; only
    /// its line-reader thread may linger, blocked on input.
    pub fn shutdown(mut self) -> ShutdownReport {
        let mut report = ShutdownReport::default();
        self.stop_workers();
        report.ingest_finished = self.state.ingest_finished();
        report.render_finished = self.state.render_finished();

        for graph in self.graphs.drain(..) {
            match Arc::try_unwrap(graph) {
                Ok(graph) => {
                    drop(graph);
                    report.graphs_destroyed += 1;
                }
                Err(_) => warn!("graph still shared at shutdown"),
            }
        }
        info!(
            "session shut down: {} graph(s) destroyed",
            report.graphs_destroyed
        );
        if let Some(library) = self.library.take() {
            library.shutdown();
        }
        report
    }

    /// Request quit, interrupt ingestion, and join both workers.
    fn stop_workers(&mut self) {
        self.state.request_quit();
        if let Some((worker, shutdown)) = self.ingest.take() {
            drop(shutdown);
            if worker.join().is_err() {
                warn!("ingestion worker panicked");
            }
        }
        if let Some(worker) = self.render.take() {
            if worker.join().is_err() {
                warn!("render worker panicked");
            }
        }
    }
}

// Dropped without `shutdown`: the workers still have to stop before the
// windows go away.
impl Drop for Session {
    fn drop(&mut self) {
        if self.library.is_none() {
            return;
        }
        self.stop_workers();
        self.graphs.clear();
        debug!("session dropped without shutdown");
    }
}
