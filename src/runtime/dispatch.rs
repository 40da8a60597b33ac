use std::sync::{Arc, Mutex};

use log::{debug, info};

use super::RunState;
use crate::backend::{Event, EventQueue, Key, Platform, WindowEventKind, WindowId};
use crate::config::RuntimeConfig;
use crate::graph::Graph;

/// Whether the dispatch loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Wait for the next event.
    Continue,
    /// Leave the loop.
    Exit,
}

/// Reacts to platform events on the thread that owns the windows.
#[derive(Debug)]
pub struct Dispatcher {
    state: Arc<RunState>,
    auto_refocus: bool,
    pause_key: char,
}

impl Dispatcher {
    /// Create a dispatcher.
    pub fn new(state: Arc<RunState>, config: &RuntimeConfig) -> Self {
        Self {
            state,
            auto_refocus: config.auto_refocus,
            pause_key: config.pause_key,
        }
    }

    /// Pump events until a quit is requested from anywhere.
    pub fn run<P>(&mut self, platform: &mut P, graphs: &[Arc<Mutex<Graph>>])
    where
        P: Platform + ?Sized,
    {
        info!("dispatcher started");
        while self.state.is_running() {
            let event = platform.wait_event();
            if self.handle(event, platform, graphs) == Flow::Exit {
                break;
            }
        }
        info!("dispatcher stopped");
    }

    /// Handle one event.
    pub fn handle<Q>(&mut self, event: Event, queue: &mut Q, graphs: &[Arc<Mutex<Graph>>]) -> Flow
    where
        Q: EventQueue + ?Sized,
    {
        match event {
            Event::Quit => self.quit("quit event"),
            Event::Key {
                key: Key::Escape, ..
            } => self.quit("escape"),
            Event::Key {
                key: Key::Char(ch), ..
            } if ch.eq_ignore_ascii_case(&self.pause_key) => {
                let paused = self.state.toggle_pause();
                info!("rendering {}", if paused { "paused" } else { "resumed" });
                Flow::Continue
            }
            Event::Window {
                kind: WindowEventKind::Close,
                window,
            } => {
                debug!("close requested on {window:?}");
                self.quit("window closed")
            }
            Event::Window {
                kind: WindowEventKind::Minimized,
                ..
            } => {
                debug!("minimizing {} windows", graphs.len());
                for_each_graph(graphs, Graph::minimize);
                queue.flush_window_events();
                Flow::Continue
            }
            Event::Window {
                kind: WindowEventKind::Restored,
                ..
            } => {
                debug!("restoring {} windows", graphs.len());
                for_each_graph(graphs, Graph::restore);
                queue.flush_window_events();
                Flow::Continue
            }
            Event::Window {
                kind: WindowEventKind::FocusGained,
                window,
            } if self.auto_refocus => {
                self.refocus(window, queue, graphs);
                Flow::Continue
            }
            Event::Wake => {
                if self.state.is_running() {
                    Flow::Continue
                } else {
                    Flow::Exit
                }
            }
            _ => Flow::Continue,
        }
    }

    fn quit(&self, reason: &str) -> Flow {
        info!("shutting down: {reason}");
        self.state.request_quit();
        Flow::Exit
    }

    fn refocus<Q>(&self, focused: WindowId, queue: &mut Q, graphs: &[Arc<Mutex<Graph>>])
    where
        Q: EventQueue + ?Sized,
    {
        let next = queue.peek_window_event().unwrap_or(WindowEventKind::Moved);
        if matches!(
            next,
            WindowEventKind::Close
                | WindowEventKind::Restored
                | WindowEventKind::Minimized
                | WindowEventKind::Maximized
                | WindowEventKind::FocusLost
                | WindowEventKind::Moved
                | WindowEventKind::Resized
                | WindowEventKind::SizeChanged
        ) {
            debug!("focus on {focused:?} followed by {next:?}, not refocusing");
            return;
        }

        debug!("raising all windows, then {focused:?}");
        let mut target = None;
        for graph in graphs {
            let mut graph = graph.lock().expect("graph lock");
            if graph.window_id() == focused {
                target = Some(graph);
            } else {
                graph.raise();
            }
        }
        if let Some(mut graph) = target {
            graph.raise();
        }
        queue.flush_window_events();
    }
}

fn for_each_graph(graphs: &[Arc<Mutex<Graph>>], mut f: impl FnMut(&mut Graph)) {
    for graph in graphs {
        let mut graph = graph.lock().expect("graph lock");
        f(&mut graph);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessHandle, HeadlessPlatform};
    use crate::library::Library;
    use crate::text::BlockRasterizer;

    struct Fixture {
        handle: HeadlessHandle,
        library: Library,
        graphs: Vec<Arc<Mutex<Graph>>>,
        state: Arc<RunState>,
    }

    fn fixture(count: usize) -> Fixture {
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
        let state = Arc::new(RunState::new(library.waker()));
        Fixture {
            handle,
            library,
            graphs,
            state,
        }
    }

    fn window(fixture: &Fixture, index: usize) -> WindowId {
        fixture.graphs[index].lock().unwrap().window_id()
    }

    fn dispatch(fixture: &mut Fixture, config: &RuntimeConfig, event: Event) -> Flow {
        let mut dispatcher = Dispatcher::new(fixture.state.clone(), config);
        dispatcher.handle(event, fixture.library.platform_mut(), &fixture.graphs)
    }

    #[test]
    fn escape_and_close_quit() {
        let mut fx = fixture(1);
        let config = RuntimeConfig::default();
        let key = Event::Key {
            window: None,
            key: Key::Escape,
        };
        assert_eq!(dispatch(&mut fx, &config, key), Flow::Exit);
        assert!(!fx.state.is_running());

        let mut fx = fixture(1);
        let close = Event::Window {
            window: window(&fx, 0),
            kind: WindowEventKind::Close,
        };
        assert_eq!(dispatch(&mut fx, &config, close), Flow::Exit);
        assert!(!fx.state.is_running());
        assert_eq!(fx.handle.pending_events(), 1);
    }

    #[test]
    fn pause_key_toggles_pause() {
        let mut fx = fixture(1);
        let config = RuntimeConfig::default();
        let key = Event::Key {
            window: None,
            key: Key::Char('p'),
        };
        assert_eq!(dispatch(&mut fx, &config, key), Flow::Continue);
        assert!(fx.state.is_paused());
        dispatch(&mut fx, &config, key);
        assert!(!fx.state.is_paused());
        assert!(fx.state.is_running());
    }

    #[test]
    fn minimize_propagates_and_flushes() {
        let mut fx = fixture(3);
        let config = RuntimeConfig::default();
        let first = window(&fx, 0);
        fx.handle.push_event(Event::Window {
            window: window(&fx, 1),
            kind: WindowEventKind::Minimized,
        });
        fx.handle.push_event(Event::Quit);
        let event = Event::Window {
            window: first,
            kind: WindowEventKind::Minimized,
        };
        assert_eq!(dispatch(&mut fx, &config, event), Flow::Continue);
        for index in 0..3 {
            assert!(fx.handle.snapshot(window(&fx, index)).unwrap().minimized);
        }
        assert_eq!(fx.handle.pending_events(), 1);

        let restore = Event::Window {
            window: first,
            kind: WindowEventKind::Restored,
        };
        dispatch(&mut fx, &config, restore);
        for index in 0..3 {
            assert!(!fx.handle.snapshot(window(&fx, index)).unwrap().minimized);
        }
    }

    #[test]
    fn refocus_is_off_by_default() {
        let mut fx = fixture(2);
        let event = Event::Window {
            window: window(&fx, 0),
            kind: WindowEventKind::FocusGained,
        };
        dispatch(&mut fx, &RuntimeConfig::default(), event);
        assert!(fx.handle.raise_log().is_empty());
    }

    #[test]
    fn refocus_raises_focused_window_last() {
        let mut fx = fixture(3);
        let config = RuntimeConfig::default().with_auto_refocus(true);
        let focused = window(&fx, 1);
        fx.handle.push_event(Event::Window {
            window: focused,
            kind: WindowEventKind::Exposed,
        });
        let event = Event::Window {
            window: focused,
            kind: WindowEventKind::FocusGained,
        };
        dispatch(&mut fx, &config, event);
        let log = fx.handle.raise_log();
        assert_eq!(log.len(), 3);
        assert_eq!(log.last(), Some(&focused));
        assert_eq!(fx.handle.pending_events(), 0);
    }

    #[test]
    fn refocus_skips_move_and_lone_focus() {
        let mut fx = fixture(2);
        let config = RuntimeConfig::default().with_auto_refocus(true);
        let focused = window(&fx, 0);
        let event = Event::Window {
            window: focused,
            kind: WindowEventKind::FocusGained,
        };
        dispatch(&mut fx, &config, event);
        fx.handle.push_event(Event::Window {
            window: focused,
            kind: WindowEventKind::Moved,
        });
        dispatch(&mut fx, &config, event);
        assert!(fx.handle.raise_log().is_empty());
        assert_eq!(fx.handle.pending_events(), 1);
    }

    #[test]
    fn run_exits_on_wake_after_quit() {
        let mut fx = fixture(1);
        let state = fx.state.clone();
        let quitter = std::thread::spawn(move || state.request_quit());
        let mut dispatcher = Dispatcher::new(fx.state.clone(), &RuntimeConfig::default());
        quitter.join().unwrap();
        dispatcher.run(fx.library.platform_mut(), &fx.graphs);
        assert!(!fx.state.is_running());
    }
}
