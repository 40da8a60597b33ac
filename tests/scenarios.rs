use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use stripchart::runtime::Ingestor;
use stripchart::{
    BlockRasterizer, Event, GlyphCache, HeadlessPlatform, Key, Library, LineOutcome, RunState,
    RuntimeConfig, Session, SetupDescriptor, SyncStrategy,
};

fn library() -> (Library, stripchart::HeadlessHandle) {
    let platform = HeadlessPlatform::new();
    let handle = platform.handle();
    let library = Library::init(Box::new(platform), Arc::new(BlockRasterizer::new())).unwrap();
    (library, handle)
}

#[test]
fn appends_wrap_oldest_first() {
    let (mut library, _handle) = library();
    for sync in [SyncStrategy::Relaxed, SyncStrategy::Locked] {
        let graph = library
            .create_graph(SetupDescriptor::new().with_capacity(4).with_sync(sync))
            .unwrap();
        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            graph.append_sample(value);
        }
        assert_eq!(graph.chronological(), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(graph.cursor(), 1);
    }
}

#[test]
fn line_protocol_dispatches_by_field() {
    let (mut library, _handle) = library();
    let graphs: Vec<_> = (0..2)
        .map(|_| library.create_graph(SetupDescriptor::new().with_capacity(4)).unwrap())
        .collect();
    let sinks = graphs.iter().map(|graph| graph.sample_ring()).collect();
    let state = Arc::new(RunState::detached());
    let ingestor = Ingestor::new(sinks, &RuntimeConfig::default(), Arc::clone(&state));

    assert_eq!(ingestor.handle_line("10, 20, 30"), LineOutcome::Dispatched(2));
    assert_eq!(graphs[0].chronological(), vec![0.0, 0.0, 0.0, 10.0]);
    assert_eq!(graphs[1].chronological(), vec![0.0, 0.0, 0.0, 20.0]);

    assert!(matches!(ingestor.handle_line("10"), LineOutcome::Dropped { .. }));
    assert_eq!(graphs[0].cursor(), 1);
    assert_eq!(graphs[1].cursor(), 1);

    assert_eq!(ingestor.handle_line("exit"), LineOutcome::End);
    assert!(!state.is_running());
}

#[test]
fn end_token_stops_dispatch_in_a_session() {
    let (mut library, handle) = library();
    let graphs = (0..2)
        .map(|_| library.create_graph(SetupDescriptor::new().with_capacity(4)).unwrap())
        .collect();
    let config = RuntimeConfig::default().with_frame_interval(Duration::from_millis(2));
    let mut session = Session::new(library, graphs, config);
    session.start_render().unwrap();
    session
        .start_ingest(Cursor::new("1, 2\nexit\n3, 4\n"))
        .unwrap();
    session.dispatch();

    let first = session.graphs()[0].lock().unwrap().chronological();
    assert_eq!(first, vec![0.0, 0.0, 0.0, 1.0]);
    let report = session.shutdown();
    assert!(report.render_finished && report.ingest_finished);
    assert_eq!(report.graphs_destroyed, 2);
    assert!(handle
        .window_ids()
        .into_iter()
        .all(|id| handle.snapshot(id).unwrap().destroyed));
}

#[test]
fn escape_quits_a_session() {
    let (mut library, handle) = library();
    let graph = library.create_graph(SetupDescriptor::new()).unwrap();
    let mut session = Session::new(library, vec![graph], RuntimeConfig::default());
    handle.push_event(Event::Key {
        window: None,
        key: Key::Char('p'),
    });
    handle.push_event(Event::Key {
        window: None,
        key: Key::Escape,
    });
    session.dispatch();
    assert!(session.state().is_paused());
    assert!(!session.state().is_running());
    assert_eq!(session.shutdown().graphs_destroyed, 1);
}

#[test]
fn identical_labels_share_a_texture() {
    let cache = GlyphCache::new(Arc::new(BlockRasterizer::new()));
    let font = cache.font(Path::new("any.ttf"), 12).unwrap();
    let color = stripchart::Rgb::BLACK;

    let first = cache.label(&font, color, "500").unwrap();
    let second = cache.label(&font, color, "500").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let negative = cache.label(&font, color, "-500").unwrap();
    assert!(!Arc::ptr_eq(&first, &negative));
    assert_eq!(cache.label_count(), 2);
}

#[test]
fn rendering_twice_draws_the_same_frame() {
    let (mut library, handle) = library();
    let mut graph = library.create_graph(SetupDescriptor::new().with_capacity(8)).unwrap();
    for value in [100.0, -250.0, 900.0] {
        graph.append_sample(value);
    }
    let labels = library.glyphs().unwrap().label_count();

    graph.render();
    graph.render();
    let second = handle.snapshot(graph.window_id()).unwrap().last_frame.unwrap();
    graph.render();
    let third = handle.snapshot(graph.window_id()).unwrap().last_frame.unwrap();

    assert_eq!(second, third);
    assert_eq!(library.glyphs().unwrap().label_count(), labels);
}
