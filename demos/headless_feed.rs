//! Feeds a synthetic sample stream through a headless session and prints
//! what each window presented.
//!
//! Run with `RUST_LOG=debug cargo run --example headless_feed` to see the
//! workers start and stop.

use std::fmt::Write as _;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use stripchart::{
    BlockRasterizer, HeadlessPlatform, Library, RuntimeConfig, Session, SetupDescriptor, Theme,
    WindowPlacement,
};

const GRAPHS: u32 = 3;
const LINES: usize = 600;

fn main() {
    env_logger::init();

    let platform = HeadlessPlatform::new();
    let handle = platform.handle();
    let mut library = match Library::init(Box::new(platform), Arc::new(BlockRasterizer::new())) {
        Ok(library) => library,
        Err(err) => {
            eprintln!("stripchart init failed: {err}");
            return;
        }
    };

    let mut graphs = Vec::new();
    for index in 0..GRAPHS {
        let setup = SetupDescriptor::new()
            .with_title(format!("stream {index}"))
            .with_capacity(200)
            .with_amplitude(100)
            .with_theme(Theme::default())
            .with_placement(WindowPlacement::grid(index, 2, (640, 480), 24, (1920, 1080)));
        match library.create_graph(setup) {
            Ok(graph) => graphs.push(graph),
            Err(err) => eprintln!("graph {index} not created: {err}"),
        }
    }

    let mut input = String::new();
    for step in 0..LINES {
        let phase = step as f32 * 0.05;
        let fields: Vec<String> = (0..GRAPHS)
            .map(|index| format!("{:.3}", 80.0 * (phase + index as f32).sin()))
            .collect();
        let _ = writeln!(input, "{}", fields.join(", "));
    }
    input.push_str("exit\n");

    let config = RuntimeConfig::default().with_frame_interval(Duration::from_millis(5));
    let mut session = Session::new(library, graphs, config);
    let ids: Vec<_> = session
        .graphs()
        .iter()
        .map(|graph| graph.lock().expect("graph lock").window_id())
        .collect();
    if let Err(err) = session.start_render() {
        eprintln!("render worker failed to start: {err}");
        return;
    }
    if let Err(err) = session.start_ingest(Cursor::new(input)) {
        eprintln!("ingestion failed to start: {err}");
        return;
    }
    session.dispatch();
    let report = session.shutdown();

    for id in ids {
        if let Some(window) = handle.snapshot(id) {
            println!(
                "{:<10} frames={:<5} destroyed={}",
                window.request.title, window.frames_presented, window.destroyed
            );
        }
    }
    println!("{report:?}");
}
