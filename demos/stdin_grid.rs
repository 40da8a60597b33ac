//! Opens one GPUI window per column of comma-separated numbers read from
//! standard input.
//!
//! ```text
//! some-sensor | cargo run --example stdin_grid --features gpui -- 4
//! ```
//!
//! Typing `exit` on its own line, pressing Escape, or closing a window quits.
//! `p` pauses and resumes drawing.

use std::io::{BufReader, stdin};
use std::sync::Arc;
use std::thread;

use gpui::Application;

use stripchart::gpui_backend;
use stripchart::{Library, RuntimeConfig, Session, SetupDescriptor, TtfRasterizer, WindowPlacement};

const SCREEN: (u32, u32) = (1920, 1080);
const CELL: (u32, u32) = (480, 260);
const PER_COLUMN: u32 = 3;
const TITLE_OFFSET: u32 = 30;

fn main() {
    env_logger::init();
    let count: u32 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(2);

    Application::new().run(move |cx| {
        let (platform, bridge) = gpui_backend::channel();
        bridge.attach(cx);
        let app = platform.app_handle();

        let spawned = thread::Builder::new()
            .name("stripchart-session".into())
            .spawn(move || {
                run_session(platform, count);
                app.quit();
            });
        if let Err(err) = spawned {
            eprintln!("session thread failed to start: {err}");
            cx.quit();
        }
    });
}

fn run_session(platform: gpui_backend::GpuiPlatform, count: u32) {
    let mut library = match Library::init(Box::new(platform), Arc::new(TtfRasterizer::new())) {
        Ok(library) => library,
        Err(err) => {
            eprintln!("stripchart init failed: {err}");
            return;
        }
    };

    let mut graphs = Vec::new();
    for index in 0..count {
        let setup = SetupDescriptor::new()
            .with_title(format!("input {index}"))
            .with_size(CELL.0, CELL.1)
            .with_placement(WindowPlacement::grid(
                index,
                PER_COLUMN,
                CELL,
                TITLE_OFFSET,
                SCREEN,
            ));
        match library.create_graph(setup) {
            Ok(graph) => graphs.push(graph),
            Err(err) => eprintln!("graph {index} not created: {err}"),
        }
    }

    let config = RuntimeConfig::default().with_auto_refocus(true);
    let mut session = Session::new(library, graphs, config);
    if let Err(err) = session.start_render() {
        eprintln!("render worker failed to start: {err}");
        return;
    }
    if let Err(err) = session.start_ingest(BufReader::new(stdin())) {
        eprintln!("ingestion failed to start: {err}");
        return;
    }
    session.dispatch();
    let report = session.shutdown();
    log::info!("{report:?}");
}
