use std::io::BufRead;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, select, unbounded};
use log::{debug, info, trace, warn};

use super::RunState;
use crate::config::RuntimeConfig;
use crate::samples::SampleRing;

/// What happened to one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// One sample was appended to each of this many graphs.
    Dispatched(usize),
    /// The line had fewer fields than there are graphs and was discarded.
    Dropped {
        /// Fields found on the line.
        fields: usize,
        /// Graphs that needed a field.
        graphs: usize,
    },
    /// The end token was read; the session is shutting down.
    End,
}

/// Parse the longest numeric prefix of `text`, or zero if there is none.
///
/// Leading whitespace is skipped. `"12abc"` is 12, `"abc"` is 0, and
/// `"inf"`/`"nan"` prefixes are honoured.
pub fn parse_leading_f32(text: &str) -> f32 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let rest = &text[end..];
    for word in ["infinity", "inf", "nan"] {
        if rest
            .get(..word.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(word))
        {
            return text[..end + word.len()].parse().unwrap_or(0.0);
        }
    }

    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
    };
    let mut mantissa = digits(end);
    end += mantissa;
    if bytes.get(end) == Some(&b'.') {
        let fraction = digits(end + 1);
        mantissa += fraction;
        end += 1 + fraction;
    }
    if mantissa == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }
    text[..end].parse().unwrap_or(0.0)
}

/// Splits input lines and appends their fields to sample rings.
#[derive(Debug)]
pub struct Ingestor {
    sinks: Vec<Arc<SampleRing>>,
    delimiter: String,
    end_token: String,
    state: Arc<RunState>,
}

impl Ingestor {
    /// Create an ingestor feeding `sinks` in order.
    pub fn new(sinks: Vec<Arc<SampleRing>>, config: &RuntimeConfig, state: Arc<RunState>) -> Self {
        Self {
            sinks,
            delimiter: config.delimiter.clone(),
            end_token: config.end_token.clone(),
            state,
        }
    }

    /// Number of graphs fed.
    pub fn graphs(&self) -> usize {
        self.sinks.len()
    }

    /// Split a line into fields. A trailing empty field is dropped.
    pub fn fields<'a>(&self, line: &'a str) -> Vec<&'a str> {
        let mut fields: Vec<&str> = line.split(self.delimiter.as_str()).collect();
        if fields.last().is_some_and(|field| field.is_empty()) {
            fields.pop();
        }
        fields
    }

    /// Handle one line of input.
    ///
    /// Either every graph gets a sample or none does. The end token clears
    /// the run flag.
    pub fn handle_line(&self, line: &str) -> LineOutcome {
        let line = line.trim_end_matches(['\r', '\n']);
        if line == self.end_token {
            info!("end token received");
            self.state.request_quit();
            return LineOutcome::End;
        }

        let fields = self.fields(line);
        if fields.len() < self.sinks.len() {
            trace!(
                "dropping line with {} of {} fields: {line:?}",
                fields.len(),
                self.sinks.len()
            );
            return LineOutcome::Dropped {
                fields: fields.len(),
                graphs: self.sinks.len(),
            };
        }
        for (sink, field) in self.sinks.iter().zip(fields) {
            sink.append(parse_leading_f32(field));
        }
        LineOutcome::Dispatched(self.sinks.len())
    }
}

/// Read lines on a detached thread and forward them over a channel.
///
/// The channel disconnects at end of input or on a read error. The thread
/// can stay blocked in `read_line` after everyone else has stopped; it
/// exits at the next line or end of input.
pub fn spawn_line_reader<R>(mut reader: R) -> std::io::Result<Receiver<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = unbounded();
    thread::Builder::new()
        .name("stripchart-reader".into())
        .spawn(move || {
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!("input read failed: {err}");
                        break;
                    }
                }
            }
            debug!("input reader exiting");
        })?;
    Ok(rx)
}

/// Loop that waits for input lines and hands them to an [`Ingestor`].
///
/// Stops on the end token, on end of input, when the run flag clears, or
/// when the shutdown channel disconnects. End of input only stops
/// ingestion; the session keeps running.
pub struct IngestWorker {
    ingestor: Ingestor,
    lines: Receiver<String>,
    shutdown: Receiver<()>,
    poll: Duration,
}

impl IngestWorker {
    /// Create a worker.
    pub fn new(
        ingestor: Ingestor,
        lines: Receiver<String>,
        shutdown: Receiver<()>,
        poll: Duration,
    ) -> Self {
        Self {
            ingestor,
            lines,
            shutdown,
            poll,
        }
    }

    /// Run until stopped, then mark the worker finished.
    pub fn run(self) {
        info!("ingestion worker started ({} graphs)", self.ingestor.graphs());
        let mut dispatched = 0_u64;
        while self.ingestor.state.is_running() {
            select! {
                recv(self.lines) -> line => match line {
                    Ok(line) => match self.ingestor.handle_line(&line) {
                        LineOutcome::End => break,
                        LineOutcome::Dispatched(_) => dispatched += 1,
                        LineOutcome::Dropped { .. } => {}
                    },
                    Err(_) => {
                        info!("input closed");
                        break;
                    }
                },
                recv(self.shutdown) -> _ => break,
                default(self.poll) => {}
            }
        }
        self.ingestor.state.mark_ingest_finished();
        info!("ingestion worker stopped after {dispatched} lines");
    }

    /// Run on a new named thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("stripchart-ingest".into())
            .spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::SyncStrategy;

    fn rings(count: usize) -> Vec<Arc<SampleRing>> {
        (0..count)
            .map(|_| Arc::new(SampleRing::new(4, SyncStrategy::Relaxed)))
            .collect()
    }

    fn ingestor(sinks: &[Arc<SampleRing>]) -> (Ingestor, Arc<RunState>) {
        let state = Arc::new(RunState::detached());
        let ingestor = Ingestor::new(sinks.to_vec(), &RuntimeConfig::default(), state.clone());
        (ingestor, state)
    }

    #[test]
    fn leading_number_parsing() {
        assert_eq!(parse_leading_f32("10"), 10.0);
        assert_eq!(parse_leading_f32("  -2.5e2xyz"), -250.0);
        assert_eq!(parse_leading_f32("12abc"), 12.0);
        assert_eq!(parse_leading_f32(".5"), 0.5);
        assert_eq!(parse_leading_f32("7."), 7.0);
        assert_eq!(parse_leading_f32("3e"), 3.0);
        assert_eq!(parse_leading_f32("abc"), 0.0);
        assert_eq!(parse_leading_f32("-"), 0.0);
        assert_eq!(parse_leading_f32(""), 0.0);
        assert_eq!(parse_leading_f32("-inf"), f32::NEG_INFINITY);
        assert!(parse_leading_f32("NaN").is_nan());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let sinks = rings(2);
        let (ingestor, _) = ingestor(&sinks);
        assert_eq!(ingestor.handle_line("10, 20, 30\n"), LineOutcome::Dispatched(2));
        assert_eq!(sinks[0].get(0), Some(10.0));
        assert_eq!(sinks[1].get(0), Some(20.0));
        assert_eq!(sinks[0].cursor(), 1);
    }

    #[test]
    fn short_lines_are_dropped_whole() {
        let sinks = rings(2);
        let (ingestor, state) = ingestor(&sinks);
        assert_eq!(
            ingestor.handle_line("10"),
            LineOutcome::Dropped { fields: 1, graphs: 2 }
        );
        assert_eq!(ingestor.handle_line("10, "), LineOutcome::Dropped { fields: 1, graphs: 2 });
        assert!(sinks.iter().all(|ring| ring.cursor() == 0));
        assert!(state.is_running());
    }

    #[test]
    fn unparsable_fields_become_zero() {
        let sinks = rings(2);
        let (ingestor, _) = ingestor(&sinks);
        sinks[1].set(0, 9.0).unwrap();
        assert_eq!(ingestor.handle_line("oops, 4"), LineOutcome::Dispatched(2));
        assert_eq!(sinks[0].get(0), Some(0.0));
        assert_eq!(sinks[1].get(0), Some(4.0));
    }

    #[test]
    fn end_token_requests_quit() {
        let sinks = rings(1);
        let (ingestor, state) = ingestor(&sinks);
        assert_eq!(ingestor.handle_line("exit\r\n"), LineOutcome::End);
        assert!(!state.is_running());
    }

    #[test]
    fn delimiter_and_end_token_are_configurable() {
        let sinks = rings(2);
        let state = Arc::new(RunState::detached());
        let config = RuntimeConfig::default()
            .with_delimiter(";")
            .with_end_token("quit");
        let ingestor = Ingestor::new(sinks.clone(), &config, state.clone());
        assert_eq!(ingestor.handle_line("1;2"), LineOutcome::Dispatched(2));
        assert_eq!(sinks[1].get(0), Some(2.0));
        assert!(matches!(ingestor.handle_line("3, 4"), LineOutcome::Dropped { .. }));
        assert_eq!(ingestor.handle_line("exit"), LineOutcome::Dropped { fields: 1, graphs: 2 });
        assert!(state.is_running());
        assert_eq!(ingestor.handle_line("quit\n"), LineOutcome::End);
        assert!(!state.is_running());
    }

    #[test]
    fn worker_stops_at_end_token_without_dispatching_later_lines() {
        let sinks = rings(1);
        let (ingestor, state) = ingestor(&sinks);
        let lines = spawn_line_reader(std::io::Cursor::new("1\nexit\n2\n")).unwrap();
        let (_shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        IngestWorker::new(ingestor, lines, shutdown_rx, Duration::from_millis(5)).run();
        assert!(state.ingest_finished());
        assert!(!state.is_running());
        assert_eq!(sinks[0].chronological(), vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn end_of_input_stops_only_ingestion() {
        let sinks = rings(1);
        let (ingestor, state) = ingestor(&sinks);
        let lines = spawn_line_reader(std::io::Cursor::new("5\n6")).unwrap();
        let (_shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        IngestWorker::new(ingestor, lines, shutdown_rx, Duration::from_millis(5)).run();
        assert!(state.ingest_finished());
        assert!(state.is_running());
        assert_eq!(sinks[0].chronological(), vec![0.0, 0.0, 5.0, 6.0]);
    }

    #[test]
    fn shutdown_channel_interrupts_idle_worker() {
        let sinks = rings(1);
        let (ingestor, state) = ingestor(&sinks);
        let (_lines_tx, lines_rx) = unbounded::<String>();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let worker = IngestWorker::new(ingestor, lines_rx, shutdown_rx, Duration::from_secs(60))
            .spawn()
            .unwrap();
        drop(shutdown_tx);
        worker.join().unwrap();
        assert!(state.ingest_finished());
    }
}
