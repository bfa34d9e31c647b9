//! Human-readable run output: per-event blocks and the final summary.

use crate::event::Event;
use crate::reconcile::RunTotals;
use chrono::{DateTime, Local, TimeZone};
use std::io::Write;

pub const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Receives classification results as the loop produces them.
pub trait Reporter {
    fn event_open(&mut self, event: &Event);

    fn event_aged(&mut self, event: &Event);

    fn batch_closed(&mut self, _count: usize) {}

    fn page_finished(&mut self, _offset: u64, _count: u64) {}

    /// The run stopped on a fatal error; the current page will not finish.
    fn run_aborted(&mut self) {}
}

/// Prints a `Closed:` block for each aged event as it is seen, and the
/// `Open:` blocks once their page is done.
pub struct ConsoleReporter<W: Write> {
    out: W,
    run_started: DateTime<Local>,
    open_buffer: Vec<Event>,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout(run_started: DateTime<Local>) -> Self {
        Self::new(std::io::stdout(), run_started)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, run_started: DateTime<Local>) -> Self {
        Self {
            out,
            run_started,
            open_buffer: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_open_events(&mut self) {
        for event in std::mem::take(&mut self.open_buffer) {
            self.write_event("Open:", &event);
        }
        if let Err(e) = self.out.flush() {
            log::warn!("⚠️  Failed to flush report output: {}", e);
        }
    }

    fn write_event(&mut self, heading: &str, event: &Event) {
        let block = format!(
            "{}\nEVID: {}\nEventClass: {}\nCurrent time: {}\nFirst seen {}\nLast seen {}\n",
            heading,
            event.id,
            event.event_class,
            self.run_started.format(DATE_OUTPUT_FORMAT),
            format_epoch(event.first_seen),
            format_epoch(event.last_seen),
        );
        if let Err(e) = writeln!(self.out, "{}", block) {
            log::warn!("⚠️  Failed to write event {}: {}", event.id, e);
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn event_open(&mut self, event: &Event) {
        self.open_buffer.push(event.clone());
    }

    fn event_aged(&mut self, event: &Event) {
        self.write_event("Closed:", event);
    }

    fn page_finished(&mut self, _offset: u64, _count: u64) {
        self.write_open_events();
    }

    fn run_aborted(&mut self) {
        self.write_open_events();
    }
}

/// Format epoch seconds in local time, falling back to the raw value.
pub fn format_epoch(epoch_secs: f64) -> String {
    let secs = epoch_secs.floor();
    let nanos = ((epoch_secs - secs) * 1e9) as u32;
    match Local.timestamp_opt(secs as i64, nanos).single() {
        Some(time) => time.format(DATE_OUTPUT_FORMAT).to_string(),
        None => format!("{}", epoch_secs),
    }
}

/// Write the end-of-run summary. An incomplete run is labelled as such.
pub fn write_summary<W: Write>(out: &mut W, totals: &RunTotals, complete: bool) -> std::io::Result<()> {
    if !complete {
        writeln!(out, "Run aborted - totals are processed so far, not a completed reconciliation")?;
    }
    writeln!(out, "Total events: {}", totals.events_processed)?;
    writeln!(out, "Open {}", totals.events_open)?;
    writeln!(out, "Closed {}", totals.events_closed)?;
    Ok(())
}
