//! Reconciliation loop
//!
//! Drives fetch → classify → close until the query comes back empty:
//!
//! 1. Fetch the page at the current offset (fatal on failure)
//! 2. An empty page ends the run
//! 3. Validate and classify every record in arrival order; aged ids go to
//!    the close batcher, which is flushed whenever it reaches the page size
//! 4. Flush whatever is left at page end, so the next fetch only starts
//!    after every close for this page has completed
//! 5. Advance the offset by the page count and fetch again
//!
//! The offset advances by the number of records consumed from the query even
//! though closed events drop out of the open-state filter server-side. When a
//! page closes events, the next page can skip records that shifted below the
//! new offset; they are picked up by the next run.

use super::batcher::CloseBatcher;
use super::classifier::{classify, Classification, Cutoff};
use super::error::{ReconcileError, RunFailure};
use super::page::PageSize;
use super::source::{EventCloser, EventSource};
use crate::event::Event;
use crate::report::Reporter;

/// Running counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub events_processed: u64,
    pub events_open: u64,
    pub events_closed: u64,
}

impl RunTotals {
    fn record_page(&mut self, page: &PageTally) {
        self.events_processed += page.count;
        self.events_open += page.open;
        self.events_closed += page.closed;
    }
}

#[derive(Debug, Default)]
struct PageTally {
    count: u64,
    open: u64,
    closed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Fetching { offset: u64 },
    Done,
}

pub struct ReconciliationLoop<'a, S: ?Sized, C: ?Sized> {
    source: &'a S,
    closer: &'a C,
    page_size: PageSize,
    cutoff: Cutoff,
}

impl<'a, S, C> ReconciliationLoop<'a, S, C>
where
    S: EventSource + ?Sized,
    C: EventCloser + ?Sized,
{
    pub fn new(source: &'a S, closer: &'a C, page_size: PageSize, cutoff: Cutoff) -> Self {
        Self {
            source,
            closer,
            page_size,
            cutoff,
        }
    }

    pub fn cutoff(&self) -> Cutoff {
        self.cutoff
    }

    /// Run until a fetch returns no events.
    ///
    /// On a fatal error the returned `RunFailure` carries the totals of the
    /// pages that completed before it.
    pub async fn run<R>(&self, reporter: &mut R) -> Result<RunTotals, RunFailure>
    where
        R: Reporter + ?Sized,
    {
        let mut totals = RunTotals::default();
        let mut batcher = CloseBatcher::new(self.page_size);
        let mut state = LoopState::Fetching { offset: 0 };

        while let LoopState::Fetching { offset } = state {
            state = match self.step(offset, &mut batcher, &mut totals, reporter).await {
                Ok(next) => next,
                Err(error) => {
                    log::error!("❌ Reconciliation aborted at offset {}: {}", offset, error);
                    reporter.run_aborted();
                    return Err(RunFailure {
                        error,
                        partial: totals,
                    });
                }
            };
        }

        log::info!(
            "✅ Reconciliation complete: {} processed, {} open, {} closed",
            totals.events_processed,
            totals.events_open,
            totals.events_closed
        );

        Ok(totals)
    }

    /// Process the page at `offset` and return the next state.
    pub async fn step<R>(
        &self,
        offset: u64,
        batcher: &mut CloseBatcher,
        totals: &mut RunTotals,
        reporter: &mut R,
    ) -> Result<LoopState, ReconcileError>
    where
        R: Reporter + ?Sized,
    {
        let page = self
            .source
            .fetch(offset, self.page_size)
            .await
            .map_err(|source| ReconcileError::SourceUnavailable {
                offset,
                page_size: self.page_size,
                source,
            })?;

        if page.is_empty() {
            log::debug!("Query returned no events at offset {}", offset);
            return Ok(LoopState::Done);
        }

        log::info!(
            "📥 Fetched {} events at offset {}{}",
            page.count(),
            offset,
            page.total_count
                .map(|total| format!(" (matching: {})", total))
                .unwrap_or_default()
        );

        let mut tally = PageTally {
            count: page.count() as u64,
            ..Default::default()
        };

        for (index, record) in page.records.into_iter().enumerate() {
            let event = Event::try_from(record).map_err(|source| {
                ReconcileError::MalformedEvent {
                    position: offset + index as u64,
                    source,
                }
            })?;

            match classify(&event, self.cutoff) {
                Classification::Open => {
                    log::debug!("Open: {} (last seen {})", event.id, event.last_seen);
                    tally.open += 1;
                    reporter.event_open(&event);
                }
                Classification::Aged => {
                    log::debug!("Aged: {} (last seen {})", event.id, event.last_seen);
                    tally.closed += 1;
                    reporter.event_aged(&event);
                    batcher.add(event.id);
                    if batcher.should_flush() {
                        self.flush(offset, batcher, reporter).await?;
                    }
                }
            }
        }

        self.flush(offset, batcher, reporter).await?;

        totals.record_page(&tally);
        reporter.page_finished(offset, tally.count);

        Ok(LoopState::Fetching {
            offset: offset + tally.count,
        })
    }

    async fn flush<R>(
        &self,
        offset: u64,
        batcher: &mut CloseBatcher,
        reporter: &mut R,
    ) -> Result<(), ReconcileError>
    where
        R: Reporter + ?Sized,
    {
        if batcher.is_empty() {
            return Ok(());
        }

        let batch_len = batcher.pending().len();
        let first_id = batcher.pending().first().cloned();
        let closed = batcher.flush(self.closer).await.map_err(|source| {
            ReconcileError::CloseRequestFailed {
                offset,
                batch_len,
                first_id,
                source,
            }
        })?;

        log::info!("🗑️  Closed {} events", closed);
        reporter.batch_closed(closed);
        Ok(())
    }
}
