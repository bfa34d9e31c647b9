use super::engine::RunTotals;
use super::page::PageSize;
use super::source::TransportError;
use crate::event::EventFieldError;

/// Fatal reconciliation errors. None of them are retried.
#[derive(Debug)]
pub enum ReconcileError {
    /// The query at `offset` failed.
    SourceUnavailable {
        offset: u64,
        page_size: PageSize,
        source: TransportError,
    },
    /// A close request for an assembled batch failed; the ids stay buffered.
    CloseRequestFailed {
        offset: u64,
        batch_len: usize,
        first_id: Option<String>,
        source: TransportError,
    },
    /// The record at absolute query position `position` could not be validated.
    MalformedEvent {
        position: u64,
        source: EventFieldError,
    },
}

impl std::fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileError::SourceUnavailable {
                offset,
                page_size,
                source,
            } => write!(
                f,
                "event query failed at offset {} (limit {}): {}",
                offset, page_size, source
            ),
            ReconcileError::CloseRequestFailed {
                offset,
                batch_len,
                first_id,
                source,
            } => write!(
                f,
                "close request for {} events (page offset {}, first evid {}) failed: {}",
                batch_len,
                offset,
                first_id.as_deref().unwrap_or("-"),
                source
            ),
            ReconcileError::MalformedEvent { position, source } => {
                write!(f, "malformed event at position {}: {}", position, source)
            }
        }
    }
}

impl std::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReconcileError::SourceUnavailable { source, .. } => Some(source),
            ReconcileError::CloseRequestFailed { source, .. } => Some(source),
            ReconcileError::MalformedEvent { source, .. } => Some(source),
        }
    }
}

/// An aborted run: the error plus the totals of the pages fully processed before it.
#[derive(Debug)]
pub struct RunFailure {
    pub error: ReconcileError,
    pub partial: RunTotals,
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (incomplete run, processed so far: {} events, {} open, {} closed)",
            self.error,
            self.partial.events_processed,
            self.partial.events_open,
            self.partial.events_closed
        )
    }
}

impl std::error::Error for RunFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
