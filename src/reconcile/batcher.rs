use super::page::PageSize;
use super::source::{EventCloser, TransportError};

/// Buffers aged event ids and submits them as one close request.
///
/// The buffer is bounded by the page size: callers check `should_flush`
/// after every `add` and flush before adding more.
#[derive(Debug)]
pub struct CloseBatcher {
    pending: Vec<String>,
    limit: PageSize,
}

impl CloseBatcher {
    pub fn new(limit: PageSize) -> Self {
        Self {
            pending: Vec::with_capacity(limit.as_usize()),
            limit,
        }
    }

    pub fn add(&mut self, event_id: String) {
        debug_assert!(self.pending.len() < self.limit.as_usize());
        self.pending.push(event_id);
    }

    pub fn should_flush(&self) -> bool {
        self.pending.len() >= self.limit.as_usize()
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Send every buffered id in one close request.
    ///
    /// Returns the number of ids closed. An empty buffer issues no request.
    /// On failure the ids stay buffered.
    pub async fn flush<C>(&mut self, closer: &C) -> Result<usize, TransportError>
    where
        C: EventCloser + ?Sized,
    {
        if self.pending.is_empty() {
            return Ok(0);
        }

        closer.close(&self.pending).await?;

        let closed = self.pending.len();
        self.pending.clear();
        Ok(closed)
    }
}
