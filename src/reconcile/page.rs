use crate::event::EventRecord;

/// Page size accepted by the router, `1..=1000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageSize(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSizeError(pub u32);

impl std::fmt::Display for PageSizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "page size {} is outside 1..={}",
            self.0,
            PageSize::MAX.get()
        )
    }
}

impl std::error::Error for PageSizeError {}

impl PageSize {
    /// Hard limit enforced by the remote service.
    pub const MAX: PageSize = PageSize(1000);
    pub const DEFAULT: PageSize = PageSize(100);

    pub fn new(size: u32) -> Result<Self, PageSizeError> {
        if size == 0 || size > Self::MAX.0 {
            return Err(PageSizeError(size));
        }
        Ok(Self(size))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of a query, in the order the router returned it.
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub records: Vec<EventRecord>,
    /// Size of the whole matching set, when the router reports it.
    pub total_count: Option<u64>,
}

impl EventPage {
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self {
            records,
            total_count: None,
        }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
