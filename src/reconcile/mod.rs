//! Age-based reconciliation of open events
//!
//! ## Module Organization
//!
//! - `page` - Page size limits and fetched pages
//! - `source` - EventSource / EventCloser traits and transport errors
//! - `classifier` - Run cutoff and Open/Aged classification
//! - `batcher` - Close-request batching
//! - `engine` - The paginated reconciliation loop and run totals
//! - `error` - Fatal run errors

pub mod batcher;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod page;
pub mod source;

pub use batcher::CloseBatcher;
pub use classifier::{classify, Classification, Cutoff};
pub use engine::{LoopState, ReconciliationLoop, RunTotals};
pub use error::{ReconcileError, RunFailure};
pub use page::{EventPage, PageSize, PageSizeError};
pub use source::{EventCloser, EventSource, TransportError};
