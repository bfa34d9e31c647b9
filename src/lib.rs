//! # evreaper
//!
//! Closes aged monitoring events held by a Zenoss event console.
//!
//! A run pages through the open events of one event class, classifies each
//! against a fixed cutoff (`now - LOOKBACK_MINUTES`) and closes the ones last
//! seen before it, in batches of at most one page.
//!
//! ## Module Organization
//!
//! - `config` - Environment configuration
//! - `event` - Event model and wire-record validation
//! - `reconcile` - Classification, close batching and the paginated loop
//! - `router` - EventsRouter HTTP client
//! - `report` - Per-event output and run summary
//! - `logging` - env_logger setup

pub mod config;
pub mod event;
pub mod logging;
pub mod reconcile;
pub mod report;
pub mod router;

pub use config::{ConfigError, ReaperConfig};
pub use event::{Event, EventRecord};
pub use reconcile::{Cutoff, ReconciliationLoop, RunFailure, RunTotals};
pub use router::RouterClient;
