//! HTTP transport to the Zenoss EventsRouter JSON API
//!
//! Endpoint: `{ZENOSS_URL}/zport/dmd/evconsole_router`
//!
//! - `query` pages through events in one event class with `eventState = [0]`
//! - `close` closes a list of evids in the same event class

pub mod client;
pub mod payload;

pub use client::RouterClient;
