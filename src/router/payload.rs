//! EventsRouter JSON envelopes
//!
//! Request:
//! ```json
//! {"action": "EventsRouter", "method": "query", "data": [{...}], "tid": 1}
//! ```
//!
//! Response:
//! ```json
//! {"uuid": "...", "action": "EventsRouter", "result": {...}, "tid": 1, "type": "rpc", "method": "query"}
//! ```
//!
//! Server-side exceptions come back with `"type": "exception"` and no `result`.

use crate::event::EventRecord;
use crate::reconcile::EventPage;
use serde::{Deserialize, Serialize};

pub const ROUTER_ACTION: &str = "EventsRouter";

/// Zenoss `eventState` code for new (unacknowledged, open) events.
pub const EVENT_STATE_NEW: u8 = 0;

#[derive(Debug, Serialize)]
pub struct RouterRequest<D> {
    pub action: &'static str,
    pub method: &'static str,
    pub data: [D; 1],
    pub tid: u64,
}

impl<D> RouterRequest<D> {
    pub fn new(method: &'static str, data: D, tid: u64) -> Self {
        Self {
            action: ROUTER_ACTION,
            method,
            data: [data],
            tid,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryData {
    pub start: u64,
    pub limit: u32,
    pub params: QueryParams,
}

#[derive(Debug, Serialize)]
pub struct QueryParams {
    #[serde(rename = "eventClass")]
    pub event_class: String,
    #[serde(rename = "eventState")]
    pub event_state: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct CloseData<'a> {
    pub evids: &'a [String],
    pub params: CloseParams,
}

#[derive(Debug, Serialize)]
pub struct CloseParams {
    #[serde(rename = "eventClass")]
    pub event_class: String,
}

#[derive(Debug, Deserialize)]
pub struct RouterResponse<R> {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub result: Option<R>,
}

impl<R> RouterResponse<R> {
    /// Unwrap `result`, turning exception envelopes into an error message.
    pub fn into_result(self) -> Result<R, String> {
        if self.kind.as_deref() == Some("exception") {
            return Err(self
                .message
                .unwrap_or_else(|| "router raised an exception".to_string()));
        }
        self.result
            .ok_or_else(|| "response has no result".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryResult {
    /// Absent on failed queries; a successful result without it is malformed.
    pub events: Option<Vec<EventRecord>>,
    #[serde(rename = "totalCount", default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl QueryResult {
    /// Turn a query result into a page, rejecting failed or incomplete results.
    pub fn into_page(self) -> Result<EventPage, String> {
        if self.success == Some(false) {
            return Err(self
                .msg
                .unwrap_or_else(|| "query was not successful".to_string()));
        }
        let records = self
            .events
            .ok_or_else(|| "query result has no events list".to_string())?;
        Ok(EventPage {
            records,
            total_count: self.total_count,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CloseResult {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub msg: Option<String>,
}
