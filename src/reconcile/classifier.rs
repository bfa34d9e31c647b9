use crate::event::Event;
use chrono::{DateTime, Utc};

/// Instant below which an event's last-seen time marks it aged.
///
/// Computed once per run from `now - lookback`; every page of the run is
/// compared against the same value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Cutoff {
    epoch_secs: f64,
}

impl Cutoff {
    pub fn from_lookback(now: DateTime<Utc>, lookback_minutes: u64) -> Self {
        let now_secs = now.timestamp_millis() as f64 / 1000.0;
        let lookback_secs = lookback_minutes.saturating_mul(60) as f64;
        Self::at(now_secs - lookback_secs)
    }

    pub fn at(epoch_secs: f64) -> Self {
        Self { epoch_secs }
    }

    pub fn epoch_secs(&self) -> f64 {
        self.epoch_secs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Seen at or after the cutoff; stays open.
    Open,
    /// Last seen strictly before the cutoff; eligible to close.
    Aged,
}

pub fn classify(event: &Event, cutoff: Cutoff) -> Classification {
    if event.last_seen < cutoff.epoch_secs {
        Classification::Aged
    } else {
        Classification::Open
    }
}
