//! Request counters for the API client
//!
//! Plain atomics; read them through [`ClientMetrics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

use hisris_core::RefreshStats;

/// Counters shared by every request issued through one `ApiClient`
#[derive(Debug, Default)]
pub struct ClientMetrics {
    requests_sent: AtomicU64,
    unauthorized_responses: AtomicU64,
    replays: AtomicU64,
    transport_errors: AtomicU64,
}

/// Point-in-time copy of [`ClientMetrics`] plus the refresh coordinator's
/// counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientMetricsSnapshot {
    /// HTTP requests put on the wire, replays included
    pub requests_sent: u64,
    /// 401 responses observed
    pub unauthorized_responses: u64,
    /// Requests replayed after a successful refresh
    pub replays: u64,
    /// Timeouts and connection failures
    pub transport_errors: u64,
    pub refresh: RefreshStats,
}

impl ClientMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unauthorized(&self) {
        self.unauthorized_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replay(&self) {
        self.replays.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, refresh: RefreshStats) -> ClientMetricsSnapshot {
        ClientMetricsSnapshot {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            unauthorized_responses: self.unauthorized_responses.load(Ordering::Relaxed),
            replays: self.replays.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_events() {
        let metrics = ClientMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_unauthorized();
        metrics.record_replay();

        let refresh = RefreshStats { refreshes_started: 1, ..RefreshStats::default() };
        let snapshot = metrics.snapshot(refresh);

        assert_eq!(snapshot.requests_sent, 2);
        assert_eq!(snapshot.unauthorized_responses, 1);
        assert_eq!(snapshot.replays, 1);
        assert_eq!(snapshot.transport_errors, 0);
        assert_eq!(snapshot.refresh.refreshes_started, 1);
    }
}
