//! Prometheus metrics recorder for notebridge.
//!
//! Exposes a standard `/metrics` endpoint that Prometheus can scrape.
//! Metrics live in a private registry owned by the recorder, so several
//! recorders (one per test app, for instance) never collide.

use std::time::Duration;

use prometheus::{
    histogram_opts, opts, Encoder, Histogram, IntCounterVec, IntGauge, Registry, TextEncoder,
};

pub struct PrometheusRecorder {
    registry: Registry,

    // Counters
    requests_total: IntCounterVec,
    inbound_messages_total: IntCounterVec,

    // Histograms
    request_duration_seconds: Histogram,

    // Gauges
    pending_replies: IntGauge,
}

impl PrometheusRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            opts!(
                "notebridge_requests_total",
                "Release notes requests by final outcome"
            ),
            &["outcome"],
        )
        .expect("valid notebridge_requests_total definition");

        let inbound_messages_total = IntCounterVec::new(
            opts!(
                "notebridge_inbound_messages_total",
                "Chat messages received by the bot, by match result"
            ),
            &["outcome"],
        )
        .expect("valid notebridge_inbound_messages_total definition");

        let request_duration_seconds = Histogram::with_opts(histogram_opts!(
            "notebridge_request_duration_seconds",
            "Time from request arrival to response, reviewer wait included",
            // Human-in-the-loop buckets: 1s to 15min
            vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 900.0]
        ))
        .expect("valid notebridge_request_duration_seconds definition");

        let pending_replies = IntGauge::with_opts(opts!(
            "notebridge_pending_replies",
            "Requests currently waiting for a reviewer reply"
        ))
        .expect("valid notebridge_pending_replies definition");

        for collector in [
            Box::new(requests_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(inbound_messages_total.clone()),
            Box::new(request_duration_seconds.clone()),
            Box::new(pending_replies.clone()),
        ] {
            registry
                .register(collector)
                .expect("metric names are unique within a fresh registry");
        }

        Self {
            registry,
            requests_total,
            inbound_messages_total,
            request_duration_seconds,
            pending_replies,
        }
    }

    /// Record a finished release notes request.
    pub fn record_request(&self, outcome: &str, elapsed: Duration) {
        self.requests_total.with_label_values(&[outcome]).inc();
        self.request_duration_seconds
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_inbound(&self, outcome: &str) {
        self.inbound_messages_total
            .with_label_values(&[outcome])
            .inc();
    }

    pub fn set_pending(&self, count: usize) {
        self.pending_replies.set(count as i64);
    }

    /// Encode all metrics as Prometheus text format.
    /// Called by the `/metrics` HTTP handler.
    pub fn encode(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for PrometheusRecorder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorders_do_not_collide() {
        let a = PrometheusRecorder::new();
        let b = PrometheusRecorder::new();
        a.record_request("fulfilled", Duration::from_secs(3));
        assert!(a.encode().contains("notebridge_requests_total{outcome=\"fulfilled\"} 1"));
        assert!(!b.encode().contains("outcome=\"fulfilled\""));
    }

    #[test]
    fn test_pending_gauge_and_inbound_counter() {
        let m = PrometheusRecorder::new();
        m.set_pending(2);
        m.record_inbound("no_pending");
        m.record_inbound("no_pending");

        let out = m.encode();
        assert!(out.contains("notebridge_pending_replies 2"));
        assert!(out.contains("notebridge_inbound_messages_total{outcome=\"no_pending\"} 2"));
    }
}
