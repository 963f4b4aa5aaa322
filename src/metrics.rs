// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Prometheus counters for the API.
//!
//! Each [`Metrics`] owns its own registry so several routers can coexist in one
//! process (the integration tests build one per test).

use prometheus::{opts, Encoder, IntCounterVec, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    http_requests: IntCounterVec,
    like_toggles: IntCounterVec,
    follow_changes: IntCounterVec,
    summaries: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests = IntCounterVec::new(
            opts!("http_requests_total", "HTTP requests by method and status"),
            &["method", "status"],
        )?;
        let like_toggles = IntCounterVec::new(
            opts!("like_toggles_total", "Like toggles by outcome"),
            &["outcome"],
        )?;
        let follow_changes = IntCounterVec::new(
            opts!("follow_changes_total", "Follow and unfollow operations"),
            &["action"],
        )?;
        let summaries = IntCounterVec::new(
            opts!("summaries_generated_total", "Profile summary requests by outcome"),
            &["outcome"],
        )?;

        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(like_toggles.clone()))?;
        registry.register(Box::new(follow_changes.clone()))?;
        registry.register(Box::new(summaries.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            like_toggles,
            follow_changes,
            summaries,
        })
    }

    pub fn record_request(&self, method: &str, status: u16) {
        self.http_requests
            .with_label_values(&[method, &status.to_string()])
            .inc();
    }

    /// `outcome` is `liked` or `unliked`
    pub fn record_like_toggle(&self, outcome: &str) {
        self.like_toggles.with_label_values(&[outcome]).inc();
    }

    /// `action` is `follow` or `unfollow`
    pub fn record_follow_change(&self, action: &str) {
        self.follow_changes.with_label_values(&[action]).inc();
    }

    pub fn record_summary(&self, outcome: &str) {
        self.summaries.with_label_values(&[outcome]).inc();
    }

    /// Text exposition format of every registered metric
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_rendered_output() {
        let metrics = tokio_test::assert_ok!(Metrics::new());
        metrics.record_request("GET", 200);
        metrics.record_request("GET", 200);
        metrics.record_like_toggle("liked");

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"http_requests_total{method="GET",status="200"} 2"#));
        assert!(text.contains(r#"like_toggles_total{outcome="liked"} 1"#));
    }

    #[test]
    fn instances_do_not_share_state() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();
        first.record_follow_change("follow");

        assert!(first.render().unwrap().contains("follow_changes_total"));
        assert!(!second.render().unwrap().contains(r#"action="follow""#));
    }
}
