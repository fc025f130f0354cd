use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use deskmate_core::Intent;
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    bare_time_total: AtomicU64,
    city_time_total: AtomicU64,
    currency_total: AtomicU64,
    faq_total: AtomicU64,
    fallback_total: AtomicU64,
    upstream_failures_total: AtomicU64,
    qa_inference_total: AtomicU64,
    uploads_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntentCounts {
    pub bare_time: u64,
    pub city_time: u64,
    pub currency: u64,
    pub faq: u64,
    pub fallback: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub intents: IntentCounts,
    pub upstream_failures_total: u64,
    pub qa_inference_total: u64,
    pub uploads_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_intent(&self, intent: Intent) {
        let counter = match intent {
            Intent::BareTime => &self.bare_time_total,
            Intent::CityTime => &self.city_time_total,
            Intent::Currency => &self.currency_total,
            Intent::Faq => &self.faq_total,
            Intent::Fallback => &self.fallback_total,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_upstream_failure(&self) {
        self.upstream_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_qa_inference(&self) {
        self.qa_inference_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_upload(&self) {
        self.uploads_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            intents: IntentCounts {
                bare_time: self.bare_time_total.load(Ordering::Relaxed),
                city_time: self.city_time_total.load(Ordering::Relaxed),
                currency: self.currency_total.load(Ordering::Relaxed),
                faq: self.faq_total.load(Ordering::Relaxed),
                fallback: self.fallback_total.load(Ordering::Relaxed),
            },
            upstream_failures_total: self.upstream_failures_total.load(Ordering::Relaxed),
            qa_inference_total: self.qa_inference_total.load(Ordering::Relaxed),
            uploads_total: self.uploads_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,deskmate_api=info,deskmate_agents=info,tower_http=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
