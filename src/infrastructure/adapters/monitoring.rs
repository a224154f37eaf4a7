//! Monitoring adapter for metrics and observability
//!
//! Prometheus collectors for authorisation outcomes, soft-decline retries,
//! notification dispositions and gateway latency.

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

use crate::domain::authorisation::OrderRequestType;
use crate::domain::notification::NotificationDisposition;
use crate::shared::error::{AppError, AppResult};

/// Adapter for monitoring and metrics services
pub struct MonitoringAdapter {
    prometheus_registry: Registry,
    authorisation_outcomes: IntCounterVec,
    soft_decline_retries: IntCounter,
    notification_dispositions: IntCounterVec,
    gateway_latency: HistogramVec,
}

impl MonitoringAdapter {
    /// Create a new monitoring adapter with its own registry
    pub fn new() -> AppResult<Self> {
        let registry = Registry::new();

        let authorisation_outcomes = IntCounterVec::new(
            Opts::new("gateway_authorisation_outcomes_total", "Final authorisation outcomes"),
            &["gateway", "outcome"],
        )
        .map_err(metrics_error)?;

        let soft_decline_retries = IntCounter::new(
            "gateway_soft_decline_retries_total",
            "Authorisations resubmitted without exemption after a soft decline",
        )
        .map_err(metrics_error)?;

        let notification_dispositions = IntCounterVec::new(
            Opts::new("gateway_notifications_total", "Processed notifications by disposition"),
            &["gateway", "disposition"],
        )
        .map_err(metrics_error)?;

        let gateway_latency = HistogramVec::new(
            HistogramOpts::new("gateway_request_duration_seconds", "Gateway round-trip time in seconds"),
            &["order_type"],
        )
        .map_err(metrics_error)?;

        registry.register(Box::new(authorisation_outcomes.clone())).map_err(metrics_error)?;
        registry.register(Box::new(soft_decline_retries.clone())).map_err(metrics_error)?;
        registry.register(Box::new(notification_dispositions.clone())).map_err(metrics_error)?;
        registry.register(Box::new(gateway_latency.clone())).map_err(metrics_error)?;

        Ok(Self {
            prometheus_registry: registry,
            authorisation_outcomes,
            soft_decline_retries,
            notification_dispositions,
            gateway_latency,
        })
    }

    /// Count a final authorisation outcome
    pub fn record_authorisation(&self, gateway: &str, outcome: &str) {
        self.authorisation_outcomes.with_label_values(&[gateway, outcome]).inc();
    }

    /// Count a resubmission without exemption
    pub fn record_soft_decline_retry(&self) {
        self.soft_decline_retries.inc();
    }

    /// Count a processed notification by disposition
    pub fn record_notification(&self, gateway: &str, disposition: NotificationDisposition) {
        self.notification_dispositions
            .with_label_values(&[gateway, disposition.label()])
            .inc();
    }

    /// Record gateway round-trip time for an order type
    pub fn observe_gateway_latency(&self, order_type: OrderRequestType, seconds: f64) {
        self.gateway_latency
            .with_label_values(&[order_type.as_str()])
            .observe(seconds);
    }

    /// Current authorisation outcome count
    pub fn authorisation_count(&self, gateway: &str, outcome: &str) -> u64 {
        self.authorisation_outcomes.with_label_values(&[gateway, outcome]).get()
    }

    /// Current soft-decline retry count
    pub fn soft_decline_retry_count(&self) -> u64 {
        self.soft_decline_retries.get()
    }

    /// Current notification count for a disposition
    pub fn notification_count(&self, gateway: &str, disposition: NotificationDisposition) -> u64 {
        self.notification_dispositions
            .with_label_values(&[gateway, disposition.label()])
            .get()
    }

    /// Get Prometheus metrics in text format
    pub fn get_prometheus_metrics(&self) -> AppResult<String> {
        use prometheus::Encoder;
        let mut buffer = Vec::new();
        let encoder = prometheus::TextEncoder::new();
        encoder
            .encode(&self.prometheus_registry.gather(), &mut buffer)
            .map_err(metrics_error)?;
        String::from_utf8(buffer).map_err(|e| AppError::Internal(format!("metrics are not UTF-8: {}", e)))
    }
}

fn metrics_error(err: prometheus::Error) -> AppError {
    AppError::Internal(format!("metrics error: {}", err))
}
