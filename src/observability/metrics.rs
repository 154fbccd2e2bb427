use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

/// Registry is exposed so a host application can mount it on whatever
/// exposition endpoint it already runs; this crate serves nothing.
#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Decoration metrics
    pub decorated_requests: IntCounterVec,

    // Renewal metrics
    pub renewal_attempts: IntCounter,
    pub renewal_failures: IntCounterVec,
    pub renewal_duration: Histogram,
    pub drained_requests: IntCounterVec,

    // Session metrics
    pub sessions_ended: IntCounterVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("tokenrelay".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            decorated_requests: IntCounterVec::new(Opts::new("decorated_requests_total", "Outgoing requests by decoration outcome"), &["outcome"]).unwrap(),

            renewal_attempts: IntCounter::new("renewal_attempts_total", "Renewal exchanges started").unwrap(),
            renewal_failures: IntCounterVec::new(Opts::new("renewal_failures_total", "Renewal failures by reason"), &["reason"]).unwrap(),
            renewal_duration: Histogram::with_opts(HistogramOpts::new("renewal_duration_seconds", "Renewal exchange duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])).unwrap(),
            drained_requests: IntCounterVec::new(Opts::new("drained_requests_total", "Pending requests drained by outcome"), &["outcome"]).unwrap(),

            sessions_ended: IntCounterVec::new(Opts::new("sessions_ended_total", "Session invalidations by reason"), &["reason"]).unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.decorated_requests.clone())).unwrap();
        reg.register(Box::new(metrics.renewal_attempts.clone())).unwrap();
        reg.register(Box::new(metrics.renewal_failures.clone())).unwrap();
        reg.register(Box::new(metrics.renewal_duration.clone())).unwrap();
        reg.register(Box::new(metrics.drained_requests.clone())).unwrap();
        reg.register(Box::new(metrics.sessions_ended.clone())).unwrap();

        metrics
    }
}
