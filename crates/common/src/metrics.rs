use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge_vec, CounterVec,
    Encoder, HistogramVec, IntGaugeVec, TextEncoder,
};

lazy_static! {
    // Aggregator operation metrics
    pub static ref ORDER_OPERATION_COUNTER: CounterVec = register_counter_vec!(
        "orders_operations_total",
        "Total number of order aggregator operations",
        &["operation", "status"]
    )
    .expect("metric cannot be created");

    pub static ref ORDER_OPERATION_DURATION: HistogramVec = register_histogram_vec!(
        "orders_operation_duration_seconds",
        "Order aggregator operation duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("metric cannot be created");

    // Remote dependency metrics
    pub static ref DEPENDENCY_FETCH_COUNTER: CounterVec = register_counter_vec!(
        "orders_dependency_fetch_total",
        "Total number of remote entity fetches",
        &["dependency", "status"]
    )
    .expect("metric cannot be created");

    pub static ref DEPENDENCY_FETCH_DURATION: HistogramVec = register_histogram_vec!(
        "orders_dependency_fetch_duration_seconds",
        "Remote entity fetch duration in seconds, including retries",
        &["dependency"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("metric cannot be created");

    pub static ref DEPENDENCY_RETRY_COUNTER: CounterVec = register_counter_vec!(
        "orders_dependency_retries_total",
        "Total number of remote fetch retry attempts",
        &["dependency"]
    )
    .expect("metric cannot be created");

    // Order store metrics
    pub static ref ORDER_STORE_OPERATIONS: CounterVec = register_counter_vec!(
        "orders_store_operations_total",
        "Total number of order store operations",
        &["operation", "status"]
    )
    .expect("metric cannot be created");

    pub static ref ORDER_STORE_DURATION: HistogramVec = register_histogram_vec!(
        "orders_store_duration_seconds",
        "Order store operation duration in seconds",
        &["operation"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("metric cannot be created");

    // Circuit breaker metrics
    pub static ref CIRCUIT_BREAKER_STATE: IntGaugeVec = register_int_gauge_vec!(
        "orders_circuit_breaker_state",
        "Circuit breaker state (0=closed, 1=open, 2=half-open)",
        &["service"]
    )
    .expect("metric cannot be created");

    pub static ref CIRCUIT_BREAKER_COUNTER: CounterVec = register_counter_vec!(
        "orders_circuit_breaker_total",
        "Total number of circuit breaker state changes",
        &["service", "from_state", "to_state"]
    )
    .expect("metric cannot be created");
}

/// Get all metrics in Prometheus text format
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

fn status_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

/// Record a create/get/list call on the order aggregator
pub fn record_order_operation(operation: &str, success: bool, duration_secs: f64) {
    ORDER_OPERATION_COUNTER
        .with_label_values(&[operation, status_label(success)])
        .inc();
    ORDER_OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(duration_secs);
}

/// Record the outcome of a remote entity fetch. `status` is a short outcome
/// label such as `success`, `status_404`, `transport` or `decode`.
pub fn record_dependency_fetch(dependency: &str, status: &str, duration_secs: f64) {
    DEPENDENCY_FETCH_COUNTER
        .with_label_values(&[dependency, status])
        .inc();
    DEPENDENCY_FETCH_DURATION
        .with_label_values(&[dependency])
        .observe(duration_secs);
}

pub fn record_dependency_retry(dependency: &str) {
    DEPENDENCY_RETRY_COUNTER.with_label_values(&[dependency]).inc();
}

/// Helper function to record order store operation
pub fn record_store_operation(operation: &str, success: bool, duration_secs: f64) {
    ORDER_STORE_OPERATIONS
        .with_label_values(&[operation, status_label(success)])
        .inc();
    ORDER_STORE_DURATION
        .with_label_values(&[operation])
        .observe(duration_secs);
}

/// Helper function to record circuit breaker state
pub fn record_circuit_breaker_state(service: &str, state: CircuitBreakerState) {
    let state_value = match state {
        CircuitBreakerState::Closed => 0,
        CircuitBreakerState::Open => 1,
        CircuitBreakerState::HalfOpen => 2,
    };
    CIRCUIT_BREAKER_STATE
        .with_label_values(&[service])
        .set(state_value);
}

/// Helper function to record circuit breaker state change
pub fn record_circuit_breaker_transition(
    service: &str,
    from: CircuitBreakerState,
    to: CircuitBreakerState,
) {
    CIRCUIT_BREAKER_COUNTER
        .with_label_values(&[service, &format!("{:?}", from), &format!("{:?}", to)])
        .inc();
}

#[derive(Debug, Clone, Copy)]
pub enum CircuitBreakerState {
    Closed,
    Open,
    HalfOpen,
}
