use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter = register_counter!(
        "prompt_gateway_requests_total",
        "Total number of generate requests"
    )
    .unwrap();
    pub static ref THROTTLED_TOTAL: Counter = register_counter!(
        "prompt_gateway_throttled_total",
        "Requests rejected by the cooldown gate"
    )
    .unwrap();
    pub static ref UPSTREAM_FAILURES: Counter = register_counter!(
        "prompt_gateway_upstream_failures_total",
        "Upstream completion calls that failed before streaming"
    )
    .unwrap();
    pub static ref FRAGMENTS_RELAYED: Counter = register_counter!(
        "prompt_gateway_fragments_relayed_total",
        "Text fragments forwarded to clients"
    )
    .unwrap();
    pub static ref STREAM_SETUP_LATENCY: Histogram = register_histogram!(
        "prompt_gateway_stream_setup_seconds",
        "Time from request arrival to the upstream stream being established"
    )
    .unwrap();
}
