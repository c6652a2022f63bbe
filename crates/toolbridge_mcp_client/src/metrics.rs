//! OpenTelemetry counters for the bridge.
//!
//! Available with the `metrics` feature; without it every recorder is a no-op.

#[cfg(feature = "metrics")]
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Meter},
};
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

#[cfg(feature = "metrics")]
struct BridgeMetrics {
    _meter: Meter,
    tool_calls: Counter<u64>,
    tool_failures: Counter<u64>,
    cache_hits: Counter<u64>,
    cache_misses: Counter<u64>,
    llm_rounds: Counter<u64>,
}

#[cfg(feature = "metrics")]
fn metrics() -> &'static BridgeMetrics {
    static METRICS: OnceLock<BridgeMetrics> = OnceLock::new();
    METRICS.get_or_init(|| {
        let meter = global::meter("toolbridge");
        BridgeMetrics {
            tool_calls: meter
                .u64_counter("tool_bridge.tool_calls")
                .with_description("Tool calls executed")
                .build(),
            tool_failures: meter
                .u64_counter("tool_bridge.tool_failures")
                .with_description("Tool calls that produced an error payload")
                .build(),
            cache_hits: meter
                .u64_counter("tool_bridge.cache_hits")
                .with_description("Tool definition cache hits")
                .build(),
            cache_misses: meter
                .u64_counter("tool_bridge.cache_misses")
                .with_description("Tool definition cache fills")
                .build(),
            llm_rounds: meter
                .u64_counter("tool_bridge.llm_rounds")
                .with_description("Chat completion rounds issued")
                .build(),
            _meter: meter,
        }
    })
}

pub(crate) fn record_tool_call(tool: &str, succeeded: bool) {
    #[cfg(feature = "metrics")]
    {
        let attrs = [KeyValue::new("tool", tool.to_string())];
        metrics().tool_calls.add(1, &attrs);
        if !succeeded {
            metrics().tool_failures.add(1, &attrs);
        }
    }
    #[cfg(not(feature = "metrics"))]
    let _ = (tool, succeeded);
}

pub(crate) fn record_cache_lookup(hit: bool) {
    #[cfg(feature = "metrics")]
    {
        if hit {
            metrics().cache_hits.add(1, &[]);
        } else {
            metrics().cache_misses.add(1, &[]);
        }
    }
    #[cfg(not(feature = "metrics"))]
    let _ = hit;
}

pub(crate) fn record_llm_round(round: u8) {
    #[cfg(feature = "metrics")]
    metrics()
        .llm_rounds
        .add(1, &[KeyValue::new("round", i64::from(round))]);
    #[cfg(not(feature = "metrics"))]
    let _ = round;
}
