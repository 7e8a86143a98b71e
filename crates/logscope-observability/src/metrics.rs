//! Decode metrics.
//!
//! Instruments follow OpenTelemetry conventions and can be exported to any
//! backend the application wires a meter provider for. With no provider
//! installed, recording is a no-op.

use opentelemetry::{
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Metrics handle for the decode pipeline.
#[derive(Clone)]
pub struct DecodeMetrics {
    pub logs_decoded: Counter<u64>,
    pub logs_unmatched: Counter<u64>,
    pub decode_errors: Counter<u64>,
    pub batch_size: Histogram<u64>,
}

impl DecodeMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            logs_decoded: meter
                .u64_counter("logscope.logs_decoded")
                .with_description("Logs decoded into events")
                .build(),
            logs_unmatched: meter
                .u64_counter("logscope.logs_unmatched")
                .with_description("Logs whose signature topic matched no schema")
                .build(),
            decode_errors: meter
                .u64_counter("logscope.decode_errors")
                .with_description("Logs that matched a schema but failed to decode")
                .build(),
            batch_size: meter
                .u64_histogram("logscope.batch_size")
                .with_description("Number of logs per batch decode")
                .build(),
        }
    }

    /// Handle on the global meter provider.
    pub fn global() -> Self {
        Self::new(&opentelemetry::global::meter("logscope"))
    }

    pub fn record_decoded(&self, event: &str) {
        self.logs_decoded
            .add(1, &[KeyValue::new("event", event.to_string())]);
    }

    pub fn record_unmatched(&self, count: u64) {
        self.logs_unmatched.add(count, &[]);
    }

    pub fn record_error(&self, kind: &'static str) {
        self.decode_errors.add(1, &[KeyValue::new("error_type", kind)]);
    }

    pub fn record_batch(&self, size: usize) {
        self.batch_size.record(size as u64, &[]);
    }
}
