//! `EvmDecoder`: the `LogDecoder` implementation for EVM logs.

use logscope_core::{
    config::{DecodeMode, DecoderConfig},
    decoder::{BatchDecodeResult, ErrorMode, LogDecoder, ProgressCallback},
    error::{BatchDecodeError, LogDecodeError},
    event::{DecodedEvent, RawLog},
    schema::{EventSchema, SchemaRegistry},
};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

use crate::assembler;

/// The EVM log decoder.
/// Thread-safe and cheap to clone; holds only its configuration.
#[derive(Debug, Default, Clone)]
pub struct EvmDecoder {
    config: DecoderConfig,
}

impl EvmDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn strict() -> Self {
        Self::with_config(DecoderConfig::strict())
    }

    pub fn mode(&self) -> DecodeMode {
        self.config.mode
    }
}

impl LogDecoder for EvmDecoder {
    fn decode_event(
        &self,
        log: &RawLog,
        schema: &Arc<EventSchema>,
    ) -> Result<DecodedEvent, LogDecodeError> {
        let result = assembler::assemble(log, schema, self.config.mode);
        if let Err(err) = &result {
            debug!(
                event = schema.name(),
                topics = log.topics.len(),
                data_len = log.data.len(),
                error = %err,
                "log failed to decode"
            );
        }
        result
    }

    /// Override the default batch with a Rayon parallel decode.
    /// Results keep input order.
    fn decode_batch(
        &self,
        logs: &[RawLog],
        registry: &dyn SchemaRegistry,
        mode: ErrorMode,
        progress: Option<&dyn ProgressCallback>,
    ) -> Result<BatchDecodeResult, BatchDecodeError> {
        // Progress callbacks are reported in order, so use the sequential path.
        if progress.is_some() {
            return sequential_batch(self, logs, registry, mode, progress);
        }

        let outcomes: Vec<Result<Option<DecodedEvent>, LogDecodeError>> = logs
            .par_iter()
            .map(|log| self.decode_log(log, registry))
            .collect();

        let mut result = BatchDecodeResult::default();
        for (idx, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(Some(event)) => result.events.push((idx, event)),
                Ok(None) => result.unmatched += 1,
                Err(err) => match mode {
                    ErrorMode::Skip => {}
                    ErrorMode::Collect => result.errors.push((idx, err)),
                    ErrorMode::Throw => {
                        return Err(BatchDecodeError::ItemFailed {
                            index: idx,
                            source: err,
                        });
                    }
                },
            }
        }

        info!(
            total = logs.len(),
            decoded = result.events.len(),
            unmatched = result.unmatched,
            errors = result.errors.len(),
            "batch decoded"
        );
        Ok(result)
    }
}

/// The trait's default batch body, reachable from the override.
fn sequential_batch(
    decoder: &EvmDecoder,
    logs: &[RawLog],
    registry: &dyn SchemaRegistry,
    mode: ErrorMode,
    progress: Option<&dyn ProgressCallback>,
) -> Result<BatchDecodeResult, BatchDecodeError> {
    struct Sequential<'a>(&'a EvmDecoder);

    impl LogDecoder for Sequential<'_> {
        fn decode_event(
            &self,
            log: &RawLog,
            schema: &Arc<EventSchema>,
        ) -> Result<DecodedEvent, LogDecodeError> {
            self.0.decode_event(log, schema)
        }
    }

    Sequential(decoder).decode_batch(logs, registry, mode, progress)
}
