//! The `LogDecoder` trait and associated batch/progress types.
//!
//! The EVM implementation lives in `logscope-evm`. The trait is
//! object-safe so decoders can be shared as `Arc<dyn LogDecoder>`.

use std::sync::Arc;

use crate::error::{BatchDecodeError, LogDecodeError};
use crate::event::{DecodedEvent, RawLog};
use crate::schema::{EventSchema, SchemaRegistry};

/// Callback invoked during batch decodes.
/// `processed` logs have been handled so far out of `total`.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, processed: usize, total: usize);
}

/// Blanket impl so closures can be used as progress callbacks.
impl<F: Fn(usize, usize) + Send + Sync> ProgressCallback for F {
    fn on_progress(&self, processed: usize, total: usize) {
        self(processed, total)
    }
}

/// Controls how a batch decode reacts to individual log failures.
/// Logs that match no schema are never failures; they are only counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Drop logs that fail to decode.
    #[default]
    Skip,
    /// Collect decode errors alongside successes.
    Collect,
    /// Abort the batch on the first error.
    Throw,
}

/// The output of a batch decode.
#[derive(Debug, Default)]
pub struct BatchDecodeResult {
    /// `(input index, event)` pairs in input order.
    pub events: Vec<(usize, DecodedEvent)>,
    /// Populated only with `ErrorMode::Collect`.
    pub errors: Vec<(usize, LogDecodeError)>,
    /// Logs whose signature topic matched no schema.
    pub unmatched: usize,
}

/// Decodes raw logs against event schemas.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; decoding has no shared mutable
/// state, so one decoder can serve any number of threads.
pub trait LogDecoder: Send + Sync {
    /// Assemble one log against the schema it matched.
    fn decode_event(
        &self,
        log: &RawLog,
        schema: &Arc<EventSchema>,
    ) -> Result<DecodedEvent, LogDecodeError>;

    /// Match a log against the registry and decode it.
    /// `Ok(None)` means no schema claims the log.
    fn decode_log(
        &self,
        log: &RawLog,
        registry: &dyn SchemaRegistry,
    ) -> Result<Option<DecodedEvent>, LogDecodeError> {
        match registry.match_log(log) {
            Some(schema) => self.decode_event(log, &schema).map(Some),
            None => Ok(None),
        }
    }

    /// Decode a batch of logs sequentially.
    ///
    /// Implementations can override this for parallelism.
    fn decode_batch(
        &self,
        logs: &[RawLog],
        registry: &dyn SchemaRegistry,
        mode: ErrorMode,
        progress: Option<&dyn ProgressCallback>,
    ) -> Result<BatchDecodeResult, BatchDecodeError> {
        let mut result = BatchDecodeResult::default();

        for (idx, log) in logs.iter().enumerate() {
            match self.decode_log(log, registry) {
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

            if let Some(cb) = progress {
                cb.on_progress(idx + 1, logs.len());
            }
        }

        Ok(result)
    }
}
