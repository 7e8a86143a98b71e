//! Chunk-level batch helpers.
//! The per-batch logic lives in `EvmDecoder::decode_batch`; this module
//! splits very large inputs so memory stays bounded per chunk and callers
//! can report progress between chunks.

use logscope_core::{
    decoder::{BatchDecodeResult, ErrorMode, LogDecoder, ProgressCallback},
    error::BatchDecodeError,
    event::RawLog,
    schema::SchemaRegistry,
};
use tracing::debug;

use crate::decoder::EvmDecoder;

/// Default number of logs decoded per parallel chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Split `logs` into chunks of at most `chunk_size` and decode each chunk
/// in parallel. Indices in the result refer to the whole input slice.
///
/// `progress` is called once per finished chunk.
pub fn chunked_decode(
    decoder: &EvmDecoder,
    logs: &[RawLog],
    registry: &dyn SchemaRegistry,
    chunk_size: usize,
    mode: ErrorMode,
    progress: Option<&dyn ProgressCallback>,
) -> Result<BatchDecodeResult, BatchDecodeError> {
    let chunk_size = chunk_size.max(1);
    let mut all = BatchDecodeResult::default();
    let mut offset = 0;

    for chunk in logs.chunks(chunk_size) {
        let part = decoder
            .decode_batch(chunk, registry, mode, None)
            .map_err(|err| match err {
                BatchDecodeError::ItemFailed { index, source } => BatchDecodeError::ItemFailed {
                    index: offset + index,
                    source,
                },
                other => other,
            })?;

        all.events
            .extend(part.events.into_iter().map(|(i, e)| (offset + i, e)));
        all.errors
            .extend(part.errors.into_iter().map(|(i, e)| (offset + i, e)));
        all.unmatched += part.unmatched;
        offset += chunk.len();

        debug!(processed = offset, total = logs.len(), "chunk decoded");
        if let Some(cb) = progress {
            cb.on_progress(offset, logs.len());
        }
    }

    Ok(all)
}
