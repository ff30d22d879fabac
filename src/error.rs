// In: src/error.rs

//! This module defines the single, unified error type for the entire tessera
//! record library. It uses the `thiserror` crate to provide ergonomic,
//! context-aware error handling.
//!
//! Every malformed-input condition in the codec is reachable only through an
//! explicit error return; there is no panic path for bad buffers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TesseraError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    /// Field/column count disagreement, or a column whose logical length does
    /// not match the record's declared row count.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A schema was constructed with two fields of the same name.
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    /// An unknown field type tag was encountered while decoding.
    #[error("Unsupported field type tag: {0}")]
    UnsupportedType(u8),

    /// A declared section extends past the end of the supplied buffer.
    #[error("Truncated buffer in {section} section: need {need} bytes, {have} remain")]
    TruncatedBuffer {
        section: &'static str,
        need: u64,
        have: u64,
    },

    /// String offsets are non-monotonic, do not start at zero, or disagree
    /// with the blob length.
    #[error("Malformed string offsets: {0}")]
    MalformedOffsets(String),

    /// The destination buffer's spare capacity is smaller than `codec_size`.
    #[error("Destination capacity exceeded: need {need} bytes, {cap} available")]
    CapacityExceeded { need: usize, cap: usize },

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem (e.g. a stats
    /// drain target refusing the write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, during stat point serialization.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<bytemuck::PodCastError> for TesseraError {
    // Manual impl is needed as bytemuck::PodCastError doesn't impl Error.
    fn from(err: bytemuck::PodCastError) -> Self {
        TesseraError::InternalError(format!("byte slice cast failed: {err}"))
    }
}
