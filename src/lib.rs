//! This file is the root of the `tessera_record` Rust crate.
//!
//! The crate holds the columnar in-memory record format of the tessera
//! time-series storage engine and its binary codec:
//!
//! 1.  `record`: the `Record`/`Schema`/`ColVal` data model and the
//!     `codec_size`/`marshal`/`unmarshal`/`unmarshal2` protocol.
//! 2.  `stats`: the buffered statistics sink consumed by producers on the
//!     ingestion path.
//!
//! The codec is a pure, reentrant transformation with no shared mutable
//! state: any number of threads may encode/decode distinct records
//! concurrently without synchronization. A single `Record` follows a
//! single-writer discipline: it is built column by column, then either
//! encoded (read-only from that point) or consumed in place.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod config;
pub mod record;
pub mod stats;
pub mod types;

mod error;
mod traits;
mod utils;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use error::TesseraError;
pub use record::{ColVal, Field, OwnedRecord, Record, Schema};
pub use traits::FieldValue;
pub use types::FieldType;
