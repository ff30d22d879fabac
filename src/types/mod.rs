//! This module defines the core, strongly-typed data representations used
//! throughout the tessera record pipeline.
//!
//! It currently includes the canonical `FieldType` enum, which carries the
//! stable wire tags of the binary record format.

pub mod field_type;

// Re-export the main type(s) for easier access.
pub use field_type::FieldType;
