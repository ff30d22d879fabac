// In: src/config.rs

//! Configuration for the auxiliary subsystems of the record library.
//!
//! Config structs are designed to be created once at the application boundary
//! (e.g. from a user's YAML file) and then passed down by value or behind a
//! shared, read-only `Arc`. The codec itself has nothing to configure; its
//! behavior is fixed by the wire format.

use serde::{Deserialize, Serialize};

/// Configuration for the buffered statistics sink.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct StatsConfig {
    /// Upper bound on the buffered, serialized point bytes held by the sink.
    /// Points pushed while the buffer is full are dropped and counted.
    #[serde(default = "default_capacity_bytes")]
    pub capacity_bytes: usize,

    /// Optional prefix prepended to every pushed measurement name, e.g. a
    /// process or shard identity.
    #[serde(default)]
    pub measurement_prefix: Option<String>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: default_capacity_bytes(),
            measurement_prefix: None,
        }
    }
}

/// Helper for `serde` to provide a default for `capacity_bytes`.
fn default_capacity_bytes() -> usize {
    256 * 1024
}
