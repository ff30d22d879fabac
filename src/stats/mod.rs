//! Buffered statistics sink for ingestion and query producers.
//!
//! Producers record counters as [`StatItem`] points (a measurement name plus
//! tag and value maps) and hand them to a [`StatsPusher`], which serializes
//! each point to a JSON line in an in-memory buffer. A periodic collector
//! drains the buffer and ships it to wherever operational metrics go.
//!
//! The pusher is an injectable handle with an explicit lifecycle
//! (create, push, drain) passed by reference to producers. There is no
//! process-wide singleton, so tests and embedders can run any number of
//! independent sinks. It has no relationship to the binary record codec.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::config::StatsConfig;
use crate::error::TesseraError;

/// One statistics point: a measurement plus tag and value maps.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatItem {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub values: BTreeMap<String, i64>,
}

impl StatItem {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            values: BTreeMap::new(),
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn value(mut self, key: impl Into<String>, value: i64) -> Self {
        self.values.insert(key.into(), value);
        self
    }
}

#[derive(Debug, Default)]
struct PushBuffer {
    buf: Vec<u8>,
    dropped: u64,
}

/// Mutex-guarded buffer of serialized stat points.
///
/// `push` may be called from any number of producer threads; `drain` swaps
/// the buffer out under the same lock.
#[derive(Debug)]
pub struct StatsPusher {
    config: StatsConfig,
    global_tags: BTreeMap<String, String>,
    inner: Mutex<PushBuffer>,
}

impl StatsPusher {
    pub fn new(config: StatsConfig) -> Self {
        Self::with_tags(config, BTreeMap::new())
    }

    /// A pusher whose tags (e.g. node or shard identity) are merged into
    /// every point that does not already carry them.
    pub fn with_tags(config: StatsConfig, global_tags: BTreeMap<String, String>) -> Self {
        Self {
            config,
            global_tags,
            inner: Mutex::new(PushBuffer::default()),
        }
    }

    /// Serializes one point into the buffer. Points that would push the
    /// buffer past its configured capacity are dropped and counted.
    pub fn push(&self, item: &StatItem) -> Result<(), TesseraError> {
        let mut point = item.clone();
        for (key, value) in &self.global_tags {
            point.tags.entry(key.clone()).or_insert_with(|| value.clone());
        }
        if let Some(prefix) = &self.config.measurement_prefix {
            point.measurement = format!("{prefix}{}", point.measurement);
        }

        let line = serde_json::to_vec(&point)?;
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.buf.len() + line.len() + 1 > self.config.capacity_bytes {
            inner.dropped += 1;
            return Ok(());
        }
        inner.buf.extend_from_slice(&line);
        inner.buf.push(b'\n');
        Ok(())
    }

    /// Takes the buffered point bytes, resetting the buffer and the dropped
    /// counter.
    pub fn drain(&self) -> Vec<u8> {
        let (bytes, dropped) = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            let bytes = std::mem::take(&mut inner.buf);
            let dropped = std::mem::take(&mut inner.dropped);
            (bytes, dropped)
        };
        log::debug!(
            "stats drain: {} bytes, {} points dropped",
            bytes.len(),
            dropped
        );
        log_metric!("event" = "stats_drain", "bytes" = &bytes.len(), "dropped" = &dropped);
        bytes
    }

    /// Drains into a writer, returning the number of bytes written.
    pub fn drain_into<W: Write>(&self, writer: &mut W) -> Result<usize, TesseraError> {
        let bytes = self.drain();
        writer.write_all(&bytes)?;
        Ok(bytes.len())
    }

    /// Points dropped since the last drain.
    pub fn dropped(&self) -> u64 {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).dropped
    }
}
