//! The binary wire format of the record codec.
//!
//! Layout, little-endian throughout, no cross-column padding:
//!
//! ```text
//! Header:      rowCount:u64 | fieldCount:u32
//! Schema[i]:   typeTag:u8 | nameLen:u16 | name:bytes[nameLen]
//! Column[i]:   bitmap:bytes[ceil(rowCount/8)]
//!              fixed-width: values:bytes[rowCount * width]
//!              string:      offsets:u32[rowCount+1] | blobLen:u32 | blob:bytes[blobLen]
//! ```
//!
//! `codec_size` is exact: callers preallocate the destination from it and
//! `marshal` never grows the buffer. This zero-growth contract is what keeps
//! ingestion free of reallocation/copy storms at millions of rows per second.
//!
//! Decoding never reads past the supplied buffer: every section length is
//! checked (with overflow-safe arithmetic) before the bytes are touched, and
//! a short buffer yields a `TruncatedBuffer` error naming the section.

use std::borrow::Cow;

use bitvec::prelude::{BitVec, Lsb0};

use crate::error::TesseraError;
use crate::record::{ColVal, Field, OwnedRecord, Record, Schema};
use crate::types::FieldType;

/// rowCount:u64 + fieldCount:u32.
const HEADER_SIZE: usize = 8 + 4;
/// typeTag:u8 + nameLen:u16, before the name bytes.
const FIELD_PREFIX_SIZE: usize = 1 + 2;

//==================================================================================
// 1. Sizing & Encode
//==================================================================================

impl<'a> Record<'a> {
    /// Exact byte length `marshal` will append for this record.
    pub fn codec_size(&self) -> usize {
        let mut size = HEADER_SIZE;
        for field in self.schema.iter() {
            size += FIELD_PREFIX_SIZE + field.name.len();
        }
        for (field, col) in self.schema.iter().zip(&self.columns) {
            size += col.encoded_size(field.field_type);
        }
        size
    }

    /// Appends the encoded record to `buf`.
    ///
    /// The destination's spare capacity must be at least [`Record::codec_size`];
    /// a smaller buffer is a `CapacityExceeded` error. All validation runs
    /// before the first byte is written, so on any error the buffer is left
    /// untouched.
    pub fn marshal(&self, buf: &mut Vec<u8>) -> Result<(), TesseraError> {
        self.validate()?;
        let need = self.codec_size();
        let spare = buf.capacity() - buf.len();
        if spare < need {
            return Err(TesseraError::CapacityExceeded { need, cap: spare });
        }

        let start = buf.len();
        buf.extend_from_slice(&(self.row_count as u64).to_le_bytes());
        buf.extend_from_slice(&(self.schema.len() as u32).to_le_bytes());
        for field in self.schema.iter() {
            buf.push(field.field_type.type_tag());
            buf.extend_from_slice(&(field.name.len() as u16).to_le_bytes());
            buf.extend_from_slice(field.name.as_bytes());
        }
        for (field, col) in self.schema.iter().zip(&self.columns) {
            col.encode(field.field_type, buf);
        }

        debug_assert_eq!(buf.len() - start, need);
        Ok(())
    }
}

//==================================================================================
// 2. Decode
//==================================================================================

impl Record<'static> {
    /// Decodes a record, copying every section out of `buf`. The returned
    /// record owns all of its memory; `buf` may be reused or discarded
    /// immediately.
    pub fn unmarshal(buf: &[u8]) -> Result<OwnedRecord, TesseraError> {
        Ok(decode(buf)?.into_owned())
    }
}

impl<'a> Record<'a> {
    /// Zero-copy decode: value payloads (fixed-width arrays and string blobs)
    /// are sub-slices of `buf`; bitmaps and offsets are copied (small,
    /// fixed-width). The record must not outlive `buf`, and `buf` must not be
    /// mutated while the record is live; both are enforced by the borrow.
    ///
    /// This mode exists purely for throughput on decode-heavy paths, such as
    /// re-reading write-ahead segments for compaction.
    pub fn unmarshal2(buf: &'a [u8]) -> Result<Record<'a>, TesseraError> {
        decode(buf)
    }
}

fn decode(buf: &[u8]) -> Result<Record<'_>, TesseraError> {
    let mut r = Reader::new(buf);

    let row_count = r.u64_le("header")?;
    let field_count = r.u32_le("header")? as usize;
    let rows = usize::try_from(row_count).map_err(|_| TesseraError::TruncatedBuffer {
        section: "header",
        need: row_count,
        have: r.remaining() as u64,
    })?;

    // Cap the preallocation: field_count is attacker-controlled and the
    // reader will reject an overlong schema section anyway.
    let mut fields = Vec::with_capacity(field_count.min(1024));
    for _ in 0..field_count {
        let tag = r.u8("schema")?;
        let field_type = FieldType::from_tag(tag)?;
        let name_len = r.u16_le("schema")? as usize;
        let name_bytes = r.take(name_len, "schema")?;
        let name = std::str::from_utf8(name_bytes)
            .map_err(|e| TesseraError::SchemaMismatch(format!("field name is not UTF-8: {e}")))?;
        fields.push(Field::new(name, field_type));
    }
    let schema = Schema::new(fields)?;

    let mut columns = Vec::with_capacity(schema.len());
    for field in schema.iter() {
        columns.push(decode_column(&mut r, field.field_type, rows)?);
    }

    // Trailing bytes after the last column are ignored: shared and pooled
    // buffers routinely over-allocate.
    Ok(Record {
        schema,
        columns,
        row_count: rows,
    })
}

fn decode_column<'b>(
    r: &mut Reader<'b>,
    field_type: FieldType,
    rows: usize,
) -> Result<ColVal<'b>, TesseraError> {
    let rows64 = rows as u64;
    let bitmap_bytes = r.take_checked(rows64.div_ceil(8), "bitmap")?;
    let mut bitmap = BitVec::<u8, Lsb0>::from_slice(bitmap_bytes);
    bitmap.truncate(rows);

    let (offsets, val) = match field_type.width() {
        Some(width) => {
            // Saturating keeps a hostile row count from wrapping into a
            // small read; the bounds check rejects it instead.
            let value_len = rows64.saturating_mul(width as u64);
            let values = r.take_checked(value_len, "values")?;
            (Vec::new(), values)
        }
        None => {
            let offsets_len = rows64.saturating_add(1).saturating_mul(4);
            let offset_bytes = r.take_checked(offsets_len, "offsets")?;
            let mut offsets = Vec::with_capacity(rows + 1);
            for chunk in offset_bytes.chunks_exact(4) {
                offsets.push(u32::from_le(bytemuck::pod_read_unaligned(chunk)));
            }

            let blob_len = r.u32_le("blob")? as usize;
            let blob = r.take(blob_len, "blob")?;
            validate_decoded_offsets(&offsets, blob_len)?;
            if rows == 0 {
                // Normalize to the canonical in-memory empty form.
                offsets.clear();
            }
            (offsets, blob)
        }
    };

    Ok(ColVal {
        bitmap,
        offsets,
        val: Cow::Borrowed(val),
    })
}

fn validate_decoded_offsets(offsets: &[u32], blob_len: usize) -> Result<(), TesseraError> {
    if offsets.first().copied().unwrap_or(0) != 0 {
        return Err(TesseraError::MalformedOffsets(format!(
            "first offset is {}, must be 0",
            offsets[0]
        )));
    }
    if offsets.windows(2).any(|w| w[0] > w[1]) {
        return Err(TesseraError::MalformedOffsets(
            "offsets are not non-decreasing".to_string(),
        ));
    }
    let last = offsets.last().copied().unwrap_or(0) as usize;
    if last != blob_len {
        return Err(TesseraError::MalformedOffsets(format!(
            "final offset {last} disagrees with blob length {blob_len}"
        )));
    }
    Ok(())
}

//==================================================================================
// 3. Buffer Reader
//==================================================================================

/// Sequential cursor over the encoded buffer. Every read is bounds-checked
/// and failures name the section being parsed.
struct Reader<'b> {
    buf: &'b [u8],
    pos: usize,
}

impl<'b> Reader<'b> {
    fn new(buf: &'b [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize, section: &'static str) -> Result<&'b [u8], TesseraError> {
        if n > self.remaining() {
            return Err(TesseraError::TruncatedBuffer {
                section,
                need: n as u64,
                have: self.remaining() as u64,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// `take` for lengths computed in u64 space, so a hostile row count can
    /// never overflow into a small allocation.
    fn take_checked(&mut self, n: u64, section: &'static str) -> Result<&'b [u8], TesseraError> {
        if n > self.remaining() as u64 {
            return Err(TesseraError::TruncatedBuffer {
                section,
                need: n,
                have: self.remaining() as u64,
            });
        }
        self.take(n as usize, section)
    }

    fn u8(&mut self, section: &'static str) -> Result<u8, TesseraError> {
        Ok(self.take(1, section)?[0])
    }

    fn u16_le(&mut self, section: &'static str) -> Result<u16, TesseraError> {
        let bytes = self.take(2, section)?;
        Ok(u16::from_le(bytemuck::pod_read_unaligned(bytes)))
    }

    fn u32_le(&mut self, section: &'static str) -> Result<u32, TesseraError> {
        let bytes = self.take(4, section)?;
        Ok(u32::from_le(bytemuck::pod_read_unaligned(bytes)))
    }

    fn u64_le(&mut self, section: &'static str) -> Result<u64, TesseraError> {
        let bytes = self.take(8, section)?;
        Ok(u64::from_le(bytemuck::pod_read_unaligned(bytes)))
    }
}
