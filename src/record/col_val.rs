//! Typed, nullable column storage.
//!
//! A `ColVal` holds one column of a record: a validity bitmap plus a raw
//! value buffer. The column itself is untyped: the interpreting `FieldType`
//! always comes from the schema position, never from the column, so the
//! storage is the same three buffers for every type:
//!
//! - `bitmap`: bit *i* set ⇔ row *i* is non-null. Exactly `ceil(rows/8)`
//!   bytes of backing storage; padding bits in the last byte are zero on
//!   encode and ignored on decode.
//! - `offsets`: string columns only. `rows + 1` non-decreasing end offsets
//!   into `val`, `offsets[0] == 0`; null rows have equal adjacent offsets.
//!   An empty (0-row) string column canonically has an empty offsets vector.
//! - `val`: the value payload. Fixed-width columns store `rows * width`
//!   little-endian bytes, with zeroed don't-care slots for null rows; string
//!   columns store the concatenated blob.
//!
//! `val` is a `Cow`: columns built by a producer or decoded by `unmarshal`
//! own their bytes, while columns decoded by `unmarshal2` borrow them from
//! the source buffer. The borrow checker therefore enforces the aliasing
//! contract: a zero-copy column cannot outlive, or be read across a
//! mutation of, the buffer it was decoded from.

use std::borrow::Cow;
use std::iter;

use bitvec::prelude::{BitVec, Lsb0};

use crate::traits::FieldValue;
use crate::types::FieldType;
use crate::utils::{safe_bytes_to_typed_slice, typed_slice_to_bytes};

/// One column's storage: validity bitmap plus typed value buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ColVal<'a> {
    pub(crate) bitmap: BitVec<u8, Lsb0>,
    pub(crate) offsets: Vec<u32>,
    pub(crate) val: Cow<'a, [u8]>,
}

impl Default for ColVal<'_> {
    fn default() -> Self {
        Self {
            bitmap: BitVec::new(),
            offsets: Vec::new(),
            val: Cow::Owned(Vec::new()),
        }
    }
}

impl ColVal<'static> {
    /// An empty, owned column.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fixed-width column from a slice of values, all rows valid.
    pub fn from_slice<T: FieldValue>(values: &[T]) -> Self {
        let mut bitmap = BitVec::with_capacity(values.len());
        bitmap.resize(values.len(), true);
        Self {
            bitmap,
            offsets: Vec::new(),
            val: Cow::Owned(typed_slice_to_bytes(values)),
        }
    }

    /// Builds a fixed-width column from parallel value/validity slices.
    ///
    /// `values[i]` is stored for valid rows; null rows get a zeroed slot
    /// regardless of the slice content. The slices must be the same length.
    pub fn from_nullable_slice<T: FieldValue>(values: &[T], valid: &[bool]) -> Self {
        debug_assert_eq!(values.len(), valid.len());
        let mut col = Self::new();
        for (value, &ok) in values.iter().zip(valid) {
            if ok {
                col.append_fixed(*value);
            } else {
                col.append_fixed_null::<T>();
            }
        }
        col
    }

    /// Builds a boolean column from parallel value/validity slices.
    pub fn from_bools(values: &[bool], valid: &[bool]) -> Self {
        let bytes: Vec<u8> = values.iter().map(|&b| b as u8).collect();
        Self::from_nullable_slice::<u8>(&bytes, valid)
    }

    /// Builds a string column from parallel value/validity slices.
    pub fn from_strings<S: AsRef<str>>(values: &[S], valid: &[bool]) -> Self {
        debug_assert_eq!(values.len(), valid.len());
        let mut col = Self::new();
        for (value, &ok) in values.iter().zip(valid) {
            if ok {
                col.append_string(value.as_ref());
            } else {
                col.append_null(FieldType::String);
            }
        }
        col
    }
}

impl<'a> ColVal<'a> {
    //==============================================================================
    // 1. Builders (single-writer discipline)
    //==============================================================================

    /// Appends one fixed-width value. Appending to a column that borrows a
    /// decode buffer clones it into owned storage first.
    pub fn append_fixed<T: FieldValue>(&mut self, value: T) {
        self.val.to_mut().extend_from_slice(bytemuck::bytes_of(&value));
        self.bitmap.push(true);
    }

    pub fn append_integer(&mut self, value: i64) {
        self.append_fixed(value);
    }

    pub fn append_float(&mut self, value: f64) {
        self.append_fixed(value);
    }

    pub fn append_boolean(&mut self, value: bool) {
        self.append_fixed(value as u8);
    }

    /// Appends one string value.
    pub fn append_string(&mut self, value: &str) {
        self.seed_offsets();
        let val = self.val.to_mut();
        val.extend_from_slice(value.as_bytes());
        self.offsets.push(val.len() as u32);
        self.bitmap.push(true);
    }

    /// Appends a null row for a column of the given type: fixed-width types
    /// get a zeroed don't-care slot, strings repeat the previous offset.
    pub fn append_null(&mut self, field_type: FieldType) {
        match field_type.width() {
            Some(width) => {
                self.val.to_mut().extend(iter::repeat(0u8).take(width));
            }
            None => {
                self.seed_offsets();
                let end = self.offsets.last().copied().unwrap_or(0);
                self.offsets.push(end);
            }
        }
        self.bitmap.push(false);
    }

    fn append_fixed_null<T: FieldValue>(&mut self) {
        self.append_null(T::FIELD_TYPE);
    }

    /// Marks an existing row as null by clearing its validity bit. The value
    /// slot keeps its bytes; null slot content is don't-care.
    pub fn set_null(&mut self, i: usize) {
        if i < self.bitmap.len() {
            self.bitmap.set(i, false);
        }
    }

    fn seed_offsets(&mut self) {
        if self.offsets.is_empty() {
            self.offsets.push(0);
        }
    }

    //==============================================================================
    // 2. Accessors
    //==============================================================================

    /// Number of rows in this column.
    pub fn rows(&self) -> usize {
        self.bitmap.len()
    }

    /// Returns `true` if row `i` is null. Out-of-range rows read as null.
    pub fn is_null(&self, i: usize) -> bool {
        !self.bitmap.get(i).map(|bit| *bit).unwrap_or(false)
    }

    /// Number of null rows.
    pub fn null_count(&self) -> usize {
        self.bitmap.count_zeros()
    }

    pub fn integer_at(&self, i: usize) -> Option<i64> {
        self.fixed_at::<i64>(i)
    }

    pub fn float_at(&self, i: usize) -> Option<f64> {
        self.fixed_at::<f64>(i)
    }

    pub fn boolean_at(&self, i: usize) -> Option<bool> {
        self.fixed_at::<u8>(i).map(|b| b != 0)
    }

    /// The raw bytes of string row `i`, or `None` for null/out-of-range rows.
    /// A valid row holding the empty string yields `Some(&[])`.
    pub fn bytes_at(&self, i: usize) -> Option<&[u8]> {
        if self.is_null(i) {
            return None;
        }
        let start = self.offsets.get(i).copied()? as usize;
        let end = self.offsets.get(i + 1).copied()? as usize;
        self.val.get(start..end)
    }

    /// String row `i`, or `None` for null rows or non-UTF-8 payload bytes.
    pub fn string_at(&self, i: usize) -> Option<&str> {
        std::str::from_utf8(self.bytes_at(i)?).ok()
    }

    fn fixed_at<T: FieldValue>(&self, i: usize) -> Option<T> {
        if self.is_null(i) {
            return None;
        }
        let width = std::mem::size_of::<T>();
        let bytes = self.val.get(i * width..i * width + width)?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    /// Zero-copy typed view of the value array. Fails for columns whose
    /// borrowed payload is misaligned for `T`; use [`ColVal::fixed_values`]
    /// as the copying fallback.
    pub fn typed_view<T: FieldValue>(&self) -> Result<&[T], crate::error::TesseraError> {
        safe_bytes_to_typed_slice(&self.val)
    }

    /// Copies the value array out as typed values, regardless of alignment.
    /// Null rows yield their don't-care slot content (zero for built columns).
    pub fn fixed_values<T: FieldValue>(&self) -> Vec<T> {
        let width = std::mem::size_of::<T>();
        debug_assert_eq!(self.val.len() % width, 0);
        self.val
            .chunks_exact(width)
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    /// The raw value payload: the fixed-width array bytes, or the string blob.
    pub fn values_bytes(&self) -> &[u8] {
        &self.val
    }

    /// Returns `true` if this column aliases the buffer it was decoded from
    /// (zero-copy decode) rather than owning its payload.
    pub fn borrows_source(&self) -> bool {
        matches!(self.val, Cow::Borrowed(_))
    }

    /// Deep-copies any borrowed payload, detaching the column from its
    /// decode buffer.
    pub fn into_owned(self) -> ColVal<'static> {
        ColVal {
            bitmap: self.bitmap,
            offsets: self.offsets,
            val: Cow::Owned(self.val.into_owned()),
        }
    }

    //==============================================================================
    // 3. Codec support
    //==============================================================================

    /// Exact byte length this column will occupy once encoded as `field_type`.
    pub(crate) fn encoded_size(&self, field_type: FieldType) -> usize {
        let bitmap_bytes = self.rows().div_ceil(8);
        match field_type.width() {
            Some(_) => bitmap_bytes + self.val.len(),
            None => bitmap_bytes + 4 * (self.rows() + 1) + 4 + self.val.len(),
        }
    }

    /// Appends this column's encoded bytes. The caller has already validated
    /// the column against the record's row count and reserved capacity.
    pub(crate) fn encode(&self, field_type: FieldType, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.bitmap.as_raw_slice());
        // Decoded bitmaps may carry junk in the truncated tail; padding bits
        // must be zero on the wire.
        let pad_bits = self.rows() % 8;
        if pad_bits != 0 {
            let last = buf.len() - 1;
            buf[last] &= (1u8 << pad_bits) - 1;
        }
        match field_type.width() {
            Some(_) => buf.extend_from_slice(&self.val),
            None => {
                if self.offsets.is_empty() {
                    // Canonical empty string column: the wire still carries
                    // the single leading zero offset.
                    buf.extend_from_slice(&0u32.to_le_bytes());
                } else {
                    for offset in &self.offsets {
                        buf.extend_from_slice(&offset.to_le_bytes());
                    }
                }
                buf.extend_from_slice(&(self.val.len() as u32).to_le_bytes());
                buf.extend_from_slice(&self.val);
            }
        }
    }
}
