//! The columnar record data model and its binary codec.
//!
//! A `Record` is a batch of rows sharing one schema, stored column-major:
//! one contiguous [`ColVal`] per field. Producers build a record column by
//! column, compute [`Record::codec_size`], allocate once, and call
//! [`Record::marshal`]; consumers call [`Record::unmarshal`] (owning copy) or
//! [`Record::unmarshal2`] (zero-copy, borrows the source buffer) depending on
//! whether the buffer will be reused.
//!
//! ## Module Structure
//!
//! - `schema`: `Field` and `Schema` descriptors
//! - `col_val`: per-column storage (validity bitmap + value buffer)
//! - `codec`: the wire format (sizing, encode, and the two decode modes)

pub mod col_val;
pub mod schema;

mod codec;

#[cfg(test)]
mod codec_tests;

pub use col_val::ColVal;
pub use schema::{Field, Schema};

use crate::error::TesseraError;

/// A columnar batch of rows sharing one schema.
///
/// The lifetime parameter tracks the codec's ownership duality: records built
/// by producers or decoded with [`Record::unmarshal`] are `Record<'static>`
/// ([`OwnedRecord`]) and own all their memory; records decoded with
/// [`Record::unmarshal2`] borrow value payloads from the source buffer and
/// cannot outlive it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<'a> {
    pub schema: Schema,
    pub columns: Vec<ColVal<'a>>,
    pub row_count: usize,
}

/// A record that owns all of its column storage.
pub type OwnedRecord = Record<'static>;

impl Record<'static> {
    /// An empty record over the given schema.
    pub fn new(schema: Schema) -> Self {
        let columns = schema.iter().map(|_| ColVal::new()).collect();
        Self {
            schema,
            columns,
            row_count: 0,
        }
    }
}

impl<'a> Record<'a> {
    /// Assembles a record from already-built columns, inferring the row count
    /// from the first column, and validates it.
    pub fn from_columns(schema: Schema, columns: Vec<ColVal<'a>>) -> Result<Self, TesseraError> {
        let row_count = columns.first().map(|c| c.rows()).unwrap_or(0);
        let record = Self {
            schema,
            columns,
            row_count,
        };
        record.validate()?;
        Ok(record)
    }

    /// Number of fields (= columns) in the record.
    pub fn field_count(&self) -> usize {
        self.schema.len()
    }

    /// Number of rows in the batch.
    pub fn rows(&self) -> usize {
        self.row_count
    }

    pub fn column(&self, idx: usize) -> Option<&ColVal<'a>> {
        self.columns.get(idx)
    }

    /// The column for the named field, if present.
    pub fn column_by_name(&self, name: &str) -> Option<&ColVal<'a>> {
        self.columns.get(self.schema.field_index(name)?)
    }

    /// Returns `true` if any column aliases an external decode buffer.
    pub fn borrows_source(&self) -> bool {
        self.columns.iter().any(|c| c.borrows_source())
    }

    /// Deep-copies any borrowed column payloads, detaching the record from
    /// the buffer it was decoded from.
    pub fn into_owned(self) -> OwnedRecord {
        Record {
            schema: self.schema,
            columns: self.columns.into_iter().map(ColVal::into_owned).collect(),
            row_count: self.row_count,
        }
    }

    /// Checks the structural invariants the codec relies on. Called by
    /// `marshal` before any byte is written; all violations are error
    /// returns, never panics.
    pub fn validate(&self) -> Result<(), TesseraError> {
        if self.columns.len() != self.schema.len() {
            return Err(TesseraError::SchemaMismatch(format!(
                "schema has {} fields but record has {} columns",
                self.schema.len(),
                self.columns.len()
            )));
        }
        if self.schema.len() > u32::MAX as usize {
            return Err(TesseraError::SchemaMismatch(format!(
                "field count {} exceeds wire limit",
                self.schema.len()
            )));
        }

        for (field, col) in self.schema.iter().zip(&self.columns) {
            if col.rows() != self.row_count {
                return Err(TesseraError::SchemaMismatch(format!(
                    "column '{}' has {} rows, record declares {}",
                    field.name,
                    col.rows(),
                    self.row_count
                )));
            }
            match field.field_type.width() {
                Some(width) => {
                    if col.val.len() != self.row_count * width {
                        return Err(TesseraError::SchemaMismatch(format!(
                            "column '{}' holds {} value bytes, expected {}",
                            field.name,
                            col.val.len(),
                            self.row_count * width
                        )));
                    }
                }
                None => self.validate_string_column(field, col)?,
            }
        }
        Ok(())
    }

    fn validate_string_column(&self, field: &Field, col: &ColVal<'_>) -> Result<(), TesseraError> {
        if col.val.len() > u32::MAX as usize {
            return Err(TesseraError::SchemaMismatch(format!(
                "column '{}' blob exceeds the u32 wire limit",
                field.name
            )));
        }
        if self.row_count == 0 {
            // Canonical empty form has no offsets; a single zero entry is
            // also accepted.
            let trivial = col.offsets.is_empty() || col.offsets == [0];
            if !trivial || !col.val.is_empty() {
                return Err(TesseraError::SchemaMismatch(format!(
                    "empty string column '{}' carries offsets or blob bytes",
                    field.name
                )));
            }
            return Ok(());
        }
        if col.offsets.len() != self.row_count + 1 {
            return Err(TesseraError::SchemaMismatch(format!(
                "column '{}' has {} offsets, expected {}",
                field.name,
                col.offsets.len(),
                self.row_count + 1
            )));
        }
        if col.offsets[0] != 0 {
            return Err(TesseraError::MalformedOffsets(format!(
                "column '{}': first offset is {}, must be 0",
                field.name, col.offsets[0]
            )));
        }
        if col.offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(TesseraError::MalformedOffsets(format!(
                "column '{}': offsets are not non-decreasing",
                field.name
            )));
        }
        let last = *col.offsets.last().unwrap_or(&0) as usize;
        if last != col.val.len() {
            return Err(TesseraError::MalformedOffsets(format!(
                "column '{}': final offset {} disagrees with blob length {}",
                field.name,
                last,
                col.val.len()
            )));
        }
        Ok(())
    }
}
