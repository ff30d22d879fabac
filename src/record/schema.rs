//! Schema definition for columnar records.
//!
//! A `Schema` is an ordered, name-unique list of field descriptors. Order is
//! semantically significant (column index equals position) and is preserved
//! byte-for-byte across encode/decode. By convention the final field holds
//! the row timestamp as an `Integer`.

use crate::error::TesseraError;
use crate::types::FieldType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Describes one column: its name and logical type.
///
/// The type is immutable once assigned; changing a column's type is a schema
/// replacement, not a mutation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// An ordered, name-unique sequence of [`Field`]s.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Builds a schema, validating every field name.
    ///
    /// Duplicate names are an error, not silently overwritten. Names must be
    /// non-empty and at most `u16::MAX` bytes so they fit their wire length
    /// prefix.
    pub fn new(fields: Vec<Field>) -> Result<Self, TesseraError> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if field.name.is_empty() {
                return Err(TesseraError::SchemaMismatch(
                    "field name must not be empty".to_string(),
                ));
            }
            if field.name.len() > u16::MAX as usize {
                return Err(TesseraError::SchemaMismatch(format!(
                    "field name exceeds {} bytes",
                    u16::MAX
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(TesseraError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// Position of the named field, if present.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// The conventional time column: the last field of the schema.
    pub fn time_field(&self) -> Option<&Field> {
        self.fields.last()
    }
}
