//! This module defines the shared trait binding Rust primitive types to the
//! column types they populate.

use crate::types::FieldType;

/// A primitive value type that can live in a fixed-width column.
///
/// The `bytemuck::Pod` bound is what lets the column store values as raw
/// little-endian bytes and cast slices in bulk without copies.
pub trait FieldValue: bytemuck::Pod {
    /// The column type whose value array holds this primitive.
    const FIELD_TYPE: FieldType;
}

// Implement the trait for every fixed-width primitive the format carries.
macro_rules! impl_field_value {
    ($T:ty, $ft:ident) => {
        impl FieldValue for $T {
            const FIELD_TYPE: FieldType = FieldType::$ft;
        }
    };
}

impl_field_value!(i64, Integer);
impl_field_value!(f64, Float);
impl_field_value!(u8, Boolean); // booleans are stored as one 0/1 byte per row
