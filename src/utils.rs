//! This module provides shared, low-level utility functions for converting
//! between raw byte slices and typed slices.
//!
//! Its primary responsibilities are:
//! 1.  Providing safe, validated conversions between raw bytes and typed data.
//! 2.  Keeping all slice reinterpretation behind `bytemuck`, so the crate
//!     contains no hand-written `unsafe` casts.

use crate::error::TesseraError;

/// Safely reinterprets a byte slice as a slice of a primitive type.
///
/// This is the gateway for viewing a column's raw value bytes as typed data.
/// It fails if the slice length is not a multiple of `size_of::<T>()` or if
/// the slice is not aligned for `T`. Decoded zero-copy columns alias an
/// arbitrary position in a network or file buffer and may legitimately be
/// misaligned; callers fall back to a copying accessor in that case.
pub fn safe_bytes_to_typed_slice<T>(bytes: &[u8]) -> Result<&[T], TesseraError>
where
    T: bytemuck::Pod,
{
    bytemuck::try_cast_slice(bytes).map_err(TesseraError::from)
}

/// Converts a slice of primitive values into a `Vec<u8>`, respecting
/// Little-Endian byte order. This performs a memory copy to create a new,
/// owned byte vector.
pub fn typed_slice_to_bytes<T: bytemuck::Pod>(data: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(data).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_bytes_to_typed_slice_success() {
        let original_vec: Vec<i64> = vec![1, -2, 1_000_000];
        let bytes = typed_slice_to_bytes(&original_vec);

        let typed_slice = safe_bytes_to_typed_slice::<i64>(&bytes).unwrap();
        assert_eq!(typed_slice, original_vec.as_slice());
    }

    #[test]
    fn test_safe_bytes_to_typed_slice_mismatch_error() {
        // 5 bytes is not divisible by size_of::<i64>(). We only check the
        // error variant, not bytemuck's message, which can change between
        // library versions.
        let bytes: Vec<u8> = vec![0, 1, 2, 3, 4];
        let result = safe_bytes_to_typed_slice::<i64>(&bytes);
        assert!(matches!(result, Err(TesseraError::InternalError(_))));
    }

    #[test]
    fn test_typed_slice_to_bytes_endianness() {
        // Value is 258 = 0x0102 in hex. bytemuck respects native endianness;
        // on little-endian targets the least significant byte comes first.
        let original_vec: Vec<u16> = vec![258];
        let bytes = typed_slice_to_bytes(&original_vec);
        if cfg!(target_endian = "little") {
            assert_eq!(bytes, vec![0x02, 0x01]);
        } else {
            assert_eq!(bytes, vec![0x01, 0x02]);
        }
    }
}
