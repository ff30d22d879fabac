//! This module defines the canonical, type-safe representation of the column
//! types the record codec understands.
//!
//! The set is deliberately closed: the wire format only ever needs exactly
//! these cases, and a new type requires a deliberate format-version bump.

use crate::error::TesseraError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The logical type of one record column.
///
/// The numeric wire tags assigned by [`FieldType::type_tag`] are part of the
/// persisted format and must stay stable across a deployment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldType {
    Integer,
    Float,
    Boolean,
    String,
}

impl FieldType {
    /// The stable wire tag for this type.
    pub const fn type_tag(self) -> u8 {
        match self {
            Self::Integer => 1,
            Self::Float => 2,
            Self::Boolean => 3,
            Self::String => 4,
        }
    }

    /// Converts a wire tag back into a `FieldType`.
    pub fn from_tag(tag: u8) -> Result<Self, TesseraError> {
        match tag {
            1 => Ok(Self::Integer),
            2 => Ok(Self::Float),
            3 => Ok(Self::Boolean),
            4 => Ok(Self::String),
            other => Err(TesseraError::UnsupportedType(other)),
        }
    }

    /// The fixed per-row width in bytes, or `None` for variable-length types.
    pub const fn width(self) -> Option<usize> {
        match self {
            Self::Integer | Self::Float => Some(8),
            Self::Boolean => Some(1),
            Self::String => None,
        }
    }

    /// Returns `true` if the type stores a fixed-width value array.
    pub const fn is_fixed_width(self) -> bool {
        self.width().is_some()
    }
}

/// Provides the canonical string representation for a `FieldType`.
impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // These string representations are part of the public contract.
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip_for_all_types() {
        for ft in [
            FieldType::Integer,
            FieldType::Float,
            FieldType::Boolean,
            FieldType::String,
        ] {
            assert_eq!(FieldType::from_tag(ft.type_tag()).unwrap(), ft);
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let result = FieldType::from_tag(9);
        assert!(matches!(result, Err(TesseraError::UnsupportedType(9))));
        assert!(matches!(
            FieldType::from_tag(0),
            Err(TesseraError::UnsupportedType(0))
        ));
    }

    #[test]
    fn test_widths() {
        assert_eq!(FieldType::Integer.width(), Some(8));
        assert_eq!(FieldType::Float.width(), Some(8));
        assert_eq!(FieldType::Boolean.width(), Some(1));
        assert_eq!(FieldType::String.width(), None);
        assert!(!FieldType::String.is_fixed_width());
    }
}
