//! # Data Type Discriminants
//!
//! `DataType` is the storage-level discriminant shared by schemas, row blocks
//! and the CQL value codec. Parametric kinds (`List`, `Set`, `Map`) carry no
//! parameters here; their element types live in [`ColumnType`](super::ColumnType).
//!
//! ## Type Categories
//!
//! | Category | Types | Row Block Storage |
//! |----------|-------|-------------------|
//! | **Boolean** | Bool | 1 byte inline |
//! | **Integer** | Int8, Int16, Int32, Int64 | 1, 2, 4, 8 bytes inline |
//! | **Float** | Float, Double | 4, 8 bytes inline |
//! | **Time** | Timestamp | 8 bytes inline (microseconds) |
//! | **Identity** | Uuid | 16 bytes inline |
//! | **Text/Binary** | String, Binary | 16-byte slot + indirect data |
//! | **Collection** | List, Set, Map | 16-byte slot + indirect data |
//!
//! ## Discriminant Values
//!
//! - 0-8: fixed-width scalars
//! - 20-21: variable-width scalars
//! - 30-32: collections
//!
//! Discriminants are part of the schema wire format and must never be reused.

/// Storage-level type discriminant.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool = 0,
    Int8 = 1,
    Int16 = 2,
    Int32 = 3,
    Int64 = 4,
    Float = 5,
    Double = 6,
    Timestamp = 7,
    Uuid = 8,

    String = 20,
    Binary = 21,

    List = 30,
    Set = 31,
    Map = 32,
}

impl DataType {
    /// Returns the inline byte width for this type, or None for variable-length types.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            DataType::Bool => Some(1),
            DataType::Int8 => Some(1),
            DataType::Int16 => Some(2),
            DataType::Int32 => Some(4),
            DataType::Int64 => Some(8),
            DataType::Float => Some(4),
            DataType::Double => Some(8),
            DataType::Timestamp => Some(8),
            DataType::Uuid => Some(16),
            DataType::String
            | DataType::Binary
            | DataType::List
            | DataType::Set
            | DataType::Map => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        self.fixed_size().is_none()
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, DataType::List | DataType::Set | DataType::Map)
    }

    /// Number of scalar parameters a column of this type carries.
    pub fn param_count(&self) -> usize {
        match self {
            DataType::List | DataType::Set => 1,
            DataType::Map => 2,
            _ => 0,
        }
    }

    /// CQL spelling used in type names and error messages.
    pub fn cql_name(&self) -> &'static str {
        match self {
            DataType::Bool => "boolean",
            DataType::Int8 => "tinyint",
            DataType::Int16 => "smallint",
            DataType::Int32 => "int",
            DataType::Int64 => "bigint",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Timestamp => "timestamp",
            DataType::Uuid => "uuid",
            DataType::String => "text",
            DataType::Binary => "blob",
            DataType::List => "list",
            DataType::Set => "set",
            DataType::Map => "map",
        }
    }
}

impl TryFrom<u8> for DataType {
    type Error = eyre::Report;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DataType::Bool),
            1 => Ok(DataType::Int8),
            2 => Ok(DataType::Int16),
            3 => Ok(DataType::Int32),
            4 => Ok(DataType::Int64),
            5 => Ok(DataType::Float),
            6 => Ok(DataType::Double),
            7 => Ok(DataType::Timestamp),
            8 => Ok(DataType::Uuid),
            20 => Ok(DataType::String),
            21 => Ok(DataType::Binary),
            30 => Ok(DataType::List),
            31 => Ok(DataType::Set),
            32 => Ok(DataType::Map),
            _ => Err(crate::error::WireError::protocol(format!(
                "invalid DataType discriminant: {}",
                value
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sizes_match_row_layout() {
        assert_eq!(DataType::Bool.fixed_size(), Some(1));
        assert_eq!(DataType::Int16.fixed_size(), Some(2));
        assert_eq!(DataType::Int32.fixed_size(), Some(4));
        assert_eq!(DataType::Timestamp.fixed_size(), Some(8));
        assert_eq!(DataType::Uuid.fixed_size(), Some(16));
        assert_eq!(DataType::String.fixed_size(), None);
        assert!(DataType::Map.is_variable());
    }

    #[test]
    fn discriminants_survive_u8_conversion() {
        for dt in [
            DataType::Bool,
            DataType::Int64,
            DataType::Uuid,
            DataType::Binary,
            DataType::Map,
        ] {
            assert_eq!(DataType::try_from(dt as u8).unwrap(), dt);
        }
    }

    #[test]
    fn unknown_discriminant_is_rejected() {
        let err = DataType::try_from(99).unwrap_err();
        assert!(err.to_string().contains("99"));
    }
}
