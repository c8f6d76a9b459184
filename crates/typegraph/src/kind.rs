//! Structural kinds a [`TypeDesc`](crate::TypeDesc) can report.

use std::fmt;

/// The structural category of a described type.
///
/// Numeric widths are kept distinct so diagnostics can name the exact kind,
/// but the traversal treats every width the same way (see [`Kind::is_primitive`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// Zero-sized or absent values (`()`, `PhantomData`). Fields of this kind are skipped.
    Invalid,
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uint128,
    Float32,
    Float64,
    Char,
    String,
    Chan,
    Func,
    Interface,
    Map,
    Pointer,
    Slice,
    Array,
    Struct,
    UnsafePointer,
}

impl Kind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::Invalid => "invalid",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Int128 => "int128",
            Kind::Uint => "uint",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Uint128 => "uint128",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::Char => "char",
            Kind::String => "string",
            Kind::Chan => "chan",
            Kind::Func => "func",
            Kind::Interface => "interface",
            Kind::Map => "map",
            Kind::Pointer => "ptr",
            Kind::Slice => "slice",
            Kind::Array => "array",
            Kind::Struct => "struct",
            Kind::UnsafePointer => "unsafe pointer",
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Kind::Int
                | Kind::Int8
                | Kind::Int16
                | Kind::Int32
                | Kind::Int64
                | Kind::Int128
                | Kind::Uint
                | Kind::Uint8
                | Kind::Uint16
                | Kind::Uint32
                | Kind::Uint64
                | Kind::Uint128
                | Kind::Float32
                | Kind::Float64
        )
    }

    /// Terminal kinds for field classification: they never carry a relation.
    pub const fn is_primitive(self) -> bool {
        self.is_numeric() || matches!(self, Kind::Invalid | Kind::Bool | Kind::Char | Kind::String)
    }

    /// Kinds the unwrapper treats as inert leaves.
    ///
    /// Wider than [`Kind::is_primitive`]: channels and functions have no
    /// inspector either, but they are not errors when reached through a value.
    pub const fn is_scalar_like(self) -> bool {
        self.is_primitive() || matches!(self, Kind::Chan | Kind::Func)
    }

    pub const fn is_indirect(self) -> bool {
        matches!(self, Kind::Pointer | Kind::Interface)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_widths_are_primitive() {
        for kind in [Kind::Int8, Kind::Uint128, Kind::Float32, Kind::Int] {
            assert!(kind.is_primitive(), "{kind} should be primitive");
        }
        assert!(!Kind::Chan.is_primitive());
        assert!(Kind::Chan.is_scalar_like());
        assert!(!Kind::UnsafePointer.is_scalar_like());
    }

    #[test]
    fn display_uses_short_names() {
        assert_eq!(Kind::Pointer.to_string(), "ptr");
        assert_eq!(Kind::UnsafePointer.to_string(), "unsafe pointer");
    }
}
