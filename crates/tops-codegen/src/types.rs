//! WAT value types and the Tops → WAT type mapper.

use std::fmt;

/// A WebAssembly value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatType {
    I32,
    I64,
    F32,
    F64,
}

impl WatType {
    /// The plain load instruction for this type.
    pub fn load_instr(self) -> &'static str {
        match self {
            Self::I32 => "i32.load",
            Self::I64 => "i64.load",
            Self::F32 => "f32.load",
            Self::F64 => "f64.load",
        }
    }

    /// The plain store instruction for this type.
    pub fn store_instr(self) -> &'static str {
        match self {
            Self::I32 => "i32.store",
            Self::I64 => "i64.store",
            Self::F32 => "f32.store",
            Self::F64 => "f64.store",
        }
    }
}

impl fmt::Display for WatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
        }
    }
}

/// Map a Tops scalar type name to its WAT value type.
///
/// `None` means `void` (no result). Unrecognized names — pointers,
/// arrays, class names — default to `I32`, treated as opaque
/// pointer-sized references. Total function; there is no error path.
pub fn wat_value_type(tops_type: &str) -> Option<WatType> {
    match tops_type {
        "void" => None,
        // char is loaded/stored as i8 but operated on as i32
        "bool" | "char" | "int1" | "uint1" | "int2" | "uint2" | "int4" | "uint4" => {
            Some(WatType::I32)
        }
        "int8" | "uint8" => Some(WatType::I64),
        "float4" => Some(WatType::F32),
        "float8" => Some(WatType::F64),
        _ => Some(WatType::I32),
    }
}
