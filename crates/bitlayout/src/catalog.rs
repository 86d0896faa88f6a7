//! Static type catalog: shorthand codes, canonical primitive types and their natural widths.

use std::{fmt, str::FromStr};

use crate::errors::FieldError;

/// Widest raw bit-field the model supports.
pub const MAX_BIT_WIDTH: usize = 64;

/// Sentinel type name for raw bit-fields in structured field declarations.
pub const BITS_TYPE_NAME: &str = "bits";

/// Concrete primitive types a resolved field can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "String", try_from = "String"))]
pub enum PrimitiveType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

static ALL: [PrimitiveType; 10] = [
    PrimitiveType::U8,
    PrimitiveType::U16,
    PrimitiveType::U32,
    PrimitiveType::U64,
    PrimitiveType::I8,
    PrimitiveType::I16,
    PrimitiveType::I32,
    PrimitiveType::I64,
    PrimitiveType::F32,
    PrimitiveType::F64,
];

impl PrimitiveType {
    /// Fixed bit width, used when a field omits its size.
    pub fn natural_width(self) -> usize {
        match self {
            PrimitiveType::U8 | PrimitiveType::I8 => 8,
            PrimitiveType::U16 | PrimitiveType::I16 => 16,
            PrimitiveType::U32 | PrimitiveType::I32 | PrimitiveType::F32 => 32,
            PrimitiveType::U64 | PrimitiveType::I64 | PrimitiveType::F64 => 64,
        }
    }

    /// Floats count as signed.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveType::I8
                | PrimitiveType::I16
                | PrimitiveType::I32
                | PrimitiveType::I64
                | PrimitiveType::F32
                | PrimitiveType::F64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, PrimitiveType::F32 | PrimitiveType::F64)
    }

    /// Shorthand code, e.g. `u16` or `s8`.
    pub fn code(self) -> &'static str {
        match self {
            PrimitiveType::U8 => "u8",
            PrimitiveType::U16 => "u16",
            PrimitiveType::U32 => "u32",
            PrimitiveType::U64 => "u64",
            PrimitiveType::I8 => "s8",
            PrimitiveType::I16 => "s16",
            PrimitiveType::I32 => "s32",
            PrimitiveType::I64 => "s64",
            PrimitiveType::F32 => "f32",
            PrimitiveType::F64 => "f64",
        }
    }

    /// C spelling, e.g. `uint16_t` or `double`.
    pub fn c_name(self) -> &'static str {
        match self {
            PrimitiveType::U8 => "uint8_t",
            PrimitiveType::U16 => "uint16_t",
            PrimitiveType::U32 => "uint32_t",
            PrimitiveType::U64 => "uint64_t",
            PrimitiveType::I8 => "int8_t",
            PrimitiveType::I16 => "int16_t",
            PrimitiveType::I32 => "int32_t",
            PrimitiveType::I64 => "int64_t",
            PrimitiveType::F32 => "float",
            PrimitiveType::F64 => "double",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_name())
    }
}

/// Accepts either a shorthand code (`u8`) or a C spelling (`uint8_t`).
impl FromStr for PrimitiveType {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL.iter()
            .find(|ty| ty.code() == s || ty.c_name() == s)
            .copied()
            .ok_or_else(|| FieldError::UnknownTypeCode(s.to_string()))
    }
}

impl From<PrimitiveType> for String {
    fn from(value: PrimitiveType) -> Self {
        value.c_name().to_string()
    }
}

impl TryFrom<String> for PrimitiveType {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Type named by a structured field: a primitive or the raw `bits` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    Primitive(PrimitiveType),
    Bits,
}

/// Resolves a shorthand type code (`u8`, `s32`, `f64`, ...) to a primitive.
pub fn lookup_shorthand(code: &str) -> Result<PrimitiveType, FieldError> {
    ALL.iter()
        .find(|ty| ty.code() == code)
        .copied()
        .ok_or_else(|| FieldError::UnknownTypeCode(code.to_string()))
}

pub fn natural_width(ty: PrimitiveType) -> usize {
    ty.natural_width()
}

/// Smallest unsigned type whose width is at least `bits`.
pub fn minimal_holding_type(bits: usize) -> Result<PrimitiveType, FieldError> {
    match bits {
        0 => Err(FieldError::InvalidFieldSize(0)),
        1..=8 => Ok(PrimitiveType::U8),
        9..=16 => Ok(PrimitiveType::U16),
        17..=32 => Ok(PrimitiveType::U32),
        33..=MAX_BIT_WIDTH => Ok(PrimitiveType::U64),
        _ => Err(FieldError::BitWidthTooLarge(bits)),
    }
}

/// Parses the `type` of a structured field.
pub fn parse_type_name(name: &str) -> Result<TypeName, FieldError> {
    if name == BITS_TYPE_NAME {
        return Ok(TypeName::Bits);
    }

    name.parse().map(TypeName::Primitive)
}
