//! Error types for field, component and schema resolution.

use crate::catalog::PrimitiveType;

/// Errors produced when resolving a single [crate::def::FieldDef] into a [crate::field::ResolvedField].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// Type code or type name is not in the catalog.
    #[error("unknown type code '{0}'")]
    UnknownTypeCode(String),
    /// Raw bit-field is wider than the largest holding type.
    #[error("bit-field width {0} exceeds 64 bits")]
    BitWidthTooLarge(usize),
    /// Structured field has no `name`.
    #[error("field has no name")]
    MissingName,
    /// Structured field has no `type`.
    #[error("field has no type")]
    MissingType,
    /// `bits` field without an explicit `size`.
    #[error("bit-field requires an explicit size")]
    MissingBitFieldSize,
    /// Resolved start lies before the end of the previous field.
    #[error("overlaps previous field: expected start at bit {expected} or later, got bit {actual}")]
    OverlapDetected { expected: usize, actual: usize },
    /// Repeated field is not byte-aligned or not byte-sized.
    #[error(
        "repeated field must be byte-aligned and byte-sized (bit_offset {bit_offset}, size {size})"
    )]
    MisalignedRepeatedField { bit_offset: usize, size: usize },
    /// Shorthand string does not have the `<name> <code> [fixed:<value>]` shape.
    #[error("malformed shorthand '{0}': expected \"<name> <type-code> [fixed:<value>]\"")]
    MalformedShorthand(String),
    /// Size is zero.
    #[error("field size must be at least 1 bit, got {0}")]
    InvalidFieldSize(usize),
    /// Size does not fit the declared primitive type.
    #[error("size {size} does not fit type {ty} ({} bits)", .ty.natural_width())]
    SizeExceedsType { size: usize, ty: PrimitiveType },
    /// Explicit offset, or the field end, lies beyond the addressable bit range.
    #[error("byte_offset {byte_offset} is out of range")]
    OffsetOutOfRange { byte_offset: usize },
    /// Explicit bit offset outside 0..=7.
    #[error("bit_offset must be in 0..=7, got {0}")]
    InvalidBitOffset(usize),
    /// Fixed value text could not be parsed.
    #[error("invalid fixed value '{0}'")]
    InvalidFixedValue(String),
    /// Fixed value cannot be held by the field.
    #[error("fixed value {value} does not fit {size}-bit {ty}")]
    FixedValueOutOfRange {
        value: String,
        size: usize,
        ty: PrimitiveType,
    },
}

/// Errors produced when resolving a [crate::component::Component] or a whole [crate::schema::Schema].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A field failed to resolve; aborts its component.
    #[error("component '{component}', field {field} (#{index}): {source}")]
    Field {
        component: String,
        field: String,
        index: usize,
        #[source]
        source: FieldError,
    },
    /// Two fields in one component share a name.
    #[error("component '{component}': duplicate field name '{field}'")]
    DuplicateFieldName { component: String, field: String },
    /// A fixed-size field follows a repeated one.
    #[error(
        "component '{component}': field '{field}' follows repeated field '{repeated}' and would have a runtime-dependent offset"
    )]
    FixedFieldAfterRepeated {
        component: String,
        field: String,
        repeated: String,
    },
    /// The fixed portion does not end on a byte boundary.
    #[error("component '{component}': fields end at bit {end_bits}, which is not byte-aligned")]
    UnalignedComponentEnd { component: String, end_bits: usize },
    /// Padding ends the component on a byte boundary, but the field widths
    /// themselves do not add up to whole bytes.
    #[error(
        "component '{component}': field widths sum to {fixed_bits} bits, not a whole number of bytes (fields end at bit {end_bits})"
    )]
    UnalignedFieldWidths {
        component: String,
        fixed_bits: usize,
        end_bits: usize,
    },
    /// Explicit `numBytes` disagrees with the fields.
    #[error("component '{component}': numBytes mismatch (specified={specified}, inferred={inferred})")]
    NumBytesMismatch {
        component: String,
        specified: usize,
        inferred: usize,
    },
    /// Two components share a name.
    #[error("duplicate component name '{0}'")]
    DuplicateComponentName(String),
}

impl ResolveError {
    /// Name of the component the error was raised in.
    pub fn component(&self) -> &str {
        match self {
            ResolveError::Field { component, .. }
            | ResolveError::DuplicateFieldName { component, .. }
            | ResolveError::FixedFieldAfterRepeated { component, .. }
            | ResolveError::UnalignedComponentEnd { component, .. }
            | ResolveError::UnalignedFieldWidths { component, .. }
            | ResolveError::NumBytesMismatch { component, .. } => component,
            ResolveError::DuplicateComponentName(component) => component,
        }
    }

    /// The underlying field error, if this is a field-level failure.
    pub fn field_error(&self) -> Option<&FieldError> {
        match self {
            ResolveError::Field { source, .. } => Some(source),
            _ => None,
        }
    }
}
