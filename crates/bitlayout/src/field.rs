//! Field resolution: turns one [FieldDef] plus the running bit offset into a
//! fully placed [ResolvedField].
//!
//! Offsets are counted in bits from the start of the component, MSB-first:
//! bit 0 is the high bit of byte 0.

use crate::{
    catalog::{self, PrimitiveType, TypeName},
    def::{FieldDef, FixedValue, StructuredFieldDef},
    diagnostics::{Diagnostics, Event, Note},
    errors::FieldError,
    expr::RepeatExpr,
};

/// Shorthand prefix for the optional constant token.
const FIXED_PREFIX: &str = "fixed:";

/// A field with every inference settled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResolvedField {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty: PrimitiveType,
    /// Width in bits, 1..=64.
    pub size: usize,
    pub byte_offset: usize,
    /// 0..=7
    pub bit_offset: usize,
    pub fixed: Option<FixedValue>,
    /// Element count of a variable-length field; `None` for fixed-size fields.
    pub repeats: Option<RepeatExpr>,
    /// Running total of the field's bits covered after each byte it touches.
    /// Empty for repeated fields.
    pub sections: Vec<usize>,
}

impl ResolvedField {
    /// Resolves `def` at `running_offset` and returns the offset after it.
    ///
    /// Repeated fields occupy no fixed bits, so the returned offset for them
    /// is their own start.
    pub fn resolve<D: Diagnostics + ?Sized>(
        running_offset: usize,
        def: &FieldDef,
        diagnostics: &mut D,
    ) -> Result<(usize, Self), FieldError> {
        match def {
            FieldDef::Shorthand(text) => resolve_shorthand(running_offset, text, diagnostics),
            FieldDef::Structured(field) => resolve_structured(running_offset, field, diagnostics),
        }
    }

    pub fn absolute_bit_offset(&self) -> usize {
        self.byte_offset * 8 + self.bit_offset
    }

    pub fn end_bit_offset(&self) -> usize {
        self.absolute_bit_offset() + self.size
    }

    pub fn is_repeated(&self) -> bool {
        self.repeats.is_some()
    }

    /// True when the field needs shifting or masking to extract.
    pub fn is_bit_packed(&self) -> bool {
        self.bit_offset != 0 || self.size % 8 != 0
    }

    /// Number of field bits in each byte the field touches.
    pub fn chunk_sizes(&self) -> Vec<usize> {
        let mut previous = 0;
        self.sections
            .iter()
            .map(|&total| {
                let chunk = total - previous;
                previous = total;
                chunk
            })
            .collect()
    }
}

/// Fully explicit form; resolving it again yields the same field.
impl From<&ResolvedField> for StructuredFieldDef {
    fn from(field: &ResolvedField) -> Self {
        StructuredFieldDef {
            name: Some(field.name.clone()),
            ty: Some(field.ty.c_name().to_string()),
            size: Some(field.size),
            byte_offset: Some(field.byte_offset),
            bit_offset: Some(field.bit_offset),
            repeats: field.repeats.as_ref().map(|r| r.source.clone()),
            fixed: field.fixed,
        }
    }
}

/// See [ResolvedField::resolve].
pub fn resolve_field<D: Diagnostics + ?Sized>(
    running_offset: usize,
    def: &FieldDef,
    diagnostics: &mut D,
) -> Result<(usize, ResolvedField), FieldError> {
    ResolvedField::resolve(running_offset, def, diagnostics)
}

/// Cumulative bit counts of a `size`-bit field starting `bit_offset` bits into a byte.
///
/// `sections(2, 10)` is `[6, 10]`: six bits finish the first byte, the
/// remaining four land in the second.
pub fn sections(bit_offset: usize, size: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity((bit_offset % 8 + size).div_ceil(8));
    let mut covered = 0;
    let mut room = 8 - bit_offset % 8;

    while covered < size {
        covered += room.min(size - covered);
        out.push(covered);
        room = 8;
    }

    out
}

fn resolve_shorthand<D: Diagnostics + ?Sized>(
    running_offset: usize,
    text: &str,
    diagnostics: &mut D,
) -> Result<(usize, ResolvedField), FieldError> {
    let malformed = || FieldError::MalformedShorthand(text.to_string());
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let (name, code, fixed) = match tokens.as_slice() {
        [name, code] => (*name, *code, None),
        [name, code, extra] => {
            let value = extra.strip_prefix(FIXED_PREFIX).ok_or_else(malformed)?;
            (*name, *code, Some(value))
        }
        _ => return Err(malformed()),
    };

    let (ty, size) = shorthand_type(code)?;
    let fixed = fixed.map(str::parse::<FixedValue>).transpose()?;
    diagnostics.note(Note::field(
        name,
        Event::ShorthandExpanded {
            code: code.to_string(),
            size,
        },
    ));
    diagnostics.note(Note::field(
        name,
        Event::OffsetInferred {
            byte_offset: running_offset / 8,
            bit_offset: running_offset % 8,
        },
    ));

    place(name, ty, size, running_offset, fixed, None)
}

/// `b<width>` is a raw bit-field; everything else is a catalog code.
fn shorthand_type(code: &str) -> Result<(PrimitiveType, usize), FieldError> {
    match code.strip_prefix('b') {
        Some(width) => {
            if width.is_empty() || !width.bytes().all(|b| b.is_ascii_digit()) {
                return Err(FieldError::UnknownTypeCode(code.to_string()));
            }
            let size: usize = width
                .parse()
                .map_err(|_| FieldError::BitWidthTooLarge(usize::MAX))?;
            Ok((catalog::minimal_holding_type(size)?, size))
        }
        None => {
            let ty = catalog::lookup_shorthand(code)?;
            Ok((ty, ty.natural_width()))
        }
    }
}

fn resolve_structured<D: Diagnostics + ?Sized>(
    running_offset: usize,
    def: &StructuredFieldDef,
    diagnostics: &mut D,
) -> Result<(usize, ResolvedField), FieldError> {
    let name = def.name.as_deref().ok_or(FieldError::MissingName)?;
    let type_name = def.ty.as_deref().ok_or(FieldError::MissingType)?;

    let (ty, size) = match catalog::parse_type_name(type_name)? {
        TypeName::Bits => {
            let size = def.size.ok_or(FieldError::MissingBitFieldSize)?;
            (catalog::minimal_holding_type(size)?, size)
        }
        TypeName::Primitive(ty) => {
            let size = match def.size {
                Some(size) => size,
                None => {
                    let size = ty.natural_width();
                    diagnostics.note(Note::field(name, Event::SizeInferred { size }));
                    size
                }
            };
            check_size(ty, size)?;
            (ty, size)
        }
    };

    let running_byte = running_offset / 8;
    let position = match (def.byte_offset, def.bit_offset) {
        (None, None) => {
            diagnostics.note(Note::field(
                name,
                Event::OffsetInferred {
                    byte_offset: running_byte,
                    bit_offset: running_offset % 8,
                },
            ));
            running_offset
        }
        // same byte as the running offset: continue from where it stands
        (Some(byte), None) if byte == running_byte => running_offset,
        (Some(byte), None) => bit_position(byte, 0)?,
        (byte, Some(bit)) => {
            if bit > 7 {
                return Err(FieldError::InvalidBitOffset(bit));
            }
            bit_position(byte.unwrap_or(running_byte), bit)?
        }
    };

    if position < running_offset {
        return Err(FieldError::OverlapDetected {
            expected: running_offset,
            actual: position,
        });
    }
    if position > running_offset {
        diagnostics.note(Note::field(
            name,
            Event::PaddingDetected {
                at_bit: position,
                bits: position - running_offset,
            },
        ));
    }

    let repeats = def.repeats.as_deref().map(RepeatExpr::new);
    place(name, ty, size, position, def.fixed, repeats)
}

fn bit_position(byte_offset: usize, bit_offset: usize) -> Result<usize, FieldError> {
    byte_offset
        .checked_mul(8)
        .and_then(|bits| bits.checked_add(bit_offset))
        .ok_or(FieldError::OffsetOutOfRange { byte_offset })
}

/// Explicit sizes must fit the declared type; floats only come whole.
fn check_size(ty: PrimitiveType, size: usize) -> Result<(), FieldError> {
    if size == 0 {
        return Err(FieldError::InvalidFieldSize(size));
    }
    if size > ty.natural_width() || (ty.is_float() && size != ty.natural_width()) {
        return Err(FieldError::SizeExceedsType { size, ty });
    }

    Ok(())
}

fn place(
    name: &str,
    ty: PrimitiveType,
    size: usize,
    position: usize,
    fixed: Option<FixedValue>,
    repeats: Option<RepeatExpr>,
) -> Result<(usize, ResolvedField), FieldError> {
    if let Some(fixed) = &fixed {
        fixed.check_fits(ty, size)?;
    }

    let byte_offset = position / 8;
    let bit_offset = position % 8;

    let (next_offset, sections) = if repeats.is_some() {
        if bit_offset != 0 || size % 8 != 0 {
            return Err(FieldError::MisalignedRepeatedField { bit_offset, size });
        }
        (position, Vec::new())
    } else {
        let end = position
            .checked_add(size)
            .ok_or(FieldError::OffsetOutOfRange { byte_offset })?;
        (end, sections(bit_offset, size))
    };

    Ok((
        next_offset,
        ResolvedField {
            name: name.to_string(),
            ty,
            size,
            byte_offset,
            bit_offset,
            fixed,
            repeats,
            sections,
        },
    ))
}
