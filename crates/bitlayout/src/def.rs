//! Raw schema description handed to the resolver.
//!
//! These types mirror what a schema author writes: a set of named components,
//! each with an ordered list of fields given either as a terse shorthand
//! string (`"flags b3 fixed:0"`) or as a structured record. Nothing here is
//! validated; [crate::schema::resolve_schema] reads them without modifying them.
//!
//! With the `serde` feature, a schema deserializes from the shape
//!
//! ```text
//! components:
//!   HeaderA:
//!     numBytes: 2
//!     fields:
//!       - "fieldA u8"
//!       - { name: fieldB, type: bits, size: 6 }
//! ```

use std::{fmt, str::FromStr};

use crate::{catalog::PrimitiveType, errors::FieldError};

/// Top-level schema: components in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaDef {
    /// Keyed by name on the wire; duplicate keys are kept so they can be reported.
    #[cfg_attr(feature = "serde", serde(default, with = "components_map"))]
    pub components: Vec<ComponentDef>,
}

impl SchemaDef {
    pub fn new(components: Vec<ComponentDef>) -> Self {
        Self { components }
    }
}

/// One record layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    pub name: String,
    /// Expected size of the fixed portion; inferred when absent.
    pub num_bytes: Option<usize>,
    /// Fields in wire order.
    pub fields: Vec<FieldDef>,
}

impl ComponentDef {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            num_bytes: None,
            fields,
        }
    }

    pub fn with_num_bytes(mut self, num_bytes: usize) -> Self {
        self.num_bytes = Some(num_bytes);
        self
    }
}

/// A field declaration in either of its two accepted forms.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldDef {
    /// `"<name> <type-code> [fixed:<value>]"`
    Shorthand(String),
    Structured(StructuredFieldDef),
}

impl FieldDef {
    pub fn shorthand(text: impl Into<String>) -> Self {
        FieldDef::Shorthand(text.into())
    }

    /// Best-effort name for error messages, before the field is resolved.
    pub fn label(&self) -> Option<&str> {
        match self {
            FieldDef::Shorthand(text) => text.split_whitespace().next(),
            FieldDef::Structured(field) => field.name.as_deref(),
        }
    }
}

impl From<&str> for FieldDef {
    fn from(value: &str) -> Self {
        FieldDef::Shorthand(value.to_string())
    }
}

impl From<StructuredFieldDef> for FieldDef {
    fn from(value: StructuredFieldDef) -> Self {
        FieldDef::Structured(value)
    }
}

/// Record form of a field. `name` and `type` are required by the resolver but
/// optional here so their absence can be reported rather than rejected by the loader.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct StructuredFieldDef {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    /// Primitive name (`u8`, `uint8_t`, ...) or `bits`.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "type", default, skip_serializing_if = "Option::is_none")
    )]
    pub ty: Option<String>,
    /// Width in bits.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub size: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub byte_offset: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub bit_offset: Option<usize>,
    /// Element-count expression for a variable-length field.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub repeats: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub fixed: Option<FixedValue>,
}

impl StructuredFieldDef {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ty: Some(ty.into()),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_byte_offset(mut self, byte_offset: usize) -> Self {
        self.byte_offset = Some(byte_offset);
        self
    }

    pub fn with_bit_offset(mut self, bit_offset: usize) -> Self {
        self.bit_offset = Some(bit_offset);
        self
    }

    pub fn with_repeats(mut self, repeats: impl Into<String>) -> Self {
        self.repeats = Some(repeats.into());
        self
    }

    pub fn with_fixed(mut self, fixed: FixedValue) -> Self {
        self.fixed = Some(fixed);
        self
    }
}

/// Constant a const/reserved field must always hold.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FixedValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl FixedValue {
    /// Checks that a field of type `ty` and `size` bits can hold this value.
    pub fn check_fits(&self, ty: PrimitiveType, size: usize) -> Result<(), FieldError> {
        let fits = match *self {
            FixedValue::Float(_) => ty.is_float(),
            _ if ty.is_float() => true,
            FixedValue::Unsigned(v) => {
                let bits = if ty.is_signed() { size.saturating_sub(1) } else { size };
                i128::from(v) < (1i128 << bits)
            }
            FixedValue::Signed(v) => {
                let v = i128::from(v);
                if ty.is_signed() {
                    let half = 1i128 << size.saturating_sub(1);
                    (-half..half).contains(&v)
                } else {
                    v >= 0 && v < (1i128 << size)
                }
            }
        };

        if fits {
            Ok(())
        } else {
            Err(FieldError::FixedValueOutOfRange {
                value: self.to_string(),
                size,
                ty,
            })
        }
    }
}

impl fmt::Display for FixedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixedValue::Unsigned(v) => write!(f, "{v}"),
            FixedValue::Signed(v) => write!(f, "{v}"),
            FixedValue::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// Parses decimal, `0x` hex, `0b` binary, negative and floating-point literals.
impl FromStr for FixedValue {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FieldError::InvalidFixedValue(s.to_string());

        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return u64::from_str_radix(hex, 16)
                .map(FixedValue::Unsigned)
                .map_err(|_| invalid());
        }
        if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
            return u64::from_str_radix(bin, 2)
                .map(FixedValue::Unsigned)
                .map_err(|_| invalid());
        }
        if let Ok(v) = s.parse::<u64>() {
            return Ok(FixedValue::Unsigned(v));
        }
        if let Ok(v) = s.parse::<i64>() {
            return Ok(FixedValue::Signed(v));
        }
        // "inf" and "nan" parse as f64 but have no place in a wire constant
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(FixedValue::Float(v)),
            _ => Err(invalid()),
        }
    }
}

#[cfg(feature = "serde")]
mod components_map {
    use std::fmt;

    use serde::{
        Deserialize, Deserializer, Serialize, Serializer,
        de::{MapAccess, Visitor},
        ser::SerializeMap,
    };

    use super::{ComponentDef, FieldDef};

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct ComponentBody {
        #[serde(rename = "numBytes", alias = "num_bytes", default)]
        num_bytes: Option<usize>,
        #[serde(default)]
        fields: Vec<FieldDef>,
    }

    #[derive(Serialize)]
    struct ComponentBodyRef<'a> {
        #[serde(rename = "numBytes", skip_serializing_if = "Option::is_none")]
        num_bytes: Option<usize>,
        fields: &'a [FieldDef],
    }

    struct ComponentsVisitor;

    impl<'de> Visitor<'de> for ComponentsVisitor {
        type Value = Vec<ComponentDef>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of component names to component descriptors")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut components = Vec::with_capacity(map.size_hint().unwrap_or(0));

            while let Some((name, body)) = map.next_entry::<String, ComponentBody>()? {
                components.push(ComponentDef {
                    name,
                    num_bytes: body.num_bytes,
                    fields: body.fields,
                });
            }

            Ok(components)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<ComponentDef>, D::Error> {
        deserializer.deserialize_map(ComponentsVisitor)
    }

    pub fn serialize<S: Serializer>(
        components: &[ComponentDef],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(components.len()))?;
        for component in components {
            map.serialize_entry(
                &component.name,
                &ComponentBodyRef {
                    num_bytes: component.num_bytes,
                    fields: &component.fields,
                },
            )?;
        }
        map.end()
    }
}
