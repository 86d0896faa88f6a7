//! Trace channel for inference decisions.
//!
//! Resolution never prints. Each decision the resolver makes on the author's
//! behalf (an inferred size, an inferred offset, padding) is reported as a
//! [Note] to a caller-supplied [Diagnostics] sink. Sinks observe; they can not
//! change the outcome, and [Silent] drops everything.

use std::fmt;

/// One inference decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A shorthand string was expanded into a full field.
    ShorthandExpanded { code: String, size: usize },
    /// Size taken from the type's natural width.
    SizeInferred { size: usize },
    /// Offset taken from the running offset.
    OffsetInferred { byte_offset: usize, bit_offset: usize },
    /// Explicit offset lies past the running offset; the gap is padding.
    PaddingDetected { at_bit: usize, bits: usize },
    /// `numBytes` was not given and was computed from the fields.
    NumBytesInferred { num_bytes: usize },
    /// Identifier in a repeat expression that is not an earlier field.
    ExternalIdentifier { ident: String },
}

/// An [Event] with the component and field it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub component: Option<String>,
    pub field: Option<String>,
    pub event: Event,
}

impl Note {
    pub fn field(field: &str, event: Event) -> Self {
        Note {
            component: None,
            field: Some(field.to_string()),
            event,
        }
    }

    pub fn component(component: &str, event: Event) -> Self {
        Note {
            component: Some(component.to_string()),
            field: None,
            event,
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.component, &self.field) {
            (Some(component), Some(field)) => write!(f, "{component}.{field}: ")?,
            (Some(component), None) => write!(f, "{component}: ")?,
            (None, Some(field)) => write!(f, "{field}: ")?,
            (None, None) => {}
        }

        match &self.event {
            Event::ShorthandExpanded { code, size } => {
                write!(f, "shorthand '{code}' expanded, size {size}")
            }
            Event::SizeInferred { size } => write!(f, "size inferred as {size} bits"),
            Event::OffsetInferred {
                byte_offset,
                bit_offset,
            } => write!(
                f,
                "offset inferred as byte {byte_offset}, bit {bit_offset}"
            ),
            Event::PaddingDetected { at_bit, bits } => {
                write!(f, "{bits} bits of padding before bit {at_bit}")
            }
            Event::NumBytesInferred { num_bytes } => {
                write!(f, "numBytes inferred as {num_bytes}")
            }
            Event::ExternalIdentifier { ident } => write!(
                f,
                "'{ident}' is not an earlier field; treated as an external constant"
            ),
        }
    }
}

/// Receiver for [Note]s.
pub trait Diagnostics {
    fn note(&mut self, note: Note);
}

/// Collects every note in order.
impl Diagnostics for Vec<Note> {
    fn note(&mut self, note: Note) {
        self.push(note);
    }
}

/// Discards every note.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Diagnostics for Silent {
    fn note(&mut self, _note: Note) {}
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn note(&mut self, note: Note) {
        (**self).note(note);
    }
}

/// Stamps a component name on notes that lack one before forwarding them.
pub struct Scoped<'a, D: ?Sized> {
    component: &'a str,
    inner: &'a mut D,
}

impl<'a, D: Diagnostics + ?Sized> Scoped<'a, D> {
    pub fn new(component: &'a str, inner: &'a mut D) -> Self {
        Self { component, inner }
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for Scoped<'_, D> {
    fn note(&mut self, mut note: Note) {
        if note.component.is_none() {
            note.component = Some(self.component.to_string());
        }
        self.inner.note(note);
    }
}
