//! # bitlayout
//!
//! Resolves declarative binary record layouts into a fixed-layout IR for code
//! generation.
//!
//! A schema is a set of named components. Each component lists its fields in
//! wire order, either as shorthand strings (`"flags b3"`) or as structured
//! records with explicit offsets. Resolution settles every type, size and
//! offset, validates padding and overlap, splits bit-packed fields into
//! per-byte sections, and qualifies the count expressions of variable-length
//! ("repeated") fields. The resulting [Schema] carries no open inference and is
//! what an emitter turns into accessor code.
//!
//! ## Example
//!
//! ```
//! use bitlayout::def::{ComponentDef, SchemaDef, StructuredFieldDef};
//! use bitlayout::diagnostics::Silent;
//! use bitlayout::schema::Schema;
//!
//! let def = SchemaDef::new(vec![ComponentDef::new(
//!     "Packet",
//!     vec![
//!         "version b4".into(),
//!         "kind b4".into(),
//!         "count u8".into(),
//!         StructuredFieldDef::new("payload", "u16").with_repeats("count").into(),
//!     ],
//! )]);
//!
//! let schema = Schema::resolve(&def, &mut Silent).unwrap();
//! let packet = schema.get("Packet").unwrap();
//! assert_eq!(packet.num_bytes, 2);
//! assert!(packet.requires_vector);
//! assert_eq!(packet.field("kind").unwrap().bit_offset, 4);
//! assert_eq!(
//!     packet.field("payload").unwrap().repeats.as_ref().unwrap().qualified,
//!     "self.count"
//! );
//! ```

pub mod catalog;
pub mod component;
pub mod def;
pub mod diagnostics;
pub mod errors;
pub mod expr;
pub mod field;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;

pub use component::{Component, resolve_component};
pub use errors::{FieldError, ResolveError};
pub use field::{ResolvedField, resolve_field};
pub use schema::{Schema, resolve_schema};
