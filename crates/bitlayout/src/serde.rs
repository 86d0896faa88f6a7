//! JSON loading and IR export.
//!
//! A schema file is usually YAML or JSON written by hand; whatever reads it
//! only has to produce the [SchemaDef] shape described in [crate::def]. The
//! helpers here cover JSON. The resolved [Schema] serializes to the document a
//! template-based emitter consumes.

use crate::{def::SchemaDef, schema::Schema};

/// Parses a schema description from JSON text.
///
/// Duplicate component keys are preserved, so they surface as
/// [crate::errors::ResolveError::DuplicateComponentName] on resolution.
pub fn schema_from_json(json: &str) -> Result<SchemaDef, serde_json::Error> {
    serde_json::from_str(json)
}

/// Builds a schema description from an already-parsed JSON value.
///
/// A [serde_json::Value] object keeps only the last of duplicate keys, so
/// duplicates are already gone by the time this is called.
pub fn schema_from_value(value: serde_json::Value) -> Result<SchemaDef, serde_json::Error> {
    serde_json::from_value(value)
}

/// Serializes a resolved schema for a code emitter.
pub fn schema_to_json(schema: &Schema) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(schema)
}
