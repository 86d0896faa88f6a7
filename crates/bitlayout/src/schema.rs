//! Schema: resolved set of components handed to code emission.

use std::collections::HashSet;

use crate::{
    component::Component,
    def::{ComponentDef, SchemaDef},
    diagnostics::Diagnostics,
    errors::ResolveError,
};

/// A resolved schema. Use [Schema::resolve] to build one from a [SchemaDef].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Schema {
    /// Components in declaration order.
    pub components: Vec<Component>,
}

impl Schema {
    /// Resolves every component of `def`. The first failure, in declaration
    /// order, aborts the whole schema; no partial result is returned.
    pub fn resolve<D: Diagnostics + ?Sized>(
        def: &SchemaDef,
        diagnostics: &mut D,
    ) -> Result<Self, ResolveError> {
        check_unique_names(&def.components)?;

        let mut components = Vec::with_capacity(def.components.len());
        for component in &def.components {
            components.push(Component::resolve(component, diagnostics)?);
        }

        Ok(Self { components })
    }

    /// Like [Schema::resolve], with components resolved on the rayon pool.
    ///
    /// Produces the same schema, the same error and the same notes in the same
    /// order as sequential resolution.
    #[cfg(feature = "parallel")]
    pub fn par_resolve<D: Diagnostics + ?Sized>(
        def: &SchemaDef,
        diagnostics: &mut D,
    ) -> Result<Self, ResolveError> {
        use rayon::prelude::*;

        use crate::diagnostics::Note;

        check_unique_names(&def.components)?;

        let results: Vec<(Vec<Note>, Result<Component, ResolveError>)> = def
            .components
            .par_iter()
            .map(|component| {
                let mut notes = Vec::new();
                let result = Component::resolve(component, &mut notes);
                (notes, result)
            })
            .collect();

        let mut components = Vec::with_capacity(results.len());
        for (notes, result) in results {
            for note in notes {
                diagnostics.note(note);
            }
            components.push(result?);
        }

        Ok(Self { components })
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// See [Schema::resolve].
pub fn resolve_schema<D: Diagnostics + ?Sized>(
    def: &SchemaDef,
    diagnostics: &mut D,
) -> Result<Schema, ResolveError> {
    Schema::resolve(def, diagnostics)
}

fn check_unique_names(components: &[ComponentDef]) -> Result<(), ResolveError> {
    let mut names: HashSet<&str> = HashSet::with_capacity(components.len());

    for component in components {
        if !names.insert(component.name.as_str()) {
            return Err(ResolveError::DuplicateComponentName(component.name.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        def::StructuredFieldDef,
        diagnostics::{Note, Silent},
        errors::FieldError,
    };

    use super::*;

    fn sample() -> SchemaDef {
        SchemaDef::new(vec![
            ComponentDef::new("HeaderA", vec!["fieldA u8".into(), "fieldB b6".into(), "spare b2".into()]),
            ComponentDef::new(
                "Packet",
                vec![
                    "count u8".into(),
                    StructuredFieldDef::new("payload", "u8").with_repeats("count").into(),
                ],
            ),
        ])
    }

    #[test]
    fn test_resolve_empty() {
        let schema = Schema::resolve(&SchemaDef::default(), &mut Silent).unwrap();
        assert!(schema.is_empty());
    }

    #[test]
    fn test_resolve_in_order() {
        let schema = resolve_schema(&sample(), &mut Silent).unwrap();
        let names: Vec<&str> = schema.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["HeaderA", "Packet"]);
        assert_eq!(schema.get("HeaderA").unwrap().num_bytes, 2);
        assert!(schema.get("Packet").unwrap().requires_vector);
        assert!(schema.get("Missing").is_none());
    }

    #[test]
    fn test_duplicate_component_name() {
        let mut def = sample();
        def.components.push(ComponentDef::new("HeaderA", vec!["x u8".into()]));
        assert_eq!(
            Schema::resolve(&def, &mut Silent).unwrap_err(),
            ResolveError::DuplicateComponentName("HeaderA".to_string())
        );
    }

    #[test]
    fn test_fail_fast() {
        let mut def = sample();
        def.components.insert(1, ComponentDef::new("Broken", vec!["x u7".into()]));
        def.components.push(ComponentDef::new("AlsoBroken", vec!["y b3".into()]));

        let mut notes: Vec<Note> = Vec::new();
        let err = Schema::resolve(&def, &mut notes).unwrap_err();
        assert_eq!(err.component(), "Broken");
        assert_eq!(
            err.field_error(),
            Some(&FieldError::UnknownTypeCode("u7".to_string()))
        );
        assert!(notes.iter().all(|n| n.component.as_deref() != Some("Packet")));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_par_resolve_matches_sequential() {
        let def = sample();
        let mut sequential_notes: Vec<Note> = Vec::new();
        let mut parallel_notes: Vec<Note> = Vec::new();

        let sequential = Schema::resolve(&def, &mut sequential_notes).unwrap();
        let parallel = Schema::par_resolve(&def, &mut parallel_notes).unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(sequential_notes, parallel_notes);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_par_resolve_first_error_wins() {
        let mut def = sample();
        def.components.insert(0, ComponentDef::new("First", vec!["x b3".into()]));
        def.components.push(ComponentDef::new("Last", vec!["y q1".into()]));

        let err = Schema::par_resolve(&def, &mut Silent).unwrap_err();
        assert_eq!(err.component(), "First");
    }
}
