//! Component resolution: folds the field resolver over a component's fields.

use std::collections::HashSet;

use crate::{
    def::ComponentDef,
    diagnostics::{Diagnostics, Event, Note, Scoped},
    errors::ResolveError,
    field::ResolvedField,
};

/// A resolved record layout. Use [Component::resolve] to build one from a [ComponentDef].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Component {
    pub name: String,
    /// Fields in wire order.
    pub fields: Vec<ResolvedField>,
    /// Size of the fixed portion; repeated fields are not counted.
    #[cfg_attr(feature = "serde", serde(rename = "numBytes"))]
    pub num_bytes: usize,
    /// True when any field is repeated, i.e. the record has a runtime-sized tail.
    pub requires_vector: bool,
}

impl Component {
    /// Resolves every field of `def` in order. The first failing field aborts the component.
    pub fn resolve<D: Diagnostics + ?Sized>(
        def: &ComponentDef,
        diagnostics: &mut D,
    ) -> Result<Self, ResolveError> {
        let mut diagnostics = Scoped::new(&def.name, diagnostics);
        let mut fields: Vec<ResolvedField> = Vec::with_capacity(def.fields.len());
        let mut names: HashSet<String> = HashSet::with_capacity(def.fields.len());
        let mut running_offset = 0;

        for (index, field_def) in def.fields.iter().enumerate() {
            let (next_offset, field) =
                ResolvedField::resolve(running_offset, field_def, &mut diagnostics).map_err(
                    |source| ResolveError::Field {
                        component: def.name.clone(),
                        field: field_def
                            .label()
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("#{index}")),
                        index,
                        source,
                    },
                )?;

            if !names.insert(field.name.clone()) {
                return Err(ResolveError::DuplicateFieldName {
                    component: def.name.clone(),
                    field: field.name,
                });
            }

            if !field.is_repeated() {
                if let Some(repeated) = fields.iter().find(|f| f.is_repeated()) {
                    return Err(ResolveError::FixedFieldAfterRepeated {
                        component: def.name.clone(),
                        field: field.name,
                        repeated: repeated.name.clone(),
                    });
                }
            }

            running_offset = next_offset;
            fields.push(field);
        }

        if running_offset % 8 != 0 {
            return Err(ResolveError::UnalignedComponentEnd {
                component: def.name.clone(),
                end_bits: running_offset,
            });
        }

        let fixed_bits = fixed_bits(&fields);
        if fixed_bits % 8 != 0 {
            return Err(ResolveError::UnalignedFieldWidths {
                component: def.name.clone(),
                fixed_bits,
                end_bits: running_offset,
            });
        }

        let fixed_bytes = fixed_bits / 8;
        let num_bytes = match def.num_bytes {
            Some(specified) if specified != fixed_bytes => {
                return Err(ResolveError::NumBytesMismatch {
                    component: def.name.clone(),
                    specified,
                    inferred: fixed_bytes,
                });
            }
            Some(specified) => specified,
            None => {
                diagnostics.note(Note::component(
                    &def.name,
                    Event::NumBytesInferred {
                        num_bytes: fixed_bytes,
                    },
                ));
                fixed_bytes
            }
        };

        qualify_repeats(&mut fields, &mut diagnostics);

        Ok(Component {
            name: def.name.clone(),
            requires_vector: fields.iter().any(ResolvedField::is_repeated),
            fields,
            num_bytes,
        })
    }

    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fixed_fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter().filter(|f| !f.is_repeated())
    }

    pub fn repeated_fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter().filter(|f| f.is_repeated())
    }

    /// Total width of the fixed-size fields.
    pub fn fixed_bits(&self) -> usize {
        fixed_bits(&self.fields)
    }
}

/// See [Component::resolve].
pub fn resolve_component<D: Diagnostics + ?Sized>(
    def: &ComponentDef,
    diagnostics: &mut D,
) -> Result<Component, ResolveError> {
    Component::resolve(def, diagnostics)
}

fn fixed_bits(fields: &[ResolvedField]) -> usize {
    fields
        .iter()
        .filter(|f| !f.is_repeated())
        .map(|f| f.size)
        .sum()
}

/// Second pass: point repeat expressions at the fields declared before them.
fn qualify_repeats<D: Diagnostics + ?Sized>(fields: &mut [ResolvedField], diagnostics: &mut D) {
    let mut seen: HashSet<String> = HashSet::with_capacity(fields.len());

    for field in fields.iter_mut() {
        if let Some(repeats) = field.repeats.as_mut() {
            let known: HashSet<&str> = seen.iter().map(String::as_str).collect();
            for ident in repeats.qualify(&known) {
                diagnostics.note(Note::field(&field.name, Event::ExternalIdentifier { ident }));
            }
        }
        seen.insert(field.name.clone());
    }
}
