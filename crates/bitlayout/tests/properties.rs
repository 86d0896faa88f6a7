use bitlayout::{
    FieldError, ResolveError,
    catalog::{PrimitiveType, minimal_holding_type},
    def::{ComponentDef, FieldDef, StructuredFieldDef},
    diagnostics::Silent,
    field::sections,
    resolve_component, resolve_field,
};
use proptest::prelude::*;

fn bit_field(name: &str, size: usize) -> StructuredFieldDef {
    StructuredFieldDef::new(name, "bits").with_size(size)
}

/// Shorthand bit-fields of the given widths, padded to a byte boundary.
fn aligned_component(widths: &[usize]) -> ComponentDef {
    let mut fields: Vec<FieldDef> = widths
        .iter()
        .enumerate()
        .map(|(i, w)| FieldDef::shorthand(format!("f{i} b{w}")))
        .collect();

    let total: usize = widths.iter().sum();
    if total % 8 != 0 {
        fields.push(FieldDef::shorthand(format!("pad b{}", 8 - total % 8)));
    }

    ComponentDef::new("Generated", fields)
}

proptest! {
    #[test]
    fn holding_type_covers_width(bits in 1usize..=64) {
        let ty = minimal_holding_type(bits).unwrap();
        let expected = match bits {
            1..=8 => PrimitiveType::U8,
            9..=16 => PrimitiveType::U16,
            17..=32 => PrimitiveType::U32,
            _ => PrimitiveType::U64,
        };
        prop_assert_eq!(ty, expected);
        prop_assert!(ty.natural_width() >= bits);
    }

    #[test]
    fn holding_type_rejects_wide(bits in 65usize..4096) {
        prop_assert_eq!(minimal_holding_type(bits).unwrap_err(), FieldError::BitWidthTooLarge(bits));
    }

    #[test]
    fn explicit_offset_matches_inferred(running in 0usize..4096, size in 1usize..=64) {
        let inferred = FieldDef::from(bit_field("f", size));
        let explicit = FieldDef::from(
            bit_field("f", size)
                .with_byte_offset(running / 8)
                .with_bit_offset(running % 8),
        );

        prop_assert_eq!(
            resolve_field(running, &inferred, &mut Silent).unwrap(),
            resolve_field(running, &explicit, &mut Silent).unwrap()
        );
    }

    #[test]
    fn earlier_offset_is_overlap(running in 1usize..4096, back in 1usize..=64, size in 1usize..=64) {
        let back = back.min(running);
        let position = running - back;
        let def = FieldDef::from(
            bit_field("late", size)
                .with_byte_offset(position / 8)
                .with_bit_offset(position % 8),
        );

        prop_assert_eq!(
            resolve_field(running, &def, &mut Silent).unwrap_err(),
            FieldError::OverlapDetected { expected: running, actual: position }
        );
    }

    #[test]
    fn sections_cover_field(bit_offset in 0usize..8, size in 1usize..=64) {
        let cumulative = sections(bit_offset, size);

        prop_assert_eq!(cumulative.last().copied(), Some(size));
        prop_assert!(cumulative[0] <= 8 - bit_offset);
        prop_assert!(cumulative.windows(2).all(|w| w[1] > w[0] && w[1] - w[0] <= 8));
        prop_assert_eq!(cumulative.len(), (bit_offset + size).div_ceil(8));
    }

    #[test]
    fn component_end_alignment(widths in prop::collection::vec(1usize..=64, 1..12)) {
        let fields: Vec<FieldDef> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| FieldDef::shorthand(format!("f{i} b{w}")))
            .collect();
        let total: usize = widths.iter().sum();
        let result = resolve_component(&ComponentDef::new("Raw", fields), &mut Silent);

        if total % 8 == 0 {
            prop_assert_eq!(result.unwrap().num_bytes, total / 8);
        } else {
            prop_assert_eq!(
                result.unwrap_err(),
                ResolveError::UnalignedComponentEnd { component: "Raw".to_string(), end_bits: total }
            );
        }
    }

    #[test]
    fn offsets_never_go_backwards(widths in prop::collection::vec(1usize..=64, 1..12)) {
        let component = resolve_component(&aligned_component(&widths), &mut Silent).unwrap();

        prop_assert!(component
            .fields
            .windows(2)
            .all(|w| w[0].end_bit_offset() <= w[1].absolute_bit_offset()));
        prop_assert!(component.fields.iter().all(|f| f.bit_offset < 8));
    }

    #[test]
    fn explicit_form_resolves_identically(widths in prop::collection::vec(1usize..=64, 1..12)) {
        let first = resolve_component(&aligned_component(&widths), &mut Silent).unwrap();

        let explicit = ComponentDef::new(
            "Generated",
            first
                .fields
                .iter()
                .map(|f| FieldDef::from(StructuredFieldDef::from(f)))
                .collect(),
        )
        .with_num_bytes(first.num_bytes);
        let second = resolve_component(&explicit, &mut Silent).unwrap();

        prop_assert_eq!(first, second);
    }
}
