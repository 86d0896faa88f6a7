#![cfg(feature = "serde")]

use bitlayout::{
    ResolveError, Schema,
    def::{FieldDef, StructuredFieldDef},
    diagnostics::Silent,
    serde::{schema_from_json, schema_to_json},
};

const SCHEMA: &str = r#"{
    "components": {
        "HeaderA": {
            "numBytes": 1,
            "fields": [
                { "name": "fieldA", "type": "uint8_t", "byte_offset": 0, "bit_offset": 0, "size": 2 },
                { "name": "fieldB", "type": "uint8_t", "byte_offset": 0, "bit_offset": 2, "size": 6 }
            ]
        },
        "Telemetry": {
            "fields": [
                "sync u16 fixed:0xEB90",
                "count u8",
                "flags b8",
                { "name": "readings", "type": "f32", "repeats": "count" }
            ]
        }
    }
}"#;

#[test]
fn resolve_from_json() {
    let def = schema_from_json(SCHEMA).unwrap();
    let schema = Schema::resolve(&def, &mut Silent).unwrap();

    let header = schema.get("HeaderA").unwrap();
    assert_eq!(header.num_bytes, 1);
    assert_eq!(header.fields[1].sections, vec![6]);

    let telemetry = schema.get("Telemetry").unwrap();
    assert_eq!(telemetry.num_bytes, 4);
    assert!(telemetry.requires_vector);
    assert_eq!(
        telemetry.field("readings").unwrap().repeats.as_ref().unwrap().qualified,
        "self.count"
    );
}

#[test]
fn duplicate_component_in_json() {
    let def = schema_from_json(
        r#"{ "components": { "A": { "fields": ["x u8"] }, "A": { "fields": ["y u8"] } } }"#,
    )
    .unwrap();
    assert_eq!(
        Schema::resolve(&def, &mut Silent).unwrap_err(),
        ResolveError::DuplicateComponentName("A".to_string())
    );
}

#[test]
fn missing_type_survives_loading() {
    let def = schema_from_json(r#"{ "components": { "A": { "fields": [{ "name": "x" }] } } }"#)
        .unwrap();
    assert_eq!(
        def.components[0].fields[0],
        FieldDef::Structured(StructuredFieldDef {
            name: Some("x".to_string()),
            ..Default::default()
        })
    );
    let err = Schema::resolve(&def, &mut Silent).unwrap_err();
    assert_eq!(err.component(), "A");
}

#[test]
fn misspelled_keys_are_rejected() {
    for field in [
        r#"{ "name": "items", "type": "u8", "repeat": "count" }"#,
        r#"{ "name": "b", "type": "u8", "byte_ofset": 1 }"#,
        r#"{ "name": "b", "type": "u8", "bitoffset": 3 }"#,
    ] {
        let json = format!(r#"{{ "components": {{ "A": {{ "fields": ["count u8", {field}] }} }} }}"#);
        assert!(schema_from_json(&json).is_err(), "accepted {field}");
    }

    assert!(
        schema_from_json(r#"{ "components": { "A": { "numbytes": 1, "fields": ["x u8"] } } }"#)
            .is_err()
    );
}

#[test]
fn exported_ir_is_complete() {
    let schema = Schema::resolve(&schema_from_json(SCHEMA).unwrap(), &mut Silent).unwrap();
    let value: serde_json::Value = serde_json::from_str(&schema_to_json(&schema).unwrap()).unwrap();

    for component in value["components"].as_array().unwrap() {
        for field in component["fields"].as_array().unwrap() {
            for key in ["name", "type", "size", "byte_offset", "bit_offset", "sections"] {
                assert!(!field[key].is_null(), "{key} missing in {field}");
            }
        }
    }
    assert_eq!(value["components"][1]["fields"][0]["fixed"], 0xEB90);
}
