#![forbid(unsafe_code)]

//! Serialized names of the configuration-facing enums.

use bined_core::{CodeAreaSection, CodeCharactersCase, CodeType, EditOperation};
use serde_json::{Value, json};

#[test]
fn enums_serialize_as_snake_case() {
    assert_eq!(serde_json::to_value(CodeType::Hexadecimal).unwrap(), json!("hexadecimal"));
    assert_eq!(serde_json::to_value(CodeCharactersCase::Lower).unwrap(), json!("lower"));
    assert_eq!(serde_json::to_value(EditOperation::Insert).unwrap(), json!("insert"));
    assert_eq!(
        serde_json::to_value(CodeAreaSection::TextPreview).unwrap(),
        json!("text_preview")
    );
}

#[test]
fn every_code_type_reads_back() {
    for code_type in [
        CodeType::Binary,
        CodeType::Octal,
        CodeType::Decimal,
        CodeType::Hexadecimal,
    ] {
        let value: Value = serde_json::to_value(code_type).unwrap();
        assert_eq!(serde_json::from_value::<CodeType>(value).unwrap(), code_type);
    }
}

#[test]
fn unknown_names_are_rejected() {
    assert!(serde_json::from_str::<CodeType>("\"ternary\"").is_err());
    assert!(serde_json::from_str::<EditOperation>("\"Insert\"").is_err());
}
