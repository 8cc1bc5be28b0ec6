use pretty_assertions::assert_eq;

use super::*;

#[test]
fn top_level_parse() {
    let name = QualifiedName::top_level("unit.test.Example");
    assert_eq!(name.package(), "unit.test");
    assert_eq!(name.simple_name(), "Example");
    assert!(!name.is_nested());
    assert_eq!(name.to_string(), "unit.test.Example");
}

#[test]
fn default_package() {
    let name = QualifiedName::top_level("Test");
    assert_eq!(name.package(), "");
    assert_eq!(name.to_string(), "Test");
    assert_eq!(name.source_path(), "Test");
}

#[test]
fn nested_names() {
    let outer = QualifiedName::top_level("unit.test.Example");
    let inner = outer.nested("Inner").nested("Deep");
    assert_eq!(inner.to_string(), "unit.test.Example.Inner.Deep");
    assert_eq!(inner.binary_name(), "unit.test.Example$Inner$Deep");
    assert_eq!(inner.outer().map(|n| n.to_string()), Some("unit.test.Example.Inner".to_owned()));
    assert_eq!(inner.top_level_type(), outer);
    assert_eq!(inner.source_path(), "unit/test/Example");
    assert_eq!(outer.outer(), None);
}

#[test]
fn well_known_checks() {
    assert!(QualifiedName::top_level("java.lang.Object").is_object());
    assert!(QualifiedName::top_level("java.lang.String").is_string());
    assert!(!QualifiedName::top_level("java.lang.String").nested("X").is_string());
}
