use pretty_assertions::assert_eq;

use super::*;

#[test]
fn visibility_from_modifiers() {
    assert_eq!(Modifiers::PUBLIC.visibility(), Visibility::Public);
    assert_eq!(
        (Modifiers::PROTECTED | Modifiers::STATIC).visibility(),
        Visibility::Protected
    );
    assert_eq!(Modifiers::PRIVATE.visibility(), Visibility::Private);
    assert_eq!(Modifiers::FINAL.visibility(), Visibility::PackagePrivate);
    assert!(Visibility::Public < Visibility::Protected);
    assert!(Visibility::PackagePrivate < Visibility::Private);
}

#[test]
fn class_defaults_to_object_superclass() {
    let decl = TypeDecl::new(QualifiedName::top_level("a.Foo"), TypeKind::Class);
    assert_eq!(
        decl.superclass.map(|d| d.name.to_string()),
        Some("java.lang.Object".to_owned())
    );
    let iface = TypeDecl::new(QualifiedName::top_level("a.Bar"), TypeKind::Interface);
    assert_eq!(iface.superclass, None);
}

#[test]
fn walk_visits_nested_in_order() {
    let outer_name = QualifiedName::top_level("a.Outer");
    let mut outer = TypeDecl::new(outer_name.clone(), TypeKind::Class);
    let mut inner = TypeDecl::new(outer_name.nested("Inner"), TypeKind::Class);
    inner
        .nested
        .push(TypeDecl::new(outer_name.nested("Inner").nested("Deep"), TypeKind::Class));
    outer.nested.push(inner);
    outer
        .nested
        .push(TypeDecl::new(outer_name.nested("Other"), TypeKind::Interface));
    let names: Vec<String> = outer.walk().iter().map(|t| t.name.to_string()).collect();
    assert_eq!(
        names,
        vec!["a.Outer", "a.Outer.Inner", "a.Outer.Inner.Deep", "a.Outer.Other"]
    );
}

#[test]
fn outer_instance_requires_capture() {
    let outer = QualifiedName::top_level("a.Outer");
    let mut inner = TypeDecl::new(outer.nested("Inner"), TypeKind::Class);
    assert!(!inner.has_outer_instance());
    inner.captures_outer = true;
    assert!(inner.has_outer_instance());
    inner.modifiers |= Modifiers::STATIC;
    assert!(!inner.has_outer_instance());
}
