#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use xlat_ir::{Annotation, AnnotationValue, Modifiers, TypeKind};

use super::*;

fn table() -> NameTable {
    NameTable::new(&Options::default())
}

fn name_annotation(value: &str) -> Annotation {
    Annotation::new(QualifiedName::top_level(well_known::OBJECTIVE_C_NAME))
        .with_value("value", AnnotationValue::String(value.to_owned()))
}

// ── Type names ──

#[test]
fn packages_are_camel_flattened() {
    let names = table();
    assert_eq!(
        names.full_name(&QualifiedName::top_level("unit.test.Example")),
        "UnitTestExample"
    );
    let inner = QualifiedName::top_level("unit.test.Example").nested("Inner");
    assert_eq!(names.full_name(&inner), "UnitTestExample_Inner");
    assert_eq!(names.full_name(&inner.nested("1")), "UnitTestExample_Inner_1");
}

#[test]
fn core_types_keep_foundation_names() {
    let names = table();
    assert_eq!(names.full_name(&QualifiedName::new("java.lang", "Object")), "NSObject");
    assert_eq!(names.full_name(&QualifiedName::new("java.lang", "String")), "NSString");
    assert_eq!(names.full_name(&QualifiedName::new("java.lang", "Class")), "IOSClass");
    assert_eq!(
        names.full_name(&QualifiedName::new("java.lang", "Runnable")),
        "JavaLangRunnable"
    );
}

#[test]
fn reserved_top_level_names_in_default_package() {
    let names = table();
    assert_eq!(names.full_name(&QualifiedName::new("", "id")), "id_");
    assert_eq!(names.full_name(&QualifiedName::new("", "Foo")), "Foo");
    assert_eq!(names.full_name(&QualifiedName::new("a", "id")), "Aid");
}

#[test]
fn prefix_option_replaces_package() {
    let mut options = Options::default();
    options
        .package_prefixes
        .insert("com.example.util".to_owned(), "CEU".to_owned());
    let names = NameTable::new(&options);
    let ty = QualifiedName::top_level("com.example.util.Strings");
    assert_eq!(names.full_name(&ty), "CEUStrings");
    assert_eq!(names.default_full_name(&ty), "ComExampleUtilStrings");
    assert_eq!(
        names.compatibility_alias(&ty).as_deref(),
        Some("ComExampleUtilStrings")
    );
    assert_eq!(
        names.compatibility_alias(&QualifiedName::top_level("com.example.Other")),
        None
    );
}

#[test]
fn package_annotation_registers_prefix() {
    let mut unit = CompilationUnit::new("com/acme/Widget.java", "com.acme");
    unit.package_annotations.push(name_annotation("ACM"));
    unit.types.push(TypeDecl::new(
        QualifiedName::top_level("com.acme.Widget"),
        TypeKind::Class,
    ));
    let mut names = table();
    names.register(&unit).unwrap();
    assert_eq!(
        names.full_name(&QualifiedName::top_level("com.acme.Widget")),
        "ACMWidget"
    );
    assert_eq!(names.prefix_override("com.acme"), Some("ACM"));
}

#[test]
fn explicit_type_name_wins() {
    let mut decl = TypeDecl::new(QualifiedName::top_level("com.acme.Widget"), TypeKind::Class);
    decl.annotations.push(name_annotation("AcmeWidget"));
    let mut unit = CompilationUnit::new("com/acme/Widget.java", "com.acme");
    unit.types.push(decl);
    let mut names = table();
    names.register(&unit).unwrap();
    assert_eq!(
        names.full_name(&QualifiedName::top_level("com.acme.Widget")),
        "AcmeWidget"
    );
}

#[test]
fn colliding_flat_names_are_rejected() {
    let mut first = CompilationUnit::new("a/b/C.java", "a.b");
    first
        .types
        .push(TypeDecl::new(QualifiedName::top_level("a.b.CD"), TypeKind::Class));
    let mut second = CompilationUnit::new("a/b/c/D.java", "a.b.c");
    second
        .types
        .push(TypeDecl::new(QualifiedName::top_level("a.b.c.D"), TypeKind::Class));

    let mut names = table();
    names.register(&first).unwrap();
    let err = names.register(&second).unwrap_err();
    assert_eq!(
        err,
        TranslateError::TypeNameCollision {
            name: "ABCD".to_owned(),
            first: "a.b.CD".to_owned(),
            second: "a.b.c.D".to_owned(),
            span: xlat_ir::Span::DUMMY,
        }
    );
    // Re-registering the same unit is not a collision.
    names.register(&first).unwrap();
}

#[test]
fn failed_registration_claims_no_names() {
    let mut first = CompilationUnit::new("a/b/C.java", "a.b");
    first
        .types
        .push(TypeDecl::new(QualifiedName::top_level("a.b.CD"), TypeKind::Class));
    let mut second = CompilationUnit::new("a/b/c/D.java", "a.b.c");
    for name in ["a.b.c.E", "a.b.c.D"] {
        second
            .types
            .push(TypeDecl::new(QualifiedName::top_level(name), TypeKind::Class));
    }
    let mut third = CompilationUnit::new("a/b/CE.java", "a.b");
    third
        .types
        .push(TypeDecl::new(QualifiedName::top_level("a.b.CE"), TypeKind::Class));

    let mut names = table();
    names.register(&first).unwrap();
    assert!(names.register(&second).is_err());
    // `ABCE` was not taken by the failed unit.
    names.register(&third).unwrap();
}

#[test]
fn directives_on_private_types_are_rejected() {
    let mut decl = TypeDecl::new(
        QualifiedName::top_level("a.Outer").nested("Hidden"),
        TypeKind::Class,
    );
    decl.modifiers = Modifiers::PRIVATE | Modifiers::STATIC;
    decl.annotations.push(name_annotation("Shown"));
    assert!(matches!(
        validate_type_directives(&decl),
        Err(TranslateError::NameOnPrivateType { .. })
    ));

    let mut bad = TypeDecl::new(QualifiedName::top_level("a.Foo"), TypeKind::Class);
    bad.annotations.push(name_annotation("not valid"));
    assert!(matches!(
        validate_type_directives(&bad),
        Err(TranslateError::InvalidExplicitName { .. })
    ));
}

// ── Member names ──

#[test]
fn reserved_members_disambiguate_independently() {
    let names = table();
    assert_eq!(names.method_name("description"), "description__");
    assert_eq!(names.method_name("init"), "init__");
    assert_eq!(names.method_name("size"), "size");
    assert_eq!(names.variable_name("description"), "description");
    assert_eq!(names.ivar_name("description"), "description_");
    assert_eq!(names.variable_name("id"), "id_");
    assert_eq!(names.variable_name("initialize"), "initialize_");
    assert_eq!(names.param_name("in"), "inArg");
    assert_eq!(names.param_name("self"), "self_");
}

#[test]
fn static_storage_names() {
    let names = table();
    let owner = QualifiedName::top_level("unit.test.Example");
    assert_eq!(names.static_var_name(&owner, "count"), "UnitTestExample_count");
}

#[test]
fn identifier_escapes() {
    let mut out = String::new();
    encode_identifier(&mut out, "1st", true);
    assert_eq!(out, "_1st");
    out.clear();
    encode_identifier(&mut out, "a-b", false);
    assert_eq!(out, "a_2db");
    out.clear();
    encode_identifier(&mut out, "café$", true);
    assert_eq!(out, "café$");
    assert_eq!(capitalize("int"), "Int");
    assert_eq!(capitalize(""), "");
}

mod proptest_mangle {
    use proptest::prelude::*;

    use super::*;

    fn package() -> impl Strategy<Value = String> {
        proptest::collection::vec("[a-z][a-z0-9]{0,5}", 0..4).prop_map(|s| s.join("."))
    }

    fn type_name() -> impl Strategy<Value = String> {
        "[A-Z][A-Za-z0-9]{0,6}"
    }

    proptest! {
        /// Distinct types either flatten to distinct names or the
        /// collision is reported when both are registered.
        #[test]
        fn distinct_types_never_silently_share_a_name(
            p1 in package(), t1 in type_name(), p2 in package(), t2 in type_name()
        ) {
            let a = QualifiedName::new(p1.clone(), t1);
            let b = QualifiedName::new(p2.clone(), t2);
            prop_assume!(a != b);

            let mut names = table();
            let mut first = CompilationUnit::new("A.java", p1);
            first.types.push(TypeDecl::new(a.clone(), TypeKind::Class));
            let mut second = CompilationUnit::new("B.java", p2);
            second.types.push(TypeDecl::new(b.clone(), TypeKind::Class));
            names.register(&first).unwrap();
            let registered = names.register(&second);

            if names.full_name(&a) == names.full_name(&b) {
                let is_collision = matches!(registered, Err(TranslateError::TypeNameCollision { .. }));
                prop_assert!(is_collision);
            } else {
                prop_assert!(registered.is_ok());
            }
        }

        #[test]
        fn reserved_disambiguation_is_idempotent(name in "[a-z][a-zA-Z]{0,8}") {
            let names = table();
            prop_assert_eq!(names.method_name(&name), names.method_name(&name));
            prop_assert_eq!(names.variable_name(&name), names.variable_name(&name));
            let method = names.method_name(&name);
            prop_assert!(!is_reserved(&method) && !reserved::is_nsobject_message(&method));
            prop_assert!(!is_reserved(&names.variable_name(&name)));
        }

        #[test]
        fn escaped_identifiers_are_legal(name in "\\PC{1,12}") {
            let mut out = String::new();
            encode_identifier(&mut out, &name, true);
            let mut chars = out.chars();
            let first = chars.next();
            prop_assert!(first.is_some_and(|c| !c.is_ascii_digit()));
            prop_assert!(out
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphanumeric())));
        }
    }
}
