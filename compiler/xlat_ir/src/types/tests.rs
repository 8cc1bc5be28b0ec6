use pretty_assertions::assert_eq;

use super::*;

fn runnable() -> ResolvedType {
    ResolvedType::interface(QualifiedName::top_level("java.lang.Runnable"))
}

// ── Erasure ──

#[test]
fn type_variable_erases_to_first_bound() {
    let number = ResolvedType::class(QualifiedName::top_level("java.lang.Number"));
    let t = ResolvedType::type_var("T", vec![number.clone(), runnable()]);
    assert_eq!(t.erasure(), number);
}

#[test]
fn unbounded_type_variable_erases_to_object() {
    assert_eq!(ResolvedType::type_var("T", vec![]).erasure(), ResolvedType::object());
}

#[test]
fn declared_type_drops_arguments() {
    let list = ResolvedType::Interface(
        DeclaredType::new(QualifiedName::top_level("java.util.List"))
            .with_args(vec![ResolvedType::string()]),
    );
    assert_eq!(
        list.erasure(),
        ResolvedType::interface(QualifiedName::top_level("java.util.List"))
    );
}

#[test]
fn array_of_type_variable_erases_element() {
    let t = ResolvedType::type_var("T", vec![]);
    assert_eq!(
        ResolvedType::array_of(t, 2).erasure(),
        ResolvedType::array_of(ResolvedType::object(), 2)
    );
}

#[test]
fn wildcard_erasure() {
    let extends = ResolvedType::Wildcard(WildcardType {
        kind: BoundKind::Extends,
        bound: Some(Box::new(runnable())),
    });
    let sup = ResolvedType::Wildcard(WildcardType {
        kind: BoundKind::Super,
        bound: Some(Box::new(runnable())),
    });
    assert_eq!(extends.erasure(), runnable());
    assert_eq!(sup.erasure(), ResolvedType::object());
}

// ── Arrays ──

#[test]
fn nested_arrays_flatten() {
    let inner = ResolvedType::array_of(ResolvedType::INT, 1);
    let outer = ResolvedType::array_of(inner, 1);
    let ResolvedType::Array(array) = &outer else {
        panic!("expected array, got {outer:?}");
    };
    assert_eq!(array.dimensions, 2);
    assert_eq!(*array.element, ResolvedType::INT);
    assert_eq!(array.component(), ResolvedType::array_of(ResolvedType::INT, 1));
    assert_eq!(outer.to_string(), "int[][]");
}

// ── Primitives ──

#[test]
fn primitive_widths() {
    assert_eq!(PrimitiveKind::Byte.bit_width(), Some(8));
    assert_eq!(PrimitiveKind::Char.bit_width(), Some(16));
    assert_eq!(PrimitiveKind::Long.bit_width(), Some(64));
    assert_eq!(PrimitiveKind::Boolean.bit_width(), None);
    assert!(PrimitiveKind::Char.is_unsigned());
    assert!(!PrimitiveKind::Short.is_unsigned());
}

#[test]
fn display_generic() {
    let map = ResolvedType::Interface(
        DeclaredType::new(QualifiedName::top_level("java.util.Map"))
            .with_args(vec![ResolvedType::string(), ResolvedType::type_var("V", vec![])]),
    );
    assert_eq!(map.to_string(), "java.util.Map<java.lang.String, V>");
}
