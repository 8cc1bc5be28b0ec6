use pretty_assertions::assert_eq;

use super::*;

#[test]
fn collision_maps_to_e5002_with_both_locations() {
    let err = TranslateError::SelectorCollision {
        selector: "fooWithId:".to_owned(),
        first: "foo(T)".to_owned(),
        second: "foo(U)".to_owned(),
        span: Span::new(40, 43),
        previous: Span::new(10, 13),
    };
    let diag = err.to_diagnostic();
    assert_eq!(diag.code, ErrorCode::E5002);
    assert_eq!(
        diag.message,
        "`foo(T)` and `foo(U)` both translate to selector `fooWithId:`"
    );
    assert_eq!(diag.primary_span(), Some(Span::new(40, 43)));
    assert_eq!(diag.labels.len(), 2);
}

#[test]
fn internal_errors_are_flagged() {
    let err = TranslateError::internal("wildcard at declaration site", Span::DUMMY);
    assert!(err.is_internal());
    assert_eq!(err.code(), ErrorCode::E9001);
    assert_eq!(err.to_diagnostic().notes.len(), 1);

    let unsupported = TranslateError::Unsupported {
        kind: "lambda expression",
        span: Span::new(1, 2),
    };
    assert!(!unsupported.is_internal());
    assert_eq!(
        unsupported.to_string(),
        "lambda expression must be desugared before code generation"
    );
}

#[test]
fn every_variant_is_an_error_severity() {
    let errs = [
        TranslateError::NameOnPrivateType {
            ty: "a.Foo".to_owned(),
            span: Span::DUMMY,
        },
        TranslateError::ArrayStore {
            expected: "a.A".to_owned(),
            found: "a.B".to_owned(),
            span: Span::DUMMY,
        },
        TranslateError::DuplicateInterface {
            interface: "java.lang.Runnable".to_owned(),
            ty: "a.Foo".to_owned(),
            span: Span::DUMMY,
        },
    ];
    for err in &errs {
        assert!(err.to_diagnostic().is_error());
        assert!(err.code().is_codegen_error());
    }
}
