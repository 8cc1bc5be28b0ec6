#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use xlat_diagnostic::ErrorCode;
use xlat_ir::builder::{field, UnitBuilder};
use xlat_ir::{
    DeclaredType, Member, MethodDecl, Modifiers, Param, QualifiedName, ResolvedType, TypeDecl,
    TypeKind,
};

use super::*;

fn class(dotted: &str) -> TypeDecl {
    TypeDecl::new(QualifiedName::top_level(dotted), TypeKind::Class)
}

fn unit(path: &str, package: &str, decl: TypeDecl) -> CompilationUnit {
    let mut b = UnitBuilder::new(path, package);
    b.add_type(decl);
    b.finish()
}

fn colliding_selectors(dotted: &str) -> TypeDecl {
    let mut decl = class(dotted);
    for _ in 0..2 {
        let mut foo = MethodDecl::new("foo", ResolvedType::VOID);
        foo.params.push(Param::new("i", ResolvedType::INT));
        decl.members.push(Member::Method(foo));
    }
    decl
}

fn objc_names(outcome: &UnitOutcome) -> Vec<&str> {
    outcome.types().iter().map(|t| t.objc_name.as_str()).collect()
}

// ── Per-unit output ──

#[test]
fn outcomes_keep_input_order() {
    let units: Vec<CompilationUnit> = ["Zeta", "Alpha", "Mid"]
        .iter()
        .map(|n| unit(&format!("p/{n}.java"), "p", class(&format!("p.{n}"))))
        .collect();
    let out = Session::default().translate(&units).unwrap();
    let names: Vec<Vec<&str>> = out.units.iter().map(objc_names).collect();
    assert_eq!(names, vec![vec!["PZeta"], vec!["PAlpha"], vec!["PMid"]]);
    let paths: Vec<&str> = out.files().iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["p/Zeta.h", "p/Zeta.m", "p/Alpha.h", "p/Alpha.m", "p/Mid.h", "p/Mid.m"]
    );
    assert!(out.combined.is_none());
    assert!(out.has_errors().is_none());
}

#[test]
fn header_mapping_lists_each_exported_type() {
    let mut outer = class("p.Outer");
    outer
        .nested
        .push(TypeDecl::new(QualifiedName::top_level("p.Outer").nested("Inner"), TypeKind::Class));
    let units = vec![unit("p/Outer.java", "p", outer), unit("p/Other.java", "p", class("p.Other"))];
    let out = Session::default().translate(&units).unwrap();
    assert_eq!(
        out.header_mapping.to_string(),
        "p.Other=p/Other.h\np.Outer=p/Outer.h\np.Outer.Inner=p/Outer.h\n"
    );
}

#[test]
fn types_of_other_units_are_known() {
    let mut sub = class("p.Sub");
    sub.superclass = Some(DeclaredType::new(QualifiedName::top_level("p.Base")));
    let units = vec![unit("p/Sub.java", "p", sub), unit("p/Base.java", "p", class("p.Base"))];
    let out = Session::default().translate(&units).unwrap();
    let header = &out.files()[0].text;
    assert!(header.contains("#include \"p/Base.h\"\n"));
    assert!(header.contains("@interface PSub : PBase\n"));
}

// ── Failures ──

#[test]
fn failed_units_do_not_stop_the_batch() {
    let units = vec![
        unit("p/Good.java", "p", class("p.Good")),
        unit("p/Broken.java", "p", colliding_selectors("p.Broken")),
        unit("p/Fine.java", "p", class("p.Fine")),
    ];
    let out = Session::default().translate(&units).unwrap();
    assert!(!out.units[0].is_failed());
    assert!(out.units[1].is_failed());
    assert!(!out.units[2].is_failed());
    assert!(out.units[1].types().is_empty());
    assert_eq!(out.error_count(), 1);
    assert!(out.has_errors().is_some());

    let diags = out.units[1].diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, ErrorCode::E5002);

    let paths: Vec<&str> = out.files().iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["p/Good.h", "p/Good.m", "p/Fine.h", "p/Fine.m"]);
    assert!(out.header_mapping.get(&QualifiedName::top_level("p.Broken")).is_none());
}

#[test]
fn name_collisions_fail_the_later_unit() {
    let units = vec![
        unit("a/b/CD.java", "a.b", class("a.b.CD")),
        unit("a/b/c/D.java", "a.b.c", class("a.b.c.D")),
    ];
    let out = Session::default().translate(&units).unwrap();
    assert!(!out.units[0].is_failed());
    assert_eq!(out.units[1].diagnostics()[0].code, ErrorCode::E5003);
}

#[test]
fn internal_errors_abort_the_batch() {
    let mut bad = class("p.Bad");
    bad.members
        .push(Member::Field(field("value", ResolvedType::Null, Modifiers::PRIVATE)));
    let units = vec![unit("p/Good.java", "p", class("p.Good")), unit("p/Bad.java", "p", bad)];
    let err = Session::default().translate(&units).unwrap_err();
    let BatchError::Internal { unit, diagnostic } = err;
    assert_eq!(unit, "p/Bad.java");
    assert_eq!(diagnostic.code, ErrorCode::E9001);
}

#[test]
fn diagnostics_render_with_file_positions() {
    let units = vec![unit("p/Broken.java", "p", colliding_selectors("p.Broken"))];
    let out = Session::default().translate(&units).unwrap();
    let text = out.render_diagnostics(&units);
    assert!(text.starts_with("p/Broken.java:1:1: error[E5002]: "), "{text}");
    assert!(text.ends_with('\n'));
}

// ── Combined output ──

#[test]
fn combined_output_orders_supertypes_across_units() {
    let mut sub = class("p.Sub");
    sub.superclass = Some(DeclaredType::new(QualifiedName::top_level("p.Base")));
    let units = vec![unit("p/Sub.java", "p", sub), unit("p/Base.java", "p", class("p.Base"))];
    let session = Session::new(Options::default()).with_combine(CombineMode::Combined {
        name: "All".to_owned(),
    });
    let out = session.translate(&units).unwrap();

    let paths: Vec<&str> = out.files().iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["All.h", "All.m"]);
    let header = &out.files()[0].text;
    let base = header.find("@interface PBase : NSObject");
    let sub = header.find("@interface PSub : PBase");
    assert!(base.is_some() && base < sub);
    assert!(header.contains("//  source: p/Sub.java\n//  source: p/Base.java\n"));
    assert!(out.order_notes.is_empty());
    assert_eq!(out.header_mapping.to_string(), "p.Base=All.h\np.Sub=All.h\n");
}

#[test]
fn combined_output_skips_failed_units() {
    let units = vec![
        unit("p/Good.java", "p", class("p.Good")),
        unit("p/Broken.java", "p", colliding_selectors("p.Broken")),
    ];
    let session = Session::default().with_combine(CombineMode::Combined {
        name: "All".to_owned(),
    });
    let out = session.translate(&units).unwrap();
    let header = &out.files()[0].text;
    assert!(!header.contains("p/Broken.java"));
    assert!(!header.contains("PBroken"));
    assert_eq!(out.header_mapping.len(), 1);
}
