#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use xlat_diagnostic::ErrorCode;
use xlat_ir::builder::{class_ref, method_ref, UnitBuilder};
use xlat_ir::{
    DeclaredType, Member, MethodDecl, Modifiers, Param, ResolvedType, TypeDecl, TypeKind,
};

use super::*;

fn name(dotted: &str) -> QualifiedName {
    QualifiedName::top_level(dotted)
}

fn example() -> TypeDecl {
    TypeDecl::new(name("unit.Example"), TypeKind::Class)
}

fn translate_with(unit: &CompilationUnit, options: &Options) -> Result<UnitOutput, TranslateError> {
    let mut names = NameTable::new(options);
    names.register(unit)?;
    let index = TypeIndex::build([unit], options);
    translate_unit(unit, &names, &index, options)
}

fn translate(unit: &CompilationUnit) -> Result<UnitOutput, TranslateError> {
    translate_with(unit, &Options::default())
}

fn single(decl: TypeDecl) -> CompilationUnit {
    let mut b = UnitBuilder::new("unit/Example.java", "unit");
    b.add_type(decl);
    b.finish()
}

// ── Units ──

#[test]
fn unit_produces_header_and_implementation() {
    let out = translate(&single(example())).unwrap();
    assert_eq!(out.types.len(), 1);
    assert_eq!(out.types[0].objc_name, "UnitExample");
    assert_eq!(out.types[0].header, "unit/Example.h");
    assert!(out.types[0].exported);
    assert!(out.warnings.is_empty());

    let paths: Vec<&str> = out.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["unit/Example.h", "unit/Example.m"]);
    assert!(out.files[0].text.contains("@interface UnitExample : NSObject\n"));
    assert!(out.files[0].text.contains("J2OBJC_TYPE_LITERAL_HEADER(UnitExample)\n"));
    assert!(out.files[1].text.contains("@implementation UnitExample\n"));
    assert!(out.files[1].text.contains("+ (const J2ObjcClassInfo *)__metadata {\n"));
    assert!(out.files[1]
        .text
        .contains("J2OBJC_CLASS_TYPE_LITERAL_SOURCE(UnitExample)\n"));
}

#[test]
fn supertypes_in_the_unit_are_declared_first() {
    let mut sub = TypeDecl::new(name("unit.Sub"), TypeKind::Class);
    sub.superclass = Some(DeclaredType::new(name("unit.Base")));
    let mut b = UnitBuilder::new("unit/Example.java", "unit");
    b.add_type(sub);
    b.add_type(TypeDecl::new(name("unit.Base"), TypeKind::Class));
    let out = translate(&b.finish()).unwrap();
    let order: Vec<&str> = out.types.iter().map(|t| t.objc_name.as_str()).collect();
    assert_eq!(order, vec!["UnitBase", "UnitSub"]);

    let header = &out.files[0].text;
    let base = header.find("@interface UnitBase : NSObject");
    let sub = header.find("@interface UnitSub : UnitBase");
    assert!(base.is_some() && base < sub);
    assert!(header.contains(
        "#ifdef INCLUDE_UnitSub\n\
         #define INCLUDE_UnitBase 1\n\
         #endif\n"
    ));
    assert!(!header.contains("#include \"unit/Example.h\""));
}

#[test]
fn nested_types_follow_their_outer_type() {
    let mut outer = example();
    outer.nested.push(TypeDecl::new(name("unit.Example").nested("Inner"), TypeKind::Class));
    let out = translate(&single(outer)).unwrap();
    let order: Vec<&str> = out.types.iter().map(|t| t.objc_name.as_str()).collect();
    assert_eq!(order, vec!["UnitExample", "UnitExample_Inner"]);
}

#[test]
fn body_references_become_includes() {
    let mut b = UnitBuilder::new("unit/Example.java", "unit");
    let mut shuffle = method_ref(class_ref("java.util.Collections"), "shuffle", vec![], ResolvedType::VOID);
    shuffle.modifiers |= Modifiers::STATIC;
    let call = b.call(None, shuffle, &[]);
    let stmt = b.expr_stmt(call);
    let block = b.block(&[stmt]);
    let mut decl = example();
    let mut run = MethodDecl::new("run", ResolvedType::VOID);
    run.body = Some(block);
    decl.members.push(Member::Method(run));
    b.add_type(decl);
    let out = translate(&b.finish()).unwrap();
    assert!(out.types[0].body_includes.contains("java/util/Collections.h"));
    assert!(out.files[1].text.contains("#include \"java/util/Collections.h\"\n"));
    assert!(!out.files[0].text.contains("java/util/Collections.h"));
}

#[test]
fn deprecated_calls_are_warnings() {
    let mut b = UnitBuilder::new("unit/Example.java", "unit");
    let mut old = method_ref(class_ref("unit.Legacy"), "old", vec![], ResolvedType::VOID);
    old.deprecated = true;
    let receiver = b.local("legacy", ResolvedType::class(name("unit.Legacy")));
    let call = b.call(Some(receiver), old, &[]);
    let stmt = b.expr_stmt(call);
    let block = b.block(&[stmt]);
    let mut decl = example();
    let mut run = MethodDecl::new("run", ResolvedType::VOID);
    run.params.push(Param::new("legacy", ResolvedType::class(name("unit.Legacy"))));
    run.body = Some(block);
    decl.members.push(Member::Method(run));
    b.add_type(decl);
    let out = translate(&b.finish()).unwrap();
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].code, ErrorCode::W5001);
    assert!(!out.files.is_empty());
}

// ── Failures ──

#[test]
fn colliding_selectors_fail_the_whole_unit() {
    let mut broken = TypeDecl::new(name("unit.Broken"), TypeKind::Class);
    for _ in 0..2 {
        let mut foo = MethodDecl::new("foo", ResolvedType::VOID);
        foo.params.push(Param::new("i", ResolvedType::INT));
        broken.members.push(Member::Method(foo));
    }
    let mut b = UnitBuilder::new("unit/Example.java", "unit");
    b.add_type(example());
    b.add_type(broken);
    let err = translate(&b.finish()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E5002);
}

#[test]
fn duplicate_interfaces_fail() {
    let mut decl = example();
    let runnable = DeclaredType::new(name("java.lang.Runnable"));
    decl.interfaces = vec![runnable.clone(), runnable];
    let err = translate(&single(decl)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E5009);
}

// ── Artifacts ──

#[test]
fn artifacts_are_kept_per_type() {
    let out = translate(&single(example())).unwrap();
    let ty = &out.types[0];
    assert!(ty.declaration.text.starts_with("@interface UnitExample : NSObject\n"));
    assert!(ty.implementation.text.starts_with("@implementation UnitExample\n"));
    assert_eq!(ty.private_declaration.text, "");
    assert_eq!(ty.deps().name, name("unit.Example"));
    assert!(ty.supertypes.is_empty());
}

#[test]
fn stripped_reflection_has_no_metadata() {
    let options = Options {
        strip_reflection: true,
        ..Options::default()
    };
    let out = translate_with(&single(example()), &options).unwrap();
    assert!(!out.files[1].text.contains("__metadata"));
}
