#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use xlat_ir::builder::{field, UnitBuilder};
use xlat_ir::{
    ArrayType, CompilationUnit, EnumConstantDecl, Member, MethodDecl, Param, Span, TypeDecl,
};

use super::*;
use crate::{NameTable, Options, TypeIndex};

fn with_cx<R>(unit: &CompilationUnit, f: impl FnOnce(&UnitContext<'_>) -> R) -> R {
    let options = Options::default();
    let names = NameTable::new(&options);
    let index = TypeIndex::build([unit], &options);
    let cx = UnitContext::new(unit, &names, &index, &options);
    f(&cx)
}

fn metadata_of(unit: &CompilationUnit) -> (String, Vec<String>, String) {
    with_cx(unit, |cx| {
        let plan = TypePlan::build(cx, &unit.types[0]).unwrap();
        let meta = build(cx, &plan).unwrap();
        (
            meta.method.as_str().to_owned(),
            meta.prototypes,
            meta.functions.as_str().to_owned(),
        )
    })
}

fn example() -> TypeDecl {
    TypeDecl::new(QualifiedName::top_level("unit.Example"), TypeKind::Class)
}

fn unit_of(decls: Vec<TypeDecl>) -> CompilationUnit {
    let mut b = UnitBuilder::new("unit/Example.java", "unit");
    for decl in decls {
        b.add_type(decl);
    }
    b.finish()
}

/// `@interface Tag { int value() default 5; String name(); }`
fn tag() -> TypeDecl {
    let mut decl = TypeDecl::new(QualifiedName::top_level("unit.Tag"), TypeKind::Annotation);
    let mut value = MethodDecl::new("value", ResolvedType::INT);
    value.modifiers |= Modifiers::ABSTRACT;
    value.default_value = Some(AnnotationValue::Int(5));
    let mut name = MethodDecl::new("name", ResolvedType::string());
    name.modifiers |= Modifiers::ABSTRACT;
    decl.members.push(Member::Method(value));
    decl.members.push(Member::Method(name));
    decl
}

// ── Modifiers ──

#[test]
fn modifier_bits_follow_reflection() {
    assert_eq!(modifier_flags(Modifiers::PUBLIC), 0x1);
    assert_eq!(modifier_flags(Modifiers::PRIVATE | Modifiers::STATIC | Modifiers::FINAL), 0x1a);
    assert_eq!(modifier_flags(Modifiers::PUBLIC | Modifiers::VARARGS), 0x81);
    assert_eq!(modifier_flags(Modifiers::empty()), 0);
}

#[test]
fn type_kinds_add_their_bits() {
    assert_eq!(type_flags(&example()), 0x1);
    let interface = TypeDecl::new(QualifiedName::top_level("unit.I"), TypeKind::Interface);
    assert_eq!(type_flags(&interface), 0x601);
    let e = TypeDecl::new(QualifiedName::top_level("unit.E"), TypeKind::Enum);
    assert_eq!(type_flags(&e), 0x4001);
    assert_eq!(type_flags(&tag()), 0x2601);
}

// ── Class info ──

#[test]
fn simple_class_metadata() {
    let mut decl = example();
    let mut foo = MethodDecl::new("foo", ResolvedType::VOID);
    foo.params.push(Param::new("i", ResolvedType::INT));
    decl.members.push(Member::Method(foo));
    decl.members
        .push(Member::Field(field("count", ResolvedType::INT, Modifiers::PRIVATE)));
    let (method, prototypes, functions) = metadata_of(&unit_of(vec![decl]));
    assert_eq!(
        method,
        "+ (const J2ObjcClassInfo *)__metadata {\n\
         \x20 static J2ObjcMethodInfo methods[] = {\n\
         \x20   { NULL, NULL, 0x1, -1, -1, -1, -1, -1, -1 },\n\
         \x20   { NULL, \"V\", 0x1, -1, 0, -1, -1, -1, -1 },\n\
         \x20 };\n\
         \x20 #pragma clang diagnostic push\n\
         \x20 #pragma clang diagnostic ignored \"-Wobjc-multiple-method-names\"\n\
         \x20 #pragma clang diagnostic ignored \"-Wundeclared-selector\"\n\
         \x20 methods[0].selector = @selector(init);\n\
         \x20 methods[1].selector = @selector(fooWithInt:);\n\
         \x20 #pragma clang diagnostic pop\n\
         \x20 static const J2ObjcFieldInfo fields[] = {\n\
         \x20   { \"count_\", \"I\", .constantValue.asLong = 0, 0x2, -1, -1, -1, -1 },\n\
         \x20 };\n\
         \x20 static const void *ptrTable[] = { \"I\" };\n\
         \x20 static const J2ObjcClassInfo _UnitExample = { \"Example\", \"unit\", ptrTable, methods, fields, 7, 0x1, 2, 1, -1, -1, -1, -1, -1 };\n\
         \x20 return &_UnitExample;\n\
         }\n"
    );
    assert!(prototypes.is_empty());
    assert!(functions.is_empty());
}

#[test]
fn renamed_methods_record_their_java_name() {
    let mut decl = example();
    decl.members
        .push(Member::Method(MethodDecl::new("hash", ResolvedType::INT)));
    let (method, _, _) = metadata_of(&unit_of(vec![decl]));
    assert!(method.contains("{ NULL, \"I\", 0x1, 0, -1, -1, -1, -1, -1 },"), "{method}");
    assert!(method.contains("ptrTable[] = { \"hash\" };"), "{method}");
}

#[test]
fn pointer_table_interns_repeated_entries() {
    let mut decl = example();
    for name in ["a", "b"] {
        let mut m = MethodDecl::new(name, ResolvedType::VOID);
        m.params.push(Param::new("s", ResolvedType::string()));
        decl.members.push(Member::Method(m));
    }
    let (method, _, _) = metadata_of(&unit_of(vec![decl]));
    assert!(method.contains("ptrTable[] = { \"LNSString;\" };"), "{method}");
    assert_eq!(method.matches("0x1, -1, 0, -1").count(), 2);
}

#[test]
fn constants_and_statics_in_field_table() {
    let mut decl = example();
    let mut max = field("MAX", ResolvedType::INT, Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL);
    max.constant = Some(Constant::Int(10));
    decl.members.push(Member::Field(max));
    decl.members.push(Member::Field(field(
        "shared",
        ResolvedType::string(),
        Modifiers::PUBLIC | Modifiers::STATIC,
    )));
    let (method, _, _) = metadata_of(&unit_of(vec![decl]));
    assert!(
        method.contains("{ \"MAX\", \"I\", .constantValue.asInt = 10, 0x19, -1, -1, -1, -1 },"),
        "{method}"
    );
    assert!(
        method.contains("{ \"shared\", \"LNSString;\", .constantValue.asLong = 0, 0x9, -1, 0, -1, -1 },"),
        "{method}"
    );
    assert!(method.contains("ptrTable[] = { &UnitExample_shared };"), "{method}");
}

#[test]
fn nested_types_name_their_enclosing_class() {
    let outer = QualifiedName::top_level("unit.Example");
    let mut top = example();
    let mut inner = TypeDecl::new(outer.nested("Inner"), TypeKind::Class);
    inner.nesting = xlat_ir::Nesting::Member;
    inner.modifiers |= Modifiers::STATIC;
    top.nested.push(inner);
    let unit = unit_of(vec![top]);
    let (method, _, _) = metadata_of(&unit);
    assert!(method.contains("ptrTable[] = { \"LUnitExample_Inner;\" };"), "{method}");
    assert!(method.contains("7, 0x1, 1, 0, -1, 0, -1, -1, -1 };"), "{method}");

    with_cx(&unit, |cx| {
        let plan = TypePlan::build(cx, &unit.types[0].nested[0]).unwrap();
        let meta = build(cx, &plan).unwrap();
        let text = meta.method.as_str();
        assert!(text.contains("ptrTable[] = { \"LUnitExample;\" };"), "{text}");
        assert!(text.contains("\"Inner\", \"unit\", ptrTable, methods, NULL, 7, 0x9, 1, 0, 0, -1,"), "{text}");
    });
}

#[test]
fn generic_classes_carry_a_signature() {
    let mut decl = example();
    decl.type_params.push(xlat_ir::TypeParam {
        name: "T".to_owned(),
        bounds: Vec::new(),
    });
    let (method, _, _) = metadata_of(&unit_of(vec![decl]));
    assert!(
        method.contains("\"<T:Ljava/lang/Object;>Ljava/lang/Object;\""),
        "{method}"
    );
}

#[test]
fn enums_list_values_and_constants() {
    let mut decl = TypeDecl::new(QualifiedName::top_level("unit.Color"), TypeKind::Enum);
    for name in ["RED", "GREEN"] {
        decl.members.push(Member::EnumConstant(EnumConstantDecl {
            name: name.to_owned(),
            args: xlat_ir::ExprRange::EMPTY,
            ctor: None,
            body_type: None,
            annotations: Vec::new(),
            doc: None,
            span: Span::DUMMY,
        }));
    }
    let (method, _, _) = metadata_of(&unit_of(vec![decl]));
    assert!(method.contains("{ NULL, \"[LUnitColor;\", 0x9, -1, -1, -1, -1, -1, -1 },"), "{method}");
    assert!(method.contains("@selector(valueOfWithNSString:)"), "{method}");
    assert!(
        method.contains("{ \"RED\", \"LUnitColor;\", .constantValue.asLong = 0, 0x4019, -1, 2, -1, -1 },"),
        "{method}"
    );
    assert!(method.contains("&UnitColor_values_[1]"), "{method}");
    assert!(method.contains(", 7, 0x4001, "), "{method}");
}

// ── Annotations ──

#[test]
fn deprecated_members_get_annotation_functions() {
    let mut decl = example();
    let mut old = MethodDecl::new("old", ResolvedType::VOID);
    old.annotations.push(Annotation::new(QualifiedName::top_level("java.lang.Deprecated")));
    decl.members.push(Member::Method(old));
    let (method, prototypes, functions) = metadata_of(&unit_of(vec![decl]));
    assert_eq!(prototypes, ["IOSObjectArray *UnitExample__Annotations$0(void)"]);
    assert!(method.contains("ptrTable[] = { (void *)&UnitExample__Annotations$0 };"), "{method}");
    assert!(method.contains("{ NULL, \"V\", 0x1, -1, -1, -1, -1, 0, -1 },"), "{method}");
    assert_eq!(
        functions,
        "IOSObjectArray *UnitExample__Annotations$0(void) {\n\
         \x20 return [IOSObjectArray arrayWithObjects:(id[]){ create_JavaLangDeprecated() } count:1 type:JavaLangAnnotationAnnotation_class_()];\n\
         }\n\n"
    );
}

#[test]
fn unknown_annotations_are_not_retained() {
    let mut decl = example();
    decl.annotations
        .push(Annotation::new(QualifiedName::top_level("other.Marker")));
    let (method, prototypes, _) = metadata_of(&unit_of(vec![decl]));
    assert!(prototypes.is_empty());
    assert!(method.ends_with("-1, -1, -1, -1, -1 };\n  return &_UnitExample;\n}\n"), "{method}");
}

#[test]
fn element_values() {
    let unit = unit_of(vec![example(), tag()]);
    with_cx(&unit, |cx| {
        assert_eq!(annotation_value(cx, &ResolvedType::INT, &AnnotationValue::Int(3)), "3");
        assert_eq!(
            annotation_value(cx, &ResolvedType::string(), &AnnotationValue::String("x".to_owned())),
            "@\"x\""
        );
        let color = QualifiedName::top_level("unit.Color");
        assert_eq!(
            annotation_value(
                cx,
                &ResolvedType::class(color.clone()),
                &AnnotationValue::Enum {
                    ty: color,
                    constant: "RED".to_owned(),
                }
            ),
            "JreLoadEnum(UnitColor, RED)"
        );
        let ints = ResolvedType::Array(ArrayType {
            element: Box::new(ResolvedType::INT),
            dimensions: 1,
        });
        assert_eq!(
            annotation_value(
                cx,
                &ints,
                &AnnotationValue::Array(vec![AnnotationValue::Int(1), AnnotationValue::Int(2)])
            ),
            "[IOSIntArray arrayWithInts:(jint[]){ 1, 2 } count:2]"
        );
        let strings = ResolvedType::array_of(ResolvedType::string(), 1);
        assert_eq!(
            annotation_value(cx, &strings, &AnnotationValue::Array(vec![AnnotationValue::String("a".to_owned())])),
            "[IOSObjectArray arrayWithObjects:(id[]){ @\"a\" } count:1 type:NSString_class_()]"
        );
    });
}

#[test]
fn empty_array_values_use_length_constructors() {
    let unit = unit_of(vec![example()]);
    with_cx(&unit, |cx| {
        let empty = AnnotationValue::Array(Vec::new());
        assert_eq!(
            annotation_value(cx, &ResolvedType::array_of(ResolvedType::INT, 1), &empty),
            "[IOSIntArray arrayWithLength:0]"
        );
        assert_eq!(
            annotation_value(cx, &ResolvedType::array_of(ResolvedType::string(), 1), &empty),
            "[IOSObjectArray arrayWithLength:0 type:NSString_class_()]"
        );
    });
}

#[test]
fn nested_annotations_fill_defaults_in_member_order() {
    let unit = unit_of(vec![example(), tag()]);
    with_cx(&unit, |cx| {
        let tag_name = QualifiedName::top_level("unit.Tag");
        let value = AnnotationValue::Annotation(Box::new(
            Annotation::new(tag_name.clone()).with_value("name", AnnotationValue::String("x".to_owned())),
        ));
        assert_eq!(
            annotation_value(cx, &ResolvedType::interface(tag_name.clone()), &value),
            "create_UnitTag(@\"x\", 5)"
        );
        let bare = AnnotationValue::Annotation(Box::new(Annotation::new(tag_name.clone())));
        assert_eq!(
            annotation_value(cx, &ResolvedType::interface(tag_name), &bare),
            "create_UnitTag(nil, 5)"
        );
    });
}

#[test]
fn batch_annotations_are_retained() {
    let mut decl = example();
    decl.annotations.push(Annotation::new(QualifiedName::top_level("unit.Tag")));
    let (method, prototypes, functions) = metadata_of(&unit_of(vec![decl, tag()]));
    assert_eq!(prototypes.len(), 1);
    assert!(functions.contains("{ create_UnitTag(nil, 5) }"), "{functions}");
    assert!(method.ends_with("-1, -1, -1, -1, 0 };\n  return &_UnitExample;\n}\n"), "{method}");
}

// ── Signatures ──

#[test]
fn erased_signatures_use_binary_names() {
    let inner = ResolvedType::class(QualifiedName::top_level("a.b.Outer").nested("Inner"));
    assert_eq!(erased_signature(&inner), "La/b/Outer$Inner;");
    assert_eq!(erased_signature(&ResolvedType::array_of(ResolvedType::INT, 2)), "[[I");
    assert_eq!(erased_signature(&ResolvedType::type_var("T", Vec::new())), "Ljava/lang/Object;");
}
