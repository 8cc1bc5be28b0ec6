#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use xlat_ir::builder::{field, UnitBuilder};
use xlat_ir::{
    AnnotationValue, BinaryOp, CompilationUnit, DeclaredType, EnumConstantDecl, ExprRange,
    InitializerDecl, MethodDecl, Param, QualifiedName, Span, TypeDecl,
};

use super::*;
use crate::{MemoryManagement, NameTable, Options, TypeIndex};

fn implement_with(
    unit: &CompilationUnit,
    options: &Options,
    position: usize,
) -> Result<(String, String), TranslateError> {
    let names = NameTable::new(options);
    let index = TypeIndex::build([unit], options);
    let cx = UnitContext::new(unit, &names, &index, options);
    let plan = TypePlan::build(&cx, &unit.types[position])?;
    let implementation = implement_type(&cx, &plan)?;
    Ok((
        implementation.private.as_str().to_owned(),
        implementation.body.as_str().to_owned(),
    ))
}

fn stripped() -> Options {
    Options {
        strip_reflection: true,
        ..Options::default()
    }
}

/// Implementation part without reflection metadata.
fn body(unit: &CompilationUnit) -> String {
    implement_with(unit, &stripped(), 0).unwrap().1
}

fn private(unit: &CompilationUnit) -> String {
    implement_with(unit, &stripped(), 0).unwrap().0
}

fn name(dotted: &str) -> QualifiedName {
    QualifiedName::top_level(dotted)
}

fn example() -> TypeDecl {
    TypeDecl::new(name("unit.Example"), TypeKind::Class)
}

fn builder() -> UnitBuilder {
    UnitBuilder::new("unit/Example.java", "unit")
}

fn single(decl: TypeDecl) -> CompilationUnit {
    let mut b = builder();
    b.add_type(decl);
    b.finish()
}

// ── Classes ──

#[test]
fn empty_class() {
    let unit = single(example());
    assert_eq!(private(&unit), "");
    assert_eq!(
        body(&unit),
        "@implementation UnitExample\n\
         \n\
         - (instancetype)init {\n\
         \x20 UnitExample_init(self);\n\
         \x20 return self;\n\
         }\n\
         \n\
         @end\n\
         \n\
         void UnitExample_init(UnitExample *self) {\n\
         \x20 NSObject_init(self);\n\
         }\n\
         \n\
         UnitExample *new_UnitExample_init(void) {\n\
         \x20 J2OBJC_NEW_IMPL(UnitExample, init)\n\
         }\n\
         \n\
         UnitExample *create_UnitExample_init(void) {\n\
         \x20 J2OBJC_CREATE_IMPL(UnitExample, init)\n\
         }\n\
         \n\
         J2OBJC_CLASS_TYPE_LITERAL_SOURCE(UnitExample)\n"
    );
}

#[test]
fn reflection_metadata_closes_the_implementation() {
    let unit = single(example());
    let (_, text) = implement_with(&unit, &Options::default(), 0).unwrap();
    let metadata = text.find("+ (const J2ObjcClassInfo *)__metadata {").unwrap();
    let end = text.find("@end").unwrap();
    assert!(metadata < end, "{text}");
    assert!(text.contains("  return &_UnitExample;\n}\n\n@end\n"), "{text}");
}

#[test]
fn instance_methods_carry_their_bodies() {
    let mut b = builder();
    let one = b.int(1);
    let ret = b.ret(Some(one));
    let block = b.block(&[ret]);
    let mut decl = example();
    let mut get = MethodDecl::new("get", ResolvedType::INT);
    get.body = Some(block);
    decl.members.push(Member::Method(get));
    b.add_type(decl);
    let text = body(&b.finish());
    assert!(text.contains("- (jint)get {\n  return 1;\n}\n"), "{text}");
}

#[test]
fn static_methods_forward_to_functions() {
    let mut b = builder();
    let x = b.local("x", ResolvedType::INT);
    let ret = b.ret(Some(x));
    let block = b.block(&[ret]);
    let mut decl = example();
    let mut twice = MethodDecl::new("twice", ResolvedType::INT);
    twice.modifiers |= Modifiers::STATIC;
    twice.params.push(Param::new("x", ResolvedType::INT));
    twice.body = Some(block);
    decl.members.push(Member::Method(twice));
    b.add_type(decl);
    let text = body(&b.finish());
    assert!(
        text.contains("+ (jint)twiceWithInt:(jint)x {\n  return UnitExample_twiceWithInt_(x);\n}\n"),
        "{text}"
    );
    assert!(
        text.contains("jint UnitExample_twiceWithInt_(jint x) {\n  UnitExample_initialize();\n  return x;\n}\n"),
        "{text}"
    );
}

#[test]
fn private_methods_are_declared_in_the_extension() {
    let mut b = builder();
    let block = b.block(&[]);
    let mut decl = example();
    let mut helper = MethodDecl::new("helper", ResolvedType::VOID);
    helper.modifiers = Modifiers::PRIVATE;
    helper.body = Some(block);
    decl.members.push(Member::Method(helper));
    b.add_type(decl);
    let unit = b.finish();
    let (private, text) = implement_with(&unit, &stripped(), 0).unwrap();
    assert_eq!(
        private,
        "@interface UnitExample ()\n\
         \n\
         - (void)helper;\n\
         \n\
         @end\n\
         \n\
         __attribute__((unused)) static void UnitExample_helper(UnitExample *self);\n\
         \n"
    );
    assert!(text.contains("- (void)helper {\n  UnitExample_helper(self);\n}\n"), "{text}");
    assert!(text.contains("void UnitExample_helper(UnitExample *self) {\n}\n"), "{text}");
}

#[test]
fn abstract_methods_do_not_recognize_their_selector() {
    let mut decl = example();
    decl.modifiers |= Modifiers::ABSTRACT;
    let mut size = MethodDecl::new("size", ResolvedType::INT);
    size.modifiers |= Modifiers::ABSTRACT;
    decl.members.push(Member::Method(size));
    let text = body(&single(decl));
    assert!(
        text.contains(
            "- (jint)size {\n\
             \x20 // can't call an abstract method\n\
             \x20 [self doesNotRecognizeSelector:_cmd];\n\
             \x20 return 0;\n\
             }\n"
        ),
        "{text}"
    );
    assert!(!text.contains("new_UnitExample_init"), "{text}");
}

#[test]
fn synchronized_methods_lock_the_receiver() {
    let mut b = builder();
    let one = b.int(1);
    let ret = b.ret(Some(one));
    let block = b.block(&[ret]);
    let mut decl = example();
    let mut next = MethodDecl::new("next", ResolvedType::INT);
    next.modifiers |= Modifiers::SYNCHRONIZED;
    next.body = Some(block);
    decl.members.push(Member::Method(next));
    b.add_type(decl);
    let text = body(&b.finish());
    assert!(
        text.contains("- (jint)next {\n  @synchronized(self) {\n    return 1;\n  }\n}\n"),
        "{text}"
    );
}

// ── Fields ──

fn fields_unit() -> CompilationUnit {
    let mut b = builder();
    let three = b.int(3);
    let x = b.string("x");
    let mut decl = example();
    let mut count = field("count", ResolvedType::INT, Modifiers::PRIVATE);
    count.initializer = Some(three);
    let mut label = field("label", ResolvedType::string(), Modifiers::PUBLIC);
    label.initializer = Some(x);
    decl.members.push(Member::Field(count));
    decl.members.push(Member::Field(label));
    b.add_type(decl);
    b.finish()
}

#[test]
fn constructors_run_field_initializers() {
    let text = body(&fields_unit());
    assert!(
        text.contains(
            "void UnitExample_init(UnitExample *self) {\n\
             \x20 NSObject_init(self);\n\
             \x20 self->count_ = 3;\n\
             \x20 JreStrongAssign(&self->label_, @\"x\");\n\
             }\n"
        ),
        "{text}"
    );
}

#[test]
fn reference_counting_releases_strong_ivars() {
    let unit = fields_unit();
    let text = body(&unit);
    assert!(
        text.contains("- (void)dealloc {\n  RELEASE_(label_);\n  [super dealloc];\n}\n"),
        "{text}"
    );

    let options = Options {
        memory_management: MemoryManagement::Arc,
        ..stripped()
    };
    let (_, text) = implement_with(&unit, &options, 0).unwrap();
    assert!(!text.contains("dealloc"), "{text}");
    assert!(text.contains("  self->label_ = @\"x\";\n"), "{text}");
}

#[test]
fn private_ivars_go_to_the_class_extension() {
    let text = private(&fields_unit());
    assert!(
        text.starts_with("@interface UnitExample () {\n @public\n  jint count_;\n}\n\n@end\n"),
        "{text}"
    );
}

#[test]
fn static_initialization() {
    let mut b = builder();
    let one = b.int(1);
    let two = b.int(2);
    let sum = b.binary(BinaryOp::Add, one, two, ResolvedType::INT);
    let mut decl = example();
    let mut total = field("total", ResolvedType::INT, Modifiers::PUBLIC | Modifiers::STATIC);
    total.initializer = Some(sum);
    decl.members.push(Member::Field(total));
    let mut hidden = field("hidden", ResolvedType::INT, Modifiers::PRIVATE | Modifiers::STATIC);
    hidden.initializer = Some(b.int(7));
    decl.members.push(Member::Field(hidden));
    b.add_type(decl);
    let unit = b.finish();
    let (private, text) = implement_with(&unit, &stripped(), 0).unwrap();
    assert!(text.starts_with("J2OBJC_INITIALIZED_DEFN(UnitExample)\n\njint UnitExample_total;\n\n"), "{text}");
    assert!(
        text.contains(
            "+ (void)initialize {\n\
             \x20 if (self == [UnitExample class]) {\n\
             \x20   UnitExample_total = 1 + 2;\n\
             \x20   J2OBJC_SET_INITIALIZED(UnitExample)\n\
             \x20 }\n\
             }\n"
        ),
        "{text}"
    );
    assert!(private.contains("static jint UnitExample_hidden = 7;\n"), "{private}");
    assert!(!text.contains("UnitExample_hidden"), "{text}");
}

#[test]
fn static_blocks_run_in_initialize() {
    let mut b = builder();
    let zero = b.int(0);
    let local = b.local_decl("n", ResolvedType::INT, Some(zero));
    let block = b.block(&[local]);
    let mut decl = example();
    decl.members.push(Member::Initializer(InitializerDecl {
        is_static: true,
        body: block,
        span: Span::DUMMY,
    }));
    b.add_type(decl);
    let text = body(&b.finish());
    assert!(text.contains("    {\n      jint n = 0;\n    }\n    J2OBJC_SET_INITIALIZED(UnitExample)\n"), "{text}");
}

// ── Enums ──

fn color(with_body: bool) -> TypeDecl {
    let mut decl = TypeDecl::new(name("unit.Color"), TypeKind::Enum);
    for constant in ["RED", "GREEN"] {
        decl.members.push(Member::EnumConstant(EnumConstantDecl {
            name: constant.to_owned(),
            args: ExprRange::EMPTY,
            ctor: None,
            body_type: with_body.then(|| name("unit.Color").nested("1")),
            annotations: Vec::new(),
            doc: None,
            span: Span::DUMMY,
        }));
    }
    decl
}

#[test]
fn enum_implementation() {
    let unit = single(color(false));
    let (private, text) = implement_with(&unit, &stripped(), 0).unwrap();
    assert!(
        private.contains(
            "__attribute__((unused)) static void UnitColor_initWithNSString_withInt_(UnitColor *self, NSString *__name, jint __ordinal);\n"
        ),
        "{private}"
    );
    assert!(text.contains("UnitColor *UnitColor_values_[2];\n"), "{text}");
    assert!(
        text.contains(
            "    UnitColor_values_[0] = new_UnitColor_initWithNSString_withInt_(@\"RED\", 0);\n\
             \x20   UnitColor_values_[1] = new_UnitColor_initWithNSString_withInt_(@\"GREEN\", 1);\n"
        ),
        "{text}"
    );
    assert!(
        text.contains("  JavaLangEnum_initWithNSString_withInt_(self, __name, __ordinal);\n"),
        "{text}"
    );
    assert!(text.contains("- (UnitColor_Enum)toNSEnum {\n  return (UnitColor_Enum)[self ordinal];\n}\n"), "{text}");
    assert!(text.contains("UnitColor *UnitColor_fromOrdinal(jint ordinal) {\n"), "{text}");
    assert!(
        text.contains("  @throw create_JavaLangIllegalArgumentException_initWithNSString_(name);\n"),
        "{text}"
    );
    assert!(!text.contains("- (instancetype)init"), "{text}");
}

#[test]
fn enum_constant_bodies_are_unsupported() {
    let unit = single(color(true));
    let err = implement_with(&unit, &stripped(), 0).err().unwrap();
    assert!(
        matches!(err, TranslateError::Unsupported { kind: "enum constant with a class body", .. }),
        "{err:?}"
    );
}

// ── Interfaces ──

fn greeter() -> (UnitBuilder, TypeDecl) {
    let mut b = builder();
    let block = b.block(&[]);
    let mut decl = TypeDecl::new(name("unit.Greeter"), TypeKind::Interface);
    let mut greet = MethodDecl::new("greet", ResolvedType::VOID);
    greet.body = Some(block);
    decl.members.push(Member::Method(greet));
    (b, decl)
}

#[test]
fn interfaces_without_statics_have_no_class() {
    let mut decl = TypeDecl::new(name("unit.Shape"), TypeKind::Interface);
    let mut area = MethodDecl::new("area", ResolvedType::DOUBLE);
    area.modifiers |= Modifiers::ABSTRACT;
    decl.members.push(Member::Method(area));
    let unit = single(decl);
    assert_eq!(private(&unit), "");
    assert_eq!(body(&unit), "J2OBJC_INTERFACE_TYPE_LITERAL_SOURCE(UnitShape)\n");
}

#[test]
fn default_methods_are_functions() {
    let (mut b, decl) = greeter();
    b.add_type(decl);
    let text = body(&b.finish());
    assert!(!text.contains("@implementation"), "{text}");
    assert!(text.contains("void UnitGreeter_greet(id<UnitGreeter> self) {\n}\n"), "{text}");
}

#[test]
fn implementing_classes_get_default_method_shims() {
    let (mut b, interface) = greeter();
    let mut decl = example();
    decl.interfaces.push(DeclaredType::new(name("unit.Greeter")));
    b.add_type(decl);
    b.add_type(interface);
    let text = body(&b.finish());
    assert!(text.contains("- (void)greet {\n  UnitGreeter_greet(self);\n}\n"), "{text}");
}

#[test]
fn overriding_suppresses_the_shim() {
    let (mut b, interface) = greeter();
    let block = b.block(&[]);
    let mut decl = example();
    decl.interfaces.push(DeclaredType::new(name("unit.Greeter")));
    let mut greet = MethodDecl::new("greet", ResolvedType::VOID);
    greet.body = Some(block);
    decl.members.push(Member::Method(greet));
    b.add_type(decl);
    b.add_type(interface);
    let text = body(&b.finish());
    assert!(!text.contains("UnitGreeter_greet"), "{text}");
}

// ── Annotation types ──

#[test]
fn annotation_type_implementation() {
    let mut decl = TypeDecl::new(name("unit.Tag"), TypeKind::Annotation);
    let mut value = MethodDecl::new("value", ResolvedType::INT);
    value.modifiers |= Modifiers::ABSTRACT;
    value.default_value = Some(AnnotationValue::Int(5));
    let mut label = MethodDecl::new("label", ResolvedType::string());
    label.modifiers |= Modifiers::ABSTRACT;
    decl.members.push(Member::Method(value));
    decl.members.push(Member::Method(label));
    let text = body(&single(decl));
    assert!(
        text.starts_with(
            "@implementation UnitTag\n\
             \n\
             @synthesize label = label_;\n\
             @synthesize value = value_;\n\
             \n\
             + (jint)valueDefault {\n\
             \x20 return UnitTag_valueDefault();\n\
             }\n"
        ),
        "{text}"
    );
    assert!(text.contains("- (NSString *)description {\n  return @\"@unit.Tag()\";\n}\n"), "{text}");
    assert!(text.contains("  RELEASE_(label_);\n"), "{text}");
    assert!(text.contains("jint UnitTag_valueDefault(void) {\n  return 5;\n}\n"), "{text}");
    assert!(
        text.contains(
            "id<UnitTag> create_UnitTag(NSString *label, jint value) {\n\
             \x20 UnitTag *self = AUTORELEASE([[UnitTag alloc] init]);\n\
             \x20 self->label_ = RETAIN_(label);\n\
             \x20 self->value_ = value;\n\
             \x20 return self;\n\
             }\n"
        ),
        "{text}"
    );
    assert!(text.ends_with("J2OBJC_INTERFACE_TYPE_LITERAL_SOURCE(UnitTag)\n"), "{text}");
}

#[test]
fn package_prefixes_register_a_name_mapping() {
    let mut options = stripped();
    options
        .package_prefixes
        .insert("unit".to_owned(), "UT".to_owned());
    let unit = single(example());
    let (_, text) = implement_with(&unit, &options, 0).unwrap();
    assert!(
        text.ends_with("J2OBJC_CLASS_TYPE_LITERAL_SOURCE(UTExample)\n\nJ2OBJC_NAME_MAPPING(UTExample, \"unit\", \"UT\")\n"),
        "{text}"
    );
}
