#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use xlat_ir::builder::{constructor, field, UnitBuilder};
use xlat_ir::{
    Capture, CompilationUnit, Constant, Member, Param, QualifiedName, TypeDecl,
};

use super::*;
use crate::{NameTable, Options, TypeIndex};

fn with_plan<R>(unit: &CompilationUnit, f: impl FnOnce(&UnitContext<'_>, TypePlan<'_>) -> R) -> R {
    let options = Options::default();
    let names = NameTable::new(&options);
    let index = TypeIndex::build([unit], &options);
    let cx = UnitContext::new(unit, &names, &index, &options);
    let plan = TypePlan::build(&cx, &unit.types[0]).unwrap();
    f(&cx, plan)
}

fn example() -> TypeDecl {
    TypeDecl::new(QualifiedName::top_level("unit.Example"), TypeKind::Class)
}

#[test]
fn classes_without_constructors_get_a_default() {
    let mut b = UnitBuilder::new("unit/Example.java", "unit");
    b.add_type(example());
    let unit = b.finish();
    with_plan(&unit, |_, plan| {
        assert_eq!(plan.constructors.len(), 1);
        assert_eq!(plan.constructors[0].selector, "init");
        assert_eq!(plan.constructors[0].function, "UnitExample_init");
        assert!(plan.constructors[0].decl.is_none());
        assert!(!plan.needs_initialize);
    });
}

#[test]
fn methods_are_ordered_and_functions_assigned() {
    let mut decl = example();
    let mut stat = MethodDecl::new("make", ResolvedType::INT);
    stat.modifiers |= Modifiers::STATIC;
    let mut private = MethodDecl::new("helper", ResolvedType::VOID);
    private.modifiers = Modifiers::PRIVATE;
    let mut foo = MethodDecl::new("foo", ResolvedType::VOID);
    foo.params.push(Param::new("i", ResolvedType::INT));
    decl.members.push(Member::Method(foo));
    decl.members.push(Member::Method(stat));
    decl.members.push(Member::Method(private));
    decl.members
        .push(Member::Constructor(constructor(vec![Param::new("x", ResolvedType::INT)], None)));
    let mut b = UnitBuilder::new("unit/Example.java", "unit");
    b.add_type(decl);
    let unit = b.finish();
    with_plan(&unit, |_, plan| {
        let selectors: Vec<&str> = plan.methods.iter().map(|m| m.selector.as_str()).collect();
        assert_eq!(selectors, ["fooWithInt:", "helper", "make"]);
        assert_eq!(plan.methods[0].function, None);
        assert_eq!(plan.methods[1].function.as_deref(), Some("UnitExample_helper"));
        assert_eq!(plan.methods[2].function.as_deref(), Some("UnitExample_make"));
        assert_eq!(plan.constructors[0].selector, "initWithInt:");
    });
}

#[test]
fn synthetic_ivars_precede_fields() {
    let outer = QualifiedName::top_level("unit.Example");
    let mut inner = TypeDecl::new(outer.nested("1"), TypeKind::Class);
    inner.nesting = Nesting::Anonymous;
    inner.captures_outer = true;
    inner.captures.push(Capture {
        name: "x".to_owned(),
        ty: ResolvedType::string(),
    });
    inner
        .members
        .push(Member::Field(field("count", ResolvedType::INT, Modifiers::PRIVATE)));
    let mut top = example();
    top.nested.push(inner.clone());
    let mut unit = CompilationUnit::new("unit/Example.java", "unit");
    unit.types.push(top);
    let options = Options::default();
    let names = NameTable::new(&options);
    let index = TypeIndex::build([&unit], &options);
    let cx = UnitContext::new(&unit, &names, &index, &options);
    let plan = TypePlan::build(&cx, &unit.types[0].nested[0]).unwrap();
    let ivars: Vec<&str> = plan.ivars.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(ivars, ["this$0_", "val$x_", "count_"]);
    assert!(!plan.in_header);
    assert_eq!(plan.constructors[0].selector, "initWithUnitExample:withNSString:");
    assert!(plan.has_private_ivars(&cx));
}

#[test]
fn static_state_decides_initialization() {
    let mut b = UnitBuilder::new("unit/Example.java", "unit");
    let literal = b.int(3);
    let call = b.call(
        None,
        xlat_ir::builder::method_ref(
            xlat_ir::builder::class_ref("unit.Other"),
            "compute",
            vec![],
            ResolvedType::INT,
        ),
        &[],
    );
    let mut plain = example();
    let mut f = field("A", ResolvedType::INT, Modifiers::STATIC);
    f.initializer = Some(literal);
    plain.members.push(Member::Field(f));
    let mut constant = field("B", ResolvedType::INT, Modifiers::STATIC | Modifiers::FINAL);
    constant.constant = Some(Constant::Int(4));
    constant.initializer = Some(call);
    plain.members.push(Member::Field(constant));
    b.add_type(plain);
    let unit = b.finish();
    with_plan(&unit, |_, plan| {
        assert_eq!(plan.static_fields.len(), 2);
        assert!(!plan.needs_initialize);
    });

    let mut b = UnitBuilder::new("unit/Example.java", "unit");
    let call = b.call(
        None,
        xlat_ir::builder::method_ref(
            xlat_ir::builder::class_ref("unit.Other"),
            "compute",
            vec![],
            ResolvedType::INT,
        ),
        &[],
    );
    let mut dynamic = example();
    let mut f = field("C", ResolvedType::INT, Modifiers::STATIC);
    f.initializer = Some(call);
    dynamic.members.push(Member::Field(f));
    b.add_type(dynamic);
    let unit = b.finish();
    with_plan(&unit, |_, plan| assert!(plan.needs_initialize));
}

#[test]
fn enum_constructors_are_private_functions() {
    let mut b = UnitBuilder::new("unit/Color.java", "unit");
    b.add_type(TypeDecl::new(QualifiedName::top_level("unit.Color"), TypeKind::Enum));
    let unit = b.finish();
    with_plan(&unit, |_, plan| {
        assert!(plan.needs_initialize);
        let ctor = &plan.constructors[0];
        assert_eq!(ctor.selector, "initWithNSString:withInt:");
        assert!(ctor.is_function_only(plan.decl));
    });
}
