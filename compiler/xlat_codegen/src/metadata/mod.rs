//! Reflection metadata.
//!
//! Every class gets a `+__metadata` method returning a `J2ObjcClassInfo`:
//! method and field tables plus a pointer table of interned strings and
//! references (Java names that differ from the selector, parameter and
//! exception lists, generic signatures, enclosing and inner classes,
//! annotation functions). Runtime-visible annotations are materialized by
//! small functions returning an `IOSObjectArray` of annotation instances.

use rustc_hash::FxHashMap;
use xlat_ir::{
    Annotation, AnnotationValue, Constant, FieldDecl, MethodDecl, Modifiers, QualifiedName,
    ResolvedType, TypeDecl, TypeKind, well_known,
};

use crate::context::UnitContext;
use crate::literal;
use crate::lower::{array_class, primitive_title, primitive_type};
use crate::plan::TypePlan;
use crate::signature::MemberOrder;
use crate::writer::SourceWriter;
use crate::TranslateError;

/// `J2ObjcClassInfo` layout version the runtime expects.
const METADATA_VERSION: u32 = 7;

/// Metadata pieces for one type, written in three places of the
/// implementation file.
pub(crate) struct Metadata {
    /// `+__metadata` for the `@implementation` block.
    pub method: SourceWriter,
    /// Prototypes of the annotation functions, for the private part.
    pub prototypes: Vec<String>,
    /// Annotation function definitions, after `@end`.
    pub functions: SourceWriter,
}

/// Reflection modifier bits, as `java.lang.reflect.Modifier` defines them.
pub(crate) fn modifier_flags(modifiers: Modifiers) -> u32 {
    const FLAGS: &[(Modifiers, u32)] = &[
        (Modifiers::PUBLIC, 0x1),
        (Modifiers::PRIVATE, 0x2),
        (Modifiers::PROTECTED, 0x4),
        (Modifiers::STATIC, 0x8),
        (Modifiers::FINAL, 0x10),
        (Modifiers::SYNCHRONIZED, 0x20),
        (Modifiers::VOLATILE, 0x40),
        (Modifiers::TRANSIENT, 0x80),
        (Modifiers::VARARGS, 0x80),
        (Modifiers::NATIVE, 0x100),
        (Modifiers::ABSTRACT, 0x400),
        (Modifiers::SYNTHETIC, 0x1000),
    ];
    FLAGS
        .iter()
        .filter(|(m, _)| modifiers.contains(*m))
        .fold(0, |acc, (_, bit)| acc | bit)
}

fn type_flags(decl: &TypeDecl) -> u32 {
    let mut flags = modifier_flags(decl.modifiers);
    match decl.kind {
        TypeKind::Class => {}
        TypeKind::Interface => flags |= 0x200 | 0x400,
        TypeKind::Enum => flags |= 0x4000,
        TypeKind::Annotation => flags |= 0x2000 | 0x200 | 0x400,
    }
    flags
}

/// Interned pointer-table entries.
#[derive(Default)]
struct PointerTable {
    entries: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl PointerTable {
    fn intern(&mut self, entry: String) -> i64 {
        let next = self.entries.len();
        let i = *self.index.entry(entry.clone()).or_insert_with(|| {
            self.entries.push(entry);
            next
        });
        i64::try_from(i).unwrap_or(-1)
    }

    fn string(&mut self, s: &str) -> i64 {
        self.intern(literal::c_string(s))
    }

    fn optional_string(&mut self, s: Option<String>) -> i64 {
        s.map_or(-1, |s| self.string(&s))
    }
}

/// Java-style signature of a type, generic or not.
fn signature(cx: &UnitContext<'_>, ty: &ResolvedType) -> String {
    cx.types.generic_signature(ty).unwrap_or_else(|| erased_signature(ty))
}

fn erased_signature(ty: &ResolvedType) -> String {
    match ty {
        ResolvedType::Primitive(kind) => kind.descriptor().to_string(),
        ResolvedType::Class(d) | ResolvedType::Interface(d) => {
            format!("L{};", d.name.binary_name().replace('.', "/"))
        }
        ResolvedType::Array(a) => {
            let mut out = "[".repeat(usize::from(a.dimensions));
            out.push_str(&erased_signature(&a.element));
            out
        }
        ResolvedType::TypeVariable(_) | ResolvedType::Wildcard(_) => erased_signature(&ty.erasure()),
        ResolvedType::Null => "Ljava/lang/Object;".to_owned(),
    }
}

fn type_params_signature(cx: &UnitContext<'_>, params: &[xlat_ir::TypeParam]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let mut out = "<".to_owned();
    for param in params {
        out.push_str(&param.name);
        if param.bounds.is_empty() {
            out.push_str(":Ljava/lang/Object;");
        }
        for (i, bound) in param.bounds.iter().enumerate() {
            // Interface bounds take an extra colon.
            if i > 0 || bound.is_interface() {
                out.push(':');
            }
            out.push(':');
            out.push_str(&signature(cx, bound));
        }
    }
    out.push('>');
    out
}

fn method_generic_signature(cx: &UnitContext<'_>, method: &MethodDecl) -> Option<String> {
    let generic = !method.type_params.is_empty()
        || cx.types.generic_signature(&method.return_type).is_some()
        || method
            .params
            .iter()
            .any(|p| cx.types.generic_signature(&p.ty).is_some());
    if !generic {
        return None;
    }
    let mut out = type_params_signature(cx, &method.type_params);
    out.push('(');
    for p in &method.params {
        out.push_str(&signature(cx, &p.ty));
    }
    out.push(')');
    out.push_str(&signature(cx, &method.return_type));
    Some(out)
}

fn class_generic_signature(cx: &UnitContext<'_>, decl: &TypeDecl) -> Option<String> {
    let supertypes_generic = decl
        .superclass
        .iter()
        .chain(&decl.interfaces)
        .any(|d| !d.args.is_empty());
    if decl.type_params.is_empty() && !supertypes_generic {
        return None;
    }
    let mut out = type_params_signature(cx, &decl.type_params);
    match &decl.superclass {
        Some(sup) => out.push_str(&signature(cx, &ResolvedType::Class(sup.clone()))),
        None => out.push_str("Ljava/lang/Object;"),
    }
    for interface in &decl.interfaces {
        out.push_str(&signature(cx, &ResolvedType::Interface(interface.clone())));
    }
    Some(out)
}

/// Annotations retained at run time: `@Deprecated` and annotation types
/// declared in the batch.
fn runtime_annotations<'x>(cx: &UnitContext<'_>, annotations: &'x [Annotation]) -> Vec<&'x Annotation> {
    annotations
        .iter()
        .filter(|a| {
            a.is(well_known::DEPRECATED)
                || cx
                    .index
                    .get(&a.name)
                    .is_some_and(|s| s.kind == TypeKind::Annotation)
        })
        .collect()
}

/// Objective-C expression for an annotation element value of type `ty`.
pub(crate) fn annotation_value(cx: &UnitContext<'_>, ty: &ResolvedType, value: &AnnotationValue) -> String {
    match value {
        AnnotationValue::Bool(b) => literal::constant(&Constant::Bool(*b)),
        AnnotationValue::Int(v) => literal::int_literal(*v),
        AnnotationValue::Long(v) => literal::long_literal(*v),
        AnnotationValue::Float(bits) => literal::float_literal(f32::from_bits(*bits)),
        AnnotationValue::Double(bits) => literal::double_literal(f64::from_bits(*bits)),
        AnnotationValue::Char(c) => literal::char_literal(*c),
        AnnotationValue::String(s) => literal::string_literal(s),
        AnnotationValue::Enum { ty: enum_ty, constant } => {
            cx.reference_name(enum_ty);
            let mut encoded = String::new();
            crate::mangle::encode_identifier(&mut encoded, constant, false);
            format!("JreLoadEnum({}, {encoded})", cx.names.full_name(enum_ty))
        }
        AnnotationValue::Class(class) => {
            cx.reference(class);
            cx.types.class_expr(class)
        }
        AnnotationValue::Annotation(annotation) => create_annotation(cx, annotation),
        AnnotationValue::Array(values) => {
            let element = match ty {
                ResolvedType::Array(a) => a.component(),
                _ => ResolvedType::object(),
            };
            let items: Vec<String> = values
                .iter()
                .map(|v| annotation_value(cx, &element, v))
                .collect();
            match (ty, element.as_primitive()) {
                (ResolvedType::Array(a), Some(_)) if items.is_empty() => {
                    format!("[{} arrayWithLength:0]", array_class(a))
                }
                _ if items.is_empty() => format!(
                    "[IOSObjectArray arrayWithLength:0 type:{}]",
                    cx.types.class_expr(&element)
                ),
                (ResolvedType::Array(a), Some(kind)) => format!(
                    "[{} arrayWith{}s:({}[]){{ {} }} count:{}]",
                    array_class(a),
                    primitive_title(kind),
                    primitive_type(kind),
                    items.join(", "),
                    items.len()
                ),
                _ => format!(
                    "[IOSObjectArray arrayWithObjects:(id[]){{ {} }} count:{} type:{}]",
                    items.join(", "),
                    items.len(),
                    cx.types.class_expr(&element)
                ),
            }
        }
    }
}

/// `create_Foo(args)` with arguments in member order; missing elements
/// take their defaults.
fn create_annotation(cx: &UnitContext<'_>, annotation: &Annotation) -> String {
    cx.reference_name(&annotation.name);
    let name = cx.names.full_name(&annotation.name);
    let args: Vec<String> = match cx.index.get(&annotation.name) {
        Some(summary) => {
            let mut elements: Vec<&MethodDecl> = summary.elements.iter().collect();
            elements.sort_by_key(|e| MemberOrder::method(cx.names, e));
            elements
                .into_iter()
                .map(|element| {
                    match annotation
                        .value(&element.name)
                        .or(element.default_value.as_ref())
                    {
                        Some(value) => annotation_value(cx, &element.return_type, value),
                        None if element.return_type.is_reference() => "nil".to_owned(),
                        None => "0".to_owned(),
                    }
                })
                .collect()
        }
        None => Vec::new(),
    };
    format!("create_{name}({})", args.join(", "))
}

pub(crate) fn build(cx: &UnitContext<'_>, plan: &TypePlan<'_>) -> Result<Metadata, TranslateError> {
    MetadataGen {
        cx,
        plan,
        table: PointerTable::default(),
        functions: SourceWriter::new(),
        prototypes: Vec::new(),
    }
    .build()
}

struct MetadataGen<'c, 'a> {
    cx: &'c UnitContext<'a>,
    plan: &'c TypePlan<'a>,
    table: PointerTable,
    functions: SourceWriter,
    prototypes: Vec<String>,
}

struct MethodRow {
    selector: String,
    returns: Option<String>,
    flags: u32,
    java_name: i64,
    params: i64,
    exceptions: i64,
    generic: i64,
    annotations: i64,
}

impl MetadataGen<'_, '_> {
    /// Pointer-table entry of a function returning the runtime
    /// annotations, or -1 when there are none.
    fn annotations(&mut self, annotations: &[Annotation]) -> i64 {
        let runtime = runtime_annotations(self.cx, annotations);
        if runtime.is_empty() {
            return -1;
        }
        self.cx.reference_name(&annotation_base());
        let function = format!("{}__Annotations${}", self.plan.name, self.prototypes.len());
        let values: Vec<String> = runtime
            .iter()
            .map(|a| create_annotation(self.cx, a))
            .collect();
        let proto = format!("IOSObjectArray *{function}(void)");
        self.functions.writeln(&format!("{proto} {{"));
        self.functions.writeln(&format!(
            "  return [IOSObjectArray arrayWithObjects:(id[]){{ {} }} count:{} type:JavaLangAnnotationAnnotation_class_()];",
            values.join(", "),
            values.len()
        ));
        self.functions.writeln("}");
        self.functions.blank_line();
        self.prototypes.push(proto);
        self.table.intern(format!("(void *)&{function}"))
    }

    fn descriptors(&self, types: &[ResolvedType]) -> Option<String> {
        if types.is_empty() {
            return None;
        }
        Some(types.iter().map(|t| self.cx.types.descriptor(t)).collect())
    }

    fn method_row(&mut self, method: &MethodDecl, selector: &str) -> MethodRow {
        let base = selector.split(':').next().unwrap_or(selector);
        let keeps_name = base == method.name
            || (base.starts_with(method.name.as_str())
                && base[method.name.len()..].starts_with("With"));
        let java_name = if keeps_name {
            -1
        } else {
            self.table.string(&method.name)
        };
        let params = self.descriptors(&method.param_types());
        let exceptions = self.descriptors(&method.thrown);
        MethodRow {
            selector: selector.to_owned(),
            returns: Some(self.cx.types.descriptor(&method.return_type)),
            flags: modifier_flags(method.modifiers),
            java_name,
            params: self.table.optional_string(params),
            exceptions: self.table.optional_string(exceptions),
            generic: self
                .table
                .optional_string(method_generic_signature(self.cx, method)),
            annotations: self.annotations(&method.annotations),
        }
    }

    fn rows(&mut self) -> Vec<MethodRow> {
        let plan = self.plan;
        let mut rows = Vec::new();
        for ctor in &plan.constructors {
            let (flags, params, exceptions, annotations) = match ctor.decl {
                Some(c) => {
                    let params = self.descriptors(&c.param_types());
                    let exceptions = self.descriptors(&c.thrown);
                    (
                        modifier_flags(c.modifiers),
                        self.table.optional_string(params),
                        self.table.optional_string(exceptions),
                        self.annotations(&c.annotations),
                    )
                }
                None if plan.decl.kind == TypeKind::Enum => (0x2, -1, -1, -1),
                None => (modifier_flags(plan.decl.modifiers) & 0x7, -1, -1, -1),
            };
            rows.push(MethodRow {
                selector: ctor.selector.clone(),
                returns: None,
                flags,
                java_name: -1,
                params,
                exceptions,
                generic: -1,
                annotations,
            });
        }
        for method in &plan.methods {
            let mut row = self.method_row(method.decl, &method.selector);
            if plan.decl.kind.is_protocol() && !method.is_static() && method.decl.body.is_none() {
                row.flags |= 0x400;
            }
            rows.push(row);
        }
        if plan.decl.kind == TypeKind::Enum {
            let array = format!("[L{};", plan.name);
            let own = format!("L{};", plan.name);
            rows.push(MethodRow {
                selector: "values".to_owned(),
                returns: Some(array),
                flags: 0x9,
                java_name: -1,
                params: -1,
                exceptions: -1,
                generic: -1,
                annotations: -1,
            });
            let params = self.table.string("LNSString;");
            rows.push(MethodRow {
                selector: "valueOfWithNSString:".to_owned(),
                returns: Some(own),
                flags: 0x9,
                java_name: self.table.string("valueOf"),
                params,
                exceptions: -1,
                generic: -1,
                annotations: -1,
            });
        }
        rows
    }

    fn field_row(&mut self, field: &FieldDecl) -> String {
        let cx = self.cx;
        let is_static = field.is_static();
        let name = if is_static {
            field.name.clone()
        } else {
            cx.names.ivar_name(&field.name)
        };
        let constant = match (&field.constant, field.is_compile_time_constant()) {
            (Some(value), true) => constant_value(value),
            _ => ".constantValue.asLong = 0".to_owned(),
        };
        let java_name = if !is_static && name != format!("{}_", field.name) {
            self.table.string(&field.name)
        } else {
            -1
        };
        let static_ref = if is_static && !field.is_compile_time_constant() {
            self.table
                .intern(format!("&{}", cx.names.static_var_name(&self.plan.decl.name, &field.name)))
        } else {
            -1
        };
        let generic = self
            .table
            .optional_string(cx.types.generic_signature(&field.ty));
        let annotations = self.annotations(&field.annotations);
        format!(
            "{{ {}, {}, {constant}, {:#x}, {java_name}, {static_ref}, {generic}, {annotations} }},",
            literal::c_string(&name),
            literal::c_string(&cx.types.descriptor(&field.ty)),
            modifier_flags(field.modifiers)
        )
    }

    fn build(mut self) -> Result<Metadata, TranslateError> {
        let plan = self.plan;
        let cx = self.cx;
        let decl = plan.decl;
        let rows = self.rows();

        let mut fields: Vec<String> = Vec::new();
        for constant in decl.enum_constants() {
            let mut encoded = String::new();
            crate::mangle::encode_identifier(&mut encoded, &constant.name, false);
            let static_ref = self.table.intern(format!("&{}_values_[{}]", plan.name, fields.len()));
            let annotations = self.annotations(&constant.annotations);
            fields.push(format!(
                "{{ {}, {}, .constantValue.asLong = 0, 0x4019, -1, {static_ref}, -1, {annotations} }},",
                literal::c_string(&encoded),
                literal::c_string(&format!("L{};", plan.name))
            ));
        }
        for field in decl.fields() {
            fields.push(self.field_row(field));
        }

        let enclosing = decl
            .name
            .outer()
            .map_or(-1, |outer| self.table.string(&format!("L{};", cx.names.full_name(&outer))));
        let inner: Vec<String> = decl
            .nested
            .iter()
            .filter(|n| matches!(n.nesting, xlat_ir::Nesting::Member))
            .map(|n| format!("L{};", cx.names.full_name(&n.name)))
            .collect();
        let inner = if inner.is_empty() {
            -1
        } else {
            self.table.string(&inner.join(""))
        };
        let generic = self
            .table
            .optional_string(class_generic_signature(cx, decl));
        let annotations = self.annotations(&decl.annotations);

        let mut out = SourceWriter::new();
        out.writeln("+ (const J2ObjcClassInfo *)__metadata {");
        out.indent();
        if !rows.is_empty() {
            out.writeln("static J2ObjcMethodInfo methods[] = {");
            out.indent();
            for row in &rows {
                let returns = row
                    .returns
                    .as_deref()
                    .map_or_else(|| "NULL".to_owned(), literal::c_string);
                out.writeln(&format!(
                    "{{ NULL, {returns}, {:#x}, {}, {}, {}, {}, {}, -1 }},",
                    row.flags, row.java_name, row.params, row.exceptions, row.generic, row.annotations
                ));
            }
            out.dedent();
            out.writeln("};");
            out.writeln("#pragma clang diagnostic push");
            out.writeln("#pragma clang diagnostic ignored \"-Wobjc-multiple-method-names\"");
            out.writeln("#pragma clang diagnostic ignored \"-Wundeclared-selector\"");
            for (i, row) in rows.iter().enumerate() {
                out.writeln(&format!("methods[{i}].selector = @selector({});", row.selector));
            }
            out.writeln("#pragma clang diagnostic pop");
        }
        if !fields.is_empty() {
            out.writeln("static const J2ObjcFieldInfo fields[] = {");
            out.indent();
            for field in &fields {
                out.writeln(field);
            }
            out.dedent();
            out.writeln("};");
        }
        if !self.table.entries.is_empty() {
            out.writeln(&format!(
                "static const void *ptrTable[] = {{ {} }};",
                self.table.entries.join(", ")
            ));
        }
        let simple = decl.name.simple_name();
        let package = decl.name.package();
        let package = if package.is_empty() {
            "NULL".to_owned()
        } else {
            literal::c_string(package)
        };
        out.writeln(&format!(
            "static const J2ObjcClassInfo _{} = {{ {}, {package}, {}, {}, {}, {METADATA_VERSION}, {:#x}, {}, {}, {enclosing}, {inner}, -1, {generic}, {annotations} }};",
            plan.name,
            literal::c_string(simple),
            if self.table.entries.is_empty() { "NULL" } else { "ptrTable" },
            if rows.is_empty() { "NULL" } else { "methods" },
            if fields.is_empty() { "NULL" } else { "fields" },
            type_flags(decl),
            rows.len(),
            fields.len(),
        ));
        out.writeln(&format!("return &_{};", plan.name));
        out.dedent();
        out.writeln("}");

        Ok(Metadata {
            method: out,
            prototypes: self.prototypes,
            functions: self.functions,
        })
    }
}

/// Typed initializer of a field's `constantValue` union.
fn constant_value(value: &Constant) -> String {
    let (member, spelled) = match value {
        Constant::Bool(b) => ("asBOOL", literal::constant(&Constant::Bool(*b))),
        Constant::Char(c) => ("asChar", literal::char_literal(*c)),
        Constant::Byte(v) => ("asChar", v.to_string()),
        Constant::Short(v) => ("asShort", v.to_string()),
        Constant::Int(v) => ("asInt", literal::int_literal(*v)),
        Constant::Long(v) => ("asLong", literal::long_literal(*v)),
        Constant::Float(bits) => ("asFloat", literal::float_literal(f32::from_bits(*bits))),
        Constant::Double(bits) => ("asDouble", literal::double_literal(f64::from_bits(*bits))),
        Constant::String(_) => ("asLong", "0".to_owned()),
    };
    format!(".constantValue.{member} = {spelled}")
}

/// Element type of the arrays the annotation functions return.
fn annotation_base() -> QualifiedName {
    QualifiedName::new("java.lang.annotation", "Annotation")
}

#[cfg(test)]
mod tests;
