//! Type declarations.
//!
//! For each type this produces the `@interface` / `@protocol` block and
//! the C-level declarations that follow it (static-init and field-setter
//! macros, static field accessors, function prototypes, the type literal),
//! together with what the surrounding file must provide: forward
//! declarations for types used only by pointer and the supertypes whose
//! full declarations are required.
//!
//! Exported types are declared in the public header; the others are
//! declared with the same text at the top of the implementation file.

mod members;
mod property;
mod statics;

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashSet;
use xlat_ir::{QualifiedName, ResolvedType, Span, TypeKind, Visibility};

use crate::context::UnitContext;
use crate::lower::array_class;
use crate::mangle::encode_identifier;
use crate::plan::{CtorPlan, MethodPlan, TypePlan};
use crate::signature::{build_selector, constructor_base, needs_family_none};
use crate::stmt::declare;
use crate::writer::SourceWriter;
use crate::TranslateError;

pub(crate) use members::{
    ctor_head, ctor_prototypes, has_allocators, has_companion, method_head, method_prototype,
    prototype,
};
use members::doc_comment;
pub(crate) use property::properties;
pub(crate) use statics::{accessors, StaticField};

/// A type's declaration text and what it needs from its file.
pub(crate) struct Declaration {
    pub out: SourceWriter,
    /// `@class Foo;` / `@protocol Bar;` lines, sorted by name.
    pub forward: Vec<String>,
    /// Supertypes whose declarations must precede this one.
    pub supertypes: Vec<QualifiedName>,
    /// Other types named by member declarations.
    pub references: BTreeSet<QualifiedName>,
}

pub(crate) fn declare_type(cx: &UnitContext<'_>, plan: &TypePlan<'_>) -> Result<Declaration, TranslateError> {
    tracing::debug!(type_name = %plan.decl.name, "declaring type");
    let mut gen = DeclGen {
        cx,
        plan,
        out: SourceWriter::new(),
        forward: BTreeMap::new(),
        references: BTreeSet::new(),
    };
    match plan.decl.kind {
        TypeKind::Class | TypeKind::Enum => gen.class_block()?,
        TypeKind::Interface => gen.protocol_block()?,
        TypeKind::Annotation => gen.annotation_block()?,
    }
    gen.trailer()?;

    let supertypes = supertypes(plan);
    let excluded: FxHashSet<String> = supertypes
        .iter()
        .map(|s| cx.names.full_name(s))
        .chain(std::iter::once(plan.name.clone()))
        .collect();
    let forward = gen
        .forward
        .into_iter()
        .filter(|(name, _)| !excluded.contains(name))
        .map(|(name, protocol)| {
            if protocol {
                format!("@protocol {name};")
            } else {
                format!("@class {name};")
            }
        })
        .collect();
    let mut references = gen.references;
    references.remove(&plan.decl.name);
    for sup in &supertypes {
        references.remove(sup);
    }
    Ok(Declaration {
        out: gen.out,
        forward,
        supertypes,
        references,
    })
}

/// Superclass (or the implicit `Enum` base) followed by the declared
/// interfaces and, for annotation types, `Annotation`.
fn supertypes(plan: &TypePlan<'_>) -> Vec<QualifiedName> {
    let decl = plan.decl;
    let mut out = Vec::new();
    match &decl.superclass {
        Some(sup) if !sup.name.is_object() => out.push(sup.name.clone()),
        None if decl.kind == TypeKind::Enum => out.push(QualifiedName::new("java.lang", "Enum")),
        _ => {}
    }
    for interface in &decl.interfaces {
        if !out.contains(&interface.name) {
            out.push(interface.name.clone());
        }
    }
    if decl.kind == TypeKind::Annotation {
        out.push(QualifiedName::new("java.lang.annotation", "Annotation"));
    }
    out
}

fn section_title(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "Public",
        Visibility::Protected => "Protected",
        Visibility::PackagePrivate => "Package-Private",
        Visibility::Private => "Private",
    }
}

struct DeclGen<'c, 'a> {
    cx: &'c UnitContext<'a>,
    plan: &'c TypePlan<'a>,
    out: SourceWriter,
    /// Objective-C name → is a protocol.
    forward: BTreeMap<String, bool>,
    references: BTreeSet<QualifiedName>,
}

impl DeclGen<'_, '_> {
    /// Record a type used by a declaration.
    fn note(&mut self, ty: &ResolvedType) {
        match ty {
            ResolvedType::Class(d) | ResolvedType::Interface(d) => {
                self.references.insert(d.name.clone());
                if self.cx.index.include_path(&d.name).is_some() {
                    let name = self.cx.names.full_name(&d.name);
                    self.forward.insert(name, matches!(ty, ResolvedType::Interface(_)));
                }
                if self.cx.options.generics {
                    for arg in &d.args {
                        self.note(arg);
                    }
                }
            }
            ResolvedType::Array(a) => {
                self.forward.insert(array_class(a), false);
            }
            ResolvedType::TypeVariable(v) if v.bounds.len() > 1 => {
                for bound in &v.bounds {
                    self.note(&bound.erasure());
                }
            }
            ResolvedType::TypeVariable(_) | ResolvedType::Wildcard(_) => self.note(&ty.erasure()),
            ResolvedType::Primitive(_) | ResolvedType::Null => {}
        }
    }

    fn doc(&mut self, doc: Option<&str>) {
        if self.cx.options.doc_comments {
            doc_comment(&mut self.out, doc);
        }
    }

    /// Protocol names in declaration order, rejecting repeats.
    fn conformances(&self) -> Result<Vec<String>, TranslateError> {
        let decl = self.plan.decl;
        let mut seen = FxHashSet::default();
        let mut out = Vec::with_capacity(decl.interfaces.len() + 1);
        for interface in &decl.interfaces {
            if !seen.insert(&interface.name) {
                return Err(TranslateError::DuplicateInterface {
                    interface: interface.name.to_string(),
                    ty: decl.name.to_string(),
                    span: decl.span,
                });
            }
            out.push(self.cx.names.full_name(&interface.name));
        }
        Ok(out)
    }

    fn superclass(&self) -> String {
        match (&self.plan.decl.superclass, self.plan.decl.kind) {
            (None, TypeKind::Enum) => "JavaLangEnum".to_owned(),
            _ => self.plan.superclass_name(self.cx),
        }
    }

    // ── Classes and enums ──

    fn class_block(&mut self) -> Result<(), TranslateError> {
        let decl = self.plan.decl;
        if decl.kind == TypeKind::Enum {
            self.enum_typedef();
        }
        self.doc(decl.doc.as_deref());
        if decl.is_deprecated() {
            self.out.writeln("__attribute__((deprecated))");
        }
        let protocols = self.conformances()?;
        let mut line = format!("@interface {} : {}", self.plan.name, self.superclass());
        if !protocols.is_empty() {
            line.push_str(&format!(" < {} >", protocols.join(", ")));
        }
        let ivars: Vec<_> = self.plan.header_ivars(self.cx).collect();
        if ivars.is_empty() {
            self.out.writeln(&line);
        } else {
            self.out.writeln(&format!("{line} {{"));
            self.out.writeln(" @public");
            for ivar in ivars {
                self.note(&ivar.ty);
                let qualifier = self.cx.types.storage_qualifier(ivar.ownership);
                let ty = self.cx.types.decl_type(&ivar.ty, self.plan.decl.span)?;
                self.out
                    .writeln(&format!("  {qualifier}{};", declare(&ty, &ivar.name)));
            }
            self.out.writeln("}");
        }
        self.out.blank_line();

        for property in properties(self.cx, self.plan)? {
            self.note(&property.field.ty);
            let text = property.declaration(self.cx)?;
            self.out.writeln(&text);
            self.out.blank_line();
        }
        self.static_accessors()?;
        self.sections()?;
        self.unavailable_constructors()?;
        self.out.writeln("@end");
        Ok(())
    }

    fn enum_typedef(&mut self) {
        let name = &self.plan.name;
        let constants: Vec<_> = self.plan.decl.enum_constants().collect();
        if !constants.is_empty() {
            self.out
                .writeln(&format!("typedef NS_ENUM(jint, {name}_Enum) {{"));
            for (ordinal, constant) in constants.iter().enumerate() {
                let mut suffix = String::new();
                encode_identifier(&mut suffix, &constant.name, false);
                self.out
                    .writeln(&format!("  {name}_Enum_{suffix} = {ordinal},"));
            }
            self.out.writeln("};");
        }
        self.out.writeln(&format!("#define {name}_ORDINAL jint"));
        self.out.blank_line();
    }

    /// Class methods or class properties for static state.
    fn static_accessors(&mut self) -> Result<(), TranslateError> {
        let accessors = accessors(self.cx, self.plan)?;
        if accessors.is_empty() {
            return Ok(());
        }
        for accessor in &accessors {
            if self.cx.options.class_properties {
                let readonly = if accessor.setter.is_some() { "" } else { "readonly, " };
                self.out.writeln(&format!(
                    "@property ({readonly}class) {};",
                    declare(&accessor.ty, &accessor.name)
                ));
            } else {
                self.out
                    .writeln(&format!("+ ({}){};", accessor.ty, accessor.name));
                if accessor.setter.is_some() {
                    self.out.blank_line();
                    self.out.writeln(&format!(
                        "+ (void){}({})value;",
                        accessor.setter_selector(),
                        accessor.ty
                    ));
                }
            }
            self.out.blank_line();
        }
        Ok(())
    }

    fn sections(&mut self) -> Result<(), TranslateError> {
        let mut visibilities = vec![
            Visibility::Public,
            Visibility::Protected,
            Visibility::PackagePrivate,
        ];
        if self.cx.options.private_declarations_in_header {
            visibilities.push(Visibility::Private);
        }
        let plan = self.plan;
        let is_enum = plan.decl.kind == TypeKind::Enum;
        for visibility in visibilities {
            let ctors: Vec<&CtorPlan<'_>> = plan
                .constructors
                .iter()
                .filter(|c| c.visibility == visibility && !c.is_function_only(plan.decl))
                .collect();
            let methods: Vec<&MethodPlan<'_>> = plan
                .methods
                .iter()
                .filter(|m| m.visibility == visibility)
                .collect();
            let enum_methods = is_enum && visibility == Visibility::Public;
            if ctors.is_empty() && methods.is_empty() && !enum_methods {
                continue;
            }
            self.out
                .writeln(&format!("#pragma mark {}", section_title(visibility)));
            self.out.blank_line();
            for ctor in ctors {
                self.ctor_declaration(ctor)?;
            }
            if enum_methods {
                self.enum_methods();
            }
            for method in methods {
                self.method_declaration(method)?;
            }
        }
        Ok(())
    }

    fn enum_methods(&mut self) {
        let name = &self.plan.name;
        self.forward.insert("IOSObjectArray".to_owned(), false);
        self.out.writeln("+ (IOSObjectArray *)values;");
        self.out.blank_line();
        self.out
            .writeln(&format!("+ ({name} *)valueOfWithNSString:(NSString *)name;"));
        self.out.blank_line();
        if self.plan.decl.enum_constants().next().is_some() {
            self.out.writeln(&format!("- ({name}_Enum)toNSEnum;"));
            self.out.blank_line();
        }
    }

    fn ctor_declaration(&mut self, ctor: &CtorPlan<'_>) -> Result<(), TranslateError> {
        for p in &ctor.params {
            self.note(&p.ty);
        }
        let source = ctor.decl.map_or(Span::DUMMY, |d| d.span);
        self.doc(ctor.decl.and_then(|d| d.doc.as_deref()));
        let head = ctor_head(self.cx, ctor, self.plan.decl.span)?;
        head.write(&mut self.out, source);
        if ctor.decl.is_some_and(xlat_ir::ConstructorDecl::is_deprecated) {
            self.out.write(" __attribute__((deprecated))");
        }
        if self.cx.options.swift_friendly {
            self.out.write(" ");
            self.out.write(&members::swift_ctor_name(ctor));
        }
        self.out.write(";\n");
        self.out.blank_line();
        Ok(())
    }

    fn method_declaration(&mut self, method: &MethodPlan<'_>) -> Result<(), TranslateError> {
        let decl = method.decl;
        for p in &decl.params {
            self.note(&p.ty);
        }
        self.note(&decl.return_type);
        self.doc(decl.doc.as_deref());
        let head = method_head(self.cx, method)?;
        head.write(&mut self.out, decl.name_span);
        if decl.is_deprecated() {
            self.out.write(" __attribute__((deprecated))");
        }
        if needs_family_none(&method.selector) {
            self.out.write(" OBJC_METHOD_FAMILY_NONE");
        }
        self.out.write(";\n");
        self.out.blank_line();
        Ok(())
    }

    /// Superclass constructors the type does not redeclare, marked
    /// unavailable so they cannot be called on the subclass.
    fn unavailable_constructors(&mut self) -> Result<(), TranslateError> {
        let plan = self.plan;
        if !self.cx.options.disallow_inherited_constructors || plan.decl.kind != TypeKind::Class {
            return Ok(());
        }
        let own: FxHashSet<&str> = plan.constructors.iter().map(|c| c.selector.as_str()).collect();
        let declares_non_default = plan
            .constructors
            .iter()
            .any(|c| c.decl.is_some_and(|d| !d.params.is_empty()));

        let mut inherited = BTreeMap::new();
        for summary in self.cx.index.superclass_chain(&plan.decl.name) {
            let base = constructor_base(&summary.name, summary.kind, summary.modifiers);
            for ctor in &summary.constructors {
                if ctor.modifiers.is_private() || ctor.params.is_empty() {
                    continue;
                }
                let selector = build_selector(self.cx.names, base, &ctor.param_types());
                if own.contains(selector.as_str()) || inherited.contains_key(&selector) {
                    continue;
                }
                let mut params = Vec::with_capacity(ctor.params.len());
                for p in &ctor.params {
                    self.note(&p.ty);
                    params.push((
                        self.cx.types.decl_type(&p.ty, ctor.span)?,
                        self.cx.names.param_name(&p.name),
                    ));
                }
                let parts = crate::signature::selector_parts(&selector, params);
                let text = crate::signature::format_method("- (instancetype)", &selector, &parts);
                inherited.insert(selector.clone(), text);
            }
        }
        let init_unavailable = declares_non_default && !own.contains("init");
        if inherited.is_empty() && !init_unavailable {
            return Ok(());
        }
        self.out
            .writeln("// Disallowed inherited constructors, do not use.");
        self.out.blank_line();
        if init_unavailable {
            self.out.writeln("- (instancetype)init NS_UNAVAILABLE;");
            self.out.blank_line();
        }
        for text in inherited.values() {
            self.out.writeln(&format!("{text} NS_UNAVAILABLE;"));
            self.out.blank_line();
        }
        Ok(())
    }

    // ── Interfaces ──

    fn protocol_block(&mut self) -> Result<(), TranslateError> {
        let decl = self.plan.decl;
        self.doc(decl.doc.as_deref());
        if decl.is_deprecated() {
            self.out.writeln("__attribute__((deprecated))");
        }
        let mut protocols = self.conformances()?;
        protocols.push("JavaObject".to_owned());
        self.out.writeln(&format!(
            "@protocol {} < {} >",
            self.plan.name,
            protocols.join(", ")
        ));
        self.out.blank_line();
        let plan = self.plan;
        for method in plan.methods.iter().filter(|m| !m.is_static()) {
            self.method_declaration(method)?;
        }
        self.out.writeln("@end");

        if has_companion(plan) {
            self.out.blank_line();
            self.out
                .writeln(&format!("@interface {} : NSObject", self.plan.name));
            self.out.blank_line();
            self.static_accessors()?;
            for method in plan.static_methods().filter(|m| m.visibility != Visibility::Private) {
                self.method_declaration(method)?;
            }
            self.out.writeln("@end");
        }
        Ok(())
    }

    // ── Annotation types ──

    fn annotation_block(&mut self) -> Result<(), TranslateError> {
        let plan = self.plan;
        let name = &plan.name;
        self.doc(plan.decl.doc.as_deref());
        self.out.writeln(&format!(
            "@protocol {name} < JavaLangAnnotationAnnotation >"
        ));
        self.out.blank_line();
        let elements: Vec<&MethodPlan<'_>> = plan.methods.iter().filter(|m| !m.is_static()).collect();
        for element in &elements {
            self.note(&element.decl.return_type);
            let ty = self
                .cx
                .types
                .decl_type(&element.decl.return_type, element.decl.span)?;
            self.out.writeln(&format!(
                "@property (readonly) {};",
                declare(&ty, &element.selector)
            ));
        }
        if !elements.is_empty() {
            self.out.blank_line();
        }
        self.forward.insert("IOSClass".to_owned(), false);
        self.out.writeln("- (IOSClass *)annotationType;");
        self.out.blank_line();
        self.out.writeln("@end");
        self.out.blank_line();

        let ivars: Vec<(String, String)> = elements
            .iter()
            .map(|e| {
                Ok((
                    self.cx.types.decl_type(&e.decl.return_type, e.decl.span)?,
                    self.cx.names.ivar_name(&e.decl.name),
                ))
            })
            .collect::<Result<_, TranslateError>>()?;
        if ivars.is_empty() {
            self.out
                .writeln(&format!("@interface {name} : NSObject < {name} >"));
        } else {
            self.out
                .writeln(&format!("@interface {name} : NSObject < {name} > {{"));
            self.out.writeln(" @public");
            for (ty, ivar) in &ivars {
                self.out.writeln(&format!("  {};", declare(ty, ivar)));
            }
            self.out.writeln("}");
        }
        self.out.blank_line();
        for element in elements.iter().filter(|e| e.decl.default_value.is_some()) {
            let ty = self
                .cx
                .types
                .decl_type(&element.decl.return_type, element.decl.span)?;
            self.out
                .writeln(&format!("+ ({ty}){}Default;", element.selector));
            self.out.blank_line();
        }
        self.out.writeln("@end");
        Ok(())
    }

    // ── After the block ──

    fn trailer(&mut self) -> Result<(), TranslateError> {
        let plan = self.plan;
        let cx = self.cx;
        let name = &plan.name;
        self.out.blank_line();
        let init_macro = if plan.needs_initialize {
            "J2OBJC_STATIC_INIT"
        } else {
            "J2OBJC_EMPTY_STATIC_INIT"
        };
        self.out.writeln(&format!("{init_macro}({name})"));
        self.out.blank_line();

        if !cx.options.is_arc() {
            let mut any = false;
            for ivar in plan.header_ivars(cx) {
                if ivar.field.is_some() && ivar.is_strong_object() && ivar.visibility != Visibility::Private {
                    let ty = cx.types.decl_type(&ivar.ty, plan.decl.span)?;
                    self.out
                        .writeln(&format!("J2OBJC_FIELD_SETTER({name}, {}, {ty})", ivar.name));
                    any = true;
                }
            }
            if any {
                self.out.blank_line();
            }
        }

        if plan.decl.kind == TypeKind::Enum {
            self.enum_constants();
        }

        for field in &plan.static_fields {
            let field = StaticField::new(cx, name, field)?;
            if field.is_private() {
                continue;
            }
            self.note(&field.field.ty);
            field.write_accessors(cx, &mut self.out, true);
            self.out.blank_line();
        }

        self.functions()?;

        self.out
            .writeln(&format!("J2OBJC_TYPE_LITERAL_HEADER({name})"));

        if let Some(old) = cx.names.compatibility_alias(&plan.decl.name) {
            self.out.blank_line();
            if plan.decl.kind.is_protocol() {
                self.out.writeln(&format!("#define {old} {name}"));
            } else {
                self.out
                    .writeln(&format!("@compatibility_alias {old} {name};"));
            }
        }
        Ok(())
    }

    fn enum_constants(&mut self) {
        let name = &self.plan.name;
        self.out
            .writeln("/*! INTERNAL ONLY - Use enum accessors declared below. */");
        self.out
            .writeln(&format!("FOUNDATION_EXPORT {name} *{name}_values_[];"));
        self.out.blank_line();
        for constant in self.plan.decl.enum_constants() {
            let mut suffix = String::new();
            encode_identifier(&mut suffix, &constant.name, false);
            self.doc(constant.doc.as_deref());
            self.out
                .writeln(&format!("inline {name} *{name}_get_{suffix}(void);"));
            self.out
                .writeln(&format!("J2OBJC_ENUM_CONSTANT({name}, {suffix})"));
            self.out.blank_line();
        }
    }

    /// Prototypes of the functions other files may call.
    fn functions(&mut self) -> Result<(), TranslateError> {
        let plan = self.plan;
        let cx = self.cx;
        let name = &plan.name;
        for ctor in &plan.constructors {
            if ctor.is_function_only(plan.decl) {
                continue;
            }
            let protos = ctor_prototypes(cx, plan, ctor)?;
            self.out
                .writeln(&format!("FOUNDATION_EXPORT {};", protos.init));
            self.out.blank_line();
            if has_allocators(plan) {
                self.out
                    .writeln(&format!("FOUNDATION_EXPORT {} NS_RETURNS_RETAINED;", protos.new));
                self.out.blank_line();
                self.out
                    .writeln(&format!("FOUNDATION_EXPORT {};", protos.create));
                self.out.blank_line();
            }
        }
        for method in &plan.methods {
            if method.visibility == Visibility::Private {
                continue;
            }
            if let Some(proto) = method_prototype(cx, plan, method)? {
                self.out.writeln(&format!("FOUNDATION_EXPORT {proto};"));
                self.out.blank_line();
            }
        }
        match plan.decl.kind {
            TypeKind::Enum => {
                for proto in [
                    format!("IOSObjectArray *{name}_values(void)"),
                    format!("{name} *{name}_valueOfWithNSString_(NSString *name)"),
                    format!("{name} *{name}_fromOrdinal(jint ordinal)"),
                ] {
                    self.out.writeln(&format!("FOUNDATION_EXPORT {proto};"));
                    self.out.blank_line();
                }
            }
            TypeKind::Annotation => self.annotation_functions()?,
            TypeKind::Class | TypeKind::Interface => {}
        }
        Ok(())
    }

    fn annotation_functions(&mut self) -> Result<(), TranslateError> {
        let plan = self.plan;
        let cx = self.cx;
        let name = &plan.name;
        let elements: Vec<&MethodPlan<'_>> = plan.methods.iter().filter(|m| !m.is_static()).collect();
        for element in elements.iter().filter(|e| e.decl.default_value.is_some()) {
            let ty = cx.types.decl_type(&element.decl.return_type, element.decl.span)?;
            let function = format!("{name}_{}Default", element.selector);
            self.out
                .writeln(&format!("FOUNDATION_EXPORT {};", prototype(&ty, &function, &[])));
            self.out.blank_line();
        }
        let mut params = Vec::with_capacity(elements.len());
        for element in &elements {
            params.push((
                cx.types.decl_type(&element.decl.return_type, element.decl.span)?,
                cx.names.param_name(&element.decl.name),
            ));
        }
        self.out.writeln(&format!(
            "FOUNDATION_EXPORT {};",
            prototype(&format!("id<{name}>"), &format!("create_{name}"), &params)
        ));
        self.out.blank_line();
        Ok(())
    }
}
