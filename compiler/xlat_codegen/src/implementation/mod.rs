//! Implementation file generation.
//!
//! Each type contributes two pieces to the `.m` file: a private part
//! (class extension, file-local statics and function prototypes) written
//! before any `@implementation`, and the implementation part itself: the
//! storage definitions, the `@implementation` block and the C functions
//! that carry constructors, static and private methods.

mod functions;

use xlat_ir::{Member, Modifiers, ResolvedType, TypeKind, Visibility};

use crate::context::UnitContext;
use crate::decl::{
    accessors, ctor_head, ctor_prototypes, has_allocators, has_companion, method_head,
    method_prototype, properties, StaticField,
};
use crate::metadata;
use crate::plan::{MethodPlan, TypePlan};
use crate::stmt::{native_lines, BodyGen, BodyKind};
use crate::writer::SourceWriter;
use crate::TranslateError;

pub(crate) struct Implementation {
    /// Declarations only this file needs.
    pub private: SourceWriter,
    pub body: SourceWriter,
}

pub(crate) fn implement_type(
    cx: &UnitContext<'_>,
    plan: &TypePlan<'_>,
) -> Result<Implementation, TranslateError> {
    tracing::debug!(type_name = %plan.decl.name, "implementing type");
    let metadata = if cx.options.strip_reflection {
        None
    } else {
        Some(metadata::build(cx, plan)?)
    };
    let mut private = ImplGen::new(cx, plan);
    private.private_part()?;
    let mut body = ImplGen::new(cx, plan);
    if let Some(metadata) = metadata {
        for proto in &metadata.prototypes {
            private
                .out
                .writeln(&format!("__attribute__((unused)) static {proto};"));
            private.out.blank_line();
        }
        body.reflection = Some(metadata.method);
        body.annotation_functions = Some(metadata.functions);
    }
    body.implementation()?;
    Ok(Implementation {
        private: private.out,
        body: body.out,
    })
}

struct ImplGen<'c, 'a> {
    cx: &'c UnitContext<'a>,
    plan: &'c TypePlan<'a>,
    out: SourceWriter,
    /// `+__metadata`, written at the end of the `@implementation` block.
    reflection: Option<SourceWriter>,
    /// Runtime annotation functions, written after the other functions.
    annotation_functions: Option<SourceWriter>,
}

impl<'c, 'a> ImplGen<'c, 'a> {
    fn new(cx: &'c UnitContext<'a>, plan: &'c TypePlan<'a>) -> Self {
        ImplGen {
            cx,
            plan,
            out: SourceWriter::new(),
            reflection: None,
            annotation_functions: None,
        }
    }

    fn name(&self) -> &str {
        &self.plan.name
    }

    fn private_methods(&self) -> impl Iterator<Item = &'c MethodPlan<'a>> + '_ {
        let in_header = self.cx.options.private_declarations_in_header;
        self.plan
            .methods
            .iter()
            .filter(move |m| !in_header && m.visibility == Visibility::Private)
    }

    // ── Private part ──

    fn private_part(&mut self) -> Result<(), TranslateError> {
        let plan = self.plan;
        let cx = self.cx;
        if !plan.decl.kind.is_protocol() {
            self.class_extension()?;
        }

        if !cx.options.is_arc() && !cx.options.private_declarations_in_header {
            let mut any = false;
            for ivar in plan.ivars.iter().filter(|i| i.visibility == Visibility::Private) {
                if ivar.field.is_some() && ivar.is_strong_object() {
                    let ty = cx.types.decl_type(&ivar.ty, plan.decl.span)?;
                    self.out.writeln(&format!(
                        "J2OBJC_FIELD_SETTER({}, {}, {ty})",
                        plan.name, ivar.name
                    ));
                    any = true;
                }
            }
            if any {
                self.out.blank_line();
            }
        }

        for field in &plan.static_fields {
            let field = StaticField::new(cx, &plan.name, field)?;
            if field.is_private() {
                field.write_accessors(cx, &mut self.out, false);
                self.out.blank_line();
            }
        }

        for method in plan
            .methods
            .iter()
            .filter(|m| m.visibility == Visibility::Private)
        {
            if let Some(proto) = method_prototype(cx, plan, method)? {
                self.out
                    .writeln(&format!("__attribute__((unused)) static {proto};"));
                self.out.blank_line();
            }
        }
        for ctor in plan
            .constructors
            .iter()
            .filter(|c| c.is_function_only(plan.decl))
        {
            let protos = ctor_prototypes(cx, plan, ctor)?;
            self.out
                .writeln(&format!("__attribute__((unused)) static {};", protos.init));
            self.out.blank_line();
            if has_allocators(plan) {
                self.out.writeln(&format!(
                    "__attribute__((unused)) static {} NS_RETURNS_RETAINED;",
                    protos.new
                ));
                self.out.blank_line();
                self.out
                    .writeln(&format!("__attribute__((unused)) static {};", protos.create));
                self.out.blank_line();
            }
        }
        Ok(())
    }

    /// `@interface Foo ()` with private ivars and private methods.
    fn class_extension(&mut self) -> Result<(), TranslateError> {
        let plan = self.plan;
        let cx = self.cx;
        let ivars: Vec<_> = if plan.has_private_ivars(cx) {
            plan.ivars
                .iter()
                .filter(|i| i.visibility == Visibility::Private)
                .collect()
        } else {
            Vec::new()
        };
        let methods: Vec<_> = self.private_methods().collect();
        if ivars.is_empty() && methods.is_empty() {
            return Ok(());
        }
        if ivars.is_empty() {
            self.out.writeln(&format!("@interface {} ()", plan.name));
        } else {
            self.out.writeln(&format!("@interface {} () {{", plan.name));
            self.out.writeln(" @public");
            for ivar in ivars {
                let qualifier = cx.types.storage_qualifier(ivar.ownership);
                let ty = cx.types.decl_type(&ivar.ty, plan.decl.span)?;
                self.out.writeln(&format!(
                    "  {qualifier}{};",
                    crate::stmt::declare(&ty, &ivar.name)
                ));
            }
            self.out.writeln("}");
        }
        self.out.blank_line();
        for method in methods {
            let head = method_head(cx, method)?;
            head.write(&mut self.out, method.decl.name_span);
            self.out.write(";\n");
            self.out.blank_line();
        }
        self.out.writeln("@end");
        self.out.blank_line();
        Ok(())
    }

    // ── Implementation part ──

    fn implementation(&mut self) -> Result<(), TranslateError> {
        let plan = self.plan;
        let cx = self.cx;
        let name = plan.name.clone();

        if plan.needs_initialize {
            self.out
                .writeln(&format!("J2OBJC_INITIALIZED_DEFN({name})"));
            self.out.blank_line();
        }
        let mut storage = false;
        for field in &plan.static_fields {
            let field = StaticField::new(cx, &name, field)?;
            if !field.is_private() && field.has_storage() {
                self.out.writeln(&format!("{};", field.definition(cx)));
                storage = true;
            }
        }
        if plan.decl.kind == TypeKind::Enum {
            let count = plan.decl.enum_constants().count();
            self.out
                .writeln(&format!("{name} *{name}_values_[{count}];"));
            storage = true;
        }
        if storage {
            self.out.blank_line();
        }

        if self.has_implementation_block() {
            self.out.writeln(&format!("@implementation {name}"));
            self.out.blank_line();
            self.members()?;
            self.out.writeln("@end");
            self.out.blank_line();
        }

        self.functions()?;
        if let Some(functions) = self.annotation_functions.take() {
            self.out.append(functions);
        }

        let literal = if plan.decl.kind.is_protocol() {
            "J2OBJC_INTERFACE_TYPE_LITERAL_SOURCE"
        } else {
            "J2OBJC_CLASS_TYPE_LITERAL_SOURCE"
        };
        self.out.writeln(&format!("{literal}({name})"));
        let package = plan.decl.name.package();
        if let Some(prefix) = cx.names.prefix_override(package) {
            self.out.blank_line();
            self.out.writeln(&format!(
                "J2OBJC_NAME_MAPPING({name}, \"{package}\", \"{prefix}\")"
            ));
        }
        Ok(())
    }

    /// Interfaces only get a class when they have static members.
    fn has_implementation_block(&self) -> bool {
        self.plan.decl.kind != TypeKind::Interface || has_companion(self.plan)
    }

    fn members(&mut self) -> Result<(), TranslateError> {
        let plan = self.plan;
        let cx = self.cx;
        let kind = plan.decl.kind;

        for accessor in accessors(cx, plan)? {
            self.out
                .writeln(&format!("+ ({}){} {{", accessor.ty, accessor.name));
            self.out
                .writeln(&format!("  return {}();", accessor.getter));
            self.out.writeln("}");
            self.out.blank_line();
            if let Some(setter) = &accessor.setter {
                self.out.writeln(&format!(
                    "+ (void){}({})value {{",
                    accessor.setter_selector(),
                    accessor.ty
                ));
                self.out.writeln(&format!("  {setter}(value);"));
                self.out.writeln("}");
                self.out.blank_line();
            }
        }

        if kind == TypeKind::Annotation {
            return self.annotation_members();
        }

        let props = properties(cx, plan)?;
        for property in &props {
            self.out.writeln(&format!(
                "@synthesize {} = {};",
                property.name, property.ivar
            ));
        }
        if !props.is_empty() {
            self.out.blank_line();
        }

        for ctor in &plan.constructors {
            if ctor.is_function_only(plan.decl) {
                continue;
            }
            let source = ctor.decl.map_or(plan.decl.span, |d| d.span);
            let head = ctor_head(cx, ctor, plan.decl.span)?;
            head.write(&mut self.out, source);
            self.out.write(" {\n");
            let mut args = vec!["self".to_owned()];
            args.extend(ctor.params.iter().map(|p| p.name.clone()));
            self.out
                .writeln(&format!("  {}({});", ctor.function, args.join(", ")));
            self.out.writeln("  return self;");
            self.out.writeln("}");
            self.out.blank_line();
        }

        for method in &plan.methods {
            if kind == TypeKind::Interface && !method.is_static() {
                continue;
            }
            self.method(method)?;
        }
        self.default_method_shims()?;

        if kind == TypeKind::Enum {
            self.enum_methods();
        }
        self.dealloc();
        if plan.needs_initialize {
            self.initialize()?;
        }
        self.write_reflection();
        Ok(())
    }

    fn write_reflection(&mut self) {
        if let Some(method) = self.reflection.take() {
            self.out.append(method);
            self.out.blank_line();
        }
    }

    fn method(&mut self, method: &MethodPlan<'_>) -> Result<(), TranslateError> {
        let cx = self.cx;
        let decl = method.decl;
        let head = method_head(cx, method)?;
        head.write(&mut self.out, decl.name_span);
        self.out.write(" {\n");
        let returns = !decl.return_type.is_void();
        if let Some(function) = &method.function {
            let mut args = Vec::with_capacity(decl.params.len() + 1);
            if !method.is_static() {
                args.push("self".to_owned());
            }
            args.extend(decl.params.iter().map(|p| cx.names.param_name(&p.name)));
            let call = format!("{function}({})", args.join(", "));
            if returns {
                self.out.writeln(&format!("  return {call};"));
            } else {
                self.out.writeln(&format!("  {call};"));
            }
        } else if method.is_abstract() {
            self.out.writeln("  // can't call an abstract method");
            self.out
                .writeln("  [self doesNotRecognizeSelector:_cmd];");
            if returns {
                self.out
                    .writeln(&format!("  return {};", zero_value(&decl.return_type)));
            }
        } else {
            let body = self.method_body(method, BodyKind::Method)?;
            self.out.append(body);
        }
        self.out.writeln("}");
        self.out.blank_line();
        Ok(())
    }

    /// Statements of a method, indented one level, with its parameters
    /// bound and any synchronization or pool scope opened.
    fn method_body(&self, method: &MethodPlan<'_>, kind: BodyKind) -> Result<SourceWriter, TranslateError> {
        let cx = self.cx;
        let decl = method.decl;
        let mut gen = BodyGen::new(cx, self.plan.decl, kind);
        gen.out.indent();
        for p in &decl.params {
            gen.bind(&p.name, &cx.names.param_name(&p.name));
        }
        if method.is_static() && kind == BodyKind::Function {
            gen.out.writeln(&format!("{}_initialize();", self.name()));
        }
        let mut scopes = 0;
        if decl.modifiers.contains(Modifiers::SYNCHRONIZED) {
            let lock = if method.is_static() {
                format!("{}_class_()", self.name())
            } else {
                "self".to_owned()
            };
            gen.out.writeln(&format!("@synchronized({lock}) {{"));
            gen.out.indent();
            scopes += 1;
        }
        if xlat_ir::find_annotation(&decl.annotations, xlat_ir::well_known::AUTORELEASE_POOL).is_some() {
            gen.out.writeln("@autoreleasepool {");
            gen.out.indent();
            scopes += 1;
        }
        if let Some(native) = &decl.native_code {
            for line in native_lines(cx, native, decl.span) {
                gen.out.writeln(&line);
            }
        } else if let Some(body) = decl.body {
            gen.block_contents(body)?;
        }
        for _ in 0..scopes {
            gen.out.dedent();
            gen.out.writeln("}");
        }
        Ok(gen.out)
    }

    /// Classes implementing an interface's default method without
    /// overriding it forward to the interface's function.
    fn default_method_shims(&mut self) -> Result<(), TranslateError> {
        let plan = self.plan;
        let cx = self.cx;
        if plan.decl.kind.is_protocol() {
            return Ok(());
        }
        let mut pending: Vec<_> = plan.decl.interfaces.iter().map(|i| i.name.clone()).collect();
        let mut seen = rustc_hash::FxHashSet::default();
        let mut emitted = rustc_hash::FxHashSet::default();
        while let Some(interface) = pending.pop() {
            if !seen.insert(interface.clone()) {
                continue;
            }
            if let Some(supers) = cx.index.direct_supertypes(&interface) {
                pending.extend(supers);
            }
            let Some(summary) = cx.index.get(&interface) else {
                continue;
            };
            for default in &summary.default_methods {
                let selector = crate::signature::method_selector(cx.names, default)?;
                let overridden = plan.methods.iter().any(|m| m.selector == selector);
                if overridden || !emitted.insert(selector.clone()) {
                    continue;
                }
                cx.reference_name(&interface);
                let shim = MethodPlan::inherited(cx.names, default, selector.clone());
                let head = method_head(cx, &shim)?;
                head.write(&mut self.out, xlat_ir::Span::DUMMY);
                self.out.write(" {\n");
                let mut args = vec!["self".to_owned()];
                args.extend(default.params.iter().map(|p| cx.names.param_name(&p.name)));
                let call = format!(
                    "{}({})",
                    crate::signature::function_name(cx.names, &interface, &selector),
                    args.join(", ")
                );
                if default.return_type.is_void() {
                    self.out.writeln(&format!("  {call};"));
                } else {
                    self.out.writeln(&format!("  return {call};"));
                }
                self.out.writeln("}");
                self.out.blank_line();
            }
        }
        Ok(())
    }

    fn enum_methods(&mut self) {
        let name = self.plan.name.clone();
        self.out.writeln("+ (IOSObjectArray *)values {");
        self.out.writeln(&format!("  return {name}_values();"));
        self.out.writeln("}");
        self.out.blank_line();
        self.out
            .writeln(&format!("+ ({name} *)valueOfWithNSString:(NSString *)name {{"));
        self.out
            .writeln(&format!("  return {name}_valueOfWithNSString_(name);"));
        self.out.writeln("}");
        self.out.blank_line();
        if self.plan.decl.enum_constants().next().is_some() {
            self.out.writeln(&format!("- ({name}_Enum)toNSEnum {{"));
            self.out
                .writeln(&format!("  return ({name}_Enum)[self ordinal];"));
            self.out.writeln("}");
            self.out.blank_line();
        }
    }

    /// Reference counting releases every strong object ivar.
    fn dealloc(&mut self) {
        if self.cx.options.is_arc() {
            return;
        }
        let strong: Vec<&str> = self
            .plan
            .ivars
            .iter()
            .filter(|i| i.is_strong_object())
            .map(|i| i.name.as_str())
            .collect();
        if strong.is_empty() {
            return;
        }
        self.out.writeln("- (void)dealloc {");
        for ivar in strong {
            self.out.writeln(&format!("  RELEASE_({ivar});"));
        }
        self.out.writeln("  [super dealloc];");
        self.out.writeln("}");
        self.out.blank_line();
    }

    /// `+initialize`: enum constants, then static field initializers and
    /// static blocks in declaration order.
    fn initialize(&mut self) -> Result<(), TranslateError> {
        let plan = self.plan;
        let cx = self.cx;
        let name = &plan.name;
        let mut gen = BodyGen::new(cx, plan.decl, BodyKind::Method);
        gen.out.indent();
        gen.out.indent();

        for (ordinal, constant) in plan.decl.enum_constants().enumerate() {
            if constant.body_type.is_some() {
                return Err(TranslateError::Unsupported {
                    kind: "enum constant with a class body",
                    span: constant.span,
                });
            }
            let (function, mut args) = match &constant.ctor {
                Some(ctor) => {
                    let selector = crate::signature::ctor_ref_selector(cx.names, ctor);
                    let args = gen.call_args(&ctor.params, ctor.is_varargs(), constant.args)?;
                    (selector.replace(':', "_"), args)
                }
                None => {
                    let selector =
                        crate::signature::constructor_selector(cx.names, plan.decl, None);
                    (selector.replace(':', "_"), Vec::new())
                }
            };
            args.push(crate::literal::string_literal(&constant.name));
            args.push(ordinal.to_string());
            gen.out.writeln(&format!(
                "{name}_values_[{ordinal}] = new_{name}_{function}({});",
                args.join(", ")
            ));
        }

        for member in &plan.decl.members {
            match member {
                Member::Field(field) if field.is_static() => {
                    if crate::plan::needs_runtime_init(cx, field) {
                        if let Some(init) = field.initializer {
                            let text = gen.init_static(field, init)?;
                            gen.out.writeln(&format!("{text};"));
                        }
                    }
                }
                Member::Initializer(init) if init.is_static => gen.stmt(init.body)?,
                _ => {}
            }
        }
        gen.out.writeln(&format!("J2OBJC_SET_INITIALIZED({name})"));

        self.out.writeln("+ (void)initialize {");
        self.out
            .writeln(&format!("  if (self == [{name} class]) {{"));
        self.out.append(gen.out);
        self.out.writeln("  }");
        self.out.writeln("}");
        self.out.blank_line();
        Ok(())
    }

    // ── Annotation types ──

    fn annotation_members(&mut self) -> Result<(), TranslateError> {
        let plan = self.plan;
        let cx = self.cx;
        let name = plan.name.clone();
        let elements: Vec<&MethodPlan<'_>> = plan.methods.iter().filter(|m| !m.is_static()).collect();
        for element in &elements {
            self.out.writeln(&format!(
                "@synthesize {} = {};",
                element.selector,
                cx.names.ivar_name(&element.decl.name)
            ));
        }
        if !elements.is_empty() {
            self.out.blank_line();
        }
        for element in elements.iter().filter(|e| e.decl.default_value.is_some()) {
            let ty = cx.types.decl_type(&element.decl.return_type, element.decl.span)?;
            self.out
                .writeln(&format!("+ ({ty}){}Default {{", element.selector));
            self.out
                .writeln(&format!("  return {name}_{}Default();", element.selector));
            self.out.writeln("}");
            self.out.blank_line();
        }
        self.out.writeln("- (IOSClass *)annotationType {");
        self.out.writeln(&format!("  return {name}_class_();"));
        self.out.writeln("}");
        self.out.blank_line();
        self.out.writeln("- (NSString *)description {");
        self.out.writeln(&format!(
            "  return {};",
            crate::literal::string_literal(&format!("@{}()", plan.decl.name))
        ));
        self.out.writeln("}");
        self.out.blank_line();
        if !cx.options.is_arc() {
            let strong: Vec<String> = elements
                .iter()
                .filter(|e| e.decl.return_type.is_reference())
                .map(|e| cx.names.ivar_name(&e.decl.name))
                .collect();
            if !strong.is_empty() {
                self.out.writeln("- (void)dealloc {");
                for ivar in strong {
                    self.out.writeln(&format!("  RELEASE_({ivar});"));
                }
                self.out.writeln("  [super dealloc];");
                self.out.writeln("}");
                self.out.blank_line();
            }
        }
        self.write_reflection();
        Ok(())
    }
}

/// `0`, `false` or `nil` for a declared type.
fn zero_value(ty: &ResolvedType) -> &'static str {
    match ty.as_primitive() {
        Some(xlat_ir::PrimitiveKind::Boolean) => "false",
        Some(_) => "0",
        None => "nil",
    }
}

#[cfg(test)]
mod tests;
