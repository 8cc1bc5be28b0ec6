//! C functions written after `@end`.

use xlat_ir::{ExprRange, Member, QualifiedName, StmtKind, TypeKind};

use super::ImplGen;
use crate::decl::{ctor_prototypes, has_allocators, method_prototype, prototype};
use crate::lower::Ownership;
use crate::metadata::annotation_value;
use crate::plan::{CtorPlan, MethodPlan};
use crate::stmt::{BodyGen, BodyKind};
use crate::TranslateError;

/// How a constructor body starts.
enum Delegation {
    /// `this(...)`: the other constructor initializes fields.
    This,
    /// Explicit `super(...)`.
    Super,
    Implicit,
}

impl ImplGen<'_, '_> {
    pub(super) fn functions(&mut self) -> Result<(), TranslateError> {
        let plan = self.plan;
        for ctor in &plan.constructors {
            self.ctor_function(ctor)?;
            if has_allocators(plan) {
                self.allocators(ctor)?;
            }
        }
        for method in &plan.methods {
            if method.function.is_some() && !method.is_abstract() {
                self.method_function(method)?;
            }
        }
        match plan.decl.kind {
            TypeKind::Enum => self.enum_functions(),
            TypeKind::Annotation => self.annotation_functions()?,
            TypeKind::Class | TypeKind::Interface => {}
        }
        Ok(())
    }

    fn ctor_function(&mut self, ctor: &CtorPlan<'_>) -> Result<(), TranslateError> {
        let cx = self.cx;
        let plan = self.plan;
        let decl = plan.decl;
        let protos = ctor_prototypes(cx, plan, ctor)?;
        let mut gen = BodyGen::new(cx, decl, BodyKind::Function);
        gen.out.indent();
        if let Some(c) = ctor.decl {
            for p in &c.params {
                gen.bind(&p.name, &cx.names.param_name(&p.name));
            }
        }

        let retains = !cx.options.is_arc();
        if decl.has_outer_instance() {
            if retains && Ownership::of_outer(decl).is_strong() {
                gen.out
                    .writeln("JreStrongAssign(&self->this$0_, outer$);");
            } else {
                gen.out.writeln("self->this$0_ = outer$;");
            }
        }
        for (i, capture) in decl.captures.iter().enumerate() {
            if retains && capture.ty.is_reference() {
                gen.out.writeln(&format!(
                    "JreStrongAssign(&self->val${}_, capture${i});",
                    capture.name
                ));
            } else {
                gen.out
                    .writeln(&format!("self->val${}_ = capture${i};", capture.name));
            }
        }

        let body = ctor.decl.and_then(|c| c.body);
        let delegation = body.map_or(Delegation::Implicit, |b| self.delegation(b));
        match (delegation, body) {
            (Delegation::This, Some(body)) => {
                gen.block_tail(body, 0)?;
            }
            (Delegation::Super, Some(body)) => {
                self.first_statement(&mut gen, body)?;
                self.instance_initializers(&mut gen)?;
                gen.block_tail(body, 1)?;
            }
            (_, body) => {
                let call = gen.super_ctor_call(None, None, ExprRange::EMPTY)?;
                gen.out.writeln(&format!("{call};"));
                self.instance_initializers(&mut gen)?;
                if let Some(body) = body {
                    gen.block_tail(body, 0)?;
                }
            }
        }

        self.out.writeln(&format!("{} {{", protos.init));
        self.out.append(gen.out);
        self.out.writeln("}");
        self.out.blank_line();
        Ok(())
    }

    fn delegation(&self, body: xlat_ir::StmtId) -> Delegation {
        let arena = &self.cx.unit.arena;
        let first = match &arena.stmt(body).kind {
            StmtKind::Block(range) => arena.stmts(*range).first().copied(),
            _ => Some(body),
        };
        match first.map(|s| &arena.stmt(s).kind) {
            Some(StmtKind::ThisCall { .. }) => Delegation::This,
            Some(StmtKind::SuperCall { .. }) => Delegation::Super,
            _ => Delegation::Implicit,
        }
    }

    fn first_statement(&self, gen: &mut BodyGen<'_, '_>, body: xlat_ir::StmtId) -> Result<(), TranslateError> {
        let arena = &self.cx.unit.arena;
        match &arena.stmt(body).kind {
            StmtKind::Block(range) => match arena.stmts(*range).first() {
                Some(&first) => gen.stmt(first),
                None => Ok(()),
            },
            _ => gen.stmt(body),
        }
    }

    /// Instance field initializers and initializer blocks, in declaration
    /// order.
    fn instance_initializers(&self, gen: &mut BodyGen<'_, '_>) -> Result<(), TranslateError> {
        for member in &self.plan.decl.members {
            match member {
                Member::Field(field) if !field.is_static() => {
                    if let Some(init) = field.initializer {
                        let text = gen.init_ivar(field, init)?;
                        gen.out.writeln(&format!("{text};"));
                    }
                }
                Member::Initializer(init) if !init.is_static => gen.stmt(init.body)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn allocators(&mut self, ctor: &CtorPlan<'_>) -> Result<(), TranslateError> {
        let protos = ctor_prototypes(self.cx, self.plan, ctor)?;
        let mut args = vec![self.plan.name.clone(), ctor.function_suffix()];
        args.extend(ctor.params.iter().map(|p| p.name.clone()));
        let args = args.join(", ");
        self.out.writeln(&format!("{} {{", protos.new));
        self.out.writeln(&format!("  J2OBJC_NEW_IMPL({args})"));
        self.out.writeln("}");
        self.out.blank_line();
        self.out.writeln(&format!("{} {{", protos.create));
        self.out.writeln(&format!("  J2OBJC_CREATE_IMPL({args})"));
        self.out.writeln("}");
        self.out.blank_line();
        Ok(())
    }

    fn method_function(&mut self, method: &MethodPlan<'_>) -> Result<(), TranslateError> {
        let Some(proto) = method_prototype(self.cx, self.plan, method)? else {
            return Ok(());
        };
        let body = self.method_body(method, BodyKind::Function)?;
        self.out.writeln(&format!("{proto} {{"));
        self.out.append(body);
        self.out.writeln("}");
        self.out.blank_line();
        Ok(())
    }

    fn enum_functions(&mut self) {
        let name = self.plan.name.clone();
        let count = self.plan.decl.enum_constants().count();
        self.cx
            .reference_name(&QualifiedName::new("java.lang", "IllegalArgumentException"));
        let lines = [
            format!("IOSObjectArray *{name}_values(void) {{"),
            format!("  {name}_initialize();"),
            format!(
                "  return [IOSObjectArray arrayWithObjects:{name}_values_ count:{count} type:{name}_class_()];"
            ),
            "}".to_owned(),
            String::new(),
            format!("{name} *{name}_valueOfWithNSString_(NSString *name) {{"),
            format!("  {name}_initialize();"),
            format!("  for (jint i = 0; i < {count}; i++) {{"),
            format!("    {name} *e = {name}_values_[i];"),
            "    if ([name isEqual:[e name]]) {".to_owned(),
            "      return e;".to_owned(),
            "    }".to_owned(),
            "  }".to_owned(),
            "  @throw create_JavaLangIllegalArgumentException_initWithNSString_(name);".to_owned(),
            "  return nil;".to_owned(),
            "}".to_owned(),
            String::new(),
            format!("{name} *{name}_fromOrdinal(jint ordinal) {{"),
            format!("  {name}_initialize();"),
            format!("  if (ordinal < 0 || ordinal >= {count}) {{"),
            "    return nil;".to_owned(),
            "  }".to_owned(),
            format!("  return {name}_values_[ordinal];"),
            "}".to_owned(),
        ];
        for line in &lines {
            self.out.writeln(line);
        }
        self.out.blank_line();
    }

    fn annotation_functions(&mut self) -> Result<(), TranslateError> {
        let cx = self.cx;
        let plan = self.plan;
        let name = plan.name.clone();
        let elements: Vec<&MethodPlan<'_>> = plan.methods.iter().filter(|m| !m.is_static()).collect();
        for element in &elements {
            let Some(default) = &element.decl.default_value else {
                continue;
            };
            let ty = cx.types.decl_type(&element.decl.return_type, element.decl.span)?;
            let function = format!("{name}_{}Default", element.selector);
            self.out
                .writeln(&format!("{} {{", prototype(&ty, &function, &[])));
            self.out.writeln(&format!(
                "  return {};",
                annotation_value(cx, &element.decl.return_type, default)
            ));
            self.out.writeln("}");
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
            "{} {{",
            prototype(&format!("id<{name}>"), &format!("create_{name}"), &params)
        ));
        self.out.writeln(&format!(
            "  {name} *self = AUTORELEASE([[{name} alloc] init]);"
        ));
        let retains = !cx.options.is_arc();
        for (element, (_, param)) in elements.iter().zip(&params) {
            let ivar = cx.names.ivar_name(&element.decl.name);
            if retains && element.decl.return_type.is_reference() {
                self.out
                    .writeln(&format!("  self->{ivar} = RETAIN_({param});"));
            } else {
                self.out.writeln(&format!("  self->{ivar} = {param};"));
            }
        }
        self.out.writeln("  return self;");
        self.out.writeln("}");
        self.out.blank_line();
        Ok(())
    }
}
