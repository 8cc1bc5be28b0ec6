//! Statement lowering.
//!
//! A [`BodyGen`] lowers one method, constructor or initializer body into
//! its writer. Statements are written line by line; expressions are
//! lowered to strings first (see `expr`) because most of them are
//! rewritten around their operands.

mod expr;
mod place;

use rustc_hash::FxHashMap;
use xlat_diagnostic::ErrorCode;
use xlat_ir::{
    CaseLabel, CtorRef, ExprArena, ExprId, ExprRange, QualifiedName, ResolvedType, StmtId,
    StmtKind, SwitchCase, SwitchKind, TypeDecl, TypeKind,
};

use crate::context::UnitContext;
use crate::literal;
use crate::lower::{primitive_type, Ownership};
use crate::mangle::encode_identifier;
use crate::signature::ctor_ref_selector;
use crate::stack::ensure_sufficient_stack;
use crate::writer::SourceWriter;
use crate::TranslateError;

/// `T name` with the pointer star attached to the name.
pub(crate) fn declare(ty: &str, name: &str) -> String {
    if ty.ends_with('*') {
        format!("{ty}{name}")
    } else {
        format!("{ty} {name}")
    }
}

/// Where a body is emitted.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum BodyKind {
    /// An Objective-C method; `super` messages are available.
    Method,
    /// A C function taking `self` explicitly.
    Function,
}

struct LabelState {
    name: String,
    break_used: bool,
    continue_used: bool,
}

pub(crate) struct BodyGen<'c, 'a> {
    cx: &'c UnitContext<'a>,
    owner: &'a TypeDecl,
    kind: BodyKind,
    pub out: SourceWriter,
    /// Source name → generated name, innermost scope last.
    scopes: Vec<FxHashMap<String, String>>,
    labels: Vec<LabelState>,
    /// Label attached to the loop about to be lowered.
    pending_label: Option<String>,
}

impl<'c, 'a> BodyGen<'c, 'a> {
    pub fn new(cx: &'c UnitContext<'a>, owner: &'a TypeDecl, kind: BodyKind) -> Self {
        BodyGen {
            cx,
            owner,
            kind,
            out: SourceWriter::new(),
            scopes: vec![FxHashMap::default()],
            labels: Vec::new(),
            pending_label: None,
        }
    }

    fn arena(&self) -> &'a ExprArena {
        &self.cx.unit.arena
    }

    /// Bring a parameter into scope under its generated name.
    pub fn bind(&mut self, source: &str, generated: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(source.to_owned(), generated.to_owned());
        }
    }

    fn declare_local(&mut self, source: &str) -> String {
        let generated = self.cx.names.variable_name(source);
        self.bind(source, &generated);
        generated
    }

    fn lookup(&self, source: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(source))
            .map(String::as_str)
    }

    /// Statements of a block without its braces; any other statement as is.
    pub fn block_contents(&mut self, id: StmtId) -> Result<(), TranslateError> {
        match &self.arena().stmt(id).kind {
            StmtKind::Block(range) => {
                self.scopes.push(FxHashMap::default());
                for &s in self.arena().stmts(*range) {
                    self.stmt(s)?;
                }
                self.scopes.pop();
                Ok(())
            }
            _ => self.stmt(id),
        }
    }

    /// Statements of a block, skipping the first `skip`.
    pub fn block_tail(&mut self, id: StmtId, skip: usize) -> Result<(), TranslateError> {
        match &self.arena().stmt(id).kind {
            StmtKind::Block(range) => {
                for &s in self.arena().stmts(*range).iter().skip(skip) {
                    self.stmt(s)?;
                }
                Ok(())
            }
            _ if skip == 0 => self.stmt(id),
            _ => Ok(()),
        }
    }

    pub fn stmt(&mut self, id: StmtId) -> Result<(), TranslateError> {
        ensure_sufficient_stack(|| self.lower_stmt(id))
    }

    #[expect(
        clippy::too_many_lines,
        reason = "one arm per statement kind reads best as a single match"
    )]
    fn lower_stmt(&mut self, id: StmtId) -> Result<(), TranslateError> {
        let stmt = self.arena().stmt(id);
        if self.cx.options.line_directives
            && !stmt.span.is_dummy()
            && !matches!(stmt.kind, StmtKind::Block(_))
        {
            let line = self.cx.line(stmt.span);
            self.out.line_directive(line, &self.cx.unit.file_name);
        }
        let label = self.pending_label.take();
        match &stmt.kind {
            StmtKind::Block(_) => {
                self.out.writeln("{");
                self.out.indent();
                self.block_contents(id)?;
                self.out.dedent();
                self.out.writeln("}");
            }
            StmtKind::Local {
                name,
                ty,
                init,
                annotations,
            } => {
                let init = init.map(|e| self.expr(e)).transpose()?;
                let qualifier = self
                    .cx
                    .types
                    .storage_qualifier(Ownership::of_local(ty, annotations));
                self.cx.reference(ty);
                let generated = self.declare_local(name);
                let declared = declare(&self.cx.types.objc_type(ty), &generated);
                match init {
                    Some(init) => self.out.writeln(&format!("{qualifier}{declared} = {init};")),
                    None => self.out.writeln(&format!("{qualifier}{declared};")),
                }
            }
            StmtKind::Expr(e) => {
                let text = self.expr(*e)?;
                self.out.writeln(&format!("{text};"));
            }
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => self.if_chain(*cond, *then, *otherwise)?,
            StmtKind::While {
                cond,
                body,
                autorelease,
            } => {
                let cond = self.expr(*cond)?;
                self.out.writeln(&format!("while ({cond}) {{"));
                self.loop_body(*body, *autorelease, label)?;
                self.out.writeln("}");
            }
            StmtKind::DoWhile { body, cond } => {
                self.out.writeln("do {");
                self.loop_body(*body, false, label)?;
                let cond = self.expr(*cond)?;
                self.out.writeln(&format!("}} while ({cond});"));
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
                autorelease,
            } => {
                self.scopes.push(FxHashMap::default());
                let init = self.for_init(*init)?;
                let cond = cond.map(|c| self.expr(c)).transpose()?.unwrap_or_default();
                let update = self.expr_list(*update)?.join(", ");
                self.out
                    .writeln(&format!("for ({init}; {cond}; {update}) {{"));
                self.loop_body(*body, *autorelease, label)?;
                self.out.writeln("}");
                self.scopes.pop();
            }
            StmtKind::ForEach {
                var,
                var_ty,
                iterable,
                body,
                autorelease,
            } => self.for_each(var, var_ty, *iterable, *body, *autorelease, label)?,
            StmtKind::Labeled { label, body } => {
                let name = self.cx.names.variable_name(label);
                self.labels.push(LabelState {
                    name: label.clone(),
                    break_used: false,
                    continue_used: false,
                });
                self.pending_label = Some(label.clone());
                self.stmt(*body)?;
                self.pending_label = None;
                if let Some(state) = self.labels.pop() {
                    if state.break_used {
                        self.out.writeln(&format!("break_{name}: ;"));
                    }
                }
            }
            StmtKind::Break(target) => match target {
                Some(target) => {
                    self.mark_label(target, true);
                    let name = self.cx.names.variable_name(target);
                    self.out.writeln(&format!("goto break_{name};"));
                }
                None => self.out.writeln("break;"),
            },
            StmtKind::Continue(target) => match target {
                Some(target) => {
                    self.mark_label(target, false);
                    let name = self.cx.names.variable_name(target);
                    self.out.writeln(&format!("goto continue_{name};"));
                }
                None => self.out.writeln("continue;"),
            },
            StmtKind::Return(value) => match value {
                Some(value) => {
                    let value = self.expr(*value)?;
                    self.out.writeln(&format!("return {value};"));
                }
                None => self.out.writeln("return;"),
            },
            StmtKind::Throw(e) => {
                let thrown = self.receiver(*e)?;
                self.out.writeln(&format!("@throw {thrown};"));
            }
            StmtKind::Switch {
                selector,
                kind,
                cases,
            } => self.switch(*selector, *kind, cases)?,
            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                self.out.writeln("@try {");
                self.out.indent();
                self.block_contents(*body)?;
                self.out.dedent();
                self.out.writeln("}");
                for clause in catches {
                    for ty in &clause.types {
                        self.cx.reference(ty);
                        self.scopes.push(FxHashMap::default());
                        let name = self.declare_local(&clause.name);
                        let declared = declare(&self.cx.types.objc_type(ty), &name);
                        self.out.writeln(&format!("@catch ({declared}) {{"));
                        self.out.indent();
                        self.block_contents(clause.body)?;
                        self.out.dedent();
                        self.out.writeln("}");
                        self.scopes.pop();
                    }
                }
                if let Some(finally) = finally {
                    self.out.writeln("@finally {");
                    self.out.indent();
                    self.block_contents(*finally)?;
                    self.out.dedent();
                    self.out.writeln("}");
                }
            }
            StmtKind::Synchronized { lock, body } => {
                let lock = self.receiver(*lock)?;
                self.out.writeln(&format!("@synchronized({lock}) {{"));
                self.out.indent();
                self.block_contents(*body)?;
                self.out.dedent();
                self.out.writeln("}");
            }
            StmtKind::Assert { cond, message } => {
                let text = self.expr(*cond)?;
                let message = match message {
                    Some(m) => self.assert_message(*m)?,
                    None => self.synthesized_assert_message(id, *cond),
                };
                self.out.writeln(&format!("JreAssert({text}, {message});"));
            }
            StmtKind::ThisCall { ctor, args } => {
                let call = self.this_call(ctor, *args)?;
                self.out.writeln(&format!("{call};"));
            }
            StmtKind::SuperCall { ctor, outer, args } => {
                let call = self.super_ctor_call(Some(ctor), *outer, *args)?;
                self.out.writeln(&format!("{call};"));
            }
            StmtKind::Native(text) => {
                for line in native_lines(self.cx, text, stmt.span) {
                    self.out.writeln(&line);
                }
            }
            StmtKind::Empty => self.out.writeln(";"),
        }
        Ok(())
    }

    fn mark_label(&mut self, target: &str, is_break: bool) {
        if let Some(state) = self.labels.iter_mut().rev().find(|l| l.name == target) {
            if is_break {
                state.break_used = true;
            } else {
                state.continue_used = true;
            }
        }
    }

    fn if_chain(
        &mut self,
        cond: ExprId,
        then: StmtId,
        otherwise: Option<StmtId>,
    ) -> Result<(), TranslateError> {
        let cond = self.expr(cond)?;
        self.out.writeln(&format!("if ({cond}) {{"));
        let mut then = then;
        let mut otherwise = otherwise;
        loop {
            self.out.indent();
            self.block_contents(then)?;
            self.out.dedent();
            let Some(next) = otherwise else {
                self.out.writeln("}");
                return Ok(());
            };
            if let StmtKind::If {
                cond,
                then: next_then,
                otherwise: next_otherwise,
            } = &self.arena().stmt(next).kind
            {
                let cond = self.expr(*cond)?;
                self.out.writeln("}");
                self.out.writeln(&format!("else if ({cond}) {{"));
                then = *next_then;
                otherwise = *next_otherwise;
            } else {
                self.out.writeln("}");
                self.out.writeln("else {");
                self.out.indent();
                self.block_contents(next)?;
                self.out.dedent();
                self.out.writeln("}");
                return Ok(());
            }
        }
    }

    /// Loop body inside the loop's braces: the optional per-iteration
    /// autorelease pool, then the `continue` label when one was used.
    fn loop_body(
        &mut self,
        body: StmtId,
        autorelease: bool,
        label: Option<String>,
    ) -> Result<(), TranslateError> {
        self.out.indent();
        if autorelease {
            self.out.writeln("@autoreleasepool {");
            self.out.indent();
        }
        self.block_contents(body)?;
        if autorelease {
            self.out.dedent();
            self.out.writeln("}");
        }
        if let Some(label) = label {
            let used = self
                .labels
                .iter()
                .rev()
                .find(|l| l.name == label)
                .is_some_and(|l| l.continue_used);
            if used {
                let name = self.cx.names.variable_name(&label);
                self.out.writeln(&format!("continue_{name}: ;"));
            }
        }
        self.out.dedent();
        Ok(())
    }

    fn for_init(&mut self, init: xlat_ir::StmtRange) -> Result<String, TranslateError> {
        let ids = self.arena().stmts(init);
        let mut declared_type: Option<String> = None;
        let mut pieces = Vec::new();
        for &id in ids {
            match &self.arena().stmt(id).kind {
                StmtKind::Local { name, ty, init, .. } => {
                    let value = init.map(|e| self.expr(e)).transpose()?;
                    let objc = self.cx.types.objc_type(ty);
                    let generated = self.declare_local(name);
                    let var = if declared_type.is_none() {
                        declared_type = Some(objc.clone());
                        declare(&objc, &generated)
                    } else if objc.ends_with('*') {
                        format!("*{generated}")
                    } else {
                        generated
                    };
                    pieces.push(match value {
                        Some(v) => format!("{var} = {v}"),
                        None => var,
                    });
                }
                StmtKind::Expr(e) => pieces.push(self.expr(*e)?),
                _ => {
                    return Err(TranslateError::internal(
                        "for-loop initializer must be a declaration or expression",
                        self.arena().stmt(id).span,
                    ))
                }
            }
        }
        Ok(pieces.join(", "))
    }

    fn for_each(
        &mut self,
        var: &str,
        var_ty: &ResolvedType,
        iterable: ExprId,
        body: StmtId,
        autorelease: bool,
        label: Option<String>,
    ) -> Result<(), TranslateError> {
        let iterable_ty = &self.arena().expr(iterable).ty;
        let source = self.receiver(iterable)?;
        self.cx.reference(var_ty);
        self.scopes.push(FxHashMap::default());
        if let ResolvedType::Array(array) = iterable_ty {
            let class = crate::lower::array_class(array);
            let element_ptr = match array.element.as_primitive() {
                Some(kind) if array.dimensions == 1 => format!("{} const *", primitive_type(kind)),
                _ => "id const *".to_owned(),
            };
            let base = self.out.fresh_temp();
            let cursor = self.out.fresh_temp();
            let end = self.out.fresh_temp();
            self.out.writeln("{");
            self.out.indent();
            self.out
                .writeln(&format!("{} = {source};", declare(&format!("{class} *"), &base)));
            self.out
                .writeln(&format!("{} = {base}->buffer_;", declare(&element_ptr, &cursor)));
            self.out.writeln(&format!(
                "{} = {cursor} + {base}->size_;",
                declare(&element_ptr, &end)
            ));
            self.out.writeln(&format!("while ({cursor} < {end}) {{"));
            self.out.indent();
            let name = self.declare_local(var);
            let declared = declare(&self.cx.types.objc_type(var_ty), &name);
            self.out.writeln(&format!("{declared} = *{cursor}++;"));
            self.out.dedent();
            self.loop_body(body, autorelease, label)?;
            self.out.writeln("}");
            self.out.dedent();
            self.out.writeln("}");
        } else {
            let name = self.declare_local(var);
            let declared = declare(&self.cx.types.objc_type(var_ty), &name);
            self.out
                .writeln(&format!("for ({declared} in {source}) {{"));
            self.loop_body(body, autorelease, label)?;
            self.out.writeln("}");
        }
        self.scopes.pop();
        Ok(())
    }

    fn switch(
        &mut self,
        selector: ExprId,
        kind: SwitchKind,
        cases: &[SwitchCase],
    ) -> Result<(), TranslateError> {
        let mut strings: Vec<&str> = Vec::new();
        let head = match kind {
            SwitchKind::Integral => format!("switch ({}) {{", self.expr(selector)?),
            SwitchKind::Enum => format!("switch ([{} ordinal]) {{", self.receiver(selector)?),
            SwitchKind::String => {
                let value = self.receiver(selector)?;
                for case in cases {
                    for label in &case.labels {
                        if let CaseLabel::Constant(xlat_ir::Constant::String(s)) = label {
                            strings.push(s);
                        }
                    }
                }
                let literals: Vec<String> = strings.iter().map(|s| literal::string_literal(s)).collect();
                format!(
                    "switch (JreIndexOfStr({value}, (id[]){{ {} }}, {})) {{",
                    literals.join(", "),
                    literals.len()
                )
            }
        };
        // Switch-block locals are in scope for every later case.
        let hoisted: Vec<StmtId> = cases
            .iter()
            .flat_map(|case| self.arena().stmts(case.body).iter().copied())
            .filter(|&s| matches!(self.arena().stmt(s).kind, StmtKind::Local { .. }))
            .collect();
        if !hoisted.is_empty() {
            self.out.writeln("{");
            self.out.indent();
            self.scopes.push(FxHashMap::default());
            for &s in &hoisted {
                if let StmtKind::Local {
                    name,
                    ty,
                    annotations,
                    ..
                } = &self.arena().stmt(s).kind
                {
                    let qualifier = self
                        .cx
                        .types
                        .storage_qualifier(Ownership::of_local(ty, annotations));
                    self.cx.reference(ty);
                    let generated = self.declare_local(name);
                    let declared = declare(&self.cx.types.objc_type(ty), &generated);
                    self.out.writeln(&format!("{qualifier}{declared};"));
                }
            }
        }
        self.out.writeln(&head);
        self.out.indent();
        for (position, case) in cases.iter().enumerate() {
            if case.labels.is_empty() {
                self.out.writeln("default:");
            }
            for label in &case.labels {
                let text = match label {
                    CaseLabel::Constant(xlat_ir::Constant::String(s)) if kind == SwitchKind::String => {
                        strings.iter().position(|x| *x == s.as_str()).unwrap_or(0).to_string()
                    }
                    CaseLabel::Constant(c) => literal::constant(c),
                    CaseLabel::EnumConstant { ty, name } => {
                        let mut suffix = String::new();
                        encode_identifier(&mut suffix, name, false);
                        format!("{}_Enum_{suffix}", self.cx.names.full_name(ty))
                    }
                };
                self.out.writeln(&format!("case {text}:"));
            }
            let body = self.arena().stmts(case.body);
            self.out.indent();
            let mut wrote = false;
            for &s in body {
                match &self.arena().stmt(s).kind {
                    StmtKind::Local { name, init, .. } => {
                        if let Some(init) = init {
                            let value = self.expr(*init)?;
                            let target = self.lookup(name).unwrap_or(name.as_str()).to_owned();
                            self.out.writeln(&format!("{target} = {value};"));
                            wrote = true;
                        }
                    }
                    _ => {
                        self.stmt(s)?;
                        wrote = true;
                    }
                }
            }
            if !wrote && position + 1 == cases.len() {
                // A label cannot end a compound statement.
                self.out.writeln(";");
            }
            self.out.dedent();
        }
        self.out.dedent();
        self.out.writeln("}");
        if !hoisted.is_empty() {
            self.scopes.pop();
            self.out.dedent();
            self.out.writeln("}");
        }
        Ok(())
    }

    fn assert_message(&mut self, message: ExprId) -> Result<String, TranslateError> {
        let ty = &self.arena().expr(message).ty;
        if ty.is_string() {
            return self.expr(message);
        }
        let (format, args) = self.concat_parts(&[message])?;
        Ok(format!("JreStrcat(\"{format}\", {})", args.join(", ")))
    }

    /// `File.java:12 condition failed: assert a < b;`
    fn synthesized_assert_message(&self, stmt: StmtId, cond: ExprId) -> String {
        let span = self.arena().stmt(stmt).span;
        let text = self
            .cx
            .source_text(span)
            .map(|s| s.trim().to_owned())
            .or_else(|| {
                self.cx
                    .source_text(self.arena().expr(cond).span)
                    .map(|c| format!("assert {};", c.trim()))
            })
            .unwrap_or_else(|| "assert".to_owned());
        let line = self.cx.line(span);
        literal::string_literal(&format!(
            "{}:{line} condition failed: {text}",
            self.cx.unit.base_name()
        ))
    }

    /// `this(...)`: delegate to another designated initializer of the same
    /// type, forwarding the synthesized leading and enum parameters.
    fn this_call(&mut self, ctor: &CtorRef, args: ExprRange) -> Result<String, TranslateError> {
        let selector = ctor_ref_selector(self.cx.names, ctor);
        let mut lowered = vec!["self".to_owned()];
        lowered.extend(self.synthetic_forwards());
        lowered.extend(self.call_args(&ctor.params, ctor.is_varargs(), args)?);
        if self.owner.kind == TypeKind::Enum {
            lowered.push("__name".to_owned());
            lowered.push("__ordinal".to_owned());
        }
        Ok(format!(
            "{}_{}({})",
            self.cx.names.full_name(&self.owner.name),
            selector.replace(':', "_"),
            lowered.join(", ")
        ))
    }

    fn synthetic_forwards(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.owner.has_outer_instance() {
            out.push("outer$".to_owned());
        }
        out.extend((0..self.owner.captures.len()).map(|i| format!("capture${i}")));
        out
    }

    /// Superclass initialization: the explicit `super(...)` call, or the
    /// implicit no-argument one when `ctor` is `None`.
    pub fn super_ctor_call(
        &mut self,
        ctor: Option<&CtorRef>,
        outer: Option<ExprId>,
        args: ExprRange,
    ) -> Result<String, TranslateError> {
        let superclass = match &self.owner.superclass {
            Some(sup) => sup.name.clone(),
            None if self.owner.kind == TypeKind::Enum => QualifiedName::new("java.lang", "Enum"),
            None => return Ok("NSObject_init(self)".to_owned()),
        };
        if superclass.is("java.lang", "Enum") {
            self.cx.reference_name(&superclass);
            return Ok("JavaLangEnum_initWithNSString_withInt_(self, __name, __ordinal)".to_owned());
        }
        if superclass.is_object() {
            return Ok("NSObject_init(self)".to_owned());
        }
        self.cx.reference_name(&superclass);
        let super_name = self.cx.names.full_name(&superclass);
        let Some(ctor) = ctor else {
            let base = self.implicit_super_base(&superclass);
            return Ok(format!("{super_name}_{base}(self)"));
        };
        let selector = ctor_ref_selector(self.cx.names, ctor);
        let mut lowered = vec!["self".to_owned()];
        if let Some(outer) = outer {
            lowered.push(self.receiver(outer)?);
        } else if !ctor.leading.is_empty() {
            lowered.push(if self.owner.has_outer_instance() {
                "outer$".to_owned()
            } else {
                "self".to_owned()
            });
        }
        lowered.extend(self.call_args(&ctor.params, ctor.is_varargs(), args)?);
        Ok(format!(
            "{super_name}_{}({})",
            selector.replace(':', "_"),
            lowered.join(", ")
        ))
    }

    fn implicit_super_base(&self, superclass: &QualifiedName) -> &'static str {
        match self.cx.index.get(superclass) {
            Some(summary) => {
                crate::signature::constructor_base(&summary.name, summary.kind, summary.modifiers)
            }
            None => "init",
        }
    }

    fn expr_list(&mut self, range: ExprRange) -> Result<Vec<String>, TranslateError> {
        self.arena()
            .exprs(range)
            .iter()
            .map(|&e| self.expr(e))
            .collect()
    }
}

/// Body lines of a native code block, delimiters removed and common
/// indentation stripped. Legacy or mismatched delimiters are accepted with
/// a warning.
pub(crate) fn native_lines(cx: &UnitContext<'_>, text: &str, span: xlat_ir::Span) -> Vec<String> {
    const MISMATCH: &str = "native code block delimiters do not match";
    let trimmed = text.trim();
    let (inner, problem) = if let Some(rest) = trimmed.strip_prefix("/*-[") {
        match rest.strip_suffix("]-*/") {
            Some(inner) => (inner, None),
            None => (rest.strip_suffix("}-*/").unwrap_or(rest), Some(MISMATCH)),
        }
    } else if let Some(rest) = trimmed.strip_prefix("/*-{") {
        match rest.strip_suffix("}-*/") {
            Some(inner) => (
                inner,
                Some("legacy native code delimiters `/*-{ }-*/`; use `/*-[ ]-*/`"),
            ),
            None => (rest.strip_suffix("]-*/").unwrap_or(rest), Some(MISMATCH)),
        }
    } else {
        (trimmed, Some(MISMATCH))
    };
    if let Some(problem) = problem {
        cx.warn(ErrorCode::W5002, problem, span);
    }

    let lines: Vec<&str> = inner.lines().map(str::trim_end).collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return Vec::new();
    };
    let body = &lines[first..=last];
    let margin = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    body.iter()
        .map(|l| l.get(margin..).unwrap_or_else(|| l.trim_start()).to_owned())
        .collect()
}
