//! Expression lowering.
//!
//! Expressions are lowered to strings. Anything Java defines more strictly
//! than C (null receivers, shift counts, float-to-int conversion, checked
//! casts, covariant array stores) goes through a runtime helper.

use xlat_diagnostic::ErrorCode;
use xlat_ir::{
    ArrayType, AssignOp, BinaryOp, Constant, CtorRef, ExprId, ExprKind, ExprRange, FieldDecl,
    FieldRef, MethodRef, Modifiers, PrimitiveKind, QualifiedName, ResolvedType, Span, UnaryOp,
};

use super::place::Place;
use super::{BodyGen, BodyKind};
use crate::index::Assignable;
use crate::literal;
use crate::lower::{array_class, primitive_title, primitive_type, Ownership};
use crate::mangle::encode_identifier;
use crate::signature::{call_selector, ctor_ref_selector, function_name};
use crate::stack::ensure_sufficient_stack;
use crate::TranslateError;

/// Objective-C message send: `[recv a:x b:y]`.
pub(crate) fn message(receiver: &str, selector: &str, args: &[String]) -> String {
    if args.is_empty() {
        return format!("[{receiver} {selector}]");
    }
    let parts: Vec<String> = selector
        .split_terminator(':')
        .zip(args)
        .map(|(keyword, arg)| format!("{keyword}:{arg}"))
        .collect();
    format!("[{receiver} {}]", parts.join(" "))
}

/// `JreStrcat` format character of an operand.
fn strcat_code(ty: &ResolvedType) -> char {
    match ty {
        ResolvedType::Primitive(kind) => match kind {
            PrimitiveKind::Boolean => 'Z',
            PrimitiveKind::Char => 'C',
            PrimitiveKind::Double => 'D',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Short => 'S',
            PrimitiveKind::Byte => 'B',
            PrimitiveKind::Void => '@',
        },
        t if t.is_string() => '$',
        _ => '@',
    }
}

/// Encoded field name as it appears in `JreLoadStatic(Owner, field)`.
fn static_field(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    encode_identifier(&mut out, name, false);
    out
}

enum Piece {
    Text(String),
    Value(ExprId),
}

impl<'a> BodyGen<'_, 'a> {
    pub fn expr(&mut self, id: ExprId) -> Result<String, TranslateError> {
        ensure_sufficient_stack(|| self.lower_expr(id, false))
    }

    /// Like [`BodyGen::expr`], but allocations yield a +1 reference
    /// (`new_` functions, `newArray...` constructors).
    pub fn expr_retained(&mut self, id: ExprId) -> Result<String, TranslateError> {
        ensure_sufficient_stack(|| self.lower_expr(id, true))
    }

    fn ty(&self, id: ExprId) -> &'a ResolvedType {
        &self.arena().expr(id).ty
    }

    fn unparen(&self, mut id: ExprId) -> ExprId {
        while let ExprKind::Paren(inner) = self.arena().expr(id).kind {
            id = inner;
        }
        id
    }

    fn is_non_null(&self, id: ExprId) -> bool {
        let expr = self.arena().expr(id);
        match &expr.kind {
            ExprKind::This
            | ExprKind::OuterThis(_)
            | ExprKind::New { .. }
            | ExprKind::ArrayCreation { .. }
            | ExprKind::ArrayInit(_)
            | ExprKind::ClassLiteral(_)
            | ExprKind::EnumConstant { .. }
            | ExprKind::Literal(Constant::String(_)) => true,
            ExprKind::Binary {
                op: BinaryOp::Add, ..
            } => expr.ty.is_string(),
            ExprKind::Paren(inner) => self.is_non_null(*inner),
            _ => false,
        }
    }

    fn is_allocation(&self, id: ExprId) -> bool {
        matches!(
            self.arena().expr(self.unparen(id)).kind,
            ExprKind::New { .. } | ExprKind::ArrayCreation { .. } | ExprKind::ArrayInit(_)
        )
    }

    /// A dereferenced value: wrapped in `nil_chk` unless provably non-null.
    pub fn receiver(&mut self, id: ExprId) -> Result<String, TranslateError> {
        let text = self.expr(id)?;
        if self.is_non_null(id) {
            Ok(text)
        } else {
            Ok(format!("nil_chk({text})"))
        }
    }

    fn receiver_or_self(&mut self, receiver: Option<ExprId>) -> Result<String, TranslateError> {
        match receiver {
            Some(r) => self.receiver(r),
            None => Ok("self".to_owned()),
        }
    }

    #[expect(
        clippy::too_many_lines,
        reason = "one arm per expression kind reads best as a single match"
    )]
    fn lower_expr(&mut self, id: ExprId, retained: bool) -> Result<String, TranslateError> {
        let expr = self.arena().expr(id);
        match &expr.kind {
            ExprKind::Literal(c) => Ok(literal::constant(c)),
            ExprKind::Null => Ok("nil".to_owned()),
            ExprKind::Local(name) => Ok(self.local(name)),
            ExprKind::This => Ok("self".to_owned()),
            ExprKind::OuterThis(target) => Ok(self.outer_this(target)),
            ExprKind::Field { receiver, field } => {
                if field.is_static() {
                    return Ok(self.static_read(field));
                }
                let target = self.ivar_target(*receiver, field)?;
                Ok(format!("{target}->{}", self.cx.names.ivar_name(&field.name)))
            }
            ExprKind::ArrayAccess { array, index } => {
                let array_ty = self.array_type(*array, expr.span)?;
                let class = array_class(&array_ty);
                let array = self.receiver(*array)?;
                let index = self.expr(*index)?;
                let get = format!("{class}_Get({array}, {index})");
                let element = self.cx.types.objc_type(&expr.ty.erasure());
                if class == "IOSObjectArray" && element != "id" {
                    Ok(format!("(({element}) {get})"))
                } else {
                    Ok(get)
                }
            }
            ExprKind::ArrayLength(array) => {
                let class = match self.ty(*array) {
                    ResolvedType::Array(a) => array_class(a),
                    _ => "IOSArray".to_owned(),
                };
                let array = self.receiver(*array)?;
                Ok(format!("(({class} *) {array})->size_"))
            }
            ExprKind::ArrayCreation { dims, initializer } => match initializer {
                Some(init) => self.lower_expr(*init, retained),
                None => self.array_creation(&expr.ty, *dims, retained, expr.span),
            },
            ExprKind::ArrayInit(values) => self.array_init(&expr.ty, *values, retained, expr.span),
            ExprKind::Assign { op, lhs, rhs } => {
                let place = self.place(*lhs)?;
                let lhs_ty = self.ty(*lhs).clone();
                match op {
                    AssignOp::Assign => self.store(&place, *rhs),
                    AssignOp::Compound(op) => self.compound(&place, &lhs_ty, *op, *rhs),
                }
            }
            ExprKind::Binary { op, lhs, rhs } => self.binary(id, *op, *lhs, *rhs),
            ExprKind::Unary { op, operand } => self.unary(*op, *operand),
            ExprKind::Cast(inner) => self.cast(*inner, &expr.ty),
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.expr(*cond)?;
                let then = self.expr(*then)?;
                let otherwise = self.expr(*otherwise)?;
                Ok(format!("{cond} ? {then} : {otherwise}"))
            }
            ExprKind::InstanceOf { operand, target } => self.instance_of(*operand, target),
            ExprKind::Call {
                receiver,
                method,
                args,
            } => self.call(id, *receiver, method, *args),
            ExprKind::SuperCall { method, args } => self.super_call(method, *args),
            ExprKind::New {
                ctor,
                outer,
                captures,
                args,
            } => self.new_object(ctor, *outer, *captures, *args, retained),
            ExprKind::EnumConstant { ty, name } => {
                self.cx.reference_name(ty);
                Ok(format!(
                    "JreLoadEnum({}, {})",
                    self.cx.names.full_name(ty),
                    static_field(name)
                ))
            }
            ExprKind::ClassLiteral(ty) => {
                self.cx.reference(ty);
                Ok(self.cx.types.class_expr(ty))
            }
            ExprKind::Paren(inner) => Ok(format!("({})", self.lower_expr(*inner, retained)?)),
            ExprKind::Lambda => Err(TranslateError::Unsupported {
                kind: "lambda expression",
                span: expr.span,
            }),
            ExprKind::MethodReference => Err(TranslateError::Unsupported {
                kind: "method reference",
                span: expr.span,
            }),
        }
    }

    fn array_type(&self, id: ExprId, span: Span) -> Result<ArrayType, TranslateError> {
        match self.ty(id) {
            ResolvedType::Array(a) => Ok(a.clone()),
            other => Err(TranslateError::internal(
                format!("array operation on non-array type `{other}`"),
                span,
            )),
        }
    }

    // ── Variables ──

    fn local(&self, name: &str) -> String {
        if let Some(generated) = self.lookup(name) {
            return generated.to_owned();
        }
        if self.owner.captures.iter().any(|c| c.name == name) {
            return format!("self->val${name}_");
        }
        self.cx.names.variable_name(name)
    }

    /// Path from `self` to an enclosing instance through `this$0_` links.
    fn outer_this(&self, target: &QualifiedName) -> String {
        if *target == self.owner.name {
            return "self".to_owned();
        }
        let steps = self
            .owner
            .name
            .names()
            .len()
            .saturating_sub(target.names().len())
            .max(1);
        let mut out = "self".to_owned();
        for _ in 0..steps {
            out.push_str("->this$0_");
        }
        out
    }

    /// Enclosing instance passed when creating an inner class.
    fn enclosing_instance(&self, created: &QualifiedName) -> String {
        match created.outer() {
            Some(outer) => self.outer_this(&outer),
            None => "self".to_owned(),
        }
    }

    fn static_read(&self, field: &FieldRef) -> String {
        let owner = &field.declaring.name;
        let is_constant = field.constant.is_some()
            && field.modifiers.contains(Modifiers::FINAL)
            && field.ty.is_primitive();
        if *owner == self.owner.name || is_constant {
            self.cx.reference_name(owner);
            return self.cx.names.static_var_name(owner, &field.name);
        }
        self.cx.reference_name(owner);
        format!(
            "JreLoadStatic({}, {})",
            self.cx.names.full_name(owner),
            static_field(&field.name)
        )
    }

    /// The object whose ivar a field access reads.
    fn ivar_target(
        &mut self,
        receiver: Option<ExprId>,
        field: &FieldRef,
    ) -> Result<String, TranslateError> {
        let Some(receiver) = receiver else {
            return Ok("self".to_owned());
        };
        match &self.arena().expr(receiver).kind {
            ExprKind::This => Ok("self".to_owned()),
            ExprKind::OuterThis(target) => Ok(self.outer_this(target)),
            _ => {
                self.cx.reference_name(&field.declaring.name);
                let class = self.cx.names.full_name(&field.declaring.name);
                let value = self.receiver(receiver)?;
                Ok(format!("(({class} *) {value})"))
            }
        }
    }

    fn place(&mut self, id: ExprId) -> Result<Place, TranslateError> {
        let expr = self.arena().expr(id);
        match &expr.kind {
            ExprKind::Local(name) => Ok(Place::Local(self.local(name))),
            ExprKind::Field { receiver, field } => {
                let strong = !self.cx.options.is_arc()
                    && field.ty.is_reference()
                    && Ownership::of_field(&field.ty, field.hints).is_strong();
                if field.is_static() {
                    let owner = &field.declaring.name;
                    self.cx.reference_name(owner);
                    Ok(Place::Static {
                        owner: self.cx.names.full_name(owner),
                        field: static_field(&field.name),
                        own: *owner == self.owner.name,
                        strong,
                    })
                } else {
                    Ok(Place::Ivar {
                        target: self.ivar_target(*receiver, field)?,
                        ivar: self.cx.names.ivar_name(&field.name),
                        strong,
                    })
                }
            }
            ExprKind::ArrayAccess { array, index } => {
                let array_ty = self.array_type(*array, expr.span)?;
                Ok(Place::Element {
                    class: array_class(&array_ty),
                    array: self.receiver(*array)?,
                    index: self.expr(*index)?,
                })
            }
            ExprKind::Paren(inner) => self.place(*inner),
            _ => Err(TranslateError::internal(
                "assignment target is not a variable",
                expr.span,
            )),
        }
    }

    // ── Assignment ──

    fn store(&mut self, place: &Place, rhs: ExprId) -> Result<String, TranslateError> {
        let consumes = !self.cx.options.is_arc() && place.is_strong() && self.is_allocation(rhs);
        let value = if consumes {
            self.expr_retained(rhs)?
        } else {
            self.expr(rhs)?
        };
        let suffix = if consumes { "AndConsume" } else { "" };
        Ok(match place {
            Place::Element { array, index, .. } if place.is_object_element() => {
                format!("IOSObjectArray_Set{suffix}({array}, {index}, {value})")
            }
            Place::Ivar { strong: true, .. } | Place::Static { strong: true, .. } => {
                format!("JreStrongAssign{suffix}({}, {value})", place.address())
            }
            _ => format!("{} = {value}", place.lvalue()),
        })
    }

    /// `self->f_ = value` for a field initializer, retaining as needed.
    pub fn init_ivar(&mut self, field: &FieldDecl, value: ExprId) -> Result<String, TranslateError> {
        let place = Place::Ivar {
            target: "self".to_owned(),
            ivar: self.cx.names.ivar_name(&field.name),
            strong: self.retains(field),
        };
        self.store(&place, value)
    }

    /// `Owner_f = value` for a static initializer of the type being
    /// generated.
    pub fn init_static(&mut self, field: &FieldDecl, value: ExprId) -> Result<String, TranslateError> {
        let place = Place::Static {
            owner: self.cx.names.full_name(&self.owner.name),
            field: static_field(&field.name),
            own: true,
            strong: self.retains(field),
        };
        self.store(&place, value)
    }

    fn retains(&self, field: &FieldDecl) -> bool {
        !self.cx.options.is_arc()
            && field.ty.is_reference()
            && Ownership::of_field(&field.ty, field.memory_hints()).is_strong()
    }

    fn compound(
        &mut self,
        place: &Place,
        lhs_ty: &ResolvedType,
        op: BinaryOp,
        rhs: ExprId,
    ) -> Result<String, TranslateError> {
        if op == BinaryOp::Add && lhs_ty.is_string() {
            let operands = self.flatten_concat(rhs);
            let (format, args) = self.concat_parts(&operands)?;
            let helper = if place.is_object_element() {
                "JreStrAppendArray"
            } else if place.is_strong() {
                "JreStrAppendStrong"
            } else {
                "JreStrAppend"
            };
            return Ok(format!(
                "{helper}({}, \"{format}\", {})",
                place.address(),
                args.join(", ")
            ));
        }
        let value = self.expr(rhs)?;
        let Some(kind) = lhs_ty.as_primitive() else {
            return Ok(format!("{} {}= {value}", place.lvalue(), op.token()));
        };
        let title = primitive_title(kind);
        Ok(match op {
            BinaryOp::UShr => format!("JreURShiftAssign{title}({}, {value})", place.address()),
            BinaryOp::Rem if kind.is_floating() => {
                format!("JreModAssign{title}({}, {value})", place.address())
            }
            BinaryOp::Shl | BinaryOp::Shr if !self.shift_in_range(rhs, kind) => {
                let dir = if op == BinaryOp::Shl { 'L' } else { 'R' };
                format!("Jre{dir}ShiftAssign{title}({}, {value})", place.address())
            }
            _ => format!("{} {}= {value}", place.lvalue(), op.token()),
        })
    }

    /// A constant shift count C already handles like Java.
    fn shift_in_range(&self, count: ExprId, kind: PrimitiveKind) -> bool {
        let width: i64 = if kind == PrimitiveKind::Long { 64 } else { 32 };
        match &self.arena().expr(self.unparen(count)).kind {
            ExprKind::Literal(Constant::Int(v)) => (0..width).contains(&i64::from(*v)),
            ExprKind::Literal(Constant::Long(v)) => (0..width).contains(v),
            _ => false,
        }
    }

    // ── Operators ──

    fn binary(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    ) -> Result<String, TranslateError> {
        let ty = self.ty(id).clone();
        if op == BinaryOp::Add && ty.is_string() {
            return self.concat(id);
        }
        if op.is_equality() {
            if let Some(text) = self.string_equality(op, lhs, rhs)? {
                return Ok(text);
            }
        }
        let lhs_kind = self.ty(lhs).as_primitive().unwrap_or(PrimitiveKind::Int);
        let bits = if lhs_kind == PrimitiveKind::Long { 64 } else { 32 };
        let in_range = self.shift_in_range(rhs, lhs_kind);
        let l = self.expr(lhs)?;
        let r = self.expr(rhs)?;
        Ok(match op {
            BinaryOp::UShr if lhs_kind == PrimitiveKind::Char && in_range => format!("{l} >> {r}"),
            BinaryOp::UShr => format!("JreURShift{bits}({l}, {r})"),
            BinaryOp::Shl if !in_range => format!("JreLShift{bits}({l}, {r})"),
            BinaryOp::Shr if !in_range => format!("JreRShift{bits}({l}, {r})"),
            BinaryOp::Rem if ty.as_primitive() == Some(PrimitiveKind::Double) => {
                format!("fmod({l}, {r})")
            }
            BinaryOp::Rem if ty.as_primitive() == Some(PrimitiveKind::Float) => {
                format!("fmodf({l}, {r})")
            }
            _ => format!("{l} {} {r}", op.token()),
        })
    }

    /// Comparison against a string literal compares contents.
    fn string_equality(
        &mut self,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    ) -> Result<Option<String>, TranslateError> {
        let is_literal = |gen: &Self, id: ExprId| {
            matches!(
                gen.arena().expr(gen.unparen(id)).kind,
                ExprKind::Literal(Constant::String(_))
            )
        };
        let (literal_side, other) = if is_literal(self, lhs) {
            (lhs, rhs)
        } else if is_literal(self, rhs) {
            (rhs, lhs)
        } else {
            return Ok(None);
        };
        if self.ty(other).is_primitive() {
            return Ok(None);
        }
        let call = format!("[{} isEqual:{}]", self.expr(literal_side)?, self.expr(other)?);
        Ok(Some(if op == BinaryOp::Eq {
            call
        } else {
            format!("!{call}")
        }))
    }

    fn unary(&mut self, op: UnaryOp, operand: ExprId) -> Result<String, TranslateError> {
        if op.is_increment() {
            let place = self.place(operand)?;
            if let Place::Element {
                class,
                array,
                index,
            } = &place
            {
                if !place.is_object_element() {
                    let helper = match op {
                        UnaryOp::PreInc => "PreIncr",
                        UnaryOp::PreDec => "PreDecr",
                        UnaryOp::PostInc => "PostIncr",
                        _ => "PostDecr",
                    };
                    return Ok(format!("{class}_{helper}({array}, {index})"));
                }
            }
            let mut target = place.lvalue();
            if target.starts_with('*') {
                target = format!("({target})");
            }
            return Ok(match op {
                UnaryOp::PreInc => format!("++{target}"),
                UnaryOp::PreDec => format!("--{target}"),
                UnaryOp::PostInc => format!("{target}++"),
                _ => format!("{target}--"),
            });
        }
        let value = self.expr(operand)?;
        Ok(match op {
            UnaryOp::Neg if value.starts_with('-') => format!("-({value})"),
            UnaryOp::Neg => format!("-{value}"),
            UnaryOp::Plus if value.starts_with('+') => format!("+({value})"),
            UnaryOp::Plus => format!("+{value}"),
            UnaryOp::Not => format!("!{value}"),
            _ => format!("~{value}"),
        })
    }

    // ── Strings ──

    /// Operands of a left-nested string concatenation chain.
    fn flatten_concat(&self, id: ExprId) -> Vec<ExprId> {
        let is_concat = |id: ExprId| {
            let e = self.arena().expr(id);
            match e.kind {
                ExprKind::Binary {
                    op: BinaryOp::Add,
                    lhs,
                    rhs,
                } if e.ty.is_string() => Some((lhs, rhs)),
                _ => None,
            }
        };
        let mut rights = Vec::new();
        let mut current = id;
        while let Some((lhs, rhs)) = is_concat(current) {
            rights.push(rhs);
            current = lhs;
        }
        let mut out = vec![current];
        for &rhs in rights.iter().rev() {
            if is_concat(rhs).is_some() {
                out.extend(ensure_sufficient_stack(|| self.flatten_concat(rhs)));
            } else {
                out.push(rhs);
            }
        }
        out
    }

    /// Operands with adjacent constants merged into text.
    fn concat_pieces(&self, operands: &[ExprId]) -> Vec<Piece> {
        let mut pieces: Vec<Piece> = Vec::new();
        for &op in operands {
            let text = match &self.arena().expr(self.unparen(op)).kind {
                ExprKind::Literal(c) => Some(literal::java_string(c)),
                ExprKind::Null => Some("null".to_owned()),
                _ => None,
            };
            match (text, pieces.last_mut()) {
                (Some(text), Some(Piece::Text(prev))) => prev.push_str(&text),
                (Some(text), _) => pieces.push(Piece::Text(text)),
                (None, _) => pieces.push(Piece::Value(op)),
            }
        }
        pieces
    }

    /// `JreStrcat` format string and arguments for a list of operands.
    pub fn concat_parts(
        &mut self,
        operands: &[ExprId],
    ) -> Result<(String, Vec<String>), TranslateError> {
        let mut format = String::new();
        let mut args = Vec::new();
        for piece in self.concat_pieces(operands) {
            match piece {
                Piece::Text(text) => {
                    format.push('$');
                    args.push(literal::string_literal(&text));
                }
                Piece::Value(id) => {
                    format.push(strcat_code(self.ty(id)));
                    args.push(self.expr(id)?);
                }
            }
        }
        Ok((format, args))
    }

    fn concat(&mut self, id: ExprId) -> Result<String, TranslateError> {
        let operands = self.flatten_concat(id);
        let pieces = self.concat_pieces(&operands);
        if let [Piece::Text(text)] = pieces.as_slice() {
            return Ok(literal::string_literal(text));
        }
        let (format, args) = self.concat_parts(&operands)?;
        Ok(format!("JreStrcat(\"{format}\", {})", args.join(", ")))
    }

    // ── Types ──

    fn cast(&mut self, inner: ExprId, target: &ResolvedType) -> Result<String, TranslateError> {
        let source = self.ty(inner).clone();
        let value = self.expr(inner)?;
        if let Some(to) = target.as_primitive() {
            let spelled = primitive_type(to);
            let from_floating = source.as_primitive().is_some_and(PrimitiveKind::is_floating);
            return Ok(match to {
                PrimitiveKind::Long if from_floating => format!("JreFpToLong({value})"),
                PrimitiveKind::Int if from_floating => format!("JreFpToInt({value})"),
                PrimitiveKind::Char if from_floating => format!("JreFpToChar({value})"),
                PrimitiveKind::Short | PrimitiveKind::Byte if from_floating => {
                    format!("({spelled}) JreFpToInt({value})")
                }
                _ => format!("({spelled}) {value}"),
            });
        }
        let erased = target.erasure();
        if erased.is_object() {
            return Ok(value);
        }
        self.cx.reference(&erased);
        let spelled = self.cx.types.objc_type(&erased);
        if self.cx.index.is_assignable(&source, &erased) == Assignable::Yes {
            return Ok(format!("(({spelled}) {value})"));
        }
        Ok(match &erased {
            ResolvedType::Interface(d) => format!(
                "(({spelled}) cast_check({value}, IOSClass_fromProtocol(@protocol({}))))",
                self.cx.names.full_name(&d.name)
            ),
            ResolvedType::Array(a) if a.dimensions == 1 && a.element.is_primitive() => format!(
                "(({spelled}) cast_chk({value}, [{} class]))",
                array_class(a)
            ),
            ResolvedType::Array(_) => format!(
                "(({spelled}) cast_check({value}, {}))",
                self.cx.types.class_expr(&erased)
            ),
            _ => format!(
                "(({spelled}) cast_chk({value}, [{} class]))",
                spelled.trim_end_matches(" *")
            ),
        })
    }

    fn instance_of(
        &mut self,
        operand: ExprId,
        target: &ResolvedType,
    ) -> Result<String, TranslateError> {
        let value = self.expr(operand)?;
        let erased = target.erasure();
        self.cx.reference(&erased);
        Ok(match &erased {
            ResolvedType::Interface(d) => format!(
                "[{value} conformsToProtocol:@protocol({})]",
                self.cx.names.full_name(&d.name)
            ),
            ResolvedType::Array(a) if a.dimensions == 1 && a.element.is_primitive() => {
                format!("[{value} isKindOfClass:[{} class]]", array_class(a))
            }
            ResolvedType::Array(_) => format!(
                "[{} isInstance:{value}]",
                self.cx.types.class_expr(&erased)
            ),
            _ => format!(
                "[{value} isKindOfClass:[{} class]]",
                self.cx
                    .types
                    .objc_type(&erased)
                    .trim_end_matches(" *")
            ),
        })
    }

    // ── Calls ──

    fn call(
        &mut self,
        id: ExprId,
        receiver: Option<ExprId>,
        method: &MethodRef,
        args: ExprRange,
    ) -> Result<String, TranslateError> {
        let expr = self.arena().expr(id);
        if method.deprecated {
            self.cx.warn(
                ErrorCode::W5001,
                format!("`{}.{}` is deprecated", method.declaring.name, method.name),
                expr.span,
            );
        }
        let declaring = &method.declaring.name;
        self.cx.reference_name(declaring);
        let selector = call_selector(self.cx.names, method);
        let args = self.call_args(&method.params, method.is_varargs(), args)?;
        let text = if method.is_static() {
            format!(
                "{}({})",
                function_name(self.cx.names, declaring, &selector),
                args.join(", ")
            )
        } else if method.modifiers.is_private() && !method.declaring.kind.is_protocol() {
            let mut all = vec![self.receiver_or_self(receiver)?];
            all.extend(args);
            format!(
                "{}({})",
                function_name(self.cx.names, declaring, &selector),
                all.join(", ")
            )
        } else {
            let target = self.receiver_or_self(receiver)?;
            message(&target, &selector, &args)
        };
        if self
            .cx
            .types
            .needs_narrowing_cast(&method.return_type, &expr.ty)
        {
            let spelled = self.cx.types.objc_type(&expr.ty.erasure());
            return Ok(format!("(({spelled}) {text})"));
        }
        Ok(text)
    }

    fn super_call(&mut self, method: &MethodRef, args: ExprRange) -> Result<String, TranslateError> {
        let declaring = &method.declaring.name;
        self.cx.reference_name(declaring);
        let selector = call_selector(self.cx.names, method);
        let args = self.call_args(&method.params, method.is_varargs(), args)?;
        if method.is_static() {
            return Ok(format!(
                "{}({})",
                function_name(self.cx.names, declaring, &selector),
                args.join(", ")
            ));
        }
        if self.kind == BodyKind::Method {
            return Ok(message("super", &selector, &args));
        }
        // No `super` in a C function: call the superclass implementation
        // through its IMP.
        let returns = self.cx.types.objc_type(&method.return_type.erasure());
        let mut param_types = vec!["id".to_owned(), "SEL".to_owned()];
        param_types.extend(
            method
                .params
                .iter()
                .map(|p| self.cx.types.objc_type(&p.erasure())),
        );
        let mut all = vec!["self".to_owned(), format!("@selector({selector})")];
        all.extend(args);
        Ok(format!(
            "(({returns} (*)({}))[{} instanceMethodForSelector:@selector({selector})])({})",
            param_types.join(", "),
            self.cx.names.full_name(declaring),
            all.join(", ")
        ))
    }

    /// Arguments with trailing variadic values packed into an array.
    pub fn call_args(
        &mut self,
        params: &[ResolvedType],
        varargs: bool,
        args: ExprRange,
    ) -> Result<Vec<String>, TranslateError> {
        let ids = self.arena().exprs(args);
        let packed = match params.last() {
            Some(ResolvedType::Array(array)) if varargs => {
                let fixed = params.len() - 1;
                // A trailing argument assignable to the array type is the
                // array itself.
                let passes_array = ids.len() == params.len()
                    && match self.cx.index.is_assignable(self.ty(ids[fixed]), &params[fixed]) {
                        Assignable::Yes => true,
                        Assignable::No => false,
                        Assignable::Unknown => matches!(
                            self.ty(ids[fixed]),
                            ResolvedType::Array(a) if a.dimensions == array.dimensions
                        ),
                    };
                (!passes_array).then(|| (fixed, array.clone()))
            }
            _ => None,
        };
        let Some((fixed, array)) = packed else {
            return ids.iter().map(|&a| self.expr(a)).collect();
        };
        let mut out = Vec::with_capacity(fixed + 1);
        for &a in &ids[..fixed.min(ids.len())] {
            out.push(self.expr(a)?);
        }
        let mut values = Vec::new();
        for &a in ids.iter().skip(fixed) {
            values.push(self.expr(a)?);
        }
        out.push(self.array_literal(&array, values, false));
        Ok(out)
    }

    fn new_object(
        &mut self,
        ctor: &CtorRef,
        outer: Option<ExprId>,
        captures: ExprRange,
        args: ExprRange,
        retained: bool,
    ) -> Result<String, TranslateError> {
        let declaring = &ctor.declaring.name;
        self.cx.reference_name(declaring);
        let selector = ctor_ref_selector(self.cx.names, ctor);
        let captured = self.arena().exprs(captures);
        let mut all = Vec::new();
        if let Some(outer) = outer {
            all.push(self.receiver(outer)?);
        } else if ctor.leading.len() > captured.len() {
            all.push(self.enclosing_instance(declaring));
        }
        for &c in captured {
            all.push(self.expr(c)?);
        }
        all.extend(self.call_args(&ctor.params, ctor.is_varargs(), args)?);
        let prefix = if retained || self.cx.options.is_arc() {
            "new"
        } else {
            "create"
        };
        Ok(format!(
            "{prefix}_{}_{}({})",
            self.cx.names.full_name(declaring),
            selector.replace(':', "_"),
            all.join(", ")
        ))
    }

    // ── Arrays ──

    fn array_creation(
        &mut self,
        ty: &ResolvedType,
        dims: ExprRange,
        retained: bool,
        span: Span,
    ) -> Result<String, TranslateError> {
        let ResolvedType::Array(array) = ty else {
            return Err(TranslateError::internal(
                format!("array creation typed `{ty}`"),
                span,
            ));
        };
        self.cx.reference(&array.element);
        let lengths: Vec<String> = self
            .arena()
            .exprs(dims)
            .iter()
            .map(|&d| self.expr(d))
            .collect::<Result<_, _>>()?;
        let retained = retained || self.cx.options.is_arc();
        let given = lengths.len();
        if given <= 1 {
            let length = lengths.first().cloned().unwrap_or_else(|| "0".to_owned());
            let ctor = if retained { "newArrayWithLength" } else { "arrayWithLength" };
            let class = array_class(array);
            if class == "IOSObjectArray" {
                let element = self.cx.types.class_expr(&array.component());
                return Ok(format!("[IOSObjectArray {ctor}:{length} type:{element}]"));
            }
            return Ok(format!("[{class} {ctor}:{length}]"));
        }
        let ctor = if retained { "newArrayWithDimensions" } else { "arrayWithDimensions" };
        let lengths = format!("(jint[]){{ {} }}", lengths.join(", "));
        let remaining = usize::from(array.dimensions).saturating_sub(given);
        match array.element.as_primitive() {
            Some(kind) if remaining == 0 => Ok(format!(
                "[IOS{}Array {ctor}:{given} lengths:{lengths}]",
                primitive_title(kind)
            )),
            _ => {
                let element = if remaining == 0 {
                    (*array.element).clone()
                } else {
                    ResolvedType::array_of(
                        (*array.element).clone(),
                        u8::try_from(remaining).unwrap_or(u8::MAX),
                    )
                };
                Ok(format!(
                    "[IOSObjectArray {ctor}:{given} lengths:{lengths} type:{}]",
                    self.cx.types.class_expr(&element)
                ))
            }
        }
    }

    fn array_init(
        &mut self,
        ty: &ResolvedType,
        values: ExprRange,
        retained: bool,
        span: Span,
    ) -> Result<String, TranslateError> {
        let ResolvedType::Array(array) = ty else {
            return Err(TranslateError::internal(
                format!("array initializer typed `{ty}`"),
                span,
            ));
        };
        let component = array.component();
        let mut lowered = Vec::new();
        for &value in self.arena().exprs(values) {
            let value_ty = self.ty(value);
            if !component.is_primitive() && !self.cx.index.may_store(&component, value_ty) {
                return Err(TranslateError::ArrayStore {
                    expected: component.to_string(),
                    found: value_ty.to_string(),
                    span: self.arena().expr(value).span,
                });
            }
            lowered.push(self.expr(value)?);
        }
        self.cx.reference(&array.element);
        Ok(self.array_literal(array, lowered, retained))
    }

    /// `[IOSIntArray arrayWithInts:(jint[]){ 1, 2 } count:2]` and the
    /// object array counterpart.
    fn array_literal(&self, array: &ArrayType, values: Vec<String>, retained: bool) -> String {
        let retained = retained || self.cx.options.is_arc();
        let count = values.len();
        let length_ctor = if retained { "newArrayWithLength" } else { "arrayWithLength" };
        match array.element.as_primitive() {
            Some(kind) if array.dimensions == 1 => {
                let class = array_class(array);
                if count == 0 {
                    return format!("[{class} {length_ctor}:0]");
                }
                let title = primitive_title(kind);
                let ctor = if retained {
                    format!("newArrayWith{title}s")
                } else {
                    format!("arrayWith{title}s")
                };
                format!(
                    "[{class} {ctor}:({}[]){{ {} }} count:{count}]",
                    primitive_type(kind),
                    values.join(", ")
                )
            }
            _ => {
                let element = self.cx.types.class_expr(&array.component());
                if count == 0 {
                    return format!("[IOSObjectArray {length_ctor}:0 type:{element}]");
                }
                let ctor = if retained { "newArrayWithObjects" } else { "arrayWithObjects" };
                format!(
                    "[IOSObjectArray {ctor}:(id[]){{ {} }} count:{count} type:{element}]",
                    values.join(", ")
                )
            }
        }
    }
}
