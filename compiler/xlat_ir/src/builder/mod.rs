//! Constructors for assembling resolved units by hand.
//!
//! Front ends build units through their own lowering; this module exists
//! for tests and tools that need small units without a parser. Expression
//! helpers fill in the resolved type the way the front end would.

use crate::{
    AssignOp, BinaryOp, CompilationUnit, Constant, ConstructorDecl, CtorRef, Expr, ExprArena, ExprId, ExprKind, ExprRange,
    FieldDecl, FieldRef, MemoryHints, MethodRef, Modifiers, Param, QualifiedName, ResolvedType,
    Span, Stmt, StmtId, StmtKind, TypeDecl, TypeKind, TypeRef, UnaryOp,
};

/// Incrementally assembles a [`CompilationUnit`].
pub struct UnitBuilder {
    unit: CompilationUnit,
}

impl UnitBuilder {
    pub fn new(file_name: &str, package: &str) -> Self {
        UnitBuilder {
            unit: CompilationUnit::new(file_name, package),
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.unit.source = source.to_owned();
        self
    }

    pub fn arena(&mut self) -> &mut ExprArena {
        &mut self.unit.arena
    }

    pub fn add_type(&mut self, decl: TypeDecl) {
        self.unit.types.push(decl);
    }

    pub fn finish(self) -> CompilationUnit {
        self.unit
    }

    // ── Expressions ──

    pub fn expr(&mut self, kind: ExprKind, ty: ResolvedType) -> ExprId {
        self.expr_at(kind, ty, Span::DUMMY)
    }

    pub fn expr_at(&mut self, kind: ExprKind, ty: ResolvedType, span: Span) -> ExprId {
        self.unit.arena.alloc_expr(Expr { kind, ty, span })
    }

    pub fn ty(&self, id: ExprId) -> ResolvedType {
        self.unit.arena.expr(id).ty.clone()
    }

    pub fn constant(&mut self, value: Constant) -> ExprId {
        let ty = value.ty();
        self.expr(ExprKind::Literal(value), ty)
    }

    pub fn int(&mut self, value: i32) -> ExprId {
        self.constant(Constant::Int(value))
    }

    pub fn string(&mut self, value: &str) -> ExprId {
        self.constant(Constant::String(value.to_owned()))
    }

    pub fn null(&mut self) -> ExprId {
        self.expr(ExprKind::Null, ResolvedType::Null)
    }

    pub fn local(&mut self, name: &str, ty: ResolvedType) -> ExprId {
        self.expr(ExprKind::Local(name.to_owned()), ty)
    }

    pub fn this(&mut self, ty: ResolvedType) -> ExprId {
        self.expr(ExprKind::This, ty)
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId, ty: ResolvedType) -> ExprId {
        self.expr(ExprKind::Binary { op, lhs, rhs }, ty)
    }

    pub fn assign(&mut self, op: AssignOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        let ty = self.ty(lhs);
        self.expr(ExprKind::Assign { op, lhs, rhs }, ty)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        let ty = if op == UnaryOp::Not {
            ResolvedType::BOOLEAN
        } else {
            self.ty(operand)
        };
        self.expr(ExprKind::Unary { op, operand }, ty)
    }

    pub fn field(&mut self, receiver: Option<ExprId>, field: FieldRef) -> ExprId {
        let ty = field.ty.clone();
        self.expr(ExprKind::Field { receiver, field }, ty)
    }

    pub fn array_access(&mut self, array: ExprId, index: ExprId) -> ExprId {
        let ty = match self.ty(array) {
            ResolvedType::Array(a) => a.component(),
            other => other,
        };
        self.expr(ExprKind::ArrayAccess { array, index }, ty)
    }

    /// Call typed with the method's declared return type.
    pub fn call(&mut self, receiver: Option<ExprId>, method: MethodRef, args: &[ExprId]) -> ExprId {
        let ty = method.return_type.clone();
        self.call_typed(receiver, method, args, ty)
    }

    /// Call whose resolved type differs from the declared return type.
    pub fn call_typed(
        &mut self,
        receiver: Option<ExprId>,
        method: MethodRef,
        args: &[ExprId],
        ty: ResolvedType,
    ) -> ExprId {
        let args = self.unit.arena.alloc_expr_list(args.iter().copied());
        self.expr(ExprKind::Call { receiver, method, args }, ty)
    }

    pub fn new_object(&mut self, ctor: CtorRef, args: &[ExprId]) -> ExprId {
        let ty = ctor.declaring.as_type();
        let args = self.unit.arena.alloc_expr_list(args.iter().copied());
        self.expr(
            ExprKind::New {
                ctor,
                outer: None,
                captures: ExprRange::EMPTY,
                args,
            },
            ty,
        )
    }

    // ── Statements ──

    pub fn stmt(&mut self, kind: StmtKind) -> StmtId {
        self.stmt_at(kind, Span::DUMMY)
    }

    pub fn stmt_at(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.unit.arena.alloc_stmt(Stmt { kind, span })
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn block(&mut self, stmts: &[StmtId]) -> StmtId {
        let range = self.unit.arena.alloc_stmt_list(stmts.iter().copied());
        self.stmt(StmtKind::Block(range))
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return(value))
    }

    pub fn local_decl(&mut self, name: &str, ty: ResolvedType, init: Option<ExprId>) -> StmtId {
        self.stmt(StmtKind::Local {
            name: name.to_owned(),
            ty,
            init,
            annotations: Vec::new(),
        })
    }
}

// ── Declarations and references ──

pub fn class_ref(dotted: &str) -> TypeRef {
    TypeRef::new(QualifiedName::top_level(dotted), TypeKind::Class)
}

pub fn interface_ref(dotted: &str) -> TypeRef {
    TypeRef::new(QualifiedName::top_level(dotted), TypeKind::Interface)
}

pub fn method_ref(
    declaring: TypeRef,
    name: &str,
    params: Vec<ResolvedType>,
    return_type: ResolvedType,
) -> MethodRef {
    MethodRef {
        declaring,
        name: name.to_owned(),
        params,
        return_type,
        modifiers: Modifiers::PUBLIC,
        selector: None,
        deprecated: false,
    }
}

pub fn field_ref(declaring: TypeRef, name: &str, ty: ResolvedType, modifiers: Modifiers) -> FieldRef {
    FieldRef {
        declaring,
        name: name.to_owned(),
        ty,
        modifiers,
        constant: None,
        hints: MemoryHints::empty(),
    }
}

pub fn field(name: &str, ty: ResolvedType, modifiers: Modifiers) -> FieldDecl {
    FieldDecl {
        name: name.to_owned(),
        ty,
        modifiers,
        annotations: Vec::new(),
        initializer: None,
        constant: None,
        doc: None,
        span: Span::DUMMY,
    }
}

pub fn constructor(params: Vec<Param>, body: Option<StmtId>) -> ConstructorDecl {
    ConstructorDecl {
        params,
        thrown: Vec::new(),
        modifiers: Modifiers::PUBLIC,
        annotations: Vec::new(),
        body,
        doc: None,
        span: Span::DUMMY,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn array_access_uses_component_type() {
        let mut b = UnitBuilder::new("T.java", "");
        let arr = b.local("a", ResolvedType::array_of(ResolvedType::INT, 2));
        let i = b.int(0);
        let row = b.array_access(arr, i);
        assert_eq!(b.ty(row), ResolvedType::array_of(ResolvedType::INT, 1));
    }

    #[test]
    fn call_defaults_to_declared_return() {
        let mut b = UnitBuilder::new("T.java", "");
        let m = method_ref(class_ref("a.Foo"), "size", vec![], ResolvedType::INT);
        let call = b.call(None, m, &[]);
        assert_eq!(b.ty(call), ResolvedType::INT);
        let unit = b.finish();
        assert_eq!(unit.arena.expr_count(), 1);
    }
}
