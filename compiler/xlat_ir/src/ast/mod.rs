//! Method body representation: expressions and statements.
//!
//! Bodies are flat. Nodes refer to each other through [`ExprId`] and
//! [`StmtId`] indices into the owning unit's [`ExprArena`], and every
//! reference to a member carries its resolved binding so the code generator
//! never has to look anything up by name.

mod arena;

pub use arena::ExprArena;

use crate::{
    Annotation, ExprId, ExprRange, MemoryHints, Modifiers, QualifiedName, ResolvedType, Span,
    StmtId, StmtRange, TypeKind,
};

/// Compile-time constant value.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Constant {
    Bool(bool),
    /// UTF-16 code unit.
    Char(u16),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    /// IEEE bits.
    Float(u32),
    /// IEEE bits.
    Double(u64),
    String(String),
}

impl Constant {
    pub fn float(value: f32) -> Self {
        Constant::Float(value.to_bits())
    }

    pub fn double(value: f64) -> Self {
        Constant::Double(value.to_bits())
    }

    pub fn char(c: char) -> Self {
        let mut buf = [0u16; 2];
        Constant::Char(c.encode_utf16(&mut buf)[0])
    }

    /// The static type of this constant.
    pub fn ty(&self) -> ResolvedType {
        use crate::PrimitiveKind as P;
        match self {
            Constant::Bool(_) => ResolvedType::Primitive(P::Boolean),
            Constant::Char(_) => ResolvedType::Primitive(P::Char),
            Constant::Byte(_) => ResolvedType::Primitive(P::Byte),
            Constant::Short(_) => ResolvedType::Primitive(P::Short),
            Constant::Int(_) => ResolvedType::Primitive(P::Int),
            Constant::Long(_) => ResolvedType::Primitive(P::Long),
            Constant::Float(_) => ResolvedType::Primitive(P::Float),
            Constant::Double(_) => ResolvedType::Primitive(P::Double),
            Constant::String(_) => ResolvedType::string(),
        }
    }
}

/// Resolved reference to a declared type, as seen from a use site.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeRef {
    pub name: QualifiedName,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
}

impl TypeRef {
    pub fn new(name: QualifiedName, kind: TypeKind) -> Self {
        TypeRef {
            name,
            kind,
            modifiers: Modifiers::PUBLIC,
        }
    }

    pub fn as_type(&self) -> ResolvedType {
        if self.kind.is_protocol() {
            ResolvedType::interface(self.name.clone())
        } else {
            ResolvedType::class(self.name.clone())
        }
    }
}

/// Resolved method binding at a call site.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodRef {
    pub declaring: TypeRef,
    pub name: String,
    /// Parameter types of the root declaration, unsubstituted.
    pub params: Vec<ResolvedType>,
    /// Declared return type, unsubstituted. The call expression's own type
    /// is the substituted one.
    pub return_type: ResolvedType,
    pub modifiers: Modifiers,
    /// Explicit selector from a name annotation.
    pub selector: Option<String>,
    pub deprecated: bool,
}

impl MethodRef {
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    pub fn is_varargs(&self) -> bool {
        self.modifiers.contains(Modifiers::VARARGS)
    }
}

/// Resolved field binding.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldRef {
    pub declaring: TypeRef,
    pub name: String,
    pub ty: ResolvedType,
    pub modifiers: Modifiers,
    pub constant: Option<Constant>,
    pub hints: MemoryHints,
}

impl FieldRef {
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }
}

/// Resolved constructor binding.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CtorRef {
    pub declaring: TypeRef,
    pub params: Vec<ResolvedType>,
    pub modifiers: Modifiers,
    /// Synthesized leading parameters: the enclosing instance, then
    /// captured locals.
    pub leading: Vec<ResolvedType>,
}

impl CtorRef {
    pub fn new(declaring: TypeRef, params: Vec<ResolvedType>) -> Self {
        CtorRef {
            declaring,
            params,
            modifiers: Modifiers::PUBLIC,
            leading: Vec::new(),
        }
    }

    pub fn is_varargs(&self) -> bool {
        self.modifiers.contains(Modifiers::VARARGS)
    }

    /// Leading parameters followed by declared parameters.
    pub fn all_params(&self) -> Vec<ResolvedType> {
        self.leading.iter().chain(&self.params).cloned().collect()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    /// Target operator token. `UShr` has no native token and is lowered to
    /// a helper; its entry is the source spelling.
    pub fn token(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub fn is_increment(self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum AssignOp {
    Assign,
    Compound(BinaryOp),
}

/// Expression node. `ty` is the resolved static type.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: ResolvedType,
    pub span: Span,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    Literal(Constant),
    Null,
    /// Local variable or parameter.
    Local(String),
    This,
    /// `Outer.this` from inside a nested type.
    OuterThis(QualifiedName),
    /// Field read; `receiver` is `None` for implicit `this` and statics.
    Field {
        receiver: Option<ExprId>,
        field: FieldRef,
    },
    ArrayAccess {
        array: ExprId,
        index: ExprId,
    },
    ArrayLength(ExprId),
    /// `new T[a][b]` or `new T[] { ... }`; the expression type is the array type.
    ArrayCreation {
        dims: ExprRange,
        initializer: Option<ExprId>,
    },
    /// `{ a, b }`; the expression type is the array type.
    ArrayInit(ExprRange),
    Assign {
        op: AssignOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    /// The expression type is the cast target.
    Cast(ExprId),
    Conditional {
        cond: ExprId,
        then: ExprId,
        otherwise: ExprId,
    },
    InstanceOf {
        operand: ExprId,
        target: ResolvedType,
    },
    Call {
        receiver: Option<ExprId>,
        method: MethodRef,
        args: ExprRange,
    },
    SuperCall {
        method: MethodRef,
        args: ExprRange,
    },
    New {
        ctor: CtorRef,
        /// Explicit enclosing instance (`outer.new Inner()`).
        outer: Option<ExprId>,
        /// Captured local values passed to local/anonymous classes.
        captures: ExprRange,
        args: ExprRange,
    },
    EnumConstant {
        ty: QualifiedName,
        name: String,
    },
    /// `T.class`.
    ClassLiteral(ResolvedType),
    Paren(ExprId),
    /// Must be desugared before code generation.
    Lambda,
    /// Must be desugared before code generation.
    MethodReference,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SwitchKind {
    Integral,
    Enum,
    String,
}

/// One `case` group. An empty `labels` list is the `default` group.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchCase {
    pub labels: Vec<CaseLabel>,
    pub body: StmtRange,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum CaseLabel {
    Constant(Constant),
    EnumConstant { ty: QualifiedName, name: String },
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CatchClause {
    pub name: String,
    /// More than one type for multi-catch.
    pub types: Vec<ResolvedType>,
    pub body: StmtId,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum StmtKind {
    Block(StmtRange),
    Local {
        name: String,
        ty: ResolvedType,
        init: Option<ExprId>,
        annotations: Vec<Annotation>,
    },
    Expr(ExprId),
    If {
        cond: ExprId,
        then: StmtId,
        otherwise: Option<StmtId>,
    },
    While {
        cond: ExprId,
        body: StmtId,
        autorelease: bool,
    },
    DoWhile {
        body: StmtId,
        cond: ExprId,
    },
    For {
        init: StmtRange,
        cond: Option<ExprId>,
        update: ExprRange,
        body: StmtId,
        autorelease: bool,
    },
    ForEach {
        var: String,
        var_ty: ResolvedType,
        iterable: ExprId,
        body: StmtId,
        autorelease: bool,
    },
    Labeled {
        label: String,
        body: StmtId,
    },
    Break(Option<String>),
    Continue(Option<String>),
    Return(Option<ExprId>),
    Throw(ExprId),
    Switch {
        selector: ExprId,
        kind: SwitchKind,
        cases: Vec<SwitchCase>,
    },
    Try {
        body: StmtId,
        catches: Vec<CatchClause>,
        finally: Option<StmtId>,
    },
    Synchronized {
        lock: ExprId,
        body: StmtId,
    },
    Assert {
        cond: ExprId,
        message: Option<ExprId>,
    },
    /// `this(...)` as the first statement of a constructor.
    ThisCall {
        ctor: CtorRef,
        args: ExprRange,
    },
    /// `super(...)` as the first statement of a constructor.
    SuperCall {
        ctor: CtorRef,
        outer: Option<ExprId>,
        args: ExprRange,
    },
    /// Raw native comment text, delimiters included.
    Native(String),
    Empty,
}
