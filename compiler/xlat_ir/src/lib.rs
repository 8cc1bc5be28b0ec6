//! Resolved program model for the xlat translator.
//!
//! The front end hands the code generator a fully type-resolved view of each
//! compilation unit: type declarations with their members, and method bodies
//! stored in a flat arena of expressions and statements. Every expression
//! carries exactly one [`ResolvedType`]; every reference to a method, field
//! or constructor carries the binding the front end resolved for it.
//!
//! Nothing in this crate performs resolution. It is a read-only data model
//! plus the small amount of structural logic (erasure, name flattening
//! inputs, line lookup) that every consumer needs.

mod annotation;
mod ast;
pub mod builder;
mod decl;
mod expr_id;
mod name;
mod span;
mod types;
mod unit;

pub use annotation::{find as find_annotation, well_known, Annotation, AnnotationValue, MemoryHints};
pub use ast::{
    AssignOp, BinaryOp, CaseLabel, CatchClause, Constant, CtorRef, Expr, ExprArena, ExprKind,
    FieldRef, MethodRef, Stmt, StmtKind, SwitchCase, SwitchKind, TypeRef, UnaryOp,
};
pub use decl::{
    Capture, ConstructorDecl, EnumConstantDecl, FieldDecl, InitializerDecl, Member, MethodDecl,
    Modifiers, Nesting, OverriddenMethod, Param, TypeDecl, TypeKind, Visibility,
};
pub use expr_id::{ExprId, ExprRange, StmtId, StmtRange};
pub use name::QualifiedName;
pub use span::{LineIndex, Span};
pub use types::{
    ArrayType, BoundKind, DeclaredType, PrimitiveKind, ResolvedType, TypeParam, TypeVariable,
    WildcardType,
};
pub use unit::CompilationUnit;

#[cfg(feature = "cache")]
pub use unit::CacheError;
