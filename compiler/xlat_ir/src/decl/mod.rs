//! Type and member declarations.

use bitflags::bitflags;

use crate::{
    annotation, well_known, Annotation, AnnotationValue, Constant, CtorRef, DeclaredType, ExprId, ExprRange,
    MemoryHints, QualifiedName, ResolvedType, Span, StmtId, TypeParam,
};

bitflags! {
    /// Source modifiers on types and members.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const ABSTRACT = 1 << 5;
        const SYNCHRONIZED = 1 << 6;
        const NATIVE = 1 << 7;
        const VOLATILE = 1 << 8;
        const TRANSIENT = 1 << 9;
        const DEFAULT = 1 << 10;
        const VARARGS = 1 << 11;
        const SYNTHETIC = 1 << 12;
    }
}

impl Modifiers {
    pub fn visibility(self) -> Visibility {
        if self.contains(Modifiers::PUBLIC) {
            Visibility::Public
        } else if self.contains(Modifiers::PROTECTED) {
            Visibility::Protected
        } else if self.contains(Modifiers::PRIVATE) {
            Visibility::Private
        } else {
            Visibility::PackagePrivate
        }
    }

    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    pub fn is_private(self) -> bool {
        self.contains(Modifiers::PRIVATE)
    }
}

/// Access level, ordered the way declaration sections are emitted.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    Public,
    Protected,
    PackagePrivate,
    Private,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeKind {
    /// Interfaces and annotation types lower to protocols.
    pub fn is_protocol(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Annotation)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Nesting {
    TopLevel,
    Member,
    Local,
    Anonymous,
}

/// A local variable captured by a local or anonymous class.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Capture {
    pub name: String,
    pub ty: ResolvedType,
}

/// One source type declaration.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeDecl {
    pub name: QualifiedName,
    pub kind: TypeKind,
    pub nesting: Nesting,
    pub modifiers: Modifiers,
    /// `None` for interfaces and annotation types; `java.lang.Object` is
    /// explicit for classes that extend nothing.
    pub superclass: Option<DeclaredType>,
    /// Superinterfaces in declaration order.
    pub interfaces: Vec<DeclaredType>,
    pub type_params: Vec<TypeParam>,
    pub annotations: Vec<Annotation>,
    pub members: Vec<Member>,
    pub nested: Vec<TypeDecl>,
    /// Whether the type needs a pointer to its enclosing instance. Set by
    /// the front end only when the body references an enclosing member.
    pub captures_outer: bool,
    /// Captured locals of local and anonymous classes, in capture order.
    pub captures: Vec<Capture>,
    pub doc: Option<String>,
    pub span: Span,
}

impl TypeDecl {
    pub fn new(name: QualifiedName, kind: TypeKind) -> Self {
        let superclass = match kind {
            TypeKind::Class => Some(DeclaredType::new(QualifiedName::new("java.lang", "Object"))),
            TypeKind::Enum => Some(
                DeclaredType::new(QualifiedName::new("java.lang", "Enum"))
                    .with_args(vec![ResolvedType::class(name.clone())]),
            ),
            TypeKind::Interface | TypeKind::Annotation => None,
        };
        let nesting = if name.is_nested() {
            Nesting::Member
        } else {
            Nesting::TopLevel
        };
        TypeDecl {
            name,
            kind,
            nesting,
            modifiers: Modifiers::PUBLIC,
            superclass,
            interfaces: Vec::new(),
            type_params: Vec::new(),
            annotations: Vec::new(),
            members: Vec::new(),
            nested: Vec::new(),
            captures_outer: false,
            captures: Vec::new(),
            doc: None,
            span: Span::DUMMY,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(f) => Some(f),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(m) => Some(m),
            _ => None,
        })
    }

    pub fn constructors(&self) -> impl Iterator<Item = &ConstructorDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Constructor(c) => Some(c),
            _ => None,
        })
    }

    pub fn initializers(&self) -> impl Iterator<Item = &InitializerDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Initializer(i) => Some(i),
            _ => None,
        })
    }

    pub fn enum_constants(&self) -> impl Iterator<Item = &EnumConstantDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::EnumConstant(c) => Some(c),
            _ => None,
        })
    }

    /// This type and every nested type, depth first, outer before inner.
    pub fn walk(&self) -> Vec<&TypeDecl> {
        let mut out = vec![self];
        for nested in &self.nested {
            out.extend(nested.walk());
        }
        out
    }

    /// Non-static member, local and anonymous classes that keep a pointer
    /// to their enclosing instance.
    pub fn has_outer_instance(&self) -> bool {
        self.captures_outer
            && self.nesting != Nesting::TopLevel
            && !self.modifiers.is_static()
            && self.kind == TypeKind::Class
    }

    pub fn memory_hints(&self) -> MemoryHints {
        MemoryHints::from_annotations(&self.annotations)
    }

    pub fn is_deprecated(&self) -> bool {
        annotation::find(&self.annotations, well_known::DEPRECATED).is_some()
    }

    /// Reference form of this declaration.
    pub fn as_type(&self) -> ResolvedType {
        let declared = DeclaredType::new(self.name.clone())
            .with_args(self.type_params.iter().map(TypeParam::as_type).collect());
        if self.kind.is_protocol() {
            ResolvedType::Interface(declared)
        } else {
            ResolvedType::Class(declared)
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Initializer(InitializerDecl),
    EnumConstant(EnumConstantDecl),
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDecl {
    pub name: String,
    pub ty: ResolvedType,
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub initializer: Option<ExprId>,
    /// Compile-time constant value of a `static final` field.
    pub constant: Option<Constant>,
    pub doc: Option<String>,
    pub span: Span,
}

impl FieldDecl {
    pub fn memory_hints(&self) -> MemoryHints {
        MemoryHints::from_annotations(&self.annotations)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    /// Primitive and string constants are inlined at use sites.
    pub fn is_compile_time_constant(&self) -> bool {
        self.constant.is_some()
            && self.modifiers.contains(Modifiers::STATIC | Modifiers::FINAL)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    pub name: String,
    pub ty: ResolvedType,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: ResolvedType) -> Self {
        Param {
            name: name.into(),
            ty,
            annotations: Vec::new(),
            span: Span::DUMMY,
        }
    }
}

/// The root declaration a method overrides. Its parameter types, not the
/// overrider's, determine the synthesized selector.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct OverriddenMethod {
    pub declaring: QualifiedName,
    pub params: Vec<ResolvedType>,
    /// Explicit selector on the overridden declaration, if any.
    pub selector: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: ResolvedType,
    pub thrown: Vec<ResolvedType>,
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub type_params: Vec<TypeParam>,
    /// Root-most overridden methods, outermost first.
    pub overrides: Vec<OverriddenMethod>,
    /// Block statement; `None` for abstract and native methods.
    pub body: Option<StmtId>,
    /// Verbatim native block text for native methods.
    pub native_code: Option<String>,
    /// Default value of an annotation type element.
    pub default_value: Option<AnnotationValue>,
    pub doc: Option<String>,
    pub span: Span,
    /// Span of the method name token.
    pub name_span: Span,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, return_type: ResolvedType) -> Self {
        MethodDecl {
            name: name.into(),
            params: Vec::new(),
            return_type,
            thrown: Vec::new(),
            modifiers: Modifiers::PUBLIC,
            annotations: Vec::new(),
            type_params: Vec::new(),
            overrides: Vec::new(),
            body: None,
            native_code: None,
            default_value: None,
            doc: None,
            span: Span::DUMMY,
            name_span: Span::DUMMY,
        }
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    pub fn is_varargs(&self) -> bool {
        self.modifiers.contains(Modifiers::VARARGS)
    }

    pub fn is_deprecated(&self) -> bool {
        annotation::find(&self.annotations, well_known::DEPRECATED).is_some()
    }

    pub fn param_types(&self) -> Vec<ResolvedType> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstructorDecl {
    pub params: Vec<Param>,
    pub thrown: Vec<ResolvedType>,
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    /// Block statement. A leading `this(...)` or `super(...)` call is the
    /// first statement of the block.
    pub body: Option<StmtId>,
    pub doc: Option<String>,
    pub span: Span,
}

impl ConstructorDecl {
    pub fn param_types(&self) -> Vec<ResolvedType> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    pub fn is_varargs(&self) -> bool {
        self.modifiers.contains(Modifiers::VARARGS)
    }

    pub fn is_deprecated(&self) -> bool {
        annotation::find(&self.annotations, well_known::DEPRECATED).is_some()
    }
}

/// A static or instance initializer block.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct InitializerDecl {
    pub is_static: bool,
    pub body: StmtId,
    pub span: Span,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumConstantDecl {
    pub name: String,
    /// Explicit constructor arguments.
    pub args: ExprRange,
    /// Constructor invoked, `None` for the implicit no-arg constructor.
    pub ctor: Option<CtorRef>,
    /// Anonymous subclass for constants with a body.
    pub body_type: Option<QualifiedName>,
    pub annotations: Vec<Annotation>,
    pub doc: Option<String>,
    pub span: Span,
}

#[cfg(test)]
mod tests;
