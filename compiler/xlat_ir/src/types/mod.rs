//! Resolved source types.
//!
//! Every expression and member in the model carries one of these. Generic
//! arguments are already resolved (or erased to their bound) by the front
//! end; this module only knows how to erase and classify them.

use std::fmt;

use crate::QualifiedName;

/// Source primitive kinds, plus `void` for return types.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveKind {
    /// All kinds except `void`.
    pub const VALUE_KINDS: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    /// The source keyword (`int`, `boolean`, ...).
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Void => "void",
        }
    }

    /// Single-letter reflection descriptor (`I`, `Z`, ...).
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveKind::Boolean => 'Z',
            PrimitiveKind::Byte => 'B',
            PrimitiveKind::Char => 'C',
            PrimitiveKind::Short => 'S',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Double => 'D',
            PrimitiveKind::Void => 'V',
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Byte
                | PrimitiveKind::Char
                | PrimitiveKind::Short
                | PrimitiveKind::Int
                | PrimitiveKind::Long
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, PrimitiveKind::Float | PrimitiveKind::Double)
    }

    /// Storage width in bits; `None` for boolean and void.
    pub fn bit_width(self) -> Option<u8> {
        match self {
            PrimitiveKind::Byte => Some(8),
            PrimitiveKind::Char | PrimitiveKind::Short => Some(16),
            PrimitiveKind::Int | PrimitiveKind::Float => Some(32),
            PrimitiveKind::Long | PrimitiveKind::Double => Some(64),
            PrimitiveKind::Boolean | PrimitiveKind::Void => None,
        }
    }

    /// Unsigned storage: only `char` among the source primitives.
    pub fn is_unsigned(self) -> bool {
        self == PrimitiveKind::Char
    }
}

/// Reference to a declared class or interface, with type arguments.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct DeclaredType {
    pub name: QualifiedName,
    pub args: Vec<ResolvedType>,
}

impl DeclaredType {
    pub fn new(name: QualifiedName) -> Self {
        DeclaredType {
            name,
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<ResolvedType>) -> Self {
        self.args = args;
        self
    }
}

/// An array type. `element` is never itself an array; nesting is
/// expressed through `dimensions`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrayType {
    pub element: Box<ResolvedType>,
    pub dimensions: u8,
}

impl ArrayType {
    /// The type produced by indexing once.
    pub fn component(&self) -> ResolvedType {
        if self.dimensions > 1 {
            ResolvedType::Array(ArrayType {
                element: self.element.clone(),
                dimensions: self.dimensions - 1,
            })
        } else {
            (*self.element).clone()
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeVariable {
    pub name: String,
    /// Declared bounds in source order. A class bound, if any, comes first.
    pub bounds: Vec<ResolvedType>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundKind {
    Unbounded,
    Extends,
    Super,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct WildcardType {
    pub kind: BoundKind,
    pub bound: Option<Box<ResolvedType>>,
}

/// A generic type parameter declared on a type or method.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeParam {
    pub name: String,
    pub bounds: Vec<ResolvedType>,
}

impl TypeParam {
    pub fn as_type(&self) -> ResolvedType {
        ResolvedType::TypeVariable(TypeVariable {
            name: self.name.clone(),
            bounds: self.bounds.clone(),
        })
    }
}

/// The resolved type of an expression, member or declaration.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolvedType {
    Primitive(PrimitiveKind),
    Class(DeclaredType),
    Interface(DeclaredType),
    Array(ArrayType),
    TypeVariable(TypeVariable),
    Wildcard(WildcardType),
    /// Type of the `null` literal.
    Null,
}

impl ResolvedType {
    pub const VOID: ResolvedType = ResolvedType::Primitive(PrimitiveKind::Void);
    pub const BOOLEAN: ResolvedType = ResolvedType::Primitive(PrimitiveKind::Boolean);
    pub const INT: ResolvedType = ResolvedType::Primitive(PrimitiveKind::Int);
    pub const LONG: ResolvedType = ResolvedType::Primitive(PrimitiveKind::Long);
    pub const CHAR: ResolvedType = ResolvedType::Primitive(PrimitiveKind::Char);
    pub const DOUBLE: ResolvedType = ResolvedType::Primitive(PrimitiveKind::Double);

    pub fn class(name: QualifiedName) -> Self {
        ResolvedType::Class(DeclaredType::new(name))
    }

    pub fn interface(name: QualifiedName) -> Self {
        ResolvedType::Interface(DeclaredType::new(name))
    }

    pub fn object() -> Self {
        Self::class(QualifiedName::new("java.lang", "Object"))
    }

    pub fn string() -> Self {
        Self::class(QualifiedName::new("java.lang", "String"))
    }

    /// Array of `element` with `dimensions` extra levels. Nested arrays are
    /// flattened so the stored element is never an array.
    pub fn array_of(element: ResolvedType, dimensions: u8) -> Self {
        match element {
            ResolvedType::Array(inner) => ResolvedType::Array(ArrayType {
                element: inner.element,
                dimensions: inner.dimensions + dimensions,
            }),
            other => ResolvedType::Array(ArrayType {
                element: Box::new(other),
                dimensions,
            }),
        }
    }

    pub fn type_var(name: impl Into<String>, bounds: Vec<ResolvedType>) -> Self {
        ResolvedType::TypeVariable(TypeVariable {
            name: name.into(),
            bounds,
        })
    }

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            ResolvedType::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, ResolvedType::Primitive(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, ResolvedType::Primitive(PrimitiveKind::Void))
    }

    /// Anything that lowers to an object pointer.
    pub fn is_reference(&self) -> bool {
        !self.is_primitive()
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ResolvedType::Array(_))
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, ResolvedType::Interface(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, ResolvedType::Class(d) if d.name.is_string())
    }

    pub fn is_object(&self) -> bool {
        matches!(self, ResolvedType::Class(d) if d.name.is_object())
    }

    /// Declared class or interface, if this is one.
    pub fn declared(&self) -> Option<&DeclaredType> {
        match self {
            ResolvedType::Class(d) | ResolvedType::Interface(d) => Some(d),
            _ => None,
        }
    }

    /// Runtime representation after generic erasure.
    ///
    /// Type variables erase to their first bound (or `Object`), wildcards to
    /// their upper bound, declared types drop their arguments, and arrays
    /// erase their element type.
    #[must_use]
    pub fn erasure(&self) -> ResolvedType {
        match self {
            ResolvedType::Class(d) => ResolvedType::Class(DeclaredType::new(d.name.clone())),
            ResolvedType::Interface(d) => {
                ResolvedType::Interface(DeclaredType::new(d.name.clone()))
            }
            ResolvedType::Array(a) => ResolvedType::array_of(a.element.erasure(), a.dimensions),
            ResolvedType::TypeVariable(v) => v
                .bounds
                .first()
                .map_or_else(ResolvedType::object, ResolvedType::erasure),
            ResolvedType::Wildcard(w) => match (w.kind, &w.bound) {
                (BoundKind::Extends, Some(bound)) => bound.erasure(),
                _ => ResolvedType::object(),
            },
            ResolvedType::Primitive(_) | ResolvedType::Null => self.clone(),
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Primitive(kind) => f.write_str(kind.keyword()),
            ResolvedType::Class(d) | ResolvedType::Interface(d) => {
                write!(f, "{}", d.name)?;
                if !d.args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in d.args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            ResolvedType::Array(a) => {
                write!(f, "{}", a.element)?;
                for _ in 0..a.dimensions {
                    f.write_str("[]")?;
                }
                Ok(())
            }
            ResolvedType::TypeVariable(v) => f.write_str(&v.name),
            ResolvedType::Wildcard(w) => match (w.kind, &w.bound) {
                (BoundKind::Extends, Some(b)) => write!(f, "? extends {b}"),
                (BoundKind::Super, Some(b)) => write!(f, "? super {b}"),
                _ => f.write_str("?"),
            },
            ResolvedType::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests;
