//! Applied annotations and the translator hints they carry.

use bitflags::bitflags;

use crate::{QualifiedName, ResolvedType, Span};

/// An annotation applied to a type, member, parameter or package.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    pub name: QualifiedName,
    /// Explicitly supplied element values, in source order.
    pub values: Vec<(String, AnnotationValue)>,
    pub span: Span,
}

impl Annotation {
    pub fn new(name: QualifiedName) -> Self {
        Annotation {
            name,
            values: Vec::new(),
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn with_value(mut self, element: impl Into<String>, value: AnnotationValue) -> Self {
        self.values.push((element.into(), value));
        self
    }

    pub fn value(&self, element: &str) -> Option<&AnnotationValue> {
        self.values
            .iter()
            .find(|(name, _)| name == element)
            .map(|(_, v)| v)
    }

    /// The `value` element as a string, for single-string annotations.
    pub fn string_value(&self) -> Option<&str> {
        match self.value("value") {
            Some(AnnotationValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is(&self, dotted: &str) -> bool {
        self.name.to_string() == dotted
    }
}

/// Compile-time annotation element value.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum AnnotationValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    /// IEEE bits of a float.
    Float(u32),
    /// IEEE bits of a double.
    Double(u64),
    Char(u16),
    String(String),
    Enum { ty: QualifiedName, constant: String },
    Class(ResolvedType),
    Annotation(Box<Annotation>),
    Array(Vec<AnnotationValue>),
}

/// Qualified names of annotations the translator interprets.
pub mod well_known {
    pub const WEAK: &str = "com.google.j2objc.annotations.Weak";
    pub const WEAK_OUTER: &str = "com.google.j2objc.annotations.WeakOuter";
    pub const RETAINED_WITH: &str = "com.google.j2objc.annotations.RetainedWith";
    pub const AUTORELEASE_POOL: &str = "com.google.j2objc.annotations.AutoreleasePool";
    pub const OBJECTIVE_C_NAME: &str = "com.google.j2objc.annotations.ObjectiveCName";
    pub const SWIFT_NAME: &str = "com.google.j2objc.annotations.SwiftName";
    pub const PROPERTY: &str = "com.google.j2objc.annotations.Property";
    pub const DEPRECATED: &str = "java.lang.Deprecated";
    pub const NULLABLE: &str = "javax.annotation.Nullable";
    pub const NONNULL: &str = "javax.annotation.Nonnull";
}

bitflags! {
    /// Memory-management hints read from annotations.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
    pub struct MemoryHints: u8 {
        /// Field or variable holds a non-owning reference.
        const WEAK = 1 << 0;
        /// Nested type holds its enclosing instance weakly.
        const WEAK_OUTER = 1 << 1;
        /// Field is a strong reference paired with a back-reference.
        const RETAINED_WITH = 1 << 2;
    }
}

impl MemoryHints {
    pub fn from_annotations(annotations: &[Annotation]) -> Self {
        let mut hints = MemoryHints::empty();
        for annotation in annotations {
            if annotation.is(well_known::WEAK) {
                hints |= MemoryHints::WEAK;
            } else if annotation.is(well_known::WEAK_OUTER) {
                hints |= MemoryHints::WEAK_OUTER;
            } else if annotation.is(well_known::RETAINED_WITH) {
                hints |= MemoryHints::RETAINED_WITH;
            }
        }
        hints
    }
}

/// First annotation named `dotted`.
pub fn find<'a>(annotations: &'a [Annotation], dotted: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.is(dotted))
}
