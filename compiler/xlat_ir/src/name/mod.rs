//! Qualified type names.

use std::fmt;

use smallvec::SmallVec;

/// A fully qualified source type name split into its package and its chain
/// of nested simple names.
///
/// `unit.test.Example.Inner` is package `unit.test` with names
/// `[Example, Inner]`. Keeping the split explicit lets the name mangler
/// treat package segments and nesting segments differently without
/// guessing from capitalization.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct QualifiedName {
    package: String,
    names: SmallVec<[String; 2]>,
}

impl QualifiedName {
    /// A top-level type in `package` (empty string for the default package).
    pub fn new(package: impl Into<String>, simple: impl Into<String>) -> Self {
        let mut names = SmallVec::new();
        names.push(simple.into());
        QualifiedName {
            package: package.into(),
            names,
        }
    }

    /// Parse a dotted name whose last segment is a top-level type.
    ///
    /// `java.lang.String` → package `java.lang`, type `String`. Use
    /// [`QualifiedName::nested`] to build member types.
    pub fn top_level(dotted: &str) -> Self {
        match dotted.rsplit_once('.') {
            Some((package, simple)) => Self::new(package, simple),
            None => Self::new("", dotted),
        }
    }

    /// The member type `simple` declared inside `self`.
    #[must_use]
    pub fn nested(&self, simple: impl Into<String>) -> Self {
        let mut names = self.names.clone();
        names.push(simple.into());
        QualifiedName {
            package: self.package.clone(),
            names,
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Simple names from the outermost type inwards.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The innermost simple name.
    pub fn simple_name(&self) -> &str {
        self.names.last().map_or("", String::as_str)
    }

    pub fn is_nested(&self) -> bool {
        self.names.len() > 1
    }

    /// The enclosing type, for nested types.
    pub fn outer(&self) -> Option<QualifiedName> {
        if !self.is_nested() {
            return None;
        }
        let mut names = self.names.clone();
        names.pop();
        Some(QualifiedName {
            package: self.package.clone(),
            names,
        })
    }

    /// The outermost enclosing type (itself for top-level types).
    #[must_use]
    pub fn top_level_type(&self) -> QualifiedName {
        let mut names = SmallVec::new();
        names.push(self.names.first().cloned().unwrap_or_default());
        QualifiedName {
            package: self.package.clone(),
            names,
        }
    }

    /// Binary name with `$` between nested names (`a.b.Outer$Inner`),
    /// as reflection metadata spells it.
    pub fn binary_name(&self) -> String {
        let joined = self.names.join("$");
        if self.package.is_empty() {
            joined
        } else {
            format!("{}.{joined}", self.package)
        }
    }

    /// Source path of the unit declaring this type, without extension
    /// (`a/b/Outer`).
    pub fn source_path(&self) -> String {
        let top = self.names.first().map_or("", String::as_str);
        if self.package.is_empty() {
            top.to_owned()
        } else {
            format!("{}/{top}", self.package.replace('.', "/"))
        }
    }

    /// True for `java.lang.Object`.
    pub fn is_object(&self) -> bool {
        self.is("java.lang", "Object")
    }

    /// True for `java.lang.String`.
    pub fn is_string(&self) -> bool {
        self.is("java.lang", "String")
    }

    /// True when this is the top-level type `package.simple`.
    pub fn is(&self, package: &str, simple: &str) -> bool {
        self.package == package && self.names.len() == 1 && self.names[0] == simple
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.package.is_empty() {
            write!(f, "{}.", self.package)?;
        }
        write!(f, "{}", self.names.join("."))
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({self})")
    }
}

#[cfg(test)]
mod tests;
