//! Compilation units.

use crate::{Annotation, ExprArena, LineIndex, QualifiedName, TypeDecl};

/// One resolved source file: its package, top-level types, and the arena
/// holding every method body in the file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CompilationUnit {
    /// Source path relative to the source root (`com/example/Foo.java`).
    pub file_name: String,
    /// Dotted package name, empty for the default package.
    pub package: String,
    /// Annotations from the package declaration (`package-info`).
    pub package_annotations: Vec<Annotation>,
    /// Full source text; spans index into it.
    pub source: String,
    pub types: Vec<TypeDecl>,
    pub arena: ExprArena,
}

impl CompilationUnit {
    pub fn new(file_name: impl Into<String>, package: impl Into<String>) -> Self {
        CompilationUnit {
            file_name: file_name.into(),
            package: package.into(),
            ..Self::default()
        }
    }

    /// File name without directories (`Foo.java`).
    pub fn base_name(&self) -> &str {
        self.file_name
            .rsplit_once('/')
            .map_or(self.file_name.as_str(), |(_, base)| base)
    }

    pub fn line_index(&self) -> LineIndex {
        LineIndex::build(&self.source)
    }

    /// Every type declared in the unit, nested ones included.
    pub fn all_types(&self) -> Vec<&TypeDecl> {
        self.types.iter().flat_map(TypeDecl::walk).collect()
    }

    pub fn find_type(&self, name: &QualifiedName) -> Option<&TypeDecl> {
        self.all_types().into_iter().find(|t| &t.name == name)
    }
}

/// Failure to encode or decode a cached unit.
#[cfg(feature = "cache")]
#[derive(Debug)]
pub struct CacheError(bincode::Error);

#[cfg(feature = "cache")]
impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "compilation unit cache: {}", self.0)
    }
}

#[cfg(feature = "cache")]
impl std::error::Error for CacheError {}

#[cfg(feature = "cache")]
impl CompilationUnit {
    /// Serialize the unit so a front end in another process can hand it over.
    pub fn encode(&self) -> Result<Vec<u8>, CacheError> {
        bincode::serialize(self).map_err(CacheError)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CacheError> {
        bincode::deserialize(bytes).map_err(CacheError)
    }
}
