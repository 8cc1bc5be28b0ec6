//! Generation options.
//!
//! A plain value type with sensible defaults. Drivers build one from
//! command-line style flags through [`Options::apply_flag`]; library users
//! set fields directly.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;

/// How generated code manages object lifetimes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum MemoryManagement {
    /// Manual retain/release: `RELEASE_` in dealloc, `JreStrongAssign` for
    /// strong stores, `WEAK_` on weak ivars.
    #[default]
    ReferenceCounting,
    /// Compiler-tracked ownership: `__weak` and `__unsafe_unretained`
    /// qualifiers, no dealloc releases.
    Arc,
}

impl MemoryManagement {
    pub fn is_arc(self) -> bool {
        self == MemoryManagement::Arc
    }
}

impl FromStr for MemoryManagement {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rc" | "reference-counting" => Ok(MemoryManagement::ReferenceCounting),
            "arc" => Ok(MemoryManagement::Arc),
            _ => Err(OptionError::InvalidValue {
                flag: "memory".to_owned(),
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for MemoryManagement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemoryManagement::ReferenceCounting => "rc",
            MemoryManagement::Arc => "arc",
        })
    }
}

/// A flag `apply_flag` could not interpret.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum OptionError {
    #[error("unknown option `{0}`")]
    Unknown(String),
    #[error("invalid value `{value}` for option `--{flag}`")]
    InvalidValue { flag: String, value: String },
    #[error("option `--{0}` requires a value")]
    MissingValue(String),
}

/// Options controlling the shape of generated code.
#[derive(Clone, Debug, Eq, PartialEq)]
#[allow(
    clippy::struct_excessive_bools,
    reason = "each flag maps onto one independent translator switch"
)]
pub struct Options {
    /// One header/implementation pair per nested type.
    pub separate_headers: bool,
    /// Guard every type segment with `INCLUDE_ALL_`/`RESTRICT_` macros.
    pub segmented_headers: bool,
    /// `+ (T)name` / `+ (void)setName:` class methods for static fields.
    pub static_accessor_methods: bool,
    /// `@property (class)` declarations for static fields.
    pub class_properties: bool,
    pub nullability: bool,
    /// Suppress reflection metadata.
    pub strip_reflection: bool,
    /// `#line` directives before translated statements.
    pub line_directives: bool,
    pub disallow_inherited_constructors: bool,
    pub memory_management: MemoryManagement,
    pub doc_comments: bool,
    /// Keep type arguments as lightweight generics on declarations.
    pub generics: bool,
    /// Declare private members in the public header instead of a class
    /// extension.
    pub private_declarations_in_header: bool,
    /// Package → prefix overrides, in addition to package annotations.
    pub package_prefixes: FxHashMap<String, String>,
    /// `NS_SWIFT_NAME` on constructors.
    pub swift_friendly: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            separate_headers: false,
            segmented_headers: true,
            static_accessor_methods: false,
            class_properties: false,
            nullability: false,
            strip_reflection: false,
            line_directives: false,
            disallow_inherited_constructors: true,
            memory_management: MemoryManagement::ReferenceCounting,
            doc_comments: false,
            generics: false,
            private_declarations_in_header: false,
            package_prefixes: FxHashMap::default(),
            swift_friendly: false,
        }
    }
}

impl Options {
    pub fn is_arc(&self) -> bool {
        self.memory_management.is_arc()
    }

    /// Static fields are reached through class methods or class properties.
    pub fn emits_static_accessors(&self) -> bool {
        self.static_accessor_methods || self.class_properties
    }

    /// Apply one flag: `--name`, `--no-name`, `--name=true|false`,
    /// `--memory=rc|arc` or `--prefix=package=PREFIX`.
    pub fn apply_flag(&mut self, flag: &str) -> Result<(), OptionError> {
        let Some(body) = flag.strip_prefix("--") else {
            return Err(OptionError::Unknown(flag.to_owned()));
        };
        let (name, value) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        match name {
            "memory" => {
                let value = value.ok_or_else(|| OptionError::MissingValue(name.to_owned()))?;
                self.memory_management = value.parse()?;
                return Ok(());
            }
            "prefix" => {
                let value = value.ok_or_else(|| OptionError::MissingValue(name.to_owned()))?;
                let Some((package, prefix)) = value.split_once('=') else {
                    return Err(OptionError::InvalidValue {
                        flag: name.to_owned(),
                        value: value.to_owned(),
                    });
                };
                if package.is_empty() || prefix.is_empty() {
                    return Err(OptionError::InvalidValue {
                        flag: name.to_owned(),
                        value: value.to_owned(),
                    });
                }
                self.package_prefixes
                    .insert(package.to_owned(), prefix.to_owned());
                return Ok(());
            }
            _ => {}
        }

        let (switch, enabled) = match name.strip_prefix("no-") {
            Some(rest) if value.is_none() => (rest, false),
            _ => {
                let enabled = match value {
                    None | Some("true") => true,
                    Some("false") => false,
                    Some(other) => {
                        return Err(OptionError::InvalidValue {
                            flag: name.to_owned(),
                            value: other.to_owned(),
                        })
                    }
                };
                (name, enabled)
            }
        };
        let slot = self
            .switch_mut(switch)
            .ok_or_else(|| OptionError::Unknown(flag.to_owned()))?;
        *slot = enabled;
        Ok(())
    }

    fn switch_mut(&mut self, name: &str) -> Option<&mut bool> {
        Some(match name {
            "separate-headers" => &mut self.separate_headers,
            "segmented-headers" => &mut self.segmented_headers,
            "static-accessor-methods" => &mut self.static_accessor_methods,
            "class-properties" => &mut self.class_properties,
            "nullability" => &mut self.nullability,
            "strip-reflection" => &mut self.strip_reflection,
            "line-directives" => &mut self.line_directives,
            "disallow-inherited-constructors" => &mut self.disallow_inherited_constructors,
            "doc-comments" => &mut self.doc_comments,
            "generics" => &mut self.generics,
            "private-declarations-in-header" => &mut self.private_declarations_in_header,
            "swift-friendly" => &mut self.swift_friendly,
            _ => return None,
        })
    }
}
