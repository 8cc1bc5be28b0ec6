//! Error codes for translator diagnostics.
//!
//! Ranges:
//! - E5xxx: code generation errors (the unit fails)
//! - E9xxx: internal errors (the batch aborts)
//! - W5xxx: code generation warnings (output is still produced)

use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    // Codegen Errors (E5xxx)
    /// Unsupported AST node kind reached code generation
    E5001,
    /// Two methods of one type synthesize the same selector
    E5002,
    /// Two distinct types flatten to the same identifier
    E5003,
    /// Malformed explicit name annotation
    E5004,
    /// Name annotation applied to a private type
    E5005,
    /// Unknown or conflicting property attribute
    E5006,
    /// Property accessor override names a missing method
    E5007,
    /// Array initializer element not assignable to the element type
    E5008,
    /// Superinterface listed more than once
    E5009,

    // Internal Errors (E9xxx)
    /// Internal translator error
    E9001,
    /// Too many errors
    E9002,

    // Codegen Warnings (W5xxx)
    /// Use of a deprecated member or type
    W5001,
    /// Native code block delimiters do not match
    W5002,
}

impl ErrorCode {
    /// All variants, for exhaustive testing.
    ///
    /// Kept in sync with `as_str()`; `all_codes_round_trip` catches omissions.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E5001,
        ErrorCode::E5002,
        ErrorCode::E5003,
        ErrorCode::E5004,
        ErrorCode::E5005,
        ErrorCode::E5006,
        ErrorCode::E5007,
        ErrorCode::E5008,
        ErrorCode::E5009,
        ErrorCode::E9001,
        ErrorCode::E9002,
        ErrorCode::W5001,
        ErrorCode::W5002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E5001 => "E5001",
            ErrorCode::E5002 => "E5002",
            ErrorCode::E5003 => "E5003",
            ErrorCode::E5004 => "E5004",
            ErrorCode::E5005 => "E5005",
            ErrorCode::E5006 => "E5006",
            ErrorCode::E5007 => "E5007",
            ErrorCode::E5008 => "E5008",
            ErrorCode::E5009 => "E5009",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            ErrorCode::W5001 => "W5001",
            ErrorCode::W5002 => "W5002",
        }
    }

    /// One-line description used by `--explain`-style tooling.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E5001 => "unsupported syntax node in code generation",
            ErrorCode::E5002 => "selector collision between methods",
            ErrorCode::E5003 => "type name collision",
            ErrorCode::E5004 => "invalid explicit name",
            ErrorCode::E5005 => "name annotation on private type",
            ErrorCode::E5006 => "invalid property attribute",
            ErrorCode::E5007 => "property accessor not found",
            ErrorCode::E5008 => "incompatible array element",
            ErrorCode::E5009 => "duplicate superinterface",
            ErrorCode::E9001 => "internal translator error",
            ErrorCode::E9002 => "too many errors",
            ErrorCode::W5001 => "deprecated API use",
            ErrorCode::W5002 => "native code delimiter mismatch",
        }
    }

    pub fn is_codegen_error(&self) -> bool {
        self.as_str().starts_with("E5")
    }

    pub fn is_internal_error(&self) -> bool {
        self.as_str().starts_with("E9")
    }

    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ErrorCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown error code: {s}"))
    }
}
