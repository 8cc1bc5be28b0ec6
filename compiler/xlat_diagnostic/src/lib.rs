//! Diagnostics for the xlat translator.
//!
//! Every user-facing problem the code generator finds is a [`Diagnostic`]:
//! an [`ErrorCode`] for searchability, a message, a primary label at the
//! offending source span, and optional notes.
//!
//! # Error Guarantees
//!
//! A compilation unit is only marked failed with an [`ErrorGuaranteed`] in
//! hand, and the only way to get one is to put an error into a
//! [`DiagnosticQueue`]. A unit cannot fail silently.

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
