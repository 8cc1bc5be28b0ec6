//! Translation errors.
//!
//! Every fallible generation step returns `Result<_, TranslateError>`. Each
//! variant corresponds to exactly one [`ErrorCode`]; callers that need a
//! user-facing report go through [`TranslateError::to_diagnostic`].

use xlat_diagnostic::{Diagnostic, ErrorCode};
use xlat_ir::Span;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TranslateError {
    #[error("{kind} must be desugared before code generation")]
    Unsupported { kind: &'static str, span: Span },

    #[error("`{first}` and `{second}` both translate to selector `{selector}`")]
    SelectorCollision {
        selector: String,
        first: String,
        second: String,
        span: Span,
        previous: Span,
    },

    #[error("types `{first}` and `{second}` both translate to `{name}`")]
    TypeNameCollision {
        name: String,
        first: String,
        second: String,
        span: Span,
    },

    #[error("invalid explicit name `{name}`: {reason}")]
    InvalidExplicitName {
        name: String,
        reason: String,
        span: Span,
    },

    #[error("name annotation on private type `{ty}`")]
    NameOnPrivateType { ty: String, span: Span },

    #[error("invalid property attribute `{attribute}`")]
    InvalidPropertyAttribute { attribute: String, span: Span },

    #[error("property {role} `{accessor}` does not name a method of `{ty}`")]
    MissingPropertyAccessor {
        role: &'static str,
        accessor: String,
        ty: String,
        span: Span,
    },

    #[error("array element of type `{found}` is not assignable to `{expected}`")]
    ArrayStore {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("`{interface}` appears more than once in the conformance list of `{ty}`")]
    DuplicateInterface {
        interface: String,
        ty: String,
        span: Span,
    },

    #[error("internal translator error: {message}")]
    Internal { message: String, span: Span },
}

impl TranslateError {
    #[cold]
    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        TranslateError::Internal {
            message: message.into(),
            span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            TranslateError::Unsupported { .. } => ErrorCode::E5001,
            TranslateError::SelectorCollision { .. } => ErrorCode::E5002,
            TranslateError::TypeNameCollision { .. } => ErrorCode::E5003,
            TranslateError::InvalidExplicitName { .. } => ErrorCode::E5004,
            TranslateError::NameOnPrivateType { .. } => ErrorCode::E5005,
            TranslateError::InvalidPropertyAttribute { .. } => ErrorCode::E5006,
            TranslateError::MissingPropertyAccessor { .. } => ErrorCode::E5007,
            TranslateError::ArrayStore { .. } => ErrorCode::E5008,
            TranslateError::DuplicateInterface { .. } => ErrorCode::E5009,
            TranslateError::Internal { .. } => ErrorCode::E9001,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TranslateError::Unsupported { span, .. }
            | TranslateError::SelectorCollision { span, .. }
            | TranslateError::TypeNameCollision { span, .. }
            | TranslateError::InvalidExplicitName { span, .. }
            | TranslateError::NameOnPrivateType { span, .. }
            | TranslateError::InvalidPropertyAttribute { span, .. }
            | TranslateError::MissingPropertyAccessor { span, .. }
            | TranslateError::ArrayStore { span, .. }
            | TranslateError::DuplicateInterface { span, .. }
            | TranslateError::Internal { span, .. } => *span,
        }
    }

    /// Resolver-contract violations. These abort a whole batch.
    pub fn is_internal(&self) -> bool {
        matches!(self, TranslateError::Internal { .. })
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(self.span(), self.label());
        match self {
            TranslateError::SelectorCollision { previous, .. } => {
                diag.with_secondary_label(*previous, "first declared here")
            }
            TranslateError::InvalidPropertyAttribute { .. } => diag.with_note(
                "valid attributes: nonatomic, atomic, readonly, readwrite, copy, strong, weak, \
                 assign, retain, unsafe_unretained, nullable, nonnull, null_resettable, \
                 null_unspecified, class, getter=, setter=",
            ),
            TranslateError::Internal { .. } => {
                diag.with_note("this is a bug in the front end or the translator")
            }
            _ => diag,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TranslateError::Unsupported { .. } => "not supported here",
            TranslateError::SelectorCollision { .. } => "selector collides",
            TranslateError::TypeNameCollision { .. } => "type name collides",
            TranslateError::InvalidExplicitName { .. } => "invalid name",
            TranslateError::NameOnPrivateType { .. } => "type is private",
            TranslateError::InvalidPropertyAttribute { .. } => "unknown attribute",
            TranslateError::MissingPropertyAccessor { .. } => "no such method",
            TranslateError::ArrayStore { .. } => "incompatible element",
            TranslateError::DuplicateInterface { .. } => "duplicate interface",
            TranslateError::Internal { .. } => "while translating this",
        }
    }
}

#[cfg(test)]
mod tests;
