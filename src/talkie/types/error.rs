//! Custom error types for the talkie-dict crate.

use thiserror::Error;

/// The grammar position at which a declaration was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationFault {
    /// The storage qualifier was present but not the last token before `=`.
    #[error("expected storage qualifier {expected} immediately before '=', found {found:?}")]
    ExpectedQualifier { expected: String, found: String },

    /// The type keyword (after an optional `const`) was missing or unknown.
    #[error("expected const/type keyword, found {found:?}")]
    ExpectedTypeKeyword { found: String },

    /// The identifier was not followed by a well-formed `[]`.
    #[error("malformed array suffix: {found:?}")]
    MalformedArraySuffix { found: String },

    #[error("missing '=' between declarator and initializer")]
    MissingAssignment,

    /// The initializer is not of the shape `{ ... };`.
    #[error("malformed initializer body: {0}")]
    MalformedBody(String),

    /// The identifier is empty once the name prefix is removed.
    #[error("identifier {identifier:?} has no name after its prefix")]
    EmptyName { identifier: String },

    #[error("declaration {identifier} has no bytes")]
    EmptyBody { identifier: String },
}

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum TalkieError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The line sequence of a source cannot form a declaration (e.g. a hex
    /// continuation line with no open declaration).
    #[error("{origin}:{line}: malformed input: {reason}")]
    MalformedInput {
        origin: String,
        line: usize,
        reason: String,
    },

    /// A reconstructed declaration does not match the declaration grammar.
    #[error("malformed declaration: {0}")]
    MalformedDeclaration(#[from] DeclarationFault),

    /// A byte literal is not `0x` followed by one or two hex digits.
    #[error("malformed byte token {token:?} in declaration {name}")]
    MalformedByteToken { name: String, token: String },

    /// A length or offset does not fit the 32-bit index fields.
    #[error("declaration {name} would overflow the 32-bit dictionary index")]
    IndexOverflow { name: String },

    /// A compile option is out of range or unrecognised.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// A parser-stage error located in a specific source.
    #[error("{origin}:{line}: {inner}")]
    At {
        origin: String,
        line: usize,
        inner: Box<TalkieError>,
    },
}

impl TalkieError {
    /// Attach a source identifier and line number to this error.
    pub fn at(self, origin: &str, line: usize) -> Self {
        match self {
            located @ (TalkieError::At { .. } | TalkieError::MalformedInput { .. }) => located,
            inner => TalkieError::At {
                origin: origin.to_string(),
                line,
                inner: Box::new(inner),
            },
        }
    }
}

/// A convenience `Result` type alias using the crate's `TalkieError` type.
pub type Result<T> = std::result::Result<T, TalkieError>;
