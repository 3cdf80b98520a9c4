//! Command syntax faults.

use thiserror::Error;

/// Raised when command text cannot be tokenized or structured, or when a
/// scoping rewrite cannot be applied. Carries byte positions into the
/// original text where available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandSyntaxError {
    #[error("empty command text")]
    Empty,

    #[error("unterminated {what} at byte {position}")]
    Unterminated { what: &'static str, position: usize },

    #[error("unexpected character `{found}` at byte {position}")]
    UnexpectedChar { found: char, position: usize },

    #[error("`{{` at byte {position} is never closed")]
    UnclosedGroup { position: usize },

    #[error("unmatched `}}` at byte {position}")]
    StrayClose { position: usize },

    #[error("malformed prologue declaration at byte {position}")]
    MalformedPrologue { position: usize },

    #[error("not a recognized query form: `{found}`")]
    UnrecognizedForm { found: String },

    #[error("missing `{{` after {after}")]
    MissingGroup { after: &'static str },

    #[error("update script has no operations")]
    EmptyUpdate,

    #[error("command has no group pattern to scope")]
    NoPattern,

    #[error("scoping rewrite changed the command form")]
    FormDrift,
}
