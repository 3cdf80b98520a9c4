//! Scoping rewrites.
//!
//! Rule commands mention the implicit instance variable `?this`. To
//! restrict execution to instances of one class, a type clause binding
//! `?this` against the reserved `?targetClass` variable is spliced at the
//! head of the outermost group pattern; the executor pre-binds
//! `?targetClass` to the class being processed.
//!
//! The splice is textual, anchored on the parsed group's opening brace, so
//! a `CONSTRUCT` template block is never touched. Callers re-parse the
//! result; a failed re-parse must surface, never be swallowed.

use crate::ast::{Query, UpdateScript};
use crate::error::CommandSyntaxError;

/// The implicit current-instance variable.
pub const THIS_VAR: &str = "this";

/// Reserved variable the executor binds to the class under evaluation.
pub const TARGET_CLASS_VAR: &str = "targetClass";

const TYPE_CLAUSE: &str = "?this a ?targetClass .";

fn splice_after(text: &str, brace_end: usize) -> String {
    let rest = &text[brace_end..];
    let mut out = String::with_capacity(text.len() + TYPE_CLAUSE.len() + 2);
    out.push_str(&text[..brace_end]);
    out.push(' ');
    out.push_str(TYPE_CLAUSE);
    // The brace may already be followed by whitespace.
    if !rest.starts_with(char::is_whitespace) {
        out.push(' ');
    }
    out.push_str(rest);
    out
}

/// Rewrite a query so its outermost group opens with the type clause.
pub fn insert_target_class_clause(query: &Query) -> Result<String, CommandSyntaxError> {
    let pattern = query.pattern.as_ref().ok_or(CommandSyntaxError::NoPattern)?;
    let brace_end = query.tokens[pattern.open].end;
    Ok(splice_after(&query.text, brace_end))
}

/// Rewrite an update script so its primary operation's pattern opens with
/// the type clause.
pub fn insert_target_class_clause_update(
    script: &UpdateScript,
) -> Result<String, CommandSyntaxError> {
    let pattern = script
        .primary()
        .and_then(|op| op.pattern.as_ref())
        .ok_or(CommandSyntaxError::NoPattern)?;
    let brace_end = script.tokens[pattern.open].end;
    Ok(splice_after(&script.text, brace_end))
}
