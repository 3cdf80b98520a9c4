//! Structural command representations.

use crate::token::{Token, TokenKind};
use std::fmt;

/// Query form, classified from the keyword after the prologue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryForm {
    Select,
    Construct,
    Ask,
    Describe,
}

impl fmt::Display for QueryForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryForm::Select => "SELECT",
            QueryForm::Construct => "CONSTRUCT",
            QueryForm::Ask => "ASK",
            QueryForm::Describe => "DESCRIBE",
        };
        f.write_str(name)
    }
}

/// A brace-delimited group with its nested groups. Indices address the
/// token stream of the owning command; byte offsets address its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPattern {
    /// Token index of the opening `{`.
    pub open: usize,
    /// Token index of the closing `}`.
    pub close: usize,
    /// Byte offset of the opening `{`.
    pub start: usize,
    /// Byte offset just past the closing `}`.
    pub end: usize,
    pub children: Vec<GroupPattern>,
}

impl GroupPattern {
    fn inside_child(&self, token_index: usize) -> bool {
        self.children
            .iter()
            .any(|c| c.open <= token_index && token_index <= c.close)
    }
}

fn var_indices(tokens: &[Token], group: &GroupPattern, var: &str) -> Vec<usize> {
    (group.open + 1..group.close)
        .filter(|i| tokens[*i].kind == TokenKind::Var && tokens[*i].var_name() == Some(var))
        .collect()
}

fn mentions_var(tokens: &[Token], group: &GroupPattern, var: &str) -> bool {
    !var_indices(tokens, group, var).is_empty()
}

/// True when `var` occurs in the group but never in its outermost
/// conjunction: every occurrence sits inside some nested brace group.
fn var_only_nested(tokens: &[Token], group: &GroupPattern, var: &str) -> bool {
    let occurrences = var_indices(tokens, group, var);
    !occurrences.is_empty() && occurrences.iter().all(|i| group.inside_child(*i))
}

/// A structurally parsed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub form: QueryForm,
    /// Original text, untouched.
    pub text: String,
    pub tokens: Vec<Token>,
    /// The `CONSTRUCT { ... }` template block, when the long form is used.
    pub template: Option<GroupPattern>,
    /// The outermost group pattern. Absent only for `DESCRIBE` without a
    /// `WHERE` clause.
    pub pattern: Option<GroupPattern>,
}

impl Query {
    /// Does `var` occur in the group pattern? Occurrences in a
    /// `CONSTRUCT` template do not count.
    pub fn mentions_var(&self, var: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|g| mentions_var(&self.tokens, g, var))
            .unwrap_or(false)
    }

    /// Does `var` occur in the pattern, but only inside nested groups?
    pub fn var_only_in_nested_groups(&self, var: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|g| var_only_nested(&self.tokens, g, var))
            .unwrap_or(false)
    }
}

/// One operation of an update script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOperation {
    /// Leading keyword(s), uppercased: `INSERT DATA`, `DELETE WHERE`,
    /// `INSERT`, `LOAD`, ...
    pub verb: String,
    /// Byte offset of the operation's first token, prologue included.
    pub start: usize,
    /// Byte offset just past its last token.
    pub end: usize,
    /// The operation's `WHERE` group, when it has one. Data blocks of
    /// `INSERT DATA` / `DELETE DATA` are not patterns.
    pub pattern: Option<GroupPattern>,
}

/// A structurally parsed update script: one or more operations separated
/// by `;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateScript {
    /// Original text, untouched.
    pub text: String,
    pub tokens: Vec<Token>,
    pub operations: Vec<UpdateOperation>,
}

impl UpdateScript {
    /// The operation rule resolution acts on: the script's first. `None`
    /// only for a hand-built script with no operations; parsing never
    /// produces one.
    pub fn primary(&self) -> Option<&UpdateOperation> {
        self.operations.first()
    }

    /// Does `var` occur in the primary operation's pattern?
    pub fn mentions_var(&self, var: &str) -> bool {
        self.primary()
            .and_then(|op| op.pattern.as_ref())
            .map(|g| mentions_var(&self.tokens, g, var))
            .unwrap_or(false)
    }

    /// Does `var` occur in the primary operation's pattern, but only
    /// inside nested groups?
    pub fn var_only_in_nested_groups(&self, var: &str) -> bool {
        self.primary()
            .and_then(|op| op.pattern.as_ref())
            .map(|g| var_only_nested(&self.tokens, g, var))
            .unwrap_or(false)
    }
}
