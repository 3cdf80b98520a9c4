//! Normalized rendering.
//!
//! Rendering joins token texts with single spaces. The result carries the
//! same token stream as its source, so render-parse-render is a fixpoint
//! and renderings compare equal whenever two commands tokenize equally.

use crate::ast::{Query, UpdateScript};
use crate::token::Token;

pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for tok in tokens {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&tok.text);
    }
    out
}

impl Query {
    /// Single-line normalized form of the whole query.
    pub fn render(&self) -> String {
        render_tokens(&self.tokens)
    }
}

impl UpdateScript {
    /// Single-line normalized form of the whole script.
    pub fn render(&self) -> String {
        render_tokens(&self.tokens)
    }
}
