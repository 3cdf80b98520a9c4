//! Structural SPARQL command handling.
//!
//! This crate classifies and restructures SPARQL text without evaluating
//! it. It answers exactly the questions rule resolution needs:
//!
//! - which form a query is (`SELECT` / `CONSTRUCT` / `ASK` / `DESCRIBE`),
//!   and the operations of an update script;
//! - where the outermost group pattern sits, and which brace groups nest
//!   inside it;
//! - whether a variable occurs in the pattern, and whether it occurs only
//!   inside nested groups;
//! - how to splice a scoping clause at the head of the outermost group.
//!
//! Non-goals:
//! - no SPARQL algebra, no execution, no prefix expansion;
//! - no validation beyond token shapes and brace structure. Text that a
//!   real SPARQL engine would reject can pass here; text rejected here is
//!   malformed enough that no engine would take it either.

pub mod ast;
pub mod error;
pub mod parse;
pub mod render;
pub mod rewrite;
pub mod token;

pub use ast::{GroupPattern, Query, QueryForm, UpdateOperation, UpdateScript};
pub use error::CommandSyntaxError;
pub use parse::{parse_query, parse_update};
pub use render::render_tokens;
pub use rewrite::{
    insert_target_class_clause, insert_target_class_clause_update, TARGET_CLASS_VAR, THIS_VAR,
};
pub use token::{tokenize, Token, TokenKind};
