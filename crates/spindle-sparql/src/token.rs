//! SPARQL-aware tokenizer.
//!
//! Splits command text into words, variables, IRI refs, literals and
//! punctuation, each with its byte span. Comments run from `#` to end of
//! line and are dropped; `#` inside IRI refs and literals is content.
//!
//! Literals keep their language tag or datatype suffix glued to the token
//! so a space-joined rendering never splits `"x"@en` or `"1"^^xsd:int`.

use crate::error::CommandSyntaxError;
use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, take_until, take_while, take_while1},
    character::complete::{anychar, char, none_of, one_of},
    combinator::{map, opt, recognize},
    sequence::{delimited, pair},
    IResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Keywords, prefixed names, numbers, `a`.
    Word,
    /// `?name` or `$name`.
    Var,
    /// `<...>` IRI reference.
    Iri,
    /// Quoted literal, including any `@lang` or `^^type` suffix.
    Literal,
    /// Braces, parens, operators, statement terminators.
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset just past the last character.
    pub end: usize,
}

impl Token {
    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == p
    }

    pub fn is_word(&self, w: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(w)
    }

    /// Variable name without the `?` / `$` sigil.
    pub fn var_name(&self) -> Option<&str> {
        if self.kind == TokenKind::Var {
            self.text.strip_prefix(['?', '$'])
        } else {
            None
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ':' || c == '-'
}

fn is_iri_char(c: char) -> bool {
    !matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\') && !c.is_whitespace()
}

fn lex_iri(input: &str) -> IResult<&str, &str> {
    recognize(delimited(char('<'), take_while(is_iri_char), char('>')))(input)
}

fn lex_var(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        one_of("?$"),
        take_while1(|c: char| c.is_alphanumeric() || c == '_'),
    ))(input)
}

/// Words cover keywords, prefixed names and numbers. A `.` joins a word
/// only between word characters, which keeps decimals and dotted local
/// names whole while leaving triple terminators alone.
fn lex_word(input: &str) -> IResult<&str, &str> {
    let mut iter = input.char_indices().peekable();
    let mut end = 0;
    while let Some((i, c)) = iter.next() {
        if is_word_char(c) {
            end = i + c.len_utf8();
        } else if c == '.'
            && end == i
            && end > 0
            && matches!(iter.peek(), Some((_, n)) if is_word_char(*n))
        {
            end = i + 1;
        } else {
            break;
        }
    }
    if end == 0 {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Alpha,
        )))
    } else {
        Ok((&input[end..], &input[..end]))
    }
}

fn lex_pname(input: &str) -> IResult<&str, &str> {
    take_while1(is_word_char)(input)
}

fn lex_string_body(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(delimited(
            tag("\"\"\""),
            take_until("\"\"\""),
            tag("\"\"\""),
        )),
        recognize(delimited(tag("'''"), take_until("'''"), tag("'''"))),
        recognize(delimited(
            char('"'),
            opt(escaped(none_of("\\\"\n"), '\\', anychar)),
            char('"'),
        )),
        recognize(delimited(
            char('\''),
            opt(escaped(none_of("\\'\n"), '\\', anychar)),
            char('\''),
        )),
    ))(input)
}

fn lex_literal(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        lex_string_body,
        opt(alt((
            recognize(pair(
                char('@'),
                take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-'),
            )),
            recognize(pair(tag("^^"), alt((lex_iri, lex_pname)))),
        ))),
    ))(input)
}

fn lex_operator(input: &str) -> IResult<&str, &str> {
    alt((
        tag("&&"),
        tag("||"),
        tag("<="),
        tag(">="),
        tag("!="),
        tag("^^"),
        recognize(one_of("{}()[];,.=<>!+-*/|^?$@&")),
    ))(input)
}

fn lex_token(input: &str) -> IResult<&str, (TokenKind, &str)> {
    alt((
        map(lex_literal, |s| (TokenKind::Literal, s)),
        map(lex_iri, |s| (TokenKind::Iri, s)),
        map(lex_var, |s| (TokenKind::Var, s)),
        map(lex_word, |s| (TokenKind::Word, s)),
        map(lex_operator, |s| (TokenKind::Punct, s)),
    ))(input)
}

fn skip_trivia(mut input: &str) -> &str {
    loop {
        let trimmed = input.trim_start();
        if let Some(rest) = trimmed.strip_prefix('#') {
            match rest.find('\n') {
                Some(i) => input = &rest[i + 1..],
                None => return "",
            }
        } else {
            return trimmed;
        }
    }
}

fn lex_failure(rest: &str, position: usize) -> CommandSyntaxError {
    match rest.chars().next() {
        Some('"') | Some('\'') => CommandSyntaxError::Unterminated {
            what: "string literal",
            position,
        },
        Some(found) => CommandSyntaxError::UnexpectedChar { found, position },
        None => CommandSyntaxError::Empty,
    }
}

/// Tokenize command text. Comments and whitespace are dropped; everything
/// else becomes a token with its source span.
pub fn tokenize(text: &str) -> Result<Vec<Token>, CommandSyntaxError> {
    let mut tokens = Vec::new();
    let mut rest = text;
    loop {
        rest = skip_trivia(rest);
        if rest.is_empty() {
            break;
        }
        let start = text.len() - rest.len();
        let (next, (kind, tok_text)) =
            lex_token(rest).map_err(|_| lex_failure(rest, start))?;
        let end = text.len() - next.len();
        tokens.push(Token {
            kind,
            text: tok_text.to_string(),
            start,
            end,
        });
        rest = next;
    }
    Ok(tokens)
}
