//! Structural parsing of queries and update scripts.

use crate::ast::{GroupPattern, Query, QueryForm, UpdateOperation, UpdateScript};
use crate::error::CommandSyntaxError;
use crate::token::{tokenize, Token, TokenKind};

fn check_braces(tokens: &[Token]) -> Result<(), CommandSyntaxError> {
    let mut stack: Vec<usize> = Vec::new();
    for tok in tokens {
        if tok.is_punct("{") {
            stack.push(tok.start);
        } else if tok.is_punct("}") {
            if stack.pop().is_none() {
                return Err(CommandSyntaxError::StrayClose {
                    position: tok.start,
                });
            }
        }
    }
    match stack.last() {
        Some(position) => Err(CommandSyntaxError::UnclosedGroup {
            position: *position,
        }),
        None => Ok(()),
    }
}

/// Parse the group opening at token index `open`, recursing into nested
/// groups. `check_braces` has already run, so the close is always found.
fn parse_group(tokens: &[Token], open: usize) -> GroupPattern {
    let mut children = Vec::new();
    let mut i = open + 1;
    while i < tokens.len() {
        if tokens[i].is_punct("{") {
            let child = parse_group(tokens, i);
            i = child.close + 1;
            children.push(child);
        } else if tokens[i].is_punct("}") {
            return GroupPattern {
                open,
                close: i,
                start: tokens[open].start,
                end: tokens[i].end,
                children,
            };
        } else {
            i += 1;
        }
    }
    unreachable!("brace balance was checked before group parsing")
}

/// Skip `PREFIX ns: <iri>` and `BASE <iri>` declarations starting at `i`,
/// returning the index of the first non-prologue token.
fn skip_prologue(tokens: &[Token], mut i: usize) -> Result<usize, CommandSyntaxError> {
    loop {
        let Some(tok) = tokens.get(i) else {
            return Ok(i);
        };
        if tok.is_word("prefix") {
            let ns = tokens.get(i + 1);
            let iri = tokens.get(i + 2);
            let ns_ok = ns.map(|t| t.kind == TokenKind::Word && t.text.ends_with(':')).unwrap_or(false);
            let iri_ok = iri.map(|t| t.kind == TokenKind::Iri).unwrap_or(false);
            if !ns_ok || !iri_ok {
                return Err(CommandSyntaxError::MalformedPrologue {
                    position: tok.start,
                });
            }
            i += 3;
        } else if tok.is_word("base") {
            let iri_ok = tokens
                .get(i + 1)
                .map(|t| t.kind == TokenKind::Iri)
                .unwrap_or(false);
            if !iri_ok {
                return Err(CommandSyntaxError::MalformedPrologue {
                    position: tok.start,
                });
            }
            i += 2;
        } else {
            return Ok(i);
        }
    }
}

fn find_open_brace(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|i| tokens[*i].is_punct("{"))
}

fn form_from_keyword(tok: &Token) -> Option<QueryForm> {
    if tok.kind != TokenKind::Word {
        return None;
    }
    if tok.text.eq_ignore_ascii_case("select") {
        Some(QueryForm::Select)
    } else if tok.text.eq_ignore_ascii_case("construct") {
        Some(QueryForm::Construct)
    } else if tok.text.eq_ignore_ascii_case("ask") {
        Some(QueryForm::Ask)
    } else if tok.text.eq_ignore_ascii_case("describe") {
        Some(QueryForm::Describe)
    } else {
        None
    }
}

/// Structurally parse a query: classify its form and locate its group
/// pattern (and `CONSTRUCT` template, if any).
pub fn parse_query(text: &str) -> Result<Query, CommandSyntaxError> {
    let tokens = tokenize(text)?;
    check_braces(&tokens)?;

    let i = skip_prologue(&tokens, 0)?;
    let form_tok = tokens.get(i).ok_or(CommandSyntaxError::Empty)?;
    let form = form_from_keyword(form_tok).ok_or_else(|| CommandSyntaxError::UnrecognizedForm {
        found: form_tok.text.clone(),
    })?;
    let after_form = i + 1;

    let (template, pattern) = match form {
        QueryForm::Construct => {
            // Long form carries its template block right after the keyword;
            // the short form goes straight to WHERE.
            if tokens.get(after_form).map(|t| t.is_punct("{")).unwrap_or(false) {
                let template = parse_group(&tokens, after_form);
                let where_open = find_open_brace(&tokens, template.close + 1)
                    .ok_or(CommandSyntaxError::MissingGroup {
                        after: "CONSTRUCT template",
                    })?;
                let pattern = parse_group(&tokens, where_open);
                (Some(template), Some(pattern))
            } else {
                let open = find_open_brace(&tokens, after_form)
                    .ok_or(CommandSyntaxError::MissingGroup { after: "CONSTRUCT" })?;
                (None, Some(parse_group(&tokens, open)))
            }
        }
        QueryForm::Select => {
            let open = find_open_brace(&tokens, after_form)
                .ok_or(CommandSyntaxError::MissingGroup { after: "SELECT" })?;
            (None, Some(parse_group(&tokens, open)))
        }
        QueryForm::Ask => {
            let open = find_open_brace(&tokens, after_form)
                .ok_or(CommandSyntaxError::MissingGroup { after: "ASK" })?;
            (None, Some(parse_group(&tokens, open)))
        }
        QueryForm::Describe => {
            let pattern = find_open_brace(&tokens, after_form).map(|open| parse_group(&tokens, open));
            (None, pattern)
        }
    };

    Ok(Query {
        form,
        text: text.to_string(),
        tokens,
        template,
        pattern,
    })
}

fn operation_verb(tokens: &[Token], mut i: usize, end: usize) -> Option<String> {
    // WITH <iri> prefixes the actual verb.
    if tokens.get(i).map(|t| t.is_word("with")).unwrap_or(false) {
        i += 2;
    }
    let first = tokens.get(i).filter(|_| i < end)?;
    if first.kind != TokenKind::Word {
        return None;
    }
    let mut verb = first.text.to_ascii_uppercase();
    if verb == "INSERT" || verb == "DELETE" {
        if let Some(next) = tokens.get(i + 1).filter(|_| i + 1 < end) {
            if next.is_word("data") || next.is_word("where") {
                verb.push(' ');
                verb.push_str(&next.text.to_ascii_uppercase());
            }
        }
    }
    Some(verb)
}

fn parse_operation(
    tokens: &[Token],
    from: usize,
    to: usize,
) -> Result<Option<UpdateOperation>, CommandSyntaxError> {
    let i = skip_prologue(tokens, from)?;
    if i >= to {
        // Empty segment, e.g. a trailing `;`.
        return Ok(None);
    }
    let verb = operation_verb(tokens, i, to).ok_or_else(|| CommandSyntaxError::UnrecognizedForm {
        found: tokens[i].text.clone(),
    })?;

    // The pattern is the group after a top-level WHERE keyword. DELETE
    // WHERE fuses the two roles; its group is still the pattern.
    let mut pattern = None;
    let mut depth = 0usize;
    let mut j = i;
    while j < to {
        let tok = &tokens[j];
        if tok.is_punct("{") {
            depth += 1;
        } else if tok.is_punct("}") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && tok.is_word("where") {
            let open = find_open_brace(tokens, j + 1)
                .filter(|open| *open < to)
                .ok_or(CommandSyntaxError::MissingGroup { after: "WHERE" })?;
            pattern = Some(parse_group(tokens, open));
            break;
        }
        j += 1;
    }

    Ok(Some(UpdateOperation {
        verb,
        start: tokens[from].start,
        end: tokens[to - 1].end,
        pattern,
    }))
}

/// Structurally parse an update script: split on top-level `;`, then
/// classify each operation and locate its pattern.
pub fn parse_update(text: &str) -> Result<UpdateScript, CommandSyntaxError> {
    let tokens = tokenize(text)?;
    check_braces(&tokens)?;

    let mut operations = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for i in 0..tokens.len() {
        let tok = &tokens[i];
        if tok.is_punct("{") {
            depth += 1;
        } else if tok.is_punct("}") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && tok.is_punct(";") {
            if let Some(op) = parse_operation(&tokens, start, i)? {
                operations.push(op);
            }
            start = i + 1;
        }
    }
    if let Some(op) = parse_operation(&tokens, start, tokens.len())? {
        operations.push(op);
    }

    if operations.is_empty() {
        return Err(CommandSyntaxError::EmptyUpdate);
    }

    Ok(UpdateScript {
        text: text.to_string(),
        tokens,
        operations,
    })
}

impl UpdateScript {
    /// Cut the script down to its first operation. A rule executes one
    /// operation; whatever follows the first top-level `;` is dropped
    /// here, before any rewrite sees the script.
    pub fn into_primary(self) -> Result<UpdateScript, CommandSyntaxError> {
        if self.operations.len() <= 1 {
            return Ok(self);
        }
        let op = &self.operations[0];
        let (start, end) = (op.start, op.end);
        parse_update(&self.text[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_forms_after_prologue() {
        let q = parse_query(
            "PREFIX ex: <http://example.org/ns#>\nBASE <http://example.org/>\nask { ?this a ex:Car }",
        )
        .expect("parse");
        assert_eq!(q.form, QueryForm::Ask);
        assert!(q.pattern.is_some());
        assert!(q.template.is_none());
    }

    #[test]
    fn construct_template_is_not_the_pattern() {
        let q = parse_query(
            "CONSTRUCT { ?this a ex:Flagged } WHERE { ?this ex:speed ?s . FILTER ( ?s > 200 ) }",
        )
        .expect("parse");
        assert_eq!(q.form, QueryForm::Construct);
        let template = q.template.expect("template");
        let pattern = q.pattern.expect("pattern");
        assert!(template.close < pattern.open);
        assert!(q.text[pattern.start..pattern.end].contains("ex:speed"));
        assert!(!q.text[pattern.start..pattern.end].contains("ex:Flagged"));
    }

    #[test]
    fn construct_short_form() {
        let q = parse_query("CONSTRUCT WHERE { ?this a ex:Car }").expect("parse");
        assert_eq!(q.form, QueryForm::Construct);
        assert!(q.template.is_none());
        assert!(q.pattern.is_some());
    }

    #[test]
    fn describe_may_have_no_pattern() {
        let q = parse_query("DESCRIBE <http://example.org/ns#Car>").expect("parse");
        assert_eq!(q.form, QueryForm::Describe);
        assert!(q.pattern.is_none());
    }

    #[test]
    fn select_needs_a_group() {
        let err = parse_query("SELECT ?x").expect_err("must fail");
        assert_eq!(err, CommandSyntaxError::MissingGroup { after: "SELECT" });
    }

    #[test]
    fn nested_groups_form_a_tree() {
        let q = parse_query(
            "SELECT * WHERE { ?x a ex:Car . OPTIONAL { ?x ex:color ?c } { SELECT ?y WHERE { ?y a ex:Owner } } }",
        )
        .expect("parse");
        let pattern = q.pattern.expect("pattern");
        assert_eq!(pattern.children.len(), 2);
        assert_eq!(pattern.children[1].children.len(), 1);
    }

    #[test]
    fn garbage_is_unrecognized() {
        let err = parse_query("MUNGE ?x WHERE { }").expect_err("must fail");
        assert!(matches!(err, CommandSyntaxError::UnrecognizedForm { found } if found == "MUNGE"));
    }

    #[test]
    fn unbalanced_braces_are_reported() {
        assert!(matches!(
            parse_query("ASK { ?x a ex:Car"),
            Err(CommandSyntaxError::UnclosedGroup { .. })
        ));
        assert!(matches!(
            parse_query("ASK ?x a ex:Car }"),
            Err(CommandSyntaxError::StrayClose { .. })
        ));
    }

    #[test]
    fn malformed_prefix_is_reported() {
        let err = parse_query("PREFIX ex <http://example.org/ns#> ASK { }").expect_err("must fail");
        assert!(matches!(err, CommandSyntaxError::MalformedPrologue { .. }));
    }

    #[test]
    fn update_scripts_split_on_top_level_semicolons() {
        let script = parse_update(
            "DELETE { ?this ex:old ?v } WHERE { ?this ex:old ?v } ;\nINSERT DATA { ex:a ex:p ex:b }",
        )
        .expect("parse");
        assert_eq!(script.operations.len(), 2);
        assert_eq!(script.operations[0].verb, "DELETE");
        assert_eq!(script.operations[1].verb, "INSERT DATA");
        assert_eq!(script.primary().expect("operation").verb, "DELETE");
    }

    #[test]
    fn semicolons_inside_groups_do_not_split() {
        let script = parse_update(
            "INSERT { ?this ex:p ?v } WHERE { ?this ex:q ?v ; ex:r ?w }",
        )
        .expect("parse");
        assert_eq!(script.operations.len(), 1);
        assert!(script.operations[0].pattern.is_some());
    }

    #[test]
    fn insert_data_has_no_pattern() {
        let script = parse_update("INSERT DATA { ex:a ex:p ex:b }").expect("parse");
        let op = script.primary().expect("operation");
        assert_eq!(op.verb, "INSERT DATA");
        assert!(op.pattern.is_none());
    }

    #[test]
    fn delete_where_group_is_the_pattern() {
        let script = parse_update("DELETE WHERE { ?this ex:stale ?v }").expect("parse");
        let op = script.primary().expect("operation");
        assert_eq!(op.verb, "DELETE WHERE");
        assert!(op.pattern.is_some());
    }

    #[test]
    fn with_clause_keeps_the_real_verb() {
        let script = parse_update(
            "WITH <http://example.org/g> DELETE { ?this ex:p ?v } WHERE { ?this ex:p ?v }",
        )
        .expect("parse");
        let op = script.primary().expect("operation");
        assert_eq!(op.verb, "DELETE");
        assert!(op.pattern.is_some());
    }

    #[test]
    fn empty_update_script_is_an_error() {
        assert_eq!(parse_update("  ;  ").expect_err("must fail"), CommandSyntaxError::EmptyUpdate);
        assert!(matches!(parse_update(""), Err(CommandSyntaxError::EmptyUpdate)));
    }

    #[test]
    fn per_operation_prologues_are_allowed() {
        let script = parse_update(
            "PREFIX ex: <http://example.org/ns#> INSERT DATA { ex:a ex:p ex:b } ; PREFIX foo: <http://example.org/foo#> DELETE WHERE { ?x foo:q ?y }",
        )
        .expect("parse");
        assert_eq!(script.operations.len(), 2);
        assert_eq!(script.operations[1].verb, "DELETE WHERE");
    }

    #[test]
    fn into_primary_cuts_trailing_operations() {
        let script = parse_update(
            "PREFIX ex: <http://example.org/ns#> DELETE WHERE { ?this ex:old ?v } ; INSERT DATA { ex:a ex:p ex:b } ; DROP ALL",
        )
        .expect("parse")
        .into_primary()
        .expect("reduce");
        assert_eq!(script.operations.len(), 1);
        assert_eq!(script.primary().expect("operation").verb, "DELETE WHERE");
        // The operation keeps its own prologue and loses the rest.
        assert!(script.text.starts_with("PREFIX"));
        assert!(!script.text.contains("INSERT"));
    }

    #[test]
    fn into_primary_keeps_single_operation_scripts_intact() {
        let script = parse_update("DELETE WHERE { ?this ex:old ?v }").expect("parse");
        let same = script.clone().into_primary().expect("reduce");
        assert_eq!(same, script);
    }

    #[test]
    fn into_primary_skips_leading_empty_segments() {
        let script = parse_update("; DELETE WHERE { ?this ex:old ?v } ; DROP ALL")
            .expect("parse")
            .into_primary()
            .expect("reduce");
        assert_eq!(script.operations.len(), 1);
        assert_eq!(script.text, "DELETE WHERE { ?this ex:old ?v }");
    }
}
