//! Property tests for structural parsing, rendering and scoping rewrites.

use proptest::prelude::*;
use spindle_sparql::{
    insert_target_class_clause, parse_query, tokenize, TARGET_CLASS_VAR, THIS_VAR,
};

fn ident() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9]{0,6}").expect("ident regex")
}

fn pname() -> impl Strategy<Value = String> {
    (ident(), ident()).prop_map(|(prefix, local)| format!("{prefix}:{local}"))
}

fn var_ref() -> impl Strategy<Value = String> {
    prop_oneof![
        ident().prop_map(|v| format!("?{v}")),
        Just("?this".to_string()),
    ]
}

fn subject() -> impl Strategy<Value = String> {
    prop_oneof![pname(), var_ref()]
}

fn object() -> impl Strategy<Value = String> {
    prop_oneof![
        pname(),
        var_ref(),
        proptest::string::string_regex("[a-z]{1,8}")
            .expect("literal regex")
            .prop_map(|s| format!("\"{s}\"")),
    ]
}

fn triple() -> impl Strategy<Value = String> {
    (subject(), pname(), object()).prop_map(|(s, p, o)| format!("{s} {p} {o} ."))
}

fn group() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec(triple(), 1..4),
        proptest::option::of(proptest::collection::vec(triple(), 1..3)),
    )
        .prop_map(|(top, nested)| {
            let mut out = String::from("{ ");
            for t in &top {
                out.push_str(t);
                out.push(' ');
            }
            if let Some(inner) = nested {
                out.push_str("OPTIONAL { ");
                for t in &inner {
                    out.push_str(t);
                    out.push(' ');
                }
                out.push_str("} ");
            }
            out.push('}');
            out
        })
}

fn query_text() -> impl Strategy<Value = String> {
    (
        prop_oneof![
            Just("ASK"),
            Just("SELECT * WHERE"),
            Just("CONSTRUCT { ?this a ex:Flagged } WHERE"),
        ],
        group(),
    )
        .prop_map(|(head, g)| format!("{head} {g}"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(192))]

    #[test]
    fn parse_render_reparse_preserves_form_and_tokens(text in query_text()) {
        let q = parse_query(&text).expect("generated queries parse");
        let rendered = q.render();
        let again = parse_query(&rendered).expect("rendered queries parse");
        prop_assert_eq!(q.form, again.form);

        let first: Vec<&str> = q.tokens.iter().map(|t| t.text.as_str()).collect();
        let second: Vec<&str> = again.tokens.iter().map(|t| t.text.as_str()).collect();
        prop_assert_eq!(first, second);
        prop_assert_eq!(rendered, again.render());
    }

    #[test]
    fn token_spans_always_index_source(text in query_text()) {
        for tok in tokenize(&text).expect("tokenize") {
            prop_assert_eq!(&text[tok.start..tok.end], tok.text.as_str());
        }
    }

    #[test]
    fn scoping_rewrite_preserves_form_and_forces_top_level_this(text in query_text()) {
        let q = parse_query(&text).expect("generated queries parse");
        let rewritten = insert_target_class_clause(&q).expect("generated queries have groups");
        let again = parse_query(&rewritten).expect("rewritten queries parse");
        prop_assert_eq!(q.form, again.form);
        prop_assert!(again.mentions_var(TARGET_CLASS_VAR));
        prop_assert!(again.mentions_var(THIS_VAR));
        prop_assert!(!again.var_only_in_nested_groups(THIS_VAR));
    }
}
