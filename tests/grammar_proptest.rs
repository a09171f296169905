//! Property-based tests for canonical request URIs.
//!
//! These tests generate requests from the query grammar and check the
//! properties every canonical URI must have: building is idempotent, option
//! values use the query-value escaping profile, option order survives, and
//! bare paths inside nested `$count(...)` queries canonicalize the same as
//! their `$it/` forms.

use proptest::prelude::*;

use odata_uri::{
    BuildErrorKind, CanonicalUri, DEFAULT_MAX_INPUT_LENGTH, KeyDelimiterStyle, UriBuilderSettings,
    build, escape_path_segment, escape_query_value, unescape,
};

const ROOT: &str = "http://gobbledygook/";

fn settings() -> UriBuilderSettings {
    UriBuilderSettings::new(ROOT)
}

fn build_default(raw: &str) -> Result<CanonicalUri, odata_uri::BuildError> {
    build(raw, KeyDelimiterStyle::Parentheses, &settings())
}

/// Strategies for generating grammar-conformant request parts.
mod strategies {
    use super::*;

    /// Upper-case first letter keeps names clear of keywords.
    pub fn identifier() -> impl Strategy<Value = String> {
        "[A-Z][a-zA-Z0-9]{0,6}"
    }

    pub fn member_path() -> impl Strategy<Value = String> {
        prop::collection::vec(identifier(), 1..=3).prop_map(|parts| parts.join("/"))
    }

    /// Every literal form, paired with whether it is numeric.
    pub fn typed_literal() -> impl Strategy<Value = (String, bool)> {
        prop_oneof![
            (-10_000i64..10_000).prop_map(|n| (n.to_string(), true)),
            "[0-9]{1,3}\\.[0-9]{1,2}".prop_map(|s| (s, true)),
            "[a-z ]{0,6}(''[a-z]{0,2})?".prop_map(|s| (format!("'{s}'"), false)),
            "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}".prop_map(|s| (s, false)),
            "NS\\.[A-Z][a-z]{0,4}'[A-Z][a-z]{0,4}'".prop_map(|s| (s, false)),
            Just(("true".to_string(), false)),
            Just(("false".to_string(), false)),
            Just(("null".to_string(), false)),
        ]
    }

    pub fn literal() -> impl Strategy<Value = String> {
        typed_literal().prop_map(|(lit, _)| lit)
    }

    pub fn key_style() -> impl Strategy<Value = KeyDelimiterStyle> {
        prop::sample::select(vec![KeyDelimiterStyle::Parentheses, KeyDelimiterStyle::Slash])
    }

    /// Option values with no `&`, `#` or `%`, so they arrive unsplit.
    pub fn opaque_value() -> impl Strategy<Value = String> {
        "[^&#%\\p{C}]{0,16}"
    }

    /// Optional whitespace.
    pub fn spaces() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["", " ", "  "])
    }

    /// Required whitespace.
    pub fn gap() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![" ", "  ", "   "])
    }

    pub fn comparison() -> impl Strategy<Value = String> {
        (
            member_path(),
            prop::sample::select(vec!["eq", "ne", "gt", "ge", "lt", "le"]),
            literal(),
            gap(),
            gap(),
        )
            .prop_map(|(path, op, lit, a, b)| format!("{path}{a}{op}{b}{lit}"))
    }

    /// A boolean `$filter` body mixing comparisons, counts, lambdas and
    /// nested `$count(...)` queries.
    pub fn predicate() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            comparison(),
            (member_path(), gap(), 0u32..5)
                .prop_map(|(path, w, n)| format!("{path}/$count{w}gt{w}{n}")),
            (member_path(), identifier(), literal())
                .prop_map(|(path, prop, lit)| format!("{path}/any(x:x/{prop} eq {lit})")),
        ];

        leaf.prop_recursive(3, 24, 2, |inner| {
            prop_oneof![
                (
                    inner.clone(),
                    prop::sample::select(vec!["and", "or"]),
                    inner.clone(),
                    gap(),
                    gap()
                )
                    .prop_map(|(l, op, r, a, b)| format!("{l}{a}{op}{b}{r}")),
                (inner.clone(), spaces(), spaces()).prop_map(|(e, a, b)| format!("({a}{e}{b})")),
                (inner.clone(), gap()).prop_map(|(e, w)| format!("not{w}({e})")),
                (member_path(), inner, 0u32..5)
                    .prop_map(|(path, e, n)| format!("{path}/$count($filter={e}) gt {n}")),
            ]
        })
    }
}

mod idempotence_tests {
    use super::strategies::*;
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn filter_builds(pred in predicate()) {
            let raw = format!("People?$filter={pred}");
            let result = build_default(&raw);
            prop_assert!(result.is_ok(), "Failed to build: {} ({:?})", raw, result.err());
        }

        #[test]
        fn filter_is_idempotent(pred in predicate()) {
            let once = build_default(&format!("People?$filter={pred}")).unwrap();
            let twice = build_default(once.relative()).unwrap();
            prop_assert_eq!(once.as_str(), twice.as_str());
        }

        #[test]
        fn absolute_output_rebuilds_to_itself(pred in predicate()) {
            let once = build_default(&format!("People?$filter={pred}")).unwrap();
            let again = build_default(once.as_str()).unwrap();
            prop_assert_eq!(once.as_str(), again.as_str());
        }

        #[test]
        fn path_with_key_is_idempotent(set in identifier(), key in 0u32..1000, nav in identifier()) {
            let once = build_default(&format!("{set}({key})/{nav}/$count")).unwrap();
            let twice = build_default(once.relative()).unwrap();
            prop_assert_eq!(once.as_str(), twice.as_str());
        }

        #[test]
        fn any_key_literal_is_idempotent(
            style in key_style(),
            set in identifier(),
            (key, _) in typed_literal(),
            nav in identifier()
        ) {
            let once = build(&format!("{set}({key})/{nav}/$count"), style, &settings()).unwrap();
            let twice = build(once.relative(), style, &settings()).unwrap();
            prop_assert_eq!(once.as_str(), twice.as_str());
        }

        #[test]
        fn negation_is_numeric_only((lit, numeric) in typed_literal(), gap in spaces()) {
            let result = build_default(&format!("People?$filter=-{gap}{lit} lt Price"));
            match result {
                Ok(once) => {
                    prop_assert!(numeric, "accepted negated {}", lit);
                    let twice = build_default(once.relative()).unwrap();
                    prop_assert_eq!(once.as_str(), twice.as_str());
                }
                Err(err) => {
                    prop_assert!(!numeric, "rejected negated {}: {}", lit, err);
                    prop_assert!(matches!(err.kind, BuildErrorKind::QuerySyntax(_)));
                }
            }
        }

        #[test]
        fn opaque_values_keep_later_options(
            name in "[a-z]{1,6}",
            custom in opaque_value(),
            search in opaque_value()
        ) {
            let raw = format!("People?{name}={custom}&$search=a{search}&$top=5");
            let once = build_default(&raw).unwrap();

            prop_assert_eq!(once.options().len(), 3);
            let pairs: Vec<&str> = once.query().unwrap().split('&').collect();
            prop_assert_eq!(pairs.len(), 3);
            prop_assert!(pairs[0].starts_with(name.as_str()));
            prop_assert!(pairs[1].starts_with("$search="));
            prop_assert_eq!(pairs[2], "$top=5");

            let twice = build_default(once.relative()).unwrap();
            prop_assert_eq!(once.as_str(), twice.as_str());
        }
    }
}

mod escaping_tests {
    use super::strategies::*;
    use super::*;

    fn is_query_value_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '%')
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn option_values_use_unreserved_profile(pred in predicate()) {
            let uri = build_default(&format!("People?$filter={pred}&$orderby=Name desc")).unwrap();
            let query = uri.query().unwrap();
            for pair in query.split('&') {
                let (_, value) = pair.split_once('=').unwrap();
                prop_assert!(value.chars().all(is_query_value_char), "unescaped character in {}", value);
            }
        }

        #[test]
        fn count_segment_stays_bare_in_path(set in identifier()) {
            let uri = build_default(&format!("{set}/$count")).unwrap();
            prop_assert_eq!(uri.as_str(), format!("http://gobbledygook/{set}/$count"));
        }

        #[test]
        fn count_in_value_is_escaped(path in member_path()) {
            let uri = build_default(&format!("People?$filter={path}/$count gt 1")).unwrap();
            prop_assert!(uri.as_str().contains("%2F%24count%20gt%201"));
        }

        #[test]
        fn query_value_escape_is_invertible(s in "\\PC{0,24}") {
            let escaped = escape_query_value(&s);
            prop_assert_eq!(unescape(&escaped).unwrap(), s.as_str());
        }

        #[test]
        fn path_escape_is_invertible(s in "\\PC{0,24}") {
            let escaped = escape_path_segment(&s);
            prop_assert!(!escaped.contains('/'));
            prop_assert_eq!(unescape(&escaped).unwrap(), s.as_str());
        }
    }
}

mod canonical_form_tests {
    use super::strategies::*;
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn implicit_it_matches_explicit(coll in member_path(), prop in identifier(), lit in literal()) {
            let bare = build_default(&format!("People?$filter={coll}/$count($filter={prop} eq {lit}) gt 1")).unwrap();
            let explicit = build_default(&format!("People?$filter={coll}/$count($filter=$it/{prop} eq {lit}) gt 1")).unwrap();
            prop_assert_eq!(bare.as_str(), explicit.as_str());
            let qualified = format!("%24it%2F{prop}");
            prop_assert!(bare.as_str().contains(&qualified));
        }

        #[test]
        fn expand_options_stay_unqualified(nav in identifier(), prop in identifier()) {
            let uri = build_default(&format!("People?$expand={nav}($filter={prop} eq 1)")).unwrap();
            prop_assert!(!uri.as_str().contains("%24it"));
        }

        #[test]
        fn count_option_is_trimmed(lead in spaces(), trail in spaces(), value in any::<bool>()) {
            let uri = build_default(&format!("People?$count={lead}{value}{trail}")).unwrap();
            let expected = format!("$count={value}");
            prop_assert_eq!(uri.query(), Some(expected.as_str()));
        }

        #[test]
        fn option_order_is_preserved(
            options in Just(vec![
                ("$top", "3"),
                ("$skip", "1"),
                ("$count", "true"),
                ("$select", "Name"),
                ("$orderby", "Name desc"),
                ("custom", "x"),
            ])
            .prop_shuffle()
        ) {
            let query: Vec<String> = options.iter().map(|(n, v)| format!("{n}={v}")).collect();
            let uri = build_default(&format!("People?{}", query.join("&"))).unwrap();

            let names: Vec<&str> = uri
                .query()
                .unwrap()
                .split('&')
                .map(|pair| pair.split_once('=').map_or(pair, |(name, _)| name))
                .collect();
            let expected: Vec<&str> = options.iter().map(|(n, _)| *n).collect();
            prop_assert_eq!(names, expected);
        }
    }
}

mod limit_tests {
    use super::*;

    proptest! {
        #[test]
        fn deep_nesting_is_rejected(depth in 40usize..80) {
            let raw = format!("People?$filter={}A{}", "(".repeat(depth), ")".repeat(depth));
            let err = build_default(&raw).unwrap_err();
            prop_assert!(matches!(err.kind, BuildErrorKind::QueryTooComplex(_)));
        }
    }

    #[test]
    fn input_at_max_length_builds() {
        let prefix = "People?x=";
        let raw = format!("{prefix}{}", "a".repeat(DEFAULT_MAX_INPUT_LENGTH - prefix.len()));
        assert_eq!(raw.len(), DEFAULT_MAX_INPUT_LENGTH);
        assert!(build_default(&raw).is_ok());
    }

    #[test]
    fn input_over_max_length_fails() {
        let raw = format!("People?x={}", "a".repeat(DEFAULT_MAX_INPUT_LENGTH));
        let err = build_default(&raw).unwrap_err();
        assert!(matches!(err.kind, BuildErrorKind::InputTooLong { .. }));
    }
}
