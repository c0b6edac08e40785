//! Controller response normalization
//!
//! The controller answers in a Python-repr flavoured dialect
//! (`{u'name': None, u'ok': True}`). [`normalize`] rewrites it into strict
//! JSON with a blind, order-preserving substitution:
//!
//! | input     | output     |
//! |-----------|------------|
//! | `u'`      | `"`        |
//! | `'`       | `"`        |
//! | `: False` | `: false`  |
//! | `: True`  | `: true`   |
//! | `null`    | `""`       |
//! | `None`    | `""`       |
//!
//! Absent values become the empty string, which consumers read as "absent".
//! The rewrite does not understand string literals, so `null` inside a
//! quoted value is rewritten too.

const RULES: [(&str, &str); 6] = [
    ("u'", "\""),
    ("'", "\""),
    (": False", ": false"),
    (": True", ": true"),
    ("null", "\"\""),
    ("None", "\"\""),
];

/// Rewrite a controller body into strict JSON.
///
/// Single pass over the input. Every pattern starts with a distinct ASCII
/// byte and no replacement can form another pattern, so this yields the
/// same output as applying the rules one after another.
pub fn normalize(body: &str) -> String {
    let bytes = body.as_bytes();
    let mut out = String::with_capacity(body.len() + body.len() / 8);
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        let matched = RULES
            .iter()
            .find(|(from, _)| bytes[i..].starts_with(from.as_bytes()));

        match matched {
            Some((from, to)) => {
                // `i` sits on an ASCII byte, so it is a char boundary
                out.push_str(&body[copied..i]);
                out.push_str(to);
                i += from.len();
                copied = i;
            }
            None => i += 1,
        }
    }

    out.push_str(&body[copied..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential(body: &str) -> String {
        RULES
            .iter()
            .fold(body.to_string(), |acc, (from, to)| acc.replace(from, to))
    }

    #[test]
    fn test_python_dict() {
        let out = normalize("{u'a': None, u'b': True, u'c': null}");
        assert_eq!(out, r#"{"a": "", "b": true, "c": ""}"#);

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, serde_json::json!({"a": "", "b": true, "c": ""}));
    }

    #[test]
    fn test_false_and_plain_quotes() {
        let out = normalize("[{'id': 7, 'deleted': False, 'name': 'rg-1'}]");
        assert_eq!(out, r#"[{"id": 7, "deleted": false, "name": "rg-1"}]"#);
        assert!(serde_json::from_str::<serde_json::Value>(&out).is_ok());
    }

    #[test]
    fn test_clean_json_is_untouched() {
        let input = r#"{"x": "y"}"#;
        assert_eq!(normalize(input), input);

        let input = r#"{"id": 12, "tags": ["a", "b"], "ok": true, "nested": {"n": 1.5}}"#;
        assert_eq!(normalize(input), input);
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "{u'a': None, u'b': True, u'c': null}",
            "{'k': False, 'v': u'it''s'}",
            "nullNone : True: False",
            "plain text",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_matches_sequential_rewrite() {
        let inputs = [
            "{u'a': None, u'b': True, u'c': null}",
            "u'u'' : Tru'e : Fu'alse nunullll NNonee",
            "{'name': 'nullable', 'x': : True}",
            "日本語 u'値' None",
            "'",
            "u",
        ];
        for input in inputs {
            assert_eq!(normalize(input), sequential(input), "input: {input}");
        }
    }

    #[test]
    fn test_bare_number_and_empty() {
        assert_eq!(normalize("42"), "42");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("None"), r#""""#);
    }

    #[test]
    fn test_non_ascii_preserved() {
        assert_eq!(
            normalize("{u'name': u'сервер-01'}"),
            r#"{"name": "сервер-01"}"#
        );
    }
}
