//! Local evaluation of query clauses against a document source.

use std::cmp::Ordering;

use serde_json::Value;

use crate::types::Clause;

/// Outcome of evaluating a clause.
pub(crate) enum Evaluation {
    Matched(bool),
    Unsupported,
}

/// Collects every value reachable at a dotted path, descending into arrays.
fn values_at<'a>(value: &'a Value, path: &[&str], out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                values_at(item, path, out);
            }
        }
        _ => match path.split_first() {
            None => out.push(value),
            Some((head, rest)) => {
                if let Some(child) = value.get(*head) {
                    values_at(child, rest, out);
                }
            }
        },
    }
}

fn field_values<'a>(source: &'a Value, field: &str) -> Vec<&'a Value> {
    let path: Vec<&str> = field.split('.').collect();
    let mut out = Vec::new();
    values_at(source, &path, &mut out);
    out
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        // Numbers indexed as strings still match their literal form
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            s == &n.to_string()
        }
        _ => left == right,
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn in_range(
    value: &Value,
    gte: &Option<Value>,
    gt: &Option<Value>,
    lte: &Option<Value>,
    lt: &Option<Value>,
) -> bool {
    let check = |bound: &Option<Value>, accept: fn(Ordering) -> bool| match bound {
        None => true,
        Some(b) => compare(value, b).is_some_and(accept),
    };
    check(gte, Ordering::is_ge)
        && check(gt, Ordering::is_gt)
        && check(lte, Ordering::is_le)
        && check(lt, Ordering::is_lt)
}

fn contains_phrase(haystack: &[String], phrase: &[String]) -> bool {
    phrase.is_empty() || haystack.windows(phrase.len()).any(|w| w == phrase)
}

/// Evaluates one clause against a document source.
pub(crate) fn evaluate(clause: &Clause, source: &Value) -> Evaluation {
    let matched = match clause {
        Clause::MatchAll => true,
        Clause::Term { field, value } => field_values(source, field)
            .into_iter()
            .any(|v| values_equal(v, value)),
        Clause::Terms { field, values } => field_values(source, field)
            .into_iter()
            .any(|v| values.iter().any(|expected| values_equal(v, expected))),
        Clause::Match { field, text } => {
            let wanted = tokens(text);
            field_values(source, field).into_iter().any(|v| {
                let present = tokens(&as_text(v));
                wanted.iter().any(|t| present.contains(t))
            })
        }
        Clause::MatchPhrase { field, text } => {
            let phrase = tokens(text);
            field_values(source, field)
                .into_iter()
                .any(|v| contains_phrase(&tokens(&as_text(v)), &phrase))
        }
        Clause::Prefix { field, prefix } => field_values(source, field)
            .into_iter()
            .any(|v| v.as_str().is_some_and(|s| s.starts_with(prefix.as_str()))),
        Clause::Range {
            field,
            gte,
            gt,
            lte,
            lt,
        } => field_values(source, field)
            .into_iter()
            .any(|v| in_range(v, gte, gt, lte, lt)),
        Clause::Raw(_) => return Evaluation::Unsupported,
    };
    Evaluation::Matched(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn matched(clause: Clause, source: &Value) -> bool {
        match evaluate(&clause, source) {
            Evaluation::Matched(m) => m,
            Evaluation::Unsupported => panic!("unsupported clause"),
        }
    }

    fn source() -> Value {
        json!({
            "title": "Hello Search World",
            "views": 42,
            "tags": [{"name": "rust"}, {"name": "search"}],
        })
    }

    #[test]
    fn test_term_on_nested_path() {
        assert!(matched(Clause::term("tags.name", "rust"), &source()));
        assert!(!matched(Clause::term("tags.name", "python"), &source()));
        assert!(matched(Clause::term("views", 42), &source()));
    }

    #[test]
    fn test_terms() {
        assert!(matched(Clause::terms("tags.name", ["go", "search"]), &source()));
        assert!(!matched(Clause::terms("tags.name", ["go", "c"]), &source()));
    }

    #[test]
    fn test_match_is_tokenized_and_case_insensitive() {
        assert!(matched(Clause::matches("title", "search engines"), &source()));
        assert!(!matched(Clause::matches("title", "engines"), &source()));
    }

    #[test]
    fn test_phrase() {
        assert!(matched(Clause::phrase("title", "search world"), &source()));
        assert!(!matched(Clause::phrase("title", "world search"), &source()));
    }

    #[test]
    fn test_prefix_and_range() {
        assert!(matched(Clause::prefix("title", "Hel"), &source()));
        assert!(!matched(Clause::prefix("title", "hel"), &source()));
        assert!(matched(Clause::range("views").gte(40).lt(43), &source()));
        assert!(!matched(Clause::range("views").gt(42), &source()));
    }

    #[test]
    fn test_missing_field_never_matches() {
        assert!(!matched(Clause::term("body", "x"), &source()));
        assert!(matched(Clause::MatchAll, &source()));
    }

    #[test]
    fn test_raw_is_unsupported() {
        assert!(matches!(
            evaluate(&Clause::Raw(json!({"match_all": {}})), &source()),
            Evaluation::Unsupported
        ));
    }
}
