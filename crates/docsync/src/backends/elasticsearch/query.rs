//! Translation of search requests into Elasticsearch query DSL.
//!
//! Filters go to `bool.filter`, scoring clauses to `bool.must`, and every
//! request is restricted to its document type. Clauses on a nested
//! collection path are wrapped in a `nested` query. Exact-match clauses on
//! string values target the `.keyword` sub-field that dynamic mapping (and
//! the nested mapping) adds to text fields.

use serde_json::{Map, Value, json};

use crate::types::{
    Clause, DOC_ID_FIELD, DOC_TYPE_FIELD, RESERVED_FIELDS, SearchDocument, SearchHits,
    SearchRequest,
};

fn exact_field(field: &str, value: &Value) -> String {
    if value.is_string() && !RESERVED_FIELDS.contains(&field) {
        format!("{}.keyword", field)
    } else {
        field.to_string()
    }
}

fn single(kind: &str, field: String, body: Value) -> Value {
    let mut inner = Map::new();
    inner.insert(field, body);
    let mut outer = Map::new();
    outer.insert(kind.to_string(), Value::Object(inner));
    Value::Object(outer)
}

/// Translates one clause, without nested wrapping.
pub fn clause_to_dsl(clause: &Clause) -> Value {
    match clause {
        Clause::MatchAll => json!({ "match_all": {} }),
        Clause::Term { field, value } => {
            single("term", exact_field(field, value), value.clone())
        }
        Clause::Terms { field, values } => {
            let all_strings = !values.is_empty() && values.iter().all(Value::is_string);
            let target = if all_strings {
                exact_field(field, &values[0])
            } else {
                field.clone()
            };
            single("terms", target, Value::Array(values.clone()))
        }
        Clause::Match { field, text } => single("match", field.clone(), json!(text)),
        Clause::MatchPhrase { field, text } => {
            single("match_phrase", field.clone(), json!(text))
        }
        Clause::Prefix { field, prefix } => {
            let prefix = json!(prefix);
            single("prefix", exact_field(field, &prefix), prefix)
        }
        Clause::Range {
            field,
            gte,
            gt,
            lte,
            lt,
        } => {
            let mut bounds = Map::new();
            for (name, bound) in [("gte", gte), ("gt", gt), ("lte", lte), ("lt", lt)] {
                if let Some(bound) = bound {
                    bounds.insert(name.to_string(), bound.clone());
                }
            }
            single("range", field.clone(), Value::Object(bounds))
        }
        Clause::Raw(raw) => raw.clone(),
    }
}

/// Translates one clause, wrapping it in a `nested` query when its field
/// lies under one of `nested_paths`.
pub fn clause_with_nesting(clause: &Clause, nested_paths: &[String]) -> Value {
    let dsl = clause_to_dsl(clause);
    let nested_path = clause.field().and_then(|field| {
        nested_paths
            .iter()
            .find(|path| field.starts_with(&format!("{}.", path)))
    });
    match nested_path {
        Some(path) => json!({ "nested": { "path": path, "query": dsl } }),
        None => dsl,
    }
}

/// Builds the full search body for a request.
pub fn search_body(request: &SearchRequest) -> Value {
    let mut filter = vec![json!({ "term": { DOC_TYPE_FIELD: request.doc_type } })];
    filter.extend(
        request
            .filters
            .iter()
            .map(|c| clause_with_nesting(c, &request.nested_paths)),
    );
    let must: Vec<Value> = request
        .queries
        .iter()
        .map(|c| clause_with_nesting(c, &request.nested_paths))
        .collect();

    json!({
        "query": { "bool": { "filter": filter, "must": must } },
        "from": request.from,
        "size": request.size,
        "track_total_hits": true,
        "sort": ["_score", { DOC_ID_FIELD: "asc" }],
    })
}

/// Parses a search response into hits.
pub fn parse_hits(request: &SearchRequest, body: &Value) -> SearchHits {
    let total = body
        .pointer("/hits/total/value")
        .and_then(Value::as_u64)
        .unwrap_or_default();

    let documents = body
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| {
                    let source = hit.get("_source")?;
                    let id = source.get(DOC_ID_FIELD)?.as_str()?.to_string();
                    Some(SearchDocument::from_source(
                        &request.index,
                        &request.doc_type,
                        id,
                        source.clone(),
                    ))
                })
                .collect()
        })
        .unwrap_or_default();

    SearchHits { total, documents }
}
