//! Query algebra types.
//!
//! A [`SearchRequest`] is the backend-neutral form of a query: conjunctive
//! filter clauses (no scoring), conjunctive query clauses (scored), and a
//! result window. Backends translate it into their own query language.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single query clause.
///
/// Field names may be dotted paths into nested collections (`tags.name`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    /// Matches every document.
    MatchAll,

    /// Exact value match.
    Term {
        /// Field path.
        field: String,
        /// Expected value.
        value: Value,
    },

    /// Exact match against any of several values.
    Terms {
        /// Field path.
        field: String,
        /// Accepted values.
        values: Vec<Value>,
    },

    /// Full-text match: any analyzed token of `text` occurs in the field.
    Match {
        /// Field path.
        field: String,
        /// Query text.
        text: String,
    },

    /// Full-text phrase match.
    MatchPhrase {
        /// Field path.
        field: String,
        /// Phrase text.
        text: String,
    },

    /// String prefix match.
    Prefix {
        /// Field path.
        field: String,
        /// Required prefix.
        prefix: String,
    },

    /// Range match; unset bounds are open.
    Range {
        /// Field path.
        field: String,
        /// Inclusive lower bound.
        gte: Option<Value>,
        /// Exclusive lower bound.
        gt: Option<Value>,
        /// Inclusive upper bound.
        lte: Option<Value>,
        /// Exclusive upper bound.
        lt: Option<Value>,
    },

    /// A backend-native clause passed through unchanged.
    Raw(Value),
}

impl Clause {
    /// Creates a term clause.
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Clause::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a terms clause.
    pub fn terms<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Clause::Terms {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a match clause.
    pub fn matches(field: impl Into<String>, text: impl Into<String>) -> Self {
        Clause::Match {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Creates a phrase clause.
    pub fn phrase(field: impl Into<String>, text: impl Into<String>) -> Self {
        Clause::MatchPhrase {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Creates a prefix clause.
    pub fn prefix(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Clause::Prefix {
            field: field.into(),
            prefix: prefix.into(),
        }
    }

    /// Creates an open range clause on a field; set bounds with the
    /// `gte`/`gt`/`lte`/`lt` helpers.
    pub fn range(field: impl Into<String>) -> Self {
        Clause::Range {
            field: field.into(),
            gte: None,
            gt: None,
            lte: None,
            lt: None,
        }
    }

    /// Sets the inclusive lower bound of a range clause.
    pub fn gte(self, bound: impl Into<Value>) -> Self {
        self.with_bound(|gte, _, _, _| *gte = Some(bound.into()))
    }

    /// Sets the exclusive lower bound of a range clause.
    pub fn gt(self, bound: impl Into<Value>) -> Self {
        self.with_bound(|_, gt, _, _| *gt = Some(bound.into()))
    }

    /// Sets the inclusive upper bound of a range clause.
    pub fn lte(self, bound: impl Into<Value>) -> Self {
        self.with_bound(|_, _, lte, _| *lte = Some(bound.into()))
    }

    /// Sets the exclusive upper bound of a range clause.
    pub fn lt(self, bound: impl Into<Value>) -> Self {
        self.with_bound(|_, _, _, lt| *lt = Some(bound.into()))
    }

    fn with_bound<F>(mut self, set: F) -> Self
    where
        F: FnOnce(
            &mut Option<Value>,
            &mut Option<Value>,
            &mut Option<Value>,
            &mut Option<Value>,
        ),
    {
        if let Clause::Range {
            gte, gt, lte, lt, ..
        } = &mut self
        {
            set(gte, gt, lte, lt);
        }
        self
    }

    /// Returns the field path the clause targets, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Clause::Term { field, .. }
            | Clause::Terms { field, .. }
            | Clause::Match { field, .. }
            | Clause::MatchPhrase { field, .. }
            | Clause::Prefix { field, .. }
            | Clause::Range { field, .. } => Some(field),
            Clause::MatchAll | Clause::Raw(_) => None,
        }
    }
}

/// A backend-neutral search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Target index.
    pub index: String,

    /// Document type to restrict results to.
    pub doc_type: String,

    /// Conjunctive, non-scoring clauses.
    pub filters: Vec<Clause>,

    /// Conjunctive, scoring clauses.
    pub queries: Vec<Clause>,

    /// Fields holding nested collections (clauses under them need nested
    /// handling in some backends).
    pub nested_paths: Vec<String>,

    /// Offset of the first hit.
    pub from: u64,

    /// Maximum number of hits.
    pub size: u64,
}

impl SearchRequest {
    /// Creates a request with no clauses and an empty window.
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            filters: Vec::new(),
            queries: Vec::new(),
            nested_paths: Vec::new(),
            from: 0,
            size: 0,
        }
    }

    /// Returns a copy limited to the window `[from, from + size)`.
    pub fn window(&self, from: u64, size: u64) -> Self {
        Self {
            from,
            size,
            ..self.clone()
        }
    }

    /// Returns true if the request has no clauses.
    pub fn is_unconstrained(&self) -> bool {
        self.filters.is_empty() && self.queries.is_empty()
    }
}

/// Hits returned by a search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    /// Total number of matches, independent of the window.
    pub total: u64,

    /// Documents in the requested window, in result order.
    pub documents: Vec<super::SearchDocument>,
}
