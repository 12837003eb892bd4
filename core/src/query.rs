//! Query kinds and their evaluation into result rows.

use crate::bm25::{bm25, Bm25Params};
use crate::boolean::{intersect, union};
use crate::index::InvertedIndex;
use crate::phrase::{document_frequency, matching_documents, term_frequency, Phrase};
use crate::ql::{query_likelihood, QlParams};
use crate::ranking::{top_k, Hit, MAX_RESULTS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKind {
    And,
    Or,
    TermFrequency,
    DocumentFrequency,
    QueryLikelihood,
    Bm25,
}

impl FromStr for QueryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            "tf" => Ok(Self::TermFrequency),
            "df" => Ok(Self::DocumentFrequency),
            "ql" => Ok(Self::QueryLikelihood),
            "bm25" => Ok(Self::Bm25),
            _ => Err(Error::UnsupportedQueryKind(s.to_string())),
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::And => "and",
            Self::Or => "or",
            Self::TermFrequency => "tf",
            Self::DocumentFrequency => "df",
            Self::QueryLikelihood => "ql",
            Self::Bm25 => "bm25",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Query {
    And(Vec<Phrase>),
    Or(Vec<Phrase>),
    /// Per-document frequency of a single unit.
    TermFrequency(Phrase),
    DocumentFrequency(Vec<Phrase>),
    QueryLikelihood(Vec<Phrase>),
    Bm25(Vec<Phrase>),
}

impl Query {
    /// Assemble a query from its kind and units.
    ///
    /// A term-frequency query keeps only its first unit.
    pub fn from_kind(kind: QueryKind, units: Vec<Phrase>) -> Result<Self> {
        Ok(match kind {
            QueryKind::And => Self::And(units),
            QueryKind::Or => Self::Or(units),
            QueryKind::TermFrequency => {
                if units.len() > 1 {
                    tracing::warn!(units = units.len(), "tf query uses only its first unit");
                }
                Self::TermFrequency(units.into_iter().next().ok_or(Error::EmptyQuery)?)
            }
            QueryKind::DocumentFrequency => Self::DocumentFrequency(units),
            QueryKind::QueryLikelihood => Self::QueryLikelihood(units),
            QueryKind::Bm25 => Self::Bm25(units),
        })
    }

    pub fn kind(&self) -> QueryKind {
        match self {
            Self::And(_) => QueryKind::And,
            Self::Or(_) => QueryKind::Or,
            Self::TermFrequency(_) => QueryKind::TermFrequency,
            Self::DocumentFrequency(_) => QueryKind::DocumentFrequency,
            Self::QueryLikelihood(_) => QueryKind::QueryLikelihood,
            Self::Bm25(_) => QueryKind::Bm25,
        }
    }

    pub fn units(&self) -> &[Phrase] {
        match self {
            Self::TermFrequency(unit) => std::slice::from_ref(unit),
            Self::And(units)
            | Self::Or(units)
            | Self::DocumentFrequency(units)
            | Self::QueryLikelihood(units)
            | Self::Bm25(units) => units,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedQuery {
    pub name: String,
    pub query: Query,
}

/// One output line: a document id (or, for DF, the unit text), its rank and score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub label: String,
    pub rank: usize,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub ql: QlParams,
    pub bm25: Bm25Params,
    /// Result-set size for QL and BM25.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { ql: QlParams::default(), bm25: Bm25Params::default(), max_results: MAX_RESULTS }
    }
}

/// Evaluates queries against a shared, read-only index.
#[derive(Debug, Clone, Copy)]
pub struct Searcher<'a> {
    index: &'a InvertedIndex,
    config: SearchConfig,
}

impl<'a> Searcher<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self { Self::with_config(index, SearchConfig::default()) }

    pub fn with_config(index: &'a InvertedIndex, config: SearchConfig) -> Self { Self { index, config } }

    pub fn index(&self) -> &'a InvertedIndex { self.index }

    pub fn evaluate(&self, query: &Query) -> Result<Vec<ResultRow>> {
        let index = self.index;
        let rows = match query {
            Query::And(units) => boolean_rows(intersect(index, units)?),
            Query::Or(units) => boolean_rows(union(index, units)),
            Query::TermFrequency(unit) => {
                let hits = matching_documents(index, unit)
                    .into_iter()
                    .map(|doc_id| Hit::new(doc_id, term_frequency(index, doc_id, unit) as f64))
                    .collect();
                ranked_rows(top_k(hits, usize::MAX))
            }
            Query::DocumentFrequency(units) => units
                .iter()
                .enumerate()
                .filter_map(|(i, unit)| {
                    let df = document_frequency(index, unit);
                    (df > 0).then(|| ResultRow { label: unit.to_string(), rank: i + 1, score: df as f64 })
                })
                .collect(),
            Query::QueryLikelihood(units) => {
                ranked_rows(query_likelihood(index, units, self.config.ql, self.config.max_results))
            }
            Query::Bm25(units) => ranked_rows(bm25(index, units, self.config.bm25, self.config.max_results)),
        };
        tracing::debug!(kind = %query.kind(), units = query.units().len(), hits = rows.len(), "evaluated query");
        Ok(rows)
    }
}

/// Boolean matches carry no degree of relevance: score 1, ranked by id.
fn boolean_rows<'a>(docs: impl IntoIterator<Item = &'a str>) -> Vec<ResultRow> {
    docs.into_iter()
        .enumerate()
        .map(|(i, doc_id)| ResultRow { label: doc_id.to_string(), rank: i + 1, score: 1.0 })
        .collect()
}

fn ranked_rows(hits: Vec<Hit>) -> Vec<ResultRow> {
    hits.into_iter()
        .enumerate()
        .map(|(i, hit)| ResultRow { label: hit.doc_id, rank: i + 1, score: hit.score })
        .collect()
}
