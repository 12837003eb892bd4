//! Okapi BM25 over phrase-aware statistics.
//!
//! For each unit `i` with document frequency `n_i`, in-document frequency `f_i`
//! and query frequency `qf_i`:
//!
//! ```text
//! ln((N - n_i + 0.5) / (n_i + 0.5)) * ((k1 + 1) f_i / (K + f_i)) * ((k2 + 1) qf_i / (k2 + qf_i))
//! K = k1 * ((1 - b) + b * dl / avdl)
//! ```
//!
//! References:
//! - Robertson & Zaragoza (2009). "The Probabilistic Relevance Framework: BM25 and Beyond."

use crate::boolean::union;
use crate::index::InvertedIndex;
use crate::phrase::{document_frequency, term_frequency, Phrase};
use crate::ranking::{top_k, Hit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Document term-frequency saturation.
    pub k1: f64,
    /// Query term-frequency saturation.
    pub k2: f64,
    /// Length normalization.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self { Self { k1: 1.8, k2: 5.0, b: 0.75 } }
}

/// Per-unit statistics that do not depend on the scored document.
struct UnitStats {
    idf: f64,
    query_weight: f64,
}

fn unit_stats(index: &InvertedIndex, units: &[Phrase], params: Bm25Params) -> Vec<UnitStats> {
    let n = index.num_docs() as f64;
    units
        .iter()
        .map(|unit| {
            let n_i = document_frequency(index, unit) as f64;
            let qf = units.iter().filter(|other| *other == unit).count() as f64;
            UnitStats {
                idf: (1.0 / ((n_i + 0.5) / (n - n_i + 0.5))).ln(),
                query_weight: (params.k2 + 1.0) * qf / (params.k2 + qf),
            }
        })
        .collect()
}

/// Rank documents by BM25, best `limit` first.
pub fn bm25(index: &InvertedIndex, units: &[Phrase], params: Bm25Params, limit: usize) -> Vec<Hit> {
    let candidates = union(index, units);
    if candidates.is_empty() {
        return Vec::new();
    }

    let stats = unit_stats(index, units, params);
    let avdl = index.average_document_length();

    let mut hits = Vec::with_capacity(candidates.len());
    for doc_id in candidates {
        let dl = index.document_length(doc_id).unwrap_or(0) as f64;
        // avdl is 0 only when every stored length is 0
        let relative_length = if avdl > 0.0 { dl / avdl } else { 0.0 };
        let k = params.k1 * ((1.0 - params.b) + params.b * relative_length);
        let mut score = 0.0;
        for (unit, stat) in units.iter().zip(stats.iter()) {
            let f = term_frequency(index, doc_id, unit) as f64;
            score += stat.idf * ((params.k1 + 1.0) * f / (k + f)) * stat.query_weight;
        }
        hits.push(Hit::new(doc_id, score));
    }

    top_k(hits, limit)
}
