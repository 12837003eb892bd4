//! Query likelihood with Dirichlet smoothing.
//!
//! A document's score is \(\sum_q \ln\frac{f_{q,d} + \mu\, c_q / C}{|d| + \mu}\),
//! where \(c_q\) is the unit's collection frequency and \(C\) the total number of
//! term occurrences. Only documents matching at least one unit are scored.

use crate::boolean::union;
use crate::index::InvertedIndex;
use crate::phrase::{collection_frequency, term_frequency, Phrase};
use crate::ranking::{top_k, Hit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QlParams {
    /// Dirichlet prior strength.
    pub mu: f64,
}

impl Default for QlParams {
    fn default() -> Self { Self { mu: 300.0 } }
}

/// Rank documents by query likelihood, best `limit` first.
pub fn query_likelihood(index: &InvertedIndex, units: &[Phrase], params: QlParams, limit: usize) -> Vec<Hit> {
    let candidates = union(index, units);
    if candidates.is_empty() {
        return Vec::new();
    }

    let collection_len = index.total_term_frequency() as f64;
    let background: Vec<f64> = units
        .iter()
        .map(|unit| collection_frequency(index, unit) as f64 / collection_len)
        .collect();

    let mut hits = Vec::with_capacity(candidates.len());
    for doc_id in candidates {
        let doc_len = index.document_length(doc_id).unwrap_or(0) as f64;
        let mut log_score = 0.0;
        for (unit, &p_collection) in units.iter().zip(background.iter()) {
            let f = term_frequency(index, doc_id, unit) as f64;
            let p = (f + params.mu * p_collection) / (doc_len + params.mu);
            // unit never occurs anywhere: ln(0) is skipped
            if p > 0.0 {
                log_score += p.ln();
            } else {
                tracing::trace!(doc_id, unit = %unit, "zero probability unit skipped");
            }
        }
        hits.push(Hit::new(doc_id, log_score));
    }

    top_k(hits, limit)
}
