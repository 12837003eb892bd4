use crate::DocId;
use serde::{Deserialize, Serialize};

/// Default result-set size for ranked queries.
pub const MAX_RESULTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub doc_id: DocId,
    pub score: f64,
}

impl Hit {
    pub fn new(doc_id: impl Into<DocId>, score: f64) -> Self { Self { doc_id: doc_id.into(), score } }
}

/// Sort by score desc, then doc id asc, and keep the first `limit`.
pub fn top_k(mut hits: Vec<Hit>, limit: usize) -> Vec<Hit> {
    hits.sort_unstable_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id)));
    hits.truncate(limit);
    hits
}
