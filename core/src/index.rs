use crate::{DocId, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A tokenized document ready for indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub tokens: Vec<String>,
}

impl Document {
    pub fn new<I, S>(id: impl Into<DocId>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { id: id.into(), tokens: tokens.into_iter().map(Into::into).collect() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_frequency: u32,
    /// Ascending 1-based positions of the term in this document.
    pub positions: Vec<Position>,
}

/// Every occurrence of one term, grouped per document.
///
/// Postings keep the order in which their documents were first seen during the
/// build; `doc_lookup` maps a document id to its slot in `postings`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostingList {
    postings: Vec<Posting>,
    total_frequency: u64,
    #[serde(skip)]
    doc_lookup: HashMap<DocId, usize>,
}

impl PostingList {
    pub fn new() -> Self { Self::default() }

    /// Record one occurrence of the term in `doc_id` at `position`.
    pub(crate) fn record(&mut self, doc_id: &str, position: Position) {
        match self.doc_lookup.get(doc_id) {
            Some(&slot) => {
                let posting = &mut self.postings[slot];
                posting.term_frequency += 1;
                posting.positions.push(position);
            }
            None => {
                self.doc_lookup.insert(doc_id.to_string(), self.postings.len());
                self.postings.push(Posting {
                    doc_id: doc_id.to_string(),
                    term_frequency: 1,
                    positions: vec![position],
                });
            }
        }
        self.total_frequency += 1;
    }

    pub fn posting(&self, doc_id: &str) -> Option<&Posting> {
        self.doc_lookup.get(doc_id).map(|&slot| &self.postings[slot])
    }

    pub fn contains(&self, doc_id: &str) -> bool { self.doc_lookup.contains_key(doc_id) }

    pub fn postings(&self) -> &[Posting] { &self.postings }

    /// Document ids in posting order.
    pub fn doc_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.postings.iter().map(|p| p.doc_id.as_str())
    }

    pub fn document_count(&self) -> usize { self.postings.len() }

    /// Occurrences summed over every posting.
    pub fn total_frequency(&self) -> u64 { self.total_frequency }
}

/// Collection-wide counters, as reported by the debug tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub num_docs: u32,
    pub num_unique_terms: u32,
    pub total_term_frequency: u64,
}

/// Term -> posting list map plus collection aggregates. Built by
/// [`IndexBuilder`](crate::IndexBuilder) and read-only afterwards.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    pub(crate) terms: HashMap<String, PostingList>,
    pub(crate) num_docs: u32,
    pub(crate) num_unique_terms: u32,
    pub(crate) total_term_frequency: u64,
    pub(crate) doc_lengths: HashMap<DocId, u32>,
    pub(crate) total_doc_length: u64,
}

impl InvertedIndex {
    /// Build an index over `docs` in iteration order.
    pub fn from_documents<I>(docs: I) -> Self
    where
        I: IntoIterator<Item = Document>,
    {
        let mut builder = crate::IndexBuilder::new();
        for doc in docs {
            builder.add_document(&doc.id, &doc.tokens);
        }
        builder.build()
    }

    pub fn num_docs(&self) -> u32 { self.num_docs }

    pub fn num_unique_terms(&self) -> u32 { self.num_unique_terms }

    /// Occurrences of every term across the whole collection.
    pub fn total_term_frequency(&self) -> u64 { self.total_term_frequency }

    pub fn posting_list(&self, term: &str) -> Option<&PostingList> { self.terms.get(term) }

    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ { self.terms.keys().map(String::as_str) }

    /// Token count of `doc_id`, or `None` for an unknown document.
    pub fn document_length(&self, doc_id: &str) -> Option<u32> { self.doc_lengths.get(doc_id).copied() }

    pub fn document_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.doc_lengths.keys().map(String::as_str)
    }

    /// Mean length over every indexed document; 0 for an empty index.
    pub fn average_document_length(&self) -> f64 {
        if self.num_docs == 0 {
            return 0.0;
        }
        self.total_doc_length as f64 / self.num_docs as f64
    }

    pub fn summary(&self) -> IndexSummary {
        IndexSummary {
            num_docs: self.num_docs,
            num_unique_terms: self.num_unique_terms,
            total_term_frequency: self.total_term_frequency,
        }
    }
}
