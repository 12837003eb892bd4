//! Term and phrase statistics over positional postings.
//!
//! A [`Phrase`] of one term is looked up directly in its posting list. Longer
//! phrases are matched by adjacency: for each position `p` of the first term in
//! a document, the i-th following term must sit at `p + i`. Every statistic is
//! restricted to documents holding the first term, since any phrase occurrence
//! starts with one.
//!
//! Unknown terms are never an error; they simply yield zero or an empty set.

use crate::index::InvertedIndex;
use crate::{Error, Position, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One query unit: a single term or an ordered run of adjacent terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPhrase")]
pub struct Phrase {
    terms: Vec<String>,
}

#[derive(Deserialize)]
struct RawPhrase {
    terms: Vec<String>,
}

impl TryFrom<RawPhrase> for Phrase {
    type Error = Error;

    fn try_from(raw: RawPhrase) -> Result<Self> { Self::new(raw.terms) }
}

impl Phrase {
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        if terms.is_empty() {
            return Err(Error::EmptyPhrase);
        }
        Ok(Self { terms })
    }

    /// Split space-separated text into a phrase.
    pub fn parse(text: &str) -> Result<Self> { Self::new(text.split_whitespace()) }

    pub fn terms(&self) -> &[String] { &self.terms }

    pub fn first(&self) -> &str { &self.terms[0] }

    pub fn is_single_term(&self) -> bool { self.terms.len() == 1 }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.terms.join(" ")) }
}

/// Occurrences of `phrase` in `doc_id`.
pub fn term_frequency(index: &InvertedIndex, doc_id: &str, phrase: &Phrase) -> u32 {
    if phrase.is_single_term() {
        return index
            .posting_list(phrase.first())
            .and_then(|list| list.posting(doc_id))
            .map_or(0, |posting| posting.term_frequency);
    }

    let mut lists: Vec<&[Position]> = Vec::with_capacity(phrase.terms().len());
    for term in phrase.terms() {
        match index.posting_list(term).and_then(|list| list.posting(doc_id)) {
            Some(posting) => lists.push(&posting.positions),
            None => return 0,
        }
    }
    count_adjacent(&lists)
}

/// Count start positions in `lists[0]` continued by `lists[i]` at offset `i`.
///
/// Position lists are ascending unless a document id was indexed more than once,
/// in which case the later occurrences restart from 1. Sorted lists are probed by
/// binary search, the rest by a linear scan.
fn count_adjacent(lists: &[&[Position]]) -> u32 {
    let Some((first, rest)) = lists.split_first() else {
        return 0;
    };
    let ascending: Vec<bool> = rest.iter().map(|positions| positions.windows(2).all(|w| w[0] < w[1])).collect();
    let holds = |positions: &[Position], sorted: bool, want: Position| {
        if sorted {
            positions.binary_search(&want).is_ok()
        } else {
            positions.contains(&want)
        }
    };

    let mut matches = 0;
    'start: for &start in first.iter() {
        for (offset, (&positions, &sorted)) in rest.iter().zip(ascending.iter()).enumerate() {
            let Some(want) = start.checked_add(offset as Position + 1) else {
                continue 'start;
            };
            if !holds(positions, sorted, want) {
                continue 'start;
            }
        }
        matches += 1;
    }
    matches
}

/// Candidate documents: those holding the phrase's first term, in posting order.
fn candidates<'a>(index: &'a InvertedIndex, phrase: &Phrase) -> impl Iterator<Item = &'a str> + 'a {
    index.posting_list(phrase.first()).into_iter().flat_map(|list| list.doc_ids())
}

/// Number of documents containing `phrase` at least once.
pub fn document_frequency(index: &InvertedIndex, phrase: &Phrase) -> u32 {
    if phrase.is_single_term() {
        return index.posting_list(phrase.first()).map_or(0, |list| list.document_count() as u32);
    }
    candidates(index, phrase)
        .filter(|doc_id| term_frequency(index, doc_id, phrase) > 0)
        .count() as u32
}

/// Occurrences of `phrase` across the whole collection.
pub fn collection_frequency(index: &InvertedIndex, phrase: &Phrase) -> u64 {
    if phrase.is_single_term() {
        return index.posting_list(phrase.first()).map_or(0, |list| list.total_frequency());
    }
    candidates(index, phrase)
        .map(|doc_id| term_frequency(index, doc_id, phrase) as u64)
        .sum()
}

/// Ids of every document where `phrase` occurs.
pub fn matching_documents<'a>(index: &'a InvertedIndex, phrase: &Phrase) -> BTreeSet<&'a str> {
    if phrase.is_single_term() {
        return candidates(index, phrase).collect();
    }
    candidates(index, phrase)
        .filter(|doc_id| term_frequency(index, doc_id, phrase) > 0)
        .collect()
}
