use crate::index::{InvertedIndex, PostingList};
use crate::Position;

/// Single-pass, exclusively owned build phase for an [`InvertedIndex`].
///
/// Repeated document ids are not rejected: the later document replaces the
/// stored length and its occurrences are appended to the existing postings.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: InvertedIndex,
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    /// Scan `tokens` left to right, recording each at its 1-based position.
    pub fn add_document<I, S>(&mut self, doc_id: &str, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index = &mut self.index;
        let mut len: u32 = 0;
        for (i, token) in tokens.into_iter().enumerate() {
            let Some(position) = position_at(i) else {
                tracing::warn!(doc_id, indexed = len, "document exceeds the position range, truncating");
                break;
            };
            let term = token.as_ref();
            match index.terms.get_mut(term) {
                Some(list) => list.record(doc_id, position),
                None => {
                    let mut list = PostingList::new();
                    list.record(doc_id, position);
                    index.terms.insert(term.to_string(), list);
                    index.num_unique_terms += 1;
                }
            }
            index.total_term_frequency += 1;
            len = position;
        }

        if let Some(previous) = index.doc_lengths.insert(doc_id.to_string(), len) {
            index.total_doc_length -= previous as u64;
        }
        index.total_doc_length += len as u64;
        index.num_docs += 1;
    }

    pub fn build(self) -> InvertedIndex {
        let index = self.index;
        tracing::info!(
            num_docs = index.num_docs,
            num_terms = index.num_unique_terms,
            occurrences = index.total_term_frequency,
            "built inverted index"
        );
        index
    }
}

/// 1-based position of the token at `offset`, if it fits in a [`Position`].
fn position_at(offset: usize) -> Option<Position> {
    offset.checked_add(1).and_then(|p| Position::try_from(p).ok())
}
