//! AND/OR over the document sets matched by each query unit.

use crate::index::InvertedIndex;
use crate::phrase::{matching_documents, Phrase};
use crate::{Error, Result};
use std::collections::BTreeSet;

/// Documents matched by every unit. At least one unit is required.
pub fn intersect<'a>(index: &'a InvertedIndex, units: &[Phrase]) -> Result<BTreeSet<&'a str>> {
    let (first, rest) = units.split_first().ok_or(Error::EmptyQuery)?;
    let mut docs = matching_documents(index, first);
    for unit in rest {
        if docs.is_empty() {
            break;
        }
        let other = matching_documents(index, unit);
        docs.retain(|doc_id| other.contains(doc_id));
    }
    Ok(docs)
}

/// Documents matched by at least one unit. Empty for an empty unit list.
pub fn union<'a>(index: &'a InvertedIndex, units: &[Phrase]) -> BTreeSet<&'a str> {
    let mut docs = BTreeSet::new();
    for unit in units {
        docs.extend(matching_documents(index, unit));
    }
    docs
}
