use std::collections::BTreeSet;
use storyidx_core::phrase::{collection_frequency, document_frequency, matching_documents, term_frequency};
use storyidx_core::{Document, InvertedIndex, Phrase, Query, Searcher};

fn phrase(text: &str) -> Phrase { Phrase::parse(text).unwrap() }

fn units(texts: &[&str]) -> Vec<Phrase> { texts.iter().map(|t| phrase(t)).collect() }

fn cat_dog() -> InvertedIndex {
    InvertedIndex::from_documents(vec![
        Document::new("d1", ["cat", "dog"]),
        Document::new("d2", ["dog"]),
    ])
}

#[test]
fn single_term_index() {
    let index = cat_dog();

    let cat = index.posting_list("cat").unwrap();
    assert_eq!(cat.document_count(), 1);
    assert_eq!(cat.posting("d1").unwrap().positions, vec![1]);
    let dog = index.posting_list("dog").unwrap();
    assert_eq!(dog.posting("d1").unwrap().positions, vec![2]);
    assert_eq!(dog.posting("d2").unwrap().positions, vec![1]);

    assert_eq!(document_frequency(&index, &phrase("dog")), 2);
    assert_eq!(term_frequency(&index, "d1", &phrase("dog")), 1);

    let searcher = Searcher::new(&index);
    let and: Vec<String> = searcher
        .evaluate(&Query::And(units(&["cat", "dog"])))
        .unwrap()
        .into_iter()
        .map(|r| r.label)
        .collect();
    assert_eq!(and, vec!["d1"]);
    let or: Vec<String> = searcher
        .evaluate(&Query::Or(units(&["cat", "dog"])))
        .unwrap()
        .into_iter()
        .map(|r| r.label)
        .collect();
    assert_eq!(or, vec!["d1", "d2"]);
}

#[test]
fn phrase_matching() {
    let index = InvertedIndex::from_documents(vec![Document::new("d", ["new", "york", "city", "new", "york"])]);

    let new = index.posting_list("new").unwrap().posting("d").unwrap();
    assert_eq!(new.positions, vec![1, 4]);
    let york = index.posting_list("york").unwrap().posting("d").unwrap();
    assert_eq!(york.positions, vec![2, 5]);

    assert_eq!(term_frequency(&index, "d", &phrase("new york")), 2);
    assert_eq!(term_frequency(&index, "d", &phrase("new city")), 0);
    assert_eq!(collection_frequency(&index, &phrase("new york")), 2);
    assert_eq!(matching_documents(&index, &phrase("york city")), BTreeSet::from(["d"]));
}

#[test]
fn bm25_zero_candidate_query() {
    let index = cat_dog();
    let rows = Searcher::new(&index).evaluate(&Query::Bm25(units(&["zebra"]))).unwrap();
    assert!(rows.is_empty());
    let rows = Searcher::new(&index).evaluate(&Query::QueryLikelihood(units(&["zebra crossing"]))).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn ranked_queries_are_reproducible_and_bounded() {
    // 150 identical documents: every score ties, so order comes from the ids alone
    let docs: Vec<Document> = (0..150)
        .rev()
        .map(|i| Document::new(format!("doc-{i:03}"), ["alpha", "beta"]))
        .chain(std::iter::once(Document::new("other", ["gamma"])))
        .collect();
    let index = InvertedIndex::from_documents(docs);
    let searcher = Searcher::new(&index);

    for query in [Query::QueryLikelihood(units(&["alpha"])), Query::Bm25(units(&["alpha beta"]))] {
        let first = searcher.evaluate(&query).unwrap();
        let second = searcher.evaluate(&query).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 100);
        assert_eq!(first[0].label, "doc-000");
        assert_eq!(first[99].label, "doc-099");
        assert_eq!(first[99].rank, 100);
    }

    let rows = searcher.evaluate(&Query::Bm25(units(&["gamma", "zebra"]))).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "other");
}

#[test]
fn ql_multi_unit_documents_matching_one_unit() {
    let index = InvertedIndex::from_documents(vec![
        Document::new("a", ["solar", "eclipse", "seen"]),
        Document::new("b", ["solar", "power"]),
        Document::new("c", ["lunar", "eclipse"]),
    ]);
    let rows = Searcher::new(&index)
        .evaluate(&Query::QueryLikelihood(units(&["solar eclipse", "power"])))
        .unwrap();
    let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels.len(), 2);
    assert!(labels.contains(&"a"));
    assert!(labels.contains(&"b"));
    assert!(rows.iter().all(|r| r.score.is_finite() && r.score < 0.0));
}
