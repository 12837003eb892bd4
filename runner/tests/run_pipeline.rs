use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use storyidx::{debug_report, load_documents, load_queries, run_queries, write_debug, write_trecrun};
use storyidx_core::{InvertedIndex, Searcher};
use tempfile::tempdir;

const STORIES: &str = r#"[
  {"article": "1", "storyID": "1-1", "storynum": "1", "url": "u", "text": "the new york steam engine"},
  {"article": "1", "storyID": "1-2", "storynum": "2", "url": "u", "text": "a steam engine in new york new york"},
  {"article": "2", "storyID": "2-1", "storynum": "1", "url": "u", "text": "patent office report"}
]"#;

const QUERIES: &str = "and\tq-and\tsteam engine\tnew york
or\tq-or\tpatent\tyork new
tf\tq-tf\tnew york
df\tq-df\tnew york\tzebra\tsteam
ql\tq-ql\tsteam engine\tpatent
bm25\tq-bm25\tzebra
near\tq-bad\tnew york

bm25\tq-bm25b\tnew york
";

fn run_to_string(index: &InvertedIndex, queries_path: &std::path::Path, parallel: bool) -> String {
    let queries = load_queries(queries_path).unwrap();
    let searcher = Searcher::new(index);
    let mut out = Vec::new();
    for (query, rows) in run_queries(&searcher, &queries, parallel) {
        write_trecrun(&mut out, &query.name, &rows, "test").unwrap();
    }
    String::from_utf8(out).unwrap()
}

#[test]
fn end_to_end_trecrun() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("stories.json"), STORIES).unwrap();
    fs::write(dir.path().join("queries.tsv"), QUERIES).unwrap();

    let docs = load_documents(&dir.path().join("stories.json")).unwrap();
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[1].id, "1-2");
    assert_eq!(docs[1].tokens.len(), 8);
    let index = InvertedIndex::from_documents(docs);

    let text = run_to_string(&index, &dir.path().join("queries.tsv"), false);
    let lines: Vec<&str> = text.lines().collect();

    assert!(lines.iter().all(|l| l.split(' ').count() == 6));
    assert!(lines.contains(&"q-and skip 1-1 1 1.0000 test"));
    assert!(lines.contains(&"q-and skip 1-2 2 1.0000 test"));
    assert!(lines.contains(&"q-or skip 2-1 2 1.0000 test"));
    assert!(lines.contains(&"q-tf skip 1-2 1 2.0000 test"));
    assert!(lines.contains(&"q-tf skip 1-1 2 1.0000 test"));
    assert!(lines.contains(&"q-df skip new_york 1 2.0000 test"));
    assert!(lines.contains(&"q-df skip steam 3 2.0000 test"));
    assert!(!text.contains("zebra"));
    assert!(!text.contains("q-bm25 "));
    assert!(!text.contains("q-bad"));
    assert!(lines.contains(&"q-or skip 1-2 1 1.0000 test"));
    // "york new" only occurs in 1-2
    assert_eq!(lines.iter().filter(|l| l.starts_with("q-or ")).count(), 2);
    assert_eq!(lines.iter().filter(|l| l.starts_with("q-ql ")).count(), 3);
    assert_eq!(lines.iter().filter(|l| l.starts_with("q-bm25b ")).count(), 2);

    let parallel = run_to_string(&index, &dir.path().join("queries.tsv"), true);
    assert_eq!(parallel, text);
}

#[test]
fn loads_directories_jsonl_and_gzip() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir_all(&nested).unwrap();
    fs::write(dir.path().join("a.jsonl"), "{\"id\": \"x1\", \"body\": \"alpha beta\"}\n\n{\"storyID\": \"x2\", \"text\": \"beta\"}\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "not a collection").unwrap();

    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(br#"{"storyID": "y1", "text": "gamma alpha"}"#).unwrap();
    fs::write(nested.join("b.json.gz"), gz.finish().unwrap()).unwrap();

    let docs = load_documents(dir.path()).unwrap();
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["x1", "x2", "y1"]);

    let index = InvertedIndex::from_documents(docs);
    assert_eq!(index.num_docs(), 3);
    assert_eq!(index.posting_list("alpha").unwrap().document_count(), 2);
}

#[test]
fn malformed_document_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "[{\"storyID\": \"1\"}]").unwrap();
    let err = load_documents(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.json"));
}

#[test]
fn debug_output_lists_terms() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stories.json");
    fs::write(&path, STORIES).unwrap();
    let index = InvertedIndex::from_documents(load_documents(&path).unwrap());

    let terms = vec!["york".to_string(), "zebra".to_string()];
    let mut out = Vec::new();
    write_debug(&mut out, &debug_report(&index, &terms, true)).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("Total Index: 3 docs, 10 terms, 16 occurrences"));
    assert!(text.contains("york - 2 docs, 3 occurrences"));
    assert!(text.contains("[1-2, 2, [6, 8]]"));
    assert!(text.contains("****zebra NOT FOUND *****"));

    let json = serde_json::to_value(debug_report(&index, &terms, false)).unwrap();
    assert_eq!(json["summary"]["num_docs"], 3);
    assert_eq!(json["terms"][0]["docs"], 2);
    assert!(json["terms"][0].get("postings").is_none());
    assert_eq!(json["terms"][1]["found"], false);
}
