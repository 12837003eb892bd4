use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use storyidx_core::{Document, IndexSummary, InvertedIndex, NamedQuery, Phrase, PostingList, Query, QueryKind, ResultRow, Searcher};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    #[serde(rename = "storyID", alias = "id")]
    story_id: String,
    #[serde(alias = "body")]
    text: String,
}

impl From<InputDoc> for Document {
    fn from(doc: InputDoc) -> Self {
        // text is already tokenized upstream; only split it
        Document::new(doc.story_id, doc.text.split_whitespace())
    }
}

/// Load every document under `input` (a file or a directory), in path order.
pub fn load_documents(input: &Path) -> Result<Vec<Document>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && document_format(p).is_some() {
                files.push(p.to_path_buf());
            }
        }
    } else {
        files.push(input.to_path_buf());
    }

    let mut docs = Vec::new();
    for file in files {
        let before = docs.len();
        read_document_file(&file, &mut docs).with_context(|| format!("reading documents from {}", file.display()))?;
        tracing::debug!(file = %file.display(), docs = docs.len() - before, "loaded documents");
    }
    tracing::info!(num_docs = docs.len(), "loaded collection");
    Ok(docs)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    JsonLines,
}

/// `.json` / `.jsonl`, optionally gzip-compressed.
fn document_format(path: &Path) -> Option<(Format, bool)> {
    let name = path.file_name()?.to_str()?;
    let (stem, gzipped) = match name.strip_suffix(".gz") {
        Some(stem) => (stem, true),
        None => (name, false),
    };
    if stem.ends_with(".jsonl") {
        Some((Format::JsonLines, gzipped))
    } else if stem.ends_with(".json") {
        Some((Format::Json, gzipped))
    } else {
        None
    }
}

fn open_maybe_gz(path: &Path, gzipped: bool) -> Result<Box<dyn Read>> {
    let f = File::open(path)?;
    Ok(if gzipped { Box::new(GzDecoder::new(f)) } else { Box::new(f) })
}

fn read_document_file(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    // unknown extensions are read as plain JSON
    let (format, gzipped) = document_format(file).unwrap_or((Format::Json, false));
    let reader = BufReader::new(open_maybe_gz(file, gzipped)?);
    match format {
        Format::JsonLines => {
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let doc: InputDoc = serde_json::from_str(&line)?;
                docs.push(doc.into());
            }
        }
        Format::Json => {
            let json: serde_json::Value = serde_json::from_reader(reader)?;
            match json {
                serde_json::Value::Array(arr) => {
                    for v in arr {
                        let doc: InputDoc = serde_json::from_value(v)?;
                        docs.push(doc.into());
                    }
                }
                serde_json::Value::Object(_) => {
                    let doc: InputDoc = serde_json::from_value(json)?;
                    docs.push(doc.into());
                }
                _ => anyhow::bail!("expected a document object or an array of documents"),
            }
        }
    }
    Ok(())
}

/// Parse one tab-separated query line: `kind name phrase...`.
pub fn parse_query_line(line: &str) -> Result<NamedQuery> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    if fields.len() < 3 {
        anyhow::bail!("expected `kind<TAB>name<TAB>phrase...`, got {} field(s)", fields.len());
    }
    let kind: QueryKind = fields[0].parse()?;
    let units = fields[2..].iter().map(|text| Phrase::parse(text)).collect::<Result<Vec<_>, _>>()?;
    let query = Query::from_kind(kind, units)?;
    Ok(NamedQuery { name: fields[1].to_string(), query })
}

/// Read a query file, skipping malformed lines with a warning.
pub fn load_queries(path: &Path) -> Result<Vec<NamedQuery>> {
    let f = File::open(path).with_context(|| format!("opening queries {}", path.display()))?;
    let mut queries = Vec::new();
    for (lineno, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_query_line(&line) {
            Ok(q) => queries.push(q),
            Err(err) => tracing::warn!(line = lineno + 1, error = %err, "skipping query"),
        }
    }
    tracing::info!(num_queries = queries.len(), "loaded queries");
    Ok(queries)
}

/// Evaluate `queries` in order; with `parallel` they are spread over rayon's pool.
///
/// A query that fails to evaluate is logged and yields no rows.
pub fn run_queries<'q>(searcher: &Searcher<'_>, queries: &'q [NamedQuery], parallel: bool) -> Vec<(&'q NamedQuery, Vec<ResultRow>)> {
    let eval = |q: &'q NamedQuery| {
        let rows = searcher.evaluate(&q.query).unwrap_or_else(|err| {
            tracing::warn!(query = %q.name, error = %err, "query failed");
            Vec::new()
        });
        (q, rows)
    };
    if parallel {
        queries.par_iter().map(eval).collect()
    } else {
        queries.iter().map(eval).collect()
    }
}

/// Write rows in trec run format: `name skip label rank score tag`.
pub fn write_trecrun<W: Write>(out: &mut W, query_name: &str, rows: &[ResultRow], run_tag: &str) -> Result<()> {
    for row in rows {
        let label = row.label.replace(' ', "_");
        writeln!(out, "{} skip {} {} {:.4} {}", query_name, label, row.rank, row.score, run_tag)?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TermReport<'a> {
    pub term: &'a str,
    pub found: bool,
    pub docs: usize,
    pub occurrences: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postings: Option<&'a PostingList>,
}

#[derive(Debug, Serialize)]
pub struct DebugReport<'a> {
    pub summary: IndexSummary,
    pub terms: Vec<TermReport<'a>>,
}

pub fn debug_report<'a>(index: &'a InvertedIndex, terms: &'a [String], with_postings: bool) -> DebugReport<'a> {
    let terms = terms
        .iter()
        .map(|term| {
            let list = index.posting_list(term);
            TermReport {
                term,
                found: list.is_some(),
                docs: list.map_or(0, PostingList::document_count),
                occurrences: list.map_or(0, PostingList::total_frequency),
                postings: list.filter(|_| with_postings),
            }
        })
        .collect();
    DebugReport { summary: index.summary(), terms }
}

/// Human-readable index dump for a handful of terms.
pub fn write_debug<W: Write>(out: &mut W, report: &DebugReport<'_>) -> Result<()> {
    let s = report.summary;
    writeln!(out, "Total Index: {} docs, {} terms, {} occurrences\n", s.num_docs, s.num_unique_terms, s.total_term_frequency)?;
    for t in &report.terms {
        if !t.found {
            writeln!(out, "****{} NOT FOUND *****\n", t.term)?;
            continue;
        }
        writeln!(out, "{} - {} docs, {} occurrences", t.term, t.docs, t.occurrences)?;
        if let Some(list) = t.postings {
            let postings: Vec<String> = list
                .postings()
                .iter()
                .map(|p| format!("[{}, {}, {:?}]", p.doc_id, p.term_frequency, p.positions))
                .collect();
            writeln!(out, "\t at: [{}]", postings.join(", "))?;
        }
    }
    Ok(())
}
