use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

use crate::ingest::{decode, IngestReport, LoadedBatch, RawDocument, SkippedDocument};
use crate::tokenizer::{normalize_term, tokenize, word_count};

pub type DocId = u32;

/// Decoded input handed to the index: a display name plus the full text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    pub name: String,
    pub text: String,
}

impl NewDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into() }
    }
}

/// A document held by the corpus. Derived maps are only ever written by
/// [`CorpusIndex::recompute`], so they always reflect the current corpus.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocId,
    name: String,
    raw_text: String,
    word_count: usize,
    token_count: usize,
    term_frequencies: HashMap<String, u32>,
    scores: HashMap<String, f64>,
}

impl Document {
    pub fn id(&self) -> DocId { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn raw_text(&self) -> &str { &self.raw_text }
    /// Unnormalized whitespace-delimited word count, for display only.
    pub fn word_count(&self) -> usize { self.word_count }
    /// Number of normalized tokens, repeats included.
    pub fn token_count(&self) -> usize { self.token_count }
    pub fn term_frequencies(&self) -> &HashMap<String, u32> { &self.term_frequencies }
    pub fn scores(&self) -> &HashMap<String, f64> { &self.scores }

    fn summary(&self) -> DocumentSummary {
        DocumentSummary { id: self.id, name: self.name.clone(), word_count: self.word_count }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocId,
    pub name: String,
    pub word_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermScore {
    pub term: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentScore {
    pub id: DocId,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub documents: usize,
    pub vocabulary_size: usize,
    pub total_tokens: usize,
}

/// In-memory TF-IDF index over an ordered set of documents.
///
/// Every membership change rebuilds all derived state before returning, so
/// readers only ever see a snapshot consistent with the full document set.
/// Callers sharing one instance across threads must serialize writers.
#[derive(Debug, Default)]
pub struct CorpusIndex {
    docs: Vec<Document>,
    vocabulary: BTreeSet<String>,
    document_frequency: HashMap<String, u32>,
    next_id: DocId,
}

impl CorpusIndex {
    pub fn new() -> Self { Self::default() }

    /// Append documents, assigning fresh ids, then recompute. Returns the ids in input order.
    pub fn add_documents<I>(&mut self, docs: I) -> Vec<DocId>
    where
        I: IntoIterator<Item = NewDocument>,
    {
        let mut ids = Vec::new();
        for doc in docs {
            let id = self.next_id;
            self.next_id += 1;
            self.docs.push(Document {
                id,
                word_count: word_count(&doc.text),
                name: doc.name,
                raw_text: doc.text,
                token_count: 0,
                term_frequencies: HashMap::new(),
                scores: HashMap::new(),
            });
            ids.push(id);
        }
        if !ids.is_empty() {
            self.recompute();
            info!(added = ids.len(), num_docs = self.docs.len(), "documents added");
        }
        ids
    }

    /// Decode raw sources and add every one that decodes in a single batch.
    /// Sources that fail to decode are reported, not fatal.
    pub fn ingest<I>(&mut self, batch: I) -> IngestReport
    where
        I: IntoIterator<Item = RawDocument>,
    {
        let mut loaded = LoadedBatch::default();
        for raw in batch {
            match decode(&raw.name, raw.bytes) {
                Ok(doc) => loaded.documents.push(doc),
                Err(err) => {
                    warn!(name = %raw.name, error = %err, "skipping document");
                    loaded.skipped.push(SkippedDocument::new(raw.name, &err));
                }
            }
        }
        self.add_batch(loaded)
    }

    /// Add an already-loaded batch, carrying its skipped entries into the report.
    pub fn add_batch(&mut self, batch: LoadedBatch) -> IngestReport {
        let added = self.add_documents(batch.documents);
        IngestReport { added, skipped: batch.skipped }
    }

    /// Remove a document by id. Unknown ids are a no-op and return `false`.
    pub fn remove_document(&mut self, id: DocId) -> bool {
        let Some(pos) = self.docs.iter().position(|d| d.id == id) else {
            return false;
        };
        self.docs.remove(pos);
        self.recompute();
        info!(id, num_docs = self.docs.len(), "document removed");
        true
    }

    /// Drop every document. Ids keep counting up from where they were.
    pub fn clear(&mut self) {
        self.docs.clear();
        self.recompute();
        info!("corpus cleared");
    }

    /// Rebuild vocabulary, document frequencies and every document's
    /// term frequencies and scores from scratch.
    pub fn recompute(&mut self) {
        let n = self.docs.len();
        if n == 0 {
            self.vocabulary.clear();
            self.document_frequency.clear();
            return;
        }

        let mut per_doc: Vec<(HashMap<String, u32>, usize)> = Vec::with_capacity(n);
        let mut vocabulary = BTreeSet::new();
        let mut document_frequency: HashMap<String, u32> = HashMap::new();
        for doc in &self.docs {
            let tokens = tokenize(&doc.raw_text);
            let total = tokens.len();
            let mut tf: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *tf.entry(token).or_insert(0) += 1;
            }
            // keys of tf are exactly this document's distinct-term set
            for term in tf.keys() {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
                vocabulary.insert(term.clone());
            }
            per_doc.push((tf, total));
        }

        for (doc, (tf, total)) in self.docs.iter_mut().zip(per_doc) {
            let scores = tf
                .iter()
                .map(|(term, &count)| {
                    let df_t = document_frequency.get(term).copied().unwrap_or(0);
                    (term.clone(), term_frequency(count, total) * inverse_document_frequency(n, df_t))
                })
                .collect();
            doc.term_frequencies = tf;
            doc.scores = scores;
            doc.token_count = total;
        }
        self.vocabulary = vocabulary;
        self.document_frequency = document_frequency;
        debug!(num_docs = n, num_terms = self.vocabulary.len(), "recomputed tf-idf");
    }
}

/// Read-only queries over the cached snapshot.
impl CorpusIndex {
    pub fn len(&self) -> usize { self.docs.len() }
    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.docs.iter().find(|d| d.id == id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> + '_ {
        self.docs.iter()
    }

    pub fn list_documents(&self) -> Vec<DocumentSummary> {
        self.docs.iter().map(Document::summary).collect()
    }

    /// All distinct terms in lexicographic order.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> + '_ {
        self.vocabulary.iter().map(String::as_str)
    }

    pub fn document_frequency(&self, term: &str) -> u32 {
        self.document_frequency.get(&normalize_term(term)).copied().unwrap_or(0)
    }

    /// Score of `term` in one document; 0.0 when the term or the document is absent.
    pub fn term_score(&self, term: &str, id: DocId) -> f64 {
        let term = normalize_term(term);
        self.document(id)
            .and_then(|d| d.scores.get(&term).copied())
            .unwrap_or(0.0)
    }

    /// Score of `term` in every document, in corpus order.
    pub fn term_scores(&self, term: &str) -> Vec<DocumentScore> {
        let term = normalize_term(term);
        self.docs
            .iter()
            .map(|d| DocumentScore {
                id: d.id,
                name: d.name.clone(),
                score: d.scores.get(&term).copied().unwrap_or(0.0),
            })
            .collect()
    }

    /// Highest score of `term` across the corpus, 0.0 if it appears nowhere.
    pub fn max_score(&self, term: &str) -> f64 {
        let term = normalize_term(term);
        self.docs
            .iter()
            .filter_map(|d| d.scores.get(&term).copied())
            .fold(0.0, f64::max)
    }

    /// The `k` best-scoring terms of a document, score descending, ties by term ascending.
    pub fn top_terms(&self, id: DocId, k: usize) -> Vec<TermScore> {
        let Some(doc) = self.document(id) else {
            return Vec::new();
        };
        let mut ranked: Vec<TermScore> = doc
            .scores
            .iter()
            .map(|(term, &score)| TermScore { term: term.clone(), score })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));
        ranked.truncate(k);
        ranked
    }

    /// First `max_chars` characters of the raw text, with "..." appended when cut.
    pub fn document_preview(&self, id: DocId, max_chars: usize) -> Option<String> {
        let text = &self.document(id)?.raw_text;
        let preview = match text.char_indices().nth(max_chars) {
            Some((end, _)) => format!("{}...", &text[..end]),
            None => text.clone(),
        };
        Some(preview)
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            documents: self.docs.len(),
            vocabulary_size: self.vocabulary.len(),
            total_tokens: self.docs.iter().map(|d| d.token_count).sum(),
        }
    }
}

#[inline]
fn term_frequency(count: u32, total: usize) -> f64 {
    count as f64 / total as f64
}

#[inline]
fn inverse_document_frequency(num_docs: usize, df: u32) -> f64 {
    (num_docs as f64 / df.max(1) as f64).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> CorpusIndex {
        let mut index = CorpusIndex::new();
        index.add_documents(
            texts.iter().enumerate().map(|(i, t)| NewDocument::new(format!("doc{i}"), *t)),
        );
        index
    }

    #[test]
    fn scores_match_formula() {
        let index = corpus(&["the cat sat", "the dog sat"]);
        let expected = (1.0 / 3.0) * 2f64.ln();
        assert!((index.term_score("cat", 0) - expected).abs() < 1e-12);
        assert_eq!(index.term_score("the", 0), 0.0);
        assert_eq!(index.term_score("dog", 0), 0.0);
    }

    #[test]
    fn document_frequency_uses_exact_tokens() {
        let index = corpus(&["a category of things", "one cat"]);
        assert_eq!(index.document_frequency("cat"), 1);
        assert_eq!(index.document_frequency("category"), 1);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut index = corpus(&["one", "two"]);
        assert!(index.remove_document(1));
        let ids = index.add_documents([NewDocument::new("three", "three")]);
        assert_eq!(ids, vec![2]);
        index.clear();
        let ids = index.add_documents([NewDocument::new("four", "four")]);
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn empty_batch_leaves_snapshot_untouched() {
        let mut index = corpus(&["the cat sat", "the dog sat"]);
        let before: Vec<_> = index.documents().map(|d| d.scores().clone()).collect();
        let ids = index.add_documents(Vec::new());
        assert!(ids.is_empty());
        assert_eq!(index.len(), 2);
        let after: Vec<_> = index.documents().map(|d| d.scores().clone()).collect();
        assert_eq!(before, after);
        // the id counter did not move either
        assert_eq!(index.add_documents([NewDocument::new("c", "cow")]), vec![2]);
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut index = corpus(&["one"]);
        assert!(!index.remove_document(42));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn top_terms_breaks_ties_by_term() {
        let index = corpus(&["zeta alpha beta beta", "other"]);
        let top = index.top_terms(0, 10);
        let terms: Vec<&str> = top.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(terms, vec!["beta", "alpha", "zeta"]);
        assert_eq!(index.top_terms(0, 1).len(), 1);
    }

    #[test]
    fn preview_truncates_on_char_boundaries() {
        let index = corpus(&["héllo wörld"]);
        assert_eq!(index.document_preview(0, 5).as_deref(), Some("héllo..."));
        assert_eq!(index.document_preview(0, 100).as_deref(), Some("héllo wörld"));
        assert_eq!(index.document_preview(0, 11).as_deref(), Some("héllo wörld"));
        assert!(index.document_preview(9, 5).is_none());
    }

    #[test]
    fn query_terms_are_normalized() {
        let index = corpus(&["Cat nap", "dog"]);
        assert_eq!(index.term_score("CAT", 0), index.term_score("cat", 0));
        assert!(index.term_score("Cat!", 0) > 0.0);
    }
}
