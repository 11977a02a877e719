//! Loading a corpus into an in-memory treebank
//!
//! The load pipeline is: read and assemble corpus files ([`crate::corpus`]),
//! stamp sentence identifiers and parse tokens ([`crate::conllu`]), then
//! group the flat token stream into sentences ([`build`]). The resulting
//! [`Treebank`] is never modified; navigation lives in [`crate::query`].
//!
//! # Examples
//!
//! ```no_run
//! use udexplore::Treebank;
//!
//! let treebank = Treebank::from_dir("conllu").unwrap();
//! for token in treebank.tokens() {
//!     if token.deprel == "obj" {
//!         if let Ok(gov) = treebank.governor_of(token) {
//!             println!("{} <- {:?}", token.form, gov.token().map(|t| &t.lemma));
//!         }
//!     }
//! }
//! ```

use crate::conllu::{ParseError, ParseStats, parse_tokens, stamp_sent_ids};
use crate::corpus::{self, Assembled, LoadOptions};
use crate::tree::{Sentence, Token};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Fatal error while loading a treebank
#[derive(Debug, Error)]
pub enum TreebankError {
    #[error("No corpus files found in {}", .0.display())]
    NoCorpusFiles(PathBuf),

    #[error("Invalid file pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Failed to open file {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Counters describing a completed load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub files: usize,
    pub documents: usize,
    pub sentences: usize,
    pub tokens: usize,
    /// Data lines dropped because they lacked the token shape
    pub skipped_lines: usize,
}

/// An immutable collection of dependency-annotated sentences
#[derive(Debug, Clone, Default)]
pub struct Treebank {
    sentences: Vec<Sentence>,
    /// First slot holding each sentence identifier
    by_id: FxHashMap<String, usize>,
    documents: Vec<String>,
    stats: LoadStats,
}

impl Treebank {
    /// Load every corpus file in a directory with default options
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, TreebankError> {
        Self::from_dir_with(dir, &LoadOptions::default())
    }

    /// Load every corpus file in a directory
    ///
    /// Fails if the directory holds no file with a corpus extension.
    pub fn from_dir_with(
        dir: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> Result<Self, TreebankError> {
        let dir = dir.as_ref();
        let paths = corpus::discover(dir, options)?;
        if paths.is_empty() {
            return Err(TreebankError::NoCorpusFiles(dir.to_path_buf()));
        }
        Self::from_paths_with(&paths, options)
    }

    /// Load the files matching a glob pattern, e.g. `"ud/*-train.conllu"`
    pub fn from_glob(pattern: &str) -> Result<Self, TreebankError> {
        let mut paths: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        paths.sort();
        Self::from_paths(&paths)
    }

    /// Load explicit file paths, concatenated in the given order
    pub fn from_paths(paths: &[PathBuf]) -> Result<Self, TreebankError> {
        Self::from_paths_with(paths, &LoadOptions::default())
    }

    pub fn from_paths_with(
        paths: &[PathBuf],
        options: &LoadOptions,
    ) -> Result<Self, TreebankError> {
        let raw = corpus::read_corpus_files(paths)?;
        let mut treebank = Self::from_string_with(&raw, options)?;
        treebank.stats.files = paths.len();
        info!(
            files = treebank.stats.files,
            documents = treebank.stats.documents,
            sentences = treebank.stats.sentences,
            tokens = treebank.stats.tokens,
            skipped_lines = treebank.stats.skipped_lines,
            "loaded treebank"
        );
        Ok(treebank)
    }

    /// Load from in-memory CoNLL-U text with default options
    pub fn from_string(text: &str) -> Result<Self, TreebankError> {
        Self::from_string_with(text, &LoadOptions::default())
    }

    pub fn from_string_with(text: &str, options: &LoadOptions) -> Result<Self, TreebankError> {
        let Assembled { text, documents } = corpus::assemble(text, options);
        let (tokens, parse_stats) = parse_tokens(&stamp_sent_ids(&text))?;
        Ok(build(tokens, documents, parse_stats))
    }

    /// Sentences in corpus order
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Sentence by identifier. A repeated identifier resolves to its first run.
    pub fn sentence(&self, sent_id: &str) -> Option<&Sentence> {
        self.by_id.get(sent_id).map(|&slot| &self.sentences[slot])
    }

    /// Every token of every sentence, in corpus order
    pub fn tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.sentences.iter().flat_map(|s| s.tokens().iter())
    }

    /// Document marker lines in assembled order
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// Group a flat token stream into sentences.
///
/// A new sentence starts whenever the identifier differs from the previous
/// token's. An identifier that comes back after another one keeps its
/// second run as a separate sentence; lookups by identifier see the first.
pub fn build(tokens: Vec<Token>, documents: Vec<String>, parse_stats: ParseStats) -> Treebank {
    let mut sentences: Vec<Sentence> = Vec::new();
    let mut by_id: FxHashMap<String, usize> = FxHashMap::default();

    for mut token in tokens {
        let starts_new = sentences
            .last()
            .is_none_or(|current| current.sent_id != token.sent_id);
        if starts_new {
            let slot = sentences.len();
            if by_id.contains_key(&token.sent_id) {
                warn!(sent_id = %token.sent_id, "sentence identifier reappears non-contiguously");
            } else {
                by_id.insert(token.sent_id.clone(), slot);
            }
            sentences.push(Sentence::new(&token.sent_id));
        }

        let slot = sentences.len() - 1;
        let sentence = &mut sentences[slot];
        let offset = sentence.len() + 1;
        if token.id != offset {
            warn!(
                sent_id = %token.sent_id,
                id = token.id,
                offset,
                "token ID does not match its position"
            );
        }
        token.sentence = slot;
        token.offset = offset;
        sentence.push(token);
    }

    let stats = LoadStats {
        files: 0,
        documents: documents.len(),
        sentences: sentences.len(),
        tokens: parse_stats.tokens,
        skipped_lines: parse_stats.skipped,
    };

    Treebank {
        sentences,
        by_id,
        documents,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::token;
    use std::fs;
    use tempfile::tempdir;

    const CORPUS: &str = "# newdoc id = doc2
# sent_id = d2-1
1\tCats\tcat\tNOUN\tNNS\t_\t2\tnsubj\t_\t_
2\tsleep\tsleep\tVERB\tVBP\t_\t0\troot\t_\t_

# newdoc id = doc1
# sent_id = d1-1
# text = The dog runs.
1\tThe\tthe\tDET\tDT\t_\t2\tdet\t_\t_
2\tdog\tdog\tNOUN\tNN\t_\t3\tnsubj\t_\t_
3\truns\trun\tVERB\tVBZ\t_\t0\troot\t_\t_

# sent_id = d1-2
1\tIt\tit\tPRON\tPRP\t_\t2\tnsubj\t_\t_
2\tbarks\tbark\tVERB\tVBZ\t_\t0\troot\t_\t_

";

    fn with_sent_id(mut t: Token, sent_id: &str) -> Token {
        t.sent_id = sent_id.to_string();
        t
    }

    #[test]
    fn test_from_string() {
        let treebank = Treebank::from_string(CORPUS).unwrap();

        assert_eq!(treebank.len(), 3);
        assert_eq!(
            treebank.documents(),
            &["# newdoc id = doc1".to_string(), "# newdoc id = doc2".to_string()]
        );

        // doc1 sorts before doc2
        let ids: Vec<&str> = treebank.sentences().iter().map(|s| s.sent_id.as_str()).collect();
        assert_eq!(ids, vec!["d1-1", "d1-2", "d2-1"]);

        let forms: Vec<&str> = treebank.tokens().map(|t| t.form.as_str()).collect();
        assert_eq!(forms, vec!["The", "dog", "runs", "It", "barks", "Cats", "sleep"]);

        let stats = treebank.stats();
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.sentences, 3);
        assert_eq!(stats.tokens, 7);
        assert_eq!(stats.skipped_lines, 0);
    }

    #[test]
    fn test_sentence_lookup() {
        let treebank = Treebank::from_string(CORPUS).unwrap();

        let sentence = treebank.sentence("d1-2").unwrap();
        assert_eq!(sentence.len(), 2);
        assert!(sentence.get(0).unwrap().is_root());
        assert_eq!(sentence.token(2).unwrap().form, "barks");
        assert_eq!(sentence.token(2).unwrap().sentence, 1);
        assert!(treebank.sentence("missing").is_none());
    }

    #[test]
    fn test_build_groups_by_identifier_change() {
        let tokens = vec![
            with_sent_id(token(1, "a", 0, "root"), "s1"),
            with_sent_id(token(2, "b", 1, "dep"), "s1"),
            with_sent_id(token(1, "c", 0, "root"), "s2"),
        ];
        let treebank = build(tokens, Vec::new(), ParseStats::default());

        assert_eq!(treebank.len(), 2);
        assert_eq!(treebank.sentence("s1").unwrap().len(), 2);
        assert_eq!(treebank.sentence("s2").unwrap().len(), 1);
        assert_eq!(treebank.sentence("s2").unwrap().token(1).unwrap().sentence, 1);
    }

    #[test]
    fn test_build_keeps_non_contiguous_runs() {
        let tokens = vec![
            with_sent_id(token(1, "a", 0, "root"), "s1"),
            with_sent_id(token(1, "b", 0, "root"), "s2"),
            with_sent_id(token(1, "c", 0, "root"), "s1"),
        ];
        let treebank = build(tokens, Vec::new(), ParseStats::default());

        assert_eq!(treebank.len(), 3);
        assert_eq!(treebank.sentence("s1").unwrap().token(1).unwrap().form, "a");
        assert_eq!(treebank.sentences()[2].token(1).unwrap().form, "c");
        assert_eq!(treebank.sentences()[2].token(1).unwrap().sentence, 2);
        assert_eq!(treebank.tokens().count(), 3);
    }

    #[test]
    fn test_build_records_offsets_after_dropped_line() {
        // the line for ID 2 has nine columns and is dropped
        let text = "# newdoc id = d
# sent_id = s1
1\ta\ta\tX\t_\t_\t3\tdep\t_\t_
2\tb\tb\tX\t_\t_\t3\tdep\t_
3\tc\tc\tX\t_\t_\t0\troot\t_\t_
4\td\td\tX\t_\t_\t3\tdep\t_\t_
";
        let treebank = Treebank::from_string(text).unwrap();
        assert_eq!(treebank.stats().skipped_lines, 1);

        let sentence = treebank.sentence("s1").unwrap();
        let ids: Vec<_> = sentence.tokens().iter().map(|t| (t.id, t.offset())).collect();
        assert_eq!(ids, vec![(1, 1), (3, 2), (4, 3)]);
        assert!(sentence.tokens().iter().all(|t| t.sentence_slot() == 0));
    }

    #[test]
    fn test_tokens_without_declaration() {
        let treebank = Treebank::from_string_with(
            "1\ta\ta\tX\t_\t_\t0\troot\t_\t_\n",
            &LoadOptions {
                keep_preamble: true,
                ..LoadOptions::default()
            },
        )
        .unwrap();

        assert_eq!(treebank.len(), 1);
        assert_eq!(treebank.sentences()[0].sent_id, "");
        assert!(treebank.sentence("").is_some());
    }

    #[test]
    fn test_coercion_failure_aborts_load() {
        let text = "# newdoc id = d\n# sent_id = s\n\tx\tx\tX\t_\t_\t0\troot\t_\t_\n";
        let err = Treebank::from_string(text).unwrap_err();
        assert!(matches!(err, TreebankError::Parse(_)));
    }

    #[test]
    fn test_counts_skipped_lines() {
        let text = "# newdoc id = d\n# sent_id = s\n1-2\tab\t_\t_\t_\t_\t_\t_\t_\t_\n1\ta\ta\tX\t_\t_\t0\troot\t_\t_\n";
        let treebank = Treebank::from_string(text).unwrap();
        assert_eq!(treebank.stats().skipped_lines, 1);
        assert_eq!(treebank.stats().tokens, 1);
    }

    #[test]
    fn test_from_dir() {
        let dir = tempdir().unwrap();
        let (doc2, doc1) = CORPUS.split_at(CORPUS.find("# newdoc id = doc1").unwrap());
        fs::write(dir.path().join("x.conllu"), doc2).unwrap();
        fs::write(dir.path().join("y.conllu"), doc1).unwrap();

        let treebank = Treebank::from_dir(dir.path()).unwrap();
        assert_eq!(treebank.stats().files, 2);
        assert_eq!(treebank.sentences()[0].sent_id, "d1-1");

        // Reversed file order gives the same sentence order
        let reversed = Treebank::from_paths(&[
            dir.path().join("y.conllu"),
            dir.path().join("x.conllu"),
        ])
        .unwrap();
        let ids = |tb: &Treebank| -> Vec<String> {
            tb.sentences().iter().map(|s| s.sent_id.clone()).collect()
        };
        assert_eq!(ids(&treebank), ids(&reversed));
    }

    #[test]
    fn test_from_glob() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("train.conllu"), CORPUS).unwrap();
        fs::write(dir.path().join("other.txt"), "ignored").unwrap();

        let pattern = format!("{}/*.conllu", dir.path().display());
        let treebank = Treebank::from_glob(&pattern).unwrap();
        assert_eq!(treebank.len(), 3);
    }

    #[test]
    fn test_from_dir_without_corpus_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), "nothing here").unwrap();

        let err = Treebank::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, TreebankError::NoCorpusFiles(_)));
    }

    #[test]
    fn test_treebank_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Treebank>();
    }
}
