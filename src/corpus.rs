//! Corpus discovery and raw text assembly
//!
//! Corpus files are read whole and concatenated, then cut into documents
//! at `# newdoc` markers. Documents are sorted by their raw text so that
//! sentence order does not depend on the order the filesystem lists files.

use crate::treebank::TreebankError;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options controlling how a corpus directory is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// File name suffixes that mark corpus files. Files ending in `.gz`
    /// are decompressed.
    pub extensions: Vec<String>,
    /// Text that starts every document
    pub doc_marker: String,
    /// Keep text before the first document marker instead of discarding it
    pub keep_preamble: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["conllu".to_string(), "conllu.gz".to_string()],
            doc_marker: "# newdoc ".to_string(),
            keep_preamble: false,
        }
    }
}

/// Assembled corpus text with its documents in sorted order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembled {
    pub text: String,
    /// Document marker lines (`# newdoc id = ...`), in assembled order
    pub documents: Vec<String>,
}

/// Find corpus files directly inside `dir`, sorted by path
pub fn discover(dir: &Path, options: &LoadOptions) -> Result<Vec<PathBuf>, TreebankError> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let mut paths = Vec::new();
    for ext in &options.extensions {
        let pattern = format!("{}/*{}", escaped, ext);
        paths.extend(glob::glob(&pattern)?.filter_map(Result::ok));
    }
    paths.sort();
    paths.dedup();
    debug!(dir = %dir.display(), files = paths.len(), "discovered corpus files");
    Ok(paths)
}

/// Read one corpus file fully, decompressing `.gz` files
pub fn read_corpus_file(path: &Path) -> Result<String, TreebankError> {
    let file = File::open(path).map_err(|source| TreebankError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let mut text = String::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        MultiGzDecoder::new(file).read_to_string(&mut text)?;
    } else {
        let mut file = file;
        file.read_to_string(&mut text)?;
    }
    Ok(text)
}

/// Concatenate corpus files in the given order
pub fn read_corpus_files(paths: &[PathBuf]) -> Result<String, TreebankError> {
    let mut data = String::new();
    for path in paths {
        data.push_str(&read_corpus_file(path)?);
    }
    Ok(data)
}

/// Split concatenated corpus text into documents, sort them, and rejoin.
///
/// Text before the first marker is discarded unless `keep_preamble` is set,
/// in which case it is kept, unsorted, at the front. No documents (and no
/// kept preamble) gives an empty buffer.
pub fn assemble(raw: &str, options: &LoadOptions) -> Assembled {
    let marker = options.doc_marker.as_str();
    if marker.is_empty() {
        return Assembled {
            text: raw.to_string(),
            documents: Vec::new(),
        };
    }

    let mut segments = raw.split(marker);
    let preamble = segments.next().unwrap_or_default();
    let mut docs: Vec<&str> = segments.collect();
    docs.sort_unstable();

    let mut text = String::with_capacity(raw.len() + marker.len());
    if options.keep_preamble {
        text.push_str(preamble);
    }

    let mut documents = Vec::with_capacity(docs.len());
    for doc in docs {
        let header = doc.split('\n').next().unwrap_or_default();
        let header = header.strip_suffix('\r').unwrap_or(header);
        documents.push(format!("{}{}", marker, header));
        text.push_str(marker);
        text.push_str(doc);
    }

    Assembled { text, documents }
}
