//! Synthetic dataset builders shared by integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create `<root>/<document>/<document>_<n>.xhtml.zip` for every ordinal
pub fn write_document(root: &Path, document: &str, ordinals: &[u32]) -> PathBuf {
    let directory = root.join(document);
    fs::create_dir_all(&directory).unwrap();
    for n in ordinals {
        fs::File::create(directory.join(format!("{}_{}.xhtml.zip", leaf(document), n))).unwrap();
    }
    directory
}

/// Fresh dataset directory populated with `documents`
pub fn create_dataset(documents: &[(&str, &[u32])]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (document, ordinals) in documents {
        write_document(temp.path(), document, ordinals);
    }
    temp
}

/// Write an NTCIR judgement file with one `(identifier, score)` per line
pub fn write_judgements(path: &Path, judgements: &[(&str, f64)]) {
    let body: String = judgements
        .iter()
        .map(|(identifier, score)| format!("NTCIR12-MathIR-1 0 {} {}\n", identifier, score))
        .collect();
    fs::write(path, body).unwrap();
}

fn leaf(document: &str) -> &str {
    document.rsplit('/').next().unwrap_or(document)
}
