//! Dataset-wide position collection
//!
//! Two phases:
//! - Phase 1: sequential traversal, materializing every (directory, identifier)
//!   pair. Resolution cannot stream, since a sibling discovered later could
//!   raise the denominator of an earlier paragraph.
//! - Phase 2: parallel resolution on a pool of `num_workers` threads. Each
//!   worker re-reads the sibling listing of its paragraph's directory, so no
//!   state is shared between workers.

use super::corpus_walker::{CorpusWalker, ParagraphEntry};
use super::position_resolver::resolve_position;
use ntcir_common::{Dataset, Error, Result};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// A paragraph and its normalized position within its document
#[derive(Debug, Clone, PartialEq)]
pub struct PositionTriple {
    pub document: PathBuf,
    pub identifier: String,
    pub position: f64,
}

/// Resolves positions for every paragraph of a dataset
#[derive(Debug, Clone)]
pub struct PositionCollector {
    walker: CorpusWalker,
    num_workers: usize,
}

impl PositionCollector {
    /// `num_workers` is clamped to at least one
    pub fn new(walker: CorpusWalker, num_workers: usize) -> Self {
        Self {
            walker,
            num_workers: num_workers.max(1),
        }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Every paragraph of `dataset` with its position
    ///
    /// Output order is unspecified. One unresolvable paragraph fails the
    /// whole dataset.
    pub fn collect(&self, dataset: &Dataset) -> Result<Vec<PositionTriple>> {
        // Phase 1: materialize the identifier list
        let entries: Vec<ParagraphEntry> = self
            .walker
            .walk(&dataset.root)?
            .collect::<std::result::Result<_, _>>()?;

        debug!(
            dataset = %dataset.label,
            paragraphs = entries.len(),
            "Phase 1 complete: paragraph identifiers discovered"
        );

        // Phase 2: resolve positions in parallel
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_workers)
            .build()
            .map_err(|e| {
                Error::Config(format!(
                    "Failed to start {} position workers: {}",
                    self.num_workers, e
                ))
            })?;

        let triples: Vec<PositionTriple> = pool.install(|| {
            entries
                .into_par_iter()
                .map(|entry| self.resolve_entry(entry))
                .collect::<Result<_>>()
        })?;

        info!(
            dataset = %dataset.label,
            paragraphs = triples.len(),
            workers = self.num_workers,
            "Resolved paragraph positions in {}",
            dataset.name()
        );

        Ok(triples)
    }

    fn resolve_entry(&self, entry: ParagraphEntry) -> Result<PositionTriple> {
        let siblings = self.walker.sibling_identifiers(&entry.directory)?;
        let position = resolve_position(
            &entry.directory,
            &entry.identifier,
            siblings.iter().map(String::as_str),
        )?;

        Ok(PositionTriple {
            document: entry.directory,
            identifier: entry.identifier,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dataset_with(files: &[&str]) -> (TempDir, Dataset) {
        let temp = TempDir::new().unwrap();
        for file in files {
            let path = temp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::File::create(path).unwrap();
        }
        let dataset = Dataset::new('A', temp.path());
        (temp, dataset)
    }

    #[test]
    fn test_collect_resolves_every_paragraph() {
        let (_temp, dataset) = dataset_with(&[
            "a/a_1.xhtml.zip",
            "a/a_2.xhtml.zip",
            "b/b_2.xhtml.zip",
            "b/b_4.xhtml.zip",
        ]);

        let collector = PositionCollector::new(CorpusWalker::new(), 2);
        let mut triples = collector.collect(&dataset).unwrap();
        triples.sort_by(|x, y| x.identifier.cmp(&y.identifier));

        let positions: Vec<_> = triples
            .iter()
            .map(|t| (t.identifier.as_str(), t.position))
            .collect();
        assert_eq!(
            positions,
            vec![("a_1", 0.5), ("a_2", 1.0), ("b_2", 0.5), ("b_4", 1.0)]
        );
        assert_eq!(triples[0].document, dataset.root.join("a"));
    }

    #[test]
    fn test_malformed_identifier_fails_dataset() {
        let (_temp, dataset) = dataset_with(&["a/a_1.xhtml.zip", "a/a_x.xhtml.zip"]);

        let collector = PositionCollector::new(CorpusWalker::new(), 1);
        assert!(matches!(
            collector.collect(&dataset),
            Err(Error::MalformedIdentifier { .. })
        ));
    }

    #[test]
    fn test_empty_dataset() {
        let (_temp, dataset) = dataset_with(&[]);
        let collector = PositionCollector::new(CorpusWalker::new(), 3);
        assert!(collector.collect(&dataset).unwrap().is_empty());
    }

    #[test]
    fn test_zero_workers_clamped() {
        assert_eq!(PositionCollector::new(CorpusWalker::new(), 0).num_workers(), 1);
    }
}
