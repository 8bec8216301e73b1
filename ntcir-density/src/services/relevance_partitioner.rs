//! Relevance classification and position partitioning
//!
//! Judgements decide which identifiers of a dataset are judged and which are
//! relevant (score >= [`MIN_RELEVANT_SCORE`]). Position triples are then split
//! into the "all" pool and the "relevant" pool. Identifiers judged relevant
//! but never discovered in the corpus are dropped from the relevant pool and
//! only reported in [`CoverageStats`].

use super::judgement_extractor::Judgement;
use super::position_collector::PositionTriple;
use ntcir_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Minimum judgement score for a paragraph to count as relevant (inclusive)
pub const MIN_RELEVANT_SCORE: f64 = 2.0;

/// Judged and relevant identifiers of one dataset
#[derive(Debug, Clone, Default)]
pub struct JudgedIdentifiers {
    judged: HashSet<String>,
    relevant: HashSet<String>,
}

impl JudgedIdentifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, judgement: Judgement) {
        if judgement.score >= MIN_RELEVANT_SCORE {
            self.relevant.insert(judgement.identifier.clone());
        }
        self.judged.insert(judgement.identifier);
    }

    /// Record every judgement of a stream, stopping at the first error
    pub fn extend<I>(&mut self, judgements: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<Judgement>>,
    {
        for judgement in judgements {
            self.record(judgement?);
        }
        Ok(())
    }

    pub fn judged(&self) -> &HashSet<String> {
        &self.judged
    }

    pub fn relevant(&self) -> &HashSet<String> {
        &self.relevant
    }

    pub fn is_relevant(&self, identifier: &str) -> bool {
        self.relevant.contains(identifier)
    }
}

/// Per-dataset counts, for diagnostics only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageStats {
    /// Distinct identifiers judged relevant
    pub relevant: usize,
    /// Distinct identifiers judged at all
    pub judged: usize,
    /// Paragraphs discovered in the corpus
    pub total: usize,
    /// Relevant identifiers that were never discovered in the corpus
    pub relevant_missing: usize,
}

/// "All" and "relevant" position pools of one dataset
#[derive(Debug, Clone)]
pub struct DatasetPartition {
    pub label: char,
    pub positions_all: Vec<f64>,
    pub positions_relevant: Vec<f64>,
    pub coverage: CoverageStats,
}

/// Split the positions of a dataset by relevance
pub fn partition(label: char, judged: &JudgedIdentifiers, triples: &[PositionTriple]) -> DatasetPartition {
    let mut positions_all = Vec::with_capacity(triples.len());
    let mut positions_relevant = Vec::new();
    let mut relevant_found = HashSet::new();

    for triple in triples {
        positions_all.push(triple.position);
        if judged.is_relevant(&triple.identifier) {
            positions_relevant.push(triple.position);
            relevant_found.insert(triple.identifier.as_str());
        }
    }

    let coverage = CoverageStats {
        relevant: judged.relevant().len(),
        judged: judged.judged().len(),
        total: triples.len(),
        relevant_missing: judged.relevant().len() - relevant_found.len(),
    };

    DatasetPartition {
        label,
        positions_all,
        positions_relevant,
        coverage,
    }
}
