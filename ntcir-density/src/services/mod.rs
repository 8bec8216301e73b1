//! Position and relevance services
//!
//! Leaf-first: the resolver and the judgement extractor are pure; the corpus
//! walker reads the file system; the collector runs the resolver over a whole
//! dataset; the partitioner joins positions with judgements.

pub mod corpus_walker;
pub mod judgement_extractor;
pub mod position_collector;
pub mod position_resolver;
pub mod relevance_partitioner;

pub use corpus_walker::{CorpusWalker, ParagraphEntry, WalkError, PARAGRAPH_ARCHIVE_SUFFIX};
pub use judgement_extractor::{Judgement, JudgementReader};
pub use position_collector::{PositionCollector, PositionTriple};
pub use position_resolver::{paragraph_number, resolve_position};
pub use relevance_partitioner::{
    partition, CoverageStats, DatasetPartition, JudgedIdentifiers, MIN_RELEVANT_SCORE,
};
