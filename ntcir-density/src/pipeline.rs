//! End-to-end estimation run
//!
//! 1. Read judgements into per-dataset judged/relevant sets
//! 2. Collect and partition positions, one dataset at a time
//! 3. Log coverage, fit the estimators, persist them
//!
//! Datasets are processed sequentially; parallelism lives inside the position
//! collector. Fitting starts only after every dataset is collected.

use crate::density::EstimatorBundle;
use crate::services::{
    partition, CorpusWalker, DatasetPartition, JudgedIdentifiers, JudgementReader,
    PositionCollector,
};
use ntcir_common::{Result, RunConfig};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub bundle: EstimatorBundle,
    pub output_file: PathBuf,
}

/// Judged and relevant identifiers for every dataset label
///
/// Several judgement files may target the same dataset; their sets are merged.
pub fn read_judged_identifiers(config: &RunConfig) -> Result<HashMap<char, JudgedIdentifiers>> {
    let mut by_label: HashMap<char, JudgedIdentifiers> = HashMap::new();

    for source in config.judgements() {
        info!(
            "Retrieving judged paragraph identifiers, and scores from {}",
            source.path.display()
        );
        by_label
            .entry(source.label)
            .or_default()
            .extend(JudgementReader::open(&source.path)?)?;
    }

    Ok(by_label)
}

/// Collect and partition the positions of every dataset
pub fn collect_partitions(
    config: &RunConfig,
    judged: &HashMap<char, JudgedIdentifiers>,
) -> Result<Vec<DatasetPartition>> {
    let collector = PositionCollector::new(CorpusWalker::new(), config.num_workers);
    let unjudged = JudgedIdentifiers::new();

    let mut partitions = Vec::with_capacity(config.datasets().len());
    for dataset in config.datasets() {
        info!(
            "Retrieving all paragraph identifiers, and positions from {}",
            dataset.name()
        );
        let dataset_judged = judged.get(&dataset.label).unwrap_or_else(|| {
            warn!(
                "No judgements for dataset {}, none of its paragraphs will count as relevant",
                dataset
            );
            &unjudged
        });

        let triples = collector.collect(dataset)?;
        partitions.push(partition(dataset.label, dataset_judged, &triples));
    }

    Ok(partitions)
}

fn log_coverage(config: &RunConfig, partitions: &[DatasetPartition]) {
    for (dataset, partition) in config.datasets().iter().zip(partitions) {
        let stats = partition.coverage;
        info!(
            dataset = %dataset.label,
            "{} / {} / {} relevant / judged / total identifiers in dataset {}",
            stats.relevant,
            stats.judged,
            stats.total,
            dataset.name()
        );
        if stats.relevant_missing > 0 {
            warn!(
                dataset = %dataset.label,
                "{} relevant identifiers were not found in dataset {}",
                stats.relevant_missing,
                dataset.name()
            );
        }
    }
}

/// Fit the estimators without writing anything
pub fn estimate(config: &RunConfig) -> Result<EstimatorBundle> {
    let judged = read_judged_identifiers(config)?;
    let partitions = collect_partitions(config, &judged)?;
    log_coverage(config, &partitions);

    info!("Fitting density, and probability estimators");
    EstimatorBundle::fit(&partitions)
}

/// Validate inputs, fit the estimators and persist them
pub fn run(config: &RunConfig) -> Result<RunReport> {
    config.validate_paths()?;

    let bundle = estimate(config)?;
    info!(
        prior_relevant = bundle.prior_relevant,
        "Writing estimators to {}",
        config.output_file.display()
    );
    bundle.save(&config.output_file)?;

    Ok(RunReport {
        bundle,
        output_file: config.output_file.clone(),
    })
}
