use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::{ALL_POSITIONS, SimilarityConfig};
use crate::error::{Result, SimilarityError};
use crate::player::{PlayerId, PlayerTable};
use crate::position_index::{PositionBucket, PositionIndex};
use crate::similarity::{SimilarityAggregator, StatisticDiagnostics};
use crate::top_k::{Neighbor, top_k};

#[derive(Debug, Clone, PartialEq)]
pub struct Comparable {
    pub id: PlayerId,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerComparables {
    pub id: PlayerId,
    pub name: String,
    pub position: String,
    /// Nearest players within the sheet's bucket.
    pub within: Vec<Comparable>,
    /// Nearest players across every position.
    pub overall: Vec<Comparable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionSheet {
    pub label: String,
    /// Ascending by player id.
    pub rows: Vec<PlayerComparables>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketDiagnostics {
    pub label: String,
    pub players: usize,
    pub statistics: Vec<StatisticDiagnostics>,
}

#[derive(Debug, Clone)]
pub struct SimilarityReport {
    /// One per declared position, in declared order.
    pub sheets: Vec<PositionSheet>,
    pub diagnostics: Vec<BucketDiagnostics>,
    pub unassigned: Vec<PlayerId>,
}

impl SimilarityReport {
    pub fn sheet(&self, label: &str) -> Option<&PositionSheet> {
        self.sheets.iter().find(|s| s.label == label)
    }

    pub fn non_finite(&self) -> usize {
        self.diagnostics
            .iter()
            .flat_map(|d| d.statistics.iter())
            .map(|s| s.non_finite)
            .sum()
    }
}

/// Runs the whole comparison. Any structural failure aborts before a report
/// exists, so nothing partial is ever handed to the exporter.
pub fn run(table: &PlayerTable, config: &SimilarityConfig) -> Result<SimilarityReport> {
    config.validate()?;
    let aggregator = SimilarityAggregator::new(&config.weights, table)?;
    let index = PositionIndex::build(table, &config.positions, config.unknown_position)?;

    match config.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads.max(1))
                .build()
                .map_err(|err| SimilarityError::config(format!("thread pool: {err}")))?;
            pool.install(|| run_with_index(table, config, &aggregator, &index))
        }
        None => run_with_index(table, config, &aggregator, &index),
    }
}

fn run_with_index(
    table: &PlayerTable,
    config: &SimilarityConfig,
    aggregator: &SimilarityAggregator,
    index: &PositionIndex,
) -> Result<SimilarityReport> {
    let mut diagnostics = Vec::new();

    let all = index.all();
    let (overall, all_diag) = compare_bucket(table, aggregator, all, config.top_k)?;
    diagnostics.push(all_diag);

    let mut within_by_label: HashMap<&str, HashMap<PlayerId, Vec<Comparable>>> = HashMap::new();
    for bucket in index.buckets() {
        if bucket.is_empty() {
            return Err(SimilarityError::data(format!(
                "position {} has no players",
                bucket.label
            )));
        }
        let (within, diag) = compare_bucket(table, aggregator, bucket, config.top_k)?;
        diagnostics.push(diag);
        within_by_label.insert(bucket.label.as_str(), within);
    }

    let mut sheets = Vec::with_capacity(config.positions.len());
    for label in &config.positions {
        if sheets.iter().any(|s: &PositionSheet| &s.label == label) {
            continue;
        }
        let bucket = index
            .get(label)
            .ok_or_else(|| SimilarityError::config(format!("position {label} has no bucket")))?;
        let within = if label == ALL_POSITIONS {
            &overall
        } else {
            within_by_label
                .get(label.as_str())
                .ok_or_else(|| SimilarityError::data(format!("position {label} was not compared")))?
        };
        let mut rows = Vec::with_capacity(bucket.len());
        for id in &bucket.ids {
            let player = table
                .get(*id)
                .ok_or_else(|| SimilarityError::data(format!("player {id} is not in the table")))?;
            rows.push(PlayerComparables {
                id: *id,
                name: player.name.clone(),
                position: player.position.clone(),
                within: within.get(id).cloned().unwrap_or_default(),
                overall: overall.get(id).cloned().unwrap_or_default(),
            });
        }
        sheets.push(PositionSheet {
            label: label.clone(),
            rows,
        });
    }

    Ok(SimilarityReport {
        sheets,
        diagnostics,
        unassigned: index.unassigned().to_vec(),
    })
}

/// Builds one bucket's matrix, extracts every member's neighbors, then drops
/// the matrix.
fn compare_bucket(
    table: &PlayerTable,
    aggregator: &SimilarityAggregator,
    bucket: &PositionBucket,
    k: usize,
) -> Result<(HashMap<PlayerId, Vec<Comparable>>, BucketDiagnostics)> {
    let started = Instant::now();
    info!(position = %bucket.label, players = bucket.len(), "comparing players");

    let aggregation = aggregator
        .aggregate(&bucket.ids, table)
        .map_err(|err| bucket_error(&bucket.label, err))?;

    let mut neighbors = HashMap::with_capacity(bucket.len());
    for id in &bucket.ids {
        let top = top_k(&aggregation.matrix, *id, bucket, k)?;
        neighbors.insert(*id, named(table, &top)?);
    }
    debug!(position = %bucket.label, players = neighbors.len(), "neighbors extracted");

    info!(
        position = %bucket.label,
        elapsed_ms = started.elapsed().as_millis() as u64,
        non_finite = aggregation.non_finite(),
        "position done"
    );
    Ok((
        neighbors,
        BucketDiagnostics {
            label: bucket.label.clone(),
            players: bucket.len(),
            statistics: aggregation.diagnostics,
        },
    ))
}

fn named(table: &PlayerTable, top: &[Neighbor]) -> Result<Vec<Comparable>> {
    top.iter()
        .map(|n| {
            let player = table.get(n.id).ok_or_else(|| {
                SimilarityError::data(format!("player {} is not in the table", n.id))
            })?;
            Ok(Comparable {
                id: n.id,
                name: player.name.clone(),
                score: n.score,
            })
        })
        .collect()
}

fn bucket_error(label: &str, err: SimilarityError) -> SimilarityError {
    match err {
        SimilarityError::Data(msg) => SimilarityError::data(format!("position {label}: {msg}")),
        other => other,
    }
}
