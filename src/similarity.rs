use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::StatWeight;
use crate::distance::{DistanceMatrix, factor_distances};
use crate::error::{Result, SimilarityError};
use crate::player::{PlayerId, PlayerTable};

/// Combined weighted similarity for one pool. Higher = more alike.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    ids: Vec<PlayerId>,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    fn zeros(ids: &[PlayerId]) -> Self {
        Self {
            ids: ids.to_vec(),
            scores: vec![0.0; ids.len() * ids.len()],
        }
    }

    pub fn ids(&self) -> &[PlayerId] {
        &self.ids
    }

    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.scores[row * self.ids.len() + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let n = self.ids.len();
        &self.scores[row * n..(row + 1) * n]
    }

    pub fn score(&self, a: PlayerId, b: PlayerId) -> Option<f64> {
        Some(self.get(self.index_of(a)?, self.index_of(b)?))
    }

    pub fn entries(&self) -> &[f64] {
        &self.scores
    }
}

/// Per-statistic notes from one aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticDiagnostics {
    pub statistic: String,
    pub weight: f64,
    /// Every pool member had the same value, so the statistic added a flat `weight`.
    pub uniform: bool,
    /// Entries coerced to 0 because they came out NaN or infinite.
    pub non_finite: usize,
}

#[derive(Debug, Clone)]
pub struct Aggregation {
    pub matrix: SimilarityMatrix,
    pub diagnostics: Vec<StatisticDiagnostics>,
}

impl Aggregation {
    pub fn non_finite(&self) -> usize {
        self.diagnostics.iter().map(|d| d.non_finite).sum()
    }
}

#[derive(Debug, Clone)]
struct ResolvedWeight {
    statistic: String,
    index: usize,
    weight: f64,
}

/// Turns a pool of players into one weighted similarity matrix.
#[derive(Debug, Clone)]
pub struct SimilarityAggregator {
    weights: Vec<ResolvedWeight>,
}

impl SimilarityAggregator {
    /// Resolves each weighted statistic against the table schema.
    pub fn new(weights: &[StatWeight], table: &PlayerTable) -> Result<Self> {
        let mut resolved = Vec::with_capacity(weights.len());
        for w in weights {
            if !w.weight.is_finite() || w.weight < 0.0 {
                return Err(SimilarityError::config(format!(
                    "weight for {} must be a non-negative number, got {}",
                    w.statistic, w.weight
                )));
            }
            let Some(index) = table.statistic_index(&w.statistic) else {
                return Err(SimilarityError::config(format!(
                    "weighted statistic {} is not present in the player table",
                    w.statistic
                )));
            };
            resolved.push(ResolvedWeight {
                statistic: w.statistic.clone(),
                index,
                weight: w.weight,
            });
        }
        Ok(Self { weights: resolved })
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.iter().map(|w| w.weight).sum()
    }

    /// `pool` must be sorted ascending and non-empty, and every id must be in `table`.
    pub fn aggregate(&self, pool: &[PlayerId], table: &PlayerTable) -> Result<Aggregation> {
        if pool.is_empty() {
            return Err(SimilarityError::data("cannot compare an empty pool"));
        }
        if pool.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SimilarityError::data(
                "pool ids must be unique and sorted ascending",
            ));
        }
        if let Some(missing) = pool.iter().find(|id| !table.contains(**id)) {
            return Err(SimilarityError::data(format!(
                "player {missing} is not in the table"
            )));
        }

        // Statistics are independent, so each chunk runs in parallel; only one
        // chunk of n^2 contributions is alive at a time, and chunks are summed
        // in configured order so the result does not depend on thread count.
        let chunk = rayon::current_num_threads().max(1);
        let mut matrix = SimilarityMatrix::zeros(pool);
        let mut diagnostics = Vec::with_capacity(self.weights.len());
        for weights in self.weights.chunks(chunk) {
            let contributions: Vec<(Vec<f64>, StatisticDiagnostics)> = weights
                .par_iter()
                .map(|w| {
                    let distances = factor_distances(pool, |id| {
                        table.get(id).map_or(0.0, |p| table.value(p, w.index))
                    });
                    weighted_contribution(&distances, w)
                })
                .collect();
            for (contribution, diag) in contributions {
                for (acc, v) in matrix.scores.iter_mut().zip(&contribution) {
                    *acc += v;
                }
                diagnostics.push(diag);
            }
        }

        Ok(Aggregation {
            matrix,
            diagnostics,
        })
    }
}

fn weighted_contribution(
    distances: &DistanceMatrix,
    w: &ResolvedWeight,
) -> (Vec<f64>, StatisticDiagnostics) {
    let mut diag = StatisticDiagnostics {
        statistic: w.statistic.clone(),
        weight: w.weight,
        uniform: false,
        non_finite: distances.non_finite(),
    };
    let len = distances.entries().len();
    if w.weight == 0.0 {
        debug!(statistic = %w.statistic, "zero weight, skipped");
        return (vec![0.0; len], diag);
    }

    let Some((min, max)) = distances.min_max() else {
        return (Vec::new(), diag);
    };
    let range = max - min;
    let contribution: Vec<f64> = if range == 0.0 {
        diag.uniform = true;
        vec![w.weight; len]
    } else {
        distances
            .entries()
            .iter()
            .map(|d| {
                let v = (1.0 - (d - min) / range) * w.weight;
                if v.is_nan() {
                    diag.non_finite += 1;
                    0.0
                } else {
                    v
                }
            })
            .collect()
    };

    if diag.non_finite > 0 {
        warn!(
            statistic = %w.statistic,
            entries = diag.non_finite,
            "non-finite distances coerced to zero"
        );
    }
    debug!(statistic = %w.statistic, min, max, uniform = diag.uniform, "scaled");
    (contribution, diag)
}
