use crate::error::{Result, SimilarityError};
use crate::player::PlayerId;
use crate::position_index::PositionBucket;
use crate::similarity::SimilarityMatrix;

pub const DEFAULT_K: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: PlayerId,
    pub score: f64,
}

pub fn top5(
    matrix: &SimilarityMatrix,
    subject: PlayerId,
    candidates: &PositionBucket,
) -> Result<Vec<Neighbor>> {
    top_k(matrix, subject, candidates, DEFAULT_K)
}

/// Ranks `subject`'s row by descending score over the candidate bucket.
///
/// The subject is filtered out by identifier, never by position in the
/// ranking, so duplicate maximum scores cannot push it into the result.
/// Exact ties keep matrix column order (ascending identifier).
pub fn top_k(
    matrix: &SimilarityMatrix,
    subject: PlayerId,
    candidates: &PositionBucket,
    k: usize,
) -> Result<Vec<Neighbor>> {
    let row = matrix.index_of(subject).ok_or_else(|| {
        SimilarityError::data(format!(
            "player {subject} is not in the {} matrix",
            candidates.label
        ))
    })?;

    let mut ranked: Vec<Neighbor> = matrix
        .ids()
        .iter()
        .zip(matrix.row(row))
        .filter(|(id, _)| **id != subject && candidates.contains(**id))
        .map(|(id, score)| Neighbor { id: *id, score: *score })
        .collect();
    // Stable, so equal scores stay in column order.
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(k);
    Ok(ranked)
}
