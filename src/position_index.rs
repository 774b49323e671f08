use tracing::warn;

use crate::config::{ALL_POSITIONS, UnknownPositionPolicy};
use crate::error::{Result, SimilarityError};
use crate::player::{PlayerId, PlayerTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionBucket {
    pub label: String,
    /// Sorted ascending.
    pub ids: Vec<PlayerId>,
}

impl PositionBucket {
    pub fn contains(&self, id: PlayerId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Position label -> player ids, plus the ALL bucket.
#[derive(Debug, Clone)]
pub struct PositionIndex {
    buckets: Vec<PositionBucket>,
    all: PositionBucket,
    unassigned: Vec<PlayerId>,
}

impl PositionIndex {
    pub fn build(
        table: &PlayerTable,
        positions: &[String],
        policy: UnknownPositionPolicy,
    ) -> Result<Self> {
        if positions.is_empty() {
            return Err(SimilarityError::config("position list is empty"));
        }

        let mut buckets: Vec<PositionBucket> = Vec::new();
        for label in positions.iter().filter(|p| p.as_str() != ALL_POSITIONS) {
            if buckets.iter().any(|b| &b.label == label) {
                continue;
            }
            buckets.push(PositionBucket {
                label: label.clone(),
                ids: Vec::new(),
            });
        }

        let mut unassigned = Vec::new();
        for player in table.players() {
            match buckets.iter_mut().find(|b| b.label == player.position) {
                Some(bucket) => bucket.ids.push(player.id),
                None => match policy {
                    UnknownPositionPolicy::AllOnly => unassigned.push(player.id),
                    UnknownPositionPolicy::Reject => {
                        return Err(SimilarityError::data(format!(
                            "player {} ({}) has undeclared position {:?}",
                            player.id, player.name, player.position
                        )));
                    }
                },
            }
        }

        for bucket in &mut buckets {
            bucket.ids.sort_unstable();
        }
        unassigned.sort_unstable();
        if !unassigned.is_empty() {
            warn!(
                count = unassigned.len(),
                "players with undeclared positions are compared in ALL only"
            );
        }

        Ok(Self {
            buckets,
            all: PositionBucket {
                label: ALL_POSITIONS.to_string(),
                ids: table.ids_sorted(),
            },
            unassigned,
        })
    }

    /// Declared position buckets in declared order, excluding ALL.
    pub fn buckets(&self) -> &[PositionBucket] {
        &self.buckets
    }

    pub fn all(&self) -> &PositionBucket {
        &self.all
    }

    pub fn get(&self, label: &str) -> Option<&PositionBucket> {
        if label == ALL_POSITIONS {
            return Some(&self.all);
        }
        self.buckets.iter().find(|b| b.label == label)
    }

    /// Players whose position is not a declared label.
    pub fn unassigned(&self) -> &[PlayerId] {
        &self.unassigned
    }
}
