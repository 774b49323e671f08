use std::collections::HashMap;

use crate::error::{Result, SimilarityError};

pub type PlayerId = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: String,
    values: Vec<f64>,
}

impl Player {
    /// Values in the owning table's statistic order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Players keyed by identifier with a fixed statistic schema.
///
/// The schema is set once; every stored player carries one value per
/// statistic, with absent and non-finite inputs stored as 0.0.
#[derive(Debug, Clone, Default)]
pub struct PlayerTable {
    statistics: Vec<String>,
    stat_index: HashMap<String, usize>,
    players: Vec<Player>,
    by_id: HashMap<PlayerId, usize>,
}

impl PlayerTable {
    pub fn new<S: Into<String>>(statistics: impl IntoIterator<Item = S>) -> Self {
        let statistics: Vec<String> = statistics.into_iter().map(Into::into).collect();
        let stat_index = statistics
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        Self {
            statistics,
            stat_index,
            players: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    pub fn insert<S: AsRef<str>>(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
        position: impl Into<String>,
        values: impl IntoIterator<Item = (S, f64)>,
    ) -> Result<()> {
        if self.by_id.contains_key(&id) {
            return Err(SimilarityError::data(format!("duplicate player id {id}")));
        }
        let mut row = vec![0.0; self.statistics.len()];
        for (stat, value) in values {
            let stat = stat.as_ref();
            let Some(idx) = self.stat_index.get(stat).copied() else {
                return Err(SimilarityError::data(format!(
                    "player {id}: statistic {stat} is not in the table schema"
                )));
            };
            row[idx] = if value.is_finite() { value } else { 0.0 };
        }
        self.by_id.insert(id, self.players.len());
        self.players.push(Player {
            id,
            name: name.into(),
            position: position.into(),
            values: row,
        });
        Ok(())
    }

    pub fn statistics(&self) -> &[String] {
        &self.statistics
    }

    pub fn statistic_index(&self, name: &str) -> Option<usize> {
        self.stat_index.get(name).copied()
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.by_id.get(&id).map(|idx| &self.players[*idx])
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Players in insertion order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn ids_sorted(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids
    }

    pub fn value(&self, player: &Player, statistic: usize) -> f64 {
        player.values.get(statistic).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_nan_values_become_zero() {
        let mut table = PlayerTable::new(["HR", "AVG"]);
        table.insert(7, "Slugger", "1B", [("HR", f64::NAN)]).unwrap();
        let p = table.get(7).unwrap();
        assert_eq!(p.values(), &[0.0, 0.0]);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut table = PlayerTable::new(["HR"]);
        table.insert(1, "A", "C", [("HR", 1.0)]).unwrap();
        let err = table.insert(1, "B", "C", [("HR", 2.0)]).unwrap_err();
        assert!(err.is_data());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn unknown_statistic_rejected() {
        let mut table = PlayerTable::new(["HR"]);
        assert!(table.insert(1, "A", "C", [("XBH", 3.0)]).is_err());
    }

    #[test]
    fn ids_sorted_ignores_insert_order() {
        let mut table = PlayerTable::new(["HR"]);
        for id in [9, 2, 5] {
            table.insert(id, format!("P{id}"), "OF", [("HR", 1.0)]).unwrap();
        }
        assert_eq!(table.ids_sorted(), vec![2, 5, 9]);
    }
}
