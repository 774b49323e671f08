use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimilarityError};

pub const ALL_POSITIONS: &str = "ALL";

const DEFAULT_POSITIONS: &[&str] = &["1B", "2B", "3B", "SS", "OF", "C", "DH", ALL_POSITIONS];
const DEFAULT_STATISTICS: &[&str] = &[
    "G", "AB", "R", "H", "2B", "3B", "HR", "RBI", "SB", "CS", "BB", "SO", "SH", "SF", "HBP",
    "AVG", "OBP", "SLG", "OPS",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatWeight {
    pub statistic: String,
    // Higher weight = more impact on the combined score; 0 removes the statistic.
    pub weight: f64,
}

impl StatWeight {
    pub fn new(statistic: impl Into<String>, weight: f64) -> Self {
        Self {
            statistic: statistic.into(),
            weight,
        }
    }
}

/// What to do with a player whose position is not one of the declared labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPositionPolicy {
    /// Keep the player in the ALL bucket only.
    #[default]
    AllOnly,
    /// Abort with a data error.
    Reject,
}

impl UnknownPositionPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "all" | "all_only" | "all-only" => Some(Self::AllOnly),
            "reject" | "error" => Some(Self::Reject),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub positions: Vec<String>,
    pub weights: Vec<StatWeight>,
    pub top_k: usize,
    pub unknown_position: UnknownPositionPolicy,
    pub threads: Option<usize>,
    pub input: PathBuf,
    pub output: PathBuf,
    pub include_scores: bool,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            positions: DEFAULT_POSITIONS.iter().map(|p| p.to_string()).collect(),
            weights: DEFAULT_STATISTICS
                .iter()
                .map(|stat| StatWeight::new(*stat, 1.0))
                .collect(),
            top_k: 5,
            unknown_position: UnknownPositionPolicy::AllOnly,
            threads: None,
            input: PathBuf::from("mlb_2017_stats.csv"),
            output: PathBuf::from("mlb_similar_players.xlsx"),
            include_scores: false,
        }
    }
}

impl SimilarityConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| SimilarityError::config(format!("invalid config json: {err}")))
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| SimilarityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(path) = non_empty_env("MLB_SIM_INPUT") {
            self.input = PathBuf::from(path);
        }
        if let Some(path) = non_empty_env("MLB_SIM_OUTPUT") {
            self.output = PathBuf::from(path);
        }
        if let Some(threads) = env::var("MLB_SIM_THREADS")
            .ok()
            .and_then(|val| val.trim().parse::<usize>().ok())
        {
            self.threads = Some(threads.clamp(1, 64));
        }
        if let Some(policy) = env::var("MLB_SIM_UNKNOWN_POSITION")
            .ok()
            .and_then(|val| UnknownPositionPolicy::parse(&val))
        {
            self.unknown_position = policy;
        }
        if let Some(flag) = non_empty_env("MLB_SIM_INCLUDE_SCORES") {
            self.include_scores = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.positions.is_empty() {
            return Err(SimilarityError::config("position list is empty"));
        }
        if self.top_k == 0 {
            return Err(SimilarityError::config("top_k must be at least 1"));
        }
        let mut seen = HashSet::new();
        for w in &self.weights {
            if !w.weight.is_finite() || w.weight < 0.0 {
                return Err(SimilarityError::config(format!(
                    "weight for {} must be a non-negative number, got {}",
                    w.statistic, w.weight
                )));
            }
            if !seen.insert(w.statistic.as_str()) {
                return Err(SimilarityError::config(format!(
                    "statistic {} is weighted more than once",
                    w.statistic
                )));
            }
        }
        Ok(())
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.iter().map(|w| w.weight).sum()
    }

    /// Declared labels other than the ALL pseudo-position.
    pub fn position_labels(&self) -> impl Iterator<Item = &str> {
        self.positions
            .iter()
            .map(String::as_str)
            .filter(|p| *p != ALL_POSITIONS)
    }

    pub fn set_weight(&mut self, statistic: &str, weight: f64) {
        match self.weights.iter_mut().find(|w| w.statistic == statistic) {
            Some(w) => w.weight = weight,
            None => self.weights.push(StatWeight::new(statistic, weight)),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
