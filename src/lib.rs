pub mod config;
pub mod distance;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod player;
pub mod position_index;
pub mod report;
pub mod similarity;
pub mod synthetic;
pub mod top_k;

pub use config::{SimilarityConfig, StatWeight, UnknownPositionPolicy};
pub use error::{Result, SimilarityError};
pub use player::{Player, PlayerId, PlayerTable};
