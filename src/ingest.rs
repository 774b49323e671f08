// Season stats CSV loading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SimilarityError};
use crate::player::{PlayerId, PlayerTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSpec {
    /// Identifier column; the data row number is used when absent.
    pub id: Option<String>,
    pub name: String,
    pub position: String,
    /// Statistic columns to read. When unset, every column whose non-empty
    /// cells are all numeric is read and text columns (team, league, ...)
    /// are skipped.
    pub statistics: Option<Vec<String>>,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            id: None,
            name: "Player Name".to_string(),
            position: "Pos".to_string(),
            statistics: None,
        }
    }
}

impl ColumnSpec {
    pub fn with_statistics<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.statistics = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

pub fn read_player_table(path: &Path, columns: &ColumnSpec) -> Result<PlayerTable> {
    let file = File::open(path).map_err(|source| SimilarityError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_player_table_from_reader(file, columns).map_err(|err| match err {
        SimilarityError::CsvRead(source) => SimilarityError::Csv {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

pub fn read_player_table_from_reader<R: Read>(
    rdr: R,
    columns: &ColumnSpec,
) -> Result<PlayerTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(rdr);
    let headers = reader.headers()?.clone();
    let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

    let find = |name: &str| headers.iter().position(|h| h == name);
    let name_col = find(&columns.name)
        .ok_or_else(|| SimilarityError::data(format!("missing column {}", columns.name)))?;
    let pos_col = find(&columns.position)
        .ok_or_else(|| SimilarityError::data(format!("missing column {}", columns.position)))?;
    let id_col = match columns.id.as_deref() {
        Some(id) => Some(
            find(id).ok_or_else(|| SimilarityError::data(format!("missing column {id}")))?,
        ),
        None => None,
    };

    let stat_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != name_col && *idx != pos_col && Some(*idx) != id_col)
        .filter(|(idx, header)| match columns.statistics.as_deref() {
            Some(wanted) => wanted.iter().any(|w| w == *header),
            None => is_numeric_column(&records, *idx, header),
        })
        .map(|(idx, h)| (idx, h.to_string()))
        .collect();

    let mut table = PlayerTable::new(stat_cols.iter().map(|(_, h)| h.clone()));
    for (row_idx, record) in records.iter().enumerate() {
        let id = match id_col {
            Some(col) => parse_id(record.get(col).unwrap_or(""), row_idx)?,
            None => PlayerId::try_from(row_idx)
                .map_err(|_| SimilarityError::data(format!("row {row_idx}: too many rows")))?,
        };
        let name = record.get(name_col).unwrap_or("");
        let position = record.get(pos_col).unwrap_or("");

        let mut values = Vec::with_capacity(stat_cols.len());
        for (col, header) in &stat_cols {
            let raw = record.get(*col).unwrap_or("");
            values.push((header.as_str(), parse_stat(raw, row_idx, header)?));
        }
        table.insert(id, name, position, values)?;
    }

    debug!(
        players = table.len(),
        statistics = table.statistics().len(),
        "loaded player table"
    );
    Ok(table)
}

fn is_numeric_column(records: &[csv::StringRecord], col: usize, header: &str) -> bool {
    let numeric = records
        .iter()
        .all(|record| parse_stat(record.get(col).unwrap_or(""), 0, header).is_ok());
    if !numeric {
        debug!(column = header, "skipping text column");
    }
    numeric
}

fn parse_id(raw: &str, row_idx: usize) -> Result<PlayerId> {
    if raw.is_empty() {
        return Err(SimilarityError::data(format!(
            "row {row_idx}: missing player identifier"
        )));
    }
    raw.parse::<PlayerId>().map_err(|_| {
        SimilarityError::data(format!("row {row_idx}: invalid player identifier {raw:?}"))
    })
}

// Empty cells and dashes are treated as zero.
fn parse_stat(raw: &str, row_idx: usize, header: &str) -> Result<f64> {
    if raw.is_empty() || raw == "-" {
        return Ok(0.0);
    }
    let cleaned = raw.replace(',', "");
    cleaned.parse::<f64>().map_err(|_| {
        SimilarityError::data(format!(
            "row {row_idx}: column {header} has non-numeric value {raw:?}"
        ))
    })
}
