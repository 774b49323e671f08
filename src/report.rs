use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::config::ALL_POSITIONS;
use crate::pipeline::{Comparable, PlayerComparables, PositionSheet, SimilarityReport};

const TITLE: &str = "Top 5 Most Similar Players";
const SLOTS: usize = 5;

pub struct ExportReport {
    pub sheets: usize,
    pub rows: usize,
    pub short_rows: usize,
}

pub struct ExportProgress {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

pub fn export_workbook(
    path: &Path,
    report: &SimilarityReport,
    include_scores: bool,
) -> Result<ExportReport> {
    export_workbook_with_progress(path, report, include_scores, |_| {})
}

pub fn export_workbook_with_progress(
    path: &Path,
    report: &SimilarityReport,
    include_scores: bool,
    mut on_progress: impl FnMut(ExportProgress),
) -> Result<ExportReport> {
    let total = report.sheets.len();
    let mut rows_written = 0usize;
    let mut short_rows = 0usize;

    let mut workbook = Workbook::new();
    for (current, sheet) in report.sheets.iter().enumerate() {
        on_progress(ExportProgress {
            current,
            total,
            message: format!("Creating {} worksheet", sheet.label),
        });

        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.label)
            .with_context(|| format!("invalid sheet name {:?}", sheet.label))?;
        write_sheet(worksheet, sheet, include_scores)
            .with_context(|| format!("write {} sheet", sheet.label))?;

        rows_written += sheet.rows.len();
        short_rows += sheet
            .rows
            .iter()
            .filter(|row| neighbors_for(sheet, row).len() < SLOTS)
            .count();
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    on_progress(ExportProgress {
        current: total,
        total,
        message: "Workbook saved".to_string(),
    });

    Ok(ExportReport {
        sheets: total,
        rows: rows_written,
        short_rows,
    })
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &PositionSheet,
    include_scores: bool,
) -> Result<()> {
    worksheet.write_string(0, 1, TITLE).context("write title")?;
    write_rows(worksheet, 1, &[header_row(include_scores)])?;

    let rows: Vec<Vec<String>> = sheet
        .rows
        .iter()
        .map(|row| player_row(sheet, row))
        .collect();
    write_rows(worksheet, 2, &rows)?;

    if include_scores {
        for (offset, row) in sheet.rows.iter().enumerate() {
            for (slot, comp) in neighbors_for(sheet, row).iter().take(SLOTS).enumerate() {
                let col = (1 + SLOTS + slot) as u16;
                worksheet
                    .write_number((2 + offset) as u32, col, comp.score)
                    .with_context(|| format!("write score ({},{col})", 2 + offset))?;
            }
        }
    }
    Ok(())
}

fn header_row(include_scores: bool) -> Vec<String> {
    let mut row = vec!["Player".to_string()];
    row.extend((1..=SLOTS).map(|slot| slot.to_string()));
    if include_scores {
        row.extend((1..=SLOTS).map(|slot| format!("Score {slot}")));
    }
    row
}

// The ALL sheet lists cross-position neighbors; the others stay within position.
fn neighbors_for<'a>(sheet: &PositionSheet, row: &'a PlayerComparables) -> &'a [Comparable] {
    if sheet.label == ALL_POSITIONS {
        &row.overall
    } else {
        &row.within
    }
}

fn player_row(sheet: &PositionSheet, row: &PlayerComparables) -> Vec<String> {
    let mut out = vec![row.name.clone()];
    out.extend(
        neighbors_for(sheet, row)
            .iter()
            .take(SLOTS)
            .map(|comp| comp.name.clone()),
    );
    out
}

fn write_rows(worksheet: &mut Worksheet, first_row: u32, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = first_row + row_idx as u32;
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_num, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_num},{col_idx})"))?;
        }
    }
    Ok(())
}
