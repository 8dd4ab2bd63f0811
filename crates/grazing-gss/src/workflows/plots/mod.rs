//! Plot upload extraction: resolves indicator columns from a CSV export or a
//! spreadsheet workbook and validates every row into a typed [`PlotTable`]
//! before any numeric work.

pub mod domain;
mod mapping;
mod normalizer;
mod parser;
mod workbook;

pub use domain::{GeoPoint, Indicator, IndicatorValues, PlotId, PlotRecord, PlotTable};

use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Failure to turn an upload into a [`PlotTable`]. No partial table is produced.
#[derive(Debug, thiserror::Error)]
pub enum PlotImportError {
    #[error("failed to read plot upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid plot CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid plot workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("plot workbook has no worksheets")]
    EmptyWorkbook,
    #[error("missing required column(s): {}", .columns.join(", "))]
    MissingColumn { columns: Vec<&'static str> },
    #[error("row {row}: column '{column}' has non-numeric value '{value}'")]
    NonNumericValue {
        column: &'static str,
        row: usize,
        value: String,
    },
    #[error("row {row}: column '{column}' is blank")]
    MissingValue { column: &'static str, row: usize },
    #[error("row {row}: plot identifier is blank")]
    EmptyIdentifier { row: usize },
    #[error("row {row}: duplicate plot identifier '{plot_id}'")]
    DuplicatePlotId { plot_id: PlotId, row: usize },
}

pub struct PlotImporter;

impl PlotImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<PlotTable, PlotImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<PlotTable, PlotImportError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(bytes)
    }

    /// Workbooks (`.xlsx`, `.xls`, `.ods`) are recognised by their container
    /// signature; anything else is read as CSV.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<PlotTable, PlotImportError> {
        let is_workbook = workbook::is_workbook(&bytes);
        let table = if is_workbook {
            workbook::parse_workbook(bytes)?
        } else {
            parser::parse_plots(bytes.as_slice())?
        };
        debug!(
            plots = table.len(),
            has_coordinates = table.has_coordinates(),
            workbook = is_workbook,
            "plot upload parsed"
        );
        Ok(table)
    }
}
