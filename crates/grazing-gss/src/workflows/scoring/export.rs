use super::ScoredTable;
use crate::workflows::plots::Indicator;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

/// Which columns a download carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportView {
    #[default]
    Full,
    Minimal,
}

impl ExportView {
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Full => "gss_results_full.csv",
            Self::Minimal => "gss_results_minimal.csv",
        }
    }
}

impl FromStr for ExportView {
    type Err = UnknownExportView;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" | "all" => Ok(Self::Full),
            "minimal" | "min" => Ok(Self::Minimal),
            other => Err(UnknownExportView(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown export view '{0}' (expected 'full' or 'minimal')")]
pub struct UnknownExportView(pub String);

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode CSV export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write CSV export: {0}")]
    Io(#[from] std::io::Error),
}

const PLOT_ID_HEADER: &str = "Plot Name";
const SCORE_HEADER: &str = "GSS";
const BAND_HEADER: &str = "Suitability Band";
const DIAGNOSIS_HEADER: &str = "Diagnosis";

pub fn write_csv<W: Write>(
    table: &ScoredTable,
    view: ExportView,
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    match view {
        ExportView::Full => write_full(table, &mut csv_writer)?,
        ExportView::Minimal => write_minimal(table, &mut csv_writer)?,
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(table: &ScoredTable, view: ExportView) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::new();
    write_csv(table, view, &mut buffer)?;
    Ok(buffer)
}

fn write_full<W: Write>(
    table: &ScoredTable,
    csv_writer: &mut csv::Writer<W>,
) -> Result<(), csv::Error> {
    let with_coordinates = table.has_coordinates();

    let mut header = vec![PLOT_ID_HEADER];
    header.extend(Indicator::ALL.iter().map(|indicator| indicator.column_name()));
    if with_coordinates {
        header.extend(["latitude", "longitude"]);
    }
    header.extend(
        Indicator::ALL
            .iter()
            .map(|indicator| indicator.scaled_column_name()),
    );
    header.extend([SCORE_HEADER, BAND_HEADER, DIAGNOSIS_HEADER]);
    csv_writer.write_record(&header)?;

    for plot in table.plots() {
        let mut row = vec![plot.record.plot_id.0.clone()];
        row.extend(
            Indicator::ALL
                .iter()
                .map(|indicator| plot.record.indicators.get(*indicator).to_string()),
        );
        if with_coordinates {
            match plot.record.location {
                Some(point) => {
                    row.push(point.latitude.to_string());
                    row.push(point.longitude.to_string());
                }
                None => row.extend([String::new(), String::new()]),
            }
        }
        row.extend(
            Indicator::ALL
                .iter()
                .map(|indicator| format_score(plot.oriented.get(*indicator))),
        );
        row.push(format_score(plot.score));
        row.push(plot.diagnosis.band.label().to_string());
        row.push(plot.diagnosis.label.to_string());
        csv_writer.write_record(&row)?;
    }

    Ok(())
}

fn write_minimal<W: Write>(
    table: &ScoredTable,
    csv_writer: &mut csv::Writer<W>,
) -> Result<(), csv::Error> {
    csv_writer.write_record([PLOT_ID_HEADER, SCORE_HEADER, DIAGNOSIS_HEADER])?;
    for plot in table.plots() {
        csv_writer.write_record([
            plot.record.plot_id.0.as_str(),
            format_score(plot.score).as_str(),
            plot.diagnosis.label,
        ])?;
    }
    Ok(())
}

fn format_score(value: f64) -> String {
    format!("{value:.4}")
}
