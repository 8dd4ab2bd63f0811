use super::domain::{GeoPoint, Indicator, IndicatorValues, PlotId, PlotRecord, PlotTable};
use super::mapping::{role_for_header, ColumnRole};
use super::PlotImportError;
use csv::StringRecord;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use tracing::debug;

/// Column positions resolved from the upload's header row.
#[derive(Debug)]
pub(crate) struct ResolvedColumns {
    plot_id: usize,
    /// Positions of the indicator columns, in `Indicator::ALL` order.
    indicators: [usize; 4],
    latitude: Option<usize>,
    longitude: Option<usize>,
}

impl ResolvedColumns {
    fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

pub(crate) fn resolve_columns(headers: &StringRecord) -> Result<ResolvedColumns, PlotImportError> {
    let mut positions: HashMap<ColumnRole, usize> = HashMap::new();
    for (position, header) in headers.iter().enumerate() {
        if let Some(role) = role_for_header(header) {
            // First matching header wins when an upload repeats a column.
            positions.entry(role).or_insert(position);
        }
    }

    let missing: Vec<&'static str> = ColumnRole::REQUIRED
        .iter()
        .filter(|role| !positions.contains_key(role))
        .map(|role| role.canonical_name())
        .collect();
    if !missing.is_empty() {
        return Err(PlotImportError::MissingColumn { columns: missing });
    }

    let required = |role: ColumnRole| {
        positions
            .get(&role)
            .copied()
            .ok_or_else(|| PlotImportError::MissingColumn {
                columns: vec![role.canonical_name()],
            })
    };

    Ok(ResolvedColumns {
        plot_id: required(ColumnRole::PlotId)?,
        indicators: [
            required(ColumnRole::Indicator(Indicator::Biomass))?,
            required(ColumnRole::Indicator(Indicator::ShrubCover))?,
            required(ColumnRole::Indicator(Indicator::GrazingPressure))?,
            required(ColumnRole::Indicator(Indicator::WoodyCount))?,
        ],
        latitude: positions.get(&ColumnRole::Latitude).copied(),
        longitude: positions.get(&ColumnRole::Longitude).copied(),
    })
}

pub(crate) fn parse_plots<R: Read>(reader: R) -> Result<PlotTable, PlotImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    // Rows are numbered by the file line they start on.
    let rows = csv_reader.into_records().map(|result| -> Result<_, PlotImportError> {
        let row = result?;
        let line = row
            .position()
            .map(|position| position.line() as usize)
            .unwrap_or_default();
        Ok((line, row))
    });

    build_table(&headers, rows)
}

/// Validates numbered rows against the resolved header into a table.
pub(crate) fn build_table<I>(headers: &StringRecord, rows: I) -> Result<PlotTable, PlotImportError>
where
    I: IntoIterator<Item = Result<(usize, StringRecord), PlotImportError>>,
{
    let columns = resolve_columns(headers)?;

    let mut records = Vec::new();
    let mut seen: HashSet<PlotId> = HashSet::new();

    for result in rows {
        let (row_number, row) = result?;
        if row.iter().all(|cell| cell.is_empty()) {
            debug!(row = row_number, "skipping blank plot row");
            continue;
        }

        let record = parse_row(&row, row_number, &columns)?;
        if !seen.insert(record.plot_id.clone()) {
            return Err(PlotImportError::DuplicatePlotId {
                plot_id: record.plot_id,
                row: row_number,
            });
        }
        records.push(record);
    }

    Ok(PlotTable::new(records, columns.has_coordinates()))
}

fn parse_row(
    row: &StringRecord,
    row_number: usize,
    columns: &ResolvedColumns,
) -> Result<PlotRecord, PlotImportError> {
    let plot_id = row.get(columns.plot_id).unwrap_or_default();
    if plot_id.is_empty() {
        return Err(PlotImportError::EmptyIdentifier { row: row_number });
    }

    let mut values = [0.0; 4];
    for (slot, (indicator, position)) in values
        .iter_mut()
        .zip(Indicator::ALL.iter().zip(columns.indicators))
    {
        let cell = row.get(position).unwrap_or_default();
        *slot = parse_indicator(cell, indicator.column_name(), row_number)?;
    }
    let [biomass, shrub_pct, grazing_pressure, woody_count] = values;
    let indicators = IndicatorValues {
        biomass,
        shrub_pct,
        grazing_pressure,
        woody_count,
    };

    let location = match (columns.latitude, columns.longitude) {
        (Some(lat), Some(lon)) => parse_location(row.get(lat), row.get(lon), row_number),
        _ => None,
    };

    Ok(PlotRecord {
        plot_id: PlotId(plot_id.to_string()),
        row: row_number,
        indicators,
        location,
    })
}

fn parse_indicator(
    cell: &str,
    column: &'static str,
    row: usize,
) -> Result<f64, PlotImportError> {
    if cell.is_empty() {
        return Err(PlotImportError::MissingValue { column, row });
    }

    parse_number(cell).ok_or_else(|| PlotImportError::NonNumericValue {
        column,
        row,
        value: cell.to_string(),
    })
}

fn parse_location(latitude: Option<&str>, longitude: Option<&str>, row: usize) -> Option<GeoPoint> {
    let latitude = latitude.and_then(parse_number);
    let longitude = longitude.and_then(parse_number);
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => {
            let point = GeoPoint::new(lat, lon);
            if point.is_none() {
                debug!(row, lat, lon, "ignoring out-of-range coordinates");
            }
            point
        }
        _ => None,
    }
}

/// Parses a numeric cell, tolerating a trailing percent sign.
fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_suffix('%').map(str::trim_end).unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|number| number.is_finite())
}

#[cfg(test)]
pub(crate) fn parse_number_for_tests(value: &str) -> Option<f64> {
    parse_number(value)
}
