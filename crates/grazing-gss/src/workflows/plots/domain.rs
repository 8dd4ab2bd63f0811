use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a surveyed plot as it appears in the upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlotId(pub String);

impl fmt::Display for PlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlotId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Rangeland indicators tracked for every plot, in their canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Biomass,
    ShrubCover,
    GrazingPressure,
    WoodyCount,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::Biomass,
        Indicator::ShrubCover,
        Indicator::GrazingPressure,
        Indicator::WoodyCount,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Biomass => "Available biomass",
            Self::ShrubCover => "Shrub cover",
            Self::GrazingPressure => "Grazing pressure",
            Self::WoodyCount => "Total woody count",
        }
    }

    /// Header used for this indicator in uploads and exports.
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Biomass => "available_biomass",
            Self::ShrubCover => "Shrub %",
            Self::GrazingPressure => "grazing_pressure",
            Self::WoodyCount => "total woody count",
        }
    }

    /// Header used for the scaled value of this indicator in exports.
    pub const fn scaled_column_name(self) -> &'static str {
        match self {
            Self::Biomass => "biomass_score",
            Self::ShrubCover => "shrub_score",
            Self::GrazingPressure => "grazing_score",
            Self::WoodyCount => "woody_score",
        }
    }
}

/// One value per indicator. Used for both raw and scaled readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorValues {
    pub biomass: f64,
    pub shrub_pct: f64,
    pub grazing_pressure: f64,
    pub woody_count: f64,
}

impl IndicatorValues {
    pub fn from_fn(mut value_for: impl FnMut(Indicator) -> f64) -> Self {
        Self {
            biomass: value_for(Indicator::Biomass),
            shrub_pct: value_for(Indicator::ShrubCover),
            grazing_pressure: value_for(Indicator::GrazingPressure),
            woody_count: value_for(Indicator::WoodyCount),
        }
    }

    pub fn get(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::Biomass => self.biomass,
            Indicator::ShrubCover => self.shrub_pct,
            Indicator::GrazingPressure => self.grazing_pressure,
            Indicator::WoodyCount => self.woody_count,
        }
    }
}

/// WGS84 coordinates of a plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Returns `None` for non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }
}

/// Validated row of the upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRecord {
    pub plot_id: PlotId,
    /// Spreadsheet row the plot was read from; the header is row 1.
    pub row: usize,
    pub indicators: IndicatorValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// Typed, fixed-shape table produced by the importer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotTable {
    records: Vec<PlotRecord>,
    has_coordinates: bool,
    index: HashMap<PlotId, usize>,
}

impl PlotTable {
    pub fn new(records: Vec<PlotRecord>, has_coordinates: bool) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(position, record)| (record.plot_id.clone(), position))
            .collect();

        Self {
            records,
            has_coordinates,
            index,
        }
    }

    pub fn records(&self) -> &[PlotRecord] {
        &self.records
    }

    pub fn get(&self, plot_id: &PlotId) -> Option<&PlotRecord> {
        self.index
            .get(plot_id)
            .and_then(|position| self.records.get(*position))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when the upload carried both latitude and longitude columns.
    pub fn has_coordinates(&self) -> bool {
        self.has_coordinates
    }
}
