use super::config::ScoringConfig;
use crate::workflows::plots::{Indicator, IndicatorValues, PlotRecord};
use serde::Serialize;

/// Scaled value assigned to every row of a column whose readings are all equal.
pub const CONSTANT_COLUMN_FALLBACK: f64 = 0.5;

/// Observed range of one indicator across the whole table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnRange {
    pub min: f64,
    pub max: f64,
}

impl ColumnRange {
    pub fn is_constant(&self) -> bool {
        self.max <= self.min
    }

    /// Min-max scaling into `[0, 1]`.
    ///
    /// Both terms are halved before subtracting so columns spanning most of
    /// the `f64` range do not overflow to infinity.
    pub fn scale(&self, value: f64) -> f64 {
        if self.is_constant() {
            return CONSTANT_COLUMN_FALLBACK;
        }
        let half_span = self.max / 2.0 - self.min / 2.0;
        if half_span <= 0.0 || !half_span.is_finite() {
            return CONSTANT_COLUMN_FALLBACK;
        }
        let scaled = (value / 2.0 - self.min / 2.0) / half_span;
        if scaled.is_nan() {
            return CONSTANT_COLUMN_FALLBACK;
        }
        scaled.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorRanges {
    pub biomass: ColumnRange,
    pub shrub_cover: ColumnRange,
    pub grazing_pressure: ColumnRange,
    pub woody_count: ColumnRange,
}

impl IndicatorRanges {
    /// `None` when there are no records to take a range over.
    pub(crate) fn from_records(records: &[PlotRecord]) -> Option<Self> {
        Some(Self {
            biomass: column_range(records, Indicator::Biomass)?,
            shrub_cover: column_range(records, Indicator::ShrubCover)?,
            grazing_pressure: column_range(records, Indicator::GrazingPressure)?,
            woody_count: column_range(records, Indicator::WoodyCount)?,
        })
    }

    pub fn get(&self, indicator: Indicator) -> ColumnRange {
        match indicator {
            Indicator::Biomass => self.biomass,
            Indicator::ShrubCover => self.shrub_cover,
            Indicator::GrazingPressure => self.grazing_pressure,
            Indicator::WoodyCount => self.woody_count,
        }
    }
}

fn column_range(records: &[PlotRecord], indicator: Indicator) -> Option<ColumnRange> {
    let mut values = records
        .iter()
        .map(|record| record.indicators.get(indicator));
    let first = values.next()?;
    let (min, max) = values.fold((first, first), |(min, max), value| {
        (min.min(value), max.max(value))
    });
    Some(ColumnRange { min, max })
}

pub(crate) fn scale_record(record: &PlotRecord, ranges: &IndicatorRanges) -> IndicatorValues {
    IndicatorValues::from_fn(|indicator| {
        ranges
            .get(indicator)
            .scale(record.indicators.get(indicator))
    })
}

/// Scaled values turned so that 1.0 always favours grazing.
pub(crate) fn orient_record(scaled: &IndicatorValues, config: &ScoringConfig) -> IndicatorValues {
    IndicatorValues::from_fn(|indicator| {
        config
            .weight(indicator)
            .polarity
            .orient(scaled.get(indicator))
    })
}

pub(crate) fn combine(oriented: &IndicatorValues, config: &ScoringConfig) -> f64 {
    let score: f64 = Indicator::ALL
        .iter()
        .map(|indicator| config.weight(*indicator).weight * oriented.get(*indicator))
        .sum();
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::plots::PlotId;

    fn record(id: &str, biomass: f64) -> PlotRecord {
        PlotRecord {
            plot_id: PlotId::from(id),
            row: 1,
            indicators: IndicatorValues {
                biomass,
                shrub_pct: 10.0,
                grazing_pressure: 4.0,
                woody_count: 2.0,
            },
            location: None,
        }
    }

    #[test]
    fn range_spans_whole_column() {
        let records = vec![record("a", 12.0), record("b", -3.0), record("c", 40.0)];
        let ranges = IndicatorRanges::from_records(&records).expect("ranges");
        assert_eq!(ranges.biomass, ColumnRange { min: -3.0, max: 40.0 });
        assert!(ranges.shrub_cover.is_constant());
    }

    #[test]
    fn no_records_yield_no_ranges() {
        assert!(IndicatorRanges::from_records(&[]).is_none());
    }

    #[test]
    fn scale_maps_endpoints_and_is_monotonic() {
        let range = ColumnRange {
            min: 10.0,
            max: 30.0,
        };
        assert_eq!(range.scale(10.0), 0.0);
        assert_eq!(range.scale(30.0), 1.0);
        assert_eq!(range.scale(20.0), 0.5);

        let mut previous = range.scale(10.0);
        for step in 1..=20 {
            let current = range.scale(10.0 + step as f64);
            assert!(current >= previous);
            assert!((0.0..=1.0).contains(&current));
            previous = current;
        }
    }

    #[test]
    fn constant_column_uses_fallback() {
        let range = ColumnRange { min: 7.0, max: 7.0 };
        assert_eq!(range.scale(7.0), CONSTANT_COLUMN_FALLBACK);
        assert!(!range.scale(7.0).is_nan());
    }

    #[test]
    fn scale_survives_columns_spanning_the_f64_range() {
        let range = ColumnRange {
            min: -1e308,
            max: 1e308,
        };
        assert_eq!(range.scale(-1e308), 0.0);
        assert_eq!(range.scale(1e308), 1.0);
        assert_eq!(range.scale(0.0), 0.5);
        assert!(!range.scale(f64::MAX).is_nan());
    }

    #[test]
    fn orient_flips_only_inverse_indicators() {
        let scaled = IndicatorValues {
            biomass: 0.25,
            shrub_pct: 0.25,
            grazing_pressure: 1.0,
            woody_count: 0.0,
        };
        let oriented = orient_record(&scaled, &ScoringConfig::inverted_pressures());
        assert_eq!(oriented.biomass, 0.25);
        assert_eq!(oriented.shrub_pct, 0.75);
        assert_eq!(oriented.grazing_pressure, 0.0);
        assert_eq!(oriented.woody_count, 1.0);
        assert_eq!(orient_record(&scaled, &ScoringConfig::default()), scaled);
    }

    #[test]
    fn combine_weights_oriented_values() {
        let scaled = IndicatorValues {
            biomass: 1.0,
            shrub_pct: 0.0,
            grazing_pressure: 0.5,
            woody_count: 0.25,
        };
        let direct = ScoringConfig::default();
        let direct = combine(&orient_record(&scaled, &direct), &direct);
        assert!((direct - (0.4 + 0.0 + 0.1 + 0.05)).abs() < 1e-12);

        let inverted = ScoringConfig::inverted_pressures();
        let inverted = combine(&orient_record(&scaled, &inverted), &inverted);
        assert!((inverted - (0.4 + 0.2 + 0.1 + 0.15)).abs() < 1e-12);
    }
}
