//! Min-max rescaling of plot indicators and the grazing suitability score.

mod config;
mod diagnosis;
pub mod export;
mod rules;
pub mod views;

pub use config::{IndicatorWeight, Polarity, ScoringConfig};
pub use diagnosis::{
    Diagnosis, SuitabilityBand, DEFICIT_BELOW, MODERATE_BELOW, POOR_BELOW, UNSUITABLE_BELOW,
};
pub use export::{ExportError, ExportView, UnknownExportView};
pub use rules::{ColumnRange, IndicatorRanges, CONSTANT_COLUMN_FALLBACK};
pub use views::{BandCount, FullRow, MapPoint, MinimalRow, Rankings, ScoreSummary};

use crate::workflows::plots::{IndicatorValues, PlotId, PlotRecord, PlotTable};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("dataset contains no plots to score")]
    EmptyDataset,
    #[error("invalid indicator weights: {0}")]
    InvalidWeights(String),
}

/// Stateless scorer that applies one combination rule to whole tables.
#[derive(Debug, Clone)]
pub struct SuitabilityScorer {
    config: ScoringConfig,
}

impl Default for SuitabilityScorer {
    fn default() -> Self {
        Self {
            config: ScoringConfig::default(),
        }
    }
}

impl SuitabilityScorer {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringError> {
        Ok(Self {
            config: config.normalized()?,
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores every plot against ranges taken over the full table.
    pub fn score(&self, table: &PlotTable) -> Result<ScoredTable, ScoringError> {
        let ranges =
            IndicatorRanges::from_records(table.records()).ok_or(ScoringError::EmptyDataset)?;

        let plots: Vec<ScoredPlot> = table
            .records()
            .iter()
            .map(|record| self.score_record(record, &ranges))
            .collect();

        debug!(plots = plots.len(), "plot table scored");
        Ok(ScoredTable::new(
            ranges,
            plots,
            self.config.clone(),
            table.has_coordinates(),
        ))
    }

    fn score_record(&self, record: &PlotRecord, ranges: &IndicatorRanges) -> ScoredPlot {
        let scaled = rules::scale_record(record, ranges);
        let oriented = rules::orient_record(&scaled, &self.config);
        let score = rules::combine(&oriented, &self.config);
        let diagnosis = diagnosis::diagnose(score, &scaled, &self.config);

        ScoredPlot {
            record: record.clone(),
            scaled,
            oriented,
            score,
            diagnosis,
        }
    }
}

/// A plot with its scaled indicators, score and diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPlot {
    pub record: PlotRecord,
    pub scaled: IndicatorValues,
    /// Scaled values after polarity, the per-indicator score terms.
    pub oriented: IndicatorValues,
    pub score: f64,
    pub diagnosis: Diagnosis,
}

impl ScoredPlot {
    pub fn plot_id(&self) -> &PlotId {
        &self.record.plot_id
    }
}

/// Complete scoring result for one upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTable {
    ranges: IndicatorRanges,
    plots: Vec<ScoredPlot>,
    config: ScoringConfig,
    has_coordinates: bool,
    index: HashMap<PlotId, usize>,
}

impl ScoredTable {
    fn new(
        ranges: IndicatorRanges,
        plots: Vec<ScoredPlot>,
        config: ScoringConfig,
        has_coordinates: bool,
    ) -> Self {
        let index = plots
            .iter()
            .enumerate()
            .map(|(position, plot)| (plot.plot_id().clone(), position))
            .collect();

        Self {
            ranges,
            plots,
            config,
            has_coordinates,
            index,
        }
    }

    pub fn ranges(&self) -> &IndicatorRanges {
        &self.ranges
    }

    pub fn plots(&self) -> &[ScoredPlot] {
        &self.plots
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn has_coordinates(&self) -> bool {
        self.has_coordinates
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    pub fn get(&self, plot_id: &PlotId) -> Option<&ScoredPlot> {
        self.index
            .get(plot_id)
            .and_then(|position| self.plots.get(*position))
    }

    pub fn full_rows(&self) -> Vec<FullRow> {
        self.plots.iter().map(FullRow::from).collect()
    }

    pub fn minimal_rows(&self) -> Vec<MinimalRow> {
        self.plots.iter().map(MinimalRow::from).collect()
    }

    /// Located plots only; empty when the upload had no coordinates.
    pub fn map_points(&self) -> Vec<MapPoint> {
        views::map_points(&self.plots)
    }

    pub fn top(&self, limit: usize) -> Vec<MinimalRow> {
        views::top(&self.plots, limit)
    }

    pub fn bottom(&self, limit: usize) -> Vec<MinimalRow> {
        views::bottom(&self.plots, limit)
    }

    pub fn rankings(&self, limit: usize) -> Rankings {
        Rankings {
            top: self.top(limit),
            bottom: self.bottom(limit),
        }
    }

    pub fn summary(&self) -> ScoreSummary {
        views::summarize(&self.plots)
    }

    pub fn to_csv(&self, view: ExportView) -> Result<Vec<u8>, ExportError> {
        export::to_csv_bytes(self, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::plots::{GeoPoint, PlotImporter};
    use std::io::Cursor;

    fn table(csv: &str) -> PlotTable {
        PlotImporter::from_reader(Cursor::new(csv.to_string())).expect("fixture imports")
    }

    fn two_plots() -> PlotTable {
        table(
            "Plot Name,available_biomass,Shrub %,grazing_pressure,total woody count\n\
P1,10,20,5,3\n\
P2,30,60,15,9\n",
        )
    }

    fn four_plots_with_coordinates() -> PlotTable {
        table(
            "Plot Name,available_biomass,Shrub %,grazing_pressure,total woody count,lat,lon\n\
North,40,10,4,2,12.10,8.50\n\
South,10,50,20,12,,\n\
East,25,30,12,6,12.30,8.70\n\
West,40,10,4,2,12.40,8.80\n",
        )
    }

    #[test]
    fn dominating_plot_scores_at_least_as_high() {
        let scored = SuitabilityScorer::default()
            .score(&two_plots())
            .expect("scores");

        assert_eq!(scored.ranges().biomass, ColumnRange { min: 10.0, max: 30.0 });
        let p1 = scored.get(&PlotId::from("P1")).expect("P1");
        let p2 = scored.get(&PlotId::from("P2")).expect("P2");
        assert_eq!(p1.scaled.biomass, 0.0);
        assert_eq!(p2.scaled.biomass, 1.0);
        assert_eq!(p1.scaled.woody_count, 0.0);
        assert_eq!(p2.scaled.grazing_pressure, 1.0);
        assert!(p2.score >= p1.score);
        assert_eq!(p1.diagnosis.band, SuitabilityBand::Unsuitable);
        assert_eq!(p2.diagnosis.band, SuitabilityBand::High);
    }

    #[test]
    fn empty_table_is_rejected() {
        let result = SuitabilityScorer::default().score(&PlotTable::default());
        assert_eq!(result, Err(ScoringError::EmptyDataset));
    }

    #[test]
    fn constant_columns_scale_to_fallback() {
        let scored = SuitabilityScorer::default()
            .score(&table(
                "Plot,biomass,shrub,pressure,woody\nA,5,20,5,3\nB,5,40,5,3\nC,5,60,5,3\n",
            ))
            .expect("scores");

        for plot in scored.plots() {
            assert_eq!(plot.scaled.biomass, CONSTANT_COLUMN_FALLBACK);
            assert_eq!(plot.scaled.grazing_pressure, CONSTANT_COLUMN_FALLBACK);
            assert!(!plot.score.is_nan());
        }
    }

    #[test]
    fn single_plot_table_scores_at_fallback_everywhere() {
        let scored = SuitabilityScorer::default()
            .score(&table("Plot,biomass,shrub,pressure,woody\nOnly,5,20,5,3\n"))
            .expect("scores");
        let only = &scored.plots()[0];
        assert!((only.score - 0.5).abs() < 1e-12);
        assert_eq!(only.diagnosis.band, SuitabilityBand::Moderate);
    }

    #[test]
    fn scaled_values_stay_within_unit_interval() {
        let scored = SuitabilityScorer::default()
            .score(&four_plots_with_coordinates())
            .expect("scores");
        for plot in scored.plots() {
            for indicator in crate::workflows::plots::Indicator::ALL {
                let value = plot.scaled.get(indicator);
                assert!((0.0..=1.0).contains(&value), "{indicator:?} = {value}");
            }
            assert!((0.0..=1.0).contains(&plot.score));
        }
    }

    #[test]
    fn rescoring_is_idempotent() {
        let scorer = SuitabilityScorer::new(ScoringConfig::inverted_pressures()).expect("valid");
        let plots = four_plots_with_coordinates();
        let first = scorer.score(&plots).expect("scores");
        let second = scorer.score(&plots).expect("scores");
        assert_eq!(first, second);
    }

    #[test]
    fn inverted_pressures_reward_open_rangeland() {
        let scorer = SuitabilityScorer::new(ScoringConfig::inverted_pressures()).expect("valid");
        let scored = scorer.score(&four_plots_with_coordinates()).expect("scores");

        let north = scored.get(&PlotId::from("North")).expect("North");
        let south = scored.get(&PlotId::from("South")).expect("South");
        assert!((north.score - 1.0).abs() < 1e-12);
        assert!(south.score.abs() < 1e-12);
        assert_eq!(south.diagnosis.label, "Too much shrub cover");
    }

    #[test]
    fn rankings_break_ties_by_upload_order() {
        let scored = SuitabilityScorer::default()
            .score(&four_plots_with_coordinates())
            .expect("scores");

        let top = scored.top(2);
        let ids: Vec<&str> = top.iter().map(|row| row.plot_id.0.as_str()).collect();
        assert_eq!(ids, vec!["South", "East"]);

        let bottom = scored.bottom(2);
        let ids: Vec<&str> = bottom.iter().map(|row| row.plot_id.0.as_str()).collect();
        assert_eq!(ids, vec!["North", "West"]);

        assert_eq!(scored.top(10).len(), 4);
    }

    #[test]
    fn map_points_skip_unlocated_plots() {
        let scored = SuitabilityScorer::default()
            .score(&four_plots_with_coordinates())
            .expect("scores");

        let points = scored.map_points();
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|point| point.plot_id.0 != "South"));
        assert_eq!(
            GeoPoint::new(points[0].latitude, points[0].longitude),
            GeoPoint::new(12.10, 8.50)
        );

        let unlocated = SuitabilityScorer::default()
            .score(&two_plots())
            .expect("scores");
        assert!(unlocated.map_points().is_empty());
    }

    #[test]
    fn summary_counts_bands_and_score_spread() {
        let scored = SuitabilityScorer::default()
            .score(&two_plots())
            .expect("scores");
        let summary = scored.summary();

        assert_eq!(summary.plots, 2);
        assert_eq!(summary.located_plots, 0);
        assert_eq!(summary.min_score, 0.0);
        assert!((summary.max_score - 1.0).abs() < 1e-12);
        assert!((summary.mean_score - 0.5).abs() < 1e-12);
        let counts: Vec<usize> = summary.bands.iter().map(|band| band.plots).collect();
        assert_eq!(counts, vec![1, 0, 0, 1]);
    }

    #[test]
    fn minimal_export_lists_identifier_score_and_diagnosis() {
        let scored = SuitabilityScorer::default()
            .score(&two_plots())
            .expect("scores");
        let csv = String::from_utf8(scored.to_csv(ExportView::Minimal).expect("export"))
            .expect("utf8");

        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Plot Name,GSS,Diagnosis"));
        assert_eq!(lines.next(), Some("P1,0.0000,Sparse shrub cover"));
        assert_eq!(lines.next(), Some("P2,1.0000,Highly suitable"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn full_export_adds_coordinates_only_when_uploaded() {
        let scored = SuitabilityScorer::default()
            .score(&four_plots_with_coordinates())
            .expect("scores");
        let csv = String::from_utf8(scored.to_csv(ExportView::Full).expect("export"))
            .expect("utf8");
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Plot Name,available_biomass,Shrub %,grazing_pressure,total woody count,\
latitude,longitude,biomass_score,shrub_score,grazing_score,woody_score,GSS,Suitability Band,Diagnosis"
            )
        );
        lines.next();
        let south = lines.next().expect("South row");
        assert!(south.starts_with("South,10,50,20,12,,,0.0000,1.0000,1.0000,1.0000,"));

        let plain = SuitabilityScorer::default()
            .score(&two_plots())
            .expect("scores")
            .to_csv(ExportView::Full)
            .expect("export");
        let header = String::from_utf8(plain).expect("utf8");
        assert!(!header.lines().next().unwrap_or_default().contains("latitude"));
    }

    #[test]
    fn extreme_but_finite_readings_still_score_within_bounds() {
        let scored = SuitabilityScorer::default()
            .score(&table(
                "Plot,biomass,shrub,pressure,woody
A,-1e308,1,1,1
B,1e308,2,2,2
",
            ))
            .expect("scores");

        let a = scored.get(&PlotId::from("A")).expect("A");
        let b = scored.get(&PlotId::from("B")).expect("B");
        assert_eq!(a.scaled.biomass, 0.0);
        assert_eq!(b.scaled.biomass, 1.0);
        assert!(a.score.abs() < 1e-12);
        assert!((b.score - 1.0).abs() < 1e-12);
        assert_eq!(a.diagnosis.band, SuitabilityBand::Unsuitable);
        assert_eq!(b.diagnosis.band, SuitabilityBand::High);
    }

    #[test]
    fn full_export_reports_oriented_indicator_scores() {
        let scorer = SuitabilityScorer::new(ScoringConfig::inverted_pressures()).expect("valid");
        let scored = scorer.score(&four_plots_with_coordinates()).expect("scores");

        let south = scored.get(&PlotId::from("South")).expect("South");
        assert_eq!(south.scaled.shrub_pct, 1.0);
        assert_eq!(south.oriented.shrub_pct, 0.0);

        let csv = String::from_utf8(scored.to_csv(ExportView::Full).expect("export"))
            .expect("utf8");
        let row = csv
            .lines()
            .find(|line| line.starts_with("South,"))
            .expect("South row");
        assert!(row.starts_with("South,10,50,20,12,,,0.0000,0.0000,0.0000,0.0000,0.0000,"));

        let full = scored.full_rows();
        let north = full
            .iter()
            .find(|row| row.plot_id.0 == "North")
            .expect("North row");
        assert_eq!(north.shrub_score, 1.0);
        assert_eq!(north.woody_score, 1.0);
    }

    #[test]
    fn export_view_parses_aliases() {
        assert_eq!("FULL".parse::<ExportView>(), Ok(ExportView::Full));
        assert_eq!("minimal".parse::<ExportView>(), Ok(ExportView::Minimal));
        assert!("summary".parse::<ExportView>().is_err());
        assert_eq!(ExportView::Minimal.file_name(), "gss_results_minimal.csv");
    }
}
