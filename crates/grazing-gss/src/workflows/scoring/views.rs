use super::diagnosis::SuitabilityBand;
use super::ScoredPlot;
use crate::workflows::plots::PlotId;
use serde::Serialize;

/// Every column of a scored plot, flattened for tables and JSON clients.
#[derive(Debug, Clone, Serialize)]
pub struct FullRow {
    pub plot_id: PlotId,
    pub available_biomass: f64,
    pub shrub_pct: f64,
    pub grazing_pressure: f64,
    pub woody_count: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub biomass_score: f64,
    pub shrub_score: f64,
    pub grazing_score: f64,
    pub woody_score: f64,
    pub score: f64,
    pub band: SuitabilityBand,
    pub band_label: &'static str,
    pub diagnosis: &'static str,
}

impl From<&ScoredPlot> for FullRow {
    fn from(plot: &ScoredPlot) -> Self {
        let raw = plot.record.indicators;
        let location = plot.record.location;
        Self {
            plot_id: plot.record.plot_id.clone(),
            available_biomass: raw.biomass,
            shrub_pct: raw.shrub_pct,
            grazing_pressure: raw.grazing_pressure,
            woody_count: raw.woody_count,
            latitude: location.map(|point| point.latitude),
            longitude: location.map(|point| point.longitude),
            biomass_score: plot.oriented.biomass,
            shrub_score: plot.oriented.shrub_pct,
            grazing_score: plot.oriented.grazing_pressure,
            woody_score: plot.oriented.woody_count,
            score: plot.score,
            band: plot.diagnosis.band,
            band_label: plot.diagnosis.band.label(),
            diagnosis: plot.diagnosis.label,
        }
    }
}

/// Identifier, score and diagnosis only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinimalRow {
    pub plot_id: PlotId,
    pub score: f64,
    pub diagnosis: &'static str,
}

impl From<&ScoredPlot> for MinimalRow {
    fn from(plot: &ScoredPlot) -> Self {
        Self {
            plot_id: plot.record.plot_id.clone(),
            score: plot.score,
            diagnosis: plot.diagnosis.label,
        }
    }
}

/// Point handed to map renderers for located plots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub plot_id: PlotId,
    pub latitude: f64,
    pub longitude: f64,
    pub score: f64,
    pub band: SuitabilityBand,
    pub diagnosis: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rankings {
    pub top: Vec<MinimalRow>,
    pub bottom: Vec<MinimalRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandCount {
    pub band: SuitabilityBand,
    pub band_label: &'static str,
    pub plots: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub plots: usize,
    pub located_plots: usize,
    pub mean_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub bands: Vec<BandCount>,
}

pub(crate) fn summarize(plots: &[ScoredPlot]) -> ScoreSummary {
    let count = plots.len();
    let (sum, min, max) = plots.iter().fold(
        (0.0, f64::INFINITY, f64::NEG_INFINITY),
        |(sum, min, max), plot| (sum + plot.score, min.min(plot.score), max.max(plot.score)),
    );
    let (mean_score, min_score, max_score) = if count > 0 {
        (sum / count as f64, min, max)
    } else {
        (0.0, 0.0, 0.0)
    };

    let bands = SuitabilityBand::ALL
        .iter()
        .map(|band| BandCount {
            band: *band,
            band_label: band.label(),
            plots: plots
                .iter()
                .filter(|plot| plot.diagnosis.band == *band)
                .count(),
        })
        .collect();

    ScoreSummary {
        plots: count,
        located_plots: plots
            .iter()
            .filter(|plot| plot.record.location.is_some())
            .count(),
        mean_score,
        min_score,
        max_score,
        bands,
    }
}

/// Highest scores first; ties keep upload order.
pub(crate) fn top(plots: &[ScoredPlot], limit: usize) -> Vec<MinimalRow> {
    let mut ranked: Vec<&ScoredPlot> = plots.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.into_iter().take(limit).map(MinimalRow::from).collect()
}

/// Lowest scores first; ties keep upload order.
pub(crate) fn bottom(plots: &[ScoredPlot], limit: usize) -> Vec<MinimalRow> {
    let mut ranked: Vec<&ScoredPlot> = plots.iter().collect();
    ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
    ranked.into_iter().take(limit).map(MinimalRow::from).collect()
}

pub(crate) fn map_points(plots: &[ScoredPlot]) -> Vec<MapPoint> {
    plots
        .iter()
        .filter_map(|plot| {
            plot.record.location.map(|point| MapPoint {
                plot_id: plot.record.plot_id.clone(),
                latitude: point.latitude,
                longitude: point.longitude,
                score: plot.score,
                band: plot.diagnosis.band,
                diagnosis: plot.diagnosis.label,
            })
        })
        .collect()
}
