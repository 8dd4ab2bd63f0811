use crate::infra::{parse_export_view, parse_language};
use chrono::Local;
use clap::Args;
use grazing_gss::config::AppConfig;
use grazing_gss::error::AppError;
use grazing_gss::workflows::plots::{Indicator, PlotId};
use grazing_gss::workflows::recommendation::{Language, Recommendation, TemplateRecommender};
use grazing_gss::workflows::scoring::{export, ExportView, ScoredTable, SuitabilityScorer};
use grazing_gss::workflows::session::{AnalysisService, InMemorySessionStore, SessionRecord};
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Plot survey (CSV or spreadsheet workbook) to score
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Write the scored table as CSV (full or minimal)
    #[arg(long, value_parser = parse_export_view)]
    pub(crate) export: Option<ExportView>,
    /// Destination for the export (defaults to gss_results_<view>.csv)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Number of best and worst plots to list
    #[arg(long, default_value_t = 5)]
    pub(crate) top: usize,
}

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Plot survey (CSV or spreadsheet workbook) to score
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Identifier of the plot to advise on
    #[arg(long)]
    pub(crate) plot: String,
    /// Language of the advice (english or hausa)
    #[arg(long, value_parser = parse_language, default_value = "english")]
    pub(crate) language: Language,
}

type CliService = AnalysisService<InMemorySessionStore, TemplateRecommender>;

fn load_session(input: &Path, config: &AppConfig) -> Result<(CliService, SessionRecord), AppError> {
    let service = AnalysisService::new(
        Arc::new(InMemorySessionStore::with_capacity(1)),
        Arc::new(TemplateRecommender),
        SuitabilityScorer::new(config.scoring.clone())?,
    );
    let source_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let record = service.upload(File::open(input)?, source_name)?;
    Ok((service, record))
}

pub(crate) fn run_score(args: ScoreArgs, config: &AppConfig) -> Result<(), AppError> {
    let ScoreArgs {
        input,
        export: export_view,
        output,
        top,
    } = args;

    let (_service, record) = load_session(&input, config)?;
    print!("{}", render_score_report(&record, &input, top));

    let view = export_view.or_else(|| output.as_ref().map(|_| ExportView::default()));
    if let Some(view) = view {
        let path = output.unwrap_or_else(|| PathBuf::from(view.file_name()));
        let file = File::create(&path)?;
        export::write_csv(&record.table, view, BufWriter::new(file))?;
        println!(
            "\nExported {} plots ({:?} view) to {}",
            record.table.len(),
            view,
            path.display()
        );
    }

    Ok(())
}

pub(crate) fn run_recommend(args: RecommendArgs, config: &AppConfig) -> Result<(), AppError> {
    let RecommendArgs {
        input,
        plot,
        language,
    } = args;

    let (service, record) = load_session(&input, config)?;
    let recommendation = service.recommend(&record.id, &PlotId(plot), language)?;
    print!("{}", render_recommendation(&recommendation));
    Ok(())
}

fn render_score_report(record: &SessionRecord, input: &Path, limit: usize) -> String {
    let table: &ScoredTable = &record.table;
    let summary = table.summary();
    let mut out = String::new();

    let _ = writeln!(out, "Grazing suitability report");
    let _ = writeln!(
        out,
        "Source: {} ({} plots, {} with coordinates)",
        input.display(),
        summary.plots,
        summary.located_plots
    );
    let _ = writeln!(
        out,
        "Generated: {}",
        record
            .created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
    );

    let _ = writeln!(out, "\nWeights");
    for indicator in Indicator::ALL {
        let weight = table.config().weight(indicator);
        let _ = writeln!(
            out,
            "- {}: {:.2} ({:?})",
            indicator.label(),
            weight.weight,
            weight.polarity
        );
    }

    let _ = writeln!(out, "\nScores");
    let _ = writeln!(
        out,
        "- mean {:.3} | min {:.3} | max {:.3}",
        summary.mean_score, summary.min_score, summary.max_score
    );

    let _ = writeln!(out, "\nSuitability bands");
    for band in &summary.bands {
        let _ = writeln!(out, "- {}: {} plots", band.band_label, band.plots);
    }

    let rankings = table.rankings(limit.max(1));
    let _ = writeln!(out, "\nMost suitable plots");
    for row in &rankings.top {
        let _ = writeln!(out, "- {}: {:.3} ({})", row.plot_id, row.score, row.diagnosis);
    }
    let _ = writeln!(out, "\nLeast suitable plots");
    for row in &rankings.bottom {
        let _ = writeln!(out, "- {}: {:.3} ({})", row.plot_id, row.score, row.diagnosis);
    }

    out
}

fn render_recommendation(recommendation: &Recommendation) -> String {
    format!(
        "Plot {} | score {:.3} | {}\n{} advice:\n{}\n",
        recommendation.plot_id,
        recommendation.score,
        recommendation.diagnosis,
        recommendation.language.label(),
        recommendation.text
    )
}
