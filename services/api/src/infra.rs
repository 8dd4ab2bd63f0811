use grazing_gss::workflows::recommendation::Language;
use grazing_gss::workflows::scoring::ExportView;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_export_view(raw: &str) -> Result<ExportView, String> {
    raw.parse::<ExportView>().map_err(|err| err.to_string())
}

pub(crate) fn parse_language(raw: &str) -> Result<Language, String> {
    raw.parse::<Language>().map_err(|err| err.to_string())
}
