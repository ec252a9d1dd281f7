use metrics_exporter_prometheus::PrometheusHandle;
use primaries::config::AppConfig;
use primaries::determination::{DiagnosisDate, MpOrchestrator};
use primaries::error::AppError;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds an orchestrator from the environment, optionally pinning the reference year.
pub(crate) fn load_orchestrator(reference_year: Option<i32>) -> Result<MpOrchestrator, AppError> {
    let mut config = AppConfig::load()?;
    if reference_year.is_some() {
        config.engine.reference_year = reference_year;
    }
    Ok(MpOrchestrator::from_config(&config.engine)?)
}

/// Parses `YYYY`, `YYYY-MM` or `YYYY-MM-DD`. Omitted parts become the `99` sentinel.
pub(crate) fn parse_diagnosis_date(raw: &str) -> Result<DiagnosisDate, String> {
    let raw = raw.trim();
    let parts: Vec<&str> = raw.split('-').collect();
    if parts.len() > 3 {
        return Err(format!("'{raw}' must look like YYYY, YYYY-MM or YYYY-MM-DD"));
    }

    let widths = [4, 2, 2];
    for (part, width) in parts.iter().zip(widths) {
        if part.is_empty() || part.len() > width || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!(
                "'{raw}' must look like YYYY, YYYY-MM or YYYY-MM-DD (bad component '{part}')"
            ));
        }
    }

    let year = parts[0];
    let month = parts.get(1).copied().unwrap_or("99");
    let day = parts.get(2).copied().unwrap_or("99");
    Ok(DiagnosisDate::new(year, month, day))
}
