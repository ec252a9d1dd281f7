use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::determination::catalog::{CancerGroup, CancerGroupCatalog};
use crate::determination::dates::{PartialDate, UncertainDateComparator};
use crate::determination::decision::MpDecision;
use crate::determination::domain::{DiagnosisDate, Tumor, TumorDescriptor};
use crate::determination::engine::RuleEngine;
use crate::determination::orchestrator::MpOrchestrator;

pub(super) const REFERENCE_YEAR: i32 = 2024;

pub(super) fn comparator() -> UncertainDateComparator {
    UncertainDateComparator::new(REFERENCE_YEAR)
}

pub(super) fn engine() -> RuleEngine {
    RuleEngine::new(comparator())
}

pub(super) fn standard_catalog() -> Arc<CancerGroupCatalog> {
    Arc::new(CancerGroupCatalog::standard().expect("built-in catalog loads"))
}

pub(super) fn orchestrator() -> MpOrchestrator {
    MpOrchestrator::new(standard_catalog(), engine())
}

pub(super) fn group<'a>(catalog: &'a CancerGroupCatalog, id: &str) -> &'a CancerGroup {
    catalog.get(id).expect("group exists")
}

pub(super) fn date(year: i32, month: Option<u32>, day: Option<u32>) -> PartialDate {
    PartialDate::new(Some(year), month, day)
}

pub(super) fn on(year: i32, month: u32, day: u32) -> PartialDate {
    date(year, Some(month), Some(day))
}

pub(super) fn descriptor(
    site: &str,
    histology: &str,
    behavior: &str,
    diagnosis: DiagnosisDate,
) -> TumorDescriptor {
    TumorDescriptor::new(site, histology, behavior).diagnosed(diagnosis)
}

pub(super) fn tumor(
    site: &str,
    histology: &str,
    behavior: &str,
    laterality: Option<&str>,
    diagnosis: DiagnosisDate,
) -> Tumor {
    let mut raw = descriptor(site, histology, behavior, diagnosis);
    raw.laterality = laterality.map(str::to_string);
    raw.validate().expect("fixture tumor is valid")
}

pub(super) fn steps(decision: &MpDecision) -> Vec<&str> {
    decision
        .applied_rules
        .iter()
        .map(|rule| rule.step.as_str())
        .collect()
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
