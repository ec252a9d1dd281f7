use std::path::PathBuf;

use super::common::*;
use crate::config::EngineConfig;
use crate::determination::catalog::CatalogError;
use crate::determination::decision::MpResult;
use crate::determination::domain::DiagnosisDate;
use crate::determination::orchestrator::MpOrchestrator;

#[test]
fn tumors_in_different_groups_are_multiple_without_rules() {
    let breast = descriptor("C509", "8500", "3", DiagnosisDate::ymd(2018, 3, 1));
    let lung = descriptor("C341", "8140", "3", DiagnosisDate::ymd(2018, 4, 1));

    let decision = orchestrator().determine(&breast, &lung);

    assert_eq!(decision.result, MpResult::MultiplePrimaries);
    assert_eq!(
        decision.reason,
        "The two sets of parameters belong to two different cancer groups."
    );
    assert!(decision.applied_rules.is_empty());
    assert_eq!(decision.group, None);
}

#[test]
fn diagnoses_before_2007_are_not_applicable() {
    let orchestrator = orchestrator();
    let current = descriptor("C509", "8500", "3", DiagnosisDate::ymd(2010, 1, 1));

    for diagnosis in [
        DiagnosisDate::unknown(),
        DiagnosisDate::year_only(2006),
        DiagnosisDate::new("", "01", "01"),
        DiagnosisDate::new("20x0", "01", "01"),
        DiagnosisDate::default(),
    ] {
        let early = descriptor("C509", "8500", "3", diagnosis);
        let decision = orchestrator.determine(&early, &current);
        assert_eq!(decision.result, MpResult::NotApplicable);
        assert!(decision.reason.contains("January 1, 2007 and after"));

        let decision = orchestrator.determine(&current, &early);
        assert_eq!(decision.result, MpResult::NotApplicable);
    }
}

#[test]
fn applicability_is_checked_before_validation() {
    let invalid = descriptor("C809", "8000", "3", DiagnosisDate::year_only(2005));
    let current = descriptor("C509", "8500", "3", DiagnosisDate::ymd(2010, 1, 1));

    let decision = orchestrator().determine(&invalid, &current);

    assert_eq!(decision.result, MpResult::NotApplicable);
}

#[test]
fn invalid_tumors_are_questionable_and_named() {
    let orchestrator = orchestrator();
    let valid = descriptor("C509", "8500", "3", DiagnosisDate::ymd(2010, 1, 1));
    let unknown_site = descriptor("C809", "8000", "3", DiagnosisDate::ymd(2010, 1, 1));
    let bad_behavior = descriptor("C509", "8500", "5", DiagnosisDate::ymd(2010, 1, 1));

    let decision = orchestrator.determine(&unknown_site, &valid);
    assert_eq!(decision.result, MpResult::Questionable);
    assert!(decision
        .reason
        .starts_with("Unable to identify cancer group for the first tumor"));
    assert!(decision.reason.contains("C809"));

    let decision = orchestrator.determine(&valid, &bad_behavior);
    assert_eq!(decision.result, MpResult::Questionable);
    assert!(decision
        .reason
        .starts_with("Unable to identify cancer group for the second tumor"));
    assert!(decision.reason.contains("behavior '5'"));
}

#[test]
fn ungrouped_tumors_are_questionable() {
    let lymphoma = descriptor("C509", "9680", "3", DiagnosisDate::ymd(2010, 1, 1));
    let breast = descriptor("C509", "8500", "3", DiagnosisDate::ymd(2010, 1, 1));

    let decision = orchestrator().determine(&breast, &lymphoma);

    assert_eq!(decision.result, MpResult::Questionable);
    assert_eq!(
        decision.reason,
        "The second tumor provided does not belong to any of the cancer groups."
    );
}

#[test]
fn tumors_six_years_apart_are_multiple() {
    let first = descriptor("C019", "8070", "3", DiagnosisDate::ymd(2010, 3, 1));
    let second = descriptor("C019", "8070", "3", DiagnosisDate::ymd(2016, 3, 2));

    let decision = orchestrator().determine(&first, &second);

    assert_eq!(decision.result, MpResult::MultiplePrimaries);
    assert_eq!(decision.deciding_step(), Some("M9"));
    assert_eq!(
        decision.reason,
        "Tumors diagnosed more than five (5) years apart are multiple primaries."
    );
    assert_eq!(decision.group.as_ref().map(|id| id.as_str()), Some("head-and-neck"));
}

#[test]
fn same_group_decisions_come_from_the_rules() {
    let mut first = descriptor("C509", "8500", "2", DiagnosisDate::ymd(2010, 1, 1));
    first.laterality = Some("1".to_string());
    let mut second = descriptor("C509", "8500", "3", DiagnosisDate::ymd(2010, 4, 5));
    second.laterality = Some("1".to_string());

    let decision = orchestrator().determine(&first, &second);

    assert_eq!(decision.result, MpResult::MultiplePrimaries);
    assert_eq!(decision.deciding_step(), Some("M8"));
    assert_eq!(decision.summary().split(':').next(), Some("multiple primaries (breast rule M8)"));
}

#[test]
fn from_config_applies_reference_year() {
    let config = EngineConfig {
        reference_year: Some(2012),
        ..EngineConfig::default()
    };
    let orchestrator = MpOrchestrator::from_config(&config).expect("built-in catalog");
    assert_eq!(orchestrator.engine().dates().reference_year(), 2012);

    // 2016 lies after the reference year, so the five year rule cannot be answered.
    let first = descriptor("C019", "8070", "3", DiagnosisDate::ymd(2010, 3, 1));
    let second = descriptor("C019", "8070", "3", DiagnosisDate::ymd(2016, 3, 2));
    let decision = orchestrator.determine(&first, &second);
    assert_eq!(decision.result, MpResult::Questionable);
    assert_eq!(decision.deciding_step(), Some("M9"));
}

#[test]
fn from_config_reports_missing_catalog_file() {
    let config = EngineConfig {
        catalog_path: Some(PathBuf::from("/nonexistent/primaries/catalog.json")),
        ..EngineConfig::default()
    };

    let error = MpOrchestrator::from_config(&config).expect_err("file is missing");
    assert!(matches!(error, CatalogError::Io(_)));
}
