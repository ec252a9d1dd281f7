use std::sync::Arc;

use primaries::determination::{
    determine_pairs, BatchError, CancerGroupCatalog, DiagnosisDate, MpOrchestrator, MpResult,
    RuleEngine, TumorDescriptor, UncertainDateComparator,
};

fn orchestrator() -> MpOrchestrator {
    let catalog = CancerGroupCatalog::standard().expect("built-in catalog loads");
    MpOrchestrator::new(Arc::new(catalog), RuleEngine::new(UncertainDateComparator::new(2024)))
}

#[test]
fn batch_determines_each_row() {
    let csv = "site1,histology1,behavior1,laterality1,year1,month1,day1,site2,histology2,behavior2,laterality2,year2,month2,day2\n\
C509,8500,3,1,2018,03,01,C341,8140,3,1,2018,04,01\n\
C509,8500,2,1,2010,01,01,C509,8500,3,1,2010,04,05\n\
C509,8500,2,1,2015,,,C509,8500,3,1,2015,,\n\
C509,8500,3,1,9999,99,99,C509,8500,3,1,2012,01,01\n\
C809,8000,3,,2012,01,01,C509,8500,3,1,2012,01,01\n";

    let results = determine_pairs(csv.as_bytes(), &orchestrator()).expect("csv parses");

    let outcomes: Vec<(usize, MpResult, Option<&str>)> = results
        .iter()
        .map(|pair| (pair.row, pair.result, pair.step.as_deref()))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            (1, MpResult::MultiplePrimaries, None),
            (2, MpResult::MultiplePrimaries, Some("M8")),
            (3, MpResult::Questionable, Some("M8")),
            (4, MpResult::NotApplicable, None),
            (5, MpResult::Questionable, None),
        ]
    );
    assert_eq!(results[1].group.as_ref().map(|id| id.as_str()), Some("breast"));
    assert!(results[4].reason.contains("first tumor"));
}

#[test]
fn batch_rejects_malformed_csv() {
    let csv = "site1,histology1,behavior1\nC509,8500,3,extra\n";

    let error = determine_pairs(csv.as_bytes(), &orchestrator()).expect_err("ragged row");

    assert!(matches!(error, BatchError::Csv(_)));
    assert!(error.to_string().starts_with("invalid tumor pair CSV data"));
}

#[test]
fn orchestrator_is_shareable_across_threads() {
    let orchestrator = Arc::new(orchestrator());
    let first = TumorDescriptor::new("C443", "8720", "3")
        .with_laterality("1")
        .diagnosed(DiagnosisDate::ymd(2015, 1, 1));
    let second = TumorDescriptor::new("C443", "8720", "3")
        .with_laterality("1")
        .diagnosed(DiagnosisDate::ymd(2015, 6, 1));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let orchestrator = Arc::clone(&orchestrator);
            let (first, second) = (first.clone(), second.clone());
            std::thread::spawn(move || orchestrator.determine(&first, &second))
        })
        .collect();

    for handle in handles {
        let decision = handle.join().expect("thread completes");
        assert_eq!(decision.result, MpResult::MultiplePrimaries);
        assert_eq!(decision.deciding_step(), Some("M7"));
    }
}
