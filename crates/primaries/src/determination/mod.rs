//! Multiple primary determination: grouping tumors by registry cancer group and walking the
//! group's decision list for a tumor pair.

pub mod batch;
pub mod catalog;
pub(crate) mod classifier;
pub mod dates;
pub mod decision;
pub mod domain;
pub(crate) mod engine;
pub(crate) mod orchestrator;
pub mod ranges;
pub mod recode;
pub mod router;
pub mod rules;

#[cfg(test)]
mod tests;

pub use batch::{determine_pairs, determine_pairs_from_path, BatchError, PairDetermination};
pub use catalog::{
    CancerGroup, CancerGroupCatalog, CatalogError, GroupId, GroupOverlap, GroupSummary,
    OverlapPolicy, RuleSummary,
};
pub use classifier::CancerGroupClassifier;
pub use dates::{DiagnosisOrder, PartialDate, SixtyDayGap, UncertainDateComparator, YearsApart};
pub use decision::{AppliedRule, MpDecision, MpResult, RuleVerdict};
pub use domain::{
    Behavior, DiagnosisDate, Histology, InvalidTumor, SiteCode, Tumor, TumorDescriptor,
};
pub use engine::RuleEngine;
pub use orchestrator::{MpOrchestrator, FIRST_RULE_YEAR};
pub use recode::{NoRecodeLookup, RecodeLookup};
pub use router::determination_router;
pub use rules::{Classification, Rule, RuleKind, RuleOutcome};
