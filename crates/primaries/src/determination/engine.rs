use std::sync::Arc;

use tracing::debug;

use super::catalog::CancerGroup;
use super::dates::UncertainDateComparator;
use super::decision::{AppliedRule, MpDecision, MpResult, RuleVerdict};
use super::domain::Tumor;
use super::recode::{NoRecodeLookup, RecodeLookup};
use super::rules::{RuleContext, RuleOutcome};

/// Walks a group's decision list until a rule answers yes or cannot be answered.
#[derive(Clone)]
pub struct RuleEngine {
    dates: UncertainDateComparator,
    recodes: Arc<dyn RecodeLookup>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(UncertainDateComparator::today())
    }
}

impl RuleEngine {
    pub fn new(dates: UncertainDateComparator) -> Self {
        Self {
            dates,
            recodes: Arc::new(NoRecodeLookup),
        }
    }

    pub fn with_recodes(mut self, recodes: Arc<dyn RecodeLookup>) -> Self {
        self.recodes = recodes;
        self
    }

    pub fn dates(&self) -> &UncertainDateComparator {
        &self.dates
    }

    pub fn decide(&self, group: &CancerGroup, first: &Tumor, second: &Tumor) -> MpDecision {
        let context = RuleContext {
            dates: &self.dates,
            recodes: self.recodes.as_ref(),
        };
        let mut applied = Vec::with_capacity(group.rules().len());

        for rule in group.rules() {
            let outcome = rule.evaluate(first, second, &context);
            debug!(group = %group.id(), step = %rule.step, outcome = ?outcome, "evaluated rule");
            applied.push(AppliedRule {
                group_id: rule.group_id.clone(),
                step: rule.step.clone(),
                question: rule.question.clone(),
                verdict: RuleVerdict::from(&outcome),
            });

            let decision = match outcome {
                RuleOutcome::False => continue,
                RuleOutcome::True => {
                    MpDecision::new(rule.classification.into(), rule.reason.clone())
                }
                RuleOutcome::Unknown(message) => MpDecision::questionable(message),
            };
            return MpDecision {
                applied_rules: applied,
                ..decision.in_group(group.id().clone())
            };
        }

        // Catalog validation guarantees a trailing catch-all, so this is only reached for
        // groups assembled without a catalog.
        MpDecision {
            applied_rules: applied,
            ..MpDecision::new(
                MpResult::Questionable,
                format!("No rule of {} could decide the tumors.", group.id()),
            )
            .in_group(group.id().clone())
        }
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("dates", &self.dates)
            .finish_non_exhaustive()
    }
}
