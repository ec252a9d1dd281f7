use serde::{Deserialize, Serialize};

use super::catalog::GroupId;
use super::rules::{Classification, RuleOutcome};

/// Final answer for a tumor pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MpResult {
    SinglePrimary,
    MultiplePrimaries,
    /// A rule could not be answered or the input could not be grouped.
    Questionable,
    /// Diagnosis predates the multiple primary rules.
    NotApplicable,
}

impl MpResult {
    pub fn label(&self) -> &'static str {
        match self {
            MpResult::SinglePrimary => "single primary",
            MpResult::MultiplePrimaries => "multiple primaries",
            MpResult::Questionable => "questionable",
            MpResult::NotApplicable => "not applicable",
        }
    }
}

impl From<Classification> for MpResult {
    fn from(value: Classification) -> Self {
        match value {
            Classification::SinglePrimary => MpResult::SinglePrimary,
            Classification::MultiplePrimaries => MpResult::MultiplePrimaries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleVerdict {
    True,
    False,
    Unknown,
}

impl From<&RuleOutcome> for RuleVerdict {
    fn from(value: &RuleOutcome) -> Self {
        match value {
            RuleOutcome::True => RuleVerdict::True,
            RuleOutcome::False => RuleVerdict::False,
            RuleOutcome::Unknown(_) => RuleVerdict::Unknown,
        }
    }
}

/// Audit entry for one visited rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedRule {
    pub group_id: GroupId,
    pub step: String,
    pub question: String,
    pub verdict: RuleVerdict,
}

/// Outcome of a determination with the trail of rules that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpDecision {
    pub result: MpResult,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
    #[serde(default)]
    pub applied_rules: Vec<AppliedRule>,
}

impl MpDecision {
    pub fn new(result: MpResult, reason: impl Into<String>) -> Self {
        Self {
            result,
            reason: reason.into(),
            group: None,
            applied_rules: Vec::new(),
        }
    }

    pub fn questionable(reason: impl Into<String>) -> Self {
        Self::new(MpResult::Questionable, reason)
    }

    pub fn not_applicable(reason: impl Into<String>) -> Self {
        Self::new(MpResult::NotApplicable, reason)
    }

    pub fn in_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    /// Step of the rule that stopped evaluation, if rules ran.
    pub fn deciding_step(&self) -> Option<&str> {
        self.applied_rules.last().map(|rule| rule.step.as_str())
    }

    /// One-line description for logs and CLI output.
    pub fn summary(&self) -> String {
        match (&self.group, self.deciding_step()) {
            (Some(group), Some(step)) => {
                format!("{} ({} rule {}): {}", self.result.label(), group, step, self.reason)
            }
            _ => format!("{}: {}", self.result.label(), self.reason),
        }
    }
}
