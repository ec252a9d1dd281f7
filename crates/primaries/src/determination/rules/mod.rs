mod kinds;

pub use kinds::{
    CannedText, ChartBranch, LateralityMode, MissingInformation, RuleKind, TumorCriteria,
};

use serde::{Deserialize, Serialize};

use super::catalog::GroupId;
use super::dates::UncertainDateComparator;
use super::domain::Tumor;
use super::recode::RecodeLookup;

/// Terminal decision a rule yields when its question is answered yes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    SinglePrimary,
    MultiplePrimaries,
}

/// Tri-state answer of a rule for one tumor pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    True,
    False,
    Unknown(String),
}

/// Capabilities rules may consult while evaluating a pair.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub dates: &'a UncertainDateComparator,
    pub recodes: &'a dyn RecodeLookup,
}

/// One step of a group's decision list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub group_id: GroupId,
    pub step: String,
    pub question: String,
    pub reason: String,
    pub classification: Classification,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    pub kind: RuleKind,
}

impl Rule {
    pub fn new(
        group_id: GroupId,
        step: impl Into<String>,
        classification: Classification,
        kind: RuleKind,
    ) -> Self {
        Self {
            group_id,
            step: step.into(),
            question: String::new(),
            reason: String::new(),
            classification,
            notes: Vec::new(),
            kind,
        }
    }

    /// Builds a rule from a kind with shared wording, e.g. the catch-all.
    pub fn canned(group_id: GroupId, step: impl Into<String>, kind: RuleKind) -> Option<Self> {
        let text = kind.canned()?;
        Some(
            Self::new(group_id, step, text.classification, kind)
                .with_question(text.question)
                .with_reason(text.reason),
        )
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_catch_all(&self) -> bool {
        self.kind.is_catch_all()
    }

    pub fn evaluate(
        &self,
        first: &Tumor,
        second: &Tumor,
        context: &RuleContext<'_>,
    ) -> RuleOutcome {
        match self.kind.holds(first, second, context) {
            Ok(true) => RuleOutcome::True,
            Ok(false) => RuleOutcome::False,
            Err(missing) => RuleOutcome::Unknown(format!(
                "Unable to apply Rule {} of {}. {}",
                self.step, self.group_id, missing
            )),
        }
    }
}
